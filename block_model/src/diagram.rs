use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sample::check_drawable;
use crate::{ClockTime, Curve, CurveSpec, DiagramConfig, PolyLineCurve, SECONDARY_SUFFIX};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RadialKind {
    /// Runs from near the center outward. Bounds every row.
    #[default]
    Primary,
    /// Only present in the outer rows, splitting them at quarter hours.
    Secondary,
}

#[derive(Debug)]
pub struct Radial {
    /// The key this radial is registered under. Usually a clock time like "3:30", maybe compound
    /// like "3:30-9:30", maybe with a suffix for secondary radials.
    pub label: String,
    pub kind: RadialKind,
    pub curve: Box<dyn Curve>,
}

/// All the rings and radials of one diagram. Read-only once built.
#[derive(Debug, Default)]
pub struct Diagram {
    rings: BTreeMap<String, Box<dyn Curve>>,
    radials: BTreeMap<String, Radial>,
}

/// A diagram as it's stored in a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    pub rings: Vec<RingSpec>,
    pub radials: Vec<RadialSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingSpec {
    pub name: String,
    pub curve: CurveSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadialSpec {
    pub label: String,
    #[serde(default)]
    pub kind: RadialKind,
    pub curve: CurveSpec,
}

impl Diagram {
    pub fn new() -> Diagram {
        Diagram::default()
    }

    /// Builds every curve, failing if any of them can't be drawn.
    pub fn from_spec(spec: &DiagramSpec) -> Result<Diagram> {
        let mut diagram = Diagram::new();
        for ring in &spec.rings {
            let curve = ring
                .curve
                .build()
                .with_context(|| format!("ring {}", ring.name))?;
            check_drawable(curve.as_ref()).with_context(|| format!("ring {}", ring.name))?;
            diagram.add_ring(ring.name.clone(), curve);
        }
        for radial in &spec.radials {
            let curve = radial
                .curve
                .build()
                .with_context(|| format!("radial {}", radial.label))?;
            check_drawable(curve.as_ref()).with_context(|| format!("radial {}", radial.label))?;
            diagram.add_radial(radial.label.clone(), radial.kind, curve);
        }
        Ok(diagram)
    }

    /// Replaces any ring with the same name.
    pub fn add_ring(&mut self, name: String, curve: Box<dyn Curve>) {
        if self.rings.insert(name.clone(), curve).is_some() {
            warn!("Ring {} defined twice; keeping the last", name);
        }
    }

    /// Registers a radial and returns the key it's stored under. Secondary radials reusing a
    /// label get a suffix; anything else replaces the old radial.
    pub fn add_radial(&mut self, label: String, kind: RadialKind, curve: Box<dyn Curve>) -> String {
        let key = if kind == RadialKind::Secondary && self.radials.contains_key(&label) {
            format!("{}{}", label, SECONDARY_SUFFIX)
        } else {
            label
        };
        if self.radials.contains_key(&key) {
            warn!("Radial {} defined twice; keeping the last", key);
        }
        self.radials.insert(
            key.clone(),
            Radial {
                label: key.clone(),
                kind,
                curve,
            },
        );
        key
    }

    pub fn ring(&self, name: &str) -> Option<&dyn Curve> {
        self.rings.get(name).map(|curve| curve.as_ref())
    }

    pub fn radial(&self, label: &str) -> Option<&Radial> {
        self.radials.get(label)
    }

    /// Sorted by label.
    pub fn radials(&self) -> impl Iterator<Item = &Radial> {
        self.radials.values()
    }

    /// Every time a row needs but no radial is registered for exactly gets a straight primary
    /// radial out from the center. Returns the labels that were added.
    pub fn fill_missing_radials(&mut self, cfg: &DiagramConfig) -> Result<Vec<String>> {
        let mut added = Vec::new();
        for time in cfg.all_times() {
            let label = time.to_string();
            if self.radials.contains_key(&label) {
                continue;
            }
            let curve = PolyLineCurve::ray(
                cfg.center,
                time.design_angle(),
                cfg.synthetic_radial_length,
            )?;
            info!("Generated missing radial {}", label);
            self.add_radial(label.clone(), RadialKind::Primary, Box::new(curve));
            added.push(label);
        }
        Ok(added)
    }

    /// The clock time a radial points towards, if its label names one.
    pub fn radial_time(label: &str) -> Option<ClockTime> {
        ClockTime::from_label(label).ok()
    }

    /// All the clock times a radial's label names; more than one for compound labels.
    pub fn radial_times(label: &str) -> Vec<ClockTime> {
        ClockTime::all_from_label(label)
    }
}

#[cfg(test)]
mod tests {
    use geom::{CubicBezier, Pt2D};

    use super::*;
    use crate::CircleCurve;

    fn ray(label: &str) -> Box<dyn Curve> {
        let time: ClockTime = label.parse().unwrap();
        Box::new(PolyLineCurve::ray(Pt2D::new(0.0, 0.0), time.design_angle(), 100.0).unwrap())
    }

    #[test]
    fn secondary_labels_get_a_suffix() {
        let mut diagram = Diagram::new();
        assert_eq!(
            diagram.add_radial("3:00".to_string(), RadialKind::Primary, ray("3:00")),
            "3:00"
        );
        assert_eq!(
            diagram.add_radial("3:00".to_string(), RadialKind::Secondary, ray("3:00")),
            "3:00_sec"
        );
        assert_eq!(
            diagram.add_radial("3:15".to_string(), RadialKind::Secondary, ray("3:15")),
            "3:15"
        );
        let labels: Vec<&str> = diagram.radials().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["3:00", "3:00_sec", "3:15"]);
        assert_eq!(diagram.radial("3:00_sec").unwrap().kind, RadialKind::Secondary);
        assert_eq!(
            Diagram::radial_time("3:00_sec"),
            Some(ClockTime::new(3, 0).unwrap())
        );
    }

    #[test]
    fn fills_gaps() {
        let mut cfg = DiagramConfig::default();
        cfg.center = Pt2D::new(0.0, 0.0);
        let mut diagram = Diagram::new();
        diagram.add_ring(
            "A".to_string(),
            Box::new(CircleCurve::full(cfg.center, 100.0).unwrap()),
        );
        diagram.add_radial("6:00".to_string(), RadialKind::Primary, ray("6:00"));

        let added = diagram.fill_missing_radials(&cfg).unwrap();
        assert_eq!(added.len(), 32);
        assert!(!added.contains(&"6:00".to_string()));
        let generated = diagram.radial("9:00").unwrap();
        assert!(generated
            .curve
            .point_at(1.0)
            .approx_eq(Pt2D::new(-600.0, 0.0), geom::Distance::units(1e-4)));
    }

    #[test]
    fn undrawable_curves_are_fatal() {
        let stuck = Pt2D::new(1.0, 1.0);
        let spec = DiagramSpec {
            rings: vec![RingSpec {
                name: "A".to_string(),
                curve: CurveSpec::BezierPath {
                    segments: vec![CubicBezier::new(stuck, stuck, stuck, stuck)],
                },
            }],
            radials: Vec::new(),
        };
        let err = Diagram::from_spec(&spec).unwrap_err();
        assert!(format!("{:#}", err).contains("ring A"));
    }
}
