use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use abstutil::Timer;
use geom::{Angle, Pt2D};

use crate::sample::{sample, FINE_SAMPLES};
use crate::{Curve, Diagram, DiagramConfig, RadialKind};

/// Angular projection only trusts the nearest ring sample within this many degrees of the radial.
const MAX_PROJECTION_DEGREES: f64 = 5.0;
/// Closest approach samples the radial less densely than the ring.
const RADIAL_SAMPLES: usize = 1000;
/// Closest approach accepts a gap up to this multiple of the tolerance.
const CLOSEST_APPROACH_FACTOR: f64 = 3.0;

/// Which strategy found an intersection, from most to least precise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// The curves crossed exactly.
    Exact,
    /// The ring sample nearest the radial's clock angle, moved onto the ideal radial line.
    AngularProjection,
    /// The midpoint of the closest pair of samples from both curves.
    ClosestApproach,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tier::Exact => write!(f, "exact"),
            Tier::AngularProjection => write!(f, "angular projection"),
            Tier::ClosestApproach => write!(f, "closest approach"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub ring: String,
    pub radial: String,
    pub pt: Pt2D,
    pub tier: Tier,
}

/// Finds the single best place where a ring meets a radial, trying each tier in order.
/// `label_angle` is the direction the radial's label points in, if it names a clock time.
pub fn resolve(
    ring: &dyn Curve,
    radial: &dyn Curve,
    label_angle: Option<Angle>,
    center: Pt2D,
    tolerance: f64,
) -> Result<Option<(Pt2D, Tier)>> {
    if let Some(pt) = exact_intersection(ring, radial, label_angle, center) {
        return Ok(Some((pt, Tier::Exact)));
    }
    if let Some(angle) = label_angle {
        if let Some(pt) = angular_projection(ring, center, angle)? {
            return Ok(Some((pt, Tier::AngularProjection)));
        }
    }
    Ok(closest_approach(ring, radial, tolerance)?.map(|pt| (pt, Tier::ClosestApproach)))
}

/// Uses the curves' own intersection, if they support it. When they cross more than once, the
/// crossing nearest the label's angle wins; without a label, the one earliest along the ring.
pub fn exact_intersection(
    ring: &dyn Curve,
    radial: &dyn Curve,
    label_angle: Option<Angle>,
    center: Pt2D,
) -> Option<Pt2D> {
    let hits = ring.intersect(radial)?;
    let best_t = match label_angle {
        Some(angle) => hits
            .iter()
            .map(|(t, _)| {
                let pt = ring.point_at(*t);
                (*t, center.angle_to(pt).circular_distance(angle))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))?
            .0,
        None => hits
            .iter()
            .map(|(t, _)| *t)
            .min_by(|a, b| a.total_cmp(b))?,
    };
    Some(ring.point_at(best_t))
}

/// Samples the ring finely and picks the sample whose angle about the center is nearest
/// `angle`. The result is moved onto the ideal radial line at that sample's distance from the
/// center, so noise from sampling the ring doesn't leak into arc fitting. None if no sample is
/// close enough.
pub fn angular_projection(ring: &dyn Curve, center: Pt2D, angle: Angle) -> Result<Option<Pt2D>> {
    let mut best: Option<(Pt2D, f64)> = None;
    for pt in sample(ring, FINE_SAMPLES)? {
        if pt == center {
            continue;
        }
        let diff = center.angle_to(pt).circular_distance(angle);
        if best.map(|(_, d)| diff < d).unwrap_or(true) {
            best = Some((pt, diff));
        }
    }
    Ok(match best {
        Some((pt, diff)) if diff.to_degrees() < MAX_PROJECTION_DEGREES => {
            Some(center.project_away_raw(center.raw_dist_to(pt), angle))
        }
        _ => None,
    })
}

/// The last resort: compare every ring sample with every radial sample, and return the midpoint
/// of the closest pair if they're within `3 * tolerance`.
pub fn closest_approach(
    ring: &dyn Curve,
    radial: &dyn Curve,
    tolerance: f64,
) -> Result<Option<Pt2D>> {
    let ring_pts = sample(ring, FINE_SAMPLES)?;
    let radial_pts = sample(radial, RADIAL_SAMPLES)?;

    let mut best: Option<(Pt2D, Pt2D, f64)> = None;
    for pt1 in &ring_pts {
        for pt2 in &radial_pts {
            let dist = pt1.raw_dist_to(*pt2);
            if best.map(|(_, _, d)| dist < d).unwrap_or(true) {
                best = Some((*pt1, *pt2, dist));
            }
        }
    }
    Ok(match best {
        Some((pt1, pt2, dist)) if dist < CLOSEST_APPROACH_FACTOR * tolerance => {
            Some(pt1.midpoint(pt2))
        }
        _ => None,
    })
}

/// Every intersection between a ring and a radial in the diagram, computed once up-front.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IntersectionCache {
    by_ring: BTreeMap<String, BTreeMap<String, Intersection>>,
}

impl IntersectionCache {
    /// Rings bounding quarter-hour rows are resolved against every radial; the rest only against
    /// primary radials. Fails only if some curve can't be sampled.
    pub fn build(
        diagram: &Diagram,
        cfg: &DiagramConfig,
        timer: &mut Timer,
    ) -> Result<IntersectionCache> {
        let mut cache = IntersectionCache::default();

        let rings: Vec<&String> = cfg
            .ring_order
            .iter()
            .filter(|name| {
                if diagram.ring(name).is_none() {
                    warn!("Ring {} is missing from the diagram", name);
                    false
                } else {
                    true
                }
            })
            .collect();

        timer.start_iter("intersect rings with radials", rings.len());
        for name in rings {
            timer.next();
            let ring = match diagram.ring(name) {
                Some(ring) => ring,
                None => continue,
            };
            let use_secondary = cfg.bounds_outer_row(name);
            let results = cache.by_ring.entry(name.clone()).or_default();
            // Crossings of compound radials, keyed by the single time they bound
            let mut per_time = Vec::new();

            for radial in diagram.radials() {
                if radial.kind == RadialKind::Secondary && !use_secondary {
                    continue;
                }
                let times = Diagram::radial_times(&radial.label);
                if times.len() > 1 {
                    for time in times {
                        let angle = time.design_angle();
                        match resolve(
                            ring,
                            radial.curve.as_ref(),
                            Some(angle),
                            cfg.center,
                            cfg.tolerance,
                        )? {
                            // Every tier can settle on the far side of a radial that doesn't
                            // reach this time's direction
                            Some((pt, tier))
                                if cfg
                                    .center
                                    .angle_to(pt)
                                    .approx_eq(angle, MAX_PROJECTION_DEGREES) =>
                            {
                                debug!(
                                    "{} & {} meet at {} for {} ({})",
                                    name, radial.label, pt, time, tier
                                );
                                per_time.push((
                                    time.to_string(),
                                    Intersection {
                                        ring: name.clone(),
                                        radial: radial.label.clone(),
                                        pt,
                                        tier,
                                    },
                                ));
                            }
                            _ => {
                                debug!("{} doesn't meet {} at {}", radial.label, name, time);
                            }
                        }
                    }
                    continue;
                }

                let label_angle = Diagram::radial_time(&radial.label).map(|t| t.design_angle());
                match resolve(
                    ring,
                    radial.curve.as_ref(),
                    label_angle,
                    cfg.center,
                    cfg.tolerance,
                )? {
                    Some((pt, tier)) => {
                        debug!("{} & {} meet at {} ({})", name, radial.label, pt, tier);
                        results.insert(
                            radial.label.clone(),
                            Intersection {
                                ring: name.clone(),
                                radial: radial.label.clone(),
                                pt,
                                tier,
                            },
                        );
                    }
                    None => {
                        debug!("{} and {} don't meet", name, radial.label);
                    }
                }
            }
            // A radial labelled with just that time takes precedence
            for (time, intersection) in per_time {
                results.entry(time).or_insert(intersection);
            }
        }

        Ok(cache)
    }

    pub fn insert(&mut self, intersection: Intersection) {
        self.by_ring
            .entry(intersection.ring.clone())
            .or_default()
            .insert(intersection.radial.clone(), intersection);
    }

    /// Only matches the exact radial label.
    pub fn get(&self, ring: &str, label: &str) -> Option<&Intersection> {
        self.by_ring.get(ring)?.get(label)
    }

    /// Tries the exact label first, then any other label containing it. Compound radials are
    /// already stored under each of their times, so this mostly catches suffixed labels like
    /// "4:15_sec". If several labels match, the first in sorted order wins.
    pub fn find(&self, ring: &str, label: &str) -> Option<&Intersection> {
        let results = self.by_ring.get(ring)?;
        if let Some(i) = results.get(label) {
            return Some(i);
        }
        let mut candidates = results
            .iter()
            .filter(|(key, _)| key.contains(label))
            .map(|(_, i)| i);
        let first = candidates.next()?;
        let others = candidates.count();
        if others > 0 {
            debug!(
                "{} on {} matches {} and {} other radials; using {}",
                label, ring, first.radial, others, first.radial
            );
        }
        Some(first)
    }

    pub fn len(&self) -> usize {
        self.by_ring.values().map(|results| results.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> impl Iterator<Item = &Intersection> {
        self.by_ring.values().flat_map(|results| results.values())
    }

    pub fn tier_counts(&self) -> BTreeMap<Tier, usize> {
        let mut counts = BTreeMap::new();
        for i in self.all() {
            *counts.entry(i.tier).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use geom::Distance;

    use super::*;
    use crate::{BezierPathCurve, CircleCurve, PolyLineCurve};

    fn origin() -> Pt2D {
        Pt2D::new(0.0, 0.0)
    }

    #[test]
    fn projection_lands_on_the_ideal_radial() {
        let radius = 250.0;
        let ring = CircleCurve::full(origin(), radius).unwrap();
        for degrees in [0.0, 17.0, 75.0, 90.0, 200.5, 359.9] {
            let angle = Angle::degrees(degrees);
            let pt = angular_projection(&ring, origin(), angle).unwrap().unwrap();
            let ideal = origin().project_away_raw(radius, angle);
            assert!(
                pt.approx_eq(ideal, Distance::units(1e-3)),
                "{} degrees: got {}, wanted {}",
                degrees,
                pt,
                ideal
            );
        }
    }

    #[test]
    fn projection_rejects_rings_that_dont_reach_the_angle() {
        // A quarter arc, from 0 to 90 degrees
        let ring = CircleCurve::new(origin(), 100.0, Angle::ZERO, 90.0).unwrap();
        assert!(angular_projection(&ring, origin(), Angle::degrees(180.0))
            .unwrap()
            .is_none());
        assert!(angular_projection(&ring, origin(), Angle::degrees(94.0))
            .unwrap()
            .is_some());
    }

    #[test]
    fn exact_prefers_the_crossing_near_the_label() {
        // A diameter crosses the circle twice
        let ring = CircleCurve::full(origin(), 100.0).unwrap();
        let diameter =
            PolyLineCurve::new(vec![Pt2D::new(-200.0, 0.0), Pt2D::new(200.0, 0.0)]).unwrap();
        let east = exact_intersection(&ring, &diameter, Some(Angle::ZERO), origin()).unwrap();
        assert!(east.approx_eq(Pt2D::new(100.0, 0.0), Distance::units(1e-4)));
        let west =
            exact_intersection(&ring, &diameter, Some(Angle::degrees(180.0)), origin()).unwrap();
        assert!(west.approx_eq(Pt2D::new(-100.0, 0.0), Distance::units(1e-4)));
    }

    #[test]
    fn tiers_fall_through() {
        // Bezier paths can't intersect natively, so the second tier takes over
        let ring = BezierPathCurve::new(vec![geom::CubicBezier::new(
            Pt2D::new(-100.0, 50.0),
            Pt2D::new(-30.0, 50.0),
            Pt2D::new(30.0, 50.0),
            Pt2D::new(100.0, 50.0),
        )])
        .unwrap();
        let radial = PolyLineCurve::ray(origin(), Angle::degrees(90.0), 100.0).unwrap();
        let (pt, tier) = resolve(&ring, &radial, Some(Angle::degrees(90.0)), origin(), 5.0)
            .unwrap()
            .unwrap();
        assert_eq!(tier, Tier::AngularProjection);
        assert!((pt.x()).abs() < 1e-9);
        assert!((pt.y() - 50.0).abs() < 0.2);

        // Without a label, only closest approach is left
        let (pt, tier) = resolve(&ring, &radial, None, origin(), 5.0)
            .unwrap()
            .unwrap();
        assert_eq!(tier, Tier::ClosestApproach);
        assert!(pt.approx_eq(Pt2D::new(0.0, 50.0), Distance::units(0.5)));

        // A radial that stops well short of the ring
        let short = PolyLineCurve::ray(origin(), Angle::degrees(90.0), 20.0).unwrap();
        assert!(resolve(&ring, &short, None, origin(), 5.0)
            .unwrap()
            .is_none());
    }

    #[test]
    fn find_tolerates_compound_labels() {
        let mut cache = IntersectionCache::default();
        for (label, x) in [("3:30-9:30", 1.0), ("4:00", 2.0), ("3:30-4:30", 3.0)] {
            cache.insert(Intersection {
                ring: "A".to_string(),
                radial: label.to_string(),
                pt: Pt2D::new(x, 0.0),
                tier: Tier::Exact,
            });
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.find("A", "4:00").unwrap().pt.x(), 2.0);
        assert!(cache.get("A", "9:30").is_none());
        assert_eq!(cache.find("A", "9:30").unwrap().pt.x(), 1.0);
        // Ambiguous, so the first in sorted order wins
        assert_eq!(cache.find("A", "3:30").unwrap().radial, "3:30-4:30");
        assert!(cache.find("A", "5:00").is_none());
        assert!(cache.find("B", "4:00").is_none());
        assert_eq!(cache.tier_counts()[&Tier::Exact], 3);
    }
}
