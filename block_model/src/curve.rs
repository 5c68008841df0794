use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::{Angle, Circle, CubicBezier, Distance, PolyLine, Pt2D};

/// Something a ring or radial can be drawn with. Parameters run over [0, 1].
pub trait Curve: fmt::Debug {
    fn point_at(&self, t: f64) -> Pt2D;

    /// Where this curve crosses another, as (t on self, t on other). None means this pair of
    /// curves can't be intersected directly; an empty list means they don't cross.
    fn intersect(&self, _other: &dyn Curve) -> Option<Vec<(f64, f64)>> {
        None
    }

    fn as_polyline(&self) -> Option<&PolyLine> {
        None
    }

    fn as_circle(&self) -> Option<&CircleCurve> {
        None
    }
}

/// A polyline, parametrized by arc length.
#[derive(Debug)]
pub struct PolyLineCurve {
    pl: PolyLine,
}

impl PolyLineCurve {
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLineCurve> {
        Ok(PolyLineCurve {
            pl: PolyLine::new(pts)?,
        })
    }

    /// A straight segment starting at `from`, heading towards `angle`.
    pub fn ray(from: Pt2D, angle: Angle, length: f64) -> Result<PolyLineCurve> {
        PolyLineCurve::new(vec![from, from.project_away_raw(length, angle)])
    }
}

impl Curve for PolyLineCurve {
    fn point_at(&self, t: f64) -> Pt2D {
        self.pl.point_at_pct(t)
    }

    fn intersect(&self, other: &dyn Curve) -> Option<Vec<(f64, f64)>> {
        if let Some(pl) = other.as_polyline() {
            return Some(self.pl.intersection_params(pl));
        }
        if let Some(circle) = other.as_circle() {
            return Some(
                circle
                    .polyline_intersections(&self.pl)
                    .into_iter()
                    .map(|(t_circle, t_pl)| (t_pl, t_circle))
                    .collect(),
            );
        }
        None
    }

    fn as_polyline(&self) -> Option<&PolyLine> {
        Some(&self.pl)
    }
}

/// A circle or an arc of one. t = 0 is at `start`, and t increases in the direction of `sweep`.
#[derive(Debug)]
pub struct CircleCurve {
    circle: Circle,
    start: Angle,
    sweep_degrees: f64,
}

impl CircleCurve {
    pub fn new(center: Pt2D, radius: f64, start: Angle, sweep_degrees: f64) -> Result<CircleCurve> {
        if !(radius.is_finite() && radius > 0.0) {
            bail!("Circle radius {} must be positive", radius);
        }
        if sweep_degrees == 0.0 || sweep_degrees.abs() > 360.0 {
            bail!("Circle sweep {} must be in [-360, 360] and nonzero", sweep_degrees);
        }
        Ok(CircleCurve {
            circle: Circle::new(center, Distance::units(radius)),
            start,
            sweep_degrees,
        })
    }

    /// A whole circle, starting at 0 degrees and going clockwise on screen.
    pub fn full(center: Pt2D, radius: f64) -> Result<CircleCurve> {
        CircleCurve::new(center, radius, Angle::ZERO, 360.0)
    }

    /// Inverse of `point_at` for a point on the circle. None if the point's angle lies outside
    /// the arc.
    fn param_of(&self, pt: Pt2D) -> Option<f64> {
        let rotation = if self.sweep_degrees > 0.0 {
            (self.circle.center.angle_to(pt).normalized_degrees()
                - self.start.normalized_degrees())
            .rem_euclid(360.0)
        } else {
            (self.start.normalized_degrees()
                - self.circle.center.angle_to(pt).normalized_degrees())
            .rem_euclid(360.0)
        };
        let t = rotation / self.sweep_degrees.abs();
        if t <= 1.0 {
            Some(t)
        } else if (360.0 - rotation) < 1e-9 {
            // Right before the start, on a whole circle
            Some(0.0)
        } else {
            None
        }
    }

    /// Crossings with a polyline, as (t on the circle, t on the polyline).
    fn polyline_intersections(&self, pl: &PolyLine) -> Vec<(f64, f64)> {
        let total: f64 = pl.lines().map(|l| l.raw_length()).sum();
        if total == 0.0 {
            return Vec::new();
        }
        let mut hits = Vec::new();
        let mut so_far = 0.0;
        for line in pl.lines() {
            for pct in self.circle.line_intersection_params(&line) {
                if let Some(t) = self.param_of(line.percent_along(pct)) {
                    hits.push((t, (so_far + pct * line.raw_length()) / total));
                }
            }
            so_far += line.raw_length();
        }
        // A crossing at a shared vertex gets reported by both segments
        hits.dedup_by(|a, b| (a.1 - b.1).abs() < 1e-12);
        hits
    }
}

impl Curve for CircleCurve {
    fn point_at(&self, t: f64) -> Pt2D {
        self.circle
            .point_at_angle(self.start.rotate_degs(t * self.sweep_degrees))
    }

    fn intersect(&self, other: &dyn Curve) -> Option<Vec<(f64, f64)>> {
        other
            .as_polyline()
            .map(|pl| self.polyline_intersections(pl))
    }

    fn as_circle(&self) -> Option<&CircleCurve> {
        Some(self)
    }
}

/// A sequence of cubic Bezier segments. Each segment gets an equal share of the parameter range.
#[derive(Debug)]
pub struct BezierPathCurve {
    segments: Vec<CubicBezier>,
}

impl BezierPathCurve {
    pub fn new(segments: Vec<CubicBezier>) -> Result<BezierPathCurve> {
        if segments.is_empty() {
            bail!("A Bezier path needs at least one segment");
        }
        Ok(BezierPathCurve { segments })
    }
}

impl Curve for BezierPathCurve {
    fn point_at(&self, t: f64) -> Pt2D {
        let scaled = t.clamp(0.0, 1.0) * self.segments.len() as f64;
        let idx = (scaled.floor() as usize).min(self.segments.len() - 1);
        self.segments[idx].point_at(scaled - idx as f64)
    }
}

/// How a curve is described in a diagram file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CurveSpec {
    PolyLine {
        points: Vec<Pt2D>,
    },
    Circle {
        center: Pt2D,
        radius: f64,
        #[serde(default)]
        start_degrees: f64,
        #[serde(default = "full_sweep")]
        sweep_degrees: f64,
    },
    BezierPath {
        segments: Vec<CubicBezier>,
    },
}

fn full_sweep() -> f64 {
    360.0
}

impl CurveSpec {
    pub fn build(&self) -> Result<Box<dyn Curve>> {
        Ok(match self {
            CurveSpec::PolyLine { points } => Box::new(PolyLineCurve::new(points.clone())?),
            CurveSpec::Circle {
                center,
                radius,
                start_degrees,
                sweep_degrees,
            } => Box::new(CircleCurve::new(
                *center,
                *radius,
                Angle::degrees(*start_degrees),
                *sweep_degrees,
            )?),
            CurveSpec::BezierPath { segments } => {
                Box::new(BezierPathCurve::new(segments.clone())?)
            }
        })
    }
}
