//! Generates a clean diagram matching a configuration, for testing the pipeline end-to-end and
//! as a template for hand-edited diagrams.
//!
//! Every ring is a circle about the center, except the exception ring, which dips inwards around
//! the singularity radial along the auxiliary ring. The auxiliary ring's center is the second
//! ring's crossing with the singularity radial, so the configured apex and feet fix the radii of
//! the first two rings. Later rings are evenly spaced so that the innermost radial segments come
//! out `expected_radial_ratio` times as long as the others.

use anyhow::{bail, Result};

use geom::{Angle, Pt2D};

use crate::{ClockTime, CurveSpec, DiagramConfig, DiagramSpec, RadialKind, RadialSpec, RingSpec};

/// The notched ring is a polyline with a point this many degrees apart.
const NOTCHED_RING_STEP_DEGREES: f64 = 0.25;
/// Without an auxiliary ring, the innermost ring has this radius...
const DEFAULT_INNER_RADIUS: f64 = 200.0;
/// ... and rings past the second are this far apart.
const DEFAULT_RING_GAP: f64 = 40.0;

/// The auxiliary ring, in terms of the center.
struct Notch {
    /// Direction of the singularity radial
    angle: Angle,
    /// Degrees either side of `angle` where the exception ring follows the auxiliary ring
    half_width: f64,
    /// From the center to the auxiliary ring's center
    offset: f64,
    radius: f64,
}

pub fn reference_diagram(cfg: &DiagramConfig) -> Result<DiagramSpec> {
    cfg.validate()?;

    let (inner_radius, second_radius, gap, notch) = match cfg.exception {
        Some(ref exception) => {
            if exception.ring != cfg.ring_order[0] {
                bail!(
                    "Can only generate a diagram notching the innermost ring, not {}",
                    exception.ring
                );
            }
            let notch = solve_notch(cfg, exception.singularity, exception.apex, exception.foot_before)?;
            let inner_radius = cfg.center.raw_dist_to(exception.foot_before);
            if notch.offset <= inner_radius {
                bail!(
                    "The auxiliary ring's center must lie outside the innermost ring; it's {} from \
                     the center, but the ring is {}",
                    notch.offset,
                    inner_radius
                );
            }
            let gap = (notch.offset - inner_radius) / cfg.expected_radial_ratio;
            (inner_radius, notch.offset, gap, Some(notch))
        }
        None => (
            DEFAULT_INNER_RADIUS,
            DEFAULT_INNER_RADIUS + cfg.expected_radial_ratio * DEFAULT_RING_GAP,
            DEFAULT_RING_GAP,
            None,
        ),
    };
    let radius = |idx: usize| {
        if idx == 0 {
            inner_radius
        } else {
            second_radius + (idx - 1) as f64 * gap
        }
    };
    let radial_end = radius(cfg.ring_order.len() - 1) + 2.0 * gap;

    let mut rings = Vec::new();
    for (idx, name) in cfg.ring_order.iter().enumerate() {
        let curve = match notch {
            Some(ref notch) if idx == 0 => CurveSpec::PolyLine {
                points: notched_ring(cfg.center, inner_radius, notch),
            },
            _ => CurveSpec::Circle {
                center: cfg.center,
                radius: radius(idx),
                start_degrees: 0.0,
                sweep_degrees: 360.0,
            },
        };
        rings.push(RingSpec {
            name: name.clone(),
            curve,
        });
    }

    let mut radials = Vec::new();
    for time in &cfg.inner_times {
        radials.push(straight_radial(
            cfg.center,
            *time,
            0.5 * inner_radius,
            radial_end,
            RadialKind::Primary,
        ));
    }
    if !cfg.outer_ring_pairs().is_empty() {
        let start = radius(cfg.outer_rows_start) - 0.5 * gap;
        for time in &cfg.outer_times {
            radials.push(straight_radial(
                cfg.center,
                *time,
                start,
                radial_end,
                RadialKind::Secondary,
            ));
        }
    }

    info!(
        "Generated {} rings from radius {:.2} to {:.2}, and {} radials",
        rings.len(),
        inner_radius,
        radius(cfg.ring_order.len() - 1),
        radials.len()
    );
    Ok(DiagramSpec { rings, radials })
}

/// Finds the circle about a point on the singularity radial that passes through both the apex and
/// the foot.
fn solve_notch(cfg: &DiagramConfig, singularity: ClockTime, apex: Pt2D, foot: Pt2D) -> Result<Notch> {
    let angle = singularity.design_angle();
    let (sin, cos) = angle.inner_radians().sin_cos();
    let project = |pt: Pt2D| (pt.x() - cfg.center.x()) * cos + (pt.y() - cfg.center.y()) * sin;

    let apex_dist = project(apex);
    let foot_along = project(foot);
    let foot_dist = cfg.center.raw_dist_to(foot);
    let denominator = 2.0 * (foot_along - apex_dist);
    if denominator.abs() < 1e-9 {
        bail!("The apex {} and foot {} don't define an auxiliary ring", apex, foot);
    }
    // |foot - c| = |apex - c|, where c is `offset` along the singularity radial
    let offset = (foot_dist.powi(2) - apex_dist.powi(2)) / denominator;
    let radius = offset - apex_dist;
    if radius <= 0.0 {
        bail!(
            "The auxiliary ring through {} and {} has no positive radius",
            apex,
            foot
        );
    }

    Ok(Notch {
        angle,
        half_width: cfg.center.angle_to(foot).circular_distance(angle).to_degrees(),
        offset,
        radius,
    })
}

/// A closed polyline around the center, following the auxiliary ring near the singularity.
fn notched_ring(center: Pt2D, radius: f64, notch: &Notch) -> Vec<Pt2D> {
    let aux_center = center.project_away_raw(notch.offset, notch.angle);
    let steps = (360.0 / NOTCHED_RING_STEP_DEGREES).round() as usize;
    let mut pts = Vec::with_capacity(steps + 1);
    for step in 0..steps {
        let angle = Angle::degrees(step as f64 * NOTCHED_RING_STEP_DEGREES);
        let dist = if angle.circular_distance(notch.angle).to_degrees() <= notch.half_width {
            nearest_crossing(center, angle, aux_center, notch.radius).unwrap_or(radius)
        } else {
            radius
        };
        pts.push(center.project_away_raw(dist, angle));
    }
    pts.push(pts[0]);
    pts
}

/// How far along the ray from `from` towards `angle` it first crosses the circle.
fn nearest_crossing(from: Pt2D, angle: Angle, circle_center: Pt2D, radius: f64) -> Option<f64> {
    let (sin, cos) = angle.inner_radians().sin_cos();
    let (wx, wy) = (circle_center.x() - from.x(), circle_center.y() - from.y());
    let along = wx * cos + wy * sin;
    let discriminant = along.powi(2) - (wx.powi(2) + wy.powi(2)) + radius.powi(2);
    if discriminant < 0.0 {
        return None;
    }
    Some(along - discriminant.sqrt())
}

fn straight_radial(
    center: Pt2D,
    time: ClockTime,
    from: f64,
    to: f64,
    kind: RadialKind,
) -> RadialSpec {
    let angle = time.design_angle();
    RadialSpec {
        label: time.to_string(),
        kind,
        curve: CurveSpec::PolyLine {
            points: vec![
                center.project_away_raw(from, angle),
                center.project_away_raw(to, angle),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use geom::Distance;

    use super::*;
    use crate::intersection::resolve;
    use crate::Diagram;

    #[test]
    fn reference_geometry() {
        let cfg = DiagramConfig::default();
        let spec = reference_diagram(&cfg).unwrap();
        assert_eq!(spec.rings.len(), 12);
        assert_eq!(spec.radials.len(), 17 + 33);

        let second = match spec.rings[1].curve {
            CurveSpec::Circle { radius, .. } => radius,
            _ => panic!("A should be a circle"),
        };
        assert!((second - 333.08).abs() < 0.01, "A has radius {}", second);

        let diagram = Diagram::from_spec(&spec).unwrap();
        assert_eq!(diagram.radials().count(), 50);
        assert!(diagram.radial("6:00_sec").is_some());
        assert!(diagram.radial("6:15").is_some());
    }

    #[test]
    fn notch_passes_through_the_apex_and_feet() {
        let cfg = DiagramConfig::default();
        let exception = cfg.exception.clone().unwrap();
        let diagram = Diagram::from_spec(&reference_diagram(&cfg).unwrap()).unwrap();
        let ring = diagram.ring("Esplanade").unwrap();

        let six = diagram.radial("6:00").unwrap();
        let (pt, _) = resolve(
            ring,
            six.curve.as_ref(),
            Some(Angle::degrees(90.0)),
            cfg.center,
            cfg.tolerance,
        )
        .unwrap()
        .unwrap();
        assert!(pt.approx_eq(exception.apex, Distance::units(1e-3)));

        // The feet sit just past 5:30 and 6:30
        for (label, foot) in [("5:30", exception.foot_before), ("6:30", exception.foot_after)] {
            let radial = diagram.radial(label).unwrap();
            let (pt, _) = resolve(
                ring,
                radial.curve.as_ref(),
                Diagram::radial_time(label).map(|t| t.design_angle()),
                cfg.center,
                cfg.tolerance,
            )
            .unwrap()
            .unwrap();
            assert!(pt.approx_eq(foot, Distance::units(1.0)), "{} at {}", label, pt);
        }
    }

    #[test]
    fn without_an_exception() {
        let mut cfg = DiagramConfig::default();
        cfg.exception = None;
        let spec = reference_diagram(&cfg).unwrap();
        assert!(spec
            .rings
            .iter()
            .all(|r| matches!(r.curve, CurveSpec::Circle { .. })));
    }

    #[test]
    fn bad_auxiliary_rings() {
        let mut cfg = DiagramConfig::default();
        // The apex outside the feet flips the auxiliary ring inside out
        cfg.exception.as_mut().unwrap().apex = Pt2D::new(622.5, 700.0);
        assert!(reference_diagram(&cfg).is_err());
    }
}
