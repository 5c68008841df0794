use geom::{Distance, Pt2D, EPSILON_DIST};

use crate::{BlockError, CircularArc, Corners, DiagramConfig, ExceptionSide};

/// Points along the auxiliary ring's arc, between its endpoints.
pub const AUXILIARY_ARC_POINTS: usize = 48;

/// Builds the outline of one of the two blocks the auxiliary ring cuts into.
///
/// The auxiliary ring is a circle about the outer corner on the singularity radial, passing
/// through the configured apex. Its arc replaces the inner ring's arc: for the block before the
/// singularity it runs from the first foot to the apex, and for the block after, from the apex to
/// the second foot. The outer ring's arc closes the outline as usual.
///
/// A corner within `tolerance` of the arc endpoint next to it is dropped in favor of the endpoint;
/// keeping both would fold the outline back over the arc.
pub fn exception_boundary(
    side: ExceptionSide,
    corners: &Corners,
    cfg: &DiagramConfig,
) -> Result<Vec<Pt2D>, BlockError> {
    let exception = cfg
        .exception
        .as_ref()
        .ok_or_else(|| BlockError::DegenerateGeometry {
            reason: "exception block without an auxiliary ring".to_string(),
        })?;

    let (arc_center, arc_start, arc_end) = match side {
        ExceptionSide::BeforeSingularity => (corners.outer2, exception.foot_before, exception.apex),
        ExceptionSide::AfterSingularity => (corners.outer1, exception.apex, exception.foot_after),
    };
    let radius = arc_center.raw_dist_to(exception.apex);
    let auxiliary = CircularArc::with_radius(arc_center, radius, arc_start, arc_end).ok_or_else(
        || BlockError::DegenerateGeometry {
            reason: format!("auxiliary ring about {} collapses", arc_center),
        },
    )?;
    let outer = CircularArc::fit(cfg.center, corners.outer2, corners.outer1).ok_or_else(|| {
        BlockError::DegenerateGeometry {
            reason: format!("outer corner {} is on the center", corners.outer2),
        }
    })?;

    let tolerance = Distance::units(cfg.tolerance);
    let mut pts = Vec::new();
    if !corners.inner1.approx_eq(arc_start, tolerance) {
        pts.push(corners.inner1);
    }
    pts.push(arc_start);
    pts.extend(auxiliary.interior_points(AUXILIARY_ARC_POINTS));
    pts.push(arc_end);
    if !corners.inner2.approx_eq(arc_end, tolerance) {
        pts.push(corners.inner2);
    }
    pts.push(corners.outer2);
    pts.extend(outer.interior_points(cfg.arc_outline_points));
    pts.push(corners.outer1);

    Ok(dedupe(pts))
}

/// Collapses consecutive points that are practically the same, including the last against the
/// first. The result is open; the closing edge is implied.
fn dedupe(pts: Vec<Pt2D>) -> Vec<Pt2D> {
    let mut result: Vec<Pt2D> = Vec::with_capacity(pts.len());
    for pt in pts {
        if result
            .last()
            .map(|last| last.approx_eq(pt, EPSILON_DIST))
            .unwrap_or(false)
        {
            continue;
        }
        result.push(pt);
    }
    while result.len() > 1 && result[0].approx_eq(result[result.len() - 1], EPSILON_DIST) {
        result.pop();
    }
    result
}

#[cfg(test)]
mod tests {
    use geom::{Angle, Ring};

    use super::*;
    use crate::ClockTime;

    /// The corners the reference diagram produces around 6:00, built from the same circles.
    fn reference_corners(cfg: &DiagramConfig, side: ExceptionSide) -> Corners {
        let exception = cfg.exception.as_ref().unwrap();
        let r0 = cfg.center.raw_dist_to(exception.foot_before);
        let ring_a = 333.08;
        let at = |radius: f64, h, m| {
            cfg.center
                .project_away_raw(radius, ClockTime::new(h, m).unwrap().design_angle())
        };
        match side {
            ExceptionSide::BeforeSingularity => Corners {
                inner1: at(r0, 5, 30),
                inner2: exception.apex,
                outer2: at(ring_a, 6, 0),
                outer1: at(ring_a, 5, 30),
            },
            ExceptionSide::AfterSingularity => Corners {
                inner1: exception.apex,
                inner2: at(r0, 6, 30),
                outer2: at(ring_a, 6, 30),
                outer1: at(ring_a, 6, 0),
            },
        }
    }

    #[test]
    fn both_sides_are_simple_and_closed() {
        let cfg = DiagramConfig::default();
        for side in [
            ExceptionSide::BeforeSingularity,
            ExceptionSide::AfterSingularity,
        ] {
            let corners = reference_corners(&cfg, side);
            let pts = exception_boundary(side, &corners, &cfg).unwrap();
            // Both arcs, their endpoints, and the outer corners
            assert_eq!(pts.len(), 2 + AUXILIARY_ARC_POINTS + 2 + 9);
            for pair in pts.windows(2) {
                assert!(!pair[0].approx_eq(pair[1], EPSILON_DIST));
            }
            assert!(!pts[0].approx_eq(*pts.last().unwrap(), EPSILON_DIST));

            let ring = Ring::deduped(pts, EPSILON_DIST).unwrap();
            assert!(ring.is_simple(), "{:?} isn't simple", side);
            assert!(ring.into_polygon().area() > 100.0);
        }
    }

    #[test]
    fn sides_mirror_each_other() {
        let cfg = DiagramConfig::default();
        let before = exception_boundary(
            ExceptionSide::BeforeSingularity,
            &reference_corners(&cfg, ExceptionSide::BeforeSingularity),
            &cfg,
        )
        .unwrap();
        let after = exception_boundary(
            ExceptionSide::AfterSingularity,
            &reference_corners(&cfg, ExceptionSide::AfterSingularity),
            &cfg,
        )
        .unwrap();

        let exception = cfg.exception.as_ref().unwrap();
        assert_eq!(before[0], exception.foot_before);
        assert_eq!(after[0], exception.apex);
        assert_eq!(after[AUXILIARY_ARC_POINTS + 1], exception.foot_after);

        // Reflecting across the singularity radial swaps the two auxiliary arcs
        let mirror = |pt: Pt2D| Pt2D::new(2.0 * cfg.center.x() - pt.x(), pt.y());
        for i in 1..=AUXILIARY_ARC_POINTS {
            let reflected = mirror(before[i]);
            assert!(
                reflected.approx_eq(after[AUXILIARY_ARC_POINTS + 1 - i], Distance::units(1e-4)),
                "{} vs {}",
                reflected,
                after[AUXILIARY_ARC_POINTS + 1 - i]
            );
        }
        // The auxiliary arcs stay on their circle
        let arc_center = reference_corners(&cfg, ExceptionSide::BeforeSingularity).outer2;
        let radius = arc_center.raw_dist_to(exception.apex);
        for pt in &before[1..=AUXILIARY_ARC_POINTS] {
            assert!((arc_center.raw_dist_to(*pt) - radius).abs() < 1e-9);
        }
        assert!(Angle::degrees(90.0).approx_eq(cfg.center.angle_to(arc_center), 1e-9));
    }

    #[test]
    fn needs_an_auxiliary_ring() {
        let mut cfg = DiagramConfig::default();
        let corners = reference_corners(&cfg, ExceptionSide::BeforeSingularity);
        cfg.exception = None;
        assert!(matches!(
            exception_boundary(ExceptionSide::BeforeSingularity, &corners, &cfg),
            Err(BlockError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn far_corners_are_kept() {
        let cfg = DiagramConfig::default();
        let mut corners = reference_corners(&cfg, ExceptionSide::BeforeSingularity);
        corners.inner1 = Pt2D::new(corners.inner1.x() - 20.0, corners.inner1.y() - 5.0);
        let pts = exception_boundary(ExceptionSide::BeforeSingularity, &corners, &cfg).unwrap();
        assert_eq!(pts[0], corners.inner1);
        assert_eq!(pts[1], cfg.exception.as_ref().unwrap().foot_before);
    }
}
