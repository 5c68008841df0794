use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use geom::{Angle, Pt2D};

/// An arc of a circle between two points, in the shape SVG's elliptical arc command wants.
///
/// Angles follow the diagram's Y-down convention: a positive sweep turns clockwise on screen,
/// which is also the direction SVG draws when `sweep_flag` is set. So `sweep_flag` is simply
/// `sweep > 0`, and the flags can be written into a path as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircularArc {
    pub center: Pt2D,
    pub radius: f64,
    pub start: Pt2D,
    pub end: Pt2D,
    pub start_angle: Angle,
    pub end_angle: Angle,
    /// Signed rotation from start to end, in radians, within (-pi, pi].
    pub sweep: f64,
    pub sweep_flag: bool,
    pub large_arc_flag: bool,
}

impl CircularArc {
    /// The shorter arc about `center` from `start` to `end`. The radius comes from the start
    /// point; `radius_mismatch` says how far the end point strays from it. None if the start is
    /// the center.
    pub fn fit(center: Pt2D, start: Pt2D, end: Pt2D) -> Option<CircularArc> {
        CircularArc::with_radius(center, center.raw_dist_to(start), start, end)
    }

    /// Like `fit`, but with a radius given explicitly.
    pub fn with_radius(center: Pt2D, radius: f64, start: Pt2D, end: Pt2D) -> Option<CircularArc> {
        if radius <= 0.0 || start == center || end == center {
            return None;
        }
        let start_angle = center.angle_to(start);
        let end_angle = center.angle_to(end);
        let sweep = start_angle.shortest_rotation_towards(end_angle);
        Some(CircularArc {
            center,
            radius,
            start,
            end,
            start_angle,
            end_angle,
            sweep,
            sweep_flag: sweep > 0.0,
            // Never true for the shorter arc
            large_arc_flag: sweep.abs() > PI,
        })
    }

    /// How far the end point is from the circle the start point defines.
    pub fn radius_mismatch(&self) -> f64 {
        (self.center.raw_dist_to(self.end) - self.radius).abs()
    }

    /// The point `pct` of the way around the arc, on the circle of `radius`.
    pub fn point_at(&self, pct: f64) -> Pt2D {
        self.center.project_away_raw(
            self.radius,
            Angle::radians(self.start_angle.inner_radians() + pct * self.sweep),
        )
    }

    /// `n` points strictly between the endpoints, evenly spaced by angle.
    pub fn interior_points(&self, n: usize) -> Vec<Pt2D> {
        (1..=n)
            .map(|i| self.point_at(i as f64 / (n + 1) as f64))
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use geom::Distance;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    use super::*;

    #[test]
    fn quarter_turn_clockwise_on_screen() {
        let center = Pt2D::new(0.0, 0.0);
        let arc = CircularArc::fit(center, Pt2D::new(100.0, 0.0), Pt2D::new(0.0, 100.0)).unwrap();
        assert_eq!(arc.radius, 100.0);
        assert!((arc.sweep - PI / 2.0).abs() < 1e-12);
        assert!(arc.sweep_flag);
        assert!(!arc.large_arc_flag);
        assert!(arc
            .point_at(0.5)
            .approx_eq(Pt2D::new(70.710678, 70.710678), Distance::units(1e-4)));

        let back = CircularArc::fit(center, Pt2D::new(0.0, 100.0), Pt2D::new(100.0, 0.0)).unwrap();
        assert!(!back.sweep_flag);
        assert!((back.sweep + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn crossing_the_seam_takes_the_short_way() {
        let center = Pt2D::new(10.0, 10.0);
        let start = center.project_away_raw(50.0, Angle::degrees(350.0));
        let end = center.project_away_raw(50.0, Angle::degrees(10.0));
        let arc = CircularArc::fit(center, start, end).unwrap();
        assert!((arc.sweep.to_degrees() - 20.0).abs() < 1e-9);
        assert!(arc.sweep_flag);

        let interior = arc.interior_points(3);
        assert_eq!(interior.len(), 3);
        assert!(interior[1].approx_eq(
            center.project_away_raw(50.0, Angle::ZERO),
            Distance::units(1e-4)
        ));
    }

    #[test]
    fn flags_match_the_sign_of_the_turn() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let center = Pt2D::new(-3.0, 12.0);
        for _ in 0..200 {
            let radius = rng.gen_range(1.0..500.0);
            let theta1 = rng.gen_range(-360.0..360.0);
            let delta = rng.gen_range(-179.0..179.0);
            let arc = CircularArc::fit(
                center,
                center.project_away_raw(radius, Angle::degrees(theta1)),
                center.project_away_raw(radius, Angle::degrees(theta1 + delta)),
            )
            .unwrap();
            assert!(!arc.large_arc_flag);
            assert_eq!(arc.sweep_flag, delta > 0.0);
            assert!((arc.sweep.to_degrees() - delta).abs() < 1e-6);
            assert!(arc.radius_mismatch() < 1e-9);
        }
    }

    #[test]
    fn degenerate() {
        let center = Pt2D::new(0.0, 0.0);
        assert!(CircularArc::fit(center, center, Pt2D::new(1.0, 0.0)).is_none());
        assert!(CircularArc::fit(center, Pt2D::new(1.0, 0.0), center).is_none());
        let lopsided =
            CircularArc::fit(center, Pt2D::new(100.0, 0.0), Pt2D::new(0.0, 90.0)).unwrap();
        assert!((lopsided.radius_mismatch() - 10.0).abs() < 1e-9);
    }
}
