use serde::{Deserialize, Serialize};

use geom::{CubicBezier, Pt2D};

use crate::sample::{is_closed, sample_params};
use crate::Curve;

/// Searching for a point's parameter on a ring starts with this many samples.
const LOCATE_SAMPLES: usize = 1000;
/// A point further than this from every sample isn't on the ring.
pub const LOCATE_TOLERANCE: f64 = 20.0;
/// Ring samples between the endpoints used to fit the cubic.
const FIT_SAMPLES: usize = 20;
/// Matched samples on the cubic and the ring when measuring the error.
const VALIDATION_SAMPLES: usize = 10;
/// Samples used to measure the ring segment's length.
const LENGTH_SAMPLES: usize = 100;

/// A cubic Bezier approximating a piece of a ring, for lightweight rendering. It's never used
/// as geometric truth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicCurveApprox {
    pub curve: CubicBezier,
    pub report: FitReport,
}

/// How well a cubic follows the ring it approximates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Root mean square distance between matched samples.
    pub rms_error: f64,
    /// Length of the ring segment.
    pub arc_length: f64,
    /// `rms_error` as a percentage of `arc_length`.
    pub error_pct: f64,
}

/// A stretch of a ring's parameter space, maybe wrapping past the seam of a closed ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpan {
    start: f64,
    /// Signed; the end is at `start + delta`, taken modulo 1 for closed rings.
    delta: f64,
    closed: bool,
}

impl ParamSpan {
    /// For closed rings, goes the shorter way around. For open rings, goes directly, in
    /// whichever direction that is.
    pub fn between(start: f64, end: f64, closed: bool) -> ParamSpan {
        let delta = if closed {
            let forwards = (end - start).rem_euclid(1.0);
            if forwards <= 0.5 {
                forwards
            } else {
                forwards - 1.0
            }
        } else {
            end - start
        };
        ParamSpan {
            start,
            delta,
            closed,
        }
    }

    /// The ring parameter `pct` of the way along the span.
    pub fn param(&self, pct: f64) -> f64 {
        let t = self.start + pct * self.delta;
        if self.closed {
            let wrapped = t.rem_euclid(1.0);
            // Keep the very end of a span finishing exactly at the seam on 1.0, not 0.0
            if wrapped == 0.0 && t > 0.0 {
                1.0
            } else {
                wrapped
            }
        } else {
            t
        }
    }

    /// `n` evenly spaced ring parameters from start to end inclusive.
    pub fn params(&self, n: usize) -> Vec<f64> {
        sample_params(n)
            .into_iter()
            .map(|pct| self.param(pct))
            .collect()
    }
}

/// Finds the parameter of the ring point nearest `pt`, first by coarse sampling, then refined
/// locally. None if `pt` is more than `tolerance` from every sample.
pub fn locate_param(ring: &dyn Curve, pt: Pt2D, tolerance: f64) -> Option<f64> {
    let params = sample_params(LOCATE_SAMPLES);
    let (best_t, best_dist) = params
        .iter()
        .map(|t| (*t, ring.point_at(*t).raw_dist_to(pt)))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    if best_dist >= tolerance {
        return None;
    }

    // Ternary search within one sample step either side. Distance is unimodal this close in.
    let step = 1.0 / (LOCATE_SAMPLES - 1) as f64;
    let mut lo = (best_t - step).max(0.0);
    let mut hi = (best_t + step).min(1.0);
    for _ in 0..50 {
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        if ring.point_at(m1).raw_dist_to(pt) < ring.point_at(m2).raw_dist_to(pt) {
            hi = m2;
        } else {
            lo = m1;
        }
    }
    Some((lo + hi) / 2.0)
}

/// Approximates the piece of `ring` between two points on it with a cubic. None if either point
/// isn't near the ring, or the piece is degenerate.
pub fn fit_ring_segment(ring: &dyn Curve, start: Pt2D, end: Pt2D) -> Option<CubicCurveApprox> {
    let start_t = locate_param(ring, start, LOCATE_TOLERANCE)?;
    let end_t = locate_param(ring, end, LOCATE_TOLERANCE)?;
    let span = ParamSpan::between(start_t, end_t, is_closed(ring));

    let pts: Vec<Pt2D> = span
        .params(FIT_SAMPLES)
        .into_iter()
        .map(|t| ring.point_at(t))
        .collect();
    let curve = CubicBezier::fit_through(&pts)?;
    let report = validate(ring, &curve, &span);
    Some(CubicCurveApprox { curve, report })
}

/// Compares a cubic against the ring at matching parameters. This is only a diagnostic.
pub fn validate(ring: &dyn Curve, curve: &CubicBezier, span: &ParamSpan) -> FitReport {
    let ring_pts: Vec<Pt2D> = span
        .params(VALIDATION_SAMPLES)
        .into_iter()
        .map(|t| ring.point_at(t))
        .collect();
    let curve_pts = curve.sample(VALIDATION_SAMPLES);
    let sum_sq: f64 = ring_pts
        .iter()
        .zip(curve_pts.iter())
        .map(|(pt1, pt2)| pt1.raw_dist_to(*pt2).powi(2))
        .sum();
    let rms_error = (sum_sq / VALIDATION_SAMPLES as f64).sqrt();

    let arc_length: f64 = span
        .params(LENGTH_SAMPLES)
        .windows(2)
        .map(|pair| ring.point_at(pair[0]).raw_dist_to(ring.point_at(pair[1])))
        .sum();
    let error_pct = if arc_length > 0.0 {
        100.0 * rms_error / arc_length
    } else {
        0.0
    };
    FitReport {
        rms_error,
        arc_length,
        error_pct,
    }
}

#[cfg(test)]
mod tests {
    use geom::{Angle, Distance};

    use super::*;
    use crate::{CircleCurve, PolyLineCurve};

    #[test]
    fn spans_wrap_the_short_way() {
        let span = ParamSpan::between(0.95, 0.05, true);
        assert!((span.param(0.5) - 0.0).abs() < 1e-12 || (span.param(0.5) - 1.0).abs() < 1e-12);
        assert!((span.param(0.25) - 0.975).abs() < 1e-12);
        assert!((span.param(1.0) - 0.05).abs() < 1e-12);

        let backwards = ParamSpan::between(0.05, 0.95, true);
        assert!((backwards.param(0.25) - 0.025).abs() < 1e-12);

        let open = ParamSpan::between(0.8, 0.2, false);
        assert!((open.param(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(open.params(4).len(), 4);
    }

    #[test]
    fn locates_points_precisely() {
        let ring = CircleCurve::full(Pt2D::new(0.0, 0.0), 300.0).unwrap();
        let pt = ring.point_at(0.123456);
        let t = locate_param(&ring, pt, LOCATE_TOLERANCE).unwrap();
        assert!((t - 0.123456).abs() < 1e-6);
        assert!(locate_param(&ring, Pt2D::new(0.0, 0.0), LOCATE_TOLERANCE).is_none());
    }

    #[test]
    fn circle_segments_fit_closely() {
        let center = Pt2D::new(622.5, 272.04);
        let ring = CircleCurve::full(center, 400.0).unwrap();
        // 2:30 to 2:45 and 2:45 to 3:00, the second ending on the ring's seam
        for (from, to) in [(345.0, 352.5), (352.5, 360.0), (352.5, 7.5), (90.0, 75.0)] {
            let start = center.project_away_raw(400.0, Angle::degrees(from));
            let end = center.project_away_raw(400.0, Angle::degrees(to));
            let approx = fit_ring_segment(&ring, start, end).unwrap();
            assert!(approx.curve.start.approx_eq(start, Distance::units(1e-3)));
            assert!(approx.curve.end.approx_eq(end, Distance::units(1e-3)));
            assert!(
                approx.report.error_pct < 2.0,
                "{} to {}: {:?}",
                from,
                to,
                approx.report
            );
            let expected_len = 400.0 * ((to - from) as f64).abs().min(15.0).to_radians();
            assert!((approx.report.arc_length - expected_len).abs() < 0.5);
        }
    }

    #[test]
    fn polyline_rings_fit_too() {
        // A closed square-ish polygon is still a ring, just not a round one
        let ring = PolyLineCurve::new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(100.0, 0.0),
            Pt2D::new(100.0, 100.0),
            Pt2D::new(0.0, 100.0),
            Pt2D::new(0.0, 0.0),
        ])
        .unwrap();
        let approx = fit_ring_segment(&ring, Pt2D::new(20.0, 0.0), Pt2D::new(80.0, 0.0)).unwrap();
        assert!(approx.report.rms_error < 1e-6);
        assert!((approx.report.arc_length - 60.0).abs() < 1e-6);

        assert!(fit_ring_segment(&ring, Pt2D::new(50.0, 50.0), Pt2D::new(80.0, 0.0)).is_none());
    }
}
