//! Uniform sampling of curves. Everything that searches along a curve goes through here.

use anyhow::{bail, Result};

use geom::{Pt2D, EPSILON_DIST};

use crate::Curve;

/// Coarse searches, like checking that a curve draws anything at all.
pub const COARSE_SAMPLES: usize = 200;
/// Fine searches along a ring, for intersections and arc endpoints.
pub const FINE_SAMPLES: usize = 2000;

/// Evaluates a curve at `n` evenly spaced parameters over [0, 1], including both ends.
pub fn sample(curve: &dyn Curve, n: usize) -> Result<Vec<Pt2D>> {
    if n < 2 {
        bail!("Need at least 2 samples of a curve, not {}", n);
    }
    Ok(sample_params(n)
        .into_iter()
        .map(|t| curve.point_at(t))
        .collect())
}

/// The `n` evenly spaced parameters `sample` uses.
pub fn sample_params(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
}

/// Does the curve end where it starts?
pub fn is_closed(curve: &dyn Curve) -> bool {
    curve
        .point_at(0.0)
        .approx_eq(curve.point_at(1.0), EPSILON_DIST)
}

/// Fails if a curve can't be used as geometry: every coarse sample lands on the same point.
pub fn check_drawable(curve: &dyn Curve) -> Result<()> {
    let pts = sample(curve, COARSE_SAMPLES)?;
    if pts.iter().all(|pt| pt.approx_eq(pts[0], EPSILON_DIST)) {
        bail!("{:?} doesn't go anywhere; all samples are at {}", curve, pts[0]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CircleCurve, PolyLineCurve};

    #[test]
    fn samples_include_both_ends() {
        let line = PolyLineCurve::new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)]).unwrap();
        let pts = sample(&line, 11).unwrap();
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0], Pt2D::new(0.0, 0.0));
        assert_eq!(pts[10], Pt2D::new(10.0, 0.0));
        assert!(pts[3].approx_eq(Pt2D::new(3.0, 0.0), EPSILON_DIST));

        assert!(sample(&line, 1).is_err());
        assert!(!is_closed(&line));
        check_drawable(&line).unwrap();
    }

    #[test]
    fn circles_are_closed() {
        let circle = CircleCurve::full(Pt2D::new(5.0, 5.0), 3.0).unwrap();
        assert!(is_closed(&circle));
        assert_eq!(sample(&circle, FINE_SAMPLES).unwrap().len(), FINE_SAMPLES);
    }
}
