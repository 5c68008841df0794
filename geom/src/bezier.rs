use serde::{Deserialize, Serialize};

use crate::Pt2D;

/// A cubic Bezier curve: a start point, two control points, and an end point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: Pt2D,
    pub control1: Pt2D,
    pub control2: Pt2D,
    pub end: Pt2D,
}

impl CubicBezier {
    pub fn new(start: Pt2D, control1: Pt2D, control2: Pt2D, end: Pt2D) -> CubicBezier {
        CubicBezier {
            start,
            control1,
            control2,
            end,
        }
    }

    /// B(t) = (1-t)^3 P0 + 3(1-t)^2 t P1 + 3(1-t) t^2 P2 + t^3 P3, with t in [0, 1]
    pub fn point_at(&self, t: f64) -> Pt2D {
        let [b0, b1, b2, b3] = basis(t);
        Pt2D::new(
            b0 * self.start.x() + b1 * self.control1.x() + b2 * self.control2.x() + b3 * self.end.x(),
            b0 * self.start.y() + b1 * self.control1.y() + b2 * self.control2.y() + b3 * self.end.y(),
        )
    }

    /// `n` points at evenly spaced parameters, including both endpoints.
    pub fn sample(&self, n: usize) -> Vec<Pt2D> {
        let n = n.max(2);
        (0..n)
            .map(|i| self.point_at(i as f64 / (n - 1) as f64))
            .collect()
    }

    /// Least-squares fit through a sequence of points. The endpoints are pinned to the first and
    /// last point, and only the control points move. Each point gets a parameter proportional to
    /// the chord length travelled so far. Returns None if the points don't go anywhere.
    pub fn fit_through(pts: &[Pt2D]) -> Option<CubicBezier> {
        if pts.len() < 2 {
            return None;
        }
        let start = pts[0];
        let end = *pts.last().unwrap();

        let mut params = Vec::with_capacity(pts.len());
        let mut so_far = 0.0;
        params.push(0.0);
        for pair in pts.windows(2) {
            so_far += pair[0].raw_dist_to(pair[1]);
            params.push(so_far);
        }
        if so_far == 0.0 {
            return None;
        }

        // Normal equations for the two free control points, solved once per axis
        let (mut c11, mut c12, mut c22) = (0.0, 0.0, 0.0);
        let (mut x1, mut y1, mut x2, mut y2) = (0.0, 0.0, 0.0, 0.0);
        for (pt, dist) in pts.iter().zip(params.iter()) {
            let [b0, b1, b2, b3] = basis(dist / so_far);
            c11 += b1 * b1;
            c12 += b1 * b2;
            c22 += b2 * b2;
            let rx = pt.x() - b0 * start.x() - b3 * end.x();
            let ry = pt.y() - b0 * start.y() - b3 * end.y();
            x1 += b1 * rx;
            y1 += b1 * ry;
            x2 += b2 * rx;
            y2 += b2 * ry;
        }

        let det = c11 * c22 - c12 * c12;
        if det.abs() < 1e-12 {
            // Too few points to pin down the shape; fall back to a straight line
            return Some(CubicBezier::new(
                start,
                start.lerp(end, 1.0 / 3.0),
                start.lerp(end, 2.0 / 3.0),
                end,
            ));
        }
        let control1 = Pt2D::maybe_new((c22 * x1 - c12 * x2) / det, (c22 * y1 - c12 * y2) / det)?;
        let control2 = Pt2D::maybe_new((c11 * x2 - c12 * x1) / det, (c11 * y2 - c12 * y1) / det)?;
        Some(CubicBezier::new(start, control1, control2, end))
    }
}

fn basis(t: f64) -> [f64; 4] {
    let mt = 1.0 - t;
    [mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t]
}
