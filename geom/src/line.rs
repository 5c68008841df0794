use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Pt2D;

/// Below this, the determinant of two directions counts as zero: the lines are parallel or
/// coincident, and there's no single crossing point.
const PARALLEL_EPSILON: f64 = 1e-10;

/// A line segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    /// Creates a line segment between two points, which must not be the same.
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Option<Line> {
        if pt1 == pt2 {
            return None;
        }
        Some(Line(pt1, pt2))
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn raw_length(&self) -> f64 {
        self.pt1().raw_dist_to(self.pt2())
    }

    /// The point `pct` of the way from pt1 to pt2. Not clamped to [0, 1].
    pub fn percent_along(&self, pct: f64) -> Pt2D {
        self.pt1().lerp(self.pt2(), pct)
    }

    /// Where do two segments cross? Returns the fraction along each segment, both in [0, 1].
    /// Parallel and coincident segments never cross; there's no single answer for them.
    pub fn intersection_params(&self, other: &Line) -> Option<(f64, f64)> {
        let (x1, y1) = (self.pt1().x(), self.pt1().y());
        let (x2, y2) = (self.pt2().x(), self.pt2().y());
        let (x3, y3) = (other.pt1().x(), other.pt1().y());
        let (x4, y4) = (other.pt2().x(), other.pt2().y());

        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
        let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some((t, u))
        } else {
            None
        }
    }

    /// Where do two segments cross?
    pub fn intersection(&self, other: &Line) -> Option<Pt2D> {
        let (t, _) = self.intersection_params(other)?;
        Some(self.percent_along(t))
    }

    /// Do the segments cross somewhere other than a shared endpoint?
    pub fn crosses(&self, other: &Line) -> bool {
        match self.intersection_params(other) {
            Some((t, u)) => {
                let at_end = |x: f64| x <= PARALLEL_EPSILON || x >= 1.0 - PARALLEL_EPSILON;
                !(at_end(t) && at_end(u))
            }
            None => false,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Line::new(")?;
        writeln!(f, "  Pt2D::new({}, {}),", self.0.x(), self.0.y())?;
        writeln!(f, "  Pt2D::new({}, {}),", self.1.x(), self.1.y())?;
        write!(f, ")")
    }
}
