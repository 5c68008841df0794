use std::fmt;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{Angle, Distance};

/// A point in diagram space. Unlike `Distance`, coordinates aren't trimmed; intersection
/// resolution needs sub-1e-4 precision to land exactly on ideal radial lines.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        if !x.is_finite() || !y.is_finite() {
            panic!("Bad Pt2D {}, {}", x, y);
        }

        Pt2D { x, y }
    }

    /// Like `new`, but returns None for NaN or infinite coordinates.
    pub fn maybe_new(x: f64, y: f64) -> Option<Pt2D> {
        if x.is_finite() && y.is_finite() {
            Some(Pt2D { x, y })
        } else {
            None
        }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    /// Is this point within an epsilon of the other point?
    pub fn approx_eq(self, other: Pt2D, threshold: Distance) -> bool {
        self.raw_dist_to(other) <= threshold.inner_units()
    }

    /// The point `dist` away in direction `theta`.
    pub fn project_away_raw(self, dist: f64, theta: Angle) -> Pt2D {
        let (sin, cos) = theta.inner_radians().sin_cos();
        Pt2D::new(self.x() + dist * cos, self.y() + dist * sin)
    }

    /// The angle from this point to another, as seen in diagram space (Y down).
    pub fn angle_to(self, to: Pt2D) -> Angle {
        // DON'T invert y here
        Angle::radians((to.y() - self.y()).atan2(to.x() - self.x()))
    }

    /// The untrimmed euclidean distance.
    pub fn raw_dist_to(self, to: Pt2D) -> f64 {
        ((self.x() - to.x()).powi(2) + (self.y() - to.y()).powi(2)).sqrt()
    }

    pub fn midpoint(self, other: Pt2D) -> Pt2D {
        Pt2D::new((self.x() + other.x()) / 2.0, (self.y() + other.y()) / 2.0)
    }

    /// Linear interpolation; pct 0 is self, 1 is other.
    pub fn lerp(self, other: Pt2D, pct: f64) -> Pt2D {
        Pt2D::new(
            self.x() + pct * (other.x() - self.x()),
            self.y() + pct * (other.y() - self.y()),
        )
    }

    pub fn to_hashable(self) -> HashablePt2D {
        HashablePt2D::new(self.x(), self.y())
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x(), self.y())
    }
}

impl From<Pt2D> for geo::Coordinate<f64> {
    fn from(pt: Pt2D) -> Self {
        geo::Coordinate { x: pt.x, y: pt.y }
    }
}

impl From<Pt2D> for geo::Point<f64> {
    fn from(pt: Pt2D) -> Self {
        geo::Point::new(pt.x, pt.y)
    }
}

impl From<geo::Coordinate<f64>> for Pt2D {
    fn from(coord: geo::Coordinate<f64>) -> Self {
        Pt2D::new(coord.x, coord.y)
    }
}

/// This isn't opinionated about what the (x, y) represents. Useful to dedupe points.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HashablePt2D {
    x_nan: NotNan<f64>,
    y_nan: NotNan<f64>,
}

impl HashablePt2D {
    fn new(x: f64, y: f64) -> HashablePt2D {
        // Pt2D guarantees finite coordinates
        HashablePt2D {
            x_nan: NotNan::new(x).unwrap(),
            y_nan: NotNan::new(y).unwrap(),
        }
    }
}
