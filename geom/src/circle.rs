use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Line, Pt2D};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Pt2D,
    pub radius: Distance,
}

impl Circle {
    pub fn new(center: Pt2D, radius: Distance) -> Circle {
        Circle { center, radius }
    }

    /// The point on the circumference in some direction from the center.
    pub fn point_at_angle(&self, angle: Angle) -> Pt2D {
        self.center
            .project_away_raw(self.radius.inner_units(), angle)
    }

    /// Where does a segment hit the circumference? Returns the fraction along the segment of each
    /// hit, in increasing order. A tangent segment counts as one hit.
    pub fn line_intersection_params(&self, line: &Line) -> Vec<f64> {
        let dx = line.pt2().x() - line.pt1().x();
        let dy = line.pt2().y() - line.pt1().y();
        let fx = line.pt1().x() - self.center.x();
        let fy = line.pt1().y() - self.center.y();
        let r = self.radius.inner_units();

        let a = dx * dx + dy * dy;
        let b = 2.0 * (fx * dx + fy * dy);
        let c = fx * fx + fy * fy - r * r;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 || a == 0.0 {
            return Vec::new();
        }

        let sqrt = discriminant.sqrt();
        let mut hits = Vec::new();
        for t in [(-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a)] {
            if (0.0..=1.0).contains(&t) && !hits.contains(&t) {
                hits.push(t);
            }
        }
        hits
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Circle({}, {})", self.center, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_through_the_middle_hits_twice() {
        let circle = Circle::new(Pt2D::new(0.0, 0.0), Distance::units(10.0));
        let line = Line::new(Pt2D::new(-20.0, 0.0), Pt2D::new(20.0, 0.0)).unwrap();
        let hits = circle.line_intersection_params(&line);
        assert_eq!(hits.len(), 2);
        assert!((hits[0] - 0.25).abs() < 1e-12);
        assert!((hits[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn segment_starting_inside_hits_once() {
        let circle = Circle::new(Pt2D::new(5.0, 5.0), Distance::units(10.0));
        let line = Line::new(Pt2D::new(5.0, 5.0), Pt2D::new(5.0, 25.0)).unwrap();
        let hits = circle.line_intersection_params(&line);
        assert_eq!(hits, vec![0.5]);
        assert!(line
            .percent_along(hits[0])
            .approx_eq(Pt2D::new(5.0, 15.0), Distance::units(1e-4)));
    }

    #[test]
    fn misses_and_angles() {
        let circle = Circle::new(Pt2D::new(0.0, 0.0), Distance::units(10.0));
        let line = Line::new(Pt2D::new(-20.0, 11.0), Pt2D::new(20.0, 11.0)).unwrap();
        assert!(circle.line_intersection_params(&line).is_empty());

        // Y points down, so 90 degrees is straight down the screen
        assert!(circle
            .point_at_angle(Angle::degrees(90.0))
            .approx_eq(Pt2D::new(0.0, 10.0), Distance::units(1e-4)));
    }
}
