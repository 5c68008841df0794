use std::fmt;

use geo::Area;
use serde::{Deserialize, Serialize};

use crate::{Pt2D, Ring};

/// Untangling a ring recurses once per crossing; real outlines have a handful at most.
const MAX_REPAIR_DEPTH: usize = 16;

/// A simple polygon without holes, defined by its outer ring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    outer: Ring,
}

impl Polygon {
    pub fn from_ring(outer: Ring) -> Polygon {
        Polygon { outer }
    }

    /// The outer ring, with the first point repeated at the end.
    pub fn points(&self) -> &Vec<Pt2D> {
        self.outer.points()
    }

    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
    }

    /// True if no edges cross or touch, besides neighbors sharing a point.
    pub fn is_simple(&self) -> bool {
        self.outer.is_simple()
    }

    /// Simple and enclosing some area.
    pub fn is_valid(&self) -> bool {
        self.is_simple() && self.area() > 0.0
    }

    /// Tries to turn an invalid polygon into a valid one. Self-intersecting outlines get split at
    /// each crossing, and the loop with the largest area wins. The smaller lobes are dropped, not
    /// unioned back in the way a zero-distance buffer would keep them. Returns None if nothing
    /// valid is left.
    pub fn repair(&self) -> Option<Polygon> {
        untangle(self.outer.clone(), 0).map(Polygon::from_ring)
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        let pts = self
            .points()
            .iter()
            .map(|pt| vec![pt.x(), pt.y()])
            .collect::<Vec<_>>();
        geojson::Geometry::new(geojson::Value::Polygon(vec![pts]))
    }

    // A less verbose way of invoking the From/Into impl. Note this hides a potentially expensive
    // clone.
    fn to_geo(&self) -> geo::Polygon<f64> {
        self.clone().into()
    }
}

fn untangle(ring: Ring, depth: usize) -> Option<Ring> {
    let (i, j, pt) = match ring.first_self_intersection() {
        Some(crossing) => crossing,
        None => {
            if Polygon::from_ring(ring.clone()).area() > 0.0 {
                return Some(ring);
            }
            return None;
        }
    };
    if depth == MAX_REPAIR_DEPTH {
        return None;
    }

    let (first, second) = ring.split_at_crossing(i, j, pt);
    [first, second]
        .into_iter()
        .filter_map(|result| result.ok())
        .filter_map(|piece| untangle(piece, depth + 1))
        .map(|piece| {
            let area = Polygon::from_ring(piece.clone()).area();
            (piece, area)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(piece, _)| piece)
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Polygon with {} points", self.points().len())?;
        for (idx, pt) in self.points().iter().enumerate() {
            writeln!(f, "  {}: {}", idx, pt)?;
        }
        Ok(())
    }
}

impl From<Polygon> for geo::Polygon<f64> {
    fn from(poly: Polygon) -> Self {
        Self::new(poly.outer.into(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(raw: &[(f64, f64)]) -> Ring {
        Ring::must_new(raw.iter().map(|(x, y)| Pt2D::new(*x, *y)).collect())
    }

    #[test]
    fn square_basics() {
        let square = ring(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ])
        .into_polygon();
        assert_eq!(square.area(), 100.0);
        assert!(square.is_valid());
        assert_eq!(square.repair(), Some(square.clone()));
    }

    #[test]
    fn repair_keeps_the_bigger_loop() {
        // A figure eight with one lobe much larger than the other
        let figure_eight = ring(&[
            (0.0, 0.0),
            (20.0, 22.0),
            (22.0, 20.0),
            (0.0, 2.0),
            (0.0, 0.0),
        ])
        .into_polygon();
        assert!(!figure_eight.is_simple());
        assert!(!figure_eight.is_valid());

        let fixed = figure_eight.repair().unwrap();
        assert!(fixed.is_valid());
        assert!(fixed.points().contains(&Pt2D::new(20.0, 22.0)));
        assert!(!fixed.points().contains(&Pt2D::new(0.0, 2.0)));
        // The small lobe has an area around 7; the big one around 27
        assert!(fixed.area() > 20.0 && fixed.area() < 30.0);
    }

    #[test]
    fn geojson_is_closed() {
        let tri = ring(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0), (0.0, 0.0)]).into_polygon();
        match tri.to_geojson().value {
            geojson::Value::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 4);
                assert_eq!(rings[0][0], rings[0][3]);
            }
            other => panic!("Unexpected {:?}", other),
        }
        assert_eq!(tri.area(), 6.0);
    }
}
