use std::collections::HashSet;
use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{Distance, Line, Polygon, Pt2D};

/// Maybe a misnomer, but like a PolyLine, but closed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    // first equals last
    pts: Vec<Pt2D>,
}

impl Ring {
    pub fn new(pts: Vec<Pt2D>) -> Result<Ring> {
        if pts.len() < 4 {
            bail!("Can't make a ring with < 4 points");
        }
        if pts[0] != *pts.last().unwrap() {
            bail!("Can't make a ring with mismatching first/last points");
        }

        if pts.windows(2).any(|pair| pair[0] == pair[1]) {
            bail!("Ring has ~dupe adjacent pts");
        }

        let result = Ring { pts };

        let mut seen_pts = HashSet::new();
        for pt in result.pts.iter().skip(1) {
            seen_pts.insert(pt.to_hashable());
        }
        if seen_pts.len() != result.pts.len() - 1 {
            bail!("Ring has repeat points: {}", result);
        }

        Ok(result)
    }

    pub fn must_new(pts: Vec<Pt2D>) -> Ring {
        Ring::new(pts).unwrap()
    }

    /// Builds a ring from an open or closed sequence of points. Consecutive points closer than
    /// `threshold` collapse into one, including the last point against the first, and then the
    /// ring is closed.
    pub fn deduped(pts: Vec<Pt2D>, threshold: Distance) -> Result<Ring> {
        let mut result: Vec<Pt2D> = Vec::with_capacity(pts.len() + 1);
        for pt in pts {
            if let Some(last) = result.last() {
                if last.approx_eq(pt, threshold) {
                    continue;
                }
            }
            result.push(pt);
        }
        while result.len() > 1 && result[0].approx_eq(*result.last().unwrap(), threshold) {
            result.pop();
        }
        if let Some(first) = result.first().cloned() {
            result.push(first);
        }
        Ring::new(result)
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn into_polygon(self) -> Polygon {
        Polygon::from_ring(self)
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts
            .windows(2)
            .filter_map(|pair| Line::new(pair[0], pair[1]))
    }

    /// Finds the first pair of non-adjacent edges that cross or touch. Returns the index of each
    /// edge (edge `i` runs from `pts[i]` to `pts[i + 1]`) and the crossing point.
    pub fn first_self_intersection(&self) -> Option<(usize, usize, Pt2D)> {
        let num_edges = self.pts.len() - 1;
        for i in 0..num_edges {
            let l1 = Line::new(self.pts[i], self.pts[i + 1])?;
            for j in (i + 2)..num_edges {
                // The first and last edges share the closing point
                if i == 0 && j == num_edges - 1 {
                    continue;
                }
                let l2 = Line::new(self.pts[j], self.pts[j + 1])?;
                if l1.crosses(&l2) {
                    if let Some(pt) = l1.intersection(&l2) {
                        return Some((i, j, pt));
                    }
                }
            }
        }
        None
    }

    pub fn is_simple(&self) -> bool {
        self.first_self_intersection().is_none()
    }

    /// Splits a ring at a self-intersection into two loops. The first keeps the ring's start; the
    /// second is the part between the crossing edges. Either may be degenerate.
    pub fn split_at_crossing(&self, i: usize, j: usize, pt: Pt2D) -> (Result<Ring>, Result<Ring>) {
        let mut outer = self.pts[0..=i].to_vec();
        outer.push(pt);
        outer.extend(self.pts[(j + 1)..].iter().cloned());

        let mut inner = vec![pt];
        inner.extend(self.pts[(i + 1)..=j].iter().cloned());

        (
            Ring::deduped(outer, crate::EPSILON_DIST),
            Ring::deduped(inner, crate::EPSILON_DIST),
        )
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Ring::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}

impl From<Ring> for geo::LineString<f64> {
    fn from(ring: Ring) -> Self {
        let coords = ring
            .pts
            .into_iter()
            .map(geo::Coordinate::from)
            .collect::<Vec<_>>();
        Self(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Pt2D> {
        raw.iter().map(|(x, y)| Pt2D::new(*x, *y)).collect()
    }

    #[test]
    fn rejects_bad_rings() {
        // Not closed
        assert!(Ring::new(pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])).is_err());
        // Repeats a point in the middle
        assert!(Ring::new(pts(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.0, 0.0)
        ]))
        .is_err());
    }

    #[test]
    fn deduped_collapses_and_closes() {
        let ring = Ring::deduped(
            pts(&[
                (0.0, 0.0),
                (10.0, 0.0),
                (10.001, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.001),
            ]),
            Distance::units(0.01),
        )
        .unwrap();
        assert_eq!(ring.points().len(), 5);
        assert_eq!(ring.points()[0], *ring.points().last().unwrap());
    }

    #[test]
    fn bowtie_crosses_itself() {
        let bowtie = Ring::must_new(pts(&[
            (0.0, 0.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]));
        let (i, j, pt) = bowtie.first_self_intersection().unwrap();
        assert_eq!((i, j), (0, 2));
        assert!(pt.approx_eq(Pt2D::new(5.0, 5.0), Distance::units(1e-4)));

        let square = Ring::must_new(pts(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]));
        assert!(square.is_simple());
    }
}
