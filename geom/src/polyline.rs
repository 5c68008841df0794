use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{Line, Pt2D};

/// A sequence of connected line segments. Parametrized by arc length: `point_at_pct(0.0)` is the
/// first point, `point_at_pct(1.0)` the last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pt2D>", into = "Vec<Pt2D>")]
pub struct PolyLine {
    pts: Vec<Pt2D>,
    // Cumulative distance to each point, so lookups by percent are a binary search
    cumulative: Vec<f64>,
}

impl PolyLine {
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLine> {
        if pts.len() < 2 {
            bail!("Need at least two points for a PolyLine");
        }
        if pts.windows(2).any(|pair| pair[0] == pair[1]) {
            bail!("PolyLine has ~dupe adjacent pts");
        }
        Ok(PolyLine::unchecked_new(pts))
    }

    pub fn must_new(pts: Vec<Pt2D>) -> PolyLine {
        PolyLine::new(pts).unwrap()
    }

    /// Doesn't check for duplicate adjacent points. Zero-length segments are skipped when
    /// intersecting.
    pub fn unchecked_new(pts: Vec<Pt2D>) -> PolyLine {
        assert!(pts.len() >= 2);
        let mut cumulative = Vec::with_capacity(pts.len());
        let mut so_far = 0.0;
        cumulative.push(0.0);
        for pair in pts.windows(2) {
            so_far += pair[0].raw_dist_to(pair[1]);
            cumulative.push(so_far);
        }
        PolyLine { pts, cumulative }
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    fn raw_length(&self) -> f64 {
        *self.cumulative.last().unwrap()
    }

    /// Zero-length segments are skipped.
    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts
            .windows(2)
            .filter_map(|pair| Line::new(pair[0], pair[1]))
    }

    /// The point at a fraction of the total length. `pct` is clamped to [0, 1].
    pub fn point_at_pct(&self, pct: f64) -> Pt2D {
        let pct = pct.clamp(0.0, 1.0);
        let total = self.raw_length();
        if total == 0.0 {
            return self.first_pt();
        }
        let target = pct * total;
        // The first cumulative distance >= target ends the segment containing it
        let idx = match self
            .cumulative
            .binary_search_by(|d| d.total_cmp(&target))
        {
            Ok(idx) => return self.pts[idx],
            Err(idx) => idx.min(self.pts.len() - 1).max(1),
        };
        let seg_start = self.cumulative[idx - 1];
        let seg_len = self.cumulative[idx] - seg_start;
        if seg_len == 0.0 {
            return self.pts[idx];
        }
        self.pts[idx - 1].lerp(self.pts[idx], (target - seg_start) / seg_len)
    }

    /// Every place where this polyline crosses the other, as (pct along self, pct along other).
    /// Sorted by the position along self. Segments that overlap without a single crossing point
    /// are ignored.
    pub fn intersection_params(&self, other: &PolyLine) -> Vec<(f64, f64)> {
        let self_total = self.raw_length();
        let other_total = other.raw_length();
        if self_total == 0.0 || other_total == 0.0 {
            return Vec::new();
        }

        let mut hits = Vec::new();
        let mut self_dist = 0.0;
        for l1 in self.lines() {
            let len1 = l1.raw_length();
            let mut other_dist = 0.0;
            for l2 in other.lines() {
                let len2 = l2.raw_length();
                if let Some((t, u)) = l1.intersection_params(&l2) {
                    hits.push((
                        (self_dist + t * len1) / self_total,
                        (other_dist + u * len2) / other_total,
                    ));
                }
                other_dist += len2;
            }
            self_dist += len1;
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        // A crossing exactly at a shared vertex gets reported by both segments
        hits.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-12 && (a.1 - b.1).abs() < 1e-12);
        hits
    }
}

impl TryFrom<Vec<Pt2D>> for PolyLine {
    type Error = anyhow::Error;

    fn try_from(pts: Vec<Pt2D>) -> Result<PolyLine> {
        PolyLine::new(pts)
    }
}

impl From<PolyLine> for Vec<Pt2D> {
    fn from(pl: PolyLine) -> Vec<Pt2D> {
        pl.pts
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}
