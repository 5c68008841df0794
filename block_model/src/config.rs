use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::Pt2D;

use crate::ClockTime;

/// Everything that shapes one diagram. The default describes the reference diagram: 12 rings
/// around a notched innermost ring, half-hour rows out to F and quarter-hour rows beyond.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// All angles and radii are measured from here.
    pub center: Pt2D,
    /// Innermost first.
    pub ring_order: Vec<String>,
    /// Index into `ring_order` of the ring where quarter-hour rows begin. This ring bounds both
    /// the last inner row and the first outer row.
    pub outer_rows_start: usize,
    /// Radials bounding inner rows, in clockwise order.
    pub inner_times: Vec<ClockTime>,
    /// Radials bounding outer rows, in clockwise order.
    pub outer_times: Vec<ClockTime>,
    /// Distances within this are "on" a curve.
    pub tolerance: f64,
    /// Blocks smaller than this after repair are discarded.
    pub min_block_area: f64,
    /// How much longer the radials between the first two rings should be than the radials
    /// between other inner rings. Only used for diagnostics.
    pub expected_radial_ratio: f64,
    /// Interior points per ring arc when a block's outline is densified.
    pub arc_outline_points: usize,
    /// Radials generated for missing labels run this far out from the center.
    pub synthetic_radial_length: f64,
    pub exception: Option<ExceptionConfig>,
}

/// Near one radial, the innermost row is cut by an auxiliary ring. The two blocks touching that
/// radial splice an arc of the auxiliary ring into their boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExceptionConfig {
    /// The inner ring of the affected row.
    pub ring: String,
    /// The radial both exception blocks touch.
    pub singularity: ClockTime,
    /// Where the auxiliary ring crosses the singularity radial.
    pub apex: Pt2D,
    /// Where the auxiliary ring meets `ring`, on the side before the singularity.
    pub foot_before: Pt2D,
    /// Where the auxiliary ring meets `ring`, on the side after the singularity.
    pub foot_after: Pt2D,
}

impl Default for DiagramConfig {
    fn default() -> DiagramConfig {
        let t = |hour, minute| ClockTime::new(hour, minute).unwrap();
        DiagramConfig {
            center: Pt2D::new(622.5, 272.04),
            ring_order: vec![
                "Esplanade", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K",
            ]
            .into_iter()
            .map(|r| r.to_string())
            .collect(),
            outer_rows_start: 6,
            inner_times: ClockTime::range(t(2, 0), t(10, 0), 30),
            outer_times: ClockTime::range(t(2, 0), t(10, 0), 15),
            tolerance: 5.0,
            min_block_area: 0.1,
            expected_radial_ratio: 2.0,
            arc_outline_points: 9,
            synthetic_radial_length: 600.0,
            exception: Some(ExceptionConfig {
                ring: "Esplanade".to_string(),
                singularity: t(6, 0),
                apex: Pt2D::new(622.5, 475.9),
                foot_before: Pt2D::new(681.0, 489.9),
                foot_after: Pt2D::new(564.0, 489.9),
            }),
        }
    }
}

impl DiagramConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ring_order.len() < 2 {
            bail!("Need at least two rings, got {:?}", self.ring_order);
        }
        if self.outer_rows_start >= self.ring_order.len() {
            bail!(
                "outer_rows_start {} is past the {} rings",
                self.outer_rows_start,
                self.ring_order.len()
            );
        }
        for (name, times) in [("inner", &self.inner_times), ("outer", &self.outer_times)] {
            if times.windows(2).any(|pair| pair[0] >= pair[1]) {
                bail!("{}_times must be strictly increasing: {:?}", name, times);
            }
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            bail!("tolerance must be positive, not {}", self.tolerance);
        }
        if let Some(ref exception) = self.exception {
            if !self.ring_order.contains(&exception.ring) {
                bail!("Exception ring {} isn't in ring_order", exception.ring);
            }
        }
        Ok(())
    }

    /// Pairs of adjacent rings bounding half-hour rows, innermost first.
    pub fn inner_ring_pairs(&self) -> Vec<(&str, &str)> {
        if self.ring_order.is_empty() {
            return Vec::new();
        }
        let end = self.outer_rows_start.min(self.ring_order.len() - 1);
        adjacent_pairs(&self.ring_order[0..=end])
    }

    /// Pairs of adjacent rings bounding quarter-hour rows, innermost first.
    pub fn outer_ring_pairs(&self) -> Vec<(&str, &str)> {
        if self.outer_rows_start >= self.ring_order.len() {
            return Vec::new();
        }
        adjacent_pairs(&self.ring_order[self.outer_rows_start..])
    }

    /// Does this ring bound any quarter-hour row? Those rings are resolved against secondary
    /// radials too.
    pub fn bounds_outer_row(&self, ring: &str) -> bool {
        self.ring_order
            .iter()
            .position(|r| r == ring)
            .map(|idx| idx >= self.outer_rows_start)
            .unwrap_or(false)
    }

    /// How many blocks a complete diagram produces.
    pub fn target_block_count(&self) -> usize {
        let blocks_per_row = |times: &Vec<ClockTime>| times.len().saturating_sub(1);
        self.inner_ring_pairs().len() * blocks_per_row(&self.inner_times)
            + self.outer_ring_pairs().len() * blocks_per_row(&self.outer_times)
    }

    /// Every time some row needs a radial for, sorted and deduplicated.
    pub fn all_times(&self) -> Vec<ClockTime> {
        let mut times = self.inner_times.clone();
        times.extend(self.outer_times.iter().cloned());
        times.sort();
        times.dedup();
        times
    }
}

fn adjacent_pairs(rings: &[String]) -> Vec<(&str, &str)> {
    rings
        .windows(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect()
}
