use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Block, BlockKind, DiagramConfig, IntersectionCache, Tier};

/// Radial ratios further than this fraction from the expected value get a warning.
const RADIAL_RATIO_SLACK: f64 = 0.1;
/// Cubic fits worse than this percentage of the arc length get a warning.
const FIT_WARNING_PCT: f64 = 2.0;

/// Sanity checks on a finished block set. These only report; they never change the blocks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub target_blocks: usize,
    pub total_blocks: usize,
    pub skipped_blocks: usize,
    /// Blocks whose outline had to be repaired.
    pub repaired_blocks: usize,
    pub blocks_per_kind: BTreeMap<String, usize>,
    /// Average radial length between the innermost two rings, divided by the average in other
    /// inner rows. None if either row is empty.
    pub radial_ratio: Option<f64>,
    pub expected_radial_ratio: f64,
    pub avg_fit_rms: Option<f64>,
    pub worst_fit_pct: Option<f64>,
    pub tier_counts: BTreeMap<Tier, usize>,
}

impl Diagnostics {
    pub fn compute(
        blocks: &[Block],
        skipped_blocks: usize,
        repaired_blocks: usize,
        cache: &IntersectionCache,
        cfg: &DiagramConfig,
    ) -> Diagnostics {
        let mut blocks_per_kind = BTreeMap::new();
        for b in blocks {
            let kind = match b.kind {
                BlockKind::Inner => "inner",
                BlockKind::Outer => "outer",
                BlockKind::Exception(_) => "exception",
            };
            *blocks_per_kind.entry(kind.to_string()).or_insert(0) += 1;
        }

        let (avg_fit_rms, worst_fit_pct) = fit_summary(blocks);
        Diagnostics {
            target_blocks: cfg.target_block_count(),
            total_blocks: blocks.len(),
            skipped_blocks,
            repaired_blocks,
            blocks_per_kind,
            radial_ratio: radial_ratio(blocks, cfg),
            expected_radial_ratio: cfg.expected_radial_ratio,
            avg_fit_rms,
            worst_fit_pct,
            tier_counts: cache.tier_counts(),
        }
    }

    pub fn log(&self) {
        if self.total_blocks == self.target_blocks {
            info!("Built all {} blocks", self.total_blocks);
        } else {
            warn!(
                "Built {} blocks, but expected {} ({} skipped)",
                self.total_blocks, self.target_blocks, self.skipped_blocks
            );
        }
        for (kind, count) in &self.blocks_per_kind {
            info!("  {} {} blocks", count, kind);
        }
        if self.repaired_blocks > 0 {
            info!("  {} outlines needed repair", self.repaired_blocks);
        }

        for (tier, count) in &self.tier_counts {
            info!("  {} intersections by {}", count, tier);
        }

        if let Some(ratio) = self.radial_ratio {
            if self.radial_ratio_ok() {
                info!(
                    "Innermost radials are {:.2}x as long as other inner radials",
                    ratio
                );
            } else {
                warn!(
                    "Innermost radials are {:.2}x as long as other inner radials, but should be \
                     about {:.2}x. The input diagram may be off.",
                    ratio, self.expected_radial_ratio
                );
            }
        }

        if let (Some(rms), Some(worst)) = (self.avg_fit_rms, self.worst_fit_pct) {
            if worst > FIT_WARNING_PCT {
                warn!(
                    "Cubic fits: average RMS error {:.3}, worst {:.2}% of an arc",
                    rms, worst
                );
            } else {
                info!(
                    "Cubic fits: average RMS error {:.3}, worst {:.2}% of an arc",
                    rms, worst
                );
            }
        }
    }

    pub fn radial_ratio_ok(&self) -> bool {
        match self.radial_ratio {
            Some(ratio) => {
                (ratio - self.expected_radial_ratio).abs()
                    <= RADIAL_RATIO_SLACK * self.expected_radial_ratio
            }
            None => true,
        }
    }
}

fn radial_ratio(blocks: &[Block], cfg: &DiagramConfig) -> Option<f64> {
    let innermost = cfg.ring_order.first()?;
    let mut innermost_lengths = Vec::new();
    let mut other_lengths = Vec::new();
    for b in blocks {
        if b.kind == BlockKind::Outer {
            continue;
        }
        let length = b.corners.first_radial_length();
        if &b.ring_name == innermost {
            innermost_lengths.push(length);
        } else {
            other_lengths.push(length);
        }
    }
    let other = average(&other_lengths)?;
    if other <= 0.0 {
        return None;
    }
    Some(average(&innermost_lengths)? / other)
}

fn fit_summary(blocks: &[Block]) -> (Option<f64>, Option<f64>) {
    let reports: Vec<_> = blocks
        .iter()
        .filter_map(|b| b.fits.as_ref())
        .flat_map(|fits| [fits.inner.report, fits.outer.report])
        .collect();
    let rms: Vec<f64> = reports.iter().map(|r| r.rms_error).collect();
    let worst = reports.iter().map(|r| r.error_pct).reduce(f64::max);
    (average(&rms), worst)
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_slack() {
        let mut diagnostics = Diagnostics {
            expected_radial_ratio: 2.0,
            ..Default::default()
        };
        assert!(diagnostics.radial_ratio_ok());
        diagnostics.radial_ratio = Some(2.03);
        assert!(diagnostics.radial_ratio_ok());
        diagnostics.radial_ratio = Some(1.5);
        assert!(!diagnostics.radial_ratio_ok());
    }

    #[test]
    fn averages() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[1.0, 2.0, 6.0]), Some(3.0));
    }
}
