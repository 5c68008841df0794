use anyhow::Result;

use abstutil::Timer;
use geom::{Polygon, Pt2D, Ring, EPSILON_DIST};

use crate::exception::exception_boundary;
use crate::fit::fit_ring_segment;
use crate::{
    Block, BlockError, BlockKind, BlockSet, BoundaryRepr, CircularArc, ClockTime, Corners,
    Diagnostics, Diagram, DiagramConfig, ExceptionSide, IntersectionCache, RingFits,
};

/// One band of blocks between two adjacent rings.
struct Row<'a> {
    inner: &'a str,
    outer: &'a str,
    times: &'a [ClockTime],
    quarter_hours: bool,
}

/// Turns a diagram into blocks. First every ring/radial intersection is resolved and cached,
/// then each block is built from that cache alone. A block that can't be built is skipped and
/// reported; only unusable configuration or curves fail the whole run.
pub fn assemble_blocks(
    diagram: &Diagram,
    cfg: &DiagramConfig,
    timer: &mut Timer,
) -> Result<BlockSet> {
    cfg.validate()?;

    timer.start("build intersection cache");
    let cache = IntersectionCache::build(diagram, cfg, timer)?;
    timer.stop("build intersection cache");
    info!("Cached {} intersections", cache.len());

    let mut rows = Vec::new();
    for (inner, outer) in cfg.inner_ring_pairs() {
        rows.push(Row {
            inner,
            outer,
            times: &cfg.inner_times,
            quarter_hours: false,
        });
    }
    for (inner, outer) in cfg.outer_ring_pairs() {
        rows.push(Row {
            inner,
            outer,
            times: &cfg.outer_times,
            quarter_hours: true,
        });
    }

    let mut blocks = Vec::new();
    let mut skipped = Vec::new();
    let mut repaired = 0;
    timer.start_iter("assemble blocks", cfg.target_block_count());
    for row in &rows {
        for pair in row.times.windows(2) {
            timer.next();
            let id = block_id(row.inner, pair[0]);
            match build_block(diagram, &cache, cfg, row, pair[0], pair[1]) {
                Ok((block, was_repaired)) => {
                    if was_repaired {
                        repaired += 1;
                    }
                    blocks.push(block);
                }
                Err(err) => {
                    warn!("Skipping block {}: {}", id, err);
                    skipped.push((id, err));
                }
            }
        }
    }

    let diagnostics = Diagnostics::compute(&blocks, skipped.len(), repaired, &cache, cfg);
    diagnostics.log();
    Ok(BlockSet {
        blocks,
        skipped,
        diagnostics,
    })
}

fn block_id(ring: &str, time: ClockTime) -> String {
    format!("{}_{}", ring, time)
}

/// Decided once per block, from the row and the times bounding it.
fn classify(cfg: &DiagramConfig, row: &Row, time1: ClockTime, time2: ClockTime) -> BlockKind {
    if row.quarter_hours {
        return BlockKind::Outer;
    }
    if let Some(ref exception) = cfg.exception {
        if exception.ring == row.inner {
            if time2 == exception.singularity {
                return BlockKind::Exception(ExceptionSide::BeforeSingularity);
            }
            if time1 == exception.singularity {
                return BlockKind::Exception(ExceptionSide::AfterSingularity);
            }
        }
    }
    BlockKind::Inner
}

/// Also returns true if the outline had to be repaired.
fn build_block(
    diagram: &Diagram,
    cache: &IntersectionCache,
    cfg: &DiagramConfig,
    row: &Row,
    time1: ClockTime,
    time2: ClockTime,
) -> Result<(Block, bool), BlockError> {
    let (label1, label2) = (time1.to_string(), time2.to_string());
    let corner = |ring: &str, label: &str| {
        cache
            .find(ring, label)
            .map(|i| i.pt)
            .ok_or_else(|| BlockError::MissingIntersection {
                ring: ring.to_string(),
                label: label.to_string(),
            })
    };
    let corners = Corners {
        inner1: corner(row.inner, &label1)?,
        inner2: corner(row.inner, &label2)?,
        outer2: corner(row.outer, &label2)?,
        outer1: corner(row.outer, &label1)?,
    };
    let id = block_id(row.inner, time1);

    let kind = classify(cfg, row, time1, time2);
    let (boundary, fits) = match kind {
        BlockKind::Exception(side) => (
            BoundaryRepr::ExceptionPolyline {
                points: exception_boundary(side, &corners, cfg)?,
            },
            None,
        ),
        BlockKind::Inner | BlockKind::Outer => (
            arc_pair(&id, &corners, cfg)?,
            ring_fits(diagram, row, &corners),
        ),
    };

    let (polygon, was_repaired) =
        outline_polygon(&id, boundary.outline(cfg.arc_outline_points), cfg.min_block_area)?;

    Ok((
        Block {
            id,
            ring_name: row.inner.to_string(),
            outer_ring_name: row.outer.to_string(),
            time_label: label1,
            next_time_label: label2,
            kind,
            boundary,
            corners,
            polygon,
            fits,
        },
        was_repaired,
    ))
}

/// Closes an outline into a valid polygon, repairing it if needed. Also returns true if it was
/// repaired. Only polygons with more than `min_area` survive.
fn outline_polygon(
    id: &str,
    outline: Vec<Pt2D>,
    min_area: f64,
) -> Result<(Polygon, bool), BlockError> {
    let ring = Ring::deduped(outline, EPSILON_DIST).map_err(|err| BlockError::InvalidPolygon {
        reason: err.to_string(),
    })?;
    let mut polygon = ring.into_polygon();
    let mut was_repaired = false;
    if !polygon.is_valid() {
        debug!("Outline of {} is invalid; repairing", id);
        polygon = polygon.repair().ok_or_else(|| BlockError::InvalidPolygon {
            reason: "nothing valid is left after repair".to_string(),
        })?;
        was_repaired = true;
    }
    let area = polygon.area();
    if area <= min_area {
        return Err(BlockError::InvalidPolygon {
            reason: format!("area {} isn't over {}", area, min_area),
        });
    }
    Ok((polygon, was_repaired))
}

/// Arcs about the center along both rings. If either ring isn't round enough between the corners
/// for one arc to pass through both, just connect the corners.
fn arc_pair(id: &str, corners: &Corners, cfg: &DiagramConfig) -> Result<BoundaryRepr, BlockError> {
    let degenerate = |ring: &str| BlockError::DegenerateGeometry {
        reason: format!("{} corner is on the center", ring),
    };
    let inner_arc = CircularArc::fit(cfg.center, corners.inner1, corners.inner2)
        .ok_or_else(|| degenerate("an inner"))?;
    let outer_arc = CircularArc::fit(cfg.center, corners.outer1, corners.outer2)
        .ok_or_else(|| degenerate("an outer"))?;

    let mismatch = inner_arc.radius_mismatch().max(outer_arc.radius_mismatch());
    if mismatch > cfg.tolerance {
        warn!(
            "{}'s corners are {:.2} off from a circle; connecting them directly",
            id, mismatch
        );
        return Ok(BoundaryRepr::Fallback {
            points: corners.to_array().to_vec(),
        });
    }

    Ok(BoundaryRepr::ArcPair {
        inner_arc,
        outer_arc,
        radial1: (corners.inner1, corners.outer1),
        radial2: (corners.inner2, corners.outer2),
    })
}

fn ring_fits(diagram: &Diagram, row: &Row, corners: &Corners) -> Option<RingFits> {
    let inner = fit_ring_segment(diagram.ring(row.inner)?, corners.inner1, corners.inner2)?;
    let outer = fit_ring_segment(diagram.ring(row.outer)?, corners.outer1, corners.outer2)?;
    Some(RingFits { inner, outer })
}
