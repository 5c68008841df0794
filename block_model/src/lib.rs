//! Turns a diagram of concentric rings and clock-labelled radials into blocks.
//!
//! The pipeline runs in two phases. `IntersectionCache::build` resolves where every ring meets
//! every applicable radial, falling back from exact crossings to angular projection to closest
//! approach. Then `assemble_blocks` walks each pair of adjacent rings and each pair of adjacent
//! times, looking up the four corners and describing the boundary between them with circular
//! arcs. Two blocks near the singularity radial splice in an auxiliary ring instead.

#[macro_use]
extern crate log;

mod arc;
mod assemble;
mod block;
mod clock;
mod config;
mod curve;
mod diagnostics;
mod diagram;
mod exception;
pub mod fit;
pub mod intersection;
pub mod sample;
mod synthetic;

pub use crate::arc::CircularArc;
pub use crate::assemble::assemble_blocks;
pub use crate::block::{
    Block, BlockError, BlockKind, BlockSet, BoundaryRepr, Corners, ExceptionSide, RingFits,
};
pub use crate::clock::{ClockTime, SECONDARY_SUFFIX};
pub use crate::config::{DiagramConfig, ExceptionConfig};
pub use crate::curve::{BezierPathCurve, CircleCurve, Curve, CurveSpec, PolyLineCurve};
pub use crate::diagnostics::Diagnostics;
pub use crate::diagram::{Diagram, DiagramSpec, Radial, RadialKind, RadialSpec, RingSpec};
pub use crate::exception::{exception_boundary, AUXILIARY_ARC_POINTS};
pub use crate::fit::{CubicCurveApprox, FitReport};
pub use crate::intersection::{Intersection, IntersectionCache, Tier};
pub use crate::synthetic::reference_diagram;
