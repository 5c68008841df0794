//! Geometry primitives for concentric road diagrams. Everything lives in the diagram's own
//! coordinate space, where Y points down (SVG convention). Angles come from `atan2(dy, dx)` in
//! that space, so a positive rotation is clockwise on screen.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use crate::angle::Angle;
pub use crate::bezier::CubicBezier;
pub use crate::circle::Circle;
pub use crate::distance::Distance;
pub use crate::line::Line;
pub use crate::polygon::Polygon;
pub use crate::polyline::PolyLine;
pub use crate::pt::{HashablePt2D, Pt2D};
pub use crate::ring::Ring;

mod angle;
mod bezier;
mod circle;
mod distance;
mod line;
mod polygon;
mod polyline;
mod pt;
mod ring;

// Points closer than this are the same point, as far as blocks are concerned.
pub const EPSILON_DIST: Distance = Distance::const_units(0.01);

/// Reduce the precision of an f64. This helps ensure serialization is idempotent (everything is
/// exactly the same before and after saving/loading). Ideally we'd use some kind of proper
/// fixed-precision type instead of f64.
pub fn trim_f64(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Serializes a trimmed `f64` as an `i32` to save space.
fn serialize_f64<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
    // So a trimmed f64's range becomes 2**31 / 10,000 =~ 214,000, which is plenty
    let int = (x * 10_000.0).round() as i32;
    int.serialize(s)
}

/// Deserializes a trimmed `f64` from an `i32`.
fn deserialize_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let x = <i32>::deserialize(d)?;
    Ok(x as f64 / 10_000.0)
}
