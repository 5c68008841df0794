use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use geom::{Polygon, Pt2D};

use crate::{CircularArc, CubicCurveApprox, Diagnostics};

/// One cell of the diagram, between two adjacent rings and two adjacent radials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// "{ring}_{time}", like "C_4:30"
    pub id: String,
    /// The inner ring
    pub ring_name: String,
    pub outer_ring_name: String,
    pub time_label: String,
    pub next_time_label: String,
    pub kind: BlockKind,
    pub boundary: BoundaryRepr,
    pub corners: Corners,
    /// The validated outline, maybe repaired.
    pub polygon: Polygon,
    /// Cubic approximations of both ring arcs. Only for rendering.
    pub fits: Option<RingFits>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// A half-hour row between the innermost rings.
    Inner,
    /// A quarter-hour row further out.
    Outer,
    /// One of the two blocks cut by the auxiliary ring.
    Exception(ExceptionSide),
}

/// Which of the two blocks touching the singularity radial this is. They mirror each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExceptionSide {
    /// Ends on the singularity radial.
    BeforeSingularity,
    /// Starts on the singularity radial.
    AfterSingularity,
}

/// The four intersections bounding a block, in outline order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corners {
    pub inner1: Pt2D,
    pub inner2: Pt2D,
    pub outer2: Pt2D,
    pub outer1: Pt2D,
}

impl Corners {
    pub fn to_array(&self) -> [Pt2D; 4] {
        [self.inner1, self.inner2, self.outer2, self.outer1]
    }

    /// Length of the radial segment at the block's first time.
    pub fn first_radial_length(&self) -> f64 {
        self.inner1.raw_dist_to(self.outer1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoundaryRepr {
    /// Two concentric arcs joined by straight radial segments. Each radial segment is (inner
    /// corner, outer corner).
    ArcPair {
        inner_arc: CircularArc,
        outer_arc: CircularArc,
        radial1: (Pt2D, Pt2D),
        radial2: (Pt2D, Pt2D),
    },
    /// The auxiliary ring spliced in, already densified.
    ExceptionPolyline { points: Vec<Pt2D> },
    /// Just the corners, used when the rings aren't round enough for arcs.
    Fallback { points: Vec<Pt2D> },
}

impl BoundaryRepr {
    /// Densifies the boundary into an open point list, with `arc_points` interior points per
    /// arc. Polylines are returned as-is.
    pub fn outline(&self, arc_points: usize) -> Vec<Pt2D> {
        match self {
            BoundaryRepr::ArcPair {
                inner_arc,
                outer_arc,
                ..
            } => {
                let mut pts = vec![inner_arc.start];
                pts.extend(inner_arc.interior_points(arc_points));
                pts.push(inner_arc.end);
                pts.push(outer_arc.end);
                let mut outer = outer_arc.interior_points(arc_points);
                outer.reverse();
                pts.extend(outer);
                pts.push(outer_arc.start);
                pts
            }
            BoundaryRepr::ExceptionPolyline { points } | BoundaryRepr::Fallback { points } => {
                points.clone()
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            BoundaryRepr::ArcPair { .. } => "arc pair",
            BoundaryRepr::ExceptionPolyline { .. } => "exception polyline",
            BoundaryRepr::Fallback { .. } => "fallback",
        }
    }
}

impl Block {
    pub fn outline(&self, arc_points: usize) -> Vec<Pt2D> {
        self.boundary.outline(arc_points)
    }

    /// Everything worth attaching to an exported feature.
    pub fn properties(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut props = serde_json::Map::new();
        props.insert("id".to_string(), self.id.clone().into());
        props.insert("ring".to_string(), self.ring_name.clone().into());
        props.insert("outer_ring".to_string(), self.outer_ring_name.clone().into());
        props.insert("time".to_string(), self.time_label.clone().into());
        props.insert("next_time".to_string(), self.next_time_label.clone().into());
        let kind = match self.kind {
            BlockKind::Inner => "inner",
            BlockKind::Outer => "outer",
            BlockKind::Exception(ExceptionSide::BeforeSingularity) => "exception_before",
            BlockKind::Exception(ExceptionSide::AfterSingularity) => "exception_after",
        };
        props.insert("kind".to_string(), kind.into());
        props.insert("boundary".to_string(), self.boundary.describe().into());
        props.insert("area".to_string(), self.polygon.area().into());
        if let Some(ref fits) = self.fits {
            props.insert(
                "inner_fit_error_pct".to_string(),
                fits.inner.report.error_pct.into(),
            );
            props.insert(
                "outer_fit_error_pct".to_string(),
                fits.outer.report.error_pct.into(),
            );
        }
        props
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingFits {
    pub inner: CubicCurveApprox,
    pub outer: CubicCurveApprox,
}

/// Why one block couldn't be built. None of these stop the other blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BlockError {
    MissingIntersection { ring: String, label: String },
    DegenerateGeometry { reason: String },
    InvalidPolygon { reason: String },
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BlockError::MissingIntersection { ring, label } => {
                write!(f, "{} doesn't meet the {} radial", ring, label)
            }
            BlockError::DegenerateGeometry { reason } => write!(f, "degenerate geometry: {}", reason),
            BlockError::InvalidPolygon { reason } => write!(f, "invalid polygon: {}", reason),
        }
    }
}

impl Error for BlockError {}

/// Everything one run of the assembler produces.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockSet {
    pub blocks: Vec<Block>,
    /// Block IDs that couldn't be built, and why.
    pub skipped: Vec<(String, BlockError)>,
    pub diagnostics: Diagnostics,
}

impl BlockSet {
    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        let features = self
            .blocks
            .iter()
            .map(|b| geojson::Feature {
                bbox: None,
                geometry: Some(b.polygon.to_geojson()),
                id: Some(geojson::feature::Id::String(b.id.clone())),
                properties: Some(b.properties()),
                foreign_members: None,
            })
            .collect();
        geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}
