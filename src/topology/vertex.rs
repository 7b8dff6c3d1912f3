use serde::{Deserialize, Serialize};

use super::{AreaId, LineId};
use crate::math::Point2;

slotmap::new_key_type! {
    /// Unique identifier for a vertex within its layer.
    pub struct VertexId;
}

/// A shared wall/room corner.
///
/// A vertex lives as long as some line or area references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    /// Lines using this vertex as an endpoint.
    pub lines: Vec<LineId>,
    /// Areas using this vertex as a corner.
    pub areas: Vec<AreaId>,
    #[serde(default)]
    pub selected: bool,
}

impl Vertex {
    /// Creates an unreferenced vertex at the given position.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            lines: Vec::new(),
            areas: Vec::new(),
            selected: false,
        }
    }

    #[must_use]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// `true` when neither a line nor an area references this vertex.
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        self.lines.is_empty() && self.areas.is_empty()
    }
}
