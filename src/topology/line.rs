use serde::{Deserialize, Serialize};

use super::{HoleId, VertexId};
use crate::catalog::ElementTemplate;
use crate::properties::Properties;

slotmap::new_key_type! {
    /// Unique identifier for a wall within its layer.
    pub struct LineId;
}

/// A wall: a straight segment between two vertices.
///
/// Vertex order matters: hole offsets are measured from `vertices[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    pub vertices: [VertexId; 2],
    pub holes: Vec<HoleId>,
    pub properties: Properties,
    #[serde(default)]
    pub selected: bool,
}

impl Line {
    #[must_use]
    pub fn new(template: ElementTemplate, vertices: [VertexId; 2]) -> Self {
        Self {
            element_type: template.element_type,
            name: template.name,
            vertices,
            holes: Vec::new(),
            properties: template.properties,
            selected: false,
        }
    }

    /// Template that recreates this wall's type, name and properties.
    #[must_use]
    pub fn template(&self) -> ElementTemplate {
        ElementTemplate {
            element_type: self.element_type.clone(),
            name: self.name.clone(),
            properties: self.properties.clone(),
        }
    }
}
