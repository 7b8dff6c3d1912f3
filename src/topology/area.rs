use serde::{Deserialize, Serialize};

use super::VertexId;
use crate::catalog::ElementTemplate;
use crate::properties::Properties;

slotmap::new_key_type! {
    /// Unique identifier for a room within its layer.
    pub struct AreaId;
}

/// A room derived from the wall graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    /// Closed counter-clockwise loop of corners.
    pub vertices: Vec<VertexId>,
    /// Rooms nested directly inside this one.
    pub holes: Vec<AreaId>,
    pub properties: Properties,
    #[serde(default)]
    pub selected: bool,
}

impl Area {
    #[must_use]
    pub fn new(template: ElementTemplate, vertices: Vec<VertexId>) -> Self {
        Self {
            element_type: template.element_type,
            name: template.name,
            vertices,
            holes: Vec::new(),
            properties: template.properties,
            selected: false,
        }
    }
}
