use serde::{Deserialize, Serialize};

use crate::catalog::ElementTemplate;
use crate::math::Point2;
use crate::properties::Properties;

slotmap::new_key_type! {
    /// Unique identifier for a piece of furniture within its layer.
    pub struct ItemId;
}

/// A free-standing element (furniture, fixture), not part of the wall graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    pub properties: Properties,
    #[serde(default)]
    pub selected: bool,
}

impl Item {
    #[must_use]
    pub fn new(template: ElementTemplate, x: f64, y: f64, rotation: f64) -> Self {
        Self {
            element_type: template.element_type,
            name: template.name,
            x,
            y,
            rotation,
            properties: template.properties,
            selected: false,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}
