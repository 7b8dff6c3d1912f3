use serde::{Deserialize, Serialize};

use super::LineId;
use crate::catalog::ElementTemplate;
use crate::properties::Properties;

slotmap::new_key_type! {
    /// Unique identifier for an opening within its layer.
    pub struct HoleId;
}

/// A door or window sitting on a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    pub line: LineId,
    /// Fractional position of the hole center along the wall, from its
    /// first vertex (`0`) to its second (`1`).
    pub offset: f64,
    pub properties: Properties,
    #[serde(default)]
    pub selected: bool,
}

impl Hole {
    #[must_use]
    pub fn new(template: ElementTemplate, line: LineId, offset: f64) -> Self {
        Self {
            element_type: template.element_type,
            name: template.name,
            line,
            offset,
            properties: template.properties,
            selected: false,
        }
    }

    #[must_use]
    pub fn template(&self) -> ElementTemplate {
        ElementTemplate {
            element_type: self.element_type.clone(),
            name: self.name.clone(),
            properties: self.properties.clone(),
        }
    }

    /// Width of the opening along the wall, from its `width` property.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.properties.length("width").unwrap_or(0.0)
    }
}
