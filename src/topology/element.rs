use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AreaId, HoleId, ItemId, LineId, VertexId};

/// The kind of a scene element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prototype {
    Vertex,
    Line,
    Hole,
    Area,
    Item,
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertex => "vertex",
            Self::Line => "line",
            Self::Hole => "hole",
            Self::Area => "area",
            Self::Item => "item",
        };
        f.write_str(name)
    }
}

/// A typed reference to any element of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "prototype", content = "id", rename_all = "lowercase")]
pub enum ElementRef {
    Vertex(VertexId),
    Line(LineId),
    Hole(HoleId),
    Area(AreaId),
    Item(ItemId),
}

impl ElementRef {
    #[must_use]
    pub fn prototype(&self) -> Prototype {
        match self {
            Self::Vertex(_) => Prototype::Vertex,
            Self::Line(_) => Prototype::Line,
            Self::Hole(_) => Prototype::Hole,
            Self::Area(_) => Prototype::Area,
            Self::Item(_) => Prototype::Item,
        }
    }
}

impl From<VertexId> for ElementRef {
    fn from(id: VertexId) -> Self {
        Self::Vertex(id)
    }
}

impl From<LineId> for ElementRef {
    fn from(id: LineId) -> Self {
        Self::Line(id)
    }
}

impl From<HoleId> for ElementRef {
    fn from(id: HoleId) -> Self {
        Self::Hole(id)
    }
}

impl From<AreaId> for ElementRef {
    fn from(id: AreaId) -> Self {
        Self::Area(id)
    }
}

impl From<ItemId> for ElementRef {
    fn from(id: ItemId) -> Self {
        Self::Item(id)
    }
}
