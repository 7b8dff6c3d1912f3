mod attributes;
mod hole;
mod item;
mod line;
mod properties;
mod remove_selected;
mod selection;
mod vertex;

pub use attributes::{Attributes, SetAttributes};
pub use hole::{CreateHole, MoveHole, RemoveHole};
pub use item::{CreateItem, RemoveItem};
pub use line::{CreateLine, RemoveLine, RemoveZeroLengthLines, ReplaceLineVertex, SplitLine};
pub use properties::{PropertyTarget, SetProperties, UpdateProperties};
pub use remove_selected::RemoveSelected;
pub use selection::{Select, Unselect};
pub use vertex::{AddVertex, MergeCoincidentVertices, RemoveVertex, VertexOwner};
