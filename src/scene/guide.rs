use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Unique identifier for an alignment guide.
    pub struct GuideId;
}

/// A non-topological alignment aid, used only by snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Guide {
    /// The line `y = y`.
    Horizontal { y: f64 },
    /// The line `x = x`.
    Vertical { x: f64 },
    /// Reserved; stored but not snapped to.
    Circular { x: f64, y: f64, radius: f64 },
}
