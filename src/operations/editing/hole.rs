use crate::catalog::Catalog;
use crate::error::Result;
use crate::properties::Properties;
use crate::scene::{LayerId, Scene};
use crate::topology::{Hole, HoleId, Layer, LineId, Prototype};

/// Places an opening on a wall at a fractional offset.
pub struct CreateHole {
    element_type: String,
    line: LineId,
    offset: f64,
    properties: Option<Properties>,
}

impl CreateHole {
    /// Creates a new `CreateHole` operation. The offset is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(element_type: impl Into<String>, line: LineId, offset: f64) -> Self {
        Self {
            element_type: element_type.into(),
            line,
            offset: offset.clamp(0.0, 1.0),
            properties: None,
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Option<Properties>) -> Self {
        self.properties = properties;
        self
    }

    /// Executes the operation, returning the new hole.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the catalog has no
    /// hole element named `element_type`.
    pub fn execute(&self, layer: &mut Layer, catalog: &Catalog) -> Result<HoleId> {
        layer.line(self.line)?;
        let template = catalog.factory(&self.element_type, Prototype::Hole, self.properties.as_ref())?;
        let id = layer.insert_hole(Hole::new(template, self.line, self.offset));
        layer.line_mut(self.line)?.holes.push(id);
        Ok(id)
    }
}

/// Re-attaches an opening to a wall (possibly another one) at a new offset.
pub struct MoveHole {
    hole: HoleId,
    line: LineId,
    offset: f64,
}

impl MoveHole {
    #[must_use]
    pub fn new(hole: HoleId, line: LineId, offset: f64) -> Self {
        Self {
            hole,
            line,
            offset: offset.clamp(0.0, 1.0),
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the hole or either wall does not exist.
    pub fn execute(&self, layer: &mut Layer) -> Result<()> {
        layer.line(self.line)?;
        let previous = layer.hole(self.hole)?.line;
        if previous != self.line {
            layer.line_mut(previous)?.holes.retain(|&h| h != self.hole);
            layer.line_mut(self.line)?.holes.push(self.hole);
        }
        let hole = layer.hole_mut(self.hole)?;
        hole.line = self.line;
        hole.offset = self.offset;
        Ok(())
    }
}

/// Deletes an opening and detaches it from its wall and groups.
pub struct RemoveHole {
    layer: LayerId,
    hole: HoleId,
}

impl RemoveHole {
    #[must_use]
    pub fn new(layer: LayerId, hole: HoleId) -> Self {
        Self { layer, hole }
    }

    /// Executes the operation, returning the removed hole.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer or hole does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<Hole> {
        let layer = scene.layer_mut(&self.layer)?;
        let line = layer.hole(self.hole)?.line;
        if let Ok(line) = layer.line_mut(line) {
            line.holes.retain(|&h| h != self.hole);
        }
        let hole = layer.take_hole(self.hole)?;
        scene.detach_from_groups(&self.layer, self.hole.into());
        Ok(hole)
    }
}
