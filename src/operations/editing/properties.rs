use crate::error::{Result, TopologyError};
use crate::properties::Properties;
use crate::scene::{LayerId, Scene};
use crate::topology::{ElementRef, Layer, Prototype};

/// Which elements a property edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyTarget {
    Element(ElementRef),
    /// Every selected line, hole, area and item of the layer.
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeMode {
    /// Overwrite and add keys.
    Set,
    /// Overwrite existing keys only.
    Update,
}

/// Shallow-merges properties onto the target, adding missing keys.
pub struct SetProperties {
    layer: LayerId,
    target: PropertyTarget,
    properties: Properties,
}

impl SetProperties {
    #[must_use]
    pub fn new(layer: LayerId, target: PropertyTarget, properties: Properties) -> Self {
        Self {
            layer,
            target,
            properties,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist or is a vertex.
    pub fn execute(&self, scene: &mut Scene) -> Result<()> {
        apply(scene, &self.layer, self.target, &self.properties, MergeMode::Set)
    }
}

/// Overwrites properties the target already declares; unknown keys are ignored.
pub struct UpdateProperties {
    layer: LayerId,
    target: PropertyTarget,
    properties: Properties,
}

impl UpdateProperties {
    #[must_use]
    pub fn new(layer: LayerId, target: PropertyTarget, properties: Properties) -> Self {
        Self {
            layer,
            target,
            properties,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist or is a vertex.
    pub fn execute(&self, scene: &mut Scene) -> Result<()> {
        apply(scene, &self.layer, self.target, &self.properties, MergeMode::Update)
    }
}

fn apply(
    scene: &mut Scene,
    layer_id: &LayerId,
    target: PropertyTarget,
    properties: &Properties,
    mode: MergeMode,
) -> Result<()> {
    let layer = scene.layer_mut(layer_id)?;
    match target {
        PropertyTarget::Element(element) => merge_into(layer, element, properties, mode),
        PropertyTarget::Selection => {
            let selected: Vec<ElementRef> = layer
                .selected()
                .iter()
                .filter(|e| e.prototype() != Prototype::Vertex)
                .collect();
            for element in selected {
                merge_into(layer, element, properties, mode)?;
            }
            Ok(())
        }
    }
}

fn merge_into(layer: &mut Layer, element: ElementRef, properties: &Properties, mode: MergeMode) -> Result<()> {
    let target = match element {
        ElementRef::Vertex(_) => {
            return Err(TopologyError::PrototypeMismatch {
                expected: Prototype::Line,
                found: Prototype::Vertex,
            }
            .into())
        }
        ElementRef::Line(id) => &mut layer.line_mut(id)?.properties,
        ElementRef::Hole(id) => &mut layer.hole_mut(id)?.properties,
        ElementRef::Area(id) => &mut layer.area_mut(id)?.properties,
        ElementRef::Item(id) => &mut layer.item_mut(id)?.properties,
    };
    match mode {
        MergeMode::Set => target.merge(properties),
        MergeMode::Update => target.update(properties),
    }
    Ok(())
}
