pub mod group;
pub mod guide;
pub mod persist;

pub use group::{Group, GroupId};
pub use guide::{Guide, GuideId};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{InputError, Result, TopologyError};
use crate::topology::{same_entries, ElementRef, Layer};

/// Identifier of a layer, stable across snapshots (`layer-1`, `layer-2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Measurement unit of scene coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Millimeter,
    #[default]
    Centimeter,
    Meter,
    Inch,
    Foot,
}

/// Partial update of layer display properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerProperties {
    pub name: Option<String>,
    pub altitude: Option<f64>,
    pub order: Option<i32>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
}

/// A full plan snapshot: the unit of undo/redo and persistence.
///
/// Layers sit behind [`Arc`] so that cloning a scene is cheap and two
/// snapshots share every layer neither of them edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub unit: Unit,
    pub width: f64,
    pub height: f64,
    layers: BTreeMap<LayerId, Arc<Layer>>,
    selected_layer: LayerId,
    groups: SlotMap<GroupId, Group>,
    guides: SlotMap<GuideId, Guide>,
    next_layer: u32,
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit
            && self.width == other.width
            && self.height == other.height
            && self.selected_layer == other.selected_layer
            && self.next_layer == other.next_layer
            && self.layers == other.layers
            && same_entries(&self.groups, &other.groups)
            && same_entries(&self.guides, &other.guides)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(3000.0, 2000.0)
    }
}

impl Scene {
    /// Creates a scene with a single empty layer.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let first = LayerId::new("layer-1");
        let mut layers = BTreeMap::new();
        layers.insert(first.clone(), Arc::new(Layer::new("default", 0.0)));
        Self {
            unit: Unit::default(),
            width,
            height,
            layers,
            selected_layer: first,
            groups: SlotMap::with_key(),
            guides: SlotMap::with_key(),
            next_layer: 2,
        }
    }

    // --- Layers ---

    /// Returns a layer, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::LayerNotFound`] for an unknown id.
    pub fn layer(&self, id: &LayerId) -> std::result::Result<&Layer, TopologyError> {
        self.layers
            .get(id)
            .map(AsRef::as_ref)
            .ok_or_else(|| TopologyError::LayerNotFound(id.to_string()))
    }

    /// Returns a mutable layer, detaching it from snapshots that share it.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::LayerNotFound`] for an unknown id.
    pub fn layer_mut(&mut self, id: &LayerId) -> std::result::Result<&mut Layer, TopologyError> {
        self.layers
            .get_mut(id)
            .map(Arc::make_mut)
            .ok_or_else(|| TopologyError::LayerNotFound(id.to_string()))
    }

    pub fn layers(&self) -> impl Iterator<Item = (&LayerId, &Layer)> {
        self.layers.iter().map(|(id, layer)| (id, layer.as_ref()))
    }

    #[must_use]
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.keys().cloned().collect()
    }

    pub(crate) fn shared_layers(&self) -> &BTreeMap<LayerId, Arc<Layer>> {
        &self.layers
    }

    pub(crate) fn put_shared_layer(&mut self, id: LayerId, layer: Arc<Layer>) {
        self.layers.insert(id, layer);
    }

    pub(crate) fn drop_layer(&mut self, id: &LayerId) {
        self.layers.remove(id);
    }

    /// The layer new elements are drawn on.
    #[must_use]
    pub fn selected_layer(&self) -> &LayerId {
        &self.selected_layer
    }

    /// Makes `id` the drawing layer.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::LayerNotFound`] for an unknown id.
    pub fn select_layer(&mut self, id: &LayerId) -> Result<()> {
        self.layer(id)?;
        self.selected_layer = id.clone();
        Ok(())
    }

    /// Adds an empty layer on top of the others and selects it.
    pub fn add_layer(&mut self, name: impl Into<String>, altitude: f64) -> LayerId {
        let id = LayerId::new(format!("layer-{}", self.next_layer));
        self.next_layer += 1;
        let mut layer = Layer::new(name, altitude);
        layer.order = i32::try_from(self.layers.len()).unwrap_or(i32::MAX);
        self.layers.insert(id.clone(), Arc::new(layer));
        self.selected_layer = id.clone();
        id
    }

    /// Removes a layer and every group membership pointing into it.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown id or when `id` is the last layer.
    pub fn remove_layer(&mut self, id: &LayerId) -> Result<()> {
        self.layer(id)?;
        if self.layers.len() == 1 {
            return Err(InputError::LastLayer.into());
        }
        self.layers.remove(id);
        for group in self.groups.values_mut() {
            group.elements.remove(id);
        }
        if &self.selected_layer == id {
            if let Some(first) = self.layers.keys().next() {
                self.selected_layer = first.clone();
            }
        }
        Ok(())
    }

    /// Applies a partial update to a layer's display properties.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::LayerNotFound`] for an unknown id.
    pub fn set_layer_properties(&mut self, id: &LayerId, patch: &LayerProperties) -> Result<()> {
        let layer = self.layer_mut(id)?;
        if let Some(name) = &patch.name {
            layer.name.clone_from(name);
        }
        if let Some(altitude) = patch.altitude {
            layer.altitude = altitude;
        }
        if let Some(order) = patch.order {
            layer.order = order;
        }
        if let Some(opacity) = patch.opacity {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(visible) = patch.visible {
            layer.visible = visible;
        }
        Ok(())
    }

    /// Resizes the drawing board.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::SceneTooSmall`] when either side is below `minimum`.
    pub fn set_dimensions(&mut self, width: f64, height: f64, minimum: f64) -> Result<()> {
        if width < minimum || height < minimum {
            return Err(InputError::SceneTooSmall {
                width,
                height,
                minimum,
            }
            .into());
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Clears the selection of every layer and group.
    pub fn unselect_all(&mut self) {
        let ids = self.layer_ids();
        for id in ids {
            if self.layers.get(&id).is_some_and(|l| !l.selected().is_empty()) {
                if let Ok(layer) = self.layer_mut(&id) {
                    layer.unselect_all();
                }
            }
        }
        for group in self.groups.values_mut() {
            group.selected = false;
        }
    }

    // --- Groups ---

    /// Returns a group, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::GroupNotFound`] for an unknown id.
    pub fn group(&self, id: GroupId) -> std::result::Result<&Group, TopologyError> {
        self.groups
            .get(id)
            .ok_or_else(|| TopologyError::GroupNotFound(format!("{id:?}")))
    }

    /// Returns a mutable group, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::GroupNotFound`] for an unknown id.
    pub fn group_mut(&mut self, id: GroupId) -> std::result::Result<&mut Group, TopologyError> {
        self.groups
            .get_mut(id)
            .ok_or_else(|| TopologyError::GroupNotFound(format!("{id:?}")))
    }

    pub fn insert_group(&mut self, group: Group) -> GroupId {
        self.groups.insert(group)
    }

    /// Drops a group (its members stay in the scene).
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::GroupNotFound`] for an unknown id.
    pub fn take_group(&mut self, id: GroupId) -> std::result::Result<Group, TopologyError> {
        self.groups
            .remove(id)
            .ok_or_else(|| TopologyError::GroupNotFound(format!("{id:?}")))
    }

    pub fn groups(&self) -> slotmap::basic::Iter<'_, GroupId, Group> {
        self.groups.iter()
    }

    pub(crate) fn groups_table(&self) -> &SlotMap<GroupId, Group> {
        &self.groups
    }

    pub(crate) fn set_groups_table(&mut self, groups: SlotMap<GroupId, Group>) {
        self.groups = groups;
    }

    /// Groups that list `element` of `layer` as a member.
    #[must_use]
    pub fn groups_containing(&self, layer: &LayerId, element: ElementRef) -> Vec<GroupId> {
        self.groups
            .iter()
            .filter(|(_, g)| g.contains(layer, element))
            .map(|(id, _)| id)
            .collect()
    }

    /// Removes `element` of `layer` from every group.
    pub fn detach_from_groups(&mut self, layer: &LayerId, element: ElementRef) {
        for group in self.groups.values_mut() {
            group.remove(layer, element);
        }
    }

    // --- Guides ---

    pub fn add_guide(&mut self, guide: Guide) -> GuideId {
        self.guides.insert(guide)
    }

    /// Removes a guide.
    ///
    /// # Errors
    ///
    /// Returns an error if the guide does not exist.
    pub fn remove_guide(&mut self, id: GuideId) -> std::result::Result<Guide, TopologyError> {
        self.guides
            .remove(id)
            .ok_or_else(|| TopologyError::InvalidTopology(format!("guide {id:?} does not exist")))
    }

    pub fn guides(&self) -> slotmap::basic::Iter<'_, GuideId, Guide> {
        self.guides.iter()
    }

    pub(crate) fn guides_table(&self) -> &SlotMap<GuideId, Guide> {
        &self.guides
    }

    pub(crate) fn set_guides_table(&mut self, guides: SlotMap<GuideId, Guide>) {
        self.guides = guides;
    }

    pub(crate) fn layer_counter(&self) -> u32 {
        self.next_layer
    }

    pub(crate) fn set_layer_counter(&mut self, next: u32) {
        self.next_layer = next;
    }

    pub(crate) fn set_selected_layer_unchecked(&mut self, id: LayerId) {
        self.selected_layer = id;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::topology::Vertex;

    #[test]
    fn clone_shares_untouched_layers() {
        let mut scene = Scene::default();
        let second = scene.add_layer("upstairs", 300.0);
        let snapshot = scene.clone();

        scene
            .layer_mut(&second)
            .unwrap()
            .insert_vertex(Vertex::new(1.0, 1.0));

        let first = LayerId::new("layer-1");
        assert!(Arc::ptr_eq(
            &scene.shared_layers()[&first],
            &snapshot.shared_layers()[&first]
        ));
        assert!(!Arc::ptr_eq(
            &scene.shared_layers()[&second],
            &snapshot.shared_layers()[&second]
        ));
        assert_ne!(scene, snapshot);
    }

    #[test]
    fn last_layer_cannot_be_removed() {
        let mut scene = Scene::default();
        let err = scene.remove_layer(&LayerId::new("layer-1")).unwrap_err();
        assert!(matches!(err, PlannerError::Input(InputError::LastLayer)));
    }

    #[test]
    fn removing_selected_layer_selects_another() {
        let mut scene = Scene::default();
        let second = scene.add_layer("upstairs", 300.0);
        assert_eq!(scene.selected_layer(), &second);
        scene.remove_layer(&second).unwrap();
        assert_eq!(scene.selected_layer().as_str(), "layer-1");
    }

    #[test]
    fn dimensions_below_minimum_are_rejected() {
        let mut scene = Scene::default();
        assert!(scene.set_dimensions(50.0, 2000.0, 100.0).is_err());
        assert!((scene.width - 3000.0).abs() < f64::EPSILON);
        scene.set_dimensions(500.0, 400.0, 100.0).unwrap();
        assert!((scene.height - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn layer_properties_patch() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        scene
            .set_layer_properties(
                &id,
                &LayerProperties {
                    opacity: Some(1.5),
                    visible: Some(false),
                    ..LayerProperties::default()
                },
            )
            .unwrap();
        let layer = scene.layer(&id).unwrap();
        assert!((layer.opacity - 1.0).abs() < f64::EPSILON);
        assert!(!layer.visible);
    }

    #[test]
    fn guides_and_layer_selection() {
        let mut scene = Scene::default();
        let guide = scene.add_guide(Guide::Horizontal { y: 150.0 });
        assert_eq!(scene.guides().count(), 1);
        assert_eq!(scene.remove_guide(guide).unwrap(), Guide::Horizontal { y: 150.0 });
        assert!(scene.remove_guide(guide).is_err());

        let first = scene.selected_layer().clone();
        scene.add_layer("upstairs", 300.0);
        scene.select_layer(&first).unwrap();
        assert_eq!(scene.selected_layer(), &first);
        assert!(scene.select_layer(&LayerId::new("layer-9")).is_err());
    }
}
