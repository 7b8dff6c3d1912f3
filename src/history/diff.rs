use std::sync::Arc;

use slotmap::SlotMap;

use crate::scene::{Group, GroupId, Guide, GuideId, LayerId, Scene, Unit};
use crate::topology::{same_entries, Layer};

#[derive(Debug, Clone)]
enum LayerChange {
    /// The layer as it is in the newer snapshot.
    Upsert(LayerId, Arc<Layer>),
    Remove(LayerId),
}

#[derive(Debug, Clone, PartialEq)]
struct SceneMeta {
    unit: Unit,
    width: f64,
    height: f64,
    selected_layer: LayerId,
    next_layer: u32,
}

impl SceneMeta {
    fn of(scene: &Scene) -> Self {
        Self {
            unit: scene.unit,
            width: scene.width,
            height: scene.height,
            selected_layer: scene.selected_layer().clone(),
            next_layer: scene.layer_counter(),
        }
    }
}

/// Forward structural difference between two snapshots.
///
/// Layers are recorded whole, but only the ones that changed; unchanged
/// layers stay shared with both snapshots. Groups, guides and scene
/// metadata are recorded only when they differ.
#[derive(Debug, Clone, Default)]
pub struct SceneDiff {
    layers: Vec<LayerChange>,
    groups: Option<SlotMap<GroupId, Group>>,
    guides: Option<SlotMap<GuideId, Guide>>,
    meta: Option<SceneMeta>,
}

impl SceneDiff {
    /// The changes that turn `from` into `to`.
    #[must_use]
    pub fn between(from: &Scene, to: &Scene) -> Self {
        let mut diff = Self::default();
        let old = from.shared_layers();
        let new = to.shared_layers();

        for (id, layer) in new {
            let unchanged = old
                .get(id)
                .is_some_and(|previous| Arc::ptr_eq(previous, layer) || previous == layer);
            if !unchanged {
                diff.layers.push(LayerChange::Upsert(id.clone(), Arc::clone(layer)));
            }
        }
        for id in old.keys() {
            if !new.contains_key(id) {
                diff.layers.push(LayerChange::Remove(id.clone()));
            }
        }

        if !same_entries(from.groups_table(), to.groups_table()) {
            diff.groups = Some(to.groups_table().clone());
        }
        if !same_entries(from.guides_table(), to.guides_table()) {
            diff.guides = Some(to.guides_table().clone());
        }
        let meta = SceneMeta::of(to);
        if SceneMeta::of(from) != meta {
            diff.meta = Some(meta);
        }
        diff
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.groups.is_none() && self.guides.is_none() && self.meta.is_none()
    }

    /// Replays the changes onto `scene`.
    pub fn apply(&self, scene: &mut Scene) {
        for change in &self.layers {
            match change {
                LayerChange::Upsert(id, layer) => scene.put_shared_layer(id.clone(), Arc::clone(layer)),
                LayerChange::Remove(id) => scene.drop_layer(id),
            }
        }
        if let Some(groups) = &self.groups {
            scene.set_groups_table(groups.clone());
        }
        if let Some(guides) = &self.guides {
            scene.set_guides_table(guides.clone());
        }
        if let Some(meta) = &self.meta {
            scene.unit = meta.unit;
            scene.width = meta.width;
            scene.height = meta.height;
            scene.set_selected_layer_unchecked(meta.selected_layer.clone());
            scene.set_layer_counter(meta.next_layer);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::Vertex;

    #[test]
    fn diff_replays_to_the_newer_snapshot() {
        let old = Scene::default();
        let mut new = old.clone();
        let first = new.selected_layer().clone();
        new.layer_mut(&first).unwrap().insert_vertex(Vertex::new(1.0, 2.0));
        let second = new.add_layer("upstairs", 300.0);
        new.add_guide(Guide::Vertical { x: 10.0 });
        new.width = 5000.0;

        let diff = SceneDiff::between(&old, &new);
        assert!(!diff.is_empty());
        let mut replayed = old.clone();
        diff.apply(&mut replayed);
        assert_eq!(replayed, new);
        assert_eq!(replayed.selected_layer(), &second);
    }

    #[test]
    fn removed_layers_are_replayed() {
        let mut old = Scene::default();
        let second = old.add_layer("upstairs", 300.0);
        let mut new = old.clone();
        new.remove_layer(&second).unwrap();
        let mut replayed = old.clone();
        SceneDiff::between(&old, &new).apply(&mut replayed);
        assert_eq!(replayed, new);
    }

    #[test]
    fn identical_scenes_give_an_empty_diff() {
        let scene = Scene::default();
        assert!(SceneDiff::between(&scene, &scene.clone()).is_empty());
    }
}
