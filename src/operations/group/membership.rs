use std::collections::BTreeSet;

use tracing::debug;

use super::barycenter::RecalculateBarycenter;
use crate::catalog::Catalog;
use crate::error::{InputError, Result, TopologyError};
use crate::operations::areas::DetectAreas;
use crate::operations::editing::{RemoveHole, RemoveItem, RemoveLine};
use crate::scene::{Group, GroupId, LayerId, Scene};
use crate::topology::ElementRef;

fn check_member(scene: &Scene, layer: &LayerId, element: ElementRef) -> Result<()> {
    if scene.layer(layer)?.contains(element) {
        Ok(())
    } else {
        Err(TopologyError::not_found(element.prototype(), element).into())
    }
}

/// Creates a group from explicit members.
pub struct CreateGroup {
    name: String,
    members: Vec<(LayerId, ElementRef)>,
}

impl CreateGroup {
    #[must_use]
    pub fn new(name: impl Into<String>, members: Vec<(LayerId, ElementRef)>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    /// Executes the operation, returning the new group.
    ///
    /// # Errors
    ///
    /// Returns an error if a member does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<GroupId> {
        let mut group = Group::new(self.name.as_str());
        for (layer, element) in &self.members {
            check_member(scene, layer, *element)?;
            group.insert(layer, *element);
        }
        let id = scene.insert_group(group);
        RecalculateBarycenter::new(id).execute(scene)?;
        debug!(?id, members = self.members.len(), "created group");
        Ok(id)
    }
}

/// Creates a group from every selected line, hole, area and item.
pub struct CreateGroupFromSelection {
    name: String,
}

impl CreateGroupFromSelection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Executes the operation, returning the new group.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptySelection`] if nothing is selected.
    pub fn execute(&self, scene: &mut Scene) -> Result<GroupId> {
        let members: Vec<(LayerId, ElementRef)> = scene
            .layers()
            .flat_map(|(id, layer)| {
                layer
                    .selected()
                    .iter()
                    .filter(|e| !matches!(e, ElementRef::Vertex(_)))
                    .map(move |e| (id.clone(), e))
            })
            .collect();
        if members.is_empty() {
            return Err(InputError::EmptySelection.into());
        }
        CreateGroup::new(self.name.as_str(), members).execute(scene)
    }
}

/// Adds one element to a group.
pub struct AddToGroup {
    group: GroupId,
    layer: LayerId,
    element: ElementRef,
}

impl AddToGroup {
    #[must_use]
    pub fn new(group: GroupId, layer: LayerId, element: ElementRef) -> Self {
        Self {
            group,
            layer,
            element,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the group or element does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<()> {
        check_member(scene, &self.layer, self.element)?;
        scene.group_mut(self.group)?.insert(&self.layer, self.element);
        RecalculateBarycenter::new(self.group).execute(scene)?;
        Ok(())
    }
}

/// Removes one element from a group; the element stays in the scene.
pub struct RemoveFromGroup {
    group: GroupId,
    layer: LayerId,
    element: ElementRef,
}

impl RemoveFromGroup {
    #[must_use]
    pub fn new(group: GroupId, layer: LayerId, element: ElementRef) -> Self {
        Self {
            group,
            layer,
            element,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<()> {
        scene.group_mut(self.group)?.remove(&self.layer, self.element);
        RecalculateBarycenter::new(self.group).execute(scene)?;
        Ok(())
    }
}

/// Dissolves a group, keeping its members.
pub struct RemoveGroup {
    group: GroupId,
}

impl RemoveGroup {
    #[must_use]
    pub fn new(group: GroupId) -> Self {
        Self { group }
    }

    /// Executes the operation, returning the removed group.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<Group> {
        Ok(scene.take_group(self.group)?)
    }
}

/// Deletes a group together with its walls, openings and items.
///
/// Member vertices and rooms are not deleted directly: they follow from
/// the walls through room re-derivation.
pub struct RemoveGroupAndDeleteElements {
    group: GroupId,
}

impl RemoveGroupAndDeleteElements {
    #[must_use]
    pub fn new(group: GroupId) -> Self {
        Self { group }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist or a room cannot be rebuilt.
    pub fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<()> {
        let group = scene.take_group(self.group)?;
        let mut touched: BTreeSet<LayerId> = BTreeSet::new();
        for (layer_id, element) in group.members() {
            if !scene.layer(layer_id)?.contains(element) {
                continue;
            }
            match element {
                ElementRef::Line(id) => {
                    RemoveLine::new(layer_id.clone(), id).execute(scene)?;
                    touched.insert(layer_id.clone());
                }
                ElementRef::Hole(id) => {
                    RemoveHole::new(layer_id.clone(), id).execute(scene)?;
                }
                ElementRef::Item(id) => {
                    RemoveItem::new(layer_id.clone(), id).execute(scene)?;
                }
                ElementRef::Vertex(_) | ElementRef::Area(_) => {}
            }
        }
        for layer_id in touched {
            DetectAreas::new(layer_id).execute(scene, catalog)?;
        }
        Ok(())
    }
}

/// Selects a group and every one of its members.
pub struct SelectGroup {
    group: GroupId,
}

impl SelectGroup {
    #[must_use]
    pub fn new(group: GroupId) -> Self {
        Self { group }
    }

    /// Executes the operation, replacing the current selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the group or one of its members does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<()> {
        let members: Vec<(LayerId, ElementRef)> = scene
            .group(self.group)?
            .members()
            .map(|(layer, element)| (layer.clone(), element))
            .collect();
        scene.unselect_all();
        for (layer, element) in members {
            scene.layer_mut(&layer)?.select(element)?;
        }
        scene.group_mut(self.group)?.selected = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::error::PlannerError;
    use crate::math::Point2;
    use crate::operations::editing::CreateItem;
    use crate::operations::intersect::CreateLineAvoidingIntersections;

    fn square(scene: &mut Scene) -> Vec<ElementRef> {
        let id = scene.selected_layer().clone();
        let corners = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];
        let mut walls = Vec::new();
        for i in 0..4 {
            let (x0, y0) = corners[i];
            let (x1, y1) = corners[(i + 1) % 4];
            let created = CreateLineAvoidingIntersections::new(
                id.clone(),
                "wall",
                Point2::new(x0, y0),
                Point2::new(x1, y1),
            )
            .execute(scene, &test_catalog())
            .unwrap();
            walls.extend(created.into_iter().map(ElementRef::from));
        }
        walls
    }

    #[test]
    fn group_from_selection() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        assert!(matches!(
            CreateGroupFromSelection::new("empty").execute(&mut scene).unwrap_err(),
            PlannerError::Input(InputError::EmptySelection)
        ));

        let item = CreateItem::new("sofa", Point2::new(10.0, 20.0), 0.0)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        scene.layer_mut(&id).unwrap().select(item.into()).unwrap();
        let gid = CreateGroupFromSelection::new("furniture").execute(&mut scene).unwrap();
        let group = scene.group(gid).unwrap();
        assert!(group.contains(&id, item.into()));
        assert!((group.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn membership_changes_update_the_center() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let layer = scene.layer_mut(&id).unwrap();
        let a = CreateItem::new("sofa", Point2::new(0.0, 0.0), 0.0)
            .execute(layer, &test_catalog())
            .unwrap();
        let b = CreateItem::new("sofa", Point2::new(100.0, 0.0), 0.0)
            .execute(layer, &test_catalog())
            .unwrap();
        let gid = CreateGroup::new("pair", vec![(id.clone(), a.into())]).execute(&mut scene).unwrap();
        AddToGroup::new(gid, id.clone(), b.into()).execute(&mut scene).unwrap();
        assert!((scene.group(gid).unwrap().x - 50.0).abs() < 1e-9);
        RemoveFromGroup::new(gid, id.clone(), a.into()).execute(&mut scene).unwrap();
        assert!((scene.group(gid).unwrap().x - 100.0).abs() < 1e-9);

        RemoveGroup::new(gid).execute(&mut scene).unwrap();
        assert!(scene.group(gid).is_err());
        assert_eq!(scene.layer(&id).unwrap().items().count(), 2);
    }

    #[test]
    fn deleting_a_group_deletes_walls_and_rooms() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let walls = square(&mut scene);
        assert_eq!(scene.layer(&id).unwrap().areas().count(), 1);
        let members = walls.into_iter().map(|w| (id.clone(), w)).collect();
        let gid = CreateGroup::new("room", members).execute(&mut scene).unwrap();

        RemoveGroupAndDeleteElements::new(gid)
            .execute(&mut scene, &test_catalog())
            .unwrap();
        let layer = scene.layer(&id).unwrap();
        assert_eq!(layer.lines().count(), 0);
        assert_eq!(layer.areas().count(), 0);
        assert_eq!(layer.vertices().count(), 0);
        assert!(scene.group(gid).is_err());
    }

    #[test]
    fn selecting_a_group_selects_its_members() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let walls = square(&mut scene);
        let members = walls.iter().map(|w| (id.clone(), *w)).collect();
        let gid = CreateGroup::new("room", members).execute(&mut scene).unwrap();
        SelectGroup::new(gid).execute(&mut scene).unwrap();
        assert_eq!(scene.layer(&id).unwrap().selected().lines.len(), 4);
        assert!(scene.group(gid).unwrap().selected);
    }
}
