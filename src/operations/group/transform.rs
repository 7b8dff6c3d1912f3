use std::collections::BTreeMap;

use nalgebra::Rotation2;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::math::{Matrix3, Point2, Vector2};
use crate::operations::areas::DetectAreas;
use crate::operations::editing::{MergeCoincidentVertices, RemoveZeroLengthLines};
use crate::scene::{GroupId, LayerId, Scene};
use crate::topology::{ElementRef, VertexId};

/// Applies a homogeneous 2D transform to every member of a group.
///
/// Each vertex of a member wall moves once even when several member walls
/// share it. Items move by their position and turn by `rotation`. Openings
/// ride along on their walls. Moved vertices are then merged with anything
/// they landed on and the rooms of every touched layer are re-derived.
struct TransformGroup {
    group: GroupId,
    matrix: Matrix3,
    rotation: f64,
}

impl TransformGroup {
    fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<()> {
        let group = scene.group(self.group)?.clone();

        let mut per_layer: BTreeMap<LayerId, (Vec<VertexId>, Vec<ElementRef>)> = BTreeMap::new();
        for (layer_id, element) in group.members() {
            let layer = scene.layer(layer_id)?;
            let (vertices, items) = per_layer.entry(layer_id.clone()).or_default();
            match element {
                ElementRef::Line(id) => {
                    for v in layer.line(id)?.vertices {
                        if !vertices.contains(&v) {
                            vertices.push(v);
                        }
                    }
                }
                ElementRef::Vertex(v) => {
                    if !vertices.contains(&v) {
                        vertices.push(v);
                    }
                }
                ElementRef::Item(_) => items.push(element),
                ElementRef::Hole(_) | ElementRef::Area(_) => {}
            }
        }

        for (layer_id, (vertices, items)) in &per_layer {
            let layer = scene.layer_mut(layer_id)?;
            for &v in vertices {
                let vertex = layer.vertex_mut(v)?;
                let moved = self.matrix.transform_point(&vertex.point());
                vertex.x = moved.x;
                vertex.y = moved.y;
            }
            for element in items {
                if let ElementRef::Item(id) = *element {
                    let item = layer.item_mut(id)?;
                    let moved = self.matrix.transform_point(&item.position());
                    item.x = moved.x;
                    item.y = moved.y;
                    item.rotation += self.rotation;
                }
            }
            for &v in vertices {
                if layer.vertex(v).is_ok() {
                    MergeCoincidentVertices::new(v).execute(layer)?;
                }
            }
            if !vertices.is_empty() {
                RemoveZeroLengthLines::new(layer_id.clone()).execute(scene)?;
                DetectAreas::new(layer_id.clone()).execute(scene, catalog)?;
            }
        }

        let group = scene.group_mut(self.group)?;
        let center = self.matrix.transform_point(&Point2::new(group.x, group.y));
        group.x = center.x;
        group.y = center.y;
        group.rotation += self.rotation;
        Ok(())
    }
}

/// Moves a group so that its barycenter lands on `(x, y)`.
pub struct TranslateGroup {
    group: GroupId,
    target: Point2,
}

impl TranslateGroup {
    #[must_use]
    pub fn new(group: GroupId, x: f64, y: f64) -> Self {
        Self {
            group,
            target: Point2::new(x, y),
        }
    }

    /// Executes the translation.
    ///
    /// # Errors
    ///
    /// Returns an error if the group or one of its members does not exist.
    pub fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<()> {
        let group = scene.group(self.group)?;
        let delta: Vector2 = self.target - Point2::new(group.x, group.y);
        debug!(group = ?self.group, dx = delta.x, dy = delta.y, "translate group");
        TransformGroup {
            group: self.group,
            matrix: Matrix3::new_translation(&delta),
            rotation: 0.0,
        }
        .execute(scene, catalog)
    }
}

/// Rotates a group about its barycenter.
pub struct RotateGroup {
    group: GroupId,
    degrees: f64,
}

impl RotateGroup {
    /// Creates a new `RotateGroup` operation.
    ///
    /// * `degrees` - Counter-clockwise rotation in degrees.
    #[must_use]
    pub fn new(group: GroupId, degrees: f64) -> Self {
        Self { group, degrees }
    }

    /// Executes the rotation.
    ///
    /// # Errors
    ///
    /// Returns an error if the group or one of its members does not exist.
    pub fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<()> {
        let group = scene.group(self.group)?;
        let center = Vector2::new(group.x, group.y);
        let rotation = Rotation2::new(self.degrees.to_radians()).to_homogeneous();
        let matrix = Matrix3::new_translation(&center) * rotation * Matrix3::new_translation(&-center);
        debug!(group = ?self.group, degrees = self.degrees, "rotate group");
        TransformGroup {
            group: self.group,
            matrix,
            rotation: self.degrees,
        }
        .execute(scene, catalog)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::operations::editing::CreateItem;
    use crate::operations::group::CreateGroup;
    use crate::operations::intersect::CreateLineAvoidingIntersections;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn l_shape(scene: &mut Scene) -> GroupId {
        let id = scene.selected_layer().clone();
        let catalog = test_catalog();
        let mut members = Vec::new();
        for (a, b) in [(p(0.0, 0.0), p(100.0, 0.0)), (p(100.0, 0.0), p(100.0, 100.0))] {
            for line in CreateLineAvoidingIntersections::new(id.clone(), "wall", a, b)
                .execute(scene, &catalog)
                .unwrap()
            {
                members.push((id.clone(), ElementRef::from(line)));
            }
        }
        CreateGroup::new("walls", members).execute(scene).unwrap()
    }

    #[test]
    fn translate_moves_shared_vertices_once() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let gid = l_shape(&mut scene);
        let before = scene.group(gid).unwrap().clone();

        TranslateGroup::new(gid, before.x + 10.0, before.y + 20.0)
            .execute(&mut scene, &test_catalog())
            .unwrap();
        let layer = scene.layer(&id).unwrap();
        assert_eq!(layer.vertices().count(), 3);
        assert!(layer.vertex_at(&p(10.0, 20.0)).is_some());
        assert!(layer.vertex_at(&p(110.0, 20.0)).is_some());
        assert!(layer.vertex_at(&p(110.0, 120.0)).is_some());
        assert_relative_eq!(scene.group(gid).unwrap().x, before.x + 10.0);
    }

    #[test]
    fn rotate_about_the_center() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let item = CreateItem::new("sofa", p(10.0, 0.0), 0.0)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        let other = CreateItem::new("sofa", p(-10.0, 0.0), 0.0)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        let gid = CreateGroup::new("pair", vec![(id.clone(), item.into()), (id.clone(), other.into())])
            .execute(&mut scene)
            .unwrap();

        RotateGroup::new(gid, 90.0).execute(&mut scene, &test_catalog()).unwrap();
        let layer = scene.layer(&id).unwrap();
        let moved = layer.item(item).unwrap();
        assert_relative_eq!(moved.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(moved.y, 10.0, epsilon = 1e-9);
        assert_relative_eq!(moved.rotation, 90.0);
        assert_relative_eq!(scene.group(gid).unwrap().rotation, 90.0);
    }

    #[test]
    fn translating_onto_another_wall_merges_vertices() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let catalog = test_catalog();
        CreateLineAvoidingIntersections::new(id.clone(), "wall", p(200.0, 0.0), p(300.0, 0.0))
            .execute(&mut scene, &catalog)
            .unwrap();
        let wall = CreateLineAvoidingIntersections::new(id.clone(), "wall", p(0.0, 50.0), p(100.0, 50.0))
            .execute(&mut scene, &catalog)
            .unwrap()[0];
        let gid = CreateGroup::new("w", vec![(id.clone(), wall.into())]).execute(&mut scene).unwrap();
        // Center (50, 50) -> (350, 0): the wall now starts where the other ends.
        TranslateGroup::new(gid, 350.0, 0.0).execute(&mut scene, &catalog).unwrap();
        let layer = scene.layer(&id).unwrap();
        assert_eq!(layer.vertices().count(), 3);
        let shared = layer.vertex_at(&p(300.0, 0.0)).unwrap();
        assert_eq!(layer.vertex(shared).unwrap().lines.len(), 2);
    }
}
