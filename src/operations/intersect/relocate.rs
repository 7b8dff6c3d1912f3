use tracing::debug;

use super::resolve::{CarriedHole, CreateLineAvoidingIntersections};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::math::Point2;
use crate::operations::areas::DetectAreas;
use crate::operations::editing::{MergeCoincidentVertices, RemoveLine, RemoveZeroLengthLines};
use crate::properties::Properties;
use crate::scene::{GroupId, LayerId, Scene};
use crate::topology::{LineId, VertexId};

/// A wall lifted off the layer, waiting to be redrawn in its new shape.
struct PendingLine {
    element_type: String,
    properties: Properties,
    start: Point2,
    end: Point2,
    carried: Vec<CarriedHole>,
    groups: Vec<GroupId>,
}

/// Commits vertex moves: every wall touching a moved vertex is redrawn
/// between its new endpoints through [`CreateLineAvoidingIntersections`],
/// keeping its type, properties, openings (at the same fractional offset)
/// and group memberships. Room corners keep their ids, so rooms whose shape
/// survives the move keep their ids and properties.
///
/// Backs the end of a vertex drag, the end of a wall drag and the
/// vertex/wall attribute editors.
pub struct RelocateVertices {
    layer: LayerId,
    moves: Vec<(VertexId, Point2)>,
}

impl RelocateVertices {
    #[must_use]
    pub fn new(layer: LayerId, moves: Vec<(VertexId, Point2)>) -> Self {
        Self { layer, moves }
    }

    fn target(&self, vertex: VertexId) -> Option<Point2> {
        self.moves.iter().find(|(v, _)| *v == vertex).map(|(_, p)| *p)
    }

    /// Executes the relocation, returning the walls created in place of the
    /// affected ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer or a moved vertex does not exist, or the
    /// catalog cannot rebuild a wall or room.
    pub fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<Vec<LineId>> {
        let layer = scene.layer(&self.layer)?;
        let mut affected: Vec<LineId> = Vec::new();
        for (vertex, _) in &self.moves {
            for &line in &layer.vertex(*vertex)?.lines {
                if !affected.contains(&line) {
                    affected.push(line);
                }
            }
        }

        let mut pending = Vec::with_capacity(affected.len());
        for &line_id in &affected {
            let line = layer.line(line_id)?;
            let [v0, v1] = line.vertices;
            let start = match self.target(v0) {
                Some(p) => p,
                None => layer.vertex(v0)?.point(),
            };
            let end = match self.target(v1) {
                Some(p) => p,
                None => layer.vertex(v1)?.point(),
            };
            pending.push(PendingLine {
                element_type: line.element_type.clone(),
                properties: line.properties.clone(),
                start,
                end,
                carried: CarriedHole::lift(layer, line_id, &start, &end)?,
                groups: scene.groups_containing(&self.layer, line_id.into()),
            });
        }

        for &line in &affected {
            RemoveLine::new(self.layer.clone(), line).execute(scene)?;
        }

        // Vertices still held by a room move in place so the room keeps its
        // vertex set and the redrawn walls land on the same ids.
        let layer = scene.layer_mut(&self.layer)?;
        let mut kept = Vec::new();
        for (vertex, target) in &self.moves {
            if let Ok(v) = layer.vertex_mut(*vertex) {
                v.x = target.x;
                v.y = target.y;
                kept.push(*vertex);
            }
        }
        for vertex in kept {
            if layer.vertex(vertex).is_ok() {
                MergeCoincidentVertices::new(vertex).execute(layer)?;
            }
        }

        let mut created = Vec::new();
        for line in pending {
            let ids = CreateLineAvoidingIntersections::new(
                self.layer.clone(),
                line.element_type,
                line.start,
                line.end,
            )
            .with_properties(Some(line.properties))
            .with_carried_holes(line.carried)
            .without_area_detection()
            .execute(scene, catalog)?;
            for group in line.groups {
                if let Ok(group) = scene.group_mut(group) {
                    for &id in &ids {
                        group.insert(&self.layer, id.into());
                    }
                }
            }
            created.extend(ids);
        }
        created.retain(|&id| scene.layer(&self.layer).is_ok_and(|l| l.line(id).is_ok()));

        RemoveZeroLengthLines::new(self.layer.clone()).execute(scene)?;
        DetectAreas::new(self.layer.clone()).execute(scene, catalog)?;
        debug!(moved = self.moves.len(), redrawn = affected.len(), "relocated vertices");
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::operations::editing::CreateHole;
    use crate::properties::PropertyValue;
    use crate::scene::Group;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn draw(scene: &mut Scene, a: Point2, b: Point2) -> Vec<LineId> {
        let id = scene.selected_layer().clone();
        CreateLineAvoidingIntersections::new(id, "wall", a, b)
            .execute(scene, &test_catalog())
            .unwrap()
    }

    #[test]
    fn moving_a_corner_stretches_both_walls() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        draw(&mut scene, p(100.0, 0.0), p(100.0, 100.0));
        let corner = scene.layer(&id).unwrap().vertex_at(&p(100.0, 0.0)).unwrap();

        let created = RelocateVertices::new(id.clone(), vec![(corner, p(120.0, 10.0))])
            .execute(&mut scene, &test_catalog())
            .unwrap();
        assert_eq!(created.len(), 2);
        let layer = scene.layer(&id).unwrap();
        assert!(layer.vertex_at(&p(100.0, 0.0)).is_none());
        let moved = layer.vertex_at(&p(120.0, 10.0)).unwrap();
        assert_eq!(layer.vertex(moved).unwrap().lines.len(), 2);
        assert_eq!(layer.vertices().count(), 3);
    }

    #[test]
    fn openings_keep_their_offset_and_groups_follow() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let wall = draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0))[0];
        CreateHole::new("door", wall, 0.5)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        let mut group = Group::new("g");
        group.insert(&id, wall.into());
        let gid = scene.insert_group(group);
        let end = scene.layer(&id).unwrap().line(wall).unwrap().vertices[1];

        let created = RelocateVertices::new(id.clone(), vec![(end, p(200.0, 0.0))])
            .execute(&mut scene, &test_catalog())
            .unwrap();
        let layer = scene.layer(&id).unwrap();
        let (hole, _) = layer.holes().next().unwrap();
        assert_relative_eq!(layer.hole_position(hole).unwrap().x, 100.0, epsilon = 1e-9);
        assert!(scene.group(gid).unwrap().contains(&id, created[0].into()));
    }

    #[test]
    fn dragged_room_corner_keeps_the_room() {
        let catalog = test_catalog();
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let corners = [p(0.0, 0.0), p(400.0, 0.0), p(400.0, 300.0), p(0.0, 300.0)];
        for i in 0..4 {
            draw(&mut scene, corners[i], corners[(i + 1) % 4]);
        }
        let (room, _) = scene.layer(&id).unwrap().areas().next().unwrap();
        scene
            .layer_mut(&id)
            .unwrap()
            .area_mut(room)
            .unwrap()
            .properties
            .insert("patternColor", PropertyValue::Text("#ff0000".into()));
        let corner = scene.layer(&id).unwrap().vertex_at(&p(400.0, 300.0)).unwrap();

        RelocateVertices::new(id.clone(), vec![(corner, p(450.0, 350.0))])
            .execute(&mut scene, &catalog)
            .unwrap();
        let layer = scene.layer(&id).unwrap();
        assert_eq!(layer.areas().count(), 1);
        let area = layer.area(room).unwrap();
        assert_eq!(
            area.properties.get("patternColor"),
            Some(&PropertyValue::Text("#ff0000".into()))
        );
        assert_eq!(layer.vertex_at(&p(450.0, 350.0)), Some(corner));
        assert!(area.vertices.contains(&corner));
        assert_eq!(layer.vertex(corner).unwrap().lines.len(), 2);
    }

    #[test]
    fn collapsing_a_wall_removes_it() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        draw(&mut scene, p(100.0, 0.0), p(100.0, 100.0));
        let corner = scene.layer(&id).unwrap().vertex_at(&p(100.0, 100.0)).unwrap();

        RelocateVertices::new(id.clone(), vec![(corner, p(100.0, 0.0))])
            .execute(&mut scene, &test_catalog())
            .unwrap();
        let layer = scene.layer(&id).unwrap();
        assert_eq!(layer.lines().count(), 1);
        assert_eq!(layer.vertices().count(), 2);
    }
}
