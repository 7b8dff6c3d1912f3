use slotmap::Key;
use tracing::debug;

use super::vertex::{AddVertex, RemoveVertex, VertexOwner};
use crate::catalog::{Catalog, ElementTemplate};
use crate::error::Result;
use crate::math::distance_2d::position_on_segment;
use crate::math::{same_points, Point2};
use crate::properties::Properties;
use crate::scene::{LayerId, Scene};
use crate::topology::{Layer, Line, LineId, Prototype, VertexId};

/// Draws a wall between two positions, reusing any vertex already there.
pub struct CreateLine {
    element_type: String,
    start: Point2,
    end: Point2,
    properties: Option<Properties>,
}

impl CreateLine {
    /// Creates a new `CreateLine` operation for the catalog type `element_type`.
    #[must_use]
    pub fn new(element_type: impl Into<String>, start: Point2, end: Point2) -> Self {
        Self {
            element_type: element_type.into(),
            start,
            end,
            properties: None,
        }
    }

    /// Overrides layered on top of the catalog defaults.
    #[must_use]
    pub fn with_properties(mut self, properties: Option<Properties>) -> Self {
        self.properties = properties;
        self
    }

    /// Executes the operation, returning the new line.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog has no line element named `element_type`.
    pub fn execute(&self, layer: &mut Layer, catalog: &Catalog) -> Result<LineId> {
        let template =
            catalog.factory(&self.element_type, Prototype::Line, self.properties.as_ref())?;
        insert_segment(layer, &template, self.start, self.end)
    }
}

/// Deletes a wall with its openings, releasing its endpoints.
pub struct RemoveLine {
    layer: LayerId,
    line: LineId,
}

impl RemoveLine {
    /// Creates a new `RemoveLine` operation.
    #[must_use]
    pub fn new(layer: LayerId, line: LineId) -> Self {
        Self { layer, line }
    }

    /// Executes the operation, returning the removed line.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer or line does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<Line> {
        let layer = scene.layer_mut(&self.layer)?;
        layer.unselect(self.line.into())?;
        let holes = layer.line(self.line)?.holes.clone();
        for &hole in &holes {
            layer.take_hole(hole)?;
        }
        let line = layer.take_line(self.line)?;
        let [v0, v1] = line.vertices;
        RemoveVertex::new(v0, Some(VertexOwner::Line(self.line))).execute(layer)?;
        if v1 != v0 {
            RemoveVertex::new(v1, Some(VertexOwner::Line(self.line))).execute(layer)?;
        }

        scene.detach_from_groups(&self.layer, self.line.into());
        for hole in holes {
            scene.detach_from_groups(&self.layer, hole.into());
        }
        Ok(line)
    }
}

/// Moves one endpoint of a wall onto the vertex at a position.
pub struct ReplaceLineVertex {
    line: LineId,
    index: usize,
    point: Point2,
}

impl ReplaceLineVertex {
    /// Creates a new `ReplaceLineVertex` operation; `index` is `0` or `1`.
    #[must_use]
    pub fn new(line: LineId, index: usize, point: Point2) -> Self {
        Self {
            line,
            index: index.min(1),
            point,
        }
    }

    /// Executes the operation, returning the vertex now used as endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or its vertices do not exist.
    pub fn execute(&self, layer: &mut Layer) -> Result<VertexId> {
        let vertices = layer.line(self.line)?.vertices;
        let old = vertices[self.index];
        if vertices[1 - self.index] != old {
            RemoveVertex::new(old, Some(VertexOwner::Line(self.line))).execute(layer)?;
        }
        let new = AddVertex::new(self.point.x, self.point.y, VertexOwner::Line(self.line))
            .execute(layer)?;
        layer.line_mut(self.line)?.vertices[self.index] = new;
        Ok(new)
    }
}

/// Cuts a wall in two at a point, keeping every opening at its position.
pub struct SplitLine {
    layer: LayerId,
    line: LineId,
    point: Point2,
}

impl SplitLine {
    /// Creates a new `SplitLine` operation.
    #[must_use]
    pub fn new(layer: LayerId, line: LineId, point: Point2) -> Self {
        Self { layer, line, point }
    }

    /// Executes the split, returning the halves from the first vertex side.
    ///
    /// The halves inherit the wall's type and properties and join every
    /// group the wall belonged to.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer or line does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<(LineId, LineId)> {
        let groups = scene.groups_containing(&self.layer, self.line.into());
        let layer = scene.layer_mut(&self.layer)?;
        let (p0, p1) = layer.line_points(self.line)?;
        let t = position_on_segment(&p0, &p1, &self.point).clamp(0.0, 1.0);

        let source = layer.line(self.line)?;
        let template = source.template();
        let holes = source.holes.clone();
        let first = insert_segment(layer, &template, p0, self.point)?;
        let second = insert_segment(layer, &template, self.point, p1)?;

        for hole_id in holes {
            let hole = layer.hole_mut(hole_id)?;
            let (target, offset) = if hole.offset < t {
                (first, if t > 0.0 { hole.offset / t } else { 0.0 })
            } else {
                (second, if t < 1.0 { (hole.offset - t) / (1.0 - t) } else { 1.0 })
            };
            hole.line = target;
            hole.offset = offset;
            layer.line_mut(target)?.holes.push(hole_id);
        }
        layer.line_mut(self.line)?.holes.clear();

        RemoveLine::new(self.layer.clone(), self.line).execute(scene)?;
        for group in groups {
            let group = scene.group_mut(group)?;
            group.insert(&self.layer, first.into());
            group.insert(&self.layer, second.into());
        }
        debug!(line = ?self.line, t, "split line");
        Ok((first, second))
    }
}

/// Inserts a wall stamped from `template` and wires its endpoints.
fn insert_segment(
    layer: &mut Layer,
    template: &ElementTemplate,
    start: Point2,
    end: Point2,
) -> Result<LineId> {
    let id = layer.insert_line(Line::new(template.clone(), [VertexId::null(); 2]));
    let v0 = AddVertex::new(start.x, start.y, VertexOwner::Line(id)).execute(layer)?;
    let v1 = AddVertex::new(end.x, end.y, VertexOwner::Line(id)).execute(layer)?;
    layer.line_mut(id)?.vertices = [v0, v1];
    Ok(id)
}

/// Deletes every wall whose endpoints coincide.
pub struct RemoveZeroLengthLines {
    layer: LayerId,
}

impl RemoveZeroLengthLines {
    #[must_use]
    pub fn new(layer: LayerId) -> Self {
        Self { layer }
    }

    /// Executes the cleanup, returning the removed lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer does not exist or is inconsistent.
    pub fn execute(&self, scene: &mut Scene) -> Result<Vec<LineId>> {
        let layer = scene.layer(&self.layer)?;
        let mut degenerate = Vec::new();
        for (id, _) in layer.lines() {
            let (p0, p1) = layer.line_points(id)?;
            if same_points(&p0, &p1) {
                degenerate.push(id);
            }
        }
        for &id in &degenerate {
            RemoveLine::new(self.layer.clone(), id).execute(scene)?;
        }
        if !degenerate.is_empty() {
            debug!(count = degenerate.len(), "removed zero-length lines");
        }
        Ok(degenerate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::operations::editing::CreateHole;
    use crate::scene::Group;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn draw(scene: &mut Scene, a: Point2, b: Point2) -> LineId {
        let id = scene.selected_layer().clone();
        CreateLine::new("wall", a, b)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap()
    }

    #[test]
    fn create_line_shares_vertices() {
        let mut scene = Scene::default();
        let a = draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        let b = draw(&mut scene, p(100.0, 0.0), p(100.0, 100.0));
        let layer = scene.layer(scene.selected_layer()).unwrap();
        assert_eq!(layer.vertices().count(), 3);
        let shared = layer.line(a).unwrap().vertices[1];
        assert_eq!(layer.line(b).unwrap().vertices[0], shared);
        assert_eq!(layer.vertex(shared).unwrap().lines, vec![a, b]);
        assert_relative_eq!(layer.line(a).unwrap().properties.length("height").unwrap(), 300.0);
    }

    #[test]
    fn remove_line_cleans_vertices_and_holes() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let a = draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        let b = draw(&mut scene, p(100.0, 0.0), p(100.0, 100.0));
        let hole = CreateHole::new("door", a, 0.5)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        let mut group = Group::new("g");
        group.insert(&id, a.into());
        group.insert(&id, hole.into());
        let gid = scene.insert_group(group);

        RemoveLine::new(id.clone(), a).execute(&mut scene).unwrap();
        let layer = scene.layer(&id).unwrap();
        assert!(layer.line(a).is_err());
        assert!(layer.hole(hole).is_err());
        assert_eq!(layer.vertices().count(), 2);
        assert!(layer.line(b).is_ok());
        assert!(scene.group(gid).unwrap().elements.is_empty());
    }

    #[test]
    fn split_line_keeps_hole_position() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let wall = draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        let near = CreateHole::new("door", wall, 0.2)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        let far = CreateHole::new("door", wall, 0.8)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        let mut group = Group::new("g");
        group.insert(&id, wall.into());
        let gid = scene.insert_group(group);

        let (first, second) = SplitLine::new(id.clone(), wall, p(40.0, 0.0))
            .execute(&mut scene)
            .unwrap();
        let layer = scene.layer(&id).unwrap();
        assert!(layer.line(wall).is_err());
        assert_eq!(layer.hole(near).unwrap().line, first);
        assert_eq!(layer.hole(far).unwrap().line, second);
        assert_relative_eq!(layer.hole_position(near).unwrap().x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(layer.hole_position(far).unwrap().x, 80.0, epsilon = 1e-9);
        assert_eq!(layer.vertices().count(), 3);

        let group = scene.group(gid).unwrap();
        assert!(group.contains(&id, first.into()));
        assert!(group.contains(&id, second.into()));
        assert!(!group.contains(&id, wall.into()));
    }

    #[test]
    fn replace_vertex_releases_the_old_endpoint() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let wall = draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        let layer = scene.layer_mut(&id).unwrap();
        ReplaceLineVertex::new(wall, 1, p(50.0, 50.0)).execute(layer).unwrap();
        let (_, end) = layer.line_points(wall).unwrap();
        assert_eq!(end, p(50.0, 50.0));
        assert_eq!(layer.vertices().count(), 2);
        assert!(layer.vertex_at(&p(100.0, 0.0)).is_none());
    }

    #[test]
    fn zero_length_lines_are_removed() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let keep = draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        let gone = draw(&mut scene, p(100.0, 0.0), p(100.0, 0.0));
        let removed = RemoveZeroLengthLines::new(id.clone()).execute(&mut scene).unwrap();
        assert_eq!(removed, vec![gone]);
        let layer = scene.layer(&id).unwrap();
        assert!(layer.line(keep).is_ok());
        assert_eq!(layer.vertices().count(), 2);
        let corner = layer.vertex_at(&p(100.0, 0.0)).unwrap();
        assert_eq!(layer.vertex(corner).unwrap().lines, vec![keep]);
    }
}
