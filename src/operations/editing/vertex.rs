use tracing::debug;

use crate::error::Result;
use crate::math::{same_points, Point2};
use crate::topology::{AreaId, Layer, LineId, Vertex, VertexId};

/// The element that keeps a vertex alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexOwner {
    Line(LineId),
    Area(AreaId),
}

/// Finds the vertex at a position, or creates one, and registers an owner on it.
pub struct AddVertex {
    point: Point2,
    owner: VertexOwner,
}

impl AddVertex {
    /// Creates a new `AddVertex` operation.
    #[must_use]
    pub fn new(x: f64, y: f64, owner: VertexOwner) -> Self {
        Self {
            point: Point2::new(x, y),
            owner,
        }
    }

    /// Executes the operation, returning the existing or new vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is inconsistent.
    pub fn execute(&self, layer: &mut Layer) -> Result<VertexId> {
        let id = match layer.vertex_at(&self.point) {
            Some(id) => id,
            None => layer.insert_vertex(Vertex::new(self.point.x, self.point.y)),
        };
        let vertex = layer.vertex_mut(id)?;
        match self.owner {
            VertexOwner::Line(line) => {
                if !vertex.lines.contains(&line) {
                    vertex.lines.push(line);
                }
            }
            VertexOwner::Area(area) => {
                if !vertex.areas.contains(&area) {
                    vertex.areas.push(area);
                }
            }
        }
        Ok(id)
    }
}

/// Drops an owner reference from a vertex and deletes the vertex once
/// nothing references it (or unconditionally with `force`).
pub struct RemoveVertex {
    vertex: VertexId,
    owner: Option<VertexOwner>,
    force: bool,
}

impl RemoveVertex {
    /// Creates a new `RemoveVertex` operation.
    #[must_use]
    pub fn new(vertex: VertexId, owner: Option<VertexOwner>) -> Self {
        Self {
            vertex,
            owner,
            force: false,
        }
    }

    /// Deletes the vertex even if lines or areas still reference it.
    #[must_use]
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Executes the operation. Returns `true` if the vertex was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist.
    pub fn execute(&self, layer: &mut Layer) -> Result<bool> {
        let vertex = layer.vertex_mut(self.vertex)?;
        match self.owner {
            Some(VertexOwner::Line(line)) => vertex.lines.retain(|&l| l != line),
            Some(VertexOwner::Area(area)) => vertex.areas.retain(|&a| a != area),
            None => {}
        }
        if self.force || vertex.is_orphan() {
            layer.take_vertex(self.vertex)?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Rewires every reference to a vertex coincident with `vertex` onto
/// `vertex`, then force-removes the duplicates.
pub struct MergeCoincidentVertices {
    vertex: VertexId,
}

impl MergeCoincidentVertices {
    /// Creates a new `MergeCoincidentVertices` operation.
    #[must_use]
    pub fn new(vertex: VertexId) -> Self {
        Self { vertex }
    }

    /// Executes the merge, returning the ids of the removed duplicates.
    ///
    /// Running it again on the same vertex finds nothing to merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist or a reference dangles.
    pub fn execute(&self, layer: &mut Layer) -> Result<Vec<VertexId>> {
        let target = layer.vertex(self.vertex)?.point();
        let duplicates: Vec<VertexId> = layer
            .vertices()
            .filter(|(id, v)| *id != self.vertex && same_points(&v.point(), &target))
            .map(|(id, _)| id)
            .collect();

        for &duplicate in &duplicates {
            let (lines, areas) = {
                let dup = layer.vertex(duplicate)?;
                (dup.lines.clone(), dup.areas.clone())
            };

            for &line_id in &lines {
                let line = layer.line_mut(line_id)?;
                for v in &mut line.vertices {
                    if *v == duplicate {
                        *v = self.vertex;
                    }
                }
            }
            for &area_id in &areas {
                let area = layer.area_mut(area_id)?;
                for v in &mut area.vertices {
                    if *v == duplicate {
                        *v = self.vertex;
                    }
                }
                area.vertices.dedup();
            }

            let kept = layer.vertex_mut(self.vertex)?;
            for line_id in lines {
                if !kept.lines.contains(&line_id) {
                    kept.lines.push(line_id);
                }
            }
            for area_id in areas {
                if !kept.areas.contains(&area_id) {
                    kept.areas.push(area_id);
                }
            }

            RemoveVertex::new(duplicate, None).forced().execute(layer)?;
        }

        if !duplicates.is_empty() {
            debug!(count = duplicates.len(), "merged coincident vertices");
        }
        Ok(duplicates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::operations::editing::CreateLine;
    use slotmap::KeyData;

    fn line_id(n: u64) -> LineId {
        LineId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn add_vertex_reuses_coincident_vertex() {
        let mut layer = Layer::new("layer", 0.0);
        let a = AddVertex::new(1.0, 1.0, VertexOwner::Line(line_id(1)))
            .execute(&mut layer)
            .unwrap();
        let b = AddVertex::new(1.0, 1.0, VertexOwner::Line(line_id(2)))
            .execute(&mut layer)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(layer.vertex(a).unwrap().lines.len(), 2);
        assert_eq!(layer.vertices().count(), 1);
    }

    #[test]
    fn remove_vertex_keeps_referenced_vertex() {
        let mut layer = Layer::new("layer", 0.0);
        let owner_a = VertexOwner::Line(line_id(1));
        let owner_b = VertexOwner::Line(line_id(2));
        let v = AddVertex::new(0.0, 0.0, owner_a).execute(&mut layer).unwrap();
        AddVertex::new(0.0, 0.0, owner_b).execute(&mut layer).unwrap();

        assert!(!RemoveVertex::new(v, Some(owner_a)).execute(&mut layer).unwrap());
        assert!(layer.vertex(v).is_ok());
        assert!(RemoveVertex::new(v, Some(owner_b)).execute(&mut layer).unwrap());
        assert!(layer.vertex(v).is_err());
    }

    #[test]
    fn forced_removal_ignores_references() {
        let mut layer = Layer::new("layer", 0.0);
        let v = AddVertex::new(0.0, 0.0, VertexOwner::Line(line_id(1)))
            .execute(&mut layer)
            .unwrap();
        assert!(RemoveVertex::new(v, None).forced().execute(&mut layer).unwrap());
    }

    #[test]
    fn merge_is_idempotent() {
        let catalog = test_catalog();
        let mut layer = Layer::new("layer", 0.0);
        let a = CreateLine::new("wall", Point2::new(0.0, 0.0), Point2::new(2.0, 2.0))
            .execute(&mut layer, &catalog)
            .unwrap();
        let b = CreateLine::new("wall", Point2::new(2.0, 5.0), Point2::new(5.0, 5.0))
            .execute(&mut layer, &catalog)
            .unwrap();
        let keep = layer.line(a).unwrap().vertices[1];
        let dup = layer.line(b).unwrap().vertices[0];
        let vertex = layer.vertex_mut(dup).unwrap();
        vertex.x = 2.0;
        vertex.y = 2.0;

        let removed = MergeCoincidentVertices::new(keep).execute(&mut layer).unwrap();
        assert_eq!(removed, vec![dup]);
        assert_eq!(layer.line(b).unwrap().vertices[0], keep);
        assert_eq!(layer.vertex(keep).unwrap().lines, vec![a, b]);
        assert_eq!(layer.vertices().count(), 3);

        let snapshot = layer.clone();
        let removed = MergeCoincidentVertices::new(keep).execute(&mut layer).unwrap();
        assert!(removed.is_empty());
        assert_eq!(layer, snapshot);
    }
}
