use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::cycles::inner_cycles;
use crate::catalog::{Catalog, AREA_ELEMENT};
use crate::error::Result;
use crate::math::polygon_2d::{is_clockwise, point_strictly_inside};
use crate::math::{same_points, Point2};
use crate::operations::editing::{RemoveVertex, VertexOwner};
use crate::scene::{LayerId, Scene};
use crate::topology::{Area, AreaId, Layer, Prototype, VertexId};

/// What a run of [`DetectAreas`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaUpdate {
    pub kept: Vec<AreaId>,
    pub created: Vec<AreaId>,
    pub removed: Vec<AreaId>,
}

/// Re-derives the rooms of a layer from its wall graph.
///
/// Rooms whose corner set survives keep their id and properties; rooms
/// whose loop disappeared are deleted; new loops become rooms built by the
/// catalog's area element. Nesting is then recomputed so that every room
/// lists only the rooms directly inside it.
pub struct DetectAreas {
    layer: LayerId,
}

impl DetectAreas {
    /// Creates a new `DetectAreas` operation.
    #[must_use]
    pub fn new(layer: LayerId) -> Self {
        Self { layer }
    }

    /// Executes the derivation.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is missing or inconsistent, or if a new
    /// room is needed and the catalog has no area element.
    pub fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<AreaUpdate> {
        let layer = scene.layer(&self.layer)?;
        let cycles = wall_cycles(layer)?;

        let mut matched = vec![false; cycles.len()];
        let mut update = AreaUpdate::default();
        let mut reshaped: Vec<(AreaId, usize)> = Vec::new();
        for (area_id, area) in layer.areas() {
            let corners: BTreeSet<VertexId> = area.vertices.iter().copied().collect();
            let found = cycles
                .iter()
                .enumerate()
                .position(|(i, c)| !matched[i] && c.iter().copied().collect::<BTreeSet<_>>() == corners);
            match found {
                Some(i) => {
                    matched[i] = true;
                    update.kept.push(area_id);
                    reshaped.push((area_id, i));
                }
                None => update.removed.push(area_id),
            }
        }

        let layer = scene.layer_mut(&self.layer)?;
        for (area_id, i) in reshaped {
            layer.area_mut(area_id)?.vertices.clone_from(&cycles[i]);
        }
        for &area_id in &update.removed {
            remove_area(layer, area_id)?;
        }
        for (i, cycle) in cycles.iter().enumerate() {
            if matched[i] {
                continue;
            }
            let template = catalog.factory(AREA_ELEMENT, Prototype::Area, None)?;
            let area_id = layer.insert_area(Area::new(template, cycle.clone()));
            for &v in cycle {
                let vertex = layer.vertex_mut(v)?;
                if !vertex.areas.contains(&area_id) {
                    vertex.areas.push(area_id);
                }
            }
            update.created.push(area_id);
        }

        assign_holes(layer)?;
        for &area_id in &update.removed {
            scene.detach_from_groups(&self.layer, area_id.into());
        }

        debug!(
            layer = %self.layer,
            kept = update.kept.len(),
            created = update.created.len(),
            removed = update.removed.len(),
            "detected areas"
        );
        Ok(update)
    }
}

/// Counter-clockwise vertex loops of the wall graph.
fn wall_cycles(layer: &Layer) -> Result<Vec<Vec<VertexId>>> {
    let mut ids: Vec<VertexId> = Vec::new();
    let mut points: Vec<Point2> = Vec::new();
    let mut index: HashMap<VertexId, usize> = HashMap::new();
    let mut edges = Vec::new();

    for (_, line) in layer.lines() {
        let mut ends = [0usize; 2];
        for (slot, &v) in line.vertices.iter().enumerate() {
            ends[slot] = match index.get(&v) {
                Some(&i) => i,
                None => {
                    let i = ids.len();
                    ids.push(v);
                    points.push(layer.vertex(v)?.point());
                    index.insert(v, i);
                    i
                }
            };
        }
        if !same_points(&points[ends[0]], &points[ends[1]]) {
            edges.push((ends[0], ends[1]));
        }
    }

    Ok(inner_cycles(&points, &edges)
        .into_iter()
        .map(|mut cycle| {
            let polygon: Vec<Point2> = cycle.iter().map(|&i| points[i]).collect();
            if is_clockwise(&polygon) {
                cycle.reverse();
            }
            cycle.into_iter().map(|i| ids[i]).collect()
        })
        .collect())
}

fn remove_area(layer: &mut Layer, area_id: AreaId) -> Result<()> {
    let area = layer.take_area(area_id)?;
    for v in area.vertices {
        if layer.vertex(v).is_ok() {
            RemoveVertex::new(v, Some(VertexOwner::Area(area_id))).execute(layer)?;
        }
    }
    Ok(())
}

/// Records for every room the rooms nested directly inside it.
fn assign_holes(layer: &mut Layer) -> Result<()> {
    let mut ids: Vec<AreaId> = Vec::new();
    let mut polygons: Vec<Vec<Point2>> = Vec::new();
    for (id, _) in layer.areas() {
        ids.push(id);
        polygons.push(layer.area_polygon(id)?);
    }

    // inside[i][j]: room j lies within room i.
    let n = ids.len();
    let mut inside = vec![vec![false; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                inside[i][j] = polygons[j]
                    .iter()
                    .any(|p| point_strictly_inside(&polygons[i], p));
            }
        }
    }

    for i in 0..n {
        let holes: Vec<AreaId> = (0..n)
            .filter(|&j| inside[i][j])
            .filter(|&j| !(0..n).any(|k| k != j && inside[i][k] && inside[k][j]))
            .map(|j| ids[j])
            .collect();
        layer.area_mut(ids[i])?.holes = holes;
    }
    Ok(())
}
