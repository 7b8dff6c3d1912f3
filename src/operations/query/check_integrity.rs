use crate::error::{Result, TopologyError};
use crate::math::same_points;
use crate::scene::{LayerId, Scene};
use crate::topology::{ElementRef, Layer};

/// Validates the structural invariants of a scene.
///
/// Checks, per layer: no two vertices share a position, every cross
/// reference (vertex/line/hole/area) points at a live entity and is
/// mirrored on the other side, rooms have at least three corners, and the
/// selection index agrees with the per-entity flags. Group members and the
/// drawing layer must exist as well.
pub struct CheckIntegrity;

fn invalid(layer: &LayerId, message: impl std::fmt::Display) -> TopologyError {
    TopologyError::InvalidTopology(format!("{layer}: {message}"))
}

impl CheckIntegrity {
    /// Executes the validation.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] describing the first violation.
    pub fn execute(&self, scene: &Scene) -> Result<()> {
        scene.layer(scene.selected_layer())?;
        for (id, layer) in scene.layers() {
            check_layer(id, layer)?;
        }
        for (group_id, group) in scene.groups() {
            for (layer_id, element) in group.members() {
                if !scene.layer(layer_id)?.contains(element) {
                    return Err(invalid(layer_id, format!("group {group_id:?} lists missing {element:?}")).into());
                }
            }
        }
        Ok(())
    }
}

fn check_layer(id: &LayerId, layer: &Layer) -> std::result::Result<(), TopologyError> {
    let vertices: Vec<_> = layer.vertices().collect();
    for (i, (a_id, a)) in vertices.iter().enumerate() {
        for (b_id, b) in &vertices[i + 1..] {
            if same_points(&a.point(), &b.point()) {
                return Err(invalid(id, format!("vertices {a_id:?} and {b_id:?} coincide")));
            }
        }
        for &line in &a.lines {
            if !layer.line(line)?.vertices.contains(a_id) {
                return Err(invalid(id, format!("vertex {a_id:?} lists {line:?}, which does not use it")));
            }
        }
        for &area in &a.areas {
            if !layer.area(area)?.vertices.contains(a_id) {
                return Err(invalid(id, format!("vertex {a_id:?} lists {area:?}, which does not use it")));
            }
        }
        check_flag(id, layer, (*a_id).into(), a.selected)?;
    }

    for (line_id, line) in layer.lines() {
        for v in line.vertices {
            if !layer.vertex(v)?.lines.contains(&line_id) {
                return Err(invalid(id, format!("{line_id:?} is missing from {v:?}")));
            }
        }
        for &hole in &line.holes {
            if layer.hole(hole)?.line != line_id {
                return Err(invalid(id, format!("{hole:?} is listed on {line_id:?} but sits elsewhere")));
            }
        }
        check_flag(id, layer, line_id.into(), line.selected)?;
    }

    for (hole_id, hole) in layer.holes() {
        if !layer.line(hole.line)?.holes.contains(&hole_id) {
            return Err(invalid(id, format!("{hole_id:?} is missing from {:?}", hole.line)));
        }
        check_flag(id, layer, hole_id.into(), hole.selected)?;
    }

    for (area_id, area) in layer.areas() {
        if area.vertices.len() < 3 {
            return Err(invalid(id, format!("{area_id:?} has {} corners", area.vertices.len())));
        }
        for &v in &area.vertices {
            if !layer.vertex(v)?.areas.contains(&area_id) {
                return Err(invalid(id, format!("{area_id:?} is missing from {v:?}")));
            }
        }
        for &nested in &area.holes {
            layer.area(nested)?;
        }
        check_flag(id, layer, area_id.into(), area.selected)?;
    }

    for (item_id, item) in layer.items() {
        check_flag(id, layer, item_id.into(), item.selected)?;
    }

    for element in layer.selected().iter() {
        if !layer.contains(element) {
            return Err(invalid(id, format!("selection lists missing {element:?}")));
        }
    }
    Ok(())
}

fn check_flag(
    id: &LayerId,
    layer: &Layer,
    element: ElementRef,
    flag: bool,
) -> std::result::Result<(), TopologyError> {
    if layer.selected().contains(element) == flag {
        Ok(())
    } else {
        Err(invalid(id, format!("selection flag of {element:?} disagrees with the index")))
    }
}
