use tracing::{debug, warn};

use super::mode::{
    DraggingHole, DraggingItem, DraggingLine, DraggingVertex, DrawingHole, DrawingItem,
    DrawingLine, Mode, RotatingItem, WaitingLine,
};
use super::Editor;
use crate::error::{InputError, Result, TopologyError};
use crate::math::distance_2d::{closest_point_on_segment, points_distance, position_on_segment};
use crate::math::line_2d::angle_between_points;
use crate::math::{same_points, Point2, Vector2};
use crate::operations::editing::{
    CreateHole, CreateItem, CreateLine, MoveHole, RemoveHole, RemoveItem, ReplaceLineVertex,
};
use crate::operations::intersect::{CreateLineAvoidingIntersections, RelocateVertices};
use crate::scene::{LayerId, Scene};
use crate::snap::{nearest_snap, Snap};
use crate::topology::{ElementRef, HoleId, ItemId, Layer, LineId, VertexId};

/// Replaces the selection with whichever of `elements` survived the commit.
fn reselect(scene: &mut Scene, layer: &LayerId, elements: impl IntoIterator<Item = ElementRef>) -> Result<()> {
    scene.unselect_all();
    let layer = scene.layer_mut(layer)?;
    for element in elements {
        if layer.contains(element) {
            layer.select(element)?;
        }
    }
    Ok(())
}

/// Center offset keeping an opening of `width` inside its wall.
fn clamped_offset(layer: &Layer, line: LineId, width: f64, t: f64) -> Result<f64> {
    let (a, b) = layer.line_points(line)?;
    let length = points_distance(&a, &b);
    if length <= 0.0 {
        return Ok(0.5);
    }
    let half = width / 2.0 / length;
    if half >= 0.5 {
        return Ok(0.5);
    }
    Ok(t.clamp(half, 1.0 - half))
}

fn set_vertex_position(layer: &mut Layer, vertex: VertexId, point: Point2) -> Result<()> {
    let vertex = layer.vertex_mut(vertex)?;
    vertex.x = point.x;
    vertex.y = point.y;
    Ok(())
}

impl Editor {
    fn ensure_no_gesture(&self) -> Result<()> {
        if self.mode.is_gesture() {
            return self.wrong_mode();
        }
        Ok(())
    }

    /// Commits the working scene and moves on to `next`.
    fn finish_gesture(&mut self, next: Mode) {
        self.commit();
        self.mode = next;
        self.candidates.clear();
    }

    fn select_only(&mut self, layer: &LayerId, element: ElementRef) -> Result<()> {
        self.scene.unselect_all();
        self.scene.layer_mut(layer)?.select(element)?;
        Ok(())
    }

    // --- Walls ---

    /// Arms the wall tool; `None` uses the configured default wall type.
    pub fn select_tool_drawing_line(&mut self, line_type: Option<&str>) {
        self.cancel_gesture();
        let line_type = line_type.map_or_else(|| self.config.default_line_type.clone(), str::to_owned);
        self.mode = Mode::WaitingDrawLine(WaitingLine { line_type });
    }

    /// Starts a wall at the snapped cursor on the selected layer.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless the wall tool is armed, or an
    /// error if the catalog has no such wall type.
    pub fn begin_drawing_line(&mut self, x: f64, y: f64) -> Result<LineId> {
        let Mode::WaitingDrawLine(waiting) = &self.mode else {
            return self.wrong_mode();
        };
        let line_type = waiting.line_type.clone();
        let layer = self.scene.selected_layer().clone();
        self.prepare_snapping(&layer, &[])?;
        let start = self.snap(x, y);

        let line = CreateLine::new(line_type.clone(), start, start)
            .execute(self.scene.layer_mut(&layer)?, &self.catalog)?;
        self.select_only(&layer, line.into())?;
        self.mode = Mode::DrawingLine(DrawingLine {
            line_type,
            layer,
            start,
            line,
        });
        Ok(line)
    }

    /// Moves the free end of the wall being drawn.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless a wall is being drawn.
    pub fn update_drawing_line(&mut self, x: f64, y: f64) -> Result<()> {
        let Mode::DrawingLine(drawing) = &self.mode else {
            return self.wrong_mode();
        };
        let (layer, line) = (drawing.layer.clone(), drawing.line);
        let end = self.snap(x, y);
        ReplaceLineVertex::new(line, 1, end).execute(self.scene.layer_mut(&layer)?)?;
        Ok(())
    }

    /// Commits the wall being drawn, splitting and merging it against the
    /// walls already on the layer. The wall tool stays armed so the next
    /// segment can start where this one ended.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DegenerateLine`] if both ends coincide; the
    /// scene is left as it was before the gesture.
    pub fn end_drawing_line(&mut self, x: f64, y: f64) -> Result<Vec<LineId>> {
        self.update_drawing_line(x, y)?;
        let Mode::DrawingLine(drawing) = self.mode.clone() else {
            return self.wrong_mode();
        };
        let (start, end) = self.scene.layer(&drawing.layer)?.line_points(drawing.line)?;
        if same_points(&start, &end) {
            warn!(x = end.x, y = end.y, "discarded zero-length wall");
            self.cancel_gesture();
            return Err(InputError::DegenerateLine.into());
        }

        let lines = self.commit_from_committed(|scene, catalog| {
            let lines = CreateLineAvoidingIntersections::new(drawing.layer.clone(), drawing.line_type.clone(), start, end)
                .execute(scene, catalog)?;
            reselect(scene, &drawing.layer, lines.iter().map(|&l| l.into()))?;
            Ok(lines)
        })?;
        debug!(count = lines.len(), "wall drawn");
        self.mode = Mode::WaitingDrawLine(WaitingLine {
            line_type: drawing.line_type,
        });
        self.candidates.clear();
        Ok(lines)
    }

    /// Grabs a wall; both its endpoints follow the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error during another gesture or if the wall does not exist.
    pub fn begin_dragging_line(&mut self, layer: &LayerId, line: LineId, x: f64, y: f64) -> Result<()> {
        self.ensure_no_gesture()?;
        let data = self.scene.layer(layer)?;
        let [v0, v1] = data.line(line)?.vertices;
        let original = [(v0, data.vertex(v0)?.point()), (v1, data.vertex(v1)?.point())];
        self.prepare_snapping(layer, &[line.into(), v0.into(), v1.into()])?;
        self.select_only(layer, line.into())?;
        self.mode = Mode::DraggingLine(DraggingLine {
            layer: layer.clone(),
            line,
            anchor: Point2::new(x, y),
            original,
        });
        Ok(())
    }

    /// Translates the grabbed wall by the cursor movement, snapping
    /// whichever endpoint lands on the stronger anchor.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless a wall is being dragged.
    pub fn update_dragging_line(&mut self, x: f64, y: f64) -> Result<()> {
        let Mode::DraggingLine(support) = &self.mode else {
            return self.wrong_mode();
        };
        let support = support.clone();
        let delta = Point2::new(x, y) - support.anchor;

        let mut best: Option<(Snap, f64, Vector2)> = None;
        for (_, origin) in &support.original {
            let moved = *origin + delta;
            let Some(snap) = nearest_snap(&self.candidates, &moved, &self.snap_mask) else {
                continue;
            };
            let distance = points_distance(&snap.point, &moved);
            let better = best.as_ref().is_none_or(|(current, current_distance, _)| {
                snap.candidate.priority > current.candidate.priority
                    || (snap.candidate.priority == current.candidate.priority && distance < *current_distance)
            });
            if better {
                best = Some((snap, distance, snap.point - moved));
            }
        }
        let offset = delta + best.map_or_else(Vector2::zeros, |(_, _, correction)| correction);

        let layer = self.scene.layer_mut(&support.layer)?;
        for (vertex, origin) in support.original {
            set_vertex_position(layer, vertex, origin + offset)?;
        }
        Ok(())
    }

    /// Drops the grabbed wall. Every wall touching it is rebuilt through the
    /// intersection resolver from the committed scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the rebuild fails; the gesture is abandoned.
    pub fn end_dragging_line(&mut self, x: f64, y: f64) -> Result<Vec<LineId>> {
        self.update_dragging_line(x, y)?;
        let Mode::DraggingLine(support) = self.mode.clone() else {
            return self.wrong_mode();
        };
        let layer = self.scene.layer(&support.layer)?;
        let moves = support
            .original
            .iter()
            .map(|(vertex, _)| layer.vertex(*vertex).map(|v| (*vertex, v.point())))
            .collect::<std::result::Result<Vec<_>, TopologyError>>()?;
        self.end_relocation(support.layer, support.line.into(), moves)
    }

    /// Grabs a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error during another gesture or if the vertex does not exist.
    pub fn begin_dragging_vertex(&mut self, layer: &LayerId, vertex: VertexId) -> Result<()> {
        self.ensure_no_gesture()?;
        let data = self.scene.layer(layer)?.vertex(vertex)?;
        let original = data.point();
        let mut exclude: Vec<ElementRef> = vec![vertex.into()];
        exclude.extend(data.lines.iter().map(|&line| ElementRef::from(line)));
        self.prepare_snapping(layer, &exclude)?;
        self.select_only(layer, vertex.into())?;
        self.mode = Mode::DraggingVertex(DraggingVertex {
            layer: layer.clone(),
            vertex,
            original,
        });
        Ok(())
    }

    /// Moves the grabbed vertex to the snapped cursor.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless a vertex is being dragged.
    pub fn update_dragging_vertex(&mut self, x: f64, y: f64) -> Result<()> {
        let Mode::DraggingVertex(support) = &self.mode else {
            return self.wrong_mode();
        };
        let (layer, vertex) = (support.layer.clone(), support.vertex);
        let target = self.snap(x, y);
        set_vertex_position(self.scene.layer_mut(&layer)?, vertex, target)
    }

    /// Drops the grabbed vertex, rebuilding every wall it ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the rebuild fails; the gesture is abandoned.
    pub fn end_dragging_vertex(&mut self, x: f64, y: f64) -> Result<Vec<LineId>> {
        self.update_dragging_vertex(x, y)?;
        let Mode::DraggingVertex(support) = self.mode.clone() else {
            return self.wrong_mode();
        };
        let target = self.scene.layer(&support.layer)?.vertex(support.vertex)?.point();
        self.end_relocation(support.layer, support.vertex.into(), vec![(support.vertex, target)])
    }

    fn end_relocation(
        &mut self,
        layer: LayerId,
        grabbed: ElementRef,
        moves: Vec<(VertexId, Point2)>,
    ) -> Result<Vec<LineId>> {
        let committed = self.history.last().layer(&layer)?;
        let mut moved = false;
        for (vertex, target) in &moves {
            moved |= !same_points(&committed.vertex(*vertex)?.point(), target);
        }
        if !moved {
            self.cancel_gesture();
            return Ok(Vec::new());
        }
        let lines = self.commit_from_committed(|scene, catalog| {
            let lines = RelocateVertices::new(layer.clone(), moves.clone()).execute(scene, catalog)?;
            match grabbed {
                ElementRef::Vertex(_) => {
                    let dropped = moves
                        .first()
                        .and_then(|(_, target)| scene.layer(&layer).ok()?.vertex_at(target));
                    reselect(scene, &layer, dropped.map(ElementRef::from))?;
                }
                _ => reselect(scene, &layer, lines.iter().map(|&l| l.into()))?,
            }
            Ok(lines)
        })?;
        self.mode = Mode::Idle;
        self.candidates.clear();
        Ok(lines)
    }

    // --- Openings ---

    /// Arms the opening tool.
    pub fn select_tool_drawing_hole(&mut self, hole_type: impl Into<String>) {
        self.cancel_gesture();
        self.mode = Mode::DrawingHole(DrawingHole {
            hole_type: hole_type.into(),
            preview: None,
        });
    }

    /// Places the opening preview on the wall nearest the cursor, or removes
    /// it when no wall is within reach.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless the opening tool is armed, or
    /// an error if the catalog has no such opening.
    pub fn update_drawing_hole(&mut self, x: f64, y: f64) -> Result<Option<HoleId>> {
        let Mode::DrawingHole(support) = &self.mode else {
            return self.wrong_mode();
        };
        let support = support.clone();
        let layer_id = self.scene.selected_layer().clone();
        let cursor = Point2::new(x, y);

        let layer = self.scene.layer(&layer_id)?;
        let mut nearest: Option<(LineId, f64, f64)> = None;
        for (id, _) in layer.lines() {
            let (a, b) = layer.line_points(id)?;
            if same_points(&a, &b) {
                continue;
            }
            let foot = closest_point_on_segment(&cursor, &a, &b);
            let distance = points_distance(&foot, &cursor);
            if distance <= self.config.snap.segment_tolerance
                && nearest.is_none_or(|(_, best, _)| distance < best)
            {
                nearest = Some((id, distance, position_on_segment(&a, &b, &foot)));
            }
        }

        let preview = match (nearest, support.preview) {
            (None, None) => None,
            (None, Some((layer, hole))) => {
                RemoveHole::new(layer, hole).execute(&mut self.scene)?;
                None
            }
            (Some((line, _, t)), Some((layer, hole))) if layer == layer_id => {
                let data = self.scene.layer_mut(&layer)?;
                let width = data.hole(hole)?.width();
                let offset = clamped_offset(data, line, width, t)?;
                MoveHole::new(hole, line, offset).execute(data)?;
                Some((layer, hole))
            }
            (Some((line, _, t)), stale) => {
                if let Some((layer, hole)) = stale {
                    RemoveHole::new(layer, hole).execute(&mut self.scene)?;
                }
                let data = self.scene.layer_mut(&layer_id)?;
                let hole = CreateHole::new(support.hole_type.clone(), line, t).execute(data, &self.catalog)?;
                let width = data.hole(hole)?.width();
                let offset = clamped_offset(data, line, width, t)?;
                MoveHole::new(hole, line, offset).execute(data)?;
                Some((layer_id, hole))
            }
        };

        let placed = preview.as_ref().map(|(_, hole)| *hole);
        if let Mode::DrawingHole(support) = &mut self.mode {
            support.preview = preview;
        }
        Ok(placed)
    }

    /// Commits the opening under the cursor, if any, and returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless the opening tool is armed.
    pub fn end_drawing_hole(&mut self, x: f64, y: f64) -> Result<Option<HoleId>> {
        let placed = self.update_drawing_hole(x, y)?;
        self.finish_gesture(Mode::Idle);
        Ok(placed)
    }

    /// Grabs an opening; it slides along its own wall.
    ///
    /// # Errors
    ///
    /// Returns an error during another gesture or if the opening does not exist.
    pub fn begin_dragging_hole(&mut self, layer: &LayerId, hole: HoleId) -> Result<()> {
        self.ensure_no_gesture()?;
        let original_offset = self.scene.layer(layer)?.hole(hole)?.offset;
        self.select_only(layer, hole.into())?;
        self.mode = Mode::DraggingHole(DraggingHole {
            layer: layer.clone(),
            hole,
            original_offset,
        });
        Ok(())
    }

    /// Slides the grabbed opening to the wall position nearest the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless an opening is being dragged.
    pub fn update_dragging_hole(&mut self, x: f64, y: f64) -> Result<()> {
        let Mode::DraggingHole(support) = &self.mode else {
            return self.wrong_mode();
        };
        let (layer, hole) = (support.layer.clone(), support.hole);
        let data = self.scene.layer_mut(&layer)?;
        let (line, width) = {
            let hole = data.hole(hole)?;
            (hole.line, hole.width())
        };
        let (a, b) = data.line_points(line)?;
        let t = position_on_segment(&a, &b, &Point2::new(x, y)).clamp(0.0, 1.0);
        let offset = clamped_offset(data, line, width, t)?;
        MoveHole::new(hole, line, offset).execute(data)
    }

    /// Drops the grabbed opening and returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless an opening is being dragged.
    pub fn end_dragging_hole(&mut self, x: f64, y: f64) -> Result<()> {
        self.update_dragging_hole(x, y)?;
        self.finish_gesture(Mode::Idle);
        Ok(())
    }

    // --- Items ---

    /// Arms the item tool.
    pub fn select_tool_drawing_item(&mut self, item_type: impl Into<String>) {
        self.cancel_gesture();
        self.mode = Mode::DrawingItem(DrawingItem {
            item_type: item_type.into(),
            preview: None,
        });
    }

    /// Moves the item preview to the cursor, placing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless the item tool is armed, or an
    /// error if the catalog has no such item.
    pub fn update_drawing_item(&mut self, x: f64, y: f64) -> Result<ItemId> {
        let Mode::DrawingItem(support) = &self.mode else {
            return self.wrong_mode();
        };
        let support = support.clone();
        let layer_id = self.scene.selected_layer().clone();

        let item = match support.preview {
            Some((layer, item)) if layer == layer_id => {
                let data = self.scene.layer_mut(&layer)?.item_mut(item)?;
                data.x = x;
                data.y = y;
                item
            }
            stale => {
                if let Some((layer, item)) = stale {
                    RemoveItem::new(layer, item).execute(&mut self.scene)?;
                }
                CreateItem::new(support.item_type.clone(), Point2::new(x, y), 0.0)
                    .execute(self.scene.layer_mut(&layer_id)?, &self.catalog)?
            }
        };
        if let Mode::DrawingItem(support) = &mut self.mode {
            support.preview = Some((layer_id, item));
        }
        Ok(item)
    }

    /// Commits the item under the cursor. The item tool stays armed.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless the item tool is armed.
    pub fn end_drawing_item(&mut self, x: f64, y: f64) -> Result<ItemId> {
        let item = self.update_drawing_item(x, y)?;
        let next = std::mem::take(&mut self.mode).settled();
        self.finish_gesture(next);
        Ok(item)
    }

    /// Grabs an item.
    ///
    /// # Errors
    ///
    /// Returns an error during another gesture or if the item does not exist.
    pub fn begin_dragging_item(&mut self, layer: &LayerId, item: ItemId, x: f64, y: f64) -> Result<()> {
        self.ensure_no_gesture()?;
        let original = self.scene.layer(layer)?.item(item)?.position();
        self.select_only(layer, item.into())?;
        self.mode = Mode::DraggingItem(DraggingItem {
            layer: layer.clone(),
            item,
            anchor: Point2::new(x, y),
            original,
        });
        Ok(())
    }

    /// Moves the grabbed item by the cursor movement.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless an item is being dragged.
    pub fn update_dragging_item(&mut self, x: f64, y: f64) -> Result<()> {
        let Mode::DraggingItem(support) = &self.mode else {
            return self.wrong_mode();
        };
        let target = support.original + (Point2::new(x, y) - support.anchor);
        let (layer, item) = (support.layer.clone(), support.item);
        let data = self.scene.layer_mut(&layer)?.item_mut(item)?;
        data.x = target.x;
        data.y = target.y;
        Ok(())
    }

    /// Drops the grabbed item and returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless an item is being dragged.
    pub fn end_dragging_item(&mut self, x: f64, y: f64) -> Result<()> {
        self.update_dragging_item(x, y)?;
        self.finish_gesture(Mode::Idle);
        Ok(())
    }

    /// Grabs the rotation handle of an item.
    ///
    /// # Errors
    ///
    /// Returns an error during another gesture or if the item does not exist.
    pub fn begin_rotating_item(&mut self, layer: &LayerId, item: ItemId) -> Result<()> {
        self.ensure_no_gesture()?;
        let original_rotation = self.scene.layer(layer)?.item(item)?.rotation;
        self.select_only(layer, item.into())?;
        self.mode = Mode::RotatingItem(RotatingItem {
            layer: layer.clone(),
            item,
            original_rotation,
        });
        Ok(())
    }

    /// Turns the item to face the cursor. Angles within the configured
    /// threshold of zero snap to zero.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless an item is being rotated.
    pub fn update_rotating_item(&mut self, x: f64, y: f64) -> Result<()> {
        let Mode::RotatingItem(support) = &self.mode else {
            return self.wrong_mode();
        };
        let (layer, item) = (support.layer.clone(), support.item);
        let threshold = self.config.rotation_snap_threshold;
        let data = self.scene.layer_mut(&layer)?.item_mut(item)?;
        let center = data.position();
        let cursor = Point2::new(x, y);
        if same_points(&center, &cursor) {
            return Ok(());
        }
        let mut rotation = angle_between_points(&center, &cursor);
        if rotation.abs() < threshold {
            rotation = 0.0;
        }
        data.rotation = rotation;
        Ok(())
    }

    /// Releases the rotation handle and returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] unless an item is being rotated.
    pub fn end_rotating_item(&mut self, x: f64, y: f64) -> Result<()> {
        self.update_rotating_item(x, y)?;
        self.finish_gesture(Mode::Idle);
        Ok(())
    }
}
