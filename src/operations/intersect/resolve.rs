use tracing::debug;

use crate::catalog::{Catalog, ElementTemplate};
use crate::error::Result;
use crate::math::distance_2d::{is_point_on_segment, point_at_offset, position_on_segment};
use crate::math::intersect_2d::{classify_segments, SegmentIntersection};
use crate::math::{order_unique_points, same_points, Point2};
use crate::operations::areas::DetectAreas;
use crate::operations::editing::{CreateLine, RemoveLine, SplitLine};
use crate::properties::Properties;
use crate::scene::{GroupId, LayerId, Scene};
use crate::topology::{Hole, Layer, LineId};

/// An opening lifted off a wall that is about to be re-segmented, kept at
/// its absolute plan position so it can be re-attached afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CarriedHole {
    pub template: ElementTemplate,
    pub position: Point2,
}

impl CarriedHole {
    #[must_use]
    pub fn new(template: ElementTemplate, position: Point2) -> Self {
        Self { template, position }
    }

    /// Lifts every hole of `line`, positioned as if the wall ran from
    /// `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or one of its holes does not exist.
    pub fn lift(layer: &Layer, line: LineId, start: &Point2, end: &Point2) -> Result<Vec<Self>> {
        layer
            .line(line)?
            .holes
            .iter()
            .map(|&h| {
                let hole = layer.hole(h)?;
                Ok(Self::new(hole.template(), point_at_offset(start, end, hole.offset)))
            })
            .collect()
    }
}

/// Draws a wall so that it never crosses or overlaps another wall without
/// sharing a vertex.
///
/// Existing walls crossed in their interior are split at the crossing.
/// Collinear walls overlapping the candidate are absorbed: their endpoints
/// become break points and their openings are carried over. The candidate
/// is then laid out as consecutive segments between all break points, the
/// carried openings are re-attached to the segment they fall on, and the
/// layer's rooms are re-derived.
pub struct CreateLineAvoidingIntersections {
    layer: LayerId,
    element_type: String,
    start: Point2,
    end: Point2,
    properties: Option<Properties>,
    carried: Vec<CarriedHole>,
    detect_areas: bool,
}

impl CreateLineAvoidingIntersections {
    #[must_use]
    pub fn new(layer: LayerId, element_type: impl Into<String>, start: Point2, end: Point2) -> Self {
        Self {
            layer,
            element_type: element_type.into(),
            start,
            end,
            properties: None,
            carried: Vec::new(),
            detect_areas: true,
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Option<Properties>) -> Self {
        self.properties = properties;
        self
    }

    /// Openings to re-attach to the new segments.
    #[must_use]
    pub fn with_carried_holes(mut self, carried: Vec<CarriedHole>) -> Self {
        self.carried = carried;
        self
    }

    /// Leaves room detection to the caller, for batches of redrawn walls.
    #[must_use]
    pub fn without_area_detection(mut self) -> Self {
        self.detect_areas = false;
        self
    }

    /// Executes the operation, returning the created segments in point order.
    ///
    /// A candidate whose endpoints coincide creates nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is missing or inconsistent, or the
    /// catalog cannot build the wall or a room.
    pub fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<Vec<LineId>> {
        let mut points = vec![self.start, self.end];
        let mut carried = self.carried.clone();
        let mut absorbed_groups: Vec<GroupId> = Vec::new();

        if !same_points(&self.start, &self.end) {
            let candidates: Vec<LineId> = scene.layer(&self.layer)?.lines().map(|(id, _)| id).collect();
            for line in candidates {
                let (a, b) = scene.layer(&self.layer)?.line_points(line)?;
                match classify_segments(&self.start, &self.end, &a, &b) {
                    SegmentIntersection::Collinear { overlapping: true } => {
                        points.push(a);
                        points.push(b);
                        carried.extend(CarriedHole::lift(scene.layer(&self.layer)?, line, &a, &b)?);
                        for group in scene.groups_containing(&self.layer, line.into()) {
                            if !absorbed_groups.contains(&group) {
                                absorbed_groups.push(group);
                            }
                        }
                        RemoveLine::new(self.layer.clone(), line).execute(scene)?;
                        debug!(?line, "absorbed collinear line");
                    }
                    SegmentIntersection::Intersecting(p) => {
                        if !same_points(&p, &a) && !same_points(&p, &b) {
                            SplitLine::new(self.layer.clone(), line, p).execute(scene)?;
                        }
                        points.push(p);
                    }
                    SegmentIntersection::Collinear { overlapping: false }
                    | SegmentIntersection::Parallel
                    | SegmentIntersection::None => {}
                }
            }
        }

        let ordered = order_unique_points(&points);
        let layer = scene.layer_mut(&self.layer)?;
        let mut created = Vec::with_capacity(ordered.len().saturating_sub(1));
        for pair in ordered.windows(2) {
            let id = CreateLine::new(self.element_type.as_str(), pair[0], pair[1])
                .with_properties(self.properties.clone())
                .execute(layer, catalog)?;
            created.push(id);
        }

        for hole in carried {
            attach_carried(layer, &created, hole)?;
        }

        for group in absorbed_groups {
            let group = scene.group_mut(group)?;
            for &id in &created {
                group.insert(&self.layer, id.into());
            }
        }

        debug!(segments = created.len(), "created line avoiding intersections");
        if self.detect_areas {
            DetectAreas::new(self.layer.clone()).execute(scene, catalog)?;
        }
        Ok(created)
    }
}

fn attach_carried(layer: &mut Layer, segments: &[LineId], hole: CarriedHole) -> Result<()> {
    for &line in segments {
        let (a, b) = layer.line_points(line)?;
        if is_point_on_segment(&a, &b, &hole.position) {
            let offset = position_on_segment(&a, &b, &hole.position).clamp(0.0, 1.0);
            let id = layer.insert_hole(Hole::new(hole.template, line, offset));
            layer.line_mut(line)?.holes.push(id);
            return Ok(());
        }
    }
    debug!(position = ?hole.position, "dropped opening that no longer sits on a wall");
    Ok(())
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

    fn draw(scene: &mut Scene, a: Point2, b: Point2) -> Vec<LineId> {
        let id = scene.selected_layer().clone();
        CreateLineAvoidingIntersections::new(id, "wall", a, b)
            .execute(scene, &test_catalog())
            .unwrap()
    }

    fn segments(layer: &Layer) -> Vec<(Point2, Point2)> {
        let mut out: Vec<(Point2, Point2)> = layer
            .lines()
            .map(|(id, _)| {
                let (a, b) = layer.line_points(id).unwrap();
                if crate::math::compare_points(&a, &b).is_le() {
                    (a, b)
                } else {
                    (b, a)
                }
            })
            .collect();
        out.sort_by(|x, y| crate::math::compare_points(&x.0, &y.0).then(crate::math::compare_points(&x.1, &y.1)));
        out
    }

    #[test]
    fn crossing_splits_both_walls() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let old = draw(&mut scene, p(0.0, 0.0), p(200.0, 0.0))[0];
        let hole = CreateHole::new("door", old, 0.75)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();

        let created = draw(&mut scene, p(100.0, -100.0), p(100.0, 100.0));
        assert_eq!(created.len(), 2);

        let layer = scene.layer(&id).unwrap();
        assert_eq!(layer.lines().count(), 4);
        let center = layer.vertex_at(&p(100.0, 0.0)).unwrap();
        assert_eq!(layer.vertex(center).unwrap().lines.len(), 4);

        let position = layer.hole_position(hole).unwrap();
        assert_relative_eq!(position.x, 150.0, epsilon = 1e-9);
        assert_relative_eq!(position.y, 0.0, epsilon = 1e-9);
        let (a, b) = layer.line_points(layer.hole(hole).unwrap().line).unwrap();
        assert!(a.x >= 100.0 - 1e-9 && b.x >= 100.0 - 1e-9);
    }

    #[test]
    fn collinear_overlap_is_merged() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        draw(&mut scene, p(50.0, 0.0), p(150.0, 0.0));

        let layer = scene.layer(&id).unwrap();
        assert_eq!(
            segments(layer),
            vec![
                (p(0.0, 0.0), p(50.0, 0.0)),
                (p(50.0, 0.0), p(100.0, 0.0)),
                (p(100.0, 0.0), p(150.0, 0.0)),
            ]
        );
    }

    #[test]
    fn collinear_overlap_sharing_an_endpoint_is_merged() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        draw(&mut scene, p(0.0, 0.0), p(50.0, 0.0));
        let layer = scene.layer(&id).unwrap();
        assert_eq!(
            segments(layer),
            vec![(p(0.0, 0.0), p(50.0, 0.0)), (p(50.0, 0.0), p(100.0, 0.0))]
        );
    }

    #[test]
    fn touching_collinear_walls_are_untouched() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let first = draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0))[0];
        draw(&mut scene, p(100.0, 0.0), p(200.0, 0.0));
        let layer = scene.layer(&id).unwrap();
        assert!(layer.line(first).is_ok());
        assert_eq!(layer.lines().count(), 2);
    }

    #[test]
    fn absorbed_wall_keeps_its_opening_and_groups() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let old = draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0))[0];
        CreateHole::new("door", old, 0.25)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        let mut group = Group::new("g");
        group.insert(&id, old.into());
        let gid = scene.insert_group(group);

        let created = draw(&mut scene, p(50.0, 0.0), p(150.0, 0.0));
        let layer = scene.layer(&id).unwrap();
        assert_eq!(layer.holes().count(), 1);
        let (hole, _) = layer.holes().next().unwrap();
        let position = layer.hole_position(hole).unwrap();
        assert_relative_eq!(position.x, 25.0, epsilon = 1e-9);
        for line in created {
            assert!(scene.group(gid).unwrap().contains(&id, line.into()));
        }
    }

    #[test]
    fn t_junction_splits_the_crossed_wall() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        draw(&mut scene, p(0.0, 0.0), p(200.0, 0.0));
        let created = draw(&mut scene, p(100.0, 0.0), p(100.0, 100.0));
        assert_eq!(created.len(), 1);
        let layer = scene.layer(&id).unwrap();
        assert_eq!(layer.lines().count(), 3);
    }

    #[test]
    fn closing_a_loop_derives_a_room() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        draw(&mut scene, p(0.0, 0.0), p(100.0, 0.0));
        draw(&mut scene, p(100.0, 0.0), p(100.0, 100.0));
        draw(&mut scene, p(100.0, 100.0), p(0.0, 100.0));
        assert_eq!(scene.layer(&id).unwrap().areas().count(), 0);
        draw(&mut scene, p(0.0, 100.0), p(0.0, 0.0));
        assert_eq!(scene.layer(&id).unwrap().areas().count(), 1);
    }

    #[test]
    fn degenerate_candidate_creates_nothing() {
        let mut scene = Scene::default();
        assert!(draw(&mut scene, p(5.0, 5.0), p(5.0, 5.0)).is_empty());
    }
}
