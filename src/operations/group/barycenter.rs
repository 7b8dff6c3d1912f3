use crate::error::Result;
use crate::math::distance_2d::point_at_offset;
use crate::math::{Point2, Vector2};
use crate::scene::{GroupId, Scene};
use crate::topology::ElementRef;

/// Recomputes a group's `(x, y)` as the mean position of its members.
///
/// Walls count by their midpoint, rooms by the mean of their corners. A
/// group without members keeps its previous center.
pub struct RecalculateBarycenter {
    group: GroupId,
}

impl RecalculateBarycenter {
    #[must_use]
    pub fn new(group: GroupId) -> Self {
        Self { group }
    }

    /// Executes the operation, returning the new center.
    ///
    /// # Errors
    ///
    /// Returns an error if the group or one of its members does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<Point2> {
        let group = scene.group(self.group)?;
        let mut sum = Vector2::zeros();
        let mut count = 0usize;
        for (layer_id, element) in group.members() {
            let layer = scene.layer(layer_id)?;
            let position = match element {
                ElementRef::Vertex(id) => layer.vertex(id)?.point(),
                ElementRef::Line(id) => {
                    let (a, b) = layer.line_points(id)?;
                    point_at_offset(&a, &b, 0.5)
                }
                ElementRef::Hole(id) => layer.hole_position(id)?,
                ElementRef::Area(id) => {
                    let polygon = layer.area_polygon(id)?;
                    if polygon.is_empty() {
                        continue;
                    }
                    #[allow(clippy::cast_precision_loss)]
                    let n = polygon.len() as f64;
                    Point2::from(polygon.iter().map(|p| p.coords).sum::<Vector2>() / n)
                }
                ElementRef::Item(id) => layer.item(id)?.position(),
            };
            sum += position.coords;
            count += 1;
        }

        let group = scene.group_mut(self.group)?;
        if count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let center = sum / count as f64;
            group.x = center.x;
            group.y = center.y;
        }
        Ok(Point2::new(group.x, group.y))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::operations::editing::{CreateItem, CreateLine};
    use crate::scene::Group;
    use approx::assert_relative_eq;

    #[test]
    fn mean_of_wall_midpoints_and_items() {
        let catalog = test_catalog();
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let layer = scene.layer_mut(&id).unwrap();
        let wall = CreateLine::new("wall", Point2::new(0.0, 0.0), Point2::new(100.0, 0.0))
            .execute(layer, &catalog)
            .unwrap();
        let item = CreateItem::new("sofa", Point2::new(50.0, 100.0), 0.0)
            .execute(layer, &catalog)
            .unwrap();
        let mut group = Group::new("g");
        group.insert(&id, wall.into());
        group.insert(&id, item.into());
        let gid = scene.insert_group(group);

        let center = RecalculateBarycenter::new(gid).execute(&mut scene).unwrap();
        assert_relative_eq!(center.x, 50.0);
        assert_relative_eq!(center.y, 50.0);
        assert_relative_eq!(scene.group(gid).unwrap().y, 50.0);
    }
}
