use super::{SnapCandidate, SnapKind, SnapTarget};
use crate::config::SnapConfig;
use crate::error::Result;
use crate::math::line_2d::LineCoefficients;
use crate::math::Point2;
use crate::scene::{Guide, LayerId, Scene};
use crate::topology::ElementRef;

/// Builds every snap candidate of a layer, plus the grid and guides.
///
/// Built once when a gesture starts; pointer moves only query the list.
///
/// # Errors
///
/// Returns an error if the layer does not exist or a wall is dangling.
pub fn scene_candidates(
    scene: &Scene,
    layer_id: &LayerId,
    config: &SnapConfig,
) -> Result<Vec<SnapCandidate>> {
    let layer = scene.layer(layer_id)?;
    let mut out = Vec::new();
    let line = |coefficients: LineCoefficients| {
        SnapCandidate::new(
            SnapKind::Line,
            SnapTarget::Line(coefficients),
            config.line_tolerance,
            config.line_priority,
        )
    };

    for (id, vertex) in layer.vertices() {
        let p = vertex.point();
        out.push(
            SnapCandidate::new(
                SnapKind::Point,
                SnapTarget::Point(p),
                config.point_tolerance,
                config.point_priority,
            )
            .related_to(id),
        );
        out.push(line(LineCoefficients::horizontal(p.y)).related_to(id));
        out.push(line(LineCoefficients::vertical(p.x)).related_to(id));
    }

    for (id, _) in layer.lines() {
        let (start, end) = layer.line_points(id)?;
        out.push(
            SnapCandidate::new(
                SnapKind::Segment,
                SnapTarget::Segment { start, end },
                config.segment_tolerance,
                config.segment_priority,
            )
            .related_to(id),
        );
        if let Some(extension) = LineCoefficients::through(&start, &end) {
            out.push(line(extension).related_to(id));
            out.push(line(extension.perpendicular_through(&start)).related_to(id));
            out.push(line(extension.perpendicular_through(&end)).related_to(id));
        }
    }

    out.extend(grid_candidates(scene, config));
    out.extend(guide_candidates(scene, config));
    Ok(out)
}

fn grid_candidates(scene: &Scene, config: &SnapConfig) -> Vec<SnapCandidate> {
    if config.grid_cell <= 0.0 {
        return Vec::new();
    }
    let grid = |step: f64, priority: u32| {
        SnapCandidate::new(
            SnapKind::Grid,
            SnapTarget::Grid {
                step,
                width: scene.width,
                height: scene.height,
            },
            config.grid_tolerance,
            priority,
        )
    };
    vec![
        grid(
            config.grid_cell * f64::from(config.grid_divider.max(1)),
            config.major_grid_priority,
        ),
        grid(config.grid_cell, config.minor_grid_priority),
    ]
}

/// Guide lines, their stretch across the scene, and the crossings of
/// horizontal with vertical guides. Circular guides do not snap.
fn guide_candidates(scene: &Scene, config: &SnapConfig) -> Vec<SnapCandidate> {
    let mut out = Vec::new();
    let mut horizontals = Vec::new();
    let mut verticals = Vec::new();
    let guide = |target: SnapTarget| {
        SnapCandidate::new(SnapKind::Guide, target, config.guide_tolerance, config.guide_priority)
    };

    for (_, guide_def) in scene.guides() {
        match *guide_def {
            Guide::Horizontal { y } => {
                horizontals.push(y);
                out.push(guide(SnapTarget::Line(LineCoefficients::horizontal(y))));
                out.push(guide(SnapTarget::Segment {
                    start: Point2::new(0.0, y),
                    end: Point2::new(scene.width, y),
                }));
            }
            Guide::Vertical { x } => {
                verticals.push(x);
                out.push(guide(SnapTarget::Line(LineCoefficients::vertical(x))));
                out.push(guide(SnapTarget::Segment {
                    start: Point2::new(x, 0.0),
                    end: Point2::new(x, scene.height),
                }));
            }
            Guide::Circular { .. } => {}
        }
    }

    for &y in &horizontals {
        for &x in &verticals {
            out.push(SnapCandidate::new(
                SnapKind::Guide,
                SnapTarget::Point(Point2::new(x, y)),
                config.point_tolerance,
                config.point_priority,
            ));
        }
    }
    out
}

/// Drops every candidate derived from one of `related`, such as the element
/// being dragged.
#[must_use]
pub fn without_related(candidates: &[SnapCandidate], related: &[ElementRef]) -> Vec<SnapCandidate> {
    candidates
        .iter()
        .filter(|c| c.related.is_none_or(|r| !related.contains(&r)))
        .copied()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::operations::editing::CreateLine;
    use crate::snap::{nearest_snap, SnapMask};

    fn scene_with_wall() -> (Scene, crate::topology::LineId) {
        let mut scene = Scene::new(1000.0, 1000.0);
        let id = scene.selected_layer().clone();
        let wall = CreateLine::new("wall", Point2::new(110.0, 110.0), Point2::new(310.0, 110.0))
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        (scene, wall)
    }

    #[test]
    fn vertex_point_wins_over_grid() {
        let (scene, _) = scene_with_wall();
        let config = SnapConfig::default();
        let candidates = scene_candidates(&scene, scene.selected_layer(), &config).unwrap();
        let snap = nearest_snap(&candidates, &Point2::new(104.0, 104.0), &SnapMask::all()).unwrap();
        assert_eq!(snap.candidate.kind, SnapKind::Point);
        assert_eq!(snap.point, Point2::new(110.0, 110.0));
    }

    #[test]
    fn dragged_wall_does_not_snap_to_itself() {
        let (scene, wall) = scene_with_wall();
        let config = SnapConfig::default();
        let layer = scene.layer(scene.selected_layer()).unwrap();
        let [v0, v1] = layer.line(wall).unwrap().vertices;
        let all = scene_candidates(&scene, scene.selected_layer(), &config).unwrap();
        let rest = without_related(&all, &[wall.into(), v0.into(), v1.into()]);
        assert!(rest.iter().all(|c| c.related.is_none()));
        assert!(rest.iter().any(|c| c.kind == SnapKind::Grid));
    }

    #[test]
    fn guide_crossings_are_points() {
        let mut scene = Scene::new(1000.0, 1000.0);
        scene.add_guide(Guide::Horizontal { y: 333.0 });
        scene.add_guide(Guide::Vertical { x: 517.0 });
        scene.add_guide(Guide::Circular { x: 0.0, y: 0.0, radius: 50.0 });
        let config = SnapConfig::default();
        let candidates = scene_candidates(&scene, scene.selected_layer(), &config).unwrap();
        let snap = nearest_snap(&candidates, &Point2::new(512.0, 330.0), &SnapMask::all()).unwrap();
        assert_eq!(snap.candidate.kind, SnapKind::Guide);
        assert_eq!(snap.point, Point2::new(517.0, 333.0));
    }
}
