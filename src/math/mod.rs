pub mod distance_2d;
pub mod intersect_2d;
pub mod line_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3x3 matrix type, used as a homogeneous 2D transform.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Two coordinates closer than this are the same plan position.
///
/// Scene units are centimeters, so this is far below anything a user can draw.
pub const EPSILON: f64 = 1e-6;

/// Returns `true` if two points occupy the same plan position.
#[must_use]
pub fn same_points(a: &Point2, b: &Point2) -> bool {
    (a.x - b.x).abs() <= EPSILON && (a.y - b.y).abs() <= EPSILON
}

/// Lexicographic (x, then y) ordering used to lay points out along a wall.
#[must_use]
pub fn compare_points(a: &Point2, b: &Point2) -> std::cmp::Ordering {
    if (a.x - b.x).abs() <= EPSILON {
        a.y.total_cmp(&b.y)
    } else {
        a.x.total_cmp(&b.x)
    }
}

/// Sorts points lexicographically and drops coincident duplicates.
#[must_use]
pub fn order_unique_points(points: &[Point2]) -> Vec<Point2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(compare_points);
    sorted.dedup_by(|a, b| same_points(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_points_within_epsilon() {
        assert!(same_points(&Point2::new(1.0, 2.0), &Point2::new(1.0 + 1e-8, 2.0)));
        assert!(!same_points(&Point2::new(1.0, 2.0), &Point2::new(1.001, 2.0)));
    }

    #[test]
    fn ordering_is_lexicographic() {
        let pts = vec![
            Point2::new(5.0, 0.0),
            Point2::new(0.0, 3.0),
            Point2::new(0.0, 1.0),
            Point2::new(5.0, 0.0),
        ];
        let ordered = order_unique_points(&pts);
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered[0], Point2::new(0.0, 1.0));
        assert_eq!(ordered[1], Point2::new(0.0, 3.0));
        assert_eq!(ordered[2], Point2::new(5.0, 0.0));
    }
}
