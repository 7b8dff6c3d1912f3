use super::distance_2d::is_point_on_segment;
use super::Point2;

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns `true` if the closed polygon winds clockwise.
#[must_use]
pub fn is_clockwise(points: &[Point2]) -> bool {
    signed_area(points) < 0.0
}

/// Even-odd ray casting test. Points on the boundary give an unspecified
/// answer; use [`point_strictly_inside`] when that matters.
#[must_use]
pub fn contains_point(polygon: &[Point2], point: &Point2) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Returns `true` if `point` lies on one of the polygon's edges.
#[must_use]
pub fn on_boundary(polygon: &[Point2], point: &Point2) -> bool {
    let n = polygon.len();
    (0..n).any(|i| is_point_on_segment(&polygon[i], &polygon[(i + 1) % n], point))
}

/// Inside the polygon and not on its boundary.
#[must_use]
pub fn point_strictly_inside(polygon: &[Point2], point: &Point2) -> bool {
    !on_boundary(polygon, point) && contains_point(polygon, point)
}
