use super::{Point2, EPSILON, TOLERANCE};

/// Euclidean distance between two points.
#[must_use]
pub fn points_distance(a: &Point2, b: &Point2) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Returns the minimum distance from point `(px, py)` to the line segment
/// from `(ax, ay)` to `(bx, by)`.
#[must_use]
pub fn point_to_segment_dist(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let closest = closest_point_on_segment(
        &Point2::new(px, py),
        &Point2::new(ax, ay),
        &Point2::new(bx, by),
    );
    ((px - closest.x).powi(2) + (py - closest.y).powi(2)).sqrt()
}

/// Projects `p` onto the segment `a`-`b`, clamped to the segment.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq < TOLERANCE * TOLERANCE {
        // Degenerate segment (zero length).
        return *a;
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    Point2::new(a.x + t * dx, a.y + t * dy)
}

/// Parameter of the orthogonal projection of `p` onto the line through
/// `a` and `b`: `0` at `a`, `1` at `b`. Not clamped.
#[must_use]
pub fn position_on_segment(a: &Point2, b: &Point2, p: &Point2) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < TOLERANCE * TOLERANCE {
        return 0.0;
    }
    ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq
}

/// Linear interpolation: the point at fraction `t` from `a` to `b`.
#[must_use]
pub fn point_at_offset(a: &Point2, b: &Point2, t: f64) -> Point2 {
    Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Returns `true` if `p` lies on the closed segment `a`-`b`.
#[must_use]
pub fn is_point_on_segment(a: &Point2, b: &Point2, p: &Point2) -> bool {
    point_to_segment_dist(p.x, p.y, a.x, a.y, b.x, b.y) <= EPSILON
}
