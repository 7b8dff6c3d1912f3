use super::distance_2d::{point_at_offset, position_on_segment};
use super::{Point2, EPSILON, TOLERANCE};

/// How two bounded segments relate to each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// The segments share no point.
    None,
    /// Parallel but on distinct infinite lines.
    Parallel,
    /// On the same infinite line. `overlapping` is `true` when they share a
    /// stretch of positive length, `false` when they only touch at an endpoint.
    Collinear { overlapping: bool },
    /// The segments cross or touch at exactly one point.
    Intersecting(Point2),
}

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &super::Vector2,
    p2: &Point2,
    d2: &super::Vector2,
) -> Option<(f64, f64)> {
    let cross = d1.x * d2.y - d1.y * d2.x;
    let scale = d1.norm() * d2.norm();
    if scale < TOLERANCE || (cross / scale).abs() < 1e-12 {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Classifies the relation between segment `a0`-`a1` and segment `b0`-`b1`.
///
/// Endpoints are included: a segment ending on the other one intersects it.
#[must_use]
pub fn classify_segments(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> SegmentIntersection {
    let da = a1 - a0;
    let db = b1 - b0;
    let len_a = da.norm();
    let len_b = db.norm();
    if len_a < TOLERANCE || len_b < TOLERANCE {
        return SegmentIntersection::None;
    }

    let Some((t, u)) = line_line_intersect_2d(a0, &da, b0, &db) else {
        // Parallel: either the same infinite line or two distinct ones.
        let offset = b0 - a0;
        let distance = (da.x * offset.y - da.y * offset.x).abs() / len_a;
        if distance > EPSILON {
            return SegmentIntersection::Parallel;
        }

        let t0 = position_on_segment(a0, a1, b0);
        let t1 = position_on_segment(a0, a1, b1);
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        let overlap = (hi - lo) * len_a;
        if overlap > EPSILON {
            return SegmentIntersection::Collinear { overlapping: true };
        }
        if overlap >= -EPSILON {
            return SegmentIntersection::Collinear { overlapping: false };
        }
        return SegmentIntersection::None;
    };

    // Use a length-relative epsilon to include endpoints.
    let eps_a = EPSILON / len_a;
    let eps_b = EPSILON / len_b;
    if t >= -eps_a && t <= 1.0 + eps_a && u >= -eps_b && u <= 1.0 + eps_b {
        SegmentIntersection::Intersecting(point_at_offset(a0, a1, t.clamp(0.0, 1.0)))
    } else {
        SegmentIntersection::None
    }
}
