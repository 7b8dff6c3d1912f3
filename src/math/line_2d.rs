//! Infinite lines in implicit form `a*x + b*y + c = 0`.

use serde::{Deserialize, Serialize};

use super::{Point2, TOLERANCE};

/// Implicit line coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LineCoefficients {
    /// The horizontal line `y = y0`.
    #[must_use]
    pub fn horizontal(y: f64) -> Self {
        Self { a: 0.0, b: 1.0, c: -y }
    }

    /// The vertical line `x = x0`.
    #[must_use]
    pub fn vertical(x: f64) -> Self {
        Self { a: 1.0, b: 0.0, c: -x }
    }

    /// The line through two points. `None` if the points coincide.
    #[must_use]
    pub fn through(p0: &Point2, p1: &Point2) -> Option<Self> {
        let a = p0.y - p1.y;
        let b = p1.x - p0.x;
        if a.abs() < TOLERANCE && b.abs() < TOLERANCE {
            return None;
        }
        let c = p0.x * p1.y - p1.x * p0.y;
        Some(Self { a, b, c })
    }

    /// The perpendicular to `self` passing through `p`.
    #[must_use]
    pub fn perpendicular_through(&self, p: &Point2) -> Self {
        Self {
            a: -self.b,
            b: self.a,
            c: self.b * p.x - self.a * p.y,
        }
    }

    /// Orthogonal projection of `p` onto the line.
    #[must_use]
    pub fn closest_point(&self, p: &Point2) -> Point2 {
        let norm_sq = self.a * self.a + self.b * self.b;
        if norm_sq < TOLERANCE {
            return *p;
        }
        let d = (self.a * p.x + self.b * p.y + self.c) / norm_sq;
        Point2::new(p.x - self.a * d, p.y - self.b * d)
    }
}

/// Angle of the direction `from` -> `to`, in degrees within `(-180, 180]`.
#[must_use]
pub fn angle_between_points(from: &Point2, to: &Point2) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn projection_onto_diagonal() {
        let line = LineCoefficients::through(&Point2::new(0.0, 0.0), &Point2::new(1.0, 1.0)).unwrap();
        let q = line.closest_point(&Point2::new(2.0, 0.0));
        assert_relative_eq!(q.x, 1.0);
        assert_relative_eq!(q.y, 1.0);
    }

    #[test]
    fn perpendicular_through_endpoint() {
        let line = LineCoefficients::horizontal(3.0);
        let perp = line.perpendicular_through(&Point2::new(4.0, 3.0));
        let q = perp.closest_point(&Point2::new(10.0, 7.0));
        assert_relative_eq!(q.x, 4.0);
        assert_relative_eq!(q.y, 7.0);
    }

    #[test]
    fn coincident_points_have_no_line() {
        assert!(LineCoefficients::through(&Point2::new(1.0, 1.0), &Point2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn angles() {
        let o = Point2::new(0.0, 0.0);
        assert_relative_eq!(angle_between_points(&o, &Point2::new(0.0, 5.0)), 90.0);
        assert_relative_eq!(angle_between_points(&o, &Point2::new(-3.0, 0.0)), 180.0);
    }
}
