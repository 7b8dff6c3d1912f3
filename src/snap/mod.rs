//! Cursor snapping: pulls a pointer position onto nearby anchors.

mod candidates;

pub use candidates::{scene_candidates, without_related};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::math::distance_2d::{closest_point_on_segment, points_distance};
use crate::math::line_2d::LineCoefficients;
use crate::math::Point2;
use crate::topology::ElementRef;

/// Family of a snap candidate, as toggled by the [`SnapMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapKind {
    Point,
    Line,
    Segment,
    Grid,
    Guide,
}

/// Which snap kinds are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SnapMask {
    pub point: bool,
    pub line: bool,
    pub segment: bool,
    pub grid: bool,
    pub guide: bool,
}

impl Default for SnapMask {
    fn default() -> Self {
        Self::all()
    }
}

impl SnapMask {
    #[must_use]
    pub fn all() -> Self {
        Self {
            point: true,
            line: true,
            segment: true,
            grid: true,
            guide: true,
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self {
            point: false,
            line: false,
            segment: false,
            grid: false,
            guide: false,
        }
    }

    #[must_use]
    pub fn enabled(&self, kind: SnapKind) -> bool {
        match kind {
            SnapKind::Point => self.point,
            SnapKind::Line => self.line,
            SnapKind::Segment => self.segment,
            SnapKind::Grid => self.grid,
            SnapKind::Guide => self.guide,
        }
    }

    /// Builder-style toggle of one kind.
    #[must_use]
    pub fn with(mut self, kind: SnapKind, enabled: bool) -> Self {
        let slot = match kind {
            SnapKind::Point => &mut self.point,
            SnapKind::Line => &mut self.line,
            SnapKind::Segment => &mut self.segment,
            SnapKind::Grid => &mut self.grid,
            SnapKind::Guide => &mut self.guide,
        };
        *slot = enabled;
        self
    }
}

/// The geometric anchor of a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapTarget {
    Point(Point2),
    /// An infinite line.
    Line(LineCoefficients),
    Segment { start: Point2, end: Point2 },
    /// Nodes every `step` units inside `[0, width] x [0, height]`, computed
    /// on demand instead of stored.
    Grid { step: f64, width: f64, height: f64 },
}

impl SnapTarget {
    /// The anchor point closest to `cursor`.
    #[must_use]
    pub fn nearest_point(&self, cursor: &Point2) -> Point2 {
        match self {
            Self::Point(p) => *p,
            Self::Line(line) => line.closest_point(cursor),
            Self::Segment { start, end } => closest_point_on_segment(cursor, start, end),
            Self::Grid {
                step,
                width,
                height,
            } => {
                let snap = |v: f64, max: f64| ((v / step).round() * step).clamp(0.0, max.max(0.0));
                Point2::new(snap(cursor.x, *width), snap(cursor.y, *height))
            }
        }
    }
}

/// One anchor the cursor may be pulled onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    pub kind: SnapKind,
    pub target: SnapTarget,
    /// Maximum cursor distance at which the candidate applies.
    pub tolerance: f64,
    /// Higher wins over nearer.
    pub priority: u32,
    /// Element the anchor was derived from, if any.
    pub related: Option<ElementRef>,
}

impl SnapCandidate {
    #[must_use]
    pub fn new(kind: SnapKind, target: SnapTarget, tolerance: f64, priority: u32) -> Self {
        Self {
            kind,
            target,
            tolerance,
            priority,
            related: None,
        }
    }

    #[must_use]
    pub fn related_to(mut self, element: impl Into<ElementRef>) -> Self {
        self.related = Some(element.into());
        self
    }
}

/// The winning anchor for a cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub point: Point2,
    pub candidate: SnapCandidate,
}

/// Picks the candidate the cursor snaps to.
///
/// Only enabled kinds within their tolerance qualify; among those the
/// highest priority wins, then the smallest distance.
#[must_use]
pub fn nearest_snap(candidates: &[SnapCandidate], cursor: &Point2, mask: &SnapMask) -> Option<Snap> {
    let mut best: Option<(Snap, f64)> = None;
    for candidate in candidates {
        if !mask.enabled(candidate.kind) {
            continue;
        }
        let point = candidate.target.nearest_point(cursor);
        let distance = points_distance(&point, cursor);
        if distance > candidate.tolerance {
            continue;
        }
        let better = match &best {
            None => true,
            Some((current, current_distance)) => {
                candidate.priority > current.candidate.priority
                    || (candidate.priority == current.candidate.priority && distance < *current_distance)
            }
        };
        if better {
            best = Some((
                Snap {
                    point,
                    candidate: *candidate,
                },
                distance,
            ));
        }
    }
    if let Some((snap, distance)) = &best {
        trace!(kind = ?snap.candidate.kind, x = snap.point.x, y = snap.point.y, distance, "snapped");
    }
    best.map(|(snap, _)| snap)
}
