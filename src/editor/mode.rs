use crate::math::Point2;
use crate::scene::LayerId;
use crate::topology::{HoleId, ItemId, LineId, VertexId};

/// Line tool armed, waiting for the first click.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitingLine {
    pub line_type: String,
}

/// A wall being drawn from `start`; `line` is the live preview.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingLine {
    pub line_type: String,
    pub layer: LayerId,
    pub start: Point2,
    pub line: LineId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraggingLine {
    pub layer: LayerId,
    pub line: LineId,
    /// Snapped cursor position when the drag began.
    pub anchor: Point2,
    /// Endpoint positions before the drag.
    pub original: [(VertexId, Point2); 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraggingVertex {
    pub layer: LayerId,
    pub vertex: VertexId,
    pub original: Point2,
}

/// Opening tool armed; `preview` is the opening placed by the last move.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingHole {
    pub hole_type: String,
    pub preview: Option<(LayerId, HoleId)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraggingHole {
    pub layer: LayerId,
    pub hole: HoleId,
    pub original_offset: f64,
}

/// Item tool armed; `preview` is the item placed by the last move.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingItem {
    pub item_type: String,
    pub preview: Option<(LayerId, ItemId)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraggingItem {
    pub layer: LayerId,
    pub item: ItemId,
    pub anchor: Point2,
    pub original: Point2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotatingItem {
    pub layer: LayerId,
    pub item: ItemId,
    pub original_rotation: f64,
}

/// Screens and tools that do not touch the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    ViewingCatalog,
    ConfiguringProject,
    View3D,
    Pan,
    ZoomIn,
    ZoomOut,
}

/// Interaction state of an [`Editor`](super::Editor).
///
/// Each non-idle variant carries the support record its gesture needs, so
/// there is never more than one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Idle,
    WaitingDrawLine(WaitingLine),
    DrawingLine(DrawingLine),
    DraggingLine(DraggingLine),
    DraggingVertex(DraggingVertex),
    DrawingHole(DrawingHole),
    DraggingHole(DraggingHole),
    DrawingItem(DrawingItem),
    DraggingItem(DraggingItem),
    RotatingItem(RotatingItem),
    Viewer {
        kind: ViewerKind,
        /// Mode restored when the viewer closes.
        previous: Box<Mode>,
    },
}

impl Mode {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WaitingDrawLine(_) => "waiting-draw-line",
            Self::DrawingLine(_) => "drawing-line",
            Self::DraggingLine(_) => "dragging-line",
            Self::DraggingVertex(_) => "dragging-vertex",
            Self::DrawingHole(_) => "drawing-hole",
            Self::DraggingHole(_) => "dragging-hole",
            Self::DrawingItem(_) => "drawing-item",
            Self::DraggingItem(_) => "dragging-item",
            Self::RotatingItem(_) => "rotating-item",
            Self::Viewer { kind, .. } => match kind {
                ViewerKind::ViewingCatalog => "viewing-catalog",
                ViewerKind::ConfiguringProject => "configuring-project",
                ViewerKind::View3D => "view-3d",
                ViewerKind::Pan => "pan",
                ViewerKind::ZoomIn => "zoom-in",
                ViewerKind::ZoomOut => "zoom-out",
            },
        }
    }

    /// Whether the working scene may hold uncommitted changes.
    #[must_use]
    pub fn is_gesture(&self) -> bool {
        match self {
            Self::DrawingLine(_)
            | Self::DraggingLine(_)
            | Self::DraggingVertex(_)
            | Self::DraggingHole(_)
            | Self::DraggingItem(_)
            | Self::RotatingItem(_) => true,
            Self::DrawingHole(support) => support.preview.is_some(),
            Self::DrawingItem(support) => support.preview.is_some(),
            Self::Idle | Self::WaitingDrawLine(_) | Self::Viewer { .. } => false,
        }
    }

    /// The mode to fall back to when the gesture in progress is abandoned:
    /// tools stay armed, drags end in `Idle`.
    #[must_use]
    pub fn settled(self) -> Self {
        match self {
            Self::DrawingLine(support) => Self::WaitingDrawLine(WaitingLine {
                line_type: support.line_type,
            }),
            Self::DrawingHole(support) => Self::DrawingHole(DrawingHole {
                preview: None,
                ..support
            }),
            Self::DrawingItem(support) => Self::DrawingItem(DrawingItem {
                preview: None,
                ..support
            }),
            Self::DraggingLine(_)
            | Self::DraggingVertex(_)
            | Self::DraggingHole(_)
            | Self::DraggingItem(_)
            | Self::RotatingItem(_) => Self::Idle,
            other @ (Self::Idle | Self::WaitingDrawLine(_) | Self::Viewer { .. }) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settling_keeps_tools_armed() {
        let drawing = Mode::DrawingItem(DrawingItem {
            item_type: "sofa".to_owned(),
            preview: Some((LayerId::new("layer-1"), ItemId::default())),
        });
        assert!(drawing.is_gesture());
        let settled = drawing.settled();
        assert!(!settled.is_gesture());
        assert!(matches!(settled, Mode::DrawingItem(DrawingItem { ref item_type, preview: None }) if item_type == "sofa"));
    }

    #[test]
    fn drags_settle_to_idle() {
        let mode = Mode::DraggingVertex(DraggingVertex {
            layer: LayerId::new("layer-1"),
            vertex: VertexId::default(),
            original: Point2::origin(),
        });
        assert_eq!(mode.settled(), Mode::Idle);
    }
}
