//! Editor tuning, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};
use crate::scene::Unit;
use crate::snap::SnapMask;

/// Snap radii (scene units) and priority weights per candidate kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub point_tolerance: f64,
    pub line_tolerance: f64,
    pub segment_tolerance: f64,
    pub grid_tolerance: f64,
    pub guide_tolerance: f64,
    pub point_priority: u32,
    pub line_priority: u32,
    pub segment_priority: u32,
    pub major_grid_priority: u32,
    pub minor_grid_priority: u32,
    pub guide_priority: u32,
    /// Spacing of the minor grid.
    pub grid_cell: f64,
    /// Every `grid_divider`-th minor line is a major one.
    pub grid_divider: u32,
    pub mask: SnapMask,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            point_tolerance: 20.0,
            line_tolerance: 10.0,
            segment_tolerance: 20.0,
            grid_tolerance: 10.0,
            guide_tolerance: 10.0,
            point_priority: 10,
            line_priority: 1,
            segment_priority: 1,
            major_grid_priority: 6,
            minor_grid_priority: 5,
            guide_priority: 3,
            grid_cell: 20.0,
            grid_divider: 5,
            mask: SnapMask::all(),
        }
    }
}

/// Settings of an [`Editor`](crate::editor::Editor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub scene_width: f64,
    pub scene_height: f64,
    pub unit: Unit,
    /// Smallest accepted scene width or height.
    pub minimum_dimension: f64,
    /// Maximum number of undo steps; `0` keeps every step.
    pub history_depth: usize,
    /// Item rotations within this many degrees of zero snap to zero.
    pub rotation_snap_threshold: f64,
    /// Catalog types used when a gesture does not name one.
    pub default_line_type: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            scene_width: 3000.0,
            scene_height: 2000.0,
            unit: Unit::Centimeter,
            minimum_dimension: 100.0,
            history_depth: 0,
            rotation_snap_threshold: 5.0,
            default_line_type: "wall".to_owned(),
        }
    }
}

impl EditorConfig {
    /// Parses a config; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Toml`] if the document is malformed.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source).map_err(PersistenceError::from)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PlannerError;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EditorConfig::from_toml_str(
            r"
            history_depth = 50
            [snap]
            point_tolerance = 15.0
            [snap.mask]
            grid = false
            ",
        )
        .unwrap();
        assert_eq!(config.history_depth, 50);
        assert!((config.snap.point_tolerance - 15.0).abs() < f64::EPSILON);
        assert!((config.snap.line_tolerance - 10.0).abs() < f64::EPSILON);
        assert!(!config.snap.mask.grid);
        assert!(config.snap.mask.point);
        assert_eq!(config.unit, Unit::Centimeter);
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = EditorConfig::from_toml_str("history_depth = \"many\"").unwrap_err();
        assert!(matches!(err, PlannerError::Persistence(PersistenceError::Toml(_))));
    }
}
