//! The interactive editing context: one working scene, its history and the
//! gesture state machine.
//!
//! Every command runs against a copy of the last committed snapshot and is
//! committed only if it succeeds, so a failed command leaves the editor
//! exactly as it was.

mod gestures;
mod mode;

pub use mode::{
    DraggingHole, DraggingItem, DraggingLine, DraggingVertex, DrawingHole, DrawingItem,
    DrawingLine, Mode, RotatingItem, ViewerKind, WaitingLine,
};

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::EditorConfig;
use crate::error::{InputError, Result};
use crate::history::History;
use crate::math::Point2;
use crate::scene::{LayerId, Scene};
use crate::snap::{nearest_snap, scene_candidates, without_related, SnapCandidate, SnapMask};
use crate::topology::ElementRef;

/// Owns a plan while it is being edited.
#[derive(Debug, Clone)]
pub struct Editor {
    scene: Scene,
    history: History,
    mode: Mode,
    snap_mask: SnapMask,
    candidates: Vec<SnapCandidate>,
    catalog: Arc<Catalog>,
    config: EditorConfig,
    /// Set by every commit, cleared when an autosave is taken.
    dirty: bool,
}

impl Editor {
    /// Starts an editor on an empty scene sized by `config`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: EditorConfig) -> Self {
        let mut scene = Scene::new(config.scene_width, config.scene_height);
        scene.unit = config.unit;
        let history = History::new(scene.clone()).with_depth(config.history_depth);
        Self {
            scene,
            history,
            mode: Mode::Idle,
            snap_mask: config.snap.mask,
            candidates: Vec::new(),
            catalog,
            config,
            dirty: false,
        }
    }

    /// The working scene, including any gesture preview.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The last committed scene.
    #[must_use]
    pub fn committed(&self) -> &Scene {
        self.history.last()
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn snap_mask(&self) -> SnapMask {
        self.snap_mask
    }

    pub fn set_snap_mask(&mut self, mask: SnapMask) {
        self.snap_mask = mask;
    }

    /// Runs a command against a copy of the committed scene and commits the
    /// result. On error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WrongMode`] while a gesture is in progress, or
    /// whatever the command returns.
    pub fn apply<T>(&mut self, command: impl FnOnce(&mut Scene, &Catalog) -> Result<T>) -> Result<T> {
        if self.mode.is_gesture() {
            return Err(InputError::WrongMode(self.mode.name()).into());
        }
        let mut working = self.history.last().clone();
        let value = command(&mut working, &self.catalog)?;
        self.scene = working;
        self.commit();
        Ok(value)
    }

    /// Pushes the working scene onto the history.
    fn commit(&mut self) {
        if self.history.push(&self.scene) {
            self.dirty = true;
        }
    }

    /// Runs `command` on a copy of the committed scene, for gestures that
    /// commit by replaying their effect instead of keeping the preview.
    fn commit_from_committed<T>(
        &mut self,
        command: impl FnOnce(&mut Scene, &Catalog) -> Result<T>,
    ) -> Result<T> {
        let mut working = self.history.last().clone();
        match command(&mut working, &self.catalog) {
            Ok(value) => {
                self.scene = working;
                self.commit();
                Ok(value)
            }
            Err(err) => {
                self.cancel_gesture();
                Err(err)
            }
        }
    }

    /// Abandons the gesture in progress, restoring the committed scene and
    /// the mode the gesture started from.
    fn cancel_gesture(&mut self) {
        self.scene = self.history.last().clone();
        self.mode = std::mem::take(&mut self.mode).settled();
        self.candidates.clear();
    }

    /// Discards every uncommitted change and returns to `Idle` without
    /// touching the history.
    pub fn rollback(&mut self) {
        self.scene = self.history.last().clone();
        self.mode = Mode::Idle;
        self.candidates.clear();
        debug!("rollback");
    }

    /// Steps back one commit, abandoning any gesture first.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let changed = self.history.undo();
        if changed {
            self.scene = self.history.last().clone();
            self.dirty = true;
        }
        changed
    }

    /// Re-applies the last undone commit, abandoning any gesture first.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let changed = self.history.redo();
        if changed {
            self.scene = self.history.last().clone();
            self.dirty = true;
        }
        changed
    }

    /// Replaces the plan with a serialized one and restarts the history.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or describes an
    /// inconsistent scene; the editor is unchanged in that case.
    pub fn load(&mut self, json: &str) -> Result<()> {
        let scene = Scene::from_json(json)?;
        self.history.reset(scene.clone());
        self.scene = scene;
        self.mode = Mode::Idle;
        self.candidates.clear();
        self.dirty = false;
        info!("project loaded");
        Ok(())
    }

    /// Serializes the last committed scene.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn save(&self) -> Result<String> {
        self.history.last().to_json()
    }

    /// The serialized committed scene, if it changed since the last autosave
    /// and no gesture is in progress.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn autosave(&mut self) -> Result<Option<String>> {
        if !self.dirty || self.mode.is_gesture() {
            return Ok(None);
        }
        let json = self.save()?;
        self.dirty = false;
        Ok(Some(json))
    }

    /// Opens a viewer screen or navigation tool, abandoning any gesture.
    pub fn open_viewer(&mut self, kind: ViewerKind) {
        self.cancel_gesture();
        let previous = match std::mem::take(&mut self.mode) {
            Mode::Viewer { previous, .. } => previous,
            other => Box::new(other),
        };
        self.mode = Mode::Viewer { kind, previous };
    }

    /// Leaves a viewer, restoring the mode it was opened from.
    pub fn close_viewer(&mut self) {
        if let Mode::Viewer { previous, .. } = std::mem::take(&mut self.mode) {
            self.mode = *previous;
        }
    }

    /// Rebuilds the snap candidates of `layer`, leaving out anchors derived
    /// from `exclude`.
    fn prepare_snapping(&mut self, layer: &LayerId, exclude: &[ElementRef]) -> Result<()> {
        let all = scene_candidates(&self.scene, layer, &self.config.snap)?;
        self.candidates = without_related(&all, exclude);
        Ok(())
    }

    /// The cursor after snapping against the prepared candidates.
    fn snap(&self, x: f64, y: f64) -> Point2 {
        let cursor = Point2::new(x, y);
        nearest_snap(&self.candidates, &cursor, &self.snap_mask).map_or(cursor, |snap| snap.point)
    }

    fn wrong_mode<T>(&self) -> Result<T> {
        Err(InputError::WrongMode(self.mode.name()).into())
    }
}
