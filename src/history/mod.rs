//! Linear undo/redo over scene snapshots.

mod diff;

pub use diff::SceneDiff;

use tracing::debug;

use crate::scene::Scene;

/// Undo/redo history.
///
/// Keeps the oldest snapshot (`first`), the newest (`last`) and the forward
/// diffs between consecutive commits. Undo never inverts a diff: it rebuilds
/// `last` by replaying the remaining diffs from `first`.
#[derive(Debug, Clone)]
pub struct History {
    first: Scene,
    last: Scene,
    undo: Vec<SceneDiff>,
    redo: Vec<SceneDiff>,
    /// Maximum number of undo steps; `0` is unbounded.
    depth: usize,
}

impl History {
    /// Starts a history at `scene`.
    #[must_use]
    pub fn new(scene: Scene) -> Self {
        Self {
            first: scene.clone(),
            last: scene,
            undo: Vec::new(),
            redo: Vec::new(),
            depth: 0,
        }
    }

    /// Caps the number of undo steps; older steps are folded into `first`.
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// The latest committed snapshot.
    #[must_use]
    pub fn last(&self) -> &Scene {
        &self.last
    }

    /// The oldest snapshot still reachable by undo.
    #[must_use]
    pub fn first(&self) -> &Scene {
        &self.first
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Commits `scene`. Returns `false` (and changes nothing) when it equals
    /// the latest snapshot.
    pub fn push(&mut self, scene: &Scene) -> bool {
        let diff = SceneDiff::between(&self.last, scene);
        if diff.is_empty() {
            return false;
        }
        self.last = scene.clone();
        self.undo.push(diff);
        self.redo.clear();

        if self.depth > 0 {
            while self.undo.len() > self.depth {
                let oldest = self.undo.remove(0);
                oldest.apply(&mut self.first);
            }
        }
        debug!(steps = self.undo.len(), "history push");
        true
    }

    /// Steps back one commit. A no-op when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(diff) = self.undo.pop() else {
            return false;
        };
        self.redo.push(diff);
        let mut scene = self.first.clone();
        for step in &self.undo {
            step.apply(&mut scene);
        }
        self.last = scene;
        debug!(steps = self.undo.len(), "history undo");
        true
    }

    /// Re-applies the most recently undone commit. A no-op when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(diff) = self.redo.pop() else {
            return false;
        };
        diff.apply(&mut self.last);
        self.undo.push(diff);
        debug!(steps = self.undo.len(), "history redo");
        true
    }

    /// Drops every step and restarts at `scene`.
    pub fn reset(&mut self, scene: Scene) {
        self.first = scene.clone();
        self.last = scene;
        self.undo.clear();
        self.redo.clear();
    }
}
