use tracing::debug;

use super::hole::RemoveHole;
use super::item::RemoveItem;
use super::line::RemoveLine;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::operations::areas::DetectAreas;
use crate::scene::Scene;

/// Deletes the selected walls, openings and items of every layer, then
/// re-derives the rooms of the layers that lost walls.
pub struct RemoveSelected;

impl RemoveSelected {
    /// Executes the operation, returning how many elements were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer is inconsistent or a room cannot be rebuilt.
    pub fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<usize> {
        let mut removed = 0;
        for layer_id in scene.layer_ids() {
            let selected = scene.layer(&layer_id)?.selected().clone();

            for &line in &selected.lines {
                RemoveLine::new(layer_id.clone(), line).execute(scene)?;
                removed += 1;
            }
            for &hole in &selected.holes {
                // Holes of a removed wall are already gone.
                if scene.layer(&layer_id)?.hole(hole).is_ok() {
                    RemoveHole::new(layer_id.clone(), hole).execute(scene)?;
                    removed += 1;
                }
            }
            for &item in &selected.items {
                RemoveItem::new(layer_id.clone(), item).execute(scene)?;
                removed += 1;
            }

            if !selected.lines.is_empty() {
                DetectAreas::new(layer_id.clone()).execute(scene, catalog)?;
            }
        }
        debug!(removed, "removed selection");
        Ok(removed)
    }
}
