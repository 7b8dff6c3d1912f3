use tracing::debug;

use super::Scene;
use crate::error::{PersistenceError, Result};
use crate::operations::query::CheckIntegrity;

impl Scene {
    /// Serializes the scene as a nested JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self).map_err(PersistenceError::from)?)
    }

    /// Parses a scene and validates its structure.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Json`] for malformed input, or a topology
    /// error if the document describes an inconsistent scene.
    pub fn from_json(source: &str) -> Result<Self> {
        let scene: Self = serde_json::from_str(source).map_err(PersistenceError::from)?;
        CheckIntegrity.execute(&scene)?;
        debug!(layers = scene.layer_ids().len(), "loaded scene");
        Ok(scene)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::error::PlannerError;
    use crate::math::Point2;
    use crate::operations::editing::CreateHole;
    use crate::operations::intersect::CreateLineAvoidingIntersections;
    use crate::scene::Guide;

    #[test]
    fn json_round_trip_preserves_the_scene() {
        let catalog = test_catalog();
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let wall = CreateLineAvoidingIntersections::new(id.clone(), "wall", Point2::new(0.0, 0.0), Point2::new(100.0, 0.0))
            .execute(&mut scene, &catalog)
            .unwrap()[0];
        CreateHole::new("door", wall, 0.5)
            .execute(scene.layer_mut(&id).unwrap(), &catalog)
            .unwrap();
        scene.add_guide(Guide::Horizontal { y: 40.0 });
        scene.add_layer("upstairs", 300.0);

        let json = scene.to_json().unwrap();
        let loaded = Scene::from_json(&json).unwrap();
        assert_eq!(loaded, scene);
    }

    #[test]
    fn malformed_json_is_a_persistence_error() {
        let err = Scene::from_json("{\"unit\": 3}").unwrap_err();
        assert!(matches!(err, PlannerError::Persistence(PersistenceError::Json(_))));
    }
}
