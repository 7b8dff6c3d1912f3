use crate::error::{Result, TopologyError};
use crate::scene::{LayerId, Scene};
use crate::topology::ElementRef;

/// Selects an element, replacing the current selection unless additive.
pub struct Select {
    layer: LayerId,
    element: ElementRef,
    additive: bool,
}

impl Select {
    #[must_use]
    pub fn new(layer: LayerId, element: ElementRef) -> Self {
        Self {
            layer,
            element,
            additive: false,
        }
    }

    /// Keeps the current selection and adds to it.
    #[must_use]
    pub fn additive(mut self) -> Self {
        self.additive = true;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer or element does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<()> {
        if !scene.layer(&self.layer)?.contains(self.element) {
            return Err(TopologyError::not_found(self.element.prototype(), self.element).into());
        }
        if !self.additive {
            scene.unselect_all();
        }
        scene.layer_mut(&self.layer)?.select(self.element)?;
        Ok(())
    }
}

/// Removes one element from the selection.
pub struct Unselect {
    layer: LayerId,
    element: ElementRef,
}

impl Unselect {
    #[must_use]
    pub fn new(layer: LayerId, element: ElementRef) -> Self {
        Self { layer, element }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer or element does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<()> {
        scene.layer_mut(&self.layer)?.unselect(self.element)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::Vertex;

    #[test]
    fn select_replaces_unless_additive() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let other = scene.add_layer("upstairs", 300.0);
        let a = scene.layer_mut(&id).unwrap().insert_vertex(Vertex::new(0.0, 0.0));
        let b = scene.layer_mut(&other).unwrap().insert_vertex(Vertex::new(0.0, 0.0));

        Select::new(id.clone(), a.into()).execute(&mut scene).unwrap();
        Select::new(other.clone(), b.into()).execute(&mut scene).unwrap();
        assert!(scene.layer(&id).unwrap().selected().is_empty());
        assert!(!scene.layer(&id).unwrap().vertex(a).unwrap().selected);

        Select::new(id.clone(), a.into()).additive().execute(&mut scene).unwrap();
        assert_eq!(scene.layer(&other).unwrap().selected().vertices, vec![b]);
        assert_eq!(scene.layer(&id).unwrap().selected().vertices, vec![a]);

        Unselect::new(id.clone(), a.into()).execute(&mut scene).unwrap();
        assert!(!scene.layer(&id).unwrap().vertex(a).unwrap().selected);
    }

    #[test]
    fn selecting_a_missing_element_fails_without_clearing() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let a = scene.layer_mut(&id).unwrap().insert_vertex(Vertex::new(0.0, 0.0));
        let gone = scene.layer_mut(&id).unwrap().insert_vertex(Vertex::new(1.0, 0.0));
        scene.layer_mut(&id).unwrap().take_vertex(gone).unwrap();
        Select::new(id.clone(), a.into()).execute(&mut scene).unwrap();

        assert!(Select::new(id.clone(), gone.into()).execute(&mut scene).is_err());
        assert_eq!(scene.layer(&id).unwrap().selected().vertices, vec![a]);
    }
}
