use crate::catalog::Catalog;
use crate::error::Result;
use crate::math::Point2;
use crate::properties::Properties;
use crate::scene::{LayerId, Scene};
use crate::topology::{Item, ItemId, Layer, Prototype};

/// Places a piece of furniture.
pub struct CreateItem {
    element_type: String,
    position: Point2,
    rotation: f64,
    properties: Option<Properties>,
}

impl CreateItem {
    #[must_use]
    pub fn new(element_type: impl Into<String>, position: Point2, rotation: f64) -> Self {
        Self {
            element_type: element_type.into(),
            position,
            rotation,
            properties: None,
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Option<Properties>) -> Self {
        self.properties = properties;
        self
    }

    /// Executes the operation, returning the new item.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog has no item element named `element_type`.
    pub fn execute(&self, layer: &mut Layer, catalog: &Catalog) -> Result<ItemId> {
        let template = catalog.factory(&self.element_type, Prototype::Item, self.properties.as_ref())?;
        Ok(layer.insert_item(Item::new(
            template,
            self.position.x,
            self.position.y,
            self.rotation,
        )))
    }
}

/// Deletes an item and its group memberships.
pub struct RemoveItem {
    layer: LayerId,
    item: ItemId,
}

impl RemoveItem {
    #[must_use]
    pub fn new(layer: LayerId, item: ItemId) -> Self {
        Self { layer, item }
    }

    /// Executes the operation, returning the removed item.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer or item does not exist.
    pub fn execute(&self, scene: &mut Scene) -> Result<Item> {
        let item = scene.layer_mut(&self.layer)?.take_item(self.item)?;
        scene.detach_from_groups(&self.layer, self.item.into());
        Ok(item)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::scene::Group;

    #[test]
    fn create_and_remove_item() {
        let mut scene = Scene::default();
        let id = scene.selected_layer().clone();
        let item = CreateItem::new("sofa", Point2::new(10.0, 20.0), 90.0)
            .execute(scene.layer_mut(&id).unwrap(), &test_catalog())
            .unwrap();
        let mut group = Group::new("living");
        group.insert(&id, item.into());
        let gid = scene.insert_group(group);

        let removed = RemoveItem::new(id.clone(), item).execute(&mut scene).unwrap();
        assert_eq!(removed.position(), Point2::new(10.0, 20.0));
        assert_eq!(removed.properties.length("width"), Some(200.0));
        assert!(scene.layer(&id).unwrap().item(item).is_err());
        assert!(scene.group(gid).unwrap().elements.is_empty());
    }

    #[test]
    fn items_need_an_item_template() {
        let mut layer = Layer::new("layer", 0.0);
        let result = CreateItem::new("wall", Point2::origin(), 0.0).execute(&mut layer, &test_catalog());
        assert!(result.is_err());
    }
}
