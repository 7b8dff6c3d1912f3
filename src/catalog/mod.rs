//! The element catalog: per-type factories with declared default properties.
//!
//! The engine never hardcodes defaults. Every line, hole, area and item is
//! stamped from an [`ElementTemplate`] the catalog builds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::properties::{Properties, PropertyValue};
use crate::topology::Prototype;

/// Name of the catalog element used for derived rooms.
pub const AREA_ELEMENT: &str = "area";

/// Declared type of a property, as exposed to the attribute editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Length,
    Number,
    Text,
    Color,
    Checkbox,
    Enum,
}

/// Schema of one property: its kind and the value a new element starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(rename = "default")]
    pub default_value: PropertyValue,
}

impl PropertyInfo {
    #[must_use]
    pub fn new(kind: PropertyKind, default_value: PropertyValue) -> Self {
        Self {
            kind,
            default_value,
        }
    }
}

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogElement {
    pub name: String,
    pub prototype: Prototype,
    /// Human readable title, used as the default element name.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyInfo>,
}

impl CatalogElement {
    #[must_use]
    pub fn new(name: impl Into<String>, prototype: Prototype) -> Self {
        Self {
            name: name.into(),
            prototype,
            title: None,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property declaration.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, info: PropertyInfo) -> Self {
        self.properties.insert(key.into(), info);
        self
    }

    /// Defaults from the schema, overlaid with `overrides`.
    #[must_use]
    pub fn build_properties(&self, overrides: Option<&Properties>) -> Properties {
        let mut properties = Properties::new();
        for (key, info) in &self.properties {
            properties.insert(key.clone(), info.default_value.clone());
        }
        if let Some(overrides) = overrides {
            properties.merge(overrides);
        }
        properties
    }
}

/// Everything an entity constructor needs from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementTemplate {
    pub element_type: String,
    pub name: String,
    pub properties: Properties,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "element")]
    elements: Vec<CatalogElement>,
}

/// Registry of catalog elements, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    elements: BTreeMap<String, CatalogElement>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from TOML `[[element]]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the document is malformed.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(source).map_err(CatalogError::from)?;
        let mut catalog = Self::new();
        for element in file.elements {
            catalog.register(element);
        }
        Ok(catalog)
    }

    /// Adds or replaces an element.
    pub fn register(&mut self, element: CatalogElement) {
        self.elements.insert(element.name.clone(), element);
    }

    /// Builder-style [`Catalog::register`].
    #[must_use]
    pub fn with(mut self, element: CatalogElement) -> Self {
        self.register(element);
        self
    }

    /// Looks up an element by type name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownElement`] if nothing is registered under `name`.
    pub fn element(&self, name: &str) -> Result<&CatalogElement> {
        Ok(self
            .elements
            .get(name)
            .ok_or_else(|| CatalogError::UnknownElement(name.to_owned()))?)
    }

    /// Runs the factory of `name`, checking that it builds a `prototype`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is unknown or of another prototype.
    pub fn factory(
        &self,
        name: &str,
        prototype: Prototype,
        overrides: Option<&Properties>,
    ) -> Result<ElementTemplate> {
        let element = self.element(name)?;
        if element.prototype != prototype {
            return Err(CatalogError::WrongPrototype {
                name: name.to_owned(),
                expected: prototype,
                found: element.prototype,
            }
            .into());
        }
        Ok(ElementTemplate {
            element_type: element.name.clone(),
            name: element.title.clone().unwrap_or_else(|| element.name.clone()),
            properties: element.build_properties(overrides),
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = &CatalogElement> {
        self.elements.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::error::PlannerError;

    /// Catalog used across the crate's tests.
    pub(crate) fn test_catalog() -> Catalog {
        Catalog::from_toml_str(
            r##"
            [[element]]
            name = "wall"
            prototype = "line"
            title = "Wall"
            [element.properties.height]
            type = "length"
            default = { length = 300.0 }
            [element.properties.thickness]
            type = "length"
            default = { length = 20.0 }

            [[element]]
            name = "door"
            prototype = "hole"
            title = "Door"
            [element.properties.width]
            type = "length"
            default = { length = 80.0 }

            [[element]]
            name = "area"
            prototype = "area"
            title = "Area"
            [element.properties.patternColor]
            type = "color"
            default = "#f5f4f4"

            [[element]]
            name = "sofa"
            prototype = "item"
            title = "Sofa"
            [element.properties.width]
            type = "length"
            default = { length = 200.0 }
            "##,
        )
        .unwrap()
    }

    #[test]
    fn factory_fills_defaults_and_overrides() {
        let catalog = test_catalog();
        let overrides = Properties::new().with("height", PropertyValue::Length { length: 250.0 });
        let template = catalog.factory("wall", Prototype::Line, Some(&overrides)).unwrap();
        assert_eq!(template.name, "Wall");
        assert_eq!(template.properties.length("height"), Some(250.0));
        assert_eq!(template.properties.length("thickness"), Some(20.0));
    }

    #[test]
    fn factory_rejects_wrong_prototype() {
        let catalog = test_catalog();
        let err = catalog.factory("door", Prototype::Line, None).unwrap_err();
        assert!(matches!(err, PlannerError::Catalog(CatalogError::WrongPrototype { .. })));
    }

    #[test]
    fn unknown_element() {
        let err = test_catalog().factory("bathtub", Prototype::Item, None).unwrap_err();
        assert!(matches!(err, PlannerError::Catalog(CatalogError::UnknownElement(_))));
    }

    #[test]
    fn elements_can_be_registered_in_code() {
        let catalog = Catalog::new().with(
            CatalogElement::new("window", Prototype::Hole)
                .with_property("width", PropertyInfo::new(PropertyKind::Length, PropertyValue::Length { length: 90.0 })),
        );
        let template = catalog.factory("window", Prototype::Hole, None).unwrap();
        assert_eq!(template.name, "window");
        assert_eq!(template.properties.length("width"), Some(90.0));
        assert_eq!(catalog.elements().count(), 1);
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(Catalog::from_toml_str("[[element]]\nname = 3").is_err());
    }
}
