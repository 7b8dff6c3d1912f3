//! Typed element properties (thickness, height, textures, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single property value as declared by a catalog schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    /// A length in scene units.
    Length { length: f64 },
    Text(String),
}

impl PropertyValue {
    /// Numeric view of the value: numbers and lengths.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Length { length } => Some(*length),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }
}

/// Property bag attached to lines, holes, areas and items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.0.insert(key.into(), value);
    }

    /// Numeric value of `key`, if present and numeric.
    #[must_use]
    pub fn length(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(PropertyValue::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow merge: every entry of `other` overwrites or extends `self`.
    pub fn merge(&mut self, other: &Properties) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Like [`Properties::merge`], but only keys already present are touched.
    pub fn update(&mut self, other: &Properties) {
        for (k, v) in &other.0 {
            if let Some(slot) = self.0.get_mut(k) {
                *slot = v.clone();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_and_overwrites() {
        let mut props = Properties::new().with("height", PropertyValue::Length { length: 300.0 });
        props.merge(
            &Properties::new()
                .with("height", PropertyValue::Length { length: 250.0 })
                .with("textureA", PropertyValue::Text("bricks".into())),
        );
        assert_eq!(props.length("height"), Some(250.0));
        assert!(props.get("textureA").is_some());
    }

    #[test]
    fn update_ignores_unknown_keys() {
        let mut props = Properties::new().with("height", PropertyValue::Number(1.0));
        props.update(&Properties::new().with("height", PropertyValue::Number(2.0)).with("other", PropertyValue::Bool(true)));
        assert_eq!(props.length("height"), Some(2.0));
        assert!(props.get("other").is_none());
    }

    #[test]
    fn untagged_values_round_trip_through_json() {
        let props = Properties::new()
            .with("thickness", PropertyValue::Length { length: 20.0 })
            .with("flip", PropertyValue::Bool(false))
            .with("label", PropertyValue::Text("north".into()));
        let json = serde_json::to_string(&props).unwrap();
        let back: Properties = serde_json::from_str(&json).unwrap();
        assert_eq!(back, props);
    }
}
