use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::LayerId;
use crate::topology::{ElementRef, ElementSet};

slotmap::new_key_type! {
    /// Unique identifier for a group.
    pub struct GroupId;
}

/// A named cross-layer cluster of elements moved and rotated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Members per layer.
    pub elements: BTreeMap<LayerId, ElementSet>,
    /// Barycenter of the members.
    pub x: f64,
    pub y: f64,
    /// Accumulated rotation in degrees.
    pub rotation: f64,
    #[serde(default)]
    pub selected: bool,
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: BTreeMap::new(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            selected: false,
        }
    }

    #[must_use]
    pub fn contains(&self, layer: &LayerId, element: ElementRef) -> bool {
        self.elements
            .get(layer)
            .is_some_and(|set| set.contains(element))
    }

    /// Adds a member; returns `false` if it already belonged to the group.
    pub fn insert(&mut self, layer: &LayerId, element: ElementRef) -> bool {
        self.elements.entry(layer.clone()).or_default().insert(element)
    }

    /// Drops a member, pruning the layer entry once it is empty.
    pub fn remove(&mut self, layer: &LayerId, element: ElementRef) -> bool {
        let Some(set) = self.elements.get_mut(layer) else {
            return false;
        };
        let removed = set.remove(element);
        if set.is_empty() {
            self.elements.remove(layer);
        }
        removed
    }

    /// All `(layer, element)` members.
    pub fn members(&self) -> impl Iterator<Item = (&LayerId, ElementRef)> + '_ {
        self.elements
            .iter()
            .flat_map(|(layer, set)| set.iter().map(move |e| (layer, e)))
    }
}
