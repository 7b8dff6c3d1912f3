use serde::{Deserialize, Serialize};

use super::{AreaId, ElementRef, HoleId, ItemId, LineId, VertexId};

/// Ordered, duplicate-free id lists per prototype.
///
/// Used both as a layer's selection index and as a group's member list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSet {
    pub vertices: Vec<VertexId>,
    pub lines: Vec<LineId>,
    pub holes: Vec<HoleId>,
    pub areas: Vec<AreaId>,
    pub items: Vec<ItemId>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, id: T) -> bool {
    if list.contains(&id) {
        false
    } else {
        list.push(id);
        true
    }
}

fn remove_id<T: PartialEq>(list: &mut Vec<T>, id: &T) -> bool {
    let before = list.len();
    list.retain(|x| x != id);
    before != list.len()
}

impl ElementSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the element; returns `false` if it was already present.
    pub fn insert(&mut self, element: ElementRef) -> bool {
        match element {
            ElementRef::Vertex(id) => push_unique(&mut self.vertices, id),
            ElementRef::Line(id) => push_unique(&mut self.lines, id),
            ElementRef::Hole(id) => push_unique(&mut self.holes, id),
            ElementRef::Area(id) => push_unique(&mut self.areas, id),
            ElementRef::Item(id) => push_unique(&mut self.items, id),
        }
    }

    /// Removes the element; returns `false` if it was absent.
    pub fn remove(&mut self, element: ElementRef) -> bool {
        match element {
            ElementRef::Vertex(id) => remove_id(&mut self.vertices, &id),
            ElementRef::Line(id) => remove_id(&mut self.lines, &id),
            ElementRef::Hole(id) => remove_id(&mut self.holes, &id),
            ElementRef::Area(id) => remove_id(&mut self.areas, &id),
            ElementRef::Item(id) => remove_id(&mut self.items, &id),
        }
    }

    #[must_use]
    pub fn contains(&self, element: ElementRef) -> bool {
        match element {
            ElementRef::Vertex(id) => self.vertices.contains(&id),
            ElementRef::Line(id) => self.lines.contains(&id),
            ElementRef::Hole(id) => self.holes.contains(&id),
            ElementRef::Area(id) => self.areas.contains(&id),
            ElementRef::Item(id) => self.items.contains(&id),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.lines.is_empty()
            && self.holes.is_empty()
            && self.areas.is_empty()
            && self.items.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// All members, prototype by prototype.
    pub fn iter(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.vertices
            .iter()
            .map(|&id| ElementRef::Vertex(id))
            .chain(self.lines.iter().map(|&id| ElementRef::Line(id)))
            .chain(self.holes.iter().map(|&id| ElementRef::Hole(id)))
            .chain(self.areas.iter().map(|&id| ElementRef::Area(id)))
            .chain(self.items.iter().map(|&id| ElementRef::Item(id)))
    }
}
