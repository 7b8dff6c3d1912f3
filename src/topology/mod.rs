pub mod area;
pub mod element;
pub mod element_set;
pub mod hole;
pub mod item;
pub mod line;
pub mod vertex;

pub use area::{Area, AreaId};
pub use element::{ElementRef, Prototype};
pub use element_set::ElementSet;
pub use hole::{Hole, HoleId};
pub use item::{Item, ItemId};
pub use line::{Line, LineId};
pub use vertex::{Vertex, VertexId};

use serde::{Deserialize, Serialize};
use slotmap::{Key, SlotMap};

use crate::error::TopologyError;
use crate::math::distance_2d::point_at_offset;
use crate::math::{same_points, Point2};

/// One plane of the plan: the arena that owns every vertex, wall, opening,
/// room and item drawn on it.
///
/// Entities reference each other via typed IDs (generational indices),
/// so a stale reference is detected instead of silently aliasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub altitude: f64,
    pub order: i32,
    pub opacity: f64,
    pub visible: bool,
    vertices: SlotMap<VertexId, Vertex>,
    lines: SlotMap<LineId, Line>,
    holes: SlotMap<HoleId, Hole>,
    areas: SlotMap<AreaId, Area>,
    items: SlotMap<ItemId, Item>,
    selected: ElementSet,
}

fn not_found<K: Key>(prototype: Prototype, id: K) -> TopologyError {
    TopologyError::not_found(prototype, id)
}

pub(crate) fn same_entries<K: Key, V: PartialEq>(a: &SlotMap<K, V>, b: &SlotMap<K, V>) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.altitude == other.altitude
            && self.order == other.order
            && self.opacity == other.opacity
            && self.visible == other.visible
            && self.selected == other.selected
            && same_entries(&self.vertices, &other.vertices)
            && same_entries(&self.lines, &other.lines)
            && same_entries(&self.holes, &other.holes)
            && same_entries(&self.areas, &other.areas)
            && same_entries(&self.items, &other.items)
    }
}

impl Layer {
    /// Creates a new, empty, visible layer.
    #[must_use]
    pub fn new(name: impl Into<String>, altitude: f64) -> Self {
        Self {
            name: name.into(),
            altitude,
            order: 0,
            opacity: 1.0,
            visible: true,
            vertices: SlotMap::with_key(),
            lines: SlotMap::with_key(),
            holes: SlotMap::with_key(),
            areas: SlotMap::with_key(),
            items: SlotMap::with_key(),
            selected: ElementSet::new(),
        }
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn insert_vertex(&mut self, data: Vertex) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| not_found(Prototype::Vertex, id))
    }

    /// Returns a mutable reference to the vertex, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| not_found(Prototype::Vertex, id))
    }

    /// Drops a vertex from the arena without touching its referrers.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn take_vertex(&mut self, id: VertexId) -> Result<Vertex, TopologyError> {
        self.selected.remove(ElementRef::Vertex(id));
        self.vertices
            .remove(id)
            .ok_or_else(|| not_found(Prototype::Vertex, id))
    }

    pub fn vertices(&self) -> slotmap::basic::Iter<'_, VertexId, Vertex> {
        self.vertices.iter()
    }

    /// The live vertex at `point`, if any.
    #[must_use]
    pub fn vertex_at(&self, point: &Point2) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, v)| same_points(&v.point(), point))
            .map(|(id, _)| id)
    }

    // --- Line operations ---

    /// Inserts a line and returns its ID.
    pub fn insert_line(&mut self, data: Line) -> LineId {
        self.lines.insert(data)
    }

    /// Returns a reference to the line, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn line(&self, id: LineId) -> Result<&Line, TopologyError> {
        self.lines.get(id).ok_or_else(|| not_found(Prototype::Line, id))
    }

    /// Returns a mutable reference to the line, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn line_mut(&mut self, id: LineId) -> Result<&mut Line, TopologyError> {
        self.lines
            .get_mut(id)
            .ok_or_else(|| not_found(Prototype::Line, id))
    }

    /// Drops a line from the arena without touching vertices or holes.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn take_line(&mut self, id: LineId) -> Result<Line, TopologyError> {
        self.selected.remove(ElementRef::Line(id));
        self.lines.remove(id).ok_or_else(|| not_found(Prototype::Line, id))
    }

    pub fn lines(&self) -> slotmap::basic::Iter<'_, LineId, Line> {
        self.lines.iter()
    }

    /// Positions of the two endpoints of a line, in vertex order.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or one of its vertices is missing.
    pub fn line_points(&self, id: LineId) -> Result<(Point2, Point2), TopologyError> {
        let [v0, v1] = self.line(id)?.vertices;
        Ok((self.vertex(v0)?.point(), self.vertex(v1)?.point()))
    }

    // --- Hole operations ---

    /// Inserts a hole and returns its ID.
    pub fn insert_hole(&mut self, data: Hole) -> HoleId {
        self.holes.insert(data)
    }

    /// Returns a reference to the hole, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn hole(&self, id: HoleId) -> Result<&Hole, TopologyError> {
        self.holes.get(id).ok_or_else(|| not_found(Prototype::Hole, id))
    }

    /// Returns a mutable reference to the hole, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn hole_mut(&mut self, id: HoleId) -> Result<&mut Hole, TopologyError> {
        self.holes
            .get_mut(id)
            .ok_or_else(|| not_found(Prototype::Hole, id))
    }

    /// Drops a hole from the arena without detaching it from its line.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn take_hole(&mut self, id: HoleId) -> Result<Hole, TopologyError> {
        self.selected.remove(ElementRef::Hole(id));
        self.holes.remove(id).ok_or_else(|| not_found(Prototype::Hole, id))
    }

    pub fn holes(&self) -> slotmap::basic::Iter<'_, HoleId, Hole> {
        self.holes.iter()
    }

    /// Absolute plan position of a hole center.
    ///
    /// # Errors
    ///
    /// Returns an error if the hole or its line is missing.
    pub fn hole_position(&self, id: HoleId) -> Result<Point2, TopologyError> {
        let hole = self.hole(id)?;
        let (p0, p1) = self.line_points(hole.line)?;
        Ok(point_at_offset(&p0, &p1, hole.offset))
    }

    // --- Area operations ---

    /// Inserts an area and returns its ID.
    pub fn insert_area(&mut self, data: Area) -> AreaId {
        self.areas.insert(data)
    }

    /// Returns a reference to the area, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn area(&self, id: AreaId) -> Result<&Area, TopologyError> {
        self.areas.get(id).ok_or_else(|| not_found(Prototype::Area, id))
    }

    /// Returns a mutable reference to the area, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn area_mut(&mut self, id: AreaId) -> Result<&mut Area, TopologyError> {
        self.areas
            .get_mut(id)
            .ok_or_else(|| not_found(Prototype::Area, id))
    }

    /// Drops an area from the arena without touching its vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn take_area(&mut self, id: AreaId) -> Result<Area, TopologyError> {
        self.selected.remove(ElementRef::Area(id));
        self.areas.remove(id).ok_or_else(|| not_found(Prototype::Area, id))
    }

    pub fn areas(&self) -> slotmap::basic::Iter<'_, AreaId, Area> {
        self.areas.iter()
    }

    /// Corner positions of an area, in loop order.
    ///
    /// # Errors
    ///
    /// Returns an error if the area or one of its vertices is missing.
    pub fn area_polygon(&self, id: AreaId) -> Result<Vec<Point2>, TopologyError> {
        self.area(id)?
            .vertices
            .iter()
            .map(|&v| self.vertex(v).map(Vertex::point))
            .collect()
    }

    // --- Item operations ---

    /// Inserts an item and returns its ID.
    pub fn insert_item(&mut self, data: Item) -> ItemId {
        self.items.insert(data)
    }

    /// Returns a reference to the item, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn item(&self, id: ItemId) -> Result<&Item, TopologyError> {
        self.items.get(id).ok_or_else(|| not_found(Prototype::Item, id))
    }

    /// Returns a mutable reference to the item, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, TopologyError> {
        self.items
            .get_mut(id)
            .ok_or_else(|| not_found(Prototype::Item, id))
    }

    /// Drops an item from the arena.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the layer.
    pub fn take_item(&mut self, id: ItemId) -> Result<Item, TopologyError> {
        self.selected.remove(ElementRef::Item(id));
        self.items.remove(id).ok_or_else(|| not_found(Prototype::Item, id))
    }

    pub fn items(&self) -> slotmap::basic::Iter<'_, ItemId, Item> {
        self.items.iter()
    }

    // --- Generic element access ---

    /// `true` if the referenced element is alive in this layer.
    #[must_use]
    pub fn contains(&self, element: ElementRef) -> bool {
        match element {
            ElementRef::Vertex(id) => self.vertices.contains_key(id),
            ElementRef::Line(id) => self.lines.contains_key(id),
            ElementRef::Hole(id) => self.holes.contains_key(id),
            ElementRef::Area(id) => self.areas.contains_key(id),
            ElementRef::Item(id) => self.items.contains_key(id),
        }
    }

    // --- Selection ---

    /// The selection index of this layer.
    #[must_use]
    pub fn selected(&self) -> &ElementSet {
        &self.selected
    }

    fn selected_flag(&mut self, element: ElementRef) -> Result<&mut bool, TopologyError> {
        Ok(match element {
            ElementRef::Vertex(id) => &mut self.vertex_mut(id)?.selected,
            ElementRef::Line(id) => &mut self.line_mut(id)?.selected,
            ElementRef::Hole(id) => &mut self.hole_mut(id)?.selected,
            ElementRef::Area(id) => &mut self.area_mut(id)?.selected,
            ElementRef::Item(id) => &mut self.item_mut(id)?.selected,
        })
    }

    /// Marks an element selected, keeping its flag and the index in step.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not in this layer.
    pub fn select(&mut self, element: ElementRef) -> Result<(), TopologyError> {
        *self.selected_flag(element)? = true;
        self.selected.insert(element);
        Ok(())
    }

    /// Clears an element's selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not in this layer.
    pub fn unselect(&mut self, element: ElementRef) -> Result<(), TopologyError> {
        *self.selected_flag(element)? = false;
        self.selected.remove(element);
        Ok(())
    }

    /// Clears every selection flag of the layer.
    pub fn unselect_all(&mut self) {
        for v in self.vertices.values_mut() {
            v.selected = false;
        }
        for l in self.lines.values_mut() {
            l.selected = false;
        }
        for h in self.holes.values_mut() {
            h.selected = false;
        }
        for a in self.areas.values_mut() {
            a.selected = false;
        }
        for i in self.items.values_mut() {
            i.selected = false;
        }
        self.selected.clear();
    }
}
