use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Result, TopologyError};
use crate::math::Point2;
use crate::operations::editing::MergeCoincidentVertices;
use crate::operations::intersect::RelocateVertices;
use crate::scene::{LayerId, Scene};
use crate::topology::{ElementRef, Prototype};

/// Geometric attributes editable per prototype.
#[derive(Debug, Clone, PartialEq)]
pub enum Attributes {
    Vertex {
        x: f64,
        y: f64,
    },
    /// New endpoint positions; the wall is redrawn through the intersection
    /// resolver.
    Line {
        vertex_one: Point2,
        vertex_two: Point2,
    },
    Hole {
        offset: f64,
    },
    Item {
        x: f64,
        y: f64,
        rotation: f64,
        name: Option<String>,
    },
}

impl Attributes {
    #[must_use]
    pub fn prototype(&self) -> Prototype {
        match self {
            Self::Vertex { .. } => Prototype::Vertex,
            Self::Line { .. } => Prototype::Line,
            Self::Hole { .. } => Prototype::Hole,
            Self::Item { .. } => Prototype::Item,
        }
    }
}

/// Applies [`Attributes`] to one element, or to every selected element of
/// the matching prototype.
pub struct SetAttributes {
    layer: LayerId,
    element: Option<ElementRef>,
    attributes: Attributes,
}

impl SetAttributes {
    #[must_use]
    pub fn new(layer: LayerId, element: ElementRef, attributes: Attributes) -> Self {
        Self {
            layer,
            element: Some(element),
            attributes,
        }
    }

    /// Targets the layer's current selection instead of a single element.
    #[must_use]
    pub fn on_selection(layer: LayerId, attributes: Attributes) -> Self {
        Self {
            layer,
            element: None,
            attributes,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::PrototypeMismatch`] if the attributes do not
    /// fit the element, or an error if an element does not exist.
    pub fn execute(&self, scene: &mut Scene, catalog: &Catalog) -> Result<()> {
        let targets: Vec<ElementRef> = match self.element {
            Some(element) => {
                if element.prototype() != self.attributes.prototype() {
                    return Err(TopologyError::PrototypeMismatch {
                        expected: self.attributes.prototype(),
                        found: element.prototype(),
                    }
                    .into());
                }
                vec![element]
            }
            None => scene
                .layer(&self.layer)?
                .selected()
                .iter()
                .filter(|e| e.prototype() == self.attributes.prototype())
                .collect(),
        };

        for element in targets {
            self.apply(scene, catalog, element)?;
        }
        Ok(())
    }

    fn apply(&self, scene: &mut Scene, catalog: &Catalog, element: ElementRef) -> Result<()> {
        match (&self.attributes, element) {
            (Attributes::Vertex { x, y }, ElementRef::Vertex(id)) => {
                let layer = scene.layer_mut(&self.layer)?;
                if layer.vertex(id)?.lines.is_empty() {
                    let vertex = layer.vertex_mut(id)?;
                    vertex.x = *x;
                    vertex.y = *y;
                    MergeCoincidentVertices::new(id).execute(layer)?;
                } else {
                    RelocateVertices::new(self.layer.clone(), vec![(id, Point2::new(*x, *y))])
                        .execute(scene, catalog)?;
                }
            }
            (
                Attributes::Line {
                    vertex_one,
                    vertex_two,
                },
                ElementRef::Line(id),
            ) => {
                let [v0, v1] = scene.layer(&self.layer)?.line(id)?.vertices;
                RelocateVertices::new(self.layer.clone(), vec![(v0, *vertex_one), (v1, *vertex_two)])
                    .execute(scene, catalog)?;
            }
            (Attributes::Hole { offset }, ElementRef::Hole(id)) => {
                scene.layer_mut(&self.layer)?.hole_mut(id)?.offset = offset.clamp(0.0, 1.0);
            }
            (
                Attributes::Item {
                    x,
                    y,
                    rotation,
                    name,
                },
                ElementRef::Item(id),
            ) => {
                let item = scene.layer_mut(&self.layer)?.item_mut(id)?;
                item.x = *x;
                item.y = *y;
                item.rotation = *rotation;
                if let Some(name) = name {
                    item.name.clone_from(name);
                }
            }
            (attributes, element) => {
                return Err(TopologyError::PrototypeMismatch {
                    expected: attributes.prototype(),
                    found: element.prototype(),
                }
                .into());
            }
        }
        debug!(?element, "set attributes");
        Ok(())
    }
}
