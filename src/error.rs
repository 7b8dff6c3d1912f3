use thiserror::Error;

use crate::topology::Prototype;

/// Top-level error type for the floor-plan engine.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Invariant violations: a caller referenced something that does not exist,
/// or the scene is structurally inconsistent.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("{prototype} not found: {id}")]
    EntityNotFound { prototype: Prototype, id: String },

    #[error("layer not found: {0}")]
    LayerNotFound(String),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("expected a {expected}, got a {found}")]
    PrototypeMismatch {
        expected: Prototype,
        found: Prototype,
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Recoverable rejections of user input. The attempted edit is discarded.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("a wall needs two distinct endpoints")]
    DegenerateLine,

    #[error("scene dimensions {width}x{height} are below the minimum of {minimum}")]
    SceneTooSmall {
        width: f64,
        height: f64,
        minimum: f64,
    },

    #[error("no gesture is in progress")]
    NoActiveGesture,

    #[error("operation not available in mode {0}")]
    WrongMode(&'static str),

    #[error("the last layer cannot be removed")]
    LastLayer,

    #[error("nothing is selected")]
    EmptySelection,
}

/// Errors raised by the element catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown catalog element: {0}")]
    UnknownElement(String),

    #[error("catalog element {name} builds a {found}, not a {expected}")]
    WrongPrototype {
        name: String,
        expected: Prototype,
        found: Prototype,
    },

    #[error("invalid catalog definition: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors crossing the persistence boundary.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("scene json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config toml: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for results using [`PlannerError`].
pub type Result<T> = std::result::Result<T, PlannerError>;

impl TopologyError {
    /// Builds an [`TopologyError::EntityNotFound`] for any printable id.
    pub fn not_found(prototype: Prototype, id: impl std::fmt::Debug) -> Self {
        Self::EntityNotFound {
            prototype,
            id: format!("{id:?}"),
        }
    }
}
