pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod math;
pub mod operations;
pub mod properties;
pub mod scene;
pub mod snap;
pub mod topology;

pub use editor::Editor;
pub use error::{PlannerError, Result};
