pub mod cycles;
mod detect;

pub use detect::{AreaUpdate, DetectAreas};
