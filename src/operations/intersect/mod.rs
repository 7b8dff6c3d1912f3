mod relocate;
mod resolve;

pub use relocate::RelocateVertices;
pub use resolve::{CarriedHole, CreateLineAvoidingIntersections};
