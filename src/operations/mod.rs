//! Edit operations on a [`Scene`](crate::scene::Scene).
//!
//! Every operation is a small struct built with `new` and run with
//! `execute`, mutating the scene (or one of its layers) in place. Callers
//! that need atomicity run operations on a clone and keep it on success.

pub mod areas;
pub mod editing;
pub mod group;
pub mod intersect;
pub mod query;
