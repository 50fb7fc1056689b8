//! sf-core: stable foundation for schemflow.
//!
//! Contains:
//! - geometry (points and placement transforms)
//! - numeric (Real + float helpers)
//! - ids (string id generation for diagram objects)
//! - error (shared error types)

pub mod error;
pub mod geometry;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use geometry::{Point, Transform, TransformPatch};
pub use ids::next_id;
pub use numeric::*;
