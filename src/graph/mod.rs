//! Graph data model
//!
//! Vertices, canonical pair keys, the tagged intermediate payload and
//! detected triangles.

pub mod triangle;
pub mod types;

pub use triangle::Triangle;
pub use types::{PairKey, Payload, VertexId};
