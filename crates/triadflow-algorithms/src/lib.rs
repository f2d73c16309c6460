pub mod common;
pub mod topology;

pub use common::{GraphView, NodeId};
pub use topology::{count_triangles, list_triangles, par_count_triangles, TriangleTriple};
