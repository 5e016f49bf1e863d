pub mod graph;
pub mod node;
pub mod traversal;

pub use graph::{GraphStatistics, LineageGraph};
pub use node::{LineageNode, NodeStore};
pub use traversal::{GraphTraversal, TraversalDirection};
