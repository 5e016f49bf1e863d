//! In-memory lineage graph over data-asset dependencies.
//!
//! Edges are loaded once through [`lineage::LineageGraph::insert`] (usually
//! by an [`ingest::EdgeSource`]), then upstream and downstream closures are
//! answered by breadth-first traversal.

pub mod config;
pub mod error;
pub mod ingest;
pub mod lineage;
pub mod reports;
pub mod types;

pub use error::{LineageError, LineageResult};
pub use lineage::{LineageGraph, TraversalDirection};
