use crate::error::{LineageError, LineageResult};
use crate::lineage::node::NodeStore;
use crate::lineage::traversal::{GraphTraversal, TraversalDirection};
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use tracing::debug;

/// Lineage graph built from (source, target) edges.
///
/// Build once with [`LineageGraph::insert`], then query read-only. There is
/// no internal locking; callers sharing a graph across threads while still
/// inserting must synchronise around the whole graph.
#[derive(Debug, Default)]
pub struct LineageGraph {
    store: NodeStore,
    edges: HashSet<(NodeIndex, NodeIndex)>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self {
            store: NodeStore::new(),
            edges: HashSet::new(),
        }
    }

    /// Pre-allocate for a known graph size
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            store: NodeStore::with_capacity(node_count, edge_count),
            edges: HashSet::with_capacity(edge_count),
        }
    }

    /// Build a graph from an iterator of (from, to) pairs
    pub fn from_edges<I, A, B>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.insert(from.as_ref(), to.as_ref());
        }
        graph
    }

    /// Record the relation `from -> to`.
    ///
    /// Both endpoints are created on first reference. Inserting the same
    /// edge again leaves the graph unchanged. Self-edges are kept as-is.
    pub fn insert(&mut self, from: &str, to: &str) {
        let from_index = self.store.get_or_create(from);
        let to_index = self.store.get_or_create(to);

        if self.edges.insert((from_index, to_index)) {
            self.store.graph_mut().add_edge(from_index, to_index, ());
        }
    }

    /// All transitive ancestors of the given seeds
    pub fn upstream<S: AsRef<str>>(&self, seeds: &[S]) -> LineageResult<HashSet<String>> {
        let found = GraphTraversal::closure(self, seeds, TraversalDirection::Upstream)?;
        debug!("Found {} upstream nodes for {} seeds", found.len(), seeds.len());
        Ok(found)
    }

    /// All transitive descendants of the given seeds
    pub fn downstream<S: AsRef<str>>(&self, seeds: &[S]) -> LineageResult<HashSet<String>> {
        let found = GraphTraversal::closure(self, seeds, TraversalDirection::Downstream)?;
        debug!("Found {} downstream nodes for {} seeds", found.len(), seeds.len());
        Ok(found)
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.store.len()
    }

    /// Get the number of distinct edges in the graph
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.store.get(path).is_some()
    }

    /// Immediate upstream neighbors of a node
    pub fn direct_upstream(&self, path: &str) -> LineageResult<Vec<String>> {
        self.direct_neighbors(path, Direction::Incoming)
    }

    /// Immediate downstream neighbors of a node
    pub fn direct_downstream(&self, path: &str) -> LineageResult<Vec<String>> {
        self.direct_neighbors(path, Direction::Outgoing)
    }

    fn direct_neighbors(&self, path: &str, direction: Direction) -> LineageResult<Vec<String>> {
        let index = self
            .store
            .get(path)
            .ok_or_else(|| LineageError::missing_node(path))?;

        Ok(self
            .neighbors(index, direction)
            .map(|neighbor| self.store.path(neighbor).to_string())
            .collect())
    }

    pub(crate) fn resolve(&self, path: &str) -> Option<NodeIndex> {
        self.store.get(path)
    }

    pub(crate) fn path_of(&self, index: NodeIndex) -> &str {
        self.store.path(index)
    }

    pub(crate) fn neighbors(
        &self,
        index: NodeIndex,
        direction: Direction,
    ) -> impl Iterator<Item = NodeIndex> + '_ {
        self.store.graph().neighbors_directed(index, direction)
    }

    /// Nodes with no incoming edges
    pub fn root_nodes(&self) -> Vec<String> {
        self.nodes_without(Direction::Incoming)
    }

    /// Nodes with no outgoing edges
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.nodes_without(Direction::Outgoing)
    }

    fn nodes_without(&self, direction: Direction) -> Vec<String> {
        self.store
            .iter()
            .filter(|&(_, index)| self.neighbors(index, direction).next().is_none())
            .map(|(path, _)| path.to_string())
            .collect()
    }

    /// Get graph statistics
    pub fn statistics(&self) -> GraphStatistics {
        let total_nodes = self.node_count();
        let total_edges = self.edge_count();

        // every edge adds one to an in-degree and one to an out-degree
        let average_degree = if total_nodes > 0 {
            (2 * total_edges) as f64 / total_nodes as f64
        } else {
            0.0
        };

        GraphStatistics {
            total_nodes,
            total_edges,
            root_nodes: self.root_nodes().len(),
            leaf_nodes: self.leaf_nodes().len(),
            average_degree,
        }
    }

    /// Human-readable listing of every node and its neighbors, sorted by path
    pub fn dump(&self) -> String {
        let mut paths: Vec<(&str, NodeIndex)> = self.store.iter().collect();
        paths.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut out = String::new();
        for (path, index) in paths {
            let mut upstream: Vec<&str> = self
                .neighbors(index, Direction::Incoming)
                .map(|n| self.store.path(n))
                .collect();
            let mut downstream: Vec<&str> = self
                .neighbors(index, Direction::Outgoing)
                .map(|n| self.store.path(n))
                .collect();
            upstream.sort_unstable();
            downstream.sort_unstable();

            let _ = writeln!(
                out,
                "{} -> upstream: [{}] downstream: [{}]",
                path,
                upstream.join(" "),
                downstream.join(" ")
            );
        }
        out
    }

    /// Print the graph nodes. Used for debugging.
    pub fn print(&self) {
        print!("{}", self.dump());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub root_nodes: usize,
    pub leaf_nodes: usize,
    pub average_degree: f64,
}
