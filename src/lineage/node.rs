use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single data asset in the lineage graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageNode {
    pub path: String,
}

/// Arena of lineage nodes indexed by asset path.
///
/// Nodes live in the petgraph arena and are addressed by `NodeIndex`; the
/// path map is the only way callers reach them by name. Neighbor lists are
/// the arena's adjacency, so nodes never own one another.
#[derive(Debug, Default)]
pub struct NodeStore {
    graph: DiGraph<LineageNode, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Pre-allocate for a known graph size
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(node_count, edge_count),
            node_map: HashMap::with_capacity(node_count),
        }
    }

    /// Return the node registered under `path`, creating it if needed
    pub fn get_or_create(&mut self, path: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(path) {
            return index;
        }

        let index = self.graph.add_node(LineageNode {
            path: path.to_string(),
        });
        self.node_map.insert(path.to_string(), index);
        index
    }

    pub fn get(&self, path: &str) -> Option<NodeIndex> {
        self.node_map.get(path).copied()
    }

    /// Path of a node handed out by this store
    pub fn path(&self, index: NodeIndex) -> &str {
        &self.graph[index].path
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeIndex)> {
        self.node_map.iter().map(|(path, &index)| (path.as_str(), index))
    }

    pub(crate) fn graph(&self) -> &DiGraph<LineageNode, ()> {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut DiGraph<LineageNode, ()> {
        &mut self.graph
    }
}
