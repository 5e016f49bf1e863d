use crate::error::{LineageError, LineageResult};
use crate::lineage::graph::LineageGraph;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Graph traversal utilities for lineage analysis
pub struct GraphTraversal;

impl GraphTraversal {
    /// Breadth-first closure from a set of seeds.
    ///
    /// Returns every node reachable in one or more steps from any seed.
    /// A seed is only part of the result when another seed (or itself,
    /// through a cycle) reaches it. Fails with `MissingNode` if any seed is
    /// unknown; no partial result is returned.
    pub fn closure<S: AsRef<str>>(
        graph: &LineageGraph,
        seeds: &[S],
        direction: TraversalDirection,
    ) -> LineageResult<HashSet<String>> {
        let mut queue = VecDeque::with_capacity(seeds.len());
        for seed in seeds {
            let seed = seed.as_ref();
            let index = graph
                .resolve(seed)
                .ok_or_else(|| LineageError::missing_node(seed))?;
            queue.push_back(index);
        }

        let mut processed = HashSet::new();
        let mut found = HashSet::new();

        while let Some(current) = queue.pop_front() {
            // skip nodes that were reached more than once
            if !processed.insert(current) {
                continue;
            }

            for neighbor in graph.neighbors(current, direction.into()) {
                found.insert(neighbor);
                if !processed.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(found
            .into_iter()
            .map(|index| graph.path_of(index).to_string())
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalDirection {
    Upstream,
    Downstream,
}

impl From<TraversalDirection> for Direction {
    fn from(direction: TraversalDirection) -> Self {
        match direction {
            TraversalDirection::Upstream => Direction::Incoming,
            TraversalDirection::Downstream => Direction::Outgoing,
        }
    }
}

impl fmt::Display for TraversalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalDirection::Upstream => write!(f, "upstream"),
            TraversalDirection::Downstream => write!(f, "downstream"),
        }
    }
}
