use crate::ingest::EdgeSource;
use crate::types::EdgeRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Representation of a dbt manifest node, reduced to what lineage needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestNode {
    #[serde(default)]
    pub unique_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resource_type: String,
    pub depends_on: Option<DependsOn>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependsOn {
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub macros: Vec<String>,
}

impl ManifestNode {
    pub fn get_dependencies(&self) -> &[String] {
        self.depends_on
            .as_ref()
            .map(|d| d.nodes.as_slice())
            .unwrap_or_default()
    }
}

/// Edges from a dbt `manifest.json`.
///
/// Every id listed in a node's `depends_on.nodes` becomes the edge
/// `dependency -> node`. Nodes whose `resource_type` is excluded contribute
/// no edges.
pub struct ManifestEdgeReader {
    label: String,
    edges: std::vec::IntoIter<EdgeRecord>,
}

impl ManifestEdgeReader {
    pub fn from_path<P: AsRef<Path>>(path: P, exclude_resource_types: &[String]) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading manifest from: {:?}", path);

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest from {:?}", path))?;

        Self::parse(&content, path.display().to_string(), exclude_resource_types)
    }

    pub fn parse(
        content: &str,
        label: impl Into<String>,
        exclude_resource_types: &[String],
    ) -> Result<Self> {
        let label = label.into();
        let manifest: Value = serde_json::from_str(content)
            .with_context(|| format!("Failed to parse manifest {}", label))?;

        let nodes = manifest
            .get("nodes")
            .and_then(|n| n.as_object())
            .context("Invalid manifest structure: missing nodes")?;

        let mut edges = Vec::new();
        let mut skipped = 0;

        for (node_id, node_data) in nodes {
            let node: ManifestNode = serde_json::from_value(node_data.clone())
                .with_context(|| format!("Failed to parse manifest node {}", node_id))?;

            if exclude_resource_types.iter().any(|t| *t == node.resource_type) {
                skipped += 1;
                continue;
            }

            for dependency in node.get_dependencies() {
                if dependency.is_empty() {
                    warn!("Skipping empty dependency of {}", node_id);
                    continue;
                }
                edges.push(EdgeRecord::new(dependency.as_str(), node_id.as_str()));
            }
        }

        info!(
            "Parsed manifest {} with {} nodes ({} excluded), {} dependency edges",
            label,
            nodes.len(),
            skipped,
            edges.len()
        );

        Ok(Self {
            label,
            edges: edges.into_iter(),
        })
    }
}

impl EdgeSource for ManifestEdgeReader {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn next_edge(&mut self) -> Result<Option<EdgeRecord>> {
        Ok(self.edges.next())
    }
}
