//! Edge sources that feed (source, target) pairs into a [`LineageGraph`].
//!
//! Each input format is one adapter implementing [`EdgeSource`]. The graph
//! core never sees files, only the pairs.

pub mod delimited;
pub mod manifest;
pub mod parquet;

pub use delimited::{DelimitedEdgeReader, DelimitedOptions};
pub use manifest::ManifestEdgeReader;
pub use self::parquet::ParquetEdgeReader;

use crate::config::InputSettings;
use crate::lineage::LineageGraph;
use crate::types::{EdgeRecord, InputFormat};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A finite stream of lineage edges
pub trait EdgeSource {
    /// Short label used in log lines
    fn describe(&self) -> String;

    /// Next edge, or `None` at end of input
    fn next_edge(&mut self) -> Result<Option<EdgeRecord>>;
}

/// Drain `source` into `graph`, returning the number of edges read
pub fn load_edges<S: EdgeSource + ?Sized>(graph: &mut LineageGraph, source: &mut S) -> Result<usize> {
    let label = source.describe();
    let mut count = 0;

    while let Some(edge) = source
        .next_edge()
        .with_context(|| format!("Failed to read edges from {}", label))?
    {
        graph.insert(&edge.source, &edge.target);
        count += 1;
    }

    info!("Loaded {} edges from {}", count, label);
    Ok(count)
}

/// Build one graph from every source in order
pub fn build_graph(sources: Vec<Box<dyn EdgeSource>>) -> Result<LineageGraph> {
    let mut graph = LineageGraph::new();
    let mut total = 0;

    for mut source in sources {
        total += load_edges(&mut graph, source.as_mut())?;
    }

    info!(
        "Lineage graph built with {} nodes and {} edges ({} records read)",
        graph.node_count(),
        graph.edge_count(),
        total
    );
    Ok(graph)
}

/// Expand glob patterns into input paths.
///
/// A pattern that matches nothing is kept verbatim so that opening it
/// reports the missing file.
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut matches = glob::glob(pattern)
            .with_context(|| format!("Invalid input pattern: {}", pattern))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to expand input pattern: {}", pattern))?;

        if matches.is_empty() {
            paths.push(PathBuf::from(pattern));
        } else {
            matches.sort();
            debug!("Pattern {} matched {} files", pattern, matches.len());
            paths.extend(matches);
        }
    }

    Ok(paths)
}

/// Open the adapter matching the configured input format
pub fn open_source(path: &Path, settings: &InputSettings) -> Result<Box<dyn EdgeSource>> {
    let source: Box<dyn EdgeSource> = match settings.format {
        InputFormat::Csv | InputFormat::Tsv => Box::new(DelimitedEdgeReader::from_path(
            path,
            settings.delimited_options()?,
        )?),
        InputFormat::Manifest => Box::new(ManifestEdgeReader::from_path(
            path,
            &settings.exclude_resource_types,
        )?),
        InputFormat::Parquet => Box::new(ParquetEdgeReader::from_path(path)?),
    };
    Ok(source)
}

/// Expand `patterns`, open each input and load them into one graph
pub fn load_inputs<S: AsRef<str>>(patterns: &[S], settings: &InputSettings) -> Result<LineageGraph> {
    let sources = expand_inputs(patterns)?
        .iter()
        .map(|path| open_source(path, settings))
        .collect::<Result<Vec<_>>>()?;

    build_graph(sources)
}
