use crate::lineage::TraversalDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// Core types shared by ingestion, reports and the CLI

/// One `source -> target` relation read from an input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
}

impl EdgeRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Tsv,
    Manifest,
    Parquet,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => write!(f, "csv"),
            InputFormat::Tsv => write!(f, "tsv"),
            InputFormat::Manifest => write!(f, "manifest"),
            InputFormat::Parquet => write!(f, "parquet"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Result of one closure query, ready for formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    pub direction: TraversalDirection,
    pub seeds: Vec<String>,
    pub results: Vec<String>,
    pub total: usize,
    pub elapsed_micros: u128,
    pub generated_at: DateTime<Utc>,
}

impl QueryReport {
    pub fn new(
        direction: TraversalDirection,
        seeds: Vec<String>,
        found: HashSet<String>,
        sort_results: bool,
        elapsed_micros: u128,
    ) -> Self {
        let mut results: Vec<String> = found.into_iter().collect();
        if sort_results {
            results.sort_unstable();
        }

        Self {
            direction,
            total: results.len(),
            seeds,
            results,
            elapsed_micros,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
