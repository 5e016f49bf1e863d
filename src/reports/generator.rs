use crate::lineage::GraphStatistics;
use crate::reports::formatters::{JsonFormatter, MarkdownFormatter, ReportFormatter, TextFormatter};
use crate::types::{OutputFormat, QueryReport};
use anyhow::Result;

/// Report generator for creating various output formats
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate report in the specified format
    pub fn generate(&self, report: &QueryReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format(report)
    }

    fn formatter(&self, format: OutputFormat) -> Box<dyn ReportFormatter> {
        match format {
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Markdown => Box::new(MarkdownFormatter),
            OutputFormat::Text => Box::new(TextFormatter),
        }
    }

    /// Render graph statistics
    pub fn generate_statistics(&self, stats: &GraphStatistics, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
            OutputFormat::Markdown => Ok(format!(
                r#"# Lineage Graph Statistics

- **Nodes**: {}
- **Edges**: {}
- **Root Nodes**: {}
- **Leaf Nodes**: {}
- **Average Degree**: {:.2}"#,
                stats.total_nodes,
                stats.total_edges,
                stats.root_nodes,
                stats.leaf_nodes,
                stats.average_degree
            )),
            OutputFormat::Text => Ok(format!(
                r#"Nodes: {}
Edges: {}
Root Nodes: {}
Leaf Nodes: {}
Average Degree: {:.2}"#,
                stats.total_nodes,
                stats.total_edges,
                stats.root_nodes,
                stats.leaf_nodes,
                stats.average_degree
            )),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
