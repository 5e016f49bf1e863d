use crate::types::QueryReport;
use anyhow::Result;
use std::fmt::Write as _;

/// Trait for report formatters
pub trait ReportFormatter {
    fn format(&self, report: &QueryReport) -> Result<String>;
}

/// Markdown formatter
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &QueryReport) -> Result<String> {
        let mut out = String::new();

        writeln!(out, "# Lineage Report: {}", report.direction)?;
        writeln!(out)?;
        writeln!(out, "**Seeds**: {}", report.seeds.join(", "))?;
        writeln!(out, "**Total**: {}", report.total)?;
        writeln!(out, "**Query Time**: {} µs", report.elapsed_micros)?;
        writeln!(out)?;
        writeln!(out, "## Nodes")?;

        if report.is_empty() {
            writeln!(out, "None")?;
        } else {
            for path in &report.results {
                writeln!(out, "- `{}`", path)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "---")?;
        write!(
            out,
            "*Generated at: {}*",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        Ok(out)
    }
}

/// JSON formatter
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &QueryReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// Plain text formatter, one path per line
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &QueryReport) -> Result<String> {
        Ok(report.results.join("\n"))
    }
}
