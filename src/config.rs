//! Configuration management for the lineage graph CLI
use crate::ingest::DelimitedOptions;
use crate::types::{InputFormat, OutputFormat};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Commented configuration written by `lineage init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Lineage graph configuration

# Edge input settings
input:
  # csv, tsv, manifest (dbt manifest.json) or parquet
  format: csv
  # first record of a delimited file is a header row
  has_header: true
  # strip whitespace around delimited fields; paths are kept verbatim otherwise
  trim_fields: false
  # uncomment to override the format's separator
  # delimiter: ";"
  # manifest resource types that contribute no edges
  exclude_resource_types: []

# Query output
query:
  # json, markdown or text
  output_format: text
  sort_results: true

logging:
  level: info
"#;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSettings {
    pub format: InputFormat,
    /// Single-byte field separator; defaults to `,` (or tab for tsv)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    pub has_header: bool,
    /// Strip surrounding whitespace from delimited fields
    #[serde(default)]
    pub trim_fields: bool,
    /// Manifest resource types that contribute no edges
    #[serde(default)]
    pub exclude_resource_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySettings {
    pub output_format: OutputFormat,
    pub sort_results: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            format: InputFormat::Csv,
            delimiter: None,
            has_header: true,
            trim_fields: false,
            exclude_resource_types: Vec::new(),
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Text,
            sort_results: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl InputSettings {
    /// Reader options for csv and tsv inputs
    pub fn delimited_options(&self) -> Result<DelimitedOptions> {
        Ok(DelimitedOptions {
            delimiter: self.delimiter_byte()?,
            has_header: self.has_header,
            trim: self.trim_fields,
        })
    }

    /// Field separator as the byte the csv reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_deref() {
            Some(delimiter) => match delimiter.as_bytes() {
                [byte] => Ok(*byte),
                _ => Err(anyhow::anyhow!(
                    "Delimiter must be a single ASCII character, got {:?}",
                    delimiter
                )),
            },
            None => Ok(match self.format {
                InputFormat::Tsv => b'\t',
                _ => b',',
            }),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Overlay `LINEAGE_*` environment variables on this configuration.
    ///
    /// Every variable that is set wins over the current value, including
    /// one that restores a built-in default.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(format) = lookup("LINEAGE_INPUT_FORMAT") {
            self.input.format = serde_yaml::from_str(&format)
                .map_err(|_| anyhow::anyhow!("Unknown input format: {}", format))?;
        }

        if let Some(delimiter) = lookup("LINEAGE_DELIMITER") {
            self.input.delimiter = Some(delimiter);
        }

        if let Some(has_header) = lookup("LINEAGE_HAS_HEADER") {
            self.input.has_header = has_header.parse()?;
        }

        if let Some(trim) = lookup("LINEAGE_TRIM_FIELDS") {
            self.input.trim_fields = trim.parse()?;
        }

        if let Some(format) = lookup("LINEAGE_OUTPUT_FORMAT") {
            self.query.output_format = serde_yaml::from_str(&format)
                .map_err(|_| anyhow::anyhow!("Unknown output format: {}", format))?;
        }

        if let Some(level) = lookup("LINEAGE_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.input.delimiter_byte()?;

        if matches!(self.input.format, InputFormat::Manifest | InputFormat::Parquet)
            && self.input.delimiter.is_some()
        {
            return Err(anyhow::anyhow!(
                "Delimiter has no meaning for {} input",
                self.input.format
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(anyhow::anyhow!("Log level must not be empty"));
        }

        Ok(())
    }
}
