use crate::ingest::EdgeSource;
use crate::types::EdgeRecord;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// csv reader settings for one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedOptions {
    pub delimiter: u8,
    pub has_header: bool,
    /// Strip whitespace around each field; off by default so paths stay
    /// byte-for-byte what the file holds
    pub trim: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            trim: false,
        }
    }
}

/// Reads `source,target` edges from delimited text.
///
/// The first two columns of each record are the edge; extra columns are
/// ignored. Records with a blank endpoint are skipped.
pub struct DelimitedEdgeReader<R: Read> {
    label: String,
    records: csv::StringRecordsIntoIter<R>,
}

impl DelimitedEdgeReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P, options: DelimitedOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening delimited edge file: {:?}", path);

        let file = File::open(path)
            .with_context(|| format!("Failed to open edge file {:?}", path))?;

        Ok(Self::new(file, path.display().to_string(), options))
    }
}

impl<R: Read> DelimitedEdgeReader<R> {
    pub fn new(reader: R, label: impl Into<String>, options: DelimitedOptions) -> Self {
        let trim = if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        };
        let records = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(options.has_header)
            .flexible(true)
            .trim(trim)
            .from_reader(reader)
            .into_records();

        Self {
            label: label.into(),
            records,
        }
    }
}

impl<R: Read> EdgeSource for DelimitedEdgeReader<R> {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn next_edge(&mut self) -> Result<Option<EdgeRecord>> {
        for record in self.records.by_ref() {
            let record = record.with_context(|| format!("Malformed record in {}", self.label))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let (source, target) = match (record.get(0), record.get(1)) {
                (Some(source), Some(target)) => (source, target),
                _ => bail!(
                    "Record on line {} of {} has {} field(s), expected source and target",
                    line,
                    self.label,
                    record.len()
                ),
            };

            if source.is_empty() || target.is_empty() {
                warn!("Skipping record with empty path on line {} of {}", line, self.label);
                continue;
            }

            return Ok(Some(EdgeRecord::new(source, target)));
        }

        Ok(None)
    }
}
