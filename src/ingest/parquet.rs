use crate::ingest::EdgeSource;
use crate::types::EdgeRecord;
use anyhow::{bail, Context, Result};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::reader::RowIter;
use parquet::record::Field;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

pub const SOURCE_COLUMN: &str = "source";
pub const TARGET_COLUMN: &str = "target";

/// Streams edges from a parquet file with UTF-8 `source` and `target`
/// columns, one row at a time.
pub struct ParquetEdgeReader {
    label: String,
    rows: RowIter<'static>,
    row: usize,
}

impl ParquetEdgeReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        debug!("Opening parquet edge file: {:?}", path);

        let file = File::open(path)
            .with_context(|| format!("Failed to open edge file {:?}", path))?;
        let reader = SerializedFileReader::new(file)
            .with_context(|| format!("Invalid parquet file {}", label))?;

        let metadata = reader.metadata();
        let columns: Vec<&str> = metadata
            .file_metadata()
            .schema()
            .get_fields()
            .iter()
            .map(|field| field.name())
            .collect();
        for required in [SOURCE_COLUMN, TARGET_COLUMN] {
            if !columns.contains(&required) {
                bail!(
                    "Parquet file {} has no {:?} column (found {:?})",
                    label,
                    required,
                    columns
                );
            }
        }
        debug!(
            "Parquet file {} holds {} rows in {} row groups",
            label,
            metadata.file_metadata().num_rows(),
            metadata.num_row_groups()
        );

        Ok(Self {
            label,
            rows: RowIter::from_file_into(Box::new(reader)),
            row: 0,
        })
    }
}

fn string_field(field: &Field, column: &str, row: usize, label: &str) -> Result<Option<String>> {
    match field {
        Field::Str(value) => Ok(Some(value.clone())),
        Field::Null => Ok(None),
        other => bail!(
            "Column {:?} on row {} of {} is not a UTF-8 string: {}",
            column,
            row,
            label,
            other
        ),
    }
}

impl EdgeSource for ParquetEdgeReader {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn next_edge(&mut self) -> Result<Option<EdgeRecord>> {
        for row in self.rows.by_ref() {
            self.row += 1;
            let row = row.with_context(|| format!("Failed to read row {} of {}", self.row, self.label))?;

            let mut source = None;
            let mut target = None;
            for (name, field) in row.get_column_iter() {
                match name.as_str() {
                    SOURCE_COLUMN => source = string_field(field, name, self.row, &self.label)?,
                    TARGET_COLUMN => target = string_field(field, name, self.row, &self.label)?,
                    _ => {}
                }
            }

            match (source, target) {
                (Some(source), Some(target)) if !source.is_empty() && !target.is_empty() => {
                    return Ok(Some(EdgeRecord::new(source, target)));
                }
                _ => warn!("Skipping row {} of {} with empty path", self.row, self.label),
            }
        }

        Ok(None)
    }
}

/// Write `edges` as a single row group, the layout [`ParquetEdgeReader`] reads
#[cfg(test)]
pub(crate) fn write_edges(path: &Path, edges: &[(Option<&str>, Option<&str>)]) -> Result<()> {
    use parquet::data_type::{ByteArray, ByteArrayType};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;
    use std::sync::Arc;

    let schema = Arc::new(parse_message_type(
        "message edges {
            OPTIONAL BYTE_ARRAY source (UTF8);
            OPTIONAL BYTE_ARRAY target (UTF8);
        }",
    )?);
    let file = File::create(path)?;
    let mut writer = SerializedFileWriter::new(file, schema, Arc::new(WriterProperties::builder().build()))?;
    let mut row_group = writer.next_row_group()?;

    let mut column_index = 0;
    while let Some(mut column) = row_group.next_column()? {
        let cells: Vec<Option<&str>> = edges
            .iter()
            .map(|(source, target)| if column_index == 0 { *source } else { *target })
            .collect();
        let values: Vec<ByteArray> = cells.iter().flatten().map(|v| ByteArray::from(*v)).collect();
        let levels: Vec<i16> = cells.iter().map(|v| i16::from(v.is_some())).collect();

        column
            .typed::<ByteArrayType>()
            .write_batch(&values, Some(&levels), None)?;
        column.close()?;
        column_index += 1;
    }

    row_group.close()?;
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(mut reader: ParquetEdgeReader) -> Result<Vec<(String, String)>> {
        let mut edges = Vec::new();
        while let Some(edge) = reader.next_edge()? {
            edges.push((edge.source, edge.target));
        }
        Ok(edges)
    }

    #[test]
    fn test_reads_source_and_target_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.parquet");
        write_edges(
            &path,
            &[
                (Some("stg_orders"), Some("fct_orders")),
                (Some("stg_payments"), Some("fct_orders")),
            ],
        )
        .unwrap();

        let reader = ParquetEdgeReader::from_path(&path).unwrap();
        assert_eq!(
            read_all(reader).unwrap(),
            vec![
                ("stg_orders".to_string(), "fct_orders".to_string()),
                ("stg_payments".to_string(), "fct_orders".to_string()),
            ]
        );
    }

    #[test]
    fn test_null_endpoint_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.parquet");
        write_edges(&path, &[(Some("a"), None), (Some("c"), Some("d"))]).unwrap();

        let reader = ParquetEdgeReader::from_path(&path).unwrap();
        assert_eq!(
            read_all(reader).unwrap(),
            vec![("c".to_string(), "d".to_string())]
        );
    }

    #[test]
    fn test_missing_column_is_an_error() {
        use parquet::file::properties::WriterProperties;
        use parquet::file::writer::SerializedFileWriter;
        use parquet::schema::parser::parse_message_type;
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.parquet");
        let schema = Arc::new(parse_message_type("message edges { OPTIONAL BYTE_ARRAY source (UTF8); }").unwrap());
        let writer = SerializedFileWriter::new(
            File::create(&path).unwrap(),
            schema,
            Arc::new(WriterProperties::builder().build()),
        )
        .unwrap();
        writer.close().unwrap();

        let err = ParquetEdgeReader::from_path(&path).err().unwrap();
        assert!(err.to_string().contains("\"target\""), "{}", err);
    }

    #[test]
    fn test_not_a_parquet_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.parquet");
        std::fs::write(&path, "source,target\na,b\n").unwrap();

        assert!(ParquetEdgeReader::from_path(&path).is_err());
    }
}
