use lineage_graph::config::InputSettings;
use lineage_graph::ingest::{self, DelimitedEdgeReader, DelimitedOptions, EdgeSource};
use lineage_graph::types::InputFormat;
use lineage_graph::{LineageError, LineageGraph};
use std::collections::HashSet;
use std::io::Write;
use std::time::Instant;
use tempfile::NamedTempFile;

const JAFFLE_CSV: &str = "source,target
jaffle_shop.customers,stg_customers
jaffle_shop.orders,stg_orders
stripe.payment,stg_payments
gsheets.goals,weekly_jaffle_metrics
stg_customers,dim_customers
stg_orders,dim_customers
stg_orders,fct_orders
stg_payments,fct_orders
dim_customers,weekly_jaffle_metrics
fct_orders,weekly_jaffle_metrics
";

fn sorted(found: HashSet<String>) -> Vec<String> {
    let mut paths: Vec<String> = found.into_iter().collect();
    paths.sort();
    paths
}

fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn jaffle_graph() -> LineageGraph {
    let file = write_temp(JAFFLE_CSV, ".csv");
    let path = file.path().display().to_string();
    ingest::load_inputs(&[path], &InputSettings::default()).unwrap()
}

#[test]
fn csv_file_builds_expected_graph() {
    let graph = jaffle_graph();

    assert_eq!(graph.node_count(), 10);
    let mut upstream = graph.direct_upstream("fct_orders").unwrap();
    upstream.sort();
    assert_eq!(upstream, vec!["stg_orders", "stg_payments"]);
    assert_eq!(
        graph.direct_downstream("fct_orders").unwrap(),
        vec!["weekly_jaffle_metrics"]
    );
}

#[test]
fn duplicate_rows_do_not_change_the_graph() {
    let with_duplicate = format!("{}stg_orders,fct_orders\n", JAFFLE_CSV);
    let file = write_temp(&with_duplicate, ".csv");
    let path = file.path().display().to_string();
    let graph = ingest::load_inputs(&[path], &InputSettings::default()).unwrap();

    let reference = jaffle_graph();
    assert_eq!(graph.node_count(), reference.node_count());
    assert_eq!(graph.edge_count(), reference.edge_count());
    assert_eq!(graph.dump(), reference.dump());
}

#[test]
fn upstream_and_downstream_queries() {
    let graph = jaffle_graph();

    assert_eq!(
        sorted(graph.upstream(&["stg_orders"]).unwrap()),
        vec!["jaffle_shop.orders"]
    );

    let all_ancestors = graph.upstream(&["weekly_jaffle_metrics"]).unwrap();
    assert_eq!(all_ancestors.len(), 9);
    assert!(!all_ancestors.contains("weekly_jaffle_metrics"));

    assert!(graph
        .downstream(&["weekly_jaffle_metrics"])
        .unwrap()
        .is_empty());

    assert_eq!(
        sorted(graph.downstream(&["stg_customers", "stg_payments"]).unwrap()),
        vec!["dim_customers", "fct_orders", "weekly_jaffle_metrics"]
    );
}

#[test]
fn unknown_seed_fails_closed() {
    let graph = jaffle_graph();
    let err = graph.downstream(&["stg_customers", "raw.customers"]).unwrap_err();

    assert_eq!(
        err,
        LineageError::MissingNode {
            path: "raw.customers".to_string()
        }
    );
    assert_eq!(err.to_string(), "missing node for path raw.customers");
}

#[test]
fn tsv_input_with_glob_pattern() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("part-1.tsv"), "a\tb\nb\tc\n").unwrap();
    std::fs::write(dir.path().join("part-2.tsv"), "c\td\n").unwrap();

    let settings = InputSettings {
        format: InputFormat::Tsv,
        has_header: false,
        ..InputSettings::default()
    };
    let pattern = format!("{}/*.tsv", dir.path().display());
    let graph = ingest::load_inputs(&[pattern], &settings).unwrap();

    assert_eq!(sorted(graph.downstream(&["a"]).unwrap()), vec!["b", "c", "d"]);
}

#[test]
fn manifest_input() {
    let manifest = r#"{
        "nodes": {
            "model.shop.stg_orders": {"resource_type": "model", "depends_on": {"nodes": ["source.shop.raw.orders"]}},
            "model.shop.fct_orders": {"resource_type": "model", "depends_on": {"nodes": ["model.shop.stg_orders"]}}
        }
    }"#;
    let file = write_temp(manifest, ".json");
    let settings = InputSettings {
        format: InputFormat::Manifest,
        ..InputSettings::default()
    };

    let graph = ingest::load_inputs(&[file.path().display().to_string()], &settings).unwrap();
    assert_eq!(
        sorted(graph.downstream(&["source.shop.raw.orders"]).unwrap()),
        vec!["model.shop.fct_orders", "model.shop.stg_orders"]
    );
}

fn write_parquet(path: &std::path::Path, edges: &[(&str, &str)]) {
    use parquet::data_type::{ByteArray, ByteArrayType};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;
    use std::sync::Arc;

    let schema = Arc::new(
        parse_message_type(
            "message edges { REQUIRED BYTE_ARRAY source (UTF8); REQUIRED BYTE_ARRAY target (UTF8); }",
        )
        .unwrap(),
    );
    let file = std::fs::File::create(path).unwrap();
    let mut writer =
        SerializedFileWriter::new(file, schema, Arc::new(WriterProperties::builder().build())).unwrap();

    // one row group per edge so the reader has to cross group boundaries
    for (source, target) in edges {
        let mut row_group = writer.next_row_group().unwrap();
        for value in [source, target] {
            let mut column = row_group.next_column().unwrap().unwrap();
            column
                .typed::<ByteArrayType>()
                .write_batch(&[ByteArray::from(*value)], None, None)
                .unwrap();
            column.close().unwrap();
        }
        row_group.close().unwrap();
    }
    writer.close().unwrap();
}

#[test]
fn parquet_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lineage.parquet");
    write_parquet(
        &path,
        &[
            ("jaffle_shop.orders", "stg_orders"),
            ("stg_orders", "fct_orders"),
            ("stg_payments", "fct_orders"),
            ("stg_orders", "fct_orders"),
        ],
    );

    let settings = InputSettings {
        format: InputFormat::Parquet,
        ..InputSettings::default()
    };
    let graph = ingest::load_inputs(&[path.display().to_string()], &settings).unwrap();

    assert_eq!(graph.edge_count(), 3);
    assert_eq!(
        sorted(graph.upstream(&["fct_orders"]).unwrap()),
        vec!["jaffle_shop.orders", "stg_orders", "stg_payments"]
    );
}

#[test]
fn padded_paths_are_distinct_nodes() {
    let file = write_temp("source,target\na,b\n a ,b\n", ".csv");
    let path = file.path().display().to_string();

    let graph = ingest::load_inputs(&[path.clone()], &InputSettings::default()).unwrap();
    assert_eq!(graph.node_count(), 3);
    assert!(graph.contains(" a "));

    let trimmed = InputSettings {
        trim_fields: true,
        ..InputSettings::default()
    };
    let graph = ingest::load_inputs(&[path], &trimmed).unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn missing_input_file_is_an_error() {
    let result = ingest::load_inputs(&["/no/such/lineage.csv"], &InputSettings::default());
    assert!(result.is_err());
}

#[test]
fn reader_yields_pairs_until_end_of_input() {
    let mut reader = DelimitedEdgeReader::new(
        "source,target\na,b\n".as_bytes(),
        "inline",
        DelimitedOptions::default(),
    );

    let edge = reader.next_edge().unwrap().unwrap();
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("a", "b"));
    assert!(reader.next_edge().unwrap().is_none());
}

#[test]
fn long_chain_downstream() {
    let mut graph = LineageGraph::new();
    for i in 0..10_000 {
        graph.insert(&i.to_string(), &(i + 1).to_string());
    }

    let start = Instant::now();
    let downstream = graph.downstream(&["0"]).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(downstream.len(), 10_000);
    assert!(downstream.contains("10000"));
    assert!(!downstream.contains("0"));
    assert!(
        elapsed.as_millis() < 500,
        "downstream over 10k chain took {:?}",
        elapsed
    );
}
