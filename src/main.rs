use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lineage_graph::{
    config::{Config, DEFAULT_CONFIG_TEMPLATE},
    ingest,
    reports::ReportGenerator,
    types::{InputFormat, OutputFormat, QueryReport},
    LineageGraph, TraversalDirection,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lineage")]
#[command(about = "Upstream and downstream lineage queries over data-asset dependencies")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Edge input file or glob pattern (repeatable)
    #[arg(short, long, global = true)]
    input: Vec<String>,

    /// Input format (overrides configuration)
    #[arg(long, value_enum, global = true)]
    format: Option<InputFormat>,

    /// Field separator for delimited input
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// Treat the first record of delimited input as data
    #[arg(long, global = true)]
    no_header: bool,

    /// Strip whitespace around delimited fields
    #[arg(long, global = true)]
    trim_fields: bool,

    /// Log level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// All transitive ancestors of the seed paths
    Upstream {
        /// Seed paths
        #[arg(required = true)]
        seeds: Vec<String>,

        /// Output format (json, markdown, text)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Output file path (defaults to stdout)
        #[arg(short = 'f', long)]
        output_file: Option<PathBuf>,
    },

    /// All transitive descendants of the seed paths
    Downstream {
        /// Seed paths
        #[arg(required = true)]
        seeds: Vec<String>,

        /// Output format (json, markdown, text)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Output file path (defaults to stdout)
        #[arg(short = 'f', long)]
        output_file: Option<PathBuf>,
    },

    /// Node, edge, root and leaf counts
    Stats {
        /// Output format (json, markdown, text)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Print every node with its neighbors
    Dump,

    /// Initialize configuration file
    Init {
        /// Configuration file path
        #[arg(long, default_value = "lineage.yml")]
        config_file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Where the effective configuration came from
enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    Defaults,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // init writes the template and reads no configuration
    if let Commands::Init { config_file, force } = &cli.command {
        init_tracing(cli.log_level.as_deref().unwrap_or("info"))?;
        return init_config(config_file, *force).await;
    }

    let (config, source) = resolve_config(&cli).await?;

    // Initialize tracing
    init_tracing(&config.logging.level)?;

    match source {
        ConfigSource::File(path) => info!("Loaded configuration from: {:?}", path),
        ConfigSource::Missing(path) => {
            warn!("Configuration file not found: {:?}. Using defaults.", path)
        }
        ConfigSource::Defaults => {}
    }

    match cli.command {
        Commands::Upstream {
            seeds,
            output,
            output_file,
        } => {
            let graph = load_graph(&cli.input, &config)?;
            let format = output.unwrap_or(config.query.output_format);
            run_query(
                &graph,
                TraversalDirection::Upstream,
                seeds,
                format,
                output_file.as_ref(),
                &config,
            )
            .await?;
        }

        Commands::Downstream {
            seeds,
            output,
            output_file,
        } => {
            let graph = load_graph(&cli.input, &config)?;
            let format = output.unwrap_or(config.query.output_format);
            run_query(
                &graph,
                TraversalDirection::Downstream,
                seeds,
                format,
                output_file.as_ref(),
                &config,
            )
            .await?;
        }

        Commands::Stats { output } => {
            let graph = load_graph(&cli.input, &config)?;
            let format = output.unwrap_or(config.query.output_format);
            let content = ReportGenerator::new().generate_statistics(&graph.statistics(), format)?;
            println!("{}", content);
        }

        Commands::Dump => {
            let graph = load_graph(&cli.input, &config)?;
            graph.print();
        }

        // handled before configuration is loaded
        Commands::Init { .. } => {}
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(true)
                .with_level(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}

/// Layer file, environment and command line settings, then validate
async fn resolve_config(cli: &Cli) -> Result<(Config, ConfigSource)> {
    let (mut config, source) = load_config(cli.config.as_ref()).await?;
    apply_cli_overrides(&mut config, cli);
    config.validate().context("Invalid configuration")?;
    Ok((config, source))
}

/// Load configuration from file (if present), then apply environment overrides
async fn load_config(config_path: Option<&PathBuf>) -> Result<(Config, ConfigSource)> {
    let (mut config, source) = match config_path {
        Some(path) if path.exists() => {
            let config = Config::load_from_file(path)
                .await
                .with_context(|| format!("Failed to load config file: {:?}", path))?;
            (config, ConfigSource::File(path.clone()))
        }
        Some(path) => (Config::default(), ConfigSource::Missing(path.clone())),
        None => (Config::default(), ConfigSource::Defaults),
    };

    config
        .apply_env_overrides()
        .context("Invalid LINEAGE_* environment variable")?;

    Ok((config, source))
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(format) = cli.format {
        config.input.format = format;
    }
    if let Some(delimiter) = &cli.delimiter {
        config.input.delimiter = Some(delimiter.clone());
    }
    if cli.no_header {
        config.input.has_header = false;
    }
    if cli.trim_fields {
        config.input.trim_fields = true;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
}

fn load_graph(inputs: &[String], config: &Config) -> Result<LineageGraph> {
    if inputs.is_empty() {
        bail!("No input given. Pass one or more --input <PATH|GLOB>");
    }

    info!(
        "Loading {} input(s) as {}",
        inputs.len(),
        config.input.format
    );

    let start = Instant::now();
    let graph = ingest::load_inputs(inputs, &config.input)?;
    info!("Graph loaded in {:?}", start.elapsed());

    Ok(graph)
}

/// Run one closure query and write its report
async fn run_query(
    graph: &LineageGraph,
    direction: TraversalDirection,
    seeds: Vec<String>,
    format: OutputFormat,
    output_file: Option<&PathBuf>,
    config: &Config,
) -> Result<()> {
    let start = Instant::now();
    let found = match direction {
        TraversalDirection::Upstream => graph.upstream(seeds.as_slice()),
        TraversalDirection::Downstream => graph.downstream(seeds.as_slice()),
    }
    .with_context(|| format!("{} query failed", direction))?;
    let elapsed = start.elapsed();

    info!(
        "{} query for {} seed(s) returned {} nodes in {:?}",
        direction,
        seeds.len(),
        found.len(),
        elapsed
    );

    let report = QueryReport::new(
        direction,
        seeds,
        found,
        config.query.sort_results,
        elapsed.as_micros(),
    );
    let content = ReportGenerator::new().generate(&report, format)?;

    output_report(&content, output_file).await
}

async fn output_report(content: &str, output_file: Option<&PathBuf>) -> Result<()> {
    if let Some(file_path) = output_file {
        tokio::fs::write(file_path, content)
            .await
            .with_context(|| format!("Failed to write output to: {:?}", file_path))?;
        info!("Report written to: {:?}", file_path);
    } else {
        println!("{}", content);
    }

    Ok(())
}

/// Initialize configuration file
async fn init_config(config_file: &Path, force: bool) -> Result<()> {
    info!("Initializing configuration file: {:?}", config_file);

    if config_file.exists() && !force {
        bail!(
            "Configuration file already exists: {:?}. Pass --force to overwrite.",
            config_file
        );
    }

    tokio::fs::write(config_file, DEFAULT_CONFIG_TEMPLATE)
        .await
        .with_context(|| format!("Failed to write configuration file: {:?}", config_file))?;

    info!("Configuration file created successfully: {:?}", config_file);
    println!("Configuration file created: {:?}", config_file);
    println!("Edit this file to customize input and output settings.");

    Ok(())
}
