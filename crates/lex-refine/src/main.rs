//! CLI entry point for the data refining pipeline.

use anyhow::{Result, anyhow};
use clap::{ArgGroup, Parser, ValueEnum};
use dotenv::dotenv;
use lex_refine::{
    DataProcessor, DataSource, FileDataSource, PipelineConfig, PipelineResult, SourceFormat,
};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(feature = "http")]
use lex_refine::{ApiDataSource, Settings};

/// CLI-compatible source format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    /// JSON records (object of scalars, object of arrays, or array of objects)
    Json,
    /// CSV with a header row
    Csv,
}

impl From<CliFormat> for SourceFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Json => SourceFormat::Json,
            CliFormat::Csv => SourceFormat::Csv,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Fetch, clean, enrich and transform tabular data",
    long_about = "Runs a dataset through validation, normalization, missing-value repair,\n\
                  robust outlier removal, enrichment and transformation.\n\n\
                  ENVIRONMENT VARIABLES (for --resource):\n  \
                  API_ENDPOINT    Base URL of the resource API (default https://api.example.com)\n  \
                  API_USERNAME    Basic auth user (default user)\n  \
                  API_PASSWORD    Basic auth password (default pass)\n  \
                  TIMEOUT         Request timeout in seconds (default 30)\n\n\
                  EXAMPLES:\n  \
                  # Clean a CSV file and write the result\n  \
                  lex-refine -i readings.csv -o refined.csv\n\n  \
                  # Fetch a resource over HTTP and print the run report\n  \
                  lex-refine --resource 42 --json\n\n  \
                  # Stricter outlier threshold\n  \
                  lex-refine -i data.json --threshold 2.5"
)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "resource"])))]
struct Args {
    /// Path to a JSON or CSV file to process
    #[arg(short, long)]
    input: Option<String>,

    /// Resource id to fetch from the API
    #[arg(long)]
    resource: Option<String>,

    /// Format of the input file
    ///
    /// If not specified, inferred from the file extension
    #[arg(long, value_enum)]
    format: Option<CliFormat>,

    /// Write the refined table to this CSV file
    #[arg(short, long)]
    output: Option<String>,

    /// Modified z-score above which a row is dropped as an outlier
    #[arg(short, long, default_value = "3.5")]
    threshold: f64,

    /// Delta degrees of freedom for the normalizer (1 = sample, 0 = population)
    #[arg(long, default_value = "1")]
    ddof: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON run report to stdout instead of a human-readable summary
    ///
    /// Disables all logs. Errors are printed as JSON too.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let config = PipelineConfig::builder()
        .outlier_threshold(args.threshold)
        .std_ddof(args.ddof)
        .build()?;

    let source = build_source(&args)?;
    let processor = build_processor(&args, config, source)?;

    info!("{}", "=".repeat(80));
    info!("Starting data refining pipeline...");
    info!("{}", "=".repeat(80));

    match processor.run() {
        Ok(mut result) => handle_output(&mut result, &args),
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

fn build_source(args: &Args) -> Result<Arc<dyn DataSource>> {
    if let Some(ref input) = args.input {
        if !Path::new(input).exists() {
            return Err(anyhow!("Input file not found: {}", input));
        }
        let format = match args.format {
            Some(format) => format.into(),
            None => SourceFormat::from_path(Path::new(input))?,
        };
        return Ok(Arc::new(FileDataSource::new(input, format)));
    }

    if let Some(ref resource) = args.resource {
        return build_api_source(resource);
    }

    Err(anyhow!("Either --input or --resource must be given"))
}

#[cfg(feature = "http")]
fn build_api_source(resource: &str) -> Result<Arc<dyn DataSource>> {
    let settings = Settings::from_env()?;
    info!(
        "Fetching resource {} from {} (timeout {}s)",
        resource, settings.api_endpoint, settings.timeout_secs
    );
    Ok(Arc::new(ApiDataSource::from_settings(&settings, resource)?))
}

#[cfg(not(feature = "http"))]
fn build_api_source(_resource: &str) -> Result<Arc<dyn DataSource>> {
    warn!("HTTP support not compiled in.");
    Err(anyhow!(
        "--resource requires the \"http\" feature (compile with --features http)"
    ))
}

fn build_processor(
    args: &Args,
    config: PipelineConfig,
    source: Arc<dyn DataSource>,
) -> Result<DataProcessor> {
    let mut builder = DataProcessor::builder().config(config).source(source);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Handle pipeline output based on CLI flags.
///
/// - `--output`: write the refined table as CSV
/// - `--json`: print the run report as JSON to stdout only
/// - Default: print a human-readable summary to stdout
fn handle_output(result: &mut PipelineResult, args: &Args) -> Result<()> {
    if let Some(ref output) = args.output {
        write_csv(&mut result.data, output)?;
        info!("Refined dataset written to: {}", output);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
        return Ok(());
    }

    let report = &result.report;
    if report.rows_dropped_percentage() > 30.0 {
        warn!(
            "High data loss: {:.1}% of rows were dropped as outliers",
            report.rows_dropped_percentage()
        );
    }

    println!("\n{}", "=".repeat(80));
    println!("REFINING SUMMARY");
    println!("{}", "=".repeat(80));
    println!("  Source:          {}", report.source);
    println!(
        "  Shape:           {} x {} -> {} x {}",
        report.rows_fetched, report.columns_fetched, report.rows_after, report.columns_after
    );
    println!("  Values repaired: {}", report.values_repaired);
    println!(
        "  Outlier rows:    {} {:?}",
        report.rows_dropped, report.outlier_rows
    );
    println!("  Duration:        {}ms", report.duration_ms);
    println!();
    println!("STEPS");
    println!("{}", "-".repeat(40));
    for step in &report.steps {
        println!("  - {}", step);
    }

    if args.output.is_none() {
        println!();
        println!("{}", result.data);
    }

    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}
