//! CLI entry point for the listings cleaning pipeline.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use immo_processing::{
    CleaningConfig, CleaningConfigBuilder, CleaningReport, Pipeline, PipelineResult,
    PostcodePolicy, ProjectListingPolicy,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// CLI-compatible postal code policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPostcodePolicy {
    /// Drop rows whose postal code has no leading digits
    Drop,
    /// Keep them with -1 as postal code
    Sentinel,
}

impl From<CliPostcodePolicy> for PostcodePolicy {
    fn from(cli: CliPostcodePolicy) -> Self {
        match cli {
            CliPostcodePolicy::Drop => PostcodePolicy::Drop,
            CliPostcodePolicy::Sentinel => PostcodePolicy::Sentinel,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Property listings cleaning pipeline",
    long_about = "Deduplicates, corrects and normalizes a raw scrape of property listings.\n\n\
                  EXAMPLES:\n  \
                  # Defaults: data/properties.csv -> data/cleaned_properties.csv\n  \
                  immo-processing\n\n  \
                  # Explicit paths, keep unparseable postal codes as -1\n  \
                  immo-processing -i raw.xlsx -o out/clean.csv --postcode-policy sentinel\n\n  \
                  # Settings from a file, with a JSON report next to the CSV\n  \
                  immo-processing --config cleaning.json --emit-report"
)]
struct Args {
    /// Raw listings file (csv, tsv, json, parquet, xls/xlsx/ods, xml)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Destination CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file; flags given on the command line win
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep only HOUSE and APARTMENT listings
    #[arg(long)]
    drop_projects: bool,

    /// What to do with postal codes that have no leading digits
    #[arg(long, value_enum)]
    postcode_policy: Option<CliPostcodePolicy>,

    /// Leave missing bedroom and bathroom counts as -1
    #[arg(long)]
    no_room_inference: bool,

    /// Add a region column derived from the postal code
    #[arg(long)]
    with_region: bool,

    /// Write nulls instead of -1 placeholders
    #[arg(long)]
    restore_missing: bool,

    /// Write a JSON report as <output>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings, errors and the final result
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `--log-level`. With `--json` nothing is
/// logged so stdout only carries the summary.
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

/// Merge the configuration file (or defaults) with command line overrides.
fn build_config(args: &Args) -> Result<CleaningConfig> {
    let base = match &args.config {
        Some(path) => CleaningConfig::from_json_file(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?,
        None => CleaningConfig::default(),
    };

    let mut builder = CleaningConfigBuilder::from_config(base);

    if let Some(input) = &args.input {
        builder = builder.input_path(input);
    }
    if let Some(output) = &args.output {
        builder = builder.output_path(output);
    }
    if args.drop_projects {
        builder = builder.project_listings(ProjectListingPolicy::Drop);
    }
    if let Some(policy) = args.postcode_policy {
        builder = builder.postcode_policy(policy.into());
    }
    if args.no_room_inference {
        builder = builder.infer_room_counts(false);
    }
    if args.with_region {
        builder = builder.add_region(true);
    }
    if args.restore_missing {
        builder = builder.restore_missing(true);
    }

    let mut config = builder.build()?;
    if args.emit_report && config.report_path.is_none() {
        config.report_path = Some(CleaningReport::default_path(&config.output_path));
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    info!(
        "Cleaning {} -> {}",
        config.input_path.display(),
        config.output_path.display()
    );

    let pipeline = Pipeline::builder()
        .config(config.clone())
        .on_progress(|update| {
            tracing::debug!("[{:.0}%] {}", update.progress * 100.0, update.message);
        })
        .build()?;

    let result = pipeline.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.summary)?);
    } else {
        print_human_readable_summary(&result, &config);
    }

    if !result.has_data() {
        warn!("Run finished without data");
    }

    Ok(())
}

/// Print a human-readable summary of the run.
fn print_human_readable_summary(result: &PipelineResult, config: &CleaningConfig) {
    let summary = &result.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        config.input_path.display(),
        summary.rows_loaded,
        summary.columns_before
    );
    match &result.export {
        Some(export) => println!(
            "Output: {} ({} rows x {} columns)",
            export.path.display(),
            export.rows,
            export.columns
        ),
        None => println!("Output: nothing written"),
    }
    if let Some(report) = &config.report_path
        && result.export.is_some()
    {
        println!("Report: {}", report.display());
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} loaded -> {} after dedup -> {} after correction -> {} final",
        summary.rows_loaded,
        summary.rows_after_dedup,
        summary.rows_after_correction,
        summary.rows_after
    );
    println!(
        "  Merged: {} duplicates, removed: {} rows ({:.1}% retained)",
        summary.duplicates_merged,
        summary.rows_removed,
        summary.retention_percentage()
    );
    println!(
        "  Columns: {} -> {} ({} code columns added)",
        summary.columns_before, summary.columns_after, summary.code_columns_added
    );
    println!();

    if !result.processing_steps.is_empty() {
        println!("Actions Taken:");
        for step in result.processing_steps.iter().take(10) {
            println!("  - {}", step);
        }
        if result.processing_steps.len() > 10 {
            println!(
                "  ... and {} more actions",
                result.processing_steps.len() - 10
            );
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save detailed JSON report");
    println!("{}", "=".repeat(80));
}
