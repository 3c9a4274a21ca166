//! CLI entry point for the data cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use lex_cleaning::{
    CleanReport, CleaningConfig, CleaningError, CleaningSummary, Pipeline, clean_with, convert,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Clean tabular CSV/JSON datasets",
    long_about = "Runs a fixed cleaning pipeline over a CSV or JSON file: missing-value \
                  imputation, text normalization with language filtering, duplicate \
                  removal, date parsing and IQR outlier removal.\n\n\
                  EXAMPLES:\n  \
                  # Clean a CSV and save it as JSON\n  \
                  lex-cleaning clean -i reviews.csv -o reviews_clean.json -f json\n\n  \
                  # Convert without cleaning\n  \
                  lex-cleaning convert -i data.json -f csv -o data.csv -d out/\n\n  \
                  # Answer prompts on stdin\n  \
                  lex-cleaning interactive"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a CSV or JSON file and save the result
    Clean(CleanArgs),

    /// Convert a CSV or JSON file to another format without cleaning
    Convert {
        /// Path to the CSV or JSON file to convert
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (csv or json)
        #[arg(short, long)]
        format: String,

        /// Output file name
        #[arg(short, long)]
        output: String,

        /// Directory the output file is written to
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,
    },

    /// Prompt for the input file, output format, file name and directory
    Interactive,
}

#[derive(clap::Args, Debug)]
struct CleanArgs {
    /// Path to the CSV or JSON file to clean
    #[arg(short, long)]
    input: PathBuf,

    /// Output file name
    #[arg(short, long)]
    output: String,

    /// Output format (csv or json); anything else falls back to csv
    #[arg(short, long, default_value = "csv")]
    format: String,

    /// Directory the output file is written to
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Number of neighbors for KNN imputation
    #[arg(long, default_value_t = lex_cleaning::config::DEFAULT_KNN_NEIGHBORS)]
    knn_neighbors: usize,

    /// Fill value for missing non-numeric cells
    #[arg(long, default_value = lex_cleaning::config::DEFAULT_MISSING_PLACEHOLDER)]
    placeholder: String,

    /// IQR multiplier for the outlier fences
    #[arg(long, default_value_t = lex_cleaning::config::DEFAULT_IQR_MULTIPLIER)]
    iqr_multiplier: f64,

    /// Keep rows regardless of the detected language of their text
    #[arg(long)]
    no_language_filter: bool,

    /// Print the run summary as JSON instead of a human-readable summary
    ///
    /// Disables all progress logs so stdout only contains JSON.
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
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_output = matches!(&cli.command, Command::Clean(args) if args.json);
    init_logging(&cli.log_level, cli.quiet, json_output);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Clean(args) => run_clean(&args, cli.quiet),
        Command::Convert {
            input,
            format,
            output,
            directory,
        } => {
            let path = convert(&input, &format, &output, &directory).map_err(explain)?;
            println!("File converted and saved to {}", path.display());
            Ok(())
        }
        Command::Interactive => run_interactive(cli.quiet),
    }
}

fn run_clean(args: &CleanArgs, quiet: bool) -> Result<()> {
    let config = CleaningConfig::builder()
        .knn_neighbors(args.knn_neighbors)
        .missing_placeholder(&args.placeholder)
        .iqr_multiplier(args.iqr_multiplier)
        .language_filter(!args.no_language_filter)
        .build()?;

    let pipeline = build_pipeline(config, quiet || args.json)?;
    let report = clean_with(
        &pipeline,
        &args.input,
        &args.output,
        &args.format,
        &args.directory,
    )
    .map_err(explain)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
        return Ok(());
    }

    println!("Cleaned data saved to {}", report.output_path.display());
    if !quiet {
        print_human_readable_summary(&report);
    }
    Ok(())
}

/// Prompt for input path, output format, file name and directory, then clean.
fn run_interactive(quiet: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut ask = |prompt: &str| -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let line = lines
            .next()
            .ok_or_else(|| anyhow!("No input provided"))??;
        Ok(line.trim().to_string())
    };

    let input = ask("Enter the path of the file to be cleaned (CSV or JSON): ")?;
    let format = ask("Enter the desired output format (csv or json): ")?.to_lowercase();
    let output = ask(&format!(
        "Enter the name of the output file (with .{} extension): ",
        format
    ))?;
    let directory = ask("Enter the directory where you want to save the cleaned file: ")?;
    let directory = if directory.is_empty() { "." } else { directory.as_str() };

    let pipeline = build_pipeline(CleaningConfig::default(), quiet)?;
    let report = clean_with(
        &pipeline,
        Path::new(&input),
        &output,
        &format,
        Path::new(directory),
    )
    .map_err(explain)?;

    println!("Cleaned data saved to {}", report.output_path.display());
    if !quiet {
        print_human_readable_summary(&report);
    }
    Ok(())
}

fn build_pipeline(config: CleaningConfig, quiet: bool) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !quiet {
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

/// Turn a library error into the message shown to the user.
fn explain(e: CleaningError) -> anyhow::Error {
    match e {
        CleaningError::UnsupportedInputFormat(_) => {
            anyhow!("Unsupported file format. Please provide a CSV or JSON file.")
        }
        other => anyhow!(other),
    }
}

/// Print a human-readable summary of the cleaning run.
fn print_human_readable_summary(report: &CleanReport) {
    let summary: &CleaningSummary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Output: {} ({}, {} rows x {} columns)",
        report.output_path.display(),
        report.format,
        summary.rows_after,
        summary.columns
    );
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed, {:.1}%)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed(),
        summary.rows_removed_percentage()
    );
    println!();

    println!("Stages:");
    for stage in &summary.stages {
        println!(
            "  {:<22} {:>8} -> {:<8}",
            stage.stage.display_name(),
            stage.rows_before,
            stage.rows_after
        );
        for action in stage.actions.iter().take(5) {
            println!("      - {}", action);
        }
        if stage.actions.len() > 5 {
            println!("      ... and {} more actions", stage.actions.len() - 5);
        }
    }
    println!();

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
