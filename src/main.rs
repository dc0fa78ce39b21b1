mod cli;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use cli::{formatters, Cli, Commands};
use dietz::error::AnalysisError;
use dietz::importers::{self, ParsedStatement};
use dietz::reports::{align_movements, calculate_performance, find_extremes, AlignedMovement};
use dietz::statement::{date_bounds, movements_in_range, snapshots_in_range, RawMovement, ValuationSnapshot};

fn main() -> Result<()> {
    // Initialize logging; stderr so `--json` stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Analyze {
            file,
            from,
            to,
            daily,
        } => handle_analyze(&file, from.as_deref(), to.as_deref(), daily, cli.json),

        Commands::Movements { file, from, to } => {
            handle_movements(&file, from.as_deref(), to.as_deref(), cli.json)
        }

        Commands::Inspect { file } => handle_inspect(&file, cli.json),
    }
}

fn parse_cli_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD format.", text))
}

/// Resolve the analysis range: explicit flags where given, the statement's
/// own date bounds otherwise. Each run then operates on an independently
/// filtered copy of the series.
fn filter_to_range(
    parsed: &ParsedStatement,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Vec<ValuationSnapshot>, Vec<RawMovement>)> {
    let (min, max) = date_bounds(&parsed.snapshots).ok_or(AnalysisError::EmptySnapshots)?;

    let from = from.map(parse_cli_date).transpose()?.unwrap_or(min);
    let to = to.map(parse_cli_date).transpose()?.unwrap_or(max);
    if from > to {
        return Err(AnalysisError::InvalidDateRange(format!("{} > {}", from, to)).into());
    }

    Ok((
        snapshots_in_range(&parsed.snapshots, from, to),
        movements_in_range(&parsed.movements, from, to),
    ))
}

/// Parse, filter and align in one step, shared by analyze and movements
fn load_aligned(
    file: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(ParsedStatement, Vec<ValuationSnapshot>, Vec<AlignedMovement>)> {
    let parsed = importers::import_statement(file)?;
    let (snapshots, movements) = filter_to_range(&parsed, from, to)?;
    let aligned = align_movements(&snapshots, &movements);
    Ok((parsed, snapshots, aligned))
}

fn handle_analyze(
    file: &str,
    from: Option<&str>,
    to: Option<&str>,
    daily: bool,
    json_output: bool,
) -> Result<()> {
    let (parsed, snapshots, aligned) = load_aligned(file, from, to)?;
    let report = calculate_performance(&snapshots, &aligned)?;
    let extremes = find_extremes(&report.daily_gains);

    if json_output {
        println!(
            "{}",
            formatters::format_analysis_json(&report, extremes.as_ref(), &aligned, &parsed.warnings)
        );
        return Ok(());
    }

    print!(
        "{}",
        formatters::format_summary(&report, extremes.as_ref(), &parsed.warnings)
    );
    if daily {
        println!("\n{}", formatters::format_daily_table(&report.daily_gains));
    }
    Ok(())
}

fn handle_movements(file: &str, from: Option<&str>, to: Option<&str>, json_output: bool) -> Result<()> {
    let (parsed, _, aligned) = load_aligned(file, from, to)?;

    if json_output {
        println!("{}", formatters::format_movements_json(&aligned, &parsed.warnings));
        return Ok(());
    }

    if aligned.is_empty() {
        println!("No movements in range");
        return Ok(());
    }

    println!("{}", formatters::format_movements_table(&aligned));
    Ok(())
}

fn handle_inspect(file: &str, json_output: bool) -> Result<()> {
    let parsed = importers::import_statement(file)?;

    if json_output {
        println!("{}", formatters::format_inspect_json(&parsed));
    } else {
        print!("{}", formatters::format_inspect(&parsed));
    }
    Ok(())
}
