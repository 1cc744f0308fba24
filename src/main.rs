//! Dealdeck CLI entry point.
//!
//! Provides `generate`, `extract`, `classify`, `diagram`, and `validate`
//! subcommands covering the full document-to-deck pipeline and its
//! individual stages.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use dealdeck::classify::classify;
use dealdeck::config::DeckConfig;
use dealdeck::deck::validate::validate;
use dealdeck::logging;
use dealdeck::pipeline::{self, InputKind};

/// Dealdeck — sales documents in, client-ready slide decks out.
#[derive(Parser)]
#[command(name = "dealdeck", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and write deck artifacts.
    Generate {
        /// Deal-transfer document or filled proposal template.
        input: PathBuf,
        /// Output directory (default: `output` next to the input).
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Scrape a document and print facts and signals as JSON.
    Extract {
        /// Input document.
        input: PathBuf,
    },
    /// Infer the deployment topology and print the decision as JSON.
    Classify {
        /// Input document.
        input: PathBuf,
    },
    /// Render the architecture diagram and print the Mermaid source.
    Diagram {
        /// Input document.
        input: PathBuf,
    },
    /// Generate in memory and print the validation report.
    Validate {
        /// Input document.
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate { input, output_dir } => handle_generate(&input, output_dir.as_deref()),
        Command::Extract { input } => handle_extract(&input),
        Command::Classify { input } => handle_classify(&input),
        Command::Diagram { input } => handle_diagram(&input),
        Command::Validate { input } => handle_validate(&input),
    }
}

/// Run the full pipeline and write artifacts.
fn handle_generate(input: &Path, output_dir: Option<&Path>) -> anyhow::Result<ExitCode> {
    let config = DeckConfig::load()?;

    // Production logging writes next to the artifacts.
    let logs_dir = resolved_output_dir(input, output_dir, &config).join("logs");
    let _logging_guard = logging::init_production(&logs_dir)?;

    let report = pipeline::run(input, output_dir, &config)?;

    info!(
        topology = %report.decision.topology,
        slides_json = %report.artifacts.slides_json.display(),
        diagram = %report.artifacts.diagram.display(),
        "deck generated"
    );
    println!("Deployment: {}", report.decision.topology);
    println!("Slides:     {}", report.artifacts.slides_json.display());
    println!("Diagram:    {}", report.artifacts.diagram.display());
    println!("Info:       {}", report.artifacts.project_info.display());

    print_validation(&report.validation);
    Ok(exit_for_validation(&report.validation, config.validate.strict))
}

/// Print scraped facts and signals as JSON.
fn handle_extract(input: &Path) -> anyhow::Result<ExitCode> {
    logging::init_cli();
    let (content, file_name) = read_input(input)?;
    let (kind, facts, bag) = pipeline::scrape(&content, &file_name)?;

    let output = serde_json::json!({
        "kind": kind,
        "project_info": facts,
        "signals": bag,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}

/// Print the deployment decision as JSON.
fn handle_classify(input: &Path) -> anyhow::Result<ExitCode> {
    logging::init_cli();
    let (content, file_name) = read_input(input)?;
    let (_, _, bag) = pipeline::scrape(&content, &file_name)?;

    let decision = classify(&bag);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(ExitCode::SUCCESS)
}

/// Print the rendered Mermaid diagram.
fn handle_diagram(input: &Path) -> anyhow::Result<ExitCode> {
    logging::init_cli();
    let config = DeckConfig::load()?;
    let (content, file_name) = read_input(input)?;

    let generated = pipeline::generate(&content, &file_name, &config)?;
    println!("{}", generated.diagram);
    Ok(ExitCode::SUCCESS)
}

/// Generate in memory, print the validation report, and exit non-zero on
/// critical issues (or any issue in strict mode).
fn handle_validate(input: &Path) -> anyhow::Result<ExitCode> {
    logging::init_cli();
    let config = DeckConfig::load()?;
    let (content, file_name) = read_input(input)?;

    let generated = pipeline::generate(&content, &file_name, &config)?;
    let source = match generated.kind {
        InputKind::Proposal => Some(content.as_str()),
        InputKind::DealTransfer => None,
    };
    let report = validate(&generated.outline, source);

    print_validation(&report);
    Ok(exit_for_validation(&report, config.validate.strict))
}

fn read_input(input: &Path) -> anyhow::Result<(String, String)> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("deck")
        .to_owned();
    Ok((content, file_name))
}

fn print_validation(report: &dealdeck::deck::validate::ValidationReport) {
    if report.passed() && report.warnings.is_empty() {
        println!("Validation: passed");
        return;
    }
    println!(
        "Validation: {} ({} error(s), {} warning(s))",
        if report.passed() { "passed" } else { "FAILED" },
        report.errors.len(),
        report.warnings.len()
    );
    for issue in &report.errors {
        println!("  error [{}]: {}", issue.category, issue.message);
    }
    for issue in &report.warnings {
        println!("  warning [{}]: {}", issue.category, issue.message);
    }
}

fn exit_for_validation(
    report: &dealdeck::deck::validate::ValidationReport,
    strict: bool,
) -> ExitCode {
    let failed = !report.passed() || (strict && !report.warnings.is_empty());
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Mirror of the pipeline's output-directory resolution, needed up front
/// so the production log files land next to the artifacts.
fn resolved_output_dir(input: &Path, output_dir: Option<&Path>, config: &DeckConfig) -> PathBuf {
    if let Some(dir) = output_dir {
        return dir.to_path_buf();
    }
    if let Some(dir) = &config.output.dir {
        return PathBuf::from(dir);
    }
    input
        .parent()
        .map(|p| p.join("output"))
        .unwrap_or_else(|| PathBuf::from("output"))
}
