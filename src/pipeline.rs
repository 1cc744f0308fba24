//! End-to-end orchestration: read → scrape → classify → render → map →
//! assemble → validate.
//!
//! Generation is deterministic, so the pipeline runs a single generate
//! pass followed by a single validation pass; there is no retry loop to
//! converge.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::classify::{classify, DeploymentDecision};
use crate::config::DeckConfig;
use crate::deck::validate::{validate, ValidationReport};
use crate::deck::{write_artifacts, ArtifactPaths, DeckArtifact};
use crate::diagram::{render, RenderParams};
use crate::signals::deal_transfer::DealTransferScraper;
use crate::signals::proposal::ProposalScraper;
use crate::signals::{ExtractError, ProjectFacts, SignalBag};
use crate::slides::mapper::SlideMapper;
use crate::slides::SlideOutline;

/// Questionnaire phrases that identify a deal-transfer document.
const DEAL_TRANSFER_MARKERS: &[&str] = &[
    "Does client have stable internet connection",
    "Any GDPR or data privacy requirements",
    "Any specific HW/SW requirements such as deployment method",
    "List of VA use cases",
];

/// The two supported input document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Loosely structured sales questionnaire.
    DealTransfer,
    /// Filled markdown proposal template.
    Proposal,
}

/// Detect the input kind from the file name and a content scan.
///
/// Deal transfers are named like one ("Deal_Transfer_Shell.txt") or carry
/// the questionnaire phrasing; everything else is treated as a proposal
/// template.
pub fn detect_kind(file_name: &str, content: &str) -> InputKind {
    let name_lower = file_name.to_lowercase();
    if name_lower.contains("deal") || name_lower.contains("transfer") {
        return InputKind::DealTransfer;
    }
    if DEAL_TRANSFER_MARKERS.iter().any(|m| content.contains(m)) {
        return InputKind::DealTransfer;
    }
    InputKind::Proposal
}

/// Scrape a document into facts and signals, detecting its kind.
///
/// # Errors
///
/// Returns scraping errors from the strict proposal path, and a
/// missing-fields error when a deal transfer lacks the facts a deck
/// cannot be built without.
pub fn scrape(content: &str, file_name: &str) -> Result<(InputKind, ProjectFacts, SignalBag)> {
    let kind = detect_kind(file_name, content);
    let stem = file_stem(file_name);

    match kind {
        InputKind::DealTransfer => {
            let scraper = DealTransferScraper::new().context("deal-transfer patterns")?;
            let (facts, bag) = scraper.scrape(content, &stem);
            require_deal_facts(&facts)?;
            Ok((kind, facts, bag))
        }
        InputKind::Proposal => {
            let scraper = ProposalScraper::new().context("proposal patterns")?;
            let (facts, bag) = scraper
                .scrape(content, &stem)
                .context("failed to scrape proposal template")?;
            Ok((kind, facts, bag))
        }
    }
}

/// Everything one generate pass produces, before any file is written.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    /// Detected input kind.
    pub kind: InputKind,
    /// Scraped presentation facts.
    pub facts: ProjectFacts,
    /// Scraped classifier signals.
    pub bag: SignalBag,
    /// The deployment decision.
    pub decision: DeploymentDecision,
    /// Rendered Mermaid diagram.
    pub diagram: String,
    /// Mapped slide outline.
    pub outline: SlideOutline,
}

/// Run scrape → classify → render → map in memory.
///
/// # Errors
///
/// Returns scraping and mapping errors; classification and rendering are
/// infallible.
pub fn generate(content: &str, file_name: &str, config: &DeckConfig) -> Result<GeneratedDeck> {
    let (kind, facts, bag) = scrape(content, file_name)?;

    let decision = classify(&bag);
    info!(
        topology = %decision.topology,
        rationale = ?decision.rationale,
        "deployment classified"
    );

    let params = RenderParams::assemble(&facts, &decision, &config.render);
    let diagram = render(decision.topology, &params);

    let mapper = SlideMapper::new().context("slide mapping patterns")?;
    let outline: SlideOutline = match kind {
        InputKind::Proposal => mapper
            .map_proposal(content, &facts.project_name, &diagram)
            .context("failed to map proposal to slides")?,
        InputKind::DealTransfer => {
            mapper.map_deal_summary(&facts, decision.topology.tag(), &diagram)
        }
    };

    Ok(GeneratedDeck {
        kind,
        facts,
        bag,
        decision,
        diagram,
        outline,
    })
}

/// Paths and results of one full pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Detected input kind.
    pub kind: InputKind,
    /// The deployment decision.
    pub decision: DeploymentDecision,
    /// Where the artifacts were written.
    pub artifacts: ArtifactPaths,
    /// Validation result for the assembled deck.
    pub validation: ValidationReport,
}

/// Run the full pipeline against a document on disk and write artifacts.
///
/// Output directory precedence: `output_dir` argument > `[output] dir`
/// from config > an `output` directory next to the input.
///
/// # Errors
///
/// Returns an error when the input cannot be read, scraping or mapping
/// fails, or artifacts cannot be written. A failing validation is NOT an
/// error — it is reported in the returned [`PipelineReport`] so the
/// caller can decide the exit status.
pub fn run(
    input: &Path,
    output_dir: Option<&Path>,
    config: &DeckConfig,
) -> Result<PipelineReport> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("deck");

    let generated = generate(&content, file_name, config)?;

    let resolved_output = resolve_output_dir(input, output_dir, config);
    let stem = file_stem(file_name);

    let artifact = DeckArtifact::assemble(generated.outline.clone(), generated.decision.clone());
    let artifacts = write_artifacts(
        &artifact,
        &generated.diagram,
        &generated.facts,
        &resolved_output,
        &stem,
    )?;

    let source = match generated.kind {
        InputKind::Proposal => Some(content.as_str()),
        InputKind::DealTransfer => None,
    };
    let validation = validate(&generated.outline, source);
    if !validation.passed() {
        warn!(
            errors = validation.errors.len(),
            warnings = validation.warnings.len(),
            "deck failed validation"
        );
    }

    Ok(PipelineReport {
        kind: generated.kind,
        decision: generated.decision,
        artifacts,
        validation,
    })
}

fn resolve_output_dir(input: &Path, output_dir: Option<&Path>, config: &DeckConfig) -> PathBuf {
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

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("deck")
        .to_owned()
}

/// A deck cannot be built without cameras and modules; the deal-transfer
/// scraper is lenient, so the gate sits here.
fn require_deal_facts(facts: &ProjectFacts) -> Result<()> {
    let mut missing: Vec<&'static str> = Vec::new();
    if facts.camera_count.is_none() {
        missing.push("camera number");
    }
    if facts.modules.is_empty() {
        missing.push("AI modules");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ExtractError::MissingFields { fields: missing })
            .context("deal transfer is missing required facts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEAL: &str = "\
Project: Port Terminal Safety
Client Name: Acme Terminals
Camera: total 12 cameras

List of VA use cases:
1. Safety Helmet Detection
2. Smoking Detection

Does client have stable internet connection?
Answer: Yes, fiber 24/24

Any GDPR or data privacy requirements?
Answer: No
";

    #[test]
    fn test_detect_kind_by_name() {
        assert_eq!(
            detect_kind("Deal_Transfer_Shell.txt", "anything"),
            InputKind::DealTransfer
        );
        assert_eq!(detect_kind("proposal.md", "# Proposal"), InputKind::Proposal);
    }

    #[test]
    fn test_detect_kind_by_content() {
        assert_eq!(
            detect_kind("notes.txt", DEAL),
            InputKind::DealTransfer,
            "questionnaire phrasing marks a deal transfer"
        );
    }

    #[test]
    fn test_generate_deal_transfer() {
        let config = DeckConfig::default();
        let generated = generate(DEAL, "notes.txt", &config).expect("generate");
        assert_eq!(generated.kind, InputKind::DealTransfer);
        assert_eq!(generated.decision.topology, crate::classify::Topology::Cloud);
        assert!(generated.diagram.starts_with("graph "));
        assert_eq!(generated.outline.total_slides, 3);
    }

    #[test]
    fn test_generate_requires_cameras() {
        let config = DeckConfig::default();
        let without_cameras = DEAL.replace("Camera: total 12 cameras\n", "");
        let err = generate(&without_cameras, "notes.txt", &config)
            .expect_err("missing cameras must fail");
        assert!(format!("{err:#}").contains("camera number"));
    }

    #[test]
    fn test_run_writes_artifacts_and_validates() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("Deal_Transfer_Acme.txt");
        std::fs::write(&input, DEAL).expect("write input");

        let config = DeckConfig::default();
        let report = run(&input, None, &config).expect("pipeline run");

        assert_eq!(report.kind, InputKind::DealTransfer);
        assert!(report.validation.passed());
        assert!(report.artifacts.slides_json.exists());
        assert!(report.artifacts.diagram.exists());
        assert!(report.artifacts.project_info.exists());
        // Default output dir sits next to the input.
        assert_eq!(
            report.artifacts.slides_json.parent(),
            Some(dir.path().join("output").as_path())
        );
    }

    #[test]
    fn test_output_dir_override_wins() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("Deal_Transfer_Acme.txt");
        std::fs::write(&input, DEAL).expect("write input");
        let override_dir = dir.path().join("elsewhere");

        let config = DeckConfig::default();
        let report =
            run(&input, Some(&override_dir), &config).expect("pipeline run");
        assert_eq!(
            report.artifacts.slides_json.parent(),
            Some(override_dir.as_path())
        );
    }
}
