//! Deck artifact assembly and output writing.
//!
//! The deck artifact JSON is the hand-off boundary to the presentation
//! tooling: everything downstream of it is mechanical slide rendering.
//! Each run writes three files next to each other — the slide structure,
//! the architecture diagram (markdown with a Mermaid fence), and the
//! scraped project info.

pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::DeploymentDecision;
use crate::signals::ProjectFacts;
use crate::slides::{Slide, SlideOutline};

/// The assembled deck, as serialized to `<stem>_slides.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckArtifact {
    /// Project name for the deck file name and cover.
    pub project_name: String,
    /// Client name shown on the cover.
    pub client_name: String,
    /// Assembly timestamp.
    pub generated_at: DateTime<Utc>,
    /// The deployment decision this deck was built around.
    pub deployment: DeploymentDecision,
    /// Slide count.
    pub total_slides: usize,
    /// The slides, numbered contiguously from 1.
    pub slides: Vec<Slide>,
}

impl DeckArtifact {
    /// Assemble the artifact from a mapped outline and the deployment
    /// decision.
    pub fn assemble(outline: SlideOutline, decision: DeploymentDecision) -> Self {
        Self {
            project_name: outline.project_name,
            client_name: outline.client_name,
            generated_at: Utc::now(),
            deployment: decision,
            total_slides: outline.total_slides,
            slides: outline.slides,
        }
    }
}

/// Paths of the three artifacts one run writes.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// Slide structure JSON.
    pub slides_json: PathBuf,
    /// Architecture diagram markdown.
    pub diagram: PathBuf,
    /// Scraped project info JSON.
    pub project_info: PathBuf,
}

/// Write the three artifacts for one run.
///
/// # Errors
///
/// Returns an error when the output directory cannot be created or any
/// file cannot be written.
pub fn write_artifacts(
    artifact: &DeckArtifact,
    diagram_code: &str,
    facts: &ProjectFacts,
    output_dir: &Path,
    stem: &str,
) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let slides_json = output_dir.join(format!("{stem}_slides.json"));
    let json = serde_json::to_string_pretty(artifact).context("failed to serialize deck")?;
    std::fs::write(&slides_json, json)
        .with_context(|| format!("failed to write {}", slides_json.display()))?;

    let diagram = output_dir.join(format!("{stem}_architecture_diagram.md"));
    std::fs::write(&diagram, diagram_markdown(artifact, diagram_code, facts))
        .with_context(|| format!("failed to write {}", diagram.display()))?;

    let project_info = output_dir.join(format!("{stem}_project_info.json"));
    let info_json = serde_json::to_string_pretty(&serde_json::json!({
        "project_info": facts,
        "deployment": artifact.deployment,
    }))
    .context("failed to serialize project info")?;
    std::fs::write(&project_info, info_json)
        .with_context(|| format!("failed to write {}", project_info.display()))?;

    info!(
        slides = artifact.total_slides,
        dir = %output_dir.display(),
        "artifacts written"
    );

    Ok(ArtifactPaths {
        slides_json,
        diagram,
        project_info,
    })
}

/// The diagram file is a small markdown wrapper around the Mermaid fence
/// so it previews directly in editors and on mermaid.live.
fn diagram_markdown(artifact: &DeckArtifact, diagram_code: &str, facts: &ProjectFacts) -> String {
    let method = artifact
        .deployment
        .topology
        .tag()
        .to_uppercase()
        .replace('-', " ");
    let cameras = facts
        .camera_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_owned());

    format!(
        "# System Architecture: {project}\n\n\
         **Client:** {client}\n\n\
         **Deployment Method:** {method}\n\n\
         **Cameras:** {cameras}\n\n\
         **AI Modules:** {modules}\n\n\
         ---\n\n\
         ## Architecture Diagram\n\n\
         ```mermaid\n\
         {code}\n\
         ```\n",
        project = artifact.project_name,
        client = artifact.client_name,
        modules = facts.modules.len(),
        code = diagram_code.trim_end(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, Topology};
    use crate::signals::SignalBag;
    use crate::slides::{SlideBody, SlideOutline};

    fn sample_outline() -> SlideOutline {
        SlideOutline {
            project_name: "Port Terminal Safety".to_owned(),
            client_name: "Acme Terminals".to_owned(),
            total_slides: 1,
            slides: vec![Slide {
                number: 1,
                title: "Cover".to_owned(),
                body: SlideBody::Title {
                    date: String::new(),
                },
            }],
        }
    }

    fn sample_facts() -> ProjectFacts {
        ProjectFacts {
            project_name: "Port Terminal Safety".to_owned(),
            client_name: "Acme Terminals".to_owned(),
            camera_count: Some(12),
            modules: vec!["Helmet Detection".to_owned()],
            alert_channels: vec!["Email".to_owned()],
            internet_type: None,
        }
    }

    #[test]
    fn test_assemble_carries_decision() {
        let decision = classify(&SignalBag::default());
        let artifact = DeckArtifact::assemble(sample_outline(), decision.clone());
        assert_eq!(artifact.deployment, decision);
        assert_eq!(artifact.deployment.topology, Topology::OnPrem);
        assert_eq!(artifact.total_slides, 1);
    }

    #[test]
    fn test_write_artifacts_creates_three_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let decision = classify(&SignalBag::default());
        let artifact = DeckArtifact::assemble(sample_outline(), decision);

        let paths = write_artifacts(
            &artifact,
            "graph TB\n",
            &sample_facts(),
            dir.path(),
            "deal",
        )
        .expect("write artifacts");

        assert!(paths.slides_json.exists());
        assert!(paths.diagram.exists());
        assert!(paths.project_info.exists());

        let written = std::fs::read_to_string(&paths.slides_json).expect("read slides json");
        let back: DeckArtifact = serde_json::from_str(&written).expect("parse slides json");
        assert_eq!(back.client_name, "Acme Terminals");

        let diagram = std::fs::read_to_string(&paths.diagram).expect("read diagram");
        assert!(diagram.contains("```mermaid"));
        assert!(diagram.contains("**Deployment Method:** ON PREM"));
    }
}
