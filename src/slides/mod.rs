//! Typed slide records and the proposal-to-outline mapper.
//!
//! A slide outline is the contract between this tool and the deck
//! tooling downstream: an ordered list of typed slide records, numbered
//! contiguously from 1, with all presentation text already resolved.

pub mod mapper;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One bullet line with an indent level (0 = top level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    /// Indent level, 0-based.
    pub level: u8,
    /// Bullet text, markdown markers stripped.
    pub text: String,
}

impl Bullet {
    /// A top-level bullet.
    pub fn top(text: impl Into<String>) -> Self {
        Self {
            level: 0,
            text: text.into(),
        }
    }
}

/// One column of a two-column slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column heading.
    pub heading: String,
    /// Column items, top to bottom.
    pub items: Vec<String>,
}

/// One milestone on a timeline slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Phase identifier (T0, T1, ...).
    pub phase: String,
    /// Milestone label.
    pub label: String,
    /// Duration text ("2 weeks"), empty when not stated.
    pub duration: String,
}

/// The typed payload of a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlideBody {
    /// Cover slide.
    Title {
        /// Presentation date, empty when the template does not state one.
        date: String,
    },
    /// Bulleted content slide.
    Bullets {
        /// Bullet lines, in order.
        items: Vec<Bullet>,
    },
    /// Side-by-side responsibility split.
    TwoColumn {
        /// Left column (vendor side).
        left: Column,
        /// Right column (client side).
        right: Column,
    },
    /// Architecture diagram slide.
    Diagram {
        /// Mermaid source for the diagram.
        code: String,
        /// Short prose description shown next to the diagram.
        description: String,
    },
    /// Implementation timeline.
    Timeline {
        /// Milestones in phase order.
        milestones: Vec<Milestone>,
    },
    /// One AI module, one slide.
    Module {
        /// Module type label ("Standard", "Custom"), may be empty.
        module_type: String,
        /// What the module watches for.
        purpose: String,
        /// When an alert fires.
        alert_logic: String,
        /// Camera/site preconditions.
        preconditions: String,
        /// Extra data needs, may be empty.
        data_requirements: String,
        /// Illustration URL, may be empty.
        image_url: String,
        /// Demo video URL, may be empty.
        video_url: String,
    },
}

/// A single slide in the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based position in the deck.
    pub number: u32,
    /// Slide title.
    pub title: String,
    /// Typed payload.
    #[serde(flatten)]
    pub body: SlideBody,
}

/// The full ordered outline for one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOutline {
    /// Project name for the deck file name and cover.
    pub project_name: String,
    /// Client name shown on the cover.
    pub client_name: String,
    /// Slide count, always equal to `slides.len()`.
    pub total_slides: usize,
    /// The slides, numbered contiguously from 1.
    pub slides: Vec<Slide>,
}

/// Errors from mapping proposal sections onto slides.
#[derive(Debug, Error)]
pub enum MapError {
    /// A module slide cannot be built without its required fields.
    #[error("module '{module}' is missing required field(s): {}", fields.join(", "))]
    MissingModuleFields {
        /// Module name as it appears in the template.
        module: String,
        /// The absent fields.
        fields: Vec<&'static str>,
    },
    /// The requirement section carries no client name.
    #[error("client name (project owner) not found in the requirement section")]
    MissingClientName,
    /// A mapping pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_json_shape() {
        let slide = Slide {
            number: 3,
            title: "Proposed System Architecture".to_owned(),
            body: SlideBody::Diagram {
                code: "graph TB".to_owned(),
                description: "Cloud deployment".to_owned(),
            },
        };
        let json = serde_json::to_value(&slide).expect("serialize slide");
        assert_eq!(json["number"], 3);
        assert_eq!(json["kind"], "diagram");
        assert_eq!(json["code"], "graph TB");

        let back: Slide = serde_json::from_value(json).expect("deserialize slide");
        assert_eq!(back, slide);
    }

    #[test]
    fn test_outline_round_trip() {
        let outline = SlideOutline {
            project_name: "Acme".to_owned(),
            client_name: "Acme Terminals".to_owned(),
            total_slides: 1,
            slides: vec![Slide {
                number: 1,
                title: "Cover".to_owned(),
                body: SlideBody::Title {
                    date: "2025-11-03".to_owned(),
                },
            }],
        };
        let json = serde_json::to_string(&outline).expect("serialize outline");
        let back: SlideOutline = serde_json::from_str(&json).expect("deserialize outline");
        assert_eq!(back, outline);
    }
}
