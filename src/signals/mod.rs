//! Signal bag and project facts — the typed output of document scraping.
//!
//! Scrapers read raw document text and emit two value objects: a
//! [`SignalBag`] of environment and requirement signals feeding the
//! deployment classifier, and [`ProjectFacts`] feeding the diagram
//! renderer and slide mapper. Both are plain immutable values; nothing
//! in this module touches I/O.

pub mod deal_transfer;
pub mod proposal;
pub(crate) mod sections;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on the number of AI modules carried into facts and slides.
pub const MAX_MODULES: usize = 20;

/// An operator-stated deployment preference found verbatim in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentHint {
    /// Cloud-hosted inference.
    Cloud,
    /// Everything on site.
    OnPrem,
    /// Inference on site, training and dashboard in the cloud.
    Hybrid,
    /// Inference and training on site, dashboard in the cloud.
    HybridTrainingLocal,
    /// Cellular cameras bridged to a central site over VPN.
    FourGVpnBridge,
    /// Battery or solar powered mobile units.
    Vimov,
}

/// Where model training happens, when the source text states it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingLocation {
    /// Training runs on site.
    Local,
    /// Training runs in the cloud.
    Cloud,
}

/// Internet connection class stated in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    /// Wired fiber.
    Fiber,
    /// 4G/5G cellular.
    Cellular,
    /// Satellite uplink.
    Satellite,
    /// Stated but unrecognised type.
    Other,
}

impl ConnectionType {
    /// Human-readable label used in diagram nodes.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fiber => "Fiber",
            Self::Cellular => "4G/5G",
            Self::Satellite => "Satellite",
            Self::Other => "Other",
        }
    }
}

/// Connectivity signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetSignals {
    /// Site has an internet connection at all.
    pub has_connection: bool,
    /// The connection is stable enough for continuous streaming.
    pub is_stable: bool,
    /// Connection class, when stated.
    pub connection_type: Option<ConnectionType>,
    /// Bandwidth in Mbps, when stated.
    pub bandwidth_mbps: Option<u32>,
}

impl InternetSignals {
    /// Whether the stated connection is a satellite uplink.
    pub fn is_satellite(&self) -> bool {
        self.connection_type == Some(ConnectionType::Satellite)
    }
}

/// Data security and compliance signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySignals {
    /// A GDPR-equivalent data privacy mandate applies.
    pub has_data_privacy_mandate: bool,
    /// The client prefers footage to be processed locally.
    pub prefers_local_processing: bool,
}

/// Site mobility signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobilitySignals {
    /// Remote, rural, or temporary site.
    pub is_remote_or_temporary: bool,
    /// Vehicle-mounted or frequently relocated units with no fixed site.
    pub is_high_mobility: bool,
    /// Auto-registering cellular cameras with a VPN bridge to a fixed endpoint.
    pub has_vpn_autoregistration: bool,
}

/// The full set of extracted environment signals — sole input to the
/// deployment classifier.
///
/// All fields are independently optional; [`SignalBag::default`] is the
/// all-absent bag. Constructed fresh per document, never mutated after
/// scraping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalBag {
    /// Operator-stated deployment preference, if unambiguous.
    pub explicit_hint: Option<DeploymentHint>,
    /// Connectivity signals.
    pub internet: InternetSignals,
    /// Compliance signals.
    pub security: SecuritySignals,
    /// Mobility signals.
    pub mobility: MobilitySignals,
    /// Explicit training location, relevant only to hybrid variants.
    pub training_location: Option<TrainingLocation>,
    /// Multiple sites each wanting a local dashboard.
    pub multi_site_local_dashboards: bool,
    /// Explicit statement that a network video recorder is required
    /// (`Some(true)`) or excluded (`Some(false)`).
    pub recorder_hint: Option<bool>,
}

/// Presentation-facing facts scraped alongside the signal bag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFacts {
    /// Project name, falling back to the source file stem.
    pub project_name: String,
    /// Client or project-owner name.
    pub client_name: String,
    /// Number of cameras, when stated.
    pub camera_count: Option<u32>,
    /// AI module names in source order, capped at [`MAX_MODULES`].
    pub modules: Vec<String>,
    /// Alert delivery channels (Email, Dashboard, Mobile, ...).
    pub alert_channels: Vec<String>,
    /// Internet connection type label, when stated.
    pub internet_type: Option<String>,
}

/// Errors from document scraping.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The template still contains `[SECTION_001]`-style placeholders.
    #[error("template contains {count} unresolved placeholder(s), e.g. {samples:?}")]
    UnresolvedPlaceholders {
        /// Total placeholder count.
        count: usize,
        /// Up to ten distinct placeholder names, for the error message.
        samples: Vec<String>,
    },
    /// Fields a deck cannot be built without were not found.
    #[error("required field(s) not found: {}", fields.join(", "))]
    MissingFields {
        /// The absent fields, in check order.
        fields: Vec<&'static str>,
    },
    /// A scraping pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
