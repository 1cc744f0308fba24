//! Deployment topology inference — an ordered, first-match-wins rule cascade.
//!
//! [`classify`] is a pure function from a [`SignalBag`] to a
//! [`DeploymentDecision`]: no I/O, no mutation, deterministic, and total —
//! every bag, including an empty one, yields exactly one topology. The
//! cascade is a priority list, not a scored model: rules are evaluated
//! top to bottom and the first match wins. Each rule is a named
//! predicate/result pair so the list can be reordered or extended without
//! touching control flow, and the winning rule's name lands in the
//! decision's rationale trail.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signals::{DeploymentHint, SignalBag, TrainingLocation};

/// Minimum satellite bandwidth (inclusive) that still supports a hybrid
/// split instead of forcing everything on site.
pub const SATELLITE_HYBRID_FLOOR_MBPS: u32 = 20;

/// One of the six deployment topologies a project can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Streams leave the site; inference and dashboard are cloud-hosted.
    #[serde(rename = "cloud")]
    Cloud,
    /// Inference, training, and dashboard all run on site.
    #[serde(rename = "on-prem")]
    OnPrem,
    /// Inference on site; training and online dashboard in the cloud.
    #[serde(rename = "hybrid")]
    Hybrid,
    /// Inference and training on site; only the dashboard is cloud-hosted.
    #[serde(rename = "hybrid-training-local")]
    HybridTrainingLocal,
    /// Auto-registering cellular cameras bridged over VPN to a central
    /// recorder and processing site.
    #[serde(rename = "4g-vpn-bridge")]
    FourGVpnBridge,
    /// Battery/solar powered mobile AI units with opportunistic cloud sync.
    #[serde(rename = "vimov")]
    Vimov,
}

impl Topology {
    /// Stable string tag used in artifacts and file names.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::OnPrem => "on-prem",
            Self::Hybrid => "hybrid",
            Self::HybridTrainingLocal => "hybrid-training-local",
            Self::FourGVpnBridge => "4g-vpn-bridge",
            Self::Vimov => "vimov",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The classifier's sole output.
///
/// Constructed fresh per call; plain value with no identity beyond
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentDecision {
    /// The inferred topology — exactly one of the six.
    pub topology: Topology,
    /// Whether the rendered diagram should show a network video recorder
    /// node. Always `false` for the mobile topologies, where the concept
    /// does not apply.
    pub show_network_recorder: bool,
    /// Names of the rules that fired, in evaluation order. Diagnostic
    /// only — not consumed by any downstream stage.
    pub rationale: Vec<String>,
}

/// One entry in the cascade: a named predicate over the bag.
struct Rule {
    name: &'static str,
    decide: fn(&SignalBag) -> Option<Outcome>,
}

/// A rule's verdict, with an optional refinement note for the rationale.
struct Outcome {
    topology: Topology,
    note: Option<&'static str>,
}

impl Outcome {
    fn plain(topology: Topology) -> Option<Self> {
        Some(Self {
            topology,
            note: None,
        })
    }
}

/// The cascade, highest priority first. The final entry is a catch-all,
/// so evaluation always terminates with a topology.
const CASCADE: &[Rule] = &[
    Rule {
        name: "explicit-hint",
        decide: explicit_hint,
    },
    Rule {
        name: "mobility",
        decide: mobility,
    },
    Rule {
        name: "data-locality",
        decide: data_locality,
    },
    Rule {
        name: "no-stable-connection",
        decide: no_stable_connection,
    },
    Rule {
        name: "satellite-low-bandwidth",
        decide: satellite_low_bandwidth,
    },
    Rule {
        name: "satellite-adequate-bandwidth",
        decide: satellite_adequate_bandwidth,
    },
    Rule {
        name: "multi-site-local-dashboards",
        decide: multi_site_local_dashboards,
    },
    Rule {
        name: "stable-connection",
        decide: stable_connection,
    },
    // Shadowed by "stable-connection" in the current ordering; kept so a
    // reordering of the stable-connection default remains a one-line move.
    Rule {
        name: "adequate-bandwidth",
        decide: adequate_bandwidth,
    },
    Rule {
        name: "fallback-on-prem",
        decide: fallback_on_prem,
    },
];

/// Infer the deployment topology for one project.
///
/// Walks the cascade top to bottom and returns the first match, then
/// derives the network-recorder flag from the chosen topology and the
/// bag's explicit recorder hint.
pub fn classify(bag: &SignalBag) -> DeploymentDecision {
    for rule in CASCADE {
        if let Some(outcome) = (rule.decide)(bag) {
            let mut rationale = vec![rule.name.to_owned()];
            if let Some(note) = outcome.note {
                rationale.push(note.to_owned());
            }
            return DeploymentDecision {
                topology: outcome.topology,
                show_network_recorder: show_recorder(outcome.topology, bag),
                rationale,
            };
        }
    }
    // Unreachable while the cascade ends in a catch-all; kept so the
    // function stays total even if the table is edited.
    DeploymentDecision {
        topology: Topology::OnPrem,
        show_network_recorder: show_recorder(Topology::OnPrem, bag),
        rationale: vec!["fallback-on-prem".to_owned()],
    }
}

/// Rule 1: an operator's explicit statement always wins.
///
/// A generic hybrid hint is refined to the training-local variant when the
/// text also pins training to the site.
fn explicit_hint(bag: &SignalBag) -> Option<Outcome> {
    let hint = bag.explicit_hint?;
    let (topology, note) = match hint {
        DeploymentHint::Cloud => (Topology::Cloud, None),
        DeploymentHint::OnPrem => (Topology::OnPrem, None),
        DeploymentHint::Hybrid => {
            if bag.training_location == Some(TrainingLocation::Local) {
                (Topology::HybridTrainingLocal, Some("training-location-local"))
            } else {
                (Topology::Hybrid, None)
            }
        }
        DeploymentHint::HybridTrainingLocal => (Topology::HybridTrainingLocal, None),
        DeploymentHint::FourGVpnBridge => (Topology::FourGVpnBridge, None),
        DeploymentHint::Vimov => (Topology::Vimov, None),
    };
    Some(Outcome { topology, note })
}

/// Rule 2: remote, temporary, or mobile sites get a mobile topology.
///
/// The VPN bridge needs the explicit auto-registration/VPN signal and a
/// remote fixed endpoint; it outranks the mobile-unit variant only when
/// that signal exists. High-mobility alone is enough for mobile units. A
/// remote site with neither sub-signal falls through to the connectivity
/// rules.
fn mobility(bag: &SignalBag) -> Option<Outcome> {
    let m = &bag.mobility;
    if !m.is_remote_or_temporary && !m.is_high_mobility {
        return None;
    }
    if m.is_remote_or_temporary && m.has_vpn_autoregistration {
        return Some(Outcome {
            topology: Topology::FourGVpnBridge,
            note: Some("vpn-autoregistration"),
        });
    }
    if m.is_high_mobility {
        return Some(Outcome {
            topology: Topology::Vimov,
            note: Some("high-mobility"),
        });
    }
    None
}

/// Rule 3: compliance requirements dominate connectivity convenience.
fn data_locality(bag: &SignalBag) -> Option<Outcome> {
    if bag.security.has_data_privacy_mandate || bag.security.prefers_local_processing {
        Outcome::plain(Topology::OnPrem)
    } else {
        None
    }
}

/// Rule 4a: no connection, or one too flaky to stream over.
fn no_stable_connection(bag: &SignalBag) -> Option<Outcome> {
    if !bag.internet.has_connection || !bag.internet.is_stable {
        Outcome::plain(Topology::OnPrem)
    } else {
        None
    }
}

/// Rule 4b: satellite below the hybrid floor cannot carry video uplink.
fn satellite_low_bandwidth(bag: &SignalBag) -> Option<Outcome> {
    if bag.internet.is_satellite()
        && bag
            .internet
            .bandwidth_mbps
            .is_some_and(|mbps| mbps < SATELLITE_HYBRID_FLOOR_MBPS)
    {
        Outcome::plain(Topology::OnPrem)
    } else {
        None
    }
}

/// Rule 4c: satellite at or above the floor carries the hybrid split, but
/// not full cloud streaming.
fn satellite_adequate_bandwidth(bag: &SignalBag) -> Option<Outcome> {
    if bag.internet.is_satellite()
        && bag
            .internet
            .bandwidth_mbps
            .is_some_and(|mbps| mbps >= SATELLITE_HYBRID_FLOOR_MBPS)
    {
        Outcome::plain(Topology::Hybrid)
    } else {
        None
    }
}

/// Rule 4d: several sites each wanting a local dashboard keep inference
/// local and centralise the rest.
fn multi_site_local_dashboards(bag: &SignalBag) -> Option<Outcome> {
    if bag.internet.is_stable && bag.multi_site_local_dashboards {
        Outcome::plain(Topology::Hybrid)
    } else {
        None
    }
}

/// Rule 4e: a stable connection with no constraint left standing goes to
/// the cloud.
fn stable_connection(bag: &SignalBag) -> Option<Outcome> {
    if bag.internet.is_stable {
        Outcome::plain(Topology::Cloud)
    } else {
        None
    }
}

/// Rule 4f: stable and fast enough for the hybrid split.
fn adequate_bandwidth(bag: &SignalBag) -> Option<Outcome> {
    if bag.internet.is_stable
        && bag
            .internet
            .bandwidth_mbps
            .is_some_and(|mbps| mbps >= SATELLITE_HYBRID_FLOOR_MBPS)
    {
        Outcome::plain(Topology::Hybrid)
    } else {
        None
    }
}

/// Rule 5: too sparse to tell — on-premise is the one option that always
/// deploys.
fn fallback_on_prem(_bag: &SignalBag) -> Option<Outcome> {
    Outcome::plain(Topology::OnPrem)
}

/// Derive the network-recorder flag from the topology and the bag's
/// explicit recorder hint.
fn show_recorder(topology: Topology, bag: &SignalBag) -> bool {
    match topology {
        // Cloud sites stream straight out; a recorder appears only on
        // explicit request.
        Topology::Cloud => bag.recorder_hint.unwrap_or(false),
        // Fixed-site local processing assumes a recorder unless the text
        // excludes one.
        Topology::OnPrem | Topology::Hybrid | Topology::HybridTrainingLocal => {
            bag.recorder_hint.unwrap_or(true)
        }
        // The recorder concept does not apply to the mobile topologies.
        Topology::FourGVpnBridge | Topology::Vimov => false,
    }
}
