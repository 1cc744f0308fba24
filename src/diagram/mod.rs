//! Architecture diagram rendering.
//!
//! Maps a classified topology plus presentation facts onto one of six
//! Mermaid diagram templates. Rendering is plain string assembly — the
//! decision logic all lives upstream in the classifier.

mod mermaid;

use crate::classify::{DeploymentDecision, Topology};
use crate::config::RenderConfig;
use crate::signals::ProjectFacts;

/// Everything the renderer needs beyond the topology itself.
#[derive(Debug, Clone)]
pub struct RenderParams {
    /// Camera count; per-topology defaults apply when absent.
    pub camera_count: Option<u32>,
    /// AI module names in presentation order.
    pub module_names: Vec<String>,
    /// Alert delivery channels; per-topology defaults apply when empty.
    pub alert_channels: Vec<String>,
    /// Show the network video recorder node.
    pub include_recorder: bool,
    /// Internet connection type label, when known.
    pub internet_type: Option<String>,
    /// Embed module names inline in the inference node.
    pub compact: bool,
    /// Emit an "AI Modules" subgraph when not in compact mode.
    pub list_modules: bool,
    /// Module label truncation threshold.
    pub max_module_label_chars: usize,
}

impl RenderParams {
    /// Assemble render parameters from scraped facts, the deployment
    /// decision, and the render configuration.
    pub fn assemble(
        facts: &ProjectFacts,
        decision: &DeploymentDecision,
        render: &RenderConfig,
    ) -> Self {
        Self {
            camera_count: facts.camera_count,
            module_names: facts.modules.clone(),
            alert_channels: facts.alert_channels.clone(),
            include_recorder: decision.show_network_recorder,
            internet_type: facts.internet_type.clone(),
            compact: render.compact_mode,
            list_modules: render.list_modules,
            max_module_label_chars: render.max_module_label_chars,
        }
    }
}

/// Render the Mermaid architecture diagram for a topology.
pub fn render(topology: Topology, params: &RenderParams) -> String {
    match topology {
        Topology::OnPrem => mermaid::on_prem(params),
        Topology::Cloud => mermaid::cloud(params),
        Topology::Hybrid => mermaid::hybrid(params),
        Topology::HybridTrainingLocal => mermaid::hybrid_training_local(params),
        Topology::FourGVpnBridge => mermaid::four_g_vpn_bridge(params),
        Topology::Vimov => mermaid::vimov(params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RenderParams {
        RenderParams {
            camera_count: Some(12),
            module_names: vec![
                "Safety Helmet Detection".to_owned(),
                "Smoking Detection".to_owned(),
            ],
            alert_channels: vec!["Email".to_owned(), "Dashboard".to_owned()],
            include_recorder: true,
            internet_type: Some("Fiber".to_owned()),
            compact: true,
            list_modules: true,
            max_module_label_chars: 50,
        }
    }

    #[test]
    fn test_each_topology_renders_a_graph() {
        let p = params();
        for topology in [
            Topology::Cloud,
            Topology::OnPrem,
            Topology::Hybrid,
            Topology::HybridTrainingLocal,
            Topology::FourGVpnBridge,
            Topology::Vimov,
        ] {
            let diagram = render(topology, &p);
            assert!(
                diagram.starts_with("graph "),
                "{topology} should render a Mermaid graph"
            );
            assert!(diagram.contains("Cameras"), "{topology} should show cameras");
            assert!(diagram.contains("Alert"), "{topology} should show alerts");
        }
    }

    #[test]
    fn test_recorder_node_follows_flag() {
        let mut p = params();
        p.include_recorder = true;
        assert!(render(Topology::OnPrem, &p).contains("NVR"));
        p.include_recorder = false;
        assert!(!render(Topology::OnPrem, &p).contains("NVR"));
    }

    #[test]
    fn test_compact_mode_inlines_modules() {
        let p = params();
        let diagram = render(Topology::OnPrem, &p);
        assert!(diagram.contains("Safety Helmet Detection<br/>Smoking Detection"));
        assert!(!diagram.contains("subgraph \"AI Modules\""));
    }

    #[test]
    fn test_subgraph_mode_lists_modules() {
        let mut p = params();
        p.compact = false;
        let diagram = render(Topology::OnPrem, &p);
        assert!(diagram.contains("subgraph \"AI Modules\""));
        assert!(diagram.contains("Mod_1[\"Safety Helmet Detection\"]"));
        assert!(diagram.contains("AI_Inference --> Mod_2"));
    }

    #[test]
    fn test_internet_type_shown_when_known() {
        let p = params();
        let diagram = render(Topology::Cloud, &p);
        assert!(diagram.contains("Internet Connection<br/>(Fiber)"));
    }
}
