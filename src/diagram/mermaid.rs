//! The six Mermaid diagram templates, one per deployment topology.
//!
//! Node labels and styling match the knowledge-base examples the sales
//! team shares with clients; keep edits in sync with those decks.

use super::RenderParams;

/// Default camera count for fixed-site topologies.
const FIXED_SITE_CAMERAS: u32 = 8;
/// Default camera count for VPN-bridged remote sites.
const BRIDGE_CAMERAS: u32 = 5;
/// Default camera count for mobile units.
const MOBILE_CAMERAS: u32 = 3;

/// On-premise: cameras, optional NVR, training + inference + dashboard all
/// on site.
pub(crate) fn on_prem(p: &RenderParams) -> String {
    let cameras = camera_node(p.camera_count.unwrap_or(FIXED_SITE_CAMERAS));
    let modules = ModuleBlock::build(p, "AI_Inference");
    let inference = inference_node("AI Inference<br/>(On-Premise Processing)", &modules);
    let alert = alert_node(&p.alert_channels, "Email & Dashboard");

    let (nvr_node, camera_edges) = recorder_block(p.include_recorder, "AI_Inference");

    let mut out = String::new();
    out.push_str("graph TB\n");
    out.push_str("    subgraph \"On-Premise Infrastructure\"\n");
    push_node(&mut out, &cameras);
    push_node(&mut out, &nvr_node);
    push_node(&mut out, "AI_Training[\"AI Training<br/>(On-Premise)\"]");
    push_node(&mut out, &inference);
    push_node(&mut out, "Dashboard[\"Local Dashboard\"]");
    push_node(&mut out, &alert);
    out.push_str("    end\n\n");
    out.push_str(&modules.subgraph);
    out.push_str(&camera_edges);
    out.push_str("    AI_Training -->|Trained Models| AI_Inference\n");
    out.push_str("    AI_Inference -->|Detection Results| Dashboard\n");
    out.push_str("    AI_Inference -->|Alerts| Alert\n");
    out.push_str(&modules.connections);
    out.push_str(
        "    style AI_Training fill:#e1f5ff,stroke:#01579b,stroke-width:2px,color:#000000\n\
         \x20   style AI_Inference fill:#81d4fa,stroke:#0277bd,stroke-width:2px,color:#000000\n\
         \x20   style Dashboard fill:#fff4e1,stroke:#e65100,stroke-width:2px,color:#000000\n\
         \x20   style Alert fill:#f3e5f5,stroke:#7b1fa2,stroke-width:2px,color:#000000\n\
         \x20   style Cameras fill:#ffffff,stroke:#424242,stroke-width:2px,color:#000000\n",
    );
    out.push_str(&modules.styles);
    out
}

/// Cloud: streams leave the site over the client's internet link into
/// cloud inference; dashboard and alerts are output services.
pub(crate) fn cloud(p: &RenderParams) -> String {
    let cameras = camera_node(p.camera_count.unwrap_or(FIXED_SITE_CAMERAS));
    let modules = ModuleBlock::build(p, "Cloud_Inference");
    let inference = match &modules.inline {
        Some(inline) => format!("Cloud_Inference[\"Cloud AI Inference<br/>(AWS)<br/>{inline}\"]"),
        None => "Cloud_Inference[\"Cloud AI Inference<br/>(AWS Cloud Processing)\"]".to_owned(),
    };
    let internet = match &p.internet_type {
        Some(kind) => format!(
            "Internet[\"Internet Connection<br/>({kind})<br/>(Provided by Client)\"]"
        ),
        None => "Internet[\"Internet Connection<br/>(Provided by Client)\"]".to_owned(),
    };
    let alert = alert_node(&p.alert_channels, "Email & Dashboard");

    // For cloud sites the recorder sits between cameras and uplink.
    let (nvr_node, camera_edges) = if p.include_recorder {
        (
            "NVR[\"NVR\"]".to_owned(),
            "    Cameras --> NVR\n    NVR -->|RTSP Links| Internet\n".to_owned(),
        )
    } else {
        (String::new(), "    Cameras -->|RTSP Links| Internet\n".to_owned())
    };

    let mut out = String::new();
    out.push_str("graph LR\n");
    out.push_str("    subgraph \"On-Site Infrastructure\"\n");
    out.push_str("        direction TB\n");
    push_node(&mut out, &cameras);
    push_node(&mut out, &nvr_node);
    push_node(&mut out, &internet);
    out.push_str("    end\n\n");
    out.push_str("    subgraph \"On-Cloud\"\n");
    out.push_str("        direction LR\n");
    out.push_str("        subgraph \"Cloud Infrastructure\"\n");
    out.push_str("            direction TB\n");
    out.push_str("            ");
    out.push_str(&inference);
    out.push('\n');
    out.push_str("        end\n\n");
    out.push_str("        subgraph \"Output Services\"\n");
    out.push_str("            direction TB\n");
    out.push_str("            Dashboard[\"Centralized Dashboard\"]\n");
    out.push_str("            ");
    out.push_str(&alert);
    out.push('\n');
    out.push_str("        end\n");
    out.push_str("    end\n\n");
    out.push_str("    HSE_Manager[\"HSE Manager\"]\n\n");
    out.push_str(&modules.subgraph);
    out.push_str(&camera_edges);
    out.push_str("    Internet --> Cloud_Inference\n");
    out.push_str("    Cloud_Inference --> Dashboard\n");
    out.push_str("    HSE_Manager --> Dashboard\n");
    out.push_str(&modules.connections);
    out.push_str(
        "    style Cloud_Inference fill:#81d4fa,stroke:#0277bd,stroke-width:3px,color:#000000\n\
         \x20   style Dashboard fill:#fff4e1,stroke:#e65100,stroke-width:2px,color:#000000\n\
         \x20   style Alert fill:#f3e5f5,stroke:#7b1fa2,stroke-width:2px,color:#000000\n\
         \x20   style HSE_Manager fill:#e3f2fd,stroke:#1976d2,stroke-width:2px,color:#000000\n\
         \x20   style Internet fill:#e8f5e9,stroke:#2e7d32,stroke-width:2px,color:#000000\n\
         \x20   style Cameras fill:#ffffff,stroke:#424242,stroke-width:2px,color:#000000\n",
    );
    if p.include_recorder {
        out.push_str(
            "    style NVR fill:#f5f5f5,stroke:#616161,stroke-width:2px,color:#000000\n",
        );
    }
    out.push_str(&modules.styles);
    out
}

/// Hybrid: inference and a local dashboard on site; training, online
/// dashboard, and alerts in the cloud.
pub(crate) fn hybrid(p: &RenderParams) -> String {
    let cameras = camera_node(p.camera_count.unwrap_or(FIXED_SITE_CAMERAS));
    let modules = ModuleBlock::build(p, "AI_Inference");
    let inference = inference_node("AI Inference<br/>(On-Premise Processing)", &modules);
    let internet = match &p.internet_type {
        Some(kind) => format!("Internet[\"Internet Connection<br/>({kind})\"]"),
        None => "Internet[\"Internet Connection\"]".to_owned(),
    };
    let alert = alert_node(&p.alert_channels, "Email & Dashboard");
    let (nvr_node, camera_edges) = recorder_block(p.include_recorder, "AI_Inference");

    let mut out = String::new();
    out.push_str("graph TB\n");
    out.push_str("    subgraph \"On-Premise Infrastructure\"\n");
    push_node(&mut out, &cameras);
    push_node(&mut out, &nvr_node);
    push_node(&mut out, &inference);
    push_node(&mut out, "Local_Dashboard[\"Local Dashboard\"]");
    push_node(&mut out, &internet);
    out.push_str("    end\n\n");
    out.push_str("    subgraph \"Cloud Infrastructure\"\n");
    push_node(&mut out, "Cloud_Training[\"AI Training<br/>(Vendor Cloud)\"]");
    push_node(&mut out, "Online_Dashboard[\"Online Dashboard\"]");
    push_node(&mut out, &alert);
    out.push_str("    end\n\n");
    out.push_str(&modules.subgraph);
    out.push_str(&camera_edges);
    out.push_str("    AI_Inference -->|Detection Results| Local_Dashboard\n");
    out.push_str("    AI_Inference -->|Alerts| Alert\n");
    out.push_str("    Internet -->|Model Updates| Cloud_Training\n");
    out.push_str("    Cloud_Training -.->|Updated Models| AI_Inference\n");
    out.push_str("    AI_Inference -->|API| Online_Dashboard\n");
    out.push_str(&modules.connections);
    out.push_str(
        "    style AI_Inference fill:#81d4fa,stroke:#0277bd,stroke-width:2px,color:#000000\n\
         \x20   style Local_Dashboard fill:#fff4e1,stroke:#e65100,stroke-width:2px,color:#000000\n\
         \x20   style Cloud_Training fill:#e8f5e9,stroke:#2e7d32,stroke-width:2px,color:#000000\n\
         \x20   style Online_Dashboard fill:#fff4e1,stroke:#e65100,stroke-width:2px,color:#000000\n\
         \x20   style Alert fill:#f3e5f5,stroke:#7b1fa2,stroke-width:2px,color:#000000\n\
         \x20   style Cameras fill:#ffffff,stroke:#424242,stroke-width:2px,color:#000000\n\
         \x20   style Internet fill:#e8f5e9,stroke:#2e7d32,stroke-width:2px,color:#000000\n",
    );
    out.push_str(&modules.styles);
    out
}

/// Hybrid with local training: inference and training on site, internet
/// used only for dashboard access.
pub(crate) fn hybrid_training_local(p: &RenderParams) -> String {
    let cameras = camera_node(p.camera_count.unwrap_or(FIXED_SITE_CAMERAS));
    let modules = ModuleBlock::build(p, "AI_Inference");
    let inference = inference_node("AI Inference<br/>(On-Premise Processing)", &modules);
    let internet = match &p.internet_type {
        Some(kind) => format!(
            "Internet[\"Internet Connection<br/>({kind})<br/>Dashboard Access Only\"]"
        ),
        None => "Internet[\"Internet Connection<br/>Dashboard Access Only\"]".to_owned(),
    };
    let alert = alert_node(&p.alert_channels, "Email & Dashboard");
    let (nvr_node, camera_edges) = recorder_block(p.include_recorder, "AI_Inference");

    let mut out = String::new();
    out.push_str("graph TB\n");
    out.push_str("    subgraph \"On-Premise Infrastructure\"\n");
    push_node(&mut out, &cameras);
    push_node(&mut out, &nvr_node);
    push_node(&mut out, "AI_Training[\"AI Training<br/>(On-Premise)\"]");
    push_node(&mut out, &inference);
    push_node(&mut out, &internet);
    out.push_str("    end\n\n");
    out.push_str("    subgraph \"Cloud Infrastructure\"\n");
    push_node(&mut out, "Online_Dashboard[\"Online Dashboard<br/>(Cloud)\"]");
    push_node(&mut out, &alert);
    out.push_str("    end\n\n");
    out.push_str(&modules.subgraph);
    out.push_str(&camera_edges);
    out.push_str("    AI_Training -->|Trained Models| AI_Inference\n");
    out.push_str("    AI_Inference -->|Detection Results| Online_Dashboard\n");
    out.push_str("    AI_Inference -->|Alerts| Alert\n");
    out.push_str("    Internet -->|API| Online_Dashboard\n");
    out.push_str(&modules.connections);
    out.push_str(
        "    style AI_Training fill:#e1f5ff,stroke:#01579b,stroke-width:2px,color:#000000\n\
         \x20   style AI_Inference fill:#81d4fa,stroke:#0277bd,stroke-width:2px,color:#000000\n\
         \x20   style Online_Dashboard fill:#fff4e1,stroke:#e65100,stroke-width:2px,color:#000000\n\
         \x20   style Alert fill:#f3e5f5,stroke:#7b1fa2,stroke-width:2px,color:#000000\n\
         \x20   style Internet fill:#e8f5e9,stroke:#2e7d32,stroke-width:2px,color:#000000\n\
         \x20   style Cameras fill:#ffffff,stroke:#424242,stroke-width:2px,color:#000000\n",
    );
    out.push_str(&modules.styles);
    out
}

/// 4G VPN bridge: auto-registering cellular cameras tunnel into a central
/// recorder; processing and dashboard are central.
pub(crate) fn four_g_vpn_bridge(p: &RenderParams) -> String {
    let count = p.camera_count.unwrap_or(BRIDGE_CAMERAS);
    let modules = ModuleBlock::build(p, "AI_Processing");
    let processing = match &modules.inline {
        Some(inline) => format!("AI_Processing[\"AI Processing<br/>{inline}\"]"),
        None => "AI_Processing[\"AI Processing\"]".to_owned(),
    };
    let alert = alert_node(&p.alert_channels, "Email & Mobile");

    let mut out = String::new();
    out.push_str("graph TB\n");
    out.push_str("    subgraph \"Remote Sites\"\n");
    push_node(
        &mut out,
        &format!("Cameras[\"Up to {count} Cameras<br/>4G/5G Enabled<br/>Auto-Registration\"]"),
    );
    push_node(
        &mut out,
        "SIM_Cards[\"4G SIM Cards<br/>Per Camera<br/>15 Mbps Uplink<br/>2TB/Month\"]",
    );
    out.push_str("    end\n\n");
    out.push_str("    subgraph \"Central Infrastructure\"\n");
    push_node(&mut out, "NVR_Central[\"Central NVR<br/>(Static IP)<br/>Auto-Registration\"]");
    push_node(&mut out, "VPN_Bridge[\"VPN Bridge<br/>4G/5G Connection\"]");
    push_node(&mut out, &processing);
    push_node(&mut out, "Dashboard[\"Central Dashboard\"]");
    push_node(&mut out, &alert);
    out.push_str("    end\n\n");
    out.push_str("    Cameras -->|4G/5G RTSP| SIM_Cards\n");
    out.push_str("    SIM_Cards -->|Auto-Register| VPN_Bridge\n");
    out.push_str("    VPN_Bridge -->|VPN Tunnel| NVR_Central\n");
    out.push_str("    NVR_Central -->|RTSP Links| AI_Processing\n");
    out.push_str("    AI_Processing -->|Detection Results| Dashboard\n");
    out.push_str("    AI_Processing -->|Alerts| Alert\n\n");
    out.push_str(
        "    style Cameras fill:#ffffff,stroke:#424242,stroke-width:2px,color:#000000\n\
         \x20   style SIM_Cards fill:#e3f2fd,stroke:#1976d2,stroke-width:2px,color:#000000\n\
         \x20   style VPN_Bridge fill:#e8f5e9,stroke:#2e7d32,stroke-width:3px,color:#000000\n\
         \x20   style NVR_Central fill:#fff4e1,stroke:#e65100,stroke-width:2px,color:#000000\n\
         \x20   style AI_Processing fill:#81d4fa,stroke:#0277bd,stroke-width:2px,color:#000000\n\
         \x20   style Dashboard fill:#fff4e1,stroke:#e65100,stroke-width:2px,color:#000000\n\
         \x20   style Alert fill:#f3e5f5,stroke:#7b1fa2,stroke-width:2px,color:#000000\n",
    );
    out
}

/// Mobile units: battery/solar powered cameras feeding a portable AI unit
/// with opportunistic cloud sync.
pub(crate) fn vimov(p: &RenderParams) -> String {
    let count = p.camera_count.unwrap_or(MOBILE_CAMERAS);
    let modules = ModuleBlock::build(p, "Mobile_AI");
    let mobile_ai = match &modules.inline {
        Some(inline) => format!("Mobile_AI[\"Mobile AI Unit<br/>{inline}\"]"),
        None => "Mobile_AI[\"Mobile AI Unit\"]".to_owned(),
    };
    let alert = alert_node(&p.alert_channels, "Mobile & SMS");

    let mut out = String::new();
    out.push_str("graph TB\n");
    out.push_str("    subgraph \"Mobile Site\"\n");
    push_node(
        &mut out,
        &format!("Cameras[\"Portable/Mobile Cameras<br/>{count} Units<br/>Battery/Solar Powered\"]"),
    );
    push_node(&mut out, &mobile_ai);
    out.push_str("    end\n\n");
    out.push_str("    subgraph \"Cloud (Optional)\"\n");
    push_node(&mut out, "Cloud_Sync[\"Cloud Sync<br/>(When Internet Available)\"]");
    push_node(&mut out, "Dashboard[\"Mobile Dashboard\"]");
    push_node(&mut out, &alert);
    out.push_str("    end\n\n");
    out.push_str("    Cameras -->|RTSP/WiFi| Mobile_AI\n");
    out.push_str("    Mobile_AI -->|Detection Results| Alert\n");
    out.push_str("    Mobile_AI -.->|Sync (When Online)| Cloud_Sync\n");
    out.push_str("    Cloud_Sync -->|Data| Dashboard\n\n");
    out.push_str(
        "    style Cameras fill:#ffffff,stroke:#424242,stroke-width:2px,color:#000000\n\
         \x20   style Mobile_AI fill:#81d4fa,stroke:#0277bd,stroke-width:3px,color:#000000\n\
         \x20   style Cloud_Sync fill:#e8f5e9,stroke:#2e7d32,stroke-width:2px,color:#000000,stroke-dasharray: 5 5\n\
         \x20   style Dashboard fill:#fff4e1,stroke:#e65100,stroke-width:2px,color:#000000\n\
         \x20   style Alert fill:#f3e5f5,stroke:#7b1fa2,stroke-width:2px,color:#000000\n",
    );
    out
}

/// Inline list, subgraph, and styling for the AI module names.
///
/// Compact mode folds the module names into the inference node label;
/// otherwise an "AI Modules" subgraph hangs off the parent node, one
/// `Mod_N` node per module.
struct ModuleBlock {
    inline: Option<String>,
    subgraph: String,
    connections: String,
    styles: String,
}

impl ModuleBlock {
    fn build(p: &RenderParams, parent: &str) -> Self {
        if p.module_names.is_empty() {
            return Self::empty();
        }

        if p.compact {
            let inline = p
                .module_names
                .iter()
                .map(|m| short_label(m, p.max_module_label_chars))
                .collect::<Vec<_>>()
                .join("<br/>");
            return Self {
                inline: Some(inline),
                subgraph: String::new(),
                connections: String::new(),
                styles: String::new(),
            };
        }

        if !p.list_modules {
            return Self::empty();
        }

        let mut nodes = String::new();
        let mut connections = String::new();
        let mut styles = String::new();
        for (i, module) in p.module_names.iter().enumerate() {
            let n = i.saturating_add(1);
            nodes.push_str(&format!("        Mod_{n}[\"{}\"]\n", module.trim()));
            connections.push_str(&format!("    {parent} --> Mod_{n}\n"));
            styles.push_str(&format!("    class Mod_{n} aiModuleStyle\n"));
        }

        Self {
            inline: None,
            subgraph: format!(
                "    subgraph \"AI Modules\"\n        direction LR\n{nodes}    end\n\n"
            ),
            connections,
            styles: format!(
                "    classDef aiModuleStyle fill:#f5f5f5,stroke:#616161,stroke-width:2px,color:#000000\n{styles}"
            ),
        }
    }

    fn empty() -> Self {
        Self {
            inline: None,
            subgraph: String::new(),
            connections: String::new(),
            styles: String::new(),
        }
    }
}

fn inference_node(base: &str, modules: &ModuleBlock) -> String {
    match &modules.inline {
        Some(inline) => format!("AI_Inference[\"{base}<br/>{inline}\"]"),
        None => format!("AI_Inference[\"{base}\"]"),
    }
}

fn camera_node(count: u32) -> String {
    format!("Cameras[\"Up to {count} Cameras<br/>IP-based Camera\"]")
}

fn alert_node(channels: &[String], default: &str) -> String {
    let label = if channels.is_empty() {
        default.to_owned()
    } else {
        channels.join(" & ")
    };
    format!("Alert[\"Alert/Notification<br/>({label})\"]")
}

/// NVR node and the camera edge chain for fixed-site diagrams.
fn recorder_block(include_recorder: bool, sink: &str) -> (String, String) {
    if include_recorder {
        (
            "NVR[\"Network Video Recorder<br/>(NVR)*\"]".to_owned(),
            format!("    Cameras -->|RTSP Links| NVR\n    NVR -->|RTSP Links| {sink}\n"),
        )
    } else {
        (String::new(), format!("    Cameras -->|RTSP Links| {sink}\n"))
    }
}

fn push_node(out: &mut String, node: &str) {
    if node.is_empty() {
        return;
    }
    out.push_str("        ");
    out.push_str(node);
    out.push('\n');
}

/// Shorten a module name for inline display: drop a trailing
/// parenthetical, then truncate with an ellipsis.
fn short_label(name: &str, max_chars: usize) -> String {
    let trimmed = name.trim();
    let without_suffix = match (trimmed.rfind('('), trimmed.ends_with(')')) {
        (Some(open), true) => trimmed.get(..open).unwrap_or(trimmed).trim_end(),
        _ => trimmed,
    };

    if without_suffix.chars().count() <= max_chars {
        return without_suffix.to_owned();
    }
    let keep = max_chars.saturating_sub(3);
    let mut short: String = without_suffix.chars().take(keep).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_label_strips_parenthetical() {
        assert_eq!(
            short_label("Safety Helmet Detection (PPE)", 50),
            "Safety Helmet Detection"
        );
        assert_eq!(short_label("  Smoking Detection  ", 50), "Smoking Detection");
    }

    #[test]
    fn test_short_label_truncates_long_names() {
        let long = "Extremely Verbose Module Name That Keeps Going And Going";
        let short = short_label(long, 20);
        assert_eq!(short.chars().count(), 20);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_default_camera_counts() {
        let p = RenderParams {
            camera_count: None,
            module_names: vec![],
            alert_channels: vec![],
            include_recorder: false,
            internet_type: None,
            compact: true,
            list_modules: true,
            max_module_label_chars: 50,
        };
        assert!(on_prem(&p).contains("Up to 8 Cameras"));
        assert!(four_g_vpn_bridge(&p).contains("Up to 5 Cameras"));
        assert!(vimov(&p).contains("3 Units"));
    }

    #[test]
    fn test_alert_defaults_per_topology() {
        let p = RenderParams {
            camera_count: None,
            module_names: vec![],
            alert_channels: vec![],
            include_recorder: false,
            internet_type: None,
            compact: true,
            list_modules: true,
            max_module_label_chars: 50,
        };
        assert!(on_prem(&p).contains("(Email & Dashboard)"));
        assert!(four_g_vpn_bridge(&p).contains("(Email & Mobile)"));
        assert!(vimov(&p).contains("(Mobile & SMS)"));
    }

    #[test]
    fn test_cloud_recorder_style_only_when_present() {
        let mut p = RenderParams {
            camera_count: Some(10),
            module_names: vec![],
            alert_channels: vec![],
            include_recorder: true,
            internet_type: None,
            compact: true,
            list_modules: true,
            max_module_label_chars: 50,
        };
        let with = cloud(&p);
        assert!(with.contains("NVR[\"NVR\"]"));
        assert!(with.contains("style NVR"));

        p.include_recorder = false;
        let without = cloud(&p);
        assert!(!without.contains("NVR"));
    }

    #[test]
    fn test_hybrid_links_training_to_inference() {
        let p = RenderParams {
            camera_count: Some(10),
            module_names: vec!["Smoke Detection".to_owned()],
            alert_channels: vec!["Email".to_owned()],
            include_recorder: true,
            internet_type: Some("Fiber".to_owned()),
            compact: true,
            list_modules: true,
            max_module_label_chars: 50,
        };
        let diagram = hybrid(&p);
        assert!(diagram.contains("Cloud_Training -.->|Updated Models| AI_Inference"));
        assert!(diagram.contains("Internet Connection<br/>(Fiber)"));
        let local = hybrid_training_local(&p);
        assert!(local.contains("AI_Training -->|Trained Models| AI_Inference"));
        assert!(local.contains("Dashboard Access Only"));
    }
}
