//! Deal-transfer document scraping.
//!
//! Deal transfers arrive as loosely structured questionnaires ("Does
//! client have stable internet connection? Answer: ..."). The scraper is
//! deliberately lenient: anything it cannot find stays at its default and
//! the classifier's conservative fallback takes over. Keyword matching is
//! preferred over patterns; compiled patterns are reserved for captures.

use regex::Regex;

use super::sections;
use super::{
    ConnectionType, DeploymentHint, ExtractError, InternetSignals, MobilitySignals, ProjectFacts,
    SecuritySignals, SignalBag, TrainingLocation, MAX_MODULES,
};

/// Scrapes a deal-transfer document into [`ProjectFacts`] and a [`SignalBag`].
///
/// Construction compiles the capture patterns once; [`scrape`](Self::scrape)
/// itself is infallible.
pub struct DealTransferScraper {
    project_name: Vec<Regex>,
    client_name: Vec<Regex>,
    camera_count: Vec<Regex>,
    va_use_case_list: Regex,
    module_catalog: Regex,
    bandwidth_mbps: Regex,
    cellular_sim: Regex,
    vpn_autoregistration: Regex,
    high_mobility: Regex,
    training_local: Regex,
    hybrid_inference_local: Regex,
    multi_site: Regex,
    fourg_vpn_hint: Regex,
}

impl DealTransferScraper {
    /// Compile the scraping patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if any pattern fails to compile.
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            project_name: vec![
                Regex::new(r"(?im)^project\s*name\s*:\s*(.+)$")?,
                Regex::new(r"(?im)^project\s*:\s*(.+)$")?,
                Regex::new(r"(?im)^client\s*:\s*(.+)$")?,
            ],
            client_name: vec![
                Regex::new(r"(?im)^client\s*name\s*:\s*(.+)$")?,
                Regex::new(r"(?im)^customer\s*:\s*(.+)$")?,
                Regex::new(r"(?im)^project\s*owner\s*:\s*(.+)$")?,
            ],
            camera_count: vec![
                Regex::new(r"(?i)camera[^\n]*?(\d+)\s*cameras?")?,
                Regex::new(r"(?i)number of cameras[:\s]+(\d+)")?,
                Regex::new(r"(?i)(\d+)\s*cameras?")?,
            ],
            va_use_case_list: Regex::new(r"(?i)list of va use cases[:?]\s*\n((?:\d+\.[^\n]*\n?)+)")?,
            module_catalog: Regex::new(
                r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:Detection|Monitoring|Recognition|Management|Counting))",
            )?,
            bandwidth_mbps: Regex::new(r"(?i)(\d+)\s*mbps")?,
            cellular_sim: Regex::new(r"(?i)4g[^\n]*?sim")?,
            vpn_autoregistration: Regex::new(r"(?i)(?:4g|5g)[^\n]*?auto[^\n]*?regist|vpn[^\n]*?bridge")?,
            high_mobility: Regex::new(r"(?i)vimov|high[^\n]*?mobility|temporary[^\n]*?setup")?,
            training_local: Regex::new(r"(?i)training[^\n]*?(?:local|on.prem|at[^\n]*?site)")?,
            hybrid_inference_local: Regex::new(
                r"(?i)hybrid[^\n]*?inference[^\n]*?local|inference[^\n]*?local[^\n]*?training[^\n]*?cloud",
            )?,
            multi_site: Regex::new(r"(?i)multi.?site|multiple[^\n]*?site|local[^\n]*?dashboard")?,
            fourg_vpn_hint: Regex::new(r"(?i)4g[^\n]*?vpn|vpn[^\n]*?bridge")?,
        })
    }

    /// Scrape a deal-transfer document.
    ///
    /// `fallback_name` (usually the source file stem) is used when no
    /// project name can be found in the text.
    pub fn scrape(&self, content: &str, fallback_name: &str) -> (ProjectFacts, SignalBag) {
        let lower = content.to_lowercase();

        let internet = self.internet_signals(content);
        let security = security_signals(content);
        let mobility = self.mobility_signals(&lower);
        let explicit_hint = self.deployment_hint(content, &lower);

        let training_location = if self.training_local.is_match(content) {
            Some(TrainingLocation::Local)
        } else {
            None
        };

        let bag = SignalBag {
            explicit_hint,
            internet: internet.clone(),
            security,
            mobility,
            training_location,
            multi_site_local_dashboards: self.multi_site.is_match(content),
            recorder_hint: recorder_hint(&lower),
        };

        let facts = ProjectFacts {
            project_name: self
                .first_capture(&self.project_name, content)
                .unwrap_or_else(|| fallback_name.to_owned()),
            client_name: self
                .first_capture(&self.client_name, content)
                .unwrap_or_else(|| "Client".to_owned()),
            camera_count: self.camera_number(content),
            modules: self.ai_modules(content),
            alert_channels: alert_channels(content),
            internet_type: internet.connection_type.map(|t| t.label().to_owned()),
        };

        (facts, bag)
    }

    fn first_capture(&self, patterns: &[Regex], content: &str) -> Option<String> {
        patterns.iter().find_map(|re| {
            re.captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_owned())
                .filter(|s| !s.is_empty())
        })
    }

    fn camera_number(&self, content: &str) -> Option<u32> {
        self.camera_count.iter().find_map(|re| {
            re.captures(content)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
    }

    /// Pull the AI module list from the "List of VA use cases" block, with
    /// two fallbacks: a named section scan, then a catalog-style sweep for
    /// "<Name> Detection/Monitoring/..." phrases anywhere in the text.
    fn ai_modules(&self, content: &str) -> Vec<String> {
        let mut modules: Vec<String> = Vec::new();

        if let Some(captures) = self.va_use_case_list.captures(content) {
            if let Some(block) = captures.get(1) {
                modules = sections::numbered_items(block.as_str())
                    .into_iter()
                    .filter(|m| is_plausible_module_name(m))
                    .collect();
            }
        }

        if modules.is_empty() {
            let section = sections::qa_section(content, "list of va use cases")
                .or_else(|| sections::qa_section(content, "ai modules"))
                .or_else(|| sections::qa_section(content, "ai use cases"));
            if let Some(text) = section {
                modules = sections::numbered_items(&text)
                    .into_iter()
                    .filter(|m| is_plausible_module_name(m))
                    .collect();
            }
        }

        if modules.is_empty() {
            for m in self.module_catalog.find_iter(content) {
                let name = m.as_str().to_owned();
                if !modules.contains(&name) {
                    modules.push(name);
                }
            }
        }

        modules.truncate(MAX_MODULES);
        modules
    }

    fn internet_signals(&self, content: &str) -> InternetSignals {
        let mut internet = InternetSignals::default();

        let Some(answer) = sections::qa_section(content, "stable internet connection") else {
            return internet;
        };
        let answer_lower = answer.to_lowercase();

        if has_word(&answer_lower, "yes")
            || has_word(&answer_lower, "stable")
            || has_word(&answer_lower, "fiber")
            || answer_lower.contains("24/24")
        {
            internet.has_connection = true;
            internet.is_stable = true;

            if has_word(&answer_lower, "fiber") {
                internet.connection_type = Some(ConnectionType::Fiber);
            } else if has_word(&answer_lower, "4g") || has_word(&answer_lower, "5g") {
                internet.connection_type = Some(ConnectionType::Cellular);
            } else if has_word(&answer_lower, "satellite") {
                internet.connection_type = Some(ConnectionType::Satellite);
                internet.bandwidth_mbps = self
                    .bandwidth_mbps
                    .captures(&answer)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok());
            }
        } else if has_word(&answer_lower, "no")
            || has_word(&answer_lower, "unstable")
            || has_word(&answer_lower, "limited")
        {
            internet.has_connection = false;
            internet.is_stable = false;
        }

        internet
    }

    fn mobility_signals(&self, lower: &str) -> MobilitySignals {
        let remote_site = has_word(lower, "remote")
            || has_word(lower, "rural")
            || has_word(lower, "mobile")
            || has_word(lower, "temporary")
            || self.cellular_sim.is_match(lower);

        MobilitySignals {
            is_remote_or_temporary: remote_site,
            is_high_mobility: self.high_mobility.is_match(lower),
            has_vpn_autoregistration: self.vpn_autoregistration.is_match(lower),
        }
    }

    /// Find an operator-stated deployment preference.
    ///
    /// Whole-content hybrid mentions are checked before the deployment
    /// section: a sales doc that says "hybrid" anywhere means it.
    fn deployment_hint(&self, content: &str, lower: &str) -> Option<DeploymentHint> {
        if self.hybrid_inference_local.is_match(content) {
            return Some(DeploymentHint::Hybrid);
        }
        if has_word(lower, "hybrid") && self.training_local.is_match(content) {
            return Some(DeploymentHint::HybridTrainingLocal);
        }
        if has_word(lower, "hybrid") {
            return Some(DeploymentHint::Hybrid);
        }

        let section = sections::qa_section(content, "deployment method")
            .or_else(|| sections::qa_section(content, "hw/sw requirements"))?;
        let section_lower = section.to_lowercase();

        if section_lower.contains("cloud") {
            Some(DeploymentHint::Cloud)
        } else if section_lower.contains("on-prem") || section_lower.contains("on premise") {
            Some(DeploymentHint::OnPrem)
        } else if self.fourg_vpn_hint.is_match(&section) {
            Some(DeploymentHint::FourGVpnBridge)
        } else if section_lower.contains("vimov") {
            Some(DeploymentHint::Vimov)
        } else {
            None
        }
    }
}

fn security_signals(content: &str) -> SecuritySignals {
    let mut security = SecuritySignals::default();

    let gdpr = sections::qa_section(content, "gdpr")
        .or_else(|| sections::qa_section(content, "data privacy"));
    if let Some(answer) = gdpr {
        let lower = answer.to_lowercase();
        if has_word(&lower, "yes")
            || has_word(&lower, "required")
            || has_word(&lower, "follow")
            || has_word(&lower, "comply")
        {
            security.has_data_privacy_mandate = true;
        }
    }

    let deployment = sections::qa_section(content, "deployment method")
        .or_else(|| sections::qa_section(content, "hw/sw requirements"));
    if let Some(answer) = deployment {
        let lower = answer.to_lowercase();
        if lower.contains("on-prem") || lower.contains("on premise") || has_word(&lower, "local") {
            security.prefers_local_processing = true;
        }
    }

    security
}

fn alert_channels(content: &str) -> Vec<String> {
    let section = sections::qa_section(content, "alert")
        .or_else(|| sections::qa_section(content, "notification"));

    let mut alerts = Vec::new();
    if let Some(answer) = section {
        let lower = answer.to_lowercase();
        if lower.contains("email") {
            alerts.push("Email".to_owned());
        }
        if lower.contains("dashboard") {
            alerts.push("Dashboard".to_owned());
        }
        if lower.contains("mobile") || has_word(&lower, "sms") {
            alerts.push("Mobile".to_owned());
        }
        if lower.contains("telegram") {
            alerts.push("Telegram".to_owned());
        }
    }

    if alerts.is_empty() {
        alerts = vec!["Email".to_owned(), "Dashboard".to_owned()];
    }
    alerts
}

fn recorder_hint(lower: &str) -> Option<bool> {
    if lower.contains("no nvr") || lower.contains("without nvr") {
        return Some(false);
    }
    if has_word(lower, "nvr") || lower.contains("network video recorder") {
        return Some(true);
    }
    None
}

/// Whole-word check on lowercased text (`no` must not match `notification`).
fn has_word(lower: &str, word: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}

/// Reject list entries that are clearly not module names: follow-on answer
/// text, other questionnaire fields, or truncated noise.
fn is_plausible_module_name(name: &str) -> bool {
    if name.len() < 4 || name.len() >= 200 {
        return false;
    }
    let lower = name.to_lowercase();
    if lower.starts_with("answer:") {
        return false;
    }
    !["camera", "deployment", "internet", "gdpr", "number"]
        .iter()
        .any(|skip| lower.contains(skip))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
Project: Port Terminal Safety
Client Name: Acme Terminals
Camera: total 12 cameras across two gates

List of VA use cases:
1. Safety Helmet Detection
2. Safety Vest Detection
3. Smoking Detection

Does client have stable internet connection?
Answer: Yes, fiber 24/24

Any GDPR or data privacy requirements?
Answer: No

Alert channels: email and dashboard
";

    fn scraper() -> DealTransferScraper {
        DealTransferScraper::new().expect("patterns compile")
    }

    #[test]
    fn test_scrape_facts() {
        let (facts, _) = scraper().scrape(FIXTURE, "fallback");
        assert_eq!(facts.project_name, "Port Terminal Safety");
        assert_eq!(facts.client_name, "Acme Terminals");
        assert_eq!(facts.camera_count, Some(12));
        assert_eq!(
            facts.modules,
            vec![
                "Safety Helmet Detection",
                "Safety Vest Detection",
                "Smoking Detection"
            ]
        );
        assert_eq!(facts.alert_channels, vec!["Email", "Dashboard"]);
        assert_eq!(facts.internet_type.as_deref(), Some("Fiber"));
    }

    #[test]
    fn test_scrape_internet_signals() {
        let (_, bag) = scraper().scrape(FIXTURE, "fallback");
        assert!(bag.internet.has_connection);
        assert!(bag.internet.is_stable);
        assert_eq!(bag.internet.connection_type, Some(ConnectionType::Fiber));
        assert!(!bag.security.has_data_privacy_mandate);
        assert!(bag.explicit_hint.is_none());
    }

    #[test]
    fn test_no_internet_answer() {
        let doc = "Does client have stable internet connection?\nAnswer: No, site is offline\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert!(!bag.internet.has_connection);
        assert!(!bag.internet.is_stable);
    }

    #[test]
    fn test_satellite_bandwidth_captured() {
        let doc =
            "Does client have stable internet connection?\nAnswer: Yes, satellite link 25 Mbps\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert_eq!(bag.internet.connection_type, Some(ConnectionType::Satellite));
        assert_eq!(bag.internet.bandwidth_mbps, Some(25));
    }

    #[test]
    fn test_gdpr_yes_sets_mandate() {
        let doc = "Any GDPR or data privacy requirements?\nAnswer: Yes, must comply\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert!(bag.security.has_data_privacy_mandate);
    }

    #[test]
    fn test_on_prem_preference_in_deployment_section() {
        let doc = "Any specific HW/SW requirements such as deployment method?\n\
                   Answer: strong preference for on-premise\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert!(bag.security.prefers_local_processing);
        assert_eq!(bag.explicit_hint, Some(DeploymentHint::OnPrem));
    }

    #[test]
    fn test_hybrid_mention_wins_over_section() {
        let doc = "We discussed a hybrid setup.\nDeployment method: cloud\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert_eq!(bag.explicit_hint, Some(DeploymentHint::Hybrid));
    }

    #[test]
    fn test_hybrid_with_local_training_refines() {
        let doc = "Hybrid deployment, training at site, dashboard in cloud.\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert_eq!(bag.explicit_hint, Some(DeploymentHint::HybridTrainingLocal));
        assert_eq!(bag.training_location, Some(TrainingLocation::Local));
    }

    #[test]
    fn test_mobility_signals() {
        let doc = "Remote quarry site, cameras on 4G SIM cards with auto-registration to VPN.\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert!(bag.mobility.is_remote_or_temporary);
        assert!(bag.mobility.has_vpn_autoregistration);
    }

    #[test]
    fn test_high_mobility_signal() {
        let doc = "Vehicle-mounted units, high mobility, solar powered.\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert!(bag.mobility.is_high_mobility);
    }

    #[test]
    fn test_multi_site_flag() {
        let doc = "Three plants, multiple sites each with a local dashboard.\n";
        let (_, bag) = scraper().scrape(doc, "x");
        assert!(bag.multi_site_local_dashboards);
    }

    #[test]
    fn test_recorder_hint() {
        let (_, with) = scraper().scrape("Existing NVR on site.\n", "x");
        assert_eq!(with.recorder_hint, Some(true));
        let (_, without) = scraper().scrape("Setup without NVR please.\n", "x");
        assert_eq!(without.recorder_hint, Some(false));
        let (_, silent) = scraper().scrape("Nothing about recorders.\n", "x");
        assert_eq!(silent.recorder_hint, None);
    }

    #[test]
    fn test_module_catalog_fallback() {
        let doc = "The site needs Smoking Detection and People Counting coverage.\n";
        let (facts, _) = scraper().scrape(doc, "x");
        assert!(facts.modules.contains(&"Smoking Detection".to_owned()));
        assert!(facts.modules.contains(&"People Counting".to_owned()));
    }

    #[test]
    fn test_fallback_names() {
        let (facts, _) = scraper().scrape("empty doc\n", "Deal_Transfer_Shell");
        assert_eq!(facts.project_name, "Deal_Transfer_Shell");
        assert_eq!(facts.client_name, "Client");
        assert_eq!(facts.camera_count, None);
    }
}
