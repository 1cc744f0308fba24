//! Proposal-template scraping.
//!
//! Filled proposal templates are markdown with `**Field:** value` markers
//! and numbered `## n. SECTION` headings. Unlike the deal-transfer path,
//! this scraper is strict: a template that reached this stage has been
//! through review, so missing required fields and leftover placeholders
//! are errors, never silently defaulted.

use regex::Regex;

use super::sections;
use super::{
    ConnectionType, DeploymentHint, ExtractError, InternetSignals, ProjectFacts, SignalBag,
    MAX_MODULES,
};

/// Scrapes a filled proposal template into [`ProjectFacts`] and a [`SignalBag`].
pub struct ProposalScraper {
    proposal_title: Regex,
    client_name: Vec<Regex>,
    camera_field: Vec<Regex>,
    camera_inline: Regex,
    ai_modules_block: Regex,
    deployment_field: Regex,
    internet_confirmed: Regex,
    internet_kind: Regex,
    nvr_optional: Regex,
}

impl ProposalScraper {
    /// Compile the scraping patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if any pattern fails to compile.
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            proposal_title: Regex::new(r"(?i)\*\*Proposal Title:?\*\*:?\s*([^\n]+)")?,
            client_name: vec![
                Regex::new(r"(?i)\*\*Client Name:?\*\*:?\s*([^\n]+)")?,
                Regex::new(r"(?i)\*\*Project Owner:?\*\*:?\s*([^\n]+)")?,
            ],
            camera_field: vec![
                Regex::new(r"(?i)\*\*Camera Number:?\*\*:?\s*(\d+)")?,
                Regex::new(r"(?i)Camera\s+Number[^\n]*?(\d+)")?,
            ],
            camera_inline: Regex::new(r"(?i)(\d+)\s*(?:IP\s+)?cameras?\s*(?:\(|at|total|IP)")?,
            ai_modules_block: Regex::new(
                r"(?is)\*\*AI Modules:?\*\*:?[^\n]*\n((?:\s*(?:\d+\.|[-*•])[^\n]*\n?)+)",
            )?,
            deployment_field: Regex::new(r"(?i)\*\*Deployment Method:?\*\*:?\s*([^\n]+)")?,
            internet_confirmed: Regex::new(
                r"(?i)internet connection[^\n]*?(?:required|confirmed|yes|stable)",
            )?,
            internet_kind: Regex::new(r"(?i)\b(4G|5G|WiFi|Wi-Fi|Ethernet|Fiber|Satellite|Broadband)\b")?,
            nvr_optional: Regex::new(r"(?i)NVR[^\n]*optional|optional[^\n]*NVR|NVR[^\n]*\*")?,
        })
    }

    /// Scrape a proposal template.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnresolvedPlaceholders`] when the template
    /// still carries `[SECTION_001]`-style markers, and
    /// [`ExtractError::MissingFields`] when the client name, deployment
    /// method, camera count, or AI module list cannot be found.
    pub fn scrape(
        &self,
        content: &str,
        fallback_name: &str,
    ) -> Result<(ProjectFacts, SignalBag), ExtractError> {
        reject_placeholders(content)?;

        let client_name = self.client_name(content);
        let camera_count = self.camera_number(content);
        let modules = self.ai_modules(content);
        let explicit_hint = self.deployment_hint(content);

        let mut missing: Vec<&'static str> = Vec::new();
        if client_name.is_none() {
            missing.push("client name");
        }
        if explicit_hint.is_none() {
            missing.push("deployment method");
        }
        if camera_count.is_none() {
            missing.push("camera number");
        }
        if modules.is_empty() {
            missing.push("AI modules");
        }
        if !missing.is_empty() {
            return Err(ExtractError::MissingFields { fields: missing });
        }

        let internet = self.internet_signals(content);

        let facts = ProjectFacts {
            project_name: self.project_name(content, fallback_name),
            client_name: client_name.unwrap_or_default(),
            camera_count,
            modules,
            alert_channels: alert_channels(content),
            internet_type: self.internet_type_label(content),
        };

        let bag = SignalBag {
            explicit_hint,
            internet,
            recorder_hint: self.recorder_hint(content),
            ..SignalBag::default()
        };

        Ok((facts, bag))
    }

    fn project_name(&self, content: &str, fallback_name: &str) -> String {
        if let Some(c) = self.proposal_title.captures(content) {
            if let Some(m) = c.get(1) {
                return m.as_str().trim().to_owned();
            }
        }
        sections::title_heading(content)
            .map(|t| strip_title_suffix(&t))
            .unwrap_or_else(|| fallback_name.to_owned())
    }

    fn client_name(&self, content: &str) -> Option<String> {
        self.client_name.iter().find_map(|re| {
            re.captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_owned())
                .filter(|s| !s.is_empty())
        })
    }

    fn camera_number(&self, content: &str) -> Option<u32> {
        let field = self.camera_field.iter().find_map(|re| {
            re.captures(content)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        });
        field.or_else(|| {
            self.camera_inline
                .captures(content)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
    }

    /// Pull AI modules from the `**AI Modules:**` block — numbered or
    /// bulleted — preferring the PROJECT REQUIREMENT STATEMENT section,
    /// then the whole document.
    fn ai_modules(&self, content: &str) -> Vec<String> {
        let requirement = sections::markdown_section(content, "PROJECT REQUIREMENT STATEMENT");

        let mut modules = requirement
            .as_deref()
            .map(|section| self.modules_from(section))
            .unwrap_or_default();

        if modules.is_empty() {
            modules = self.modules_from(content);
        }

        modules.truncate(MAX_MODULES);
        modules
    }

    fn modules_from(&self, text: &str) -> Vec<String> {
        let Some(block) = self
            .ai_modules_block
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
        else {
            return Vec::new();
        };

        let numbered = sections::numbered_items(block);
        let items = if numbered.is_empty() {
            sections::bullet_items(block)
        } else {
            numbered
        };
        items
            .into_iter()
            .filter(|m| is_valid_module_name(m))
            .collect()
    }

    /// The proposal's deployment method, read as an explicit hint.
    ///
    /// Checked in order: the SYSTEM ARCHITECTURE section, the
    /// `**Deployment Method:**` field, then a whole-document keyword scan
    /// (logged as a warning — the field should have been filled in).
    fn deployment_hint(&self, content: &str) -> Option<DeploymentHint> {
        if let Some(section) = sections::markdown_section(content, "SYSTEM ARCHITECTURE") {
            if let Some(hint) = keyword_hint(&section) {
                return Some(hint);
            }
        }

        if let Some(value) = self
            .deployment_field
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
        {
            if let Some(hint) = keyword_hint(value) {
                return Some(hint);
            }
        }

        let inferred = keyword_hint(content);
        if let Some(hint) = inferred {
            tracing::warn!(
                ?hint,
                "deployment method not explicitly stated, inferred from content"
            );
        }
        inferred
    }

    fn internet_signals(&self, content: &str) -> InternetSignals {
        let mut internet = InternetSignals::default();
        if !self.internet_confirmed.is_match(content) {
            return internet;
        }
        internet.has_connection = true;
        internet.is_stable = true;
        internet.connection_type = self
            .internet_kind
            .find(content)
            .map(|m| match m.as_str().to_lowercase().as_str() {
                "fiber" => ConnectionType::Fiber,
                "4g" | "5g" => ConnectionType::Cellular,
                "satellite" => ConnectionType::Satellite,
                _ => ConnectionType::Other,
            });
        internet
    }

    fn internet_type_label(&self, content: &str) -> Option<String> {
        if !self.internet_confirmed.is_match(content) {
            return None;
        }
        self.internet_kind
            .find(content)
            .map(|m| m.as_str().to_owned())
    }

    fn recorder_hint(&self, content: &str) -> Option<bool> {
        let lower = content.to_lowercase();
        if !lower.contains("nvr") && !lower.contains("network video recorder") {
            return None;
        }
        if let Some(section) = sections::markdown_section(content, "SYSTEM ARCHITECTURE") {
            if self.nvr_optional.is_match(&section) {
                return Some(false);
            }
        }
        Some(true)
    }
}

fn reject_placeholders(content: &str) -> Result<(), ExtractError> {
    let placeholders = sections::find_placeholders(content);
    if placeholders.is_empty() {
        return Ok(());
    }
    let count = placeholders.len();
    let mut samples: Vec<String> = Vec::new();
    for p in placeholders {
        if !samples.contains(&p) {
            samples.push(p);
        }
        if samples.len() >= 10 {
            break;
        }
    }
    Err(ExtractError::UnresolvedPlaceholders { count, samples })
}

fn keyword_hint(text: &str) -> Option<DeploymentHint> {
    let lower = text.to_lowercase();
    if lower.contains("cloud-based") || lower.contains("on-cloud") || lower.contains("cloud") {
        Some(DeploymentHint::Cloud)
    } else if lower.contains("on-premise") || lower.contains("on-prem") || lower.contains("on premise")
    {
        Some(DeploymentHint::OnPrem)
    } else if lower.contains("hybrid") {
        Some(DeploymentHint::Hybrid)
    } else {
        None
    }
}

fn alert_channels(content: &str) -> Vec<String> {
    let section = sections::markdown_section(content, "Alerts & Notifications")
        .or_else(|| sections::markdown_section(content, "Alert"));

    let haystack = section.as_deref().unwrap_or(content);
    let lower = haystack.to_lowercase();

    let mut alerts = Vec::new();
    for (keyword, label) in [
        ("email", "Email"),
        ("telegram", "Telegram"),
        ("dashboard", "Dashboard"),
        ("mobile", "Mobile"),
        ("sms", "SMS"),
        ("whatsapp", "WhatsApp"),
    ] {
        if lower.contains(keyword) {
            alerts.push(label.to_owned());
        }
    }

    if alerts.is_empty() {
        tracing::warn!("no alert channels found in template");
    }
    alerts
}

fn is_valid_module_name(name: &str) -> bool {
    if name.is_empty() || name.len() >= 100 {
        return false;
    }
    let lower = name.to_lowercase();
    ![
        "data flow",
        "capture video",
        "processes video",
        "alert data",
        "delivered via",
        "image url",
        "video url",
        "purpose",
        "alert trigger",
    ]
    .iter()
    .any(|keyword| lower.contains(keyword))
}

fn strip_title_suffix(title: &str) -> String {
    let lower = title.to_lowercase();
    match lower.find("technical proposal") {
        Some(pos) => title.get(..pos).unwrap_or(title).trim().to_owned(),
        None => title.trim().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "\
# Acme Terminals Technical Proposal

## 1. COVER PAGE
**Proposal Title:** Video Analytics for Acme Terminals
**Date:** 2025-11-03

## 2. PROJECT REQUIREMENT STATEMENT
**Project Owner:** Acme Terminals
**Camera Number:** 15 IP cameras
**AI Modules:**
1. Safety Helmet Detection
2. Safety Vest Detection
3. Danger Zone Intrusion Detection

## 4. SYSTEM ARCHITECTURE
**Deployment Method:** Cloud-based
Internet connection required: confirmed, 4G/5G/WiFi provided by client.
NVR marked optional (NVR*).

## 8. ALERTS & NOTIFICATIONS
Email and Dashboard alerts with mobile push.
";

    fn scraper() -> ProposalScraper {
        ProposalScraper::new().expect("patterns compile")
    }

    #[test]
    fn test_scrape_template() {
        let (facts, bag) = scraper().scrape(TEMPLATE, "fallback").expect("scrape");
        assert_eq!(facts.project_name, "Video Analytics for Acme Terminals");
        assert_eq!(facts.client_name, "Acme Terminals");
        assert_eq!(facts.camera_count, Some(15));
        assert_eq!(facts.modules.len(), 3);
        assert_eq!(bag.explicit_hint, Some(DeploymentHint::Cloud));
        assert!(bag.internet.has_connection);
        assert_eq!(bag.internet.connection_type, Some(ConnectionType::Cellular));
        assert_eq!(bag.recorder_hint, Some(false), "NVR marked optional");
    }

    #[test]
    fn test_title_fallback_strips_proposal_suffix() {
        let content = TEMPLATE.replace("**Proposal Title:** Video Analytics for Acme Terminals\n", "");
        let (facts, _) = scraper().scrape(&content, "fallback").expect("scrape");
        assert_eq!(facts.project_name, "Acme Terminals");
    }

    #[test]
    fn test_bulleted_module_list() {
        let content = TEMPLATE.replace(
            "1. Safety Helmet Detection\n2. Safety Vest Detection\n3. Danger Zone Intrusion Detection",
            "- Safety Helmet Detection\n- Safety Vest Detection",
        );
        let (facts, _) = scraper().scrape(&content, "fallback").expect("scrape");
        assert_eq!(
            facts.modules,
            vec!["Safety Helmet Detection", "Safety Vest Detection"]
        );
    }

    #[test]
    fn test_placeholders_rejected() {
        let content = TEMPLATE.replace("15 IP cameras", "[CAMERA_001] IP cameras");
        let err = scraper()
            .scrape(&content, "fallback")
            .expect_err("placeholders must fail");
        match err {
            ExtractError::UnresolvedPlaceholders { count, samples } => {
                assert_eq!(count, 1);
                assert_eq!(samples, vec!["CAMERA_001"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_fields_collected() {
        let content = "\
# Bare Proposal

## 2. PROJECT REQUIREMENT STATEMENT
Nothing filled in yet.
";
        let err = scraper()
            .scrape(content, "fallback")
            .expect_err("missing fields must fail");
        match err {
            ExtractError::MissingFields { fields } => {
                assert!(fields.contains(&"client name"));
                assert!(fields.contains(&"deployment method"));
                assert!(fields.contains(&"camera number"));
                assert!(fields.contains(&"AI modules"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_alert_channels() {
        let (facts, _) = scraper().scrape(TEMPLATE, "fallback").expect("scrape");
        assert!(facts.alert_channels.contains(&"Email".to_owned()));
        assert!(facts.alert_channels.contains(&"Dashboard".to_owned()));
        assert!(facts.alert_channels.contains(&"Mobile".to_owned()));
    }

    #[test]
    fn test_on_prem_deployment_field() {
        let content = TEMPLATE
            .replace("**Deployment Method:** Cloud-based", "**Deployment Method:** On-Premise")
            .replace("Internet connection required: confirmed, 4G/5G/WiFi provided by client.\n", "");
        let (_, bag) = scraper().scrape(&content, "fallback").expect("scrape");
        assert_eq!(bag.explicit_hint, Some(DeploymentHint::OnPrem));
        assert!(!bag.internet.has_connection);
    }
}
