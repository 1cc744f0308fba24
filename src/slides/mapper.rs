//! Mapping proposal sections onto the slide outline.
//!
//! The mapping mirrors the section order of the proposal templates the
//! sales team fills in: cover, requirement statement, scope of work,
//! architecture, system requirements, timeline, one slide per proposed
//! module, then user-interface material. Sections that are absent are
//! skipped; sections that are present but incomplete fail loudly rather
//! than producing a half-empty slide.

use regex::Regex;
use tracing::warn;

use super::{Bullet, Column, MapError, Milestone, Slide, SlideBody, SlideOutline};
use crate::signals::{sections, ProjectFacts};

/// Maps proposal markdown (or scraped deal-transfer facts) onto a
/// [`SlideOutline`].
pub struct SlideMapper {
    date_field: Regex,
    owner_fields: Vec<Regex>,
    table_row: Regex,
    key_marker: Regex,
    phase_marker: Regex,
    duration: Regex,
}

impl SlideMapper {
    /// Compile the mapping patterns.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Pattern`] if any pattern fails to compile.
    pub fn new() -> Result<Self, MapError> {
        Ok(Self {
            date_field: Regex::new(
                r"(?i)\*\*Date(?:\*\*\s*:?|:\*\*)\s*(\d{4}-\d{2}-\d{2}|\w+\s+\d{4})",
            )?,
            owner_fields: vec![
                Regex::new(r"(?i)\*\*Project Owner:?\*\*:?\s*([^\n]+)")?,
                Regex::new(r"(?i)\*\*Client Name:?\*\*:?\s*([^\n]+)")?,
            ],
            table_row: Regex::new(r"\|\s*\*\*(.+?)\*\*\s*\|\s*(.+?)\s*\|")?,
            key_marker: Regex::new(r"\*\*([^:*\n]+?)(?::\*\*|\*\*:)\s*")?,
            phase_marker: Regex::new(
                r"(?im)\*\*\s*phase\s+(t\d+)\s*:?\s*(?:\*\*)?\s*:?\s*([^\n]*)",
            )?,
            duration: Regex::new(r"(?i)(\d+\s*[-–]\s*\d+|\d+)\s*(?:weeks?|days?|months?)")?,
        })
    }

    /// Map a filled proposal template to a slide outline.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingClientName`] when the requirement
    /// section carries no owner, and [`MapError::MissingModuleFields`]
    /// when a proposed module lacks its required description fields.
    pub fn map_proposal(
        &self,
        content: &str,
        project_name: &str,
        diagram_code: &str,
    ) -> Result<SlideOutline, MapError> {
        let section_list = sections::split_markdown(content);
        let client_name = self.client_name(&section_list)?;

        let mut deck = OutlineBuilder::default();

        self.map_cover(&mut deck, &section_list, &client_name);
        self.map_requirement(&mut deck, &section_list);
        map_scope_of_work(&mut deck, &section_list);
        map_architecture(&mut deck, &section_list, diagram_code);
        map_system_requirements(&mut deck, &section_list);
        self.map_timeline(&mut deck, &section_list);
        self.map_modules(&mut deck, &section_list)?;
        map_user_interface(&mut deck, &section_list);

        Ok(deck.finish(project_name, &client_name))
    }

    /// Build the compact outline for the deal-transfer path: cover,
    /// requirement summary, and the architecture diagram. Deal transfers
    /// carry no proposal prose, so there is nothing more to map.
    pub fn map_deal_summary(
        &self,
        facts: &ProjectFacts,
        topology_label: &str,
        diagram_code: &str,
    ) -> SlideOutline {
        let mut deck = OutlineBuilder::default();

        deck.push(
            format!("Video Analytics Solution Proposal for {}", facts.client_name),
            SlideBody::Title {
                date: String::new(),
            },
        );

        let mut items = vec![
            Bullet::top(format!("Project: {}", facts.project_name)),
            Bullet::top(format!("Project Owner: {}", facts.client_name)),
        ];
        if let Some(count) = facts.camera_count {
            items.push(Bullet::top(format!("Camera Number: {count} cameras")));
        }
        items.push(Bullet::top(format!("Deployment Method: {topology_label}")));
        for (i, module) in facts.modules.iter().enumerate() {
            if i == 0 {
                items.push(Bullet::top(format!("AI Modules: {module}")));
            } else {
                items.push(Bullet::top(module.clone()));
            }
        }
        if !facts.alert_channels.is_empty() {
            items.push(Bullet::top(format!(
                "Alerts: {}",
                facts.alert_channels.join(", ")
            )));
        }
        deck.push("Project Requirement Statement", SlideBody::Bullets { items });

        deck.push(
            "Proposed System Architecture",
            SlideBody::Diagram {
                code: diagram_code.to_owned(),
                description: String::new(),
            },
        );

        deck.finish(&facts.project_name, &facts.client_name)
    }

    fn client_name(&self, section_list: &[(String, String)]) -> Result<String, MapError> {
        let requirement =
            find_section(section_list, "PROJECT REQUIREMENT").ok_or(MapError::MissingClientName)?;
        self.owner_fields
            .iter()
            .find_map(|re| {
                re.captures(requirement)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_owned())
                    .filter(|s| !s.is_empty())
            })
            .ok_or(MapError::MissingClientName)
    }

    fn map_cover(
        &self,
        deck: &mut OutlineBuilder,
        section_list: &[(String, String)],
        client_name: &str,
    ) {
        let cover = find_section(section_list, "COVER PAGE").unwrap_or("");
        let date = match self.date_field.captures(cover).and_then(|c| c.get(1)) {
            Some(m) => m.as_str().to_owned(),
            None => {
                warn!("date not found in cover page section");
                String::new()
            }
        };
        deck.push(
            format!("Video Analytics Solution Proposal for {client_name}"),
            SlideBody::Title { date },
        );
    }

    /// The requirement statement becomes one bulleted slide. AI module
    /// lists are flattened one bullet per module so the deck never shows
    /// a wall of text in a single bullet.
    fn map_requirement(&self, deck: &mut OutlineBuilder, section_list: &[(String, String)]) {
        let Some(content) = find_section(section_list, "PROJECT REQUIREMENT") else {
            return;
        };

        let mut items = Vec::new();
        for (key, value) in self.key_value_pairs(content) {
            if key.to_lowercase().starts_with("ai module") {
                for (i, module) in list_lines(&value).into_iter().enumerate() {
                    if i == 0 {
                        items.push(Bullet::top(format!("{key}: {module}")));
                    } else {
                        items.push(Bullet::top(module));
                    }
                }
            } else {
                items.push(Bullet::top(format!("{key}: {}", collapse_whitespace(&value))));
            }
        }

        if !items.is_empty() {
            deck.push("Project Requirement Statement", SlideBody::Bullets { items });
        }
    }

    fn map_timeline(&self, deck: &mut OutlineBuilder, section_list: &[(String, String)]) {
        let Some(content) = find_section(section_list, "IMPLEMENTATION PLAN") else {
            return;
        };

        let mut milestones = Vec::new();
        for captures in self.phase_marker.captures_iter(content) {
            let phase = captures
                .get(1)
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_default();
            let raw_label = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
            let label = raw_label.trim_matches('*').trim().to_owned();
            let duration = self
                .duration
                .find(raw_label)
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default();
            milestones.push(Milestone {
                phase,
                label,
                duration,
            });
        }

        if milestones.is_empty() {
            warn!("no timeline milestones found in implementation plan section");
        }
        deck.push("Implementation Plan", SlideBody::Timeline { milestones });
    }

    /// One slide per proposed module. Purpose, alert logic, and
    /// preconditions are required; a module without them is a template
    /// authoring error, not something to paper over with defaults.
    fn map_modules(
        &self,
        deck: &mut OutlineBuilder,
        section_list: &[(String, String)],
    ) -> Result<(), MapError> {
        let Some(content) = find_section(section_list, "PROPOSED MODULES") else {
            return Ok(());
        };

        for (heading, block) in subsections(content) {
            let Some(name) = module_name(&heading) else {
                continue;
            };

            let mut module_type = String::new();
            let mut purpose = String::new();
            let mut alert_logic = String::new();
            let mut preconditions = String::new();
            let mut data_requirements = String::new();
            let mut image_url = String::new();
            let mut video_url = String::new();

            for (key, value) in self.key_value_pairs(&block) {
                let key_lower = key.to_lowercase();
                let value = collapse_whitespace(&value);
                if key_lower.contains("module type") || key_lower == "type" {
                    module_type = value;
                } else if key_lower.contains("purpose") {
                    purpose = value;
                } else if key_lower.contains("alert") {
                    alert_logic = value;
                } else if key_lower.contains("precondition") {
                    preconditions = value;
                } else if key_lower.contains("data requirement") {
                    data_requirements = value;
                } else if key_lower.contains("image") {
                    image_url = value;
                } else if key_lower.contains("video") {
                    video_url = value;
                }
            }

            let mut missing: Vec<&'static str> = Vec::new();
            if purpose.is_empty() {
                missing.push("purpose description");
            }
            if alert_logic.is_empty() {
                missing.push("alert trigger logic");
            }
            if preconditions.is_empty() {
                missing.push("preconditions");
            }
            if !missing.is_empty() {
                return Err(MapError::MissingModuleFields {
                    module: name,
                    fields: missing,
                });
            }

            deck.push(
                name,
                SlideBody::Module {
                    module_type,
                    purpose,
                    alert_logic,
                    preconditions,
                    data_requirements,
                    image_url,
                    video_url,
                },
            );
        }
        Ok(())
    }

    /// Extract `| **Key** | Value |` table rows, falling back to
    /// `**Key:** value` markers with values running to the next marker.
    fn key_value_pairs(&self, content: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();

        for captures in self.table_row.captures_iter(content) {
            if let (Some(key), Some(value)) = (captures.get(1), captures.get(2)) {
                pairs.push((
                    key.as_str().trim().to_owned(),
                    clean_value(value.as_str()),
                ));
            }
        }
        if !pairs.is_empty() {
            return pairs;
        }

        let markers: Vec<_> = self.key_marker.captures_iter(content).collect();
        for (i, captures) in markers.iter().enumerate() {
            let Some(key) = captures.get(1) else { continue };
            let Some(whole) = captures.get(0) else { continue };
            let value_start = whole.end();
            let value_end = markers
                .get(i.saturating_add(1))
                .and_then(|next| next.get(0))
                .map_or(content.len(), |m| m.start());
            let value = content.get(value_start..value_end).unwrap_or("");
            pairs.push((key.as_str().trim().to_owned(), clean_value(value)));
        }
        pairs
    }
}

/// Scope of work becomes a two-column slide: vendor responsibilities on
/// the left, client responsibilities on the right.
fn map_scope_of_work(deck: &mut OutlineBuilder, section_list: &[(String, String)]) {
    let Some(content) = find_section(section_list, "SCOPE OF WORK") else {
        return;
    };

    let (left, right) = responsibility_columns(content);
    if left.items.is_empty() && right.items.is_empty() {
        return;
    }
    deck.push("Scope of Work", SlideBody::TwoColumn { left, right });
}

fn map_architecture(
    deck: &mut OutlineBuilder,
    section_list: &[(String, String)],
    diagram_code: &str,
) {
    let content = find_section(section_list, "SYSTEM ARCHITECTURE").unwrap_or("");
    let prose = without_mermaid_blocks(content);

    deck.push(
        "Proposed System Architecture",
        SlideBody::Diagram {
            code: diagram_code.to_owned(),
            description: architecture_description(&prose),
        },
    );

    // A template with substantial prose gets a second, text-only slide.
    let detail = bullets_with_levels(&prose);
    if detail.len() >= 3 {
        deck.push(
            "System Architecture Description",
            SlideBody::Bullets { items: detail },
        );
    }
}

/// System requirements are grouped so related subsections share a slide
/// and no subsection is ever cut mid-content: Network and Camera go
/// together; AI Training, AI Inference, and Dashboard share one slide
/// when they fit (15 bullets) and split into two otherwise.
fn map_system_requirements(deck: &mut OutlineBuilder, section_list: &[(String, String)]) {
    let Some(content) = find_section(section_list, "SYSTEM REQUIREMENTS") else {
        return;
    };
    let subs = subsections(content);

    let grouped = [
        "network",
        "camera",
        "ai training",
        "ai training workstation",
        "ai inference",
        "ai inference workstation",
        "dashboard",
        "dashboard workstation",
    ];

    let mut network_camera: Vec<Bullet> = Vec::new();
    for name in ["Network", "Camera"] {
        if let Some(body) = lookup_subsection(&subs, name) {
            network_camera.push(Bullet::top(name));
            network_camera.extend(bullets_with_levels(body));
        }
    }
    if !network_camera.is_empty() {
        deck.push(
            "System Requirements",
            SlideBody::Bullets {
                items: network_camera,
            },
        );
    }

    let training = titled_bullets(&subs, "AI Training");
    let inference = titled_bullets(&subs, "AI Inference");
    let dashboard = titled_bullets(&subs, "Dashboard");

    let total = training
        .len()
        .saturating_add(inference.len())
        .saturating_add(dashboard.len());
    if total > 0 {
        if total <= 15 {
            let mut items = training;
            items.extend(inference);
            items.extend(dashboard);
            deck.push("System Requirements", SlideBody::Bullets { items });
        } else {
            let mut items = training;
            items.extend(inference);
            if !items.is_empty() {
                deck.push("System Requirements", SlideBody::Bullets { items });
            }
            if !dashboard.is_empty() {
                deck.push(
                    "System Requirements",
                    SlideBody::Bullets { items: dashboard },
                );
            }
        }
    }

    for (heading, body) in &subs {
        if grouped.contains(&heading.to_lowercase().as_str()) || body.trim().is_empty() {
            continue;
        }
        deck.push(
            format!("System Requirements: {heading}"),
            SlideBody::Bullets {
                items: bullets_with_levels(body),
            },
        );
    }
}

fn map_user_interface(deck: &mut OutlineBuilder, section_list: &[(String, String)]) {
    let Some(content) = find_section(section_list, "USER INTERFACE") else {
        return;
    };
    for (heading, body) in subsections(content) {
        if body.trim().is_empty() {
            continue;
        }
        deck.push(
            heading,
            SlideBody::Bullets {
                items: bullets_with_levels(&body),
            },
        );
    }
}

// ── Outline assembly ────────────────────────────────────────────

#[derive(Default)]
struct OutlineBuilder {
    slides: Vec<Slide>,
}

impl OutlineBuilder {
    fn push(&mut self, title: impl Into<String>, body: SlideBody) {
        let number = u32::try_from(self.slides.len().saturating_add(1)).unwrap_or(u32::MAX);
        self.slides.push(Slide {
            number,
            title: title.into(),
            body,
        });
    }

    fn finish(self, project_name: &str, client_name: &str) -> SlideOutline {
        SlideOutline {
            project_name: project_name.to_owned(),
            client_name: client_name.to_owned(),
            total_slides: self.slides.len(),
            slides: self.slides,
        }
    }
}

// ── Text helpers ────────────────────────────────────────────────

fn find_section<'a>(section_list: &'a [(String, String)], fragment: &str) -> Option<&'a str> {
    let needle = fragment.to_lowercase();
    section_list
        .iter()
        .find(|(heading, _)| heading.to_lowercase().contains(&needle))
        .map(|(_, body)| body.as_str())
}

/// Split a section body into `###` subsections.
fn subsections(content: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut heading: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("### ") {
            if let Some(h) = heading.take() {
                out.push((h, body.join("\n").trim().to_owned()));
            }
            heading = Some(rest.trim().to_owned());
            body.clear();
        } else if heading.is_some() {
            body.push(line);
        }
    }
    if let Some(h) = heading {
        out.push((h, body.join("\n").trim().to_owned()));
    }
    out
}

fn lookup_subsection<'a>(subs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let needle = name.to_lowercase();
    subs.iter()
        .find(|(heading, _)| heading.to_lowercase() == needle)
        .map(|(_, body)| body.as_str())
}

/// A subsection (or its "... Workstation" variant) as a titled bullet run.
fn titled_bullets(subs: &[(String, String)], name: &str) -> Vec<Bullet> {
    let body = lookup_subsection(subs, name)
        .or_else(|| lookup_subsection(subs, &format!("{name} Workstation")));
    let Some(body) = body else {
        return Vec::new();
    };
    let mut items = vec![Bullet::top(name)];
    items.extend(bullets_with_levels(body));
    items
}

/// Module slide name from a subsection heading.
///
/// Handles "7.1 Safety Helmet Detection (PPE)", "Module: Name", and
/// "Module 3: Name". Returns `None` for headings that are not modules.
fn module_name(heading: &str) -> Option<String> {
    let trimmed = heading.trim();
    if trimmed.to_lowercase().starts_with("type:") {
        return None;
    }

    let after_marker = if trimmed.to_lowercase().starts_with("module") {
        trimmed.split_once(':').map(|(_, rest)| rest.trim())?
    } else {
        // Strip a "7.1 " style numeric prefix.
        let rest = trimmed
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
            .trim_start();
        if rest.is_empty() {
            return None;
        }
        rest
    };

    // Drop a trailing parenthetical qualifier.
    let name = match (after_marker.rfind('('), after_marker.ends_with(')')) {
        (Some(open), true) => after_marker.get(..open).unwrap_or(after_marker).trim_end(),
        _ => after_marker,
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}

fn responsibility_columns(content: &str) -> (Column, Column) {
    let mut vendor = Column {
        heading: "Vendor Responsibilities".to_owned(),
        items: Vec::new(),
    };
    let mut client = Column {
        heading: "Client Responsibilities".to_owned(),
        items: Vec::new(),
    };

    #[derive(Clone, Copy)]
    enum Side {
        None,
        Vendor,
        Client,
    }
    let mut side = Side::None;

    for line in content.lines() {
        let trimmed = line.trim();
        let is_heading = trimmed.starts_with("**") || trimmed.starts_with('#');
        let cleaned = trimmed
            .trim_matches('#')
            .trim()
            .trim_matches('*')
            .trim_end_matches(':')
            .trim();

        if is_heading && cleaned.to_lowercase().contains("responsibilit") {
            if cleaned.to_lowercase().contains("client") {
                side = Side::Client;
                client.heading = cleaned.to_owned();
            } else {
                side = Side::Vendor;
                vendor.heading = cleaned.to_owned();
            }
            continue;
        }

        if let Some(item) = bullet_text(line) {
            match side {
                Side::Vendor => vendor.items.push(item),
                Side::Client => client.items.push(item),
                Side::None => {}
            }
        }
    }

    (vendor, client)
}

/// Convert free section text into levelled bullets. Bullet markers set
/// the level from indentation; plain prose lines become top-level items.
fn bullets_with_levels(content: &str) -> Vec<Bullet> {
    let mut items = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.chars().all(|c| c == '-')
        {
            continue;
        }

        if let Some(text) = bullet_text(line) {
            let indent = line.chars().take_while(|c| *c == ' ').count();
            let level: u8 = if indent >= 4 {
                2
            } else if indent >= 2 {
                1
            } else {
                0
            };
            items.push(Bullet { level, text });
        } else {
            items.push(Bullet::top(strip_bold(trimmed)));
        }
    }
    items
}

/// The text of a bullet line, or `None` for non-bullet lines.
fn bullet_text(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let rest = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("• "))?;
    let text = strip_bold(rest.trim());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn strip_bold(text: &str) -> String {
    text.replace("**", "")
}

fn clean_value(value: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in value.lines() {
        let trimmed = line.trim();
        if trimmed.to_lowercase().starts_with("source") && trimmed.contains(':') {
            continue;
        }
        if trimmed.chars().all(|c| c == '-') && !trimmed.is_empty() {
            break;
        }
        lines.push(line);
    }
    strip_bold(lines.join("\n").trim())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn list_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            let without_number = {
                let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
                match trimmed.get(digits..).and_then(|r| r.strip_prefix('.')) {
                    Some(rest) if digits > 0 => rest.trim(),
                    _ => trimmed,
                }
            };
            let cleaned = without_number
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_owned();
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect()
}

fn without_mermaid_blocks(content: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut in_fence = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            out.push(line);
        }
    }
    out.join("\n")
}

fn architecture_description(prose: &str) -> String {
    prose
        .lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !line.starts_with('#')
                && !line.starts_with('-')
                && !line.starts_with('*')
                && !line.chars().all(|c| c == '-')
        })
        .map(strip_bold)
        .unwrap_or_default()
}
