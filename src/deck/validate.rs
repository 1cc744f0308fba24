//! Structural validation of an assembled deck.
//!
//! Runs after assembly and checks the outline against the rules the
//! review step used to enforce by hand: required sections mapped, cover
//! and diagram present, continuous numbering, no unresolved placeholders,
//! and complete module slides. Critical issues fail the run; warnings are
//! reported and (outside strict mode) tolerated.

use serde::{Deserialize, Serialize};

use crate::signals::sections;
use crate::slides::{SlideBody, SlideOutline};

/// Sections a proposal template must carry for a complete deck.
const REQUIRED_SECTIONS: &[&str] = &[
    "COVER PAGE",
    "PROJECT REQUIREMENT STATEMENT",
    "SCOPE OF WORK",
    "SYSTEM ARCHITECTURE",
    "SYSTEM REQUIREMENTS",
    "IMPLEMENTATION PLAN",
    "PROPOSED MODULES",
];

/// How bad a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, but the deck is still usable.
    Warning,
    /// The deck must not ship.
    Critical,
}

/// One validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Severity of the finding.
    pub severity: Severity,
    /// Coarse grouping (section, content, module, architecture, ...).
    pub category: String,
    /// Human-readable description.
    pub message: String,
}

/// The full validation result for one deck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Critical findings.
    pub errors: Vec<ValidationIssue>,
    /// Non-critical findings.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// A deck passes when it has no critical findings.
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of findings.
    pub fn total_issues(&self) -> usize {
        self.errors.len().saturating_add(self.warnings.len())
    }

    fn critical(&mut self, category: &str, message: String) {
        self.errors.push(ValidationIssue {
            severity: Severity::Critical,
            category: category.to_owned(),
            message,
        });
    }

    fn warning(&mut self, category: &str, message: String) {
        self.warnings.push(ValidationIssue {
            severity: Severity::Warning,
            category: category.to_owned(),
            message,
        });
    }
}

/// Validate an outline, optionally against the source document it was
/// mapped from (the proposal path; deal transfers have no sections to
/// compare against).
pub fn validate(outline: &SlideOutline, source: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Some(content) = source {
        check_source_sections(&mut report, content);
        check_module_coverage(&mut report, outline, content);
    }

    check_slides_present(&mut report, outline);
    check_cover(&mut report, outline);
    check_diagram(&mut report, outline);
    check_numbering(&mut report, outline);
    check_placeholders(&mut report, outline);
    check_module_fields(&mut report, outline);

    report
}

fn check_source_sections(report: &mut ValidationReport, content: &str) {
    let section_list = sections::split_markdown(content);

    for required in REQUIRED_SECTIONS {
        let needle = required.to_lowercase();
        let found = section_list
            .iter()
            .any(|(heading, _)| heading.to_lowercase().contains(&needle));
        if !found {
            report.critical(
                "section",
                format!("required section missing in template: {required}"),
            );
        }
    }

    for (heading, body) in &section_list {
        if body.trim().is_empty() {
            report.warning("section", format!("empty section in template: {heading}"));
        }
    }
}

fn check_slides_present(report: &mut ValidationReport, outline: &SlideOutline) {
    if outline.slides.is_empty() {
        report.critical("content", "no slides in outline".to_owned());
    }
    if outline.total_slides != outline.slides.len() {
        report.critical(
            "content",
            format!(
                "total_slides is {} but outline carries {} slides",
                outline.total_slides,
                outline.slides.len()
            ),
        );
    }
}

fn check_cover(report: &mut ValidationReport, outline: &SlideOutline) {
    let has_cover = outline
        .slides
        .iter()
        .any(|s| matches!(s.body, SlideBody::Title { .. }));
    if !has_cover {
        report.critical("content", "cover (title) slide missing".to_owned());
    }
}

fn check_diagram(report: &mut ValidationReport, outline: &SlideOutline) {
    let diagram = outline.slides.iter().find_map(|s| match &s.body {
        SlideBody::Diagram { code, .. } => Some(code),
        _ => None,
    });
    match diagram {
        None => report.critical("architecture", "architecture diagram slide missing".to_owned()),
        Some(code) if code.trim().is_empty() => {
            report.critical("architecture", "architecture diagram is empty".to_owned());
        }
        Some(_) => {}
    }
}

fn check_numbering(report: &mut ValidationReport, outline: &SlideOutline) {
    for (i, slide) in outline.slides.iter().enumerate() {
        let expected = u32::try_from(i.saturating_add(1)).unwrap_or(u32::MAX);
        if slide.number != expected {
            report.critical(
                "numbering",
                format!(
                    "slide numbering gap: expected {expected}, found {} ('{}')",
                    slide.number, slide.title
                ),
            );
            break;
        }
    }
}

fn check_placeholders(report: &mut ValidationReport, outline: &SlideOutline) {
    // Serializing the outline flattens every text field; one scan covers
    // titles, bullets, columns, and module fields alike.
    let Ok(flat) = serde_json::to_string(outline) else {
        return;
    };
    let placeholders = sections::find_placeholders(&flat);
    if !placeholders.is_empty() {
        report.critical(
            "content",
            format!(
                "{} unresolved placeholder(s) in slides, e.g. [{}]",
                placeholders.len(),
                placeholders[0]
            ),
        );
    }
}

fn check_module_fields(report: &mut ValidationReport, outline: &SlideOutline) {
    for slide in &outline.slides {
        let SlideBody::Module {
            purpose,
            alert_logic,
            preconditions,
            ..
        } = &slide.body
        else {
            continue;
        };
        for (field, value) in [
            ("purpose", purpose),
            ("alert trigger logic", alert_logic),
            ("preconditions", preconditions),
        ] {
            if value.trim().is_empty() {
                report.critical(
                    "module",
                    format!("module '{}' has an empty {field}", slide.title),
                );
            }
        }
    }
}

/// Compare module slides against the `###` module headings in the source.
fn check_module_coverage(report: &mut ValidationReport, outline: &SlideOutline, content: &str) {
    let section_list = sections::split_markdown(content);
    let Some((_, body)) = section_list
        .iter()
        .find(|(heading, _)| heading.to_lowercase().contains("proposed modules"))
    else {
        return;
    };

    let source_modules = body
        .lines()
        .filter(|line| line.starts_with("### "))
        .count();
    let slide_modules = outline
        .slides
        .iter()
        .filter(|s| matches!(s.body, SlideBody::Module { .. }))
        .count();

    if source_modules != slide_modules {
        report.warning(
            "module",
            format!(
                "template lists {source_modules} module(s) but the deck carries {slide_modules}"
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::{Bullet, Slide, SlideOutline};

    fn outline_with(slides: Vec<Slide>) -> SlideOutline {
        SlideOutline {
            project_name: "P".to_owned(),
            client_name: "C".to_owned(),
            total_slides: slides.len(),
            slides,
        }
    }

    fn cover() -> Slide {
        Slide {
            number: 1,
            title: "Cover".to_owned(),
            body: SlideBody::Title {
                date: String::new(),
            },
        }
    }

    fn diagram(number: u32) -> Slide {
        Slide {
            number,
            title: "Proposed System Architecture".to_owned(),
            body: SlideBody::Diagram {
                code: "graph TB\n".to_owned(),
                description: String::new(),
            },
        }
    }

    #[test]
    fn test_minimal_valid_outline_passes() {
        let report = validate(&outline_with(vec![cover(), diagram(2)]), None);
        assert!(report.passed(), "errors: {:?}", report.errors);
    }

    #[test]
    fn test_missing_cover_is_critical() {
        let report = validate(&outline_with(vec![diagram(1)]), None);
        assert!(!report.passed());
        assert!(report
            .errors
            .iter()
            .any(|e| e.message.contains("cover")));
    }

    #[test]
    fn test_empty_diagram_is_critical() {
        let mut slide = diagram(2);
        slide.body = SlideBody::Diagram {
            code: "  ".to_owned(),
            description: String::new(),
        };
        let report = validate(&outline_with(vec![cover(), slide]), None);
        assert!(report
            .errors
            .iter()
            .any(|e| e.category == "architecture"));
    }

    #[test]
    fn test_numbering_gap_is_critical() {
        let mut second = diagram(3);
        second.number = 3;
        let report = validate(&outline_with(vec![cover(), second]), None);
        assert!(report
            .errors
            .iter()
            .any(|e| e.category == "numbering"));
    }

    #[test]
    fn test_placeholder_in_slide_is_critical() {
        let slide = Slide {
            number: 2,
            title: "Network".to_owned(),
            body: SlideBody::Bullets {
                items: vec![Bullet::top("Bandwidth: [NETWORK_001] Mbps")],
            },
        };
        let report = validate(&outline_with(vec![cover(), slide]), None);
        assert!(report
            .errors
            .iter()
            .any(|e| e.message.contains("NETWORK_001")));
    }

    #[test]
    fn test_empty_module_field_is_critical() {
        let slide = Slide {
            number: 2,
            title: "Helmet Detection".to_owned(),
            body: SlideBody::Module {
                module_type: String::new(),
                purpose: "Detect missing helmets".to_owned(),
                alert_logic: String::new(),
                preconditions: "Gate cameras".to_owned(),
                data_requirements: String::new(),
                image_url: String::new(),
                video_url: String::new(),
            },
        };
        let report = validate(&outline_with(vec![cover(), slide]), None);
        assert!(report
            .errors
            .iter()
            .any(|e| e.category == "module" && e.message.contains("alert trigger logic")));
    }

    #[test]
    fn test_missing_required_section_is_critical() {
        let source = "## 1. COVER PAGE\nx\n";
        let report = validate(&outline_with(vec![cover(), diagram(2)]), Some(source));
        assert!(report
            .errors
            .iter()
            .any(|e| e.message.contains("SCOPE OF WORK")));
    }

    #[test]
    fn test_module_count_mismatch_is_warning() {
        let source = "\
## 1. COVER PAGE
x
## 2. PROJECT REQUIREMENT STATEMENT
x
## 3. SCOPE OF WORK
x
## 4. SYSTEM ARCHITECTURE
x
## 5. SYSTEM REQUIREMENTS
x
## 6. IMPLEMENTATION PLAN (TIMELINE)
x
## 7. PROPOSED MODULES & FUNCTIONAL DESCRIPTION
### 7.1 Helmet Detection
stuff
### 7.2 Smoking Detection
stuff
";
        let report = validate(&outline_with(vec![cover(), diagram(2)]), Some(source));
        assert!(report.passed(), "mismatch is only a warning");
        assert!(report
            .warnings
            .iter()
            .any(|w| w.message.contains("2 module(s)")));
    }

    #[test]
    fn test_empty_source_section_is_warning() {
        let source = "\
## 1. COVER PAGE
x
## 2. PROJECT REQUIREMENT STATEMENT
## 3. SCOPE OF WORK
x
## 4. SYSTEM ARCHITECTURE
x
## 5. SYSTEM REQUIREMENTS
x
## 6. IMPLEMENTATION PLAN (TIMELINE)
x
## 7. PROPOSED MODULES & FUNCTIONAL DESCRIPTION
x
";
        let report = validate(&outline_with(vec![cover(), diagram(2)]), Some(source));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.message.contains("PROJECT REQUIREMENT STATEMENT")));
    }
}
