//! Shared helpers for carving semi-structured documents into sections.
//!
//! Two document shapes appear in practice: markdown proposals with `##`
//! headings, and deal-transfer questionnaires where a "section" is the
//! answer text following a `Question: ...` or `Question?` line.

use regex::Regex;

/// Split a markdown document into ordered `(heading, body)` pairs.
///
/// A heading is any line starting with `##`. Leading separator lines
/// (`---`) and blank lines are stripped from each body.
pub(crate) fn split_markdown(content: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut heading: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in content.lines() {
        if let Some(rest) = heading_text(line) {
            if let Some(h) = heading.take() {
                out.push((h, clean_body(&body)));
            }
            heading = Some(rest);
            body.clear();
        } else if heading.is_some() {
            body.push(line);
        }
    }
    if let Some(h) = heading {
        out.push((h, clean_body(&body)));
    }
    out
}

/// Case-insensitive lookup of one `##` section by name fragment.
///
/// Tolerates numeric prefixes ("2. PROJECT REQUIREMENT STATEMENT" matches
/// "PROJECT REQUIREMENT STATEMENT"). Falls back to matching the first two
/// words of the requested name, as section titles vary across templates.
pub(crate) fn markdown_section(content: &str, name: &str) -> Option<String> {
    let needle = name.to_lowercase();
    let sections = split_markdown(content);

    if let Some((_, b)) = sections
        .iter()
        .find(|(h, _)| h.to_lowercase().contains(&needle))
    {
        return Some(b.clone());
    }

    let words: Vec<&str> = needle.split_whitespace().collect();
    if words.len() > 1 {
        let prefix = format!("{} {}", words[0], words[1]);
        if let Some((_, b)) = sections
            .iter()
            .find(|(h, _)| h.to_lowercase().contains(&prefix))
        {
            return Some(b.clone());
        }
    }
    None
}

/// Extract the answer text following a questionnaire header line.
///
/// The header is the first line containing `name` (case-insensitive) plus
/// a `:` or `?`. The answer runs until the next header-looking line — a
/// line starting with a word character and containing `:` or `?`. A
/// leading `Answer:` marker is stripped.
pub(crate) fn qa_section(content: &str, name: &str) -> Option<String> {
    let needle = name.to_lowercase();
    let lines: Vec<&str> = content.lines().collect();

    let start = lines.iter().position(|line| {
        let lower = line.to_lowercase();
        match lower.find(&needle) {
            Some(pos) => lower[pos..].contains(':') || lower[pos..].contains('?'),
            None => false,
        }
    })?;

    let mut body: Vec<&str> = Vec::new();
    for line in lines.iter().skip(start.saturating_add(1)) {
        if !body.is_empty() && is_header_line(line) {
            break;
        }
        body.push(line);
    }

    let text = strip_answer_prefix(body.join("\n").trim()).to_owned();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// The document title: the first line starting with a single `#`.
pub(crate) fn title_heading(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let rest = line.strip_prefix('#')?;
        if rest.starts_with('#') {
            return None;
        }
        let title = rest.trim();
        if title.is_empty() {
            None
        } else {
            Some(title.to_owned())
        }
    })
}

/// Collect `[SECTION_001]`-style unresolved placeholder names.
pub(crate) fn find_placeholders(content: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r"\[([A-Z_]+_\d+)\]") else {
        return Vec::new();
    };
    re.captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Items of a numbered list (`1. Item`), one per matching line.
pub(crate) fn numbered_items(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
            if digits == 0 {
                return None;
            }
            let rest = trimmed.get(digits..)?.strip_prefix('.')?;
            let item = rest.trim();
            if item.is_empty() {
                None
            } else {
                Some(item.to_owned())
            }
        })
        .collect()
}

/// Items of a bulleted list (`- Item`, `* Item`, `• Item`), one per line.
pub(crate) fn bullet_items(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let rest = trimmed
                .strip_prefix('-')
                .or_else(|| trimmed.strip_prefix('*'))
                .or_else(|| trimmed.strip_prefix('•'))?;
            // "**Bold:** value" lines are field markers, not bullets.
            if rest.trim_start().starts_with("**") {
                return None;
            }
            let item = rest.trim();
            if item.is_empty() {
                None
            } else {
                Some(item.to_owned())
            }
        })
        .collect()
}

/// Strip a leading `Answer:` marker, case-insensitively.
pub(crate) fn strip_answer_prefix(text: &str) -> &str {
    let trimmed = text.trim_start();
    let lower = trimmed.to_lowercase();
    if lower.starts_with("answer:") {
        trimmed.get("answer:".len()..).unwrap_or("").trim_start()
    } else {
        trimmed
    }
}

fn heading_text(line: &str) -> Option<String> {
    // Exactly two hashes: `###` subsection headings stay inside their
    // parent section's body.
    let rest = line.strip_prefix("##")?;
    if rest.starts_with('#') {
        return None;
    }
    let text = rest.trim().trim_end_matches('-').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}

fn clean_body(lines: &[&str]) -> String {
    let mut body: Vec<&str> = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if body.is_empty() && (trimmed.is_empty() || trimmed.chars().all(|c| c == '-')) {
            continue;
        }
        body.push(line);
    }
    body.join("\n").trim_end().to_owned()
}

fn is_header_line(line: &str) -> bool {
    let starts_with_word = line
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    starts_with_word && (line.contains(':') || line.contains('?'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Safety Monitoring Technical Proposal

## 1. COVER PAGE
---
**Date:** 2025-11-03

## 2. PROJECT REQUIREMENT STATEMENT
**Project Owner:** Acme Terminals
";

    #[test]
    fn test_split_markdown_sections() {
        let sections = split_markdown(DOC);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "1. COVER PAGE");
        assert_eq!(sections[0].1, "**Date:** 2025-11-03");
        assert_eq!(sections[1].0, "2. PROJECT REQUIREMENT STATEMENT");
    }

    #[test]
    fn test_markdown_section_ignores_numeric_prefix() {
        let body = markdown_section(DOC, "PROJECT REQUIREMENT STATEMENT")
            .expect("section found");
        assert!(body.contains("Acme Terminals"));
    }

    #[test]
    fn test_markdown_section_partial_name() {
        let body = markdown_section(DOC, "PROJECT REQUIREMENT DETAILS");
        assert!(body.is_some(), "first two words should still match");
    }

    #[test]
    fn test_title_heading_skips_subheadings() {
        assert_eq!(
            title_heading(DOC).as_deref(),
            Some("Safety Monitoring Technical Proposal")
        );
        assert_eq!(title_heading("## Only Subheading\n"), None);
    }

    #[test]
    fn test_qa_section_stops_at_next_question() {
        let doc = "\
Does client have stable internet connection?
Answer: Yes, fiber 24/24
Number of cameras: 12
";
        let answer = qa_section(doc, "stable internet connection").expect("answer found");
        assert_eq!(answer, "Yes, fiber 24/24");
    }

    #[test]
    fn test_qa_section_multi_line_answer() {
        let doc = "\
List of VA use cases:
1. Helmet Detection
2. Smoking Detection

GDPR requirements? No
";
        let answer = qa_section(doc, "list of va use cases").expect("answer found");
        assert!(answer.contains("Helmet Detection"));
        assert!(answer.contains("Smoking Detection"));
        assert!(!answer.contains("GDPR"));
    }

    #[test]
    fn test_find_placeholders() {
        let found = find_placeholders("30 Mbps [NETWORK_001] and [TIMELINE_002]");
        assert_eq!(found, vec!["NETWORK_001", "TIMELINE_002"]);
        assert!(find_placeholders("no placeholders here").is_empty());
    }

    #[test]
    fn test_numbered_items() {
        let items = numbered_items("1. First\n2. Second\nnot a list\n10. Tenth");
        assert_eq!(items, vec!["First", "Second", "Tenth"]);
    }

    #[test]
    fn test_bullet_items_skip_field_markers() {
        let items = bullet_items("- One\n* Two\n• Three\n- **Key:** value-ish");
        assert_eq!(items, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_strip_answer_prefix() {
        assert_eq!(strip_answer_prefix("Answer: Yes"), "Yes");
        assert_eq!(strip_answer_prefix("answer:   no"), "no");
        assert_eq!(strip_answer_prefix("plain"), "plain");
    }
}
