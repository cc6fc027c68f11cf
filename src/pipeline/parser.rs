//! Table/rubric parser — extracts a typed `RubricDocument` from cleaned
//! generated text.
//!
//! Three tiers, each engaged only when the previous produced no usable
//! structure:
//!
//! 1. table-driven extraction over pipe rows (the expected dialect);
//! 2. heading-pattern fallback (`**Label:**` / `Label:` lines become
//!    criterion names, levels default to a canonical set);
//! 3. a single synthesized empty criterion, so the editor always has a
//!    grid to stand on.
//!
//! Metadata always comes verbatim from the origin form, never from the
//! text body. The parser never panics on malformed model output; input
//! with nothing to parse yields `None` and the caller falls back to a
//! read-only raw-text view.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::render::{is_separator_row, split_table_cells};
use crate::document::{Criterion, FormMetadata, RubricDocument, RubricMetadata};

/// Level names used when the text gives us none, ordered highest to
/// lowest; tier 2/3 slice this to the form's requested count.
pub const CANONICAL_LEVELS: &[&str] = &[
    "Excellent",
    "Good",
    "Satisfactory",
    "Needs Improvement",
    "Beginning",
    "Advanced",
];

/// `(10 pts)` / `(5 pt)` suffix inside a table cell.
static POINTS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((\d+)\s*pts?\)").unwrap());

/// `**Label:**` at line start.
static BOLD_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\*\*([^*\n]+?):\*\*").unwrap());

/// `Label:` at line start. Short, plain, no pipes.
static PLAIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([A-Za-z][A-Za-z0-9 '&/-]{1,60}):").unwrap());

/// Parse cleaned text into a rubric document. `None` means the input
/// held nothing to parse (empty after trimming); the caller should keep
/// the raw text viewable but disable structural editing.
pub fn parse(filtered: &str, form: &FormMetadata) -> Option<RubricDocument> {
    if filtered.trim().is_empty() {
        return None;
    }

    let metadata = RubricMetadata::from_form(form);

    if let Some((levels, criteria)) = extract_table(filtered, form.include_point_values) {
        tracing::debug!(
            criteria = criteria.len(),
            levels = levels.len(),
            "parsed rubric from pipe table"
        );
        return Some(RubricDocument {
            metadata,
            performance_levels: levels,
            criteria,
        });
    }

    let levels = default_levels(form.level_count());
    let names = extract_heading_labels(filtered);
    let criteria: Vec<Criterion> = if names.is_empty() {
        tracing::debug!("no structure found; synthesizing single empty criterion");
        vec![Criterion::blank("Criterion 1", &levels, form.include_point_values)]
    } else {
        tracing::debug!(criteria = names.len(), "parsed rubric from heading labels");
        names
            .into_iter()
            .map(|name| Criterion::blank(name, &levels, form.include_point_values))
            .collect()
    };

    Some(RubricDocument {
        metadata,
        performance_levels: levels,
        criteria,
    })
}

/// Canonical level list sliced to the requested count.
pub fn default_levels(count: usize) -> Vec<String> {
    CANONICAL_LEVELS
        .iter()
        .take(count.max(1).min(CANONICAL_LEVELS.len()))
        .map(|s| s.to_string())
        .collect()
}

// ═══════════════════════════════════════════
// Tier 1: pipe-table extraction
// ═══════════════════════════════════════════

fn extract_table(text: &str, with_points: bool) -> Option<(Vec<String>, Vec<Criterion>)> {
    let pipe_lines: Vec<&str> = text.lines().filter(|l| l.contains('|')).collect();

    // First non-separator pipe line is the header; dash cells cannot
    // name performance levels.
    let header_idx = pipe_lines.iter().position(|l| !is_separator_row(l))?;
    let header_cells = split_table_cells(pipe_lines[header_idx]);
    if header_cells.len() < 2 {
        return None;
    }

    // Header cells after the first become the level columns. Duplicate
    // names keep their first column and drop the rest, so the document
    // invariants hold even against a malformed header.
    let mut levels: Vec<String> = Vec::new();
    let mut kept_columns: Vec<usize> = Vec::new();
    for (col, cell) in header_cells.iter().enumerate().skip(1) {
        if !levels.contains(cell) {
            levels.push(cell.clone());
            kept_columns.push(col);
        }
    }
    if levels.is_empty() {
        return None;
    }

    let mut criteria = Vec::new();
    for line in pipe_lines.iter().skip(header_idx + 1) {
        if is_separator_row(line) {
            continue;
        }
        let cells = split_table_cells(line);
        let Some(name) = cells.first() else { continue };
        if name.is_empty() {
            continue;
        }

        let mut texts: HashMap<String, String> = HashMap::new();
        let mut points: HashMap<String, u32> = HashMap::new();
        for (level, col) in levels.iter().zip(&kept_columns) {
            let raw_cell = cells.get(*col).map(String::as_str).unwrap_or("");
            let (text, cell_points) = split_cell_points(raw_cell, with_points);
            texts.insert(level.clone(), text);
            points.insert(level.clone(), cell_points);
        }

        criteria.push(Criterion {
            id: uuid::Uuid::new_v4(),
            name: name.clone(),
            levels: texts,
            points: with_points.then_some(points),
        });
    }

    if criteria.is_empty() {
        None
    } else {
        Some((levels, criteria))
    }
}

/// Pull a `(N pts)` suffix out of a cell. Returns the cell text with
/// the suffix stripped and the point value (0 when absent or when the
/// document does not track points).
fn split_cell_points(cell: &str, with_points: bool) -> (String, u32) {
    if !with_points {
        return (cell.trim().to_string(), 0);
    }
    match POINTS_SUFFIX.captures(cell) {
        Some(caps) => {
            let value = caps[1].parse::<u32>().unwrap_or(0);
            let stripped = POINTS_SUFFIX.replace(cell, "").trim().to_string();
            (stripped, value)
        }
        None => (cell.trim().to_string(), 0),
    }
}

// ═══════════════════════════════════════════
// Tier 2: heading-pattern fallback
// ═══════════════════════════════════════════

/// Criterion names from heading-style lines. Bold labels are tried
/// first; the plain `Label:` pattern only applies when no bold label
/// matched anywhere.
fn extract_heading_labels(text: &str) -> Vec<String> {
    let bold: Vec<String> = BOLD_LABEL
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .collect();
    if !bold.is_empty() {
        return dedup_preserving_order(bold);
    }

    let plain: Vec<String> = PLAIN_LABEL
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .collect();
    dedup_preserving_order(plain)
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(levels: &str, points: bool) -> FormMetadata {
        FormMetadata {
            assignment_title: "Persuasive Essay".into(),
            assignment_type: "Essay".into(),
            subject: "English".into(),
            grade_level: "8".into(),
            learning_objectives: None,
            specific_requirements: None,
            performance_levels: levels.into(),
            include_point_values: points,
        }
    }

    const TABLE_INPUT: &str = "**GRADING RUBRIC**\n\n\
| Criteria | Excellent | Good |\n\
| --- | --- | --- |\n\
| Content | Great detail (10 pts) | Some detail (5 pts) |";

    #[test]
    fn parses_table_with_points() {
        let doc = parse(TABLE_INPUT, &form("4", true)).unwrap();
        assert_eq!(doc.performance_levels, vec!["Excellent", "Good"]);
        assert_eq!(doc.criteria.len(), 1);

        let content = &doc.criteria[0];
        assert_eq!(content.name, "Content");
        assert_eq!(content.levels["Excellent"], "Great detail");
        assert_eq!(content.levels["Good"], "Some detail");
        let points = content.points.as_ref().unwrap();
        assert_eq!(points["Excellent"], 10);
        assert_eq!(points["Good"], 5);
        doc.validate_structure().unwrap();
    }

    #[test]
    fn points_left_in_text_when_disabled() {
        let doc = parse(TABLE_INPUT, &form("4", false)).unwrap();
        let content = &doc.criteria[0];
        assert_eq!(content.levels["Excellent"], "Great detail (10 pts)");
        assert!(content.points.is_none());
        doc.validate_structure().unwrap();
    }

    #[test]
    fn metadata_comes_from_form_not_text() {
        let doc = parse(TABLE_INPUT, &form("4", true)).unwrap();
        // The text shouts "GRADING RUBRIC" but the form wins.
        assert_eq!(doc.metadata.title, "Persuasive Essay");
        assert_eq!(doc.metadata.subject, "English");
    }

    #[test]
    fn separator_first_table_still_parses() {
        let text = "| --- | --- |\n| Criteria | Excellent |\n| Content | Strong work |";
        let doc = parse(text, &form("4", false)).unwrap();
        assert_eq!(doc.performance_levels, vec!["Excellent"]);
        assert_eq!(doc.criteria[0].levels["Excellent"], "Strong work");
    }

    #[test]
    fn duplicate_header_levels_keep_first_column() {
        let text = "| Criteria | Good | Good |\n| Content | first | second |";
        let doc = parse(text, &form("4", false)).unwrap();
        assert_eq!(doc.performance_levels, vec!["Good"]);
        assert_eq!(doc.criteria[0].levels["Good"], "first");
        doc.validate_structure().unwrap();
    }

    #[test]
    fn short_rows_fill_missing_cells_empty() {
        let text = "| Criteria | Excellent | Good |\n| Content | Strong |";
        let doc = parse(text, &form("4", false)).unwrap();
        assert_eq!(doc.criteria[0].levels["Excellent"], "Strong");
        assert_eq!(doc.criteria[0].levels["Good"], "");
        doc.validate_structure().unwrap();
    }

    #[test]
    fn heading_fallback_when_no_table() {
        let text = "**Content Knowledge:** depth of understanding\n**Organization:** logical flow";
        let doc = parse(text, &form("3", false)).unwrap();
        assert_eq!(
            doc.performance_levels,
            vec!["Excellent", "Good", "Satisfactory"]
        );
        let names: Vec<&str> = doc.criteria.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Content Knowledge", "Organization"]);
        assert!(doc.criteria.iter().all(|c| c
            .levels
            .values()
            .all(String::is_empty)));
        doc.validate_structure().unwrap();
    }

    #[test]
    fn plain_labels_used_when_no_bold_labels() {
        let text = "Thesis: clear claim\nEvidence: cited sources";
        let doc = parse(text, &form("4", false)).unwrap();
        let names: Vec<&str> = doc.criteria.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Thesis", "Evidence"]);
    }

    #[test]
    fn empty_fallback_synthesizes_single_criterion() {
        let text = "Just some loose prose without any structure at all";
        let doc = parse(text, &form("3", true)).unwrap();
        assert_eq!(doc.criteria.len(), 1);
        assert_eq!(doc.criteria[0].name, "Criterion 1");
        assert_eq!(
            doc.performance_levels,
            vec!["Excellent", "Good", "Satisfactory"]
        );
        doc.validate_structure().unwrap();
    }

    #[test]
    fn table_tier_wins_over_heading_tier() {
        // Both a table and bold labels present: the table decides.
        let text = "**Overview:** what this grades\n| Criteria | Good |\n| Content | fine |";
        let doc = parse(text, &form("4", false)).unwrap();
        assert_eq!(doc.criteria.len(), 1);
        assert_eq!(doc.criteria[0].name, "Content");
        assert_eq!(doc.performance_levels, vec!["Good"]);
    }

    #[test]
    fn empty_input_is_unrecognized() {
        assert!(parse("", &form("4", false)).is_none());
        assert!(parse("   \n \n", &form("4", false)).is_none());
    }

    #[test]
    fn level_count_clamped_to_canonical_list() {
        let doc = parse("prose", &form("12", false)).unwrap();
        assert_eq!(doc.performance_levels.len(), CANONICAL_LEVELS.len());
    }

    #[test]
    fn point_suffix_variants() {
        assert_eq!(split_cell_points("Work (10 pts)", true), ("Work".into(), 10));
        assert_eq!(split_cell_points("Work (5pt)", true), ("Work".into(), 5));
        assert_eq!(split_cell_points("Work (5 PTS)", true), ("Work".into(), 5));
        assert_eq!(split_cell_points("No points here", true), ("No points here".into(), 0));
    }

    #[test]
    fn duplicate_heading_labels_collapse() {
        let text = "**Content:** once\n**Content:** twice\n**Style:** once";
        let doc = parse(text, &form("4", false)).unwrap();
        let names: Vec<&str> = doc.criteria.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Content", "Style"]);
    }
}
