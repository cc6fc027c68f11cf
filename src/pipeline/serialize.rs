//! Rubric serializer — deterministic document → text transform, the
//! structural inverse of the parser. Used for persistence and for
//! re-feeding the block classifier after an edit.

use std::fmt::Write;

use crate::document::RubricDocument;

/// Serialize a rubric document back into the pipe-table text dialect.
/// Pure and total: row/column order mirrors the document exactly, and
/// `parse(serialize(doc), form)` recovers the same grid.
pub fn serialize(doc: &RubricDocument) -> String {
    let meta = &doc.metadata;
    let mut out = String::new();

    // Metadata header block. Write! to String is infallible.
    let _ = writeln!(out, "**{}**", meta.title);
    out.push('\n');
    let _ = writeln!(out, "Assignment Type: {}", meta.assignment_type);
    let _ = writeln!(out, "Subject: {}", meta.subject);
    let _ = writeln!(out, "Grade Level: {}", meta.grade_level);
    if let Some(objectives) = meta.learning_objectives.as_deref().filter(|s| !s.is_empty()) {
        out.push('\n');
        let _ = writeln!(out, "Learning Objectives: {objectives}");
    }
    if let Some(requirements) = meta
        .specific_requirements
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        out.push('\n');
        let _ = writeln!(out, "Specific Requirements: {requirements}");
    }
    out.push('\n');

    // Header row, then a separator row of equal-width cells.
    let _ = writeln!(
        out,
        "| Criteria | {} |",
        doc.performance_levels.join(" | ")
    );
    let separator: Vec<&str> = std::iter::repeat("---")
        .take(doc.performance_levels.len() + 1)
        .collect();
    let _ = writeln!(out, "| {} |", separator.join(" | "));

    for criterion in &doc.criteria {
        let mut row = String::new();
        let _ = write!(row, "| {} ", criterion.name);
        for level in &doc.performance_levels {
            let text = criterion
                .levels
                .get(level)
                .map(String::as_str)
                .unwrap_or("");
            let points = criterion
                .points
                .as_ref()
                .and_then(|p| p.get(level))
                .copied()
                .unwrap_or(0);
            if meta.include_point_values && points > 0 {
                let _ = write!(row, "| {text} ({points} pts) ");
            } else {
                let _ = write!(row, "| {text} ");
            }
        }
        row.push('|');
        let _ = writeln!(out, "{row}");
    }

    out
}
