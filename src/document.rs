//! Rubric document model — the typed table the rest of the engine
//! parses into, edits, and serializes back out of.
//!
//! A rubric is a grid: ordered performance levels (columns, highest
//! quality first) × ordered criteria (rows), with descriptive text and
//! optional point values in each cell. The model enforces that the grid
//! stays rectangular; the mutation side of that enforcement lives in
//! `edit`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ═══════════════════════════════════════════
// Origin form metadata (external input)
// ═══════════════════════════════════════════

/// The flat record the generation request form submits. Threaded
/// verbatim into `RubricMetadata` by the parser, never inferred from
/// the generated text body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormMetadata {
    pub assignment_title: String,
    pub assignment_type: String,
    pub subject: String,
    pub grade_level: String,
    #[serde(default)]
    pub learning_objectives: Option<String>,
    #[serde(default)]
    pub specific_requirements: Option<String>,
    /// String-encoded level count, as the form control submits it.
    #[serde(default = "default_level_count")]
    pub performance_levels: String,
    #[serde(default)]
    pub include_point_values: bool,
}

fn default_level_count() -> String {
    "4".to_string()
}

impl FormMetadata {
    /// Requested level count as an integer. Unparseable or zero values
    /// fall back to 4, matching the form's default selection.
    pub fn level_count(&self) -> usize {
        self.performance_levels
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(4)
    }
}

// ═══════════════════════════════════════════
// Document types
// ═══════════════════════════════════════════

/// Document-level metadata. Populated once from the origin form;
/// mutated only through `RubricDocument::update_metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricMetadata {
    pub title: String,
    pub assignment_type: String,
    pub subject: String,
    pub grade_level: String,
    pub learning_objectives: Option<String>,
    pub specific_requirements: Option<String>,
    pub include_point_values: bool,
}

impl RubricMetadata {
    pub fn from_form(form: &FormMetadata) -> Self {
        Self {
            title: form.assignment_title.clone(),
            assignment_type: form.assignment_type.clone(),
            subject: form.subject.clone(),
            grade_level: form.grade_level.clone(),
            learning_objectives: form.learning_objectives.clone(),
            specific_requirements: form.specific_requirements.clone(),
            include_point_values: form.include_point_values,
        }
    }
}

/// One graded dimension of the rubric. `id` is stable for the lifetime
/// of the document; display order is the position in
/// `RubricDocument::criteria`, never derived from the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: Uuid,
    pub name: String,
    /// Level name → descriptive cell text. One entry per performance
    /// level; empty strings permitted.
    pub levels: HashMap<String, String>,
    /// Level name → point value. Present iff the document tracks points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<HashMap<String, u32>>,
}

impl Criterion {
    /// Build a criterion with an empty cell for every given level.
    pub fn blank(name: impl Into<String>, level_names: &[String], with_points: bool) -> Self {
        let levels = level_names
            .iter()
            .map(|l| (l.clone(), String::new()))
            .collect();
        let points = with_points.then(|| level_names.iter().map(|l| (l.clone(), 0u32)).collect());
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            levels,
            points,
        }
    }
}

/// The central entity: metadata + ordered levels × ordered criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricDocument {
    pub metadata: RubricMetadata,
    /// Ordered highest → lowest. No duplicates.
    pub performance_levels: Vec<String>,
    pub criteria: Vec<Criterion>,
}

impl RubricDocument {
    /// Check the structural invariants the edit operations maintain:
    /// rectangular level/text maps, point maps mirroring the levels
    /// exactly when enabled and absent when not, unique criterion ids,
    /// unique level names. Used by tests and when hydrating persisted
    /// snapshots of unknown provenance.
    pub fn validate_structure(&self) -> Result<(), String> {
        for (i, level) in self.performance_levels.iter().enumerate() {
            if self.performance_levels[..i].contains(level) {
                return Err(format!("duplicate performance level '{level}'"));
            }
        }
        let mut seen_ids = Vec::with_capacity(self.criteria.len());
        for criterion in &self.criteria {
            if seen_ids.contains(&criterion.id) {
                return Err(format!("duplicate criterion id {}", criterion.id));
            }
            seen_ids.push(criterion.id);

            if criterion.levels.len() != self.performance_levels.len() {
                return Err(format!(
                    "criterion '{}' has {} level entries, expected {}",
                    criterion.name,
                    criterion.levels.len(),
                    self.performance_levels.len()
                ));
            }
            for level in &self.performance_levels {
                if !criterion.levels.contains_key(level) {
                    return Err(format!(
                        "criterion '{}' missing text entry for level '{level}'",
                        criterion.name
                    ));
                }
            }

            match (&criterion.points, self.metadata.include_point_values) {
                (Some(points), true) => {
                    if points.len() != self.performance_levels.len() {
                        return Err(format!(
                            "criterion '{}' has {} point entries, expected {}",
                            criterion.name,
                            points.len(),
                            self.performance_levels.len()
                        ));
                    }
                    for level in &self.performance_levels {
                        if !points.contains_key(level) {
                            return Err(format!(
                                "criterion '{}' missing point entry for level '{level}'",
                                criterion.name
                            ));
                        }
                    }
                }
                (None, false) => {}
                (Some(_), false) => {
                    return Err(format!(
                        "criterion '{}' carries points but the document does not track them",
                        criterion.name
                    ));
                }
                (None, true) => {
                    return Err(format!(
                        "criterion '{}' missing point map on a point-tracking document",
                        criterion.name
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn criterion(&self, id: &Uuid) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == *id)
    }

    pub(crate) fn criterion_mut(&mut self, id: &Uuid) -> Option<&mut Criterion> {
        self.criteria.iter_mut().find(|c| c.id == *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> FormMetadata {
        FormMetadata {
            assignment_title: "Persuasive Essay".into(),
            assignment_type: "Essay".into(),
            subject: "English Language Arts".into(),
            grade_level: "8".into(),
            learning_objectives: Some("Construct an evidence-backed argument".into()),
            specific_requirements: None,
            performance_levels: "4".into(),
            include_point_values: true,
        }
    }

    #[test]
    fn level_count_parses_form_value() {
        let mut form = sample_form();
        form.performance_levels = "3".into();
        assert_eq!(form.level_count(), 3);
    }

    #[test]
    fn level_count_falls_back_to_four() {
        let mut form = sample_form();
        form.performance_levels = "not a number".into();
        assert_eq!(form.level_count(), 4);
        form.performance_levels = "0".into();
        assert_eq!(form.level_count(), 4);
    }

    #[test]
    fn form_defaults_apply_on_deserialize() {
        let form: FormMetadata = serde_json::from_str(
            r#"{
                "assignment_title": "Lab Report",
                "assignment_type": "Report",
                "subject": "Biology",
                "grade_level": "10"
            }"#,
        )
        .unwrap();
        assert_eq!(form.performance_levels, "4");
        assert!(!form.include_point_values);
        assert!(form.learning_objectives.is_none());
    }

    #[test]
    fn blank_criterion_covers_every_level() {
        let levels: Vec<String> = vec!["Excellent".into(), "Good".into()];
        let criterion = Criterion::blank("Content", &levels, true);
        assert_eq!(criterion.levels.len(), 2);
        assert_eq!(criterion.levels["Excellent"], "");
        assert_eq!(criterion.points.as_ref().unwrap()["Good"], 0);
    }

    #[test]
    fn validate_rejects_missing_level_entry() {
        let form = sample_form();
        let levels: Vec<String> = vec!["Excellent".into(), "Good".into()];
        let mut criterion = Criterion::blank("Content", &levels, true);
        criterion.levels.remove("Good");
        let doc = RubricDocument {
            metadata: RubricMetadata::from_form(&form),
            performance_levels: levels,
            criteria: vec![criterion],
        };
        assert!(doc.validate_structure().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_levels() {
        let form = sample_form();
        let doc = RubricDocument {
            metadata: RubricMetadata::from_form(&form),
            performance_levels: vec!["Good".into(), "Good".into()],
            criteria: vec![],
        };
        assert!(doc.validate_structure().is_err());
    }

    #[test]
    fn validate_rejects_points_on_pointless_document() {
        let mut form = sample_form();
        form.include_point_values = false;
        let levels: Vec<String> = vec!["Excellent".into()];
        let criterion = Criterion::blank("Content", &levels, true);
        let doc = RubricDocument {
            metadata: RubricMetadata::from_form(&form),
            performance_levels: levels,
            criteria: vec![criterion],
        };
        assert!(doc.validate_structure().is_err());
    }
}
