//! Persistence contract — what the engine hands to and expects back
//! from the storage collaborator.
//!
//! Storage itself (REST, key-value, whatever the host app uses) lives
//! outside this crate; the engine only defines the saved record and a
//! narrow trait so UI code can swap backends and tests can use an
//! in-memory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{FormMetadata, RubricDocument};
use crate::pipeline::filter::{strip, FilterMode};
use crate::pipeline::parser;

/// One persisted rubric: the origin form, the serialized text, and
/// optionally the last-known structured document so loads can skip
/// re-parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRubric {
    pub id: Uuid,
    pub title: String,
    pub saved_at: DateTime<Utc>,
    pub form: FormMetadata,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<RubricDocument>,
}

impl SavedRubric {
    pub fn new(form: FormMetadata, text: String, document: Option<RubricDocument>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: form.assignment_title.clone(),
            saved_at: Utc::now(),
            form,
            text,
            document,
        }
    }

    /// Structured document for this record. Uses the stored snapshot
    /// when one is present and still structurally sound; otherwise
    /// parses the stored text. `None` means the text itself holds
    /// nothing parseable and the record is view-only.
    pub fn hydrate(&self) -> Option<RubricDocument> {
        if let Some(doc) = &self.document {
            match doc.validate_structure() {
                Ok(()) => return Some(doc.clone()),
                Err(reason) => {
                    tracing::warn!(id = %self.id, %reason, "stored snapshot invalid; re-parsing text");
                }
            }
        }
        let cleaned = strip(&self.text, FilterMode::Full);
        parser::parse(&cleaned, &self.form)
    }
}

/// Storage collaborator boundary. Implementations own their error
/// type; the engine never interprets it beyond surfacing it.
pub trait RubricStore {
    type Error: std::error::Error;

    fn save(&mut self, record: &SavedRubric) -> Result<(), Self::Error>;
    fn load(&self, id: &Uuid) -> Result<Option<SavedRubric>, Self::Error>;
    fn list(&self) -> Result<Vec<SavedRubric>, Self::Error>;
    fn delete(&mut self, id: &Uuid) -> Result<bool, Self::Error>;
}
