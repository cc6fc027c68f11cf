//! Rubricore — the rubric document engine behind the teacher dashboard.
//!
//! The pipeline: generated text arrives incrementally on a streaming
//! channel → artifact filter (light) → block classifier → live display.
//! On completion → artifact filter (full) → table/rubric parser → typed
//! `RubricDocument` → edit operations → serializer → text, which feeds
//! both the classifier (display) and the persistence collaborator.
//!
//! Everything here is synchronous and pure or single-writer; transport,
//! routing, auth, and styling belong to the hosting application.

pub mod document; // Rubric data model + origin form metadata
pub mod edit; // Structural mutations with invariant enforcement
pub mod pipeline; // Filter → classify → parse → serialize
pub mod session; // Streaming accumulator over the generation channel
pub mod store; // Persistence collaborator contract

pub use document::{Criterion, FormMetadata, RubricDocument, RubricMetadata};
pub use edit::{EditError, MoveDirection, MIN_LEVEL_COUNT};
pub use pipeline::filter::{strip, FilterMode};
pub use pipeline::parser::{parse, CANONICAL_LEVELS};
pub use pipeline::render::{render, DisplayBlock, RenderOptions};
pub use pipeline::serialize::serialize;
pub use session::{GenerationMessage, GenerationSession, SessionState};
pub use store::{RubricStore, SavedRubric};
