//! Generation session — the engine's view of one in-flight rubric
//! generation.
//!
//! The transport (a duplex streaming connection owned by the UI layer)
//! delivers two message shapes: token appends and a terminal done. The
//! session owns the text accumulator, re-renders display blocks on
//! every token with light filtering, and finalizes exactly once with
//! full filtering plus a single parse. Opening, retrying, and closing
//! the channel are the transport's concern, not ours.

use serde::{Deserialize, Serialize};

use crate::document::{FormMetadata, RubricDocument};
use crate::pipeline::filter::{strip, FilterMode};
use crate::pipeline::parser;
use crate::pipeline::render::{render, DisplayBlock, RenderOptions};

/// Wire messages arriving on the generation channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationMessage {
    Token {
        content: String,
    },
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        full_response: Option<String>,
    },
}

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No tokens received yet.
    Idle,
    /// Tokens are arriving; only light filtering is safe.
    Streaming,
    /// Terminal message seen; text is final.
    Complete,
}

/// Accumulator for one generation. Single-writer and synchronous:
/// one active session per editing view, driven from the UI event loop.
#[derive(Debug, Clone)]
pub struct GenerationSession {
    accumulated: String,
    state: SessionState,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self {
            accumulated: String::new(),
            state: SessionState::Idle,
        }
    }

    /// Apply one channel message and report the resulting state.
    /// Tokens append to the accumulator; the done message prefers the
    /// accumulated text and only falls back to `full_response` when
    /// nothing was streamed.
    pub fn push(&mut self, message: GenerationMessage) -> SessionState {
        match message {
            GenerationMessage::Token { content } => {
                self.accumulated.push_str(&content);
                self.state = SessionState::Streaming;
            }
            GenerationMessage::Done { full_response } => {
                if self.accumulated.trim().is_empty() {
                    self.accumulated = full_response.unwrap_or_default();
                }
                self.state = SessionState::Complete;
            }
        }
        self.state
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Raw accumulated text, unfiltered.
    pub fn text(&self) -> &str {
        &self.accumulated
    }

    /// Accumulated text after artifact filtering at the strength the
    /// current state allows.
    pub fn cleaned_text(&self) -> String {
        let mode = if self.is_complete() {
            FilterMode::Full
        } else {
            FilterMode::Light
        };
        strip(&self.accumulated, mode)
    }

    /// Classify the accumulated text for display. Called once per
    /// received token while streaming, and again after completion.
    pub fn render(&self, accent_color: &str) -> Vec<DisplayBlock> {
        let opts = RenderOptions {
            accent_color: accent_color.to_string(),
            streaming: !self.is_complete(),
        };
        render(&self.accumulated, &opts)
    }

    /// Full-mode strip plus one parse. Normally called after the done
    /// message; calling it on an interrupted session treats whatever
    /// partial text accumulated as final input, which is the engine's
    /// whole obligation on cancellation. The alternative is `discard`.
    pub fn finalize(&self, form: &FormMetadata) -> Option<RubricDocument> {
        let cleaned = strip(&self.accumulated, FilterMode::Full);
        parser::parse(&cleaned, form)
    }

    /// Drop the accumulated text without parsing it.
    pub fn discard(self) {}
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}
