//! Block classifier — turns cleaned generated text (complete or still
//! streaming) into an ordered sequence of typed display blocks for the
//! dashboard to render.
//!
//! Classification is an ordered list of line rules evaluated
//! top-to-bottom, first match wins. The input dialect is narrow and
//! model-generated (bold headers, pipe tables, simple lists), so rules
//! stay tolerant: anything unrecognized falls through to a paragraph,
//! and nothing here ever fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::filter::{is_log_line, strip, FilterMode};

// ═══════════════════════════════════════════
// Display blocks (frontend-facing, never persisted)
// ═══════════════════════════════════════════

/// One classified line of generated text. Produced fresh on every
/// render call; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayBlock {
    Heading { text: String },
    /// Trailing colon preserved in the label.
    Subheading { text: String },
    /// Performance-level line like "Excellent: full marks work".
    /// Carries the accent color so the frontend can style it directly.
    LevelCallout {
        level: String,
        text: String,
        accent: String,
    },
    TableRow { cells: Vec<String>, is_header: bool },
    Bullet { text: String },
    Numbered { index: u32, text: String },
    Paragraph { text: String },
    Spacer,
}

/// Options threaded through a render call.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Accent color handed to level callouts, as a CSS color string.
    pub accent_color: String,
    /// True while generation is still in flight; selects light
    /// filtering so partial content is never discarded.
    pub streaming: bool,
}

impl RenderOptions {
    pub fn streaming(accent_color: impl Into<String>) -> Self {
        Self {
            accent_color: accent_color.into(),
            streaming: true,
        }
    }

    pub fn complete(accent_color: impl Into<String>) -> Self {
        Self {
            accent_color: accent_color.into(),
            streaming: false,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            accent_color: "#4f46e5".to_string(),
            streaming: false,
        }
    }
}

// ═══════════════════════════════════════════
// Line rules
// ═══════════════════════════════════════════

/// `**Heading**`: standalone bold, no colon.
static BOLD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^:*]+)\*\*$").unwrap());

/// `**Label:**` or the half-closed `**Label:` the model sometimes emits.
static BOLD_SUBHEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+?):(?:\*\*)?$").unwrap());

/// `1. text`
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").unwrap());

/// Performance-level words that open a callout line, longest first so
/// "Needs Improvement" wins over a bare prefix match.
const LEVEL_WORDS: &[&str] = &[
    "needs improvement",
    "satisfactory",
    "outstanding",
    "proficient",
    "developing",
    "excellent",
    "beginning",
    "advanced",
    "basic",
    "good",
    "fair",
];

/// Match "Excellent: ..." style lines. Returns (level as written, rest).
fn match_level_callout(line: &str) -> Option<(String, String)> {
    let lower = line.to_lowercase();
    for word in LEVEL_WORDS {
        if let Some(rest) = lower.strip_prefix(word) {
            if rest.trim_start().starts_with(':') && line.is_char_boundary(word.len()) {
                let level = line[..word.len()].to_string();
                let text = line[word.len()..]
                    .trim_start()
                    .trim_start_matches(':')
                    .trim()
                    .to_string();
                return Some((level, text));
            }
        }
    }
    None
}

/// Split a pipe-table line into trimmed, non-empty cells.
pub(crate) fn split_table_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// True for `| --- | --- |` style separator rows (alignment colons
/// tolerated), which are consumed and never emitted.
pub(crate) fn is_separator_row(line: &str) -> bool {
    let cells = split_table_cells(line);
    !cells.is_empty()
        && cells
            .iter()
            .all(|c| c.trim_matches(':').chars().all(|ch| ch == '-') && c.contains('-'))
}

/// Bullet markers the model uses, with or without a trailing space.
/// A doubled marker is not a bullet: `**` lines belong to the bold
/// rules (including half-streamed ones) and `---` is a rule line.
fn match_bullet(line: &str) -> Option<String> {
    for marker in ['*', '-', '•'] {
        if let Some(rest) = line.strip_prefix(marker) {
            if !rest.starts_with(marker) {
                return Some(rest.trim().to_string());
            }
        }
    }
    None
}

// ═══════════════════════════════════════════
// Renderer
// ═══════════════════════════════════════════

/// Classify generated text into display blocks. Total and
/// deterministic: every non-dropped line maps to exactly one block,
/// and malformed input degrades to paragraphs rather than failing.
pub fn render(text: &str, opts: &RenderOptions) -> Vec<DisplayBlock> {
    let mode = if opts.streaming {
        FilterMode::Light
    } else {
        FilterMode::Full
    };
    let cleaned = strip(text, mode);

    let mut blocks = Vec::new();
    let mut seen_table_row = false;

    for raw_line in cleaned.lines() {
        let line = raw_line.trim();

        if line.is_empty() {
            blocks.push(DisplayBlock::Spacer);
            continue;
        }
        // Residual noise that survived filtering is dropped, not rendered.
        if is_log_line(line) {
            continue;
        }
        if let Some(caps) = BOLD_HEADING.captures(line) {
            blocks.push(DisplayBlock::Heading {
                text: caps[1].trim().to_string(),
            });
            continue;
        }
        if let Some(caps) = BOLD_SUBHEADING.captures(line) {
            blocks.push(DisplayBlock::Subheading {
                text: format!("{}:", caps[1].trim()),
            });
            continue;
        }
        if let Some((level, text)) = match_level_callout(line) {
            blocks.push(DisplayBlock::LevelCallout {
                level,
                text,
                accent: opts.accent_color.clone(),
            });
            continue;
        }
        if line.contains('|') {
            if is_separator_row(line) {
                continue;
            }
            let cells = split_table_cells(line);
            if !cells.is_empty() {
                let is_header = !seen_table_row;
                seen_table_row = true;
                blocks.push(DisplayBlock::TableRow { cells, is_header });
                continue;
            }
        }
        if let Some(text) = match_bullet(line) {
            blocks.push(DisplayBlock::Bullet { text });
            continue;
        }
        if let Some(caps) = NUMBERED_ITEM.captures(line) {
            if let Ok(index) = caps[1].parse::<u32>() {
                blocks.push(DisplayBlock::Numbered {
                    index,
                    text: caps[2].to_string(),
                });
                continue;
            }
        }
        blocks.push(DisplayBlock::Paragraph {
            text: line.to_string(),
        });
    }

    blocks
}
