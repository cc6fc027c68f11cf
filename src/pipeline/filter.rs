// Strip backend runtime noise out of generated text before any semantic
// processing. Local model backends occasionally flush loader banners and
// key-value metadata dumps into the same stream as the generated rubric;
// those lines must never reach the classifier or the parser.

use std::sync::LazyLock;

use regex::Regex;

/// How aggressively to filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// While text is still streaming: drop only lines matching known
    /// backend-log signatures. A content-looking line could still be the
    /// start of legitimate text, so nothing else is touched.
    Light,
    /// Once generation is complete: also scan the head of the text for a
    /// contiguous prefix of log-like lines and drop the whole prefix.
    Full,
}

/// How many leading lines the full-mode scan inspects when deciding
/// whether a log prefix exists. A confirmed run that fills the whole
/// window is consumed past it to wherever it actually ends, so loader
/// dumps longer than the window still come off in one pass.
const PREFIX_SCAN_LINES: usize = 20;

/// Per-line signatures of backend log output. Anchored and specific:
/// a false positive here would silently eat rubric content.
static LOG_LINE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // llama.cpp loader / context dumps
        Regex::new(r"^\s*llama_model_loader:").unwrap(),
        Regex::new(r"^\s*llama_(?:new_context|kv_cache|init|build|perf)\w*:").unwrap(),
        Regex::new(r"^\s*llm_load_\w+:").unwrap(),
        Regex::new(r"^\s*ggml_\w+:").unwrap(),
        Regex::new(r"^\s*gguf\w*:").unwrap(),
        // model-file metadata dumps: "- kv  12: general.name str = ..."
        Regex::new(r"^\s*-\s*kv\s+\d+:").unwrap(),
        Regex::new(r"^\s*general\.[\w.]+\s*[:=]").unwrap(),
        Regex::new(r"^\s*(?:print_info|load_tensors|load):").unwrap(),
        // build/version banners and run headers
        Regex::new(r"^\s*(?:build|main|system_info|sampler|sampling)\s*[:=]").unwrap(),
        Regex::new(r"^\s*compute buffer").unwrap(),
    ]
});

/// Broader log shapes used only inside the full-mode prefix scan, where
/// position (a contiguous run at the very top) does the disambiguation:
/// bare `key = value` dumps and snake_case/dotted identifiers with a colon.
static PREFIX_LINE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^\s*[\w.]+\s*=\s*\S").unwrap(),
        Regex::new(r"^\s*[a-z0-9]+[_.][a-z0-9_.]*\s*:").unwrap(),
    ]
});

/// True when a line matches a known backend-log signature.
pub(crate) fn is_log_line(line: &str) -> bool {
    LOG_LINE_PATTERNS.iter().any(|re| re.is_match(line))
}

fn is_prefix_log_line(line: &str) -> bool {
    if line.trim().is_empty() {
        return false;
    }
    is_log_line(line) || PREFIX_LINE_PATTERNS.iter().any(|re| re.is_match(line))
}

/// Remove backend/runtime artifacts from generated text. Pure and
/// idempotent: `strip(strip(t, m), m) == strip(t, m)`.
pub fn strip(raw: &str, mode: FilterMode) -> String {
    let deprefixed;
    let text = match mode {
        FilterMode::Light => raw,
        FilterMode::Full => {
            deprefixed = drop_log_prefix(raw);
            deprefixed.as_str()
        }
    };

    let mut kept: Vec<&str> = Vec::new();
    let mut dropped = 0usize;
    for line in text.lines() {
        if is_log_line(line) {
            dropped += 1;
        } else {
            kept.push(line);
        }
    }

    if dropped > 0 {
        // Count only; generated content never goes to the log.
        tracing::debug!(dropped_lines = dropped, ?mode, "stripped backend log lines");
    }

    kept.join("\n")
}

/// Drop a contiguous run of log-like lines at the top of the text.
/// Stops at the first line that looks like content (or a blank line);
/// if line 0 already looks like content, nothing is removed. The run
/// is always consumed to its end, never cut at the scan window, so a
/// second pass finds content on line 0 and removes nothing.
fn drop_log_prefix(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut prefix_len = lines
        .iter()
        .take(PREFIX_SCAN_LINES)
        .take_while(|line| is_prefix_log_line(line))
        .count();
    if prefix_len == 0 {
        return text.to_string();
    }
    if prefix_len == PREFIX_SCAN_LINES {
        prefix_len += lines[PREFIX_SCAN_LINES..]
            .iter()
            .take_while(|line| is_prefix_log_line(line))
            .count();
    }
    tracing::debug!(prefix_lines = prefix_len, "dropped contiguous log prefix");
    lines[prefix_len..].join("\n")
}
