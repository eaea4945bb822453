//! Presentation cleanup of raw generated text.
//!
//! Strips emphasis/heading markup, converts paragraph breaks and
//! newlines, and wraps the result in a single paragraph container.
//! Deterministic; idempotence is not claimed.

use std::sync::LazyLock;

use regex::Regex;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*]+").expect("valid regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

/// Clean a generated plan for display.
///
/// 1. Remove `#`/`*` markup runs
/// 2. Trim surrounding whitespace
/// 3. Collapse blank-line runs into a paragraph break
/// 4. Convert remaining newlines into line breaks
/// 5. Wrap in a paragraph container
pub fn clean_plan_text(raw: &str) -> String {
    let text = MARKUP_RE.replace_all(raw, "");
    let text = text.trim();
    let text = BLANK_LINES_RE.replace_all(text, "</p><p>");
    let text = text.replace('\n', "<br>");
    format!("<p>{text}</p>")
}
