//! Post-processing: deterministic cleanup of raw OCR page text.
//!
//! Tesseract output carries a few artefacts that have nothing to do with the
//! page content: a trailing form feed after every page, CRLF line endings on
//! Windows builds, runs of blank lines where it found large vertical gaps, and
//! occasionally zero-width characters from the language model.
//!
//! Rules run in order: normalise line endings before trimming, strip control
//! characters before collapsing blank lines so removed form feeds do not leave
//! gaps behind.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw text of one page.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip form feeds and invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 2+ consecutive blank lines down to 1
/// 5. Trim leading and trailing blank lines
///
/// A page with no recognisable text yields the empty string.
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    trim_blank_edges(&s)
}

/// Ensure the document ends with a newline.
///
/// Existing trailing newlines are kept: after a failed last page they are the
/// separator in front of its empty slot.
pub fn ensure_final_newline(input: &str) -> String {
    let mut out = normalise_line_endings(input);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove form feeds and invisible Unicode ─────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{000C}', '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 5: Trim blank edges ─────────────────────────────────────────────────

fn trim_blank_edges(input: &str) -> String {
    input.trim_matches('\n').to_string()
}
