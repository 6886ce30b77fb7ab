//! Leading "file marker" lines.
//!
//! A marker is the first non-blank line of a block when that line declares
//! the path the block belongs to, e.g. `// src/main.rs` or `--- src/main.rs ---`.
//! Markers are only recognized at the very start of the content.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Syntax of a recognized marker line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum MarkerStyle {
    /// `// path`
    LineComment,
    /// `# path`
    HashComment,
    /// `<!-- path -->`
    HtmlComment,
    /// `/* path */`
    BlockComment,
    /// `; path`
    SemicolonComment,
    /// `% path`
    PercentComment,
    /// `--- path ---`
    Rule,
}

impl MarkerStyle {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LineComment => "line-comment",
            Self::HashComment => "hash-comment",
            Self::HtmlComment => "html-comment",
            Self::BlockComment => "block-comment",
            Self::SemicolonComment => "semicolon-comment",
            Self::PercentComment => "percent-comment",
            Self::Rule => "rule",
        }
    }
}

/// A marker found on a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub style: MarkerStyle,
    pub path: String,
}

struct MarkerPattern {
    style: MarkerStyle,
    regex: Regex,
}

// Priority order. The first pattern that captures a non-empty path wins.
static MARKER_PATTERNS: Lazy<Vec<MarkerPattern>> = Lazy::new(|| {
    [
        (MarkerStyle::LineComment, r"^//\s*(.+)$"),
        (MarkerStyle::HashComment, r"^#\s*(.+)$"),
        (MarkerStyle::HtmlComment, r"^<!--\s*(.+?)\s*-->"),
        (MarkerStyle::BlockComment, r"^/\*\s*(.+?)\s*\*/$"),
        (MarkerStyle::SemicolonComment, r"^;\s*(.+)$"),
        (MarkerStyle::PercentComment, r"^%\s*(.+)$"),
        (MarkerStyle::Rule, r"^---\s*(.+?)\s*---$"),
    ]
    .into_iter()
    .map(|(style, pattern)| MarkerPattern {
        style,
        regex: Regex::new(pattern).expect("marker pattern must compile"),
    })
    .collect()
});

/// Match a single line against the marker grammar.
#[must_use]
pub fn match_marker(line: &str) -> Option<Marker> {
    let line = line.trim();
    MARKER_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.regex.captures(line)?;
        let path = captures.get(1)?.as_str().trim();
        if path.is_empty() {
            return None;
        }
        Some(Marker {
            style: pattern.style,
            path: path.to_string(),
        })
    })
}

/// Index of the first non-blank line together with its marker, if any.
fn leading_marker(lines: &[&str]) -> Option<(usize, Option<Marker>)> {
    let index = lines.iter().position(|line| !line.trim().is_empty())?;
    Some((index, match_marker(lines[index])))
}

/// Path declared by the first non-blank line of `text`.
///
/// Returns `None` when that line is not a marker. A `/*` opener that is not
/// closed on the same line never matches.
#[must_use]
pub fn detect_leading_path(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let (_, marker) = leading_marker(&lines)?;
    marker.map(|m| m.path)
}

/// Remove the leading marker line, if present.
///
/// On a match the whole line is dropped and the remainder is trimmed;
/// otherwise `text` is returned unchanged.
#[must_use]
pub fn strip_leading_path_line(text: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    match leading_marker(&lines) {
        Some((index, Some(_))) => {
            lines.remove(index);
            lines.join("\n").trim().to_string()
        }
        _ => text.to_string(),
    }
}

/// The canonical marker line emitted for `path`.
#[must_use]
pub fn render_marker(path: &str) -> String {
    format!("// {path}")
}
