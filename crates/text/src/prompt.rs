//! Outbound rendering: turning file content into prompt text.

use crate::marker::render_marker;
use crate::path::file_name;

/// Drop leading comment lines that only restate the file's own name or path.
///
/// Line comments (`//`, `#`) and single-line block comments are consumed when
/// their text *ends with* the file name or relative path. An unclosed `/*`
/// opener and the lines that follow it, up to and including the `*/` line,
/// are consumed while each line *includes* the name or path. A closer line
/// that does not mention the file stops the scan and stays in the output.
/// The two tests differ on purpose: existing prompts were produced with
/// exactly this rule.
#[must_use]
pub fn strip_self_reference(content: &str, relative_path: &str) -> String {
    let path_lower = relative_path.to_lowercase();
    let name_lower = file_name(&path_lower).to_string();
    let ends_with_self =
        |text: &str| text.ends_with(&name_lower) || text.ends_with(&path_lower);
    let includes_self = |text: &str| text.contains(&name_lower) || text.contains(&path_lower);

    let lines: Vec<&str> = content.split('\n').collect();
    let mut index = 0;
    let mut in_block_comment = false;

    while index < lines.len() {
        let line = lines[index];
        if line.trim().is_empty() {
            index += 1;
            continue;
        }

        let consumed = if in_block_comment {
            let lower = line.to_lowercase();
            if lower.contains("*/") {
                in_block_comment = false;
            }
            includes_self(&lower)
        } else {
            let trimmed = line.trim();
            // Both prefixes drop two characters, so `#a.py` keeps only `.py`.
            let line_comment = trimmed.strip_prefix("//").or_else(|| {
                trimmed.strip_prefix('#').map(|rest| {
                    let mut chars = rest.chars();
                    chars.next();
                    chars.as_str()
                })
            });
            if let Some(rest) = line_comment {
                ends_with_self(&rest.trim().to_lowercase())
            } else if let Some(rest) = trimmed.strip_prefix("/*") {
                match rest.find("*/") {
                    Some(end) => ends_with_self(&rest[..end].trim().to_lowercase()),
                    None => {
                        in_block_comment = true;
                        includes_self(&trimmed.to_lowercase())
                    }
                }
            } else {
                false
            }
        };

        if !consumed {
            break;
        }
        index += 1;
    }

    lines[index.min(lines.len())..].join("\n")
}

/// Fence language tag for a path, derived from its extension.
#[must_use]
pub fn language_hint(relative_path: &str) -> String {
    let name = file_name(relative_path);
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return String::new();
    };
    if stem.is_empty() {
        return String::new();
    }
    let ext = ext.to_lowercase();
    let tag = match ext.as_str() {
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "mts" | "cts" => "typescript",
        "rb" => "ruby",
        "md" => "markdown",
        "sh" | "bash" => "bash",
        "yml" => "yaml",
        "kt" => "kotlin",
        "cs" => "csharp",
        "h" => "c",
        "hpp" | "cc" | "cxx" => "cpp",
        other => other,
    };
    if tag.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '+' | '#' | '-')) {
        tag.to_string()
    } else {
        String::new()
    }
}

/// Render one file as a fenced block led by its `// path` marker.
#[must_use]
pub fn render_fenced_block(relative_path: &str, content: &str) -> String {
    let language = language_hint(relative_path);
    let body = content.trim_end_matches(['\n', '\r']);
    format!(
        "```{language}\n{}\n{body}\n```\n\n",
        render_marker(relative_path)
    )
}

/// Render the trailer line; blank input renders nothing.
#[must_use]
pub fn render_trailer(trailer: &str) -> String {
    let trailer = trailer.trim();
    if trailer.is_empty() {
        String::new()
    } else {
        format!("{trailer}\n\n\n")
    }
}
