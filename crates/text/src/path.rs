use crate::error::{Result, TextError};
use std::path::{Component, Path, PathBuf};

/// Rewrite every path separator to `/`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut value = raw.replace('\\', "/");
    if std::path::MAIN_SEPARATOR != '/' && std::path::MAIN_SEPARATOR != '\\' {
        value = value.replace(std::path::MAIN_SEPARATOR, "/");
    }
    value
}

/// Resolve `maybe_relative` against `base`.
///
/// Absolute input is returned as-is (after normalization). Relative input
/// requires a base directory.
pub fn resolve(base: Option<&Path>, maybe_relative: &str) -> Result<PathBuf> {
    let normalized = normalize(maybe_relative.trim());
    let candidate = Path::new(&normalized);
    if candidate.is_absolute() {
        return Ok(clean(candidate));
    }

    let Some(base) = base else {
        return Err(TextError::no_base_directory(normalized));
    };
    Ok(clean(&base.join(candidate)))
}

/// The `/`-separated key of `absolute` relative to `base`.
///
/// Paths outside `base` keep their full normalized form.
#[must_use]
pub fn relative_to(base: &Path, absolute: &Path) -> String {
    let absolute = clean(absolute);
    let base = clean(base);
    match absolute.strip_prefix(&base) {
        Ok(rel) if !rel.as_os_str().is_empty() => normalize(&rel.to_string_lossy()),
        _ => normalize(&absolute.to_string_lossy()),
    }
}

/// Last `/`-separated segment of a normalized path.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lexically drop `.` segments and fold `..` into the preceding segment.
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
