use crate::error::{Result, WorkspaceError};
use crate::host::DocumentHost;
use crate::retry::{retry_async, RetryPolicy};
use codeprep_text::{detect_leading_path, path, strip_leading_path_line, ExtractedBlock};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// A validated block, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedWrite {
    /// Path as it appeared in the reply (normalized)
    pub display_path: String,
    /// Absolute target
    pub path: PathBuf,
    pub content: String,
}

/// Validate and resolve every block; nothing is written here.
///
/// Any failure rejects the whole batch so a bad reply never leaves the tree
/// half-updated. A leading marker that names the block's own file, by path
/// or by file name alone, is removed from the content.
pub fn prepare_writes(blocks: &[ExtractedBlock], base: Option<&Path>) -> Result<Vec<PreparedWrite>> {
    let mut prepared = Vec::with_capacity(blocks.len());
    let mut seen = HashSet::new();

    for block in blocks {
        let raw = block.file_path.as_deref().ok_or(WorkspaceError::AmbiguousPath)?;
        let display_path = path::normalize(raw.trim());
        if display_path.is_empty() {
            return Err(WorkspaceError::validation("block has an empty file path"));
        }
        if block.code.trim().is_empty() {
            return Err(WorkspaceError::validation(format!(
                "{display_path}: block has no content"
            )));
        }

        let target = path::resolve(base, &display_path)?;
        if !seen.insert(target.clone()) {
            return Err(WorkspaceError::validation(format!(
                "{display_path} appears more than once in the reply"
            )));
        }

        let restates_own_path = detect_leading_path(&block.code)
            .is_some_and(|marker| names_same_file(&marker, &display_path));
        let mut content = if restates_own_path {
            strip_leading_path_line(&block.code)
        } else {
            block.code.clone()
        };
        if !content.ends_with('\n') {
            content.push('\n');
        }

        prepared.push(PreparedWrite {
            display_path,
            path: target,
            content,
        });
    }

    Ok(prepared)
}

/// A marker names the target when it is the same path or shares its file
/// name (`// a.js` above `src/a.js`).
fn names_same_file(marker: &str, target: &str) -> bool {
    let marker = path::normalize(marker.trim()).to_lowercase();
    let target = target.to_lowercase();
    marker == target || path::file_name(&marker) == path::file_name(&target)
}

/// Outcome for one file of a batch
#[derive(Debug)]
pub struct WriteOutcome {
    pub display_path: String,
    pub path: PathBuf,
    /// `Ok(true)` when the file did not exist before the write
    pub result: Result<bool>,
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn created(&self) -> bool {
        matches!(self.result, Ok(true))
    }
}

/// Per-file outcomes, in the order the writes were prepared
#[derive(Debug, Default)]
pub struct WriteReport {
    pub outcomes: Vec<WriteOutcome>,
}

impl WriteReport {
    pub fn succeeded(&self) -> Vec<&WriteOutcome> {
        self.outcomes.iter().filter(|o| o.is_success()).collect()
    }

    pub fn failed(&self) -> Vec<&WriteOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success()).collect()
    }

    pub fn first_error(&self) -> Option<&WorkspaceError> {
        self.outcomes.iter().find_map(|o| o.result.as_ref().err())
    }

    pub fn is_complete_success(&self) -> bool {
        self.outcomes.iter().all(WriteOutcome::is_success)
    }
}

/// Write every prepared file concurrently and collect all outcomes.
///
/// Each file is an independent task: create parent directories, write,
/// then `format_and_save`, the whole step wrapped in the retry budget. One
/// failure never cancels its siblings.
pub async fn write_all(
    prepared: Vec<PreparedWrite>,
    host: Arc<dyn DocumentHost>,
    policy: RetryPolicy,
) -> WriteReport {
    let total = prepared.len();
    let mut slots: Vec<Option<WriteOutcome>> = (0..total).map(|_| None).collect();
    let mut pending: Vec<(String, PathBuf)> = Vec::with_capacity(total);
    let mut tasks = JoinSet::new();

    for (index, write) in prepared.into_iter().enumerate() {
        pending.push((write.display_path.clone(), write.path.clone()));
        let host = Arc::clone(&host);
        tasks.spawn(async move {
            let existed = tokio::fs::try_exists(&write.path).await.unwrap_or(false);
            let label = format!("write {}", write.display_path);
            let result = retry_async(policy, &label, |_| {
                write_one(&write.path, &write.content, host.as_ref())
            })
            .await
            .map(|()| !existed);
            (
                index,
                WriteOutcome {
                    display_path: write.display_path,
                    path: write.path,
                    result,
                },
            )
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                match &outcome.result {
                    Ok(created) => log::info!(
                        "{} {}",
                        if *created { "Created" } else { "Updated" },
                        outcome.display_path
                    ),
                    Err(err) => log::error!("Could not write {}: {err}", outcome.display_path),
                }
                slots[index] = Some(outcome);
            }
            Err(err) => log::error!("Write task aborted: {err}"),
        }
    }

    let outcomes = slots
        .into_iter()
        .zip(pending)
        .map(|(slot, (display_path, path))| {
            slot.unwrap_or_else(|| WriteOutcome {
                result: Err(WorkspaceError::host(&path, "write task aborted")),
                display_path,
                path,
            })
        })
        .collect();
    WriteReport { outcomes }
}

async fn write_one(path: &Path, content: &str, host: &dyn DocumentHost) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| WorkspaceError::io(parent, e))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| WorkspaceError::io(path, e))?;
    host.format_and_save(path).await
}
