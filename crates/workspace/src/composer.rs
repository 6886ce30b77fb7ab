use crate::error::{Result, WorkspaceError};
use crate::store::FileRecord;
use codeprep_text::{render_fenced_block, render_trailer, strip_self_reference};

/// A file that was skipped while composing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeFailure {
    pub path: String,
    pub message: String,
}

/// The prompt text plus what went into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub text: String,
    /// Keys rendered into `text`, in order
    pub included: Vec<String>,
    pub failures: Vec<ComposeFailure>,
}

/// Serialize the enabled records into one prompt.
///
/// Content is read live from `full_path`. Unreadable files are recorded in
/// [`ComposedPrompt::failures`] and left out.
pub async fn compose(enabled: &[FileRecord], trailer: Option<&str>) -> Result<ComposedPrompt> {
    if enabled.is_empty() {
        return Err(WorkspaceError::NothingToCompose);
    }

    let mut text = String::new();
    let mut included = Vec::with_capacity(enabled.len());
    let mut failures = Vec::new();

    for record in enabled {
        let content = match tokio::fs::read_to_string(&record.full_path).await {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Skipping {}: {err}", record.full_path.display());
                failures.push(ComposeFailure {
                    path: record.path.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        };

        let body = strip_self_reference(&content, &record.path);
        text.push_str(&render_fenced_block(&record.path, &body));
        included.push(record.path.clone());
    }

    if let Some(trailer) = trailer {
        text.push_str(&render_trailer(trailer));
    }

    log::debug!(
        "Composed prompt from {} files ({} skipped, {} chars)",
        included.len(),
        failures.len(),
        text.len()
    );
    Ok(ComposedPrompt {
        text,
        included,
        failures,
    })
}
