use crate::error::{Result, WorkspaceError};
use async_trait::async_trait;
use std::path::Path;

/// The editor side of a write: reformat and persist a freshly written file.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    async fn format_and_save(&self, path: &Path) -> Result<()>;
}

/// Host that leaves written files as they are
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

#[async_trait]
impl DocumentHost for NoopHost {
    async fn format_and_save(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Host that runs an external formatter on each file.
///
/// A `{path}` argument is replaced by the file path; without one the path
/// is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHost {
    program: String,
    args: Vec<String>,
}

impl CommandHost {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line (no quoting)
    pub fn parse(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            WorkspaceError::InvalidConfig("format command must not be empty".to_string())
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    fn arguments_for(&self, path: &Path) -> Vec<String> {
        let path = path.to_string_lossy();
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains("{path}") {
                    substituted = true;
                    arg.replace("{path}", &path)
                } else {
                    arg.clone()
                }
            })
            .collect();
        if !substituted {
            args.push(path.into_owned());
        }
        args
    }
}

#[async_trait]
impl DocumentHost for CommandHost {
    async fn format_and_save(&self, path: &Path) -> Result<()> {
        let args = self.arguments_for(path);
        log::debug!("Running {} {}", self.program, args.join(" "));

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| WorkspaceError::host(path, format!("cannot run {}: {e}", self.program)))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(WorkspaceError::host(
            path,
            format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
        ))
    }
}
