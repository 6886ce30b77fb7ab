use crate::error::{Result, WorkspaceError};
use crate::prefs::Preferences;
use crate::store::FileRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

const SESSION_VERSION: u32 = 1;

/// Persisted state between invocations: tracked records and preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub records: Vec<FileRecord>,
    #[serde(default)]
    pub preferences: Preferences,
}

#[derive(Serialize, Deserialize)]
struct SessionEnvelope {
    #[serde(default)]
    version: u32,
    #[serde(flatten)]
    session: Session,
}

impl Session {
    /// Read a session file.
    ///
    /// A missing file is an empty session. A corrupt file is logged and
    /// treated as empty; it is overwritten on the next save.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No session at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(WorkspaceError::io(path, err)),
        };

        match serde_json::from_slice::<SessionEnvelope>(&bytes) {
            Ok(envelope) => {
                if envelope.version != SESSION_VERSION {
                    log::warn!(
                        "Session {} has version {}, expected {SESSION_VERSION}",
                        path.display(),
                        envelope.version
                    );
                }
                Ok(envelope.session)
            }
            Err(err) => {
                log::warn!("Session file corrupted {}: {err}", path.display());
                Ok(Self::default())
            }
        }
    }

    /// Write the session as pretty JSON, creating the parent directory
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| WorkspaceError::io(parent, e))?;
        }
        let envelope = SessionEnvelope {
            version: SESSION_VERSION,
            session: self.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope).map_err(|source| WorkspaceError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, bytes)
            .await
            .map_err(|e| WorkspaceError::io(path, e))?;
        log::debug!(
            "Saved session ({} records) to {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }
}
