use anyhow::{Context, Result};
use codeprep_workspace::{FileRecordStore, Preferences, Session, WorkspaceConfig};
use std::path::{Path, PathBuf};

/// Everything one invocation works on, loaded from and saved to the session
pub struct AppState {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
    pub store: FileRecordStore,
    pub preferences: Preferences,
    session_path: PathBuf,
}

impl AppState {
    pub async fn open(root: Option<&Path>, session: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };
        let root = root
            .canonicalize()
            .with_context(|| format!("Invalid root directory {}", root.display()))?;

        let config = WorkspaceConfig::load(&root).context("Failed to load configuration")?;
        let session_path = match session {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => root.join(path),
            None => config.session_path(&root),
        };

        let session = Session::load(&session_path)
            .await
            .with_context(|| format!("Failed to read session {}", session_path.display()))?;
        let store = FileRecordStore::from_records(Some(root.clone()), session.records)
            .with_scan_options(config.scan);
        log::debug!(
            "Opened {} ({} tracked files)",
            root.display(),
            store.len()
        );

        Ok(Self {
            root,
            config,
            store,
            preferences: session.preferences,
            session_path,
        })
    }

    pub async fn save(&self) -> Result<()> {
        let session = Session {
            records: self.store.records().to_vec(),
            preferences: self.preferences.clone(),
        };
        session
            .save(&self.session_path)
            .await
            .with_context(|| format!("Failed to save session {}", self.session_path.display()))
    }
}
