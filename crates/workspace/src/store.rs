use crate::config::ScanOptions;
use crate::error::{Result, WorkspaceError};
use crate::scanner::FileScanner;
use crate::tree::{build_tree, find_node, TreeNode};
use codeprep_text::path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Workspace-relative, `/`-separated key (unique within a store)
    pub path: String,

    /// Absolute location, resolved once at add time
    pub full_path: PathBuf,

    #[serde(default)]
    pub disabled: bool,
}

impl FileRecord {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// Entry of an add batch that could not be tracked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFailure {
    pub path: String,
    pub message: String,
}

/// Outcome of [`FileRecordStore::add_files`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddReport {
    /// Keys of newly tracked records
    pub added: Vec<String>,
    /// Keys that were already tracked
    pub skipped: Vec<String>,
    pub failed: Vec<AddFailure>,
}

/// Ordered registry of tracked files
#[derive(Debug, Clone, Default)]
pub struct FileRecordStore {
    base_dir: Option<PathBuf>,
    scan: ScanOptions,
    records: Vec<FileRecord>,
}

impl FileRecordStore {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self {
            base_dir,
            scan: ScanOptions::default(),
            records: Vec::new(),
        }
    }

    /// Restore a store from persisted records; duplicate keys keep the first
    pub fn from_records(base_dir: Option<PathBuf>, records: Vec<FileRecord>) -> Self {
        let mut store = Self::new(base_dir);
        for record in records {
            if store.position(&record.path).is_some() {
                log::warn!("Dropping duplicate record {}", record.path);
                continue;
            }
            store.records.push(record);
        }
        store
    }

    #[must_use]
    pub fn with_scan_options(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }

    pub fn set_scan_options(&mut self, scan: ScanOptions) {
        self.scan = scan;
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Enabled records, in insertion order
    pub fn enabled_files(&self) -> Vec<FileRecord> {
        self.records
            .iter()
            .filter(|r| r.is_enabled())
            .cloned()
            .collect()
    }

    /// Track files and (recursively) the files inside directories.
    ///
    /// Fails before touching anything when no base directory is open.
    /// Per-path filesystem errors land in [`AddReport::failed`].
    pub fn add_files<I, S>(&mut self, paths: I) -> Result<AddReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(base) = self.base_dir.clone() else {
            let first = paths
                .into_iter()
                .next()
                .map(|p| p.as_ref().to_string())
                .unwrap_or_default();
            return Err(WorkspaceError::NoBaseDirectory(first));
        };

        let mut report = AddReport::default();
        for raw in paths {
            let raw = raw.as_ref();
            let full_path = path::resolve(Some(&base), raw)?;
            match std::fs::metadata(&full_path) {
                Ok(meta) if meta.is_dir() => {
                    let scan = FileScanner::new(&full_path, self.scan).scan();
                    for message in scan.errors {
                        report.failed.push(AddFailure {
                            path: raw.to_string(),
                            message,
                        });
                    }
                    for file in scan.files {
                        self.track(&base, file, &mut report);
                    }
                }
                Ok(_) => self.track(&base, full_path, &mut report),
                Err(err) => {
                    log::warn!("Cannot add {}: {err}", full_path.display());
                    report.failed.push(AddFailure {
                        path: raw.to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Added {} files ({} already tracked, {} failed)",
            report.added.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn track(&mut self, base: &Path, full_path: PathBuf, report: &mut AddReport) {
        let key = path::relative_to(base, &full_path);
        if self.position(&key).is_some() {
            log::debug!("Already tracking {key}");
            report.skipped.push(key);
            return;
        }
        log::debug!("Tracking {key}");
        self.records.push(FileRecord {
            path: key.clone(),
            full_path: path::clean(&full_path),
            disabled: false,
        });
        report.added.push(key);
    }

    /// Stop tracking one file (exact match on the normalized key)
    pub fn remove_file(&mut self, key: &str) -> Result<FileRecord> {
        let key = path::normalize(key);
        let index = self
            .position(&key)
            .ok_or_else(|| WorkspaceError::not_found(format!("{key} is not in the file list")))?;
        Ok(self.records.remove(index))
    }

    pub fn clear_files(&mut self) {
        self.records.clear();
    }

    /// Flip a leaf; for a folder, disable everything below it if anything
    /// below it is enabled, otherwise enable everything.
    pub fn toggle(&mut self, node: &TreeNode) {
        match node {
            TreeNode::Leaf { record, .. } => {
                if let Some(index) = self.position(&record.path) {
                    let target = &mut self.records[index];
                    target.disabled = !target.disabled;
                }
            }
            TreeNode::Folder { .. } => {
                let keys: Vec<&str> = node.records().iter().map(|r| r.path.as_str()).collect();
                let any_enabled = self
                    .records
                    .iter()
                    .any(|r| r.is_enabled() && keys.contains(&r.path.as_str()));
                for record in &mut self.records {
                    if keys.contains(&record.path.as_str()) {
                        record.disabled = any_enabled;
                    }
                }
            }
        }
    }

    /// Toggle the leaf or folder at a `/`-separated path
    pub fn toggle_path(&mut self, key: &str) -> Result<()> {
        let key = path::normalize(key);
        let tree = self.build_tree();
        let node = find_node(&tree, &key)
            .ok_or_else(|| WorkspaceError::not_found(format!("{key} is not in the file tree")))?
            .clone();
        self.toggle(&node);
        Ok(())
    }

    pub fn build_tree(&self) -> Vec<TreeNode> {
        build_tree(&self.records)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.records.iter().position(|r| r.path == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_add_requires_base() {
        let mut store = FileRecordStore::new(None);
        let err = store.add_files(["src/a.rs"]).unwrap_err();
        assert!(matches!(err, WorkspaceError::NoBaseDirectory(p) if p == "src/a.rs"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_dedups_by_key() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), b"a").unwrap();
        let mut store = FileRecordStore::new(Some(temp.path().to_path_buf()));

        let first = store.add_files(["a.txt"]).unwrap();
        let absolute = temp.path().join("a.txt");
        let second = store
            .add_files([absolute.to_string_lossy().as_ref()])
            .unwrap();

        assert_eq!(first.added, vec!["a.txt"]);
        assert_eq!(second.skipped, vec!["a.txt"]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_path_is_reported_not_fatal() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("ok.txt"), b"ok").unwrap();
        let mut store = FileRecordStore::new(Some(temp.path().to_path_buf()));

        let report = store.add_files(["missing.txt", "ok.txt"]).unwrap();
        assert_eq!(report.added, vec!["ok.txt"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, "missing.txt");
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let mut store = FileRecordStore::new(Some(PathBuf::from("/work")));
        let err = store.remove_file("nope.rs").unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound(_)));
    }

    #[test]
    fn test_leaf_toggle_and_enabled_files() {
        let records = vec![
            FileRecord {
                path: "a.rs".to_string(),
                full_path: PathBuf::from("/work/a.rs"),
                disabled: false,
            },
            FileRecord {
                path: "b.rs".to_string(),
                full_path: PathBuf::from("/work/b.rs"),
                disabled: false,
            },
        ];
        let mut store = FileRecordStore::from_records(Some(PathBuf::from("/work")), records);

        store.toggle_path("a.rs").unwrap();
        let enabled: Vec<String> = store.enabled_files().into_iter().map(|r| r.path).collect();
        assert_eq!(enabled, vec!["b.rs"]);

        store.toggle_path("a.rs").unwrap();
        assert_eq!(store.enabled_files().len(), 2);
        assert!(store.toggle_path("c.rs").is_err());
    }

    #[test]
    fn test_from_records_drops_duplicates() {
        let record = FileRecord {
            path: "a.rs".to_string(),
            full_path: PathBuf::from("/work/a.rs"),
            disabled: false,
        };
        let store = FileRecordStore::from_records(None, vec![record.clone(), record]);
        assert_eq!(store.len(), 1);
    }
}
