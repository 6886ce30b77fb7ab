use crate::config::{ScanOptions, STATE_DIR};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Result of walking one directory
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Regular files, sorted by path within each directory
    pub files: Vec<PathBuf>,

    /// Entries that could not be read (message carries the path)
    pub errors: Vec<String>,
}

/// Recursive directory enumeration for `add` (.gitignore aware)
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Walk the directory and collect every regular file.
    ///
    /// Directories themselves never appear in the output. Unreadable entries
    /// are reported in [`ScanResult::errors`] and the walk continues.
    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(!self.options.include_hidden)
            .git_ignore(self.options.respect_gitignore)
            .git_global(self.options.respect_gitignore)
            .git_exclude(self.options.respect_gitignore)
            .ignore(self.options.respect_gitignore)
            .parents(self.options.respect_gitignore)
            .require_git(false)
            .max_depth(self.options.max_depth)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(|entry| !Self::is_ignored_scope(entry.path()));

        for entry in builder.build() {
            match entry {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if file_type.is_file() {
                        result.files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    log::warn!("Failed to read entry under {}: {e}", self.root.display());
                    result.errors.push(e.to_string());
                }
            }
        }

        log::debug!(
            "Found {} files under {}",
            result.files.len(),
            self.root.display()
        );
        result
    }

    /// VCS metadata and our own state directory are never tracked, even
    /// when hidden files are included.
    fn is_ignored_scope(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| IGNORED_SCOPES.contains(&name))
    }
}

const IGNORED_SCOPES: &[&str] = &[".git", ".hg", ".svn", STATE_DIR];
