//! # codeprep workspace
//!
//! Tracked file set, prompt composition and reply write-back.
//!
//! ## Flow
//!
//! ```text
//! add paths
//!     │
//!     ├──> FileRecordStore (dedup by relative key, directories via FileScanner)
//!     │      └─> build_tree / toggle / enabled_files
//!     │
//!     ├──> compose (live content, self-reference stripped, trailer)
//!     │      └─> prompt text
//!     │
//!     └──> reply text
//!            ├─> codeprep_text::extract_blocks
//!            ├─> prepare_writes (validate everything first)
//!            └─> write_all (one task per file, retry, DocumentHost)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codeprep_workspace::{compose, FileRecordStore};
//!
//! #[tokio::main]
//! async fn main() -> codeprep_workspace::Result<()> {
//!     let mut store = FileRecordStore::new(Some("/path/to/project".into()));
//!     store.add_files(["src"])?;
//!
//!     let prompt = compose(&store.enabled_files(), None).await?;
//!     println!("{}", prompt.text);
//!     Ok(())
//! }
//! ```

mod composer;
mod config;
mod error;
mod host;
mod prefs;
mod retry;
mod scanner;
mod session;
mod store;
mod tree;
mod writer;

pub use composer::{compose, ComposeFailure, ComposedPrompt};
pub use config::{ScanOptions, WorkspaceConfig, CONFIG_FILE, STATE_DIR};
pub use error::{Result, WorkspaceError};
pub use host::{CommandHost, DocumentHost, NoopHost};
pub use prefs::{Preferences, APPEND_LINE_KEY};
pub use retry::{retry_async, RetryPolicy};
pub use scanner::{FileScanner, ScanResult};
pub use session::Session;
pub use store::{AddFailure, AddReport, FileRecord, FileRecordStore};
pub use tree::{build_tree, find_node, format_tree, TreeNode};
pub use writer::{prepare_writes, write_all, PreparedWrite, WriteOutcome, WriteReport};
