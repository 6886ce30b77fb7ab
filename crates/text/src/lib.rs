//! # codeprep text engine
//!
//! Bidirectional transform between tracked files and a single text blob that
//! holds several "virtual files".
//!
//! ## Architecture
//!
//! ```text
//! Outbound (files -> prompt)
//!     │
//!     ├──> strip_self_reference (drop leading "// this/file.rs" comments)
//!     └──> render_fenced_block  (```lang + "// path" marker + body)
//!
//! Inbound (reply -> files)
//!     │
//!     ├──> BlockExtractor (strategies tried in order, first hit wins)
//!     │    ├─> rule + bold path + fence
//!     │    ├─> "--- path ---" + fence
//!     │    ├─> fence with a marker on its first line
//!     │    ├─> "### path" + fence
//!     │    └─> fallback: whole text, leading marker if any
//!     │
//!     └──> path::resolve against the base directory
//! ```
//!
//! ## Example
//!
//! ```rust
//! use codeprep_text::{extract_blocks, BlockFormat};
//!
//! let reply = "--- src/a.js ---\n```js\nconsole.log(\"hi\");\n```\n";
//! let extraction = extract_blocks(reply);
//!
//! assert_eq!(extraction.format, BlockFormat::RuleFence);
//! assert_eq!(extraction.blocks[0].file_path.as_deref(), Some("src/a.js"));
//! assert_eq!(extraction.blocks[0].code, "// src/a.js\nconsole.log(\"hi\");");
//! ```

mod error;
mod extractor;
pub mod marker;
pub mod path;
mod prompt;
mod types;

pub use error::{Result, TextError};
pub use extractor::{
    extract_blocks, BlockExtractor, ExtractStrategy, HeadingFenceStrategy, MarkedFenceStrategy,
    RuleBoldFenceStrategy, RuleFenceStrategy,
};
pub use marker::{detect_leading_path, strip_leading_path_line, Marker, MarkerStyle};
pub use prompt::{language_hint, render_fenced_block, render_trailer, strip_self_reference};
pub use types::{BlockFormat, ExtractedBlock, Extraction};
