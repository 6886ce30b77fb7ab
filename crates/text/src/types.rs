use serde::{Deserialize, Serialize};

/// One virtual file pulled out of a pasted reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBlock {
    /// Declared path; `None` only for an undecorated fallback block
    pub file_path: Option<String>,

    /// Fence language tag (may be empty)
    #[serde(default)]
    pub language: String,

    /// Block content
    pub code: String,
}

impl ExtractedBlock {
    /// Create a block with a known path
    #[must_use]
    pub fn new(
        file_path: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            file_path: Some(file_path.into()),
            language: language.into(),
            code: code.into(),
        }
    }

    /// Whether the path could not be determined
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        self.file_path.is_none()
    }
}

/// Layout that produced an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockFormat {
    /// `---` / `**path**` / fence
    RuleBoldFence,
    /// `--- path ---` / fence
    RuleFence,
    /// fence whose first line is a marker
    MarkedFence,
    /// `### path` / fence
    HeadingFence,
    /// whole input as one block
    Fallback,
}

impl BlockFormat {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RuleBoldFence => "rule+bold+fence",
            Self::RuleFence => "rule+fence",
            Self::MarkedFence => "marked-fence",
            Self::HeadingFence => "heading+fence",
            Self::Fallback => "fallback",
        }
    }
}

/// Result of running the extractor over one blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub format: BlockFormat,
    pub blocks: Vec<ExtractedBlock>,
}

impl Extraction {
    /// A single fallback block whose path could not be determined
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0].is_ambiguous()
    }
}
