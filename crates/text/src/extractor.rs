use crate::marker::{detect_leading_path, render_marker, strip_leading_path_line};
use crate::types::{BlockFormat, ExtractedBlock, Extraction};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RULE_BOLD_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"---\s*\n\*\*(.+?)\*\*\s*\n```([\w+#-]+)?\s*\n([\s\S]*?)```")
        .expect("rule+bold+fence pattern must compile")
});

static RULE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"---\s*(\S+)\s*---\s*```([\w+#-]+)?\s*([\s\S]*?)```")
        .expect("rule+fence pattern must compile")
});

static MARKED_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```([\w+#-]*)\s*([\s\S]+?)```").expect("marked fence pattern must compile")
});

static HEADING_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"###\s+(.+?)\s+```([\w+#-]+)\s*([\s\S]*?)```")
        .expect("heading+fence pattern must compile")
});

/// One layout the extractor knows how to read
pub trait ExtractStrategy: Send + Sync {
    /// Layout produced by this strategy
    fn format(&self) -> BlockFormat;

    /// All complete blocks in `text`; empty when the layout is absent
    fn extract(&self, text: &str) -> Vec<ExtractedBlock>;
}

fn group<'t>(captures: &Captures<'t>, index: usize) -> &'t str {
    captures.get(index).map_or("", |m| m.as_str())
}

/// `---` line, `**path**` line, fenced block
pub struct RuleBoldFenceStrategy;

impl ExtractStrategy for RuleBoldFenceStrategy {
    fn format(&self) -> BlockFormat {
        BlockFormat::RuleBoldFence
    }

    fn extract(&self, text: &str) -> Vec<ExtractedBlock> {
        let mut blocks = Vec::new();
        for captures in RULE_BOLD_FENCE.captures_iter(text) {
            let file_path = group(&captures, 1).trim();
            let language = group(&captures, 2).trim();
            let code = group(&captures, 3).trim();
            if file_path.is_empty() || code.is_empty() {
                log::warn!("Incomplete rule+bold section skipped: {:?}", &captures[0]);
                continue;
            }
            blocks.push(ExtractedBlock::new(file_path, language, code));
        }
        blocks
    }
}

/// `--- path ---` line followed by a fenced block
///
/// The returned code starts with a re-synthesized `// path` marker so that
/// consumers expecting an embedded marker still find one.
pub struct RuleFenceStrategy;

impl ExtractStrategy for RuleFenceStrategy {
    fn format(&self) -> BlockFormat {
        BlockFormat::RuleFence
    }

    fn extract(&self, text: &str) -> Vec<ExtractedBlock> {
        let mut blocks = Vec::new();
        for captures in RULE_FENCE.captures_iter(text) {
            let file_path = group(&captures, 1).trim();
            let language = group(&captures, 2).trim();
            let code = group(&captures, 3).trim();
            if file_path.is_empty() || code.is_empty() {
                log::warn!("Incomplete rule section skipped: {:?}", &captures[0]);
                continue;
            }
            let code = format!("{}\n{code}", render_marker(file_path));
            blocks.push(ExtractedBlock::new(file_path, language, code));
        }
        blocks
    }
}

/// Any fenced block whose first line is a marker
pub struct MarkedFenceStrategy;

impl ExtractStrategy for MarkedFenceStrategy {
    fn format(&self) -> BlockFormat {
        BlockFormat::MarkedFence
    }

    fn extract(&self, text: &str) -> Vec<ExtractedBlock> {
        let mut blocks = Vec::new();
        for captures in MARKED_FENCE.captures_iter(text) {
            let language = group(&captures, 1).trim();
            let code = group(&captures, 2).trim();
            let Some(file_path) = detect_leading_path(code) else {
                log::debug!("Fenced block without a path marker skipped");
                continue;
            };
            let code = strip_leading_path_line(code);
            if code.is_empty() {
                log::warn!("Fenced block for {file_path} has no content; skipped");
                continue;
            }
            blocks.push(ExtractedBlock::new(file_path, language, code));
        }
        blocks
    }
}

/// `### path` heading followed by a fenced block with a language tag
pub struct HeadingFenceStrategy;

impl HeadingFenceStrategy {
    fn clean_heading(raw: &str) -> String {
        raw.replace("---", "")
            .replace('`', "")
            .trim()
            .trim_matches('*')
            .trim()
            .to_string()
    }
}

impl ExtractStrategy for HeadingFenceStrategy {
    fn format(&self) -> BlockFormat {
        BlockFormat::HeadingFence
    }

    fn extract(&self, text: &str) -> Vec<ExtractedBlock> {
        let mut blocks = Vec::new();
        for captures in HEADING_FENCE.captures_iter(text) {
            let file_path = Self::clean_heading(group(&captures, 1));
            let language = group(&captures, 2).trim();
            let code = group(&captures, 3).trim();
            if file_path.is_empty() || language.is_empty() || code.is_empty() {
                log::warn!("Incomplete heading section skipped: {:?}", &captures[0]);
                continue;
            }
            blocks.push(ExtractedBlock::new(file_path, language, code));
        }
        blocks
    }
}

/// Ordered strategy table with a total fallback
pub struct BlockExtractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl Default for BlockExtractor {
    fn default() -> Self {
        Self {
            strategies: vec![
                Box::new(RuleBoldFenceStrategy),
                Box::new(RuleFenceStrategy),
                Box::new(MarkedFenceStrategy),
                Box::new(HeadingFenceStrategy),
            ],
        }
    }
}

impl BlockExtractor {
    /// Extractor with a custom strategy order
    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run the strategies in order; the first non-empty result wins.
    ///
    /// Never returns an empty block list: when no layout matches, the whole
    /// input becomes one block whose path is whatever marker leads it.
    #[must_use]
    pub fn extract(&self, text: &str) -> Extraction {
        for strategy in &self.strategies {
            let blocks = strategy.extract(text);
            if !blocks.is_empty() {
                log::debug!(
                    "{} layout detected ({} blocks)",
                    strategy.format().as_str(),
                    blocks.len()
                );
                return Extraction {
                    format: strategy.format(),
                    blocks,
                };
            }
        }

        log::debug!("No structured layout detected, using fallback");
        Extraction {
            format: BlockFormat::Fallback,
            blocks: vec![ExtractedBlock {
                file_path: detect_leading_path(text),
                language: String::new(),
                code: text.to_string(),
            }],
        }
    }
}

/// Extract blocks with the default strategy order.
#[must_use]
pub fn extract_blocks(text: &str) -> Extraction {
    BlockExtractor::default().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rule_fence_resynthesizes_marker() {
        let input = "--- src/a.js ---\n```js\nconsole.log(\"hi\");\n```\n";
        let extraction = extract_blocks(input);
        assert_eq!(extraction.format, BlockFormat::RuleFence);
        assert_eq!(
            extraction.blocks,
            vec![ExtractedBlock::new(
                "src/a.js",
                "js",
                "// src/a.js\nconsole.log(\"hi\");"
            )]
        );
    }

    #[test]
    fn test_rule_bold_fence_wins_over_everything() {
        let input = "Here you go:\n\n---\n**src/main.rs**\n```rust\nfn main() {}\n```\n\n---\n**src/lib.rs**\n```\npub fn lib() {}\n```\n";
        let extraction = extract_blocks(input);
        assert_eq!(extraction.format, BlockFormat::RuleBoldFence);
        assert_eq!(
            extraction.blocks,
            vec![
                ExtractedBlock::new("src/main.rs", "rust", "fn main() {}"),
                ExtractedBlock::new("src/lib.rs", "", "pub fn lib() {}"),
            ]
        );
    }

    #[test]
    fn test_marked_fence_pulls_path_from_inside() {
        let input = "Some text\n```python\n# app/main.py\nprint('x')\n```\nmore\n```css\n/* web/site.css */\nbody {}\n```";
        let extraction = extract_blocks(input);
        assert_eq!(extraction.format, BlockFormat::MarkedFence);
        assert_eq!(
            extraction.blocks,
            vec![
                ExtractedBlock::new("app/main.py", "python", "print('x')"),
                ExtractedBlock::new("web/site.css", "css", "body {}"),
            ]
        );
    }

    #[test]
    fn test_marked_fence_skips_unmarked_blocks() {
        let input = "```js\nconst a = 1;\n```\n```js\n// src/b.js\nconst b = 2;\n```";
        let extraction = extract_blocks(input);
        assert_eq!(extraction.format, BlockFormat::MarkedFence);
        assert_eq!(
            extraction.blocks,
            vec![ExtractedBlock::new("src/b.js", "js", "const b = 2;")]
        );
    }

    #[test]
    fn test_marker_on_the_fence_line_is_accepted() {
        let input = "```// src/c.js\nconst c = 3;\n```\n\n";
        let extraction = extract_blocks(input);
        assert_eq!(extraction.format, BlockFormat::MarkedFence);
        assert_eq!(
            extraction.blocks,
            vec![ExtractedBlock::new("src/c.js", "", "const c = 3;")]
        );
    }

    #[test]
    fn test_heading_fence_strips_markup() {
        let input = "### `src/a.ts`\n```ts\nexport const a = 1;\n```\n\n### **src/b.ts**\n```ts\nexport const b = 2;\n```";
        let extraction = extract_blocks(input);
        assert_eq!(extraction.format, BlockFormat::HeadingFence);
        assert_eq!(
            extraction.blocks,
            vec![
                ExtractedBlock::new("src/a.ts", "ts", "export const a = 1;"),
                ExtractedBlock::new("src/b.ts", "ts", "export const b = 2;"),
            ]
        );
    }

    #[test]
    fn test_incomplete_sections_are_skipped_not_fatal() {
        let input = "--- src/empty.js ---\n```js\n```\n--- src/full.js ---\n```js\nlet x;\n```";
        let extraction = extract_blocks(input);
        assert_eq!(extraction.format, BlockFormat::RuleFence);
        assert_eq!(
            extraction.blocks,
            vec![ExtractedBlock::new("src/full.js", "js", "// src/full.js\nlet x;")]
        );
    }

    #[test]
    fn test_fallback_keeps_text_and_detects_marker() {
        let input = "// notes/todo.md\n- buy milk\n";
        let extraction = extract_blocks(input);
        assert_eq!(extraction.format, BlockFormat::Fallback);
        assert_eq!(extraction.blocks.len(), 1);
        assert_eq!(extraction.blocks[0].file_path.as_deref(), Some("notes/todo.md"));
        assert_eq!(extraction.blocks[0].code, input);
        assert!(!extraction.is_ambiguous());
    }

    #[test]
    fn test_custom_strategy_order_is_respected() {
        let input = "```js\n// src/a.js\nx\n```";
        let extractor = BlockExtractor::with_strategies(vec![Box::new(HeadingFenceStrategy)]);
        let extraction = extractor.extract(input);
        assert_eq!(extraction.format, BlockFormat::Fallback);
    }
}
