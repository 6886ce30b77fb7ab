use crate::store::FileRecord;
use std::collections::BTreeMap;

/// One node of the derived file tree.
///
/// Nodes carry clones of the records; toggling goes back to the store by
/// path, so a stale tree never aliases live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Folder {
        label: String,
        /// `/`-separated prefix shared by every descendant record
        path: String,
        children: Vec<TreeNode>,
        /// At least one descendant record exists and all of them are disabled
        all_disabled: bool,
    },
    Leaf {
        label: String,
        record: FileRecord,
    },
}

impl TreeNode {
    pub fn label(&self) -> &str {
        match self {
            Self::Folder { label, .. } | Self::Leaf { label, .. } => label,
        }
    }

    /// Record path for a leaf, prefix for a folder
    pub fn path(&self) -> &str {
        match self {
            Self::Folder { path, .. } => path,
            Self::Leaf { record, .. } => &record.path,
        }
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            Self::Folder { all_disabled, .. } => *all_disabled,
            Self::Leaf { record, .. } => record.disabled,
        }
    }

    /// Every record below (or at) this node, depth first
    pub fn records(&self) -> Vec<&FileRecord> {
        let mut out = Vec::new();
        self.collect_records(&mut out);
        out
    }

    fn collect_records<'a>(&'a self, out: &mut Vec<&'a FileRecord>) {
        match self {
            Self::Leaf { record, .. } => out.push(record),
            Self::Folder { children, .. } => {
                for child in children {
                    child.collect_records(out);
                }
            }
        }
    }

    /// Returns (has any record, every record disabled)
    fn settle(&mut self) -> (bool, bool) {
        match self {
            Self::Leaf { record, .. } => (true, record.disabled),
            Self::Folder {
                children,
                all_disabled,
                ..
            } => {
                let mut any = false;
                let mut all = true;
                for child in children.iter_mut() {
                    let (child_any, child_all) = child.settle();
                    if child_any {
                        any = true;
                        all &= child_all;
                    }
                }
                *all_disabled = any && all;
                (any, any && all)
            }
        }
    }
}

/// Group records into a forest by `/`-separated segment, in first-seen order.
pub fn build_tree(records: &[FileRecord]) -> Vec<TreeNode> {
    let mut roots: Vec<TreeNode> = Vec::new();

    for record in records {
        let parts: Vec<&str> = record.path.split('/').collect();
        let Some(last) = parts.iter().rposition(|p| !p.is_empty()) else {
            continue;
        };

        let mut level = &mut roots;
        for (i, part) in parts.iter().enumerate().take(last) {
            if part.is_empty() {
                continue;
            }
            let position = level
                .iter()
                .position(|node| matches!(node, TreeNode::Folder { label, .. } if label.as_str() == *part));
            let index = match position {
                Some(index) => index,
                None => {
                    level.push(TreeNode::Folder {
                        label: (*part).to_string(),
                        path: parts[..=i].join("/"),
                        children: Vec::new(),
                        all_disabled: false,
                    });
                    level.len() - 1
                }
            };
            let current = level;
            level = match &mut current[index] {
                TreeNode::Folder { children, .. } => children,
                TreeNode::Leaf { .. } => unreachable!("position only matches folders"),
            };
        }

        level.push(TreeNode::Leaf {
            label: parts[last].to_string(),
            record: record.clone(),
        });
    }

    for node in &mut roots {
        node.settle();
    }
    roots
}

/// Find the node whose path equals `path`; leaves win over folders of the
/// same name.
pub fn find_node<'a>(nodes: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    let path = path.trim_end_matches('/');
    for node in nodes {
        if let TreeNode::Leaf { record, .. } = node {
            if record.path == path {
                return Some(node);
            }
        }
    }
    for node in nodes {
        if let TreeNode::Folder {
            path: prefix,
            children,
            ..
        } = node
        {
            if prefix == path {
                return Some(node);
            }
            if path.starts_with(prefix.as_str()) {
                if let Some(found) = find_node(children, path) {
                    return Some(found);
                }
            }
        }
    }
    None
}

#[derive(Default)]
struct PlainDir(BTreeMap<String, PlainDir>);

/// Plain-text listing of the record paths: sorted keys, two spaces of indent
/// per level.
pub fn format_tree(records: &[FileRecord]) -> String {
    let mut root = PlainDir::default();
    for record in records {
        let mut current = &mut root;
        for part in record.path.split('/').filter(|p| !p.is_empty()) {
            current = current.0.entry(part.to_string()).or_default();
        }
    }

    let mut out = String::new();
    write_plain(&root, "", &mut out);
    out
}

fn write_plain(dir: &PlainDir, indent: &str, out: &mut String) {
    for (name, child) in &dir.0 {
        out.push_str(indent);
        out.push_str(name);
        out.push('\n');
        write_plain(child, &format!("{indent}  "), out);
    }
}
