use codeprep_workspace::{TreeNode, WriteReport};
use console::style;

/// Checkbox view of the file tree, one node per line
pub fn render_tree(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    write_nodes(nodes, 0, &mut out);
    out
}

fn write_nodes(nodes: &[TreeNode], depth: usize, out: &mut String) {
    for node in nodes {
        let check = if node.is_disabled() { "[ ]" } else { "[x]" };
        let label = match node {
            TreeNode::Folder { label, .. } => format!("{label}/"),
            TreeNode::Leaf { label, .. } => label.clone(),
        };
        let line = format!("{}{check} {label}", "  ".repeat(depth));
        if node.is_disabled() {
            out.push_str(&style(line).dim().to_string());
        } else {
            out.push_str(&line);
        }
        out.push('\n');

        if let TreeNode::Folder { children, .. } = node {
            write_nodes(children, depth + 1, out);
        }
    }
}

/// One line per written file
pub fn render_write_report(report: &WriteReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let line = match &outcome.result {
            Ok(true) => format!("{} {}", style("created").green(), outcome.display_path),
            Ok(false) => format!("{} {}", style("updated").green(), outcome.display_path),
            Err(err) => format!("{} {}: {err}", style("failed").red(), outcome.display_path),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}
