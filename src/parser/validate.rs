//! Tree validation — structural assertions and unknown-tag diagnostics.
//!
//! Structural violations mean the tree itself is malformed and are fatal;
//! unrecognized tag names are advisory and never change the output.

use crate::model::{Node, NodeKind};
use crate::parser::Warning;
use anyhow::{ensure, Result};

/// Tags accepted on every kind in addition to the per-kind lists.
const COMMON_TAGS: &[&str] = &["lineno"];

/// Tags a node kind is expected to carry.
fn known_tags(kind: NodeKind) -> &'static [&'static str] {
    match kind {
        NodeKind::File => &[
            "description",
            "author",
            "maintainer",
            "license",
            "SPDX-License-Identifier",
            "example",
        ],
        NodeKind::Section => &["description", "example", "env"],
        NodeKind::Function => &[
            "description",
            "option",
            "arg",
            "return",
            "shellcheck",
            "exit",
            "see",
            "example",
            "env",
            "set",
            "exitcode",
            "warning",
            "noargs",
            "stdout",
            "stdin",
            "stderr",
            "require",
        ],
        NodeKind::Variable => &["description", "example", "see", "shellcheck"],
    }
}

/// Assert structural invariants over the whole tree and collect advisory
/// warnings for tags unknown to their node's kind.
pub fn check_tree(root: &Node, warnings: &mut Vec<Warning>) -> Result<()> {
    ensure!(
        root.kind == NodeKind::File,
        "root node is not a file: {:?}",
        root.kind
    );
    check_node(root)?;
    let mut result = Ok(());
    root.walk(&mut |node| {
        if result.is_ok() {
            result = check_node(node);
        }
    });
    result?;

    collect_unknown_tags(root, warnings);
    root.walk(&mut |node| collect_unknown_tags(node, warnings));
    Ok(())
}

fn check_node(node: &Node) -> Result<()> {
    match node.kind {
        NodeKind::File | NodeKind::Section => ensure!(
            node.children.is_some(),
            "{:?} node '{}' has no child list",
            node.kind,
            node.name
        ),
        NodeKind::Function | NodeKind::Variable => ensure!(
            node.children.is_none(),
            "{:?} node '{}' must not hold children",
            node.kind,
            node.name
        ),
    }
    Ok(())
}

fn collect_unknown_tags(node: &Node, warnings: &mut Vec<Warning>) {
    let known = known_tags(node.kind);
    for (tag, values) in &node.tags {
        if known.contains(&tag.as_str()) || COMMON_TAGS.contains(&tag.as_str()) {
            continue;
        }
        warnings.push(Warning::UnknownTag {
            tag: tag.clone(),
            value: format!("{values:?}"),
            kind: node.kind,
            node: node.name.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagValue;

    fn func(name: &str) -> Node {
        Node {
            name: name.to_string(),
            ..Node::new(NodeKind::Function)
        }
    }

    #[test]
    fn clean_tree_passes() {
        let mut root = Node::new(NodeKind::File);
        let mut f = func("foo");
        f.tags.insert(
            "description".to_string(),
            vec![TagValue::Text("x\n".to_string())],
        );
        root.children.as_mut().unwrap().push(f);
        let mut warnings = Vec::new();
        check_tree(&root, &mut warnings).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn unknown_tag_warns_with_owner() {
        let mut root = Node::new(NodeKind::File);
        let mut f = func("foo");
        f.tags.insert(
            "bogus".to_string(),
            vec![TagValue::Text("x\n".to_string())],
        );
        root.children.as_mut().unwrap().push(f);
        let mut warnings = Vec::new();
        check_tree(&root, &mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
        let msg = warnings[0].to_string();
        assert!(msg.contains("@bogus"));
        assert!(msg.contains("foo"));
    }

    #[test]
    fn kind_scoped_allow_lists() {
        // @option is fine on a function but not on a variable.
        let mut root = Node::new(NodeKind::File);
        let mut var = Node::new(NodeKind::Variable);
        var.name = "V".to_string();
        var.tags.insert(
            "option".to_string(),
            vec![TagValue::Text("-x y\n".to_string())],
        );
        root.children.as_mut().unwrap().push(var);
        let mut warnings = Vec::new();
        check_tree(&root, &mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn non_file_root_is_fatal() {
        let root = func("foo");
        let mut warnings = Vec::new();
        assert!(check_tree(&root, &mut warnings).is_err());
    }

    #[test]
    fn leaf_with_children_is_fatal() {
        let mut root = Node::new(NodeKind::File);
        let mut bad = func("foo");
        bad.children = Some(vec![func("bar")]);
        root.children.as_mut().unwrap().push(bad);
        let mut warnings = Vec::new();
        assert!(check_tree(&root, &mut warnings).is_err());
    }
}
