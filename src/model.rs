//! Documentation tree model — format-agnostic.
//!
//! A parsed script becomes a single [`Node`] of kind `file` whose `data`
//! children are functions, variables and (possibly nested) sections. The
//! serde shape matches the documented JSON output: `type`, `name`, `file`
//! (root only), `data`, and one key per tag holding an ordered value list.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The four roles a documentation node can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Section,
    Function,
    Variable,
}

/// One occurrence of a tag. Raw text out of the build pass; `option` and
/// `arg` entries are rewritten to code/description pairs by post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Code { code: String, description: String },
}

/// A node of the documentation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Empty only on an unnamed root.
    #[serde(default)]
    pub name: String,
    /// Source provenance on the root, replaced by the `@file` tag value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Tag name → ordered occurrences. Multi-line bodies fold into one entry.
    #[serde(flatten)]
    pub tags: BTreeMap<String, Vec<TagValue>>,
    /// `Some` exactly for `file` and `section` kinds.
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl Node {
    /// A fresh node of the given kind, with a child list where the kind
    /// allows one.
    pub fn new(kind: NodeKind) -> Self {
        let children = match kind {
            NodeKind::File | NodeKind::Section => Some(Vec::new()),
            NodeKind::Function | NodeKind::Variable => None,
        };
        Node {
            kind,
            name: String::new(),
            file: None,
            tags: BTreeMap::new(),
            children,
        }
    }

    /// Pre-order traversal over all descendants. The receiver itself is not
    /// visited.
    pub fn walk<F: FnMut(&Node)>(&self, f: &mut F) {
        if let Some(children) = &self.children {
            for child in children {
                f(child);
                child.walk(f);
            }
        }
    }

    /// Mutable pre-order traversal over all descendants.
    pub fn walk_mut<F: FnMut(&mut Node)>(&mut self, f: &mut F) {
        if let Some(children) = &mut self.children {
            for child in children {
                f(child);
                child.walk_mut(f);
            }
        }
    }

    /// First descendant (pre-order) with the given name.
    pub fn find(&self, name: &str) -> Option<&Node> {
        let children = self.children.as_deref()?;
        for child in children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Names of all descendants, for `@see` reference resolution.
    pub fn names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.walk(&mut |node| {
            if !node.name.is_empty() {
                names.insert(node.name.clone());
            }
        });
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, name: &str) -> Node {
        Node {
            name: name.to_string(),
            ..Node::new(kind)
        }
    }

    fn sample_tree() -> Node {
        let mut section = leaf(NodeKind::Section, "Helpers");
        section
            .children
            .as_mut()
            .unwrap()
            .push(leaf(NodeKind::Function, "string::trim"));
        let mut root = Node::new(NodeKind::File);
        root.file = Some("lib.sh".to_string());
        let children = root.children.as_mut().unwrap();
        children.push(leaf(NodeKind::Variable, "VERBOSE"));
        children.push(section);
        root
    }

    #[test]
    fn find_preorder() {
        let root = sample_tree();
        assert_eq!(root.find("VERBOSE").unwrap().kind, NodeKind::Variable);
        assert_eq!(root.find("string::trim").unwrap().kind, NodeKind::Function);
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn names_cover_all_descendants() {
        let names = sample_tree().names();
        assert!(names.contains("VERBOSE"));
        assert!(names.contains("Helpers"));
        assert!(names.contains("string::trim"));
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn json_shape() {
        let mut root = sample_tree();
        root.tags.insert(
            "description".to_string(),
            vec![TagValue::Text("A library.\n".to_string())],
        );
        let value = serde_json::to_value(&root).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["file"], "lib.sh");
        assert_eq!(value["description"][0], "A library.\n");
        assert_eq!(value["data"][0]["type"], "variable");
        assert_eq!(value["data"][1]["data"][0]["name"], "string::trim");
        // Leaf nodes carry no "data" key.
        assert!(value["data"][0].get("data").is_none());
    }

    #[test]
    fn json_round_trip() {
        let mut root = sample_tree();
        root.tags.insert(
            "see".to_string(),
            vec![TagValue::Text("string::trim\n".to_string())],
        );
        if let Some(var) = root.children.as_mut().unwrap().get_mut(0) {
            var.tags.insert(
                "option".to_string(),
                vec![TagValue::Code {
                    code: "--flag <val>".to_string(),
                    description: "description text".to_string(),
                }],
            );
        }
        let json = serde_json::to_string(&root).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root);
    }
}
