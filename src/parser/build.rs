//! Tag accumulation and tree assembly — single pass over the line stream.
//!
//! A comment block accumulates into a detached [`Pending`] element until the
//! first non-comment line pins its kind: `file`/`section`/`endsection` are
//! pinned by their tag, functions and variables by the declaration pattern
//! of the code line that ends the block. Sections stay on an ancestor stack
//! while open and are spliced into their parent when popped.

use crate::model::{Node, NodeKind, TagValue};
use crate::parser::classify::{classify, LineClass};
use anyhow::{bail, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// Block kind once a tag or declaration pins it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    File,
    Section,
    EndSection,
    Function,
    Variable,
}

/// The element currently being accumulated from a comment block.
#[derive(Default)]
struct Pending {
    kind: Option<PendingKind>,
    name: String,
    file: Option<String>,
    tags: BTreeMap<String, Vec<String>>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.kind.is_none() && self.file.is_none() && self.tags.is_empty()
    }

    fn into_node(self, kind: NodeKind) -> Node {
        Node {
            name: self.name,
            tags: self
                .tags
                .into_iter()
                .map(|(tag, values)| (tag, values.into_iter().map(TagValue::Text).collect()))
                .collect(),
            ..Node::new(kind)
        }
    }
}

struct BuildState<'r> {
    /// Ancestor stack; `stack[0]` is the root, open sections above it.
    stack: Vec<Node>,
    pending: Pending,
    /// Tag receiving continuation lines, cleared on any non-tag event.
    last_tag: Option<String>,
    /// Attach undocumented declarations whose name matches.
    include: Option<&'r Regex>,
}

/// Build the raw documentation tree from a line stream.
///
/// `file` seeds the root's provenance; `include` opts undocumented symbols
/// into the tree. Fails on unbalanced `@endsection`.
pub fn build<'a, I>(lines: I, file: Option<&str>, include: Option<&Regex>) -> Result<Node>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut root = Node::new(NodeKind::File);
    root.file = file.map(str::to_string);

    let mut state = BuildState {
        stack: vec![root],
        pending: Pending::default(),
        last_tag: None,
        include,
    };

    for (idx, line) in lines.into_iter().enumerate() {
        process_line(&mut state, line, idx + 1)?;
    }

    // Unwind sections left open at end of input; a still-pending block with
    // no declaration after it is discarded.
    while state.stack.len() > 1 {
        pop_section(&mut state.stack);
    }
    match state.stack.pop() {
        Some(root) => Ok(root),
        None => bail!("ancestor stack exhausted"),
    }
}

fn process_line(s: &mut BuildState, line: &str, lineno: usize) -> Result<()> {
    match classify(line) {
        LineClass::TagStart { tag, rest } => {
            tag_start(s, tag, rest);
            Ok(())
        }
        LineClass::Shellcheck(codes) => {
            s.pending
                .tags
                .entry("shellcheck".to_string())
                .or_default()
                .extend(codes);
            s.last_tag = None;
            Ok(())
        }
        LineClass::Spdx(value) => {
            s.pending
                .tags
                .entry("SPDX-License-Identifier".to_string())
                .or_default()
                .push(value.to_string());
            s.last_tag = None;
            Ok(())
        }
        LineClass::Comment(text) => {
            continuation(s, text);
            Ok(())
        }
        LineClass::FunctionDecl(name) => {
            release_file_pin(s);
            if s.pending.kind.is_none() {
                try_declare(s, PendingKind::Function, name);
            }
            finalize(s, lineno)
        }
        LineClass::VariableDecl(name) => {
            release_file_pin(s);
            if s.pending.kind.is_none() {
                try_declare(s, PendingKind::Variable, name);
            }
            finalize(s, lineno)
        }
        LineClass::Code => finalize(s, lineno),
    }
}

/// Open a tag. `file`, `section` and `endsection` pin the block kind instead
/// of being stored; everything else appends a fresh entry and becomes the
/// continuation target.
fn tag_start(s: &mut BuildState, tag: &str, rest: &str) {
    match tag {
        "file" => {
            s.pending.kind = Some(PendingKind::File);
            // No trailing newline: this becomes the root's file attribute.
            s.pending.file = Some(rest.to_string());
            s.last_tag = None;
        }
        "section" => {
            s.pending.kind = Some(PendingKind::Section);
            s.pending.name = rest.to_string();
            s.last_tag = None;
        }
        "endsection" => {
            s.pending.kind = Some(PendingKind::EndSection);
            s.last_tag = None;
        }
        _ => {
            s.pending
                .tags
                .entry(tag.to_string())
                .or_default()
                .push(format!("{rest}\n"));
            s.last_tag = Some(tag.to_string());
        }
    }
}

/// Append a plain comment line to the last entry of the open tag, if any.
/// Inert comments are ignored.
fn continuation(s: &mut BuildState, text: &str) {
    if s.pending.is_empty() {
        return;
    }
    let Some(tag) = &s.last_tag else { return };
    if let Some(last) = s.pending.tags.get_mut(tag).and_then(|v| v.last_mut()) {
        last.push_str(text);
        last.push('\n');
    }
}

/// A declaration line ending a `@file`-pinned block splits it: the file
/// attribute belongs to the root, the accumulated tags to the declaration.
/// Blocks ended by a plain code line instead merge wholesale into the root.
fn release_file_pin(s: &mut BuildState) {
    if s.pending.kind != Some(PendingKind::File) {
        return;
    }
    if let Some(file) = s.pending.file.take() {
        s.stack[0].file = Some(file);
    }
    s.pending.kind = None;
}

/// Pin a declaration, but only for documented blocks or include-matched names.
fn try_declare(s: &mut BuildState, kind: PendingKind, name: &str) {
    let documented = !s.pending.is_empty();
    let included = s.include.is_some_and(|re| re.is_match(name));
    if documented || included {
        s.pending.kind = Some(kind);
        s.pending.name = name.to_string();
    }
}

/// A non-comment line ends the current block: attach it if its kind is
/// known, discard it otherwise, and reset the accumulator state.
fn finalize(s: &mut BuildState, lineno: usize) -> Result<()> {
    let pending = std::mem::take(&mut s.pending);
    s.last_tag = None;

    let Some(kind) = pending.kind else {
        return Ok(());
    };
    match kind {
        PendingKind::File => {
            // Merge into the root, replacing tags it already carries.
            let file = pending.file.clone();
            let node = pending.into_node(NodeKind::File);
            let root = &mut s.stack[0];
            if file.is_some() {
                root.file = file;
            }
            for (tag, values) in node.tags {
                root.tags.insert(tag, values);
            }
        }
        PendingKind::EndSection => {
            if s.stack.len() < 2 {
                bail!("too many @endsection (line {lineno})");
            }
            pop_section(&mut s.stack);
        }
        PendingKind::Section => {
            // Sibling sections replace each other at the same depth: pop at
            // most one level, then push.
            if s.stack.len() > 1 {
                pop_section(&mut s.stack);
            }
            s.stack.push(pending.into_node(NodeKind::Section));
        }
        PendingKind::Function => {
            attach(&mut s.stack, pending.into_node(NodeKind::Function));
        }
        PendingKind::Variable => {
            attach(&mut s.stack, pending.into_node(NodeKind::Variable));
        }
    }
    Ok(())
}

/// Splice the top section into its parent. No-op when only the root remains.
fn pop_section(stack: &mut Vec<Node>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(section) = stack.pop() {
        attach(stack, section);
    }
}

fn attach(stack: &mut [Node], node: Node) {
    if let Some(children) = stack.last_mut().and_then(|top| top.children.as_mut()) {
        children.push(node);
    }
}
