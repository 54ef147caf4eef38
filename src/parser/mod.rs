//! Parser pipeline — classify lines, build the tree, post-process, validate.

pub mod build;
pub mod classify;
pub mod post;
pub mod validate;

use crate::model::{Node, NodeKind};
use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;

/// A finished tree plus the advisory findings collected along the way.
/// Warnings never alter the tree; callers that care about degraded output
/// must inspect them.
#[derive(Debug)]
pub struct Parsed {
    pub root: Node,
    pub warnings: Vec<Warning>,
}

/// Advisory finding. Structural failures are `anyhow` errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An `option`/`arg` entry that does not split into code + description.
    InvalidTag { tag: String, value: String },
    /// A tag name outside its node kind's allow-list.
    UnknownTag {
        tag: String,
        value: String,
        kind: NodeKind,
        node: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InvalidTag { tag, value } => {
                write!(f, "invalid @{tag}: {value:?}")
            }
            Warning::UnknownTag {
                tag,
                value,
                kind,
                node,
            } => {
                write!(f, "unknown '@{tag} {value}' in {kind:?} '{node}'")
            }
        }
    }
}

/// Parse an annotated shell script from disk. The path seeds the root
/// node's provenance and error messages.
pub fn parse_script(path: &Path, include: Option<&Regex>) -> Result<Parsed> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file = path.to_string_lossy();
    parse_stream(content.lines(), Some(file.as_ref()), include)
}

/// Parse an already-available line stream.
pub fn parse_stream<'a, I>(lines: I, file: Option<&str>, include: Option<&Regex>) -> Result<Parsed>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut warnings = Vec::new();
    let mut root = build::build(lines, file, include)?;
    post::process(&mut root, &mut warnings);
    validate::check_tree(&root, &mut warnings)?;
    Ok(Parsed { root, warnings })
}
