//! Post-processing — option/arg splitting and `@see` reference linking.
//!
//! Runs over the whole finished tree, never interleaved with the build
//! pass: `@see` may reference nodes declared later in the source.

use crate::model::{Node, TagValue};
use crate::parser::Warning;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// Flag token (`-x`, `--long`, optional `<placeholder>`) or environment
// variable token (`$NAME`, optionally bracketed), then the description.
// The optional `\n?` absorbs the entry's trailing newline (it may also
// satisfy the flag token's required trailing whitespace, so a bare
// `--flag\n` splits into code "--flag" and an empty description); inner
// newlines from multi-line bodies still make the match fail.
static RE_OPT_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(--?\w+\s*(<\w+>)?\s+|\[?\$\S+)\s*(.*)\n?$").unwrap());

static RE_SEE_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+)(.*)").unwrap());

static RE_SEE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://\S+$").unwrap());

/// Rewrite `option`/`arg` and `see` tag values throughout the tree.
pub fn process(root: &mut Node, warnings: &mut Vec<Warning>) {
    let names = root.names();
    convert_node(root, &names, warnings);
    root.walk_mut(&mut |node| convert_node(node, &names, warnings));
}

fn convert_node(node: &mut Node, names: &BTreeSet<String>, warnings: &mut Vec<Warning>) {
    for tag in ["option", "arg"] {
        if let Some(values) = node.tags.get_mut(tag) {
            for value in values {
                convert_opt_arg(tag, value, warnings);
            }
        }
    }
    if let Some(values) = node.tags.get_mut("see") {
        for value in values {
            convert_see(value, names);
        }
    }
}

/// Split one `option`/`arg` entry into a code part and a description part.
/// Malformed entries keep their text as the description, with an empty code.
fn convert_opt_arg(tag: &str, value: &mut TagValue, warnings: &mut Vec<Warning>) {
    let TagValue::Text(text) = value else { return };
    *value = match RE_OPT_ARG.captures(text) {
        Some(caps) => TagValue::Code {
            code: caps[1].trim().to_string(),
            description: caps.get(3).map_or(String::new(), |m| m.as_str().to_string()),
        },
        None => {
            warnings.push(Warning::InvalidTag {
                tag: tag.to_string(),
                value: text.clone(),
            });
            TagValue::Code {
                code: String::new(),
                description: text.clone(),
            }
        }
    };
}

/// Rewrite a `see` entry into a link: an internal anchor when the leading
/// word names a node anywhere in the tree, a clickable link when the entry
/// is a bare URL, and untouched otherwise.
fn convert_see(value: &mut TagValue, names: &BTreeSet<String>) {
    let TagValue::Text(text) = value else { return };
    if let Some(caps) = RE_SEE_NAME.captures(text) {
        let word = &caps[1];
        if names.contains(word) {
            *text = format!("[{word}](#{word}){}", &caps[2]);
            return;
        }
    }
    let trimmed = text.trim_end_matches('\n');
    if RE_SEE_URL.is_match(trimmed) {
        *text = format!("[{trimmed}]({trimmed})");
    }
}
