//! Line classifier — context-free categorization of one input line.
//!
//! Each line is assigned exactly one class plus its extracted payload.
//! Whether a plain comment continues an open tag, and whether a declaration
//! finalizes the current block, is decided by the builder, not here.

use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

// Exactly one whitespace between the marker and the @tag.
static RE_TAG_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s@([a-z]+)\s*(.*)").unwrap());

static RE_SHELLCHECK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+shellcheck\s+disable=(.*)").unwrap());

// Deliberately unanchored: the identifier may sit after other comment text.
static RE_SPDX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s+SPDX-License-Identifier:\s+(.*)").unwrap());

// `function name`, or `name()` followed by whitespace or end of line.
static RE_FUNC_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^function\s+(\w+)|^([a-zA-Z@_]\w+)\s*\(\)(?:\s|$)").unwrap());

// `: "${name:=default}"`, `: ${name=default}`, or `name=value`.
static RE_VAR_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^:\s+"?\$\{([a-zA-Z_][a-zA-Z_0-9]*):?=|^\s*([a-zA-Z_][a-zA-Z_0-9]*)="#).unwrap()
});

// -- Classification -----------------------------------------------------------

/// What one line of input is, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// `# @tag rest-of-line`
    TagStart { tag: &'a str, rest: &'a str },
    /// `# shellcheck disable=...`, codes normalized with an `SC` prefix.
    Shellcheck(Vec<String>),
    /// `# SPDX-License-Identifier: ...`
    Spdx(&'a str),
    /// Any other comment line; payload has the marker and one space stripped.
    Comment(&'a str),
    /// Function declaration, payload is the name.
    FunctionDecl(&'a str),
    /// Variable declaration or default assignment, payload is the name.
    VariableDecl(&'a str),
    /// Any other code line.
    Code,
}

pub fn classify(line: &str) -> LineClass<'_> {
    if let Some(rest) = line.strip_prefix('#') {
        if let Some(caps) = RE_TAG_START.captures(line) {
            return LineClass::TagStart {
                tag: caps.get(1).map_or("", |m| m.as_str()),
                rest: caps.get(2).map_or("", |m| m.as_str()),
            };
        }
        if let Some(caps) = RE_SHELLCHECK.captures(line) {
            let codes = caps[1]
                .trim()
                .split(',')
                .map(|code| {
                    if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) {
                        format!("SC{code}")
                    } else {
                        code.to_string()
                    }
                })
                .collect();
            return LineClass::Shellcheck(codes);
        }
        if let Some(caps) = RE_SPDX.captures(line) {
            return LineClass::Spdx(caps.get(1).map_or("", |m| m.as_str()));
        }
        return LineClass::Comment(rest.strip_prefix(' ').unwrap_or(rest));
    }

    if let Some(caps) = RE_FUNC_DECL.captures(line) {
        if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
            return LineClass::FunctionDecl(name.as_str());
        }
    }
    if let Some(caps) = RE_VAR_DECL.captures(line) {
        if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
            return LineClass::VariableDecl(name.as_str());
        }
    }
    LineClass::Code
}
