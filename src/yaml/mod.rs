//! Lossless parsing for block-mapping YAML documents.
//!
//! The supported subset is what property files are made of: one document of
//! nested block mappings whose leaves are plain or quoted single-line
//! scalars, with comments and blank lines anywhere. Sequences, flow
//! collections, block scalars, anchors, tags and multi-document streams are
//! reported as parse failures.

pub mod errors;
pub mod parser;
pub mod query;
pub mod visitor;

pub use errors::{KeyPathError, YamlParseError};
pub use parser::parse_document;
pub use query::KeyPath;
pub use visitor::{YamlDispatch, YamlVisitor};

use crate::source::{ParseFailure, SourceFile, SourceParser};
use crate::tree::{Node, Token, TokenKind};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YamlKind {
    /// `[ "---"?, Mapping?, Eof ]`
    Document,
    /// Entries only; each entry carries its own leading trivia.
    Mapping,
    /// `[ key, ":", Scalar | Mapping ]`
    Entry,
    /// A single text token, possibly empty.
    Scalar,
}

/// Parses `.yml` and `.yaml` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    pub fn new() -> Self {
        YamlParser
    }
}

impl SourceParser for YamlParser {
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == "yml" || ext == "yaml")
    }

    fn parse(&self, path: &Path, text: &str) -> Result<SourceFile, ParseFailure> {
        let root = parse_document(text).map_err(|err| err.into_failure(path))?;
        Ok(SourceFile::new(path, text, Arc::new(root)))
    }
}

/// Raw key token of an entry, quotes included.
pub fn entry_key(entry: &Node) -> Option<&Token> {
    if !entry.is_kind(YamlKind::Entry) {
        return None;
    }
    entry.tokens().find(|token| token.kind() == TokenKind::Text)
}

pub fn entry_value(entry: &Node) -> Option<&Arc<Node>> {
    if !entry.is_kind(YamlKind::Entry) {
        return None;
    }
    entry.child_nodes().last()
}

/// The root mapping of a document, if it has any entries.
pub fn document_mapping(document: &Node) -> Option<&Arc<Node>> {
    document.first_child(YamlKind::Mapping)
}

/// Raw text of a scalar, quotes included.
pub fn scalar_text(scalar: &Node) -> Option<&str> {
    if !scalar.is_kind(YamlKind::Scalar) {
        return None;
    }
    scalar.tokens().next().map(Token::text)
}

pub fn is_quoted(raw: &str) -> bool {
    raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')))
}

/// Value of a scalar or key with its quoting removed.
pub fn unquote(raw: &str) -> String {
    if !is_quoted(raw) {
        return raw.to_string();
    }
    let inner = &raw[1..raw.len() - 1];
    if raw.starts_with('\'') {
        return inner.replace("''", "'");
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
