use crate::tree::{Cursor, Node};
use crate::yaml::errors::KeyPathError;
use crate::yaml::{entry_key, entry_value, unquote, YamlKind};
use std::fmt;
use std::sync::Arc;

/// A dotted property path such as `management.metrics.enabled`.
///
/// Segments may be quoted to contain dots: `logging.level."org.example"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    parts: Vec<String>,
}

impl KeyPath {
    pub fn parse(input: &str) -> Result<Self, KeyPathError> {
        let parts = parse_dotted_path(input)?;
        if parts.is_empty() {
            return Err(KeyPathError {
                input: input.to_string(),
                message: "empty key path".to_string(),
            });
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn as_string(&self) -> String {
        self.parts.join(".")
    }

    pub fn matches(&self, segments: &[String]) -> bool {
        self.parts == segments
    }

    /// Whether `segments` lead towards this path without reaching its end.
    pub fn continues(&self, segments: &[String]) -> bool {
        segments.len() < self.parts.len() && self.parts.starts_with(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// Segments contributed by an entry key. A plain key splits on dots; a
/// quoted key is a single segment.
pub fn key_segments(raw: &str) -> Vec<String> {
    if crate::yaml::is_quoted(raw) {
        return vec![unquote(raw)];
    }
    raw.split('.').map(str::to_string).collect()
}

/// Segments of an entry's own key.
pub fn entry_segments(entry: &Node) -> Vec<String> {
    entry_key(entry)
        .map(|key| key_segments(key.text()))
        .unwrap_or_default()
}

/// Full key path of the node under visit, from the entries enclosing it.
pub fn enclosing_path(cursor: &Cursor) -> Vec<String> {
    let mut enclosing: Vec<&Arc<Node>> = cursor
        .ancestors()
        .filter(|node| node.is_kind(YamlKind::Entry))
        .collect();
    enclosing.reverse();
    enclosing
        .into_iter()
        .flat_map(|entry| entry_segments(entry))
        .collect()
}

/// All entries of `document` whose key, however it is split across nested
/// mappings and dotted keys, spells out `path`.
pub fn find_entries(document: &Node, path: &KeyPath) -> Vec<Arc<Node>> {
    let mut found = Vec::new();
    if let Some(mapping) = crate::yaml::document_mapping(document) {
        collect_matches(mapping, path.parts(), &mut found);
    }
    found
}

fn collect_matches(mapping: &Node, remaining: &[String], found: &mut Vec<Arc<Node>>) {
    for entry in mapping.child_nodes() {
        let segments = entry_segments(entry);
        if segments.is_empty() || !remaining.starts_with(&segments) {
            continue;
        }
        let rest = &remaining[segments.len()..];
        if rest.is_empty() {
            found.push(Arc::clone(entry));
            continue;
        }
        if let Some(value) = entry_value(entry).filter(|value| value.is_kind(YamlKind::Mapping)) {
            collect_matches(value, rest, found);
        }
    }
}

fn parse_dotted_path(input: &str) -> Result<Vec<String>, KeyPathError> {
    let invalid = |message: &str| KeyPathError {
        input: input.to_string(),
        message: message.to_string(),
    };

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted_segment = false;
    let mut chars = input.chars();
    let mut in_quotes = false;
    let mut quote_char = '\0';

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == quote_char {
                in_quotes = false;
                continue;
            }

            if quote_char == '"' && ch == '\\' {
                if let Some(next) = chars.next() {
                    let escaped = match next {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    };
                    current.push(escaped);
                    continue;
                }
            }

            current.push(ch);
            continue;
        }

        match ch {
            '.' => {
                if current.is_empty() && !quoted_segment {
                    return Err(invalid("empty path segment"));
                }
                parts.push(std::mem::take(&mut current));
                quoted_segment = false;
            }
            '"' | '\'' => {
                if !current.is_empty() || quoted_segment {
                    return Err(invalid("unexpected quote inside key"));
                }
                in_quotes = true;
                quoted_segment = true;
                quote_char = ch;
            }
            ch if ch.is_whitespace() => return Err(invalid("whitespace not allowed in key")),
            other => {
                if quoted_segment {
                    return Err(invalid("unexpected text after quoted key"));
                }
                current.push(other);
            }
        }
    }

    if in_quotes {
        return Err(invalid("unterminated quoted key"));
    }

    if !current.is_empty() || quoted_segment {
        parts.push(current);
    } else if !parts.is_empty() {
        return Err(invalid("empty path segment"));
    }

    Ok(parts)
}
