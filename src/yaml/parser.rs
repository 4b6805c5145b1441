use crate::tree::{Element, Node, Token, TokenKind};
use crate::yaml::errors::YamlParseError;
use crate::yaml::YamlKind;

/// Parse a single block-mapping document.
///
/// Trivia is attached to whatever follows it: an entry's prefix holds the
/// blank lines, comments and indentation before its key, and the `Eof` token
/// holds whatever trails the last entry. The root mapping itself has an empty
/// prefix so that removing its first entry never strands leading trivia.
pub fn parse_document(source: &str) -> Result<Node, YamlParseError> {
    Parser::new(source).document()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

/// Where the next content starts, seen without consuming the trivia.
struct Ahead {
    end: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn document(&mut self) -> Result<Node, YamlParseError> {
        let mut children: Vec<Element> = Vec::new();

        let ahead = self.scan_trivia()?;
        if ahead.column == 0 && self.starts_marker(ahead.end, "---") {
            let prefix = self.take(ahead.end);
            self.pos += 3;
            children.push(Token::new(TokenKind::Punct, prefix, "---").into());

            let after = self.scan_trivia()?;
            if !self.at_end(after.end) && !self.src[self.pos..after.end].contains('\n') {
                return Err(self.unsupported("content after document marker", after.end));
            }
        }

        let ahead = self.scan_trivia()?;
        if !self.at_end(ahead.end) {
            let mapping = self.mapping(ahead.column)?;
            children.push(mapping.into());
        }

        let ahead = self.scan_trivia()?;
        if !self.at_end(ahead.end) {
            return Err(self.indentation(ahead.end));
        }
        let trailing = self.take(ahead.end);
        children.push(Token::new(TokenKind::Eof, trailing, "").into());

        Ok(Node::new(YamlKind::Document, "", children))
    }

    fn mapping(&mut self, indent: usize) -> Result<Node, YamlParseError> {
        let mut entries: Vec<Element> = Vec::new();
        loop {
            let ahead = self.scan_trivia()?;
            if self.at_end(ahead.end) || ahead.column < indent {
                break;
            }
            if ahead.column > indent {
                return Err(self.indentation(ahead.end));
            }
            let prefix = self.take(ahead.end);
            entries.push(self.entry(prefix, indent)?.into());
        }
        Ok(Node::new(YamlKind::Mapping, "", entries))
    }

    fn entry(&mut self, prefix: String, indent: usize) -> Result<Node, YamlParseError> {
        if let Some(construct) = self.unsupported_construct(self.pos, false) {
            return Err(self.unsupported(construct, self.pos));
        }
        let key = self.key()?;

        let before_colon = self.pos;
        self.skip_spaces();
        if self.peek() != Some(b':') {
            return Err(self.expected("':' after key", self.pos));
        }
        let colon_prefix = self.src[before_colon..self.pos].to_string();
        self.pos += 1;

        let value = self.value(indent)?;
        let children: Vec<Element> = vec![
            Token::new(TokenKind::Text, "", key).into(),
            Token::new(TokenKind::Punct, colon_prefix, ":").into(),
            value.into(),
        ];
        Ok(Node::new(YamlKind::Entry, prefix, children))
    }

    fn key(&mut self) -> Result<String, YamlParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'"') | Some(b'\'')) {
            self.pos = self.quoted_end(start)?;
            return Ok(self.src[start..self.pos].to_string());
        }

        let bytes = self.src.as_bytes();
        let mut i = start;
        loop {
            match bytes.get(i) {
                None | Some(b'\n') | Some(b'\r') => return Err(self.expected("':' after key", i)),
                Some(b'#') if i > start && matches!(bytes[i - 1], b' ' | b'\t') => {
                    return Err(self.expected("':' after key", i));
                }
                Some(b':') if ends_indicator(bytes.get(i + 1)) => break,
                Some(_) => i += 1,
            }
        }
        let raw = self.src[start..i].trim_end_matches([' ', '\t']);
        if raw.is_empty() {
            return Err(self.expected("key", start));
        }
        self.pos = start + raw.len();
        Ok(raw.to_string())
    }

    fn value(&mut self, indent: usize) -> Result<Node, YamlParseError> {
        let after_colon = self.pos;
        let bytes = self.src.as_bytes();
        let mut i = after_colon;
        while matches!(bytes.get(i), Some(b' ') | Some(b'\t')) {
            i += 1;
        }

        if matches!(bytes.get(i), None | Some(b'\n') | Some(b'\r') | Some(b'#')) {
            let ahead = self.scan_trivia()?;
            let on_new_line = self.src[after_colon..ahead.end].contains('\n');
            if !self.at_end(ahead.end) && on_new_line && ahead.column > indent {
                return self.mapping(ahead.column);
            }
            return Ok(empty_scalar());
        }

        let prefix = self.take(i);
        if let Some(construct) = self.unsupported_construct(self.pos, true) {
            return Err(self.unsupported(construct, self.pos));
        }

        let start = self.pos;
        if matches!(self.peek(), Some(b'"') | Some(b'\'')) {
            self.pos = self.quoted_end(start)?;
            let mut rest = self.pos;
            while matches!(bytes.get(rest), Some(b' ') | Some(b'\t')) {
                rest += 1;
            }
            let trailing_comment = rest > self.pos && bytes.get(rest) == Some(&b'#');
            if !matches!(bytes.get(rest), None | Some(b'\n') | Some(b'\r')) && !trailing_comment {
                return Err(self.expected("end of line after quoted scalar", rest));
            }
        } else {
            self.pos = self.plain_scalar_end(start);
        }

        let raw = self.src[start..self.pos].to_string();
        Ok(Node::new(
            YamlKind::Scalar,
            prefix,
            vec![Token::new(TokenKind::Text, "", raw).into()],
        ))
    }

    /// End of a plain scalar: the line end or a comment, less trailing blanks.
    fn plain_scalar_end(&self, start: usize) -> usize {
        let bytes = self.src.as_bytes();
        let mut i = start;
        while let Some(&b) = bytes.get(i) {
            if b == b'\n' || b == b'\r' {
                break;
            }
            if b == b'#' && i > start && matches!(bytes[i - 1], b' ' | b'\t') {
                break;
            }
            i += 1;
        }
        start + self.src[start..i].trim_end_matches([' ', '\t']).len()
    }

    fn quoted_end(&self, start: usize) -> Result<usize, YamlParseError> {
        let bytes = self.src.as_bytes();
        let quote = bytes[start];
        let mut i = start + 1;
        while let Some(&b) = bytes.get(i) {
            match b {
                b'\n' | b'\r' => break,
                b'\\' if quote == b'"' => i += 2,
                b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
                _ if b == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }
        Err(self.expected("closing quote on the same line", start))
    }

    fn unsupported_construct(&self, at: usize, in_value: bool) -> Option<&'static str> {
        let rest = &self.src[at..];
        if !in_value {
            if self.starts_marker(at, "---") {
                return Some("multiple documents");
            }
            if self.starts_marker(at, "...") {
                return Some("document end marker");
            }
        }
        let bytes = rest.as_bytes();
        match *bytes.first()? {
            b'-' if ends_indicator(bytes.get(1)) => Some("sequence"),
            b'?' if !in_value && ends_indicator(bytes.get(1)) => Some("complex key"),
            b'[' | b'{' => Some("flow collection"),
            b'|' | b'>' => Some("block scalar"),
            b'&' => Some("anchor"),
            b'*' => Some("alias"),
            b'!' => Some("tag"),
            b'%' => Some("directive"),
            b'@' | b'`' => Some("reserved indicator"),
            _ => None,
        }
    }

    /// Skip blank space, line breaks and comments from the current position.
    fn scan_trivia(&self) -> Result<Ahead, YamlParseError> {
        let bytes = self.src.as_bytes();
        let mut i = self.pos;
        while let Some(&b) = bytes.get(i) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => i += 1,
                b'#' => {
                    while !matches!(bytes.get(i), None | Some(b'\n')) {
                        i += 1;
                    }
                }
                _ => break,
            }
        }

        let line_start = self.src[..i].rfind('\n').map_or(0, |idx| idx + 1);
        let leading = &self.src[line_start..i];
        if !self.at_end(i)
            && leading.contains('\t')
            && leading.trim_matches([' ', '\t']).is_empty()
        {
            return Err(self.unsupported("tab indentation", i));
        }
        Ok(Ahead {
            end: i,
            column: i - line_start,
        })
    }

    fn take(&mut self, end: usize) -> String {
        let text = self.src[self.pos..end].to_string();
        self.pos = end;
        text
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self, offset: usize) -> bool {
        offset >= self.src.len()
    }

    fn starts_marker(&self, at: usize, marker: &str) -> bool {
        self.src[at..].starts_with(marker)
            && ends_indicator(self.src.as_bytes().get(at + marker.len()))
    }

    fn line_of(&self, offset: usize) -> usize {
        self.src[..offset.min(self.src.len())].matches('\n').count() + 1
    }

    fn unsupported(&self, construct: &str, offset: usize) -> YamlParseError {
        YamlParseError::Unsupported {
            construct: construct.to_string(),
            line: self.line_of(offset),
            offset,
        }
    }

    fn expected(&self, expected: &str, offset: usize) -> YamlParseError {
        YamlParseError::Expected {
            expected: expected.to_string(),
            line: self.line_of(offset),
            offset,
        }
    }

    fn indentation(&self, offset: usize) -> YamlParseError {
        YamlParseError::Indentation {
            line: self.line_of(offset),
            offset,
        }
    }
}

/// An indicator character only acts as one when followed by blank space or
/// the end of input.
fn ends_indicator(next: Option<&u8>) -> bool {
    matches!(next, None | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r'))
}

fn empty_scalar() -> Node {
    Node::new(
        YamlKind::Scalar,
        "",
        vec![Token::new(TokenKind::Text, "", "").into()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::{entry_key, entry_value, scalar_text};
    use std::sync::Arc;

    fn round_trip(source: &str) {
        let doc = parse_document(source).unwrap_or_else(|err| panic!("{source:?}: {err}"));
        assert_eq!(doc.print(), source);
    }

    fn entries(mapping: &Node) -> Vec<&Arc<Node>> {
        mapping.child_nodes().collect()
    }

    #[test]
    fn round_trips_supported_documents() {
        round_trip("");
        round_trip("\n\n");
        round_trip("# only a comment\n");
        round_trip("key: value");
        round_trip("key: value\n");
        round_trip("a:\n  b: 1\n  c: 2\nd: 3\n");
        round_trip("---\nserver:\n  port: 8080 # default\n\n# trailing\n");
        round_trip("a :   spaced  \nb: 'quoted # not a comment'\nc: \"esc \\\" aped\"\n");
        round_trip("empty:\nnext: 1\n");
        round_trip("url: http://example.com:8080/path\n");
        round_trip("a:\n    deep:\n        deeper: x\n    back: y\n");
        round_trip("a:\r\n  b: 1\r\n");
        round_trip("  indented: root\n  second: entry\n");
    }

    #[test]
    fn nested_entries_own_their_indentation() {
        let doc = parse_document(
            "management.metrics:\n  enabled: true\n  binders.files.enabled: true\nserver.port: 8080",
        )
        .unwrap();
        let root = doc.first_child(YamlKind::Mapping).unwrap();
        assert!(root.prefix().is_empty());

        let top = entries(root);
        assert_eq!(top.len(), 2);
        assert_eq!(entry_key(top[0]).unwrap().text(), "management.metrics");
        assert_eq!(top[1].prefix().as_str(), "\n");

        let nested = entry_value(top[0]).unwrap();
        assert!(nested.is_kind(YamlKind::Mapping));
        let inner = entries(nested);
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[0].prefix().as_str(), "\n  ");
        assert_eq!(inner[1].prefix().as_str(), "\n  ");
        assert_eq!(scalar_text(entry_value(inner[1]).unwrap()), Some("true"));
    }

    #[test]
    fn trailing_comment_belongs_to_next_entry() {
        let doc = parse_document("a: 1  # one\nb: 2\n").unwrap();
        let root = doc.first_child(YamlKind::Mapping).unwrap();
        let top = entries(root);
        assert_eq!(scalar_text(entry_value(top[0]).unwrap()), Some("1"));
        assert_eq!(top[1].prefix().as_str(), "  # one\n");

        let eof = doc.tokens().last().unwrap();
        assert_eq!(eof.kind(), TokenKind::Eof);
        assert_eq!(eof.prefix().as_str(), "\n");
    }

    #[test]
    fn key_without_value_is_empty_scalar() {
        let doc = parse_document("a:\nb: 1\n").unwrap();
        let root = doc.first_child(YamlKind::Mapping).unwrap();
        let first = entries(root)[0];
        let value = entry_value(first).unwrap();
        assert!(value.is_kind(YamlKind::Scalar));
        assert_eq!(scalar_text(value), Some(""));
    }

    #[test]
    fn document_without_entries_has_no_mapping() {
        let doc = parse_document("# nothing\n").unwrap();
        assert!(doc.first_child(YamlKind::Mapping).is_none());
    }

    #[test]
    fn rejects_unsupported_constructs() {
        let cases = [
            ("items:\n  - a\n", "sequence"),
            ("a: [1, 2]\n", "flow collection"),
            ("a: |\n  text\n", "block scalar"),
            ("a: &x 1\n", "anchor"),
            ("a: 1\n---\nb: 2\n", "multiple documents"),
            ("a:\n\tb: 1\n", "tab indentation"),
        ];
        for (source, construct) in cases {
            match parse_document(source) {
                Err(YamlParseError::Unsupported { construct: found, .. }) => {
                    assert_eq!(found, construct, "{source:?}")
                }
                other => panic!("{source:?}: expected unsupported {construct}, got {other:?}"),
            }
        }
    }

    #[test]
    fn reports_structural_errors_with_lines() {
        assert!(matches!(
            parse_document("a: 1\n  b: 2\n"),
            Err(YamlParseError::Indentation { line: 2, .. })
        ));
        assert!(matches!(
            parse_document("a: 1\njust text\n"),
            Err(YamlParseError::Expected { line: 2, .. })
        ));
        assert!(matches!(
            parse_document("a: \"open\n"),
            Err(YamlParseError::Expected { line: 1, .. })
        ));
    }
}
