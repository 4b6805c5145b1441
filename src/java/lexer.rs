use crate::java::errors::JavaParseError;
use crate::tree::{Token, TokenKind};

const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "void",
    "volatile",
    "while",
];

// Longest first. `>>` is deliberately absent so nested type arguments close
// one bracket at a time; the parser glues adjacent `>` back into shifts.
const PUNCTUATION: &[&str] = &[
    "<<=", "...", "->", "::", "++", "--", "&&", "||", "==", "!=", "<=", ">=", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", "<<", "(", ")", "{", "}", "[", "]", ";", ",", ".", "@", "=",
    ">", "<", "!", "~", "?", ":", "+", "-", "*", "/", "&", "|", "^", "%",
];

/// A token together with the byte offset where its text starts.
#[derive(Debug, Clone)]
pub struct Lexed {
    pub token: Token,
    pub offset: usize,
}

/// Split `source` into tokens. Every byte lands in exactly one token's prefix
/// or text; the final token is a zero-width `Eof` holding trailing trivia.
pub fn tokenize(source: &str) -> Result<Vec<Lexed>, JavaParseError> {
    let mut lexer = Lexer { source, pos: 0 };
    let mut out = Vec::new();
    loop {
        let prefix = lexer.trivia()?;
        let offset = lexer.pos;
        let Some(ch) = lexer.peek() else {
            out.push(Lexed {
                token: Token::new(TokenKind::Eof, prefix, ""),
                offset,
            });
            return Ok(out);
        };
        let (kind, text) = lexer.token(ch)?;
        out.push(Lexed {
            token: Token::new(kind, prefix, text),
            offset,
        });
    }
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn trivia(&mut self) -> Result<&'a str, JavaParseError> {
        let start = self.pos;
        loop {
            let rest = self.rest();
            if rest.starts_with("//") {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.pos += len;
            } else if rest.starts_with("/*") {
                let Some(end) = rest[2..].find("*/") else {
                    return Err(JavaParseError::Unterminated {
                        what: "comment",
                        offset: self.pos,
                    });
                };
                self.pos += end + 4;
            } else if let Some(ch) = self.peek().filter(|ch| ch.is_whitespace()) {
                self.pos += ch.len_utf8();
            } else {
                return Ok(&self.source[start..self.pos]);
            }
        }
    }

    fn token(&mut self, ch: char) -> Result<(TokenKind, &'a str), JavaParseError> {
        let start = self.pos;
        let rest = self.rest();

        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                .unwrap_or(rest.len());
            self.pos += len;
            let word = &rest[..len];
            let kind = match word {
                "true" | "false" | "null" => TokenKind::Literal,
                _ if is_keyword(word) => TokenKind::Keyword,
                _ => TokenKind::Identifier,
            };
            return Ok((kind, word));
        }

        if ch.is_ascii_digit() || (ch == '.' && rest[1..].starts_with(|c: char| c.is_ascii_digit()))
        {
            self.pos += number_len(rest);
            return Ok((TokenKind::Literal, &self.source[start..self.pos]));
        }

        if ch == '"' {
            if rest.starts_with("\"\"\"") {
                return Err(JavaParseError::Unsupported {
                    construct: "text block".to_string(),
                    offset: start,
                });
            }
            self.pos += quoted_len(rest, '"').ok_or(JavaParseError::Unterminated {
                what: "string literal",
                offset: start,
            })?;
            return Ok((TokenKind::Literal, &self.source[start..self.pos]));
        }

        if ch == '\'' {
            self.pos += quoted_len(rest, '\'').ok_or(JavaParseError::Unterminated {
                what: "character literal",
                offset: start,
            })?;
            return Ok((TokenKind::Literal, &self.source[start..self.pos]));
        }

        if let Some(punct) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            self.pos += punct.len();
            return Ok((TokenKind::Punct, *punct));
        }

        Err(JavaParseError::UnexpectedChar { ch, offset: start })
    }
}

fn number_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let hex = rest.starts_with("0x") || rest.starts_with("0X");
    let mut len = 0;
    while len < bytes.len() {
        let b = bytes[len];
        let exponent_sign = (b == b'+' || b == b'-')
            && !hex
            && len > 0
            && matches!(bytes[len - 1], b'e' | b'E');
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
            // A dot not followed by a digit is member access on the literal.
            if b == b'.' && !bytes.get(len + 1).is_some_and(u8::is_ascii_digit) && len > 0 {
                break;
            }
            len += 1;
        } else {
            break;
        }
    }
    len
}

/// Length of a quoted literal including both quotes, honouring escapes.
fn quoted_len(rest: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in rest.char_indices().skip(1) {
        match ch {
            '\n' => return None,
            '\\' if !escaped => escaped = true,
            c if c == quote && !escaped => return Some(idx + c.len_utf8()),
            _ => escaped = false,
        }
    }
    None
}
