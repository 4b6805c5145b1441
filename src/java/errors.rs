use crate::source::ParseFailure;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JavaParseError {
    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("unexpected character '{ch}' at byte {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("expected {expected} at byte {offset}, found '{found}'")]
    Expected {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("unsupported construct '{construct}' at byte {offset}")]
    Unsupported { construct: String, offset: usize },
}

impl JavaParseError {
    pub fn offset(&self) -> usize {
        match self {
            JavaParseError::Unterminated { offset, .. }
            | JavaParseError::UnexpectedChar { offset, .. }
            | JavaParseError::Expected { offset, .. }
            | JavaParseError::Unsupported { offset, .. } => *offset,
        }
    }

    pub fn into_failure(self, path: &Path) -> ParseFailure {
        let offset = self.offset();
        ParseFailure::new(path, self.to_string(), Some(offset))
    }
}
