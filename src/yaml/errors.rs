use crate::source::ParseFailure;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YamlParseError {
    #[error("unsupported YAML construct '{construct}' on line {line}")]
    Unsupported {
        construct: String,
        line: usize,
        offset: usize,
    },

    #[error("expected {expected} on line {line}")]
    Expected {
        expected: String,
        line: usize,
        offset: usize,
    },

    #[error("unexpected indentation on line {line}")]
    Indentation { line: usize, offset: usize },
}

impl YamlParseError {
    pub fn offset(&self) -> usize {
        match self {
            YamlParseError::Unsupported { offset, .. }
            | YamlParseError::Expected { offset, .. }
            | YamlParseError::Indentation { offset, .. } => *offset,
        }
    }

    pub fn into_failure(self, path: &Path) -> ParseFailure {
        let offset = self.offset();
        ParseFailure::new(path, self.to_string(), Some(offset))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid key path '{input}': {message}")]
pub struct KeyPathError {
    pub input: String,
    pub message: String,
}
