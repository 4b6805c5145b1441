//! The contract between parsers and the engine.

use crate::tree::Node;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

/// A parsed input: its path, the exact text it was parsed from and the tree.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    root: Arc<Node>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, root: Arc<Node>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            root,
        }
    }

    /// Wrap a tree that was built rather than parsed; its text is its print.
    pub fn from_tree(path: impl Into<PathBuf>, root: Arc<Node>) -> Self {
        let text = root.print();
        Self::new(path, text, root)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    pub fn with_root(&self, root: Arc<Node>) -> Self {
        Self {
            path: self.path.clone(),
            text: self.text.clone(),
            root,
        }
    }
}

/// A file the parser could not turn into a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to parse {}: {message}", path.display())]
pub struct ParseFailure {
    pub path: PathBuf,
    pub message: String,
    /// Byte offset of the failure, when known.
    pub offset: Option<usize>,
}

impl ParseFailure {
    pub fn new(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        offset: Option<usize>,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            offset,
        }
    }
}

/// Produces lossless trees from source text.
pub trait SourceParser: Send + Sync {
    /// Whether this parser handles files at `path`.
    fn accepts(&self, path: &Path) -> bool;

    fn parse(&self, path: &Path, text: &str) -> Result<SourceFile, ParseFailure>;

    fn parse_all(&self, inputs: &[(PathBuf, String)]) -> Vec<Result<SourceFile, ParseFailure>> {
        inputs
            .iter()
            .map(|(path, text)| self.parse(path, text))
            .collect()
    }
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read every file under `root` that `parser` accepts and parse them as one
/// set, in path order. Paths in the results are relative to `root`.
pub fn read_sources(
    root: &Path,
    parser: &dyn SourceParser,
) -> Result<Vec<Result<SourceFile, ParseFailure>>, ReadError> {
    let mut inputs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !parser.accepts(entry.path()) {
            continue;
        }
        let text = fs::read_to_string(entry.path()).map_err(|source| ReadError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        inputs.push((relative.to_path_buf(), text));
    }
    Ok(parser.parse_all(&inputs))
}
