use crate::engine::errors::RunError;
use crate::recipe::ValidationFailure;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use similar::TextDiff;
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome of running recipes over one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "ChangeResult should be checked for changes"]
pub struct ChangeResult {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
    pub changed: bool,
    /// Recipes that changed the file, in the order they first did.
    pub recipes: Vec<String>,
    /// Cycles run, including the final one that confirmed no further change.
    pub cycles: usize,
}

impl ChangeResult {
    /// Unified diff of the change, empty when nothing changed.
    pub fn diff(&self) -> String {
        if !self.changed {
            return String::new();
        }
        let path = self.path.display().to_string();
        TextDiff::from_lines(&self.before, &self.after)
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{path}"), &format!("b/{path}"))
            .to_string()
    }
}

impl fmt::Display for ChangeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changed {
            write!(
                f,
                "Changed {} ({})",
                self.path.display(),
                self.recipes.join(", ")
            )
        } else {
            write!(f, "Unchanged {}", self.path.display())
        }
    }
}

/// A file the engine could not produce a result for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: RunError,
}

impl From<RunError> for FileFailure {
    fn from(error: RunError) -> Self {
        Self {
            path: error.path().to_path_buf(),
            error,
        }
    }
}

impl Serialize for FileFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileFailure", 3)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("kind", self.error.kind())?;
        state.serialize_field("message", &self.error.to_string())?;
        state.end()
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed on {}: {}", self.path.display(), self.error)
    }
}

/// Everything a run produced, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Failures of recipes that were refused; empty when all were valid.
    pub validation: Vec<ValidationFailure>,
    pub changes: Vec<ChangeResult>,
    pub failures: Vec<FileFailure>,
}

impl RunResult {
    pub fn is_valid(&self) -> bool {
        self.validation.is_empty()
    }

    pub fn changed(&self) -> impl Iterator<Item = &ChangeResult> {
        self.changes.iter().filter(|change| change.changed)
    }

    pub fn change_for(&self, path: &Path) -> Option<&ChangeResult> {
        self.changes.iter().find(|change| change.path == path)
    }

    pub fn failure_for(&self, path: &Path) -> Option<&FileFailure> {
        self.failures.iter().find(|failure| failure.path == path)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
