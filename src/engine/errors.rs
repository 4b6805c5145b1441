use crate::source::ParseFailure;
use std::path::PathBuf;
use thiserror::Error;

/// Why a file produced no [`ChangeResult`](crate::engine::ChangeResult).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error("recipe '{recipe}' was still changing {} after {cycles} cycles", path.display())]
    NonConvergence {
        path: PathBuf,
        recipe: String,
        cycles: usize,
    },

    #[error("{} does not print back to its source text before any recipe ran", path.display())]
    PrintConsistency { path: PathBuf },
}

impl RunError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            RunError::Parse(failure) => &failure.path,
            RunError::NonConvergence { path, .. } | RunError::PrintConsistency { path } => path,
        }
    }

    /// Short machine-readable category used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Parse(_) => "parse",
            RunError::NonConvergence { .. } => "non-convergence",
            RunError::PrintConsistency { .. } => "print-consistency",
        }
    }
}
