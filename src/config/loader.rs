use crate::config::schema::{RecipeConfig, ValidationError, ValidationIssue};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// What is wrong with a recipe config.
#[derive(Error, Debug)]
pub enum ConfigProblem {
    #[error("cannot be read: {0}")]
    Unreadable(#[source] std::io::Error),

    #[error("is not valid TOML: {0}")]
    Syntax(#[source] toml_edit::de::Error),

    #[error("is invalid: {0}")]
    Invalid(#[source] ValidationError),
}

/// A recipe config that failed to load, naming its file when it had one.
#[derive(Error, Debug)]
#[error("recipe config{} {problem}", describe_file(.file))]
pub struct ConfigError {
    file: Option<PathBuf>,
    #[source]
    problem: ConfigProblem,
}

fn describe_file(file: &Option<PathBuf>) -> String {
    file.as_ref()
        .map(|file| format!(" {}", file.display()))
        .unwrap_or_default()
}

impl ConfigError {
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn problem(&self) -> &ConfigProblem {
        &self.problem
    }

    /// Config-level issues, when the config parsed but did not validate.
    pub fn issues(&self) -> &[ValidationIssue] {
        match &self.problem {
            ConfigProblem::Invalid(error) => &error.issues,
            _ => &[],
        }
    }
}

impl RecipeConfig {
    /// Parse TOML text and check the config-level rules.
    pub fn from_toml(text: &str) -> Result<Self, ConfigProblem> {
        let config: RecipeConfig = toml_edit::de::from_str(text).map_err(ConfigProblem::Syntax)?;
        config.validate().map_err(ConfigProblem::Invalid)?;
        Ok(config)
    }
}

pub fn load_from_str(text: &str) -> Result<RecipeConfig, ConfigError> {
    RecipeConfig::from_toml(text).map_err(|problem| ConfigError {
        file: None,
        problem,
    })
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RecipeConfig, ConfigError> {
    let path = path.as_ref();
    let in_file = |problem| ConfigError {
        file: Some(path.to_path_buf()),
        problem,
    };
    let text = fs::read_to_string(path).map_err(|err| in_file(ConfigProblem::Unreadable(err)))?;
    let config = RecipeConfig::from_toml(&text).map_err(in_file)?;
    debug!(
        path = %path.display(),
        recipes = config.recipes.len(),
        "loaded recipe config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tempfile::TempDir;

    #[test]
    fn toml_syntax_errors_keep_their_source() {
        let err = load_from_str("[[recipes]\ntype = ").unwrap_err();
        assert!(matches!(err.problem(), ConfigProblem::Syntax(_)));
        assert!(err.file().is_none());
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("recipe config is not valid TOML"));
    }

    #[test]
    fn unknown_recipe_type_is_a_syntax_problem() {
        let err = load_from_str("[[recipes]]\ntype = \"rename-everything\"\n").unwrap_err();
        assert!(matches!(err.problem(), ConfigProblem::Syntax(_)));
        assert!(err.issues().is_empty());
    }

    #[test]
    fn file_is_named_in_the_message() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipes.toml");
        fs::write(&path, "").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert_eq!(err.file(), Some(path.as_path()));
        assert_eq!(err.issues(), &[ValidationIssue::EmptyRecipeList]);
        assert_eq!(
            err.to_string(),
            format!(
                "recipe config {} is invalid: recipe config contains no recipes",
                path.display()
            )
        );
    }

    #[test]
    fn from_toml_reports_the_bare_problem() {
        let problem = RecipeConfig::from_toml("[meta]\nmax_cycles = 0\n").unwrap_err();
        assert!(matches!(problem, ConfigProblem::Invalid(_)));
    }
}
