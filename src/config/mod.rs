//! Declarative recipe lists in TOML.

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError, ConfigProblem};
pub use schema::{Metadata, RecipeConfig, RecipeDefinition, ValidationError, ValidationIssue};
