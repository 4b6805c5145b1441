//! Lossless source-to-source rewriting.
//!
//! Sources are parsed into immutable trees that keep every byte of trivia, so
//! printing an untouched tree reproduces its input exactly. Recipes walk those
//! trees with visitors and return new trees that share every unchanged
//! subtree with the old one. The [`Engine`] repeats the recipes until a cycle
//! changes nothing and reports the per-file outcome.
//!
//! # Architecture
//!
//! - [`tree`]: nodes, tokens, trivia, markers and the printer
//! - [`visit`]: the depth-first walk that rebuilds only what changed
//! - [`java`] and [`yaml`]: reference parsers and per-kind visitor hooks
//! - [`pattern`]: `"<owner> <name>(<params>)"` method matching
//! - [`recipe`] and [`recipes`]: the recipe contract and the built-in recipes
//! - [`engine`]: cycles, convergence and the run report
//! - [`config`]: recipe lists declared in TOML
//!
//! # Example
//!
//! ```
//! use rewrite_engine::recipes::DeleteProperty;
//! use rewrite_engine::{Engine, EngineConfig, Recipe, SourceParser, YamlParser};
//! use std::path::Path;
//!
//! let source = YamlParser::new().parse(
//!     Path::new("application.yml"),
//!     "server:\n  port: 8080\n  address: 0.0.0.0\n",
//! );
//! let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(DeleteProperty::new("server.address"))];
//!
//! let result = Engine::new(EngineConfig::default()).run(&recipes, vec![source]);
//! assert_eq!(result.changes[0].after, "server:\n  port: 8080\n");
//! ```

pub mod config;
pub mod engine;
pub mod java;
pub mod pattern;
pub mod recipe;
pub mod recipes;
pub mod source;
pub mod tree;
pub mod visit;
pub mod yaml;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, RecipeConfig};
pub use engine::{ChangeResult, Engine, EngineConfig, FileFailure, RunError, RunResult};
pub use java::JavaParser;
pub use pattern::{MethodPattern, PatternError};
pub use recipe::{CompositeRecipe, Recipe, RecipeOption, Validation, ValidationFailure};
pub use source::{read_sources, ParseFailure, ReadError, SourceFile, SourceParser};
pub use tree::{Cursor, Element, Node, Space, Token};
pub use visit::{walk, TreeVisitor};
pub use yaml::{KeyPath, YamlParser};
