//! Lossless parsing and type attribution for a Java subset.
//!
//! The subset covers package and import declarations, classes, interfaces
//! and enums with fields, methods, constructors and initializers, and the
//! statements and expressions commonly found in method bodies: blocks, local
//! variables, `if`/`while`, `try` with resources, calls, object and array
//! creation, casts and operators. Anything else (loops other than `while`,
//! `switch`, lambdas, method references) is rejected with a parse failure
//! rather than parsed lossily.

pub mod access;
pub mod attribute;
pub mod errors;
pub mod kind;
pub mod lexer;
pub mod parser;
pub mod visitor;

pub use attribute::{attribute, SymbolTable};
pub use errors::JavaParseError;
pub use kind::JavaKind;
pub use parser::parse_compilation_unit;
pub use visitor::{JavaDispatch, JavaVisitor};

use crate::source::{ParseFailure, SourceFile, SourceParser};
use crate::tree::Node;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Parses `.java` files and attributes them as one source set.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        JavaParser
    }
}

impl SourceParser for JavaParser {
    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "java")
    }

    fn parse(&self, path: &Path, text: &str) -> Result<SourceFile, ParseFailure> {
        let root = parse_compilation_unit(text).map_err(|err| err.into_failure(path))?;
        let attributed = attribute(&[Arc::new(root)]);
        match attributed.into_iter().next() {
            Some(root) => Ok(SourceFile::new(path, text, root)),
            None => Err(ParseFailure::new(path, "attribution produced no tree", None)),
        }
    }

    /// Parse every input, then attribute the successfully parsed units
    /// together so references between them resolve.
    fn parse_all(&self, inputs: &[(PathBuf, String)]) -> Vec<Result<SourceFile, ParseFailure>> {
        let parsed: Vec<Result<Arc<Node>, ParseFailure>> = inputs
            .iter()
            .map(|(path, text)| {
                parse_compilation_unit(text)
                    .map(Arc::new)
                    .map_err(|err| err.into_failure(path))
            })
            .collect();

        let units: Vec<Arc<Node>> = parsed
            .iter()
            .filter_map(|r| r.as_ref().ok().cloned())
            .collect();
        debug!(
            parsed = units.len(),
            failed = inputs.len() - units.len(),
            "parsed java sources"
        );
        let mut attributed = attribute(&units).into_iter();

        inputs
            .iter()
            .zip(parsed)
            .map(|((path, text), result)| {
                result?;
                attributed
                    .next()
                    .map(|root| SourceFile::new(path.clone(), text.clone(), root))
                    .ok_or_else(|| {
                        ParseFailure::new(path.clone(), "attribution produced no tree", None)
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_java_files_only() {
        let parser = JavaParser::new();
        assert!(parser.accepts(Path::new("src/A.java")));
        assert!(!parser.accepts(Path::new("application.yml")));
    }

    #[test]
    fn parse_all_isolates_failures() {
        let inputs = vec![
            (PathBuf::from("A.java"), "class A { void a() { new B().b(); } }".to_string()),
            (PathBuf::from("Bad.java"), "class Bad { void a() { for (;;) {} } }".to_string()),
            (PathBuf::from("B.java"), "class B { void b() {} }".to_string()),
        ];
        let results = JavaParser::new().parse_all(&inputs);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        let failure = results[1].as_ref().unwrap_err();
        assert_eq!(failure.path, PathBuf::from("Bad.java"));
        assert!(failure.offset.is_some());
        assert!(results[2].is_ok());

        let a = results[0].as_ref().unwrap();
        assert_eq!(a.root().print(), inputs[0].1);
    }
}
