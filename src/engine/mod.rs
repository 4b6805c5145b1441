//! Runs recipes over parsed sources until they stop changing.
//!
//! Every valid recipe is applied to every file in declared order; one such
//! pass is a cycle. A file is finished when a cycle leaves its tree
//! identical. Up to `max_cycles` cycles may change a file, and one more
//! runs to confirm the result. A file still changing in that confirming cycle
//! fails with [`RunError::NonConvergence`] and produces no result.
//!
//! Files are independent: one that fails to parse, to print back, or to
//! converge is recorded in [`RunResult::failures`] and the rest of the run
//! carries on.

pub mod errors;
pub mod result;

pub use errors::RunError;
pub use result::{ChangeResult, FileFailure, RunResult};

use crate::recipe::{self, Recipe};
use crate::source::{ParseFailure, SourceFile};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, warn};

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    max_cycles: usize,
    parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cycles: 3,
            parallel: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on the cycles that may change a file, at least one. The
    /// cycle that confirms nothing changes any more is not counted.
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles.max(1);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn max_cycles(&self) -> usize {
        self.max_cycles
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate `recipes`, then run the valid ones over `sources`.
    ///
    /// Invalid recipes are reported in [`RunResult::validation`] and skipped.
    /// Changes and failures are listed in input order.
    pub fn run(
        &self,
        recipes: &[Box<dyn Recipe>],
        sources: Vec<Result<SourceFile, ParseFailure>>,
    ) -> RunResult {
        let mut validation = Vec::new();
        let runnable: Vec<&dyn Recipe> = recipes
            .iter()
            .filter_map(|recipe| {
                let checked = recipe.validate();
                if checked.is_valid() {
                    return Some(recipe.as_ref());
                }
                for failure in checked.failures() {
                    warn!(
                        recipe = recipe.name(),
                        property = %failure.property,
                        "{}",
                        failure.message
                    );
                }
                warn!(recipe = recipe.name(), "refusing to run invalid recipe");
                validation.extend(checked);
                None
            })
            .collect();

        let outcomes: Vec<Result<ChangeResult, RunError>> = if self.config.parallel {
            sources
                .into_par_iter()
                .map(|source| self.run_source(&runnable, source))
                .collect()
        } else {
            sources
                .into_iter()
                .map(|source| self.run_source(&runnable, source))
                .collect()
        };

        let mut result = RunResult {
            validation,
            ..RunResult::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(change) => result.changes.push(change),
                Err(error) => result.failures.push(FileFailure::from(error)),
            }
        }
        debug!(
            changed = result.changed().count(),
            unchanged = result.changes.len() - result.changed().count(),
            failed = result.failures.len(),
            "run complete"
        );
        result
    }

    fn run_source(
        &self,
        recipes: &[&dyn Recipe],
        source: Result<SourceFile, ParseFailure>,
    ) -> Result<ChangeResult, RunError> {
        let source = source.inspect_err(|failure| {
            debug!(path = %failure.path.display(), "{}", failure.message);
        })?;
        self.run_file(recipes, &source)
    }

    /// Cycle `recipes` over one file until its tree stops changing.
    pub fn run_file(
        &self,
        recipes: &[&dyn Recipe],
        source: &SourceFile,
    ) -> Result<ChangeResult, RunError> {
        let path = source.path();
        if source.root().print() != source.text() {
            warn!(path = %path.display(), "tree does not print back to its source; skipping");
            return Err(RunError::PrintConsistency {
                path: path.to_path_buf(),
            });
        }

        let mut current = Arc::clone(source.root());
        let mut changed_by: Vec<String> = Vec::new();
        let mut cycle = 0;
        loop {
            cycle += 1;
            let mut this_cycle = Vec::new();
            let before = Arc::clone(&current);
            for recipe in recipes {
                current = recipe::apply(*recipe, &current, &mut this_cycle);
            }

            if Arc::ptr_eq(&before, &current) {
                let after = current.print();
                let changed = after != source.text();
                debug!(path = %path.display(), cycles = cycle, changed, "converged");
                return Ok(ChangeResult {
                    path: path.to_path_buf(),
                    before: source.text().to_string(),
                    after,
                    changed,
                    recipes: changed_by,
                    cycles: cycle,
                });
            }

            debug!(path = %path.display(), cycle, recipes = ?this_cycle, "cycle changed tree");
            if cycle > self.config.max_cycles {
                let recipe = this_cycle.first().cloned().unwrap_or_default();
                let cycles = self.config.max_cycles;
                warn!(path = %path.display(), %recipe, cycles, "recipes did not converge");
                return Err(RunError::NonConvergence {
                    path: path.to_path_buf(),
                    recipe,
                    cycles,
                });
            }
            for name in this_cycle {
                if !changed_by.contains(&name) {
                    changed_by.push(name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::{DeleteProperty, RemoveExtraSemicolons};
    use crate::source::SourceParser;
    use crate::tree::{Cursor, Node, Token, TokenKind};
    use crate::visit::TreeVisitor;
    use crate::yaml::{YamlKind, YamlParser};
    use std::path::{Path, PathBuf};

    /// Appends a character to the root's first token, every time.
    struct Grow;

    struct GrowVisitor;

    impl TreeVisitor for GrowVisitor {
        fn leave(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
            if !cursor.is_root() {
                return Arc::clone(node);
            }
            let found = node
                .children()
                .iter()
                .enumerate()
                .find_map(|(idx, child)| child.as_token().map(|token| (idx, token)));
            match found {
                Some((idx, token)) => {
                    let text = format!("{}x", token.text());
                    Arc::new(node.with_child(idx, token.with_text(text)))
                }
                None => Arc::clone(node),
            }
        }
    }

    impl Recipe for Grow {
        fn name(&self) -> &str {
            "Grow"
        }

        fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>> {
            Some(Box::new(GrowVisitor))
        }
    }

    fn yaml(path: &str, text: &str) -> Result<SourceFile, ParseFailure> {
        YamlParser::new().parse(Path::new(path), text)
    }

    fn sequential() -> Engine {
        Engine::new(EngineConfig::new().with_parallel(false))
    }

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_cycles(), 3);
        assert!(config.parallel());
        assert_eq!(EngineConfig::new().with_max_cycles(0).max_cycles(), 1);
    }

    #[test]
    fn converging_change_reports_cycles_and_recipes() {
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(DeleteProperty::new("a"))];
        let result = sequential().run(&recipes, vec![yaml("app.yml", "a: 1\nb: 2\n")]);
        assert!(result.failures.is_empty());
        let change = &result.changes[0];
        assert!(change.changed);
        assert_eq!(change.after, "b: 2\n");
        assert_eq!(change.recipes, vec!["DeleteProperty"]);
        assert_eq!(change.cycles, 2);
    }

    #[test]
    fn untouched_file_converges_in_one_cycle() {
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(RemoveExtraSemicolons::new())];
        let result = sequential().run(&recipes, vec![yaml("app.yml", "a: 1\n")]);
        let change = &result.changes[0];
        assert!(!change.changed);
        assert_eq!(change.cycles, 1);
        assert!(change.recipes.is_empty());
        assert_eq!(change.before, change.after);
    }

    #[test]
    fn one_allowed_cycle_still_gets_its_confirmation() {
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(DeleteProperty::new("a"))];
        let engine = Engine::new(EngineConfig::new().with_parallel(false).with_max_cycles(1));
        let result = engine.run(&recipes, vec![yaml("app.yml", "a: 1\nb: 2\n")]);
        assert!(result.failures.is_empty());
        let change = &result.changes[0];
        assert_eq!(change.after, "b: 2\n");
        assert_eq!(change.cycles, 2);
    }

    #[test]
    fn endless_recipe_fails_to_converge() {
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(Grow)];
        let engine = Engine::new(EngineConfig::new().with_parallel(false).with_max_cycles(2));
        let result = engine.run(&recipes, vec![yaml("app.yml", "a: 1\n")]);
        assert!(result.changes.is_empty());
        assert_eq!(
            result.failures[0].error,
            RunError::NonConvergence {
                path: PathBuf::from("app.yml"),
                recipe: "Grow".to_string(),
                cycles: 2,
            }
        );
    }

    #[test]
    fn inconsistent_tree_is_not_run() {
        let root = Arc::new(Node::new(
            YamlKind::Document,
            "",
            vec![Token::new(TokenKind::Eof, "", "").into()],
        ));
        let source = SourceFile::new("drift.yml", "a: 1\n", root);
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(Grow)];
        let result = sequential().run(&recipes, vec![Ok(source)]);
        assert_eq!(result.failures[0].error.kind(), "print-consistency");
    }

    #[test]
    fn parse_failures_do_not_stop_other_files() {
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(DeleteProperty::new("a"))];
        let sources = vec![
            yaml("bad.yml", "a: [1, 2]\n"),
            yaml("good.yml", "a: 1\nb: 2\n"),
        ];
        let result = Engine::default().run(&recipes, sources);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].path, PathBuf::from("bad.yml"));
        assert_eq!(result.failures[0].error.kind(), "parse");
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].after, "b: 2\n");
    }

    #[test]
    fn invalid_recipes_are_reported_and_skipped() {
        let recipes: Vec<Box<dyn Recipe>> = vec![
            Box::new(DeleteProperty::from_options(None, None, None)),
            Box::new(DeleteProperty::new("b")),
        ];
        let result = sequential().run(&recipes, vec![yaml("app.yml", "a: 1\nb: 2\n")]);
        assert!(!result.is_valid());
        assert_eq!(result.validation[0].property, "property_key");
        assert_eq!(result.changes[0].after, "a: 1\n");
    }

    #[test]
    fn parallel_run_keeps_input_order() {
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(DeleteProperty::new("drop"))];
        let sources: Vec<_> = (0..32)
            .map(|i| yaml(&format!("f{i}.yml"), &format!("drop: {i}\nkeep: {i}\n")))
            .collect();
        let result = Engine::default().run(&recipes, sources);
        for (i, change) in result.changes.iter().enumerate() {
            assert_eq!(change.path, PathBuf::from(format!("f{i}.yml")));
            assert_eq!(change.after, format!("keep: {i}\n"));
        }
    }
}
