//! The recipe contract: declared options, validation and visitor factories.
//!
//! A recipe declares its options as [`RecipeOption`]s. The provided
//! [`Recipe::validate`] checks every one of them and reports *all*
//! problems, in declaration order, followed by the recipe's own checks and
//! then those of its children. Nothing about validation stops at the first
//! failure.

use crate::pattern::MethodPattern;
use crate::tree::Node;
use crate::visit::{walk, TreeVisitor};
use crate::yaml::KeyPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A configured unit of tree transformation.
pub trait Recipe: Send + Sync {
    /// Stable identifier used in reports, e.g. `ChangeMethodName`.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Declared options with their current values, in declaration order.
    fn options(&self) -> Vec<RecipeOption> {
        Vec::new()
    }

    /// Checks beyond the per-option ones.
    fn custom_validation(&self) -> Vec<ValidationFailure> {
        Vec::new()
    }

    /// Recipes run after this one's own visitor, in order.
    fn children(&self) -> &[Box<dyn Recipe>] {
        &[]
    }

    /// The visitor this recipe applies to each tree, if it has one of its own.
    fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>>;

    fn validate(&self) -> Validation {
        let mut validation = Validation::default();
        for option in self.options() {
            if let Some(message) = option.check() {
                validation.push(ValidationFailure::new(self.name(), option.name, message));
            }
        }
        validation.extend(self.custom_validation());
        for child in self.children() {
            validation.extend(child.validate());
        }
        validation
    }
}

/// Apply `recipe` and then its children, depth first, to `root`.
///
/// Names of the recipes whose visitor actually changed the tree are appended
/// to `changed_by`, in the order they ran.
pub fn apply(recipe: &dyn Recipe, root: &Arc<Node>, changed_by: &mut Vec<String>) -> Arc<Node> {
    let mut current = Arc::clone(root);
    if let Some(mut visitor) = recipe.visitor() {
        trace!(recipe = recipe.name(), "visiting");
        let visited = walk(&mut visitor, &current);
        if !Arc::ptr_eq(&visited, &current) {
            changed_by.push(recipe.name().to_string());
            current = visited;
        }
    }
    for child in recipe.children() {
        current = apply(child.as_ref(), &current, changed_by);
    }
    current
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl OptionValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(value) => write!(f, "{value}"),
            OptionValue::Int(value) => write!(f, "{value}"),
            OptionValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// What a present option value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Any,
    Boolean,
    NonEmptyText,
    MethodPattern,
    KeyPath,
    JavaIdentifier,
}

impl Constraint {
    /// Why `value` violates this constraint, if it does.
    pub fn check(self, value: &OptionValue) -> Option<String> {
        let text = match (self, value) {
            (Constraint::Any, _) | (Constraint::Boolean, OptionValue::Bool(_)) => return None,
            (Constraint::Boolean, other) => {
                return Some(format!("expected true or false, found '{other}'"));
            }
            (_, OptionValue::Text(text)) => text.as_str(),
            (_, other) => return Some(format!("expected text, found '{other}'")),
        };
        match self {
            Constraint::Any | Constraint::Boolean => None,
            Constraint::NonEmptyText => {
                text.trim().is_empty().then(|| "must not be empty".to_string())
            }
            Constraint::MethodPattern => {
                MethodPattern::parse(text).err().map(|err| err.to_string())
            }
            Constraint::KeyPath => KeyPath::parse(text).err().map(|err| err.to_string()),
            Constraint::JavaIdentifier => {
                (!is_java_identifier(text))
                    .then(|| format!("'{text}' is not a valid Java identifier"))
            }
        }
    }
}

fn is_java_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let starts_well = chars
        .next()
        .is_some_and(|ch| ch.is_alphabetic() || ch == '_' || ch == '$');
    starts_well
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
        && !crate::java::lexer::is_keyword(text)
}

/// A declared recipe option and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeOption {
    pub name: &'static str,
    pub required: bool,
    pub value: Option<OptionValue>,
    pub constraint: Constraint,
}

impl RecipeOption {
    pub fn required(
        name: &'static str,
        value: Option<OptionValue>,
        constraint: Constraint,
    ) -> Self {
        Self {
            name,
            required: true,
            value,
            constraint,
        }
    }

    pub fn optional(
        name: &'static str,
        value: Option<OptionValue>,
        constraint: Constraint,
    ) -> Self {
        Self {
            name,
            required: false,
            value,
            constraint,
        }
    }

    /// The single problem with this option's value, if any.
    pub fn check(&self) -> Option<String> {
        match &self.value {
            None if self.required => Some("is required".to_string()),
            None => None,
            Some(value) => self.constraint.check(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub recipe: String,
    pub property: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(
        recipe: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipe: recipe.into(),
            property: property.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.recipe, self.property, self.message)
    }
}

/// Every validation failure of a recipe tree, in reporting order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Validation {
    failures: Vec<ValidationFailure>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn push(&mut self, failure: ValidationFailure) {
        self.failures.push(failure);
    }

    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }
}

impl Extend<ValidationFailure> for Validation {
    fn extend<I: IntoIterator<Item = ValidationFailure>>(&mut self, iter: I) {
        self.failures.extend(iter);
    }
}

impl IntoIterator for Validation {
    type Item = ValidationFailure;
    type IntoIter = std::vec::IntoIter<ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

/// A named list of recipes with no visitor of its own.
pub struct CompositeRecipe {
    name: String,
    description: String,
    children: Vec<Box<dyn Recipe>>,
}

impl CompositeRecipe {
    pub fn new(name: impl Into<String>, children: Vec<Box<dyn Recipe>>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            children,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Recipe for CompositeRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn children(&self) -> &[Box<dyn Recipe>] {
        &self.children
    }

    fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Cursor, Token, TokenKind};
    use crate::yaml::YamlKind;

    struct Needs {
        first: Option<String>,
        second: Option<String>,
    }

    impl Recipe for Needs {
        fn name(&self) -> &str {
            "Needs"
        }

        fn options(&self) -> Vec<RecipeOption> {
            vec![
                RecipeOption::required(
                    "first",
                    self.first.clone().map(OptionValue::from),
                    Constraint::NonEmptyText,
                ),
                RecipeOption::required(
                    "second",
                    self.second.clone().map(OptionValue::from),
                    Constraint::JavaIdentifier,
                ),
            ]
        }

        fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>> {
            None
        }
    }

    struct Rename(&'static str);

    struct RenameVisitor(&'static str);

    impl TreeVisitor for RenameVisitor {
        fn leave(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
            match node.tokens().next() {
                Some(token) if !token.is(self.0) => {
                    Arc::new(node.with_child(0, token.with_text(self.0)))
                }
                _ => Arc::clone(node),
            }
        }
    }

    impl Recipe for Rename {
        fn name(&self) -> &str {
            self.0
        }

        fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>> {
            Some(Box::new(RenameVisitor(self.0)))
        }
    }

    #[test]
    fn missing_options_fail_in_declaration_order() {
        let recipe = Needs {
            first: None,
            second: None,
        };
        let failures = recipe.validate().into_failures();
        let properties: Vec<&str> = failures.iter().map(|f| f.property.as_str()).collect();
        assert_eq!(properties, vec!["first", "second"]);
        assert!(failures.iter().all(|f| f.recipe == "Needs"));
    }

    #[test]
    fn present_values_are_checked_against_constraints() {
        let recipe = Needs {
            first: Some("  ".to_string()),
            second: Some("class".to_string()),
        };
        let validation = recipe.validate();
        assert_eq!(validation.len(), 2);
        assert_eq!(validation.failures()[0].message, "must not be empty");
        assert!(validation.failures()[1].message.contains("not a valid Java identifier"));

        let valid = Needs {
            first: Some("x".to_string()),
            second: Some("bar".to_string()),
        };
        assert!(valid.validate().is_valid());
    }

    #[test]
    fn composite_appends_child_failures_in_order() {
        let composite = CompositeRecipe::new(
            "All",
            vec![
                Box::new(Needs { first: None, second: Some("ok".into()) }),
                Box::new(Needs { first: Some("x".into()), second: None }),
            ],
        );
        let properties: Vec<String> = composite
            .validate()
            .into_iter()
            .map(|f| f.property)
            .collect();
        assert_eq!(properties, vec!["first", "second"]);
    }

    #[test]
    fn apply_runs_children_after_parent_and_records_changes() {
        let root = Arc::new(Node::new(
            YamlKind::Scalar,
            "",
            vec![Token::new(TokenKind::Text, "", "a").into()],
        ));
        let composite =
            CompositeRecipe::new("Both", vec![Box::new(Rename("b")), Box::new(Rename("c"))]);
        let mut changed_by = Vec::new();
        let result = apply(&composite, &root, &mut changed_by);
        assert_eq!(result.print(), "c");
        assert_eq!(changed_by, vec!["b", "c"]);

        let mut again = Vec::new();
        let same = apply(&Rename("c"), &result, &mut again);
        assert!(Arc::ptr_eq(&same, &result));
        assert!(again.is_empty());
    }
}
