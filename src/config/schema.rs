use crate::engine::EngineConfig;
use crate::recipe::{OptionValue, Recipe};
use crate::recipes::{ChangeMethodName, CoalesceProperties, DeleteProperty, RemoveExtraSemicolons};
use serde::Deserialize;
use std::fmt;

/// A declarative recipe list, as read from TOML.
///
/// ```toml
/// [meta]
/// name = "spring-boot-cleanup"
/// max_cycles = 5
///
/// [[recipes]]
/// type = "delete-property"
/// property_key = "management.metrics.binders.files.enabled"
/// coalesce = true
/// ```
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RecipeConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub recipes: Vec<RecipeDefinition>,
}

impl RecipeConfig {
    /// Config-level problems only; recipe options are checked by
    /// [`Recipe::validate`] when the engine runs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.recipes.is_empty() {
            issues.push(ValidationIssue::EmptyRecipeList);
        }
        if self.meta.max_cycles == Some(0) {
            issues.push(ValidationIssue::ZeroMaxCycles);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn recipes(&self) -> Vec<Box<dyn Recipe>> {
        self.recipes.iter().map(RecipeDefinition::build).collect()
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(max_cycles) = self.meta.max_cycles {
            config = config.with_max_cycles(max_cycles);
        }
        if let Some(parallel) = self.meta.parallel {
            config = config.with_parallel(parallel);
        }
        config
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_cycles: Option<usize>,
    #[serde(default)]
    pub parallel: Option<bool>,
}

/// One `[[recipes]]` entry. Options left out stay `None` so that the
/// recipe reports them through validation.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RecipeDefinition {
    RemoveExtraSemicolons,
    ChangeMethodName {
        #[serde(default)]
        method_pattern: Option<String>,
        #[serde(default)]
        new_method_name: Option<String>,
    },
    DeleteProperty {
        #[serde(default)]
        property_key: Option<String>,
        #[serde(default)]
        expected_value: Option<OptionValue>,
        #[serde(default)]
        coalesce: Option<bool>,
    },
    CoalesceProperties,
}

impl RecipeDefinition {
    pub fn build(&self) -> Box<dyn Recipe> {
        match self {
            RecipeDefinition::RemoveExtraSemicolons => Box::new(RemoveExtraSemicolons::new()),
            RecipeDefinition::ChangeMethodName {
                method_pattern,
                new_method_name,
            } => Box::new(ChangeMethodName::from_options(
                method_pattern.clone(),
                new_method_name.clone(),
            )),
            RecipeDefinition::DeleteProperty {
                property_key,
                expected_value,
                coalesce,
            } => Box::new(DeleteProperty::from_options(
                property_key.clone(),
                expected_value.clone(),
                *coalesce,
            )),
            RecipeDefinition::CoalesceProperties => Box::new(CoalesceProperties::new()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRecipeList,
    ZeroMaxCycles,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRecipeList => write!(f, "recipe config contains no recipes"),
            ValidationIssue::ZeroMaxCycles => write!(f, "meta.max_cycles must be at least 1"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> RecipeConfig {
        toml_edit::de::from_str(input).unwrap()
    }

    #[test]
    fn recipe_types_are_kebab_case() {
        let config = parse(
            r#"
[[recipes]]
type = "remove-extra-semicolons"

[[recipes]]
type = "change-method-name"
method_pattern = "com.abc.B static1(String)"
new_method_name = "static2"

[[recipes]]
type = "delete-property"
property_key = "server.port"
expected_value = 8080
coalesce = true

[[recipes]]
type = "coalesce-properties"
"#,
        );
        assert_eq!(config.recipes.len(), 4);
        assert_eq!(
            config.recipes[2],
            RecipeDefinition::DeleteProperty {
                property_key: Some("server.port".to_string()),
                expected_value: Some(OptionValue::Int(8080)),
                coalesce: Some(true),
            }
        );
        let names: Vec<String> = config.recipes().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "RemoveExtraSemicolons",
                "ChangeMethodName",
                "DeleteProperty",
                "CoalesceProperties"
            ]
        );
    }

    #[test]
    fn missing_options_become_validation_failures() {
        let config = parse("[[recipes]]\ntype = \"change-method-name\"\n");
        let recipes = config.recipes();
        let properties: Vec<String> = recipes[0]
            .validate()
            .into_iter()
            .map(|failure| failure.property)
            .collect();
        assert_eq!(properties, vec!["method_pattern", "new_method_name"]);
    }

    #[test]
    fn config_issues_are_collected() {
        let config = parse("[meta]\nname = \"empty\"\nmax_cycles = 0\n");
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::EmptyRecipeList, ValidationIssue::ZeroMaxCycles]
        );
    }

    #[test]
    fn meta_overrides_engine_defaults() {
        let config = parse("[meta]\nmax_cycles = 7\nparallel = false\n");
        let engine = config.engine_config();
        assert_eq!(engine.max_cycles(), 7);
        assert!(!engine.parallel());
        assert_eq!(RecipeConfig::default().engine_config(), EngineConfig::default());
    }
}
