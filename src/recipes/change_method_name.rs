use crate::java::access;
use crate::java::{JavaDispatch, JavaVisitor};
use crate::pattern::MethodPattern;
use crate::recipe::{Constraint, OptionValue, Recipe, RecipeOption};
use crate::tree::{Cursor, Element, Node, Space, TypeInfo};
use crate::visit::TreeVisitor;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Renames the methods selected by a [`MethodPattern`], at their
/// declarations and at every call site that resolved to them.
///
/// Calls made through a single-member static import also get the import
/// renamed. If other calls still need the old name through that import, a
/// second import for the new name is added next to it instead.
#[derive(Debug, Clone)]
pub struct ChangeMethodName {
    method_pattern: Option<String>,
    new_method_name: Option<String>,
    matcher: Option<MethodPattern>,
}

impl ChangeMethodName {
    pub fn new(method_pattern: impl Into<String>, new_method_name: impl Into<String>) -> Self {
        Self::from_options(Some(method_pattern.into()), Some(new_method_name.into()))
    }

    /// Build from possibly missing options; problems surface through
    /// [`Recipe::validate`].
    pub fn from_options(method_pattern: Option<String>, new_method_name: Option<String>) -> Self {
        let matcher = method_pattern
            .as_deref()
            .and_then(|pattern| MethodPattern::parse(pattern).ok());
        Self {
            method_pattern,
            new_method_name,
            matcher,
        }
    }
}

impl Recipe for ChangeMethodName {
    fn name(&self) -> &str {
        "ChangeMethodName"
    }

    fn description(&self) -> &str {
        "Rename a method at its declaration and all matching call sites."
    }

    fn options(&self) -> Vec<RecipeOption> {
        vec![
            RecipeOption::required(
                "method_pattern",
                self.method_pattern.clone().map(OptionValue::from),
                Constraint::MethodPattern,
            ),
            RecipeOption::required(
                "new_method_name",
                self.new_method_name.clone().map(OptionValue::from),
                Constraint::JavaIdentifier,
            ),
        ]
    }

    fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>> {
        let visitor = RenameVisitor {
            pattern: self.matcher.as_ref()?,
            new_name: self.new_method_name.as_deref()?,
            renamed_static: HashSet::new(),
            kept_static: HashSet::new(),
        };
        Some(Box::new(JavaDispatch(visitor)))
    }
}

struct RenameVisitor<'r> {
    pattern: &'r MethodPattern,
    new_name: &'r str,
    /// `(declaring type, old name)` of calls renamed through a static import.
    renamed_static: HashSet<(String, String)>,
    /// Names still called through static imports after this visit.
    kept_static: HashSet<String>,
}

impl RenameVisitor<'_> {
    fn rename(&self, node: &Arc<Node>) -> Option<Arc<Node>> {
        let renamed = access::with_method_name(node, self.new_name)?;
        let info = node.type_info().map(|info| info.renamed(self.new_name));
        Some(Arc::new(renamed.with_type_info(info)))
    }

    fn rewrite_static_imports(&self, unit: &Arc<Node>) -> Arc<Node> {
        let existing: HashSet<(String, String)> = unit
            .child_nodes()
            .filter_map(|child| access::static_import_parts(child))
            .collect();

        let mut children: Vec<Element> = Vec::with_capacity(unit.children().len() + 1);
        let mut changed = false;
        for child in unit.children() {
            let import = child
                .as_node()
                .and_then(|node| access::static_import_parts(node).map(|parts| (node, parts)));
            let Some((node, (owner, member))) = import else {
                children.push(child.clone());
                continue;
            };
            if member == "*" {
                children.push(child.clone());
                continue;
            }

            let renamed_here = self.renamed_static.iter().any(|(declaring, old)| {
                *old == member && (*declaring == owner || self.pattern.matches_owner(&owner))
            });
            let still_used = self.kept_static.contains(&member);
            let unused_match = !still_used
                && self.pattern.matches_owner(&owner)
                && self.pattern.matches_name(&member);

            if renamed_here && still_used {
                children.push(child.clone());
                if existing.contains(&(owner.clone(), self.new_name.to_string())) {
                    continue;
                }
                if let Some(added) = access::with_import_member(node, self.new_name) {
                    let prefix = Space::new(format!("\n{}", node.prefix().indent()));
                    children.push(added.with_prefix(prefix).into());
                    changed = true;
                }
            } else if renamed_here || unused_match {
                match access::with_import_member(node, self.new_name) {
                    Some(renamed) => {
                        trace!(%owner, %member, to = self.new_name, "renaming static import");
                        children.push(renamed.into());
                        changed = true;
                    }
                    None => children.push(child.clone()),
                }
            } else {
                children.push(child.clone());
            }
        }

        if changed {
            Arc::new(unit.with_children(children))
        } else {
            Arc::clone(unit)
        }
    }
}

impl JavaVisitor for RenameVisitor<'_> {
    fn visit_compilation_unit(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        self.rewrite_static_imports(node)
    }

    fn visit_method_declaration(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        let selected = matches!(node.type_info(), Some(TypeInfo::Method(method))
            if method.name != self.new_name && self.pattern.matches_method(method));
        if !selected {
            return Arc::clone(node);
        }
        self.rename(node).unwrap_or_else(|| Arc::clone(node))
    }

    fn visit_method_invocation(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        let Some(TypeInfo::Invocation {
            method,
            via_static_import,
        }) = node.type_info()
        else {
            return Arc::clone(node);
        };

        if !self.pattern.matches_method(method) || method.name == self.new_name {
            if *via_static_import {
                self.kept_static.insert(method.name.clone());
            }
            return Arc::clone(node);
        }

        let Some(renamed) = self.rename(node) else {
            return Arc::clone(node);
        };
        if *via_static_import && access::invocation_select(node).is_none() {
            self.renamed_static
                .insert((method.declaring_type.clone(), method.name.clone()));
        }
        renamed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::JavaParser;
    use crate::source::SourceParser;
    use crate::visit::walk;
    use std::path::PathBuf;

    const B: &str = "package com.abc;\nclass B {\n   public static void static1(String s) {}\n   public static void static1(int i) {}\n   public static void static2(String s) {}\n}\n";

    fn rename(recipe: &ChangeMethodName, source: &str) -> String {
        let inputs = vec![
            (PathBuf::from("B.java"), B.to_string()),
            (PathBuf::from("A.java"), source.to_string()),
        ];
        let parsed = JavaParser::new().parse_all(&inputs);
        let a = parsed[1].as_ref().unwrap();
        let mut visitor = recipe.visitor().unwrap();
        walk(&mut visitor, a.root()).print()
    }

    #[test]
    fn static_import_kept_for_other_overload() {
        let recipe = ChangeMethodName::new("com.abc.B static1(String)", "static3");
        let after = rename(
            &recipe,
            "package com.abc;\nimport static com.abc.B.static1;\nclass A {\n   void test() {\n      static1(\"boo\");\n      static1(1);\n   }\n}\n",
        );
        assert_eq!(
            after,
            "package com.abc;\nimport static com.abc.B.static1;\nimport static com.abc.B.static3;\nclass A {\n   void test() {\n      static3(\"boo\");\n      static1(1);\n   }\n}\n"
        );
    }

    #[test]
    fn unused_static_import_is_renamed() {
        let recipe = ChangeMethodName::new("com.abc.B static1(String)", "static3");
        let after = rename(
            &recipe,
            "package com.abc;\nimport static com.abc.B.static1;\nclass A {}\n",
        );
        assert_eq!(after, "package com.abc;\nimport static com.abc.B.static3;\nclass A {}\n");
    }

    #[test]
    fn unmatched_source_is_identical() {
        let recipe = ChangeMethodName::new("com.abc.B nothing(..)", "other");
        let inputs = vec![(PathBuf::from("B.java"), B.to_string())];
        let parsed = JavaParser::new().parse_all(&inputs);
        let b = parsed[0].as_ref().unwrap();
        let mut visitor = recipe.visitor().unwrap();
        assert!(Arc::ptr_eq(b.root(), &walk(&mut visitor, b.root())));
    }

    #[test]
    fn invalid_recipe_has_no_visitor() {
        let recipe = ChangeMethodName::from_options(
            Some("not a pattern".to_string()),
            Some("x".to_string()),
        );
        assert!(recipe.visitor().is_none());
        assert_eq!(recipe.validate().failures()[0].property, "method_pattern");
    }
}
