use crate::java::{JavaDispatch, JavaKind, JavaVisitor};
use crate::recipe::Recipe;
use crate::tree::{Cursor, Element, MarkerKind, Node, Space};
use crate::visit::TreeVisitor;
use std::sync::Arc;

/// Removes empty statements and terminators nothing depends on.
///
/// - `;` statements in blocks and `;` members in class and enum bodies
/// - the `;` after the last enum constant when no members follow it
/// - the `;` after the last resource of a `try`
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveExtraSemicolons;

impl RemoveExtraSemicolons {
    pub fn new() -> Self {
        RemoveExtraSemicolons
    }
}

impl Recipe for RemoveExtraSemicolons {
    fn name(&self) -> &str {
        "RemoveExtraSemicolons"
    }

    fn description(&self) -> &str {
        "Remove empty statements and redundant enum and try-resource terminators."
    }

    fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>> {
        Some(Box::new(JavaDispatch(SemicolonVisitor)))
    }
}

struct SemicolonVisitor;

impl JavaVisitor for SemicolonVisitor {
    fn visit_block(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        without_empty(node)
    }

    fn visit_class_body(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        without_empty(node)
    }

    fn visit_enum_body(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        let node = without_empty(node);
        let Some(idx) = node.position_of(JavaKind::EnumConstants) else {
            return node;
        };
        // members after the constants still need the terminator
        if node.children()[idx + 1..].iter().any(|child| child.as_node().is_some()) {
            return node;
        }
        let Some(constants) = node.children()[idx].as_node() else {
            return node;
        };
        match without_list_terminator(constants) {
            Some((trimmed, removed)) => {
                Arc::new(carry_after(&node.with_child(idx, trimmed), idx, &removed))
            }
            None => node,
        }
    }

    fn visit_try_resources(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        let last = node
            .children()
            .iter()
            .rposition(|child| child.as_node().is_some_and(|n| n.is_kind(JavaKind::Resource)));
        let Some(idx) = last else {
            return Arc::clone(node);
        };
        let Some(resource) = node.children()[idx].as_node() else {
            return Arc::clone(node);
        };
        match resource.markers().get(MarkerKind::Semicolon) {
            Some(terminator) => {
                let cleared =
                    resource.with_markers(resource.markers().without(MarkerKind::Semicolon));
                let updated = node.with_child(idx, cleared);
                Arc::new(carry_after(&updated, idx, terminator.before()))
            }
            None => Arc::clone(node),
        }
    }
}

/// Comments out of trivia that is being removed, waiting to be put in front
/// of the element that follows it. Plain whitespace is dropped.
#[derive(Default)]
struct Carried<'a> {
    text: String,
    indent: Option<&'a str>,
}

impl<'a> Carried<'a> {
    fn take(&mut self, space: &'a Space) {
        if !space.contains_comment() {
            return;
        }
        let text = space.as_str();
        match text.rfind('\n') {
            Some(idx) => {
                self.text.push_str(&text[..idx]);
                self.indent = Some(&text[idx + 1..]);
            }
            None => self.text.push_str(text.trim_end()),
        }
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// `next` with the carried comments in front. A trailing `//` comment
    /// keeps its line break so it cannot swallow what follows.
    fn onto(&mut self, next: &Space) -> Space {
        let next = next.as_str();
        let open_line_comment = self
            .text
            .rsplit('\n')
            .next()
            .is_some_and(|line| line.contains("//"));
        let joined = if open_line_comment && !next.starts_with('\n') {
            let indent = self.indent.unwrap_or("");
            format!("{}\n{indent}{}", self.text, next.trim_start_matches([' ', '\t']))
        } else {
            format!("{}{next}", self.text)
        };
        self.text.clear();
        self.indent = None;
        Space::new(joined)
    }
}

/// `node` with the comments in `removed` moved onto the child after `idx`.
fn carry_after(node: &Node, idx: usize, removed: &Space) -> Node {
    let mut carried = Carried::default();
    carried.take(removed);
    match node.children().get(idx + 1) {
        Some(next) if !carried.is_empty() => {
            node.with_child(idx + 1, next.with_prefix(carried.onto(next.prefix())))
        }
        _ => node.clone(),
    }
}

/// `node` without its `Empty` children. A comment in a removed statement's
/// prefix is kept by moving it onto the element that follows.
fn without_empty(node: &Arc<Node>) -> Arc<Node> {
    let is_empty = |child: &Element| child.as_node().is_some_and(|n| n.is_kind(JavaKind::Empty));
    if !node.children().iter().any(is_empty) {
        return Arc::clone(node);
    }

    let mut children: Vec<Element> = Vec::with_capacity(node.children().len());
    let mut carried = Carried::default();
    for child in node.children() {
        if is_empty(child) {
            carried.take(child.prefix());
        } else if carried.is_empty() {
            children.push(child.clone());
        } else {
            children.push(child.with_prefix(carried.onto(child.prefix())));
        }
    }
    Arc::new(node.with_children(children))
}

/// The enum constant list without its closing `;` and the trivia that went
/// with it, or `None` when it has none.
fn without_list_terminator(constants: &Node) -> Option<(Node, Space)> {
    match constants.children().last()? {
        Element::Node(last) => {
            let terminator = last.markers().get(MarkerKind::Semicolon)?;
            let cleared = last.with_markers(last.markers().without(MarkerKind::Semicolon));
            let trimmed = constants.with_child(constants.children().len() - 1, cleared);
            Some((trimmed, terminator.before().clone()))
        }
        Element::Token(token) if token.is(";") => {
            let mut children = constants.children().to_vec();
            children.pop();
            let trimmed = constants.with_children(children).with_prefix(Space::empty());
            Some((trimmed, constants.prefix().clone()))
        }
        Element::Token(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::parse_compilation_unit;
    use crate::visit::walk;

    fn run(source: &str) -> (Arc<Node>, Arc<Node>) {
        let before = Arc::new(parse_compilation_unit(source).unwrap());
        let recipe = RemoveExtraSemicolons::new();
        let mut visitor = recipe.visitor().unwrap();
        let after = walk(&mut visitor, &before);
        (before, after)
    }

    #[test]
    fn drops_empty_class_members() {
        let (_, after) = run("class A {\n    ;\n    int x;;\n}\n");
        assert_eq!(after.print(), "class A {\n    int x;\n}\n");
    }

    #[test]
    fn comment_before_empty_statement_survives() {
        let (_, after) = run("class A {\n  void a() {\n    // keep\n    ;\n  }\n}");
        assert_eq!(after.print(), "class A {\n  void a() {\n    // keep\n  }\n}");
    }

    #[test]
    fn carried_line_comment_keeps_its_line_break() {
        let (_, after) = run("class A { void a() { // note\n; int x = 1; } }");
        assert_eq!(after.print(), "class A { void a() { // note\nint x = 1; } }");
    }

    #[test]
    fn comment_before_enum_terminator_survives() {
        let (_, after) = run("enum E {\n  A,\n  B // last one\n  ;\n}");
        assert_eq!(after.print(), "enum E {\n  A,\n  B // last one\n}");

        let (_, after) = run("enum FRUITS { BANANA, APPLE /*c*/ ; ; }");
        assert_eq!(after.print(), "enum FRUITS { BANANA, APPLE /*c*/ }");

        let (_, after) = run("enum E { /* none yet */ ; }");
        assert_eq!(after.print(), "enum E { /* none yet */ }");
    }

    #[test]
    fn comment_before_resource_terminator_survives() {
        let (_, after) =
            run("class T { void t() { try (A a = x(); B b = y() /* keep */ ;) {} } }");
        assert_eq!(
            after.print(),
            "class T { void t() { try (A a = x(); B b = y() /* keep */) {} } }"
        );

        let (_, after) = run("class T { void t() { try (A a = x() // only\n ;) {} } }");
        assert_eq!(after.print(), "class T { void t() { try (A a = x() // only\n ) {} } }");
    }

    #[test]
    fn bare_enum_terminator_without_members_is_removed() {
        let (_, after) = run("enum E { ; }");
        assert_eq!(after.print(), "enum E { }");
    }

    #[test]
    fn bare_enum_terminator_before_members_stays() {
        let (before, after) = run("enum E { ; void m() {} }");
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn clean_source_is_untouched() {
        let (before, after) = run("class A { void a() { int x = 1; } }");
        assert!(Arc::ptr_eq(&before, &after));
    }
}
