use crate::java::kind::JavaKind;
use crate::tree::{Cursor, Node, SyntaxKind};
use crate::visit::TreeVisitor;
use std::sync::Arc;

/// Per-kind hooks over a Java tree.
///
/// `pre_visit` runs on the way down for every node. The `visit_*` methods run
/// on the way up, after the node's children have been visited, and receive
/// the node with any rewritten children already in place. Kinds without a
/// hook pass through untouched.
#[allow(unused_variables)]
pub trait JavaVisitor {
    fn pre_visit(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_compilation_unit(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_import(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_class_declaration(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_class_body(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_enum_body(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_enum_constants(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_method_declaration(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_initializer(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_variable_declaration(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_block(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_empty(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_try(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_try_resources(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_resource(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_catch(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_method_invocation(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_new_class(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }
}

/// Adapts a [`JavaVisitor`] to the generic walk.
pub struct JavaDispatch<V>(pub V);

impl<V> JavaDispatch<V> {
    pub fn into_inner(self) -> V {
        self.0
    }
}

impl<V: JavaVisitor> TreeVisitor for JavaDispatch<V> {
    fn accepts(&self, root: &Node) -> bool {
        root.is_kind(JavaKind::CompilationUnit)
    }

    fn enter(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        self.0.pre_visit(node, cursor)
    }

    fn leave(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        let SyntaxKind::Java(kind) = node.kind() else {
            return Arc::clone(node);
        };
        let visitor = &mut self.0;
        match kind {
            JavaKind::CompilationUnit => visitor.visit_compilation_unit(node, cursor),
            JavaKind::Import => visitor.visit_import(node, cursor),
            JavaKind::ClassDeclaration => visitor.visit_class_declaration(node, cursor),
            JavaKind::ClassBody => visitor.visit_class_body(node, cursor),
            JavaKind::EnumBody => visitor.visit_enum_body(node, cursor),
            JavaKind::EnumConstants => visitor.visit_enum_constants(node, cursor),
            JavaKind::MethodDeclaration => visitor.visit_method_declaration(node, cursor),
            JavaKind::Initializer => visitor.visit_initializer(node, cursor),
            JavaKind::VariableDeclaration => visitor.visit_variable_declaration(node, cursor),
            JavaKind::Block => visitor.visit_block(node, cursor),
            JavaKind::Empty => visitor.visit_empty(node, cursor),
            JavaKind::Try => visitor.visit_try(node, cursor),
            JavaKind::TryResources => visitor.visit_try_resources(node, cursor),
            JavaKind::Resource => visitor.visit_resource(node, cursor),
            JavaKind::Catch => visitor.visit_catch(node, cursor),
            JavaKind::MethodInvocation => visitor.visit_method_invocation(node, cursor),
            JavaKind::NewClass => visitor.visit_new_class(node, cursor),
            _ => Arc::clone(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::parser::parse_compilation_unit;
    use crate::visit::walk;

    #[derive(Default)]
    struct Counter {
        blocks: usize,
        calls: Vec<String>,
    }

    impl JavaVisitor for Counter {
        fn visit_block(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
            self.blocks += 1;
            Arc::clone(node)
        }

        fn visit_method_invocation(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
            let enclosing = cursor
                .first_enclosing(JavaKind::MethodDeclaration)
                .and_then(|decl| crate::java::access::method_name(decl).map(str::to_string));
            self.calls.push(format!(
                "{}@{}",
                crate::java::access::method_name(node).unwrap_or("?"),
                enclosing.unwrap_or_default()
            ));
            Arc::clone(node)
        }
    }

    #[test]
    fn dispatches_by_kind_with_cursor_context() {
        let cu = Arc::new(
            parse_compilation_unit("class A { void a() { b(); { c(); } } void d() { e().f(); } }")
                .unwrap(),
        );
        let mut dispatch = JavaDispatch(Counter::default());
        let result = walk(&mut dispatch, &cu);
        assert!(Arc::ptr_eq(&cu, &result));

        let counter = dispatch.into_inner();
        assert_eq!(counter.blocks, 3);
        assert_eq!(counter.calls, vec!["b@a", "c@a", "e@d", "f@d"]);
    }

    #[test]
    fn ignores_non_java_roots() {
        let root = Arc::new(Node::new(crate::yaml::YamlKind::Document, "", vec![]));
        let dispatch = JavaDispatch(Counter::default());
        assert!(!dispatch.accepts(&root));
    }
}
