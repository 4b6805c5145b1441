use crate::tree::{Cursor, Node, SyntaxKind};
use crate::visit::TreeVisitor;
use crate::yaml::YamlKind;
use std::sync::Arc;

/// Per-kind hooks over a YAML tree, called after a node's children.
#[allow(unused_variables)]
pub trait YamlVisitor {
    fn pre_visit(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_document(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_mapping(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_entry(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn visit_scalar(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }
}

/// Adapts a [`YamlVisitor`] to the generic walk.
pub struct YamlDispatch<V>(pub V);

impl<V> YamlDispatch<V> {
    pub fn into_inner(self) -> V {
        self.0
    }
}

impl<V: YamlVisitor> TreeVisitor for YamlDispatch<V> {
    fn accepts(&self, root: &Node) -> bool {
        root.is_kind(YamlKind::Document)
    }

    fn enter(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        self.0.pre_visit(node, cursor)
    }

    fn leave(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        let SyntaxKind::Yaml(kind) = node.kind() else {
            return Arc::clone(node);
        };
        match kind {
            YamlKind::Document => self.0.visit_document(node, cursor),
            YamlKind::Mapping => self.0.visit_mapping(node, cursor),
            YamlKind::Entry => self.0.visit_entry(node, cursor),
            YamlKind::Scalar => self.0.visit_scalar(node, cursor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::walk;
    use crate::yaml::parse_document;
    use crate::yaml::query::enclosing_path;

    #[derive(Default)]
    struct ScalarPaths(Vec<String>);

    impl YamlVisitor for ScalarPaths {
        fn visit_scalar(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
            self.0.push(format!(
                "{}={}",
                enclosing_path(cursor).join("."),
                node.text_without_trivia()
            ));
            Arc::clone(node)
        }
    }

    struct Upcase;

    impl YamlVisitor for Upcase {
        fn visit_scalar(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
            let Some(token) = node.tokens().next() else {
                return Arc::clone(node);
            };
            Arc::new(node.with_child(0, token.with_text(token.text().to_uppercase())))
        }
    }

    #[test]
    fn scalars_see_their_enclosing_key_path() {
        let doc = Arc::new(parse_document("a:\n  b.c: 1\n  d: x\ne: 2\n").unwrap());
        let mut dispatch = YamlDispatch(ScalarPaths::default());
        let result = walk(&mut dispatch, &doc);
        assert!(Arc::ptr_eq(&doc, &result));
        assert_eq!(dispatch.into_inner().0, vec!["a.b.c=1", "a.d=x", "e=2"]);
    }

    #[test]
    fn rewrites_keep_surrounding_trivia() {
        let source = "# header\nname: value # note\nnested:\n  inner: text\n";
        let doc = Arc::new(parse_document(source).unwrap());
        let result = walk(&mut YamlDispatch(Upcase), &doc);
        assert_eq!(
            result.print(),
            "# header\nname: VALUE # note\nnested:\n  inner: TEXT\n"
        );
        assert_eq!(doc.print(), source);
    }

    #[test]
    fn ignores_java_roots() {
        let cu = crate::java::parse_compilation_unit("class A {}").unwrap();
        assert!(!YamlDispatch(Upcase).accepts(&cu));
    }
}
