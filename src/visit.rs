//! Depth-first rewriting traversal.
//!
//! A [`TreeVisitor`] sees every node twice: [`TreeVisitor::enter`] before its
//! children are visited and [`TreeVisitor::leave`] after. Either step may
//! return a replacement node. Returning the same `Arc` means "unchanged"; the
//! walk relies on pointer identity to avoid rebuilding ancestors, so an
//! untouched tree comes back as the very same root.
//!
//! Format-specific visitors ([`crate::java::JavaVisitor`],
//! [`crate::yaml::YamlVisitor`]) dispatch on the node kind and are adapted to
//! this trait by their `*Dispatch` wrappers.

use crate::tree::{Cursor, Element, Node};
use std::sync::Arc;

pub trait TreeVisitor {
    /// Whether this visitor applies to a tree with the given root at all.
    fn accepts(&self, _root: &Node) -> bool {
        true
    }

    fn enter(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }

    fn leave(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        Arc::clone(node)
    }
}

impl<V: TreeVisitor + ?Sized> TreeVisitor for Box<V> {
    fn accepts(&self, root: &Node) -> bool {
        (**self).accepts(root)
    }

    fn enter(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        (**self).enter(node, cursor)
    }

    fn leave(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        (**self).leave(node, cursor)
    }
}

/// Visit `root` and return the rewritten tree.
///
/// Returns `root` itself (same allocation) when no step replaced anything.
pub fn walk<V: TreeVisitor + ?Sized>(visitor: &mut V, root: &Arc<Node>) -> Arc<Node> {
    if !visitor.accepts(root) {
        return Arc::clone(root);
    }
    let mut cursor = Cursor::new();
    visit_node(visitor, root, &mut cursor)
}

fn visit_node<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    node: &Arc<Node>,
    cursor: &mut Cursor,
) -> Arc<Node> {
    let entered = visitor.enter(node, cursor);

    cursor.push(Arc::clone(&entered));
    let mut rebuilt: Option<Vec<Element>> = None;
    for (idx, child) in entered.children().iter().enumerate() {
        let Element::Node(child_node) = child else {
            continue;
        };
        cursor.set_child_index(idx);
        let visited = visit_node(visitor, child_node, cursor);
        if !Arc::ptr_eq(&visited, child_node) {
            let children = rebuilt.get_or_insert_with(|| entered.children().to_vec());
            children[idx] = Element::Node(visited);
        }
    }
    cursor.pop();

    let after_children = match rebuilt {
        Some(children) => Arc::new(entered.with_children(children)),
        None => entered,
    };
    visitor.leave(&after_children, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Token, TokenKind};
    use crate::yaml::YamlKind;

    fn scalar(text: &str) -> Arc<Node> {
        Arc::new(Node::new(
            YamlKind::Scalar,
            " ",
            vec![Token::new(TokenKind::Text, "", text).into()],
        ))
    }

    fn tree() -> Arc<Node> {
        Arc::new(Node::new(
            YamlKind::Mapping,
            "",
            vec![Element::Node(scalar("a")), Element::Node(scalar("b"))],
        ))
    }

    struct Noop;
    impl TreeVisitor for Noop {}

    struct Upper {
        entered: usize,
        left: Vec<String>,
    }

    impl TreeVisitor for Upper {
        fn enter(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
            self.entered += 1;
            Arc::clone(node)
        }

        fn leave(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
            self.left.push(format!("{:?}@{}", node.kind(), cursor.depth()));
            match node.tokens().next() {
                Some(token) if token.text() == "b" => {
                    Arc::new(node.with_children(vec![token.with_text("B").into()]))
                }
                _ => Arc::clone(node),
            }
        }
    }

    #[test]
    fn untouched_tree_is_same_allocation() {
        let root = tree();
        let result = walk(&mut Noop, &root);
        assert!(Arc::ptr_eq(&root, &result));
    }

    #[test]
    fn replacement_rebuilds_only_changed_path() {
        let root = tree();
        let mut visitor = Upper {
            entered: 0,
            left: Vec::new(),
        };
        let result = walk(&mut visitor, &root);

        assert!(!Arc::ptr_eq(&root, &result));
        assert_eq!(result.print(), " a B");
        assert_eq!(root.print(), " a b");

        let old_first = root.child_nodes().next().unwrap();
        let new_first = result.child_nodes().next().unwrap();
        assert!(Arc::ptr_eq(old_first, new_first));

        assert_eq!(visitor.entered, 3);
        assert_eq!(
            visitor.left,
            vec!["Yaml(Scalar)@1", "Yaml(Scalar)@1", "Yaml(Mapping)@0"]
        );
    }
}
