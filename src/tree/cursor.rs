use crate::tree::kind::SyntaxKind;
use crate::tree::node::{Element, Node};
use std::sync::Arc;

/// Ancestor path of the node under visit.
///
/// A cursor is rebuilt as the walk descends and dropped when it returns. It
/// holds the ancestors as they were when entered, which is what sibling and
/// enclosing-declaration queries want: the shape of the tree before the
/// current subtree was rewritten.
#[derive(Debug, Default)]
pub struct Cursor {
    frames: Vec<Frame>,
}

#[derive(Debug)]
struct Frame {
    node: Arc<Node>,
    child_index: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: Arc<Node>) {
        self.frames.push(Frame {
            node,
            child_index: 0,
        });
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn set_child_index(&mut self, index: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.child_index = index;
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_root(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn root(&self) -> Option<&Arc<Node>> {
        self.frames.first().map(|frame| &frame.node)
    }

    pub fn parent(&self) -> Option<&Arc<Node>> {
        self.frames.last().map(|frame| &frame.node)
    }

    /// Ancestors from the nearest outward.
    pub fn ancestors(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.frames.iter().rev().map(|frame| &frame.node)
    }

    pub fn first_enclosing(&self, kind: impl Into<SyntaxKind>) -> Option<&Arc<Node>> {
        let kind = kind.into();
        self.ancestors().find(|node| node.kind() == kind)
    }

    /// Position of the node under visit within its parent's children.
    pub fn index_in_parent(&self) -> Option<usize> {
        self.frames.last().map(|frame| frame.child_index)
    }

    pub fn siblings(&self) -> &[Element] {
        self.parent().map(|parent| parent.children()).unwrap_or(&[])
    }

    /// Sibling nodes following the node under visit.
    pub fn next_siblings(&self) -> impl Iterator<Item = &Arc<Node>> {
        let start = self.index_in_parent().map(|idx| idx + 1).unwrap_or(usize::MAX);
        self.siblings()
            .iter()
            .skip(start)
            .filter_map(Element::as_node)
    }

    pub fn previous_siblings(&self) -> impl Iterator<Item = &Arc<Node>> {
        let end = self.index_in_parent().unwrap_or(0);
        self.siblings()[..end.min(self.siblings().len())]
            .iter()
            .rev()
            .filter_map(Element::as_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::YamlKind;

    fn leaf() -> Arc<Node> {
        Arc::new(Node::new(YamlKind::Scalar, "", vec![]))
    }

    #[test]
    fn tracks_parent_and_siblings() {
        let first = leaf();
        let second = leaf();
        let third = leaf();
        let mapping = Arc::new(Node::new(
            YamlKind::Mapping,
            "",
            vec![
                Element::Node(first.clone()),
                Element::Node(second.clone()),
                Element::Node(third.clone()),
            ],
        ));
        let document = Arc::new(Node::new(
            YamlKind::Document,
            "",
            vec![Element::Node(mapping.clone())],
        ));

        let mut cursor = Cursor::new();
        assert!(cursor.is_root());
        cursor.push(document.clone());
        cursor.push(mapping.clone());
        cursor.set_child_index(1);

        assert_eq!(cursor.depth(), 2);
        assert!(Arc::ptr_eq(cursor.parent().unwrap(), &mapping));
        assert!(Arc::ptr_eq(cursor.root().unwrap(), &document));
        assert!(Arc::ptr_eq(
            cursor.first_enclosing(YamlKind::Document).unwrap(),
            &document
        ));

        let next: Vec<_> = cursor.next_siblings().collect();
        assert_eq!(next.len(), 1);
        assert!(Arc::ptr_eq(next[0], &third));

        let previous: Vec<_> = cursor.previous_siblings().collect();
        assert_eq!(previous.len(), 1);
        assert!(Arc::ptr_eq(previous[0], &first));

        cursor.pop();
        assert_eq!(cursor.depth(), 1);
    }
}
