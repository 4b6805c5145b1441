//! Tree to source text.
//!
//! Printing is a pure fold over the tree. Separators of list-like nodes are
//! never stored; they are derived here from the position of each item and the
//! markers it carries, so adding, removing or reordering items can never leave
//! a stale delimiter behind.

use crate::tree::kind::{Delimiter, Layout};
use crate::tree::markers::MarkerKind;
use crate::tree::node::{Element, Node};

pub fn print(node: &Node) -> String {
    let mut out = String::new();
    print_into(node, &mut out);
    out
}

pub fn print_into(node: &Node, out: &mut String) {
    out.push_str(node.prefix().as_str());
    match node.kind().layout() {
        Layout::Sequence => {
            for child in node.children() {
                print_element(child, out);
            }
        }
        Layout::Separated { separator, closer } => {
            let last_item = node
                .children()
                .iter()
                .rposition(|child| matches!(child, Element::Node(_)));
            for (idx, child) in node.children().iter().enumerate() {
                print_element(child, out);
                if let Element::Node(item) = child {
                    let is_last = Some(idx) == last_item;
                    print_delimiters(item, separator, closer, is_last, out);
                }
            }
        }
    }
}

fn print_element(element: &Element, out: &mut String) {
    match element {
        Element::Node(node) => print_into(node, out),
        Element::Token(token) => {
            out.push_str(token.prefix().as_str());
            out.push_str(token.text());
        }
    }
}

fn print_delimiters(
    item: &Node,
    separator: Delimiter,
    closer: Option<Delimiter>,
    is_last: bool,
    out: &mut String,
) {
    let trailing = item.markers().get(separator.marker());
    if !is_last {
        let spacing = item.markers().get(MarkerKind::Separator).or(trailing);
        if let Some(marker) = spacing {
            out.push_str(marker.before().as_str());
        }
        out.push_str(separator.text());
        return;
    }

    if let Some(marker) = trailing {
        out.push_str(marker.before().as_str());
        out.push_str(separator.text());
    }
    if let Some(closer) = closer {
        if let Some(marker) = item.markers().get(closer.marker()) {
            out.push_str(marker.before().as_str());
            out.push_str(closer.text());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::JavaKind;
    use crate::tree::markers::{Marker, MarkerKind};
    use crate::tree::node::{Space, Token, TokenKind};
    use std::sync::Arc;

    fn constant(prefix: &str, name: &str) -> Node {
        Node::new(
            JavaKind::EnumConstant,
            prefix,
            vec![Token::new(TokenKind::Identifier, "", name).into()],
        )
    }

    fn constants(items: Vec<Node>) -> Node {
        Node::new(
            JavaKind::EnumConstants,
            "",
            items.into_iter().map(Element::from).collect(),
        )
    }

    #[test]
    fn separators_follow_adjacency() {
        let list = constants(vec![constant(" ", "A"), constant(" ", "B"), constant(" ", "C")]);
        assert_eq!(print(&list), " A, B, C");
    }

    #[test]
    fn closer_only_printed_for_last_item() {
        let first = constant(" ", "A").with_markers(
            crate::tree::markers::Markers::new().with(Marker::semicolon()),
        );
        let last = constant(" ", "B").with_markers(
            crate::tree::markers::Markers::new().with(Marker::Semicolon {
                before: Space::from(" "),
            }),
        );
        let list = constants(vec![first, last]);
        assert_eq!(print(&list), " A, B ;");
    }

    fn first_of_kind(node: &Arc<Node>, kind: JavaKind) -> Option<Arc<Node>> {
        if node.is_kind(kind) {
            return Some(Arc::clone(node));
        }
        node.child_nodes().find_map(|child| first_of_kind(child, kind))
    }

    fn enum_constants_of(source: &str) -> Arc<Node> {
        let cu = Arc::new(crate::java::parse_compilation_unit(source).unwrap());
        first_of_kind(&cu, JavaKind::EnumConstants).unwrap()
    }

    fn without_last_item(list: &Node) -> Node {
        let mut children = list.children().to_vec();
        children.pop();
        list.with_children(children)
    }

    #[test]
    fn removing_an_item_recomputes_separators() {
        let list = enum_constants_of("enum E { A, B }");
        assert_eq!(print(&list), " A, B");
        assert_eq!(print(&without_last_item(&list)), " A");

        let spaced = enum_constants_of("enum E { A , B }");
        assert_eq!(print(&spaced), " A , B");
        assert_eq!(print(&without_last_item(&spaced)), " A");
    }

    #[test]
    fn trailing_separator_moves_with_its_item() {
        let list = enum_constants_of("enum E { A, B, }");
        assert_eq!(print(&list), " A, B,");
        assert_eq!(print(&without_last_item(&list)), " A");
    }

    #[test]
    fn item_appended_after_a_trailing_separator() {
        let list = enum_constants_of("enum E { A, }");
        let mut children = list.children().to_vec();
        children.push(constant(" ", "B").into());
        assert_eq!(print(&list.with_children(children)), " A, B");
    }

    #[test]
    fn clearing_closer_marker_drops_terminator() {
        let last = constant(" ", "B").with_markers(
            crate::tree::markers::Markers::new().with(Marker::semicolon()),
        );
        let list = constants(vec![constant(" ", "A"), last.clone()]);
        assert_eq!(print(&list), " A, B;");

        let cleared = last.with_markers(last.markers().without(MarkerKind::Semicolon));
        let list = constants(vec![constant(" ", "A"), cleared]);
        assert_eq!(print(&list), " A, B");
    }
}
