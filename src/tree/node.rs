use crate::tree::kind::SyntaxKind;
use crate::tree::markers::Markers;
use crate::tree::printer;
use crate::tree::types::TypeInfo;
use std::fmt;
use std::sync::Arc;

/// Verbatim whitespace and comments preceding a token, node or delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Space(String);

impl Space {
    pub fn new(text: impl Into<String>) -> Self {
        Space(text.into())
    }

    pub fn empty() -> Self {
        Space(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text after the last line break, i.e. the indentation of whatever follows.
    pub fn indent(&self) -> &str {
        match self.0.rfind('\n') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    pub fn contains_comment(&self) -> bool {
        self.0.contains('#') || self.0.contains("//") || self.0.contains("/*")
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Space {
    fn from(text: &str) -> Self {
        Space(text.to_string())
    }
}

impl From<String> for Space {
    fn from(text: String) -> Self {
        Space(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Literal,
    Punct,
    /// Scalar or key text of a document format.
    Text,
    /// Zero-width token holding trailing trivia before end of input.
    Eof,
}

/// A leaf of the tree: exact source text with its leading trivia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    prefix: Space,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, prefix: impl Into<Space>, text: impl Into<String>) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn prefix(&self) -> &Space {
        &self.prefix
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            kind: self.kind,
            prefix: self.prefix.clone(),
            text: text.into(),
        }
    }

    pub fn with_prefix(&self, prefix: impl Into<Space>) -> Self {
        Self {
            kind: self.kind,
            prefix: prefix.into(),
            text: self.text.clone(),
        }
    }

    pub(crate) fn take_prefix(&mut self) -> Space {
        std::mem::take(&mut self.prefix)
    }
}

/// A child slot of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Node(Arc<Node>),
    Token(Token),
}

impl Element {
    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Element::Node(node) => Some(node),
            Element::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Element::Token(token) => Some(token),
            Element::Node(_) => None,
        }
    }

    pub fn prefix(&self) -> &Space {
        match self {
            Element::Node(node) => node.prefix(),
            Element::Token(token) => token.prefix(),
        }
    }

    pub fn with_prefix(&self, prefix: Space) -> Element {
        match self {
            Element::Node(node) => Element::Node(Arc::new(node.with_prefix(prefix))),
            Element::Token(token) => Element::Token(token.with_prefix(prefix)),
        }
    }
}

impl From<Token> for Element {
    fn from(token: Token) -> Self {
        Element::Token(token)
    }
}

impl From<Arc<Node>> for Element {
    fn from(node: Arc<Node>) -> Self {
        Element::Node(node)
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(Arc::new(node))
    }
}

/// An immutable tree node.
///
/// Every change produces a new `Node`; children are shared through `Arc`, so
/// untouched subtrees are reused by reference across rewrites.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: SyntaxKind,
    prefix: Space,
    children: Vec<Element>,
    markers: Markers,
    type_info: Option<Arc<TypeInfo>>,
}

impl Node {
    pub fn new(
        kind: impl Into<SyntaxKind>,
        prefix: impl Into<Space>,
        children: Vec<Element>,
    ) -> Self {
        Self {
            kind: kind.into(),
            prefix: prefix.into(),
            children,
            markers: Markers::default(),
            type_info: None,
        }
    }

    /// Build a node whose prefix is lifted from its first element.
    ///
    /// Leading trivia always belongs to the outermost node starting at that
    /// position, so the first child ends up with an empty prefix.
    pub fn hoisted(kind: impl Into<SyntaxKind>, mut children: Vec<Element>) -> Self {
        let prefix = match children.first_mut() {
            Some(Element::Token(token)) => token.take_prefix(),
            Some(Element::Node(node)) if !node.prefix.is_empty() => {
                let prefix = node.prefix.clone();
                *node = Arc::new(node.with_prefix(Space::empty()));
                prefix
            }
            _ => Space::empty(),
        };
        Self::new(kind, prefix, children)
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn prefix(&self) -> &Space {
        &self.prefix
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn is_kind(&self, kind: impl Into<SyntaxKind>) -> bool {
        self.kind == kind.into()
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn type_info(&self) -> Option<&TypeInfo> {
        self.type_info.as_deref()
    }

    pub fn with_prefix(&self, prefix: impl Into<Space>) -> Node {
        Node {
            prefix: prefix.into(),
            ..self.clone()
        }
    }

    pub fn with_children(&self, children: Vec<Element>) -> Node {
        Node {
            kind: self.kind,
            prefix: self.prefix.clone(),
            children,
            markers: self.markers.clone(),
            type_info: self.type_info.clone(),
        }
    }

    pub fn with_markers(&self, markers: Markers) -> Node {
        Node {
            markers,
            ..self.clone()
        }
    }

    pub fn with_type_info(&self, type_info: Option<TypeInfo>) -> Node {
        Node {
            type_info: type_info.map(Arc::new),
            ..self.clone()
        }
    }

    /// Replace the child at `index`.
    pub fn with_child(&self, index: usize, child: impl Into<Element>) -> Node {
        let mut children = self.children.clone();
        children[index] = child.into();
        self.with_children(children)
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.children.iter().filter_map(Element::as_node)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(Element::as_token)
    }

    pub fn first_child(&self, kind: impl Into<SyntaxKind>) -> Option<&Arc<Node>> {
        let kind = kind.into();
        self.child_nodes().find(|node| node.kind == kind)
    }

    pub fn position_of(&self, kind: impl Into<SyntaxKind>) -> Option<usize> {
        let kind = kind.into();
        self.children
            .iter()
            .position(|element| matches!(element, Element::Node(node) if node.kind == kind))
    }

    pub fn has_token(&self, text: &str) -> bool {
        self.tokens().any(|token| token.is(text))
    }

    /// Concatenated token text of this subtree without any trivia.
    pub fn text_without_trivia(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn print(&self) -> String {
        printer::print(self)
    }
}

fn collect_text(node: &Node, out: &mut String) {
    for child in &node.children {
        match child {
            Element::Node(inner) => collect_text(inner, out),
            Element::Token(token) => out.push_str(token.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::YamlKind;

    #[test]
    fn hoisted_moves_token_prefix_to_node() {
        let node = Node::hoisted(
            YamlKind::Scalar,
            vec![Token::new(TokenKind::Text, "  ", "value").into()],
        );
        assert_eq!(node.prefix().as_str(), "  ");
        assert!(node.children()[0].prefix().is_empty());
        assert_eq!(node.print(), "  value");
    }

    #[test]
    fn hoisted_moves_nested_node_prefix() {
        let inner = Node::hoisted(
            YamlKind::Scalar,
            vec![Token::new(TokenKind::Text, "\n", "x").into()],
        );
        let outer = Node::hoisted(YamlKind::Mapping, vec![inner.into()]);
        assert_eq!(outer.prefix().as_str(), "\n");
        assert!(outer.child_nodes().all(|child| child.prefix().is_empty()));
        assert_eq!(outer.print(), "\nx");
    }

    #[test]
    fn space_indent_is_text_after_last_newline() {
        assert_eq!(Space::from("\n\n    ").indent(), "    ");
        assert_eq!(Space::from("  ").indent(), "  ");
    }
}
