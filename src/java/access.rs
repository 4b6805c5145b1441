//! Positional accessors over Java nodes.
//!
//! Nodes are homogeneous, so the role of a child is given by its position
//! relative to known neighbours. These helpers keep those conventions in one
//! place.

use crate::java::kind::JavaKind;
use crate::tree::{Element, Node, Token, TokenKind};
use std::sync::Arc;

/// Index and token of the name of a method declaration or invocation: the
/// name token immediately before the parameter or argument list.
pub fn method_name_slot(node: &Node) -> Option<(usize, &Token)> {
    let list = match node.kind().as_java()? {
        JavaKind::MethodDeclaration => JavaKind::Parameters,
        JavaKind::MethodInvocation => JavaKind::Arguments,
        _ => return None,
    };
    let list_idx = node.position_of(list)?;
    let idx = list_idx.checked_sub(1)?;
    let token = node.children()[idx].as_token()?;
    matches!(token.kind(), TokenKind::Identifier | TokenKind::Keyword).then_some((idx, token))
}

pub fn method_name(node: &Node) -> Option<&str> {
    method_name_slot(node).map(|(_, token)| token.text())
}

/// The same declaration or invocation with its name token replaced.
pub fn with_method_name(node: &Node, name: &str) -> Option<Node> {
    let (idx, token) = method_name_slot(node)?;
    Some(node.with_child(idx, token.with_text(name)))
}

/// Receiver expression of an invocation, when it has one.
pub fn invocation_select(node: &Node) -> Option<&Arc<Node>> {
    match node.children().first()? {
        Element::Node(select) => Some(select),
        Element::Token(_) => None,
    }
}

pub fn is_constructor(node: &Node) -> bool {
    node.is_kind(JavaKind::MethodDeclaration) && node.first_child(JavaKind::TypeTree).is_none()
}

pub fn has_modifier(node: &Node, modifier: &str) -> bool {
    node.first_child(JavaKind::Modifiers)
        .is_some_and(|modifiers| modifiers.has_token(modifier))
}

/// Declared name of a class, interface or enum.
pub fn class_name(node: &Node) -> Option<&str> {
    node.tokens()
        .find(|token| token.kind() == TokenKind::Identifier)
        .map(Token::text)
}

pub fn is_static_import(node: &Node) -> bool {
    node.is_kind(JavaKind::Import) && node.has_token("static")
}

/// Dotted name of an import or package declaration, e.g. `com.abc.B.static1`.
pub fn qualified_name(node: &Node) -> Option<String> {
    node.first_child(JavaKind::QualifiedName)
        .map(|name| name.text_without_trivia())
}

/// Owner and member of a static import; the member is `*` for on-demand
/// imports.
pub fn static_import_parts(node: &Node) -> Option<(String, String)> {
    if !is_static_import(node) {
        return None;
    }
    let name = qualified_name(node)?;
    let (owner, member) = name.rsplit_once('.')?;
    Some((owner.to_string(), member.to_string()))
}

/// A static import with its member name replaced.
pub fn with_import_member(node: &Node, member: &str) -> Option<Node> {
    let name_idx = node.position_of(JavaKind::QualifiedName)?;
    let name = node.children()[name_idx].as_node()?;
    let last = name
        .children()
        .iter()
        .rposition(|child| child.as_token().is_some_and(|t| t.kind() == TokenKind::Identifier))?;
    let token = name.children()[last].as_token()?;
    let renamed = name.with_child(last, token.with_text(member));
    Some(node.with_child(name_idx, renamed))
}

/// Name declared by a parameter, resource or catch clause.
pub fn declared_name(node: &Node) -> Option<&str> {
    node.tokens()
        .filter(|token| token.kind() == TokenKind::Identifier)
        .last()
        .map(Token::text)
}

/// Number of `Dimension` children, e.g. the `[]` in `int x[]`.
pub fn dimensions(node: &Node) -> usize {
    node.child_nodes()
        .filter(|child| child.is_kind(JavaKind::Dimension))
        .count()
}
