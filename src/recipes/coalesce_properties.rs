use crate::recipe::Recipe;
use crate::tree::{Cursor, Element, Node, Space, Token, TokenKind};
use crate::visit::TreeVisitor;
use crate::yaml::{entry_key, entry_value, is_quoted, YamlDispatch, YamlKind, YamlVisitor};
use std::sync::Arc;

/// Folds an entry whose value is a mapping with a single entry into one
/// dotted key, e.g. `a:\n  b: 1` becomes `a.b: 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoalesceProperties;

impl CoalesceProperties {
    pub fn new() -> Self {
        CoalesceProperties
    }
}

impl Recipe for CoalesceProperties {
    fn name(&self) -> &str {
        "CoalesceProperties"
    }

    fn description(&self) -> &str {
        "Join single-entry nested mappings into dotted keys."
    }

    fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>> {
        Some(Box::new(YamlDispatch(CoalesceVisitor)))
    }
}

struct CoalesceVisitor;

impl YamlVisitor for CoalesceVisitor {
    // Children are coalesced first, so `a: {b: {c: 1}}` folds bottom-up
    // into `a.b.c: 1` in a single pass.
    fn visit_entry(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        coalesce(node).map(Arc::new).unwrap_or_else(|| Arc::clone(node))
    }
}

fn coalesce(entry: &Node) -> Option<Node> {
    let key = entry_key(entry)?;
    let value = entry_value(entry).filter(|value| value.is_kind(YamlKind::Mapping))?;
    let mut nested = value.child_nodes();
    let (Some(inner), None) = (nested.next(), nested.next()) else {
        return None;
    };
    let inner_key = entry_key(inner)?;
    if is_quoted(key.text()) || is_quoted(inner_key.text()) || inner.prefix().contains_comment() {
        return None;
    }

    let colon = inner.tokens().find(|token| token.is(":"))?;
    let inner_value = entry_value(inner)?;
    let shift = inner
        .prefix()
        .indent()
        .len()
        .saturating_sub(entry.prefix().indent().len());
    let folded_value = if inner_value.is_kind(YamlKind::Mapping) {
        Arc::new(dedent(inner_value, shift))
    } else {
        Arc::clone(inner_value)
    };

    let joined = format!("{}.{}", key.text(), inner_key.text());
    let children: Vec<Element> = vec![
        Token::new(TokenKind::Text, "", joined).into(),
        colon.clone().into(),
        folded_value.into(),
    ];
    Some(entry.with_children(children))
}

/// Remove up to `shift` columns of indentation from every line start in the
/// prefixes of `node` and its descendants.
fn dedent(node: &Node, shift: usize) -> Node {
    let children: Vec<Element> = node
        .children()
        .iter()
        .map(|child| match child {
            Element::Node(inner) => Element::from(dedent(inner, shift)),
            Element::Token(token) => token.with_prefix(dedent_space(token.prefix(), shift)).into(),
        })
        .collect();
    node.with_children(children)
        .with_prefix(dedent_space(node.prefix(), shift))
}

fn dedent_space(space: &Space, shift: usize) -> Space {
    let text = space.as_str();
    if shift == 0 || !text.contains('\n') {
        return space.clone();
    }
    let mut lines = text.split('\n');
    let mut out = String::with_capacity(text.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        let leading = line.len() - line.trim_start_matches(' ').len();
        out.push_str(&line[leading.min(shift)..]);
    }
    Space::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::walk;
    use crate::yaml::parse_document;

    fn run(source: &str) -> (Arc<Node>, Arc<Node>) {
        let before = Arc::new(parse_document(source).unwrap());
        let recipe = CoalesceProperties::new();
        let mut visitor = recipe.visitor().unwrap();
        let after = walk(&mut visitor, &before);
        (before, after)
    }

    #[test]
    fn folds_single_entry_chains() {
        let (_, after) = run("a:\n  b:\n    c: 1\nd: 2\n");
        assert_eq!(after.print(), "a.b.c: 1\nd: 2\n");
    }

    #[test]
    fn dedents_remaining_mapping() {
        let (_, after) = run("a:\n  b:\n    c: 1\n    # note\n    d: 2\n");
        assert_eq!(after.print(), "a.b:\n  c: 1\n  # note\n  d: 2\n");
    }

    #[test]
    fn nested_folds_keep_outer_indentation() {
        let (_, after) = run("root:\n  a:\n    b: 1\n  c: 2\n");
        assert_eq!(after.print(), "root:\n  a.b: 1\n  c: 2\n");
    }

    #[test]
    fn leaves_multi_entry_and_commented_mappings() {
        for source in ["a:\n  b: 1\n  c: 2\n", "a:\n  # why\n  b: 1\n", "'a.x':\n  b: 1\n"] {
            let (before, after) = run(source);
            assert!(Arc::ptr_eq(&before, &after), "{source:?}");
        }
    }
}
