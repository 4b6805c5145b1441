use crate::recipe::{Constraint, OptionValue, Recipe, RecipeOption};
use crate::recipes::CoalesceProperties;
use crate::tree::{Cursor, Element, Node, Space, TokenKind};
use crate::visit::TreeVisitor;
use crate::yaml::query::{enclosing_path, entry_segments};
use crate::yaml::{
    document_mapping, entry_value, is_quoted, scalar_text, unquote, KeyPath, YamlDispatch, YamlKind,
    YamlVisitor,
};
use std::sync::Arc;

/// Deletes a property by its dotted key, however the key is split between
/// nested mappings and dotted keys in the document.
///
/// Mappings left empty by the deletion are pruned along with the entries
/// holding them; a document whose root mapping empties prints as nothing.
/// With `coalesce`, single-entry mappings are then folded into dotted keys
/// by a [`CoalesceProperties`] child recipe.
pub struct DeleteProperty {
    property_key: Option<String>,
    expected_value: Option<OptionValue>,
    coalesce: Option<bool>,
    path: Option<KeyPath>,
    children: Vec<Box<dyn Recipe>>,
}

impl DeleteProperty {
    pub fn new(property_key: impl Into<String>) -> Self {
        Self::from_options(Some(property_key.into()), None, None)
    }

    pub fn from_options(
        property_key: Option<String>,
        expected_value: Option<OptionValue>,
        coalesce: Option<bool>,
    ) -> Self {
        let path = property_key
            .as_deref()
            .and_then(|key| KeyPath::parse(key).ok());
        let children: Vec<Box<dyn Recipe>> = if coalesce.unwrap_or(false) {
            vec![Box::new(CoalesceProperties::new())]
        } else {
            Vec::new()
        };
        Self {
            property_key,
            expected_value,
            coalesce,
            path,
            children,
        }
    }

    /// Only delete entries whose scalar value equals `value`.
    pub fn with_expected_value(self, value: impl Into<OptionValue>) -> Self {
        Self::from_options(self.property_key, Some(value.into()), self.coalesce)
    }

    pub fn with_coalesce(self, coalesce: bool) -> Self {
        Self::from_options(self.property_key, self.expected_value, Some(coalesce))
    }
}

impl Recipe for DeleteProperty {
    fn name(&self) -> &str {
        "DeleteProperty"
    }

    fn description(&self) -> &str {
        "Delete a YAML property and prune the mappings it leaves empty."
    }

    fn options(&self) -> Vec<RecipeOption> {
        vec![
            RecipeOption::required(
                "property_key",
                self.property_key.clone().map(OptionValue::from),
                Constraint::KeyPath,
            ),
            RecipeOption::optional("expected_value", self.expected_value.clone(), Constraint::Any),
            RecipeOption::optional(
                "coalesce",
                self.coalesce.map(OptionValue::from),
                Constraint::Boolean,
            ),
        ]
    }

    fn children(&self) -> &[Box<dyn Recipe>] {
        &self.children
    }

    fn visitor(&self) -> Option<Box<dyn TreeVisitor + '_>> {
        let visitor = DeleteVisitor {
            path: self.path.as_ref()?,
            expected: self.expected_value.as_ref(),
            orphans: Vec::new(),
        };
        Some(Box::new(YamlDispatch(visitor)))
    }
}

struct DeleteVisitor<'r> {
    path: &'r KeyPath,
    expected: Option<&'r OptionValue>,
    /// Mappings whose last entry was deleted, with the comment that closed
    /// their last kept line. Whatever follows the mapping takes it over.
    orphans: Vec<(Arc<Node>, Carry)>,
}

/// What a deleted entry leaves for the next kept one.
///
/// The first line of any prefix holds the comment that ended the previous
/// line, so the element following a deleted entry always loses that line.
enum Carry {
    /// The deleted entry was first: its leading trivia replaces the next
    /// entry's first line.
    Leading(String),
    /// Comment closing the line before the deleted entry.
    Tail(String),
}

impl Carry {
    fn onto(self, prefix: &Space) -> Space {
        let text = prefix.as_str();
        let rest = text.find('\n').map_or("", |idx| &text[idx..]);
        match self {
            Carry::Leading(head) => {
                let rest = rest.strip_prefix('\n').unwrap_or(rest);
                Space::new(format!("{head}{}", without_blank_lines(rest)))
            }
            Carry::Tail(tail) => Space::new(format!("{tail}{rest}")),
        }
    }
}

/// Leading trivia of a deleted first entry, without its own indentation.
fn leading_lines(prefix: &Space) -> String {
    let text = prefix.as_str();
    text.rfind('\n').map_or(String::new(), |idx| text[..=idx].to_string())
}

fn line_tail(prefix: &Space) -> String {
    let text = prefix.as_str();
    let tail = text.find('\n').map_or(text, |idx| &text[..idx]);
    if tail.contains('#') {
        tail.to_string()
    } else {
        String::new()
    }
}

fn without_blank_lines(mut text: &str) -> &str {
    while let Some(idx) = text.find('\n') {
        if !text[..idx].trim().is_empty() {
            break;
        }
        text = &text[idx + 1..];
    }
    text
}

impl DeleteVisitor<'_> {
    fn should_delete(&self, entry: &Node, enclosing: &[String]) -> bool {
        let mut full = enclosing.to_vec();
        full.extend(entry_segments(entry));
        let Some(value) = entry_value(entry) else {
            return false;
        };

        // a mapping emptied further down goes with its entry
        if value.is_kind(YamlKind::Mapping) && value.child_nodes().next().is_none() {
            return self.path.continues(&full);
        }
        if !self.path.matches(&full) {
            return false;
        }
        match self.expected {
            None => true,
            Some(expected) => scalar_text(value).is_some_and(|raw| value_matches(expected, raw)),
        }
    }

    fn take_orphan(&mut self, mapping: &Arc<Node>) -> Option<Carry> {
        let idx = self
            .orphans
            .iter()
            .position(|(node, _)| Arc::ptr_eq(node, mapping))?;
        Some(self.orphans.swap_remove(idx).1)
    }
}

impl YamlVisitor for DeleteVisitor<'_> {
    fn visit_mapping(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        let enclosing = enclosing_path(cursor);
        if !enclosing.is_empty() && !self.path.continues(&enclosing) {
            return Arc::clone(node);
        }

        let mut kept: Vec<Element> = Vec::with_capacity(node.children().len());
        let mut carry: Option<Carry> = None;
        let mut changed = false;
        for child in node.children() {
            let Some(entry) = child.as_node() else {
                kept.push(child.clone());
                continue;
            };
            if self.should_delete(entry, &enclosing) {
                changed = true;
                if carry.is_none() {
                    carry = Some(if kept.is_empty() {
                        Carry::Leading(leading_lines(entry.prefix()))
                    } else {
                        Carry::Tail(line_tail(entry.prefix()))
                    });
                }
                continue;
            }
            match carry.take() {
                Some(carry) => kept.push(child.with_prefix(carry.onto(entry.prefix()))),
                None => kept.push(child.clone()),
            }
            if let Some(orphan) = entry_value(entry).and_then(|value| self.take_orphan(value)) {
                changed = true;
                carry = Some(orphan);
            }
        }

        if !changed {
            return Arc::clone(node);
        }
        let rebuilt = Arc::new(node.with_children(kept));
        match carry {
            Some(carry @ Carry::Tail(_)) => self.orphans.push((Arc::clone(&rebuilt), carry)),
            Some(carry @ Carry::Leading(_)) if enclosing.is_empty() => {
                self.orphans.push((Arc::clone(&rebuilt), carry));
            }
            _ => {}
        }
        rebuilt
    }

    fn visit_document(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        let Some(mapping) = document_mapping(node) else {
            return Arc::clone(node);
        };
        let Some(carry) = self.take_orphan(mapping) else {
            return Arc::clone(node);
        };
        let eof = node.children().iter().enumerate().find_map(|(idx, child)| {
            child
                .as_token()
                .filter(|token| token.kind() == TokenKind::Eof)
                .map(|token| (idx, token))
        });
        let Some((idx, eof)) = eof else {
            return Arc::clone(node);
        };

        let prefix = carry.onto(eof.prefix());
        if mapping.child_nodes().next().is_some() {
            return Arc::new(node.with_child(idx, eof.with_prefix(prefix)));
        }
        // an emptied document keeps nothing but its surviving comments
        let prefix = if prefix.contains_comment() {
            Space::new(without_blank_lines(prefix.as_str()))
        } else {
            Space::empty()
        };
        Arc::new(node.with_children(vec![eof.with_prefix(prefix).into()]))
    }
}

/// Typed comparison of a guard against a raw scalar.
fn value_matches(expected: &OptionValue, raw: &str) -> bool {
    let text = unquote(raw);
    match expected {
        OptionValue::Bool(flag) => text.eq_ignore_ascii_case(if *flag { "true" } else { "false" }),
        OptionValue::Int(number) => {
            !is_quoted(raw) && text.parse::<i64>().is_ok_and(|n| n == *number)
        }
        OptionValue::Text(expected) => text == *expected,
    }
}
