use crate::java::JavaKind;
use crate::tree::markers::MarkerKind;
use crate::yaml::YamlKind;

/// The closed set of node variants across all supported formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Java(JavaKind),
    Yaml(YamlKind),
}

impl SyntaxKind {
    pub fn layout(self) -> Layout {
        match self {
            SyntaxKind::Java(kind) => kind.layout(),
            SyntaxKind::Yaml(_) => Layout::Sequence,
        }
    }

    pub fn is_java(self) -> bool {
        matches!(self, SyntaxKind::Java(_))
    }

    pub fn is_yaml(self) -> bool {
        matches!(self, SyntaxKind::Yaml(_))
    }

    pub fn as_java(self) -> Option<JavaKind> {
        match self {
            SyntaxKind::Java(kind) => Some(kind),
            SyntaxKind::Yaml(_) => None,
        }
    }

    pub fn as_yaml(self) -> Option<YamlKind> {
        match self {
            SyntaxKind::Yaml(kind) => Some(kind),
            SyntaxKind::Java(_) => None,
        }
    }
}

impl From<JavaKind> for SyntaxKind {
    fn from(kind: JavaKind) -> Self {
        SyntaxKind::Java(kind)
    }
}

impl From<YamlKind> for SyntaxKind {
    fn from(kind: YamlKind) -> Self {
        SyntaxKind::Yaml(kind)
    }
}

/// How the child nodes of a kind are joined when printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Elements print back to back.
    Sequence,
    /// Child nodes are list items. `separator` is printed between items, and
    /// after the last one only when it carries the separator's own marker.
    /// `closer` is printed after the last item when it carries the closer
    /// marker.
    Separated {
        separator: Delimiter,
        closer: Option<Delimiter>,
    },
}

impl Layout {
    pub const fn comma_list() -> Self {
        Layout::Separated {
            separator: Delimiter::Comma,
            closer: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn text(self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Semicolon => ";",
        }
    }

    pub fn marker(self) -> MarkerKind {
        match self {
            Delimiter::Comma => MarkerKind::Comma,
            Delimiter::Semicolon => MarkerKind::Semicolon,
        }
    }
}
