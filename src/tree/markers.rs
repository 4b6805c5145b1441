use crate::tree::node::Space;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Semicolon,
    Comma,
    Separator,
}

/// Incidental syntax observed after a node that is not part of its structure.
///
/// `before` is the verbatim trivia between the node and the delimiter.
/// `Semicolon` and `Comma` record a delimiter that followed the item in
/// source and stays with it wherever it moves. `Separator` only keeps the
/// spacing in front of the list separator after a non-last item; it prints
/// nothing once the item ends its list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Semicolon { before: Space },
    Comma { before: Space },
    Separator { before: Space },
}

impl Marker {
    pub fn semicolon() -> Self {
        Marker::Semicolon {
            before: Space::empty(),
        }
    }

    pub fn comma() -> Self {
        Marker::Comma {
            before: Space::empty(),
        }
    }

    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::Semicolon { .. } => MarkerKind::Semicolon,
            Marker::Comma { .. } => MarkerKind::Comma,
            Marker::Separator { .. } => MarkerKind::Separator,
        }
    }

    pub fn before(&self) -> &Space {
        match self {
            Marker::Semicolon { before }
            | Marker::Comma { before }
            | Marker::Separator { before } => before,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers(Vec<Marker>);

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MarkerKind) -> Option<&Marker> {
        self.0.iter().find(|marker| marker.kind() == kind)
    }

    pub fn has(&self, kind: MarkerKind) -> bool {
        self.get(kind).is_some()
    }

    /// Add or replace the marker of the same kind.
    pub fn with(&self, marker: Marker) -> Markers {
        let mut markers: Vec<Marker> = self
            .0
            .iter()
            .filter(|existing| existing.kind() != marker.kind())
            .cloned()
            .collect();
        markers.push(marker);
        Markers(markers)
    }

    pub fn without(&self, kind: MarkerKind) -> Markers {
        Markers(
            self.0
                .iter()
                .filter(|marker| marker.kind() != kind)
                .cloned()
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_replaces_marker_of_same_kind() {
        let markers = Markers::new()
            .with(Marker::Semicolon {
                before: Space::from(" "),
            })
            .with(Marker::semicolon());
        assert_eq!(markers.iter().count(), 1);
        assert!(markers.get(MarkerKind::Semicolon).unwrap().before().is_empty());
    }

    #[test]
    fn without_leaves_other_kinds() {
        let markers = Markers::new()
            .with(Marker::comma())
            .with(Marker::semicolon())
            .without(MarkerKind::Semicolon);
        assert!(markers.has(MarkerKind::Comma));
        assert!(!markers.has(MarkerKind::Semicolon));
    }
}
