//! Lossless tree model shared by every supported format.
//!
//! A tree is made of immutable [`Node`]s. Each node carries the verbatim
//! trivia that precedes it (its prefix), an ordered list of child nodes and
//! tokens, markers for incidental syntax such as optional terminators, and
//! optional resolved type metadata. Printing an untouched tree reproduces the
//! source it was parsed from byte for byte.

pub mod cursor;
pub mod kind;
pub mod markers;
pub mod node;
pub mod printer;
pub mod types;

pub use cursor::Cursor;
pub use kind::{Delimiter, Layout, SyntaxKind};
pub use markers::{Marker, MarkerKind, Markers};
pub use node::{Element, Node, Space, Token, TokenKind};
pub use printer::print;
pub use types::{JavaType, MethodType, TypeInfo};
