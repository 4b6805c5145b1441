//! Declarative targeting of methods by signature.
//!
//! A pattern is written `<owner> <name>(<parameters>)`, for example
//! `com.abc.B singleArg(String)` or `java.util.* add*(..)`. It is compiled
//! once into a [`MethodPattern`] and then matched against the resolved
//! [`MethodType`](crate::tree::MethodType) of declarations and call sites.

pub mod errors;
pub mod method;

pub use errors::PatternError;
pub use method::MethodPattern;
