//! Resolved type metadata attached to nodes by an attribution step.
//!
//! The engine only reads these values; producing them is the job of the
//! parsing collaborator (see [`crate::java::attribute`]).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Primitive(String),
    Class(String),
    Array(Box<JavaType>),
    Unknown,
}

impl JavaType {
    pub fn class(name: impl Into<String>) -> Self {
        JavaType::Class(name.into())
    }

    pub fn array_of(element: JavaType) -> Self {
        JavaType::Array(Box::new(element))
    }

    pub fn string() -> Self {
        JavaType::class("java.lang.String")
    }

    /// Element type and dimension count of an array type.
    pub fn array_components(&self) -> (&JavaType, usize) {
        let mut current = self;
        let mut dims = 0;
        while let JavaType::Array(inner) = current {
            current = inner;
            dims += 1;
        }
        (current, dims)
    }

    pub fn fully_qualified(&self) -> Option<&str> {
        match self {
            JavaType::Class(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Primitive(name) | JavaType::Class(name) => f.write_str(name),
            JavaType::Array(inner) => write!(f, "{inner}[]"),
            JavaType::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// A resolved method signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodType {
    pub declaring_type: String,
    pub name: String,
    pub parameter_types: Vec<JavaType>,
    pub return_type: JavaType,
    pub is_static: bool,
    /// The last parameter was declared with `...`.
    pub is_varargs: bool,
}

impl MethodType {
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        MethodType {
            name: name.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.declaring_type, self.name)?;
        let last = self.parameter_types.len().saturating_sub(1);
        for (idx, param) in self.parameter_types.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            match param {
                JavaType::Array(inner) if self.is_varargs && idx == last => {
                    write!(f, "{inner}...")?
                }
                other => write!(f, "{other}")?,
            }
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeInfo {
    /// A type declaration.
    Class { fully_qualified: String },
    /// A method or constructor declaration.
    Method(MethodType),
    /// A call site and the method it resolved to.
    Invocation {
        method: MethodType,
        /// The call has no receiver and resolved through a static import.
        via_static_import: bool,
    },
}

impl TypeInfo {
    pub fn method(&self) -> Option<&MethodType> {
        match self {
            TypeInfo::Method(method) | TypeInfo::Invocation { method, .. } => Some(method),
            TypeInfo::Class { .. } => None,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeInfo::Class { fully_qualified } => Some(fully_qualified),
            _ => None,
        }
    }

    /// Same metadata with the method renamed.
    pub fn renamed(&self, name: &str) -> TypeInfo {
        match self {
            TypeInfo::Method(method) => TypeInfo::Method(method.with_name(name)),
            TypeInfo::Invocation {
                method,
                via_static_import,
            } => TypeInfo::Invocation {
                method: method.with_name(name),
                via_static_import: *via_static_import,
            },
            other => other.clone(),
        }
    }
}
