use crate::tree::kind::{Delimiter, Layout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaKind {
    CompilationUnit,
    Package,
    Import,
    QualifiedName,
    Modifiers,
    Annotation,

    ClassDeclaration,
    TypeParameters,
    TypeParameter,
    Extends,
    Implements,
    ClassBody,
    EnumBody,
    EnumConstants,
    EnumConstant,
    MethodDeclaration,
    Parameters,
    Parameter,
    Throws,
    Initializer,
    VariableDeclaration,
    Declarators,
    NamedVariable,

    Block,
    Empty,
    ExpressionStatement,
    Return,
    Throw,
    Jump,
    If,
    While,
    Try,
    TryResources,
    Resource,
    Catch,
    Finally,

    Identifier,
    Literal,
    FieldAccess,
    MethodInvocation,
    Arguments,
    NewClass,
    NewArray,
    Dimension,
    ArrayInit,
    ArrayAccess,
    Binary,
    Unary,
    Parenthesized,
    Conditional,
    Cast,

    TypeTree,
    TypeArguments,
}

impl JavaKind {
    pub fn layout(self) -> Layout {
        match self {
            JavaKind::EnumConstants => Layout::Separated {
                separator: Delimiter::Comma,
                closer: Some(Delimiter::Semicolon),
            },
            JavaKind::TryResources => Layout::Separated {
                separator: Delimiter::Semicolon,
                closer: None,
            },
            JavaKind::TypeParameters
            | JavaKind::Extends
            | JavaKind::Implements
            | JavaKind::Parameters
            | JavaKind::Throws
            | JavaKind::Declarators
            | JavaKind::Arguments
            | JavaKind::ArrayInit
            | JavaKind::TypeArguments => Layout::comma_list(),
            _ => Layout::Sequence,
        }
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            JavaKind::Block
                | JavaKind::Empty
                | JavaKind::ExpressionStatement
                | JavaKind::VariableDeclaration
                | JavaKind::Return
                | JavaKind::Throw
                | JavaKind::Jump
                | JavaKind::If
                | JavaKind::While
                | JavaKind::Try
        )
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            JavaKind::Identifier
                | JavaKind::Literal
                | JavaKind::FieldAccess
                | JavaKind::MethodInvocation
                | JavaKind::NewClass
                | JavaKind::NewArray
                | JavaKind::ArrayInit
                | JavaKind::ArrayAccess
                | JavaKind::Binary
                | JavaKind::Unary
                | JavaKind::Parenthesized
                | JavaKind::Conditional
                | JavaKind::Cast
        )
    }
}
