//! Recursive-descent parser for the supported Java subset.
//!
//! Every token keeps its leading trivia, and every node is built with
//! [`Node::hoisted`], so the prefix of a construct is the whitespace and
//! comments immediately before its first token. Separators of list-like
//! constructs are consumed here and recorded as markers on the item they
//! follow; the printer puts them back.

use crate::java::errors::JavaParseError;
use crate::java::kind::JavaKind;
use crate::java::lexer::{tokenize, Lexed};
use crate::tree::{Element, Marker, Node, Token, TokenKind};

type PResult<T> = Result<T, JavaParseError>;

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "native",
    "synchronized",
    "transient",
    "volatile",
    "strictfp",
    "default",
];

pub(crate) const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

const UNSUPPORTED_STATEMENTS: &[&str] = &[
    "for",
    "do",
    "switch",
    "synchronized",
    "assert",
    "class",
    "interface",
    "enum",
];

const BINARY_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "&&", "||", "==", "!=", "<", ">", "<=", ">=", "&", "|", "^", "<<",
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=",
];

const PREFIX_OPERATORS: &[&str] = &["!", "~", "-", "+", "++", "--"];

/// Parse a whole compilation unit.
pub fn parse_compilation_unit(source: &str) -> PResult<Node> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.compilation_unit()
}

struct Parser {
    tokens: Vec<Lexed>,
    pos: usize,
}

fn is_syntax(token: &Token, text: &str) -> bool {
    matches!(token.kind(), TokenKind::Punct | TokenKind::Keyword) && token.is(text)
}

fn is_primitive(token: &Token) -> bool {
    token.kind() == TokenKind::Keyword && PRIMITIVES.contains(&token.text())
}

fn delimiter_marker(delimiter: &Token) -> Marker {
    let before = delimiter.prefix().clone();
    if delimiter.is(";") {
        Marker::Semicolon { before }
    } else {
        Marker::Comma { before }
    }
}

/// Record a delimiter that ends a list: it belongs to the item.
fn mark(node: Node, delimiter: &Token) -> Node {
    let markers = node.markers().with(delimiter_marker(delimiter));
    node.with_markers(markers)
}

/// Record a separator between two items: only its spacing is kept.
fn space_before_separator(node: Node, separator: &Token) -> Node {
    let markers = node.markers().with(Marker::Separator {
        before: separator.prefix().clone(),
    });
    node.with_markers(markers)
}

/// List items with the separator that followed each one. The last item's
/// separator is a trailing delimiter; the others only leave their spacing.
fn with_separators(items: Vec<(Node, Option<Token>)>) -> Vec<Node> {
    let last = items.len().saturating_sub(1);
    items
        .into_iter()
        .enumerate()
        .map(|(idx, (node, sep))| match sep {
            Some(sep) if idx == last => mark(node, &sep),
            Some(sep) => space_before_separator(node, &sep),
            None => node,
        })
        .collect()
}

fn push_opt(children: &mut Vec<Element>, node: Option<Node>) {
    if let Some(node) = node {
        children.push(node.into());
    }
}

impl Parser {
    // ----- token plumbing -----

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].offset
    }

    fn at(&self, text: &str) -> bool {
        is_syntax(self.peek(), text)
    }

    fn at_nth(&self, n: usize, text: &str) -> bool {
        is_syntax(self.peek_nth(n), text)
    }

    fn at_any(&self, texts: &[&str]) -> bool {
        texts.iter().any(|text| self.at(text))
    }

    fn at_identifier(&self) -> bool {
        self.peek().kind() == TokenKind::Identifier
    }

    fn at_eof(&self) -> bool {
        self.peek().kind() == TokenKind::Eof
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, text: &str) -> Option<Token> {
        self.at(text).then(|| self.bump())
    }

    fn expect(&mut self, text: &str) -> PResult<Token> {
        self.eat(text).ok_or_else(|| self.error(format!("'{text}'")))
    }

    fn expect_identifier(&mut self) -> PResult<Token> {
        if self.at_identifier() {
            Ok(self.bump())
        } else {
            Err(self.error("identifier"))
        }
    }

    fn error(&self, expected: impl Into<String>) -> JavaParseError {
        let found = match self.peek().kind() {
            TokenKind::Eof => "end of input".to_string(),
            _ => self.peek().text().to_string(),
        };
        JavaParseError::Expected {
            expected: expected.into(),
            found,
            offset: self.offset(),
        }
    }

    fn unsupported(&self, construct: &str) -> JavaParseError {
        JavaParseError::Unsupported {
            construct: construct.to_string(),
            offset: self.offset(),
        }
    }

    /// Run `probe` and rewind, reporting whether it succeeded.
    fn speculate(&mut self, probe: impl FnOnce(&mut Self) -> bool) -> bool {
        let saved = self.pos;
        let ok = probe(self);
        self.pos = saved;
        ok
    }

    /// Items separated by `separator`. Stops before `until`, or after an item
    /// with no separator. A separator directly before `until` is a trailing
    /// delimiter and is marked on the last item.
    fn separated<F>(
        &mut self,
        separator: &str,
        until: Option<&str>,
        mut item: F,
    ) -> PResult<Vec<Element>>
    where
        F: FnMut(&mut Self) -> PResult<Node>,
    {
        let mut items: Vec<(Node, Option<Token>)> = Vec::new();
        loop {
            if until.is_some_and(|close| self.at(close)) {
                break;
            }
            let node = item(self)?;
            let sep = self.eat(separator);
            let done = sep.is_none();
            items.push((node, sep));
            if done {
                break;
            }
        }
        Ok(with_separators(items).into_iter().map(Element::from).collect())
    }

    fn delimited<F>(
        &mut self,
        kind: JavaKind,
        open: &str,
        close: &str,
        separator: &str,
        item: F,
    ) -> PResult<Node>
    where
        F: FnMut(&mut Self) -> PResult<Node>,
    {
        let mut children: Vec<Element> = vec![self.expect(open)?.into()];
        children.extend(self.separated(separator, Some(close), item)?);
        children.push(self.expect(close)?.into());
        Ok(Node::hoisted(kind, children))
    }

    // ----- declarations -----

    fn compilation_unit(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = Vec::new();
        if self.at("package") {
            children.push(self.package()?.into());
        }
        while self.at("import") {
            children.push(self.import()?.into());
        }
        while !self.at_eof() {
            if self.at(";") {
                children.push(self.empty()?.into());
                continue;
            }
            let modifiers = self.modifiers()?;
            children.push(self.class_declaration(modifiers)?.into());
        }
        children.push(self.bump().into());
        Ok(Node::hoisted(JavaKind::CompilationUnit, children))
    }

    fn package(&mut self) -> PResult<Node> {
        let children: Vec<Element> = vec![
            self.expect("package")?.into(),
            self.qualified_name(false)?.into(),
            self.expect(";")?.into(),
        ];
        Ok(Node::hoisted(JavaKind::Package, children))
    }

    fn import(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = vec![self.expect("import")?.into()];
        if let Some(token) = self.eat("static") {
            children.push(token.into());
        }
        children.push(self.qualified_name(true)?.into());
        children.push(self.expect(";")?.into());
        Ok(Node::hoisted(JavaKind::Import, children))
    }

    fn qualified_name(&mut self, allow_star: bool) -> PResult<Node> {
        let mut children: Vec<Element> = vec![self.expect_identifier()?.into()];
        while self.at(".") {
            let next = self.peek_nth(1);
            if next.kind() == TokenKind::Identifier {
                children.push(self.bump().into());
                children.push(self.bump().into());
            } else if allow_star && is_syntax(next, "*") {
                children.push(self.bump().into());
                children.push(self.bump().into());
                break;
            } else {
                break;
            }
        }
        Ok(Node::hoisted(JavaKind::QualifiedName, children))
    }

    fn modifiers(&mut self) -> PResult<Option<Node>> {
        let mut children: Vec<Element> = Vec::new();
        loop {
            if self.at("@") && !self.at_nth(1, "interface") {
                children.push(self.annotation()?.into());
            } else if self.peek().kind() == TokenKind::Keyword
                && MODIFIERS.contains(&self.peek().text())
                // `synchronized (x) {}` is a statement, not a modifier
                && !(self.at("synchronized") && self.at_nth(1, "("))
            {
                children.push(self.bump().into());
            } else {
                break;
            }
        }
        Ok((!children.is_empty()).then(|| Node::hoisted(JavaKind::Modifiers, children)))
    }

    fn annotation(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> =
            vec![self.expect("@")?.into(), self.qualified_name(false)?.into()];
        if self.at("(") {
            children.push(self.arguments()?.into());
        }
        Ok(Node::hoisted(JavaKind::Annotation, children))
    }

    fn class_declaration(&mut self, modifiers: Option<Node>) -> PResult<Node> {
        let mut children: Vec<Element> = Vec::new();
        push_opt(&mut children, modifiers);

        if self.at("@") {
            return Err(self.unsupported("annotation type declaration"));
        }
        if self.peek().is("record") && self.peek().kind() == TokenKind::Identifier {
            return Err(self.unsupported("record"));
        }
        if !self.at_any(&["class", "interface", "enum"]) {
            return Err(self.error("class, interface or enum"));
        }
        let keyword = self.bump();
        let is_enum = keyword.is("enum");
        children.push(keyword.into());
        children.push(self.expect_identifier()?.into());

        if self.at("<") {
            children.push(self.type_parameters()?.into());
        }
        if self.at("extends") {
            children.push(self.type_list(JavaKind::Extends, "extends")?.into());
        }
        if self.at("implements") {
            children.push(self.type_list(JavaKind::Implements, "implements")?.into());
        }
        let body = if is_enum {
            self.enum_body()?
        } else {
            self.class_body()?
        };
        children.push(body.into());
        Ok(Node::hoisted(JavaKind::ClassDeclaration, children))
    }

    fn type_list(&mut self, kind: JavaKind, keyword: &str) -> PResult<Node> {
        let mut children: Vec<Element> = vec![self.expect(keyword)?.into()];
        children.extend(self.separated(",", None, |p| p.type_tree())?);
        Ok(Node::hoisted(kind, children))
    }

    fn type_parameters(&mut self) -> PResult<Node> {
        self.delimited(JavaKind::TypeParameters, "<", ">", ",", |p| {
            let mut children: Vec<Element> = vec![p.expect_identifier()?.into()];
            if let Some(extends) = p.eat("extends") {
                children.push(extends.into());
                children.push(p.type_tree()?.into());
                while let Some(amp) = p.eat("&") {
                    children.push(amp.into());
                    children.push(p.type_tree()?.into());
                }
            }
            Ok(Node::hoisted(JavaKind::TypeParameter, children))
        })
    }

    fn class_body(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = vec![self.expect("{")?.into()];
        while !self.at("}") {
            children.push(self.member()?.into());
        }
        children.push(self.bump().into());
        Ok(Node::hoisted(JavaKind::ClassBody, children))
    }

    fn enum_body(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = vec![self.expect("{")?.into()];

        let mut pairs: Vec<(Node, Option<Token>)> = Vec::new();
        while !self.at_any(&[";", "}"]) {
            let constant = self.enum_constant()?;
            let comma = self.eat(",");
            let done = comma.is_none();
            pairs.push((constant, comma));
            if done {
                break;
            }
        }
        let mut constants = with_separators(pairs);
        let mut bare_terminator = None;
        if let Some(semi) = self.eat(";") {
            match constants.pop() {
                Some(last) => constants.push(mark(last, &semi)),
                None => bare_terminator = Some(semi),
            }
        }
        let mut list: Vec<Element> = constants.into_iter().map(Element::from).collect();
        if let Some(semi) = bare_terminator {
            list.push(semi.into());
        }
        children.push(Node::hoisted(JavaKind::EnumConstants, list).into());

        while !self.at("}") {
            children.push(self.member()?.into());
        }
        children.push(self.bump().into());
        Ok(Node::hoisted(JavaKind::EnumBody, children))
    }

    fn enum_constant(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = Vec::new();
        push_opt(&mut children, self.modifiers()?);
        children.push(self.expect_identifier()?.into());
        if self.at("(") {
            children.push(self.arguments()?.into());
        }
        if self.at("{") {
            children.push(self.class_body()?.into());
        }
        Ok(Node::hoisted(JavaKind::EnumConstant, children))
    }

    fn member(&mut self) -> PResult<Node> {
        if self.at(";") {
            return self.empty();
        }
        if self.at("{") || (self.at("static") && self.at_nth(1, "{")) {
            let mut children: Vec<Element> = Vec::new();
            if let Some(token) = self.eat("static") {
                children.push(token.into());
            }
            children.push(self.block()?.into());
            return Ok(Node::hoisted(JavaKind::Initializer, children));
        }

        let modifiers = self.modifiers()?;
        if self.at_any(&["class", "interface", "enum"]) || self.at("@") {
            return self.class_declaration(modifiers);
        }

        let mut children: Vec<Element> = Vec::new();
        push_opt(&mut children, modifiers);
        if self.at("<") {
            children.push(self.type_parameters()?.into());
        }
        if self.at_identifier() && self.at_nth(1, "(") {
            // constructor
            children.push(self.bump().into());
            return self.method_rest(children);
        }

        let ty = self.type_tree()?;
        let name = self.expect_identifier()?;
        if self.at("(") {
            children.push(ty.into());
            children.push(name.into());
            return self.method_rest(children);
        }

        children.push(ty.into());
        children.push(self.declarators(name)?.into());
        children.push(self.expect(";")?.into());
        Ok(Node::hoisted(JavaKind::VariableDeclaration, children))
    }

    fn method_rest(&mut self, mut children: Vec<Element>) -> PResult<Node> {
        children.push(
            self.delimited(JavaKind::Parameters, "(", ")", ",", |p| p.parameter())?
                .into(),
        );
        if self.at("throws") {
            children.push(self.type_list(JavaKind::Throws, "throws")?.into());
        }
        if self.at("default") {
            return Err(self.unsupported("annotation member default"));
        }
        let body = if self.at("{") {
            self.block()?.into()
        } else {
            self.expect(";")?.into()
        };
        children.push(body);
        Ok(Node::hoisted(JavaKind::MethodDeclaration, children))
    }

    fn parameter(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = Vec::new();
        push_opt(&mut children, self.modifiers()?);
        children.push(self.type_tree()?.into());
        if let Some(ellipsis) = self.eat("...") {
            children.push(ellipsis.into());
        }
        children.push(self.expect_identifier()?.into());
        while self.at("[") {
            children.push(self.dimension(false)?.into());
        }
        Ok(Node::hoisted(JavaKind::Parameter, children))
    }

    fn declarators(&mut self, first: Token) -> PResult<Node> {
        let mut first = Some(first);
        let items = self.separated(",", None, |p| {
            let name = match first.take() {
                Some(name) => name,
                None => p.expect_identifier()?,
            };
            p.named_variable(name)
        })?;
        Ok(Node::hoisted(JavaKind::Declarators, items))
    }

    fn named_variable(&mut self, name: Token) -> PResult<Node> {
        let mut children: Vec<Element> = vec![name.into()];
        while self.at("[") {
            children.push(self.dimension(false)?.into());
        }
        if let Some(eq) = self.eat("=") {
            children.push(eq.into());
            let init = if self.at("{") {
                self.array_init()?
            } else {
                self.expression()?
            };
            children.push(init.into());
        }
        Ok(Node::hoisted(JavaKind::NamedVariable, children))
    }

    // ----- types -----

    fn type_tree(&mut self) -> PResult<Node> {
        self.type_tree_with(true)
    }

    fn type_tree_with(&mut self, with_dimensions: bool) -> PResult<Node> {
        let mut children: Vec<Element> = Vec::new();
        if let Some(question) = self.eat("?") {
            children.push(question.into());
            if self.at_any(&["extends", "super"]) {
                children.push(self.bump().into());
                children.push(self.type_tree()?.into());
            }
            return Ok(Node::hoisted(JavaKind::TypeTree, children));
        }

        if is_primitive(self.peek()) {
            children.push(self.bump().into());
        } else {
            children.push(self.expect_identifier()?.into());
            while self.at(".") && self.peek_nth(1).kind() == TokenKind::Identifier {
                children.push(self.bump().into());
                children.push(self.bump().into());
            }
            if self.at("<") {
                children.push(
                    self.delimited(JavaKind::TypeArguments, "<", ">", ",", |p| p.type_tree())?
                        .into(),
                );
            }
        }
        while with_dimensions && self.at("[") && self.at_nth(1, "]") {
            children.push(self.bump().into());
            children.push(self.bump().into());
        }
        Ok(Node::hoisted(JavaKind::TypeTree, children))
    }

    fn dimension(&mut self, with_size: bool) -> PResult<Node> {
        let mut children: Vec<Element> = vec![self.expect("[")?.into()];
        if with_size && !self.at("]") {
            children.push(self.expression()?.into());
        }
        children.push(self.expect("]")?.into());
        Ok(Node::hoisted(JavaKind::Dimension, children))
    }

    // ----- statements -----

    fn block(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = vec![self.expect("{")?.into()];
        while !self.at("}") {
            children.push(self.statement()?.into());
        }
        children.push(self.bump().into());
        Ok(Node::hoisted(JavaKind::Block, children))
    }

    fn empty(&mut self) -> PResult<Node> {
        Ok(Node::hoisted(JavaKind::Empty, vec![self.expect(";")?.into()]))
    }

    fn statement(&mut self) -> PResult<Node> {
        if self.at("{") {
            return self.block();
        }
        if self.at(";") {
            return self.empty();
        }
        if self.at_any(&["return", "throw"]) {
            let keyword = self.bump();
            let kind = if keyword.is("return") {
                JavaKind::Return
            } else {
                JavaKind::Throw
            };
            let mut children: Vec<Element> = vec![keyword.into()];
            if !self.at(";") {
                children.push(self.expression()?.into());
            }
            children.push(self.expect(";")?.into());
            return Ok(Node::hoisted(kind, children));
        }
        if self.at_any(&["break", "continue"]) {
            let mut children: Vec<Element> = vec![self.bump().into()];
            if self.at_identifier() {
                children.push(self.bump().into());
            }
            children.push(self.expect(";")?.into());
            return Ok(Node::hoisted(JavaKind::Jump, children));
        }
        if self.at("if") {
            let mut children: Vec<Element> = vec![self.bump().into(), self.parenthesized()?.into()];
            children.push(self.statement()?.into());
            if let Some(token) = self.eat("else") {
                children.push(token.into());
                children.push(self.statement()?.into());
            }
            return Ok(Node::hoisted(JavaKind::If, children));
        }
        if self.at("while") {
            let children: Vec<Element> = vec![
                self.bump().into(),
                self.parenthesized()?.into(),
                self.statement()?.into(),
            ];
            return Ok(Node::hoisted(JavaKind::While, children));
        }
        if self.at("try") {
            return self.try_statement();
        }
        if let Some(keyword) = UNSUPPORTED_STATEMENTS.iter().find(|kw| self.at(kw)) {
            return Err(self.unsupported(&format!("{keyword} statement")));
        }
        if self.at_identifier() && self.at_nth(1, ":") {
            return Err(self.unsupported("labeled statement"));
        }

        if self.at_any(&["final", "@"]) || self.looks_like_declaration() {
            return self.local_variable();
        }

        let children: Vec<Element> = vec![self.expression()?.into(), self.expect(";")?.into()];
        Ok(Node::hoisted(JavaKind::ExpressionStatement, children))
    }

    /// A type followed by a name that is then initialized or terminated.
    fn looks_like_declaration(&mut self) -> bool {
        if is_primitive(self.peek()) && !self.at_nth(1, ".") {
            return true;
        }
        self.speculate(|p| {
            p.type_tree().is_ok()
                && p.at_identifier()
                && ["=", ";", ",", "[", ":"]
                    .iter()
                    .any(|text| p.at_nth(1, text))
        })
    }

    fn local_variable(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = Vec::new();
        push_opt(&mut children, self.modifiers()?);
        children.push(self.type_tree()?.into());
        let name = self.expect_identifier()?;
        children.push(self.declarators(name)?.into());
        children.push(self.expect(";")?.into());
        Ok(Node::hoisted(JavaKind::VariableDeclaration, children))
    }

    fn try_statement(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = vec![self.expect("try")?.into()];
        let has_resources = self.at("(");
        if has_resources {
            children.push(
                self.delimited(JavaKind::TryResources, "(", ")", ";", |p| p.resource())?
                    .into(),
            );
        }
        children.push(self.block()?.into());

        let mut handled = false;
        while self.at("catch") {
            handled = true;
            let mut catch: Vec<Element> = vec![self.bump().into(), self.expect("(")?.into()];
            push_opt(&mut catch, self.modifiers()?);
            catch.push(self.type_tree()?.into());
            while let Some(bar) = self.eat("|") {
                catch.push(bar.into());
                catch.push(self.type_tree()?.into());
            }
            catch.push(self.expect_identifier()?.into());
            catch.push(self.expect(")")?.into());
            catch.push(self.block()?.into());
            children.push(Node::hoisted(JavaKind::Catch, catch).into());
        }
        if self.at("finally") {
            handled = true;
            let finally: Vec<Element> = vec![self.bump().into(), self.block()?.into()];
            children.push(Node::hoisted(JavaKind::Finally, finally).into());
        }
        if !handled && !has_resources {
            return Err(self.error("'catch' or 'finally'"));
        }
        Ok(Node::hoisted(JavaKind::Try, children))
    }

    fn resource(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> = Vec::new();
        if self.at_any(&["final", "@"]) || self.looks_like_declaration() {
            push_opt(&mut children, self.modifiers()?);
            children.push(self.type_tree()?.into());
            children.push(self.expect_identifier()?.into());
            children.push(self.expect("=")?.into());
        }
        children.push(self.expression()?.into());
        Ok(Node::hoisted(JavaKind::Resource, children))
    }

    // ----- expressions -----

    fn expression(&mut self) -> PResult<Node> {
        let mut left = self.unary()?;
        loop {
            if let Some(question) = self.eat("?") {
                let then = self.expression()?;
                let colon = self.expect(":")?;
                let otherwise = self.expression()?;
                let children: Vec<Element> = vec![
                    left.into(),
                    question.into(),
                    then.into(),
                    colon.into(),
                    otherwise.into(),
                ];
                return Ok(Node::hoisted(JavaKind::Conditional, children));
            }
            if let Some(instanceof) = self.eat("instanceof") {
                let ty = self.type_tree()?;
                let children: Vec<Element> = vec![left.into(), instanceof.into(), ty.into()];
                left = Node::hoisted(JavaKind::Binary, children);
                continue;
            }
            let Some(operator) = self.binary_operator() else {
                return Ok(left);
            };
            let mut children: Vec<Element> = vec![left.into()];
            children.extend(operator.into_iter().map(Element::from));
            children.push(self.unary()?.into());
            left = Node::hoisted(JavaKind::Binary, children);
        }
    }

    fn binary_operator(&mut self) -> Option<Vec<Token>> {
        let token = self.peek();
        if token.kind() != TokenKind::Punct || !BINARY_OPERATORS.contains(&token.text()) {
            return None;
        }
        let mut operator = vec![self.bump()];
        // shifts arrive as adjacent `>` tokens
        if operator[0].is(">") {
            while self.at_any(&[">", ">="]) && self.peek().prefix().is_empty() {
                let token = self.bump();
                let done = token.is(">=");
                operator.push(token);
                if done {
                    break;
                }
            }
        }
        Some(operator)
    }

    fn unary(&mut self) -> PResult<Node> {
        if self.peek().kind() == TokenKind::Punct
            && PREFIX_OPERATORS.contains(&self.peek().text())
        {
            let children: Vec<Element> = vec![self.bump().into(), self.unary()?.into()];
            return Ok(Node::hoisted(JavaKind::Unary, children));
        }
        if self.at("(") && self.looks_like_cast() {
            let children: Vec<Element> = vec![
                self.bump().into(),
                self.type_tree()?.into(),
                self.expect(")")?.into(),
                self.unary()?.into(),
            ];
            return Ok(Node::hoisted(JavaKind::Cast, children));
        }
        let primary = self.primary()?;
        self.postfix(primary)
    }

    fn looks_like_cast(&mut self) -> bool {
        self.speculate(|p| {
            p.bump();
            let primitive = is_primitive(p.peek());
            if p.type_tree().is_err() || p.eat(")").is_none() {
                return false;
            }
            if primitive {
                return true;
            }
            let next = p.peek();
            matches!(next.kind(), TokenKind::Identifier | TokenKind::Literal)
                || ["(", "this", "new", "super", "!", "~"]
                    .iter()
                    .any(|text| is_syntax(next, text))
        })
    }

    fn primary(&mut self) -> PResult<Node> {
        let token = self.peek();
        match token.kind() {
            TokenKind::Literal => Ok(Node::hoisted(JavaKind::Literal, vec![self.bump().into()])),
            TokenKind::Identifier => self.name_or_call(),
            TokenKind::Keyword if token.is("this") || token.is("super") => self.name_or_call(),
            TokenKind::Keyword if token.is("new") => self.new_expression(),
            TokenKind::Keyword if is_primitive(token) => self.type_tree(),
            TokenKind::Punct if token.is("(") => self.parenthesized(),
            TokenKind::Punct if token.is("{") => self.array_init(),
            _ => Err(self.error("expression")),
        }
    }

    fn name_or_call(&mut self) -> PResult<Node> {
        let name = self.bump();
        if self.at("(") {
            let children: Vec<Element> = vec![name.into(), self.arguments()?.into()];
            Ok(Node::hoisted(JavaKind::MethodInvocation, children))
        } else {
            Ok(Node::hoisted(JavaKind::Identifier, vec![name.into()]))
        }
    }

    fn postfix(&mut self, mut expr: Node) -> PResult<Node> {
        loop {
            if self.at("->") {
                return Err(self.unsupported("lambda"));
            }
            if self.at("::") {
                return Err(self.unsupported("method reference"));
            }
            if let Some(dot) = self.eat(".") {
                if self.at_any(&["new", "<"]) {
                    return Err(self.unsupported("qualified creation or explicit type arguments"));
                }
                let name_ok = self.at_identifier() || self.at_any(&["class", "this", "super"]);
                if !name_ok {
                    return Err(self.error("member name"));
                }
                let name = self.bump();
                expr = if self.at("(") {
                    let children: Vec<Element> =
                        vec![expr.into(), dot.into(), name.into(), self.arguments()?.into()];
                    Node::hoisted(JavaKind::MethodInvocation, children)
                } else {
                    Node::hoisted(JavaKind::FieldAccess, vec![expr.into(), dot.into(), name.into()])
                };
            } else if self.at("[") {
                let children: Vec<Element> = vec![
                    expr.into(),
                    self.bump().into(),
                    self.expression()?.into(),
                    self.expect("]")?.into(),
                ];
                expr = Node::hoisted(JavaKind::ArrayAccess, children);
            } else if self.at_any(&["++", "--"]) {
                expr = Node::hoisted(JavaKind::Unary, vec![expr.into(), self.bump().into()]);
            } else {
                return Ok(expr);
            }
        }
    }

    fn parenthesized(&mut self) -> PResult<Node> {
        let children: Vec<Element> = vec![
            self.expect("(")?.into(),
            self.expression()?.into(),
            self.expect(")")?.into(),
        ];
        Ok(Node::hoisted(JavaKind::Parenthesized, children))
    }

    fn arguments(&mut self) -> PResult<Node> {
        self.delimited(JavaKind::Arguments, "(", ")", ",", |p| p.expression())
    }

    fn array_init(&mut self) -> PResult<Node> {
        self.delimited(JavaKind::ArrayInit, "{", "}", ",", |p| {
            if p.at("{") {
                p.array_init()
            } else {
                p.expression()
            }
        })
    }

    fn new_expression(&mut self) -> PResult<Node> {
        let mut children: Vec<Element> =
            vec![self.expect("new")?.into(), self.type_tree_with(false)?.into()];
        if self.at("[") {
            while self.at("[") {
                children.push(self.dimension(true)?.into());
            }
            if self.at("{") {
                children.push(self.array_init()?.into());
            }
            return Ok(Node::hoisted(JavaKind::NewArray, children));
        }
        children.push(self.arguments()?.into());
        if self.at("{") {
            children.push(self.class_body()?.into());
        }
        Ok(Node::hoisted(JavaKind::NewClass, children))
    }
}
