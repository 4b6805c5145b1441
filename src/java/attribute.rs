//! Type attribution for parsed compilation units.
//!
//! Attribution stands in for a compiler front end: it resolves type names
//! through package and import scopes, builds a symbol table of every class
//! in the source set, and then annotates class declarations, method
//! declarations and call sites with [`TypeInfo`]. Calls into classes outside
//! the source set are left unannotated, which makes them invisible to
//! type-aware matchers rather than wrongly matched.

use crate::java::access;
use crate::java::kind::JavaKind;
use crate::java::parser::PRIMITIVES;
use crate::java::visitor::{JavaDispatch, JavaVisitor};
use crate::tree::{Cursor, Element, JavaType, MethodType, Node, TokenKind, TypeInfo};
use crate::visit::walk;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

const JAVA_LANG: &[&str] = &[
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "Integer",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "Object",
    "Override",
    "Runnable",
    "RuntimeException",
    "Short",
    "String",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

const NUMERIC: &[&str] = &["byte", "short", "char", "int", "long", "float", "double"];

/// Everything attribution knows about one class of the source set.
#[derive(Debug, Clone, Default)]
pub struct ClassSymbol {
    pub fully_qualified: String,
    pub supertypes: Vec<String>,
    pub methods: Vec<MethodType>,
    pub fields: HashMap<String, JavaType>,
}

/// Classes of a source set keyed by fully-qualified name. Nested classes
/// use dotted names (`com.abc.Outer.Inner`).
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    classes: HashMap<String, ClassSymbol>,
}

impl SymbolTable {
    /// Build the table for a whole source set.
    pub fn build(units: &[Arc<Node>]) -> Self {
        let mut known = HashSet::new();
        for unit in units {
            let package = package_of(unit);
            collect_class_names(unit, &package, &mut known);
        }

        let mut table = SymbolTable::default();
        for unit in units {
            let mut scope = TypeScope::new(unit, &known);
            for child in unit.child_nodes() {
                if child.is_kind(JavaKind::ClassDeclaration) {
                    collect_class(child, &mut scope, &mut table);
                }
            }
        }
        table
    }

    pub fn class(&self, fully_qualified: &str) -> Option<&ClassSymbol> {
        self.classes.get(fully_qualified)
    }

    pub fn contains(&self, fully_qualified: &str) -> bool {
        self.classes.contains_key(fully_qualified)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// `class` followed by its known supertypes, each once.
    fn lineage<'a>(&'a self, class: &str) -> Vec<&'a ClassSymbol> {
        let mut out: Vec<&ClassSymbol> = Vec::new();
        let mut queue = vec![class.to_string()];
        while let Some(name) = queue.pop() {
            let Some(symbol) = self.classes.get(&name) else {
                continue;
            };
            if out.iter().any(|seen| seen.fully_qualified == symbol.fully_qualified) {
                continue;
            }
            out.push(symbol);
            queue.extend(symbol.supertypes.iter().rev().cloned());
        }
        out
    }

    fn is_subtype(&self, class: &str, of: &str) -> bool {
        self.lineage(class).iter().any(|symbol| symbol.fully_qualified == of)
    }

    fn field(&self, class: &str, name: &str) -> Option<&JavaType> {
        self.lineage(class)
            .into_iter()
            .find_map(|symbol| symbol.fields.get(name))
    }

    /// Resolve an overload the way a compiler does: first without variable
    /// arity, then allowing it.
    pub fn find_method(&self, class: &str, name: &str, args: &[JavaType]) -> Option<&MethodType> {
        let candidates: Vec<&MethodType> = self
            .lineage(class)
            .into_iter()
            .flat_map(|symbol| symbol.methods.iter())
            .filter(|method| method.name == name)
            .collect();

        candidates
            .iter()
            .find(|method| {
                method.parameter_types.len() == args.len()
                    && args
                        .iter()
                        .zip(&method.parameter_types)
                        .all(|(arg, param)| self.assignable(arg, param))
            })
            .or_else(|| {
                candidates
                    .iter()
                    .find(|method| method.is_varargs && self.varargs_applicable(method, args))
            })
            .copied()
    }

    fn varargs_applicable(&self, method: &MethodType, args: &[JavaType]) -> bool {
        let Some((last, fixed)) = method.parameter_types.split_last() else {
            return false;
        };
        let JavaType::Array(element) = last else {
            return false;
        };
        if args.len() < fixed.len() {
            return false;
        }
        let (head, rest) = args.split_at(fixed.len());
        head.iter()
            .zip(fixed)
            .all(|(arg, param)| self.assignable(arg, param))
            && rest.iter().all(|arg| self.assignable(arg, element))
    }

    fn assignable(&self, arg: &JavaType, param: &JavaType) -> bool {
        match (arg, param) {
            (JavaType::Unknown, _) | (_, JavaType::Unknown) => true,
            (_, JavaType::Class(p)) if p == "java.lang.Object" => true,
            (JavaType::Primitive(a), JavaType::Primitive(p)) => {
                a == p || (NUMERIC.contains(&a.as_str()) && NUMERIC.contains(&p.as_str()))
            }
            (JavaType::Primitive(a), JavaType::Class(p)) => boxed(a) == Some(p.as_str()),
            (JavaType::Class(a), JavaType::Primitive(p)) => boxed(p) == Some(a.as_str()),
            (JavaType::Class(a), JavaType::Class(p)) => {
                a == p || simple_name(a) == simple_name(p) || self.is_subtype(a, p)
            }
            (JavaType::Array(a), JavaType::Array(p)) => self.assignable(a, p),
            _ => false,
        }
    }
}

fn boxed(primitive: &str) -> Option<&'static str> {
    Some(match primitive {
        "boolean" => "java.lang.Boolean",
        "byte" => "java.lang.Byte",
        "char" => "java.lang.Character",
        "short" => "java.lang.Short",
        "int" => "java.lang.Integer",
        "long" => "java.lang.Long",
        "float" => "java.lang.Float",
        "double" => "java.lang.Double",
        _ => return None,
    })
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn package_of(unit: &Node) -> String {
    unit.first_child(JavaKind::Package)
        .and_then(|package| access::qualified_name(package))
        .unwrap_or_default()
}

fn qualify(outer: &str, name: &str) -> String {
    if outer.is_empty() {
        name.to_string()
    } else {
        format!("{outer}.{name}")
    }
}

fn body_members(class: &Node) -> impl Iterator<Item = &Arc<Node>> {
    class
        .child_nodes()
        .filter(|child| child.is_kind(JavaKind::ClassBody) || child.is_kind(JavaKind::EnumBody))
        .flat_map(|body| body.child_nodes())
}

fn collect_class_names(node: &Node, outer: &str, known: &mut HashSet<String>) {
    for child in node.child_nodes() {
        if child.is_kind(JavaKind::ClassDeclaration) {
            let Some(name) = access::class_name(child) else {
                continue;
            };
            let fqn = qualify(outer, name);
            for member in body_members(child) {
                collect_class_names_in_member(member, &fqn, known);
            }
            known.insert(fqn);
        }
    }
}

fn collect_class_names_in_member(member: &Node, outer: &str, known: &mut HashSet<String>) {
    if member.is_kind(JavaKind::ClassDeclaration) {
        if let Some(name) = access::class_name(member) {
            let fqn = qualify(outer, name);
            for inner in body_members(member) {
                collect_class_names_in_member(inner, &fqn, known);
            }
            known.insert(fqn);
        }
    }
}

fn collect_class(class: &Node, scope: &mut TypeScope<'_>, table: &mut SymbolTable) {
    let Some(fqn) = scope.enter_class(class) else {
        return;
    };

    let mut symbol = ClassSymbol {
        fully_qualified: fqn.clone(),
        ..ClassSymbol::default()
    };
    for list in class
        .child_nodes()
        .filter(|child| child.is_kind(JavaKind::Extends) || child.is_kind(JavaKind::Implements))
    {
        for ty in list.child_nodes() {
            if let JavaType::Class(name) = scope.resolve_tree(ty) {
                symbol.supertypes.push(name);
            }
        }
    }

    for member in body_members(class) {
        match member.kind().as_java() {
            Some(JavaKind::MethodDeclaration) => {
                if let Some(method) = scope.method_type(member, &fqn) {
                    symbol.methods.push(method);
                }
            }
            Some(JavaKind::VariableDeclaration) => {
                for (name, ty) in scope.declared_variables(member, |_| JavaType::Unknown) {
                    symbol.fields.insert(name, ty);
                }
            }
            Some(JavaKind::EnumConstants) => {
                for constant in member.child_nodes() {
                    if let Some(name) = access::class_name(constant) {
                        symbol.fields.insert(name.to_string(), JavaType::class(fqn.clone()));
                    }
                }
            }
            Some(JavaKind::ClassDeclaration) => collect_class(member, scope, table),
            _ => {}
        }
    }

    scope.leave_class();
    table.classes.insert(fqn, symbol);
}

/// Name resolution context of one compilation unit.
struct TypeScope<'a> {
    known: &'a HashSet<String>,
    package: String,
    single_imports: HashMap<String, String>,
    on_demand_imports: Vec<String>,
    static_imports: Vec<(String, String)>,
    classes: Vec<String>,
}

impl<'a> TypeScope<'a> {
    fn new(unit: &Node, known: &'a HashSet<String>) -> Self {
        let mut scope = TypeScope {
            known,
            package: package_of(unit),
            single_imports: HashMap::new(),
            on_demand_imports: Vec::new(),
            static_imports: Vec::new(),
            classes: Vec::new(),
        };
        for import in unit.child_nodes().filter(|child| child.is_kind(JavaKind::Import)) {
            if let Some((owner, member)) = access::static_import_parts(import) {
                scope.static_imports.push((owner, member));
                continue;
            }
            let Some(name) = access::qualified_name(import) else {
                continue;
            };
            match name.strip_suffix(".*") {
                Some(package) => scope.on_demand_imports.push(package.to_string()),
                None => {
                    let simple = simple_name(&name).to_string();
                    scope.single_imports.insert(simple, name);
                }
            }
        }
        scope
    }

    fn current_class(&self) -> Option<&str> {
        self.classes.last().map(String::as_str)
    }

    fn enter_class(&mut self, class: &Node) -> Option<String> {
        let name = access::class_name(class)?;
        let outer = self.current_class().unwrap_or(self.package.as_str());
        let fqn = qualify(outer, name);
        self.classes.push(fqn.clone());
        Some(fqn)
    }

    fn leave_class(&mut self) -> Option<String> {
        self.classes.pop()
    }

    fn resolve_name(&self, name: &str) -> JavaType {
        if PRIMITIVES.contains(&name) {
            return JavaType::Primitive(name.to_string());
        }
        if let Some((head, tail)) = name.split_once('.') {
            if self.known.contains(name) {
                return JavaType::class(name);
            }
            // Outer.Inner relative to the unit's scope
            if let JavaType::Class(outer) = self.resolve_name(head) {
                let candidate = format!("{outer}.{tail}");
                if self.known.contains(&candidate) {
                    return JavaType::Class(candidate);
                }
            }
            return JavaType::class(name);
        }

        for class in self.classes.iter().rev() {
            let candidate = format!("{class}.{name}");
            if self.known.contains(&candidate) {
                return JavaType::Class(candidate);
            }
        }
        if let Some(fqn) = self.single_imports.get(name) {
            return JavaType::class(fqn.clone());
        }
        let same_package = qualify(&self.package, name);
        if self.known.contains(&same_package) {
            return JavaType::Class(same_package);
        }
        for package in &self.on_demand_imports {
            let candidate = format!("{package}.{name}");
            if self.known.contains(&candidate) {
                return JavaType::Class(candidate);
            }
        }
        if JAVA_LANG.contains(&name) {
            return JavaType::class(format!("java.lang.{name}"));
        }
        JavaType::class(name)
    }

    /// Resolve a `TypeTree` node, including `[]` dimensions.
    fn resolve_tree(&self, tree: &Node) -> JavaType {
        let mut name = String::new();
        let mut dims = 0;
        for child in tree.children() {
            let Element::Token(token) = child else {
                continue;
            };
            match token.text() {
                "[" => dims += 1,
                "]" => {}
                "?" => return JavaType::class("java.lang.Object"),
                text => name.push_str(text),
            }
        }
        let mut ty = self.resolve_name(&name);
        for _ in 0..dims {
            ty = JavaType::array_of(ty);
        }
        ty
    }

    fn method_type(&self, decl: &Node, declaring_type: &str) -> Option<MethodType> {
        if access::is_constructor(decl) {
            return None;
        }
        let name = access::method_name(decl)?.to_string();
        let return_type = decl
            .first_child(JavaKind::TypeTree)
            .map(|tree| self.resolve_tree(tree))
            .unwrap_or(JavaType::Unknown);
        let mut is_varargs = false;
        let parameter_types = decl
            .first_child(JavaKind::Parameters)
            .map(|params| {
                params
                    .child_nodes()
                    .map(|param| {
                        is_varargs |= param.has_token("...");
                        self.parameter_type(param)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(MethodType {
            declaring_type: declaring_type.to_string(),
            name,
            parameter_types,
            return_type,
            is_static: access::has_modifier(decl, "static"),
            is_varargs,
        })
    }

    fn parameter_type(&self, param: &Node) -> JavaType {
        let mut ty = param
            .first_child(JavaKind::TypeTree)
            .map(|tree| self.resolve_tree(tree))
            .unwrap_or(JavaType::Unknown);
        if param.has_token("...") {
            ty = JavaType::array_of(ty);
        }
        for _ in 0..access::dimensions(param) {
            ty = JavaType::array_of(ty);
        }
        ty
    }

    /// Names and types declared by a field or local variable declaration.
    /// `infer` types the initializer of a `var` declaration.
    fn declared_variables(
        &self,
        decl: &Node,
        mut infer: impl FnMut(&Node) -> JavaType,
    ) -> Vec<(String, JavaType)> {
        let Some(tree) = decl.first_child(JavaKind::TypeTree) else {
            return Vec::new();
        };
        let inferred = tree.text_without_trivia() == "var";
        let base = self.resolve_tree(tree);
        let Some(declarators) = decl.first_child(JavaKind::Declarators) else {
            return Vec::new();
        };
        declarators
            .child_nodes()
            .filter_map(|variable| {
                let name = variable.tokens().next()?.text().to_string();
                let mut ty = if inferred {
                    variable
                        .child_nodes()
                        .last()
                        .filter(|_| variable.has_token("="))
                        .map(|init| infer(&**init))
                        .unwrap_or(JavaType::Unknown)
                } else {
                    base.clone()
                };
                for _ in 0..access::dimensions(variable) {
                    ty = JavaType::array_of(ty);
                }
                Some((name, ty))
            })
            .collect()
    }
}

fn literal_type(text: &str) -> JavaType {
    let primitive = |name: &str| JavaType::Primitive(name.to_string());
    if text.starts_with('"') {
        return JavaType::string();
    }
    if text.starts_with('\'') {
        return primitive("char");
    }
    match text {
        "true" | "false" => return primitive("boolean"),
        "null" => return JavaType::Unknown,
        _ => {}
    }
    let hex = text.starts_with("0x") || text.starts_with("0X");
    if text.ends_with(['L', 'l']) {
        primitive("long")
    } else if !hex && text.ends_with(['f', 'F']) {
        primitive("float")
    } else if !hex && (text.ends_with(['d', 'D']) || text.contains(['.', 'e', 'E'])) {
        primitive("double")
    } else {
        primitive("int")
    }
}

/// Walks one compilation unit attaching [`TypeInfo`].
struct Attributor<'a> {
    symbols: &'a SymbolTable,
    scope: TypeScope<'a>,
    locals: Vec<HashMap<String, JavaType>>,
}

impl<'a> Attributor<'a> {
    fn declare(&mut self, name: &str, ty: JavaType) {
        if let Some(frame) = self.locals.last_mut() {
            frame.insert(name.to_string(), ty);
        }
    }

    fn variable(&self, name: &str) -> Option<JavaType> {
        if let Some(ty) = self.locals.iter().rev().find_map(|frame| frame.get(name)) {
            return Some(ty.clone());
        }
        self.scope
            .classes
            .iter()
            .rev()
            .find_map(|class| self.symbols.field(class, name))
            .cloned()
    }

    /// A name used as a static receiver, when it denotes a known class.
    fn class_reference(&self, name: &str) -> Option<JavaType> {
        match self.scope.resolve_name(name) {
            JavaType::Class(fqn) if self.symbols.contains(&fqn) => Some(JavaType::Class(fqn)),
            _ => None,
        }
    }

    fn type_of(&self, expr: &Node) -> JavaType {
        let Some(kind) = expr.kind().as_java() else {
            return JavaType::Unknown;
        };
        let first_node = || expr.child_nodes().next();
        match kind {
            JavaKind::Literal => expr
                .tokens()
                .next()
                .map(|token| literal_type(token.text()))
                .unwrap_or(JavaType::Unknown),
            JavaKind::Identifier => {
                let Some(token) = expr.tokens().next() else {
                    return JavaType::Unknown;
                };
                match token.text() {
                    "this" => self
                        .scope
                        .current_class()
                        .map(JavaType::class)
                        .unwrap_or(JavaType::Unknown),
                    "super" => self
                        .scope
                        .current_class()
                        .and_then(|class| self.symbols.class(class))
                        .and_then(|symbol| symbol.supertypes.first())
                        .map(|name| JavaType::class(name.clone()))
                        .unwrap_or(JavaType::Unknown),
                    name => self
                        .variable(name)
                        .or_else(|| self.class_reference(name))
                        .unwrap_or(JavaType::Unknown),
                }
            }
            JavaKind::FieldAccess => {
                let text = expr.text_without_trivia();
                if self.symbols.contains(&text) {
                    return JavaType::Class(text);
                }
                let Some(field) = expr.tokens().last().map(|token| token.text()) else {
                    return JavaType::Unknown;
                };
                match first_node().map(|target| self.type_of(target)) {
                    Some(JavaType::Array(_)) if field == "length" => {
                        JavaType::Primitive("int".to_string())
                    }
                    Some(JavaType::Class(owner)) => self
                        .symbols
                        .field(&owner, field)
                        .cloned()
                        .or_else(|| self.class_reference(&format!("{owner}.{field}")))
                        .unwrap_or(JavaType::Unknown),
                    _ => JavaType::Unknown,
                }
            }
            JavaKind::MethodInvocation => expr
                .type_info()
                .and_then(TypeInfo::method)
                .map(|method| method.return_type.clone())
                .unwrap_or(JavaType::Unknown),
            JavaKind::NewClass => expr
                .first_child(JavaKind::TypeTree)
                .map(|tree| self.scope.resolve_tree(tree))
                .unwrap_or(JavaType::Unknown),
            JavaKind::NewArray => {
                let Some(tree) = expr.first_child(JavaKind::TypeTree) else {
                    return JavaType::Unknown;
                };
                let mut ty = self.scope.resolve_tree(tree);
                for _ in 0..access::dimensions(expr) {
                    ty = JavaType::array_of(ty);
                }
                ty
            }
            JavaKind::Cast => expr
                .first_child(JavaKind::TypeTree)
                .map(|tree| self.scope.resolve_tree(tree))
                .unwrap_or(JavaType::Unknown),
            JavaKind::Parenthesized | JavaKind::Unary if expr.has_token("!") => {
                JavaType::Primitive("boolean".to_string())
            }
            JavaKind::Parenthesized | JavaKind::Unary => first_node()
                .map(|inner| self.type_of(inner))
                .unwrap_or(JavaType::Unknown),
            JavaKind::Conditional => expr
                .child_nodes()
                .nth(1)
                .map(|branch| self.type_of(branch))
                .unwrap_or(JavaType::Unknown),
            JavaKind::ArrayAccess => match first_node().map(|target| self.type_of(target)) {
                Some(JavaType::Array(element)) => *element,
                _ => JavaType::Unknown,
            },
            JavaKind::Binary => self.binary_type(expr),
            _ => JavaType::Unknown,
        }
    }

    fn binary_type(&self, expr: &Node) -> JavaType {
        let operator: String = expr.tokens().map(|token| token.text()).collect();
        let mut operands = expr.child_nodes();
        let left = operands
            .next()
            .map(|node| self.type_of(node))
            .unwrap_or(JavaType::Unknown);
        match operator.as_str() {
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" | "instanceof" => {
                JavaType::Primitive("boolean".to_string())
            }
            "+" => {
                let right = operands
                    .last()
                    .map(|node| self.type_of(node))
                    .unwrap_or(JavaType::Unknown);
                let string = JavaType::string();
                if left == string || right == string {
                    string
                } else {
                    left
                }
            }
            _ => left,
        }
    }

    fn resolve_invocation(&self, call: &Node) -> Option<TypeInfo> {
        let name = access::method_name(call)?;
        let args: Vec<JavaType> = call
            .first_child(JavaKind::Arguments)?
            .child_nodes()
            .map(|arg| self.type_of(arg))
            .collect();

        if let Some(select) = access::invocation_select(call) {
            let owner = self.type_of(select);
            let method = self.symbols.find_method(owner.fully_qualified()?, name, &args)?;
            return Some(TypeInfo::Invocation {
                method: method.clone(),
                via_static_import: false,
            });
        }

        if matches!(name, "this" | "super") {
            return None;
        }
        let in_scope = self
            .scope
            .classes
            .iter()
            .rev()
            .find_map(|class| self.symbols.find_method(class, name, &args));
        if let Some(method) = in_scope {
            return Some(TypeInfo::Invocation {
                method: method.clone(),
                via_static_import: false,
            });
        }
        self.scope
            .static_imports
            .iter()
            .filter(|(_, member)| member == name || member == "*")
            .find_map(|(owner, _)| self.symbols.find_method(owner, name, &args))
            .filter(|method| method.is_static)
            .map(|method| TypeInfo::Invocation {
                method: method.clone(),
                via_static_import: true,
            })
    }
}

impl JavaVisitor for Attributor<'_> {
    fn pre_visit(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        match node.kind().as_java() {
            Some(JavaKind::ClassDeclaration) => {
                self.scope.enter_class(node);
                self.locals.push(HashMap::new());
            }
            Some(JavaKind::MethodDeclaration) => {
                let mut frame = HashMap::new();
                if let Some(params) = node.first_child(JavaKind::Parameters) {
                    for param in params.child_nodes() {
                        if let Some(name) = access::declared_name(param) {
                            frame.insert(name.to_string(), self.scope.parameter_type(param));
                        }
                    }
                }
                self.locals.push(frame);
            }
            Some(JavaKind::Catch) => {
                let mut frame = HashMap::new();
                // a multi-catch parameter has no single declared type
                let ty = if node.has_token("|") {
                    JavaType::Unknown
                } else {
                    node.first_child(JavaKind::TypeTree)
                        .map(|tree| self.scope.resolve_tree(tree))
                        .unwrap_or(JavaType::Unknown)
                };
                if let Some(name) = access::declared_name(node) {
                    frame.insert(name.to_string(), ty);
                }
                self.locals.push(frame);
            }
            Some(JavaKind::Block | JavaKind::Try | JavaKind::Initializer) => {
                self.locals.push(HashMap::new());
            }
            _ => {}
        }
        Arc::clone(node)
    }

    fn visit_class_declaration(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        self.locals.pop();
        match self.scope.leave_class() {
            Some(fully_qualified) => {
                Arc::new(node.with_type_info(Some(TypeInfo::Class { fully_qualified })))
            }
            None => Arc::clone(node),
        }
    }

    fn visit_method_declaration(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        self.locals.pop();
        let anonymous = cursor
            .ancestors()
            .nth(1)
            .is_some_and(|owner| owner.is_kind(JavaKind::NewClass));
        if anonymous {
            return Arc::clone(node);
        }
        let method = self
            .scope
            .current_class()
            .and_then(|class| self.scope.method_type(node, class));
        match method {
            Some(method) => Arc::new(node.with_type_info(Some(TypeInfo::Method(method)))),
            None => Arc::clone(node),
        }
    }

    fn visit_block(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        self.locals.pop();
        Arc::clone(node)
    }

    fn visit_try(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        self.locals.pop();
        Arc::clone(node)
    }

    fn visit_catch(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        self.locals.pop();
        Arc::clone(node)
    }

    fn visit_initializer(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        self.locals.pop();
        Arc::clone(node)
    }

    fn visit_variable_declaration(&mut self, node: &Arc<Node>, cursor: &Cursor) -> Arc<Node> {
        // fields are already in the symbol table
        let is_field = cursor.parent().is_some_and(|parent| {
            parent.is_kind(JavaKind::ClassBody) || parent.is_kind(JavaKind::EnumBody)
        });
        if !is_field {
            let declared = self.scope.declared_variables(node, |init| self.type_of(init));
            for (name, ty) in declared {
                self.declare(&name, ty);
            }
        }
        Arc::clone(node)
    }

    fn visit_resource(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        if let Some(tree) = node.first_child(JavaKind::TypeTree) {
            let ty = self.scope.resolve_tree(tree);
            let name = node
                .tokens()
                .find(|token| token.kind() == TokenKind::Identifier)
                .map(|token| token.text().to_string());
            if let Some(name) = name {
                self.declare(&name, ty);
            }
        }
        Arc::clone(node)
    }

    fn visit_method_invocation(&mut self, node: &Arc<Node>, _cursor: &Cursor) -> Arc<Node> {
        match self.resolve_invocation(node) {
            Some(info) => {
                trace!(call = %node.text_without_trivia(), "attributed invocation");
                Arc::new(node.with_type_info(Some(info)))
            }
            None => Arc::clone(node),
        }
    }
}

/// Attribute a source set. Units are returned in input order.
pub fn attribute(units: &[Arc<Node>]) -> Vec<Arc<Node>> {
    let symbols = SymbolTable::build(units);
    let known: HashSet<String> = symbols.classes.keys().cloned().collect();
    debug!(classes = symbols.len(), units = units.len(), "built symbol table");

    units
        .iter()
        .map(|unit| {
            let attributor = Attributor {
                symbols: &symbols,
                scope: TypeScope::new(unit, &known),
                locals: Vec::new(),
            };
            walk(&mut JavaDispatch(attributor), unit)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::parser::parse_compilation_unit;

    const B: &str = "package com.abc;\nclass B {\n   public void singleArg(String s) {}\n   public void arrArg(String[] s) {}\n   public void varargArg(String... s) {}\n   public static void static1(String s) {}\n   public static void static2(String s) {}\n}\n";

    fn units(sources: &[&str]) -> Vec<Arc<Node>> {
        let parsed: Vec<Arc<Node>> = sources
            .iter()
            .map(|source| Arc::new(parse_compilation_unit(source).unwrap()))
            .collect();
        attribute(&parsed)
    }

    fn invocations(node: &Arc<Node>, out: &mut Vec<Arc<Node>>) {
        if node.is_kind(JavaKind::MethodInvocation) {
            out.push(Arc::clone(node));
        }
        for child in node.child_nodes() {
            invocations(child, out);
        }
    }

    fn resolved(source: &str) -> Vec<String> {
        let attributed = units(&[B, source]);
        let mut calls = Vec::new();
        invocations(&attributed[1], &mut calls);
        calls
            .iter()
            .map(|call| match call.type_info() {
                Some(TypeInfo::Invocation {
                    method,
                    via_static_import,
                }) => format!("{method}{}", if *via_static_import { " static-import" } else { "" }),
                _ => "unresolved".to_string(),
            })
            .collect()
    }

    #[test]
    fn resolves_overloads_by_parameter_types() {
        let calls = resolved(
            "package com.abc;\nclass A {\n   void test() {\n       new B().singleArg(\"boo\");\n       new B().arrArg(new String[] {\"boo\"});\n       new B().varargArg(\"boo\", \"again\");\n   }\n}\n",
        );
        assert_eq!(
            calls,
            vec![
                "com.abc.B singleArg(java.lang.String)",
                "com.abc.B arrArg(java.lang.String[])",
                "com.abc.B varargArg(java.lang.String...)",
            ]
        );
    }

    #[test]
    fn resolves_locals_and_static_receivers() {
        let calls = resolved(
            "package com.abc;\nclass A {\n   void test() {\n       B b = new B();\n       b.singleArg(\"x\");\n       B.static1(\"y\");\n   }\n}\n",
        );
        assert_eq!(
            calls,
            vec![
                "com.abc.B singleArg(java.lang.String)",
                "com.abc.B static1(java.lang.String)",
            ]
        );
    }

    #[test]
    fn marks_calls_through_static_imports() {
        let calls = resolved(
            "package com.abc;\nimport static com.abc.B.static1;\nclass A {\n   public void test() {\n       static1(\"boo\");\n   }\n}\n",
        );
        assert_eq!(calls, vec!["com.abc.B static1(java.lang.String) static-import"]);
    }

    #[test]
    fn unknown_receivers_stay_unresolved() {
        let calls = resolved(
            "package com.abc;\nclass A {\n   void test() {\n       System.out.println(\"x\");\n   }\n}\n",
        );
        assert_eq!(calls, vec!["unresolved"]);
    }

    #[test]
    fn declarations_carry_method_types() {
        let attributed = units(&[B]);
        let class = attributed[0]
            .child_nodes()
            .find(|child| child.is_kind(JavaKind::ClassDeclaration))
            .unwrap();
        assert_eq!(
            class.type_info().and_then(TypeInfo::class_name),
            Some("com.abc.B")
        );
        let body = class.first_child(JavaKind::ClassBody).unwrap();
        let signatures: Vec<String> = body
            .child_nodes()
            .filter_map(|member| member.type_info().and_then(TypeInfo::method))
            .map(|method| method.to_string())
            .collect();
        assert_eq!(signatures[2], "com.abc.B varargArg(java.lang.String...)");
        assert_eq!(signatures.len(), 5);
    }

    #[test]
    fn attribution_preserves_text() {
        let attributed = units(&[B]);
        assert_eq!(attributed[0].print(), B);
    }
}
