use crate::java::parser::PRIMITIVES;
use crate::pattern::errors::PatternError;
use crate::tree::{JavaType, MethodType, Node};
use regex::Regex;
use std::fmt;

/// A compiled `<owner> <name>(<parameters>)` method pattern.
///
/// # Syntax
///
/// - owner: a fully-qualified type name; `*` within a segment matches any
///   characters except `.`
/// - name: a method name, optionally with `*` wildcards
/// - parameters, comma separated:
///   - `..` matches any number of parameters, including none
///   - `*` matches exactly one parameter of any type
///   - `T`, `T[]`, `T...` match a parameter by resolved type; a simple name
///     like `String` also matches `java.lang.String`, and `T...` is the same
///     as `T[]`
///
/// The return type is not part of the pattern.
#[derive(Debug, Clone)]
pub struct MethodPattern {
    source: String,
    owner: Regex,
    name: Regex,
    params: Vec<ParamPattern>,
}

#[derive(Debug, Clone)]
enum ParamPattern {
    AnyRun,
    AnyOne,
    Type { element: Regex, dimensions: usize },
}

impl MethodPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = pattern.trim();
        let open = trimmed
            .find('(')
            .ok_or_else(|| PatternError::malformed(pattern, "missing '('"))?;
        if !trimmed.ends_with(')') {
            return Err(PatternError::malformed(pattern, "missing ')' at end of pattern"));
        }

        let head = trimmed[..open].trim();
        let (owner, name) = head
            .split_once(char::is_whitespace)
            .map(|(owner, name)| (owner.trim(), name.trim()))
            .ok_or_else(|| PatternError::malformed(pattern, "expected '<owner> <name>(...)'"))?;
        if owner.is_empty() || name.is_empty() || name.contains(char::is_whitespace) {
            return Err(PatternError::malformed(pattern, "expected '<owner> <name>(...)'"));
        }
        if owner.contains("..") || owner.starts_with('.') || owner.ends_with('.') {
            return Err(PatternError::malformed(pattern, "empty segment in owner type"));
        }
        if name.contains('.') {
            return Err(PatternError::malformed(pattern, "method name cannot contain '.'"));
        }

        let params = parse_params(pattern, &trimmed[open + 1..trimmed.len() - 1])?;

        Ok(Self {
            source: pattern.to_string(),
            owner: wildcard_regex(pattern, owner, false)?,
            name: wildcard_regex(pattern, name, false)?,
            params,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches_method(&self, method: &MethodType) -> bool {
        self.owner.is_match(&method.declaring_type)
            && self.name.is_match(&method.name)
            && params_match(&self.params, &method.parameter_types)
    }

    /// Whether `node` carries resolved method metadata that this pattern
    /// selects. Unattributed nodes never match.
    pub fn matches(&self, node: &Node) -> bool {
        node.type_info()
            .and_then(|info| info.method())
            .is_some_and(|method| self.matches_method(method))
    }

    /// Whether the owner part alone selects `type_name`.
    pub fn matches_owner(&self, type_name: &str) -> bool {
        self.owner.is_match(type_name)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.is_match(name)
    }
}

impl fmt::Display for MethodPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_params(pattern: &str, list: &str) -> Result<Vec<ParamPattern>, PatternError> {
    let list = list.trim();
    if list.is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<&str> = list.split(',').map(str::trim).collect();
    let last = raw.len() - 1;
    let mut params = Vec::with_capacity(raw.len());
    for (idx, param) in raw.into_iter().enumerate() {
        match param {
            "" => return Err(PatternError::malformed(pattern, "empty parameter")),
            ".." => params.push(ParamPattern::AnyRun),
            "*" => params.push(ParamPattern::AnyOne),
            _ => {
                let (param, varargs) = match param.strip_suffix("...") {
                    Some(element) => (element.trim_end(), true),
                    None => (param, false),
                };
                if varargs && idx != last {
                    return Err(PatternError::malformed(
                        pattern,
                        "'...' is only allowed on the last parameter",
                    ));
                }

                let mut element = param;
                let mut dimensions = usize::from(varargs);
                while let Some(inner) = element.strip_suffix("[]") {
                    element = inner.trim_end();
                    dimensions += 1;
                }
                let element = strip_type_arguments(pattern, element)?;
                if element.is_empty()
                    || element.contains(char::is_whitespace)
                    || element.contains("..")
                    || element.contains(['[', ']'])
                {
                    return Err(PatternError::malformed(
                        pattern,
                        format!("invalid parameter type '{param}'"),
                    ));
                }

                params.push(ParamPattern::Type {
                    element: wildcard_regex(pattern, element, true)?,
                    dimensions,
                });
            }
        }
    }
    Ok(params)
}

/// `List<String>` matches the raw type `List`.
fn strip_type_arguments<'p>(pattern: &str, element: &'p str) -> Result<&'p str, PatternError> {
    match element.find('<') {
        Some(open) if element.ends_with('>') => Ok(element[..open].trim_end()),
        Some(_) => Err(PatternError::malformed(pattern, "unbalanced type arguments")),
        None if element.contains('>') => {
            Err(PatternError::malformed(pattern, "unbalanced type arguments"))
        }
        None => Ok(element),
    }
}

/// Compile a dotted name where `*` stands for any run of non-dot characters.
///
/// With `implicit_lang`, a simple class name also matches its `java.lang`
/// counterpart.
fn wildcard_regex(pattern: &str, text: &str, implicit_lang: bool) -> Result<Regex, PatternError> {
    let body = text
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("[^.]*");
    let lang = implicit_lang && !text.contains('.') && !PRIMITIVES.contains(&text);
    let anchored = if lang {
        format!("^(?:java\\.lang\\.)?{body}$")
    } else {
        format!("^{body}$")
    };
    Regex::new(&anchored).map_err(|source| PatternError::Wildcard {
        pattern: pattern.to_string(),
        source,
    })
}

fn params_match(patterns: &[ParamPattern], types: &[JavaType]) -> bool {
    match patterns.split_first() {
        None => types.is_empty(),
        Some((ParamPattern::AnyRun, rest)) => {
            (0..=types.len()).any(|skip| params_match(rest, &types[skip..]))
        }
        Some((first, rest)) => match types.split_first() {
            Some((ty, remaining)) => param_matches(first, ty) && params_match(rest, remaining),
            None => false,
        },
    }
}

fn param_matches(pattern: &ParamPattern, ty: &JavaType) -> bool {
    match pattern {
        ParamPattern::AnyRun | ParamPattern::AnyOne => true,
        ParamPattern::Type {
            element,
            dimensions,
        } => {
            let (component, dims) = ty.array_components();
            if dims != *dimensions {
                return false;
            }
            match component {
                JavaType::Primitive(name) | JavaType::Class(name) => element.is_match(name),
                JavaType::Array(_) | JavaType::Unknown => false,
            }
        }
    }
}
