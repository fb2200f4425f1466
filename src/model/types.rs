//! Host type references.
//!
//! [`TypeRef`] is the closed set of type shapes the analyzer reasons about. Types arrive from the input model as
//! Java-spelled strings and are parsed once; every later decision pattern-matches on the variant.

use std::fmt;

use metagen_core::lang::primitives::{self, PrimitiveKind};
use metagen_core::lang::types::{self as known, KnownTypeId};
use thiserror::Error;

/// A host type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// A class or interface type, possibly parameterized.
    Declared { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    Wildcard {
        extends: Option<Box<TypeRef>>,
        super_: Option<Box<TypeRef>>,
    },
    TypeVar(String),
    Void,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed type '{text}': {reason}")]
pub struct TypeParseError {
    pub text: String,
    pub reason: String,
}

impl TypeRef {
    pub fn declared(name: impl Into<String>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            args,
        }
    }

    pub fn known(id: KnownTypeId) -> Self {
        TypeRef::declared(known::as_str(id))
    }

    pub fn array_of(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    pub fn super_of(bound: TypeRef) -> Self {
        TypeRef::Wildcard {
            extends: None,
            super_: Some(Box::new(bound)),
        }
    }

    /// Parse a Java-spelled type (`java.util.List<? super org.example.Book>`, `int[]`, `T`, `String...`).
    pub fn parse(text: &str) -> Result<TypeRef, TypeParseError> {
        let mut parser = TypeParser {
            text,
            chars: text.char_indices().peekable(),
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        match parser.chars.peek() {
            None => Ok(ty),
            Some(&(_, c)) => Err(parser.error(format!("unexpected '{c}'"))),
        }
    }

    /// The erased qualified name of a declared type.
    pub fn erased_name(&self) -> Option<&str> {
        match self {
            TypeRef::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The registry id of a declared type, if it names a well-known library type.
    pub fn known_id(&self) -> Option<KnownTypeId> {
        self.erased_name().and_then(known::from_str)
    }

    pub fn is_known(&self, id: KnownTypeId) -> bool {
        self.known_id() == Some(id)
    }

    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Declared { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn component(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Replace a primitive with its boxed declared type; other types are returned unchanged.
    pub fn boxed(&self) -> TypeRef {
        match self {
            TypeRef::Primitive(kind) => TypeRef::declared(primitives::boxed_name(*kind)),
            other => other.clone(),
        }
    }

    /// The type with all type arguments dropped.
    pub fn erasure(&self) -> TypeRef {
        match self {
            TypeRef::Declared { name, .. } => TypeRef::declared(name.clone()),
            TypeRef::Array(component) => TypeRef::array_of(component.erasure()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => f.write_str(primitives::as_str(*kind)),
            TypeRef::Declared { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Array(component) => write!(f, "{component}[]"),
            TypeRef::Wildcard { extends, super_ } => {
                f.write_str("?")?;
                if let Some(bound) = extends {
                    write!(f, " extends {bound}")?;
                }
                if let Some(bound) = super_ {
                    write!(f, " super {bound}")?;
                }
                Ok(())
            }
            TypeRef::TypeVar(name) => f.write_str(name),
            TypeRef::Void => f.write_str("void"),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

/// Check whether an identifier spells a type variable (`T`, `E`, `K2`, `ID`).
pub fn is_type_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_uppercase() {
        return false;
    }
    match (chars.next(), chars.next()) {
        (None, _) => true,
        (Some(c), None) => c.is_ascii_digit() || c.is_ascii_uppercase(),
        _ => false,
    }
}

struct TypeParser<'a> {
    text: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> TypeParser<'a> {
    fn error(&self, reason: impl Into<String>) -> TypeParseError {
        TypeParseError {
            text: self.text.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        self.chars.next_if(|(_, c)| *c == expected).is_some()
    }

    fn rest(&mut self) -> &'a str {
        let text = self.text;
        self.chars.peek().map(|(i, _)| &text[*i..]).unwrap_or("")
    }

    fn advance(&mut self, count: usize) {
        for _ in 0..count {
            self.chars.next();
        }
    }

    fn ident(&mut self) -> Result<String, TypeParseError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
            .unwrap_or(rest.len());
        let mut out = rest[..len].to_string();
        // `String...` is a varargs array; leave the ellipsis for the array suffix loop.
        if out.ends_with("...") {
            out.truncate(out.len() - 3);
        }
        self.advance(out.chars().count());
        if out.is_empty() {
            Err(self.error("expected a type name"))
        } else if out.starts_with('.') || out.ends_with('.') || out.contains("..") {
            Err(self.error(format!("bad qualified name '{out}'")))
        } else {
            Ok(out)
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeParseError> {
        self.skip_ws();
        if self.eat('?') {
            return self.parse_wildcard();
        }
        let name = self.ident()?;
        let mut ty = self.base_type(name)?;
        loop {
            if self.eat('[') {
                if !self.eat(']') {
                    return Err(self.error("expected ']'"));
                }
                ty = TypeRef::array_of(ty);
            } else if self.eat_ellipsis() {
                ty = TypeRef::array_of(ty);
            } else {
                return Ok(ty);
            }
        }
    }

    fn base_type(&mut self, name: String) -> Result<TypeRef, TypeParseError> {
        if name == "void" {
            return Ok(TypeRef::Void);
        }
        if let Some(kind) = primitives::from_str(&name) {
            return Ok(TypeRef::Primitive(kind));
        }
        if !name.contains('.') && is_type_variable_name(&name) {
            return Ok(TypeRef::TypeVar(name));
        }
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }
        Ok(TypeRef::Declared { name, args })
    }

    fn eat_ellipsis(&mut self) -> bool {
        self.skip_ws();
        if self.rest().starts_with("...") {
            self.advance(3);
            true
        } else {
            false
        }
    }

    fn parse_wildcard(&mut self) -> Result<TypeRef, TypeParseError> {
        self.skip_ws();
        let rest = self.rest();
        let keyword = if rest.starts_with("extends") {
            "extends"
        } else if rest.starts_with("super") {
            "super"
        } else {
            return Ok(TypeRef::Wildcard {
                extends: None,
                super_: None,
            });
        };
        self.advance(keyword.len());
        let bound = Box::new(self.parse_type()?);
        Ok(if keyword == "extends" {
            TypeRef::Wildcard {
                extends: Some(bound),
                super_: None,
            }
        } else {
            TypeRef::Wildcard {
                extends: None,
                super_: Some(bound),
            }
        })
    }
}
