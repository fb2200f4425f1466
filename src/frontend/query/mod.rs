//! Query validation service.
//!
//! The analyzer hands embedded query text to a [`QueryValidator`] and receives the statement kind, its selection
//! shape and the query parameters it declares (with types where the validator could infer them). [`HqlValidator`]
//! is the reference implementation for the managed dialects; native SQL is only scanned for parameter tokens (see
//! [`native`]).

pub mod lexer;
pub mod native;
pub mod parser;

use std::fmt;

use miette::SourceSpan;
use thiserror::Error;

use crate::frontend::diagnostics::Span;
use crate::model::{EntityProvider, TypeRef};

/// The language query text is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Hibernate Query Language (`@HQL`).
    Hql,
    /// Jakarta Data Query Language (`@Query`); the `select` and `from` clauses may be omitted.
    Jdql,
    /// Native SQL (`@SQL`).
    Sql,
}

impl Dialect {
    pub fn is_native(self) -> bool {
        self == Dialect::Sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Update,
    Delete,
    Insert,
}

impl StatementKind {
    pub fn is_mutation(self) -> bool {
        self != StatementKind::Select
    }
}

/// What a selection item denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionKind {
    /// The alias of a root entity in the from clause.
    EntityRoot { entity: String },
    /// The alias of an explicit entity join (`join Publisher p on ...`).
    EntityJoin { entity: String },
    /// An attribute path, attribute join alias, literal or function call.
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    pub kind: SelectionKind,
    /// The Java type of the item, `None` when it cannot be determined.
    pub java_type: Option<TypeRef>,
}

impl SelectionItem {
    pub fn is_entity(&self) -> bool {
        matches!(
            self.kind,
            SelectionKind::EntityRoot { .. } | SelectionKind::EntityJoin { .. }
        )
    }

    /// The qualified entity name for entity selections.
    pub fn entity(&self) -> Option<&str> {
        match &self.kind {
            SelectionKind::EntityRoot { entity } | SelectionKind::EntityJoin { entity } => Some(entity),
            SelectionKind::Expression => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterLabel {
    Named(String),
    Positional(u32),
}

impl fmt::Display for ParameterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLabel::Named(name) => write!(f, ":{name}"),
            ParameterLabel::Positional(n) => write!(f, "?{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    pub label: ParameterLabel,
    /// Inferred bind type, `None` when the dialect could not determine it.
    pub java_type: Option<TypeRef>,
    /// The parameter stands for a whole `in` list, so it binds a collection of `java_type`.
    pub multivalued: bool,
    pub span: Span,
}

impl QueryParameter {
    /// The bind type spelled for messages (`unknown` when undetermined).
    pub fn type_name(&self) -> String {
        self.java_type
            .as_ref()
            .map(TypeRef::to_string)
            .unwrap_or_else(|| metagen_core::UNKNOWN_TYPE_NAME.to_string())
    }
}

/// The validated shape of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub kind: StatementKind,
    /// The selection list; empty for mutations.
    pub selection: Vec<SelectionItem>,
    /// Distinct query parameters in order of first occurrence.
    pub parameters: Vec<QueryParameter>,
}

impl ParsedQuery {
    pub fn single_selection(&self) -> Option<&SelectionItem> {
        match self.selection.as_slice() {
            [item] => Some(item),
            _ => None,
        }
    }

    pub fn parameter(&self, label: &ParameterLabel) -> Option<&QueryParameter> {
        self.parameters.iter().find(|p| &p.label == label)
    }
}

/// A syntax or semantic error in query text.
#[derive(Debug, Clone, Error, miette::Diagnostic)]
#[error("{message}")]
#[diagnostic(code(metagen::query))]
pub struct QuerySyntaxError {
    pub message: String,
    #[source_code]
    pub query: String,
    #[label("here")]
    pub at: SourceSpan,
    pub span: Span,
}

impl QuerySyntaxError {
    pub fn new(message: impl Into<String>, text: &str, span: Span) -> Self {
        Self {
            message: message.into(),
            query: text.to_string(),
            at: span.into(),
            span,
        }
    }
}

/// Parses and checks query text against the entity model.
pub trait QueryValidator {
    /// ## Parameters
    /// - `expected`: the method's (unwrapped) result type, used to infer the root entity when the dialect allows the
    ///   from clause to be omitted.
    fn validate(
        &self,
        text: &str,
        dialect: Dialect,
        expected: Option<&TypeRef>,
        provider: &dyn EntityProvider,
    ) -> Result<ParsedQuery, Vec<QuerySyntaxError>>;
}

/// Reference validator for the managed dialects.
#[derive(Debug, Clone, Copy, Default)]
pub struct HqlValidator;

impl QueryValidator for HqlValidator {
    fn validate(
        &self,
        text: &str,
        dialect: Dialect,
        expected: Option<&TypeRef>,
        provider: &dyn EntityProvider,
    ) -> Result<ParsedQuery, Vec<QuerySyntaxError>> {
        let tokens = lexer::tokenize(text)?;
        let implicit_root = match dialect {
            Dialect::Jdql => expected.and_then(TypeRef::erased_name),
            Dialect::Hql | Dialect::Sql => None,
        };
        parser::Parser::new(text, tokens, provider, implicit_root).parse_statement()
    }
}
