//! Recursive-descent parser for the managed query dialects
//!
//! The parser checks entity names and attribute paths against the [`EntityProvider`] while it parses, and infers
//! parameter types from the expressions parameters are compared with.
//!
//! ## Notes
//! - The select list is parsed after the from clause, so selection items can refer to aliases declared later in
//!   the text.
//! - Unknown entities and attributes are collected and reported together; a syntax error stops parsing.

use metagen_core::lang::keywords::{self, KeywordId};
use metagen_core::lang::primitives::{self, PrimitiveKind};
use metagen_core::lang::types::KnownTypeId;

use super::lexer::{Token, TokenKind};
use super::{ParameterLabel, ParsedQuery, QueryParameter, QuerySyntaxError, SelectionItem, SelectionKind, StatementKind};
use crate::frontend::analysis::paths;
use crate::frontend::diagnostics::Span;
use crate::model::{EntityDescriptor, EntityProvider, TypeRef};

type PResult<T> = Result<T, QuerySyntaxError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AliasSource {
    Root,
    EntityJoin,
    AttributeJoin,
}

#[derive(Debug, Clone)]
struct Alias<'a> {
    /// `None` for an unaliased root.
    name: Option<String>,
    source: AliasSource,
    ty: TypeRef,
    entity: Option<&'a EntityDescriptor>,
}

/// The value of a parsed expression, as far as the parser tracks it.
#[derive(Debug, Clone)]
struct Operand {
    ty: Option<TypeRef>,
    param: Option<usize>,
    kind: SelectionKind,
}

impl Operand {
    fn untyped() -> Self {
        Operand {
            ty: None,
            param: None,
            kind: SelectionKind::Expression,
        }
    }

    fn typed(ty: TypeRef) -> Self {
        Operand {
            ty: Some(ty),
            ..Operand::untyped()
        }
    }

    fn param(index: usize) -> Self {
        Operand {
            param: Some(index),
            ..Operand::untyped()
        }
    }
}

pub struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    provider: &'a dyn EntityProvider,
    implicit_root: Option<&'a str>,
    aliases: Vec<Alias<'a>>,
    parameters: Vec<QueryParameter>,
    errors: Vec<QuerySyntaxError>,
}

impl<'a> Parser<'a> {
    /// ## Parameters
    /// - `tokens`: the lexer output, ending with `Eof`.
    /// - `implicit_root`: qualified entity name to use as the root when the text has no from clause.
    pub fn new(
        text: &'a str,
        tokens: Vec<Token>,
        provider: &'a dyn EntityProvider,
        implicit_root: Option<&'a str>,
    ) -> Self {
        Self {
            text,
            tokens,
            pos: 0,
            provider,
            implicit_root,
            aliases: Vec::new(),
            parameters: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Parse one statement and return its shape, or every error found.
    pub fn parse_statement(mut self) -> Result<ParsedQuery, Vec<QuerySyntaxError>> {
        match self.statement() {
            Ok((kind, selection)) => {
                if !self.errors.is_empty() {
                    return Err(self.errors);
                }
                let mut parameters = self.parameters;
                parameters.sort_by_key(|p| p.span.start);
                Ok(ParsedQuery {
                    kind,
                    selection,
                    parameters,
                })
            }
            Err(error) => {
                self.errors.push(error);
                Err(self.errors)
            }
        }
    }

    // ========================================================================
    // Token handling
    // ========================================================================

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn at_keyword(&self, id: KeywordId) -> bool {
        self.peek().is_keyword(id)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, id: KeywordId) -> bool {
        if self.at_keyword(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> PResult<Span> {
        if self.at(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.syntax_error(format!("expected {what}")))
        }
    }

    fn expect_keyword(&mut self, id: KeywordId) -> PResult<Span> {
        if self.at_keyword(id) {
            Ok(self.advance().span)
        } else {
            Err(self.syntax_error(format!("expected '{}'", keywords::as_str(id))))
        }
    }

    fn syntax_error(&self, message: impl Into<String>) -> QuerySyntaxError {
        let token = self.peek();
        let message = match &token.kind {
            TokenKind::Eof => format!("{} at end of query", message.into()),
            _ => format!("{} near '{}'", message.into(), &self.text[token.span.start..token.span.end]),
        };
        QuerySyntaxError::new(message, self.text, token.span)
    }

    fn semantic_error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(QuerySyntaxError::new(message, self.text, span));
    }

    fn ident(&mut self) -> PResult<(String, Span)> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => Ok((name, self.advance().span)),
            _ => Err(self.syntax_error("expected an identifier")),
        }
    }

    /// An attribute name after a `.`; keywords are allowed here.
    fn attribute_word(&mut self) -> PResult<String> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(id) => {
                self.advance();
                Ok(keywords::as_str(id).to_string())
            }
            _ => Err(self.syntax_error("expected an attribute name")),
        }
    }

    /// A possibly qualified name: `Book` or `org.example.Book`.
    fn dotted_name(&mut self) -> PResult<(String, Span)> {
        let (mut name, mut span) = self.ident()?;
        while self.at(&TokenKind::Dot) {
            self.advance();
            name.push('.');
            name.push_str(&self.attribute_word()?);
            span.end = self.tokens[self.pos - 1].span.end;
        }
        Ok((name, span))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self) -> PResult<(StatementKind, Vec<SelectionItem>)> {
        let result = match &self.peek().kind {
            TokenKind::Keyword(KeywordId::Update) => self.update().map(|()| (StatementKind::Update, Vec::new())),
            TokenKind::Keyword(KeywordId::Delete) => self.delete().map(|()| (StatementKind::Delete, Vec::new())),
            TokenKind::Keyword(KeywordId::Insert) => self.insert().map(|()| (StatementKind::Insert, Vec::new())),
            _ => self.select().map(|selection| (StatementKind::Select, selection)),
        }?;
        if !self.at(&TokenKind::Eof) {
            return Err(self.syntax_error("unexpected token"));
        }
        Ok(result)
    }

    fn select(&mut self) -> PResult<Vec<SelectionItem>> {
        let select_start = self.at_keyword(KeywordId::Select).then_some(self.pos);
        let from_pos = self.find_top_level(KeywordId::From);

        match from_pos {
            Some(from_pos) => {
                self.pos = from_pos;
                self.from_clause()?;
            }
            None => self.implicit_root_entity()?,
        }
        let after_from = self.pos;

        let selection = match select_start {
            Some(start) => {
                self.pos = start + 1;
                self.eat_keyword(KeywordId::Distinct);
                let items = self.select_list()?;
                if let Some(from_pos) = from_pos {
                    if self.pos != from_pos {
                        return Err(self.syntax_error("expected 'from'"));
                    }
                    self.pos = after_from;
                }
                items
            }
            None => {
                if from_pos.is_none() {
                    self.pos = 0;
                }
                vec![self.root_selection()]
            }
        };

        self.restriction()?;
        if self.eat_keyword(KeywordId::Group) {
            self.expect_keyword(KeywordId::By)?;
            loop {
                self.expression()?;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            if self.eat_keyword(KeywordId::Having) {
                self.expression()?;
            }
        }
        self.order_by()?;
        Ok(selection)
    }

    /// Find the position of `keyword` outside parentheses, at or after the current position.
    fn find_top_level(&self, keyword: KeywordId) -> Option<usize> {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match &token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                TokenKind::Keyword(id) if *id == keyword && depth == 0 => return Some(index),
                _ => {}
            }
        }
        None
    }

    fn implicit_root_entity(&mut self) -> PResult<()> {
        let Some(root) = self.implicit_root else {
            return Err(QuerySyntaxError::new(
                "missing from clause",
                self.text,
                Span::new(0, self.text.len()),
            ));
        };
        let Some(entity) = self.provider.resolve(root).filter(|e| e.is_entity()) else {
            return Err(QuerySyntaxError::new(
                format!("could not infer the queried entity from '{root}'"),
                self.text,
                Span::new(0, self.text.len()),
            ));
        };
        self.aliases.push(Alias {
            name: None,
            source: AliasSource::Root,
            ty: TypeRef::declared(entity.qualified_name.clone()),
            entity: Some(entity),
        });
        Ok(())
    }

    fn root_selection(&self) -> SelectionItem {
        match self.aliases.iter().find(|a| a.source == AliasSource::Root) {
            Some(root) => SelectionItem {
                kind: SelectionKind::EntityRoot {
                    entity: root.ty.to_string(),
                },
                java_type: Some(root.ty.clone()),
            },
            None => SelectionItem {
                kind: SelectionKind::Expression,
                java_type: None,
            },
        }
    }

    fn select_list(&mut self) -> PResult<Vec<SelectionItem>> {
        let mut items = Vec::new();
        loop {
            let operand = self.expression()?;
            if self.eat_keyword(KeywordId::As) {
                self.ident()?;
            }
            items.push(SelectionItem {
                kind: operand.kind,
                java_type: operand.ty,
            });
            if !self.eat(&TokenKind::Comma) {
                return Ok(items);
            }
        }
    }

    fn from_clause(&mut self) -> PResult<()> {
        self.expect_keyword(KeywordId::From)?;
        self.root_entity(AliasSource::Root)?;
        loop {
            if self.eat(&TokenKind::Comma) {
                self.root_entity(AliasSource::Root)?;
            } else if self.at_keyword(KeywordId::Join)
                || self.at_keyword(KeywordId::Left)
                || self.at_keyword(KeywordId::Right)
                || self.at_keyword(KeywordId::Inner)
            {
                self.join()?;
            } else {
                return Ok(());
            }
        }
    }

    /// `Entity [as] [alias]`
    fn root_entity(&mut self, source: AliasSource) -> PResult<()> {
        let (name, span) = self.dotted_name()?;
        let entity = self.resolve_entity(&name, span);
        let alias = self.alias()?;
        self.aliases.push(Alias {
            name: alias,
            source,
            ty: entity
                .map(|e| TypeRef::declared(e.qualified_name.clone()))
                .unwrap_or_else(|| TypeRef::declared(name)),
            entity,
        });
        Ok(())
    }

    fn alias(&mut self) -> PResult<Option<String>> {
        if self.eat_keyword(KeywordId::As) {
            return self.ident().map(|(name, _)| Some(name));
        }
        match &self.peek().kind {
            TokenKind::Ident(_) => self.ident().map(|(name, _)| Some(name)),
            _ => Ok(None),
        }
    }

    fn resolve_entity(&mut self, name: &str, span: Span) -> Option<&'a EntityDescriptor> {
        let provider = self.provider;
        let entity = provider
            .resolve_by_mapped_name(name)
            .or_else(|| provider.resolve(name).filter(|e| e.is_entity()));
        if entity.is_none() {
            self.semantic_error(format!("unknown entity '{name}'"), span);
        }
        entity
    }

    fn join(&mut self) -> PResult<()> {
        if self.eat_keyword(KeywordId::Left) || self.eat_keyword(KeywordId::Right) {
            self.eat_keyword(KeywordId::Outer);
        } else {
            self.eat_keyword(KeywordId::Inner);
        }
        self.expect_keyword(KeywordId::Join)?;
        self.eat_keyword(KeywordId::Fetch);

        let (target, span) = self.dotted_name()?;
        let first = target.split('.').next().unwrap_or(&target);
        if target.contains('.') && self.alias_named(first).is_some() {
            let operand = self.path_operand(&target, span);
            let element = operand.ty.as_ref().map(element_type);
            let entity = element
                .as_ref()
                .and_then(TypeRef::erased_name)
                .and_then(|name| self.provider.resolve(name));
            let alias = self.alias()?;
            self.aliases.push(Alias {
                name: alias,
                source: AliasSource::AttributeJoin,
                ty: element.unwrap_or_else(|| TypeRef::declared(target)),
                entity,
            });
        } else {
            let entity = self.resolve_entity(&target, span);
            let alias = self.alias()?;
            self.aliases.push(Alias {
                name: alias,
                source: AliasSource::EntityJoin,
                ty: entity
                    .map(|e| TypeRef::declared(e.qualified_name.clone()))
                    .unwrap_or_else(|| TypeRef::declared(target)),
                entity,
            });
        }
        if self.eat_keyword(KeywordId::On) || self.eat_keyword(KeywordId::With) {
            self.expression()?;
        }
        Ok(())
    }

    fn restriction(&mut self) -> PResult<()> {
        if self.eat_keyword(KeywordId::Where) {
            self.expression()?;
        }
        Ok(())
    }

    fn order_by(&mut self) -> PResult<()> {
        if !self.eat_keyword(KeywordId::Order) {
            return Ok(());
        }
        self.expect_keyword(KeywordId::By)?;
        loop {
            self.expression()?;
            if !self.eat_keyword(KeywordId::Asc) {
                self.eat_keyword(KeywordId::Desc);
            }
            if self.eat_keyword(KeywordId::Nulls) && !self.eat_keyword(KeywordId::First) {
                self.expect_keyword(KeywordId::Last)?;
            }
            if !self.eat(&TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    fn update(&mut self) -> PResult<()> {
        self.expect_keyword(KeywordId::Update)?;
        self.root_entity(AliasSource::Root)?;
        self.expect_keyword(KeywordId::Set)?;
        loop {
            let target = self.primary()?;
            self.expect(&TokenKind::Eq, "'='")?;
            let value = self.expression()?;
            self.infer(&target, &value);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.restriction()
    }

    fn delete(&mut self) -> PResult<()> {
        self.expect_keyword(KeywordId::Delete)?;
        self.eat_keyword(KeywordId::From);
        self.root_entity(AliasSource::Root)?;
        self.restriction()
    }

    fn insert(&mut self) -> PResult<()> {
        self.expect_keyword(KeywordId::Insert)?;
        self.expect_keyword(KeywordId::Into)?;
        let (name, span) = self.dotted_name()?;
        let entity = self.resolve_entity(&name, span);
        self.aliases.push(Alias {
            name: None,
            source: AliasSource::Root,
            ty: TypeRef::declared(entity.map_or(name, |e| e.qualified_name.clone())),
            entity,
        });

        self.expect(&TokenKind::LParen, "'('")?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.primary()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        self.expect_keyword(KeywordId::Values)?;
        loop {
            self.expect(&TokenKind::LParen, "'('")?;
            let mut index = 0;
            loop {
                let value = self.expression()?;
                if let Some(column) = columns.get(index) {
                    self.infer(column, &value);
                }
                index += 1;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            let close = self.expect(&TokenKind::RParen, "')'")?;
            if index != columns.len() {
                self.semantic_error(
                    format!("expected {} values but found {index}", columns.len()),
                    close,
                );
            }
            if !self.eat(&TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> PResult<Operand> {
        let mut lhs = self.conjunction()?;
        while self.eat_keyword(KeywordId::Or) {
            self.conjunction()?;
            lhs = Operand::typed(TypeRef::known(KnownTypeId::Boolean));
        }
        Ok(lhs)
    }

    fn conjunction(&mut self) -> PResult<Operand> {
        let mut lhs = self.negation()?;
        while self.eat_keyword(KeywordId::And) {
            self.negation()?;
            lhs = Operand::typed(TypeRef::known(KnownTypeId::Boolean));
        }
        Ok(lhs)
    }

    fn negation(&mut self) -> PResult<Operand> {
        if self.eat_keyword(KeywordId::Not) {
            self.negation()?;
            return Ok(Operand::typed(TypeRef::known(KnownTypeId::Boolean)));
        }
        self.predicate()
    }

    fn predicate(&mut self) -> PResult<Operand> {
        let lhs = self.additive()?;
        let boolean = || Operand::typed(TypeRef::known(KnownTypeId::Boolean));

        match &self.peek().kind {
            TokenKind::Eq | TokenKind::NotEq | TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => {
                self.advance();
                let rhs = self.additive()?;
                self.infer(&lhs, &rhs);
                return Ok(boolean());
            }
            TokenKind::Keyword(KeywordId::Is) => {
                self.advance();
                self.eat_keyword(KeywordId::Not);
                self.expect_keyword(KeywordId::Null)?;
                return Ok(boolean());
            }
            _ => {}
        }

        let negated = self.at_keyword(KeywordId::Not)
            && matches!(
                self.peek_nth(1),
                TokenKind::Keyword(KeywordId::Like | KeywordId::In | KeywordId::Between)
            );
        if negated {
            self.advance();
        }

        if self.eat_keyword(KeywordId::Like) {
            let pattern = self.additive()?;
            self.infer(&Operand::typed(TypeRef::known(KnownTypeId::String)), &pattern);
            return Ok(boolean());
        }
        if self.eat_keyword(KeywordId::In) {
            if self.eat(&TokenKind::LParen) {
                let mut items = Vec::new();
                loop {
                    let item = self.additive()?;
                    self.infer(&lhs, &item);
                    items.push(item);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "')'")?;
                if let [item] = items.as_slice() {
                    self.mark_multivalued(item);
                }
            } else {
                let list = self.primary()?;
                self.infer(&lhs, &list);
                self.mark_multivalued(&list);
            }
            return Ok(boolean());
        }
        if self.eat_keyword(KeywordId::Between) {
            let low = self.additive()?;
            self.infer(&lhs, &low);
            self.expect_keyword(KeywordId::And)?;
            let high = self.additive()?;
            self.infer(&lhs, &high);
            return Ok(boolean());
        }
        if negated {
            return Err(self.syntax_error("expected 'like', 'in' or 'between'"));
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> PResult<Operand> {
        let mut lhs = self.primary()?;
        loop {
            match &self.peek().kind {
                TokenKind::Concat => {
                    self.advance();
                    let rhs = self.primary()?;
                    let string = Operand::typed(TypeRef::known(KnownTypeId::String));
                    self.infer(&string, &lhs);
                    self.infer(&string, &rhs);
                    lhs = string;
                }
                TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash => {
                    self.advance();
                    let rhs = self.primary()?;
                    self.infer(&lhs, &rhs);
                    self.infer(&rhs, &lhs);
                    lhs = Operand {
                        ty: lhs.ty.or(rhs.ty),
                        param: None,
                        kind: SelectionKind::Expression,
                    };
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn primary(&mut self) -> PResult<Operand> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::NamedParam(name) => {
                self.advance();
                Ok(Operand::param(self.register(ParameterLabel::Named(name), token.span)))
            }
            TokenKind::PositionalParam(n) => {
                self.advance();
                Ok(Operand::param(self.register(ParameterLabel::Positional(n), token.span)))
            }
            TokenKind::Str(_) => {
                self.advance();
                Ok(Operand::typed(TypeRef::known(KnownTypeId::String)))
            }
            TokenKind::Int(_) => {
                self.advance();
                Ok(Operand::typed(TypeRef::known(KnownTypeId::Integer)))
            }
            TokenKind::Float(_) => {
                self.advance();
                Ok(Operand::typed(TypeRef::declared(primitives::boxed_name(PrimitiveKind::Double))))
            }
            TokenKind::Keyword(KeywordId::True | KeywordId::False) => {
                self.advance();
                Ok(Operand::typed(TypeRef::known(KnownTypeId::Boolean)))
            }
            TokenKind::Keyword(KeywordId::Null) => {
                self.advance();
                Ok(Operand::untyped())
            }
            TokenKind::Minus => {
                self.advance();
                self.primary()
            }
            TokenKind::LParen => {
                self.advance();
                if self.at_keyword(KeywordId::Select) {
                    return Err(self.syntax_error("subqueries are not supported"));
                }
                let inner = self.expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Keyword(id) if keywords::is_function(id) && self.peek_nth(1) == &TokenKind::LParen => {
                self.function(id)
            }
            TokenKind::Ident(_) if self.peek_nth(1) == &TokenKind::LParen => {
                self.advance();
                self.arguments()?;
                Ok(Operand::untyped())
            }
            TokenKind::Ident(_) => {
                let (path, span) = self.dotted_name()?;
                Ok(self.path_operand(&path, span))
            }
            _ => Err(self.syntax_error("expected an expression")),
        }
    }

    fn arguments(&mut self) -> PResult<Vec<Operand>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn function(&mut self, id: KeywordId) -> PResult<Operand> {
        self.advance();
        if id == KeywordId::Count {
            self.expect(&TokenKind::LParen, "'('")?;
            if !self.eat(&TokenKind::Star) {
                self.eat_keyword(KeywordId::Distinct);
                self.expression()?;
            }
            self.expect(&TokenKind::RParen, "')'")?;
            return Ok(Operand::typed(TypeRef::known(KnownTypeId::Long)));
        }
        let args = self.arguments()?;
        let ty = match id {
            KeywordId::Avg => Some(TypeRef::declared(primitives::boxed_name(PrimitiveKind::Double))),
            KeywordId::Sum | KeywordId::Min | KeywordId::Max => args.first().and_then(|a| a.ty.clone()),
            KeywordId::Upper | KeywordId::Lower | KeywordId::Concat => {
                let string = Operand::typed(TypeRef::known(KnownTypeId::String));
                for arg in &args {
                    self.infer(&string, arg);
                }
                string.ty
            }
            KeywordId::Length => Some(TypeRef::known(KnownTypeId::Integer)),
            _ => None,
        };
        Ok(Operand {
            ty,
            param: None,
            kind: SelectionKind::Expression,
        })
    }

    // ========================================================================
    // Paths and parameters
    // ========================================================================

    fn alias_named(&self, name: &str) -> Option<&Alias<'a>> {
        self.aliases.iter().find(|a| a.name.as_deref() == Some(name))
    }

    /// Resolve `alias`, `alias.path` or an unqualified `path` against the single root.
    fn path_operand(&mut self, path: &str, span: Span) -> Operand {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        if let Some(alias) = self.alias_named(head).cloned() {
            let Some(rest) = rest else {
                let kind = match alias.source {
                    AliasSource::Root => SelectionKind::EntityRoot {
                        entity: alias.ty.to_string(),
                    },
                    AliasSource::EntityJoin => SelectionKind::EntityJoin {
                        entity: alias.ty.to_string(),
                    },
                    AliasSource::AttributeJoin => SelectionKind::Expression,
                };
                return Operand {
                    ty: Some(alias.ty),
                    param: None,
                    kind,
                };
            };
            return self.attribute_operand(alias.entity, &alias.ty, rest, span);
        }

        let roots: Vec<&Alias<'a>> = self.aliases.iter().filter(|a| a.source == AliasSource::Root).collect();
        let root = match roots.as_slice() {
            [root] => Some((root.entity, root.ty.clone())),
            _ => None,
        };
        match root {
            Some((entity, ty)) => self.attribute_operand(entity, &ty, path, span),
            None => {
                self.semantic_error(format!("could not resolve '{path}'"), span);
                Operand::untyped()
            }
        }
    }

    fn attribute_operand(
        &mut self,
        entity: Option<&'a EntityDescriptor>,
        owner: &TypeRef,
        path: &str,
        span: Span,
    ) -> Operand {
        let Some(entity) = entity else {
            // the owner was already reported as unknown, or is not structured
            if self.errors.is_empty() {
                self.semantic_error(format!("could not resolve attribute '{path}' of '{owner}'"), span);
            }
            return Operand::untyped();
        };
        let resolution = paths::resolve_path(entity, path, self.provider);
        match resolution.terminal {
            Some(member) => Operand::typed(member.type_.boxed()),
            None => {
                self.semantic_error(
                    format!("could not resolve attribute '{path}' of '{}'", entity.qualified_name),
                    span,
                );
                Operand::untyped()
            }
        }
    }

    fn register(&mut self, label: ParameterLabel, span: Span) -> usize {
        if let Some(index) = self.parameters.iter().position(|p| p.label == label) {
            return index;
        }
        self.parameters.push(QueryParameter {
            label,
            java_type: None,
            multivalued: false,
            span,
        });
        self.parameters.len() - 1
    }

    fn mark_multivalued(&mut self, operand: &Operand) {
        if let Some(index) = operand.param {
            self.parameters[index].multivalued = true;
        }
    }

    /// If one side is a parameter of unknown type and the other side is typed, adopt that type.
    fn infer(&mut self, a: &Operand, b: &Operand) {
        for (typed, param) in [(a, b), (b, a)] {
            if let (Some(ty), Some(index)) = (&typed.ty, param.param) {
                let slot = &mut self.parameters[index].java_type;
                if slot.is_none() {
                    *slot = Some(ty.clone());
                }
            }
        }
    }
}

/// The element type of a collection-typed attribute, or the type itself.
fn element_type(ty: &TypeRef) -> TypeRef {
    match ty {
        TypeRef::Declared { args, .. } if !args.is_empty() => args[args.len() - 1].clone(),
        TypeRef::Array(component) => (**component).clone(),
        other => other.clone(),
    }
}
