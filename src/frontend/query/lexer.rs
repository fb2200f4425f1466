//! Lexer for the managed query dialects
//!
//! Produces identifiers (keywords resolved through the keyword registry), literals, parameter tokens and
//! punctuation. The token stream always ends with an `Eof` token.

use metagen_core::lang::keywords::{self, KeywordId};

use super::QuerySyntaxError;
use crate::frontend::diagnostics::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(KeywordId),
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    NamedParam(String),
    PositionalParam(u32),
    LParen,
    RParen,
    Comma,
    Dot,
    Star,
    Plus,
    Minus,
    Slash,
    Concat,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn is_keyword(&self, id: KeywordId) -> bool {
        self.kind == TokenKind::Keyword(id)
    }
}

/// Tokenize query text.
pub fn tokenize(text: &str) -> Result<Vec<Token>, Vec<QuerySyntaxError>> {
    Lexer::new(text).tokenize()
}

struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    tokens: Vec<Token>,
    errors: Vec<QuerySyntaxError>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, Vec<QuerySyntaxError>> {
        while self.peek().is_some() {
            self.scan_token();
        }
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.current_pos, self.current_pos),
        });
        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.current_pos = pos + c.len_utf8();
        Some(c)
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, self.current_pos),
        });
    }

    fn error(&mut self, message: impl Into<String>, start: usize) {
        let span = Span::new(start, self.current_pos.max(start + 1).min(self.source.len()));
        self.errors.push(QuerySyntaxError::new(message, self.source, span));
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.advance();
        }
        out
    }

    fn scan_token(&mut self) {
        let start = self.current_pos;
        let Some(c) = self.advance() else {
            return;
        };
        match c {
            c if c.is_whitespace() => {}
            '(' => self.push(TokenKind::LParen, start),
            ')' => self.push(TokenKind::RParen, start),
            ',' => self.push(TokenKind::Comma, start),
            '.' => self.push(TokenKind::Dot, start),
            '*' => self.push(TokenKind::Star, start),
            '+' => self.push(TokenKind::Plus, start),
            '-' => self.push(TokenKind::Minus, start),
            '/' => self.push(TokenKind::Slash, start),
            '=' => self.push(TokenKind::Eq, start),
            '|' if self.advance_if('|') => self.push(TokenKind::Concat, start),
            '!' if self.advance_if('=') => self.push(TokenKind::NotEq, start),
            '<' => {
                let kind = if self.advance_if('=') {
                    TokenKind::LtEq
                } else if self.advance_if('>') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Lt
                };
                self.push(kind, start);
            }
            '>' => {
                let kind = if self.advance_if('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                };
                self.push(kind, start);
            }
            '\'' => self.string_literal(start),
            ':' => {
                let name = self.take_while(is_ident_char);
                if name.is_empty() {
                    self.error("expected a parameter name after ':'", start);
                } else {
                    self.push(TokenKind::NamedParam(name), start);
                }
            }
            '?' => {
                let digits = self.take_while(|c| c.is_ascii_digit());
                match digits.parse::<u32>() {
                    Ok(n) if n > 0 => self.push(TokenKind::PositionalParam(n), start),
                    _ => self.error("expected an ordinal label after '?'", start),
                }
            }
            c if c.is_ascii_digit() => self.number(c, start),
            c if is_ident_start(c) => {
                let mut word = c.to_string();
                word.push_str(&self.take_while(is_ident_char));
                let kind = match keywords::from_str(&word) {
                    Some(id) => TokenKind::Keyword(id),
                    None => TokenKind::Ident(word),
                };
                self.push(kind, start);
            }
            other => self.error(format!("unexpected character '{other}'"), start),
        }
    }

    fn string_literal(&mut self, start: usize) {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('\'') => {
                    // '' escapes a quote
                    if self.advance_if('\'') {
                        value.push('\'');
                    } else {
                        self.push(TokenKind::Str(value), start);
                        return;
                    }
                }
                Some(c) => value.push(c),
                None => {
                    self.error("unterminated string literal", start);
                    return;
                }
            }
        }
    }

    fn number(&mut self, first: char, start: usize) {
        let mut text = first.to_string();
        text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        let mut is_float = false;
        if self.peek() == Some('.') && self.source[self.current_pos + 1..].starts_with(|c: char| c.is_ascii_digit()) {
            self.advance();
            is_float = true;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        // type suffixes: 1L, 1.0D, 1.0F
        self.take_while(|c| matches!(c, 'L' | 'l' | 'D' | 'd' | 'F' | 'f'));
        let kind = if is_float {
            text.parse().map(TokenKind::Float).ok()
        } else {
            text.parse().map(TokenKind::Int).ok()
        };
        match kind {
            Some(kind) => self.push(kind, start),
            None => self.error(format!("malformed number '{text}'"), start),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("SELECT b FROM Book b"),
            vec![
                TokenKind::Keyword(KeywordId::Select),
                TokenKind::Ident("b".into()),
                TokenKind::Keyword(KeywordId::From),
                TokenKind::Ident("Book".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_parameters_and_operators() {
        assert_eq!(
            kinds("b.isbn <> :isbn and b.pages >= ?1"),
            vec![
                TokenKind::Ident("b".into()),
                TokenKind::Dot,
                TokenKind::Ident("isbn".into()),
                TokenKind::NotEq,
                TokenKind::NamedParam("isbn".into()),
                TokenKind::Keyword(KeywordId::And),
                TokenKind::Ident("b".into()),
                TokenKind::Dot,
                TokenKind::Ident("pages".into()),
                TokenKind::GtEq,
                TokenKind::PositionalParam(1),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("'it''s' 42 1.5 10L"),
            vec![
                TokenKind::Str("it's".into()),
                TokenKind::Int(42),
                TokenKind::Float(1.5),
                TokenKind::Int(10),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_errors_are_collected() {
        let errors = tokenize("select 'open from Book where x = ?").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated"));
        let errors = tokenize("where a = ? and b = #").unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
