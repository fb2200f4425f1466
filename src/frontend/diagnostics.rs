//! Diagnostics and error reporting for metagen
//!
//! Every validation failure becomes a [`Diagnostic`] keyed to a repository method, and optionally to one of its
//! parameters or annotations. Diagnostics flow through a [`DiagnosticsSink`]; the sink never influences generation.

use std::fmt;

use metagen_core::lang::annotations::{self, AnnotationId};

/// A byte range inside query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// Where a diagnostic points: a declaration, and optionally a parameter or annotation of it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub repository: String,
    pub method: Option<String>,
    pub parameter: Option<String>,
    pub annotation: Option<AnnotationId>,
}

impl Location {
    pub fn repository(name: impl Into<String>) -> Self {
        Self {
            repository: name.into(),
            ..Self::default()
        }
    }

    pub fn method(repository: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            method: Some(method.into()),
            ..Self::default()
        }
    }

    pub fn at_parameter(&self, parameter: impl Into<String>) -> Self {
        Self {
            parameter: Some(parameter.into()),
            ..self.clone()
        }
    }

    pub fn at_annotation(&self, annotation: AnnotationId) -> Self {
        Self {
            annotation: Some(annotation),
            ..self.clone()
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(metagen_core::simple_name(&self.repository))?;
        if let Some(method) = &self.method {
            write!(f, ".{method}()")?;
        }
        if let Some(parameter) = &self.parameter {
            write!(f, " parameter '{parameter}'")?;
        }
        if let Some(annotation) = self.annotation {
            write!(f, " @{}", annotations::info_for(annotation).simple_name())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A structured report with location information
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub location: Location,
    pub severity: Severity,
    /// Query text and the offending range inside it, when the problem is in an embedded query.
    pub source: Option<(String, Span)>,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
            severity,
            source: None,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Error, message, location)
    }

    pub fn warning(message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Warning, message, location)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn with_source(mut self, text: impl Into<String>, span: Span) -> Self {
        self.source = Some((text.into(), span));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.severity, self.message, self.location)
    }
}

/// Receives diagnostics. Reporting is fire-and-forget.
pub trait DiagnosticsSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A sink that keeps everything it receives, in report order.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticsSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(%diagnostic, "reported");
        self.diagnostics.push(diagnostic);
    }
}

impl DiagnosticsSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Print a diagnostic with its location and, for query problems, the query line with a caret.
pub fn print_diagnostic(file_name: &str, diagnostic: &Diagnostic) {
    let red = "\x1b[31m";
    let cyan = "\x1b[36m";
    let yellow = "\x1b[33m";
    let bold = "\x1b[1m";
    let reset = "\x1b[0m";

    let kind_color = match diagnostic.severity {
        Severity::Error => red,
        Severity::Warning | Severity::Note => yellow,
    };

    eprintln!(
        "{bold}{kind_color}{kind}{reset}{bold}: {message}{reset}",
        kind = diagnostic.severity,
        message = diagnostic.message,
    );
    eprintln!("  {cyan}-->{reset} {file_name}: {}", diagnostic.location);

    if let Some((text, span)) = &diagnostic.source {
        let (line_num, col_num, line_text) = get_line_info(text, span.start);
        let width = line_num.to_string().len();
        eprintln!("  {cyan}{:>width$} |{reset}", "");
        eprintln!("  {cyan}{line_num:>width$} |{reset} {line_text}");
        let underline = span.len().clamp(1, line_text.len().saturating_sub(col_num - 1).max(1));
        eprintln!(
            "  {cyan}{:>width$} |{reset} {}{kind_color}{}{reset}",
            "",
            " ".repeat(col_num - 1),
            "^".repeat(underline),
        );
    }

    for note in &diagnostic.notes {
        eprintln!("  {cyan}= note:{reset} {note}");
    }
    for hint in &diagnostic.hints {
        eprintln!("  {cyan}= hint:{reset} {hint}");
    }
    eprintln!();
}

/// Get line number, column number, and line text for a byte offset
fn get_line_info(source: &str, offset: usize) -> (usize, usize, &str) {
    let offset = offset.min(source.len());
    let mut line_num = 1;
    let mut line_start = 0;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }

    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());

    (line_num, offset - line_start + 1, &source[line_start..line_end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::method("org.example.Library", "findByIsbn").at_parameter("isbn");
        assert_eq!(loc.to_string(), "Library.findByIsbn() parameter 'isbn'");
        let loc = Location::method("org.example.Library", "titles").at_annotation(AnnotationId::Hql);
        assert_eq!(loc.to_string(), "Library.titles() @HQL");
    }

    #[test]
    fn test_collecting_sink_separates_errors() {
        let mut sink = CollectingSink::new();
        sink.report(Diagnostic::warning("deferred too often", Location::repository("Library")));
        assert!(!sink.has_errors());
        sink.report(Diagnostic::error("missing parameter", Location::repository("Library")).with_hint("add one"));
        assert!(sink.has_errors());
        assert_eq!(sink.messages(), vec!["deferred too often", "missing parameter"]);
    }

    #[test]
    fn test_line_info_on_multiline_query() {
        let text = "select b\nfrom Book b\nwhere b.isbn = :isbn";
        let offset = text.find(":isbn").unwrap();
        let (line, col, line_text) = get_line_info(text, offset);
        assert_eq!(line, 3);
        assert_eq!(col, 16);
        assert_eq!(line_text, "where b.isbn = :isbn");
    }
}
