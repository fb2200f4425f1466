//! Parameter scanning for native SQL.
//!
//! Native queries are not parsed. The scanner only finds parameter tokens:
//! - `?` (JDBC ordinal, numbered by occurrence), `?n` (labelled ordinal),
//! - `:name` (named).
//!
//! Quoted literals (`'...'`), quoted identifiers (`"..."`), `--` line comments, `/* */` block comments and `::`
//! casts are skipped.

use super::ParameterLabel;
use crate::frontend::diagnostics::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeParameter {
    pub label: ParameterLabel,
    /// A bare JDBC `?`, numbered by occurrence rather than labelled.
    pub jdbc: bool,
    pub span: Span,
}

/// Scan native SQL for parameter tokens, in order of occurrence. Repeated labels are reported once.
pub fn scan_parameters(sql: &str) -> Vec<NativeParameter> {
    let bytes = sql.as_bytes();
    let mut found: Vec<NativeParameter> = Vec::new();
    let mut jdbc_ordinal = 0u32;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 2;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' => {
                let start = i;
                i += 1;
                while i < bytes.len() && is_name_byte(bytes[i]) {
                    i += 1;
                }
                if i > start + 1 && !bytes[start + 1].is_ascii_digit() {
                    push(
                        &mut found,
                        ParameterLabel::Named(sql[start + 1..i].to_string()),
                        false,
                        Span::new(start, i),
                    );
                }
            }
            b'?' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let jdbc = i == start + 1;
                let label = if jdbc {
                    jdbc_ordinal += 1;
                    Some(ParameterLabel::Positional(jdbc_ordinal))
                } else {
                    sql[start + 1..i].parse().ok().map(ParameterLabel::Positional)
                };
                if let Some(label) = label {
                    push(&mut found, label, jdbc, Span::new(start, i));
                }
            }
            _ => i += 1,
        }
    }
    found
}

fn push(found: &mut Vec<NativeParameter>, label: ParameterLabel, jdbc: bool, span: Span) {
    if !found.iter().any(|p| p.label == label) {
        found.push(NativeParameter { label, jdbc, span });
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(sql: &str) -> Vec<ParameterLabel> {
        scan_parameters(sql).into_iter().map(|p| p.label).collect()
    }

    #[test]
    fn test_ordinal_and_named() {
        assert_eq!(
            labels("select * from books where isbn = ?1 and title = ?2"),
            vec![ParameterLabel::Positional(1), ParameterLabel::Positional(2)]
        );
        assert_eq!(
            labels("select * from books where isbn = :isbn or isbn = :isbn"),
            vec![ParameterLabel::Named("isbn".into())]
        );
    }

    #[test]
    fn test_jdbc_placeholders_are_counted() {
        assert_eq!(
            labels("insert into books values (?, ?, ?)"),
            vec![
                ParameterLabel::Positional(1),
                ParameterLabel::Positional(2),
                ParameterLabel::Positional(3)
            ]
        );
        assert!(scan_parameters("values (?)")[0].jdbc);
        assert!(!scan_parameters("values (?1)")[0].jdbc);
    }

    #[test]
    fn test_literals_comments_and_casts_are_skipped() {
        let sql = "select ':no', \"?col\" from t -- :nope ?9\n where x::text = :yes /* ?7 */ and y = ?1";
        assert_eq!(
            labels(sql),
            vec![ParameterLabel::Named("yes".into()), ParameterLabel::Positional(1)]
        );
    }

    #[test]
    fn test_spans_cover_the_token() {
        let sql = "where isbn = :isbn";
        let params = scan_parameters(sql);
        assert_eq!(&sql[params[0].span.start..params[0].span.end], ":isbn");
    }
}
