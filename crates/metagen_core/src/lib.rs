//! Provide the canonical vocabulary and pure naming/type helpers shared by the metagen analyzer and synthesizer.
//!
//! This crate is intentionally small and dependency-free. It contains deterministic helpers that both:
//! - the analyzer uses to classify declarations (annotation names, known library types, session handles), and
//! - the synthesizer uses to spell the same names in emitted source.
//!
//! ## Notes
//!
//! - This is a “vocabulary core” crate: **no IO**, no global state, and no model types.
//! - Every recognized marker name lives in a registry under [`lang`]; callers normalize a raw qualified name to a
//!   stable id once, at the boundary, and match on ids afterwards.

pub mod lang;

use lang::primitives;

/// Sentinel type name used when a query parameter type could not be determined.
pub const UNKNOWN_TYPE_NAME: &str = "unknown";

/// Placeholder token a host emits for an annotation value it has not resolved yet.
pub const ERROR_PLACEHOLDER: &str = "<error>";

/// Check whether `name` starts with `prefix` and has at least one character after it.
///
/// ## Examples
/// ```rust
/// use metagen_core::has_prefix;
///
/// assert!(has_prefix("getTitle", "get"));
/// assert!(!has_prefix("get", "get"));
/// ```
pub fn has_prefix(name: &str, prefix: &str) -> bool {
    name.len() > prefix.len() && name.starts_with(prefix)
}

/// Decapitalize a name with JavaBeans rules.
///
/// The first character is lowercased unless the first two characters are both uppercase
/// (`URL` stays `URL`).
///
/// ## Examples
/// ```rust
/// use metagen_core::decapitalize;
///
/// assert_eq!(decapitalize("Title"), "title");
/// assert_eq!(decapitalize("URL"), "URL");
/// assert_eq!(decapitalize(""), "");
/// ```
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if first.is_uppercase() && chars.next().is_some_and(char::is_uppercase) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    out.extend(first.to_lowercase());
    out.push_str(&name[first.len_utf8()..]);
    out
}

/// Derive the property name of a JavaBeans-style getter.
///
/// ## Returns
/// - `Some(name)` for `getX`/`isX` (prefix stripped, remainder decapitalized).
/// - `None` when the method name carries neither prefix.
///
/// ## Examples
/// ```rust
/// use metagen_core::getter_property_name;
///
/// assert_eq!(getter_property_name("getIsbn").as_deref(), Some("isbn"));
/// assert_eq!(getter_property_name("isPublished").as_deref(), Some("published"));
/// assert_eq!(getter_property_name("title"), None);
/// ```
pub fn getter_property_name(method_name: &str) -> Option<String> {
    if has_prefix(method_name, "get") {
        Some(decapitalize(&method_name[3..]))
    } else if has_prefix(method_name, "is") {
        Some(decapitalize(&method_name[2..]))
    } else {
        None
    }
}

/// Check whether a value of type `arg_type` may be bound where `param_type` is expected.
///
/// Accepts an exact match, a primitive on either side whose boxed form is the other side, or an
/// undeterminable expected type ([`UNKNOWN_TYPE_NAME`]).
///
/// ## Examples
/// ```rust
/// use metagen_core::is_legal_assignment;
///
/// assert!(is_legal_assignment("int", "java.lang.Integer"));
/// assert!(is_legal_assignment("java.lang.String", "unknown"));
/// assert!(!is_legal_assignment("java.lang.String", "java.lang.Integer"));
/// ```
pub fn is_legal_assignment(arg_type: &str, param_type: &str) -> bool {
    param_type == UNKNOWN_TYPE_NAME
        || param_type == arg_type
        || primitives::from_str(arg_type).is_some_and(|p| primitives::boxed_name(p) == param_type)
        || primitives::from_str(param_type).is_some_and(|p| primitives::boxed_name(p) == arg_type)
}

/// Check whether query text starts with a mutation keyword (`update`, `delete`, `insert`).
///
/// Only the first six characters of the trimmed text are inspected, case-insensitively.
pub fn is_mutation_query(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() <= 6 || !trimmed.is_char_boundary(6) {
        return false;
    }
    let keyword = &trimmed[..6];
    ["update", "delete", "insert"]
        .iter()
        .any(|k| keyword.eq_ignore_ascii_case(k))
}

/// Check whether a raw annotation value still carries the host's placeholder token.
pub fn is_placeholder(value: &str) -> bool {
    value.contains(ERROR_PLACEHOLDER)
}

/// Normalize a path-like name: `$` and `_` both separate path segments.
///
/// ## Examples
/// ```rust
/// use metagen_core::normalize_path_name;
///
/// assert_eq!(normalize_path_name("address_city"), "address.city");
/// assert_eq!(normalize_path_name("address$city"), "address.city");
/// ```
pub fn normalize_path_name(name: &str) -> String {
    name.replace(['$', '_'], ".")
}

/// Return the simple (unqualified) part of a qualified name, ignoring type arguments.
pub fn simple_name(qualified: &str) -> &str {
    let base = qualified.split('<').next().unwrap_or(qualified);
    base.rsplit('.').next().unwrap_or(base)
}

/// Return the package part of a qualified name (empty for the default package).
pub fn package_name(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(idx) => &qualified[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decapitalize_rules() {
        assert_eq!(decapitalize("Isbn10"), "isbn10");
        assert_eq!(decapitalize("ISBN"), "ISBN");
        assert_eq!(decapitalize("a"), "a");
        assert_eq!(decapitalize("X"), "x");
    }

    #[test]
    fn test_getter_prefix_requires_remainder() {
        assert_eq!(getter_property_name("get"), None);
        assert_eq!(getter_property_name("is"), None);
        assert_eq!(getter_property_name("getURL").as_deref(), Some("URL"));
    }

    #[test]
    fn test_legal_assignment_boxing() {
        assert!(is_legal_assignment("long", "java.lang.Long"));
        assert!(is_legal_assignment("java.lang.Long", "long"));
        assert!(is_legal_assignment("java.lang.Long", "java.lang.Long"));
        assert!(!is_legal_assignment("int", "java.lang.Long"));
        assert!(!is_legal_assignment("long", "int"));
    }

    #[test]
    fn test_mutation_detection() {
        assert!(is_mutation_query("  UPDATE Book set title = :t"));
        assert!(is_mutation_query("delete from Book"));
        assert!(is_mutation_query("insert into Book (isbn) values (:i)"));
        assert!(!is_mutation_query("select b from Book b"));
        assert!(!is_mutation_query("delete"));
    }

    #[test]
    fn test_simple_and_package_names() {
        assert_eq!(simple_name("org.example.Book"), "Book");
        assert_eq!(simple_name("java.util.List<org.example.Book>"), "List");
        assert_eq!(package_name("org.example.Book"), "org.example");
        assert_eq!(package_name("Book"), "");
    }
}
