//! Import and name qualification for generated source.
//!
//! Emitters spell every type through [`ImportContext::import_type`], which returns the shortest unambiguous
//! spelling and records the import it needs:
//! - `java.lang` types and types of the generated class's own package need no import;
//! - a nested type imports its outermost class (`Mutiny.Session`);
//! - a simple name already taken by another type stays fully qualified.
//!
//! Qualification is cosmetic. A name that cannot be shortened is simply left qualified.

use std::collections::{BTreeMap, BTreeSet};

const JAVA_LANG: &str = "java.lang";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportContext {
    package: String,
    /// simple name -> qualified name of the type imported under it
    imported: BTreeMap<String, String>,
    /// imports needed by the member being emitted
    recorded: BTreeSet<String>,
}

impl ImportContext {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Shorten every qualified name inside a Java type spelling (`java.util.List<org.example.Book>[]`).
    pub fn import_type(&mut self, spelling: &str) -> String {
        let mut out = String::with_capacity(spelling.len());
        let mut token = String::new();
        for c in spelling.chars() {
            if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
                token.push(c);
            } else {
                self.flush(&mut token, &mut out);
                out.push(c);
            }
        }
        self.flush(&mut token, &mut out);
        out
    }

    fn flush(&mut self, token: &mut String, out: &mut String) {
        if token.is_empty() {
            return;
        }
        if token.contains('.') {
            let short = self.shorten(token);
            out.push_str(&short);
        } else {
            out.push_str(token);
        }
        token.clear();
    }

    fn shorten(&mut self, qualified: &str) -> String {
        let segments: Vec<&str> = qualified.split('.').collect();
        let Some(outer_index) = segments
            .iter()
            .position(|s| s.chars().next().is_some_and(char::is_uppercase))
        else {
            return qualified.to_string();
        };
        if outer_index == 0 {
            return qualified.to_string();
        }
        let package = segments[..outer_index].join(".");
        let simple = segments[outer_index];
        let outer = segments[..=outer_index].join(".");
        let short = segments[outer_index..].join(".");

        match self.imported.get(simple) {
            Some(existing) if *existing == outer => {
                if package != JAVA_LANG && package != self.package {
                    self.recorded.insert(outer);
                }
                short
            }
            Some(_) => qualified.to_string(),
            None if package == JAVA_LANG || package == self.package => short,
            None => {
                self.imported.insert(simple.to_string(), outer.clone());
                self.recorded.insert(outer);
                short
            }
        }
    }

    /// Register an import made elsewhere (by a merged metamodel).
    pub fn add_import(&mut self, qualified: &str) {
        let simple = metagen_core::simple_name(qualified).to_string();
        self.imported.entry(simple).or_insert_with(|| qualified.to_string());
    }

    /// Imports recorded since the last call.
    pub fn take_recorded(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.recorded)
    }

    /// Every import statement the generated class needs, sorted.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        let mut all: Vec<&str> = self
            .imported
            .values()
            .map(String::as_str)
            .filter(|q| metagen_core::package_name(q) != self.package)
            .collect();
        all.sort_unstable();
        all.into_iter()
    }
}
