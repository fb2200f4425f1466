//! Shareable metadata for `metagen_core::lang` registries.
//!
//! The `metagen_core::lang` module is a set of **registry-first** vocabularies. This submodule provides the small,
//! dependency-free metadata types that are reused across all registries.
//!
//! ## Notes
//! - These types are intentionally lightweight and `Copy`-friendly so registries can live in `const` tables.
//! - Metadata is meant for diagnostics and `explain` output; enforcement of rules lives in the analyzer.

/// Identify which API family a vocabulary item belongs to.
///
/// ## Examples
/// ```rust
/// use metagen_core::lang::registry::Origin;
///
/// assert_eq!(Origin::JakartaData.label(), "Jakarta Data");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Jakarta Persistence (`jakarta.persistence.*`).
    Persistence,
    /// Hibernate ORM (`org.hibernate.*`).
    Hibernate,
    /// Hibernate Reactive with Mutiny.
    Reactive,
    /// Jakarta Data (`jakarta.data.*`).
    JakartaData,
    /// Jakarta Bean Validation.
    Validation,
    /// The Java standard library.
    Jdk,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Persistence => "Jakarta Persistence",
            Origin::Hibernate => "Hibernate ORM",
            Origin::Reactive => "Hibernate Reactive",
            Origin::JakartaData => "Jakarta Data",
            Origin::Validation => "Bean Validation",
            Origin::Jdk => "JDK",
        }
    }
}

/// Describe the lifecycle status of a vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Incubating,
    Deprecated,
}

/// Shared metadata shape for “registry-first” vocabulary items.
///
/// Every registry entry carries:
/// - stable identity (`id`)
/// - accepted spellings (`canonical` + `aliases`), fully qualified for type and annotation names
/// - documentation (`description`)
/// - provenance (`origin`, `stability`)
///
/// Registries that need extra per-item data wrap this struct in an “extension” info type.
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub origin: Origin,
    pub stability: Stability,
}

impl<Id: Copy> LangItemInfo<Id> {
    /// Check whether `name` is the canonical spelling or one of the aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.canonical == name || self.aliases.contains(&name)
    }

    /// The unqualified spelling (`Id` for `jakarta.persistence.Id`).
    pub fn simple_name(&self) -> &'static str {
        crate::simple_name(self.canonical)
    }
}

/// Resolve a spelling against a registry table (canonical spellings take priority over aliases).
pub(crate) fn lookup<Id: Copy>(table: &[LangItemInfo<Id>], name: &str) -> Option<Id> {
    if let Some(info) = table.iter().find(|i| i.canonical == name) {
        return Some(info.id);
    }
    table
        .iter()
        .find(|i| {
            let aliases: &[&str] = i.aliases;
            aliases.contains(&name)
        })
        .map(|i| i.id)
}
