//! Annotation vocabulary registry.
//!
//! This module centralizes every annotation type the generator reacts to, so downstream code never compares raw
//! qualified names.
//!
//! ## Notes
//! - Canonical spellings are the `jakarta.*` names; `javax.*` spellings are accepted as aliases.
//! - Annotations that are not in this registry are carried through the model untouched but never drive behavior.

use crate::lang::registry::{self, LangItemInfo, Origin, Stability};

/// Stable identifier for recognized annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationId {
    // Mapping
    Entity,
    Embeddable,
    MappedSuperclass,
    Id,
    EmbeddedId,
    IdClass,
    NaturalId,
    Basic,
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
    ElementCollection,
    Transient,
    NotNull,
    // Query drivers
    Hql,
    Sql,
    Find,
    DataFind,
    DataQuery,
    // Lifecycle
    Insert,
    Update,
    Delete,
    Save,
    // Repository and parameter markers
    Repository,
    By,
    Param,
    OrderBy,
    OrderByList,
}

/// Named annotation member holding the main value (`@HQL("...")`, `@By("...")`).
pub const VALUE_MEMBER: &str = "value";

/// Named member of `@Find` listing fetch profiles to enable.
pub const ENABLED_FETCH_PROFILES_MEMBER: &str = "enabledFetchProfiles";

/// Named member of `@Basic`, `@ManyToOne` and `@OneToOne` declaring optionality.
pub const OPTIONAL_MEMBER: &str = "optional";

/// Named member of `@Entity` overriding the mapped entity name.
pub const NAME_MEMBER: &str = "name";

/// Named member of `@OrderBy` requesting descending order.
pub const DESCENDING_MEMBER: &str = "descending";

/// Named member of `@OrderBy` requesting case-insensitive order.
pub const IGNORE_CASE_MEMBER: &str = "ignoreCase";

/// Named member of `@Repository` naming the data store.
pub const DATA_STORE_MEMBER: &str = "dataStore";

/// Metadata entry for an annotation.
pub type AnnotationInfo = LangItemInfo<AnnotationId>;

/// Registry of recognized annotations.
pub const ANNOTATIONS: &[AnnotationInfo] = &[
    persistence(AnnotationId::Entity, "jakarta.persistence.Entity", &["javax.persistence.Entity"], "Marks an entity type."),
    persistence(
        AnnotationId::Embeddable,
        "jakarta.persistence.Embeddable",
        &["javax.persistence.Embeddable"],
        "Marks an embeddable value type.",
    ),
    persistence(
        AnnotationId::MappedSuperclass,
        "jakarta.persistence.MappedSuperclass",
        &["javax.persistence.MappedSuperclass"],
        "Marks a mapped superclass.",
    ),
    persistence(AnnotationId::Id, "jakarta.persistence.Id", &["javax.persistence.Id"], "Identifier attribute."),
    persistence(
        AnnotationId::EmbeddedId,
        "jakarta.persistence.EmbeddedId",
        &["javax.persistence.EmbeddedId"],
        "Embedded composite identifier attribute.",
    ),
    persistence(
        AnnotationId::IdClass,
        "jakarta.persistence.IdClass",
        &["javax.persistence.IdClass"],
        "Identifier class of an entity with a composite key.",
    ),
    info(
        AnnotationId::NaturalId,
        "org.hibernate.annotations.NaturalId",
        &[],
        "Natural-key attribute.",
        Origin::Hibernate,
    ),
    persistence(AnnotationId::Basic, "jakarta.persistence.Basic", &["javax.persistence.Basic"], "Basic attribute."),
    persistence(
        AnnotationId::ManyToOne,
        "jakarta.persistence.ManyToOne",
        &["javax.persistence.ManyToOne"],
        "Single-valued association.",
    ),
    persistence(
        AnnotationId::OneToOne,
        "jakarta.persistence.OneToOne",
        &["javax.persistence.OneToOne"],
        "Single-valued association.",
    ),
    persistence(
        AnnotationId::OneToMany,
        "jakarta.persistence.OneToMany",
        &["javax.persistence.OneToMany"],
        "Many-valued association.",
    ),
    persistence(
        AnnotationId::ManyToMany,
        "jakarta.persistence.ManyToMany",
        &["javax.persistence.ManyToMany"],
        "Many-valued association.",
    ),
    persistence(
        AnnotationId::ElementCollection,
        "jakarta.persistence.ElementCollection",
        &["javax.persistence.ElementCollection"],
        "Collection of basic or embeddable values.",
    ),
    persistence(
        AnnotationId::Transient,
        "jakarta.persistence.Transient",
        &["javax.persistence.Transient"],
        "Non-persistent member.",
    ),
    info(
        AnnotationId::NotNull,
        "jakarta.validation.constraints.NotNull",
        &["javax.validation.constraints.NotNull"],
        "Not-null constraint.",
        Origin::Validation,
    ),
    info(
        AnnotationId::Hql,
        "org.hibernate.annotations.processing.HQL",
        &[],
        "Method executing an HQL query.",
        Origin::Hibernate,
    ),
    info(
        AnnotationId::Sql,
        "org.hibernate.annotations.processing.SQL",
        &[],
        "Method executing a native SQL query.",
        Origin::Hibernate,
    ),
    info(
        AnnotationId::Find,
        "org.hibernate.annotations.processing.Find",
        &[],
        "Finder method matching parameters to attributes.",
        Origin::Hibernate,
    ),
    data(AnnotationId::DataFind, "jakarta.data.repository.Find", "Finder method matching parameters to attributes."),
    data(AnnotationId::DataQuery, "jakarta.data.repository.Query", "Method executing a JDQL query."),
    data(AnnotationId::Insert, "jakarta.data.repository.Insert", "Lifecycle method inserting entities."),
    data(AnnotationId::Update, "jakarta.data.repository.Update", "Lifecycle method updating entities."),
    data(AnnotationId::Delete, "jakarta.data.repository.Delete", "Lifecycle method deleting entities."),
    data(AnnotationId::Save, "jakarta.data.repository.Save", "Lifecycle method upserting entities."),
    data(AnnotationId::Repository, "jakarta.data.repository.Repository", "Jakarta Data repository interface."),
    data(AnnotationId::By, "jakarta.data.repository.By", "Binds a finder parameter to an attribute path."),
    data(AnnotationId::Param, "jakarta.data.repository.Param", "Binds a parameter to a named query parameter."),
    data(AnnotationId::OrderBy, "jakarta.data.repository.OrderBy", "Static ordering of results."),
    data(AnnotationId::OrderByList, "jakarta.data.repository.OrderBy.List", "Container for repeated @OrderBy."),
];

/// Resolve an annotation type name to its stable id.
pub fn from_str(name: &str) -> Option<AnnotationId> {
    registry::lookup(ANNOTATIONS, name)
}

/// Return the canonical spelling for an annotation.
pub fn as_str(id: AnnotationId) -> &'static str {
    info_for(id).canonical
}

/// Return the metadata entry for an annotation.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: AnnotationId) -> &'static AnnotationInfo {
    ANNOTATIONS
        .iter()
        .find(|a| a.id == id)
        .expect("annotation info missing")
}

/// Annotations that make a method a query-text method.
pub const QUERY_TEXT_DRIVERS: &[AnnotationId] = &[AnnotationId::Hql, AnnotationId::Sql, AnnotationId::DataQuery];

/// Annotations that make a method a finder method.
pub const FINDER_DRIVERS: &[AnnotationId] = &[AnnotationId::Find, AnnotationId::DataFind];

/// Annotations that make a method a lifecycle method.
pub const LIFECYCLE_DRIVERS: &[AnnotationId] = &[
    AnnotationId::Insert,
    AnnotationId::Update,
    AnnotationId::Delete,
    AnnotationId::Save,
];

/// Annotations whose presence makes a member a lookup-illegal collection.
pub const COLLECTION_MAPPINGS: &[AnnotationId] = &[
    AnnotationId::OneToMany,
    AnnotationId::ManyToMany,
    AnnotationId::ElementCollection,
];

/// Annotations designating an identifier member.
pub const IDENTIFIER_MAPPINGS: &[AnnotationId] = &[AnnotationId::Id, AnnotationId::EmbeddedId];

/// Annotations whose `optional = false` makes a member non-nullable.
pub const OPTIONALITY_MAPPINGS: &[AnnotationId] =
    &[AnnotationId::Basic, AnnotationId::ManyToOne, AnnotationId::OneToOne];

const fn info(
    id: AnnotationId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    origin: Origin,
) -> AnnotationInfo {
    LangItemInfo {
        id,
        canonical,
        aliases,
        description,
        origin,
        stability: Stability::Stable,
    }
}

const fn persistence(
    id: AnnotationId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
) -> AnnotationInfo {
    info(id, canonical, aliases, description, Origin::Persistence)
}

const fn data(id: AnnotationId, canonical: &'static str, description: &'static str) -> AnnotationInfo {
    info(id, canonical, &[], description, Origin::JakartaData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_canonical_id() {
        assert_eq!(from_str("javax.persistence.ManyToMany"), Some(AnnotationId::ManyToMany));
        assert_eq!(as_str(AnnotationId::ManyToMany), "jakarta.persistence.ManyToMany");
    }

    #[test]
    fn test_unknown_annotation_is_none() {
        assert_eq!(from_str("org.example.Custom"), None);
        // simple names are never accepted
        assert_eq!(from_str("Entity"), None);
    }

    #[test]
    fn test_driver_sets_are_disjoint() {
        for id in QUERY_TEXT_DRIVERS {
            assert!(!FINDER_DRIVERS.contains(id));
            assert!(!LIFECYCLE_DRIVERS.contains(id));
        }
        for id in FINDER_DRIVERS {
            assert!(!LIFECYCLE_DRIVERS.contains(id));
        }
    }
}
