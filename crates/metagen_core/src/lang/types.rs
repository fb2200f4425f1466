//! Well-known library type vocabulary.
//!
//! This registry covers the declared types whose *names* carry meaning for the generator: result containers,
//! paging and ordering request types, query objects, reactive wrappers and session handles.
//!
//! ## Notes
//! - Lookup via [`from_str`] takes an erased qualified name (no type arguments).
//! - This module is vocabulary only (spellings + metadata), not type-system semantics.
//!
//! ## Examples
//! ```rust
//! use metagen_core::lang::types::{self, KnownTypeId};
//!
//! assert_eq!(types::from_str("java.util.List"), Some(KnownTypeId::List));
//! assert!(types::is_ordering(KnownTypeId::Sort));
//! assert!(types::is_paging(KnownTypeId::PageRequest));
//! ```

use crate::lang::registry::{self, LangItemInfo, Origin, Stability};

/// Stable identifier for well-known library types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnownTypeId {
    // JDK
    Object,
    String,
    Integer,
    Long,
    Boolean,
    Void,
    Iterable,
    List,
    Map,
    Stream,
    Optional,
    // Persistence
    Tuple,
    JpaQuery,
    TypedQuery,
    EntityManager,
    // Hibernate
    HibQuery,
    SelectionQuery,
    KeyedResultList,
    KeyedPage,
    HibPage,
    HibOrder,
    Session,
    StatelessSession,
    // Reactive
    Uni,
    MutinySession,
    // Jakarta Data
    DataPage,
    CursoredPage,
    PageRequest,
    Limit,
    DataOrder,
    Sort,
}

/// Metadata entry for a known type.
pub type KnownTypeInfo = LangItemInfo<KnownTypeId>;

/// Registry of well-known library types.
pub const KNOWN_TYPES: &[KnownTypeInfo] = &[
    jdk(KnownTypeId::Object, "java.lang.Object", "Root object type."),
    jdk(KnownTypeId::String, "java.lang.String", "String type."),
    jdk(KnownTypeId::Integer, "java.lang.Integer", "Boxed int."),
    jdk(KnownTypeId::Long, "java.lang.Long", "Boxed long."),
    jdk(KnownTypeId::Boolean, "java.lang.Boolean", "Boxed boolean."),
    jdk(KnownTypeId::Void, "java.lang.Void", "Boxed void."),
    jdk(KnownTypeId::Iterable, "java.lang.Iterable", "Iterable collection of values."),
    jdk(KnownTypeId::List, "java.util.List", "Ordered sequence result container."),
    jdk(KnownTypeId::Map, "java.util.Map", "Key/value projection result."),
    jdk(KnownTypeId::Stream, "java.util.stream.Stream", "Lazy sequence result container."),
    jdk(KnownTypeId::Optional, "java.util.Optional", "Optional single-value result container."),
    persistence(
        KnownTypeId::Tuple,
        "jakarta.persistence.Tuple",
        &["javax.persistence.Tuple"],
        "Untyped projection result.",
    ),
    persistence(
        KnownTypeId::JpaQuery,
        "jakarta.persistence.Query",
        &["javax.persistence.Query"],
        "Untyped query object.",
    ),
    persistence(
        KnownTypeId::TypedQuery,
        "jakarta.persistence.TypedQuery",
        &["javax.persistence.TypedQuery"],
        "Typed query object.",
    ),
    persistence(
        KnownTypeId::EntityManager,
        "jakarta.persistence.EntityManager",
        &["javax.persistence.EntityManager"],
        "Persistence context handle.",
    ),
    hibernate(KnownTypeId::HibQuery, "org.hibernate.query.Query", "Hibernate query object."),
    hibernate(KnownTypeId::SelectionQuery, "org.hibernate.query.SelectionQuery", "Hibernate selection query object."),
    hibernate(KnownTypeId::KeyedResultList, "org.hibernate.query.KeyedResultList", "Key-based pagination result."),
    hibernate(KnownTypeId::KeyedPage, "org.hibernate.query.KeyedPage", "Key-based pagination request."),
    hibernate(KnownTypeId::HibPage, "org.hibernate.query.Page", "Offset pagination request."),
    hibernate(KnownTypeId::HibOrder, "org.hibernate.query.Order", "Dynamic ordering request."),
    hibernate(KnownTypeId::Session, "org.hibernate.Session", "Stateful session handle."),
    hibernate(KnownTypeId::StatelessSession, "org.hibernate.StatelessSession", "Stateless session handle."),
    reactive(KnownTypeId::Uni, "io.smallrye.mutiny.Uni", "Asynchronous single-value wrapper."),
    reactive(
        KnownTypeId::MutinySession,
        "org.hibernate.reactive.mutiny.Mutiny.Session",
        "Reactive session handle.",
    ),
    data(KnownTypeId::DataPage, "jakarta.data.page.Page", "Paginated result container."),
    data(KnownTypeId::CursoredPage, "jakarta.data.page.CursoredPage", "Cursor-paginated result container."),
    data(KnownTypeId::PageRequest, "jakarta.data.page.PageRequest", "Pagination request."),
    data(KnownTypeId::Limit, "jakarta.data.Limit", "Result-count limit."),
    data(KnownTypeId::DataOrder, "jakarta.data.Order", "Ordering request made of sorts."),
    data(KnownTypeId::Sort, "jakarta.data.Sort", "Single sort criterion."),
];

/// Containers allowed as a raw (non-generic) query-method return type.
pub const LEGAL_RAW_RESULT_TYPES: &[KnownTypeId] = &[KnownTypeId::List, KnownTypeId::JpaQuery, KnownTypeId::HibQuery];

/// Containers allowed as a generic query-method return type.
pub const LEGAL_GENERIC_RESULT_TYPES: &[KnownTypeId] = &[
    KnownTypeId::List,
    KnownTypeId::Stream,
    KnownTypeId::Optional,
    KnownTypeId::TypedQuery,
    KnownTypeId::HibQuery,
    KnownTypeId::SelectionQuery,
    KnownTypeId::KeyedResultList,
    KnownTypeId::DataPage,
    KnownTypeId::CursoredPage,
];

/// Projection result types accepted without constructor matching.
pub const UNTYPED_PROJECTIONS: &[KnownTypeId] = &[KnownTypeId::Tuple, KnownTypeId::List, KnownTypeId::Map];

/// Resolve an erased qualified type name to its stable id.
pub fn from_str(name: &str) -> Option<KnownTypeId> {
    registry::lookup(KNOWN_TYPES, name)
}

/// Return the canonical qualified name of a known type.
pub fn as_str(id: KnownTypeId) -> &'static str {
    info_for(id).canonical
}

/// Return the unqualified name of a known type.
pub fn simple_name(id: KnownTypeId) -> &'static str {
    info_for(id).simple_name()
}

/// Return the metadata entry for a known type.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KnownTypeId) -> &'static KnownTypeInfo {
    KNOWN_TYPES
        .iter()
        .find(|t| t.id == id)
        .expect("known type info missing")
}

/// Check whether a type is an ordering request (`Order`, `Sort`).
pub fn is_ordering(id: KnownTypeId) -> bool {
    matches!(id, KnownTypeId::HibOrder | KnownTypeId::DataOrder | KnownTypeId::Sort)
}

/// Check whether a type is a paging request (`Page`, `PageRequest`, `Limit`, `KeyedPage`).
pub fn is_paging(id: KnownTypeId) -> bool {
    matches!(
        id,
        KnownTypeId::HibPage | KnownTypeId::PageRequest | KnownTypeId::Limit | KnownTypeId::KeyedPage
    )
}

/// Check whether a type is a session handle.
pub fn is_session(id: KnownTypeId) -> bool {
    matches!(
        id,
        KnownTypeId::EntityManager | KnownTypeId::Session | KnownTypeId::StatelessSession | KnownTypeId::MutinySession
    )
}

/// Check whether a type is a query object returned unexecuted.
pub fn is_query_object(id: KnownTypeId) -> bool {
    matches!(
        id,
        KnownTypeId::JpaQuery | KnownTypeId::TypedQuery | KnownTypeId::HibQuery | KnownTypeId::SelectionQuery
    )
}

const fn info(id: KnownTypeId, canonical: &'static str, description: &'static str, origin: Origin) -> KnownTypeInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
        origin,
        stability: Stability::Stable,
    }
}

const fn jdk(id: KnownTypeId, canonical: &'static str, description: &'static str) -> KnownTypeInfo {
    info(id, canonical, description, Origin::Jdk)
}

const fn persistence(
    id: KnownTypeId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
) -> KnownTypeInfo {
    LangItemInfo {
        id,
        canonical,
        aliases,
        description,
        origin: Origin::Persistence,
        stability: Stability::Stable,
    }
}

const fn hibernate(id: KnownTypeId, canonical: &'static str, description: &'static str) -> KnownTypeInfo {
    info(id, canonical, description, Origin::Hibernate)
}

const fn reactive(id: KnownTypeId, canonical: &'static str, description: &'static str) -> KnownTypeInfo {
    info(id, canonical, description, Origin::Reactive)
}

const fn data(id: KnownTypeId, canonical: &'static str, description: &'static str) -> KnownTypeInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
        origin: Origin::JakartaData,
        stability: Stability::Incubating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_javax_persistence_aliases() {
        assert_eq!(from_str("javax.persistence.EntityManager"), Some(KnownTypeId::EntityManager));
        assert_eq!(from_str("javax.persistence.Tuple"), Some(KnownTypeId::Tuple));
    }

    #[test]
    fn test_simple_name_of_nested_type() {
        assert_eq!(simple_name(KnownTypeId::MutinySession), "Session");
        assert_eq!(simple_name(KnownTypeId::Stream), "Stream");
    }

    #[test]
    fn test_categories_do_not_overlap() {
        for t in KNOWN_TYPES {
            let hits = [is_ordering(t.id), is_paging(t.id), is_session(t.id), is_query_object(t.id)]
                .iter()
                .filter(|b| **b)
                .count();
            assert!(hits <= 1, "{:?} belongs to more than one category", t.id);
        }
    }
}
