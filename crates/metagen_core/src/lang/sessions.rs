//! Session flavors.
//!
//! A repository (or a single method) executes against exactly one kind of session handle. The flavor decides which
//! lookup strategies are available and how generated bodies are spelled.
//!
//! ## Examples
//! ```rust
//! use metagen_core::lang::sessions::{self, SessionFlavor};
//!
//! let flavor = sessions::flavor_for_type("org.hibernate.StatelessSession");
//! assert_eq!(flavor, Some(SessionFlavor::Stateless));
//! assert!(SessionFlavor::Reactive.is_reactive());
//! ```

use crate::lang::types::{self, KnownTypeId};

/// The kind of session a repository or method runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionFlavor {
    /// `jakarta.persistence.EntityManager`
    EntityManager,
    /// `org.hibernate.Session`
    Stateful,
    /// `org.hibernate.StatelessSession`
    Stateless,
    /// `org.hibernate.reactive.mutiny.Mutiny.Session`
    Reactive,
}

pub const ALL_FLAVORS: &[SessionFlavor] = &[
    SessionFlavor::EntityManager,
    SessionFlavor::Stateful,
    SessionFlavor::Stateless,
    SessionFlavor::Reactive,
];

impl SessionFlavor {
    /// The known type backing this flavor.
    pub fn type_id(self) -> KnownTypeId {
        match self {
            SessionFlavor::EntityManager => KnownTypeId::EntityManager,
            SessionFlavor::Stateful => KnownTypeId::Session,
            SessionFlavor::Stateless => KnownTypeId::StatelessSession,
            SessionFlavor::Reactive => KnownTypeId::MutinySession,
        }
    }

    /// Canonical qualified name of the session type.
    pub fn type_name(self) -> &'static str {
        types::as_str(self.type_id())
    }

    pub fn is_stateless(self) -> bool {
        self == SessionFlavor::Stateless
    }

    pub fn is_reactive(self) -> bool {
        self == SessionFlavor::Reactive
    }

    /// Whether the handle is the portable persistence API (needs unwrapping for Hibernate-only calls).
    pub fn uses_entity_manager(self) -> bool {
        self == SessionFlavor::EntityManager
    }

    /// Default name of the generated session field.
    pub fn default_variable_name(self) -> &'static str {
        match self {
            SessionFlavor::EntityManager => "entityManager",
            _ => "session",
        }
    }

    /// Name of the by-id lookup operation on this handle.
    pub fn find_by_id_operation(self) -> &'static str {
        match self {
            SessionFlavor::Stateless => "get",
            _ => "find",
        }
    }
}

/// Map a known session type to its flavor.
pub fn flavor_of(id: KnownTypeId) -> Option<SessionFlavor> {
    ALL_FLAVORS.iter().copied().find(|f| f.type_id() == id)
}

/// Map an erased qualified type name to a session flavor.
pub fn flavor_for_type(name: &str) -> Option<SessionFlavor> {
    types::from_str(name).and_then(flavor_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_flavor_round_trips_through_its_type() {
        for flavor in ALL_FLAVORS {
            assert_eq!(flavor_for_type(flavor.type_name()), Some(*flavor));
            assert!(types::is_session(flavor.type_id()));
        }
    }

    #[test]
    fn test_non_session_type_has_no_flavor() {
        assert_eq!(flavor_for_type("java.util.List"), None);
        assert_eq!(flavor_for_type("org.example.Book"), None);
    }

    #[test]
    fn test_legacy_entity_manager_spelling() {
        assert_eq!(
            flavor_for_type("javax.persistence.EntityManager"),
            Some(SessionFlavor::EntityManager)
        );
    }
}
