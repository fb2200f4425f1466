//! Metagen vocabulary registries.
//!
//! This module is the “front door” for every marker name the generator recognizes: annotation types, well-known
//! library types (containers, paging/ordering, query objects), primitive types, session handles and
//! query-language keywords.
//!
//! The design goal is to avoid stringly-typed checks scattered across the analyzer and synthesizer.
//! Instead, callers work with **stable IDs** (e.g. `AnnotationId`, `KnownTypeId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no model types, no IO, no side effects.
//! - Lookup by qualified name is case-sensitive; aliases cover legacy `javax.*` spellings.
//!
//! ## Examples
//! ```rust
//! use metagen_core::lang::annotations::{self, AnnotationId};
//!
//! assert_eq!(annotations::from_str("jakarta.persistence.Id"), Some(AnnotationId::Id));
//! assert_eq!(annotations::from_str("javax.persistence.Id"), Some(AnnotationId::Id));
//! assert_eq!(annotations::as_str(AnnotationId::Id), "jakarta.persistence.Id");
//! ```

pub mod annotations;
pub mod keywords;
pub mod primitives;
pub mod registry;
pub mod sessions;
pub mod types;
