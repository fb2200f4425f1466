//! Metagen Backend
//!
//! This module turns member plans into Java source and assembles the generated metamodel class.
//!
//! The pipeline is:
//! 1. Member plans from the analyzer → [`emit::synthesize`] → [`GeneratedMember`]
//! 2. Members collected in a [`Metamodel`], keyed by [`MemberKey`]
//! 3. [`Metamodel::render`] prints the complete class
//!
//! ## Module Organization
//!
//! - `plan.rs` - Member plans handed over by the analyzer
//! - `emit/` - Java emission, one submodule per member family
//! - `imports.rs` - Import and name qualification
//! - `writer.rs` - Indentation-aware source builder

#![deny(clippy::unwrap_used)]

pub mod emit;
pub mod imports;
pub mod plan;
pub mod writer;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::GeneratorConfig;
use crate::frontend::analysis::paths::MemberTypeCache;
use crate::frontend::analysis::session::RepositorySession;
use crate::model::{DeclKind, RepositoryDecl};
use imports::ImportContext;

/// What distinguishes members that share a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyVariant {
    /// Overloads are told apart by their parameter types.
    Signature(Vec<String>),
    /// A single-parameter finder; at most one exists per name.
    SingleParameter,
    /// A lifecycle method, by its parameter type.
    Lifecycle(String),
    /// A member generated for the repository itself.
    Synthetic,
}

/// Identity of a generated member within its metamodel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub name: String,
    pub variant: KeyVariant,
}

impl MemberKey {
    pub fn new(name: impl Into<String>, variant: KeyVariant) -> Self {
        Self {
            name: name.into(),
            variant,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.variant == KeyVariant::Synthetic
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            KeyVariant::Signature(types) => write!(f, "{}({})", self.name, types.join(", ")),
            KeyVariant::SingleParameter => write!(f, "{}(_)", self.name),
            KeyVariant::Lifecycle(ty) => write!(f, "{}({ty})", self.name),
            KeyVariant::Synthetic => write!(f, "<{}>", self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// The session field and the constructor setting it.
    SessionField,
    /// The container-managed default constructor.
    Constructor,
    SessionGetter,
    Finder,
    Query,
    Lifecycle,
}

/// One member of the generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMember {
    pub key: MemberKey,
    pub kind: MemberKind,
    /// Java source of the member, unindented, ending in a newline.
    pub declaration: String,
    /// The method name, or the name of the query constant for query methods.
    pub property_name: String,
    /// The declared return type as spelled in `declaration`; empty for constructors.
    pub type_declaration: String,
    /// Qualified names the declaration needs imported.
    pub imports: BTreeSet<String>,
}

/// The generated implementation of one repository.
///
/// Members are stored last-write-wins by key. Members merged from another metamodel before this one is
/// initialized are held back until [`mark_initialized`](Self::mark_initialized).
#[derive(Debug, Clone)]
pub struct Metamodel {
    pub qualified_name: String,
    pub kind: DeclKind,
    pub session: RepositorySession,
    pub data_repository: bool,
    members: BTreeMap<MemberKey, GeneratedMember>,
    pub member_types: MemberTypeCache,
    pub imports: ImportContext,
    initialized: bool,
    pending: Vec<GeneratedMember>,
}

impl Metamodel {
    pub fn new(repository: &RepositoryDecl, session: RepositorySession) -> Self {
        Self {
            qualified_name: repository.qualified_name.clone(),
            kind: repository.kind,
            session,
            data_repository: repository.is_data_repository(),
            members: BTreeMap::new(),
            member_types: MemberTypeCache::new(),
            imports: ImportContext::new(repository.package()),
            initialized: false,
            pending: Vec::new(),
        }
    }

    pub fn package(&self) -> &str {
        metagen_core::package_name(&self.qualified_name)
    }

    /// Qualified name of the generated class (`org.example.Library_`).
    pub fn generated_name(&self) -> String {
        format!("{}_", self.qualified_name)
    }

    pub fn generated_simple_name(&self) -> String {
        format!("{}_", metagen_core::simple_name(&self.qualified_name))
    }

    /// Commit `member`, replacing any member with the same key.
    ///
    /// ## Returns
    /// - The member it replaced.
    pub fn insert(&mut self, member: GeneratedMember) -> Option<GeneratedMember> {
        self.members.insert(member.key.clone(), member)
    }

    pub fn member(&self, key: &MemberKey) -> Option<&GeneratedMember> {
        self.members.get(key)
    }

    pub fn members(&self) -> impl Iterator<Item = &GeneratedMember> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Mark the metamodel complete for this round and apply held-back merges.
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
        for member in std::mem::take(&mut self.pending) {
            self.absorb(member);
        }
    }

    /// Take over the members of `other`, a metamodel for the same type, overwriting by key.
    pub fn merge_in(&mut self, other: Metamodel) {
        self.member_types.merge(other.member_types.iter());
        let incoming = other.members.into_values();
        if self.initialized {
            for member in incoming {
                self.absorb(member);
            }
        } else {
            tracing::debug!(metamodel = %self.qualified_name, "merge held until initialized");
            self.pending.extend(incoming);
        }
    }

    fn absorb(&mut self, member: GeneratedMember) {
        for import in &member.imports {
            self.imports.add_import(import);
        }
        self.insert(member);
    }

    /// Print the generated class.
    pub fn render(&self, config: &GeneratorConfig) -> String {
        emit::class::render_class(self, config)
    }
}
