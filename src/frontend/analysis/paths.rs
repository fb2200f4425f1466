//! Attribute path resolution.
//!
//! A dotted path (`address.city`) is walked member by member. At each step only the current type's own members are
//! scanned, in declaration order, under that type's access convention:
//! - field access matches a field by exact name,
//! - property access matches a no-argument getter by its JavaBeans property name.
//!
//! A non-terminal segment must have a declared type known to the provider; the walk continues with that type's
//! members and access convention. The first matching member wins.
//!
//! Resolution is pure. Every matched step yields a [`MemberTypeEntry`] which the caller merges into the shared
//! [`MemberTypeCache`].

use std::collections::BTreeMap;

use crate::model::{AccessType, ElementKind, EntityDescriptor, EntityProvider, MemberElement};

/// `(enclosing type, member) -> member type` as observed by one resolution step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberTypeEntry {
    pub enclosing: String,
    pub member: String,
    pub member_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathResolution<'m> {
    /// The member the whole path denotes, `None` when any segment failed to resolve.
    pub terminal: Option<&'m MemberElement>,
    /// Matched members, in path order.
    pub segments: Vec<&'m MemberElement>,
    pub cache_updates: Vec<MemberTypeEntry>,
}

impl<'m> PathResolution<'m> {
    pub fn is_resolved(&self) -> bool {
        self.terminal.is_some()
    }

    /// Nullability of the resolved member; an unresolved path is treated as nullable.
    pub fn is_nullable(&self) -> bool {
        self.terminal.is_none_or(MemberElement::is_nullable)
    }
}

/// Resolve `path` against `entity`.
pub fn resolve_path<'m>(
    entity: &'m EntityDescriptor,
    path: &str,
    provider: &'m dyn EntityProvider,
) -> PathResolution<'m> {
    let mut resolution = PathResolution {
        terminal: None,
        segments: Vec::new(),
        cache_updates: Vec::new(),
    };
    let tokens: Vec<&str> = path.split('.').collect();
    let mut current = entity;

    for (index, token) in tokens.iter().enumerate() {
        let Some(member) = matching_member(current, token) else {
            tracing::trace!(entity = %current.qualified_name, token, "no matching member");
            return resolution;
        };
        tracing::trace!(entity = %current.qualified_name, token, member = %member.name, "matched path segment");
        resolution.segments.push(member);
        resolution.cache_updates.push(MemberTypeEntry {
            enclosing: current.qualified_name.clone(),
            member: (*token).to_string(),
            member_type: member.type_.erasure().to_string(),
        });

        if index + 1 == tokens.len() {
            resolution.terminal = Some(member);
            return resolution;
        }

        let Some(next) = member.type_.erased_name().and_then(|name| provider.resolve(name)) else {
            tracing::trace!(member = %member.name, ty = %member.type_, "path continues through a non-structured type");
            return resolution;
        };
        current = next;
    }
    resolution
}

/// Find the member of `entity` named `token` under the entity's access convention.
pub fn matching_member<'m>(entity: &'m EntityDescriptor, token: &str) -> Option<&'m MemberElement> {
    if token.is_empty() {
        return None;
    }
    entity.members.iter().find(|member| match entity.access {
        AccessType::Field => member.element == ElementKind::Field && member.name == token,
        AccessType::Property => {
            member.element == ElementKind::Method
                && member.parameters.is_empty()
                && metagen_core::getter_property_name(&member.name).as_deref() == Some(token)
        }
    })
}

/// Shared, append-only record of member types seen while resolving paths.
///
/// Inserts are first-writer-wins: a later entry for the same `(enclosing, member)` pair is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberTypeCache {
    entries: BTreeMap<(String, String), String>,
}

impl MemberTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Returns
    /// - `true` if the entry was new.
    pub fn insert(&mut self, entry: MemberTypeEntry) -> bool {
        match self.entries.entry((entry.enclosing, entry.member)) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(entry.member_type);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn merge(&mut self, updates: impl IntoIterator<Item = MemberTypeEntry>) {
        for entry in updates {
            self.insert(entry);
        }
    }

    pub fn member_type(&self, enclosing: &str, member: &str) -> Option<&str> {
        self.entries
            .get(&(enclosing.to_string(), member.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = MemberTypeEntry> + '_ {
        self.entries.iter().map(|((enclosing, member), member_type)| MemberTypeEntry {
            enclosing: enclosing.clone(),
            member: member.clone(),
            member_type: member_type.clone(),
        })
    }
}
