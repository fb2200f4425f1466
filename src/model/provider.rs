//! Entity descriptor lookup.

use std::collections::BTreeMap;

use super::declaration::RepositoryDecl;
use super::entity::EntityDescriptor;

/// Serves entity descriptors by qualified name.
pub trait EntityProvider {
    fn resolve(&self, qualified_name: &str) -> Option<&EntityDescriptor>;

    /// Whether the name denotes an `@Entity` (not an embeddable or mapped superclass).
    fn is_entity(&self, qualified_name: &str) -> bool {
        self.resolve(qualified_name).is_some_and(EntityDescriptor::is_entity)
    }

    /// Find an entity by its mapped name (as written in query text).
    fn resolve_by_mapped_name(&self, mapped_name: &str) -> Option<&EntityDescriptor>;
}

/// The loaded domain: descriptors cached by qualified name, plus repository declarations in input order.
#[derive(Debug, Clone, Default)]
pub struct DomainModel {
    entities: BTreeMap<String, EntityDescriptor>,
    pub repositories: Vec<RepositoryDecl>,
}

impl DomainModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. The first descriptor for a qualified name is kept.
    ///
    /// ## Returns
    /// - `true` when the descriptor was inserted, `false` when the name was already known.
    pub fn insert_entity(&mut self, descriptor: EntityDescriptor) -> bool {
        if self.entities.contains_key(&descriptor.qualified_name) {
            return false;
        }
        self.entities.insert(descriptor.qualified_name.clone(), descriptor);
        true
    }

    pub fn with_entity(mut self, descriptor: EntityDescriptor) -> Self {
        self.insert_entity(descriptor);
        self
    }

    pub fn with_repository(mut self, repository: RepositoryDecl) -> Self {
        self.repositories.push(repository);
        self
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.values()
    }

    pub fn repository(&self, name: &str) -> Option<&RepositoryDecl> {
        self.repositories
            .iter()
            .find(|r| r.qualified_name == name || r.simple_name() == name)
    }
}

impl EntityProvider for DomainModel {
    fn resolve(&self, qualified_name: &str) -> Option<&EntityDescriptor> {
        self.entities.get(qualified_name)
    }

    fn resolve_by_mapped_name(&self, mapped_name: &str) -> Option<&EntityDescriptor> {
        self.entities
            .values()
            .find(|e| e.is_entity() && e.mapped_name() == mapped_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{AccessType, EntityKind};

    #[test]
    fn test_first_descriptor_wins() {
        let mut model = DomainModel::new();
        assert!(model.insert_entity(EntityDescriptor::new("org.example.Book", EntityKind::Entity, AccessType::Field)));
        assert!(!model.insert_entity(EntityDescriptor::new(
            "org.example.Book",
            EntityKind::Entity,
            AccessType::Property
        )));
        assert_eq!(model.resolve("org.example.Book").map(|e| e.access), Some(AccessType::Field));
    }

    #[test]
    fn test_embeddables_are_not_entities() {
        let model = DomainModel::new()
            .with_entity(EntityDescriptor::new("org.example.Address", EntityKind::Embeddable, AccessType::Field));
        assert!(model.resolve("org.example.Address").is_some());
        assert!(!model.is_entity("org.example.Address"));
        assert!(model.resolve_by_mapped_name("Address").is_none());
    }
}
