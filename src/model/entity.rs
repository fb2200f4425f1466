//! Entity descriptors: the persistent types finder parameters and query paths resolve against.

use metagen_core::lang::annotations::{
    AnnotationId, COLLECTION_MAPPINGS, IDENTIFIER_MAPPINGS, OPTIONAL_MEMBER, OPTIONALITY_MAPPINGS,
};
use serde::Deserialize;

use super::annotations::{self, Annotation};
use super::types::TypeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Entity,
    Embeddable,
    #[serde(rename = "mappedSuperclass")]
    MappedSuperclass,
    /// A plain class (a projection record, for instance) described only for its constructors.
    Class,
}

/// How persistent state is read: directly from fields, or through JavaBeans getters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    #[default]
    Field,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Field,
    Method,
}

/// The persistent role of a member, derived from its mapping annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Identifier,
    NaturalKey,
    Basic,
    Association,
    Collection,
}

/// A declared field or method of an entity or embeddable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberElement {
    pub name: String,
    pub element: ElementKind,
    #[serde(rename = "type")]
    pub type_: TypeRef,
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl MemberElement {
    pub fn field(name: impl Into<String>, type_: TypeRef) -> Self {
        MemberElement {
            name: name.into(),
            element: ElementKind::Field,
            type_,
            parameters: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn getter(name: impl Into<String>, type_: TypeRef) -> Self {
        MemberElement {
            element: ElementKind::Method,
            ..MemberElement::field(name, type_)
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn has(&self, id: AnnotationId) -> bool {
        annotations::has(&self.annotations, id)
    }

    pub fn kind(&self) -> MemberKind {
        if annotations::has_any(&self.annotations, IDENTIFIER_MAPPINGS) {
            MemberKind::Identifier
        } else if self.has(AnnotationId::NaturalId) {
            MemberKind::NaturalKey
        } else if annotations::has_any(&self.annotations, COLLECTION_MAPPINGS) {
            MemberKind::Collection
        } else if self.has(AnnotationId::ManyToOne) || self.has(AnnotationId::OneToOne) {
            MemberKind::Association
        } else {
            MemberKind::Basic
        }
    }

    /// The logical attribute name: the field name, or the decapitalized getter remainder.
    pub fn attribute_name(&self) -> Option<String> {
        match self.element {
            ElementKind::Field => Some(self.name.clone()),
            ElementKind::Method if self.parameters.is_empty() => metagen_core::getter_property_name(&self.name),
            ElementKind::Method => None,
        }
    }

    /// Whether the member may hold null, judged from its type and its constraints.
    pub fn is_nullable(&self) -> bool {
        if self.type_.is_primitive() {
            return false;
        }
        if self.has(AnnotationId::Id) || self.has(AnnotationId::NotNull) {
            return false;
        }
        let mandatory = self
            .annotations
            .iter()
            .filter(|a| a.id.is_some_and(|id| OPTIONALITY_MAPPINGS.contains(&id)))
            .any(|a| a.bool_value(OPTIONAL_MEMBER) == Some(false));
        !mandatory
    }
}

/// A persistent type with its members, in declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescriptor {
    pub qualified_name: String,
    #[serde(default)]
    pub entity_name: Option<String>,
    pub kind: EntityKind,
    #[serde(default)]
    pub access: AccessType,
    #[serde(default)]
    pub id_class: Option<TypeRef>,
    #[serde(default)]
    pub members: Vec<MemberElement>,
    /// Constructor parameter lists, used to match projection queries.
    #[serde(default)]
    pub constructors: Vec<Vec<TypeRef>>,
}

impl EntityDescriptor {
    pub fn new(qualified_name: impl Into<String>, kind: EntityKind, access: AccessType) -> Self {
        EntityDescriptor {
            qualified_name: qualified_name.into(),
            entity_name: None,
            kind,
            access,
            id_class: None,
            members: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: MemberElement) -> Self {
        self.members.push(member);
        self
    }

    pub fn simple_name(&self) -> &str {
        metagen_core::simple_name(&self.qualified_name)
    }

    /// The mapped entity name used in query text, defaulting to the simple class name.
    pub fn mapped_name(&self) -> &str {
        self.entity_name.as_deref().unwrap_or_else(|| self.simple_name())
    }

    pub fn is_entity(&self) -> bool {
        self.kind == EntityKind::Entity
    }

    /// Members that participate in the persistent state under this descriptor's access convention.
    pub fn persistent_members(&self) -> impl Iterator<Item = &MemberElement> {
        let wanted = match self.access {
            AccessType::Field => ElementKind::Field,
            AccessType::Property => ElementKind::Method,
        };
        self.members
            .iter()
            .filter(move |m| m.element == wanted && !m.has(AnnotationId::Transient))
    }

    /// Number of natural-key members, counted over every enclosed member.
    pub fn natural_key_count(&self) -> usize {
        self.members.iter().filter(|m| m.has(AnnotationId::NaturalId)).count()
    }

    pub fn identifier_member(&self) -> Option<&MemberElement> {
        self.members
            .iter()
            .find(|m| annotations::has_any(&m.annotations, IDENTIFIER_MAPPINGS))
    }

    pub fn has_constructor(&self, parameters: &[TypeRef]) -> bool {
        self.constructors.iter().any(|c| c.as_slice() == parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::annotations::AnnotationValue;

    fn string() -> TypeRef {
        TypeRef::declared("java.lang.String")
    }

    #[test]
    fn test_member_kind_from_annotations() {
        let id = MemberElement::field("isbn", string()).annotated(Annotation::marker(AnnotationId::Id));
        let nat = MemberElement::field("isbn10", string()).annotated(Annotation::marker(AnnotationId::NaturalId));
        let authors = MemberElement::field("authors", TypeRef::declared("java.util.Set"))
            .annotated(Annotation::marker(AnnotationId::ManyToMany));
        assert_eq!(id.kind(), MemberKind::Identifier);
        assert_eq!(nat.kind(), MemberKind::NaturalKey);
        assert_eq!(authors.kind(), MemberKind::Collection);
        assert_eq!(MemberElement::field("title", string()).kind(), MemberKind::Basic);
    }

    #[test]
    fn test_nullability_rules() {
        let pages = MemberElement::field("pages", TypeRef::parse("int").unwrap());
        assert!(!pages.is_nullable());
        assert!(MemberElement::field("title", string()).is_nullable());
        let required = MemberElement::field("publisher", TypeRef::declared("org.example.Publisher")).annotated(
            Annotation::marker(AnnotationId::ManyToOne).with_value(OPTIONAL_MEMBER, AnnotationValue::Bool(false)),
        );
        assert!(!required.is_nullable());
        let optional = MemberElement::field("publisher", TypeRef::declared("org.example.Publisher")).annotated(
            Annotation::marker(AnnotationId::ManyToOne).with_value(OPTIONAL_MEMBER, AnnotationValue::Bool(true)),
        );
        assert!(optional.is_nullable());
    }

    #[test]
    fn test_mapped_name_defaults_to_simple_name() {
        let mut book = EntityDescriptor::new("org.example.Book", EntityKind::Entity, AccessType::Field);
        assert_eq!(book.mapped_name(), "Book");
        book.entity_name = Some("Volume".into());
        assert_eq!(book.mapped_name(), "Volume");
    }

    #[test]
    fn test_attribute_name_of_getter() {
        let getter = MemberElement::getter("getTitle", string());
        assert_eq!(getter.attribute_name().as_deref(), Some("title"));
        assert_eq!(MemberElement::getter("title", string()).attribute_name(), None);
    }
}
