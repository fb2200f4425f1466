//! Input model: host types, annotations, entity descriptors and repository declarations.

pub mod annotations;
pub mod declaration;
pub mod entity;
pub mod loader;
pub mod provider;
pub mod types;

pub use annotations::{Annotation, AnnotationValue};
pub use declaration::{DeclKind, MethodDecl, Modifier, ParamDecl, RepositoryDecl};
pub use entity::{AccessType, ElementKind, EntityDescriptor, EntityKind, MemberElement, MemberKind};
pub use loader::{ModelError, load_model, parse_model};
pub use provider::{DomainModel, EntityProvider};
pub use types::TypeRef;
