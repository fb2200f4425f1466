//! Return-type classification for query and finder methods.
//!
//! A declared return type is first stripped of the reactive `Uni` wrapper, then split into an optional result
//! container and the result type it holds.

use metagen_core::lang::types::{self as known, KnownTypeId, LEGAL_GENERIC_RESULT_TYPES, LEGAL_RAW_RESULT_TYPES};

use super::messages;
use crate::frontend::diagnostics::{Diagnostic, Location};
use crate::model::{EntityProvider, MethodDecl, TypeRef};

/// How results are handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultContainer {
    /// Exactly one result, or a row array (`Object[]`) of a query method.
    Single,
    /// `E[]` from a finder.
    Array,
    List,
    Stream,
    Optional,
    /// `jakarta.data.page.Page`
    Page,
    /// `jakarta.data.page.CursoredPage`
    CursoredPage,
    /// `org.hibernate.query.KeyedResultList`
    KeyedResultList,
    /// The query object itself, returned unexecuted.
    QueryObject(KnownTypeId),
}

impl ResultContainer {
    pub fn is_single(self) -> bool {
        self == ResultContainer::Single
    }

    /// Whether a reactive session can produce this shape.
    pub fn is_reactive_capable(self) -> bool {
        matches!(
            self,
            ResultContainer::Single
                | ResultContainer::Array
                | ResultContainer::List
                | ResultContainer::Optional
                | ResultContainer::Page
        )
    }
}

/// A classified return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnShape {
    /// The declared type was `Uni<...>`.
    pub uni: bool,
    pub container: Option<KnownTypeId>,
    /// The element of the container, or the declared type itself; `None` for a raw container.
    pub result: Option<TypeRef>,
}

impl ReturnShape {
    /// The container shape. Arrays are multi-valued only for finders.
    pub fn result_container(&self, arrays_are_multiple: bool) -> ResultContainer {
        match self.container {
            None => match &self.result {
                Some(TypeRef::Array(_)) if arrays_are_multiple => ResultContainer::Array,
                _ => ResultContainer::Single,
            },
            Some(KnownTypeId::List) => ResultContainer::List,
            Some(KnownTypeId::Stream) => ResultContainer::Stream,
            Some(KnownTypeId::Optional) => ResultContainer::Optional,
            Some(KnownTypeId::DataPage) => ResultContainer::Page,
            Some(KnownTypeId::CursoredPage) => ResultContainer::CursoredPage,
            Some(KnownTypeId::KeyedResultList) => ResultContainer::KeyedResultList,
            Some(other) => ResultContainer::QueryObject(other),
        }
    }
}

/// Strip a `Uni<T>` wrapper.
pub fn ununi(ty: &TypeRef) -> (&TypeRef, bool) {
    match ty.type_args() {
        [inner] if ty.is_known(KnownTypeId::Uni) => (inner, true),
        _ => (ty, false),
    }
}

/// Classify the return type of `method`.
///
/// ## Errors
/// - A diagnostic for an illegal container, a container needing a paging parameter the method lacks, or a
///   declared type with two or more type arguments.
pub fn classify_return(
    method: &MethodDecl,
    provider: &dyn EntityProvider,
    at: &Location,
) -> Result<ReturnShape, Diagnostic> {
    let (ty, uni) = ununi(&method.return_type);
    let shape = |container, result| ReturnShape { uni, container, result };

    let TypeRef::Declared { name, args } = ty else {
        return match ty {
            TypeRef::Void | TypeRef::Array(_) | TypeRef::Primitive(_) => Ok(shape(None, Some(ty.clone()))),
            _ => Err(messages::incorrect_return_type(ty, at.clone())),
        };
    };

    match args.as_slice() {
        [] => {
            if provider.is_entity(name) {
                return Ok(shape(None, Some(ty.clone())));
            }
            match known::from_str(name) {
                Some(id) if LEGAL_RAW_RESULT_TYPES.contains(&id) => Ok(shape(Some(id), None)),
                // a projection
                _ => Ok(shape(None, Some(ty.clone()))),
            }
        }
        [element] => {
            let id = validated_container(method, name, at)?;
            Ok(shape(Some(id), Some(element.clone())))
        }
        _ => Err(messages::incorrect_return_type(ty, at.clone())),
    }
}

fn validated_container(method: &MethodDecl, name: &str, at: &Location) -> Result<KnownTypeId, Diagnostic> {
    let has_parameter = |wanted: KnownTypeId| method.parameters.iter().any(|p| p.type_.is_known(wanted));
    match known::from_str(name) {
        Some(id @ (KnownTypeId::DataPage | KnownTypeId::CursoredPage)) => {
            if has_parameter(KnownTypeId::PageRequest) {
                Ok(id)
            } else {
                Err(messages::missing_paging_parameter(name, "PageRequest", at.clone()))
            }
        }
        Some(KnownTypeId::KeyedResultList) => {
            if has_parameter(KnownTypeId::KeyedPage) {
                Ok(KnownTypeId::KeyedResultList)
            } else {
                Err(messages::missing_paging_parameter(name, "KeyedPage", at.clone()))
            }
        }
        Some(id) if LEGAL_GENERIC_RESULT_TYPES.contains(&id) => Ok(id),
        _ => Err(messages::incorrect_return_type(name, at.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessType, DomainModel, EntityDescriptor, EntityKind, ParamDecl};

    fn model() -> DomainModel {
        DomainModel::new().with_entity(EntityDescriptor::new(
            "org.example.Book",
            EntityKind::Entity,
            AccessType::Field,
        ))
    }

    fn method(ret: &str) -> MethodDecl {
        MethodDecl::new("m", TypeRef::parse(ret).unwrap())
    }

    fn classify(method: &MethodDecl) -> Result<ReturnShape, Diagnostic> {
        classify_return(method, &model(), &Location::method("org.example.Library", "m"))
    }

    #[test]
    fn test_entity_and_projection_and_raw_container() {
        let shape = classify(&method("org.example.Book")).unwrap();
        assert_eq!(shape.container, None);
        assert_eq!(shape.result_container(true), ResultContainer::Single);

        let shape = classify(&method("org.example.BookSummary")).unwrap();
        assert_eq!(shape.result, Some(TypeRef::declared("org.example.BookSummary")));

        let shape = classify(&method("java.util.List")).unwrap();
        assert_eq!(shape.container, Some(KnownTypeId::List));
        assert_eq!(shape.result, None);
    }

    #[test]
    fn test_uni_is_unwrapped() {
        let shape = classify(&method("io.smallrye.mutiny.Uni<java.util.List<org.example.Book>>")).unwrap();
        assert!(shape.uni);
        assert_eq!(shape.result_container(true), ResultContainer::List);
        assert_eq!(shape.result, Some(TypeRef::declared("org.example.Book")));
    }

    #[test]
    fn test_arrays_depend_on_method_kind() {
        let shape = classify(&method("org.example.Book[]")).unwrap();
        assert_eq!(shape.result_container(true), ResultContainer::Array);
        assert_eq!(shape.result_container(false), ResultContainer::Single);
    }

    #[test]
    fn test_illegal_containers() {
        let err = classify(&method("java.util.Set<org.example.Book>")).unwrap_err();
        assert_eq!(err.message, "incorrect return type 'java.util.Set'");
        let err = classify(&method("java.util.Map<java.lang.String,org.example.Book>")).unwrap_err();
        assert_eq!(
            err.message,
            "incorrect return type 'java.util.Map<java.lang.String,org.example.Book>'"
        );
    }

    #[test]
    fn test_pages_need_page_requests() {
        let err = classify(&method("jakarta.data.page.Page<org.example.Book>")).unwrap_err();
        assert_eq!(
            err.message,
            "method with return type 'jakarta.data.page.Page' has no parameter of type 'PageRequest'"
        );
        let paged = method("jakarta.data.page.Page<org.example.Book>").with_param(ParamDecl::new(
            "request",
            TypeRef::parse("jakarta.data.page.PageRequest<org.example.Book>").unwrap(),
        ));
        assert_eq!(classify(&paged).unwrap().result_container(true), ResultContainer::Page);

        let err = classify(&method("org.hibernate.query.KeyedResultList<org.example.Book>")).unwrap_err();
        assert!(err.message.ends_with("has no parameter of type 'KeyedPage'"));
    }
}
