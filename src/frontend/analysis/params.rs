//! Parameter classification.
//!
//! Every method parameter gets an effective name, a role (attribute-matching or one of the special control shapes)
//! and a nullability. The effective name comes from `@By` (normalized), else `@Param` (verbatim), else the declared
//! parameter name (normalized).

use metagen_core::lang::annotations::{AnnotationId, VALUE_MEMBER};
use metagen_core::lang::sessions::{self, SessionFlavor};
use metagen_core::lang::types::KnownTypeId;

use super::paths::{self, MemberTypeEntry};
use super::{Halt, Step};
use crate::model::{EntityDescriptor, EntityProvider, MethodDecl, ParamDecl, TypeRef};

/// A control parameter that does not match an entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    Session(SessionFlavor),
    /// `org.hibernate.query.Page`
    Page,
    /// `jakarta.data.page.PageRequest`
    PageRequest,
    /// `jakarta.data.Limit`
    Limit,
    /// `org.hibernate.query.KeyedPage`
    KeyedPage,
    /// `org.hibernate.query.Order`, or a list or array of them.
    Order { many: bool },
    /// `jakarta.data.Order`, a sequence of sorts.
    DataOrder,
    /// `jakarta.data.Sort`, or an array of them.
    Sort { many: bool },
}

impl SpecialKind {
    pub fn is_paging(self) -> bool {
        matches!(
            self,
            SpecialKind::Page | SpecialKind::PageRequest | SpecialKind::Limit | SpecialKind::KeyedPage
        )
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            SpecialKind::Order { .. } | SpecialKind::DataOrder | SpecialKind::Sort { .. }
        )
    }

    /// Shapes whose type argument must name the queried entity.
    pub fn is_type_checked(self) -> bool {
        self.is_ordering() || self == SpecialKind::PageRequest
    }
}

/// Classify a declared parameter type as one of the special control shapes.
pub fn special_kind(ty: &TypeRef) -> Option<SpecialKind> {
    match ty {
        TypeRef::Array(component) => match component.known_id()? {
            KnownTypeId::Sort => Some(SpecialKind::Sort { many: true }),
            KnownTypeId::HibOrder => Some(SpecialKind::Order { many: true }),
            _ => None,
        },
        TypeRef::Declared { .. } => {
            let id = ty.known_id()?;
            if let Some(flavor) = sessions::flavor_of(id) {
                return Some(SpecialKind::Session(flavor));
            }
            match id {
                KnownTypeId::HibPage => Some(SpecialKind::Page),
                KnownTypeId::PageRequest => Some(SpecialKind::PageRequest),
                KnownTypeId::Limit => Some(SpecialKind::Limit),
                KnownTypeId::KeyedPage => Some(SpecialKind::KeyedPage),
                KnownTypeId::HibOrder => Some(SpecialKind::Order { many: false }),
                KnownTypeId::DataOrder => Some(SpecialKind::DataOrder),
                KnownTypeId::Sort => Some(SpecialKind::Sort { many: false }),
                KnownTypeId::List => match ty.type_args().first().and_then(TypeRef::known_id) {
                    Some(KnownTypeId::HibOrder) => Some(SpecialKind::Order { many: true }),
                    _ => None,
                },
                _ => None,
            }
        }
        TypeRef::Primitive(_) | TypeRef::Wildcard { .. } | TypeRef::TypeVar(_) | TypeRef::Void => None,
    }
}

/// Extract the entity type argument of an ordering or paging parameter.
///
/// Arrays and lists are unwrapped; for `Order`, `Sort` and `PageRequest` the first type argument is taken, using
/// the super bound of a wildcard.
pub fn type_argument(ty: &TypeRef) -> Option<TypeRef> {
    match ty {
        TypeRef::Array(component) => type_argument(component),
        TypeRef::Declared { args, .. } => match ty.known_id()? {
            KnownTypeId::List => type_argument(args.first()?),
            KnownTypeId::HibOrder | KnownTypeId::Sort | KnownTypeId::DataOrder | KnownTypeId::PageRequest => {
                match args.first()? {
                    TypeRef::Wildcard { super_, .. } => super_.as_deref().cloned(),
                    arg @ (TypeRef::Array(_) | TypeRef::Declared { .. } | TypeRef::TypeVar(_)) => Some(arg.clone()),
                    TypeRef::Primitive(_) | TypeRef::Void => None,
                }
            }
            _ => None,
        },
        _ => None,
    }
}

/// The name a parameter binds by.
///
/// ## Errors
/// - [`Halt::Defer`] when an explicit-name annotation still carries the host's placeholder.
pub fn effective_name(param: &ParamDecl) -> Step<String> {
    let explicit = |id: AnnotationId| -> Step<Option<String>> {
        let Some(annotation) = param.annotation(id) else {
            return Ok(None);
        };
        let name = annotation.string_value(VALUE_MEMBER).unwrap_or_default();
        if metagen_core::is_placeholder(name) {
            return Err(Halt::Defer(format!("unresolved @{} on parameter '{}'", short(id), param.name)));
        }
        Ok(Some(name.to_string()))
    };

    if let Some(by) = explicit(AnnotationId::By)? {
        return Ok(metagen_core::normalize_path_name(&by));
    }
    if let Some(name) = explicit(AnnotationId::Param)? {
        return Ok(name);
    }
    Ok(metagen_core::normalize_path_name(&param.name))
}

fn short(id: AnnotationId) -> &'static str {
    metagen_core::lang::annotations::info_for(id).simple_name()
}

/// A method parameter after classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedParam {
    /// The declared parameter name, used in generated code.
    pub name: String,
    /// The effective name: an attribute path for finders, a query parameter name for query methods.
    pub binding: String,
    pub type_: TypeRef,
    pub special: Option<SpecialKind>,
    pub nullable: bool,
}

impl ClassifiedParam {
    pub fn is_attribute(&self) -> bool {
        self.special.is_none()
    }

    /// The parameter name as a Java identifier (`address.city` becomes `address$city`).
    pub fn variable(&self) -> String {
        self.name.replace('.', "$")
    }
}

/// Classified parameters of one method plus the member types observed while resolving them.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub params: Vec<ClassifiedParam>,
    pub cache_updates: Vec<MemberTypeEntry>,
}

impl Classification {
    pub fn attributes(&self) -> impl Iterator<Item = &ClassifiedParam> {
        self.params.iter().filter(|p| p.is_attribute())
    }
}

/// Classify every parameter of `method`.
///
/// Nullability is judged by resolving each effective name against `entity`; without an entity, or when resolution
/// fails, a parameter is nullable.
pub fn classify(
    method: &MethodDecl,
    entity: Option<&EntityDescriptor>,
    provider: &dyn EntityProvider,
) -> Step<Classification> {
    let mut classification = Classification::default();
    for param in &method.parameters {
        let binding = effective_name(param)?;
        let special = special_kind(&param.type_);
        let nullable = match entity {
            Some(entity) if special.is_none() => {
                let resolution = paths::resolve_path(entity, &binding, provider);
                classification.cache_updates.extend(resolution.cache_updates.iter().cloned());
                resolution.is_nullable()
            }
            _ => true,
        };
        classification.params.push(ClassifiedParam {
            name: param.name.clone(),
            binding,
            type_: param.type_.clone(),
            special,
            nullable,
        });
    }
    Ok(classification)
}
