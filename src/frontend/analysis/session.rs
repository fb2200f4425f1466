//! Session setup for a repository.
//!
//! A repository reaches its session through a session getter (an abstract or default no-argument method returning
//! a session type). Without one, a Jakarta Data repository is backed by a `StatelessSession`, and any other type gets
//! static methods taking an `EntityManager`.

use metagen_core::lang::sessions::{self, SessionFlavor};

use crate::model::{MethodDecl, Modifier, RepositoryDecl};

/// How generated members of one repository reach the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySession {
    pub flavor: SessionFlavor,
    /// The generated session field, or the parameter name of static methods.
    pub variable: String,
    /// The declared session getter, if any.
    pub getter: Option<String>,
    pub mode: SessionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// The generated class holds the session in a field set by its constructor.
    Field,
    /// The repository supplies the session through a default getter; no field or constructor is generated.
    Getter,
    /// Generated methods are static and take the session as their first parameter.
    Static,
}

impl RepositorySession {
    /// The expression a generated body uses to reach the session.
    pub fn expression(&self) -> String {
        match (&self.mode, &self.getter) {
            (SessionMode::Getter, Some(getter)) => format!("{getter}()"),
            _ => self.variable.clone(),
        }
    }

    /// Whether the generated class implements the repository interface.
    pub fn implements_repository(&self) -> bool {
        self.mode != SessionMode::Static
    }
}

/// Whether `method` is a session getter.
pub fn session_getter_flavor(method: &MethodDecl) -> Option<SessionFlavor> {
    if !method.parameters.is_empty() || method.modifiers.contains(&Modifier::Static) {
        return None;
    }
    method.return_type.erased_name().and_then(sessions::flavor_for_type)
}

/// Determine the session of `repository`.
pub fn setup_session(repository: &RepositoryDecl) -> RepositorySession {
    let getter = repository
        .methods
        .iter()
        .find_map(|m| session_getter_flavor(m).map(|flavor| (m, flavor)));

    match getter {
        Some((method, flavor)) => {
            let mode = if method.modifiers.contains(&Modifier::Default) {
                SessionMode::Getter
            } else {
                SessionMode::Field
            };
            tracing::debug!(repository = %repository.qualified_name, getter = %method.name, ?flavor, ?mode, "session getter");
            RepositorySession {
                flavor,
                variable: flavor.default_variable_name().to_string(),
                getter: Some(method.name.clone()),
                mode,
            }
        }
        None if repository.is_data_repository() => RepositorySession {
            flavor: SessionFlavor::Stateless,
            variable: SessionFlavor::Stateless.default_variable_name().to_string(),
            getter: None,
            mode: SessionMode::Field,
        },
        None => RepositorySession {
            flavor: SessionFlavor::EntityManager,
            variable: SessionFlavor::EntityManager.default_variable_name().to_string(),
            getter: None,
            mode: SessionMode::Static,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, TypeRef};
    use metagen_core::lang::annotations::AnnotationId;

    fn getter(name: &str, ty: &str) -> MethodDecl {
        MethodDecl::new(name, TypeRef::parse(ty).unwrap())
    }

    #[test]
    fn test_abstract_getter_sets_flavor_and_field() {
        let repo = RepositoryDecl::new("org.example.Library")
            .with_method(getter("session", "org.hibernate.reactive.mutiny.Mutiny.Session"));
        let session = setup_session(&repo);
        assert_eq!(session.flavor, SessionFlavor::Reactive);
        assert_eq!(session.mode, SessionMode::Field);
        assert_eq!(session.expression(), "session");
    }

    #[test]
    fn test_default_getter_is_called() {
        let mut method = getter("getEntityManager", "jakarta.persistence.EntityManager");
        method.modifiers.push(Modifier::Default);
        let session = setup_session(&RepositoryDecl::new("org.example.Library").with_method(method));
        assert_eq!(session.mode, SessionMode::Getter);
        assert_eq!(session.expression(), "getEntityManager()");
    }

    #[test]
    fn test_defaults_without_getter() {
        let data = RepositoryDecl::new("org.example.Library").annotated(Annotation::marker(AnnotationId::Repository));
        let session = setup_session(&data);
        assert_eq!(session.flavor, SessionFlavor::Stateless);
        assert!(session.implements_repository());

        let plain = setup_session(&RepositoryDecl::new("org.example.Queries"));
        assert_eq!(plain.flavor, SessionFlavor::EntityManager);
        assert_eq!(plain.mode, SessionMode::Static);
        assert!(!plain.implements_repository());
    }

    #[test]
    fn test_methods_with_parameters_are_not_getters() {
        let method = getter("session", "org.hibernate.Session")
            .with_param(crate::model::ParamDecl::new("x", TypeRef::parse("int").unwrap()));
        assert_eq!(session_getter_flavor(&method), None);
    }
}
