//! Repository and method declarations as handed over by declaration discovery.

use metagen_core::lang::annotations::AnnotationId;
use serde::Deserialize;

use super::annotations::{self, Annotation};
use super::types::TypeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    #[default]
    Interface,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Abstract,
    Default,
    Static,
}

/// An interface or abstract class whose abstract methods get generated implementations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDecl {
    pub qualified_name: String,
    #[serde(default)]
    pub kind: DeclKind,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl RepositoryDecl {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        RepositoryDecl {
            qualified_name: qualified_name.into(),
            kind: DeclKind::Interface,
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn simple_name(&self) -> &str {
        metagen_core::simple_name(&self.qualified_name)
    }

    pub fn package(&self) -> &str {
        metagen_core::package_name(&self.qualified_name)
    }

    /// Whether this is a Jakarta Data `@Repository`.
    pub fn is_data_repository(&self) -> bool {
        annotations::has(&self.annotations, AnnotationId::Repository)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// The declared method that overloads the same way as `method`.
    pub fn method_matching(&self, method: &MethodDecl) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.overloads_as(method))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    #[serde(default = "void")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

fn void() -> TypeRef {
    TypeRef::Void
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        MethodDecl {
            name: name.into(),
            parameters: Vec::new(),
            return_type,
            annotations: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        annotations::find(&self.annotations, id)
    }

    /// Same name and the same erased parameter types.
    pub fn overloads_as(&self, other: &MethodDecl) -> bool {
        self.name == other.name
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.type_.erasure() == b.type_.erasure())
    }

    /// Abstractness in the context of the declaring type: interface methods are abstract unless `default` or
    /// `static`; class methods only when marked `abstract`.
    pub fn is_abstract(&self, owner: DeclKind) -> bool {
        match owner {
            DeclKind::Interface => {
                !self.modifiers.contains(&Modifier::Default) && !self.modifiers.contains(&Modifier::Static)
            }
            DeclKind::Class => self.modifiers.contains(&Modifier::Abstract),
        }
    }

    pub fn parameter_types(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.type_.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: TypeRef,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, type_: TypeRef) -> Self {
        ParamDecl {
            name: name.into(),
            type_,
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        annotations::find(&self.annotations, id)
    }
}
