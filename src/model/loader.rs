//! JSON input model loading.
//!
//! The input file carries two arrays, `entities` and `repositories`. Types are Java-spelled strings; annotations
//! are `{ "name": "<qualified name>", "values": { ... } }` objects.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::declaration::RepositoryDecl;
use super::entity::EntityDescriptor;
use super::provider::DomainModel;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entity '{0}' is declared more than once")]
    DuplicateEntity(String),
    #[error("entity '{0}' declares more than one identifier")]
    MultipleIdentifiers(String),
}

#[derive(Debug, Deserialize)]
struct ModelInput {
    #[serde(default)]
    entities: Vec<EntityDescriptor>,
    #[serde(default)]
    repositories: Vec<RepositoryDecl>,
}

/// Read and validate a model file.
pub fn load_model(path: &Path) -> Result<DomainModel, ModelError> {
    let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_model(&text)
}

/// Parse and validate model JSON.
pub fn parse_model(text: &str) -> Result<DomainModel, ModelError> {
    let input: ModelInput = serde_json::from_str(text)?;
    let mut model = DomainModel::new();
    for entity in input.entities {
        check_identifiers(&entity)?;
        let name = entity.qualified_name.clone();
        if !model.insert_entity(entity) {
            return Err(ModelError::DuplicateEntity(name));
        }
    }
    model.repositories = input.repositories;
    tracing::debug!(
        entities = model.entities().count(),
        repositories = model.repositories.len(),
        "loaded model"
    );
    Ok(model)
}

fn check_identifiers(entity: &EntityDescriptor) -> Result<(), ModelError> {
    let identifiers = entity
        .members
        .iter()
        .filter(|m| m.kind() == super::entity::MemberKind::Identifier)
        .count();
    if identifiers > 1 && entity.id_class.is_none() {
        return Err(ModelError::MultipleIdentifiers(entity.qualified_name.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::provider::EntityProvider;

    const BOOK: &str = r#"{
        "entities": [{
            "qualifiedName": "org.example.Book",
            "kind": "entity",
            "members": [
                {"name": "isbn", "element": "field", "type": "java.lang.String",
                 "annotations": [{"name": "jakarta.persistence.Id"}]},
                {"name": "title", "element": "field", "type": "java.lang.String"}
            ]
        }],
        "repositories": [{"qualifiedName": "org.example.Library"}]
    }"#;

    #[test]
    fn test_parse_model() {
        let model = parse_model(BOOK).unwrap();
        let book = model.resolve("org.example.Book").unwrap();
        assert_eq!(book.members.len(), 2);
        assert_eq!(model.repositories.len(), 1);
    }

    #[test]
    fn test_duplicate_entities_are_rejected() {
        let text = r#"{"entities": [
            {"qualifiedName": "org.example.Book", "kind": "entity"},
            {"qualifiedName": "org.example.Book", "kind": "entity"}
        ]}"#;
        assert!(matches!(parse_model(text), Err(ModelError::DuplicateEntity(name)) if name == "org.example.Book"));
    }

    #[test]
    fn test_malformed_type_is_a_json_error() {
        let text = r#"{"entities": [{"qualifiedName": "org.example.Book", "kind": "entity",
            "members": [{"name": "x", "element": "field", "type": "java.util.List<"}]}]}"#;
        assert!(matches!(parse_model(text), Err(ModelError::Json(_))));
    }

    #[test]
    fn test_multiple_identifiers_need_an_id_class() {
        let text = r#"{"entities": [{"qualifiedName": "org.example.Loan", "kind": "entity",
            "members": [
                {"name": "book", "element": "field", "type": "java.lang.String",
                 "annotations": [{"name": "jakarta.persistence.Id"}]},
                {"name": "member", "element": "field", "type": "java.lang.String",
                 "annotations": [{"name": "jakarta.persistence.Id"}]}]}]}"#;
        assert!(matches!(parse_model(text), Err(ModelError::MultipleIdentifiers(_))));
        let with_class = text.replace(r#""kind": "entity","#, r#""kind": "entity", "idClass": "org.example.LoanId","#);
        assert!(parse_model(&with_class).is_ok());
    }
}
