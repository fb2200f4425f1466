//! Integration tests for the metagen pipeline: model loading, rounds, and class rendering

use std::fs;
use std::path::Path;

use metagen::config::GeneratorConfig;
use metagen::diagnostics::CollectingSink;
use metagen::driver::Driver;
use metagen::model::{self, DomainModel};
use metagen::query::HqlValidator;
use metagen::Metamodel;

/// Run every round over a model and collect what it produced.
fn generate(model: &DomainModel, config: &GeneratorConfig) -> (Vec<Metamodel>, CollectingSink) {
    let validator = HqlValidator;
    let mut sink = CollectingSink::new();
    let mut driver = Driver::new(config, &validator);
    driver.run(model, &mut sink);
    (driver.into_metamodels(), sink)
}

fn fixtures(dir: &str) -> Vec<std::path::PathBuf> {
    let mut paths: Vec<_> = fs::read_dir(Path::new("tests/fixtures").join(dir))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();
    paths
}

/// Every valid fixture is generated without diagnostics.
#[test]
fn test_valid_fixtures() {
    let config = GeneratorConfig::new();
    for path in fixtures("valid") {
        let model = model::load_model(&path).unwrap();
        let (metamodels, sink) = generate(&model, &config);
        assert!(
            sink.diagnostics().is_empty(),
            "Expected {} to generate cleanly, got: {:?}",
            path.display(),
            sink.messages()
        );
        assert_eq!(metamodels.len(), model.repositories.len(), "{}", path.display());
    }
}

/// Every invalid fixture reports at least one error.
#[test]
fn test_invalid_fixtures() {
    let config = GeneratorConfig::new();
    for path in fixtures("invalid") {
        let model = model::load_model(&path).unwrap();
        let (_, sink) = generate(&model, &config);
        assert!(
            sink.has_errors(),
            "Expected {} to report errors",
            path.display()
        );
    }
}

#[test]
fn test_library_members() {
    let config = GeneratorConfig::new();
    let model = model::load_model(Path::new("tests/fixtures/valid/library.json")).unwrap();
    let (metamodels, _) = generate(&model, &config);
    let library = &metamodels[0];

    let names: Vec<&str> = library.members().map(|m| m.property_name.as_str()).collect();
    for expected in ["findByIsbn", "findByIsbn10", "findByTitle", "TITLES_int", "SHORT_BOOKS_int", "session"] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }
    // the concrete default method gets nothing
    assert!(!names.contains(&"count"));
}

#[test]
fn test_rendered_library_class() {
    let config = GeneratorConfig::new();
    let model = model::load_model(Path::new("tests/fixtures/valid/library.json")).unwrap();
    let (metamodels, _) = generate(&model, &config);
    let source = metamodels[0].render(&config);

    assert!(source.starts_with("package org.example;\n"));
    assert!(source.contains("import org.hibernate.Session;\n"));
    assert!(source.contains("public class Library_ implements Library {\n"));
    assert!(source.contains("@Generated(\"metagen\")"));
    assert!(source.contains("return session.find(Book.class, isbn);"));
    assert!(source.contains("session.bySimpleNaturalId(Book.class)"));
    assert!(source.contains("static final String TITLES_int = \"select title from Book where pages = :pages\";"));
    assert!(source.ends_with("}\n"));

    // The constructor comes before the generated methods
    let constructor = source.find("public Library_(").unwrap();
    let finder = source.find("public Book findByIsbn(").unwrap();
    assert!(constructor < finder);
}

#[test]
fn test_rendered_data_repository() {
    let config = GeneratorConfig::new();
    let model = model::load_model(Path::new("tests/fixtures/valid/bookshelf.json")).unwrap();
    let (metamodels, _) = generate(&model, &config);
    let source = metamodels[0].render(&config);

    assert!(source.starts_with("package org.example.store;\n"));
    assert!(source.contains("import org.example.Book;\n"));
    assert!(source.contains("@Dependent\n"));
    assert!(source.contains("private void openSession() {"));
    assert!(source.contains("for (var _entity : books) {"));
    assert!(source.contains("catch (EntityExistsException exception) {"));
    assert!(source.contains(".executeUpdate();"));
}

#[test]
fn test_generation_is_deterministic() {
    let config = GeneratorConfig::new().with_inject_annotation(true);
    let model = model::load_model(Path::new("tests/fixtures/valid/bookshelf.json")).unwrap();
    let (first, _) = generate(&model, &config);
    let (second, _) = generate(&model, &config);
    assert_eq!(first[0].render(&config), second[0].render(&config));
}

#[test]
fn test_invalid_method_is_left_out_but_class_is_kept() {
    let config = GeneratorConfig::new();
    let model = model::load_model(Path::new("tests/fixtures/invalid/wrong_parameter_type.json")).unwrap();
    let (metamodels, sink) = generate(&model, &config);

    assert_eq!(sink.errors().count(), 1);
    assert_eq!(metamodels.len(), 1);
    assert!(metamodels[0].members().all(|m| m.property_name != "book"));
    let error = sink.errors().next().unwrap();
    assert_eq!(error.location.method.as_deref(), Some("book"));
    assert_eq!(error.location.parameter.as_deref(), Some("isbn"));
}

#[test]
fn test_missing_model_file_is_an_io_error() {
    let result = model::load_model(Path::new("tests/fixtures/does_not_exist.json"));
    assert!(matches!(result, Err(model::ModelError::Io { .. })));
}
