//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{Metamodel, emit};
use crate::config::GeneratorConfig;
use crate::driver::Driver;
use crate::frontend::analysis::{Analysis, Analyzer};
use crate::frontend::diagnostics::{self, CollectingSink, Diagnostic};
use crate::frontend::query::{HqlValidator, QuerySyntaxError};
use crate::model::{self, DomainModel, RepositoryDecl};

use super::{CliError, CliResult, ExitCode};

// ============================================================================
// Shared helpers
// ============================================================================

fn load(path: &Path) -> CliResult<DomainModel> {
    model::load_model(path).map_err(|e| CliError::failure(format!("error: {e}")))
}

/// Print one diagnostic. Query problems are rendered with the query text and a label at the offending span.
fn print(file_name: &str, diagnostic: &Diagnostic) {
    match &diagnostic.source {
        Some((text, span)) if diagnostic.is_error() => {
            let report = miette::Report::new(QuerySyntaxError::new(diagnostic.message.clone(), text, *span));
            eprintln!("{report:?}");
            eprintln!("  --> {file_name}: {}", diagnostic.location);
            for note in &diagnostic.notes {
                eprintln!("  = note: {note}");
            }
            for hint in &diagnostic.hints {
                eprintln!("  = hint: {hint}");
            }
            eprintln!();
        }
        _ => diagnostics::print_diagnostic(file_name, diagnostic),
    }
}

/// Print everything in `sink` and pick the exit code.
fn report_all(file_name: &str, sink: &CollectingSink) -> ExitCode {
    for diagnostic in sink.diagnostics() {
        print(file_name, diagnostic);
    }
    let errors = sink.errors().count();
    let warnings = sink.diagnostics().len() - errors;
    if errors > 0 || warnings > 0 {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }
    if errors > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Run every round over `model`.
fn analyze(model: &DomainModel, config: &GeneratorConfig, sink: &mut CollectingSink) -> Vec<Metamodel> {
    let validator = HqlValidator;
    let mut driver = Driver::new(config, &validator);
    driver.run(model, sink);
    tracing::debug!(rounds = driver.rounds(), "analysis finished");
    driver.into_metamodels()
}

/// Validate output directory path to prevent path traversal attacks.
fn validate_output_dir(out_dir: &Path) -> CliResult<()> {
    for component in out_dir.components() {
        if let std::path::Component::ParentDir = component {
            return Err(CliError::failure(format!(
                "Output directory '{}' contains path traversal (..)",
                out_dir.display()
            )));
        }
    }
    if out_dir.is_absolute() {
        tracing::warn!("Using absolute output path: {}", out_dir.display());
    }
    Ok(())
}

/// Where the generated class of `metamodel` is written, below `out_dir`.
pub fn output_path(out_dir: &Path, metamodel: &Metamodel) -> PathBuf {
    let mut path = out_dir.to_path_buf();
    let package = metamodel.package();
    if !package.is_empty() {
        path.extend(package.split('.'));
    }
    path.join(format!("{}.java", metamodel.generated_simple_name()))
}

fn find_repository<'m>(model: &'m DomainModel, name: &str) -> CliResult<&'m RepositoryDecl> {
    model
        .repository(name)
        .or_else(|| model.repositories.iter().find(|r| r.simple_name() == name))
        .ok_or_else(|| CliError::failure(format!("error: no repository named '{name}'")))
}

// ============================================================================
// Commands
// ============================================================================

/// Analyze a model and report diagnostics without writing anything.
pub fn check_model(path: &Path, config: &GeneratorConfig) -> CliResult<ExitCode> {
    let model = load(path)?;
    let mut sink = CollectingSink::new();
    let metamodels = analyze(&model, config, &mut sink);
    let exit = report_all(&path.display().to_string(), &sink);
    if exit == ExitCode::SUCCESS {
        let members: usize = metamodels.iter().map(Metamodel::len).sum();
        println!("✓ {} repositories, {members} members", metamodels.len());
    }
    Ok(exit)
}

/// Analyze a model and write one Java file per repository.
///
/// Files are written even when some methods had errors; those methods are missing from the output.
pub fn generate(path: &Path, out_dir: &Path, config: &GeneratorConfig) -> CliResult<ExitCode> {
    validate_output_dir(out_dir)?;
    let model = load(path)?;
    let mut sink = CollectingSink::new();
    let metamodels = analyze(&model, config, &mut sink);
    let exit = report_all(&path.display().to_string(), &sink);

    for metamodel in &metamodels {
        let target = output_path(out_dir, metamodel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CliError::failure(format!("error: cannot create '{}': {e}", parent.display())))?;
        }
        fs::write(&target, metamodel.render(config))
            .map_err(|e| CliError::failure(format!("error: cannot write '{}': {e}", target.display())))?;
        tracing::info!(file = %target.display(), members = metamodel.len(), "written");
        println!("{}", target.display());
    }
    Ok(exit)
}

/// Show how one method is classified and what is generated for it.
pub fn explain(path: &Path, repository: &str, method: &str, config: &GeneratorConfig) -> CliResult<ExitCode> {
    let model = load(path)?;
    let repository = find_repository(&model, repository)?;
    let Some(decl) = repository.method(method) else {
        return Err(CliError::failure(format!(
            "error: repository '{}' has no method '{method}'",
            repository.qualified_name
        )));
    };

    let validator = HqlValidator;
    let analyzer = Analyzer::new(&model, &validator, config);
    let mut metamodel = analyzer
        .prepare(repository)
        .map_err(|e| CliError::failure(format!("error: {e}")))?;
    let analysis = analyzer
        .plan_method(repository, &metamodel.session, decl)
        .map_err(|e| CliError::failure(format!("error: {e}")))?;

    let analysis = match analysis {
        Analysis::Deferred(reason) => {
            println!("deferred: {reason}");
            return Ok(ExitCode::SUCCESS);
        }
        Analysis::Done(analysis) => analysis,
    };
    match analysis.class {
        Some(class) => println!("class: {class:?}"),
        None => println!("class: not a generated method"),
    }
    if let Some(plan) = &analysis.plan {
        println!("plan: {}", plan.describe());
    }

    let mut sink = CollectingSink::new();
    analyzer
        .analyze_method(repository, decl, &mut metamodel, &mut sink)
        .map_err(|e| CliError::failure(format!("error: {e}")))?;
    let exit = report_all(&path.display().to_string(), &sink);
    if let Some(member) = analysis.plan.as_ref().and_then(|plan| metamodel.member(&emit::member_key(plan))) {
        println!();
        print!("{}", member.declaration);
    }
    Ok(exit)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::frontend::analysis::session;

    #[test]
    fn test_output_path_follows_package() {
        let repo = RepositoryDecl::new("org.example.store.Library");
        let metamodel = Metamodel::new(&repo, session::setup_session(&repo));
        assert_eq!(
            output_path(Path::new("out"), &metamodel),
            PathBuf::from("out/org/example/store/Library_.java")
        );
    }

    #[test]
    fn test_output_path_in_default_package() {
        let repo = RepositoryDecl::new("Library");
        let metamodel = Metamodel::new(&repo, session::setup_session(&repo));
        assert_eq!(output_path(Path::new("out"), &metamodel), PathBuf::from("out/Library_.java"));
    }

    #[test]
    fn test_output_dir_rejects_traversal() {
        assert!(validate_output_dir(Path::new("../elsewhere")).is_err());
        assert!(validate_output_dir(Path::new("generated/java")).is_ok());
    }

    #[test]
    fn test_find_repository_by_simple_name() {
        let model = DomainModel::new().with_repository(RepositoryDecl::new("org.example.Library"));
        assert_eq!(find_repository(&model, "Library").unwrap().qualified_name, "org.example.Library");
        assert!(find_repository(&model, "Shelf").is_err());
    }
}
