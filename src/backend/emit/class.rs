//! The generated metamodel class.

use super::common::runtime;
use crate::backend::writer::JavaWriter;
use crate::backend::{GeneratedMember, MemberKind, Metamodel};
use crate::config::GeneratorConfig;
use crate::model::DeclKind;

/// Value of the `@Generated` annotation.
pub const GENERATOR_NAME: &str = "metagen";

/// Rank of members that precede the generated methods.
fn leading_rank(kind: MemberKind) -> Option<u8> {
    match kind {
        MemberKind::SessionField => Some(0),
        MemberKind::Constructor => Some(1),
        MemberKind::SessionGetter => Some(2),
        MemberKind::Finder | MemberKind::Query | MemberKind::Lifecycle => None,
    }
}

/// Members in declaration order: the session field and constructors, then everything else in key order.
fn ordered(metamodel: &Metamodel) -> Vec<&GeneratedMember> {
    let mut leading: Vec<&GeneratedMember> = metamodel
        .members()
        .filter(|m| leading_rank(m.kind).is_some())
        .collect();
    leading.sort_by_key(|m| leading_rank(m.kind));
    leading.extend(metamodel.members().filter(|m| leading_rank(m.kind).is_none()));
    leading
}

pub fn render_class(metamodel: &Metamodel, config: &GeneratorConfig) -> String {
    let mut imports = metamodel.imports.clone();
    let repository = imports.import_type(&metamodel.qualified_name);
    let generated = config
        .add_generated_annotation
        .then(|| imports.import_type(runtime::GENERATED));
    let dependent = (metamodel.data_repository && metamodel.session.implements_repository())
        .then(|| imports.import_type(runtime::DEPENDENT));

    let mut w = JavaWriter::new(config);
    let package = metamodel.package();
    if !package.is_empty() {
        w.writeln(&format!("package {package};"));
        w.newline();
    }
    let lines: Vec<&str> = imports.imports().collect();
    for import in &lines {
        w.writeln(&format!("import {import};"));
    }
    if !lines.is_empty() {
        w.newline();
    }

    w.writeln("/**");
    if metamodel.session.implements_repository() {
        w.writeln(&format!(" * Implements repository {{@link {repository}}}."));
    } else {
        w.writeln(&format!(" * Static query methods of {{@link {repository}}}."));
    }
    w.writeln(" */");
    if let Some(dependent) = dependent {
        w.writeln(&format!("@{dependent}"));
    }
    if let Some(generated) = generated {
        w.writeln(&format!("@{generated}(\"{GENERATOR_NAME}\")"));
    }
    let class = metamodel.generated_simple_name();
    let header = match (metamodel.session.implements_repository(), metamodel.kind) {
        (false, _) => format!("public abstract class {class} {{"),
        (true, DeclKind::Interface) => format!("public class {class} implements {repository} {{"),
        (true, DeclKind::Class) => format!("public class {class} extends {repository} {{"),
    };
    w.writeln(&header);
    w.indent();
    for (index, member) in ordered(metamodel).into_iter().enumerate() {
        if index > 0 {
            w.newline();
        }
        w.write_block(&member.declaration);
    }
    w.dedent();
    w.writeln("}");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::analysis::session;
    use crate::model::RepositoryDecl;

    fn render(repository: &RepositoryDecl, config: &GeneratorConfig) -> String {
        Metamodel::new(repository, session::setup_session(repository)).render(config)
    }

    #[test]
    fn test_static_queries_render_as_abstract_class() {
        let source = render(&RepositoryDecl::new("org.example.Queries"), &GeneratorConfig::new());
        assert!(source.contains(" * Static query methods of {@link Queries}.\n"));
        assert!(source.contains("public abstract class Queries_ {\n"));
        assert!(!source.contains("@Dependent"));
    }

    #[test]
    fn test_generated_annotation_can_be_left_out() {
        let config = GeneratorConfig::new().with_generated_annotation(false);
        let source = render(&RepositoryDecl::new("org.example.Queries"), &config);
        assert!(!source.contains("@Generated"));
        assert!(!source.contains("import "));
    }
}
