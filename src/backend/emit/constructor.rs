//! Members generated for the repository itself: the session field and constructors, and the session getter.

use metagen_core::lang::sessions::SessionFlavor;

use super::common::{Emitter, runtime, string_literal};
use crate::model::TypeRef;

fn annotation(em: &mut Emitter<'_>, qualified: &str) {
    let name = em.ty(qualified);
    em.out.writeln(&format!("@{name}"));
}

fn session_type(em: &mut Emitter<'_>, flavor: SessionFlavor) -> String {
    em.type_ref(&TypeRef::known(flavor.type_id()))
}

fn nonnull(em: &mut Emitter<'_>) -> String {
    if em.config.add_nonnull_annotation {
        format!("@{} ", em.ty(runtime::NONNULL))
    } else {
        String::new()
    }
}

pub(crate) fn emit_repository_constructor(em: &mut Emitter<'_>, class: &str, flavor: SessionFlavor, field: &str) {
    let session = session_type(em, flavor);
    let nonnull = nonnull(em);
    em.out.writeln(&format!("protected {nonnull}{session} {field};"));
    em.out.newline();
    if em.config.add_inject_annotation {
        annotation(em, runtime::INJECT);
    }
    em.out.writeln(&format!("public {class}({nonnull}{session} {field}) {{"));
    em.out.indent();
    em.out.writeln(&format!("this.{field} = {field};"));
    em.close_block();
}

pub(crate) fn emit_session_getter(em: &mut Emitter<'_>, flavor: SessionFlavor, name: &str, field: &str) {
    let session = session_type(em, flavor);
    em.out.writeln("@Override");
    em.out.writeln(&format!("public {session} {name}() {{"));
    em.out.indent();
    em.out.writeln(&format!("return {field};"));
    em.close_block();
}

pub(crate) fn emit_default_constructor(
    em: &mut Emitter<'_>,
    class: &str,
    flavor: SessionFlavor,
    field: &str,
    data_store: Option<&str>,
) {
    let unit = em.ty(runtime::PERSISTENCE_UNIT);
    match data_store {
        Some(name) => em.out.writeln(&format!("@{unit}(unitName = {})", string_literal(name))),
        None => em.out.writeln(&format!("@{unit}")),
    }
    let factory = em.ty(runtime::ENTITY_MANAGER_FACTORY);
    em.out.writeln(&format!("private {factory} sessionFactory;"));
    em.out.newline();

    let native_factory = em.ty(runtime::SESSION_FACTORY);
    let open = if flavor.is_stateless() {
        "openStatelessSession"
    } else {
        "openSession"
    };
    annotation(em, runtime::POST_CONSTRUCT);
    em.out.writeln("private void openSession() {");
    em.out.indent();
    em.out
        .writeln(&format!("{field} = sessionFactory.unwrap({native_factory}.class).{open}();"));
    em.close_block();
    em.out.newline();

    annotation(em, runtime::PRE_DESTROY);
    em.out.writeln("private void closeSession() {");
    em.out.indent();
    em.out.writeln(&format!("{field}.close();"));
    em.close_block();
    em.out.newline();

    if em.config.add_inject_annotation {
        annotation(em, runtime::INJECT);
    }
    em.out.writeln(&format!("{class}() {{"));
    em.out.writeln("}");
}
