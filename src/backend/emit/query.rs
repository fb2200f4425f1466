//! Query-text methods.
//!
//! The text goes into a `static final String` constant named after the method and its parameter types, so that
//! overloads get distinct constants. The method body creates the query from the constant, binds its parameters,
//! and executes it through [`adapt`].

use super::adapt::{self, Execution, QueryChain};
use super::common::{Emitter, constant_case, string_literal, type_token};
use crate::backend::plan::QueryPlan;
use crate::frontend::query::ParameterLabel;
use crate::model::TypeRef;

/// `FIND_BY_TITLE_String` for `findByTitle(String title)`.
pub(crate) fn constant_name(plan: &QueryPlan) -> String {
    let mut name = constant_case(&plan.signature.name);
    for param in &plan.signature.params {
        name.push('_');
        name.push_str(&type_token(&param.type_));
    }
    name
}

pub(crate) fn emit_query(em: &mut Emitter<'_>, plan: &QueryPlan) {
    let constant = constant_name(plan);
    em.out.writeln(&format!("static final String {constant} = {};", string_literal(&plan.text)));
    em.out.newline();
    em.javadoc(&format!("Execute the query {{@value #{constant}}}."));
    em.open_method(&plan.signature, &plan.session);

    let session = &plan.session.expression;
    let result = plan.result.as_ref().filter(|t| !t.is_void());
    let create = if plan.dialect.is_native() {
        "createNativeQuery"
    } else if plan.mutation {
        if plan.session.flavor.uses_entity_manager() {
            "createQuery"
        } else {
            "createMutationQuery"
        }
    } else if plan.session.flavor.uses_entity_manager() || result.is_none() {
        "createQuery"
    } else {
        "createSelectionQuery"
    };
    let head = match result.filter(|t| !plan.mutation && typed_result(t)) {
        Some(result) => {
            let class = em.class_literal(result);
            format!("{session}.{create}({constant}, {class})")
        }
        None => format!("{session}.{create}({constant})"),
    };

    let exec = Execution {
        signature: &plan.signature,
        session: &plan.session,
        container: plan.container,
        element: plan.result.as_ref(),
        static_orders: &plan.order_by,
        mutation: plan.mutation,
        data_repository: plan.data_repository,
    };
    let ordered = !plan.mutation && adapt::collect_orders(em, &exec);
    let mut chain = QueryChain::new(head, &plan.session);
    for binding in &plan.bindings {
        let Some(param) = plan.signature.params.get(binding.param) else {
            continue;
        };
        let variable = param.variable();
        match &binding.label {
            ParameterLabel::Named(name) => chain.push(format!(".setParameter({}, {variable})", string_literal(name))),
            ParameterLabel::Positional(position) => chain.push(format!(".setParameter({position}, {variable})")),
        }
    }
    adapt::limit_and_order(em, &exec, &mut chain, ordered);
    adapt::execute(em, &exec, chain);
    em.close_block();
}

/// Whether the query is created with a result class.
fn typed_result(result: &TypeRef) -> bool {
    matches!(result, TypeRef::Declared { .. } | TypeRef::Array(_) | TypeRef::Primitive(_))
}
