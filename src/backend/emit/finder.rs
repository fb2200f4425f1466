//! Finder methods: identifier, natural-key and criteria lookups.

use super::adapt::{self, Execution, QueryChain};
use super::common::{Emitter, attribute_links, runtime, string_literal};
use crate::backend::plan::FinderPlan;
use crate::frontend::analysis::params::ClassifiedParam;
use crate::frontend::analysis::strategy::LookupStrategy;
use crate::model::TypeRef;

pub(crate) fn emit_finder(em: &mut Emitter<'_>, plan: &FinderPlan) {
    let attributes: Vec<&ClassifiedParam> = plan.signature.attributes().collect();
    let entity = em.ty(&plan.entity);
    if attributes.is_empty() {
        em.javadoc(&format!("Find {{@link {entity}}}."));
    } else {
        em.javadoc(&format!("Find {{@link {entity}}} by {}.", attribute_links(&entity, &attributes)));
    }
    em.open_method(&plan.signature, &plan.session);
    em.null_checks(&plan.signature.params);
    match plan.strategy {
        LookupStrategy::Identifier => identifier(em, plan, &attributes),
        LookupStrategy::NaturalKey => natural_key(em, plan, &attributes),
        LookupStrategy::Criteria => criteria(em, plan, &attributes),
    }
    em.close_block();
}

fn profile_calls(plan: &FinderPlan) -> Vec<String> {
    plan.fetch_profiles
        .iter()
        .map(|profile| format!(".enableFetchProfile({})", string_literal(profile)))
        .collect()
}

fn identifier(em: &mut Emitter<'_>, plan: &FinderPlan, attributes: &[&ClassifiedParam]) {
    let id = attributes.first().map(|p| p.variable()).unwrap_or_default();
    let class = em.entity_class(&plan.entity);
    let lines = if plan.fetch_profiles.is_empty() {
        let operation = plan.session.flavor.find_by_id_operation();
        vec![format!("{}.{operation}({class}, {id})", plan.session.expression)]
    } else {
        let session = em.hibernate_session(&plan.session);
        let mut lines = vec![format!("{session}.byId({class})")];
        lines.extend(profile_calls(plan));
        lines.push(format!(".load({id})"));
        lines
    };
    missing_result(em, plan, lines, &format!("\"No '{}' for given id [\" + {id} + \"]\"", simple(plan)));
}

fn natural_key(em: &mut Emitter<'_>, plan: &FinderPlan, attributes: &[&ClassifiedParam]) {
    let class = em.entity_class(&plan.entity);
    if plan.session.flavor.is_reactive() {
        let identifier = em.ty(runtime::IDENTIFIER);
        let mut ids = Vec::with_capacity(attributes.len());
        for param in attributes {
            let attribute = em.attribute(&plan.entity, &param.binding);
            ids.push(format!("{identifier}.id({attribute}, {})", param.variable()));
        }
        let key = match ids.as_slice() {
            [single] => single.clone(),
            _ => format!("{identifier}.composite({})", ids.join(", ")),
        };
        let lines = vec![format!("{}.find({class}, {key})", plan.session.expression)];
        return missing_result(em, plan, lines, &format!("\"No '{}' for given natural id\"", simple(plan)));
    }

    let session = em.hibernate_session(&plan.session);
    let mut lines = Vec::new();
    match attributes {
        [single] => {
            lines.push(format!("{session}.bySimpleNaturalId({class})"));
            lines.extend(profile_calls(plan));
            lines.push(format!(".load({})", single.variable()));
        }
        _ => {
            lines.push(format!("{session}.byNaturalId({class})"));
            for param in attributes {
                let attribute = em.attribute(&plan.entity, &param.binding);
                lines.push(format!(".using({attribute}, {})", param.variable()));
            }
            lines.extend(profile_calls(plan));
            lines.push(".load()".to_string());
        }
    }
    missing_result(em, plan, lines, &format!("\"No '{}' for given natural id\"", simple(plan)));
}

fn simple(plan: &FinderPlan) -> &str {
    metagen_core::simple_name(&plan.entity)
}

/// Return the lookup result; Jakarta Data repositories turn a missing entity into `EmptyResultException`.
fn missing_result(em: &mut Emitter<'_>, plan: &FinderPlan, mut lines: Vec<String>, message: &str) {
    if !plan.data_repository {
        if let Some(first) = lines.first_mut() {
            first.insert_str(0, "return ");
        }
        em.out.write_chain(&lines, ";");
        return;
    }
    let empty = em.ty(runtime::DATA_EMPTY_RESULT);
    if plan.session.flavor.is_reactive() {
        if let Some(first) = lines.first_mut() {
            first.insert_str(0, "return ");
        }
        lines.push(format!(".onItem().ifNull().failWith(() -> new {empty}({message}))"));
        em.out.write_chain(&lines, ";");
        return;
    }
    if let Some(first) = lines.first_mut() {
        first.insert_str(0, "var _result = ");
    }
    em.out.write_chain(&lines, ";");
    em.out.writeln(&format!("if (_result == null) throw new {empty}({message});"));
    em.out.writeln("return _result;");
}

fn criteria(em: &mut Emitter<'_>, plan: &FinderPlan, attributes: &[&ClassifiedParam]) {
    let session = &plan.session.expression;
    let factory = if plan.session.flavor.uses_entity_manager() {
        "getEntityManagerFactory"
    } else {
        "getFactory"
    };
    let class = em.entity_class(&plan.entity);
    em.out
        .writeln(&format!("var _builder = {session}.{factory}().getCriteriaBuilder();"));
    em.out.writeln(&format!("var _query = _builder.createQuery({class});"));
    em.out.writeln(&format!("var _entity = _query.from({class});"));

    if !attributes.is_empty() {
        em.out.writeln("_query.where(");
        em.out.indent();
        em.out.indent();
        for (index, param) in attributes.iter().enumerate() {
            let separator = if index + 1 == attributes.len() { "" } else { "," };
            let path = em.criteria_path("_entity", &plan.entity, &param.binding);
            let variable = param.variable();
            if param.nullable && !param.type_.is_primitive() {
                em.out.writeln(&format!("{variable}==null"));
                em.out.indent();
                em.out.writeln(&format!("? {path}.isNull()"));
                em.out.writeln(&format!(": _builder.equal({path}, {variable}){separator}"));
                em.out.dedent();
            } else {
                em.out.writeln(&format!("_builder.equal({path}, {variable}){separator}"));
            }
        }
        em.out.dedent();
        em.out.dedent();
        em.out.writeln(");");
    }

    if !plan.order_by.is_empty() {
        let mut orders = Vec::with_capacity(plan.order_by.len());
        for spec in &plan.order_by {
            let mut path = em.criteria_path("_entity", &plan.entity, &spec.path);
            if spec.ignore_case {
                path = format!("_builder.lower({path})");
            }
            let direction = if spec.descending { "desc" } else { "asc" };
            orders.push(format!("_builder.{direction}({path})"));
        }
        em.out.writeln(&format!("_query.orderBy({});", orders.join(", ")));
    }

    let element = TypeRef::declared(plan.entity.clone());
    let exec = Execution {
        signature: &plan.signature,
        session: &plan.session,
        container: plan.container,
        element: Some(&element),
        static_orders: &[],
        mutation: false,
        data_repository: plan.data_repository,
    };
    let ordered = adapt::collect_orders(em, &exec);
    let mut chain = QueryChain::new(format!("{session}.createQuery(_query)"), &plan.session);
    for call in profile_calls(plan) {
        chain.push_hibernate(em, call);
    }
    adapt::limit_and_order(em, &exec, &mut chain, ordered);
    adapt::execute(em, &exec, chain);
}
