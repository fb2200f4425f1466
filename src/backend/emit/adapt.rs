//! Query execution and result adaptation.
//!
//! Finders and query methods both end in a query object built as a call chain. This module appends paging and
//! ordering to the chain, executes it in the shape of the declared result container, and wraps the statement in
//! the exception translation of Jakarta Data repositories.

use metagen_core::lang::types::KnownTypeId;

use super::common::{Emitter, runtime, string_literal};
use crate::backend::plan::{OrderSpec, SessionBinding, Signature};
use crate::frontend::analysis::params::SpecialKind;
use crate::frontend::analysis::returns::ResultContainer;
use crate::model::TypeRef;

/// A query expression under construction, one call per line.
pub(crate) struct QueryChain {
    lines: Vec<String>,
    /// The chain already has a Hibernate query type.
    hibernate: bool,
}

impl QueryChain {
    pub fn new(head: String, session: &SessionBinding) -> Self {
        Self {
            lines: vec![head],
            hibernate: !session.flavor.uses_entity_manager(),
        }
    }

    pub fn push(&mut self, call: String) {
        self.lines.push(call);
    }

    /// Append a call only Hibernate query types offer, unwrapping a JPA query first.
    pub fn push_hibernate(&mut self, em: &mut Emitter<'_>, call: String) {
        if !self.hibernate {
            let query = em.known(KnownTypeId::SelectionQuery);
            self.lines.push(format!(".unwrap({query}.class)"));
            self.hibernate = true;
        }
        self.lines.push(call);
    }
}

/// What the execution of a query chain needs to know about its method.
pub(crate) struct Execution<'p> {
    pub signature: &'p Signature,
    pub session: &'p SessionBinding,
    pub container: ResultContainer,
    /// The type of each result, when known.
    pub element: Option<&'p TypeRef>,
    /// Static orders given by `@OrderBy` and applied with the dynamic ones.
    pub static_orders: &'p [OrderSpec],
    pub mutation: bool,
    pub data_repository: bool,
}

impl Execution<'_> {
    fn reactive(&self) -> bool {
        self.session.flavor.is_reactive()
    }

    fn param_of(&self, kind: SpecialKind) -> Option<String> {
        self.signature.special(|k| k == kind).next().map(|p| p.variable())
    }

    fn ordered_entity(&self) -> String {
        self.element
            .and_then(TypeRef::erased_name)
            .unwrap_or(metagen_core::lang::types::as_str(KnownTypeId::Object))
            .to_string()
    }
}

/// Collect every ordering of the method into `_orders`.
///
/// ## Returns
/// - Whether any ordering was collected.
pub(crate) fn collect_orders(em: &mut Emitter<'_>, exec: &Execution<'_>) -> bool {
    let orderings: Vec<_> = exec.signature.special(SpecialKind::is_ordering).collect();
    if orderings.is_empty() && exec.static_orders.is_empty() {
        return false;
    }
    let entity = exec.ordered_entity();
    let order = em.known(KnownTypeId::HibOrder);
    let array_list = em.ty(runtime::ARRAY_LIST);
    let entity_type = em.ty(&entity);
    em.out
        .writeln(&format!("var _orders = new {array_list}<{order}<? super {entity_type}>>();"));

    for spec in exec.static_orders {
        let direction = direction(em, if spec.descending { "DESCENDING" } else { "ASCENDING" });
        let class = em.entity_class(&entity);
        em.out.writeln(&format!(
            "_orders.add({order}.by({class}, {}, {direction}, {}));",
            string_literal(&spec.path),
            spec.ignore_case
        ));
    }

    for param in orderings {
        let name = param.variable();
        match param.special {
            Some(SpecialKind::Order { many: false }) => em.out.writeln(&format!("_orders.add({name});")),
            Some(SpecialKind::Order { many: true }) => {
                if param.type_.component().is_some() {
                    let list = em.known(KnownTypeId::List);
                    em.out.writeln(&format!("_orders.addAll({list}.of({name}));"));
                } else {
                    em.out.writeln(&format!("_orders.addAll({name});"));
                }
            }
            Some(SpecialKind::Sort { many: false }) => {
                let add = sort_to_order(em, &entity, &name);
                em.out.writeln(&add);
            }
            Some(SpecialKind::Sort { many: true }) => {
                em.out.writeln(&format!("for (var _sort : {name}) {{"));
                em.out.indent();
                let add = sort_to_order(em, &entity, "_sort");
                em.out.writeln(&add);
                em.close_block();
            }
            Some(SpecialKind::DataOrder) => {
                em.out.writeln(&format!("for (var _sort : {name}.sorts()) {{"));
                em.out.indent();
                let add = sort_to_order(em, &entity, "_sort");
                em.out.writeln(&add);
                em.close_block();
            }
            _ => {}
        }
    }
    true
}

fn direction(em: &mut Emitter<'_>, constant: &str) -> String {
    format!("{}.{constant}", em.ty(runtime::SORT_DIRECTION))
}

fn sort_to_order(em: &mut Emitter<'_>, entity: &str, sort: &str) -> String {
    let order = em.known(KnownTypeId::HibOrder);
    let class = em.entity_class(entity);
    let ascending = direction(em, "ASCENDING");
    let descending = direction(em, "DESCENDING");
    format!(
        "_orders.add({order}.by({class}, {sort}.property(), {sort}.isAscending() ? {ascending} : {descending}, {sort}.ignoreCase()));"
    )
}

/// Append paging and the collected orders to `chain`.
pub(crate) fn limit_and_order(em: &mut Emitter<'_>, exec: &Execution<'_>, chain: &mut QueryChain, ordered: bool) {
    for param in exec.signature.special(SpecialKind::is_paging) {
        let name = param.variable();
        match param.special {
            Some(SpecialKind::Page) => {
                chain.push(format!(".setFirstResult({name}.getFirstResult())"));
                chain.push(format!(".setMaxResults({name}.getMaxResults())"));
            }
            Some(SpecialKind::PageRequest) => {
                chain.push(format!(".setFirstResult((int) ({name}.page() - 1) * {name}.size())"));
                chain.push(format!(".setMaxResults({name}.size())"));
            }
            Some(SpecialKind::Limit) => {
                chain.push(format!(".setFirstResult((int) {name}.startAt() - 1)"));
                chain.push(format!(".setMaxResults({name}.maxResults())"));
            }
            Some(SpecialKind::KeyedPage) if exec.container != ResultContainer::KeyedResultList => {
                chain.push(format!(".setFirstResult({name}.getPage().getFirstResult())"));
                chain.push(format!(".setMaxResults({name}.getPage().getMaxResults())"));
            }
            _ => {}
        }
    }
    if ordered {
        chain.push_hibernate(em, ".setOrder(_orders)".to_string());
    }
}

/// Execute `chain` and return its results in the declared shape.
pub(crate) fn execute(em: &mut Emitter<'_>, exec: &Execution<'_>, mut chain: QueryChain) {
    if exec.mutation {
        return execute_mutation(em, exec, chain);
    }
    let reactive = exec.reactive();
    let element = exec.element.map(|t| em.type_ref(&t.erasure()));
    let mut result_statement = None;

    match exec.container {
        ResultContainer::Single => chain.push(".getSingleResult()".to_string()),
        ResultContainer::Array => {
            let element = element.unwrap_or_else(|| "Object".to_string());
            chain.push(".getResultList()".to_string());
            if reactive {
                chain.push(format!(".map(_list -> _list.toArray(new {element}[0]))"));
            } else {
                chain.push(format!(".toArray(new {element}[0])"));
            }
        }
        ResultContainer::List => chain.push(".getResultList()".to_string()),
        ResultContainer::Stream => chain.push(".getResultStream()".to_string()),
        ResultContainer::Optional => {
            if reactive {
                let optional = em.known(KnownTypeId::Optional);
                chain.push(".getSingleResultOrNull()".to_string());
                chain.push(format!(".map({optional}::ofNullable)"));
            } else {
                chain.push(".getResultStream()".to_string());
                chain.push(".findFirst()".to_string());
            }
        }
        ResultContainer::Page => {
            let page_request = exec.param_of(SpecialKind::PageRequest).unwrap_or_default();
            let record = em.ty(runtime::PAGE_RECORD);
            let wrap = format!("new {record}<>({page_request}, _results, -1L)");
            chain.push(".getResultList()".to_string());
            if reactive {
                chain.push(format!(".map(_results -> {wrap})"));
            } else {
                result_statement = Some(wrap);
            }
        }
        ResultContainer::CursoredPage => {
            let page_request = exec.param_of(SpecialKind::PageRequest).unwrap_or_default();
            let record = em.ty(runtime::CURSORED_PAGE_RECORD);
            chain.push(".getResultList()".to_string());
            result_statement = Some(format!("new {record}<>(_results, {page_request})"));
        }
        ResultContainer::KeyedResultList => {
            let keyed_page = exec.param_of(SpecialKind::KeyedPage).unwrap_or_default();
            chain.push_hibernate(em, format!(".getKeyedResultList({keyed_page})"));
        }
        ResultContainer::QueryObject(id) => {
            let hibernate_type = matches!(id, KnownTypeId::HibQuery | KnownTypeId::SelectionQuery);
            if hibernate_type && exec.session.flavor.uses_entity_manager() {
                let query = em.known(id);
                chain.push(format!(".unwrap({query}.class)"));
            }
        }
    }

    let single = exec.container.is_single();
    if reactive && exec.data_repository {
        translate_reactive_failures(em, &mut chain, single);
    }

    let returns_nothing = exec.signature.return_type.is_void();
    let translate = exec.data_repository && !reactive;
    with_translation(em, translate, single, |em| match result_statement {
        Some(wrap) => {
            write_statement(em, "var _results = ", chain);
            em.out.writeln(&format!("return {wrap};"));
        }
        None if returns_nothing => write_statement(em, "", chain),
        None => write_statement(em, "return ", chain),
    });
}

fn execute_mutation(em: &mut Emitter<'_>, exec: &Execution<'_>, mut chain: QueryChain) {
    chain.push(".executeUpdate()".to_string());
    let reactive = exec.reactive();
    let returned = exec.element.map(TypeRef::boxed);
    let is = |id: KnownTypeId| returned.as_ref().is_some_and(|t| t.is_known(id));

    if reactive {
        if is(KnownTypeId::Boolean) {
            chain.push(".map(_rows -> _rows > 0)".to_string());
        } else if is(KnownTypeId::Void) {
            chain.push(".replaceWithVoid()".to_string());
        }
        if exec.data_repository {
            translate_reactive_failures(em, &mut chain, false);
        }
        write_statement(em, "return ", chain);
        return;
    }

    with_translation(em, exec.data_repository, false, |em| {
        if exec.signature.return_type.is_void() {
            write_statement(em, "", chain);
        } else if is(KnownTypeId::Boolean) {
            em.out.write_chain(&prefixed("return ", chain.lines), " > 0;");
        } else {
            write_statement(em, "return ", chain);
        }
    });
}

fn prefixed(prefix: &str, mut lines: Vec<String>) -> Vec<String> {
    if let Some(first) = lines.first_mut() {
        first.insert_str(0, prefix);
    }
    lines
}

fn write_statement(em: &mut Emitter<'_>, prefix: &str, chain: QueryChain) {
    em.out.write_chain(&prefixed(prefix, chain.lines), ";");
}

fn translate_reactive_failures(em: &mut Emitter<'_>, chain: &mut QueryChain, single: bool) {
    let mut translations = Vec::new();
    if single {
        translations.push((runtime::NO_RESULT, runtime::DATA_EMPTY_RESULT));
    }
    translations.push((runtime::PERSISTENCE_EXCEPTION, runtime::DATA_EXCEPTION));
    for (caught, thrown) in translations {
        let caught = em.ty(caught);
        let thrown = em.ty(thrown);
        chain.push(format!(
            ".onFailure({caught}.class).transform(_ex -> new {thrown}(_ex.getMessage(), _ex))"
        ));
    }
}

/// Run `body`, inside a `try` translating persistence exceptions when `translate` is set.
pub(crate) fn with_translation(
    em: &mut Emitter<'_>,
    translate: bool,
    single: bool,
    body: impl FnOnce(&mut Emitter<'_>),
) {
    let mut translations = Vec::new();
    if single {
        translations.push((runtime::NO_RESULT, runtime::DATA_EMPTY_RESULT));
        translations.push((runtime::NON_UNIQUE_RESULT, runtime::DATA_NON_UNIQUE_RESULT));
    }
    translations.push((runtime::PERSISTENCE_EXCEPTION, runtime::DATA_EXCEPTION));
    translated(em, translate, &translations, body);
}

/// Run `body` inside a `try` with one `catch` per `(caught, thrown)` pair.
pub(crate) fn translated(
    em: &mut Emitter<'_>,
    translate: bool,
    translations: &[(&str, &str)],
    body: impl FnOnce(&mut Emitter<'_>),
) {
    if !translate {
        body(em);
        return;
    }
    em.out.writeln("try {");
    em.out.indent();
    body(em);
    em.out.dedent();
    em.out.writeln("}");
    for (caught, thrown) in translations {
        let caught = em.ty(caught);
        let thrown = em.ty(thrown);
        em.out.writeln(&format!("catch ({caught} exception) {{"));
        em.out.indent();
        em.out
            .writeln(&format!("throw new {thrown}(exception.getMessage(), exception);"));
        em.close_block();
    }
}
