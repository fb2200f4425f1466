//! Emit Java source for member plans.
//!
//! [`synthesize`] is the single entry point: it checks that a plan is complete, emits its declaration, and records
//! the imports the declaration needed. Each member family lives in its own submodule.
//!
//! ## See also
//! - [`adapt`]: execution of query chains in the declared result shape
//! - [`class`]: the class around the members

mod adapt;
pub mod class;
mod common;
mod constructor;
mod finder;
mod lifecycle;
mod query;


use super::imports::ImportContext;
use super::plan::{FinderPlan, MemberPlan, Signature, SyntheticPlan};
use super::{GeneratedMember, KeyVariant, MemberKey, MemberKind};
use crate::config::GeneratorConfig;
use crate::frontend::analysis::EngineError;
use crate::frontend::analysis::params::SpecialKind;
use crate::frontend::analysis::paths::MemberTypeCache;
use crate::frontend::analysis::returns::ResultContainer;
use crate::frontend::analysis::strategy::LookupStrategy;
use crate::model::TypeRef;
use common::Emitter;

/// The key a plan's member is stored under.
///
/// Only a single-result finder of one attribute is keyed by name alone; every other member carries its parameter
/// types, so overloads stay apart.
pub fn member_key(plan: &MemberPlan) -> MemberKey {
    match plan {
        MemberPlan::Finder(plan) if is_single_attribute_lookup(plan) => {
            MemberKey::new(&plan.signature.name, KeyVariant::SingleParameter)
        }
        MemberPlan::Finder(plan) => MemberKey::new(
            &plan.signature.name,
            KeyVariant::Signature(plan.signature.parameter_types()),
        ),
        MemberPlan::Query(plan) => MemberKey::new(
            &plan.signature.name,
            KeyVariant::Signature(plan.signature.parameter_types()),
        ),
        MemberPlan::Lifecycle(plan) => MemberKey::new(
            &plan.signature.name,
            KeyVariant::Lifecycle(plan.signature.parameter_types().join(", ")),
        ),
        MemberPlan::Synthetic(SyntheticPlan::RepositoryConstructor { repository, .. }) => {
            MemberKey::new(generated_class(repository), KeyVariant::Synthetic)
        }
        MemberPlan::Synthetic(SyntheticPlan::SessionGetter { name, .. }) => {
            MemberKey::new(name, KeyVariant::Synthetic)
        }
        MemberPlan::Synthetic(SyntheticPlan::DefaultConstructor { repository, .. }) => {
            MemberKey::new(format!("{}()", generated_class(repository)), KeyVariant::Synthetic)
        }
    }
}

fn is_single_attribute_lookup(plan: &FinderPlan) -> bool {
    plan.container.is_single() && plan.signature.params.len() == 1 && plan.signature.attributes().count() == 1
}

fn generated_class(repository: &str) -> String {
    format!("{}_", metagen_core::simple_name(repository))
}

/// Check the parts of a plan the emitters rely on.
fn check_plan(plan: &MemberPlan) -> Result<(), EngineError> {
    let invariant = |what: &str, name: &str| Err(EngineError::Invariant(format!("{what} in plan for '{name}'")));
    if let (Some(signature), Some(session)) = (plan.signature(), plan.session()) {
        if session.flavor.is_reactive() && signature.generated_return_type(session).is_void() {
            return invariant("reactive method without a result", &signature.name);
        }
    }
    match plan {
        MemberPlan::Finder(plan) => {
            let name = &plan.signature.name;
            let attributes = plan.signature.attributes().count();
            if plan.strategy != LookupStrategy::Criteria && attributes == 0 {
                return invariant("keyed lookup without an attribute parameter", name);
            }
            if plan.strategy == LookupStrategy::Identifier && attributes != 1 {
                return invariant("identifier lookup with several attribute parameters", name);
            }
            check_container(plan.container, &plan.signature)
        }
        MemberPlan::Query(plan) => check_container(plan.container, &plan.signature),
        MemberPlan::Lifecycle(plan) if plan.signature.params.len() != 1 => {
            invariant("lifecycle operation without exactly one parameter", &plan.signature.name)
        }
        MemberPlan::Lifecycle(_) | MemberPlan::Synthetic(_) => Ok(()),
    }
}

/// Paged containers need the parameter their page comes from.
fn check_container(container: ResultContainer, signature: &Signature) -> Result<(), EngineError> {
    let needed = match container {
        ResultContainer::Page | ResultContainer::CursoredPage => SpecialKind::PageRequest,
        ResultContainer::KeyedResultList => SpecialKind::KeyedPage,
        _ => return Ok(()),
    };
    if signature.special(|k| k == needed).next().is_some() {
        Ok(())
    } else {
        Err(EngineError::Invariant(format!(
            "{container:?} results without a {needed:?} parameter in plan for '{}'",
            signature.name
        )))
    }
}

/// Emit the member for `plan`.
///
/// ## Errors
/// - [`EngineError`] if the plan lacks a part its strategy needs.
pub fn synthesize(
    plan: &MemberPlan,
    member_types: &MemberTypeCache,
    imports: &mut ImportContext,
    config: &GeneratorConfig,
) -> Result<GeneratedMember, EngineError> {
    check_plan(plan)?;
    let key = member_key(plan);
    // imports recorded by an abandoned emission belong to no member
    imports.take_recorded();

    let mut em = Emitter::new(imports, member_types, config);
    let (kind, property_name) = match plan {
        MemberPlan::Finder(finder) => {
            finder::emit_finder(&mut em, finder);
            (MemberKind::Finder, finder.signature.name.clone())
        }
        MemberPlan::Query(query) => {
            query::emit_query(&mut em, query);
            (MemberKind::Query, query::constant_name(query))
        }
        MemberPlan::Lifecycle(lifecycle) => {
            lifecycle::emit_lifecycle(&mut em, lifecycle);
            (MemberKind::Lifecycle, lifecycle.signature.name.clone())
        }
        MemberPlan::Synthetic(SyntheticPlan::RepositoryConstructor {
            repository,
            flavor,
            field,
        }) => {
            let class = generated_class(repository);
            constructor::emit_repository_constructor(&mut em, &class, *flavor, field);
            (MemberKind::SessionField, class)
        }
        MemberPlan::Synthetic(SyntheticPlan::SessionGetter { flavor, name, field }) => {
            constructor::emit_session_getter(&mut em, *flavor, name, field);
            (MemberKind::SessionGetter, name.clone())
        }
        MemberPlan::Synthetic(SyntheticPlan::DefaultConstructor {
            repository,
            flavor,
            field,
            data_store,
        }) => {
            let class = generated_class(repository);
            constructor::emit_default_constructor(&mut em, &class, *flavor, field, data_store.as_deref());
            (MemberKind::Constructor, class)
        }
    };
    let type_declaration = match plan {
        MemberPlan::Synthetic(SyntheticPlan::SessionGetter { flavor, .. }) => {
            em.type_ref(&TypeRef::known(flavor.type_id()))
        }
        MemberPlan::Synthetic(_) => String::new(),
        other => match (other.signature(), other.session()) {
            (Some(signature), Some(session)) => em.type_ref(&signature.generated_return_type(session)),
            _ => String::new(),
        },
    };
    let declaration = em.finish();
    let imports = imports.take_recorded();
    tracing::trace!(%key, imports = imports.len(), "synthesized");

    Ok(GeneratedMember {
        key,
        kind,
        declaration,
        property_name,
        type_declaration,
        imports,
    })
}
