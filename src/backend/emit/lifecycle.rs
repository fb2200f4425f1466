//! Lifecycle methods on a stateless session.

use super::adapt;
use super::common::{Emitter, runtime};
use crate::backend::plan::{LifecycleOp, LifecyclePlan};

pub(crate) fn emit_lifecycle(em: &mut Emitter<'_>, plan: &LifecyclePlan) {
    let entity = em.ty(&plan.entity);
    let verb = match plan.operation {
        LifecycleOp::Insert => "Insert",
        LifecycleOp::Update => "Update",
        LifecycleOp::Delete => "Delete",
        LifecycleOp::Upsert => "Insert or update",
    };
    if plan.many {
        em.javadoc(&format!("{verb} the given instances of {{@link {entity}}}."));
    } else {
        em.javadoc(&format!("{verb} the given {{@link {entity}}}."));
    }
    em.open_method(&plan.signature, &plan.session);

    let argument = plan.signature.params.first().map(|p| p.variable()).unwrap_or_default();
    let session = plan.session.expression.clone();
    let operation = plan.operation.operation_name();
    let translations: Vec<(&str, &str)> = match plan.operation {
        LifecycleOp::Insert => vec![
            (runtime::ENTITY_EXISTS, runtime::DATA_ENTITY_EXISTS),
            (runtime::PERSISTENCE_EXCEPTION, runtime::DATA_EXCEPTION),
        ],
        LifecycleOp::Update | LifecycleOp::Delete => vec![
            (runtime::STALE_STATE, runtime::DATA_OPTIMISTIC_LOCK),
            (runtime::PERSISTENCE_EXCEPTION, runtime::DATA_EXCEPTION),
        ],
        LifecycleOp::Upsert => vec![(runtime::PERSISTENCE_EXCEPTION, runtime::DATA_EXCEPTION)],
    };

    adapt::translated(em, plan.data_repository, &translations, |em| {
        if plan.many {
            em.out.writeln(&format!("for (var _entity : {argument}) {{"));
            em.out.indent();
            em.out.writeln(&format!("{session}.{operation}(_entity);"));
            em.close_block();
        } else {
            em.out.writeln(&format!("{session}.{operation}({argument});"));
        }
    });
    if plan.returns_argument {
        em.out.writeln(&format!("return {argument};"));
    }
    em.close_block();
}
