//! Lifecycle methods: `@Insert`, `@Update`, `@Delete` and `@Save`.

use metagen_core::lang::types::KnownTypeId;

use super::params;
use super::{Analyzer, MethodContext, Step, messages};
use crate::backend::plan::{LifecycleOp, LifecyclePlan, MemberPlan};
use crate::model::TypeRef;

impl Analyzer<'_> {
    pub(crate) fn plan_lifecycle(&self, ctx: &mut MethodContext<'_>, operation: LifecycleOp) -> Step<Option<MemberPlan>> {
        let method = ctx.method;
        if !ctx.session.flavor.is_stateless() {
            ctx.report(messages::lifecycle_needs_stateless(ctx.at.clone()));
            return Ok(None);
        }
        let [parameter] = method.parameters.as_slice() else {
            ctx.report(messages::lifecycle_parameter_count(ctx.at.clone()));
            return Ok(None);
        };

        let declared = &parameter.type_;
        let at = ctx.at_parameter(&parameter.name);
        let entity_type = match declared {
            TypeRef::Declared { args, .. } if declared.is_known(KnownTypeId::Iterable) || declared.is_known(KnownTypeId::List) => {
                match args.first() {
                    Some(element) => element,
                    None => {
                        ctx.report(messages::parameter_not_entity_type(declared, at));
                        return Ok(None);
                    }
                }
            }
            TypeRef::Array(component) => component.as_ref(),
            TypeRef::Declared { .. } => declared,
            _ => {
                ctx.report(messages::parameter_not_entity_type(declared, at));
                return Ok(None);
            }
        };
        let Some(entity) = entity_type
            .erased_name()
            .and_then(|name| self.provider.resolve(name))
            .filter(|e| e.is_entity())
        else {
            ctx.report(messages::parameter_not_annotated_entity(entity_type, at));
            return Ok(None);
        };

        let returns_argument = !method.return_type.is_void();
        if returns_argument && method.return_type != *declared {
            ctx.report(messages::lifecycle_return_disagrees(&method.return_type, declared, ctx.at.clone()));
        }

        let many = entity_type != declared;
        let classification = params::classify(method, None, self.provider)?;
        let params = ctx.take_params(classification);
        let session = ctx.session_binding(&params);
        tracing::debug!(method = %method.name, entity = %entity.qualified_name, ?operation, many, "lifecycle");

        Ok(Some(MemberPlan::Lifecycle(LifecyclePlan {
            signature: ctx.signature(params),
            entity: entity.qualified_name.clone(),
            operation,
            many,
            returns_argument,
            session,
            data_repository: ctx.repository.is_data_repository(),
        })))
    }
}
