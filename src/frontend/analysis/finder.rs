//! Finder methods: `@Find` methods whose parameters match entity attributes.

use metagen_core::lang::annotations::{
    AnnotationId, DESCENDING_MEMBER, ENABLED_FETCH_PROFILES_MEMBER, IGNORE_CASE_MEMBER, VALUE_MEMBER,
};

use super::params::{self, ClassifiedParam};
use super::paths;
use super::returns::{self, ResultContainer};
use super::strategy::{self, AttributeRole, LookupStrategy};
use super::{Analyzer, Halt, MethodContext, Step, messages};
use crate::backend::plan::{FinderPlan, MemberPlan, OrderSpec};
use crate::model::{Annotation, EntityDescriptor, MemberKind, TypeRef};

impl Analyzer<'_> {
    pub(crate) fn plan_finder(&self, ctx: &mut MethodContext<'_>) -> Step<Option<MemberPlan>> {
        let method = ctx.method;
        let shape = match returns::classify_return(method, self.provider, &ctx.at) {
            Ok(shape) => shape,
            Err(diagnostic) => {
                ctx.report(diagnostic);
                return Ok(None);
            }
        };
        let Some(result) = shape.result.clone() else {
            ctx.report(messages::missing_return_type(ctx.at.clone()));
            return Ok(None);
        };

        let entity_type = match &result {
            TypeRef::Array(component) => match component.as_ref() {
                TypeRef::Declared { .. } => component.as_ref(),
                _ => {
                    ctx.report(messages::not_entity_array(&result, ctx.at.clone()));
                    return Ok(None);
                }
            },
            TypeRef::Declared { .. } => &result,
            _ => {
                ctx.report(messages::return_not_entity_type(&result, ctx.at.clone()));
                return Ok(None);
            }
        };
        let Some(entity) = entity_type
            .erased_name()
            .and_then(|name| self.provider.resolve(name))
            .filter(|e| e.is_entity())
        else {
            ctx.report(messages::return_not_annotated_entity(entity_type, ctx.at.clone()));
            return Ok(None);
        };

        let container = shape.result_container(true);
        let classification = params::classify(method, Some(entity), self.provider)?;
        let params = ctx.take_params(classification);
        let session = ctx.session_binding(&params);

        if session.flavor.is_reactive() && !container.is_reactive_capable() {
            ctx.report(messages::unsupported_reactive_result(&method.return_type, ctx.at.clone()));
        }

        if container.is_single() {
            for param in &params {
                match param.special {
                    Some(kind) if kind.is_paging() => {
                        ctx.report(messages::pagination_no_effect(ctx.at_parameter(&param.name)));
                    }
                    Some(kind) if kind.is_ordering() => {
                        ctx.report(messages::ordering_no_effect(ctx.at_parameter(&param.name)));
                    }
                    _ => {}
                }
            }
        } else {
            check_type_arguments(ctx, &params, entity_type, entity.simple_name());
        }

        let attributes: Vec<&ClassifiedParam> = params.iter().filter(|p| p.is_attribute()).collect();
        if container.is_single() && attributes.is_empty() {
            ctx.report(messages::missing_parameter(ctx.at.clone()));
        }
        let matches: Vec<Option<(String, AttributeRole)>> = attributes
            .iter()
            .map(|param| self.validate_finder_parameter(ctx, entity, param))
            .collect();

        let fetch_profiles = fetch_profiles(ctx)?;
        let order_by = self.static_order(ctx, Some(entity), entity_type)?;

        let strategy = match (container, matches.as_slice()) {
            (ResultContainer::Single, [Some((_, role))]) => {
                strategy::pick_single(*role, session.flavor, !fetch_profiles.is_empty())
            }
            (ResultContainer::Single, [_, _, ..]) => {
                let borrowed: Vec<Option<(&str, AttributeRole)>> = matches
                    .iter()
                    .map(|m| m.as_ref().map(|(path, role)| (path.as_str(), *role)))
                    .collect();
                strategy::pick_multiple(&borrowed, entity.natural_key_count(), session.flavor)
            }
            _ => LookupStrategy::Criteria,
        };
        tracing::debug!(method = %method.name, entity = %entity.qualified_name, %strategy, "finder strategy");

        Ok(Some(MemberPlan::Finder(FinderPlan {
            signature: ctx.signature(params),
            entity: entity.qualified_name.clone(),
            strategy,
            container,
            session,
            fetch_profiles,
            order_by,
            data_repository: ctx.repository.is_data_repository(),
        })))
    }

    /// Match one attribute parameter to an entity member.
    ///
    /// ## Returns
    /// - The matched attribute path and its role, or `None` after reporting why the parameter does not match.
    fn validate_finder_parameter(
        &self,
        ctx: &mut MethodContext<'_>,
        entity: &EntityDescriptor,
        param: &ClassifiedParam,
    ) -> Option<(String, AttributeRole)> {
        let resolution = paths::resolve_path(entity, &param.binding, self.provider);
        ctx.observe(resolution.cache_updates.iter().cloned());
        let at = ctx.at_parameter(&param.name);

        let Some(member) = resolution.terminal else {
            if entity.id_class.as_ref() == Some(&param.type_) {
                return Some((param.binding.clone(), AttributeRole::Identifier));
            }
            ctx.report(messages::no_matching_field(&param.binding, &entity.qualified_name, at));
            return None;
        };

        let role = match member.kind() {
            MemberKind::Collection => {
                ctx.report(messages::matching_collection(at));
                return None;
            }
            MemberKind::Identifier => AttributeRole::Identifier,
            MemberKind::NaturalKey => AttributeRole::NaturalKey,
            MemberKind::Basic | MemberKind::Association => AttributeRole::Basic,
        };
        if !metagen_core::is_legal_assignment(&param.type_.to_string(), &member.type_.to_string()) {
            ctx.report(messages::matching_field_type(&member.type_, &entity.qualified_name, at));
            return None;
        }
        Some((param.binding.clone(), role))
    }

    /// Resolve static `@OrderBy` annotations against the result entity.
    pub(crate) fn static_order(
        &self,
        ctx: &mut MethodContext<'_>,
        entity: Option<&EntityDescriptor>,
        result: &TypeRef,
    ) -> Step<Vec<OrderSpec>> {
        let method = ctx.method;
        let mut annotations: Vec<&Annotation> = method.annotations.iter().filter(|a| a.is(AnnotationId::OrderBy)).collect();
        if let Some(list) = method.annotation(AnnotationId::OrderByList) {
            annotations.extend(list.nested_list(VALUE_MEMBER));
        }

        let mut order = Vec::new();
        for annotation in annotations {
            let path = annotation.string_value(VALUE_MEMBER).unwrap_or_default();
            if metagen_core::is_placeholder(path) {
                return Err(Halt::Defer(format!("unresolved @OrderBy on '{}'", method.name)));
            }
            let at = ctx.at.at_annotation(AnnotationId::OrderBy);
            let resolved = match entity {
                Some(entity) => {
                    let resolution = paths::resolve_path(entity, path, self.provider);
                    ctx.observe(resolution.cache_updates.iter().cloned());
                    resolution.is_resolved()
                }
                None => false,
            };
            if !resolved {
                let owner = entity.map_or_else(|| result.to_string(), |e| e.qualified_name.clone());
                ctx.report(messages::no_matching_field(path, &owner, at));
                continue;
            }
            order.push(OrderSpec {
                path: path.to_string(),
                descending: annotation.bool_value(DESCENDING_MEMBER).unwrap_or(false),
                ignore_case: annotation.bool_value(IGNORE_CASE_MEMBER).unwrap_or(false),
            });
        }
        Ok(order)
    }
}

/// Fetch profiles listed by `@Find(enabledFetchProfiles = ...)`.
fn fetch_profiles(ctx: &MethodContext<'_>) -> Step<Vec<String>> {
    let Some(find) = ctx.method.annotation(AnnotationId::Find) else {
        return Ok(Vec::new());
    };
    let profiles = find.string_list(ENABLED_FETCH_PROFILES_MEMBER);
    if profiles.iter().any(|p| metagen_core::is_placeholder(p)) {
        return Err(Halt::Defer(format!("unresolved fetch profile on '{}'", ctx.method.name)));
    }
    Ok(profiles.into_iter().map(str::to_string).collect())
}

/// Check that ordering and page-request parameters are typed by the queried entity.
///
/// `label` is how the entity is spelled in the message.
pub(crate) fn check_type_arguments(
    ctx: &mut MethodContext<'_>,
    params: &[ClassifiedParam],
    entity_type: &TypeRef,
    label: &str,
) {
    for param in params {
        let Some(kind) = param.special.filter(|k| k.is_type_checked()) else {
            continue;
        };
        let page_request = kind == params::SpecialKind::PageRequest;
        let at = ctx.at_parameter(&param.name);
        match params::type_argument(&param.type_) {
            None => ctx.report(messages::missing_type_argument(label, page_request, at)),
            Some(TypeRef::TypeVar(_)) => {}
            Some(argument) if argument.erasure() == entity_type.erasure() => {}
            Some(_) => ctx.report(messages::mismatched_type_argument(label, page_request, at)),
        }
    }
}
