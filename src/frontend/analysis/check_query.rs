//! Query-text methods: `@HQL`, `@SQL` and `@Query`.
//!
//! The query text is handed to the [`QueryValidator`](crate::frontend::query::QueryValidator) (native SQL is only
//! scanned for parameters), and the validated shape is checked against the method:
//! - the selection list against the return type,
//! - every query parameter against a method parameter,
//! - every method parameter against a query parameter.

use metagen_core::lang::annotations::VALUE_MEMBER;
use metagen_core::lang::types::{self as known, KnownTypeId, UNTYPED_PROJECTIONS};
use metagen_core::lang::primitives::PrimitiveKind;
use regex::Regex;

use super::classify::dialect_of;
use super::finder::check_type_arguments;
use super::params::{self, ClassifiedParam};
use super::returns;
use super::{Analyzer, EngineError, MethodContext, Step, messages};
use crate::backend::plan::{MemberPlan, QueryBinding, QueryPlan};
use crate::frontend::diagnostics::Diagnostic;
use crate::frontend::query::native::{self, NativeParameter};
use crate::frontend::query::{Dialect, ParameterLabel, ParsedQuery, QueryParameter, SelectionItem, SelectionKind};
use crate::model::TypeRef;

impl Analyzer<'_> {
    pub(crate) fn plan_query(&self, ctx: &mut MethodContext<'_>, dialect: Dialect) -> Step<Option<MemberPlan>> {
        let method = ctx.method;
        let Some((driver, annotation)) = method
            .annotations
            .iter()
            .find_map(|a| a.id.filter(|id| dialect_of(*id) == Some(dialect)).map(|id| (id, a)))
        else {
            return Err(EngineError::Invariant(format!("'{}' has no {dialect:?} annotation", method.name)).into());
        };
        let at_query = ctx.at.at_annotation(driver);
        let text = annotation.string_value(VALUE_MEMBER).unwrap_or_default();
        if text.trim().is_empty() {
            ctx.report(messages::missing_query_text(at_query));
            return Ok(None);
        }

        let shape = match returns::classify_return(method, self.provider, &ctx.at) {
            Ok(shape) => shape,
            Err(diagnostic) => {
                ctx.report(diagnostic);
                return Ok(None);
            }
        };
        let container = shape.result_container(false);
        let result = shape.result.clone();
        if let Some(declared @ TypeRef::Declared { args, .. }) = &result {
            if !args.is_empty() {
                ctx.report(messages::generic_result_type(declared, at_query));
                return Ok(None);
            }
        }

        let entity = result
            .as_ref()
            .and_then(TypeRef::erased_name)
            .and_then(|name| self.provider.resolve(name))
            .filter(|e| e.is_entity());
        let classification = params::classify(method, entity, self.provider)?;
        let params = ctx.take_params(classification);
        let session = ctx.session_binding(&params);
        let reactive = session.flavor.is_reactive();
        if reactive && !container.is_reactive_capable() {
            ctx.report(messages::unsupported_reactive_result(&method.return_type, ctx.at.clone()));
        }

        let mutation = metagen_core::is_mutation_query(text);
        let order_by = match &result {
            Some(result) if !mutation => self.static_order(ctx, entity, result)?,
            _ => Vec::new(),
        };

        let scanned = if dialect.is_native() {
            let scanned = native::scan_parameters(text);
            check_native(ctx, text, &scanned, &params);
            scanned
        } else {
            match self.validator.validate(text, dialect, result.as_ref(), self.provider) {
                Err(errors) => {
                    for error in errors {
                        ctx.report(Diagnostic::error(error.message, at_query.clone()).with_source(text, error.span));
                    }
                }
                Ok(parsed) => {
                    if parsed.kind.is_mutation() {
                        validate_update(ctx, reactive);
                    } else if let Some(result) = &result {
                        self.validate_select(ctx, &parsed, result);
                    }
                    for parameter in &parsed.parameters {
                        check_parameter(ctx, text, parameter, &params);
                    }
                }
            }
            Vec::new()
        };
        let jdbc_count = scanned.iter().filter(|p| p.jdbc).count();
        check_parameters(ctx, text, &params, jdbc_count)?;
        if let Some(result) = &result {
            check_type_arguments(ctx, &params, result, &result.to_string());
        }

        let bindings = bindings(text, &params)?;
        Ok(Some(MemberPlan::Query(QueryPlan {
            signature: ctx.signature(params),
            text: text.to_string(),
            dialect,
            mutation,
            result,
            container,
            session,
            bindings,
            order_by,
            data_repository: ctx.repository.is_data_repository(),
        })))
    }

    /// Check the selection list of a select statement against the method's result type.
    fn validate_select(&self, ctx: &mut MethodContext<'_>, parsed: &ParsedQuery, result: &TypeRef) {
        let matches = match parsed.selection.as_slice() {
            [item] => self.single_selection_matches(item, result),
            items => match result {
                TypeRef::Array(component) => component.is_known(KnownTypeId::Object),
                TypeRef::Declared { name, .. } => {
                    let untyped = known::from_str(name).is_some_and(|id| UNTYPED_PROJECTIONS.contains(&id));
                    if !untyped && !self.has_matching_constructor(name, items) {
                        ctx.report(messages::no_matching_constructor(result, ctx.at.clone()));
                    }
                    true
                }
                _ => false,
            },
        };
        if !matches {
            ctx.report(messages::query_return_mismatch(result, ctx.at.clone()));
        }
    }

    fn single_selection_matches(&self, item: &SelectionItem, result: &TypeRef) -> bool {
        match &item.kind {
            SelectionKind::EntityRoot { entity } | SelectionKind::EntityJoin { entity } => {
                let selected = self.provider.resolve(entity);
                let returned = result
                    .erased_name()
                    .and_then(|name| self.provider.resolve(name))
                    .filter(|e| e.is_entity());
                match (selected, returned) {
                    (Some(selected), Some(returned)) => selected.mapped_name() == returned.mapped_name(),
                    _ => false,
                }
            }
            SelectionKind::Expression => match &item.java_type {
                None => true,
                Some(java_type) => {
                    result.is_known(KnownTypeId::Object)
                        || metagen_core::is_legal_assignment(&result.to_string(), &java_type.erasure().to_string())
                }
            },
        }
    }

    /// Whether the projection class `name` declares a constructor accepting the selection items in order.
    fn has_matching_constructor(&self, name: &str, items: &[SelectionItem]) -> bool {
        let Some(descriptor) = self.provider.resolve(name) else {
            return false;
        };
        descriptor.constructors.iter().any(|parameters| {
            parameters.len() == items.len()
                && parameters
                    .iter()
                    .zip(items)
                    .all(|(parameter, item)| item.java_type.as_ref().is_none_or(|t| constructor_accepts(parameter, t)))
        })
    }
}

fn constructor_accepts(parameter: &TypeRef, item: &TypeRef) -> bool {
    match (parameter, item) {
        (TypeRef::Primitive(_), _) => item == parameter || *item == parameter.boxed(),
        (TypeRef::Declared { name, .. }, _) => item.erased_name() == Some(name.as_str()),
        (TypeRef::Array(component), TypeRef::Array(item_component)) => constructor_accepts(component, item_component),
        _ => false,
    }
}

/// Mutations return a row count, a success flag or nothing.
fn validate_update(ctx: &mut MethodContext<'_>, reactive: bool) {
    let returned = &ctx.method.return_type;
    let legal = if reactive {
        [KnownTypeId::Void, KnownTypeId::Boolean, KnownTypeId::Integer].iter().any(|id| {
            *returned == TypeRef::generic(known::as_str(KnownTypeId::Uni), vec![TypeRef::known(*id)])
        })
    } else {
        matches!(
            returned,
            TypeRef::Void | TypeRef::Primitive(PrimitiveKind::Boolean | PrimitiveKind::Int)
        )
    };
    if !legal {
        ctx.report(messages::mutation_return_type(reactive, ctx.at.clone()));
    }
}

/// Check that a query parameter has a method parameter of a compatible type.
fn check_parameter(ctx: &mut MethodContext<'_>, text: &str, parameter: &QueryParameter, params: &[ClassifiedParam]) {
    let method_name = ctx.method.name.clone();
    let at = ctx.at.clone();
    let matched = match &parameter.label {
        ParameterLabel::Named(name) => match params.iter().find(|p| &p.binding == name) {
            Some(param) => param,
            None => {
                let diagnostic =
                    messages::missing_method_parameter_named(name, &parameter.type_name(), &method_name, at);
                ctx.report(diagnostic.with_source(text, parameter.span));
                return;
            }
        },
        ParameterLabel::Positional(position) => match position.checked_sub(1).and_then(|i| params.get(i as usize)) {
            Some(param) => param,
            None => {
                let diagnostic =
                    messages::missing_method_parameter_positional(*position, &parameter.type_name(), &method_name, at);
                ctx.report(diagnostic.with_source(text, parameter.span));
                return;
            }
        },
    };

    let Some(expected) = &parameter.java_type else {
        return;
    };
    if !accepts_argument(&matched.type_, expected, parameter.multivalued) {
        let diagnostic = messages::wrong_parameter_type(&parameter.label.to_string(), &expected.to_string(), ctx.at_parameter(&matched.name));
        ctx.report(diagnostic.with_source(text, parameter.span));
    }
}

/// Whether a method parameter of type `declared` can be bound where the query expects `expected`. A list or array
/// parameter binds element-wise, and only to a parameter standing for an `in` list.
fn accepts_argument(declared: &TypeRef, expected: &TypeRef, multivalued: bool) -> bool {
    let legal = |ty: &TypeRef| metagen_core::is_legal_assignment(&ty.erasure().to_string(), &expected.to_string());
    if legal(declared) {
        return true;
    }
    if !multivalued {
        return false;
    }
    match declared {
        TypeRef::Array(component) => legal(component),
        TypeRef::Declared { args, .. } if declared.is_known(KnownTypeId::List) => args.first().is_some_and(legal),
        _ => false,
    }
}

/// Native SQL parameters must have method parameters.
fn check_native(ctx: &mut MethodContext<'_>, text: &str, scanned: &[NativeParameter], params: &[ClassifiedParam]) {
    let method_name = ctx.method.name.clone();
    let count = params.len();
    for parameter in scanned {
        let diagnostic = match &parameter.label {
            ParameterLabel::Positional(n) if *n as usize > count => {
                if parameter.jdbc {
                    messages::missing_native_parameter_ordinal(*n, &method_name, ctx.at.clone())
                } else {
                    messages::missing_native_parameter_labelled(*n, &method_name, ctx.at.clone())
                }
            }
            ParameterLabel::Named(name) if !params.iter().any(|p| &p.binding == name) => {
                messages::missing_native_parameter_named(name, &method_name, ctx.at.clone())
            }
            _ => continue,
        };
        ctx.report(diagnostic.with_source(text, parameter.span));
    }
}

fn reference_pattern(name: &str, position: usize) -> Result<Regex, EngineError> {
    Regex::new(&format!(r"(:{}|\?{position})\b", regex::escape(name)))
        .map_err(|e| EngineError::Invariant(format!("parameter pattern for '{name}': {e}")))
}

/// Every non-special method parameter must be referenced by the query, by name or by position.
///
/// A native query with `n` bare JDBC placeholders references the first `n` positions.
fn check_parameters(
    ctx: &mut MethodContext<'_>,
    text: &str,
    params: &[ClassifiedParam],
    jdbc_count: usize,
) -> Step<()> {
    for (index, param) in params.iter().enumerate() {
        if !param.is_attribute() {
            continue;
        }
        let position = index + 1;
        if position <= jdbc_count || reference_pattern(&param.binding, position)?.is_match(text) {
            continue;
        }
        ctx.report(messages::unreferenced_parameter(
            &param.binding,
            position,
            ctx.at_parameter(&param.name),
        ));
    }
    Ok(())
}

/// How each non-special parameter is bound: by name when the text mentions `:name`, otherwise by position.
fn bindings(text: &str, params: &[ClassifiedParam]) -> Step<Vec<QueryBinding>> {
    let mut bindings = Vec::new();
    for (index, param) in params.iter().enumerate() {
        if !param.is_attribute() {
            continue;
        }
        let named = Regex::new(&format!(r":{}\b", regex::escape(&param.binding)))
            .map_err(|e| EngineError::Invariant(format!("parameter pattern for '{}': {e}", param.binding)))?;
        let label = if named.is_match(text) {
            ParameterLabel::Named(param.binding.clone())
        } else {
            ParameterLabel::Positional(index as u32 + 1)
        };
        bindings.push(QueryBinding { label, param: index });
    }
    Ok(bindings)
}
