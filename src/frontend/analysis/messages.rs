//! Diagnostic catalog for the analyzer.
//!
//! Message texts are part of the generator's interface: tooling and tests match on them, so they are spelled in
//! exactly one place.

use crate::frontend::diagnostics::{Diagnostic, Location};
use crate::model::TypeRef;

// ============================================================================
// Classification and return types
// ============================================================================

pub fn no_driving_annotation(at: Location) -> Diagnostic {
    Diagnostic::error("abstract method has no annotation saying how to implement it", at)
        .with_hint("Annotate it with '@Find', '@HQL', '@SQL', '@Query', or a lifecycle annotation")
}

pub fn conflicting_annotations(first: &str, second: &str, at: Location) -> Diagnostic {
    Diagnostic::error(format!("method is annotated both '@{first}' and '@{second}'"), at)
}

pub fn missing_query_text(at: Location) -> Diagnostic {
    Diagnostic::error("query annotation has no query text", at)
}

pub fn incorrect_return_type(ty: impl std::fmt::Display, at: Location) -> Diagnostic {
    Diagnostic::error(format!("incorrect return type '{ty}'"), at)
}

pub fn missing_paging_parameter(container: &str, parameter: &str, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("method with return type '{container}' has no parameter of type '{parameter}'"),
        at,
    )
}

pub fn unsupported_reactive_result(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(format!("reactive session does not support return type '{ty}'"), at)
        .with_hint("Return 'Uni<T>', 'Uni<List<T>>', 'Uni<Optional<T>>' or a page")
}

// ============================================================================
// Finder methods
// ============================================================================

pub fn missing_return_type(at: Location) -> Diagnostic {
    Diagnostic::error("missing return type", at)
}

pub fn not_entity_array(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("incorrect return type '{ty}' is not an array with entity elements"),
        at,
    )
}

pub fn return_not_annotated_entity(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(format!("incorrect return type '{ty}' is not annotated '@Entity'"), at)
}

pub fn return_not_entity_type(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(format!("incorrect return type '{ty}' is not an entity type"), at)
}

pub fn pagination_no_effect(at: Location) -> Diagnostic {
    Diagnostic::error("pagination would have no effect", at)
}

pub fn ordering_no_effect(at: Location) -> Diagnostic {
    Diagnostic::error("ordering would have no effect", at)
}

pub fn missing_parameter(at: Location) -> Diagnostic {
    Diagnostic::error("missing parameter", at)
}

pub fn matching_collection(at: Location) -> Diagnostic {
    Diagnostic::error("matching field is a collection", at)
}

pub fn matching_field_type(member_type: &TypeRef, entity: &str, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("matching field has type '{member_type}' in entity class '{entity}'"),
        at,
    )
    .with_hint(format!("Change the parameter type to '{member_type}'"))
}

pub fn no_matching_field(name: &str, entity: &str, at: Location) -> Diagnostic {
    Diagnostic::error(format!("no matching field named '{name}' in entity class '{entity}'"), at)
}

// ============================================================================
// Ordering and paging parameters
// ============================================================================

pub fn missing_type_argument(entity: &str, page_request: bool, at: Location) -> Diagnostic {
    let message = if page_request {
        format!("missing type of page request (should be 'PageRequest<? super {entity}>')")
    } else {
        format!("missing type of order (should be 'Order<? super {entity}>')")
    };
    Diagnostic::error(message, at)
}

pub fn mismatched_type_argument(entity: &str, page_request: bool, at: Location) -> Diagnostic {
    let message = if page_request {
        format!("mismatched type of page request (should be 'PageRequest<? super {entity}>')")
    } else {
        format!("mismatched type of order (should be 'Order<? super {entity}>')")
    };
    Diagnostic::error(message, at)
}

// ============================================================================
// Query methods
// ============================================================================

pub fn generic_result_type(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!(
            "query result type may not be a generic type (change '{ty}' to '{}')",
            ty.erasure()
        ),
        at,
    )
}

pub fn mutation_return_type(reactive: bool, at: Location) -> Diagnostic {
    let expected = if reactive {
        "'Uni<Integer>', 'Uni<Boolean>' or 'Uni<Void>'"
    } else {
        "'int', 'boolean' or 'void'"
    };
    Diagnostic::error(format!("return type of mutation query method must be {expected}"), at)
}

pub fn no_matching_constructor(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("return type '{ty}' of method has no constructor matching query selection list"),
        at,
    )
}

pub fn query_return_mismatch(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(format!("return type of query did not match return type '{ty}' of method"), at)
}

pub fn missing_method_parameter_named(name: &str, ty: &str, method: &str, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("missing method parameter for query parameter :{name} (add a parameter '{ty} {name}' to '{method}')"),
        at,
    )
}

pub fn missing_method_parameter_positional(position: u32, ty: &str, method: &str, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!(
            "missing method parameter for query parameter ?{position} (add a parameter of type '{ty}' to '{method}')"
        ),
        at,
    )
}

pub fn wrong_parameter_type(label: &str, ty: &str, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("parameter matching query parameter {label} has the wrong type (change the method parameter type to '{ty}')"),
        at,
    )
}

pub fn missing_native_parameter_ordinal(ordinal: u32, method: &str, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("missing method parameter for query parameter {ordinal} (add a parameter to '{method}')"),
        at,
    )
}

pub fn missing_native_parameter_labelled(label: u32, method: &str, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("missing method parameter for query parameter ?{label} (add a parameter to '{method}')"),
        at,
    )
}

pub fn missing_native_parameter_named(name: &str, method: &str, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("missing method parameter for query parameter :{name} (add a parameter '{name}' to '{method}')"),
        at,
    )
}

pub fn unreferenced_parameter(name: &str, position: usize, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("missing query parameter for '{name}' (no parameter named :{name} or ?{position})"),
        at,
    )
}

// ============================================================================
// Lifecycle methods
// ============================================================================

pub fn lifecycle_needs_stateless(at: Location) -> Diagnostic {
    Diagnostic::error("repository must be backed by a 'StatelessSession'", at)
}

pub fn lifecycle_parameter_count(at: Location) -> Diagnostic {
    Diagnostic::error("must have exactly one parameter", at)
}

pub fn parameter_not_entity_type(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(format!("incorrect parameter type '{ty}' is not an entity type"), at)
}

pub fn parameter_not_annotated_entity(ty: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(format!("incorrect parameter type '{ty}' is not annotated '@Entity'"), at)
}

pub fn lifecycle_return_disagrees(ret: &TypeRef, param: &TypeRef, at: Location) -> Diagnostic {
    Diagnostic::error(
        format!("return type '{ret}' disagrees with parameter type '{param}'"),
        at,
    )
}

// ============================================================================
// Rounds
// ============================================================================

pub fn deferral_exhausted(rounds: usize, reason: &str, at: Location) -> Diagnostic {
    Diagnostic::warning(
        format!("method was not generated: still unresolved after {rounds} rounds"),
        at,
    )
    .with_note(reason.to_string())
}
