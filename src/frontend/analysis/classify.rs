//! Method classification.

use metagen_core::lang::annotations::{
    self, AnnotationId, FINDER_DRIVERS, LIFECYCLE_DRIVERS, QUERY_TEXT_DRIVERS,
};
use metagen_core::lang::sessions::SessionFlavor;

use super::{Analyzer, EngineError, Halt, MethodContext, Step, messages, session};
use crate::backend::plan::LifecycleOp;
use crate::frontend::query::Dialect;

/// What kind of member a repository method gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodClass {
    Lifecycle(LifecycleOp),
    QueryText(Dialect),
    Finder,
    /// A session getter.
    Accessor(SessionFlavor),
    /// A method with a body; nothing is generated.
    Concrete,
}

/// The lifecycle operation a lifecycle annotation stands for.
///
/// ## Errors
/// - [`EngineError::Invariant`] if `id` is not a lifecycle annotation.
pub fn lifecycle_op(id: AnnotationId) -> Result<LifecycleOp, EngineError> {
    match id {
        AnnotationId::Insert => Ok(LifecycleOp::Insert),
        AnnotationId::Update => Ok(LifecycleOp::Update),
        AnnotationId::Delete => Ok(LifecycleOp::Delete),
        AnnotationId::Save => Ok(LifecycleOp::Upsert),
        other => Err(EngineError::Invariant(format!(
            "'{}' is not a lifecycle annotation",
            annotations::as_str(other)
        ))),
    }
}

/// The query dialect a query annotation stands for.
pub fn dialect_of(id: AnnotationId) -> Option<Dialect> {
    match id {
        AnnotationId::Hql => Some(Dialect::Hql),
        AnnotationId::Sql => Some(Dialect::Sql),
        AnnotationId::DataQuery => Some(Dialect::Jdql),
        _ => None,
    }
}

fn is_driver(id: AnnotationId) -> bool {
    QUERY_TEXT_DRIVERS.contains(&id) || FINDER_DRIVERS.contains(&id) || LIFECYCLE_DRIVERS.contains(&id)
}

impl Analyzer<'_> {
    /// Classify the method of `ctx`.
    ///
    /// ## Returns
    /// - `None` after reporting a classification error.
    pub(crate) fn classify_method(&self, ctx: &mut MethodContext<'_>) -> Step<Option<MethodClass>> {
        let method = ctx.method;
        let drivers: Vec<_> = method
            .annotations
            .iter()
            .filter(|a| a.id.is_some_and(is_driver))
            .collect();

        let driver = match drivers.as_slice() {
            [] => {
                if let Some(flavor) = session::session_getter_flavor(method) {
                    return Ok(Some(MethodClass::Accessor(flavor)));
                }
                if !method.is_abstract(ctx.repository.kind) {
                    return Ok(Some(MethodClass::Concrete));
                }
                ctx.report(messages::no_driving_annotation(ctx.at.clone()));
                return Ok(None);
            }
            [driver] => *driver,
            [first, second, ..] => {
                ctx.report(messages::conflicting_annotations(&short_name(first), &short_name(second), ctx.at.clone()));
                return Ok(None);
            }
        };

        if driver.has_placeholder() {
            return Err(Halt::Defer(format!(
                "unresolved @{} on '{}'",
                short_name(driver),
                method.name
            )));
        }

        let Some(id) = driver.id else {
            return Err(EngineError::Invariant("driving annotation without an id".into()).into());
        };
        let class = if let Some(dialect) = dialect_of(id) {
            MethodClass::QueryText(dialect)
        } else if FINDER_DRIVERS.contains(&id) {
            MethodClass::Finder
        } else {
            MethodClass::Lifecycle(lifecycle_op(id)?)
        };
        tracing::debug!(method = %method.name, ?class, "classified");
        Ok(Some(class))
    }
}

fn short_name(annotation: &crate::model::Annotation) -> String {
    match annotation.id {
        Some(id) => annotations::info_for(id).simple_name().to_string(),
        None => metagen_core::simple_name(&annotation.name).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_ops() {
        assert_eq!(lifecycle_op(AnnotationId::Save), Ok(LifecycleOp::Upsert));
        assert_eq!(lifecycle_op(AnnotationId::Delete), Ok(LifecycleOp::Delete));
        assert!(matches!(lifecycle_op(AnnotationId::Find), Err(EngineError::Invariant(_))));
    }

    #[test]
    fn test_dialects() {
        assert_eq!(dialect_of(AnnotationId::DataQuery), Some(Dialect::Jdql));
        assert_eq!(dialect_of(AnnotationId::Sql), Some(Dialect::Sql));
        assert_eq!(dialect_of(AnnotationId::Find), None);
    }
}
