//! Member plans.
//!
//! A plan is the analyzer's complete decision for one declaration: which strategy, which parameters bind where,
//! which container the results go into. Emitters turn a plan into Java source and make no further decisions of
//! their own.

use metagen_core::lang::sessions::SessionFlavor;
use metagen_core::lang::types::{self as known, KnownTypeId};

use crate::frontend::analysis::params::{ClassifiedParam, SpecialKind};
use crate::frontend::analysis::returns::ResultContainer;
use crate::frontend::analysis::strategy::LookupStrategy;
use crate::frontend::query::{Dialect, ParameterLabel};
use crate::model::TypeRef;

/// A lifecycle operation on a stateless session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOp {
    Insert,
    Update,
    Delete,
    Upsert,
}

impl LifecycleOp {
    /// The `StatelessSession` operation implementing it.
    pub fn operation_name(self) -> &'static str {
        match self {
            LifecycleOp::Insert => "insert",
            LifecycleOp::Update => "update",
            LifecycleOp::Delete => "delete",
            LifecycleOp::Upsert => "upsert",
        }
    }
}

/// How a generated body reaches its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    pub flavor: SessionFlavor,
    /// `session`, `getSession()`, or the name of a session parameter.
    pub expression: String,
    /// The method is static and receives the session as an extra leading parameter.
    pub leading_parameter: bool,
}

/// The parts of the declared method every emitter needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub repository: String,
    pub name: String,
    pub return_type: TypeRef,
    pub params: Vec<ClassifiedParam>,
}

impl Signature {
    pub fn attributes(&self) -> impl Iterator<Item = &ClassifiedParam> {
        self.params.iter().filter(|p| p.is_attribute())
    }

    pub fn special(&self, want: impl Fn(SpecialKind) -> bool) -> impl Iterator<Item = &ClassifiedParam> {
        self.params.iter().filter(move |p| p.special.is_some_and(&want))
    }

    pub fn parameter_types(&self) -> Vec<String> {
        self.params.iter().map(|p| p.type_.to_string()).collect()
    }

    /// The return type of the generated method. A reactive session wraps the declared type in `Uni`.
    pub fn generated_return_type(&self, session: &SessionBinding) -> TypeRef {
        let declared = &self.return_type;
        if !session.flavor.is_reactive() || declared.is_known(KnownTypeId::Uni) || declared.is_void() {
            return declared.clone();
        }
        TypeRef::generic(known::as_str(KnownTypeId::Uni), vec![declared.boxed()])
    }
}

/// A static `@OrderBy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub path: String,
    pub descending: bool,
    pub ignore_case: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinderPlan {
    pub signature: Signature,
    pub entity: String,
    pub strategy: LookupStrategy,
    pub container: ResultContainer,
    pub session: SessionBinding,
    pub fetch_profiles: Vec<String>,
    pub order_by: Vec<OrderSpec>,
    pub data_repository: bool,
}

/// A query parameter bound from a method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBinding {
    pub label: ParameterLabel,
    /// Index into the signature's parameters.
    pub param: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub signature: Signature,
    pub text: String,
    pub dialect: Dialect,
    pub mutation: bool,
    /// The type each result is read as; `None` for a raw container.
    pub result: Option<TypeRef>,
    pub container: ResultContainer,
    pub session: SessionBinding,
    pub bindings: Vec<QueryBinding>,
    pub order_by: Vec<OrderSpec>,
    pub data_repository: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecyclePlan {
    pub signature: Signature,
    pub entity: String,
    pub operation: LifecycleOp,
    /// The parameter is an `Iterable<E>` or `E[]`.
    pub many: bool,
    /// The method returns its argument.
    pub returns_argument: bool,
    pub session: SessionBinding,
    pub data_repository: bool,
}

/// Members generated for the repository itself rather than for a declared method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticPlan {
    /// The session field and the constructor setting it.
    RepositoryConstructor {
        repository: String,
        flavor: SessionFlavor,
        field: String,
    },
    /// The implementation of a declared abstract session getter.
    SessionGetter {
        flavor: SessionFlavor,
        name: String,
        field: String,
    },
    /// The no-argument constructor a container uses for a Jakarta Data repository.
    DefaultConstructor {
        repository: String,
        flavor: SessionFlavor,
        field: String,
        data_store: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberPlan {
    Finder(FinderPlan),
    Query(QueryPlan),
    Lifecycle(LifecyclePlan),
    Synthetic(SyntheticPlan),
}

impl MemberPlan {
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            MemberPlan::Finder(plan) => Some(&plan.signature),
            MemberPlan::Query(plan) => Some(&plan.signature),
            MemberPlan::Lifecycle(plan) => Some(&plan.signature),
            MemberPlan::Synthetic(_) => None,
        }
    }

    pub fn session(&self) -> Option<&SessionBinding> {
        match self {
            MemberPlan::Finder(plan) => Some(&plan.session),
            MemberPlan::Query(plan) => Some(&plan.session),
            MemberPlan::Lifecycle(plan) => Some(&plan.session),
            MemberPlan::Synthetic(_) => None,
        }
    }

    /// One-line summary used by `metagen explain`.
    pub fn describe(&self) -> String {
        match self {
            MemberPlan::Finder(plan) => format!("finder: {} of '{}'", plan.strategy, plan.entity),
            MemberPlan::Query(plan) => {
                let kind = if plan.mutation { "mutation" } else { "selection" };
                format!("query: {:?} {kind}, results as {:?}", plan.dialect, plan.container)
            }
            MemberPlan::Lifecycle(plan) => {
                format!("lifecycle: {} of '{}'", plan.operation.operation_name(), plan.entity)
            }
            MemberPlan::Synthetic(SyntheticPlan::RepositoryConstructor { flavor, .. }) => {
                format!("synthetic: constructor taking {}", flavor.type_name())
            }
            MemberPlan::Synthetic(SyntheticPlan::SessionGetter { name, .. }) => format!("synthetic: session getter '{name}'"),
            MemberPlan::Synthetic(SyntheticPlan::DefaultConstructor { .. }) => "synthetic: default constructor".to_string(),
        }
    }
}
