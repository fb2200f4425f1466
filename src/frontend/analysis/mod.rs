//! Repository method analysis.
//!
//! The [`Analyzer`] takes one repository declaration at a time and, for each of its methods, decides what to
//! generate: it classifies the method, validates its parameters and query text against the entity model, and picks
//! a generation strategy. The result is a [`MemberPlan`] which the backend turns into Java source.
//!
//! ## Notes
//!
//! - **Error accumulation**: validation problems are collected per method, so one run reports as many of them as
//!   possible. A method with any error diagnostic produces no member.
//! - **Deferral**: a method whose annotations still carry the host's placeholder token is not analyzable yet. It
//!   yields [`Outcome::RetryLater`]; its buffered diagnostics and cache updates are discarded so that a later round
//!   starts clean.
//! - **Engine errors**: a broken internal invariant is an [`EngineError`], fatal for the current repository.
//!
//! ## See also
//!
//! - [`paths`] – attribute path resolution
//! - [`strategy`] – lookup strategy selection
//! - [`messages`] – the diagnostic catalog

pub mod check_query;
pub mod classify;
pub mod finder;
pub mod lifecycle;
pub mod messages;
pub mod params;
pub mod paths;
pub mod returns;
pub mod session;
pub mod strategy;


use thiserror::Error;

use crate::backend::plan::{MemberPlan, SessionBinding, Signature, SyntheticPlan};
use crate::backend::{Metamodel, emit};
use crate::config::GeneratorConfig;
use crate::frontend::diagnostics::{Diagnostic, DiagnosticsSink, Location};
use crate::frontend::query::QueryValidator;
use crate::model::{EntityProvider, MethodDecl, Modifier, RepositoryDecl};
use classify::MethodClass;
use params::{ClassifiedParam, Classification};
use paths::MemberTypeEntry;
use session::{RepositorySession, SessionMode};

/// A broken internal invariant. Never caused by user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Why analysis of a method stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Halt {
    /// The declaration is not analyzable in this round.
    Defer(String),
    Engine(EngineError),
}

impl From<EngineError> for Halt {
    fn from(error: EngineError) -> Self {
        Halt::Engine(error)
    }
}

pub(crate) type Step<T> = Result<T, Halt>;

/// The result of processing one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Diagnostics were reported and, when there were no errors, the member was committed.
    Completed,
    /// Nothing was reported or committed; process the method again in a later round.
    RetryLater(String),
}

/// A method left for a later round.
#[derive(Debug, Clone, PartialEq)]
pub struct Deferral {
    pub method: MethodDecl,
    pub reason: String,
}

/// Everything the analyzer decided about one method, not yet reported or committed.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodAnalysis {
    pub class: Option<MethodClass>,
    pub plan: Option<MemberPlan>,
    pub diagnostics: Vec<Diagnostic>,
    pub cache_updates: Vec<MemberTypeEntry>,
}

impl MethodAnalysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Done(MethodAnalysis),
    Deferred(String),
}

/// Per-method working state.
pub(crate) struct MethodContext<'m> {
    pub repository: &'m RepositoryDecl,
    pub method: &'m MethodDecl,
    pub session: &'m RepositorySession,
    pub at: Location,
    pub class: Option<MethodClass>,
    diagnostics: Vec<Diagnostic>,
    cache_updates: Vec<MemberTypeEntry>,
}

impl<'m> MethodContext<'m> {
    fn new(repository: &'m RepositoryDecl, method: &'m MethodDecl, session: &'m RepositorySession) -> Self {
        Self {
            repository,
            method,
            session,
            at: Location::method(&repository.qualified_name, &method.name),
            class: None,
            diagnostics: Vec::new(),
            cache_updates: Vec::new(),
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn at_parameter(&self, name: &str) -> Location {
        self.at.at_parameter(name)
    }

    pub fn observe(&mut self, updates: impl IntoIterator<Item = MemberTypeEntry>) {
        self.cache_updates.extend(updates);
    }

    /// Record the member types seen by `classification` and return its parameters.
    pub fn take_params(&mut self, classification: Classification) -> Vec<ClassifiedParam> {
        self.observe(classification.cache_updates);
        classification.params
    }

    /// Where the generated body finds its session: a session-typed parameter overrides the repository's session.
    pub fn session_binding(&self, params: &[ClassifiedParam]) -> SessionBinding {
        let passed = params.iter().find_map(|p| match p.special {
            Some(params::SpecialKind::Session(flavor)) => Some((flavor, p)),
            _ => None,
        });
        match passed {
            Some((flavor, param)) => SessionBinding {
                flavor,
                expression: param.variable(),
                leading_parameter: false,
            },
            None => SessionBinding {
                flavor: self.session.flavor,
                expression: self.session.expression(),
                leading_parameter: self.session.mode == SessionMode::Static,
            },
        }
    }

    pub fn signature(&self, params: Vec<ClassifiedParam>) -> Signature {
        Signature {
            repository: self.repository.qualified_name.clone(),
            name: self.method.name.clone(),
            return_type: self.method.return_type.clone(),
            params,
        }
    }

    fn finish(self, plan: Option<MemberPlan>) -> MethodAnalysis {
        MethodAnalysis {
            class: self.class,
            plan,
            diagnostics: self.diagnostics,
            cache_updates: self.cache_updates,
        }
    }
}

/// Analyzes repository declarations against an entity model.
///
/// Create with [`Analyzer::new`], build a metamodel with [`prepare`](Self::prepare), then feed methods to
/// [`analyze_method`](Self::analyze_method) or a whole declaration to
/// [`analyze_repository`](Self::analyze_repository).
pub struct Analyzer<'a> {
    pub(crate) provider: &'a dyn EntityProvider,
    pub(crate) validator: &'a dyn QueryValidator,
    pub(crate) config: &'a GeneratorConfig,
}

impl<'a> Analyzer<'a> {
    pub fn new(provider: &'a dyn EntityProvider, validator: &'a dyn QueryValidator, config: &'a GeneratorConfig) -> Self {
        Self {
            provider,
            validator,
            config,
        }
    }

    /// Set up the metamodel of `repository`: its session and the synthetic members that hold it.
    ///
    /// ## Errors
    /// - [`EngineError`] if a synthetic member cannot be emitted.
    pub fn prepare(&self, repository: &RepositoryDecl) -> Result<Metamodel, EngineError> {
        let session = session::setup_session(repository);
        let mut metamodel = Metamodel::new(repository, session.clone());

        let mut synthetic = Vec::new();
        if session.mode == SessionMode::Field {
            synthetic.push(SyntheticPlan::RepositoryConstructor {
                repository: repository.qualified_name.clone(),
                flavor: session.flavor,
                field: session.variable.clone(),
            });
            let abstract_getter = session
                .getter
                .as_deref()
                .and_then(|name| repository.method(name))
                .filter(|m| m.is_abstract(repository.kind) && !m.modifiers.contains(&Modifier::Default));
            if let Some(getter) = abstract_getter {
                synthetic.push(SyntheticPlan::SessionGetter {
                    flavor: session.flavor,
                    name: getter.name.clone(),
                    field: session.variable.clone(),
                });
            }
            if repository.is_data_repository() && session.getter.is_none() {
                synthetic.push(SyntheticPlan::DefaultConstructor {
                    repository: repository.qualified_name.clone(),
                    flavor: session.flavor,
                    field: session.variable.clone(),
                    data_store: data_store(repository),
                });
            }
        }

        for plan in synthetic {
            let member = emit::synthesize(
                &MemberPlan::Synthetic(plan),
                &metamodel.member_types,
                &mut metamodel.imports,
                self.config,
            )?;
            metamodel.insert(member);
        }
        Ok(metamodel)
    }

    /// Decide what to generate for `method` without touching any shared state.
    ///
    /// ## Errors
    /// - [`EngineError`] on a broken internal invariant.
    pub fn plan_method(
        &self,
        repository: &RepositoryDecl,
        session: &RepositorySession,
        method: &MethodDecl,
    ) -> Result<Analysis, EngineError> {
        let mut ctx = MethodContext::new(repository, method, session);
        match self.plan_in(&mut ctx) {
            Ok(plan) => {
                if let Some(plan) = &plan {
                    tracing::debug!(method = %method.name, plan = %plan.describe(), "planned");
                }
                Ok(Analysis::Done(ctx.finish(plan)))
            }
            Err(Halt::Defer(reason)) => {
                tracing::debug!(method = %method.name, %reason, "deferred");
                Ok(Analysis::Deferred(reason))
            }
            Err(Halt::Engine(error)) => Err(error),
        }
    }

    fn plan_in(&self, ctx: &mut MethodContext<'_>) -> Step<Option<MemberPlan>> {
        let Some(class) = self.classify_method(ctx)? else {
            return Ok(None);
        };
        ctx.class = Some(class);
        match class {
            MethodClass::Lifecycle(op) => self.plan_lifecycle(ctx, op),
            MethodClass::QueryText(dialect) => self.plan_query(ctx, dialect),
            MethodClass::Finder => self.plan_finder(ctx),
            MethodClass::Accessor(_) | MethodClass::Concrete => Ok(None),
        }
    }

    /// Analyze one method and apply the result to `metamodel`.
    ///
    /// On completion the diagnostics go to `sink`, the observed member types are merged into the metamodel's cache,
    /// and the member is committed when no error was reported. A deferred method leaves everything untouched.
    ///
    /// ## Errors
    /// - [`EngineError`] on a broken internal invariant.
    pub fn analyze_method(
        &self,
        repository: &RepositoryDecl,
        method: &MethodDecl,
        metamodel: &mut Metamodel,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Outcome, EngineError> {
        let analysis = match self.plan_method(repository, &metamodel.session, method)? {
            Analysis::Deferred(reason) => return Ok(Outcome::RetryLater(reason)),
            Analysis::Done(analysis) => analysis,
        };

        metamodel.member_types.merge(analysis.cache_updates.iter().cloned());
        let failed = analysis.has_errors();
        for diagnostic in analysis.diagnostics {
            sink.report(diagnostic);
        }

        match analysis.plan {
            Some(plan) if !failed => {
                let member = emit::synthesize(&plan, &metamodel.member_types, &mut metamodel.imports, self.config)?;
                tracing::debug!(method = %method.name, key = %member.key, "committed");
                metamodel.insert(member);
            }
            Some(_) => tracing::debug!(method = %method.name, "not generated because of errors"),
            None => {}
        }
        Ok(Outcome::Completed)
    }

    /// Analyze every method of `repository` in declaration order.
    ///
    /// ## Returns
    /// - The methods to process again in a later round.
    pub fn analyze_repository(
        &self,
        repository: &RepositoryDecl,
        metamodel: &mut Metamodel,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Vec<Deferral>, EngineError> {
        tracing::debug!(repository = %repository.qualified_name, methods = repository.methods.len(), "analyzing");
        let mut deferred = Vec::new();
        for method in &repository.methods {
            if let Outcome::RetryLater(reason) = self.analyze_method(repository, method, metamodel, sink)? {
                deferred.push(Deferral {
                    method: method.clone(),
                    reason,
                });
            }
        }
        metamodel.mark_initialized();
        Ok(deferred)
    }
}

fn data_store(repository: &RepositoryDecl) -> Option<String> {
    use metagen_core::lang::annotations::{AnnotationId, DATA_STORE_MEMBER};
    crate::model::annotations::find(&repository.annotations, AnnotationId::Repository)
        .and_then(|a| a.string_value(DATA_STORE_MEMBER))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
