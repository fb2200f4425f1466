//! Round-based processing of a domain model.
//!
//! The first round analyzes every repository. A method that is not analyzable yet is queued and analyzed again in
//! the next round, against the declarations of that round's model, until the queue is empty or the configured number
//! of rounds has run. What is still queued then is reported with a warning.
//!
//! Two declarations of the same repository (from different model sources) produce one metamodel: the later one is
//! merged into the earlier.

use std::collections::BTreeMap;

use crate::backend::Metamodel;
use crate::config::GeneratorConfig;
use crate::frontend::analysis::{Analyzer, Deferral, EngineError, Outcome, messages};
use crate::frontend::diagnostics::{Diagnostic, DiagnosticsSink, Location};
use crate::frontend::query::QueryValidator;
use crate::model::{DomainModel, RepositoryDecl};

/// A method waiting for a later round.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMethod {
    pub repository: String,
    pub deferral: Deferral,
}

/// What one round did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: usize,
    pub processed: usize,
    pub deferred: usize,
}

pub struct Driver<'a> {
    config: &'a GeneratorConfig,
    validator: &'a dyn QueryValidator,
    metamodels: BTreeMap<String, Metamodel>,
    queue: Vec<PendingMethod>,
    rounds: usize,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a GeneratorConfig, validator: &'a dyn QueryValidator) -> Self {
        Self {
            config,
            validator,
            metamodels: BTreeMap::new(),
            queue: Vec::new(),
            rounds: 0,
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn pending(&self) -> &[PendingMethod] {
        &self.queue
    }

    pub fn metamodel(&self, repository: &str) -> Option<&Metamodel> {
        self.metamodels.get(repository)
    }

    pub fn metamodels(&self) -> impl Iterator<Item = &Metamodel> {
        self.metamodels.values()
    }

    pub fn into_metamodels(self) -> Vec<Metamodel> {
        self.metamodels.into_values().collect()
    }

    /// Run one round over `model`.
    ///
    /// An engine error abandons the repository it occurred in: it is reported as an error diagnostic and the
    /// repository's metamodel is dropped.
    pub fn run_round(&mut self, model: &DomainModel, sink: &mut dyn DiagnosticsSink) -> RoundSummary {
        self.rounds += 1;
        let analyzer = Analyzer::new(model, self.validator, self.config);
        let processed = if self.rounds == 1 {
            let mut processed = 0;
            for repository in &model.repositories {
                processed += repository.methods.len();
                if let Err(error) = self.first_round(&analyzer, repository, sink) {
                    self.abandon(&repository.qualified_name, &error, sink);
                }
            }
            processed
        } else {
            self.retry(&analyzer, model, sink)
        };

        let summary = RoundSummary {
            round: self.rounds,
            processed,
            deferred: self.queue.len(),
        };
        tracing::info!(round = summary.round, processed, deferred = summary.deferred, "round complete");
        summary
    }

    fn first_round(
        &mut self,
        analyzer: &Analyzer<'_>,
        repository: &RepositoryDecl,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<(), EngineError> {
        let mut metamodel = analyzer.prepare(repository)?;
        let deferrals = analyzer.analyze_repository(repository, &mut metamodel, sink)?;
        self.queue.extend(deferrals.into_iter().map(|deferral| PendingMethod {
            repository: repository.qualified_name.clone(),
            deferral,
        }));
        match self.metamodels.get_mut(&repository.qualified_name) {
            Some(existing) => {
                tracing::debug!(repository = %repository.qualified_name, "merging second declaration");
                existing.merge_in(metamodel);
            }
            None => {
                self.metamodels.insert(repository.qualified_name.clone(), metamodel);
            }
        }
        Ok(())
    }

    fn retry(&mut self, analyzer: &Analyzer<'_>, model: &DomainModel, sink: &mut dyn DiagnosticsSink) -> usize {
        let queue = std::mem::take(&mut self.queue);
        let processed = queue.len();
        let mut abandoned: Vec<(String, EngineError)> = Vec::new();
        for pending in queue {
            if abandoned.iter().any(|(name, _)| *name == pending.repository) {
                continue;
            }
            let Some(metamodel) = self.metamodels.get_mut(&pending.repository) else {
                continue;
            };
            // the declaration of this round supersedes the queued copy
            let current = model.repository(&pending.repository);
            let method = current
                .and_then(|r| r.method_matching(&pending.deferral.method))
                .unwrap_or(&pending.deferral.method);
            let fallback;
            let repository = match current {
                Some(repository) => repository,
                None => {
                    fallback = RepositoryDecl::new(pending.repository.clone());
                    &fallback
                }
            };
            match analyzer.analyze_method(repository, method, metamodel, sink) {
                Ok(Outcome::Completed) => {}
                Ok(Outcome::RetryLater(reason)) => self.queue.push(PendingMethod {
                    repository: pending.repository.clone(),
                    deferral: Deferral {
                        method: method.clone(),
                        reason,
                    },
                }),
                Err(error) => abandoned.push((pending.repository.clone(), error)),
            }
        }
        for (repository, error) in abandoned {
            self.abandon(&repository, &error, sink);
        }
        processed
    }

    fn abandon(&mut self, repository: &str, error: &EngineError, sink: &mut dyn DiagnosticsSink) {
        tracing::error!(%repository, %error, "repository abandoned");
        self.metamodels.remove(repository);
        self.queue.retain(|p| p.repository != repository);
        sink.report(Diagnostic::error(error.to_string(), Location::repository(repository)));
    }

    /// Run rounds over `model` until nothing is deferred or the round limit is reached.
    pub fn run(&mut self, model: &DomainModel, sink: &mut dyn DiagnosticsSink) {
        loop {
            self.run_round(model, sink);
            if self.queue.is_empty() || self.rounds >= self.config.max_rounds {
                break;
            }
        }
        self.finish(sink);
    }

    /// Report every method still deferred.
    pub fn finish(&mut self, sink: &mut dyn DiagnosticsSink) {
        for pending in std::mem::take(&mut self.queue) {
            tracing::warn!(
                repository = %pending.repository,
                method = %pending.deferral.method.name,
                reason = %pending.deferral.reason,
                "deferral exhausted"
            );
            sink.report(messages::deferral_exhausted(
                self.rounds,
                &pending.deferral.reason,
                Location::method(&pending.repository, &pending.deferral.method.name),
            ));
        }
    }
}
