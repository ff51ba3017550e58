//! Suite controller
//!
//! Collects test registrations behind the phase gate and drives a single
//! execution pass over the sealed registry.

mod gate;
mod registry;

pub use gate::{PhaseGate, SuitePhase};
pub use registry::{SealedRegistry, TestEntry, TestRegistry};

use chrono::Utc;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::deferred::{Deferred, DeferredResult, IntoDeferred};
use crate::error::{AlreadyReady, RegistrationClosed, RegistrationError};
use crate::executor::TestRunner;
use crate::models::SuiteSummary;

/// Result of calling [`Suite::run`]
#[must_use]
#[derive(Debug)]
pub enum RunDispatch {
    /// This call won the phase flip and dispatched every test
    Started(Deferred<SuiteSummary>),
    /// The suite was already started; nothing was executed
    AlreadyStarted,
}

impl RunDispatch {
    pub fn is_started(&self) -> bool {
        matches!(self, RunDispatch::Started(_))
    }

    pub fn into_summary(self) -> Option<Deferred<SuiteSummary>> {
        match self {
            RunDispatch::Started(summary) => Some(summary),
            RunDispatch::AlreadyStarted => None,
        }
    }
}

/// A test suite: registration surface plus the single run trigger
pub struct Suite {
    name: String,
    gate: PhaseGate<TestRegistry>,
    sealed: OnceLock<SealedRegistry>,
    runner: TestRunner,
}

impl Suite {
    pub fn new(name: impl Into<String>, runner: TestRunner) -> Self {
        Self {
            name: name.into(),
            gate: PhaseGate::new(TestRegistry::new()),
            sealed: OnceLock::new(),
            runner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> SuitePhase {
        self.gate.phase()
    }

    /// Register a test whose body yields an outcome, a deferred outcome or
    /// a `Result<(), E>`
    pub fn test<F, R>(&self, name: impl Into<String>, body: F) -> Result<(), RegistrationError>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoDeferred,
    {
        let name = name.into();
        let entry = TestEntry::new(name.clone(), body);

        match self.gate.register(|registry| registry.insert(entry)) {
            Ok(Ok(())) => {
                debug!(suite = %self.name, test = %name, "test registered");
                Ok(())
            }
            Ok(Err(duplicate)) => {
                warn!(suite = %self.name, test = %name, "duplicate test name rejected");
                Err(duplicate.into())
            }
            Err(RegistrationClosed) => {
                warn!(suite = %self.name, test = %name, "registration after suite start rejected");
                Err(RegistrationError::TestRegistrationClosed { name })
            }
        }
    }

    /// Register a test whose body is an async block
    pub fn test_async<F, Fut>(&self, name: impl Into<String>, body: F) -> Result<(), RegistrationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoDeferred,
    {
        self.test(name, move || {
            let fut = body();
            DeferredResult::from_future(async move {
                let deferred = fut.await.into_deferred();
                deferred.await
            })
        })
    }

    /// Names of registered tests in registration order
    pub fn test_names(&self) -> Vec<String> {
        match self.sealed.get() {
            Some(sealed) => sealed.names(),
            // The sealed registry is published under the gate lock, so once
            // `inspect` finds the registry taken it is already set.
            None => self
                .gate
                .inspect(TestRegistry::names)
                .or_else(|| self.sealed.get().map(SealedRegistry::names))
                .unwrap_or_default(),
        }
    }

    /// Registry snapshot, available once the phase reads `Ready`
    pub fn snapshot(&self) -> Option<Arc<[TestEntry]>> {
        self.sealed.get().map(SealedRegistry::snapshot)
    }

    /// Seal registration and dispatch every registered test.
    ///
    /// Only the first call executes anything. It returns as soon as all
    /// tests are launched; the returned deferred summary resolves once every
    /// test has, with reports in registration order.
    pub fn run(&self) -> RunDispatch {
        let sealed = self
            .gate
            .enter_ready_with(|registry| self.sealed.get_or_init(|| registry.seal()).snapshot());
        let entries = match sealed {
            Ok(entries) => entries,
            Err(AlreadyReady) => {
                debug!(suite = %self.name, "suite already started; run ignored");
                return RunDispatch::AlreadyStarted;
            }
        };

        info!(suite = %self.name, tests = entries.len(), "dispatching suite");

        let started_at = Utc::now();
        let reports = entries.iter().map(|entry| self.runner.dispatch(entry)).collect();
        let suite = self.name.clone();

        RunDispatch::Started(Deferred::join_all(reports).map(move |reports| {
            let summary = SuiteSummary::new(suite, started_at, reports);
            info!(
                suite = %summary.suite,
                passed = summary.succeeded,
                total = summary.total,
                "suite completed"
            );
            summary
        }))
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
