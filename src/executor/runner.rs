//! Test execution runner
//!
//! Executes single test entries and forwards their resolved outcomes to the
//! report sink.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

use super::{ConcurrencyLimit, Executor};
use crate::config::EngineConfig;
use crate::deferred::{Deferred, DeferredResult};
use crate::models::{Failure, Outcome, TestReport};
use crate::output::ReportSink;
use crate::suite::TestEntry;
use crate::utils::Timer;

/// Runs test entries and reports each one exactly once
pub struct TestRunner {
    executor: Arc<dyn Executor>,
    sink: Arc<dyn ReportSink>,
    limit: ConcurrencyLimit,
}

impl TestRunner {
    /// Create a new test runner
    pub fn new(executor: Arc<dyn Executor>, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            executor,
            sink,
            limit: ConcurrencyLimit::unbounded(),
        }
    }

    /// Create a runner with the limits from an engine configuration
    pub fn from_config(
        config: &EngineConfig,
        executor: Arc<dyn Executor>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self::new(executor, sink).with_limit(ConcurrencyLimit::from_option(config.max_concurrent))
    }

    /// Bound the number of concurrently polled async bodies
    pub fn with_max_concurrent(self, max_concurrent: usize) -> Self {
        self.with_limit(ConcurrencyLimit::new(max_concurrent))
    }

    pub fn with_limit(mut self, limit: ConcurrencyLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> &ConcurrencyLimit {
        &self.limit
    }

    /// Run a single entry and return its deferred outcome
    pub fn run(&self, entry: &TestEntry) -> DeferredResult {
        self.dispatch(entry).map(|report| report.outcome)
    }

    /// Run a single entry and return its deferred report.
    ///
    /// The body is invoked inline. Faults raised by the body, synchronously
    /// or while its future is polled, resolve as `Outcome::Failed`. The sink
    /// sees the report before the returned deferred resolves. An immediate
    /// outcome is reported on the calling thread and comes back resolved.
    pub fn dispatch(&self, entry: &TestEntry) -> Deferred<TestReport> {
        debug!(test = entry.name(), "dispatching test");

        let timer = Timer::start(entry.name());
        let deferred = match panic::catch_unwind(AssertUnwindSafe(|| entry.invoke())) {
            Ok(deferred) => deferred.catch_faults(),
            Err(payload) => Deferred::resolved(Outcome::Failed(Failure::from_panic(payload))),
        };
        let sink = Arc::clone(&self.sink);

        let deferred = match self.limit.guard(deferred).try_take() {
            Ok(outcome) => return Deferred::resolved(finish(&*sink, timer, outcome)),
            Err(pending) => pending,
        };

        let (completer, reported) = Deferred::channel();
        deferred.on_resolve(self.executor.as_ref(), move |outcome| {
            completer.complete(finish(&*sink, timer, outcome));
        });

        reported
    }
}

/// Build the report for a resolved outcome and hand it to the sink
fn finish(sink: &dyn ReportSink, timer: Timer, outcome: Outcome) -> TestReport {
    let report = TestReport::new(timer.label(), outcome, timer.elapsed_ms());
    debug!(
        test = %report.name,
        status = report.outcome.label(),
        duration_ms = report.duration_ms,
        "test resolved"
    );

    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink.report(&report))) {
        error!(
            test = %report.name,
            cause = %Failure::from_panic(payload),
            "report sink panicked"
        );
    }
    report
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::executor::TokioExecutor;
    use crate::models::FailureKind;
    use crate::output::CollectingSink;
    use std::time::Duration;

    fn runner_with_sink() -> (TestRunner, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let executor = Arc::new(TokioExecutor::current().unwrap());
        (TestRunner::new(executor, sink.clone()), sink)
    }

    struct PanickingSink;

    impl ReportSink for PanickingSink {
        fn report(&self, _report: &TestReport) {
            panic!("sink is broken");
        }
    }

    #[tokio::test]
    async fn test_sync_pass_is_reported_before_dispatch_returns() {
        let (runner, sink) = runner_with_sink();
        let entry = TestEntry::new("sync", || Outcome::Succeeded);

        let report = runner.dispatch(&entry);
        assert_eq!(sink.outcome_of("sync"), Some(Outcome::Succeeded));
        assert_eq!(report.await.outcome, Outcome::Succeeded);
    }

    #[test]
    fn test_sync_outcome_resolves_without_executor_work() {
        // The runtime is never driven: nothing spawned on it can run.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let executor = Arc::new(TokioExecutor::new(runtime.handle().clone()));
        let sink = Arc::new(CollectingSink::new());
        let runner = TestRunner::new(executor.clone(), sink.clone());
        let entry = TestEntry::new("sync", || Outcome::Succeeded);

        let deferred = runner.run(&entry);
        assert!(deferred.is_resolved());
        assert_eq!(sink.len(), 1);

        let (tx, mut rx) = tokio::sync::oneshot::channel();
        deferred.on_resolve(executor.as_ref(), move |outcome| {
            let _ = tx.send(outcome);
        });
        assert_eq!(rx.try_recv().ok(), Some(Outcome::Succeeded));

        let report = runner.dispatch(&TestEntry::new("panics", || -> Outcome { panic!("early") }));
        assert_eq!(
            report.try_take().ok().map(|r| r.outcome),
            Some(Outcome::Failed(Failure::panic("early")))
        );
    }

    #[test]
    fn test_sync_outcome_bypasses_concurrency_limit() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let executor = Arc::new(TokioExecutor::new(runtime.handle().clone()));
        let runner = TestRunner::new(executor, Arc::new(CollectingSink::new()))
            .with_max_concurrent(1);

        let entry = TestEntry::new("limited", || Ok::<(), String>(()));
        assert!(runner.run(&entry).is_resolved());
        assert_eq!(runner.limit().available(), Some(1));
    }

    #[tokio::test]
    async fn test_sync_panic_becomes_failure() {
        let (runner, sink) = runner_with_sink();
        let entry = TestEntry::new("explodes", || -> Outcome { panic!("division by zero") });

        let outcome = runner.run(&entry).await;
        assert_eq!(outcome, Outcome::Failed(Failure::panic("division by zero")));
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_async_body_reported_once_after_resolution() {
        let (runner, sink) = runner_with_sink();
        let entry = TestEntry::new("slow", || {
            DeferredResult::from_future(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Outcome::failed("timeout budget exceeded")
            })
        });

        let deferred = runner.run(&entry);
        assert!(sink.is_empty());

        let outcome = deferred.await;
        assert_eq!(outcome.cause().map(|c| c.kind), Some(FailureKind::Assertion));
        assert_eq!(sink.count_for("slow"), 1);
    }

    #[tokio::test]
    async fn test_async_panic_becomes_failure() {
        let (runner, sink) = runner_with_sink();
        let entry = TestEntry::new("async-explodes", || {
            DeferredResult::from_future(async { panic!("lost connection") })
        });

        let outcome = runner.run(&entry).await;
        assert_eq!(outcome, Outcome::Failed(Failure::panic("lost connection")));
        assert_eq!(sink.outcome_of("async-explodes"), Some(outcome));
    }

    #[tokio::test]
    async fn test_panicking_sink_is_contained() {
        let executor = Arc::new(TokioExecutor::current().unwrap());
        let runner = TestRunner::new(executor, Arc::new(PanickingSink));
        let entry = TestEntry::new("unaffected", || Outcome::Succeeded);

        assert_eq!(runner.run(&entry).await, Outcome::Succeeded);
    }

    #[tokio::test]
    async fn test_runner_from_config() {
        let config = EngineConfig {
            max_concurrent: Some(3),
            ..EngineConfig::default()
        };
        let executor = Arc::new(TokioExecutor::current().unwrap());
        let runner = TestRunner::from_config(&config, executor, Arc::new(CollectingSink::new()));
        assert_eq!(runner.limit().max_concurrent(), Some(3));
    }
}
