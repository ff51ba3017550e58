//! Suite Runner - test-suite execution engine
//!
//! Test authors register named tests whose outcome is either known
//! immediately or produced later through a [`DeferredResult`]. A suite moves
//! from registration to ready exactly once, runs every registered test in a
//! single dispatch pass, and reports each resolved outcome to a sink without
//! blocking a thread per in-flight test.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use suite_runner::{
//!     CollectingSink, DeferredResult, Outcome, Suite, TestRunner, TokioExecutor,
//! };
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let runner = TestRunner::new(
//!     Arc::new(TokioExecutor::current()?),
//!     Arc::new(CollectingSink::new()),
//! );
//! let suite = Suite::new("math", runner);
//!
//! suite.test("adds", || Outcome::check(1 + 1 == 2, "1 + 1 != 2"))?;
//! suite.test("later", || {
//!     DeferredResult::from_future(async { Outcome::Succeeded })
//! })?;
//!
//! if let Some(summary) = suite.run().into_summary() {
//!     println!("{}", summary.await);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod deferred;
pub mod error;
pub mod executor;
pub mod models;
pub mod output;
pub mod suite;
pub mod utils;

pub use deferred::{Completer, Deferred, DeferredResult, IntoDeferred};
pub use error::{AlreadyReady, DuplicateName, EngineError, RegistrationClosed, RegistrationError};
pub use executor::{ConcurrencyLimit, Executor, TestRunner, TokioExecutor};
pub use models::{Failure, FailureKind, Outcome, SuiteSummary, TestReport};
pub use output::{CollectingSink, ConsoleSink, FanoutSink, ReportSink, TracingSink};
pub use suite::{PhaseGate, RunDispatch, Suite, SuitePhase, TestEntry, TestRegistry};
