//! Test execution engine
//!
//! Runs registered tests, lifts their results into deferred outcomes and
//! reports each resolved outcome to a sink.

mod parallel;
mod runner;
mod spawner;

pub use parallel::ConcurrencyLimit;
pub use runner::TestRunner;
pub use spawner::{Executor, TokioExecutor};
