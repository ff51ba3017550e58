//! Data models for test execution
//!
//! Outcomes, per-test reports and suite summaries.

mod outcome;
mod test_result;

pub use outcome::{Failure, FailureKind, Outcome};
pub use test_result::{SuiteSummary, TestReport};
