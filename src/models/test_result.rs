//! Report models
//!
//! Per-test reports handed to sinks and the suite-wide summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Outcome;

/// Resolved result of a single test, as delivered to a report sink
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub name: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

impl TestReport {
    pub fn new(name: impl Into<String>, outcome: Outcome, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            outcome,
            duration_ms,
        }
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.outcome.symbol(),
            self.name,
            self.duration_ms
        )?;
        if let Some(msg) = self.outcome.message() {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Summary of one suite execution pass, reports in registration order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub suite: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pending: usize,
    pub canceled: usize,
    pub total_duration_ms: u64,
    pub reports: Vec<TestReport>,
}

impl SuiteSummary {
    pub fn new(suite: impl Into<String>, started_at: DateTime<Utc>, reports: Vec<TestReport>) -> Self {
        let count = |pred: fn(&Outcome) -> bool| reports.iter().filter(|r| pred(&r.outcome)).count();

        let succeeded = count(|o| matches!(o, Outcome::Succeeded));
        let failed = count(|o| matches!(o, Outcome::Failed(_)));
        let pending = count(|o| matches!(o, Outcome::Pending));
        let canceled = count(|o| matches!(o, Outcome::Canceled(_)));
        let total_duration_ms = reports.iter().map(|r| r.duration_ms).sum();

        Self {
            suite: suite.into(),
            started_at,
            total: reports.len(),
            succeeded,
            failed,
            pending,
            canceled,
            total_duration_ms,
            reports,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.succeeded == self.total
    }

    /// Look up a report by test name
    pub fn get(&self, name: &str) -> Option<&TestReport> {
        self.reports.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.name.as_str()).collect()
    }
}

impl fmt::Display for SuiteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Suite {}", self.suite)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for report in &self.reports {
            writeln!(f, "  {report}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Pending: {} | Canceled: {}",
            self.total, self.succeeded, self.failed, self.pending, self.canceled
        )?;
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}
