//! Report sinks
//!
//! A sink receives every test's report exactly once, from whatever context
//! the test resolved on. Order across tests is not guaranteed.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use super::ResultFormatter;
use crate::models::{Outcome, TestReport};

/// Destination for resolved test reports
pub trait ReportSink: Send + Sync {
    fn report(&self, report: &TestReport);
}

impl<S: ReportSink + ?Sized> ReportSink for Arc<S> {
    fn report(&self, report: &TestReport) {
        (**self).report(report)
    }
}

/// Keeps reports in memory in arrival order
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<TestReport>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn reports(&self) -> Vec<TestReport> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    /// How many times `name` was reported
    pub fn count_for(&self, name: &str) -> usize {
        self.reports.lock().iter().filter(|r| r.name == name).count()
    }

    /// First reported outcome for `name`
    pub fn outcome_of(&self, name: &str) -> Option<Outcome> {
        self.reports
            .lock()
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.outcome.clone())
    }
}

impl ReportSink for CollectingSink {
    fn report(&self, report: &TestReport) {
        self.reports.lock().push(report.clone());
    }
}

/// Emits one structured event per report
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, report: &TestReport) {
        match &report.outcome {
            Outcome::Succeeded | Outcome::Pending => info!(
                test = %report.name,
                status = report.outcome.label(),
                duration_ms = report.duration_ms,
                "test finished"
            ),
            Outcome::Failed(_) | Outcome::Canceled(_) => warn!(
                test = %report.name,
                status = report.outcome.label(),
                duration_ms = report.duration_ms,
                detail = %report.outcome.message().unwrap_or_default(),
                "test finished"
            ),
        }
    }
}

/// Prints each report as it arrives
#[derive(Default)]
pub struct ConsoleSink {
    formatter: ResultFormatter,
}

impl ConsoleSink {
    pub fn new(formatter: ResultFormatter) -> Self {
        Self { formatter }
    }
}

impl ReportSink for ConsoleSink {
    fn report(&self, report: &TestReport) {
        println!("{}", self.formatter.format_report(report));
    }
}

/// Forwards every report to several sinks
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ReportSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for FanoutSink {
    fn report(&self, report: &TestReport) {
        for sink in &self.sinks {
            sink.report(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.report(&TestReport::new("a", Outcome::Succeeded, 1));
        sink.report(&TestReport::new("b", Outcome::failed("nope"), 2));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count_for("a"), 1);
        assert_eq!(sink.outcome_of("b"), Some(Outcome::failed("nope")));
        assert_eq!(sink.outcome_of("c"), None);
    }

    #[test]
    fn test_fanout_sink_forwards_to_all() {
        let first = Arc::new(CollectingSink::new());
        let second = Arc::new(CollectingSink::new());
        let fanout = FanoutSink::new()
            .with(first.clone())
            .with(second.clone())
            .with(Arc::new(TracingSink));

        fanout.report(&TestReport::new("x", Outcome::Pending, 0));

        assert_eq!(fanout.len(), 3);
        assert_eq!(first.len(), 1);
        assert_eq!(second.outcome_of("x"), Some(Outcome::Pending));
    }
}
