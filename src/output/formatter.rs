//! Output formatters for test results
//!
//! Provides JSON, Table, CSV and summary output formats.

use serde::Serialize;
use std::io::Write;

use crate::models::{Outcome, SuiteSummary, TestReport};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    position: usize,
    name: &'a str,
    status: &'static str,
    duration_ms: u64,
    message: String,
}

/// Result formatter
#[derive(Clone, Debug)]
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a single test report
    pub fn format_report(&self, report: &TestReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Csv => self.to_csv(std::slice::from_ref(report), false),
            OutputFormat::Summary => format!(
                "{} {} ({}ms)",
                report.outcome.symbol(),
                report.name,
                report.duration_ms
            ),
        }
    }

    fn status_cell(&self, outcome: &Outcome) -> String {
        let plain = format!("{} {}", outcome.symbol(), outcome.label());
        if !self.colorize {
            return plain;
        }
        let color = match outcome {
            Outcome::Succeeded => "32",
            Outcome::Failed(_) => "31",
            Outcome::Pending | Outcome::Canceled(_) => "33",
        };
        format!("\x1b[{color}m{plain}\x1b[0m")
    }

    fn format_report_table(&self, report: &TestReport) -> String {
        let mut line = format!(
            "{:30} {} [{:>6}ms]",
            report.name,
            self.status_cell(&report.outcome),
            report.duration_ms
        );
        if let Some(msg) = report.outcome.message() {
            line.push_str(&format!(" - {msg}"));
        }
        line
    }

    fn to_csv(&self, reports: &[TestReport], headers: bool) -> String {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(headers)
            .from_writer(Vec::new());

        for (idx, report) in reports.iter().enumerate() {
            let row = CsvRow {
                position: idx + 1,
                name: &report.name,
                status: report.outcome.label(),
                duration_ms: report.duration_ms,
                message: report.outcome.message().unwrap_or_default(),
            };
            if writer.serialize(row).is_err() {
                return String::new();
            }
        }

        writer
            .into_inner()
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default()
    }

    /// Format a suite summary
    pub fn format_summary(&self, summary: &SuiteSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Csv => self.to_csv(&summary.reports, true),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &SuiteSummary) -> String {
        let mut output = String::new();

        output.push_str("\n══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(
            " Suite: {} (started {})\n",
            summary.suite,
            summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str("══════════════════════════════════════════════════════════════\n");

        for (idx, report) in summary.reports.iter().enumerate() {
            output.push_str(&format!(
                " {:2}. {}\n",
                idx + 1,
                self.format_report_table(report)
            ));
        }

        output.push_str("──────────────────────────────────────────────────────────────\n");

        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            " Total: {} | Pass: {} | Fail: {} | Pending: {} | Canceled: {}\n",
            summary.total, summary.succeeded, fail_str, summary.pending, summary.canceled
        ));
        output.push_str(&format!(
            " Pass Rate: {:5.1}% | Duration: {}ms\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));

        output
    }

    fn format_summary_brief(&self, summary: &SuiteSummary) -> String {
        format!(
            "{}: {}/{} passed ({:.1}%) in {}ms",
            summary.suite,
            summary.succeeded,
            summary.total,
            summary.pass_rate(),
            summary.total_duration_ms
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Write a suite summary to a file
pub fn write_summary_to_file(
    path: &str,
    summary: &SuiteSummary,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_summary(summary);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
