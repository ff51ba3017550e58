//! Output module
//!
//! Report sinks the engine writes resolved results to, and formatters for
//! rendering them.

mod formatter;
mod sink;

pub use formatter::{write_summary_to_file, OutputFormat, ResultFormatter};
pub use sink::{CollectingSink, ConsoleSink, FanoutSink, ReportSink, TracingSink};
