//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Deferred-result test suite runner
#[derive(Parser, Debug)]
#[command(name = "suite-runner")]
#[command(version)]
#[command(about = "Run a test suite with non-blocking deferred results")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bundled demo suite
    Run(RunArgs),

    /// List the tests registered in the demo suite
    List,

    /// Show supported environment variables
    Env,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Maximum number of async tests in flight
    #[arg(short = 'j', long)]
    pub concurrent: Option<usize>,

    /// Suite display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print each report as it resolves
    #[arg(long)]
    pub stream: bool,

    /// Trigger the suite a second time to show the no-op dispatch
    #[arg(long)]
    pub rerun: bool,

    /// Save the summary to file
    #[arg(short, long)]
    pub output: Option<String>,
}
