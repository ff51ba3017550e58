//! Suite Runner CLI
//!
//! Runs a bundled demo suite through the execution engine and prints the
//! results.
//!
//! ## Usage
//!
//! ```bash
//! # Run the demo suite
//! suite-runner run
//!
//! # JSON output, at most two async tests in flight
//! suite-runner run --format json -j 2
//!
//! # Show that a second trigger does not execute anything
//! suite-runner run --rerun
//!
//! # List registered tests
//! suite-runner list
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod cli;
mod demo;

use cli::{Args, Command, RunArgs};
use suite_runner::config::env::{print_env_help, EnvConfig};
use suite_runner::config::EngineConfig;
use suite_runner::output::{write_summary_to_file, ResultFormatter};
use suite_runner::utils::{init_logger, LogLevel, Timer};
use suite_runner::{
    CollectingSink, ConsoleSink, FanoutSink, ReportSink, RunDispatch, Suite, TestRunner,
    TokioExecutor, TracingSink,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let mut config = match args.config.clone().or_else(|| env.config_file.clone().map(Into::into)) {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::load_default()?,
    };
    config.apply_env(&env);
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log_level()
    };
    init_logger(level)?;

    match args.command {
        Command::Run(run_args) => run_suite(config, run_args).await,
        Command::List => list_tests(config),
        Command::Env => {
            print_env_help();
            Ok(())
        }
    }
}

async fn run_suite(mut config: EngineConfig, args: RunArgs) -> Result<()> {
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(concurrent) = args.concurrent {
        config.max_concurrent = Some(concurrent);
    }
    if let Some(name) = args.name {
        config.suite_name = name;
    }
    if args.no_color {
        config.colorize = false;
    }
    config.validate()?;

    let mut formatter = ResultFormatter::new(config.output_format());
    if !config.colorize {
        formatter = formatter.no_color();
    }

    let collected = Arc::new(CollectingSink::new());
    let mut sink = FanoutSink::new()
        .with(Arc::new(TracingSink))
        .with(collected.clone());
    if args.stream {
        sink = sink.with(Arc::new(ConsoleSink::new(formatter.clone())));
    }

    let suite = build_suite(&config, Arc::new(sink))?;
    info!(suite = %suite, tests = suite.test_names().len(), "suite registered");

    let timer = Timer::start(format!("suite {suite}"));
    let dispatch = suite.run();

    if args.rerun {
        let again = suite.run();
        info!(started = again.is_started(), "second run trigger");
    }

    let summary = match dispatch {
        RunDispatch::Started(summary) => summary.await,
        RunDispatch::AlreadyStarted => anyhow::bail!("suite was already started"),
    };
    let elapsed = timer.stop();

    println!("{}", formatter.format_summary(&summary));
    info!(
        reports = collected.len(),
        wall_ms = elapsed.as_millis() as u64,
        "suite finished"
    );

    if let Some(path) = args.output {
        write_summary_to_file(&path, &summary, config.output_format())
            .with_context(|| format!("Failed to save summary to {path}"))?;
        info!("Summary saved to {}", path);
    }

    Ok(())
}

fn list_tests(config: EngineConfig) -> Result<()> {
    config.validate()?;
    let suite = build_suite(&config, Arc::new(CollectingSink::new()))?;

    println!("Suite: {suite}");
    for (idx, name) in suite.test_names().iter().enumerate() {
        println!("  {:2}. {}", idx + 1, name);
    }

    Ok(())
}

fn build_suite(config: &EngineConfig, sink: Arc<dyn ReportSink>) -> Result<Suite> {
    let executor = Arc::new(TokioExecutor::current()?);
    let runner = TestRunner::from_config(config, executor, sink);
    let suite = Suite::new(config.suite_name.clone(), runner);
    demo::register(&suite)?;
    Ok(suite)
}
