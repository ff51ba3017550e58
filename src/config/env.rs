//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "SUITE_RUNNER";

/// Configuration read from `SUITE_RUNNER_*` variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvConfig {
    /// Suite name from SUITE_RUNNER_SUITE
    pub suite_name: Option<String>,
    /// Concurrency cap from SUITE_RUNNER_MAX_CONCURRENT
    pub max_concurrent: Option<usize>,
    /// Output format from SUITE_RUNNER_FORMAT
    pub format: Option<String>,
    /// Log level from SUITE_RUNNER_LOG
    pub log_level: Option<String>,
    /// Config file from SUITE_RUNNER_CONFIG
    pub config_file: Option<String>,
    /// Disable colors from SUITE_RUNNER_NO_COLOR
    pub no_color: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            suite_name: get_env("SUITE"),
            max_concurrent: get_env_parse("MAX_CONCURRENT"),
            format: get_env("FORMAT"),
            log_level: get_env("LOG"),
            config_file: get_env("CONFIG"),
            no_color: get_env_bool("NO_COLOR"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.suite_name.is_some()
            || self.max_concurrent.is_some()
            || self.format.is_some()
            || self.log_level.is_some()
            || self.config_file.is_some()
            || self.no_color.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all SUITE_RUNNER environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_SUITE            Suite display name");
    println!("  {ENV_PREFIX}_MAX_CONCURRENT   Maximum in-flight async tests");
    println!("  {ENV_PREFIX}_FORMAT           Output format (table, json, csv, summary)");
    println!("  {ENV_PREFIX}_LOG              Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_CONFIG           Path to configuration file");
    println!("  {ENV_PREFIX}_NO_COLOR         Disable colored output (true/false)");
}
