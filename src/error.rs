//! Error types
//!
//! Registration-time errors are synchronous and local to the failing call.
//! Execution-time faults never show up here: they become `Outcome::Failed`.

use thiserror::Error;

/// The phase gate has already flipped to `Ready`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("registration is closed: the suite has entered the ready phase")]
pub struct RegistrationClosed;

/// Returned to every `enter_ready` caller except the first.
///
/// This is a no-op signal, not a failure: the gate stays `Ready`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("suite already entered the ready phase")]
pub struct AlreadyReady;

/// A test with this name is already registered.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("duplicate test name: {0}")]
pub struct DuplicateName(pub String);

/// Errors surfaced to suite authors by `Suite::test`
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("duplicate test name: {0}")]
    DuplicateName(String),

    #[error("cannot register test '{name}': registration is closed")]
    TestRegistrationClosed { name: String },
}

impl RegistrationError {
    /// Name of the test whose registration was rejected
    pub fn test_name(&self) -> &str {
        match self {
            RegistrationError::DuplicateName(name) => name,
            RegistrationError::TestRegistrationClosed { name } => name,
        }
    }
}

impl From<DuplicateName> for RegistrationError {
    fn from(err: DuplicateName) -> Self {
        RegistrationError::DuplicateName(err.0)
    }
}

/// Engine wiring errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no async runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
