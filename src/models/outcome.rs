//! Test outcome model
//!
//! The closed set of dispositions a single test execution can end in.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// What produced a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The test body judged its own result and rejected it
    Assertion,
    /// The test body faulted unexpectedly
    Panic,
}

/// Cause carried by `Outcome::Failed`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Assertion,
            message: message.into(),
        }
    }

    pub fn panic(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Panic,
            message: message.into(),
        }
    }

    /// Recover the message from a caught panic payload
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "test body panicked with a non-string payload".to_string(),
            },
        };
        Self::panic(message)
    }

    pub fn is_panic(&self) -> bool {
        self.kind == FailureKind::Panic
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Assertion => write!(f, "{}", self.message),
            FailureKind::Panic => write!(f, "panicked: {}", self.message),
        }
    }
}

/// Resolved outcome of one test
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed(Failure),
    Pending,
    Canceled(String),
}

impl Outcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Outcome::Failed(Failure::assertion(message))
    }

    pub fn canceled(reason: impl Into<String>) -> Self {
        Outcome::Canceled(reason.into())
    }

    /// Pass/fail judgment lifted from a boolean check
    pub fn check(passed: bool, message: impl Into<String>) -> Self {
        if passed {
            Outcome::Succeeded
        } else {
            Outcome::failed(message)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn cause(&self) -> Option<&Failure> {
        match self {
            Outcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Human-readable detail, if the outcome carries one
    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Failed(failure) => Some(failure.to_string()),
            Outcome::Canceled(reason) => Some(reason.clone()),
            Outcome::Succeeded | Outcome::Pending => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Succeeded => "✓",
            Outcome::Failed(_) => "✗",
            Outcome::Pending => "○",
            Outcome::Canceled(_) => "!",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Succeeded => "PASS",
            Outcome::Failed(_) => "FAIL",
            Outcome::Pending => "PENDING",
            Outcome::Canceled(_) => "CANCELED",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if let Some(msg) = self.message() {
            write!(f, " ({msg})")?;
        }
        Ok(())
    }
}
