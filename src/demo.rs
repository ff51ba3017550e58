//! Demo suite
//!
//! A handful of tests covering every way a body can end: immediate
//! judgments, async completions, external completion sources and faults.

use rand::Rng;
use std::time::Duration;

use suite_runner::{DeferredResult, Outcome, RegistrationError, Suite};

/// Random latency so async completions arrive out of order
fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(5..60))
}

pub fn register(suite: &Suite) -> Result<(), RegistrationError> {
    suite.test("arithmetic", || {
        Outcome::check(2 + 2 == 4, "2 + 2 should equal 4")
    })?;

    suite.test("string_roundtrip", || -> Result<(), String> {
        let parsed: u64 = "4096"
            .parse()
            .map_err(|e| format!("parse failed: {e}"))?;
        if parsed.to_string() != "4096" {
            return Err(format!("round trip produced {parsed}"));
        }
        Ok(())
    })?;

    suite.test_async("delayed_success", || async {
        tokio::time::sleep(jitter()).await;
        Outcome::Succeeded
    })?;

    suite.test_async("delayed_mismatch", || async {
        tokio::time::sleep(jitter()).await;
        let observed = 41;
        Outcome::check(observed == 42, format!("expected 42, observed {observed}"))
    })?;

    suite.test("external_completion", || {
        let (completer, deferred) = DeferredResult::completion();
        tokio::spawn(async move {
            tokio::time::sleep(jitter()).await;
            completer.complete(Outcome::Succeeded);
        });
        deferred
    })?;

    suite.test("not_implemented_yet", || Outcome::Pending)?;

    suite.test("missing_fixture", || {
        Outcome::canceled("fixture database unavailable")
    })?;

    suite.test("panicking_body", || -> Outcome {
        let values: Vec<u32> = Vec::new();
        let first = values.first().copied();
        panic!("no values to inspect: {first:?}")
    })?;

    suite.test_async("panicking_async_body", || async {
        tokio::time::sleep(jitter()).await;
        let divisor: Option<u32> = None;
        match divisor {
            Some(d) => Outcome::check(100 / d == 5, "bad quotient"),
            None => panic!("divisor was never configured"),
        }
    })?;

    Ok(())
}
