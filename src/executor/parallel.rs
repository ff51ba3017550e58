//! Concurrency limit for in-flight test bodies
//!
//! Dispatch order is never changed. A limit only bounds how many pending
//! bodies are polled at the same time.

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::deferred::{Deferred, DeferredResult};

/// Optional cap on concurrently polled test bodies
#[derive(Clone, Debug, Default)]
pub struct ConcurrencyLimit {
    semaphore: Option<Arc<Semaphore>>,
    max_concurrent: Option<usize>,
}

impl ConcurrencyLimit {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Allow at most `max_concurrent` pending bodies in flight (minimum 1)
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Some(Arc::new(Semaphore::new(max_concurrent))),
            max_concurrent: Some(max_concurrent),
        }
    }

    pub fn from_option(max_concurrent: Option<usize>) -> Self {
        max_concurrent.map(Self::new).unwrap_or_default()
    }

    pub fn max_concurrent(&self) -> Option<usize> {
        self.max_concurrent
    }

    /// Permits currently free, `None` when unbounded
    pub fn available(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|s| s.available_permits())
    }

    /// Make a pending result wait for a permit before it is polled.
    ///
    /// Resolved results pass through untouched.
    pub fn guard(&self, deferred: DeferredResult) -> DeferredResult {
        let Some(semaphore) = self.semaphore.clone() else {
            return deferred;
        };
        if deferred.is_resolved() {
            return deferred;
        }

        Deferred::from_future(async move {
            // The semaphore is never closed, so acquisition only waits.
            let _permit = semaphore.acquire_owned().await.ok();
            deferred.await
        })
    }
}
