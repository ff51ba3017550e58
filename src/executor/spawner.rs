//! Execution capability
//!
//! The engine never owns threads. Whatever drives pending test bodies is
//! injected through [`Executor`].

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::error::EngineError;

/// Something that can drive a detached task to completion
pub trait Executor: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        (**self).spawn(task)
    }
}

/// Executor backed by a tokio runtime handle
#[derive(Clone, Debug)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the caller is running on
    pub fn current() -> Result<Self, EngineError> {
        Ok(Self::new(Handle::try_current()?))
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Executor for TokioExecutor {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        let _ = self.handle.spawn(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use tokio::sync::oneshot;

    #[test]
    fn test_current_outside_runtime() {
        assert!(matches!(
            TokioExecutor::current(),
            Err(EngineError::NoRuntime(_))
        ));
    }

    #[tokio::test]
    async fn test_spawn_runs_task() {
        let executor: Arc<dyn Executor> = Arc::new(TokioExecutor::current().unwrap());
        let (tx, rx) = oneshot::channel();

        executor.spawn(
            async move {
                let _ = tx.send(7);
            }
            .boxed(),
        );

        assert_eq!(rx.await.unwrap(), 7);
    }
}
