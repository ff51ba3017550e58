//! Deferred values
//!
//! A [`Deferred`] is a value that is either known now or will be pushed in
//! later. Consumers attach a continuation with [`Deferred::on_resolve`] and
//! never block a thread waiting for it. A synchronous value is simply a
//! deferred that resolved instantly, so downstream code has one path.

use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::mem;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use crate::executor::Executor;
use crate::models::{Failure, Outcome};

/// Deferred test outcome
pub type DeferredResult = Deferred<Outcome>;

/// A value of type `T` that is available now or later
#[must_use = "a deferred value does nothing unless awaited or given a continuation"]
pub struct Deferred<T> {
    state: State<T>,
}

enum State<T> {
    Resolved(T),
    Pending(BoxFuture<'static, T>),
    Taken,
}

// `T` is only ever moved out, never pinned in place.
impl<T> Unpin for Deferred<T> {}

impl<T: Send + 'static> Deferred<T> {
    /// Already-known value; resolves with zero latency
    pub fn resolved(value: T) -> Self {
        Self {
            state: State::Resolved(value),
        }
    }

    /// Value produced by a future completing later
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            state: State::Pending(fut.boxed()),
        }
    }

    /// Deferred fed by an explicit completion source.
    ///
    /// If the [`Completer`] is dropped without completing, the deferred
    /// never resolves.
    pub fn channel() -> (Completer<T>, Self) {
        let (sender, receiver) = oneshot::channel();
        let deferred = Self::from_future(async move {
            match receiver.await {
                Ok(value) => value,
                Err(_) => future::pending::<T>().await,
            }
        });
        (Completer { sender }, deferred)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, State::Resolved(_))
    }

    /// Take the value if it is already known
    pub fn try_take(self) -> Result<T, Self> {
        match self.state {
            State::Resolved(value) => Ok(value),
            state => Err(Self { state }),
        }
    }

    /// Transform the eventual value without waiting for it
    pub fn map<U, F>(self, f: F) -> Deferred<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self.state {
            State::Resolved(value) => Deferred::resolved(f(value)),
            State::Pending(fut) => Deferred::from_future(fut.map(f)),
            State::Taken => used_after_completion(),
        }
    }

    /// Invoke `callback` exactly once with the resolved value.
    ///
    /// A resolved value is delivered inline on the calling thread. A pending
    /// one is driven by a task spawned on `executor` and the callback runs
    /// wherever that task completes.
    pub fn on_resolve<F>(self, executor: &dyn Executor, callback: F)
    where
        F: FnOnce(T) + Send + 'static,
    {
        match self.state {
            State::Resolved(value) => callback(value),
            State::Pending(fut) => executor.spawn(
                async move {
                    callback(fut.await);
                }
                .boxed(),
            ),
            State::Taken => used_after_completion(),
        }
    }

    /// Aggregate several deferred values, keeping input order.
    ///
    /// The aggregate is resolved immediately when every input already is.
    pub fn join_all(items: Vec<Deferred<T>>) -> Deferred<Vec<T>> {
        if items.iter().all(Deferred::is_resolved) {
            let values = items
                .into_iter()
                .filter_map(|item| item.try_take().ok())
                .collect();
            return Deferred::resolved(values);
        }
        Deferred::from_future(future::join_all(items))
    }
}

impl Deferred<Outcome> {
    /// Like [`Deferred::channel`], but a dropped completer resolves the
    /// outcome as canceled instead of leaving it pending forever.
    pub fn completion() -> (Completer<Outcome>, Self) {
        let (sender, receiver) = oneshot::channel();
        let deferred = Self::from_future(async move {
            receiver
                .await
                .unwrap_or_else(|_| Outcome::canceled("completion source dropped"))
        });
        (Completer { sender }, deferred)
    }

    /// Convert panics raised while the pending body is polled into
    /// `Outcome::Failed`.
    pub fn catch_faults(self) -> Self {
        match self.state {
            State::Pending(fut) => Self::from_future(AssertUnwindSafe(fut).catch_unwind().map(
                |result| result.unwrap_or_else(|payload| Outcome::Failed(Failure::from_panic(payload))),
            )),
            state => Self { state },
        }
    }
}

impl<T> Future for Deferred<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        match mem::replace(&mut this.state, State::Taken) {
            State::Resolved(value) => Poll::Ready(value),
            State::Pending(mut fut) => match fut.as_mut().poll(cx) {
                Poll::Ready(value) => Poll::Ready(value),
                Poll::Pending => {
                    this.state = State::Pending(fut);
                    Poll::Pending
                }
            },
            State::Taken => used_after_completion(),
        }
    }
}

#[cold]
fn used_after_completion() -> ! {
    panic!("`Deferred` used after completion")
}

impl<T: Send + 'static> From<T> for Deferred<T> {
    fn from(value: T) -> Self {
        Self::resolved(value)
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Resolved(_) => "resolved",
            State::Pending(_) => "pending",
            State::Taken => "taken",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

/// Completion side of [`Deferred::channel`]
pub struct Completer<T> {
    sender: oneshot::Sender<T>,
}

impl<T> Completer<T> {
    /// Resolve the paired deferred. Returns `false` if it was dropped.
    pub fn complete(self, value: T) -> bool {
        self.sender.send(value).is_ok()
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// Result types a test body may end in.
///
/// Bodies whose return type does not implement this trait are rejected
/// when the test is registered, at compile time.
pub trait IntoDeferred {
    fn into_deferred(self) -> DeferredResult;
}

impl IntoDeferred for Outcome {
    fn into_deferred(self) -> DeferredResult {
        Deferred::resolved(self)
    }
}

impl IntoDeferred for DeferredResult {
    fn into_deferred(self) -> DeferredResult {
        self
    }
}

impl<E: fmt::Display> IntoDeferred for Result<(), E> {
    fn into_deferred(self) -> DeferredResult {
        let outcome = match self {
            Ok(()) => Outcome::Succeeded,
            Err(err) => Outcome::failed(err.to_string()),
        };
        Deferred::resolved(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::TokioExecutor;
    use tokio_test::{assert_pending, assert_ready, assert_ready_eq, task};

    #[test]
    fn test_resolved_is_ready_on_first_poll() {
        let mut deferred = task::spawn(Deferred::resolved(Outcome::Succeeded));
        assert_ready_eq!(deferred.poll(), Outcome::Succeeded);
    }

    #[test]
    fn test_map_keeps_resolved_state() {
        let mapped = Deferred::resolved(2).map(|n| n * 21);
        assert!(mapped.is_resolved());
        assert_eq!(mapped.try_take().ok(), Some(42));
    }

    #[test]
    fn test_channel_resolves_after_completion() {
        let (completer, deferred) = Deferred::channel();
        let mut deferred = task::spawn(deferred.map(|n: u32| n + 1));
        assert_pending!(deferred.poll());

        assert!(completer.complete(9));
        assert!(deferred.is_woken());
        assert_ready_eq!(deferred.poll(), 10);
    }

    #[test]
    fn test_dropped_channel_stays_pending() {
        let (completer, deferred) = Deferred::<u32>::channel();
        drop(completer);
        let mut deferred = task::spawn(deferred);
        assert_pending!(deferred.poll());
    }

    #[test]
    fn test_dropped_completion_is_canceled() {
        let (completer, deferred) = DeferredResult::completion();
        drop(completer);
        let mut deferred = task::spawn(deferred);
        let outcome = assert_ready!(deferred.poll());
        assert_eq!(outcome, Outcome::canceled("completion source dropped"));
    }

    #[test]
    fn test_on_resolve_runs_inline_for_resolved() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let executor = TokioExecutor::new(runtime.handle().clone());
        let (tx, mut rx) = oneshot::channel();

        Deferred::resolved(Outcome::Succeeded).on_resolve(&executor, move |outcome| {
            let _ = tx.send(outcome);
        });

        // Delivered before any executor work was driven.
        assert_eq!(rx.try_recv().ok(), Some(Outcome::Succeeded));
    }

    #[tokio::test]
    async fn test_on_resolve_pushes_pending_value() {
        let executor = TokioExecutor::current().unwrap();
        let (completer, deferred) = Deferred::channel();
        let (tx, rx) = oneshot::channel();

        deferred.on_resolve(&executor, move |value: &'static str| {
            let _ = tx.send(value);
        });
        completer.complete("done");

        assert_eq!(rx.await.unwrap(), "done");
    }

    #[tokio::test]
    #[should_panic(expected = "used after completion")]
    async fn test_continuation_on_consumed_deferred_panics() {
        let executor = TokioExecutor::current().unwrap();
        let mut deferred = Deferred::resolved(Outcome::Succeeded);
        assert_eq!((&mut deferred).await, Outcome::Succeeded);

        deferred.on_resolve(&executor, |_| {});
    }

    #[test]
    #[should_panic(expected = "used after completion")]
    fn test_map_on_consumed_deferred_panics() {
        let mut deferred = Deferred::resolved(1u32);
        assert_eq!((&mut deferred).now_or_never(), Some(1));

        let _ = deferred.map(|n| n + 1);
    }

    #[test]
    fn test_join_all_of_resolved_is_resolved() {
        let joined = Deferred::join_all(vec![Deferred::resolved(1), Deferred::resolved(2)]);
        assert_eq!(joined.try_take().ok(), Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_join_all_keeps_input_order() {
        let (first, first_deferred) = Deferred::channel();
        let (second, second_deferred) = Deferred::channel();
        let joined = Deferred::join_all(vec![
            first_deferred,
            Deferred::resolved("middle"),
            second_deferred,
        ]);
        assert!(!joined.is_resolved());

        second.complete("last");
        first.complete("first");

        assert_eq!(joined.await, vec!["first", "middle", "last"]);
    }

    #[tokio::test]
    async fn test_catch_faults_converts_panics() {
        let deferred = DeferredResult::from_future(async {
            panic!("async body exploded");
        })
        .catch_faults();

        let outcome = deferred.await;
        assert_eq!(outcome, Outcome::Failed(Failure::panic("async body exploded")));
    }

    #[test]
    fn test_into_deferred_for_results() {
        let ok: Result<(), String> = Ok(());
        assert_eq!(ok.into_deferred().try_take().ok(), Some(Outcome::Succeeded));

        let err: Result<(), String> = Err("values differ".to_string());
        assert_eq!(
            err.into_deferred().try_take().ok(),
            Some(Outcome::failed("values differ"))
        );
    }
}
