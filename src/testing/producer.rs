//! ControlledProducer: a producer whose calls are settled by hand.
//!
//! Every call is recorded with its arguments and the (tokio) time it was
//! made. The test then resolves or rejects calls by index, and can check
//! whether a call's future was dropped, which is how a superseded
//! invocation shows up from the producer's side.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::action::FetchError;

struct Call<A, T> {
    args: A,
    at: Instant,
    reply: Option<oneshot::Sender<Result<T, FetchError>>>,
}

/// Hand-driven producer for exercising actions.
///
/// # Examples
///
/// ```ignore
/// let users = ControlledProducer::<u32, String>::new();
/// let action = Action::new(users.producer(), ActionOptions::new().untracked())?;
/// action.run(7);
/// drain().await;
/// users.resolve(0, "alice".into());
/// ```
pub struct ControlledProducer<A, T> {
    calls: Rc<RefCell<Vec<Call<A, T>>>>,
}

impl<A, T> Clone for ControlledProducer<A, T> {
    fn clone(&self) -> Self {
        Self {
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<A, T> Default for ControlledProducer<A, T> {
    fn default() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<A: fmt::Debug, T> fmt::Debug for ControlledProducer<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.calls.borrow().iter().map(|call| &call.args))
            .finish()
    }
}

impl<A: Clone + 'static, T: 'static> ControlledProducer<A, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The producer function to hand to an action.
    ///
    /// A call whose sender is dropped without a reply fails with
    /// `"producer dropped"`.
    pub fn producer(&self) -> impl Fn(A) -> LocalBoxFuture<'static, Result<T, FetchError>> {
        let calls = Rc::clone(&self.calls);
        move |args| {
            let (tx, rx) = oneshot::channel();
            calls.borrow_mut().push(Call {
                args,
                at: Instant::now(),
                reply: Some(tx),
            });
            async move {
                rx.await
                    .unwrap_or_else(|_| Err(FetchError::new("producer dropped")))
            }
            .boxed_local()
        }
    }

    // ── Settling ─────────────────────────────────────────────────────

    /// Complete call `index` with `value`.
    ///
    /// Returns `false` if the call does not exist, was already settled, or
    /// its future has been dropped.
    pub fn resolve(&self, index: usize, value: T) -> bool {
        self.reply(index, Ok(value))
    }

    /// Fail call `index` with `error`. Same return contract as
    /// [`resolve`](Self::resolve).
    pub fn reject(&self, index: usize, error: impl Into<FetchError>) -> bool {
        self.reply(index, Err(error.into()))
    }

    fn reply(&self, index: usize, outcome: Result<T, FetchError>) -> bool {
        let sender = self
            .calls
            .borrow_mut()
            .get_mut(index)
            .and_then(|call| call.reply.take());
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Arguments of call `index`.
    pub fn args(&self, index: usize) -> Option<A> {
        self.calls.borrow().get(index).map(|call| call.args.clone())
    }

    /// Arguments of every call, in call order.
    pub fn all_args(&self) -> Vec<A> {
        self.calls.borrow().iter().map(|call| call.args.clone()).collect()
    }

    /// When call `index` was made.
    pub fn called_at(&self, index: usize) -> Option<Instant> {
        self.calls.borrow().get(index).map(|call| call.at)
    }

    /// Whether call `index` is unsettled and its future has been dropped.
    pub fn is_cancelled(&self, index: usize) -> bool {
        self.calls
            .borrow()
            .get(index)
            .and_then(|call| call.reply.as_ref())
            .is_some_and(oneshot::Sender::is_closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{drain, run_local};

    #[tokio::test]
    async fn records_and_resolves() {
        run_local(async {
            let producer = ControlledProducer::<&str, u32>::new();
            let call = producer.producer();
            let pending = tokio::task::spawn_local(call("a"));
            drain().await;
            assert_eq!(producer.calls(), 1);
            assert_eq!(producer.args(0), Some("a"));
            assert!(producer.resolve(0, 5));
            assert!(!producer.resolve(0, 6));
            assert_eq!(pending.await.unwrap(), Ok(5));
        })
        .await;
    }

    #[tokio::test]
    async fn reject_converts_error() {
        let producer = ControlledProducer::<(), u32>::new();
        let future = producer.producer()(());
        producer.reject(0, "nope");
        assert_eq!(future.await, Err(FetchError::new("nope")));
    }

    #[tokio::test]
    async fn dropped_future_reports_cancelled() {
        let producer = ControlledProducer::<u32, u32>::new();
        let future = producer.producer()(1);
        assert!(!producer.is_cancelled(0));
        drop(future);
        assert!(producer.is_cancelled(0));
        assert!(!producer.resolve(0, 1));
    }

    #[test]
    fn unknown_index_is_rejected() {
        let producer = ControlledProducer::<u32, u32>::new();
        assert!(!producer.resolve(3, 1));
        assert!(!producer.is_cancelled(3));
        assert_eq!(producer.args(3), None);
        assert_eq!(format!("{producer:?}"), "[]");
    }
}
