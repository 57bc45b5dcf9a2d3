//! The action lifecycle controller.
//!
//! An [`Action`] wraps a producer (`Fn(A) -> Future<Output = Result<T, E>>`)
//! and publishes its request lifecycle through signals:
//!
//! ```text
//!   Idle ──run──▶ Loading ──Ok──▶ Success
//!                    │  ▲            │
//!                    │  └────run─────┤
//!                    └──Err──▶ Error ┘
//! ```
//!
//! Only the latest invocation is live. Each `run` bumps a generation
//! counter, aborts the task of the previous invocation (whether it is still
//! waiting out the debounce window or awaiting the producer) and releases
//! its tracker id. The aborted producer future is dropped, which frees
//! whatever it held.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use tokio::task::AbortHandle;
use uuid::Uuid;

use super::error::{ActionError, FetchError};
use super::invocation::Invocation;
use super::options::ActionOptions;
use super::status::AsyncStatus;
use crate::reactive::{batch, create_memo, create_signal, ReadSignal, WriteSignal};
use crate::tracker::ActivityTracker;

pub(crate) type BoxProducer<A, T> = Rc<dyn Fn(A) -> LocalBoxFuture<'static, Result<T, FetchError>>>;

// ---------------------------------------------------------------------------
// ActionState
// ---------------------------------------------------------------------------

/// Read-only signals describing an action. `Copy`, so effects can capture it.
pub struct ActionState<T: 'static> {
    pub status: ReadSignal<AsyncStatus>,
    /// Message of the last failure; cleared on the next dispatch.
    pub error: ReadSignal<Option<String>>,
    /// Last successful value; kept while a new request is loading.
    pub data: ReadSignal<Option<T>>,
    pub is_loading: ReadSignal<bool>,
    pub is_success: ReadSignal<bool>,
    pub is_error: ReadSignal<bool>,
}

impl<T: 'static> Copy for ActionState<T> {}
impl<T: 'static> Clone for ActionState<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for ActionState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionState")
            .field("status", &self.status.get_untracked())
            .field("error", &self.error.get_untracked())
            .finish_non_exhaustive()
    }
}

struct Writers<T: 'static> {
    status: WriteSignal<AsyncStatus>,
    error: WriteSignal<Option<String>>,
    data: WriteSignal<Option<T>>,
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// The single live invocation.
#[derive(Default)]
struct Slot {
    generation: u64,
    task: Option<AbortHandle>,
    /// Tracker id of the dispatched, unsettled invocation.
    tracked: Option<String>,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Asynchronous operation with an observable lifecycle.
///
/// Cloning is cheap and yields a handle to the same controller.
pub struct Action<A: 'static, T: 'static> {
    inner: Rc<Inner<A, T>>,
}

struct Inner<A: 'static, T: 'static> {
    producer: BoxProducer<A, T>,
    options: ActionOptions<A, T>,
    tracker: Option<ActivityTracker>,
    state: ActionState<T>,
    writers: Writers<T>,
    slot: RefCell<Slot>,
}

impl<A: 'static, T: 'static> Clone for Action<A, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: 'static, T: 'static> fmt::Debug for Action<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.inner.options.name)
            .field("status", &self.inner.state.status.get_untracked())
            .field("generation", &self.inner.slot.borrow().generation)
            .finish_non_exhaustive()
    }
}

impl<A: Clone + 'static, T: Clone + 'static> Action<A, T> {
    /// Wrap a single-result producer.
    ///
    /// # Errors
    ///
    /// Returns the [`ActionError`] from [`ActionOptions::validate`].
    pub fn new<F, Fut, E>(producer: F, options: ActionOptions<A, T>) -> Result<Self, ActionError>
    where
        F: Fn(A) -> Fut + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
        E: Into<FetchError>,
    {
        let producer: BoxProducer<A, T> = Rc::new(move |args| {
            let request = producer(args);
            async move {
                let outcome: Result<T, FetchError> = request.await.map_err(Into::into);
                outcome
            }
            .boxed_local()
        });
        Self::from_producer(producer, options)
    }

    pub(crate) fn from_producer(
        producer: BoxProducer<A, T>,
        options: ActionOptions<A, T>,
    ) -> Result<Self, ActionError> {
        options.validate()?;

        let (status, set_status) = create_signal(AsyncStatus::Idle);
        let (error, set_error) = create_signal(None);
        let (data, set_data) = create_signal(None);
        let state = ActionState {
            status,
            error,
            data,
            is_loading: create_memo(move || status.get().is_loading()),
            is_success: create_memo(move || status.get().is_success()),
            is_error: create_memo(move || status.get().is_error()),
        };

        Ok(Self {
            inner: Rc::new(Inner {
                producer,
                tracker: options.active_tracker(),
                options,
                state,
                writers: Writers {
                    status: set_status,
                    error: set_error,
                    data: set_data,
                },
                slot: RefCell::new(Slot::default()),
            }),
        })
    }

    /// Start an invocation, superseding any outstanding one.
    ///
    /// Without a debounce window the action enters `Loading` before this
    /// returns. With one, dispatch happens after the window passes with no
    /// further `run`; only the latest arguments reach the producer.
    ///
    /// Callbacks registered on the returned [`Invocation`] in the same turn
    /// are guaranteed to see the loading notification.
    ///
    /// A debounced `run` that lands while an earlier request is in flight
    /// aborts that request, but the action stays `Loading` and the tracker
    /// keeps counting it until the new dispatch takes over.
    ///
    /// # Panics
    ///
    /// Panics when called outside a [`tokio::task::LocalSet`].
    pub fn run(&self, args: A) -> Invocation<T> {
        let invocation = Invocation::new();
        let debounce = self.inner.options.debounce;
        let generation = self.inner.supersede(debounce.is_none());
        if debounce.is_none() {
            self.inner.dispatch(generation);
        }

        let inner = Rc::clone(&self.inner);
        let handle = invocation.clone();
        let task = tokio::task::spawn_local(async move {
            if let Some(window) = debounce {
                tokio::time::sleep(window).await;
                inner.dispatch(generation);
            }
            if !inner.is_current(generation) {
                return;
            }
            if let Some(hook) = &inner.options.on_loading {
                hook(&args);
            }
            handle.fire_loading();

            let outcome = (inner.producer)(args.clone()).await;
            inner.settle(generation, outcome, &args, &handle);
        });

        let mut slot = self.inner.slot.borrow_mut();
        if slot.generation == generation {
            slot.task = Some(task.abort_handle());
        } else {
            // A signal effect re-entered `run` while we were dispatching.
            task.abort();
        }
        invocation
    }

    /// Cancel any outstanding invocation and return to `Idle`, clearing
    /// `error` and `data`.
    pub fn reset(&self) {
        self.inner.supersede(true);
        let w = &self.inner.writers;
        batch(|| {
            w.status.set(AsyncStatus::Idle);
            w.error.set(None);
            w.data.set(None);
        });
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// All signals of this action.
    pub fn state(&self) -> ActionState<T> {
        self.inner.state
    }

    pub fn name(&self) -> &str {
        &self.inner.options.name
    }

    pub fn status(&self) -> AsyncStatus {
        self.inner.state.status.get()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.error.get()
    }

    pub fn data(&self) -> Option<T> {
        self.inner.state.data.get()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.is_loading.get()
    }

    pub fn is_success(&self) -> bool {
        self.inner.state.is_success.get()
    }

    pub fn is_error(&self) -> bool {
        self.inner.state.is_error.get()
    }
}

impl<A: Clone + 'static, T: Clone + 'static> Inner<A, T> {
    /// Invalidate the live invocation and claim a new generation.
    ///
    /// Without `release` the superseded tracker id stays in the slot until
    /// the next dispatch swaps it out, so a debounce window opened over an
    /// in-flight request keeps the tracker in step with `Loading`.
    fn supersede(&self, release: bool) -> u64 {
        let (generation, task, tracked) = {
            let mut slot = self.slot.borrow_mut();
            slot.generation += 1;
            let tracked = if release { slot.tracked.take() } else { None };
            (slot.generation, slot.task.take(), tracked)
        };
        if let Some(task) = task {
            tracing::debug!(action = %self.options.name, generation, "superseding outstanding invocation");
            task.abort();
        }
        if let (Some(tracker), Some(id)) = (self.tracker, tracked) {
            tracker.cancel(&id);
        }
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.slot.borrow().generation == generation
    }

    /// Enter `Loading` and register with the tracker.
    fn dispatch(&self, generation: u64) {
        let tracked = self.tracker.map(|_| Uuid::new_v4().to_string());
        let superseded = {
            let mut slot = self.slot.borrow_mut();
            if slot.generation != generation {
                return;
            }
            std::mem::replace(&mut slot.tracked, tracked.clone())
        };
        tracing::debug!(action = %self.options.name, generation, id = tracked.as_deref(), "dispatching");

        batch(|| {
            self.writers.status.set(AsyncStatus::Loading);
            self.writers.error.set(None);
            if let Some(tracker) = self.tracker {
                if let Some(old) = superseded.as_deref() {
                    tracker.cancel(old);
                }
                if let Some(id) = tracked.as_deref() {
                    tracker.begin(id);
                }
            }
        });
    }

    /// Publish the producer's outcome and fire callbacks, unless superseded.
    fn settle(
        &self,
        generation: u64,
        outcome: Result<T, FetchError>,
        args: &A,
        invocation: &Invocation<T>,
    ) {
        let tracked = {
            let mut slot = self.slot.borrow_mut();
            if slot.generation != generation {
                tracing::debug!(action = %self.options.name, generation, "dropping stale outcome");
                return;
            }
            slot.task = None;
            slot.tracked.take()
        };

        match outcome {
            Ok(data) => {
                tracing::debug!(action = %self.options.name, generation, "succeeded");
                batch(|| {
                    self.writers.data.set(Some(data.clone()));
                    self.writers.status.set(AsyncStatus::Success);
                    if let (Some(tracker), Some(id)) = (self.tracker, tracked.as_deref()) {
                        tracker.success(id);
                    }
                });
                if let Some(hook) = &self.options.on_success {
                    hook(&data, args);
                }
                invocation.fire_success(&data);
            }
            Err(err) => {
                let message = err.message();
                tracing::warn!(
                    action = %self.options.name,
                    generation,
                    status = err.status,
                    error = %message,
                    "failed"
                );
                batch(|| {
                    self.writers.error.set(Some(message.clone()));
                    self.writers.status.set(AsyncStatus::Error);
                    if let (Some(tracker), Some(id)) = (self.tracker, tracked.as_deref()) {
                        tracker.error(id, &message);
                    }
                });
                if let Some(hook) = &self.options.on_error {
                    hook(&message, args);
                }
                invocation.fire_error(&message);
            }
        }
        invocation.fire_finally();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
