//! Per-invocation callback chain returned by [`Action::run`](crate::Action::run).
//!
//! ```ignore
//! save.run(form)
//!     .on_success(|user| toast(format!("saved {}", user.name)))
//!     .on_error(|message| toast(message))
//!     .finally(|| close_dialog());
//! ```
//!
//! Nothing fires synchronously inside `run`, so every registration made in
//! the same statement is in place before the loading notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Notify = Box<dyn FnOnce()>;
type OnData<T> = Box<dyn FnOnce(&T)>;
type OnMessage = Box<dyn FnOnce(&str)>;

/// Flat record of optional callback slots.
struct Handlers<T> {
    on_loading: Option<Notify>,
    on_success: Option<OnData<T>>,
    on_error: Option<OnMessage>,
    finally: Option<Notify>,
    continuation: Option<OnData<T>>,
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self {
            on_loading: None,
            on_success: None,
            on_error: None,
            finally: None,
            continuation: None,
        }
    }
}

/// Callbacks attached to a single invocation.
///
/// Each callback fires at most once. Registering a slot twice keeps the
/// latest callback, except [`continue_with`](Self::continue_with), which
/// appends. If the invocation is superseded before it settles, none of the
/// remaining callbacks fire.
pub struct Invocation<T> {
    handlers: Rc<RefCell<Handlers<T>>>,
}

impl<T> Clone for Invocation<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: Rc::clone(&self.handlers),
        }
    }
}

impl<T> fmt::Debug for Invocation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.handlers.borrow();
        f.debug_struct("Invocation")
            .field("on_loading", &h.on_loading.is_some())
            .field("on_success", &h.on_success.is_some())
            .field("on_error", &h.on_error.is_some())
            .field("finally", &h.finally.is_some())
            .field("continuation", &h.continuation.is_some())
            .finish()
    }
}

impl<T: 'static> Invocation<T> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Rc::new(RefCell::new(Handlers::default())),
        }
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Called once the invocation is dispatched, before the producer settles.
    pub fn on_loading(&self, f: impl FnOnce() + 'static) -> &Self {
        self.handlers.borrow_mut().on_loading = Some(Box::new(f));
        self
    }

    /// Called with the produced value.
    pub fn on_success(&self, f: impl FnOnce(&T) + 'static) -> &Self {
        self.handlers.borrow_mut().on_success = Some(Box::new(f));
        self
    }

    /// Called with the normalized error message.
    pub fn on_error(&self, f: impl FnOnce(&str) + 'static) -> &Self {
        self.handlers.borrow_mut().on_error = Some(Box::new(f));
        self
    }

    /// Called after success or error.
    pub fn finally(&self, f: impl FnOnce() + 'static) -> &Self {
        self.handlers.borrow_mut().finally = Some(Box::new(f));
        self
    }

    /// Start a follow-up invocation from the produced value.
    ///
    /// Runs after [`on_success`](Self::on_success), which stays registered.
    /// Several continuations run in registration order.
    pub fn continue_with<U: 'static>(
        &self,
        next: impl FnOnce(&T) -> Invocation<U> + 'static,
    ) -> &Self {
        let mut handlers = self.handlers.borrow_mut();
        let earlier = handlers.continuation.take();
        handlers.continuation = Some(Box::new(move |data: &T| {
            if let Some(earlier) = earlier {
                earlier(data);
            }
            // The follow-up's task holds its own handle.
            drop(next(data));
        }));
        drop(handlers);
        self
    }

    // ── Firing ───────────────────────────────────────────────────────
    //
    // Each slot is taken out before the call so user code never runs with
    // the record borrowed.

    pub(crate) fn fire_loading(&self) {
        let f = self.handlers.borrow_mut().on_loading.take();
        if let Some(f) = f {
            f();
        }
    }

    pub(crate) fn fire_success(&self, data: &T) {
        let (on_success, continuation) = {
            let mut h = self.handlers.borrow_mut();
            h.on_error = None;
            (h.on_success.take(), h.continuation.take())
        };
        if let Some(f) = on_success {
            f(data);
        }
        if let Some(f) = continuation {
            f(data);
        }
    }

    pub(crate) fn fire_error(&self, message: &str) {
        let f = {
            let mut h = self.handlers.borrow_mut();
            h.on_success = None;
            h.continuation = None;
            h.on_error.take()
        };
        if let Some(f) = f {
            f(message);
        }
    }

    pub(crate) fn fire_finally(&self) {
        let f = self.handlers.borrow_mut().finally.take();
        if let Some(f) = f {
            f();
        }
    }
}
