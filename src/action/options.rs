//! Action configuration.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::error::ActionError;
use crate::tracker::ActivityTracker;

type LoadingHook<A> = Rc<dyn Fn(&A)>;
type SuccessHook<A, T> = Rc<dyn Fn(&T, &A)>;
type ErrorHook<A> = Rc<dyn Fn(&str, &A)>;

/// Configuration for an [`Action`](crate::Action).
///
/// The hooks set here are controller-level: they fire for every invocation,
/// before the invocation's own callbacks.
pub struct ActionOptions<A, T> {
    /// Label used in log events.
    pub name: String,
    /// Whether dispatches report to the tracker. Defaults to `true`.
    pub track: bool,
    /// Tracker to report to. Required while `track` is set.
    pub tracker: Option<ActivityTracker>,
    /// Quiet period before a dispatch. `None` dispatches immediately.
    pub debounce: Option<Duration>,
    pub(crate) on_loading: Option<LoadingHook<A>>,
    pub(crate) on_success: Option<SuccessHook<A, T>>,
    pub(crate) on_error: Option<ErrorHook<A>>,
}

impl<A, T> Default for ActionOptions<A, T> {
    fn default() -> Self {
        Self {
            name: String::from("action"),
            track: true,
            tracker: None,
            debounce: None,
            on_loading: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<A, T> Clone for ActionOptions<A, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            track: self.track,
            tracker: self.tracker,
            debounce: self.debounce,
            on_loading: self.on_loading.clone(),
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<A, T> fmt::Debug for ActionOptions<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionOptions")
            .field("name", &self.name)
            .field("track", &self.track)
            .field("tracker", &self.tracker.is_some())
            .field("debounce", &self.debounce)
            .field("on_loading", &self.on_loading.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<A, T> ActionOptions<A, T> {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log label (builder).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Report dispatches to `tracker` (builder).
    pub fn with_tracker(mut self, tracker: ActivityTracker) -> Self {
        self.tracker = Some(tracker);
        self.track = true;
        self
    }

    /// Opt out of tracking (builder). Any tracker already set is ignored.
    pub fn untracked(mut self) -> Self {
        self.track = false;
        self
    }

    /// Coalesce invocations arriving within `window` of each other (builder).
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = Some(window);
        self
    }

    /// Store-level loading hook (builder).
    pub fn on_loading(mut self, f: impl Fn(&A) + 'static) -> Self {
        self.on_loading = Some(Rc::new(f));
        self
    }

    /// Store-level success hook (builder).
    pub fn on_success(mut self, f: impl Fn(&T, &A) + 'static) -> Self {
        self.on_success = Some(Rc::new(f));
        self
    }

    /// Store-level error hook (builder). Receives the normalized message.
    pub fn on_error(mut self, f: impl Fn(&str, &A) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }

    /// Reject configurations that cannot work.
    ///
    /// # Errors
    ///
    /// [`ActionError::MissingTracker`] when tracking is on without a tracker,
    /// [`ActionError::InvalidDebounce`] for a zero debounce window.
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.track && self.tracker.is_none() {
            return Err(ActionError::MissingTracker {
                name: self.name.clone(),
            });
        }
        if self.debounce.is_some_and(|d| d.is_zero()) {
            return Err(ActionError::InvalidDebounce {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Tracker to report to, if tracking is enabled.
    pub(crate) fn active_tracker(&self) -> Option<ActivityTracker> {
        self.tracker.filter(|_| self.track)
    }
}
