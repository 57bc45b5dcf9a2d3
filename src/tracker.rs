//! Global activity tracker: in-flight request ids and the last failure.
//!
//! [`ActivityTracker`] is an explicitly constructed service. Build one at the
//! composition root and hand it to every action that should report into it
//! via [`ActionOptions::with_tracker`](crate::ActionOptions::with_tracker).
//!
//! ```ignore
//! let tracker = ActivityTracker::new();
//! create_effect(move || spinner.set_visible(tracker.is_any_loading()));
//! ```

use std::collections::HashSet;

use crate::reactive::{create_memo, create_signal, untrack, ReadSignal, WriteSignal};

/// Counts tracked operations that are still outstanding and remembers the
/// most recent failure message.
///
/// The tracker is a bundle of signal handles, so it is `Copy` and cheap to
/// pass around. Reads subscribe the running effect like any other signal.
#[derive(Debug, Clone, Copy)]
pub struct ActivityTracker {
    pending: ReadSignal<HashSet<String>>,
    set_pending: WriteSignal<HashSet<String>>,
    last_error: ReadSignal<Option<String>>,
    set_last_error: WriteSignal<Option<String>>,
    pending_count: ReadSignal<usize>,
    is_any_loading: ReadSignal<bool>,
}

impl ActivityTracker {
    /// Create a tracker with no pending operations and no error.
    pub fn new() -> Self {
        let (pending, set_pending) = create_signal(HashSet::new());
        let (last_error, set_last_error) = create_signal(None);
        let pending_count = create_memo(move || pending.with(HashSet::len));
        let is_any_loading = create_memo(move || pending_count.get() > 0);
        Self {
            pending,
            set_pending,
            last_error,
            set_last_error,
            pending_count,
            is_any_loading,
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Mark `id` as in flight. Beginning an id twice counts it once.
    pub fn begin(&self, id: &str) {
        if self.is_pending(id) {
            return;
        }
        tracing::trace!(id, "tracked operation started");
        self.set_pending.update(|set| {
            set.insert(id.to_owned());
        });
    }

    /// Mark `id` as finished successfully. Unknown ids are ignored.
    pub fn success(&self, id: &str) {
        self.remove(id);
    }

    /// Mark `id` as failed and record `message` as the last error.
    ///
    /// The message is recorded even when `id` is not pending.
    pub fn error(&self, id: &str, message: &str) {
        tracing::trace!(id, error = message, "tracked operation failed");
        self.set_last_error.set(Some(message.to_owned()));
        self.remove(id);
    }

    /// Forget `id` without recording anything, for superseded operations.
    pub fn cancel(&self, id: &str) {
        self.remove(id);
    }

    /// Clear the last error. Pending operations are untouched.
    pub fn clear_error(&self) {
        if untrack(|| self.last_error.with(Option::is_some)) {
            self.set_last_error.set(None);
        }
    }

    /// Membership check that never subscribes the caller's effect.
    fn is_pending(&self, id: &str) -> bool {
        untrack(|| self.pending.with(|set| set.contains(id)))
    }

    fn remove(&self, id: &str) {
        if !self.is_pending(id) {
            return;
        }
        tracing::trace!(id, "tracked operation finished");
        self.set_pending.update(|set| {
            set.remove(id);
        });
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Number of tracked operations in flight.
    pub fn pending_count(&self) -> usize {
        self.pending_count.get()
    }

    /// Whether any tracked operation is in flight.
    pub fn is_any_loading(&self) -> bool {
        self.is_any_loading.get()
    }

    /// Message of the most recent tracked failure, if not cleared.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.get()
    }

    /// Derived signal behind [`pending_count`](Self::pending_count).
    pub fn pending_count_signal(&self) -> ReadSignal<usize> {
        self.pending_count
    }

    /// Derived signal behind [`is_any_loading`](Self::is_any_loading).
    pub fn is_any_loading_signal(&self) -> ReadSignal<bool> {
        self.is_any_loading
    }

    /// Signal behind [`last_error`](Self::last_error).
    pub fn last_error_signal(&self) -> ReadSignal<Option<String>> {
        self.last_error
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::create_effect;
    use crate::reactive::runtime::reset_runtime;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> ActivityTracker {
        reset_runtime();
        ActivityTracker::new()
    }

    #[test]
    fn starts_empty() {
        let tracker = setup();
        assert_eq!(tracker.pending_count(), 0);
        assert!(!tracker.is_any_loading());
        assert_eq!(tracker.last_error(), None);
    }

    #[test]
    fn duplicate_begin_counts_once() {
        let tracker = setup();
        tracker.begin("x");
        tracker.begin("x");
        assert_eq!(tracker.pending_count(), 1);
        tracker.success("x");
        assert_eq!(tracker.pending_count(), 0);
        assert!(!tracker.is_any_loading());
    }

    #[test]
    fn error_removes_and_records() {
        let tracker = setup();
        tracker.begin("a");
        tracker.begin("b");
        tracker.error("a", "boom");
        assert_eq!(tracker.pending_count(), 1);
        assert!(tracker.is_any_loading());
        assert_eq!(tracker.last_error().as_deref(), Some("boom"));
    }

    #[test]
    fn later_error_overwrites() {
        let tracker = setup();
        tracker.error("a", "first");
        tracker.error("b", "second");
        assert_eq!(tracker.last_error().as_deref(), Some("second"));
    }

    #[test]
    fn unknown_ids_are_noops() {
        let tracker = setup();
        tracker.begin("a");
        tracker.success("missing");
        tracker.cancel("missing");
        assert_eq!(tracker.pending_count(), 1);
    }

    #[test]
    fn cancel_keeps_last_error() {
        let tracker = setup();
        tracker.error("old", "kept");
        tracker.begin("a");
        tracker.cancel("a");
        assert_eq!(tracker.pending_count(), 0);
        assert_eq!(tracker.last_error().as_deref(), Some("kept"));
    }

    #[test]
    fn clear_error_ignores_pending() {
        let tracker = setup();
        tracker.begin("a");
        tracker.begin("b");
        tracker.error("a", "boom");
        tracker.clear_error();
        assert_eq!(tracker.last_error(), None);
        assert_eq!(tracker.pending_count(), 1);
    }

    #[test]
    fn loading_view_notifies_only_on_edges() {
        let tracker = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        create_effect(move || seen_c.borrow_mut().push(tracker.is_any_loading()));

        tracker.begin("a");
        tracker.begin("b");
        tracker.success("a");
        tracker.error("b", "late");
        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn reads_are_consistent_after_each_write() {
        let tracker = setup();
        let counts = Rc::new(RefCell::new(Vec::new()));
        let counts_c = counts.clone();
        let count = tracker.pending_count_signal();
        create_effect(move || counts_c.borrow_mut().push(count.get()));

        tracker.begin("a");
        assert_eq!(tracker.pending_count(), 1);
        tracker.begin("b");
        assert_eq!(tracker.pending_count(), 2);
        tracker.cancel("a");
        assert_eq!(*counts.borrow(), vec![0, 1, 2, 1]);
    }

    #[test]
    fn derived_reads_are_current_inside_a_rerunning_effect() {
        let tracker = setup();
        let (trigger, set_trigger) = create_signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        create_effect(move || {
            if trigger.get() > 0 {
                tracker.begin("a");
            }
            seen_c
                .borrow_mut()
                .push((tracker.pending_count(), tracker.is_any_loading()));
        });

        set_trigger.set(1);
        assert_eq!(*seen.borrow(), vec![(0, false), (1, true)]);
    }
}
