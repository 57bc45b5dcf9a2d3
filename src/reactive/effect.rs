//! Effects, memos, batching and untracked scopes.
//!
//! An effect re-runs whenever a signal it read on its previous run changes:
//!
//! ```ignore
//! let (status, set_status) = create_signal(AsyncStatus::Idle);
//! create_effect(move || tracing::info!(status = ?status.get()));
//! set_status.set(AsyncStatus::Loading); // logs synchronously
//! ```
//!
//! A memo is a derived signal that only notifies downstream when its output
//! changes by `PartialEq`.

use super::runtime::{self, EffectId, RUNTIME};
use super::signal::{create_signal, ReadSignal};

/// Create an effect and run it once immediately.
pub fn create_effect(f: impl FnMut() + 'static) {
    create_effect_with_id(f);
}

/// Like [`create_effect`], returning the id needed by [`dispose_effect`].
pub fn create_effect_with_id(f: impl FnMut() + 'static) -> EffectId {
    let id = runtime::insert_effect(Box::new(f), None);
    runtime::run_effect(id);
    id
}

/// Stop an effect from re-running and free its slot. Idempotent.
pub fn dispose_effect(id: EffectId) {
    runtime::remove_effect(id);
}

/// Create a memoised derived value.
///
/// `f` is evaluated eagerly without subscribing any enclosing observer, then
/// again inside a private effect that keeps the memo current. A read that
/// lands after a source write but before that effect has been flushed (a
/// write inside a running effect or a batch) recomputes on the spot.
pub fn create_memo<T: Clone + PartialEq + 'static>(
    mut f: impl FnMut() -> T + 'static,
) -> ReadSignal<T> {
    let (read, write) = create_signal(untrack(&mut f));
    let update = move || {
        let next = f();
        if read.with_untracked(|current| current != &next) {
            write.set(next);
        }
    };
    let id = runtime::insert_effect(Box::new(update), Some(read.id()));
    runtime::run_effect(id);
    read
}

/// Run `f` with every signal write deferred until the outermost batch ends.
///
/// Each affected effect runs once at the end, however many writes hit it.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.borrow_mut().batch_depth += 1);
    let out = f();
    let flush = RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        rt.batch_depth -= 1;
        rt.batch_depth == 0 && !rt.flushing && !rt.queued.is_empty()
    });
    if flush {
        runtime::flush();
    }
    out
}

/// Run `f` without recording any reads against the current observer.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let previous = RUNTIME.with(|rt| rt.borrow_mut().observer.take());
    let out = f();
    RUNTIME.with(|rt| rt.borrow_mut().observer = previous);
    out
}
