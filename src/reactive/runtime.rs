//! Thread-local reactive runtime.
//!
//! Signals and effects live in two slotmap arenas owned by a per-thread
//! [`Runtime`]. Handles ([`ReadSignal`](super::ReadSignal),
//! [`WriteSignal`](super::WriteSignal), [`EffectId`]) are plain keys, so they
//! are `Copy` and can be captured freely by closures and async tasks running
//! on the same thread.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key of a signal slot.
    pub struct SignalId;

    /// Key of an effect slot. Returned by
    /// [`create_effect_with_id`](super::create_effect_with_id).
    pub struct EffectId;
}

pub(crate) struct SignalSlot {
    pub(crate) value: Box<dyn Any>,
    pub(crate) subscribers: HashSet<EffectId>,
    /// Effect that computes this signal, when it backs a memo.
    pub(crate) computed_by: Option<EffectId>,
    /// A source of the memo changed and its effect has not re-run yet.
    pub(crate) dirty: bool,
}

impl SignalSlot {
    pub(crate) fn new(value: Box<dyn Any>) -> Self {
        Self {
            value,
            subscribers: HashSet::new(),
            computed_by: None,
            dirty: false,
        }
    }
}

pub(crate) struct EffectSlot {
    /// Taken out while the effect runs so user code never executes with the
    /// runtime borrowed.
    pub(crate) callback: Option<Box<dyn FnMut()>>,
    pub(crate) sources: HashSet<SignalId>,
    /// Signal this effect writes, when it is a memo's effect.
    pub(crate) memo: Option<SignalId>,
}

pub(crate) struct Runtime {
    pub(crate) signals: SlotMap<SignalId, SignalSlot>,
    pub(crate) effects: SlotMap<EffectId, EffectSlot>,
    /// Effect whose reads are currently being recorded.
    pub(crate) observer: Option<EffectId>,
    pub(crate) batch_depth: usize,
    /// Effects waiting to run, in notification order (may hold duplicates).
    pub(crate) queued: Vec<EffectId>,
    pub(crate) flushing: bool,
}

impl Runtime {
    fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            effects: SlotMap::with_key(),
            observer: None,
            batch_depth: 0,
            queued: Vec::new(),
            flushing: false,
        }
    }

    /// Record that the current observer (if any) depends on `signal`.
    pub(crate) fn track(&mut self, signal: SignalId) {
        let Some(observer) = self.observer else {
            return;
        };
        if let Some(effect) = self.effects.get_mut(observer) {
            effect.sources.insert(signal);
            if let Some(slot) = self.signals.get_mut(signal) {
                slot.subscribers.insert(observer);
            }
        }
    }

    /// Mark every memo downstream of `subscribers` as dirty.
    fn mark_dirty(&mut self, subscribers: &[EffectId]) {
        let mut stack = subscribers.to_vec();
        while let Some(effect) = stack.pop() {
            let Some(memo) = self.effects.get(effect).and_then(|slot| slot.memo) else {
                continue;
            };
            if let Some(signal) = self.signals.get_mut(memo) {
                if !signal.dirty {
                    signal.dirty = true;
                    stack.extend(signal.subscribers.iter().copied());
                }
            }
        }
    }

    /// Drop every edge between `effect` and the signals it read last run.
    fn unlink(&mut self, effect: EffectId) {
        let sources: Vec<SignalId> = match self.effects.get_mut(effect) {
            Some(slot) => slot.sources.drain().collect(),
            None => return,
        };
        for sid in sources {
            if let Some(signal) = self.signals.get_mut(sid) {
                signal.subscribers.remove(&effect);
            }
        }
    }
}

thread_local! {
    pub(crate) static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::new());
}

/// Register a new effect without running it.
///
/// `memo` names the signal the effect keeps current, if any.
pub(crate) fn insert_effect(callback: Box<dyn FnMut()>, memo: Option<SignalId>) -> EffectId {
    RUNTIME.with(|rt| {
        let rt = &mut *rt.borrow_mut();
        let id = rt.effects.insert(EffectSlot {
            callback: Some(callback),
            sources: HashSet::new(),
            memo,
        });
        if let Some(signal) = memo.and_then(|memo| rt.signals.get_mut(memo)) {
            signal.computed_by = Some(id);
        }
        id
    })
}

/// Remove an effect and all of its subscriptions. Unknown ids are ignored.
pub(crate) fn remove_effect(effect: EffectId) {
    RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        rt.unlink(effect);
        rt.effects.remove(effect);
    });
}

/// Run one effect with dependency tracking.
///
/// Dependencies are re-collected on every run so conditional reads retrack.
pub(crate) fn run_effect(effect: EffectId) {
    let taken = RUNTIME.with(|rt| {
        let rt = &mut *rt.borrow_mut();
        let slot = rt.effects.get_mut(effect)?;
        // `None` while the effect is already running further up the stack.
        let callback = slot.callback.take()?;
        let memo = slot.memo;
        rt.unlink(effect);
        if let Some(signal) = memo.and_then(|memo| rt.signals.get_mut(memo)) {
            signal.dirty = false;
        }
        let previous = rt.observer.replace(effect);
        Some((callback, previous))
    });
    let Some((mut callback, previous)) = taken else {
        return;
    };

    callback();

    RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        rt.observer = previous;
        // The effect may have disposed itself while running.
        if let Some(slot) = rt.effects.get_mut(effect) {
            slot.callback = Some(callback);
        }
    });
}

/// Queue `subscribers` and flush unless a batch or a flush is in progress.
pub(crate) fn notify(subscribers: Vec<EffectId>) {
    if subscribers.is_empty() {
        return;
    }
    let should_flush = RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        rt.mark_dirty(&subscribers);
        rt.queued.extend(subscribers);
        rt.batch_depth == 0 && !rt.flushing
    });
    if should_flush {
        flush();
    }
}

/// Recompute `signal` first if it is a memo with a changed source.
///
/// Memo effects queued behind a running effect or a batch would otherwise
/// leave derived reads one write behind.
pub(crate) fn refresh(signal: SignalId) {
    let stale = RUNTIME.with(|rt| {
        rt.borrow()
            .signals
            .get(signal)
            .filter(|slot| slot.dirty)
            .and_then(|slot| slot.computed_by)
    });
    if let Some(effect) = stale {
        run_effect(effect);
    }
}

/// Drain the queue until no effect schedules further work.
pub(crate) fn flush() {
    RUNTIME.with(|rt| rt.borrow_mut().flushing = true);

    loop {
        let round = RUNTIME.with(|rt| std::mem::take(&mut rt.borrow_mut().queued));
        if round.is_empty() {
            break;
        }
        let mut seen = HashSet::with_capacity(round.len());
        for effect in round {
            if seen.insert(effect) {
                run_effect(effect);
            }
        }
    }

    RUNTIME.with(|rt| rt.borrow_mut().flushing = false);
}

/// Replace the runtime with a fresh one. Handles created before become stale.
#[cfg(test)]
pub(crate) fn reset_runtime() {
    RUNTIME.with(|rt| {
        *rt.borrow_mut() = Runtime::new();
    });
}
