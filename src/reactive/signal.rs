//! Signal handles: [`create_signal`], [`ReadSignal`], [`WriteSignal`].
//!
//! A signal is an observable value cell. Reading it inside an effect or memo
//! subscribes that computation; writing it re-runs every subscriber before
//! the write returns.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use super::runtime::{notify, refresh, SignalId, SignalSlot, RUNTIME};

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Create a signal holding `initial`.
///
/// Returns the read and write halves. Both are `Copy`; they stay valid for
/// the life of the current thread's runtime.
pub fn create_signal<T: 'static>(initial: T) -> (ReadSignal<T>, WriteSignal<T>) {
    let id = RUNTIME.with(|rt| {
        rt.borrow_mut()
            .signals
            .insert(SignalSlot::new(Box::new(initial)))
    });
    (
        ReadSignal {
            id,
            _marker: PhantomData,
        },
        WriteSignal {
            id,
            _marker: PhantomData,
        },
    )
}

// ---------------------------------------------------------------------------
// ReadSignal
// ---------------------------------------------------------------------------

/// Read half of a signal.
pub struct ReadSignal<T: 'static> {
    id: SignalId,
    _marker: PhantomData<T>,
}

impl<T: 'static> Copy for ReadSignal<T> {}
impl<T: 'static> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadSignal").field("id", &self.id).finish()
    }
}

impl<T: 'static> ReadSignal<T> {
    pub(crate) fn id(&self) -> SignalId {
        self.id
    }

    /// Clone out the current value, subscribing the running observer.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Borrow the current value, subscribing the running observer.
    ///
    /// `f` runs while the runtime is borrowed; it must not read or write
    /// other signals.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        refresh(self.id);
        RUNTIME.with(|rt| {
            rt.borrow_mut().track(self.id);
            let rt = rt.borrow();
            f(downcast(&*rt.signals[self.id].value))
        })
    }

    /// Clone out the current value without subscribing anything.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.with_untracked(T::clone)
    }

    /// Borrow the current value without subscribing anything.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        refresh(self.id);
        RUNTIME.with(|rt| f(downcast(&*rt.borrow().signals[self.id].value)))
    }
}

fn downcast<T: 'static>(value: &dyn Any) -> &T {
    value.downcast_ref::<T>().expect("signal type mismatch")
}

// ---------------------------------------------------------------------------
// WriteSignal
// ---------------------------------------------------------------------------

/// Write half of a signal.
pub struct WriteSignal<T: 'static> {
    id: SignalId,
    _marker: PhantomData<T>,
}

impl<T: 'static> Copy for WriteSignal<T> {}
impl<T: 'static> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for WriteSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSignal").field("id", &self.id).finish()
    }
}

impl<T: 'static> WriteSignal<T> {
    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.update(|slot| *slot = value);
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let subscribers = RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            let slot = &mut rt.signals[self.id];
            f(slot
                .value
                .downcast_mut::<T>()
                .expect("signal type mismatch"));
            slot.subscribers.iter().copied().collect::<Vec<_>>()
        });
        notify(subscribers);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
