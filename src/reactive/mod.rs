//! Reactive state: signals, effects, memos.
//!
//! Leptos-style fine-grained reactivity on a single-threaded, thread-local
//! runtime. This is the layer actions publish their lifecycle through.
//!
//! - [`create_signal`] — create a read/write signal pair.
//! - [`create_effect`] — auto-tracking side effect.
//! - [`create_memo`] — cached derived computation.
//! - [`batch`] — coalesce multiple writes into one notification pass.
//! - [`untrack`] — read without subscribing.

pub mod effect;
pub(crate) mod runtime;
pub mod signal;

pub use effect::{batch, create_effect, create_effect_with_id, create_memo, dispose_effect, untrack};
pub use runtime::{EffectId, SignalId};
pub use signal::{create_signal, ReadSignal, WriteSignal};
