//! # signal-actions
//!
//! Request-lifecycle state for fine-grained reactive apps.
//!
//! An [`Action`] wraps an async producer and publishes `status`, `error` and
//! `data` as signals, with optional debouncing, cancellation of superseded
//! invocations, and a chainable per-call callback API. An
//! [`ActivityTracker`] aggregates in-flight requests and the last failure
//! across every action that reports to it.
//!
//! ## Core Systems
//!
//! - **[`reactive`]** — Signals, effects, memos (Leptos-style auto-tracking)
//! - **[`action`]** — Lifecycle controller, invocation handles, options, errors
//! - **[`tracker`]** — Pending-request counter and last error
//! - **[`testing`]** — Hand-driven producer and `LocalSet` helpers
//!
//! Everything is single-threaded: actions spawn with
//! `tokio::task::spawn_local` and must be run inside a
//! [`tokio::task::LocalSet`].

// Reactivity
pub mod reactive;

// Request lifecycle
pub mod action;
pub mod tracker;

// Test support
pub mod testing;

pub use action::{
    Action, ActionError, ActionOptions, ActionState, AsyncStatus, FetchError, Invocation,
    ParallelRequests,
};
pub use tracker::ActivityTracker;
