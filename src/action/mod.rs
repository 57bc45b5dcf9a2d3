//! Actions: asynchronous operations with an observable lifecycle.
//!
//! - [`Action`] — the lifecycle controller (`Action::new`, `Action::parallel`).
//! - [`Invocation`] — per-`run` callback chain.
//! - [`ActionOptions`] — tracking, debounce and store-level hooks.
//! - [`AsyncStatus`] — `Idle | Loading | Success | Error`.
//! - [`FetchError`] / [`ActionError`] — producer failures and misuse.

pub mod controller;
pub mod error;
pub mod invocation;
pub mod options;
pub mod parallel;
pub mod status;

pub use controller::{Action, ActionState};
pub use error::{ActionError, FetchError, UNKNOWN_ERROR};
pub use invocation::Invocation;
pub use options::ActionOptions;
pub use parallel::ParallelRequests;
pub use status::AsyncStatus;
