//! Test support: a hand-driven producer and local-task helpers.
//!
//! Actions spawn their invocations with `tokio::task::spawn_local`, so tests
//! run inside a [`LocalSet`](tokio::task::LocalSet) via [`run_local`] and use
//! [`drain`] to let spawned invocations make progress.

pub mod producer;

pub use producer::ControlledProducer;

use std::future::Future;

use tokio::task::LocalSet;

/// Run `future` on a fresh [`LocalSet`] so actions can spawn their tasks.
pub async fn run_local<F: Future>(future: F) -> F::Output {
    LocalSet::new().run_until(future).await
}

/// Yield until local tasks that are ready have run. Never advances a paused
/// clock.
pub async fn drain() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
