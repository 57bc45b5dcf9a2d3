//! Parallel-result actions: several named requests launched together.
//!
//! ```ignore
//! let dashboard = Action::parallel(
//!     move |user_id: u64| {
//!         ParallelRequests::new()
//!             .with("profile", api.profile(user_id))
//!             .with("orders", api.orders(user_id))
//!     },
//!     ActionOptions::new().with_tracker(tracker),
//! )?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{try_join_all, FutureExt, LocalBoxFuture, TryFutureExt};

use super::controller::{Action, BoxProducer};
use super::error::{ActionError, FetchError};
use super::options::ActionOptions;

type Request<V> = LocalBoxFuture<'static, Result<V, FetchError>>;

/// Named requests to run concurrently.
pub struct ParallelRequests<V> {
    requests: Vec<(String, Request<V>)>,
}

impl<V> Default for ParallelRequests<V> {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
        }
    }
}

impl<V> fmt::Debug for ParallelRequests<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.requests.iter().map(|(name, _)| name))
            .finish()
    }
}

impl<V: 'static> ParallelRequests<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request under `name` (builder). A repeated name replaces the
    /// earlier request.
    pub fn with<Fut, E>(mut self, name: impl Into<String>, request: Fut) -> Self
    where
        Fut: Future<Output = Result<V, E>> + 'static,
        E: Into<FetchError> + 'static,
    {
        let name = name.into();
        self.requests.retain(|(existing, _)| *existing != name);
        self.requests
            .push((name, request.map_err(Into::<FetchError>::into).boxed_local()));
        self
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Await every request. The first failure wins and drops the rest.
    async fn join(self) -> Result<BTreeMap<String, V>, FetchError> {
        let (names, requests): (Vec<String>, Vec<Request<V>>) = self
            .requests
            .into_iter()
            .map(|(name, request)| {
                let label = name.clone();
                let request = request
                    .map_err(move |err| {
                        tracing::debug!(request = %label, error = %err, "parallel request failed");
                        err
                    })
                    .boxed_local();
                (name, request)
            })
            .unzip();
        let values = try_join_all(requests).await?;
        Ok(names.into_iter().zip(values).collect())
    }
}

impl<R: Clone + 'static, V: Clone + 'static> Action<R, BTreeMap<String, V>> {
    /// Wrap a producer of several named requests.
    ///
    /// All requests of an invocation run concurrently. The result is
    /// **all-or-nothing**: success callbacks receive the full
    /// `name -> value` map only when every request succeeded. As soon as
    /// one fails, the invocation fails with that request's error, the
    /// still-pending requests are dropped, and no partial map is ever
    /// delivered or stored in `data`.
    ///
    /// An empty request set succeeds with an empty map.
    ///
    /// # Errors
    ///
    /// Returns the [`ActionError`] from [`ActionOptions::validate`].
    pub fn parallel<F>(
        producer: F,
        options: ActionOptions<R, BTreeMap<String, V>>,
    ) -> Result<Self, ActionError>
    where
        F: Fn(R) -> ParallelRequests<V> + 'static,
    {
        let producer: BoxProducer<R, BTreeMap<String, V>> =
            Rc::new(move |request| producer(request).join().boxed_local());
        Self::from_producer(producer, options)
    }
}
