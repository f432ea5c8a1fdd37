//! # Shiptrack Runtime
//!
//! Runtime implementation for reducer-based features.
//!
//! This crate provides the [`Store`] runtime that coordinates reducer
//! execution and effect handling, plus the [`retry`] helpers used by effects
//! that talk to eventually-consistent services.
//!
//! ## Core Components
//!
//! - **Store**: Holds state, runs the reducer, executes effects
//! - **Effect Executor**: Spawns effect descriptions and feeds resulting actions back
//! - **Cancellation**: Aborts effect groups started with `Effect::Cancellable`
//!
//! ## Example
//!
//! ```ignore
//! use shiptrack_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use shiptrack_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Bounded polling schedules
pub mod retry;

pub use store::Store;
pub use error::StoreError;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

/// The Store and its effect executor
pub mod store {
    use super::{Arc, Effect, Reducer, RwLock, StoreError};
    use futures::future::{BoxFuture, FutureExt, join_all};
    use shiptrack_core::effect::EffectId;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::broadcast;
    use tokio::task::AbortHandle;

    type CancellationRegistry = Arc<Mutex<HashMap<EffectId, Vec<AbortHandle>>>>;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a store is cheap; clones share state and in-flight effects.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        cancellations: CancellationRegistry,
        shutdown: Arc<AtomicBool>,
        /// Actions produced by effects are broadcast here once they have been
        /// reduced.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
        }

        /// Create a store with a custom action broadcast capacity.
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                cancellations: Arc::new(Mutex::new(HashMap::new())),
                shutdown: Arc::new(AtomicBool::new(false)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the state write lock, then starts every
        /// returned effect. Effects run in the background; this call does not
        /// wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                return Err(StoreError::ShutdownInProgress);
            }

            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut state, action, &self.environment)
            };

            for effect in effects {
                self.execute_effect(effect);
            }

            Ok(())
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast before sending, so no result can
        /// be missed. Only actions produced by effects are observed.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action before `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();
            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged, continuing");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read from the current state
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Stop accepting actions and abort every cancellable effect.
        pub fn shutdown(&self) {
            self.shutdown.store(true, Ordering::Release);

            let groups: Vec<EffectId> = self
                .cancellations
                .lock()
                .map(|registry| registry.keys().copied().collect())
                .unwrap_or_default();

            for id in groups {
                self.cancel(id);
            }
        }

        /// Number of still-running effects registered under `id`.
        #[must_use]
        pub fn in_flight(&self, id: EffectId) -> usize {
            self.cancellations
                .lock()
                .map(|registry| {
                    registry
                        .get(&id)
                        .map_or(0, |handles| handles.iter().filter(|h| !h.is_finished()).count())
                })
                .unwrap_or(0)
        }

        fn cancel(&self, id: EffectId) {
            let handles = self
                .cancellations
                .lock()
                .map(|mut registry| registry.remove(&id).unwrap_or_default())
                .unwrap_or_default();

            let aborted = handles.iter().filter(|h| !h.is_finished()).count();
            for handle in handles {
                handle.abort();
            }

            metrics::counter!("store.effects.cancelled", "id" => id.as_str()).increment(1);
            tracing::debug!(effect_id = %id, aborted, "Cancelled effect group");
        }

        fn register(&self, id: EffectId, handle: AbortHandle) {
            if let Ok(mut registry) = self.cancellations.lock() {
                let handles = registry.entry(id).or_default();
                handles.retain(|h| !h.is_finished());
                handles.push(handle);
            }
        }

        /// Start an effect returned by the reducer.
        ///
        /// - `None`: No-op
        /// - `Cancel`: Aborts the group immediately
        /// - `Cancellable`: Spawned as one task registered under its id
        /// - `Parallel`: Each child started independently
        /// - everything else: Spawned as one task
        fn execute_effect(&self, effect: Effect<A>) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Cancel(id) => {
                    metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                    self.cancel(id);
                },
                Effect::Cancellable { id, effect } => {
                    metrics::counter!("store.effects.executed", "type" => "cancellable")
                        .increment(1);
                    let handle = tokio::spawn(self.clone().run(*effect));
                    self.register(id, handle.abort_handle());
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect);
                    }
                },
                other => {
                    metrics::counter!("store.effects.executed", "type" => "task").increment(1);
                    tokio::spawn(self.clone().run(other));
                },
            }
        }

        /// Drive an effect to completion inside the current task.
        fn run(self, effect: Effect<A>) -> BoxFuture<'static, ()> {
            async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        if let Some(action) = fut.await {
                            self.feed_back(action).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    },
                    Effect::Delay { duration, action } => {
                        tokio::time::sleep(duration).await;
                        self.feed_back(*action).await;
                    },
                    Effect::Parallel(effects) => {
                        join_all(effects.into_iter().map(|e| self.clone().run(e))).await;
                    },
                    Effect::Sequential(effects) => {
                        for effect in effects {
                            self.clone().run(effect).await;
                        }
                    },
                    Effect::Cancellable { id, effect } => {
                        let handle = tokio::spawn(self.clone().run(*effect));
                        self.register(id, handle.abort_handle());
                        if let Err(err) = handle.await {
                            if err.is_cancelled() {
                                tracing::debug!(effect_id = %id, "Nested cancellable effect aborted");
                            } else {
                                tracing::error!(effect_id = %id, error = %err, "Nested effect task failed");
                            }
                        }
                    },
                    Effect::Cancel(id) => self.cancel(id),
                }
            }
            .boxed()
        }

        /// Reduce an effect's action, then publish it to observers.
        ///
        /// Observers only see an action once its state change is visible.
        async fn feed_back(&self, action: A) {
            if let Err(err) = self.send(action.clone()).await {
                tracing::debug!(error = %err, "Dropped action produced by effect");
                return;
            }

            // No observers is fine
            let _ = self.action_broadcast.send(action);
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                cancellations: Arc::clone(&self.cancellations),
                shutdown: Arc::clone(&self.shutdown),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}
