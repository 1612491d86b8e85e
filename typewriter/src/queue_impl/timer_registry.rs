// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::oneshot, task::AbortHandle};

use crate::{StdMutex, TypewriterError, lock_or_recover};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Default)]
pub struct TimerSet {
    next_id: u64,
    pending: HashMap<TimerId, AbortHandle>,
}

/// Owns every delayed callback armed by a typewriter, so that all of them can be
/// cancelled at once when the typewriter is torn down.
///
/// - A timer that fires naturally removes itself from the registry **before** it runs
///   its callback.
/// - A timer that was cancelled never runs its callback. This holds even if the timer
///   already woke up and is racing with [`Self::cancel_all()`], because the callback
///   only runs if the timer's own entry was still in the registry.
///
/// You can safely clone this struct, since it only contains an [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    safe_timer_set: Arc<StdMutex<TimerSet>>,
}

impl TimerRegistry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Arm a one shot timer. The `callback` runs once `delay` has elapsed, unless the
    /// timer is cancelled first.
    ///
    /// This spawns a Tokio task, so it must be called from inside a Tokio runtime.
    pub fn schedule_once<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        // Hold the lock until the abort handle is recorded, so the spawned task can't
        // look for its entry before it exists.
        let mut timer_set = lock_or_recover(&self.safe_timer_set);

        let id = TimerId(timer_set.next_id);
        timer_set.next_id += 1;

        let safe_timer_set = Arc::clone(&self.safe_timer_set);
        let join_handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let is_still_pending =
                lock_or_recover(&safe_timer_set).pending.remove(&id).is_some();
            if is_still_pending {
                callback();
            }
        });

        timer_set.pending.insert(id, join_handle.abort_handle());
        id
    }

    /// Resolves once `duration` has elapsed. Resolves to
    /// [`TypewriterError::TimerCancelled`] if the underlying timer is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`TypewriterError::TimerCancelled`] when [`Self::cancel()`] or
    /// [`Self::cancel_all()`] cancels this timer before it fires.
    pub async fn delay(&self, duration: Duration) -> Result<(), TypewriterError> {
        let (sender, receiver) = oneshot::channel::<()>();
        self.schedule_once(duration, move || {
            // We don't care about the result of this operation.
            sender.send(()).ok();
        });
        receiver.await.map_err(|_| TypewriterError::TimerCancelled)
    }

    /// Cancel one timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let maybe_handle = lock_or_recover(&self.safe_timer_set).pending.remove(&id);
        match maybe_handle {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer and empty the registry.
    pub fn cancel_all(&self) {
        let mut timer_set = lock_or_recover(&self.safe_timer_set);
        let count = timer_set.pending.len();
        for (_, handle) in timer_set.pending.drain() {
            handle.abort();
        }
        if count > 0 {
            tracing::debug!(message = "cancelled pending timers", count);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { lock_or_recover(&self.safe_timer_set).pending.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
