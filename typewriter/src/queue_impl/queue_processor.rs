// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{sync::Arc, time::Duration};

use unicode_segmentation::UnicodeSegmentation;

use crate::{ElementRef, SafeTypewriterState, Task, TextBuffer, TimerRegistry,
            TypewriterError, TypewriterOptions, lock_or_recover};

/// Drains the [`crate::TaskQueue`] one task at a time in a single spawned Tokio task.
///
/// # State machine
///
/// ```text
///            start() && !is_running
///   Idle ──────────────────────────────▶ Draining ◀──────────────┐
///    ▲                                     │ pop & await head     │
///    │                                     ▼                      │
///    │  loop off              queue empty? Completed-step ────────┘ queue not empty
///    └──────────────────────────────────── │
///                                          │ loop on
///                                          ▼
///                                   Looping-reseed (clear text, push snapshot)
/// ```
///
/// A loop whose snapshot takes no time per cycle (eg: only `write("")`) runs once
/// and then goes back to Idle instead of reseeding.
///
/// - [`Self::try_start()`] takes the loop snapshot and flips the running flag. A second
///   call while draining is a no-op.
/// - `on_complete` fires once each time the queue empties after a task.
/// - A task that fails with anything other than a cancellation ends the drain, clears
///   the running flag and is reported to `on_error`. Tasks still queued stay queued.
/// - A drain that observes a newer [`crate::TypewriterState::generation`] (after a
///   reset) returns immediately and leaves all state alone.
///
/// You can safely clone this struct, every field is reference counted.
#[derive(Debug, Clone)]
pub struct QueueProcessor {
    pub options: Arc<TypewriterOptions>,
    pub state: SafeTypewriterState,
    pub element: ElementRef,
    pub timers: TimerRegistry,
}

/// Result of applying one character step to the buffer.
enum StepOutcome {
    /// The buffer changed and was mirrored. Holds the new text for the callback.
    Applied(String),
    /// No element is attached, so nothing was touched.
    Skipped,
}

impl QueueProcessor {
    /// Begin draining, unless a drain is already active or there is nothing to drain.
    /// Returns `true` if a drain was spawned.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn try_start(&self) -> bool {
        let generation = {
            let mut state = lock_or_recover(&self.state);
            if state.is_running || state.queue.is_empty() {
                return false;
            }
            state.is_running = true;
            state.loop_snapshot = state.queue.snapshot();
            state.generation
        };

        tracing::debug!(message = "drain started", generation);

        let this = self.clone();
        tokio::spawn(async move { this.drain(generation).await });
        true
    }

    async fn drain(self, generation: u64) {
        loop {
            let maybe_task = {
                let mut state = lock_or_recover(&self.state);
                if state.generation != generation {
                    return;
                }
                let maybe_task = state.queue.pop();
                if maybe_task.is_none() {
                    state.is_running = false;
                }
                maybe_task
            };

            let Some(task) = maybe_task else {
                tracing::debug!(message = "drain finished", generation);
                return;
            };

            tracing::debug!(message = "task started", task = task.name(), generation);

            match self.run_task(&task, generation).await {
                Ok(()) => {}
                Err(error) if error.is_cancellation() => {
                    tracing::debug!(message = "drain superseded", generation);
                    return;
                }
                Err(error) => {
                    self.fail(generation, &error);
                    return;
                }
            }

            // Completed-step.
            let queue_is_empty = {
                let state = lock_or_recover(&self.state);
                if state.generation != generation {
                    return;
                }
                state.queue.is_empty()
            };

            if !queue_is_empty {
                continue;
            }

            if let Some(on_complete) = &self.options.on_complete {
                on_complete();
            }

            if self.options.loop_enabled {
                match self.reseed(generation) {
                    Ok(true) => tokio::task::yield_now().await,
                    Ok(false) => return,
                    Err(error) if error.is_cancellation() => return,
                    Err(error) => {
                        self.fail(generation, &error);
                        return;
                    }
                }
            }
        }
    }

    async fn run_task(&self, task: &Task, generation: u64) -> Result<(), TypewriterError> {
        match task {
            Task::Write(text) => {
                self.set_is_writing(generation, true);
                let result = self.run_write(text, generation).await;
                self.set_is_writing(generation, false);
                result
            }
            Task::Delete(count) => self.run_delete(*count, generation).await,
            Task::Pause(duration) => self.run_pause(*duration).await,
        }
    }

    async fn run_write(&self, text: &str, generation: u64) -> Result<(), TypewriterError> {
        for grapheme in text.graphemes(true) {
            self.timers.delay(self.options.speed).await?;
            let outcome =
                self.apply_step(generation, |buffer| buffer.push_grapheme(grapheme))?;
            if let StepOutcome::Applied(current) = outcome {
                match &self.options.on_write {
                    Some(on_write) if !current.is_empty() => on_write(&current),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    async fn run_delete(&self, count: usize, generation: u64) -> Result<(), TypewriterError> {
        for _ in 0..count {
            self.timers.delay(self.options.speed).await?;
            let outcome = self.apply_step(generation, |buffer| {
                buffer.pop_grapheme();
            })?;
            if let (StepOutcome::Applied(remaining), Some(on_delete)) =
                (outcome, &self.options.on_delete)
            {
                on_delete(&remaining);
            }
        }
        Ok(())
    }

    async fn run_pause(&self, duration: Duration) -> Result<(), TypewriterError> {
        self.timers.delay(duration).await
    }

    /// Mutate the buffer and mirror it onto the element, under the state lock. The
    /// callback is left to the caller so it runs after the lock is released.
    fn apply_step(
        &self,
        generation: u64,
        mutate: impl FnOnce(&mut TextBuffer),
    ) -> Result<StepOutcome, TypewriterError> {
        let mut state = lock_or_recover(&self.state);
        if state.generation != generation {
            return Err(TypewriterError::Superseded);
        }
        if !self.element.is_attached() {
            tracing::warn!(message = "no element attached, step skipped", generation);
            return Ok(StepOutcome::Skipped);
        }
        mutate(&mut state.buffer);
        let current = state.buffer.as_str().to_owned();
        self.element.paint(&current)?;
        Ok(StepOutcome::Applied(current))
    }

    /// Looping-reseed: clear the text and replay the snapshot taken at drain start.
    ///
    /// Returns `Ok(false)` without reseeding if a cycle of the snapshot takes no time
    /// at all. Replaying it would spin forever, so the drain ends and stays Idle.
    fn reseed(&self, generation: u64) -> Result<bool, TypewriterError> {
        let mut state = lock_or_recover(&self.state);
        if state.generation != generation {
            return Err(TypewriterError::Superseded);
        }
        let cycle_duration = state
            .loop_snapshot
            .iter()
            .map(|task| task.duration(self.options.speed))
            .fold(Duration::ZERO, Duration::saturating_add);
        // Work queued by `on_complete` still gets drained before stopping.
        if cycle_duration.is_zero() && state.queue.is_empty() {
            state.is_running = false;
            tracing::warn!(
                message = "loop cycle takes no time, loop stopped",
                tasks = state.loop_snapshot.len(),
                generation
            );
            return Ok(false);
        }
        state.buffer.clear();
        self.element.paint("")?;
        let snapshot = state.loop_snapshot.clone();
        tracing::debug!(message = "loop reseed", tasks = snapshot.len(), generation);
        state.queue.extend(snapshot);
        Ok(true)
    }

    fn set_is_writing(&self, generation: u64, is_writing: bool) {
        let mut state = lock_or_recover(&self.state);
        if state.generation == generation {
            state.is_writing = is_writing;
        }
    }

    fn fail(&self, generation: u64, error: &TypewriterError) {
        {
            let mut state = lock_or_recover(&self.state);
            if state.generation == generation {
                state.is_running = false;
                state.is_writing = false;
            }
        }
        tracing::error!(message = "task failed, drain stopped", %error, generation);
        if let Some(on_error) = &self.options.on_error {
            on_error(error);
        }
    }
}
