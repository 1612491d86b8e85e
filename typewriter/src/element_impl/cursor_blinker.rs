// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{sync::Arc, time::Duration};

use tokio::{sync::{broadcast, oneshot},
            time::interval};

use crate::{ElementRef, SafeBool, SafeTypewriterState, StdMutex, lock_or_recover};

/// Blinks a cursor character after the typewriter text while the typewriter is idle.
///
/// A background task ticks every `tick_delay`. On every tick the cursor visibility is
/// flipped and, only if [`crate::TypewriterState::is_idle_with_text()`] holds, the
/// element is repainted with either `text + cursor_char` or just `text`. The
/// [`crate::TextBuffer`] is only ever read, so callbacks never see the cursor.
///
/// The task runs until [`Self::request_shutdown()`] is called. Use
/// [`Self::await_shutdown()`] to wait for it to finish.
#[allow(missing_debug_implementations)]
pub struct CursorBlinker {
    pub tick_delay: Duration,
    pub cursor_char: String,
    pub shutdown_sender: broadcast::Sender<()>,
    safe_is_shutdown: SafeBool,
    maybe_shutdown_complete_rx: Option<oneshot::Receiver<()>>,
}

impl CursorBlinker {
    /// Spawn the blink task. Must be called from inside a Tokio runtime.
    #[must_use]
    pub fn start(
        tick_delay: Duration,
        cursor_char: impl Into<String>,
        state: SafeTypewriterState,
        element: ElementRef,
    ) -> Self {
        // Shutdown broadcast channel.
        let (shutdown_sender, _) = broadcast::channel::<()>(1);

        let mut blinker = CursorBlinker {
            tick_delay,
            cursor_char: cursor_char.into(),
            shutdown_sender,
            safe_is_shutdown: Arc::new(StdMutex::new(false)),
            maybe_shutdown_complete_rx: None,
        };

        blinker.start_task(state, element);

        blinker
    }

    fn start_task(&mut self, state: SafeTypewriterState, element: ElementRef) {
        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        let self_safe_is_shutdown = self.safe_is_shutdown.clone();

        let (shutdown_complete_sender, shutdown_complete_receiver) =
            oneshot::channel::<()>();
        self.maybe_shutdown_complete_rx = Some(shutdown_complete_receiver);

        // These are all moved into the spawn block.
        let tick_delay = self.tick_delay;
        let cursor_char = self.cursor_char.clone();

        tokio::spawn(async move {
            let mut interval = interval(tick_delay);
            let mut is_cursor_visible = false;

            loop {
                tokio::select! {
                    // This branch is cancel safe because recv is cancel safe.
                    _ = shutdown_receiver.recv() => {
                        *lock_or_recover(&self_safe_is_shutdown) = true;
                        // We don't care about the result of this operation.
                        shutdown_complete_sender.send(()).ok();
                        break;
                    }

                    // This branch is cancel safe because tick is cancel safe.
                    _ = interval.tick() => {
                        is_cursor_visible = !is_cursor_visible;
                        paint_tick(&state, &element, &cursor_char, is_cursor_visible);
                    }
                }
            }
        });
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool { *lock_or_recover(&self.safe_is_shutdown) }

    /// Ask the blink task to stop. Does nothing if it already stopped.
    pub fn request_shutdown(&self) {
        if !self.is_shutdown() {
            // Produces an error if the task is already gone.
            self.shutdown_sender.send(()).ok();
        }
    }

    /// Wait until the blink task has completely stopped. Call
    /// [`Self::request_shutdown()`] first.
    pub async fn await_shutdown(&mut self) {
        if let Some(shutdown_complete_rx) = self.maybe_shutdown_complete_rx.take() {
            // We don't care about the result of this operation.
            shutdown_complete_rx.await.ok();
        }
    }
}

fn paint_tick(
    state: &SafeTypewriterState,
    element: &ElementRef,
    cursor_char: &str,
    is_cursor_visible: bool,
) {
    let state = lock_or_recover(state);
    if !state.is_idle_with_text() {
        return;
    }

    let output = if is_cursor_visible {
        format!("{}{cursor_char}", state.buffer)
    } else {
        state.buffer.to_string()
    };

    if let Err(report) = element.paint(&output) {
        tracing::debug!(message = "cursor paint failed", %report);
    }
}
