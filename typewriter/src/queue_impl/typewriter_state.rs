// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Task, TaskQueue, TextBuffer};

/// Everything the [`crate::Typewriter`] façade, the [`crate::QueueProcessor`] and the
/// [`crate::CursorBlinker`] share. It lives behind a [`crate::SafeTypewriterState`] and
/// the lock is never held across an `.await`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypewriterState {
    pub queue: TaskQueue,
    /// Copy of the queue taken when the current drain began. Replayed in loop mode.
    pub loop_snapshot: Vec<Task>,
    pub buffer: TextBuffer,
    /// True while a drain is active. Makes [`crate::Typewriter::start()`] single
    /// flight.
    pub is_running: bool,
    /// True while a [`Task::Write`] is executing. Hides the cursor overlay.
    pub is_writing: bool,
    /// Bumped by every reset. A drain that sees a newer generation than the one it
    /// started in stops without touching anything.
    pub generation: u64,
}

impl TypewriterState {
    /// The cursor overlay may only paint while nothing is being typed, nothing is
    /// queued, and there is some text to put the cursor after.
    #[must_use]
    pub fn is_idle_with_text(&self) -> bool {
        self.queue.is_empty() && !self.is_writing && !self.buffer.is_empty()
    }
}
