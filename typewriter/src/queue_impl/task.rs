// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::VecDeque, time::Duration};

use strum::IntoStaticStr;
use unicode_segmentation::UnicodeSegmentation;

/// One unit of queued work. Tasks are plain data, so a loop snapshot is just a clone
/// of the queue.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Task {
    /// Type each grapheme cluster of the text, one per delay.
    Write(String),
    /// Remove this many grapheme clusters from the end, one per delay.
    Delete(usize),
    /// Wait, without touching the text.
    Pause(Duration),
}

impl Task {
    #[must_use]
    pub fn name(&self) -> &'static str { self.into() }

    /// Number of timed steps this task takes. A [`Task::Pause`] is always one step.
    #[must_use]
    pub fn step_count(&self) -> usize {
        match self {
            Task::Write(text) => text.graphemes(true).count(),
            Task::Delete(count) => *count,
            Task::Pause(_) => 1,
        }
    }

    /// Total time this task spends waiting when every grapheme step takes `speed`.
    #[must_use]
    pub fn duration(&self, speed: Duration) -> Duration {
        match self {
            Task::Pause(duration) => *duration,
            Task::Write(_) | Task::Delete(_) => {
                let step_count = u32::try_from(self.step_count()).unwrap_or(u32::MAX);
                speed.saturating_mul(step_count)
            }
        }
    }
}

/// FIFO of [`Task`]s. Insertion order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, task: Task) { self.tasks.push_back(task); }

    pub fn pop(&mut self) -> Option<Task> { self.tasks.pop_front() }

    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    pub fn clear(&mut self) { self.tasks.clear(); }

    #[must_use]
    pub fn len(&self) -> usize { self.tasks.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.tasks.is_empty() }

    /// Copy of the pending tasks, in order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> { self.tasks.iter().cloned().collect() }
}
