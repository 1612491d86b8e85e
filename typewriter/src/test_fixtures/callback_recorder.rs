// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::Arc;

use tokio::time::Instant;

use crate::{StdMutex, TypewriterOptions, lock_or_recover};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCallback {
    Write(String),
    Delete(String),
    Complete,
    Error(String),
}

/// Records every callback a [`crate::Typewriter`] invokes, along with the (Tokio)
/// time it happened, so tests can assert on order, content and timing.
///
/// You can safely clone this struct, since it only contains an [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct CallbackRecorder {
    pub events: Arc<StdMutex<Vec<(Instant, RecordedCallback)>>>,
}

impl CallbackRecorder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Install recording callbacks on `options`, replacing any it already had.
    #[must_use]
    pub fn wire(&self, options: TypewriterOptions) -> TypewriterOptions {
        let on_write = self.clone();
        let on_delete = self.clone();
        let on_complete = self.clone();
        let on_error = self.clone();
        options
            .on_write(move |text| on_write.record(RecordedCallback::Write(text.into())))
            .on_delete(move |text| on_delete.record(RecordedCallback::Delete(text.into())))
            .on_complete(move || on_complete.record(RecordedCallback::Complete))
            .on_error(move |error| {
                on_error.record(RecordedCallback::Error(error.to_string()));
            })
    }

    pub fn record(&self, callback: RecordedCallback) {
        lock_or_recover(&self.events).push((Instant::now(), callback));
    }

    #[must_use]
    pub fn get_events(&self) -> Vec<RecordedCallback> {
        lock_or_recover(&self.events)
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect()
    }

    #[must_use]
    pub fn get_timed_writes(&self) -> Vec<(Instant, String)> {
        lock_or_recover(&self.events)
            .iter()
            .filter_map(|(at, callback)| match callback {
                RecordedCallback::Write(text) => Some((*at, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn get_writes(&self) -> Vec<String> {
        self.get_timed_writes()
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }

    #[must_use]
    pub fn get_deletes(&self) -> Vec<String> {
        self.get_events()
            .into_iter()
            .filter_map(|callback| match callback {
                RecordedCallback::Delete(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn get_errors(&self) -> Vec<String> {
        self.get_events()
            .into_iter()
            .filter_map(|callback| match callback {
                RecordedCallback::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn get_complete_count(&self) -> usize {
        self.get_events()
            .iter()
            .filter(|callback| **callback == RecordedCallback::Complete)
            .count()
    }
}
