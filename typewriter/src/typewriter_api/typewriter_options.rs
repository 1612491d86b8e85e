// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{DEFAULT_CURSOR_CHAR, DEFAULT_CURSOR_SPEED, DEFAULT_SPEED, TypewriterError};

pub type TextCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type CompleteCallback = Arc<dyn Fn() + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&TypewriterError) + Send + Sync>;

/// Construction time configuration for a [`crate::Typewriter`].
///
/// Start from [`TypewriterOptions::default()`] and chain the `with_*` and `on_*`
/// methods:
///
/// ```
/// # use std::time::Duration;
/// # use r3bl_typewriter::TypewriterOptions;
/// let options = TypewriterOptions::default()
///     .with_speed(Duration::from_millis(50))
///     .with_cursor_char("_")
///     .with_loop(true)
///     .on_write(|text| println!("{text}"));
/// assert!(options.loop_enabled);
/// ```
#[derive(Clone)]
pub struct TypewriterOptions {
    /// Delay before each typed or deleted grapheme.
    pub speed: Duration,
    /// Show a blinking cursor while idle.
    pub cursor: bool,
    pub cursor_char: String,
    /// Blink interval of the cursor.
    pub cursor_speed: Duration,
    /// Replay the queued tasks forever.
    pub loop_enabled: bool,
    /// Called with the full text after each typed grapheme.
    pub on_write: Option<TextCallback>,
    /// Called with the remaining text after each deleted grapheme.
    pub on_delete: Option<TextCallback>,
    /// Called every time the queue is drained.
    pub on_complete: Option<CompleteCallback>,
    /// Called when a task fails and draining stops.
    pub on_error: Option<ErrorCallback>,
}

impl Default for TypewriterOptions {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            cursor: true,
            cursor_char: DEFAULT_CURSOR_CHAR.to_string(),
            cursor_speed: DEFAULT_CURSOR_SPEED,
            loop_enabled: false,
            on_write: None,
            on_delete: None,
            on_complete: None,
            on_error: None,
        }
    }
}

impl Debug for TypewriterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypewriterOptions")
            .field("speed", &self.speed)
            .field("cursor", &self.cursor)
            .field("cursor_char", &self.cursor_char)
            .field("cursor_speed", &self.cursor_speed)
            .field("loop_enabled", &self.loop_enabled)
            .field("on_write", &self.on_write.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl TypewriterOptions {
    #[must_use]
    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: bool) -> Self {
        self.cursor = cursor;
        self
    }

    #[must_use]
    pub fn with_cursor_char(mut self, cursor_char: impl Into<String>) -> Self {
        self.cursor_char = cursor_char.into();
        self
    }

    #[must_use]
    pub fn with_cursor_speed(mut self, cursor_speed: Duration) -> Self {
        self.cursor_speed = cursor_speed;
        self
    }

    #[must_use]
    pub fn with_loop(mut self, loop_enabled: bool) -> Self {
        self.loop_enabled = loop_enabled;
        self
    }

    #[must_use]
    pub fn on_write(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_write = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_delete(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_delete = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_complete(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_error(
        mut self,
        callback: impl Fn(&TypewriterError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}
