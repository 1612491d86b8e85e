// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_typewriter
//!
//! Animate the text of a single target element character by character, the classic
//! "typewriter" effect. Work is described as a queue of steps:
//!
//! - [`Typewriter::write()`] types text one grapheme cluster at a time.
//! - [`Typewriter::delete()`] removes graphemes from the end, one at a time.
//! - [`Typewriter::stop()`] pauses for a while.
//!
//! Calls chain, and nothing happens until [`Typewriter::start()`] is called (or an
//! element is attached with [`Typewriter::attach()`], which starts draining
//! automatically).
//!
//! ```no_run
//! # use std::time::Duration;
//! # use r3bl_typewriter::{TerminalElement, Typewriter, TypewriterOptions};
//! # async fn example() {
//! let typewriter = Typewriter::new(
//!     TypewriterOptions::default()
//!         .with_speed(Duration::from_millis(80))
//!         .on_complete(|| tracing::info!("done")),
//! );
//! typewriter.attach(TerminalElement::stdout());
//! typewriter
//!     .write("Hello, world")
//!     .stop(Duration::from_secs(1))
//!     .delete(5)
//!     .write("Rust!")
//!     .start();
//! # }
//! ```
//!
//! # Architecture
//!
//! 1. [`TimerRegistry`] owns every pending delay, so teardown can cancel all of them
//!    at once with [`TimerRegistry::cancel_all()`].
//! 2. [`TextBuffer`] is the authoritative text. The element only mirrors it.
//! 3. [`TaskQueue`] holds [`Task`]s in FIFO order.
//! 4. [`QueueProcessor`] drains the queue in a single spawned Tokio task. A running
//!    flag makes [`Typewriter::start()`] single flight. In loop mode the queue is
//!    re-seeded from a snapshot taken when the drain began.
//! 5. [`CursorBlinker`] toggles a trailing cursor character on the element while the
//!    queue is idle. It never touches the [`TextBuffer`].
//!
//! # Reset and teardown
//!
//! [`Typewriter::reset()`] is synchronous and clears the queue and the text. Timers
//! that are already armed keep running, but every drain remembers the generation it
//! started in, so a stale drain stops before it can mutate anything.
//! [`Typewriter::detach()`] (also run on drop) resets, cancels all timers and shuts
//! down the cursor blinker.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events. Use [`tracing_setup::init()`] with a
//! [`TracingConfig`] to send them to `stdout`, `stderr`, a file, or both.

#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach sources.
pub mod element_impl;
pub mod queue_impl;
pub mod test_fixtures;
pub mod tracing_logging;
pub mod typewriter_api;

// Re-export the public API.
pub use element_impl::*;
pub use queue_impl::*;
pub use test_fixtures::*;
pub use tracing_logging::*;
pub use typewriter_api::*;

// Type aliases.
use std::{sync::{Arc, MutexGuard, PoisonError},
          time::Duration};

pub type StdMutex<T> = std::sync::Mutex<T>;

pub type SendRawTerminal = dyn std::io::Write + Send;
pub type SafeRawTerminal = Arc<StdMutex<SendRawTerminal>>;

pub type SafeBool = Arc<StdMutex<bool>>;
pub type SafeTypewriterState = Arc<StdMutex<TypewriterState>>;

// Constants.
pub const DEFAULT_SPEED: Duration = Duration::from_millis(100);
pub const DEFAULT_CURSOR_SPEED: Duration = Duration::from_millis(450);
pub const DEFAULT_CURSOR_CHAR: &str = "|";

/// Lock the given mutex. If a previous holder panicked, the guard is recovered
/// anyway, since every value guarded in this crate stays consistent between
/// statements.
pub fn lock_or_recover<T: ?Sized>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
