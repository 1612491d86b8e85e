// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::io;

use miette::{Diagnostic, Report as ErrorReport};
use thiserror::Error;

/// Errors produced while draining the task queue, or while loading a [`crate::Script`].
#[derive(Debug, Error, Diagnostic)]
pub enum TypewriterError {
    /// A pending delay was cancelled, eg: by [`crate::Typewriter::detach()`].
    #[error("timer was cancelled before it fired")]
    #[diagnostic(code(r3bl_typewriter::timer_cancelled))]
    TimerCancelled,

    /// The drain was overtaken by [`crate::Typewriter::reset()`].
    #[error("drain was superseded by a reset")]
    #[diagnostic(code(r3bl_typewriter::superseded))]
    Superseded,

    /// The [`crate::TextElement`] could not show the text.
    #[error("failed to paint the target element: {0}")]
    #[diagnostic(
        code(r3bl_typewriter::element_paint),
        help("check that the output device is still writable")
    )]
    ElementPaint(String),

    /// An internal I/O error occurred.
    #[error(transparent)]
    #[diagnostic(code(r3bl_typewriter::io))]
    Io(#[from] io::Error),

    /// A script could not be parsed.
    #[error("invalid script: {0}")]
    #[diagnostic(
        code(r3bl_typewriter::script),
        help("a script looks like {{\"steps\": [{{\"write\": \"Hi\"}}, {{\"pause_ms\": 500}}, {{\"delete\": 2}}]}}")
    )]
    Script(#[from] serde_json::Error),
}

impl TypewriterError {
    /// Cancellations end a drain quietly. They are not reported to `on_error`.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::TimerCancelled | Self::Superseded)
    }
}

/// For convenience, convert [`ErrorReport`] to [`TypewriterError`], so that `?` works on
/// the `miette::Result` returned by [`crate::TextElement::paint()`].
impl From<ErrorReport> for TypewriterError {
    fn from(report: ErrorReport) -> Self { Self::ElementPaint(format!("{report}")) }
}
