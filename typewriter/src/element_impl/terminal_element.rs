// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::Debug, sync::Arc};

use crossterm::{QueueableCommand,
                cursor::MoveToColumn,
                style::Print,
                terminal::{Clear, ClearType}};
use miette::IntoDiagnostic;

use crate::{SafeRawTerminal, SendRawTerminal, StdMutex, TextElement, lock_or_recover};

/// Paints the typewriter text on the current terminal line. Every paint moves to column
/// 0, clears the line and prints the full text, so the cursor overlay can come and go
/// without leaving stale characters behind.
#[derive(Clone)]
pub struct TerminalElement {
    pub safe_output_terminal: SafeRawTerminal,
}

impl Debug for TerminalElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TerminalElement")
    }
}

impl TerminalElement {
    #[must_use]
    pub fn new(safe_output_terminal: SafeRawTerminal) -> Self {
        Self {
            safe_output_terminal,
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        let safe_output_terminal: SafeRawTerminal =
            Arc::new(StdMutex::new(std::io::stdout()));
        Self::new(safe_output_terminal)
    }
}

impl TextElement for TerminalElement {
    fn paint(&mut self, text: &str) -> miette::Result<()> {
        let mut guard = lock_or_recover(&self.safe_output_terminal);
        let writer: &mut SendRawTerminal = &mut *guard;

        writer
            .queue(MoveToColumn(0))
            .into_diagnostic()?
            .queue(Clear(ClearType::CurrentLine))
            .into_diagnostic()?
            .queue(Print(text))
            .into_diagnostic()?;

        writer.flush().into_diagnostic()?;

        Ok(())
    }
}
