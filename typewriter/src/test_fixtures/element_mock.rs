// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::Arc;

use crate::{StdMutex, TextElement, lock_or_recover};

/// A [`TextElement`] that records every paint.
///
/// You can safely clone this struct, since it only contains [`Arc`]s. Attach one clone
/// to a typewriter and keep the other to inspect what was painted.
#[derive(Debug, Clone, Default)]
pub struct ElementMock {
    pub paints: Arc<StdMutex<Vec<String>>>,
    /// When set, every paint after this many successful ones fails.
    pub maybe_fail_after: Option<usize>,
}

impl ElementMock {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn new_failing_after(successful_paints: usize) -> Self {
        Self {
            maybe_fail_after: Some(successful_paints),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get_paints(&self) -> Vec<String> { lock_or_recover(&self.paints).clone() }

    /// What the element currently shows. Empty if it was never painted.
    #[must_use]
    pub fn get_current_text(&self) -> String {
        lock_or_recover(&self.paints)
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

impl TextElement for ElementMock {
    fn paint(&mut self, text: &str) -> miette::Result<()> {
        let mut paints = lock_or_recover(&self.paints);
        if self
            .maybe_fail_after
            .is_some_and(|fail_after| paints.len() >= fail_after)
        {
            miette::bail!("mock element refused paint #{}", paints.len() + 1);
        }
        paints.push(text.to_string());
        Ok(())
    }
}
