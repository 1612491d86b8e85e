// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::Debug, sync::Arc};

use crate::{StdMutex, lock_or_recover};

/// Something that can show text. It receives the full visible text on every paint,
/// never a diff.
pub trait TextElement: Send + Debug {
    /// Replace whatever is currently shown with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text could not be displayed, eg: an I/O error writing to
    /// the terminal.
    fn paint(&mut self, text: &str) -> miette::Result<()>;
}

/// Nullable, shared handle to the [`TextElement`] a typewriter drives. Painting a
/// detached handle is a no-op.
///
/// You can safely clone this struct, since it only contains an [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct ElementRef {
    safe_element: Arc<StdMutex<Option<Box<dyn TextElement>>>>,
}

impl ElementRef {
    #[must_use]
    pub fn new(element: impl TextElement + 'static) -> Self {
        let this = Self::default();
        this.attach(Box::new(element));
        this
    }

    /// Install `element`, replacing (and dropping) any element already attached.
    pub fn attach(&self, element: Box<dyn TextElement>) {
        *lock_or_recover(&self.safe_element) = Some(element);
    }

    /// Remove the attached element and hand it back.
    pub fn detach(&self) -> Option<Box<dyn TextElement>> {
        lock_or_recover(&self.safe_element).take()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool { lock_or_recover(&self.safe_element).is_some() }

    /// Paint `text` on the attached element. Returns `Ok(false)` when nothing is
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns whatever error the element's [`TextElement::paint()`] returns.
    pub fn paint(&self, text: &str) -> miette::Result<bool> {
        match lock_or_recover(&self.safe_element).as_mut() {
            Some(element) => element.paint(text).map(|()| true),
            None => Ok(false),
        }
    }
}
