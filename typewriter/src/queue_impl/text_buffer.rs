// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Display;

use unicode_segmentation::UnicodeSegmentation;

/// The authoritative text of a typewriter. The target element only mirrors it.
///
/// A "character" here is an extended grapheme cluster, so `"e\u{301}"` or a flag emoji
/// is typed and deleted as a single step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    content: String,
}

impl TextBuffer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn as_str(&self) -> &str { &self.content }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.content.is_empty() }

    /// Number of grapheme clusters.
    #[must_use]
    pub fn len_graphemes(&self) -> usize { self.content.graphemes(true).count() }

    pub fn push_grapheme(&mut self, grapheme: &str) { self.content.push_str(grapheme); }

    /// Removes the last grapheme cluster. An empty buffer stays empty and [None] is
    /// returned.
    pub fn pop_grapheme(&mut self) -> Option<String> {
        let (start_index, _) = self.content.grapheme_indices(true).next_back()?;
        Some(self.content.split_off(start_index))
    }

    pub fn clear(&mut self) { self.content.clear(); }
}

impl Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
