// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod cursor_blinker;
pub mod terminal_element;
pub mod text_element;

// Re-export.
pub use cursor_blinker::*;
pub use terminal_element::*;
pub use text_element::*;
