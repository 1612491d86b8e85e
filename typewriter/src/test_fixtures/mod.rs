// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod callback_recorder;
pub mod element_mock;
pub mod stdout_mock;

// Re-export.
pub use callback_recorder::*;
pub use element_mock::*;
pub use stdout_mock::*;
