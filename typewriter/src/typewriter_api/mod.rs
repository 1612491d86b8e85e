// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod script;
pub mod typewriter;
pub mod typewriter_error;
pub mod typewriter_options;

// Re-export.
pub use script::*;
pub use typewriter::*;
pub use typewriter_error::*;
pub use typewriter_options::*;
