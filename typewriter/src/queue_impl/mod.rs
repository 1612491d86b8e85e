// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod queue_processor;
pub mod task;
pub mod text_buffer;
pub mod timer_registry;
pub mod typewriter_state;

// Re-export.
pub use queue_processor::*;
pub use task::*;
pub use text_buffer::*;
pub use timer_registry::*;
pub use typewriter_state::*;
