// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Task, Typewriter, TypewriterError};

/// One step of a [`Script`], in a JSON friendly shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Write(String),
    Delete(usize),
    PauseMs(u64),
}

impl From<&ScriptStep> for Task {
    fn from(step: &ScriptStep) -> Self {
        match step {
            ScriptStep::Write(text) => Task::Write(text.clone()),
            ScriptStep::Delete(count) => Task::Delete(*count),
            ScriptStep::PauseMs(millis) => Task::Pause(Duration::from_millis(*millis)),
        }
    }
}

/// A sequence of steps that can be stored in a file and replayed on a [`Typewriter`].
///
/// ```json
/// {
///   "steps": [
///     { "write": "Hello" },
///     { "pause_ms": 800 },
///     { "delete": 5 },
///     { "write": "Goodbye" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// # Errors
    ///
    /// Returns [`TypewriterError::Script`] if `json` is not a valid script.
    pub fn try_from_json_str(json: &str) -> Result<Self, TypewriterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns [`TypewriterError::Io`] if the file can't be read, or
    /// [`TypewriterError::Script`] if it doesn't contain a valid script.
    pub fn try_load(path: impl AsRef<Path>) -> miette::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(TypewriterError::from)?;
        let script = Self::try_from_json_str(&json)?;
        tracing::debug!(
            message = "script loaded",
            path = %path.display(),
            steps = script.steps.len()
        );
        Ok(script)
    }

    pub fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        self.steps.iter().map(Task::from)
    }

    /// Queue every step on `typewriter`, in order. Does not start it.
    pub fn enqueue_into<'a>(&self, typewriter: &'a Typewriter) -> &'a Typewriter {
        for task in self.tasks() {
            typewriter.enqueue(task);
        }
        typewriter
    }
}
