//! Transient user-facing notifications.
//!
//! Rejected operations never propagate as errors to the UI. Instead the
//! editor records a [`Diagnostic`] which the shell shows as a toast and then
//! drains with [`Diagnostics::take`].

use crate::errors::EditorError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// A notification surfaced to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,

    /// Short machine-readable code (e.g. `cycle-rejected`)
    pub code: String,

    /// Human-readable message
    pub message: String,
}

impl From<&EditorError> for Diagnostic {
    fn from(err: &EditorError) -> Self {
        let level = match err {
            EditorError::Integrity(_) => DiagnosticLevel::Error,
            _ => DiagnosticLevel::Warning,
        };
        Self {
            level,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Bounded queue of pending diagnostics (oldest dropped first)
#[derive(Debug, Clone)]
pub struct Diagnostics {
    queue: VecDeque<Diagnostic>,
    capacity: usize,
}

impl Diagnostics {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(diagnostic);
    }

    /// Record a rejected operation
    pub fn report(&mut self, operation: &str, err: &EditorError) {
        tracing::warn!(operation, code = err.code(), "{}", err);
        self.push(Diagnostic::from(err));
    }

    /// Drain all pending diagnostics
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.queue.drain(..).collect()
    }

    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(32)
    }
}
