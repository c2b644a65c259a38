//! Error types for the editor

use crate::ids::{NodeId, PageId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Node not found: {0}")]
    ReferenceNotFound(NodeId),

    #[error("Page not found: {0}")]
    PageNotFound(PageId),

    #[error("Node {0} does not accept children")]
    CapabilityDenied(NodeId),

    #[error("Moving {node} under {target} would create a cycle")]
    CycleRejected { node: NodeId, target: NodeId },

    #[error("Index {index} out of range for {len} siblings")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Node {node} belongs to page {expected}, not {actual}")]
    CrossPage {
        node: NodeId,
        expected: PageId,
        actual: PageId,
    },

    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    #[error("Node already exists: {0}")]
    DuplicateNode(NodeId),

    #[error("Integrity violation: {0}")]
    Integrity(String),
}

impl EditorError {
    /// Stable short code, used as the diagnostic rule name
    pub fn code(&self) -> &'static str {
        match self {
            EditorError::ReferenceNotFound(_) | EditorError::PageNotFound(_) => "reference-not-found",
            EditorError::CapabilityDenied(_) => "capability-denied",
            EditorError::CycleRejected { .. } => "cycle-rejected",
            EditorError::IndexOutOfRange { .. } => "index-out-of-range",
            EditorError::CrossPage { .. } => "cross-page",
            EditorError::UnknownComponentType(_) => "unknown-component-type",
            EditorError::DuplicateNode(_) => "duplicate-node",
            EditorError::Integrity(_) => "integrity",
        }
    }
}

/// Errors from loading configuration or project snapshots
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot is inconsistent: {0}")]
    Inconsistent(#[from] EditorError),
}
