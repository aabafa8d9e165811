//! Core domain errors.

use thiserror::Error;

/// Core domain errors for TaskTree.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Task not found.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Invalid state transition.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Task is too complex to start without subtasks.
    #[error("Task '{0}' must be decomposed into subtasks before starting")]
    DecompositionRequired(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
