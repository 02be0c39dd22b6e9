//! Task/reminder record and lifecycle status.
//!
//! # Invariants
//! - `description` is non-empty text.
//! - Status moves one way in practice: `Pending` -> `Completed` or
//!   `Pending` -> `Cancelled`; no path back to `Pending` is defined.
//! - `priority` is accepted and persisted but reserved: no ordering or
//!   formatting logic reads it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not yet acted on.
    Pending,
    /// Marked done by its owner.
    Completed,
    /// No longer actionable.
    Cancelled,
}

/// Validation failure for task write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyDescription,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "task description must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// A task owned by exactly one user.
///
/// `due_at` is timezone-naive local time; the resolver guarantees any value
/// stored here is absolute and fully specified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned id; the number users reference in "concluir tarefa N".
    pub id: i64,
    pub owner_id: i64,
    pub description: String,
    pub due_at: Option<NaiveDateTime>,
    /// Reserved field, persisted but never read by core logic.
    pub priority: Option<String>,
    pub status: TaskStatus,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    /// Unix epoch milliseconds.
    pub updated_at_ms: i64,
}

impl Task {
    /// Checks write-path invariants before persistence.
    pub fn validate_description(description: &str) -> Result<(), TaskValidationError> {
        if description.trim().is_empty() {
            return Err(TaskValidationError::EmptyDescription);
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}
