//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users and tasks.
//! - Isolate SQLite query details from conversation orchestration.
//!
//! # Invariants
//! - Task write paths validate the description before SQL mutations.
//! - Ownership is checked inside every task lookup: a task id that exists
//!   but belongs to another owner behaves exactly like an unknown id.
//! - A mutation that did not persist is reported, never masked as success.

use crate::db::DbError;
use crate::model::task::TaskValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence and query failure for user/task repositories.
///
/// "Not found / not owned" is deliberately not represented here: lookups
/// return `Option`/`bool` for that case, because it is a user-visible
/// outcome rather than a failure.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(TaskValidationError),
    /// A user record the caller just resolved has vanished mid-operation.
    UserMissing(String),
    /// Persisted state that violates model invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::UserMissing(channel_id) => {
                write!(f, "user not found for channel id `{channel_id}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::UserMissing(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}
