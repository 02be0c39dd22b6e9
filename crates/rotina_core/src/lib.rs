//! Core domain logic for Rotina, a conversational task/reminder assistant.
//! This crate is the single source of truth for business invariants:
//! intent classification, temporal resolution, the consent gate and the
//! per-user task store.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod nlp;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use gateway::{ConsoleSender, DeliveryError, DeliveryReceipt, MessageSender};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskStatus, TaskValidationError};
pub use model::user::User;
pub use nlp::datetime::{resolve, DueResolution, TokenOutcome};
pub use nlp::intent::{classify, DateFilter, Intent, IntentKind};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::assistant::{Assistant, AssistantError, OutboundResponse};
pub use service::user_locks::UserLocks;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
