//! Conversation orchestration services.
//!
//! # Responsibility
//! - Drive the per-message state machine (consent gate, intent dispatch).
//! - Compose the single outbound reply for each inbound message.
//! - Serialize same-user message handling.

pub mod assistant;
pub mod replies;
pub mod user_locks;
