//! Assistant user record.
//!
//! # Invariants
//! - `channel_id` is the opaque messaging-channel identity and never changes.
//! - `opted_in` starts `false` and is the only field mutated after creation.

use serde::{Deserialize, Serialize};

/// A user known to the assistant, keyed by their messaging-channel identity.
///
/// Created on the first inbound message from an unseen identity. Users are
/// never deleted by the core; consent withdrawal only flips `opted_in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned row id, used as the task owner key.
    pub id: i64,
    /// Opaque channel identity (unique per user).
    pub channel_id: String,
    /// Contact address used for outbound delivery.
    pub contact: String,
    /// Consent gate: feature intents are blocked until this is `true`.
    pub opted_in: bool,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    /// Unix epoch milliseconds.
    pub updated_at_ms: i64,
}
