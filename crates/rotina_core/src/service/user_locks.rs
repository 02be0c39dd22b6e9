//! Per-user mutual exclusion for message handling.
//!
//! # Responsibility
//! - Serialize read-modify-write sections for one user without blocking
//!   traffic from other users.
//!
//! # Invariants
//! - One lock per user key; a key's lock is shared by every caller that
//!   uses the same registry instance.
//! - Poisoned locks are recovered, not propagated: a panicked handler must
//!   not wedge a user's conversation forever.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of per-user locks keyed by channel identity.
///
/// Two rapid "concluir tarefa 3" messages from one user serialize through
/// the same lock; messages from distinct users proceed concurrently.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `key`.
    pub fn with<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let user_lock = {
            let mut registry = self
                .locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            registry
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let _guard = user_lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
