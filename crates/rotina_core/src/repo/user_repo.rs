//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Resolve channel identities to user records.
//! - Create users in the not-yet-consented state.
//! - Flip the opt-in flag.
//!
//! # Invariants
//! - `channel_id` is unique; creation of a duplicate identity is a DB error.
//! - New users always start with `opted_in = false`.

use crate::model::user::User;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    channel_id,
    contact,
    opted_in,
    created_at,
    updated_at
FROM users";

/// Repository interface for user lookup and consent mutation.
pub trait UserRepository {
    fn find_by_channel_id(&self, channel_id: &str) -> RepoResult<Option<User>>;
    fn create(&self, channel_id: &str, contact: &str) -> RepoResult<User>;
    fn set_opted_in(&self, channel_id: &str, opted_in: bool) -> RepoResult<User>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn find_by_channel_id(&self, channel_id: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE channel_id = ?1;"),
                [channel_id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn create(&self, channel_id: &str, contact: &str) -> RepoResult<User> {
        self.conn.execute(
            "INSERT INTO users (channel_id, contact, opted_in) VALUES (?1, ?2, 0);",
            params![channel_id, contact],
        )?;

        // Read back through the normal path so callers get exactly what was
        // persisted, defaults included.
        self.find_by_channel_id(channel_id)?
            .ok_or_else(|| RepoError::UserMissing(channel_id.to_string()))
    }

    fn set_opted_in(&self, channel_id: &str, opted_in: bool) -> RepoResult<User> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                opted_in = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE channel_id = ?2;",
            params![i64::from(opted_in), channel_id],
        )?;

        if changed == 0 {
            return Err(RepoError::UserMissing(channel_id.to_string()));
        }

        self.find_by_channel_id(channel_id)?
            .ok_or_else(|| RepoError::UserMissing(channel_id.to_string()))
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        channel_id: row.get("channel_id")?,
        contact: row.get("contact")?,
        opted_in: row.get::<_, i64>("opted_in")? != 0,
        created_at_ms: row.get("created_at")?,
        updated_at_ms: row.get("updated_at")?,
    })
}
