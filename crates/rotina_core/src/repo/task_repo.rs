//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Own creation, status transition, deletion and windowed retrieval of
//!   tasks, always scoped to one owning user.
//!
//! # Invariants
//! - Listing order is total and stable: due timestamp ascending, tasks
//!   without a due timestamp last, row id ascending as tie-break.
//! - Day windows are half-open: `[start_of_day, start_of_next_day)`.
//! - Ownership is part of every lookup predicate; wrong-owner access is
//!   indistinguishable from an unknown id.

use crate::model::task::{Task, TaskStatus};
use crate::repo::{RepoError, RepoResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    description,
    due_at,
    priority,
    status,
    created_at,
    updated_at
FROM tasks";

/// Stable ordering shared by every listing query.
const TASK_ORDER_SQL: &str = "ORDER BY (due_at IS NULL) ASC, due_at ASC, id ASC";

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Repository interface for the per-user task store.
pub trait TaskRepository {
    fn create(
        &self,
        owner_id: i64,
        description: &str,
        due_at: Option<NaiveDateTime>,
        priority: Option<&str>,
    ) -> RepoResult<Task>;
    fn list_by_status(&self, owner_id: i64, status: TaskStatus) -> RepoResult<Vec<Task>>;
    /// Pending tasks whose due timestamp falls on `date` (half-open window).
    fn list_due_on(&self, owner_id: i64, date: NaiveDate) -> RepoResult<Vec<Task>>;
    fn get(&self, owner_id: i64, task_id: i64) -> RepoResult<Option<Task>>;
    fn set_status(
        &self,
        owner_id: i64,
        task_id: i64,
        status: TaskStatus,
    ) -> RepoResult<Option<Task>>;
    fn delete(&self, owner_id: i64, task_id: i64) -> RepoResult<bool>;
}

/// SQLite-backed task store.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create(
        &self,
        owner_id: i64,
        description: &str,
        due_at: Option<NaiveDateTime>,
        priority: Option<&str>,
    ) -> RepoResult<Task> {
        Task::validate_description(description)?;

        self.conn.execute(
            "INSERT INTO tasks (owner_id, description, due_at, priority, status)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                owner_id,
                description,
                due_at.map(datetime_to_epoch_ms),
                priority,
                status_to_db(TaskStatus::Pending),
            ],
        )?;

        let task_id = self.conn.last_insert_rowid();
        // Read back so a creation that did not persist can never be
        // reported as success.
        self.get(owner_id, task_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created task {task_id} not found in read-back"))
        })
    }

    fn list_by_status(&self, owner_id: i64, status: TaskStatus) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE owner_id = ?1 AND status = ?2
             {TASK_ORDER_SQL};"
        ))?;

        let mut rows = stmt.query(params![owner_id, status_to_db(status)])?;
        collect_tasks(&mut rows)
    }

    fn list_due_on(&self, owner_id: i64, date: NaiveDate) -> RepoResult<Vec<Task>> {
        let day_start = datetime_to_epoch_ms(date.and_time(NaiveTime::MIN));
        let next_day_start = day_start + MS_PER_DAY;

        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE owner_id = ?1
               AND status = ?2
               AND due_at IS NOT NULL
               AND due_at >= ?3
               AND due_at < ?4
             {TASK_ORDER_SQL};"
        ))?;

        let mut rows = stmt.query(params![
            owner_id,
            status_to_db(TaskStatus::Pending),
            day_start,
            next_day_start,
        ])?;
        collect_tasks(&mut rows)
    }

    fn get(&self, owner_id: i64, task_id: i64) -> RepoResult<Option<Task>> {
        let row = self
            .conn
            .query_row(
                &format!("{TASK_SELECT_SQL} WHERE id = ?1 AND owner_id = ?2;"),
                params![task_id, owner_id],
                parse_task_row,
            )
            .optional()?;

        row.transpose()
    }

    fn set_status(
        &self,
        owner_id: i64,
        task_id: i64,
        status: TaskStatus,
    ) -> RepoResult<Option<Task>> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2 AND owner_id = ?3;",
            params![status_to_db(status), task_id, owner_id],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        self.get(owner_id, task_id)
    }

    fn delete(&self, owner_id: i64, task_id: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2;",
            params![task_id, owner_id],
        )?;
        Ok(changed > 0)
    }
}

fn collect_tasks(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Task>> {
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)??);
    }
    Ok(tasks)
}

fn parse_task_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<Task>> {
    let status_text: String = row.get("status")?;
    let due_at_ms: Option<i64> = row.get("due_at")?;

    let Some(status) = parse_status(&status_text) else {
        return Ok(Err(RepoError::InvalidData(format!(
            "invalid task status `{status_text}` in tasks.status"
        ))));
    };

    let due_at = match due_at_ms {
        Some(ms) => match epoch_ms_to_datetime(ms) {
            Some(value) => Some(value),
            None => {
                return Ok(Err(RepoError::InvalidData(format!(
                    "invalid due timestamp `{ms}` in tasks.due_at"
                ))));
            }
        },
        None => None,
    };

    Ok(Ok(Task {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        description: row.get("description")?,
        due_at,
        priority: row.get("priority")?,
        status,
        created_at_ms: row.get("created_at")?,
        updated_at_ms: row.get("updated_at")?,
    }))
}

fn status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Completed => "completed",
        TaskStatus::Cancelled => "cancelled",
    }
}

fn parse_status(value: &str) -> Option<TaskStatus> {
    match value {
        "pending" => Some(TaskStatus::Pending),
        "completed" => Some(TaskStatus::Completed),
        "cancelled" => Some(TaskStatus::Cancelled),
        _ => None,
    }
}

/// Naive local timestamps persist as epoch milliseconds, interpreting the
/// naive value on the UTC timeline; consistent both ways, so comparisons
/// and windows stay correct.
fn datetime_to_epoch_ms(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}

fn epoch_ms_to_datetime(ms: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(ms).map(|value| value.naive_utc())
}
