//! Attendance log
//!
//! Append-only check-in events. Timestamps are returned as stored text;
//! parsing (and skipping rows that do not parse) is the reader's concern.

use crate::Result;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Timestamp format of `attendance.check_in_time`
pub const CHECK_IN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One check-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub member_id: String,
    pub check_in_time: String,
}

impl AttendanceEvent {
    pub fn new(member_id: impl Into<String>, check_in_time: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            check_in_time: check_in_time.into(),
        }
    }

    /// Parsed timestamp, `None` when the stored text is malformed
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.check_in_time.trim(), CHECK_IN_FORMAT).ok()
    }
}

/// Record a check-in at the current local time
pub async fn mark_attendance(pool: &SqlitePool, member_id: &str) -> Result<()> {
    let now = Local::now().naive_local();
    record_attendance(pool, member_id, now).await
}

/// Record a check-in at an explicit time
pub async fn record_attendance(
    pool: &SqlitePool,
    member_id: &str,
    at: NaiveDateTime,
) -> Result<()> {
    sqlx::query("INSERT INTO attendance (member_id, check_in_time) VALUES (?, ?)")
        .bind(member_id)
        .bind(at.format(CHECK_IN_FORMAT).to_string())
        .execute(pool)
        .await?;

    tracing::debug!(member_id = %member_id, "Recorded check-in");
    Ok(())
}

/// Most recent check-ins, newest first
pub async fn recent_attendance(pool: &SqlitePool, limit: i64) -> Result<Vec<AttendanceEvent>> {
    let rows: Vec<(String, Option<String>)> = sqlx::query_as(
        "SELECT member_id, check_in_time FROM attendance ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(into_event).collect())
}

/// Full attendance history in insertion order
pub async fn all_attendance(pool: &SqlitePool) -> Result<Vec<AttendanceEvent>> {
    let rows: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT member_id, check_in_time FROM attendance ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(into_event).collect())
}

fn into_event((member_id, check_in_time): (String, Option<String>)) -> AttendanceEvent {
    AttendanceEvent {
        member_id,
        check_in_time: check_in_time.unwrap_or_default(),
    }
}
