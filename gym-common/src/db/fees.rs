//! Fee ledger
//!
//! One row per renewal, written by whoever performs the renewal.

use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// One fee update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEntry {
    pub id: i64,
    pub timestamp: String,
    pub staff_name: String,
    pub member_id: String,
    pub months_added: i64,
}

/// Append a fee update
pub async fn log_fee_update(
    pool: &SqlitePool,
    staff_name: &str,
    member_id: &str,
    months: u32,
) -> Result<()> {
    sqlx::query("INSERT INTO fee_logs (staff_name, member_id, months_added) VALUES (?, ?, ?)")
        .bind(staff_name)
        .bind(member_id)
        .bind(i64::from(months))
        .execute(pool)
        .await?;

    tracing::info!(staff = %staff_name, member_id = %member_id, months, "Logged fee update");
    Ok(())
}

/// All fee updates, newest first
pub async fn fee_logs(pool: &SqlitePool) -> Result<Vec<FeeEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, timestamp, staff_name, member_id, months_added
        FROM fee_logs
        ORDER BY id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| FeeEntry {
            id: row.get("id"),
            timestamp: row.get::<Option<String>, _>("timestamp").unwrap_or_default(),
            staff_name: row.get("staff_name"),
            member_id: row.get("member_id"),
            months_added: row.get("months_added"),
        })
        .collect())
}
