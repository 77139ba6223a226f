//! Ledger database tests

use chrono::NaiveDate;
use gym_common::db::{
    all_attendance, fee_logs, init_database, log_fee_update, mark_attendance,
    recent_attendance, record_attendance,
};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ledgers").join("gym_users.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gym_users.db");

    let pool1 = init_database(&db_path).await.unwrap();
    mark_attendance(&pool1, "G-1").await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    let events = all_attendance(&pool2).await.unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_attendance_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("gym_users.db")).await.unwrap();

    let at = NaiveDate::from_ymd_opt(2025, 3, 4)
        .unwrap()
        .and_hms_opt(18, 30, 0)
        .unwrap();
    record_attendance(&pool, "G-1", at).await.unwrap();
    record_attendance(&pool, "G-2", at).await.unwrap();
    mark_attendance(&pool, "G-3").await.unwrap();

    let all = all_attendance(&pool).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].member_id, "G-1");
    assert_eq!(all[0].check_in_time, "2025-03-04 18:30:00");
    assert_eq!(all[0].timestamp(), Some(at));

    let recent = recent_attendance(&pool, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].member_id, "G-3");
    assert_eq!(recent[1].member_id, "G-2");
}

#[tokio::test]
async fn test_fee_logs_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("gym_users.db")).await.unwrap();

    log_fee_update(&pool, "front-desk", "G-1", 3).await.unwrap();
    log_fee_update(&pool, "owner", "G-2", 12).await.unwrap();

    let logs = fee_logs(&pool).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].member_id, "G-2");
    assert_eq!(logs[0].staff_name, "owner");
    assert_eq!(logs[0].months_added, 12);
    assert_eq!(logs[1].months_added, 3);
    assert!(!logs[1].timestamp.is_empty());
}
