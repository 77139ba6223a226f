//! # Gym Common Library
//!
//! Shared code for the gym record manager:
//! - Member record model (status, package, dates)
//! - Calendar helpers (month names, clamped month arithmetic)
//! - Configuration loading and storage layout
//! - Attendance and fee ledgers (SQLite)

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{MemberRecord, Package, Status};
