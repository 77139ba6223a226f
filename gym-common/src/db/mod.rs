//! Attendance and fee ledgers
//!
//! Both are append-only tables in one SQLite file. The member records
//! themselves never live here; they are documents on disk.

pub mod attendance;
pub mod fees;
pub mod init;

pub use attendance::*;
pub use fees::*;
pub use init::*;
