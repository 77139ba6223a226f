//! # gym-records
//!
//! Document-backed member store for a gym front desk.
//!
//! Every member record is a small text document filed under
//! `<root>/<year>/<MonthName>/<dd>/<id>/`. There is no index: lookups and
//! listings walk the folder tree and decode what they find, tolerating
//! partial or damaged documents.
//!
//! - [`codec`]: document encode/decode
//! - [`paths`]: record to location mapping, re-admission numbering
//! - [`store`]: save, latest-by-id, listings, delete
//! - [`search`] and [`access`]: two-pass search and the viewer gate
//! - [`workflow`]: approve, reject, ban, renew
//! - [`analytics`]: peak hours and churn risk from the attendance ledger
//! - [`reports`]: daily brief and text listings
//! - [`worker`]: async facade running store calls on the blocking pool

pub mod access;
pub mod analytics;
pub mod codec;
pub mod paths;
pub mod photos;
pub mod reports;
pub mod scanner;
pub mod search;
pub mod store;
pub mod worker;
pub mod workflow;

pub use store::{FolderStore, RecordStore};
pub use worker::RecordService;
