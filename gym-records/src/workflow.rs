//! Status workflow
//!
//! Membership lifecycle on top of a [`RecordStore`]. Documents are never
//! edited in place: every transition reads the latest record for the id and
//! saves a full rewrite, which lands either in a new day folder or in the
//! next `ReAdmission_N` folder.
//!
//! ```text
//! Pending --approve--> Active --ban--> Banned
//!    |                  ^  |
//!    reject (delete)    |  (end date passes: reads as Expired)
//!                       |  v
//!                  renew from any status
//! ```

use crate::paths::validate_id;
use crate::store::RecordStore;
use chrono::{Duration, NaiveDate};
use gym_common::{Error, MemberRecord, Package, Result, Status};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Parameters of a renewal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalRequest {
    /// New join date; the end date is computed from it
    pub start_date: NaiveDate,
    pub months: u32,
    /// Package for the new term; `None` keeps the current one
    pub package: Option<Package>,
}

/// Result of one applied transition
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub member_id: String,
    pub old_status: Option<Status>,
    pub new_status: Status,
    /// The rewritten record
    pub record: MemberRecord,
    /// Location of the new document
    pub location: PathBuf,
}

/// Lifecycle operations over a record store
pub struct StatusWorkflow<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> StatusWorkflow<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Pending -> Active
    pub fn approve(&self, id: &str) -> Result<Transition> {
        let record = self.require(id)?;
        expect_pending(&record, "approve")?;
        self.rewrite_status(record, Status::Active)
    }

    /// Delete a Pending member's whole folder tree
    ///
    /// Folders are matched by the requested id, not the id inside the document.
    pub fn reject(&self, id: &str) -> Result<()> {
        let id = validate_id(id)?;
        let record = self.require(id)?;
        expect_pending(&record, "reject")?;

        if !self.store.delete(id)? {
            return Err(Error::NotFound(format!("no folder for member {}", id)));
        }
        info!(member_id = %id, "Rejected pending member");
        Ok(())
    }

    /// Any status -> Banned
    pub fn ban(&self, id: &str) -> Result<Transition> {
        let record = self.require(id)?;
        self.rewrite_status(record, Status::Banned)
    }

    /// Start a new term from the request, forcing Active
    pub fn renew(&self, id: &str, request: &RenewalRequest) -> Result<Transition> {
        let mut record = self.require(id)?;
        let old_status = record.status;
        let package = request.package.or(record.package).unwrap_or_default();

        record.join_date = Some(request.start_date);
        record.set_membership(request.months, package, Status::Active)?;

        let transition = self.commit(record, old_status, Status::Active)?;
        info!(
            member_id = %transition.member_id,
            months = request.months,
            end_date = ?transition.record.end_date,
            "Renewed membership"
        );
        Ok(transition)
    }

    fn require(&self, id: &str) -> Result<MemberRecord> {
        self.store
            .get_latest(id)?
            .ok_or_else(|| Error::NotFound(format!("member {}", id.trim())))
    }

    fn rewrite_status(&self, mut record: MemberRecord, new_status: Status) -> Result<Transition> {
        let old_status = record.status;

        // Status is only written inside the membership block
        if record.membership_months.is_none() {
            let package = record.package.unwrap_or_default();
            record.set_membership(1, package, new_status)?;
        } else {
            record.status = Some(new_status);
        }
        self.commit(record, old_status, new_status)
    }

    fn commit(
        &self,
        record: MemberRecord,
        old_status: Option<Status>,
        new_status: Status,
    ) -> Result<Transition> {
        let location = self.store.save(&record)?;
        info!(
            member_id = %record.id,
            from = old_status.map(|s| s.as_str()).unwrap_or("N/A"),
            to = %new_status,
            "Member status changed"
        );
        Ok(Transition {
            member_id: record.id.clone(),
            old_status,
            new_status,
            record,
            location,
        })
    }
}

fn expect_pending(record: &MemberRecord, action: &'static str) -> Result<()> {
    if record.status == Some(Status::Pending) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            id: record.id.clone(),
            action,
            current: record.status_label().to_string(),
        })
    }
}

/// Default start of a renewal term.
///
/// The day after the current expiry while the membership is still running
/// (expiry today or later), otherwise today.
pub fn default_renewal_start(current_end: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    match current_end {
        Some(end) if end >= today => end + Duration::days(1),
        _ => today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_renewal_start_running_membership() {
        let today = date(2025, 3, 10);
        assert_eq!(default_renewal_start(Some(date(2025, 3, 20)), today), date(2025, 3, 21));
        assert_eq!(default_renewal_start(Some(today), today), date(2025, 3, 11));
    }

    #[test]
    fn test_default_renewal_start_lapsed_membership() {
        let today = date(2025, 3, 10);
        assert_eq!(default_renewal_start(Some(date(2025, 3, 9)), today), today);
        assert_eq!(default_renewal_start(None, today), today);
    }

    #[test]
    fn test_expect_pending() {
        let mut record = MemberRecord::new("G-1", "Sana", date(2025, 1, 1))
            .with_membership(1, Package::Bronze, Status::Pending)
            .unwrap();
        assert!(expect_pending(&record, "approve").is_ok());

        record.status = Some(Status::Banned);
        let err = expect_pending(&record, "approve").unwrap_err();
        assert_eq!(err.to_string(), "Cannot approve member G-1: status is Banned");
    }
}
