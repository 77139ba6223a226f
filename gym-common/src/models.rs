//! Member record model

use crate::time;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Lifecycle tag of a member record
///
/// `Expired` is a convention: nothing flips a stored status to it
/// automatically. See [`MemberRecord::effective_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Active,
    Expired,
    Banned,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Active => "Active",
            Status::Expired => "Expired",
            Status::Banned => "Banned",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    /// Case-insensitive; documents in the wild carry both `Banned` and `BANNED`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "active" => Ok(Status::Active),
            "expired" => Ok(Status::Expired),
            "banned" => Ok(Status::Banned),
            other => Err(Error::InvalidInput(format!("unknown status '{}'", other))),
        }
    }
}

/// Membership package tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Package {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Package {
    pub fn as_str(&self) -> &'static str {
        match self {
            Package::Bronze => "Bronze",
            Package::Silver => "Silver",
            Package::Gold => "Gold",
            Package::Platinum => "Platinum",
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Package {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bronze" => Ok(Package::Bronze),
            "silver" => Ok(Package::Silver),
            "gold" => Ok(Package::Gold),
            "platinum" => Ok(Package::Platinum),
            other => Err(Error::InvalidInput(format!("unknown package '{}'", other))),
        }
    }
}

/// One member's profile and subscription snapshot.
///
/// Records are decoded best-effort from documents, so everything beyond the
/// string profile fields is optional. A record freshly built with
/// [`MemberRecord::new`] and [`MemberRecord::with_membership`] has all of
/// them set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub blood_type: String,
    pub gender: String,
    pub national_id: String,
    pub join_date: Option<NaiveDate>,
    pub membership_months: Option<u32>,
    pub package: Option<Package>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<Status>,
    pub photo_path: Option<PathBuf>,
    /// Reserved; carried through unchanged, never populated or read.
    pub fingerprint_data: Option<String>,
}

impl MemberRecord {
    /// Create a record with a join date and no membership block yet
    pub fn new(id: impl Into<String>, name: impl Into<String>, join_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            join_date: Some(join_date),
            ..Default::default()
        }
    }

    /// Attach a membership; the end date is derived from the join date.
    pub fn with_membership(mut self, months: u32, package: Package, status: Status) -> Result<Self> {
        self.set_membership(months, package, status)?;
        Ok(self)
    }

    /// Set duration, package and status, recomputing `end_date`.
    pub fn set_membership(&mut self, months: u32, package: Package, status: Status) -> Result<()> {
        if months == 0 {
            return Err(Error::InvalidInput(
                "membership duration must be at least one month".to_string(),
            ));
        }
        let join_date = self.join_date.ok_or_else(|| {
            Error::InvalidInput(format!("member {} has no join date", self.id))
        })?;
        let end_date = time::add_months(join_date, months).ok_or_else(|| {
            Error::InvalidInput(format!("end date out of range for member {}", self.id))
        })?;

        self.membership_months = Some(months);
        self.package = Some(package);
        self.end_date = Some(end_date);
        self.status = Some(status);
        Ok(())
    }

    /// Status as displayed: an Active record past its end date reads as Expired.
    pub fn effective_status(&self, today: NaiveDate) -> Option<Status> {
        match (self.status, self.end_date) {
            (Some(Status::Active), Some(end)) if end < today => Some(Status::Expired),
            (status, _) => status,
        }
    }

    /// Status label for logs and listings
    pub fn status_label(&self) -> &'static str {
        self.status.map(|s| s.as_str()).unwrap_or("N/A")
    }

    /// Label of [`MemberRecord::effective_status`]; "N/A" when no status was recorded
    pub fn effective_status_label(&self, today: NaiveDate) -> &'static str {
        self.effective_status(today)
            .map(|s| s.as_str())
            .unwrap_or("N/A")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("BANNED".parse::<Status>().unwrap(), Status::Banned);
        assert_eq!(" pending ".parse::<Status>().unwrap(), Status::Pending);
        assert!("frozen".parse::<Status>().is_err());
    }

    #[test]
    fn test_package_parse() {
        assert_eq!("gold".parse::<Package>().unwrap(), Package::Gold);
        assert!("Diamond".parse::<Package>().is_err());
    }

    #[test]
    fn test_with_membership_derives_end_date() {
        let record = MemberRecord::new("G-001", "Ali", date(2025, 1, 31))
            .with_membership(1, Package::Gold, Status::Active)
            .unwrap();
        assert_eq!(record.end_date, Some(date(2025, 2, 28)));
        assert_eq!(record.membership_months, Some(1));
    }

    #[test]
    fn test_with_membership_rejects_zero_months() {
        let result = MemberRecord::new("G-001", "Ali", date(2025, 1, 1))
            .with_membership(0, Package::Bronze, Status::Active);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_effective_status_reads_past_active_as_expired() {
        let record = MemberRecord::new("G-001", "Ali", date(2025, 1, 1))
            .with_membership(1, Package::Bronze, Status::Active)
            .unwrap();
        assert_eq!(record.effective_status(date(2025, 1, 20)), Some(Status::Active));
        assert_eq!(record.effective_status(date(2025, 3, 1)), Some(Status::Expired));
    }

    #[test]
    fn test_effective_status_keeps_banned() {
        let record = MemberRecord::new("G-001", "Ali", date(2020, 1, 1))
            .with_membership(1, Package::Bronze, Status::Banned)
            .unwrap();
        assert_eq!(record.effective_status(date(2025, 1, 1)), Some(Status::Banned));
    }

    #[test]
    fn test_effective_status_label_unknown_is_not_expired() {
        let record = MemberRecord::new("G-002", "Sara", date(2020, 1, 1));
        assert_eq!(record.effective_status_label(date(2025, 1, 1)), "N/A");

        let lapsed = record
            .with_membership(1, Package::Gold, Status::Active)
            .unwrap();
        assert_eq!(lapsed.effective_status_label(date(2025, 1, 1)), "Expired");
    }
}
