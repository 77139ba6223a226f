//! Attendance analytics
//!
//! Pure functions over attendance events, plus thin async wrappers that
//! read the ledger first. Rows whose timestamp does not parse are ignored.

use chrono::{Local, NaiveDateTime, Timelike};
use gym_common::db::{self, AttendanceEvent};
use gym_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::fmt;

/// Days without a visit above which a member is Medium risk
const MEDIUM_RISK_AFTER_DAYS: i64 = 14;

/// Days without a visit above which a member is High risk
const HIGH_RISK_AFTER_DAYS: i64 = 21;

/// Busiest hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeakHours {
    Peak { hour: u32, visits: usize },
    InsufficientData,
}

impl PeakHours {
    /// "6 PM", "Noon", ... or "Insufficient data"
    pub fn label(&self) -> String {
        match self {
            PeakHours::Peak { hour, .. } => hour_label(*hour),
            PeakHours::InsufficientData => "Insufficient data".to_string(),
        }
    }
}

impl fmt::Display for PeakHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeakHours::Peak { hour, .. } => write!(f, "Peak time is {}.", hour_label(*hour)),
            PeakHours::InsufficientData => write!(f, "Insufficient data"),
        }
    }
}

/// 12-hour clock label with Midnight/Noon for the edges
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "Midnight".to_string(),
        12 => "Noon".to_string(),
        h if h < 12 => format!("{} AM", h),
        h => format!("{} PM", h - 12),
    }
}

/// Most frequent check-in hour. Ties go to the earliest hour.
pub fn predict_peak_hours(events: &[AttendanceEvent]) -> PeakHours {
    let mut histogram = [0usize; 24];
    for ts in events.iter().filter_map(AttendanceEvent::timestamp) {
        histogram[ts.hour() as usize] += 1;
    }

    let mut peak: Option<(u32, usize)> = None;
    for (hour, &visits) in histogram.iter().enumerate() {
        if visits > 0 && peak.map_or(true, |(_, best)| visits > best) {
            peak = Some((hour as u32, visits));
        }
    }

    match peak {
        Some((hour, visits)) => PeakHours::Peak { hour, visits },
        None => PeakHours::InsufficientData,
    }
}

/// Churn classification from days since the last visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChurnRisk {
    Low { days: i64 },
    Medium { days: i64 },
    High { days: i64 },
    /// The member never checked in
    NoHistory,
}

impl ChurnRisk {
    pub fn from_days(days: i64) -> Self {
        if days > HIGH_RISK_AFTER_DAYS {
            ChurnRisk::High { days }
        } else if days > MEDIUM_RISK_AFTER_DAYS {
            ChurnRisk::Medium { days }
        } else {
            ChurnRisk::Low { days }
        }
    }

    pub fn level(&self) -> &'static str {
        match self {
            ChurnRisk::Low { .. } => "Low",
            ChurnRisk::Medium { .. } => "Medium",
            ChurnRisk::High { .. } => "High",
            ChurnRisk::NoHistory => "Unknown",
        }
    }
}

impl fmt::Display for ChurnRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChurnRisk::High { days } => write!(f, "High Risk ({} days absent)", days),
            ChurnRisk::Medium { days } => write!(f, "Medium Risk ({} days absent)", days),
            ChurnRisk::Low { .. } => write!(f, "Low Risk (Active)"),
            ChurnRisk::NoHistory => write!(f, "No attendance history"),
        }
    }
}

/// Churn risk of one member as of `now`.
///
/// Member ids compare trimmed and case-insensitively. A visit later than
/// `now` counts as zero days absent.
pub fn churn_risk(events: &[AttendanceEvent], member_id: &str, now: NaiveDateTime) -> ChurnRisk {
    let wanted = member_id.trim();
    let last_visit = events
        .iter()
        .filter(|e| e.member_id.trim().eq_ignore_ascii_case(wanted))
        .filter_map(AttendanceEvent::timestamp)
        .max();

    match last_visit {
        Some(last) => ChurnRisk::from_days((now - last).num_days().max(0)),
        None => ChurnRisk::NoHistory,
    }
}

/// Peak hours over the whole attendance ledger
pub async fn ledger_peak_hours(pool: &SqlitePool) -> Result<PeakHours> {
    let events = db::all_attendance(pool).await?;
    Ok(predict_peak_hours(&events))
}

/// Churn risk of `member_id` against the ledger, as of now (local time)
pub async fn ledger_churn_risk(pool: &SqlitePool, member_id: &str) -> Result<ChurnRisk> {
    let events = db::all_attendance(pool).await?;
    Ok(churn_risk(&events, member_id, Local::now().naive_local()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> String {
        format!("2025-03-{:02} {:02}:15:00", day, hour)
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 30)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_peak_hour_evening() {
        let events: Vec<_> = [18, 18, 18, 9]
            .iter()
            .map(|&h| AttendanceEvent::new("G-1", at(3, h)))
            .collect();

        let peak = predict_peak_hours(&events);
        assert_eq!(peak, PeakHours::Peak { hour: 18, visits: 3 });
        assert_eq!(peak.label(), "6 PM");
        assert_eq!(peak.to_string(), "Peak time is 6 PM.");
    }

    #[test]
    fn test_peak_hour_tie_goes_to_earliest() {
        let events = vec![
            AttendanceEvent::new("G-1", at(1, 20)),
            AttendanceEvent::new("G-2", at(1, 7)),
        ];
        assert_eq!(predict_peak_hours(&events).label(), "7 AM");
    }

    #[test]
    fn test_peak_hour_insufficient_data() {
        assert_eq!(predict_peak_hours(&[]), PeakHours::InsufficientData);

        let garbage = vec![AttendanceEvent::new("G-1", "not a time")];
        assert_eq!(predict_peak_hours(&garbage), PeakHours::InsufficientData);
        assert_eq!(predict_peak_hours(&garbage).label(), "Insufficient data");
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(0), "Midnight");
        assert_eq!(hour_label(12), "Noon");
        assert_eq!(hour_label(11), "11 AM");
        assert_eq!(hour_label(23), "11 PM");
    }

    #[test]
    fn test_churn_high_after_22_days() {
        let events = vec![AttendanceEvent::new("G-1", "2025-04-08 10:00:00")];
        let risk = churn_risk(&events, "G-1", now());
        assert_eq!(risk, ChurnRisk::High { days: 22 });
        assert_eq!(risk.to_string(), "High Risk (22 days absent)");
    }

    #[test]
    fn test_churn_low_after_10_days() {
        let events = vec![
            AttendanceEvent::new("G-1", "2025-03-01 10:00:00"),
            AttendanceEvent::new("g-1", "2025-04-20 09:00:00"),
        ];
        assert_eq!(churn_risk(&events, " G-1 ", now()), ChurnRisk::Low { days: 10 });
    }

    #[test]
    fn test_churn_boundaries() {
        assert_eq!(ChurnRisk::from_days(14).level(), "Low");
        assert_eq!(ChurnRisk::from_days(15).level(), "Medium");
        assert_eq!(ChurnRisk::from_days(21).level(), "Medium");
        assert_eq!(ChurnRisk::from_days(22).level(), "High");
    }

    #[test]
    fn test_churn_no_history() {
        let events = vec![AttendanceEvent::new("G-2", "2025-04-20 09:00:00")];
        assert_eq!(churn_risk(&events, "G-1", now()), ChurnRisk::NoHistory);
        assert_eq!(churn_risk(&[], "G-1", now()).to_string(), "No attendance history");
    }
}
