//! Timestamp and calendar utilities

use chrono::{Local, Months, NaiveDate};

/// Full English month names, January first.
///
/// These names are baked into the on-disk folder layout
/// (`<year>/<MonthName>/<day>`), so they must never be localized.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Today's date on the local wall clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Full name of a 1-based month number (`1 -> "January"`).
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Reverse of [`month_name`], case-insensitive (`"march" -> 3`).
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim();
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// Date `months` calendar months after `date`.
///
/// Day overflow clamps to the last valid day of the target month:
/// Jan 31 + 1 month is Feb 28 (or Feb 29 in a leap year).
/// Returns `None` only if the result leaves chrono's representable range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Days remaining from `today` until `end_date`; negative once it has passed.
pub fn days_until(end_date: NaiveDate, today: NaiveDate) -> i64 {
    (end_date - today).num_days()
}
