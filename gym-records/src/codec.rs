//! Record codec
//!
//! A member document is a fixed-layout text card. The card *is* the
//! database row: every lookup re-decodes it, so decoding must tolerate
//! hand edits and partial corruption without ever failing outright.
//!
//! Layout:
//!
//! ```text
//! SOLID GYM (G-104)
//!
//! Id: G-104
//! Name: Sara Khan
//! Phone: 0300-1234567
//! Blood: O+
//! Gender: Female
//! Cnic: 35202-1234567-8
//! Join Date: 05/11/2025
//! Membership: 3 months
//! Package: Gold
//! End Date: 2026-02-05
//! Status: Active
//!
//! Created by: Admin
//! ```
//!
//! The membership block (last four field lines) is written only when the
//! record carries a membership duration.

use chrono::NaiveDate;
use gym_common::config::GymConfig;
use gym_common::{MemberRecord, Package, Status};

/// File extension of member cards
pub const CARD_EXTENSION: &str = "card";

/// Field labels of the profile block, in write order. Matched case-insensitively.
const PROFILE_LABELS: [&str; 6] = ["Id", "Name", "Phone", "Blood", "Gender", "Cnic"];

const JOIN_DATE_LABEL: &str = "Join Date";
const MEMBERSHIP_LABEL: &str = "Membership";
const PACKAGE_LABEL: &str = "Package";
const END_DATE_LABEL: &str = "End Date";
const STATUS_LABEL: &str = "Status";

const END_DATE_FORMAT: &str = "%Y-%m-%d";
const MISSING: &str = "N/A";

/// Encodes records into document bytes and decodes them back.
///
/// `decode` returns `None` only when the bytes are not a document of this
/// codec at all; any readable document yields a best-effort record.
pub trait RecordCodec: Send + Sync {
    /// File extension (without dot) of documents this codec writes
    fn extension(&self) -> &str;

    fn encode(&self, record: &MemberRecord) -> Vec<u8>;

    /// `stem` is the document's file name without extension; it becomes the
    /// id when the document carries none.
    fn decode(&self, bytes: &[u8], stem: &str) -> Option<MemberRecord>;
}

/// Plain-text member card codec
#[derive(Debug, Clone)]
pub struct CardCodec {
    gym_name: String,
    creator: String,
}

impl CardCodec {
    pub fn new(gym_name: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            gym_name: gym_name.into(),
            creator: creator.into(),
        }
    }

    pub fn from_config(config: &GymConfig) -> Self {
        Self::new(config.gym_name.clone(), config.creator.clone())
    }
}

impl Default for CardCodec {
    fn default() -> Self {
        Self::from_config(&GymConfig::default())
    }
}

impl RecordCodec for CardCodec {
    fn extension(&self) -> &str {
        CARD_EXTENSION
    }

    fn encode(&self, record: &MemberRecord) -> Vec<u8> {
        let mut lines = Vec::with_capacity(16);
        lines.push(format!("{} ({})", self.gym_name, one_line(&record.id)));
        lines.push(String::new());

        let profile = [
            &record.id,
            &record.name,
            &record.phone,
            &record.blood_type,
            &record.gender,
            &record.national_id,
        ];
        for (label, value) in PROFILE_LABELS.iter().zip(profile) {
            lines.push(format!("{}: {}", label, one_line(value)));
        }

        let join_date = match record.join_date {
            Some(d) => d.format("%d/%m/%Y").to_string(),
            None => "00/00/0".to_string(),
        };
        lines.push(format!("{}: {}", JOIN_DATE_LABEL, join_date));

        if let Some(months) = record.membership_months {
            lines.push(format!("{}: {} months", MEMBERSHIP_LABEL, months));
            lines.push(format!(
                "{}: {}",
                PACKAGE_LABEL,
                record.package.unwrap_or_default()
            ));
            let end_date = record
                .end_date
                .map(|d| d.format(END_DATE_FORMAT).to_string())
                .unwrap_or_else(|| MISSING.to_string());
            lines.push(format!("{}: {}", END_DATE_LABEL, end_date));
            lines.push(format!("{}: {}", STATUS_LABEL, record.status_label()));
        }

        lines.push(String::new());
        lines.push(format!("Created by: {}", self.creator));
        lines.push(String::new());

        lines.join("\n").into_bytes()
    }

    fn decode(&self, bytes: &[u8], stem: &str) -> Option<MemberRecord> {
        Some(decode_text(&String::from_utf8_lossy(bytes), stem))
    }
}

/// Decode card text into a record.
///
/// Unknown lines are ignored; a line whose value does not parse leaves that
/// one field at its default. The last occurrence of a label wins.
pub fn decode_text(text: &str, stem: &str) -> MemberRecord {
    let mut record = MemberRecord::default();

    for raw in text.lines() {
        let line = raw.trim_start();

        for label in PROFILE_LABELS {
            if let Some(value) = labeled_value(line, label, true) {
                *profile_field(&mut record, label) = value.to_string();
            }
        }

        if let Some(value) = labeled_value(line, PACKAGE_LABEL, false) {
            if let Ok(package) = value.parse::<Package>() {
                record.package = Some(package);
            }
        }

        if let Some(value) = labeled_value(line, JOIN_DATE_LABEL, false) {
            if let Some(date) = parse_join_date(value) {
                record.join_date = Some(date);
            }
        }

        if let Some(value) = labeled_value(line, MEMBERSHIP_LABEL, false) {
            let months = value
                .split_whitespace()
                .next()
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|&n| n > 0);
            if let Some(months) = months {
                record.membership_months = Some(months);
            }
        }

        if let Some(value) = labeled_value(line, END_DATE_LABEL, false) {
            if let Ok(date) = NaiveDate::parse_from_str(value, END_DATE_FORMAT) {
                record.end_date = Some(date);
            }
        }

        if let Some(value) = labeled_value(line, STATUS_LABEL, false) {
            if let Ok(status) = value.parse::<Status>() {
                record.status = Some(status);
            }
        }
    }

    if record.id.is_empty() {
        record.id = stem.to_string();
    }

    record
}

/// Value of a `"<label>: <value>"` line, trimmed; `None` if the line has a different label.
fn labeled_value<'a>(line: &'a str, label: &str, ignore_case: bool) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    let matches = if ignore_case {
        head.eq_ignore_ascii_case(label)
    } else {
        head == label
    };
    if !matches {
        return None;
    }
    line[label.len()..].strip_prefix(':').map(str::trim)
}

fn profile_field<'a>(record: &'a mut MemberRecord, label: &str) -> &'a mut String {
    match label {
        "Id" => &mut record.id,
        "Name" => &mut record.name,
        "Phone" => &mut record.phone,
        "Blood" => &mut record.blood_type,
        "Gender" => &mut record.gender,
        _ => &mut record.national_id,
    }
}

/// `dd/mm/yyyy`
fn parse_join_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.split('/').map(|p| p.trim().parse::<u32>());
    let day = parts.next()?.ok()?;
    let month = parts.next()?.ok()?;
    let year = parts.next()?.ok()?;
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Field values are single lines; embedded line breaks would split a field in two.
pub(crate) fn one_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> MemberRecord {
        let mut record = MemberRecord::new("G-104", "Sara Khan", date(2025, 11, 5))
            .with_membership(3, Package::Gold, Status::Active)
            .unwrap();
        record.phone = "0300-1234567".to_string();
        record.blood_type = "O+".to_string();
        record.gender = "Female".to_string();
        record.national_id = "35202-1234567-8".to_string();
        record
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let codec = CardCodec::default();
        let record = sample();

        let decoded = codec.decode(&codec.encode(&record), "ignored").unwrap();

        assert_eq!(decoded, record);
    }

    #[test]
    fn test_encode_layout() {
        let codec = CardCodec::new("IRON HOUSE", "Front Desk");
        let text = String::from_utf8(codec.encode(&sample())).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "IRON HOUSE (G-104)");
        assert_eq!(lines[2], "Id: G-104");
        assert_eq!(lines[7], "Cnic: 35202-1234567-8");
        assert_eq!(lines[8], "Join Date: 05/11/2025");
        assert_eq!(lines[9], "Membership: 3 months");
        assert_eq!(lines[10], "Package: Gold");
        assert_eq!(lines[11], "End Date: 2026-02-05");
        assert_eq!(lines[12], "Status: Active");
        assert!(text.contains("Created by: Front Desk"));
    }

    #[test]
    fn test_membership_block_omitted_without_duration() {
        let codec = CardCodec::default();
        let record = MemberRecord::new("G-1", "Bilal", date(2025, 1, 2));
        let text = String::from_utf8(codec.encode(&record)).unwrap();

        assert!(text.contains("Join Date: 02/01/2025"));
        assert!(!text.contains("Membership:"));
        assert!(!text.contains("Status:"));

        let decoded = decode_text(&text, "G-1");
        assert_eq!(decoded.membership_months, None);
        assert_eq!(decoded.status, None);
    }

    #[test]
    fn test_profile_labels_are_case_insensitive() {
        let decoded = decode_text("ID: g-7\nNAME: Omar\ncnic: 111\n", "stem");
        assert_eq!(decoded.id, "g-7");
        assert_eq!(decoded.name, "Omar");
        assert_eq!(decoded.national_id, "111");
    }

    #[test]
    fn test_membership_labels_are_case_sensitive() {
        let decoded = decode_text("status: Active\nSTATUS: Banned\nPackage: Silver\n", "x");
        assert_eq!(decoded.status, None);
        assert_eq!(decoded.package, Some(Package::Silver));
    }

    #[test]
    fn test_status_value_is_case_insensitive() {
        let decoded = decode_text("Status: BANNED\n", "x");
        assert_eq!(decoded.status, Some(Status::Banned));
    }

    #[test]
    fn test_missing_id_falls_back_to_stem() {
        let decoded = decode_text("Name: Ayesha\n", "G-55");
        assert_eq!(decoded.id, "G-55");

        let decoded = decode_text("Id:   \nName: Ayesha\n", "G-56");
        assert_eq!(decoded.id, "G-56");
    }

    #[test]
    fn test_bad_lines_skip_only_their_field() {
        let text = "Id: G-9\n\
                    Join Date: 31/02/2025\n\
                    Membership: many months\n\
                    End Date: someday\n\
                    Package: Diamond\n\
                    Status: Frozen\n\
                    Name: Hamza\n";
        let decoded = decode_text(text, "G-9");

        assert_eq!(decoded.id, "G-9");
        assert_eq!(decoded.name, "Hamza");
        assert_eq!(decoded.join_date, None);
        assert_eq!(decoded.membership_months, None);
        assert_eq!(decoded.end_date, None);
        assert_eq!(decoded.package, None);
        assert_eq!(decoded.status, None);
    }

    #[test]
    fn test_value_split_on_first_colon_only() {
        let decoded = decode_text("Name: Dr: Who\n", "x");
        assert_eq!(decoded.name, "Dr: Who");
    }

    #[test]
    fn test_header_and_footer_are_not_fields() {
        let decoded = decode_text("SOLID GYM (G-3)\nCreated by: Admin\n", "G-3");
        assert_eq!(decoded.id, "G-3");
        assert_eq!(decoded.name, "");
    }

    #[test]
    fn test_not_available_placeholders_decode_to_absent() {
        let decoded = decode_text("Membership: 2 months\nEnd Date: N/A\nStatus: N/A\n", "x");
        assert_eq!(decoded.membership_months, Some(2));
        assert_eq!(decoded.end_date, None);
        assert_eq!(decoded.status, None);
    }

    #[test]
    fn test_invalid_utf8_still_decodes() {
        let codec = CardCodec::default();
        let mut bytes = b"Id: G-1\nName: Zain\n".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE, b'\n']);

        let decoded = codec.decode(&bytes, "G-1").unwrap();
        assert_eq!(decoded.name, "Zain");
    }

    #[test]
    fn test_newlines_in_values_are_flattened() {
        let codec = CardCodec::default();
        let mut record = sample();
        record.name = "Sara\nKhan".to_string();

        let decoded = codec.decode(&codec.encode(&record), "G-104").unwrap();
        assert_eq!(decoded.name, "Sara Khan");
    }
}
