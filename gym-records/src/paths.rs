//! Path scheme
//!
//! Maps a record to its document location:
//!
//! ```text
//! <root>/<year>/<MonthName>/<dd>/<id>/[ReAdmission_<n>/]<id>.<ext>
//! <root>/<year>/<MonthName>/monthly_members.txt
//! ```
//!
//! Re-admission numbering is derived from the folder contents at write time,
//! never stored. Callers must serialize writes per id (see
//! [`crate::store::IdLocks`]); two writers racing on one id folder can pick
//! the same number.

use crate::codec::one_line;
use chrono::{Datelike, NaiveDate};
use gym_common::time::month_name;
use gym_common::{Error, MemberRecord, Result};
use std::path::{Path, PathBuf};

/// Prefix of re-admission subfolders (`ReAdmission_1`, `ReAdmission_2`, ...)
pub const READMISSION_PREFIX: &str = "ReAdmission_";

/// Per-month append log of every save
pub const MONTHLY_LOG_NAME: &str = "monthly_members.txt";

/// Deterministic record → location mapping under one root
#[derive(Debug, Clone)]
pub struct PathScheme {
    root: PathBuf,
    extension: String,
}

impl PathScheme {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `<root>/<year>/<MonthName>`
    pub fn month_dir(&self, year: i32, month: u32) -> Result<PathBuf> {
        let name = month_name(month)
            .ok_or_else(|| Error::InvalidInput(format!("month out of range: {}", month)))?;
        Ok(self.root.join(year.to_string()).join(name))
    }

    /// `<root>/<year>/<MonthName>/<dd>`
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        // month() of a valid NaiveDate is always 1..=12
        let month = month_name(date.month()).unwrap_or("Unknown");
        self.root
            .join(date.year().to_string())
            .join(month)
            .join(format!("{:02}", date.day()))
    }

    /// Primary id folder of a record: `<day_dir>/<id>`
    pub fn member_dir(&self, record: &MemberRecord) -> Result<PathBuf> {
        let id = validate_id(&record.id)?;
        let join_date = record.join_date.ok_or_else(|| {
            Error::InvalidInput(format!("member {} has no join date", id))
        })?;
        Ok(self.day_dir(join_date).join(id))
    }

    /// Document file name for an id
    pub fn document_name(&self, id: &str) -> String {
        format!("{}.{}", id.trim(), self.extension)
    }

    /// True if `path` has this scheme's document extension (case-insensitive)
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    /// Where the next document for `record` goes.
    ///
    /// If the id folder already holds a document directly, the record is a
    /// re-admission and goes into `ReAdmission_<n>`, where `n` is the number
    /// of existing subfolders plus one. Reads the filesystem; creates nothing.
    pub fn resolve_location(&self, record: &MemberRecord) -> Result<PathBuf> {
        let base = self.member_dir(record)?;
        let file_name = self.document_name(&record.id);

        if !self.has_document(&base)? {
            return Ok(base.join(file_name));
        }

        let existing = count_subfolders(&base)?;
        let readmission = base.join(format!("{}{}", READMISSION_PREFIX, existing + 1));
        Ok(readmission.join(file_name))
    }

    /// `<root>/<year>/<MonthName>/monthly_members.txt`
    pub fn monthly_log_path(&self, year: i32, month: u32) -> Result<PathBuf> {
        Ok(self.month_dir(year, month)?.join(MONTHLY_LOG_NAME))
    }

    fn has_document(&self, dir: &Path) -> Result<bool> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() && self.is_document(&entry.path()) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Monthly log line: `"{id} — {name} — {dd}/{mm}/{yyyy} — {status}"`
pub fn monthly_log_line(record: &MemberRecord) -> String {
    let date = record
        .join_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "00/00/0".to_string());
    format!(
        "{} — {} — {} — {}",
        one_line(record.id.trim()),
        one_line(&record.name),
        date,
        record.status_label()
    )
}

/// An id must name exactly one folder: non-empty, no separators, not `.`/`..`.
pub fn validate_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(Error::InvalidInput(format!("invalid member id '{}'", id)));
    }
    Ok(id)
}

fn count_subfolders(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        if entry?.file_type()?.is_dir() {
            count += 1;
        }
    }
    Ok(count)
}
