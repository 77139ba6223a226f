//! Record store
//!
//! Member records persisted as documents in the date-partitioned folder
//! tree. Every query is a full directory walk followed by decoding; a
//! document that cannot be read or decoded is skipped, never fatal.

use crate::codec::{CardCodec, RecordCodec};
use crate::paths::{monthly_log_line, validate_id, PathScheme};
use crate::photos::{FolderPhotoStore, PhotoStore};
use crate::scanner::{self, DocumentEntry, DocumentScanner};
use chrono::{Datelike, NaiveDate};
use gym_common::config::{GymConfig, StorageLayout};
use gym_common::{Error, MemberRecord, Result, Status};
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Persistence operations the workflow and callers rely on.
///
/// Implementations must serialize writes per id; the re-admission number
/// is derived from what is already on disk.
pub trait RecordStore: Send + Sync {
    /// Write a new document for `record` and return its location
    fn save(&self, record: &MemberRecord) -> Result<PathBuf>;

    /// Newest document whose file stem equals `id` (trimmed, case-insensitive)
    fn get_latest(&self, id: &str) -> Result<Option<MemberRecord>>;

    /// Newest document per id, kept only if its status is `status`, newest first
    fn list_by_status(&self, status: Status) -> Result<Vec<DecodedDocument>>;

    /// Every document with status Pending, without per-id dedup
    fn list_pending(&self) -> Result<Vec<PendingSummary>>;

    /// Remove every folder named `id`, including re-admission history.
    /// Returns false if nothing matched.
    fn delete(&self, id: &str) -> Result<bool>;
}

/// A document together with the record decoded from it
#[derive(Debug, Clone)]
pub struct DecodedDocument {
    pub entry: DocumentEntry,
    pub record: MemberRecord,
}

/// Row of the pending-approval list
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PendingSummary {
    pub id: String,
    pub name: String,
    pub gender: String,
    pub join_date: Option<NaiveDate>,
    pub path: PathBuf,
}

/// Per-id write serialization within one process.
///
/// An entry lives only while some caller holds or waits on it.
#[derive(Debug, Default)]
pub struct IdLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IdLocks {
    /// Run `f` while holding the lock for `id` (case-insensitive)
    pub fn with_lock<T>(&self, id: &str, f: impl FnOnce() -> T) -> T {
        let key = id.trim().to_lowercase();
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };

        // Map plus our clone: nobody else is waiting
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&key);
        }
        result
    }

    /// Ids with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Document-backed record store rooted at one folder
pub struct FolderStore {
    scheme: PathScheme,
    scanner: DocumentScanner,
    codec: Box<dyn RecordCodec>,
    photos: Box<dyn PhotoStore>,
    locks: IdLocks,
}

impl FolderStore {
    /// Create a store over `root`, creating the folder if needed
    pub fn new(
        root: impl Into<PathBuf>,
        codec: Box<dyn RecordCodec>,
        photos: Box<dyn PhotoStore>,
    ) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            warn!("Cannot create record root {}: {}", root.display(), e);
            Error::StorageUnavailable(root.clone())
        })?;

        let extension = codec.extension().to_string();
        Ok(Self {
            scheme: PathScheme::new(root, extension.clone()),
            scanner: DocumentScanner::new(extension),
            codec,
            photos,
            locks: IdLocks::default(),
        })
    }

    /// Store over the layout's records folder with card documents and folder photos
    pub fn open(layout: &StorageLayout, config: &GymConfig) -> Result<Self> {
        layout.ensure_directories()?;
        Self::new(
            layout.records_dir.clone(),
            Box::new(CardCodec::from_config(config)),
            Box::new(FolderPhotoStore::new(layout.photos_dir.clone())),
        )
    }

    pub fn root(&self) -> &Path {
        self.scheme.root()
    }

    pub fn scheme(&self) -> &PathScheme {
        &self.scheme
    }

    /// Every document under the root
    pub fn documents(&self) -> Result<Vec<DocumentEntry>> {
        self.scanner.scan(self.root())
    }

    /// Documents whose stem satisfies `keep`, without decoding anything
    pub fn documents_matching<F>(&self, keep: F) -> Result<Vec<DocumentEntry>>
    where
        F: Fn(&str) -> bool,
    {
        self.scanner.scan_matching(self.root(), keep)
    }

    /// Decode one document; `None` if it cannot be read
    pub fn read_document(&self, entry: &DocumentEntry) -> Option<MemberRecord> {
        match std::fs::read(&entry.path) {
            Ok(bytes) => {
                let record = self.codec.decode(&bytes, &entry.stem);
                if record.is_none() {
                    debug!("Skipping malformed document {}", entry.path.display());
                }
                record
            }
            Err(e) => {
                debug!("Skipping unreadable document {}: {}", entry.path.display(), e);
                None
            }
        }
    }

    /// Decode many documents in parallel, dropping the unreadable ones.
    /// Output keeps input order.
    pub fn decode_all(&self, entries: Vec<DocumentEntry>) -> Vec<DecodedDocument> {
        entries
            .into_par_iter()
            .filter_map(|entry| {
                self.read_document(&entry)
                    .map(|record| DecodedDocument { entry, record })
            })
            .collect()
    }

    /// Attach the photo path from the photo store, if one exists
    pub fn with_photo(&self, mut record: MemberRecord) -> MemberRecord {
        if let Some(photo) = self.photos.find(&record.id) {
            record.photo_path = Some(photo);
        }
        record
    }

    /// Lines of the month's append log; empty if nothing was saved that month
    pub fn monthly_log(&self, year: i32, month: u32) -> Result<Vec<String>> {
        let path = self.scheme.monthly_log_path(year, month)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Records of members whose primary folder sits under `date`'s day folder.
    ///
    /// Reads the first document (by name) directly inside each member folder;
    /// re-admission subfolders are not visited.
    pub fn members_joined_on(&self, date: NaiveDate) -> Result<Vec<MemberRecord>> {
        let day_dir = self.scheme.day_dir(date);
        let mut member_dirs = match std::fs::read_dir(&day_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect::<Vec<_>>(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        member_dirs.sort();

        let mut records = Vec::new();
        for dir in member_dirs {
            let Some(entry) = self.first_document_in(&dir) else {
                continue;
            };
            if let Some(record) = self.read_document(&entry) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn first_document_in(&self, dir: &Path) -> Option<DocumentEntry> {
        let mut docs: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && self.scheme.is_document(p))
            .collect();
        docs.sort();
        let path = docs.into_iter().next()?;
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        Some(DocumentEntry { path, stem, modified })
    }

    fn append_monthly_log(&self, record: &MemberRecord) -> Result<()> {
        let join_date = record
            .join_date
            .ok_or_else(|| Error::InvalidInput(format!("member {} has no join date", record.id)))?;
        let path = self
            .scheme
            .monthly_log_path(join_date.year(), join_date.month())?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        // One write per line so concurrent appends never interleave
        file.write_all(format!("{}\n", monthly_log_line(record)).as_bytes())?;
        Ok(())
    }
}

impl RecordStore for FolderStore {
    fn save(&self, record: &MemberRecord) -> Result<PathBuf> {
        let id = validate_id(&record.id)?;

        let location = self.locks.with_lock(id, || -> Result<PathBuf> {
            let location = self.scheme.resolve_location(record)?;
            if let Some(parent) = location.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&location, self.codec.encode(record))?;
            Ok(location)
        })?;

        info!(
            member_id = %id,
            status = record.status_label(),
            path = %location.display(),
            "Saved member record"
        );

        // Monthly log failures never fail the save
        if let Err(e) = self.append_monthly_log(record) {
            warn!(member_id = %id, "Failed to append monthly log: {}", e);
        }

        Ok(location)
    }

    fn get_latest(&self, id: &str) -> Result<Option<MemberRecord>> {
        let wanted = id.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(None);
        }

        let entries = self.documents_matching(|stem| stem.to_lowercase() == wanted)?;
        let Some(latest) = scanner::latest(&entries) else {
            return Ok(None);
        };

        Ok(self.read_document(latest).map(|r| self.with_photo(r)))
    }

    fn list_by_status(&self, status: Status) -> Result<Vec<DecodedDocument>> {
        let decoded = self.decode_all(self.documents()?);

        // Newest document per id supersedes older renewals and re-admissions
        let mut newest: HashMap<String, DecodedDocument> = HashMap::new();
        for doc in decoded {
            match newest.entry(doc.record.id.clone()) {
                Entry::Occupied(mut slot) => {
                    if doc.entry.modified > slot.get().entry.modified {
                        slot.insert(doc);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(doc);
                }
            }
        }

        let mut matching: Vec<DecodedDocument> = newest
            .into_values()
            .filter(|doc| doc.record.status == Some(status))
            .collect();
        matching.sort_by(|a, b| b.entry.modified.cmp(&a.entry.modified));

        debug!(status = %status, count = matching.len(), "Listed members by status");
        Ok(matching)
    }

    fn list_pending(&self) -> Result<Vec<PendingSummary>> {
        let pending = self
            .decode_all(self.documents()?)
            .into_iter()
            .filter(|doc| doc.record.status == Some(Status::Pending))
            .map(|doc| PendingSummary {
                id: doc.record.id,
                name: doc.record.name,
                gender: doc.record.gender,
                join_date: doc.record.join_date,
                path: doc.entry.path,
            })
            .collect();
        Ok(pending)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let id = validate_id(id)?;

        self.locks.with_lock(id, || -> Result<bool> {
            let mut deleted = false;
            for folder in self.scanner.directories_named(self.root(), id)? {
                match std::fs::remove_dir_all(&folder) {
                    Ok(()) => {
                        info!(member_id = %id, path = %folder.display(), "Deleted member folder");
                        deleted = true;
                    }
                    Err(e) => warn!("Error deleting folder {}: {}", folder.display(), e),
                }
            }
            Ok(deleted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::NoPhotos;
    use gym_common::Package;

    fn store(root: &Path) -> FolderStore {
        FolderStore::new(root, Box::new(CardCodec::default()), Box::new(NoPhotos)).unwrap()
    }

    fn member(id: &str) -> MemberRecord {
        MemberRecord::new(id, "Noor", NaiveDate::from_ymd_opt(2025, 2, 14).unwrap())
            .with_membership(1, Package::Silver, Status::Active)
            .unwrap()
    }

    #[test]
    fn test_id_locks_released_after_use() {
        let locks = IdLocks::default();
        let value = locks.with_lock("G-1", || {
            locks.with_lock("G-2", || {
                assert_eq!(locks.len(), 2);
                7
            })
        });
        assert_eq!(value, 7);
        assert!(locks.is_empty());
    }

    #[test]
    fn test_id_locks_entry_lives_while_held() {
        let locks = Arc::new(IdLocks::default());
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let holder = {
            let locks = Arc::clone(&locks);
            std::thread::spawn(move || {
                locks.with_lock("G-1", || {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                })
            })
        };
        entered_rx.recv().unwrap();
        assert_eq!(locks.len(), 1);

        release_tx.send(()).unwrap();
        holder.join().unwrap();
        assert!(locks.is_empty());
        assert_eq!(locks.with_lock(" g-1 ", || 3), 3);
        assert!(locks.is_empty());
    }

    #[test]
    fn test_save_rejects_invalid_id() {
        let root = tempfile::tempdir().unwrap();
        let result = store(root.path()).save(&member("../escape"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_monthly_log_missing_is_empty() {
        let root = tempfile::tempdir().unwrap();
        assert!(store(root.path()).monthly_log(2025, 2).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_document_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let entry = DocumentEntry {
            path: root.path().join("missing.card"),
            stem: "missing".to_string(),
            modified: std::time::SystemTime::now(),
        };
        assert!(store.read_document(&entry).is_none());
        assert!(store.decode_all(vec![entry]).is_empty());
    }
}
