//! Shared fixtures for gym-records integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use gym_common::{MemberRecord, Package, Status};
use gym_records::codec::CardCodec;
use gym_records::photos::{FolderPhotoStore, NoPhotos};
use gym_records::FolderStore;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Fixed base for document mtimes so ordering never depends on the clock
const BASE_SECS: u64 = 1_700_000_000;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Store over `root` without photos
pub fn open_store(root: &Path) -> FolderStore {
    FolderStore::new(root, Box::new(CardCodec::default()), Box::new(NoPhotos)).unwrap()
}

/// Store over `root/records` with photos in `root/photos`
pub fn open_store_with_photos(root: &Path) -> FolderStore {
    FolderStore::new(
        root.join("records"),
        Box::new(CardCodec::default()),
        Box::new(FolderPhotoStore::new(root.join("photos"))),
    )
    .unwrap()
}

pub fn member(id: &str, name: &str, joined: NaiveDate, status: Status) -> MemberRecord {
    let mut record = MemberRecord::new(id, name, joined)
        .with_membership(1, Package::Silver, status)
        .unwrap();
    record.gender = "Male".to_string();
    record.phone = "0300-1234567".to_string();
    record
}

/// Set a document's mtime to `BASE_SECS + offset` seconds
pub fn set_age(path: &Path, offset: u64) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(BASE_SECS + offset))
        .unwrap();
}
