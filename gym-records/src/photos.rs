//! Member photo store
//!
//! Photos live in one flat folder, named by member id with any image
//! extension. Records never embed the photo; lookups attach its path.

use gym_common::Result;
use std::path::{Path, PathBuf};

/// Extensions tried before falling back to a full folder scan
const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "png", "jpeg", "bmp"];

/// Lookup of a member's photo by id
pub trait PhotoStore: Send + Sync {
    fn find(&self, member_id: &str) -> Option<PathBuf>;
}

/// Photos stored as `<dir>/<id>.<ext>`
#[derive(Debug, Clone)]
pub struct FolderPhotoStore {
    dir: PathBuf,
}

impl FolderPhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the store as `<id>.<ext>`, keeping its extension.
    ///
    /// A source that already is the stored file is left alone.
    pub fn import(&self, member_id: &str, source: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpg".to_string());
        let dest = self.dir.join(format!("{}.{}", member_id.trim(), ext));

        let same_file = match (source.canonicalize(), dest.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_file {
            std::fs::copy(source, &dest)?;
            tracing::info!(member_id = %member_id, dest = %dest.display(), "Imported member photo");
        }

        Ok(dest)
    }
}

impl PhotoStore for FolderPhotoStore {
    fn find(&self, member_id: &str) -> Option<PathBuf> {
        let id = member_id.trim();
        if id.is_empty() || !self.dir.is_dir() {
            return None;
        }

        // 1. Exact name with common extensions
        for ext in PHOTO_EXTENSIONS {
            let candidate = self.dir.join(format!("{}.{}", id, ext));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        // 2. Case-insensitive stem match, any extension
        let entries = std::fs::read_dir(&self.dir).ok()?;
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|path| {
                path.is_file()
                    && path
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().eq_ignore_ascii_case(id))
                        .unwrap_or(false)
            })
    }
}

/// Store without photos; every lookup misses
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPhotos;

impl PhotoStore for NoPhotos {
    fn find(&self, _member_id: &str) -> Option<PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_exact_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("G-1.png"), [1u8]).unwrap();

        let store = FolderPhotoStore::new(dir.path());
        assert_eq!(store.find("G-1"), Some(dir.path().join("G-1.png")));
        assert_eq!(store.find(" G-1 "), Some(dir.path().join("G-1.png")));
    }

    #[test]
    fn test_find_case_insensitive_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("g-7.WEBP"), [1u8]).unwrap();

        let store = FolderPhotoStore::new(dir.path());
        assert_eq!(store.find("G-7"), Some(dir.path().join("g-7.WEBP")));
        assert_eq!(store.find("G-8"), None);
    }

    #[test]
    fn test_find_without_folder() {
        let store = FolderPhotoStore::new("/nonexistent/photos");
        assert_eq!(store.find("G-1"), None);
    }

    #[test]
    fn test_import_copies_with_member_name() {
        let src_dir = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("camera_0001.JPG");
        fs::write(&source, [9u8, 9, 9]).unwrap();

        let store = FolderPhotoStore::new(store_dir.path().join("Member Photos"));
        let dest = store.import("G-3", &source).unwrap();

        assert_eq!(dest, store.dir().join("G-3.jpg"));
        assert_eq!(fs::read(&dest).unwrap(), vec![9u8, 9, 9]);
        assert_eq!(store.find("G-3"), Some(dest.clone()));

        // Importing the stored file again is a no-op
        assert_eq!(store.import("G-3", &dest).unwrap(), dest);
    }
}
