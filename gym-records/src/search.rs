//! Search engine
//!
//! Resolves a free-text query (id fragment or name fragment) to the full
//! candidate set plus one best record. Two passes:
//!
//! 1. **Filename pass**: stems containing the query. Cheap, no decoding.
//! 2. **Content pass**: only when the filename pass is empty; decodes every
//!    document and matches on the member name.
//!
//! The best record is always the most recently modified candidate.

use crate::scanner;
use crate::store::FolderStore;
use gym_common::{MemberRecord, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Which pass produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchPass {
    Filename,
    Content,
}

/// Candidates for one query
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    /// Every matching document, in scan order
    pub matches: Vec<PathBuf>,
    /// Decoded newest candidate, with photo attached
    pub best: Option<MemberRecord>,
    pub pass: Option<MatchPass>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Query engine over a folder store
pub struct SearchEngine<'a> {
    store: &'a FolderStore,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a FolderStore) -> Self {
        Self { store }
    }

    pub fn search(&self, query: &str) -> Result<SearchResult> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(SearchResult::default());
        }

        // 1. Filename pass
        let by_name = self
            .store
            .documents_matching(|stem| stem.to_lowercase().contains(&needle))?;

        if !by_name.is_empty() {
            let best = scanner::latest(&by_name)
                .and_then(|entry| self.store.read_document(entry))
                .map(|record| self.store.with_photo(record));

            tracing::debug!(query = %needle, matches = by_name.len(), "Filename pass matched");
            return Ok(SearchResult {
                matches: by_name.into_iter().map(|e| e.path).collect(),
                best,
                pass: Some(MatchPass::Filename),
            });
        }

        // 2. Content pass
        let by_content: Vec<_> = self
            .store
            .decode_all(self.store.documents()?)
            .into_iter()
            .filter(|doc| doc.record.name.to_lowercase().contains(&needle))
            .collect();

        if by_content.is_empty() {
            tracing::debug!(query = %needle, "No matches");
            return Ok(SearchResult::default());
        }

        let best = by_content
            .iter()
            .reduce(|best, doc| {
                if doc.entry.modified > best.entry.modified {
                    doc
                } else {
                    best
                }
            })
            .map(|doc| self.store.with_photo(doc.record.clone()));

        tracing::debug!(query = %needle, matches = by_content.len(), "Content pass matched");
        Ok(SearchResult {
            matches: by_content.into_iter().map(|doc| doc.entry.path).collect(),
            best,
            pass: Some(MatchPass::Content),
        })
    }
}
