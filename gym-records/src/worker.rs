//! Async facade over the folder store
//!
//! Every store operation walks the disk, so each call runs on the blocking
//! pool via `tokio::task::spawn_blocking`. A panicking task surfaces as
//! [`Error::Internal`].

use crate::reports::{self, DailyBrief};
use crate::search::{SearchEngine, SearchResult};
use crate::store::{DecodedDocument, FolderStore, PendingSummary, RecordStore};
use crate::workflow::{RenewalRequest, StatusWorkflow, Transition};
use chrono::NaiveDate;
use gym_common::{Error, MemberRecord, Result, Status};
use std::path::PathBuf;
use std::sync::Arc;

/// Cloneable handle for async callers
#[derive(Clone)]
pub struct RecordService {
    store: Arc<FolderStore>,
}

impl RecordService {
    pub fn new(store: FolderStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &FolderStore {
        &self.store
    }

    async fn run<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&FolderStore) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || task(&store))
            .await
            .map_err(|e| Error::Internal(format!("Record task failed: {}", e)))?
    }

    pub async fn save(&self, record: MemberRecord) -> Result<PathBuf> {
        self.run(move |store| store.save(&record)).await
    }

    pub async fn get_latest(&self, id: &str) -> Result<Option<MemberRecord>> {
        let id = id.to_string();
        self.run(move |store| store.get_latest(&id)).await
    }

    pub async fn search(&self, query: &str) -> Result<SearchResult> {
        let query = query.to_string();
        self.run(move |store| SearchEngine::new(store).search(&query))
            .await
    }

    pub async fn list_by_status(&self, status: Status) -> Result<Vec<DecodedDocument>> {
        self.run(move |store| store.list_by_status(status)).await
    }

    pub async fn list_pending(&self) -> Result<Vec<PendingSummary>> {
        self.run(|store| store.list_pending()).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.run(move |store| store.delete(&id)).await
    }

    pub async fn monthly_list(&self, year: i32, month: u32) -> Result<Vec<String>> {
        self.run(move |store| store.monthly_log(year, month)).await
    }

    pub async fn daily_brief(&self, date: NaiveDate) -> Result<DailyBrief> {
        self.run(move |store| reports::daily_brief(store, date))
            .await
    }

    pub async fn approve(&self, id: &str) -> Result<Transition> {
        let id = id.to_string();
        self.run(move |store| StatusWorkflow::new(store).approve(&id))
            .await
    }

    pub async fn reject(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.run(move |store| StatusWorkflow::new(store).reject(&id))
            .await
    }

    pub async fn ban(&self, id: &str) -> Result<Transition> {
        let id = id.to_string();
        self.run(move |store| StatusWorkflow::new(store).ban(&id))
            .await
    }

    pub async fn renew(&self, id: &str, request: RenewalRequest) -> Result<Transition> {
        let id = id.to_string();
        self.run(move |store| StatusWorkflow::new(store).renew(&id, &request))
            .await
    }
}
