//! Persistence seams and their backends.
//!
//! Services only see the traits below. `postgres` is the production backend;
//! `memory` keeps everything in process (tests, demos, `STORAGE_BACKEND=memory`).

use crate::domain::influence::EngagementTotals;
use crate::domain::{NewTalk, Speaker, Talk, TalkView, WriteOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod paging;
pub mod postgres;

pub use memory::MemoryCatalog;
pub use paging::{Page, PageRequest, SortSpec};
pub use postgres::PgCatalog;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or reference constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() || db.is_foreign_key_violation() {
                return StoreError::Conflict(db.message().to_string());
            }
        }
        StoreError::Backend(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SpeakerStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Speaker>>;

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Speaker>>;

    /// Exact-name lookup that inserts when absent. Must not create a second
    /// speaker for a name under concurrent callers.
    async fn find_or_create(&self, name: &str) -> StoreResult<Speaker>;

    /// Plain insert; an existing name is a [`StoreError::Conflict`].
    async fn insert(&self, name: &str) -> StoreResult<Speaker>;

    async fn rename(&self, id: i64, name: &str) -> StoreResult<Option<Speaker>>;

    /// Removes the speaker and their talks. `false` if no such speaker.
    async fn delete(&self, id: i64) -> StoreResult<bool>;

    async fn list(&self, request: &PageRequest) -> StoreResult<Page<Speaker>>;
}

#[async_trait]
pub trait TalkStore: Send + Sync {
    /// Inserts unless a talk with the same `(title, speaker_id, date)` exists.
    async fn save_if_absent(&self, talk: &NewTalk) -> StoreResult<WriteOutcome>;

    async fn insert(&self, talk: &NewTalk) -> StoreResult<Talk>;

    async fn update(&self, id: i64, talk: &NewTalk) -> StoreResult<Option<Talk>>;

    async fn delete(&self, id: i64) -> StoreResult<bool>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<TalkView>>;

    async fn list(&self, request: &PageRequest) -> StoreResult<Page<TalkView>>;
}

#[async_trait]
pub trait EngagementSource: Send + Sync {
    /// Per-speaker sums of views and likes, for speakers with at least one
    /// matching talk. `year` compares against the first four characters of
    /// the stored `YYYY-MM` date.
    async fn engagement_totals(&self, year: Option<&str>) -> StoreResult<Vec<EngagementTotals>>;
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;
}

/// One backend seen through every seam.
#[derive(Clone)]
pub struct Storage {
    pub speakers: Arc<dyn SpeakerStore>,
    pub talks: Arc<dyn TalkStore>,
    pub engagement: Arc<dyn EngagementSource>,
    pub health: Arc<dyn HealthProbe>,
}

impl Storage {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: SpeakerStore + TalkStore + EngagementSource + HealthProbe + 'static,
    {
        Self {
            speakers: backend.clone(),
            talks: backend.clone(),
            engagement: backend.clone(),
            health: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryCatalog::new()))
    }
}
