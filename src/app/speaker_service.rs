use crate::app::error::{ServiceError, ServiceResult};
use crate::domain::Speaker;
use crate::storage::paging::{Page, PageRequest};
use crate::storage::SpeakerStore;
use std::sync::Arc;
use tracing::info;

/// Speaker lookups, find-or-create resolution and plain CRUD.
#[derive(Clone)]
pub struct SpeakerService {
    store: Arc<dyn SpeakerStore>,
}

impl SpeakerService {
    pub fn new(store: Arc<dyn SpeakerStore>) -> Self {
        Self { store }
    }

    /// Exact-name resolution; creates the speaker when no such name exists.
    pub async fn find_or_create(&self, name: &str) -> ServiceResult<Speaker> {
        Ok(self.store.find_or_create(name).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Speaker> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Speaker not found: {}", id)))
    }

    pub async fn find_by_name(&self, name: &str) -> ServiceResult<Speaker> {
        self.store
            .find_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Speaker not found: {}", name)))
    }

    pub async fn list(&self, request: &PageRequest) -> ServiceResult<Page<Speaker>> {
        Ok(self.store.list(request).await?)
    }

    pub async fn create(&self, name: &str) -> ServiceResult<Speaker> {
        let name = required_name(name)?;
        let speaker = self.store.insert(name).await?;
        info!(speaker_id = speaker.id, "speaker created");
        Ok(speaker)
    }

    pub async fn update(&self, id: i64, name: &str) -> ServiceResult<Speaker> {
        let name = required_name(name)?;
        self.store
            .rename(id, name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Speaker not found: {}", id)))
    }

    /// Deletes the speaker together with their talks.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.store.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Speaker not found: {}", id)));
        }
        info!(speaker_id = id, "speaker deleted");
        Ok(())
    }
}

fn required_name(name: &str) -> ServiceResult<&str> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "Speaker name cannot be empty".to_string(),
        ));
    }
    Ok(name)
}
