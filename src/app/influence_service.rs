use crate::app::error::ServiceResult;
use crate::domain::influence::{self, InfluenceRow, InfluenceStrategy, MostInfluential};
use crate::storage::EngagementSource;
use std::sync::Arc;

/// Ranks speakers by the configured influence strategy. Read-only.
#[derive(Clone)]
pub struct InfluenceService {
    source: Arc<dyn EngagementSource>,
    strategy: InfluenceStrategy,
}

impl InfluenceService {
    pub fn new(source: Arc<dyn EngagementSource>, strategy: InfluenceStrategy) -> Self {
        Self { source, strategy }
    }

    /// Every speaker with at least one talk in `year` (or at all), best first.
    /// No matching talks is an empty list.
    pub async fn analyze(&self, year: Option<i32>) -> ServiceResult<Vec<InfluenceRow>> {
        let year = year.map(|y| y.to_string());
        let totals = self.source.engagement_totals(year.as_deref()).await?;
        Ok(influence::rank(totals, self.strategy))
    }

    pub async fn most_influential(&self, year: i32) -> ServiceResult<Option<MostInfluential>> {
        let year = year.to_string();
        let totals = self.source.engagement_totals(Some(&year)).await?;
        Ok(influence::most_influential(totals, self.strategy))
    }
}
