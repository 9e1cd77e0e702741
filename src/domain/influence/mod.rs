//! Speaker influence: per-speaker engagement totals, scored and ranked.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

pub mod strategy;

pub use strategy::InfluenceStrategy;

/// Summed engagement of one speaker over the talks that matched the period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementTotals {
    pub speaker_id: i64,
    pub name: String,
    pub total_views: i64,
    pub total_likes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfluenceRow {
    pub speaker_id: i64,
    pub name: String,
    pub total_views: i64,
    pub total_likes: i64,
    #[serde(serialize_with = "score_as_number")]
    #[schema(value_type = f64, example = 730.0)]
    pub score: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MostInfluential {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "score_as_text")]
    #[schema(value_type = String, example = "730.00")]
    pub score: Decimal,
}

/// Scores every speaker and orders by score descending, then speaker id
/// ascending so equal scores come out in a stable order.
pub fn rank(totals: Vec<EngagementTotals>, strategy: InfluenceStrategy) -> Vec<InfluenceRow> {
    let mut rows: Vec<InfluenceRow> = totals
        .into_iter()
        .map(|t| InfluenceRow {
            score: strategy.score(t.total_views, t.total_likes),
            speaker_id: t.speaker_id,
            name: t.name,
            total_views: t.total_views,
            total_likes: t.total_likes,
        })
        .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score).then(a.speaker_id.cmp(&b.speaker_id)));
    rows
}

/// The first entry of [`rank`]'s order, if any.
pub fn most_influential(
    totals: Vec<EngagementTotals>,
    strategy: InfluenceStrategy,
) -> Option<MostInfluential> {
    rank(totals, strategy).into_iter().next().map(|row| MostInfluential {
        id: row.speaker_id,
        name: row.name,
        score: row.score,
    })
}

/// Two decimal places, half-even.
fn two_places(score: Decimal) -> Decimal {
    let mut rounded = score.round_dp(2);
    rounded.rescale(2);
    rounded
}

fn score_as_number<S: Serializer>(score: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(two_places(*score).to_f64().unwrap_or_default())
}

fn score_as_text<S: Serializer>(score: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&two_places(*score))
}
