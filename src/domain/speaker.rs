use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A speaker. `name` is the business key; `id` is assigned on first creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Speaker {
    pub id: i64,
    pub name: String,
}

/// Body for creating or renaming a speaker.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SpeakerPayload {
    pub name: String,
}
