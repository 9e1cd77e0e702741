use crate::app::{ImportService, InfluenceService, SpeakerService, TalkService};
use crate::domain::import::ImportFormat;
use crate::domain::influence::InfluenceStrategy;
use crate::infra::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::storage::paging::{PageRequest, SortSpec};
use crate::storage::{HealthProbe, Storage};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub speakers: Arc<SpeakerService>,
    pub talks: Arc<TalkService>,
    pub imports: Arc<ImportService>,
    pub influence: Arc<InfluenceService>,
    pub health: Arc<dyn HealthProbe>,
    /// Request body limit for the CSV upload.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires every service over one storage backend.
    pub fn new(storage: &Storage, strategy: InfluenceStrategy, format: ImportFormat) -> Self {
        let speakers = Arc::new(SpeakerService::new(storage.speakers.clone()));
        let talks = Arc::new(TalkService::new(storage.talks.clone(), speakers.clone()));
        let imports = Arc::new(ImportService::new(speakers.clone(), talks.clone(), format));
        let influence = Arc::new(InfluenceService::new(storage.engagement.clone(), strategy));
        Self {
            speakers,
            talks,
            imports,
            influence,
            health: storage.health.clone(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                success: true,
                data: Some(value),
                error: None,
            },
            Err(e) => Self::error(format!("Failed to serialize response: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// `?page=&size=&sort=` for list endpoints.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 0-based page index (default 0).
    pub page: Option<u32>,
    /// Page size (default 10, at most 100).
    pub size: Option<u32>,
    /// `property[,asc|desc]`; several keys joined with `;`.
    pub sort: Option<String>,
}

impl PageParams {
    pub fn to_request(&self, spec: &SortSpec) -> PageRequest {
        PageRequest::new(self.page, self.size, spec.parse(self.sort.as_deref()))
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearFilter {
    /// Four-digit year; omit for all time.
    pub year: Option<i32>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequiredYear {
    pub year: i32,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::error(format!(
            "Invalid JSON body: {} (expected: {})",
            err, expected
        ))),
    )
}

pub fn query_400(err: QueryRejection) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(format!("Invalid query: {}", err))),
    )
}
