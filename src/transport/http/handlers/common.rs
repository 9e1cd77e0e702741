use crate::app::ServiceError;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Storage(err) => {
                error!(error = %format!("{:#}", err), "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

pub type HandlerResult = Result<Response, ServiceError>;

pub fn ok<T: Serialize>(status: StatusCode, data: &T) -> Response {
    (status, Json(ApiResponse::ok(data))).into_response()
}

/// 204 for results that are legitimately empty.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
