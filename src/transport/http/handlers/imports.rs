use crate::transport::http::handlers::common::ok;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

/// Multipart form part carrying the CSV.
pub const FILE_FIELD: &str = "file";

/// Multipart upload schema for the OpenAPI document.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct TalkUpload {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/import/talks",
    request_body(content = TalkUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch processed; `data` is the import outcome with row-level errors", body = ApiResponse),
        (status = 400, description = "No `file` part in the form", body = ApiResponse),
        (status = 413, description = "Upload larger than the configured limit")
    )
)]
pub async fn import_talks_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => {
                let file_name = field.file_name().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((file_name, bytes));
                        break;
                    }
                    Err(e) => return bad_upload(e.status(), e.body_text()),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return bad_upload(e.status(), e.body_text()),
        }
    }

    let Some((file_name, bytes)) = upload else {
        return bad_upload(
            StatusCode::BAD_REQUEST,
            format!("Required part '{}' is not present.", FILE_FIELD),
        );
    };

    info!(file = file_name.as_deref().unwrap_or("<unnamed>"), bytes = bytes.len(), "import upload received");
    let outcome = state.imports.import(bytes.as_ref()).await;
    ok(StatusCode::OK, &outcome)
}

fn bad_upload(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponse::error(message))).into_response()
}
