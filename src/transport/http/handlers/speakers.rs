use crate::domain::SpeakerPayload;
use crate::storage::paging::SPEAKER_SORT;
use crate::transport::http::handlers::common::{no_content, ok, HandlerResult};
use crate::transport::http::types::{json_422, query_400, ApiResponse, AppState, PageParams};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

const EXPECTED_BODY: &str = "{\"name\": \"...\"}";

#[utoipa::path(
    get,
    path = "/api/speakers",
    params(PageParams),
    responses(
        (status = 200, description = "One page of speakers (`data` is SpeakerPage)", body = ApiResponse)
    )
)]
pub async fn list_speakers_handler(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> HandlerResult {
    let Query(params) = match query {
        Ok(q) => q,
        Err(e) => return Ok(query_400(e).into_response()),
    };
    let page = state.speakers.list(&params.to_request(&SPEAKER_SORT)).await?;
    Ok(ok(StatusCode::OK, &page))
}

#[utoipa::path(
    get,
    path = "/api/speakers/{id}",
    params(("id" = i64, Path, description = "Speaker id")),
    responses(
        (status = 200, description = "The speaker", body = ApiResponse),
        (status = 404, description = "No such speaker", body = ApiResponse)
    )
)]
pub async fn get_speaker_handler(State(state): State<AppState>, Path(id): Path<i64>) -> HandlerResult {
    let speaker = state.speakers.find_by_id(id).await?;
    Ok(ok(StatusCode::OK, &speaker))
}

#[utoipa::path(
    post,
    path = "/api/speakers",
    request_body = SpeakerPayload,
    responses(
        (status = 201, description = "Speaker created", body = ApiResponse),
        (status = 400, description = "Blank or duplicate name", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_speaker_handler(
    State(state): State<AppState>,
    request: Result<Json<SpeakerPayload>, JsonRejection>,
) -> HandlerResult {
    let Json(payload) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, EXPECTED_BODY).into_response()),
    };
    let speaker = state.speakers.create(&payload.name).await?;
    Ok(ok(StatusCode::CREATED, &speaker))
}

#[utoipa::path(
    put,
    path = "/api/speakers/{id}",
    params(("id" = i64, Path, description = "Speaker id")),
    request_body = SpeakerPayload,
    responses(
        (status = 200, description = "Speaker renamed", body = ApiResponse),
        (status = 400, description = "Blank or duplicate name", body = ApiResponse),
        (status = 404, description = "No such speaker", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn update_speaker_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Result<Json<SpeakerPayload>, JsonRejection>,
) -> HandlerResult {
    let Json(payload) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, EXPECTED_BODY).into_response()),
    };
    let speaker = state.speakers.update(id, &payload.name).await?;
    Ok(ok(StatusCode::OK, &speaker))
}

#[utoipa::path(
    delete,
    path = "/api/speakers/{id}",
    params(("id" = i64, Path, description = "Speaker id")),
    responses(
        (status = 204, description = "Speaker and their talks deleted"),
        (status = 404, description = "No such speaker", body = ApiResponse)
    )
)]
pub async fn delete_speaker_handler(State(state): State<AppState>, Path(id): Path<i64>) -> HandlerResult {
    state.speakers.delete(id).await?;
    Ok(no_content())
}
