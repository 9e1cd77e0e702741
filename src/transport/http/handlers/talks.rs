use crate::domain::{CreateTalk, UpdateTalk};
use crate::storage::paging::TALK_SORT;
use crate::transport::http::handlers::common::{no_content, ok, HandlerResult};
use crate::transport::http::types::{json_422, query_400, ApiResponse, AppState, PageParams};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

const EXPECTED_CREATE: &str =
    "{\"title\", \"date\": \"YYYY-MM\", \"views\", \"likes\", \"link\"?, \"speakerId\"? | \"speakerName\"?}";
const EXPECTED_UPDATE: &str =
    "{\"title\", \"date\": \"YYYY-MM\", \"views\", \"likes\", \"link\"?, \"speakerId\"}";

#[utoipa::path(
    get,
    path = "/api/talks",
    params(PageParams),
    responses(
        (status = 200, description = "One page of talks with speaker names (`data` is TalkPage)", body = ApiResponse)
    )
)]
pub async fn list_talks_handler(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> HandlerResult {
    let Query(params) = match query {
        Ok(q) => q,
        Err(e) => return Ok(query_400(e).into_response()),
    };
    let page = state.talks.list(&params.to_request(&TALK_SORT)).await?;
    Ok(ok(StatusCode::OK, &page))
}

#[utoipa::path(
    get,
    path = "/api/talks/{id}",
    params(("id" = i64, Path, description = "Talk id")),
    responses(
        (status = 200, description = "The talk (`data` is TalkView)", body = ApiResponse),
        (status = 404, description = "No such talk", body = ApiResponse)
    )
)]
pub async fn get_talk_handler(State(state): State<AppState>, Path(id): Path<i64>) -> HandlerResult {
    let talk = state.talks.find_by_id(id).await?;
    Ok(ok(StatusCode::OK, &talk))
}

#[utoipa::path(
    post,
    path = "/api/talks",
    request_body = CreateTalk,
    responses(
        (status = 201, description = "Talk created", body = ApiResponse),
        (status = 400, description = "Invalid fields, unknown speakerId or duplicate talk", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_talk_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateTalk>, JsonRejection>,
) -> HandlerResult {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, EXPECTED_CREATE).into_response()),
    };
    let talk = state.talks.create(request).await?;
    Ok(ok(StatusCode::CREATED, &talk))
}

#[utoipa::path(
    put,
    path = "/api/talks/{id}",
    params(("id" = i64, Path, description = "Talk id")),
    request_body = UpdateTalk,
    responses(
        (status = 200, description = "Talk replaced", body = ApiResponse),
        (status = 400, description = "Invalid fields or duplicate talk", body = ApiResponse),
        (status = 404, description = "No such talk or speaker", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn update_talk_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Result<Json<UpdateTalk>, JsonRejection>,
) -> HandlerResult {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, EXPECTED_UPDATE).into_response()),
    };
    let talk = state.talks.update(id, request).await?;
    Ok(ok(StatusCode::OK, &talk))
}

#[utoipa::path(
    delete,
    path = "/api/talks/{id}",
    params(("id" = i64, Path, description = "Talk id")),
    responses(
        (status = 204, description = "Talk deleted"),
        (status = 404, description = "No such talk", body = ApiResponse)
    )
)]
pub async fn delete_talk_handler(State(state): State<AppState>, Path(id): Path<i64>) -> HandlerResult {
    state.talks.delete(id).await?;
    Ok(no_content())
}
