use crate::transport::http::handlers::common::{no_content, ok, HandlerResult};
use crate::transport::http::types::{query_400, ApiResponse, AppState, RequiredYear, YearFilter};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/api/speakers/influence",
    params(YearFilter),
    responses(
        (status = 200, description = "Speakers ranked by influence score, best first (`data` is a list of InfluenceRow)", body = ApiResponse),
        (status = 204, description = "No speaker has talks in the period"),
        (status = 400, description = "Malformed year", body = ApiResponse)
    )
)]
pub async fn influence_handler(
    State(state): State<AppState>,
    query: Result<Query<YearFilter>, QueryRejection>,
) -> HandlerResult {
    let Query(filter) = match query {
        Ok(q) => q,
        Err(e) => return Ok(query_400(e).into_response()),
    };

    let rows = state.influence.analyze(filter.year).await?;
    if rows.is_empty() {
        return Ok(no_content());
    }
    Ok(ok(StatusCode::OK, &rows))
}

#[utoipa::path(
    get,
    path = "/api/speakers/influence/most-influential",
    params(RequiredYear),
    responses(
        (status = 200, description = "Highest scoring speaker of the year (`data` is MostInfluential)", body = ApiResponse),
        (status = 204, description = "No speaker has talks in that year"),
        (status = 400, description = "Missing or malformed year", body = ApiResponse)
    )
)]
pub async fn most_influential_handler(
    State(state): State<AppState>,
    query: Result<Query<RequiredYear>, QueryRejection>,
) -> HandlerResult {
    let Query(RequiredYear { year }) = match query {
        Ok(q) => q,
        Err(e) => return Ok(query_400(e).into_response()),
    };

    match state.influence.most_influential(year).await? {
        Some(best) => Ok(ok(StatusCode::OK, &best)),
        None => Ok(no_content()),
    }
}
