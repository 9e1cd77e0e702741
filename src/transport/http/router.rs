use crate::domain::import::{ErrorKind, ImportError, ImportOutcome};
use crate::domain::influence::{InfluenceRow, MostInfluential};
use crate::domain::{CreateTalk, Speaker, SpeakerPayload, Talk, TalkView, UpdateTalk};
use crate::storage::paging::{SpeakerPage, TalkPage};
use crate::transport::http::handlers::{health, imports, influence, speakers, talks};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        imports::import_talks_handler,
        influence::influence_handler,
        influence::most_influential_handler,
        speakers::list_speakers_handler,
        speakers::get_speaker_handler,
        speakers::create_speaker_handler,
        speakers::update_speaker_handler,
        speakers::delete_speaker_handler,
        talks::list_talks_handler,
        talks::get_talk_handler,
        talks::create_talk_handler,
        talks::update_talk_handler,
        talks::delete_talk_handler
    ),
    components(schemas(
        ApiResponse,
        imports::TalkUpload,
        ImportOutcome,
        ImportError,
        ErrorKind,
        InfluenceRow,
        MostInfluential,
        Speaker,
        SpeakerPayload,
        SpeakerPage,
        Talk,
        TalkView,
        TalkPage,
        CreateTalk,
        UpdateTalk
    )),
    tags((name = "talk-ledger", description = "Talk catalog import and speaker influence ranking"))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = app_state.max_upload_bytes;
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/import/talks",
            post(imports::import_talks_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/speakers/influence", get(influence::influence_handler))
        .route(
            "/api/speakers/influence/most-influential",
            get(influence::most_influential_handler),
        )
        .route(
            "/api/speakers",
            get(speakers::list_speakers_handler).post(speakers::create_speaker_handler),
        )
        .route(
            "/api/speakers/:id",
            get(speakers::get_speaker_handler)
                .put(speakers::update_speaker_handler)
                .delete(speakers::delete_speaker_handler),
        )
        .route(
            "/api/talks",
            get(talks::list_talks_handler).post(talks::create_talk_handler),
        )
        .route(
            "/api/talks/:id",
            get(talks::get_talk_handler)
                .put(talks::update_talk_handler)
                .delete(talks::delete_talk_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
