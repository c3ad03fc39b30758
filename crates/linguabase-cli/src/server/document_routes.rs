//! Document HTTP Routes
//!
//! Read access to the four documents, the two permitted mutations, and the
//! validation report.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use linguabase_core::{build_report, ValidationReport};
use linguabase_schemas::{DialoguePhrases, KnowledgeBase, PracticeHistory, PromptLibrary};
use serde_json::Value;
use tracing::{info, instrument};

use super::error::{ApiError, ApiResult};
use super::AppState;

/// Routes mounted under `/api`
pub fn document_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/knowledge_base", get(get_knowledge_base))
        .route("/prompts", get(get_prompts).put(put_prompts))
        .route(
            "/practice_history",
            get(get_practice_history).post(post_exercise),
        )
        .route("/dialogue_phrases", get(get_dialogue_phrases))
        .route("/validation", get(get_validation))
        .with_state(state)
}

/// Parse a request body as JSON, reporting failure as a request violation
pub(super) fn parse_json(body: &Bytes) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(ApiError::unreadable_body)
}

async fn get_knowledge_base(State(state): State<Arc<AppState>>) -> ApiResult<Json<KnowledgeBase>> {
    Ok(Json(state.store.load_knowledge_base().await?))
}

async fn get_prompts(State(state): State<Arc<AppState>>) -> ApiResult<Json<PromptLibrary>> {
    Ok(Json(state.store.load_prompt_library().await?))
}

#[instrument(skip_all, fields(bytes = body.len()))]
async fn put_prompts(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<PromptLibrary>> {
    let candidate = parse_json(&body)?;
    let saved = state.store.save_prompt_library(&candidate).await?;
    info!(prompts = saved.prompts.len(), "prompt library replaced");
    Ok(Json(saved))
}

/// An absent history reads as empty
async fn get_practice_history(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PracticeHistory>> {
    Ok(Json(state.store.load_practice_history_or_empty().await?))
}

#[instrument(skip_all)]
async fn post_exercise(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PracticeHistory>)> {
    let exercise = parse_json(&body)?;
    let history = state.store.append_exercise(&exercise).await?;
    info!(exercises = history.len(), "exercise recorded");
    Ok((StatusCode::CREATED, Json(history)))
}

async fn get_dialogue_phrases(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DialoguePhrases>> {
    Ok(Json(state.store.load_dialogue_phrases().await?))
}

async fn get_validation(State(state): State<Arc<AppState>>) -> Json<ValidationReport> {
    Json(build_report(&state.store).await)
}
