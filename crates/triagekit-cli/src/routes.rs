//! API routes for the triage console.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use triagekit_client::{ClientError, SessionError, TriageBackend, TriageSession};
use triagekit_core::{
    AnalyzeResult, CostEstimate, DraftMode, DraftResult, Preset, PresetKey, build_payload, catalog,
};

use crate::server::AppState;

type AppStateArc = Arc<AppState>;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Threshold used when a request omits one.
const DEFAULT_THRESHOLD: f64 = 0.6;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn unprocessable(message: impl ToString) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody {
            detail: message.to_string(),
        }),
    )
}

/// Upstream rejections keep their status; transport trouble is a bad gateway.
fn upstream_error(err: &ClientError) -> ApiError {
    let status = match err {
        ClientError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => err
            .status()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY),
    };
    (
        status,
        Json(ErrorBody {
            detail: err.user_message(),
        }),
    )
}

// ── Page ──

pub fn page_routes() -> Router<AppStateArc> {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ── Presets ──

pub fn preset_routes() -> Router<AppStateArc> {
    Router::new().route("/api/presets", get(list_presets))
}

async fn list_presets() -> Json<Vec<&'static Preset>> {
    Json(catalog().collect())
}

// ── Triage ──

pub fn triage_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/draft", post(draft))
}

#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    preset: String,
    text: String,
    #[serde(default = "default_threshold")]
    threshold: f64,
    #[serde(default)]
    mode: Option<DraftMode>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    triage: AnalyzeResult,
    /// The page should request a draft right away (auto mode, urgent ticket).
    auto_draft: bool,
}

/// Triage only. An auto-draft is signalled, never run here, so a slow draft
/// cannot hold back the triage result.
async fn analyze(
    State(state): State<AppStateArc>,
    Json(form): Json<AnalyzeForm>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let preset = form.preset.parse::<PresetKey>().map_err(unprocessable)?;
    let mode = form.mode.unwrap_or(state.default_mode);

    let mut session = TriageSession::new(mode);
    let seq = session.begin_analyze(&form.text).map_err(unprocessable)?;
    let request = build_payload(preset, &form.text, form.threshold);
    let result = state.backend.analyze(&request).await;
    session.finish_analyze(seq, result);

    if let Some(err) = session.analyze_error() {
        warn!(%preset, error = %err, "analyze failed");
        return Err(upstream_error(err));
    }
    let Some(triage) = session.triage() else {
        return Err(unprocessable(SessionError::NoTriage));
    };

    let auto_draft = session.auto_draft_due();
    info!(
        %preset,
        %mode,
        priority = triage.priority().unwrap_or("-"),
        auto_draft,
        "ticket analyzed"
    );

    Ok(Json(AnalyzeResponse {
        triage: triage.clone(),
        auto_draft,
    }))
}

#[derive(Debug, Deserialize)]
struct DraftForm {
    text: String,
    triage: AnalyzeResult,
}

#[derive(Debug, Serialize)]
struct DraftResponse {
    draft: DraftResult,
    cost: CostEstimate,
}

async fn draft(
    State(state): State<AppStateArc>,
    Json(form): Json<DraftForm>,
) -> Result<Json<DraftResponse>, ApiError> {
    let mut session = TriageSession::with_triage(DraftMode::Manual, &form.text, form.triage)
        .map_err(unprocessable)?;
    session
        .request_draft(state.backend.as_ref())
        .await
        .map_err(unprocessable)?;

    if let Some(err) = session.draft_error() {
        warn!(error = %err, "draft failed");
        return Err(upstream_error(err));
    }
    let (Some(draft), Some(text)) = (session.draft(), session.text()) else {
        return Err(unprocessable(SessionError::NoTriage));
    };

    Ok(Json(DraftResponse {
        cost: CostEstimate::for_draft(draft, text),
        draft: draft.clone(),
    }))
}

// ── Health ──

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: String,
    default_mode: DraftMode,
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.backend_url.clone(),
        default_mode: state.default_mode,
    })
}
