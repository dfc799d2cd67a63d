//! HTTP surface through which the host delivers article events and
//! settings creation requests.

use crate::error::{ErrorKind, HostFault};
use crate::model::NewSettings;
use crate::orchestrator::{ArticleTranslationService, EventResult, ExecutionContext};
use crate::security::api_key_matches;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub service: ArticleTranslationService,
    pub api_key: Option<Arc<str>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSettingsRequest {
    pub user_id: String,
    pub settings: NewSettings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSettingsResponse {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn check_api_key(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(());
    };

    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());

    if api_key_matches(provided, expected) {
        Ok(())
    } else {
        warn!("Rejected request with missing or invalid API key");
        Err(error_response(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn handle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(context): Json<ExecutionContext>,
) -> Result<Json<EventResult>, Response> {
    check_api_key(&state, &headers)?;

    state
        .service
        .handle_event(context)
        .await
        .map(Json)
        .map_err(|HostFault { message }| error_response(StatusCode::INTERNAL_SERVER_ERROR, message))
}

async fn create_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateSettingsRequest>,
) -> Result<(StatusCode, Json<CreateSettingsResponse>), Response> {
    check_api_key(&state, &headers)?;

    match state
        .service
        .create_settings(&request.user_id, &request.settings)
        .await
    {
        Ok(id) => Ok((StatusCode::CREATED, Json(CreateSettingsResponse { id }))),
        Err(e) => {
            let status = if e.kind() == ErrorKind::SingletonViolation {
                StatusCode::CONFLICT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            warn!("Settings creation rejected ({:?}): {}", e.kind(), e);
            Err(error_response(status, HostFault::from(&e).message))
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", post(handle_event))
        .route("/settings", post(create_settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
