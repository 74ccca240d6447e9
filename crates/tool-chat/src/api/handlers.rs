//! HTTP request handlers.

use super::types::{ChatRequest, HealthResponse, ToolAction, ToolActionResponse};
use super::AppState;
use crate::error::ApiError;
use crate::orchestrator::ChatResult;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tools::ToolStatus;
use tracing::info;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        tool_count: state.gateway.len(),
        enabled_tool_count: state.gateway.enabled_count(),
        model: state.model.to_string(),
    })
}

/// Send one message through the orchestrator.
///
/// A failed chat still carries a `ChatResult` body, with status 400.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatResult>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let result = state.orchestrator.chat(&request.message).await;
    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    Ok((status, Json(result)))
}

/// Every known tool with its current state.
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolStatus>> {
    Json(state.gateway.list_all())
}

pub async fn enable_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> (StatusCode, Json<ToolActionResponse>) {
    let success = state.gateway.enable(&name);
    info!(tool = %name, success, "Enable requested");
    action_response(name, ToolAction::Enabled, success)
}

pub async fn disable_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> (StatusCode, Json<ToolActionResponse>) {
    let success = state.gateway.disable(&name);
    info!(tool = %name, success, "Disable requested");
    action_response(name, ToolAction::Disabled, success)
}

/// 404 when the name matched nothing.
fn action_response(
    tool: String,
    action: ToolAction,
    success: bool,
) -> (StatusCode, Json<ToolActionResponse>) {
    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    (
        status,
        Json(ToolActionResponse {
            success,
            tool,
            action,
        }),
    )
}
