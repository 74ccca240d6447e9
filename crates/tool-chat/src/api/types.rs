//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// `POST /api/chat` body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Enable/disable outcome.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolActionResponse {
    pub success: bool,
    pub tool: String,
    pub action: ToolAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolAction {
    Enabled,
    Disabled,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub tool_count: usize,
    pub enabled_tool_count: usize,
    pub model: String,
}
