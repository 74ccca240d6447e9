//! Chat orchestration over the enabled tool set.

use crate::engine::{CompletionEngine, CompletionRequest};
use serde::Serialize;
use std::sync::Arc;
use tools::ToolRegistryGateway;
use tracing::{error, info, instrument};

/// Outcome of one chat.
///
/// Either `success` with a response and no error, or a failure with an error
/// message and no response. The constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResult {
    success: bool,
    response: Option<String>,
    tools_used: Vec<String>,
    error: Option<String>,
}

impl ChatResult {
    pub fn success(response: impl Into<String>, tools_used: Vec<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            tools_used,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            response: None,
            tools_used: Vec::new(),
            error: Some(if message.is_empty() {
                "Unknown error".to_string()
            } else {
                message
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn tools_used(&self) -> &[String] {
        &self.tools_used
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Turns a user message into a [`ChatResult`] using whatever tools are
/// enabled at the moment the chat starts.
pub struct ChatOrchestrator {
    gateway: Arc<ToolRegistryGateway>,
    engine: Arc<dyn CompletionEngine>,
}

impl ChatOrchestrator {
    pub fn new(gateway: Arc<ToolRegistryGateway>, engine: Arc<dyn CompletionEngine>) -> Self {
        Self { gateway, engine }
    }

    /// Run one chat. Never fails: engine errors come back as a failed result.
    #[instrument(skip(self, user_message), fields(message_len = user_message.len()))]
    pub async fn chat(&self, user_message: &str) -> ChatResult {
        let tools = self.gateway.enabled_tools();
        info!(enabled_tools = tools.len(), "Processing chat message");

        let request = CompletionRequest::new(user_message, tools);

        match self.engine.complete(request).await {
            Ok(completion) => {
                info!(tools_used = ?completion.tools_used, "Chat response generated");
                ChatResult::success(completion.content, completion.tools_used)
            }
            Err(e) => {
                error!(error = %e, "Chat failed");
                ChatResult::failure(e.to_string())
            }
        }
    }
}
