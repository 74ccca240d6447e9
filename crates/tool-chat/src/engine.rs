//! Completion engine: one user message in, one model answer out.
//!
//! [`LlmCompletionEngine`] drives the function-calling loop against an
//! OpenAI-compatible endpoint. Tools offered to the model are exactly the ones
//! in the request, and only those can be executed.

use async_trait::async_trait;
use llm_client::{FunctionDefinitionApi, LlmClient, LlmError, Message, ToolDefinition as ApiToolDefinition};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tools::{FunctionCall, Tool, ToolCall, ToolDefinition, ToolExecutor};
use tracing::{debug, instrument, warn};

/// A single-turn completion request.
pub struct CompletionRequest {
    pub message: String,
    /// Tools the model may call. Empty means a plain completion.
    pub tools: Vec<Arc<dyn Tool>>,
}

impl CompletionRequest {
    pub fn new(message: impl Into<String>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            message: message.into(),
            tools,
        }
    }

    /// Ids of the attached tools, in order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("message", &self.message)
            .field("tools", &self.tool_names())
            .finish()
    }
}

/// Final model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    /// Ids of tools that were executed, first use first, no duplicates.
    pub tools_used: Vec<String>,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Completion service error: {0}")]
    Llm(#[from] LlmError),

    #[error("Empty response from completion service")]
    EmptyResponse,

    #[error("No final answer after {0} tool rounds")]
    ToolIterationsExceeded(usize),
}

/// The language-model side of a chat.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, EngineError>;
}

/// Completion engine backed by [`LlmClient`].
pub struct LlmCompletionEngine {
    client: Arc<LlmClient>,
    max_tool_iterations: usize,
    tool_timeout: Duration,
    max_tool_response_len: usize,
}

impl LlmCompletionEngine {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self {
            client,
            max_tool_iterations: 5,
            tool_timeout: Duration::from_secs(10),
            max_tool_response_len: 4000,
        }
    }

    /// Maximum model round-trips per chat (at least one).
    pub fn with_max_tool_iterations(mut self, iterations: usize) -> Self {
        self.max_tool_iterations = iterations.max(1);
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_max_tool_response_len(mut self, len: usize) -> Self {
        self.max_tool_response_len = len;
        self
    }
}

#[async_trait]
impl CompletionEngine for LlmCompletionEngine {
    #[instrument(skip(self, request), fields(tool_count = request.tools.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, EngineError> {
        let definitions: Vec<ApiToolDefinition> = request
            .tools
            .iter()
            .map(|t| api_definition(t.definition()))
            .collect();

        let executor = ToolExecutor::new(request.tools)
            .with_timeout(self.tool_timeout)
            .with_max_response_len(self.max_tool_response_len);

        let mut messages = vec![Message::user(request.message)];
        let mut tools_used: Vec<String> = Vec::new();
        let mut tools_executed = false;

        for iteration in 0..self.max_tool_iterations {
            debug!(iteration, tools_executed, "Completion round");

            // Tools are offered until one round of them has run, then the
            // model has to answer in text.
            let tools_to_offer = if !tools_executed && !definitions.is_empty() {
                Some(&definitions[..])
            } else {
                None
            };

            let response = self
                .client
                .chat_with_tools(messages.clone(), None, None, tools_to_offer)
                .await?;

            match response.tool_calls {
                Some(tool_calls) if !tool_calls.is_empty() => {
                    debug!("Model requested {} tool calls", tool_calls.len());
                    messages.push(Message::assistant_with_tool_calls(
                        response.content,
                        tool_calls.clone(),
                    ));

                    for call in tool_calls {
                        let name = call.function.name.clone();
                        let result = executor.execute(&executor_call(call)).await;

                        if executor.has_tool(&name) && !tools_used.contains(&name) {
                            tools_used.push(name);
                        }
                        messages.push(Message::tool_result(result.tool_call_id, result.content));
                    }

                    tools_executed = true;
                }
                _ => {
                    return response
                        .content
                        .filter(|c| !c.trim().is_empty())
                        .map(|content| Completion {
                            content,
                            tools_used,
                        })
                        .ok_or(EngineError::EmptyResponse);
                }
            }
        }

        warn!(
            max = self.max_tool_iterations,
            "Tool iteration limit reached without a final answer"
        );
        Err(EngineError::ToolIterationsExceeded(self.max_tool_iterations))
    }
}

fn api_definition(definition: ToolDefinition) -> ApiToolDefinition {
    ApiToolDefinition {
        tool_type: definition.tool_type,
        function: FunctionDefinitionApi {
            name: definition.function.name,
            description: definition.function.description,
            parameters: definition.function.parameters,
        },
    }
}

fn executor_call(call: llm_client::ToolCall) -> ToolCall {
    ToolCall {
        id: call.id,
        call_type: call.call_type,
        function: FunctionCall {
            name: call.function.name,
            arguments: call.function.arguments,
        },
    }
}
