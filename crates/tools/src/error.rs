//! Tool provider and execution errors.

use thiserror::Error;

/// Errors raised while loading or executing tools.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool execution timed out.
    #[error("Tool execution timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid arguments provided to tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The tool backend reported a failure.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Could not reach or initialize a tool server.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The tool server answered with something we could not use.
    #[error("Protocol error: {0}")]
    Protocol(String),
}
