//! Tool Chat - LLM chat service with operator-controlled MCP tools.
//!
//! Tools are discovered once at startup from the configured MCP servers.
//! Operators enable and disable them at runtime over HTTP; each chat only
//! offers the model the tools enabled when it starts.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;

pub use config::Config;
pub use engine::{Completion, CompletionEngine, CompletionRequest, EngineError, LlmCompletionEngine};
pub use error::ApiError;
pub use orchestrator::{ChatOrchestrator, ChatResult};
