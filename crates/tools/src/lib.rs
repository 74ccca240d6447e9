//! Tool discovery, availability and execution.

mod error;
mod executor;
mod gateway;
pub mod mcp;
mod provider;
mod types;

pub use error::ToolError;
pub use executor::ToolExecutor;
pub use gateway::ToolRegistryGateway;
pub use provider::{ProviderChain, StaticToolProvider, ToolProvider};
pub use types::*;
