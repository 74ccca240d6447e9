//! Tool providers supply the tool universe once at startup.

use crate::error::ToolError;
use crate::types::Tool;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Source of callable tools.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Enumerate the provider's tools. Order is preserved by the gateway.
    async fn load_tools(&self) -> Result<Vec<Arc<dyn Tool>>, ToolError>;
}

/// Provider over a fixed, in-process tool list.
pub struct StaticToolProvider {
    name: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl StaticToolProvider {
    pub fn new(name: impl Into<String>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            name: name.into(),
            tools,
        }
    }
}

#[async_trait]
impl ToolProvider for StaticToolProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load_tools(&self) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
        Ok(self.tools.clone())
    }
}

/// Concatenates several providers in order.
///
/// A provider that fails to load is logged and skipped so one unreachable
/// server does not hide the tools of the others.
#[derive(Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn ToolProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider.
    pub fn with(mut self, provider: impl ToolProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Append a boxed provider.
    pub fn push(&mut self, provider: Box<dyn ToolProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl ToolProvider for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn load_tools(&self) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
        let mut tools = Vec::new();
        for provider in &self.providers {
            match provider.load_tools().await {
                Ok(loaded) => {
                    info!(provider = %provider.name(), count = loaded.len(), "Loaded tools");
                    tools.extend(loaded);
                }
                Err(e) => {
                    error!(provider = %provider.name(), error = %e, "Failed to load tools, skipping provider");
                }
            }
        }
        Ok(tools)
    }
}
