//! MCP (Model Context Protocol) tool provider.
//!
//! Connects to MCP servers over Streamable HTTP with the rmcp SDK, lists their
//! tools once and wraps each one as a [`Tool`] whose id is prefixed with the
//! server name (`<server>_<tool>`).

use crate::error::ToolError;
use crate::provider::ToolProvider;
use crate::types::{Tool, ToolDefinition};
use async_trait::async_trait;
use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        RawContent, Tool as McpToolSpec,
    },
    service::RunningService,
    transport::StreamableHttpClientTransport,
    RoleClient, ServiceExt,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Connected MCP client.
pub struct McpClient {
    client: RunningService<RoleClient, ClientInfo>,
    url: String,
}

impl McpClient {
    /// Connect to an MCP server over HTTP (Streamable HTTP transport).
    #[instrument]
    pub async fn connect_http(url: &str) -> Result<Self, ToolError> {
        info!("Connecting to MCP server");

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client_info = ClientInfo {
            meta: None,
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("tool-chat".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
        };

        let client = client_info
            .serve(transport)
            .await
            .map_err(|e| ToolError::Connection(e.to_string()))?;

        info!("MCP server connected and initialized");

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// List all tools the server exposes.
    pub async fn list_tools(&self) -> Result<Vec<McpToolSpec>, ToolError> {
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| ToolError::Protocol(e.to_string()))?;

        debug!(url = %self.url, count = result.tools.len(), "Listed MCP tools");
        Ok(result.tools)
    }

    /// Call a tool by its server-side name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, ToolError> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        self.client
            .call_tool(params)
            .await
            .map_err(|e| ToolError::ExternalService(e.to_string()))
    }
}

/// One tool living on an MCP server.
pub struct McpTool {
    id: String,
    remote_name: String,
    description: String,
    input_schema: Value,
    client: Arc<McpClient>,
}

impl McpTool {
    pub fn new(server: &str, spec: McpToolSpec, client: Arc<McpClient>) -> Self {
        let remote_name = spec.name.to_string();
        Self {
            id: prefixed_tool_name(server, &remote_name),
            description: spec.description.map(|d| d.to_string()).unwrap_or_default(),
            input_schema: serde_json::to_value(spec.input_schema.as_ref()).unwrap_or_default(),
            remote_name,
            client,
        }
    }
}

#[async_trait]
impl Tool for McpTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(&self.id, &self.description, self.input_schema.clone())
    }

    fn name(&self) -> &str {
        &self.id
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let arguments = parse_arguments(arguments)?;
        let result = self.client.call_tool(&self.remote_name, arguments).await?;
        tool_output(&result)
    }
}

/// Provider that discovers tools from a single MCP server.
pub struct McpToolProvider {
    server: String,
    url: String,
}

impl McpToolProvider {
    pub fn new(server: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ToolProvider for McpToolProvider {
    fn name(&self) -> &str {
        &self.server
    }

    async fn load_tools(&self) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
        let client = Arc::new(McpClient::connect_http(&self.url).await?);
        let specs = client.list_tools().await?;

        Ok(specs
            .into_iter()
            .map(|spec| Arc::new(McpTool::new(&self.server, spec, client.clone())) as Arc<dyn Tool>)
            .collect())
    }
}

/// Namespace a server-side tool name as `<server>_<tool>`.
///
/// Characters outside `[A-Za-z0-9_]` in the server name become `_`.
pub fn prefixed_tool_name(server: &str, tool: &str) -> String {
    let prefix: String = server
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("{}_{}", prefix, tool)
}

/// Model-supplied arguments as a JSON object. Blank means no arguments.
fn parse_arguments(arguments: &str) -> Result<Map<String, Value>, ToolError> {
    if arguments.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str(arguments) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ToolError::InvalidArguments(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(ToolError::InvalidArguments(e.to_string())),
    }
}

/// Text of a tool result, or the server's error text when it flagged one.
fn tool_output(result: &CallToolResult) -> Result<String, ToolError> {
    let text = result_text(result);
    if result.is_error.unwrap_or(false) {
        return Err(ToolError::ExternalService(text));
    }
    Ok(text)
}

/// Join the text blocks of a tool result.
fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
