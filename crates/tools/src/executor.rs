//! Tool executor with timeout and error handling.

use crate::types::{Tool, ToolCall, ToolResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Runs tool calls against a fixed set of tools with safety limits.
///
/// Only tools handed to `new` can run; a call naming anything else gets an
/// error result.
pub struct ToolExecutor {
    tools: HashMap<String, Arc<dyn Tool>>,
    timeout: Duration,
    max_response_len: usize,
}

impl ToolExecutor {
    /// Create a new executor over the given tools.
    pub fn new(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        Self {
            tools: tools
                .into_iter()
                .map(|t| (t.name().to_string(), t))
                .collect(),
            timeout: Duration::from_secs(10),
            max_response_len: 4000,
        }
    }

    /// Set the per-call execution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set maximum response length.
    pub fn with_max_response_len(mut self, len: usize) -> Self {
        self.max_response_len = len;
        self
    }

    /// Whether a tool with this name can run here.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Execute a tool call.
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        let tool_name = &tool_call.function.name;
        info!(tool = %tool_name, "Executing tool");

        let tool = match self.tools.get(tool_name) {
            Some(t) => t,
            None => {
                warn!(tool = %tool_name, "Tool not found or disabled");
                return ToolResult::error(
                    &tool_call.id,
                    format!("Tool '{}' not available", tool_name),
                );
            }
        };

        let result = timeout(
            self.timeout,
            tool.execute(&tool_call.function.arguments),
        )
        .await;

        match result {
            Ok(Ok(content)) => {
                let content = truncate(content, self.max_response_len);
                info!(tool = %tool_name, len = content.len(), "Tool executed successfully");
                ToolResult::success(&tool_call.id, content)
            }
            Ok(Err(e)) => {
                error!(tool = %tool_name, error = %e, "Tool execution failed");
                ToolResult::error(&tool_call.id, format!("Error: {}", e))
            }
            Err(_) => {
                error!(tool = %tool_name, timeout = ?self.timeout, "Tool timed out");
                ToolResult::error(
                    &tool_call.id,
                    format!(
                        "Tool timed out after {} seconds",
                        self.timeout.as_secs_f64()
                    ),
                )
            }
        }
    }
}

/// Cut `content` to at most `max_len` bytes on a char boundary.
fn truncate(content: String, max_len: usize) -> String {
    if content.len() <= max_len {
        return content;
    }
    let mut cut = max_len;
    while !content.is_char_boundary(cut) {
        cut -= 1;
    }
    format!(
        "{}... [truncated, {} chars total]",
        &content[..cut],
        content.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::types::{FunctionCall, ToolDefinition};
    use async_trait::async_trait;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("slow", "Slow tool", serde_json::json!({}))
        }

        fn name(&self) -> &str {
            "slow"
        }

        async fn execute(&self, _arguments: &str) -> Result<String, ToolError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("done".into())
        }
    }

    /// Sleeps for the given number of milliseconds.
    struct SleepTool(u64);

    #[async_trait]
    impl Tool for SleepTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("sleep", "Sleep tool", serde_json::json!({}))
        }

        fn name(&self) -> &str {
            "sleep"
        }

        async fn execute(&self, _arguments: &str) -> Result<String, ToolError> {
            tokio::time::sleep(Duration::from_millis(self.0)).await;
            Ok("awake".into())
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("echo", "Echo tool", serde_json::json!({}))
        }

        fn name(&self) -> &str {
            "echo"
        }

        async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
            let value: serde_json::Value = serde_json::from_str(arguments)?;
            value["text"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ToolError::InvalidArguments("missing text".into()))
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call-1".into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    #[tokio::test]
    async fn test_execute_success() {
        let executor = ToolExecutor::new([Arc::new(EchoTool) as Arc<dyn Tool>]);

        let result = executor.execute(&call("echo", r#"{"text": "hi"}"#)).await;
        assert!(result.success);
        assert_eq!(result.tool_call_id, "call-1");
        assert_eq!(result.content, "hi");
    }

    #[tokio::test]
    async fn test_execute_tool_error() {
        let executor = ToolExecutor::new([Arc::new(EchoTool) as Arc<dyn Tool>]);

        let result = executor.execute(&call("echo", "{}")).await;
        assert!(!result.success);
        assert!(result.content.starts_with("Error: Invalid arguments"));
    }

    #[tokio::test]
    async fn test_execute_timeout() {
        let executor = ToolExecutor::new([Arc::new(SlowTool) as Arc<dyn Tool>])
            .with_timeout(Duration::from_secs(1));

        let result = executor.execute(&call("slow", "{}")).await;
        assert!(!result.success);
        assert_eq!(result.content, "Tool timed out after 1 seconds");
    }

    #[tokio::test]
    async fn test_sub_second_timeout_is_kept() {
        let executor = ToolExecutor::new([Arc::new(SleepTool(1200)) as Arc<dyn Tool>])
            .with_timeout(Duration::from_millis(1500));

        let result = executor.execute(&call("sleep", "{}")).await;
        assert!(result.success);
        assert_eq!(result.content, "awake");

        let executor = ToolExecutor::new([Arc::new(SleepTool(1000)) as Arc<dyn Tool>])
            .with_timeout(Duration::from_millis(250));

        let result = executor.execute(&call("sleep", "{}")).await;
        assert!(!result.success);
        assert_eq!(result.content, "Tool timed out after 0.25 seconds");
    }

    #[tokio::test]
    async fn test_execute_tool_not_found() {
        let executor = ToolExecutor::new(Vec::<Arc<dyn Tool>>::new());

        assert!(!executor.has_tool("nonexistent"));
        let result = executor.execute(&call("nonexistent", "{}")).await;
        assert!(!result.success);
        assert!(result.content.contains("not available"));
    }

    #[tokio::test]
    async fn test_execute_truncates_long_output() {
        let executor =
            ToolExecutor::new([Arc::new(EchoTool) as Arc<dyn Tool>]).with_max_response_len(5);

        let result = executor
            .execute(&call("echo", r#"{"text": "abcdefghij"}"#))
            .await;
        assert!(result.success);
        assert_eq!(result.content, "abcde... [truncated, 10 chars total]");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let truncated = truncate("héllo".to_string(), 2);
        assert!(truncated.starts_with("h..."));
    }
}
