//! Tool availability gateway.
//!
//! Holds the tool universe loaded once from a provider and the set of ids an
//! operator has switched off. All tools start enabled.

use crate::error::ToolError;
use crate::provider::ToolProvider;
use crate::types::{Tool, ToolDescriptor, ToolStatus};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of available tools with per-tool enable/disable state.
///
/// Safe to share behind an `Arc`. Readers hold the disabled-set lock for a
/// whole pass, so `list_all` and `enabled_tools` each see a single snapshot;
/// concurrent `enable`/`disable` calls are last-write-wins.
pub struct ToolRegistryGateway {
    tools: Vec<ToolDescriptor>,
    disabled: RwLock<HashSet<String>>,
}

impl ToolRegistryGateway {
    /// Build a gateway over a fixed tool list (enumeration order is kept).
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut seen = HashSet::new();
        let mut descriptors = Vec::with_capacity(tools.len());

        for tool in tools {
            let descriptor = ToolDescriptor::new(tool);
            if !seen.insert(descriptor.id.clone()) {
                warn!(tool = %descriptor.id, "Duplicate tool id from provider, keeping first");
                continue;
            }
            descriptors.push(descriptor);
        }

        Self {
            tools: descriptors,
            disabled: RwLock::new(HashSet::new()),
        }
    }

    /// Load the tool universe from a provider. Called once at startup.
    pub async fn load(provider: &dyn ToolProvider) -> Result<Self, ToolError> {
        let tools = provider.load_tools().await?;
        let gateway = Self::new(tools);
        info!(
            provider = %provider.name(),
            count = gateway.len(),
            "Tool gateway initialized"
        );
        Ok(gateway)
    }

    /// All tools with their enabled flag, in provider order.
    pub fn list_all(&self) -> Vec<ToolStatus> {
        let disabled = self.disabled.read();
        self.tools
            .iter()
            .map(|t| ToolStatus {
                name: t.id.clone(),
                description: t.description.clone(),
                enabled: !disabled.contains(&t.id),
            })
            .collect()
    }

    /// Invokers for every tool not currently disabled, in provider order.
    pub fn enabled_tools(&self) -> Vec<Arc<dyn Tool>> {
        let disabled = self.disabled.read();
        self.tools
            .iter()
            .filter(|t| !disabled.contains(&t.id))
            .map(|t| t.invoker.clone())
            .collect()
    }

    /// Enable a tool by id or `_`-suffix alias.
    ///
    /// Returns `false` when the name matches no known tool; nothing changes.
    pub fn enable(&self, name: &str) -> bool {
        match self.resolve(name) {
            Some(id) => {
                self.disabled.write().remove(id);
                info!(tool = %id, "Enabled tool");
                true
            }
            None => {
                debug!(name = %name, "Enable requested for unknown tool");
                false
            }
        }
    }

    /// Disable a tool by id or `_`-suffix alias.
    ///
    /// Returns `false` when the name matches no known tool; nothing changes.
    pub fn disable(&self, name: &str) -> bool {
        match self.resolve(name) {
            Some(id) => {
                self.disabled.write().insert(id.to_string());
                info!(tool = %id, "Disabled tool");
                true
            }
            None => {
                debug!(name = %name, "Disable requested for unknown tool");
                false
            }
        }
    }

    /// Check if a tool id is currently enabled. Unknown ids are not.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.tools.iter().any(|t| t.id == id) && !self.disabled.read().contains(id)
    }

    /// Number of tools in the universe.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Number of tools currently enabled.
    pub fn enabled_count(&self) -> usize {
        let disabled = self.disabled.read();
        self.tools.iter().filter(|t| !disabled.contains(&t.id)).count()
    }

    /// First id, in provider order, equal to `name` or ending in `_{name}`.
    ///
    /// When several ids share a suffix the winner depends on the provider's
    /// enumeration order.
    fn resolve(&self, name: &str) -> Option<&str> {
        let suffix = format!("_{}", name);
        self.tools
            .iter()
            .find(|t| t.id == name || t.id.ends_with(&suffix))
            .map(|t| t.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticToolProvider;
    use crate::types::ToolDefinition;
    use async_trait::async_trait;

    struct MockTool {
        name: String,
        description: String,
    }

    #[async_trait]
    impl Tool for MockTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function(&self.name, &self.description, serde_json::json!({}))
        }

        fn name(&self) -> &str {
            &self.name
        }

        async fn execute(&self, _arguments: &str) -> Result<String, ToolError> {
            Ok("mock result".into())
        }
    }

    fn tool(name: &str, description: &str) -> Arc<dyn Tool> {
        Arc::new(MockTool {
            name: name.into(),
            description: description.into(),
        })
    }

    fn calc_gateway() -> ToolRegistryGateway {
        ToolRegistryGateway::new(vec![
            tool("calc_add", "Add two numbers"),
            tool("calc_sub", "Subtract two numbers"),
        ])
    }

    fn enabled_names(gateway: &ToolRegistryGateway) -> Vec<String> {
        gateway
            .enabled_tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    #[test]
    fn test_all_enabled_initially() {
        let gateway = calc_gateway();
        let statuses = gateway.list_all();

        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.enabled));
        assert_eq!(enabled_names(&gateway), vec!["calc_add", "calc_sub"]);
    }

    #[test]
    fn test_disable_by_suffix_scenario() {
        let gateway = calc_gateway();

        assert!(gateway.disable("add"));

        assert_eq!(
            gateway.list_all(),
            vec![
                ToolStatus {
                    name: "calc_add".into(),
                    description: "Add two numbers".into(),
                    enabled: false,
                },
                ToolStatus {
                    name: "calc_sub".into(),
                    description: "Subtract two numbers".into(),
                    enabled: true,
                },
            ]
        );
        assert_eq!(enabled_names(&gateway), vec!["calc_sub"]);
    }

    #[test]
    fn test_disable_then_enable_restores() {
        let gateway = calc_gateway();
        let before = gateway.list_all();

        assert!(gateway.disable("calc_sub"));
        assert!(!gateway.is_enabled("calc_sub"));
        assert!(gateway.enable("calc_sub"));

        assert_eq!(gateway.list_all(), before);
    }

    #[test]
    fn test_repeated_toggle_is_idempotent() {
        let gateway = calc_gateway();

        assert!(gateway.disable("sub"));
        assert!(gateway.disable("sub"));
        assert_eq!(gateway.enabled_count(), 1);

        assert!(gateway.enable("sub"));
        assert!(gateway.enable("sub"));
        assert!(gateway.enable("calc_add"));
        assert_eq!(gateway.enabled_count(), 2);
    }

    #[test]
    fn test_unknown_name_is_noop() {
        let gateway = calc_gateway();
        gateway.disable("add");
        let before = gateway.list_all();

        for name in ["mul", "calc", "dd", "calc_add_extra", "", "_add"] {
            assert!(!gateway.enable(name), "enable({name:?}) should not resolve");
            assert!(!gateway.disable(name), "disable({name:?}) should not resolve");
        }

        assert_eq!(gateway.list_all(), before);
    }

    #[test]
    fn test_suffix_requires_underscore_boundary() {
        let gateway = ToolRegistryGateway::new(vec![tool("serverA_research", "Research")]);

        assert!(!gateway.disable("search"));
        assert!(gateway.disable("research"));
        assert!(!gateway.is_enabled("serverA_research"));
    }

    #[test]
    fn test_alias_collision_resolves_first_in_provider_order() {
        let gateway = ToolRegistryGateway::new(vec![
            tool("serverA_search", "A"),
            tool("serverB_search", "B"),
        ]);

        assert!(gateway.disable("search"));
        assert!(!gateway.is_enabled("serverA_search"));
        assert!(gateway.is_enabled("serverB_search"));

        assert!(gateway.disable("serverB_search"));
        assert_eq!(gateway.enabled_count(), 0);
    }

    #[test]
    fn test_enabled_is_complement_of_disabled() {
        let gateway = ToolRegistryGateway::new(vec![
            tool("a_one", ""),
            tool("a_two", ""),
            tool("b_three", ""),
            tool("b_four", ""),
        ]);

        gateway.disable("two");
        gateway.disable("b_four");
        gateway.enable("four");
        gateway.disable("one");

        let disabled: HashSet<String> = gateway
            .list_all()
            .into_iter()
            .filter(|s| !s.enabled)
            .map(|s| s.name)
            .collect();
        let enabled: HashSet<String> = enabled_names(&gateway).into_iter().collect();

        assert_eq!(disabled, HashSet::from(["a_one".to_string(), "a_two".to_string()]));
        assert_eq!(enabled, HashSet::from(["b_three".to_string(), "b_four".to_string()]));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let gateway = ToolRegistryGateway::new(vec![
            tool("dup_tool", "first"),
            tool("dup_tool", "second"),
        ]);

        let statuses = gateway.list_all();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].description, "first");
    }

    #[test]
    fn test_empty_gateway() {
        let gateway = ToolRegistryGateway::new(Vec::new());
        assert!(gateway.is_empty());
        assert!(gateway.enabled_tools().is_empty());
        assert!(!gateway.disable("anything"));
    }

    #[test]
    fn test_concurrent_toggles() {
        let gateway = Arc::new(calc_gateway());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gateway = gateway.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        if i % 2 == 0 {
                            assert!(gateway.disable("add"));
                        } else {
                            assert!(gateway.enable("add"));
                        }
                        let enabled = gateway.enabled_tools();
                        assert!(enabled.iter().any(|t| t.name() == "calc_sub"));
                        assert_eq!(gateway.list_all().len(), 2);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(gateway.is_enabled("calc_sub"));
        assert!(gateway.enable("add"));
        assert_eq!(gateway.enabled_count(), 2);
    }

    #[tokio::test]
    async fn test_load_from_provider() {
        let provider = StaticToolProvider::new(
            "static",
            vec![tool("calc_add", "Add two numbers")],
        );

        let gateway = ToolRegistryGateway::load(&provider).await.unwrap();
        assert_eq!(gateway.len(), 1);
        assert!(gateway.is_enabled("calc_add"));
    }
}
