//! 工具注册表：工具名称到定义与处理器的映射
//!
//! Tool registry: maps kebab-case tool names to their definition and handler.
//! Populated once at startup; lookups afterwards are read-only. Registration
//! order is kept so the tool list advertised to the model is stable.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::tools::{MapToolbox, ToolHandler, MAP_TOOL_NAMES};
use crate::types::ToolDefinition;
use crate::Result;

/// A registered tool: immutable definition plus the handler that serves it.
#[derive(Clone)]
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the six built-in map tools, all served by `toolbox`.
    pub fn with_map_tools(toolbox: Arc<MapToolbox>) -> Result<Self> {
        let mut registry = Self::new();
        for definition in crate::tools::map_tool_definitions() {
            registry.register(definition, toolbox.clone())?;
        }
        debug_assert_eq!(registry.len(), MAP_TOOL_NAMES.len());
        Ok(registry)
    }

    /// Register a tool. Fails with [`Error::DuplicateTool`] if the name is taken.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<()> {
        if self.index.contains_key(&definition.name) {
            return Err(Error::DuplicateTool(definition.name));
        }
        tracing::debug!(tool = %definition.name, "registered tool");
        self.index.insert(definition.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            definition,
            handler,
        });
        Ok(())
    }

    /// Definition for `name`, or [`Error::ToolNotFound`].
    pub fn lookup(&self, name: &str) -> Result<&ToolDefinition> {
        self.get(name)
            .map(|t| &t.definition)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter().map(|t| &t.definition)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolArguments;
    use crate::types::{ArgumentType, ToolResult};

    struct Echo;

    #[async_trait::async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, _tool: &str, _arguments: ToolArguments) -> Result<ToolResult> {
            Ok(ToolResult::text("echo"))
        }
    }

    fn def(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "test tool").required("location", ArgumentType::String)
    }

    #[test]
    fn test_lookup_returns_registered_definition() {
        let mut registry = ToolRegistry::new();
        registry.register(def("view-location"), Arc::new(Echo)).unwrap();
        assert_eq!(registry.lookup("view-location").unwrap(), &def("view-location"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ToolRegistry::new();
        registry.register(def("search"), Arc::new(Echo)).unwrap();
        let err = registry.register(def("search"), Arc::new(Echo)).unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(ref n) if n == "search"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_missing_tool() {
        let registry = ToolRegistry::new();
        assert!(matches!(
            registry.lookup("nowhere"),
            Err(Error::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(def(name), Arc::new(Echo)).unwrap();
        }
        let names: Vec<_> = registry.definitions().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
