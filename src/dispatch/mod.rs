//! 工具调度器：校验参数、调用处理器，并且总是返回工具结果
//!
//! Tool dispatcher. A call is looked up in the registry, validated against the
//! tool's schema and its argument object is handed to exactly one
//! [`ToolHandler`](crate::tools::ToolHandler). Every failure along the way, including a handler error, comes back
//! as a failure [`ToolResult`]: the model always receives well-formed tool
//! output.

pub mod validation;

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Error;
use crate::registry::ToolRegistry;
use crate::types::{ToolCall, ToolResult};
use crate::Result;

pub use validation::{arguments_object, validate_arguments};

#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run `call` and return its result. Never fails.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        match self.try_dispatch(call).await {
            Ok(result) => {
                info!(tool = %call.name, call_id = %call.id, is_error = result.is_error, "tool call finished");
                result
            }
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call failed");
                ToolResult::failure(failure_text(&call.name, &e))
            }
        }
    }

    /// Lookup, validation and handler invocation, with errors propagated.
    pub async fn try_dispatch(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .registry
            .get(&call.name)
            .ok_or_else(|| Error::UnknownTool(call.name.clone()))?;

        let arguments = arguments_object(&call.arguments);
        validate_arguments(&tool.definition, &arguments)?;

        tool.handler.call(&tool.definition.name, arguments).await.map_err(|e| match e {
            e @ (Error::UnknownTool(_) | Error::InvalidArguments { .. }) => e,
            other => Error::runtime_with_context(
                format!("Tool {} failed: {}", call.name, other),
                crate::error::ErrorContext::new().with_source("tool_handler"),
            ),
        })
    }
}

fn failure_text(tool: &str, err: &Error) -> String {
    match err {
        Error::UnknownTool(name) => format!("Unknown tool: {}", name),
        Error::InvalidArguments { .. } => err.to_string(),
        Error::Runtime { message, .. } => message.clone(),
        other => format!("Tool {} failed: {}", tool, other),
    }
}
