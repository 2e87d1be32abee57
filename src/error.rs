use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "arguments.origin", "lookup.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "rental_lookup")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the maps agent.
///
/// Tool-level variants never escape [`crate::dispatch::ToolDispatcher::dispatch`];
/// they are folded into failure [`crate::types::ToolResult`]s there. Only
/// [`Error::StreamConsumption`] reaches the UI as a distinct error message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        tool: String,
        field: String,
        reason: String,
    },

    #[error("Remote lookup failed: {message}{}", format_context(.context))]
    RemoteLookup {
        message: String,
        context: ErrorContext,
    },

    #[error("{0}")]
    StreamConsumption(String),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Missing required argument.
    pub fn missing_argument(tool: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Error::InvalidArguments {
            tool: tool.into(),
            reason: format!("missing required field '{}'", field),
            field,
        }
    }

    /// Present argument of the wrong JSON type.
    pub fn mistyped_argument(
        tool: impl Into<String>,
        field: impl Into<String>,
        expected: impl std::fmt::Display,
    ) -> Self {
        let field = field.into();
        Error::InvalidArguments {
            tool: tool.into(),
            reason: format!("field '{}' must be a {}", field, expected),
            field,
        }
    }

    /// Create a new remote lookup error with structured context
    pub fn remote_lookup_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::RemoteLookup {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new runtime error with structured context
    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::RemoteLookup { context, .. }
            | Error::Configuration { context, .. }
            | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Name of the offending argument, for [`Error::InvalidArguments`].
    pub fn invalid_field(&self) -> Option<&str> {
        match self {
            Error::InvalidArguments { field, .. } => Some(field),
            _ => None,
        }
    }
}
