//! Tool protocol definitions: declarations, calls and text results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON type accepted for a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    String,
    Number,
    Integer,
    Boolean,
}

impl ArgumentType {
    /// Whether `value` is acceptable for this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ArgumentType::String => value.is_string(),
            ArgumentType::Number => value.is_number(),
            ArgumentType::Integer => value.is_i64() || value.is_u64(),
            ArgumentType::Boolean => value.is_boolean(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentType::String => "string",
            ArgumentType::Number => "number",
            ArgumentType::Integer => "integer",
            ArgumentType::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared argument of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: ArgumentType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tool definition: unique kebab-case name, description and an ordered
/// argument schema. Validation walks `arguments` in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            arguments: Vec::new(),
        }
    }

    /// Declare a required argument.
    pub fn required(mut self, name: impl Into<String>, arg_type: ArgumentType) -> Self {
        self.arguments.push(ArgumentSpec {
            name: name.into(),
            arg_type,
            required: true,
            description: None,
        });
        self
    }

    /// Declare an optional argument.
    pub fn optional(mut self, name: impl Into<String>, arg_type: ArgumentType) -> Self {
        self.arguments.push(ArgumentSpec {
            name: name.into(),
            arg_type,
            required: false,
            description: None,
        });
        self
    }

    /// Attach a description to the most recently declared argument.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        if let Some(last) = self.arguments.last_mut() {
            last.description = Some(description.into());
        }
        self
    }

    /// JSON Schema `parameters` object, as advertised to the model.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for arg in &self.arguments {
            let mut prop = serde_json::json!({ "type": arg.arg_type.as_str() });
            if let Some(desc) = &arg.description {
                prop["description"] = Value::String(desc.clone());
            }
            properties.insert(arg.name.clone(), prop);
            if arg.required {
                required.push(Value::String(arg.name.clone()));
            }
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Tool call (invocation from model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }
}

/// Content element of a tool result. Only text is produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

/// Tool result (response to tool call), in MCP wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// All text elements joined by newlines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
