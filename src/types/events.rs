//! Stream fragments coming from the model and UI events going to the chat view.

use serde::{Deserialize, Serialize};

use super::message::MessageRole;
use super::tool::{ToolCall, ToolResult};

/// One incremental unit of a model's streamed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StreamFragment {
    /// Reasoning text, shown in the collapsible thinking block.
    ThoughtText { text: String },
    /// Visible answer text.
    AnswerText { text: String },
    /// Model request to invoke a tool. `name` is as emitted by the model (camelCase).
    FunctionCall {
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    },
}

impl StreamFragment {
    pub fn answer(text: impl Into<String>) -> Self {
        StreamFragment::AnswerText { text: text.into() }
    }

    pub fn thought(text: impl Into<String>) -> Self {
        StreamFragment::ThoughtText { text: text.into() }
    }

    pub fn function_call(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        StreamFragment::FunctionCall {
            name: name.into(),
            arguments,
        }
    }
}

/// Chat indicator state for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatState {
    #[default]
    Idle,
    Generating,
    Thinking,
    Executing,
}

/// Ordered UI update emitted while a turn runs.
///
/// Render events carry the full rendered buffer, so a consumer can always
/// replace what it shows with the latest event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum TurnEvent {
    StateChanged { state: ChatState },
    /// A new, separate message entry (user input, function-call record, error).
    MessageAdded { role: MessageRole, html: String },
    ThoughtUpdated { html: String },
    AnswerUpdated { html: String },
    ToolCallRequested { call: ToolCall },
    ToolCallCompleted { call: ToolCall, result: ToolResult },
    TurnCompleted { answer_html: String },
}
