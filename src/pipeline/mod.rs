//! 流水线处理模块：把模型的流式输出聚合为界面事件，并在到达时立即调度工具调用。
//!
//! # Streaming Response Aggregator
//!
//! This module turns a model's streamed response into ordered [`TurnEvent`]s
//! and tool dispatches.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Raw Bytes → SseDecoder → map_chunks → StreamAggregator → TurnEvents
//!     │            │            │               │
//!   HTTP       JSON frames   fragments     state machine,
//!                                          inline dispatch
//! ```
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TurnContext`] | Per-turn state, buffers and event sink |
//! | [`StreamAggregator`] | Applies fragments, dispatches calls, finishes turns |
//! | [`RoundOutput`] | What one model stream produced, for the history |
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | SSE decoder (bytes → JSON frames) |
//! | [`fragments`] | Gemini chunks → [`StreamFragment`]s |
//! | [`recovery`] | Error message recovery for failed streams |
//!
//! State transitions per turn:
//!
//! ```text
//! Idle → Generating → (Thinking | Executing)* → Idle
//! ```

pub mod decode;
pub mod fragments;
pub mod recovery;

use std::sync::Arc;

use futures::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dispatch::ToolDispatcher;
use crate::error::Error;
use crate::markdown::{CommonMarkRenderer, MarkdownRenderer};
use crate::types::{
    ChatState, FunctionCallPart, MessageRole, Part, StreamFragment, ToolCall, ToolResult, TurnEvent,
};
use crate::utils::camel_to_kebab;
use crate::{BoxStream, Result};

/// Fragments of one model response, in arrival order.
pub type FragmentStream = BoxStream<'static, StreamFragment>;

/// Final content of a turn whose answer buffer is blank.
pub const EMPTY_ANSWER: &str = "Done";

/// Mutable state of a single turn. Created per turn and dropped with it.
#[derive(Debug)]
pub struct TurnContext {
    turn_id: String,
    state: ChatState,
    thought: String,
    answer: String,
    transitions: Vec<ChatState>,
    events: mpsc::UnboundedSender<TurnEvent>,
}

impl TurnContext {
    pub fn new(events: mpsc::UnboundedSender<TurnEvent>) -> Self {
        Self {
            turn_id: uuid::Uuid::new_v4().to_string(),
            state: ChatState::Idle,
            thought: String::new(),
            answer: String::new(),
            transitions: vec![ChatState::Idle],
            events,
        }
    }

    pub fn turn_id(&self) -> &str {
        &self.turn_id
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn thought(&self) -> &str {
        &self.thought
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Every state the turn has been in, starting with `Idle`.
    pub fn transitions(&self) -> &[ChatState] {
        &self.transitions
    }

    /// Change state; a no-op when `state` is already current.
    pub fn set_state(&mut self, state: ChatState) {
        if self.state == state {
            return;
        }
        debug!(turn_id = %self.turn_id, from = ?self.state, to = ?state, "chat state changed");
        self.state = state;
        self.transitions.push(state);
        self.emit(TurnEvent::StateChanged { state });
    }

    pub fn emit(&self, event: TurnEvent) {
        // A closed receiver only means nobody is watching this turn any more.
        if self.events.send(event).is_err() {
            debug!(turn_id = %self.turn_id, "turn event receiver dropped");
        }
    }
}

/// A dispatched call and its result. `model_name` is the name as the model
/// spelled it, which is what the function response must carry back.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExchange {
    pub model_name: String,
    pub call: ToolCall,
    pub result: ToolResult,
}

/// Everything one model stream produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundOutput {
    /// Model turn for the history: answer text and function calls in order.
    pub model_parts: Vec<Part>,
    pub exchanges: Vec<ToolExchange>,
}

impl RoundOutput {
    fn record(&mut self, fragment: &StreamFragment) {
        match fragment {
            StreamFragment::AnswerText { text } => match self.model_parts.last_mut() {
                Some(Part::Text { text: last }) => last.push_str(text),
                _ => self.model_parts.push(Part::Text { text: text.clone() }),
            },
            StreamFragment::FunctionCall { name, arguments } => {
                self.model_parts.push(Part::FunctionCall {
                    function_call: FunctionCallPart {
                        name: name.clone(),
                        args: arguments.clone(),
                    },
                });
            }
            StreamFragment::ThoughtText { .. } => {}
        }
    }
}

/// Result of a finished turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSummary {
    pub turn_id: String,
    /// Raw answer text as streamed.
    pub answer: String,
    /// Rendered answer, or exactly [`EMPTY_ANSWER`] when the answer is blank.
    pub answer_html: String,
    pub thought: String,
    pub transitions: Vec<ChatState>,
    /// Rendered error message when the turn ended on a stream failure.
    pub error: Option<String>,
}

/// Applies streamed fragments to a [`TurnContext`].
#[derive(Clone)]
pub struct StreamAggregator {
    markdown: Arc<dyn MarkdownRenderer>,
}

impl Default for StreamAggregator {
    fn default() -> Self {
        Self::new(Arc::new(CommonMarkRenderer))
    }
}

impl std::fmt::Debug for StreamAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamAggregator").finish_non_exhaustive()
    }
}

impl StreamAggregator {
    pub fn new(markdown: Arc<dyn MarkdownRenderer>) -> Self {
        Self { markdown }
    }

    /// Start a turn: clear both buffers and move to `Generating`.
    pub fn begin(&self, ctx: &mut TurnContext) {
        ctx.thought.clear();
        ctx.answer.clear();
        ctx.set_state(ChatState::Generating);
    }

    /// Start a follow-up model stream within the same turn. Buffers are kept.
    pub fn next_round(&self, ctx: &mut TurnContext) {
        ctx.set_state(ChatState::Generating);
    }

    /// Apply one fragment. A function call is recorded as its own assistant
    /// message and returned for dispatch; it never enters the answer buffer.
    pub fn apply(&self, ctx: &mut TurnContext, fragment: StreamFragment) -> Option<ToolCall> {
        match fragment {
            StreamFragment::FunctionCall { name, arguments } => {
                let call = ToolCall::new(camel_to_kebab(&name), arguments);
                let record = json!({ "name": call.name, "arguments": call.arguments });
                let pretty =
                    serde_json::to_string_pretty(&record).unwrap_or_else(|_| record.to_string());
                ctx.emit(TurnEvent::MessageAdded {
                    role: MessageRole::Assistant,
                    html: self
                        .markdown
                        .render(&format!("Calling function:\n```json\n{}\n```", pretty)),
                });
                ctx.emit(TurnEvent::ToolCallRequested { call: call.clone() });
                Some(call)
            }
            StreamFragment::ThoughtText { text } => {
                ctx.set_state(ChatState::Thinking);
                ctx.thought.push_str(&text);
                ctx.emit(TurnEvent::ThoughtUpdated {
                    html: self.markdown.render(&ctx.thought),
                });
                None
            }
            StreamFragment::AnswerText { text } => {
                ctx.set_state(ChatState::Executing);
                ctx.answer.push_str(&text);
                ctx.emit(TurnEvent::AnswerUpdated {
                    html: self.markdown.render(&ctx.answer),
                });
                None
            }
        }
    }

    /// Drain `stream`, dispatching each function call as soon as it arrives.
    ///
    /// Any stream item error stops consumption and comes back as
    /// [`Error::StreamConsumption`]. Fragments applied before the error stay
    /// applied.
    pub async fn consume(
        &self,
        ctx: &mut TurnContext,
        mut stream: FragmentStream,
        dispatcher: &ToolDispatcher,
    ) -> Result<RoundOutput> {
        let mut output = RoundOutput::default();

        while let Some(item) = stream.next().await {
            let fragment = item.map_err(into_stream_error)?;
            debug!(turn_id = %ctx.turn_id, fragment = ?fragment, "stream fragment");
            output.record(&fragment);

            let model_name = match &fragment {
                StreamFragment::FunctionCall { name, .. } => name.clone(),
                _ => String::new(),
            };
            if let Some(call) = self.apply(ctx, fragment) {
                let result = dispatcher.dispatch(&call).await;
                ctx.emit(TurnEvent::ToolCallCompleted {
                    call: call.clone(),
                    result: result.clone(),
                });
                output.exchanges.push(ToolExchange {
                    model_name,
                    call,
                    result,
                });
            }
        }

        Ok(output)
    }

    /// End the turn. A failure becomes one error-role message; the state is
    /// forced back to `Idle` and partial buffers are left as they are.
    pub fn finish(&self, ctx: &mut TurnContext, outcome: Result<()>) -> TurnSummary {
        let error = outcome.err().map(|e| {
            let raw = e.to_string();
            warn!(turn_id = %ctx.turn_id, error = %raw, "turn ended with a stream failure");
            let html = recovery::recover_error_message(&raw, self.markdown.as_ref());
            ctx.emit(TurnEvent::MessageAdded {
                role: MessageRole::Error,
                html: html.clone(),
            });
            html
        });

        ctx.set_state(ChatState::Idle);

        let answer_html = if ctx.answer.trim().is_empty() {
            EMPTY_ANSWER.to_string()
        } else {
            self.markdown.render(&ctx.answer)
        };
        ctx.emit(TurnEvent::TurnCompleted {
            answer_html: answer_html.clone(),
        });

        TurnSummary {
            turn_id: ctx.turn_id.clone(),
            answer: ctx.answer.clone(),
            answer_html,
            thought: ctx.thought.clone(),
            transitions: ctx.transitions.clone(),
            error,
        }
    }
}

pub(crate) fn into_stream_error(e: Error) -> Error {
    match e {
        e @ Error::StreamConsumption(_) => e,
        other => Error::StreamConsumption(other.to_string()),
    }
}
