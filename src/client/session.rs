//! Chat session: one conversation, many turns.
//!
//! A turn streams the model, dispatches function calls inline as they arrive,
//! and when a round produced calls, appends the model turn and the function
//! responses to the history and streams again. The loop stops when a round
//! produces no calls or after `max_tool_rounds` rounds.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::AgentConfig;
use crate::dispatch::ToolDispatcher;
use crate::pipeline::{into_stream_error, StreamAggregator, ToolExchange, TurnContext, TurnSummary};
use crate::types::{Content, FunctionResponsePart, MessageRole, Part, TurnEvent};
use crate::Result;

use super::ChatModel;

pub struct ChatSession {
    model: Arc<dyn ChatModel>,
    dispatcher: ToolDispatcher,
    aggregator: StreamAggregator,
    history: Vec<Content>,
    max_tool_rounds: usize,
}

impl ChatSession {
    pub fn new(model: Arc<dyn ChatModel>, dispatcher: ToolDispatcher) -> Self {
        Self {
            model,
            dispatcher,
            aggregator: StreamAggregator::default(),
            history: Vec::new(),
            max_tool_rounds: AgentConfig::default().max_tool_rounds,
        }
    }

    pub fn with_config(mut self, config: &AgentConfig) -> Self {
        self.max_tool_rounds = config.max_tool_rounds;
        self
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Run one turn for `text`. Never fails: a stream failure ends the turn
    /// with an error message and is reported in [`TurnSummary::error`].
    pub async fn send_message(
        &mut self,
        text: &str,
        events: mpsc::UnboundedSender<TurnEvent>,
    ) -> TurnSummary {
        let mut ctx = TurnContext::new(events);
        ctx.emit(TurnEvent::MessageAdded {
            role: MessageRole::User,
            html: crate::markdown::render_markdown(text),
        });
        self.history.push(Content::user(text));

        self.aggregator.begin(&mut ctx);
        let outcome = self.run_rounds(&mut ctx).await;
        let summary = self.aggregator.finish(&mut ctx, outcome);
        info!(
            turn_id = %summary.turn_id,
            failed = summary.error.is_some(),
            "turn finished"
        );
        summary
    }

    async fn run_rounds(&mut self, ctx: &mut TurnContext) -> Result<()> {
        let mut round = 0;
        loop {
            round += 1;
            if round > 1 {
                self.aggregator.next_round(ctx);
            }

            let stream = self
                .model
                .stream(&self.history)
                .await
                .map_err(into_stream_error)?;
            let output = self
                .aggregator
                .consume(ctx, stream, &self.dispatcher)
                .await?;

            if !output.model_parts.is_empty() {
                self.history.push(Content::model(output.model_parts));
            }
            if output.exchanges.is_empty() {
                return Ok(());
            }
            self.history.push(Content::function_responses(
                output.exchanges.iter().map(function_response).collect(),
            ));

            if round >= self.max_tool_rounds {
                warn!(
                    turn_id = %ctx.turn_id(),
                    rounds = round,
                    "tool round limit reached; ending turn"
                );
                return Ok(());
            }
        }
    }
}

fn function_response(exchange: &ToolExchange) -> Part {
    let response = if exchange.result.is_error {
        json!({ "error": exchange.result.joined_text() })
    } else {
        json!({ "output": exchange.result.joined_text() })
    };
    Part::FunctionResponse {
        function_response: FunctionResponsePart {
            name: exchange.model_name.clone(),
            response,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FragmentStream;
    use crate::registry::ToolRegistry;
    use crate::router::InMemoryMapRenderer;
    use crate::tools::{LocationLookup, MapToolbox, RentalQuery};
    use crate::types::{ContentRole, MapQuery, StreamFragment};
    use async_trait::async_trait;
    use futures::stream;
    use serde_json::Value;
    use std::sync::Mutex;

    struct NoLookup;

    #[async_trait]
    impl LocationLookup for NoLookup {
        async fn lookup(&self, _query: &RentalQuery) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    /// Replays one scripted response per call and records history lengths.
    struct ScriptedModel {
        rounds: Mutex<Vec<Vec<StreamFragment>>>,
        seen: Mutex<Vec<usize>>,
    }

    impl ScriptedModel {
        fn new(mut rounds: Vec<Vec<StreamFragment>>) -> Self {
            rounds.reverse();
            Self {
                rounds: Mutex::new(rounds),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn stream(&self, history: &[Content]) -> Result<FragmentStream> {
            self.seen.lock().unwrap().push(history.len());
            let next = self.rounds.lock().unwrap().pop().unwrap_or_default();
            Ok(Box::pin(stream::iter(next.into_iter().map(Ok))))
        }
    }

    fn session(model: Arc<ScriptedModel>) -> (ChatSession, Arc<InMemoryMapRenderer>) {
        let renderer = Arc::new(InMemoryMapRenderer::new());
        let toolbox = Arc::new(MapToolbox::new(renderer.clone(), Arc::new(NoLookup)));
        let registry = Arc::new(ToolRegistry::with_map_tools(toolbox).unwrap());
        (ChatSession::new(model, ToolDispatcher::new(registry)), renderer)
    }

    #[tokio::test]
    async fn test_function_call_round_trip() {
        let model = Arc::new(ScriptedModel::new(vec![
            vec![StreamFragment::function_call(
                "directions",
                json!({"origin": "Paris", "destination": "Rome"}),
            )],
            vec![StreamFragment::answer("Here is your route.")],
        ]));
        let (mut session, renderer) = session(model.clone());
        let (tx, _rx) = mpsc::unbounded_channel();

        let summary = session.send_message("Paris to Rome?", tx).await;

        assert_eq!(summary.answer, "Here is your route.");
        assert_eq!(renderer.queries(), vec![MapQuery::directions("Paris", "Rome")]);
        assert_eq!(*model.seen.lock().unwrap(), vec![1, 3]);

        let history = session.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[1].role, ContentRole::Model);
        assert_eq!(history[2].role, ContentRole::User);
        match &history[2].parts[0] {
            Part::FunctionResponse { function_response } => {
                assert_eq!(function_response.name, "directions");
                assert_eq!(
                    function_response.response["output"],
                    "Navigating from Paris to Rome"
                );
            }
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_round_limit_stops_loop() {
        let call = || vec![StreamFragment::function_call("search", json!({"search": "cafe"}))];
        let model = Arc::new(ScriptedModel::new(vec![call(), call(), call(), call()]));
        let (session, renderer) = session(model.clone());
        let mut session = session.with_config(&AgentConfig {
            max_tool_rounds: 2,
            ..AgentConfig::default()
        });
        let (tx, _rx) = mpsc::unbounded_channel();

        let summary = session.send_message("coffee", tx).await;

        assert_eq!(model.seen.lock().unwrap().len(), 2);
        assert_eq!(renderer.queries().len(), 2);
        assert_eq!(summary.answer_html, "Done");
    }

    #[tokio::test]
    async fn test_user_message_emitted_first() {
        let model = Arc::new(ScriptedModel::new(vec![vec![StreamFragment::answer("Hi")]]));
        let (mut session, _) = session(model);
        let (tx, mut rx) = mpsc::unbounded_channel();

        session.send_message("Hello", tx).await;

        assert_eq!(
            rx.try_recv().unwrap(),
            TurnEvent::MessageAdded {
                role: MessageRole::User,
                html: "<p>Hello</p>\n".into()
            }
        );
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn stream(&self, _history: &[Content]) -> Result<FragmentStream> {
            Err(crate::Error::Transport(crate::transport::TransportError::Status {
                status: 400,
                body: r#"{"error": {"code": 400, "message": "API key not valid."}}"#.into(),
            }))
        }
    }

    #[tokio::test]
    async fn test_start_failure_is_recovered() {
        let registry = Arc::new(ToolRegistry::new());
        let mut session = ChatSession::new(Arc::new(FailingModel), ToolDispatcher::new(registry));
        let (tx, _rx) = mpsc::unbounded_channel();

        let summary = session.send_message("hi", tx).await;

        assert_eq!(summary.error.as_deref(), Some("<p>API key not valid.</p>\n"));
        assert_eq!(summary.answer_html, "Done");
        assert_eq!(summary.transitions.last(), Some(&crate::types::ChatState::Idle));
    }
}
