//! # ai-maps-agent
//!
//! 地图对话助手的工具调用运行时：流式聚合模型输出，并在函数调用到达时立即调度地图工具。
//!
//! Tool-call runtime for a map-aware chat assistant. A model's streamed
//! response is aggregated into UI events while every function call it emits
//! is dispatched to a registered tool as soon as it arrives.
//!
//! ## Overview
//!
//! - **Tool Registry**: six built-in map tools with declarative argument schemas
//! - **Tool Dispatcher**: validation, typed arguments, and a result for every call
//! - **Streaming Aggregator**: per-turn state machine over thought/answer/call fragments
//! - **Parameter Router**: tool arguments → [`MapQuery`] for the map renderer
//! - **Location Extractor**: coordinates out of a rental lookup payload
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ai_maps_agent::client::{ChatSession, GeminiChat};
//! use ai_maps_agent::tools::{HttpLocationLookup, MapToolbox};
//! use ai_maps_agent::{AgentConfig, HttpTransport, MapQuery, ToolDispatcher, ToolRegistry};
//!
//! #[tokio::main]
//! async fn main() -> ai_maps_agent::Result<()> {
//!     let config = AgentConfig::from_env()?;
//!     let transport = HttpTransport::new()?;
//!
//!     let renderer = Arc::new(|query: MapQuery| println!("map: {:?}", query));
//!     let lookup = Arc::new(HttpLocationLookup::new(&config.lookup, transport.clone())?);
//!     let registry = Arc::new(ToolRegistry::with_map_tools(Arc::new(MapToolbox::new(renderer, lookup)))?);
//!
//!     let model = GeminiChat::new(&config, transport, registry.definitions())?;
//!     let mut session = ChatSession::new(Arc::new(model), ToolDispatcher::new(registry));
//!
//!     let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//!     let summary = session.send_message("Show me the Colosseum", tx).await;
//!     println!("{}", summary.answer_html);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Tool registry |
//! | [`dispatch`] | Tool dispatcher and argument validation |
//! | [`tools`] | Built-in map tools and the rental lookup |
//! | [`router`] | Parameter router and map renderer interface |
//! | [`pipeline`] | SSE decoding and the streaming aggregator |
//! | [`client`] | Chat model interface, Gemini adapter, chat session |
//! | [`types`] | Core type definitions (tools, map queries, events) |
//! | [`utils`] | JSON paths, coordinate extraction, name conversion |

pub mod client;
pub mod config;
pub mod dispatch;
pub mod markdown;
pub mod pipeline;
pub mod registry;
pub mod router;
pub mod tools;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use config::AgentConfig;
pub use dispatch::ToolDispatcher;
pub use pipeline::{StreamAggregator, TurnContext, TurnSummary};
pub use registry::ToolRegistry;
pub use router::MapRenderer;
pub use transport::HttpTransport;
pub use types::{
    ChatState, Coordinates, MapQuery, StreamFragment, ToolCall, ToolDefinition, ToolResult,
    TurnEvent,
};
pub use utils::extract_coordinates;

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
