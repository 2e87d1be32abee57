//! 类型系统模块：工具协议、地图查询与流式事件的核心数据类型。
//!
//! # Types Module
//!
//! Strongly-typed representations of everything that moves through a turn.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ToolDefinition`] | Tool name, description and ordered argument schema |
//! | [`ToolCall`] | Tool invocation requested by the model |
//! | [`ToolResult`] | Text result returned to the model |
//! | [`MapQuery`] | Sparse payload for the map renderer |
//! | [`Coordinates`] | Latitude/longitude pair |
//! | [`StreamFragment`] | One unit of streamed model output |
//! | [`TurnEvent`] | Ordered UI event emitted during a turn |
//! | [`Content`] | Conversation history entry sent to the model |

pub mod events;
pub mod map;
pub mod message;
pub mod tool;

pub use events::{ChatState, StreamFragment, TurnEvent};
pub use map::{Coordinates, MapQuery};
pub use message::{Content, ContentRole, FunctionCallPart, FunctionResponsePart, MessageRole, Part};
pub use tool::{ArgumentSpec, ArgumentType, ToolCall, ToolContent, ToolDefinition, ToolResult};
