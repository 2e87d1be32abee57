//! 客户端模块：流式聊天模型接口、Gemini 适配器与会话循环。
//!
//! # Client Module
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ChatModel`] | Anything that streams fragments for a conversation history |
//! | [`GeminiChat`] | `streamGenerateContent` over SSE |
//! | [`ChatSession`] | Turn loop: stream, dispatch, feed results back |

pub mod gemini;
pub mod session;

use async_trait::async_trait;

use crate::pipeline::FragmentStream;
use crate::types::Content;
use crate::Result;

pub use gemini::GeminiChat;
pub use session::ChatSession;

/// A streaming chat model.
///
/// An error from `stream` means the stream could not be started. Errors while
/// iterating are yielded as stream items.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn stream(&self, history: &[Content]) -> Result<FragmentStream>;
}
