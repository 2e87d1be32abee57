//! Gemini 流式生成 API 适配器：构造请求体并把 SSE 响应转换为流片段
//!
//! Google Gemini `streamGenerateContent` adapter. Key points:
//! - `contents` carry `parts`; roles are `user` and `model`.
//! - The system prompt goes in `systemInstruction`.
//! - Tools are advertised as `tools: [{functionDeclarations}]` with camelCase
//!   names; the registry's kebab-case names are converted on the way out.
//! - `?alt=sse` makes the endpoint stream one full response object per frame.
//! - The API key is sent in the `x-goog-api-key` header.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::config::AgentConfig;
use crate::error::{Error, ErrorContext};
use crate::pipeline::decode::SseDecoder;
use crate::pipeline::fragments::map_chunks;
use crate::pipeline::FragmentStream;
use crate::transport::HttpTransport;
use crate::types::{Content, ToolDefinition};
use crate::utils::kebab_to_camel;
use crate::Result;

use super::ChatModel;

/// Gemini chat model over HTTP.
#[derive(Debug, Clone)]
pub struct GeminiChat {
    transport: HttpTransport,
    endpoint: Url,
    api_key: String,
    system_instruction: String,
    include_thoughts: bool,
    function_declarations: Vec<Value>,
}

impl GeminiChat {
    /// Fails fast with a configuration error when no API key is configured.
    pub fn new<'a>(
        config: &AgentConfig,
        transport: HttpTransport,
        tools: impl IntoIterator<Item = &'a ToolDefinition>,
    ) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let endpoint = Self::endpoint(&config.base_url, &config.model)?;
        let function_declarations = tools.into_iter().map(function_declaration).collect();

        Ok(Self {
            transport,
            endpoint,
            api_key,
            system_instruction: config.system_instruction.clone(),
            include_thoughts: config.include_thoughts,
            function_declarations,
        })
    }

    fn endpoint(base_url: &str, model: &str) -> Result<Url> {
        let raw = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            base_url.trim_end_matches('/'),
            model
        );
        Url::parse(&raw).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid model endpoint: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(raw.clone()),
            )
        })
    }

    pub fn endpoint_url(&self) -> &Url {
        &self.endpoint
    }

    /// Request body for one `streamGenerateContent` call.
    pub fn build_request(&self, history: &[Content]) -> Result<Value> {
        let mut body = json!({
            "contents": serde_json::to_value(history)?,
            "generationConfig": {
                "thinkingConfig": { "includeThoughts": self.include_thoughts }
            },
        });

        if !self.system_instruction.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{ "text": self.system_instruction }]
            });
        }
        if !self.function_declarations.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": self.function_declarations }]);
        }

        Ok(body)
    }
}

fn function_declaration(def: &ToolDefinition) -> Value {
    json!({
        "name": kebab_to_camel(&def.name),
        "description": def.description,
        "parameters": def.parameters_schema(),
    })
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn stream(&self, history: &[Content]) -> Result<FragmentStream> {
        let body = self.build_request(history)?;
        debug!(endpoint = %self.endpoint, entries = history.len(), "starting model stream");

        let bytes = self
            .transport
            .post_stream(
                self.endpoint.clone(),
                &[("x-goog-api-key", self.api_key.as_str())],
                &body,
            )
            .await?;

        let chunks = SseDecoder::default().decode_stream(bytes);
        Ok(map_chunks(chunks))
    }
}
