use crate::{BoxStream, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::Proxy;
use std::env;
use std::time::Duration;

/// Shared HTTP client for the model stream and the location lookup.
///
/// Timeouts live here and nowhere else; callers never impose their own.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        // Minimal production-friendly defaults (env-overridable).
        let timeout_secs = env::var("AI_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        Self::with_timeout(Duration::from_secs(timeout_secs))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("AI_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("AI_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client })
    }

    /// GET `url` and decode the body as JSON. Non-2xx statuses are errors.
    pub async fn get_json(&self, url: url::Url) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::Transport(TransportError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        response
            .json()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
    }

    /// POST a JSON body and return the response body as a byte stream.
    ///
    /// A non-2xx status is turned into [`TransportError::Status`] carrying the
    /// body text, which for model APIs embeds a JSON error payload.
    pub async fn post_stream(
        &self,
        url: url::Url,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<BoxStream<'static, Bytes>> {
        let mut req = self.client.post(url).json(body);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        req = req.header("accept", "text/event-stream");

        let resp = req
            .send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(crate::Error::Transport(TransportError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let byte_stream = resp
            .bytes_stream()
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(byte_stream))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Other(String),
}
