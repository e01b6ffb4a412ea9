use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::ndjson::{interpret_line, FrameDecoder};
use crate::payload::ChatRequest;

/// Streaming HTTP client for the chat completion endpoint.
#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<HeaderMap, ChatApiError> {
        let mut headers = HeaderMap::new();
        if let Some(user_agent) = self.config.user_agent.as_deref() {
            headers.insert(
                USER_AGENT,
                HeaderValue::from_str(user_agent)
                    .map_err(|_| ChatApiError::InvalidHeader("user-agent".to_string()))?,
            );
        }
        for (key, value) in &self.config.extra_headers {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ChatApiError::InvalidHeader(key.clone()))?,
                HeaderValue::from_str(value)
                    .map_err(|_| ChatApiError::InvalidHeader(key.clone()))?,
            );
        }
        Ok(headers)
    }

    /// Stream one completion, invoking `on_delta` for each extracted text
    /// fragment in arrival order.
    ///
    /// A non-success status is mapped through the error body into
    /// [`ChatApiError::Status`]. A response with zero frames is a valid
    /// empty completion.
    pub async fn stream_with_handler<F>(
        &self,
        request: &ChatRequest,
        mut on_delta: F,
    ) -> Result<(), ChatApiError>
    where
        F: FnMut(String),
    {
        let response = self
            .http
            .post(&self.config.base_url)
            .headers(self.build_headers()?)
            .json(request)
            .send()
            .await
            .map_err(ChatApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatApiError::Status(status, parse_error_message(status, &body)));
        }

        let mut bytes = response.bytes_stream();
        let mut decoder = FrameDecoder::default();
        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(ChatApiError::from)?;
            for line in decoder.feed(&chunk) {
                if let Some(text) = interpret_line(&line) {
                    on_delta(text);
                }
            }
        }
        decoder.finish();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ChatApiClient;
    use crate::config::ChatApiConfig;
    use crate::error::ChatApiError;

    #[test]
    fn new_builds_a_client_around_the_given_config() {
        let config = ChatApiConfig::new("http://localhost:9999/api/chat")
            .with_user_agent("quill-chat/0.1")
            .with_timeout(Duration::from_secs(30));
        let client = ChatApiClient::new(config).expect("client should build");

        assert_eq!(client.config().base_url, "http://localhost:9999/api/chat");
        assert_eq!(client.config().user_agent.as_deref(), Some("quill-chat/0.1"));
    }

    #[test]
    fn build_headers_rejects_invalid_header_values() {
        let config = ChatApiConfig::default().insert_header("x-tenant", "bad\nvalue");
        let client = ChatApiClient::new(config).expect("client should build");

        let error = client
            .build_headers()
            .expect_err("control characters must be rejected");
        assert!(matches!(error, ChatApiError::InvalidHeader(key) if key == "x-tenant"));
    }

    #[test]
    fn build_headers_carries_user_agent_and_extras() {
        let config = ChatApiConfig::default()
            .with_user_agent("quill-chat/0.1")
            .insert_header("x-tenant", "acme");
        let client = ChatApiClient::new(config).expect("client should build");

        let headers = client.build_headers().expect("headers should build");
        assert_eq!(
            headers.get("user-agent").and_then(|v| v.to_str().ok()),
            Some("quill-chat/0.1")
        );
        assert_eq!(
            headers.get("x-tenant").and_then(|v| v.to_str().ok()),
            Some("acme")
        );
    }
}
