//! Seam between the session and the streaming chat endpoint.

use async_trait::async_trait;
use chat_api::{ChatApiClient, ChatApiError, ChatRequest};

/// Delivers one streaming completion, handing each decoded text fragment to
/// the caller in arrival order.
///
/// Tests substitute scripted implementations; production uses
/// [`ChatApiClient`].
#[async_trait]
pub trait ResponseTransport: Send + Sync + 'static {
    async fn stream_response(
        &self,
        request: &ChatRequest,
        on_delta: &mut (dyn FnMut(String) + Send),
    ) -> Result<(), ChatApiError>;
}

#[async_trait]
impl ResponseTransport for ChatApiClient {
    async fn stream_response(
        &self,
        request: &ChatRequest,
        on_delta: &mut (dyn FnMut(String) + Send),
    ) -> Result<(), ChatApiError> {
        self.stream_with_handler(request, on_delta).await
    }
}
