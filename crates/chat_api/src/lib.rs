//! Transport primitives for the streaming chat endpoint.
//!
//! This crate owns the NDJSON wire format on both sides of the connection:
//! encoding provider events into line-delimited frames at the gateway, and
//! incrementally decoding/interpreting those frames on the client. It also
//! carries the streaming HTTP client, the request payload shapes, and the
//! error-body contract. It intentionally contains no UI state and no
//! persistence coupling.
//!
//! The interpreter is the single tolerance point for malformed server
//! payloads; everything downstream of it may assume well-formed input.

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod ndjson;
pub mod payload;

pub use client::ChatApiClient;
pub use config::{ChatApiConfig, DEFAULT_CHAT_ENDPOINT};
pub use encode::{encode_event, frame_stream, ProviderDelta, ProviderEvent};
pub use error::{
    empty_request_response, parse_error_message, upstream_error_response, ChatApiError, ErrorBody,
};
pub use ndjson::{interpret_line, FrameDecoder};
pub use payload::{ChatRequest, SystemPrompt, DEFAULT_SYSTEM_PROMPT, ERROR_MESSAGE_PREFIX};

pub use reqwest::StatusCode;
