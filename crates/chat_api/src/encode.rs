use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// Incremental event emitted by the model provider during one completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderEvent {
    MessageStart,
    ContentBlockStart,
    ContentBlockDelta { delta: ProviderDelta },
    ContentBlockStop,
    MessageDelta,
    MessageStop,
}

/// Delta payload inside a `content_block_delta` provider event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderDelta {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
}

/// The single frame kind the wire format carries to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame {
    ContentBlockDelta { delta: FrameDelta },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FrameDelta {
    TextDelta { text: String },
}

/// Encode one provider event as a newline-terminated frame.
///
/// Only text deltas produce output; every other event kind yields nothing.
#[must_use]
pub fn encode_event(event: &ProviderEvent) -> Option<Vec<u8>> {
    match event {
        ProviderEvent::ContentBlockDelta {
            delta: ProviderDelta::TextDelta { text },
        } => {
            let frame = Frame::ContentBlockDelta {
                delta: FrameDelta::TextDelta { text: text.clone() },
            };
            let mut bytes = serde_json::to_vec(&frame).ok()?;
            bytes.push(b'\n');
            Some(bytes)
        }
        _ => None,
    }
}

/// Adapt a provider event stream into NDJSON frame bytes.
///
/// One event in, at most one frame out; nothing is batched. A provider error
/// passes through as the stream's final item, so consumers can tell a clean
/// end from a mid-stream failure.
pub fn frame_stream<S, E>(events: S) -> impl Stream<Item = Result<Vec<u8>, E>>
where
    S: Stream<Item = Result<ProviderEvent, E>>,
{
    let mut failed = false;
    events.filter_map(move |event| {
        let item = if failed {
            None
        } else {
            match event {
                Ok(event) => encode_event(&event).map(Ok),
                Err(error) => {
                    failed = true;
                    Some(Err(error))
                }
            }
        };
        async move { item }
    })
}
