use serde_json::Value;
use tracing::{debug, warn};

/// Incremental decoder for the newline-delimited frame stream.
///
/// Chunks may split a frame anywhere, including inside a multi-byte UTF-8
/// sequence; undecoded trailing bytes carry over between feeds. The trailing
/// segment after the last `\n` is retained and never emitted as a frame.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    buffer: String,
}

impl FrameDecoder {
    /// Feed one chunk of response bytes and drain all complete lines.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut lines = Vec::new();
        while let Some(split) = self.buffer.find('\n') {
            let line = self.buffer[..split].to_string();
            self.buffer.drain(0..=split);
            lines.push(line);
        }

        lines
    }

    /// Flush at stream end. A valid stream terminates every frame with `\n`,
    /// so a non-empty tail here is a truncated final frame and is dropped.
    pub fn finish(&mut self) {
        if !self.pending.is_empty() || !self.buffer.trim().is_empty() {
            debug!(tail = self.buffer.as_str(), "dropping truncated trailing frame");
        }
        self.pending.clear();
        self.buffer.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.buffer.trim().is_empty()
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(error) => {
                    let valid_up_to = error.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.pending[..valid_up_to]) {
                        self.buffer.push_str(text);
                    }
                    match error.error_len() {
                        // Incomplete sequence at the chunk boundary: keep the
                        // bytes for the next feed.
                        None => {
                            self.pending.drain(0..valid_up_to);
                            return;
                        }
                        Some(invalid) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(0..valid_up_to + invalid);
                        }
                    }
                }
            }
        }
    }
}

/// Extract the delta text from one complete frame line.
///
/// Malformed lines are logged and dropped without aborting the stream. Frame
/// kinds other than `content_block_delta`, and empty deltas, yield nothing.
#[must_use]
pub fn interpret_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let value = match serde_json::from_str::<Value>(line) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, line, "skipping malformed stream frame");
            return None;
        }
    };

    if value.get("type").and_then(Value::as_str) != Some("content_block_delta") {
        return None;
    }

    let text = value
        .get("delta")
        .and_then(|delta| delta.get("text"))
        .and_then(Value::as_str)?;

    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{interpret_line, FrameDecoder};

    #[test]
    fn feed_retains_the_trailing_segment_across_chunks() {
        let mut decoder = FrameDecoder::default();

        assert!(decoder
            .feed(br#"{"type":"content_block_delta","delta":{"type":"text_delta","#)
            .is_empty());
        let lines = decoder.feed(b"\"text\":\"Hel\"}}\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(interpret_line(&lines[0]).as_deref(), Some("Hel"));
        assert!(decoder.is_empty());
    }

    #[test]
    fn interpret_line_ignores_blank_lines_and_other_frame_kinds() {
        assert_eq!(interpret_line(""), None);
        assert_eq!(interpret_line("   "), None);
        assert_eq!(interpret_line(r#"{"type":"message_stop"}"#), None);
        assert_eq!(
            interpret_line(r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":""}}"#),
            None
        );
    }
}
