//! Code-fence detection over accumulated draft text.

/// Marker that opens and closes a fenced code block.
const FENCE_MARKER: &str = "```";

/// True when `text` ends inside an open fenced code block.
///
/// Counts the fence markers seen so far: an odd count means the most recent
/// fence is still open. Pure function of the accumulated text, so pacing
/// decisions stay independently testable.
#[must_use]
pub fn inside_code_fence(text: &str) -> bool {
    text.matches(FENCE_MARKER).count() % 2 == 1
}
