//! Adaptive typewriter pacing for the in-flight assistant draft.
//!
//! Network delivery is bursty; perceived typing should be smooth. Fragments
//! queue in arrival order and a single drain task emits them in small paced
//! slices, publishing every slice to a watch channel synchronously with the
//! content update.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::time::sleep;

use crate::fence::inside_code_fence;

/// Slice size and inter-slice delay for one content class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub chars_per_slice: usize,
    pub slice_delay: Duration,
}

/// Prose types out in small slices with a longer pause.
pub const PROSE_PACING: Pacing = Pacing {
    chars_per_slice: 2,
    slice_delay: Duration::from_millis(5),
};

/// Code blocks emit in larger slices with a shorter pause.
pub const CODE_PACING: Pacing = Pacing {
    chars_per_slice: 5,
    slice_delay: Duration::from_millis(2),
};

/// Pacing for the next fragment, chosen from the accumulated draft content.
#[must_use]
pub fn pacing_for(content: &str) -> Pacing {
    if inside_code_fence(content) {
        CODE_PACING
    } else {
        PROSE_PACING
    }
}

#[derive(Debug)]
struct RenderState {
    queue: VecDeque<String>,
    rendering: bool,
    content: String,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<RenderState>,
    draft: watch::Sender<String>,
    idle: Notify,
}

/// Single-flight rendering scheduler for one pending assistant message.
///
/// `enqueue` is safe to call repeatedly: at most one drain task runs at a
/// time, and the exit check happens under the same lock that clears the
/// rendering flag, so a fragment arriving at the exit boundary starts a
/// fresh task instead of being lost.
#[derive(Debug, Clone)]
pub struct Typewriter {
    shared: Arc<Shared>,
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Typewriter {
    #[must_use]
    pub fn new() -> Self {
        let (draft, _) = watch::channel(String::new());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RenderState {
                    queue: VecDeque::new(),
                    rendering: false,
                    content: String::new(),
                }),
                draft,
                idle: Notify::new(),
            }),
        }
    }

    /// Queue a fragment and start the drain task when none is running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, fragment: impl Into<String>) {
        let start_drain = {
            let mut state = lock_unpoisoned(&self.shared.state);
            state.queue.push_back(fragment.into());
            if state.rendering {
                false
            } else {
                state.rendering = true;
                true
            }
        };

        if start_drain {
            tokio::spawn(drain(Arc::clone(&self.shared)));
        }
    }

    /// Subscribe to draft updates; the receiver observes every emitted slice.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.shared.draft.subscribe()
    }

    /// Snapshot of the accumulated draft content.
    #[must_use]
    pub fn content(&self) -> String {
        lock_unpoisoned(&self.shared.state).content.clone()
    }

    /// True when the queue is empty and no drain task is running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let state = lock_unpoisoned(&self.shared.state);
        state.queue.is_empty() && !state.rendering
    }

    /// Wait until every queued fragment has been rendered.
    pub async fn drained(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Take the finished draft out of the scheduler, resetting it for the
    /// next pending message.
    #[must_use]
    pub fn take(&self) -> String {
        let content = {
            let mut state = lock_unpoisoned(&self.shared.state);
            std::mem::take(&mut state.content)
        };
        self.shared.draft.send_replace(String::new());
        content
    }
}

async fn drain(shared: Arc<Shared>) {
    loop {
        let (fragment, pacing) = {
            let mut state = lock_unpoisoned(&shared.state);
            match state.queue.pop_front() {
                Some(fragment) => {
                    let pacing = pacing_for(&state.content);
                    (fragment, pacing)
                }
                None => {
                    state.rendering = false;
                    drop(state);
                    shared.idle.notify_waiters();
                    return;
                }
            }
        };

        emit_sliced(&shared, &fragment, pacing).await;
    }
}

async fn emit_sliced(shared: &Shared, fragment: &str, pacing: Pacing) {
    let mut rest = fragment;
    while !rest.is_empty() {
        let (slice, remainder) = rest.split_at(slice_end(rest, pacing.chars_per_slice));
        rest = remainder;

        let snapshot = {
            let mut state = lock_unpoisoned(&shared.state);
            state.content.push_str(slice);
            state.content.clone()
        };
        shared.draft.send_replace(snapshot);

        sleep(pacing.slice_delay).await;
    }
}

/// Byte offset after at most `chars` characters, never splitting a codepoint.
fn slice_end(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| offset)
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{pacing_for, slice_end, Typewriter, CODE_PACING, PROSE_PACING};

    #[test]
    fn pacing_classes_differ_measurably() {
        assert!(CODE_PACING.chars_per_slice > PROSE_PACING.chars_per_slice);
        assert!(CODE_PACING.slice_delay < PROSE_PACING.slice_delay);
    }

    #[test]
    fn pacing_follows_fence_state_of_accumulated_content() {
        assert_eq!(pacing_for("plain prose"), PROSE_PACING);
        assert_eq!(pacing_for("open ```rust\nlet x = 1;"), CODE_PACING);
        assert_eq!(pacing_for("closed ```rust\nlet x = 1;\n```"), PROSE_PACING);
    }

    #[test]
    fn slice_end_respects_codepoint_boundaries() {
        assert_eq!(slice_end("héllo", 2), "hé".len());
        assert_eq!(slice_end("😀ok", 1), "😀".len());
        assert_eq!(slice_end("ab", 5), 2);
    }

    #[tokio::test]
    async fn fragments_render_in_order_to_their_concatenation() {
        let typewriter = Typewriter::new();
        for fragment in ["Hel", "lo, ", "wor", "ld!"] {
            typewriter.enqueue(fragment);
        }

        typewriter.drained().await;
        assert_eq!(typewriter.content(), "Hello, world!");
        assert!(typewriter.is_idle());
    }

    #[tokio::test]
    async fn fragments_enqueued_while_draining_are_not_lost() {
        let typewriter = Typewriter::new();
        typewriter.enqueue("first ");

        let feeder = {
            let typewriter = typewriter.clone();
            tokio::spawn(async move {
                for fragment in ["second ", "third"] {
                    tokio::time::sleep(Duration::from_millis(3)).await;
                    typewriter.enqueue(fragment);
                }
            })
        };
        feeder.await.expect("feeder should not panic");

        typewriter.drained().await;
        assert_eq!(typewriter.content(), "first second third");
    }

    #[tokio::test]
    async fn observers_see_the_final_draft_synchronously_with_updates() {
        let typewriter = Typewriter::new();
        let receiver = typewriter.subscribe();

        typewriter.enqueue("```rust\nfn main() {}\n```");
        typewriter.drained().await;

        assert_eq!(*receiver.borrow(), "```rust\nfn main() {}\n```");
    }

    #[tokio::test]
    async fn take_hands_over_the_draft_exactly_once() {
        let typewriter = Typewriter::new();
        typewriter.enqueue("draft");
        typewriter.drained().await;

        assert_eq!(typewriter.take(), "draft");
        assert_eq!(typewriter.take(), "");
        assert_eq!(*typewriter.subscribe().borrow(), "");
    }

    #[tokio::test]
    async fn multi_byte_fragments_survive_slicing() {
        let typewriter = Typewriter::new();
        typewriter.enqueue("héllo wörld 😀🚀✨");
        typewriter.drained().await;
        assert_eq!(typewriter.content(), "héllo wörld 😀🚀✨");
    }
}
