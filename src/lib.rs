//! Streaming chat client core.
//!
//! Invariant: single draft writer — only the active typewriter drain task
//! appends to the pending assistant draft, and the committed state tree is
//! mutated only through the conversation store's reducer set.
//!
//! # Public API Overview
//! - Drive a full exchange with [`ChatSession::submit`]: optimistic local
//!   state, streamed response ingestion, paced rendering, and best-effort
//!   remote mirroring.
//! - Observe the in-flight draft through [`ChatSession::draft`].
//! - Plug in any [`ResponseTransport`]; the production implementation is
//!   `chat_api::ChatApiClient`.
//! - Reuse [`Typewriter`] and the fence classifier directly when embedding
//!   the pacing behavior elsewhere.

pub mod error;
pub mod fence;
pub mod session;
pub mod transport;
pub mod typewriter;

pub use error::ChatError;
pub use fence::inside_code_fence;
pub use session::{title_from_input, ChatSession};
pub use transport::ResponseTransport;
pub use typewriter::{pacing_for, Pacing, Typewriter, CODE_PACING, PROSE_PACING};
