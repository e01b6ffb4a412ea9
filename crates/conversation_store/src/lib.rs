//! In-memory conversation state for a chat session.
//!
//! The state tree (conversations, prompts, selection, loading/banner flags)
//! is mutated only through the fixed reducer set on [`ConversationStore`].
//! Every reducer is total; callers that need to observe a missing target do
//! so through the reducer's return value, never through a panic.

mod ids;
mod schema;
mod store;

pub use ids::{local_conversation_id, unix_millis_now, wall_clock_id};
pub use schema::{Conversation, Message, Prompt, Role};
pub use store::{ConversationStore, State};
