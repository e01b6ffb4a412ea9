//! Chat session orchestration.
//!
//! Local state is authoritative for the running session. Every mutation
//! applies to the conversation store synchronously, then mirrors to the
//! remote document store best-effort; mirror calls are spawned and never
//! block a reducer or the rendering path. A conversation whose remote create
//! fails stays in local-only mode for its remaining lifetime.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chat_api::{ChatApiError, ChatRequest, SystemPrompt, ERROR_MESSAGE_PREFIX};
use conversation_store::{
    local_conversation_id, wall_clock_id, Conversation, ConversationStore, Message,
};
use document_store::{DocumentStore, DocumentStoreError};
use tokio::sync::watch;
use tracing::warn;

use crate::error::ChatError;
use crate::transport::ResponseTransport;
use crate::typewriter::Typewriter;

/// Orchestrates one user's chat session over the shared state tree.
pub struct ChatSession {
    store: Arc<Mutex<ConversationStore>>,
    transport: Arc<dyn ResponseTransport>,
    remote: Option<Arc<dyn DocumentStore>>,
    typewriter: Typewriter,
}

impl ChatSession {
    #[must_use]
    pub fn new(transport: Arc<dyn ResponseTransport>) -> Self {
        Self {
            store: Arc::new(Mutex::new(ConversationStore::new())),
            transport,
            remote: None,
            typewriter: Typewriter::new(),
        }
    }

    /// Attach the remote document store mirrored behind local state.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn DocumentStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Shared handle to the state tree. Reducers on the store are the only
    /// mutation entry points; hold the lock only for short, non-awaiting
    /// sections.
    #[must_use]
    pub fn store(&self) -> Arc<Mutex<ConversationStore>> {
        Arc::clone(&self.store)
    }

    /// Observe the in-flight assistant draft as it is typed out.
    #[must_use]
    pub fn draft(&self) -> watch::Receiver<String> {
        self.typewriter.subscribe()
    }

    /// Replace local conversations with the remote store's contents.
    ///
    /// Failures leave local state untouched; an unreachable store is not an
    /// error from the session's point of view.
    pub async fn load_remote(&self) {
        let Some(remote) = &self.remote else {
            return;
        };
        match remote.list().await {
            Ok(conversations) if !conversations.is_empty() => {
                self.lock_store().set_conversations(conversations);
            }
            Ok(_) => {}
            Err(error) => {
                warn!(%error, "conversations could not be loaded from the document store");
            }
        }
    }

    /// Submit one user message and stream the assistant response to
    /// completion.
    ///
    /// Refused while a previous stream is in flight: the active drain task
    /// keeps exclusive ownership of the pending draft, so two submissions
    /// never write the same slot.
    pub async fn submit(&self, input: &str) -> Result<(), ChatError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        {
            let mut store = self.lock_store();
            if store.is_loading() {
                return Err(ChatError::Busy);
            }
            store.set_loading(true);
        }

        let conversation_id = self.ensure_conversation(input);
        self.append_message(&conversation_id, Message::user(wall_clock_id(), input));
        self.stream_response(&conversation_id).await;

        self.lock_store().set_loading(false);
        Ok(())
    }

    /// Rename locally, then mirror the title change.
    pub fn rename_conversation(&self, id: &str, title: &str) {
        self.lock_store().rename_conversation(id, title);

        if let Some(remote) = &self.remote {
            let remote = Arc::clone(remote);
            let id = id.to_string();
            let title = title.to_string();
            spawn_mirror("update_title", async move {
                remote.update_title(&id, &title).await
            });
        }
    }

    /// Delete locally, then mirror the removal.
    pub fn delete_conversation(&self, id: &str) {
        self.lock_store().delete_conversation(id);

        if let Some(remote) = &self.remote {
            let remote = Arc::clone(remote);
            let id = id.to_string();
            spawn_mirror("remove", async move { remote.remove(&id).await });
        }
    }

    /// Append locally, then mirror without blocking.
    ///
    /// An unknown conversation identifier is the store-level NotFound
    /// condition: the append is dropped, logged, and nothing is mirrored.
    pub fn append_message(&self, conversation_id: &str, message: Message) {
        let appended = self
            .lock_store()
            .append_message(conversation_id, message.clone());
        if !appended {
            warn!(
                conversation = conversation_id,
                "append targeted an unknown conversation; staying local-only"
            );
            return;
        }

        if let Some(remote) = &self.remote {
            let remote = Arc::clone(remote);
            // Mirrors with whatever identifier the conversation holds right
            // now; if reconciliation rewrites it first, the remote call
            // reports NotFound and is ignored like any other mirror failure.
            let id = conversation_id.to_string();
            spawn_mirror("add_message", async move {
                remote.add_message(&id, message).await
            });
        }
    }

    /// Returns the current conversation identifier, creating and selecting a
    /// conversation first when none is active.
    ///
    /// Creation is synchronous in local state so the first message has a
    /// home before any remote work starts; the remote identifier is
    /// reconciled afterwards.
    fn ensure_conversation(&self, input: &str) -> String {
        if let Some(id) = self
            .lock_store()
            .current_conversation_id()
            .map(str::to_string)
        {
            return id;
        }

        let local_id = local_conversation_id();
        let title = title_from_input(input);
        self.lock_store()
            .create_conversation(Conversation::new(local_id.clone(), title.clone()));
        self.spawn_reconcile(local_id.clone(), title);
        local_id
    }

    fn spawn_reconcile(&self, local_id: String, title: String) {
        let Some(remote) = &self.remote else {
            return;
        };
        let remote = Arc::clone(remote);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            match remote.create(&title, Vec::new()).await {
                Ok(remote_id) => {
                    // Identifier and selection pointer move in one reducer
                    // call; observers never see them disagree.
                    lock_unpoisoned(&store).update_conversation_id(&local_id, &remote_id);
                }
                Err(error) => {
                    warn!(
                        %error,
                        conversation = local_id.as_str(),
                        "conversation create was not mirrored; staying local-only"
                    );
                }
            }
        });
    }

    async fn stream_response(&self, conversation_id: &str) {
        let request = self.build_request(conversation_id);

        let typewriter = self.typewriter.clone();
        let outcome = self
            .transport
            .stream_response(&request, &mut |text| typewriter.enqueue(text))
            .await;

        // A failed stream stops ingestion, but whatever is already queued
        // still types out before the draft is resolved.
        self.typewriter.drained().await;
        let draft = self.typewriter.take();

        match outcome {
            Ok(()) if !draft.trim().is_empty() => {
                self.append_message(
                    conversation_id,
                    Message::assistant(wall_clock_id(), draft),
                );
            }
            // An empty completion is valid and commits nothing.
            Ok(()) => {}
            Err(error) => {
                warn!(%error, "response stream failed");
                // The partial draft is discarded: a truncated answer is
                // never committed as if it were complete.
                self.append_message(
                    conversation_id,
                    Message::assistant(wall_clock_id(), error_message_content(&error)),
                );
            }
        }
    }

    fn build_request(&self, conversation_id: &str) -> ChatRequest {
        let store = self.lock_store();
        let messages = store
            .conversation(conversation_id)
            .map(|conversation| conversation.messages.clone())
            .unwrap_or_default();
        let system_prompt = store.active_prompt().map(|prompt| SystemPrompt {
            value: prompt.content.clone(),
            enabled: true,
        });
        ChatRequest {
            messages,
            system_prompt,
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, ConversationStore> {
        lock_unpoisoned(&self.store)
    }
}

/// First three whitespace-separated words of the input, with an ellipsis
/// when the input is longer.
#[must_use]
pub fn title_from_input(input: &str) -> String {
    let words: Vec<&str> = input.split_whitespace().collect();
    let title = words.iter().take(3).copied().collect::<Vec<_>>().join(" ");
    if words.len() > 3 {
        format!("{title}...")
    } else {
        title
    }
}

fn error_message_content(error: &ChatApiError) -> String {
    match error {
        ChatApiError::Status(_, message) => format!("{ERROR_MESSAGE_PREFIX}: {message}"),
        _ => format!("{ERROR_MESSAGE_PREFIX} generating a response. Please try again."),
    }
}

fn spawn_mirror<F>(operation: &'static str, task: F)
where
    F: Future<Output = Result<(), DocumentStoreError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = task.await {
            warn!(%error, operation, "remote mirror call failed");
        }
    });
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::title_from_input;

    #[test]
    fn title_is_the_first_three_words() {
        assert_eq!(title_from_input("hi"), "hi");
        assert_eq!(title_from_input("explain rust lifetimes"), "explain rust lifetimes");
    }

    #[test]
    fn longer_input_is_truncated_with_an_ellipsis() {
        assert_eq!(
            title_from_input("explain rust lifetimes to me please"),
            "explain rust lifetimes..."
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(title_from_input("  hello   world  "), "hello world");
    }
}
