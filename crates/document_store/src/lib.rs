//! Contract for the remote conversation document store.
//!
//! This crate intentionally defines only the persistence collaborator
//! surface: six operations over conversation documents plus their error
//! taxonomy. Transport, storage, and retry concerns belong to
//! implementations; callers must treat every operation as fallible and never
//! assume a failure is transient.

use async_trait::async_trait;
use conversation_store::{Conversation, Message};
use thiserror::Error;

/// Failure reported by a document store operation.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("conversation document '{id}' was not found")]
    NotFound { id: String },

    #[error("document store is unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("document store rejected the operation: {reason}")]
    Rejected { reason: String },
}

impl DocumentStoreError {
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Remote persistence collaborator for conversations.
///
/// Local session state stays authoritative; implementations are mirrored
/// into best-effort and their failures are caller-visible but never fatal to
/// the session.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Returns every stored conversation.
    async fn list(&self) -> Result<Vec<Conversation>, DocumentStoreError>;

    /// Returns one conversation, or `None` when the identifier is unknown.
    async fn get(&self, id: &str) -> Result<Option<Conversation>, DocumentStoreError>;

    /// Creates a conversation and returns the store-assigned identifier.
    async fn create(
        &self,
        title: &str,
        messages: Vec<Message>,
    ) -> Result<String, DocumentStoreError>;

    /// Replaces the title of an existing conversation.
    async fn update_title(&self, id: &str, title: &str) -> Result<(), DocumentStoreError>;

    /// Appends a message to an existing conversation; fails with
    /// [`DocumentStoreError::NotFound`] when the conversation is absent.
    async fn add_message(&self, id: &str, message: Message) -> Result<(), DocumentStoreError>;

    /// Deletes a conversation.
    async fn remove(&self, id: &str) -> Result<(), DocumentStoreError>;
}

#[cfg(test)]
mod tests {
    use super::DocumentStoreError;

    #[test]
    fn error_display_names_the_failed_document() {
        let error = DocumentStoreError::not_found("doc-7");
        assert_eq!(
            error.to_string(),
            "conversation document 'doc-7' was not found"
        );
    }

    #[test]
    fn error_display_carries_the_reason() {
        assert_eq!(
            DocumentStoreError::unavailable("connection refused").to_string(),
            "document store is unavailable: connection refused"
        );
        assert_eq!(
            DocumentStoreError::rejected("schema mismatch").to_string(),
            "document store rejected the operation: schema mismatch"
        );
    }
}
