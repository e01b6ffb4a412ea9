//! In-memory implementation of the document store contract.
//!
//! Used by tests and local development. Supports failure injection (an
//! offline switch that fails every call) and a create gate that holds
//! `create` until released, for exercising identifier-reconciliation races.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use conversation_store::{Conversation, Message};
use document_store::{DocumentStore, DocumentStoreError};
use tokio::sync::Notify;

/// Conversation document store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<Vec<Conversation>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    hold_creates: AtomicBool,
    create_gate: Arc<Notify>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// When offline, every operation fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// While held, `create` parks until [`Self::release_create`] is called.
    pub fn hold_creates(&self) {
        self.hold_creates.store(true, Ordering::SeqCst);
    }

    /// Releases one parked (or future) `create` call.
    pub fn release_create(&self) {
        self.create_gate.notify_one();
    }

    /// Snapshot of the stored documents, newest last.
    #[must_use]
    pub fn documents(&self) -> Vec<Conversation> {
        lock_unpoisoned(&self.documents).clone()
    }

    fn check_online(&self) -> Result<(), DocumentStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::unavailable("store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list(&self) -> Result<Vec<Conversation>, DocumentStoreError> {
        self.check_online()?;
        Ok(lock_unpoisoned(&self.documents).clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>, DocumentStoreError> {
        self.check_online()?;
        Ok(lock_unpoisoned(&self.documents)
            .iter()
            .find(|document| document.id == id)
            .cloned())
    }

    async fn create(
        &self,
        title: &str,
        messages: Vec<Message>,
    ) -> Result<String, DocumentStoreError> {
        self.check_online()?;
        if self.hold_creates.load(Ordering::SeqCst) {
            self.create_gate.notified().await;
            self.check_online()?;
        }

        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut documents = lock_unpoisoned(&self.documents);
        documents.push(Conversation {
            id: id.clone(),
            title: title.to_string(),
            messages,
        });
        Ok(id)
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), DocumentStoreError> {
        self.check_online()?;
        let mut documents = lock_unpoisoned(&self.documents);
        match documents.iter_mut().find(|document| document.id == id) {
            Some(document) => {
                document.title = title.to_string();
                Ok(())
            }
            None => Err(DocumentStoreError::not_found(id)),
        }
    }

    async fn add_message(&self, id: &str, message: Message) -> Result<(), DocumentStoreError> {
        self.check_online()?;
        let mut documents = lock_unpoisoned(&self.documents);
        match documents.iter_mut().find(|document| document.id == id) {
            Some(document) => {
                document.messages.push(message);
                Ok(())
            }
            None => Err(DocumentStoreError::not_found(id)),
        }
    }

    async fn remove(&self, id: &str) -> Result<(), DocumentStoreError> {
        self.check_online()?;
        let mut documents = lock_unpoisoned(&self.documents);
        let before = documents.len();
        documents.retain(|document| document.id != id);
        if documents.len() == before {
            return Err(DocumentStoreError::not_found(id));
        }
        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
