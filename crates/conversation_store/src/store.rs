use crate::ids;
use crate::schema::{Conversation, Message, Prompt};

/// Authoritative state tree for one chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub prompts: Vec<Prompt>,
    pub conversations: Vec<Conversation>,
    pub current_conversation_id: Option<String>,
    pub is_loading: bool,
    pub is_banner_visible: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            prompts: Vec::new(),
            conversations: Vec::new(),
            current_conversation_id: None,
            is_loading: false,
            is_banner_visible: true,
        }
    }
}

/// Owner of the state tree. All mutation goes through the reducer methods
/// below; there is no other write path.
#[derive(Debug, Default)]
pub struct ConversationStore {
    state: State,
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    // Prompt reducers.

    /// Creates a prompt and makes it the single active one.
    pub fn create_prompt(&mut self, name: impl Into<String>, content: impl Into<String>) -> String {
        let id = ids::wall_clock_id();
        for prompt in &mut self.state.prompts {
            prompt.is_active = false;
        }
        self.state.prompts.push(Prompt {
            id: id.clone(),
            name: name.into(),
            content: content.into(),
            is_active: true,
            created_at: ids::unix_millis_now(),
        });
        id
    }

    pub fn delete_prompt(&mut self, id: &str) {
        self.state.prompts.retain(|prompt| prompt.id != id);
    }

    /// Activating a prompt deactivates every other one; deactivating touches
    /// only the named prompt.
    pub fn set_prompt_active(&mut self, id: &str, active: bool) {
        for prompt in &mut self.state.prompts {
            if active {
                prompt.is_active = prompt.id == id;
            } else if prompt.id == id {
                prompt.is_active = false;
            }
        }
    }

    // Conversation reducers.

    pub fn set_conversations(&mut self, conversations: Vec<Conversation>) {
        self.state.conversations = conversations;
    }

    pub fn set_current_conversation(&mut self, id: Option<String>) {
        self.state.current_conversation_id = id;
    }

    /// Inserts a conversation and selects it. An already-present identifier
    /// is selected rather than inserted again, keeping identifiers distinct.
    pub fn create_conversation(&mut self, conversation: Conversation) {
        let id = conversation.id.clone();
        if !self.state.conversations.iter().any(|conv| conv.id == id) {
            self.state.conversations.push(conversation);
        }
        self.state.current_conversation_id = Some(id);
    }

    /// Rewrites a conversation identifier and the selection pointer in one
    /// step, so no observer sees them referring to different values.
    pub fn update_conversation_id(&mut self, old_id: &str, new_id: &str) {
        for conversation in &mut self.state.conversations {
            if conversation.id == old_id {
                conversation.id = new_id.to_string();
            }
        }
        if self.state.current_conversation_id.as_deref() == Some(old_id) {
            self.state.current_conversation_id = Some(new_id.to_string());
        }
    }

    pub fn rename_conversation(&mut self, id: &str, title: impl Into<String>) {
        let title = title.into();
        for conversation in &mut self.state.conversations {
            if conversation.id == id {
                conversation.title = title;
                break;
            }
        }
    }

    pub fn delete_conversation(&mut self, id: &str) {
        self.state.conversations.retain(|conversation| conversation.id != id);
        if self.state.current_conversation_id.as_deref() == Some(id) {
            self.state.current_conversation_id = None;
        }
    }

    /// Appends to the named conversation. Returns false when the identifier
    /// is unknown; the caller decides how to surface that condition.
    pub fn append_message(&mut self, conversation_id: &str, message: Message) -> bool {
        match self
            .state
            .conversations
            .iter_mut()
            .find(|conversation| conversation.id == conversation_id)
        {
            Some(conversation) => {
                conversation.messages.push(message);
                true
            }
            None => false,
        }
    }

    // Flag reducers.

    pub fn set_loading(&mut self, is_loading: bool) {
        self.state.is_loading = is_loading;
    }

    pub fn set_banner_visible(&mut self, is_banner_visible: bool) {
        self.state.is_banner_visible = is_banner_visible;
    }

    // Selectors.

    #[must_use]
    pub fn active_prompt(&self) -> Option<&Prompt> {
        self.state.prompts.iter().find(|prompt| prompt.is_active)
    }

    #[must_use]
    pub fn prompts(&self) -> &[Prompt] {
        &self.state.prompts
    }

    #[must_use]
    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.state
            .conversations
            .iter()
            .find(|conversation| conversation.id == id)
    }

    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.state.conversations
    }

    #[must_use]
    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.state
            .current_conversation_id
            .as_deref()
            .and_then(|id| self.conversation(id))
    }

    #[must_use]
    pub fn current_conversation_id(&self) -> Option<&str> {
        self.state.current_conversation_id.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    #[must_use]
    pub fn is_banner_visible(&self) -> bool {
        self.state.is_banner_visible
    }
}
