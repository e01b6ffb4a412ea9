use conversation_store::Message;
use serde::{Deserialize, Serialize};

/// Prefix carried by synthetic assistant error messages. Such messages are
/// stripped from request history before it reaches the model provider.
pub const ERROR_MESSAGE_PREFIX: &str = "Sorry, I encountered an error";

/// Built-in system prompt applied to every provider request. An enabled
/// custom prompt is layered after it, never instead of it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful AI assistant using Markdown for clear and structured responses. \
Format your responses following these guidelines:

1. Use headers for main topics and subtopics.
2. Use bullet points for unordered lists and numbers when sequence matters.
3. Use inline `code` for short snippets and triple backticks with a language \
tag for blocks.
4. Use **bold** for important points, *italics* for emphasis, and > for \
callouts.
5. Use tables for structured data and break long answers into short, focused \
paragraphs.

Keep responses concise and well-structured.";

/// Request payload for one streaming completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<SystemPrompt>,
}

/// User-configurable system prompt carried alongside the message history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPrompt {
    pub value: String,
    pub enabled: bool,
}

impl ChatRequest {
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            system_prompt: None,
        }
    }

    #[must_use]
    pub fn with_system_prompt(mut self, value: impl Into<String>) -> Self {
        self.system_prompt = Some(SystemPrompt {
            value: value.into(),
            enabled: true,
        });
        self
    }

    /// Message history as sent to the provider: content trimmed, blank
    /// entries and synthetic error messages dropped.
    ///
    /// An empty result is the caller's 400 condition.
    #[must_use]
    pub fn sanitized_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|message| {
                let content = message.content.trim();
                !content.is_empty() && !content.starts_with(ERROR_MESSAGE_PREFIX)
            })
            .map(|message| Message {
                id: message.id.clone(),
                role: message.role,
                content: message.content.trim().to_string(),
            })
            .collect()
    }

    /// Default guidance plus the enabled custom prompt, separated by a blank
    /// line. A disabled or blank custom prompt leaves the default alone.
    #[must_use]
    pub fn resolved_system_prompt(&self) -> String {
        match &self.system_prompt {
            Some(prompt) if prompt.enabled && !prompt.value.trim().is_empty() => {
                format!("{DEFAULT_SYSTEM_PROMPT}\n\n{}", prompt.value)
            }
            _ => DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}
