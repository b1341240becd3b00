//! # Chat Messages
//!
//! Rendered messages sent to the model, the history turns supplied by the caller, and
//! the message templates a scene prompt is built from.

use crate::errors::ComposeError;
use serde::{Deserialize, Serialize};

/// The role of a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    Human,
    Ai,
}

impl Role {
    /// The role name used by OpenAI-compatible chat APIs.
    pub fn openai_name(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Ai => "assistant",
        }
    }
}

/// A role-tagged text unit; an ordered list of these forms one model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// Who spoke a prior turn. History cannot carry system messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Human,
    Ai,
}

/// A prior conversation turn, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl HistoryTurn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Human,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Ai,
            text: text.into(),
        }
    }
}

impl From<&HistoryTurn> for Message {
    fn from(turn: &HistoryTurn) -> Self {
        match turn.speaker {
            Speaker::Human => Message::human(turn.text.clone()),
            Speaker::Ai => Message::ai(turn.text.clone()),
        }
    }
}

/// One slot of a chat prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTemplate {
    System(String),
    /// Expanded into the caller's history turns; expands to nothing when empty.
    Placeholder(String),
    Human(String),
}

/// An ordered message template: one system slot, one history placeholder, and a final
/// human slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPromptTemplate {
    messages: Vec<MessageTemplate>,
}

impl ChatPromptTemplate {
    /// Validates the slot layout.
    pub fn new(messages: Vec<MessageTemplate>) -> Result<Self, ComposeError> {
        let systems = messages
            .iter()
            .filter(|m| matches!(m, MessageTemplate::System(_)))
            .count();
        let placeholders = messages
            .iter()
            .filter(|m| matches!(m, MessageTemplate::Placeholder(_)))
            .count();
        if systems != 1 {
            return Err(ComposeError::InvalidTemplate(format!(
                "expected exactly one system message, found {systems}"
            )));
        }
        if placeholders != 1 {
            return Err(ComposeError::InvalidTemplate(format!(
                "expected exactly one history placeholder, found {placeholders}"
            )));
        }
        if !matches!(messages.last(), Some(MessageTemplate::Human(_))) {
            return Err(ComposeError::InvalidTemplate(
                "the last message must be the human question".to_string(),
            ));
        }
        Ok(Self { messages })
    }

    pub fn messages(&self) -> &[MessageTemplate] {
        &self.messages
    }
}
