use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Final,
    /// In-flight placeholder; rendered as a typing indicator.
    Pending,
    Error,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Final => "final",
            MessageStatus::Pending => "pending",
            MessageStatus::Error => "error",
        }
    }
}

/// A single entry in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    text: String,
    sender: Sender,
    #[serde(default)]
    status: MessageStatus,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, MessageStatus::Final)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Assistant, MessageStatus::Final)
    }

    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Assistant, MessageStatus::Error)
    }

    pub fn pending() -> Self {
        Self::new(String::new(), Sender::Assistant, MessageStatus::Pending)
    }

    fn new(text: impl Into<String>, sender: Sender, status: MessageStatus) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            status,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn status(&self) -> MessageStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    pub fn is_error(&self) -> bool {
        self.status == MessageStatus::Error
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}
