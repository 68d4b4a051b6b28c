use super::Message;

/// An ordered chat transcript plus at most one in-flight placeholder.
///
/// Only the committed messages are persisted; the pending placeholder is a
/// transient view concern and never survives a reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: Option<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstitutes from a persisted message list.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            pending: None,
        }
    }

    /// Parses a snapshot produced by [`Conversation::snapshot`].
    pub fn from_snapshot(json: &str) -> Result<Self, serde_json::Error> {
        let messages: Vec<Message> = serde_json::from_str(json)?;
        Ok(Self::from_messages(messages))
    }

    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.messages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending(&self) -> Option<&Message> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Committed messages only, like [`Conversation::len`].
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Committed messages followed by the pending placeholder, if any.
    pub fn render_order(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().chain(self.pending.iter())
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Installs a placeholder. Returns `false` if one is already present.
    pub(crate) fn set_pending(&mut self, placeholder: Message) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(placeholder);
        true
    }

    pub(crate) fn take_pending(&mut self) -> Option<Message> {
        self.pending.take()
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.pending = None;
    }
}
