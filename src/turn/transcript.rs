use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Speaker of a transcript fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person practising (microphone side)
    Trainee,
    /// The simulated customer (provider side)
    Customer,
}

/// Partial transcript fragments for one role in the current turn
///
/// Fragments are kept in arrival order; the full utterance is their
/// concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBuffer {
    fragments: Vec<String>,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    /// Concatenation of all fragments
    pub fn text(&self) -> String {
        self.fragments.concat()
    }

    /// Append another buffer's fragments after this one's
    pub fn extend(&mut self, other: TranscriptBuffer) {
        self.fragments.extend(other.fragments);
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// True when the buffer holds no visible text after trimming
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// One entry of the conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered, append-only conversation transcript
#[derive(Debug, Clone, Default)]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id
    pub fn push(&mut self, message: Message) -> Uuid {
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Replace the text of an existing message
    ///
    /// Returns false if no message has that id.
    pub fn update_text(&mut self, id: Uuid, text: impl Into<String>) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_concatenates_in_arrival_order() {
        let mut buffer = TranscriptBuffer::new();
        buffer.push("您好，");
        buffer.push("请问有什么");
        buffer.push("可以帮您？");

        assert_eq!(buffer.text(), "您好，请问有什么可以帮您？");
        assert_eq!(buffer.fragment_count(), 3);
    }

    #[test]
    fn test_whitespace_only_buffer_is_blank() {
        let mut buffer = TranscriptBuffer::new();
        buffer.push("  ");
        buffer.push("\n");

        assert!(!buffer.is_empty());
        assert!(buffer.is_blank());
    }

    #[test]
    fn test_message_list_update() {
        let mut list = MessageList::new();
        let id = list.push(Message::new(Role::Customer, "我"));

        assert!(list.update_text(id, "我想问一下"));
        assert_eq!(list.get(id).map(|m| m.text.as_str()), Some("我想问一下"));
        assert!(!list.update_text(Uuid::new_v4(), "nothing"));
        assert_eq!(list.len(), 1);
    }
}
