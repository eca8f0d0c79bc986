use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Which side of the conversation a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    EndUser,
    TeamMember,
}

impl Sender {
    pub fn is_team_member(&self) -> bool {
        matches!(self, Sender::TeamMember)
    }
}

/// A single transcript message. Timestamps travel as epoch milliseconds
/// on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            created_at,
        }
    }

    /// An inquiry is a message whose trimmed text ends with a question mark.
    /// This is a heuristic: users don't always punctuate their questions.
    pub fn is_inquiry(&self) -> bool {
        self.text.trim().ends_with('?')
    }
}

/// An ordered support-chat transcript. Messages must be chronological;
/// construction through [`ConversationBuilder`] enforces this, and the
/// metrics calculator relies on it without re-sorting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn builder(id: Uuid) -> ConversationBuilder {
        ConversationBuilder {
            id,
            messages: Vec::new(),
        }
    }

    /// Verify the chronological-order invariant, naming the first
    /// out-of-order position on failure.
    pub fn ensure_chronological(&self) -> Result<()> {
        for (position, pair) in self.messages.windows(2).enumerate() {
            if pair[1].created_at < pair[0].created_at {
                return Err(LensError::Transcript(format!(
                    "message at position {} predates its predecessor",
                    position + 1
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`Conversation`]. Validates ordering so the calculator can
/// assume well-formed input.
pub struct ConversationBuilder {
    id: Uuid,
    messages: Vec<Message>,
}

impl ConversationBuilder {
    pub fn message(mut self, sender: Sender, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        self.messages.push(Message::new(sender, text, created_at));
        self
    }

    pub fn build(self) -> Result<Conversation> {
        let conversation = Conversation {
            id: self.id,
            messages: self.messages,
        };
        conversation.ensure_chronological()?;
        Ok(conversation)
    }
}

/// Per-conversation result record consumed by the reporting layer.
///
/// Both float fields are plain f64 divisions by `responded_segments`: a
/// conversation with no responded segment yields non-finite values, and
/// consumers must check `is_finite()` before display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponseMetric {
    pub conversation_id: Uuid,
    /// Mean wait from an end user's first message in a run to the team
    /// member's next reply, in milliseconds.
    pub average_response_ms: f64,
    /// Experimental: total inquiries over responded segments. Approximate
    /// by design (question-mark heuristic, one count per reply burst);
    /// absent when disabled in config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry_to_response_ratio: Option<f64>,
    pub responded_segments: usize,
    pub inquiry_count: usize,
}

#[derive(Error, Debug)]
pub enum LensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("Metric sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, LensError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_inquiry_heuristic_trims_whitespace() {
        let message = Message::new(Sender::EndUser, "are you there?  ", at(0));
        assert!(message.is_inquiry());

        let message = Message::new(Sender::EndUser, "hello", at(0));
        assert!(!message.is_inquiry());

        let message = Message::new(Sender::EndUser, "what? really", at(0));
        assert!(!message.is_inquiry());
    }

    #[test]
    fn test_builder_accepts_chronological_messages() {
        let conversation = Conversation::builder(Uuid::new_v4())
            .message(Sender::EndUser, "hi", at(0))
            .message(Sender::TeamMember, "hello", at(5000))
            .build()
            .unwrap();

        assert_eq!(conversation.messages.len(), 2);
    }

    #[test]
    fn test_builder_rejects_out_of_order_messages() {
        let result = Conversation::builder(Uuid::new_v4())
            .message(Sender::EndUser, "hi", at(5000))
            .message(Sender::TeamMember, "hello", at(0))
            .build();

        match result {
            Err(LensError::Transcript(reason)) => {
                assert!(reason.contains("position 1"));
            }
            other => panic!("expected transcript error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_builder_accepts_equal_timestamps() {
        let conversation = Conversation::builder(Uuid::new_v4())
            .message(Sender::EndUser, "hi", at(100))
            .message(Sender::EndUser, "hello?", at(100))
            .build()
            .unwrap();

        assert!(conversation.ensure_chronological().is_ok());
    }

    #[test]
    fn test_message_serializes_timestamp_as_epoch_millis() {
        let message = Message::new(Sender::TeamMember, "hello", at(5000));
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["sender"], "team_member");
        assert_eq!(json["created_at"], 5000);
    }

    #[test]
    fn test_conversation_deserializes_from_transcript_json() {
        let json = r#"{
            "id": "6f9d3b0a-8c3e-4f1b-9a2d-1c5e7b8f0a21",
            "messages": [
                {"sender": "end_user", "text": "hi", "created_at": 0},
                {"sender": "team_member", "text": "hello", "created_at": 5000}
            ]
        }"#;

        let conversation: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert!(conversation.messages[1].sender.is_team_member());
        assert_eq!(
            conversation.messages[1].created_at.timestamp_millis(),
            5000
        );
    }
}
