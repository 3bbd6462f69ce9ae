use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "New Chat";

const TITLE_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttachmentMeta {
    pub filename: String,
    pub mime_type: String,
}

/// What a message carries. Attachments ride as a typed field instead of
/// being spliced into the content string.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Text(String),
    TextWithAttachment {
        text: String,
        attachment: AttachmentMeta,
    },
}

impl MessageBody {
    pub fn display_text(&self) -> String {
        match self {
            MessageBody::Text(text) => text.clone(),
            MessageBody::TextWithAttachment { text, attachment } => {
                if text.trim().is_empty() {
                    format!("Attached file: {}", attachment.filename)
                } else {
                    format!("{}\n\nAttached file: {}", text, attachment.filename)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub body: MessageBody,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConversationMeta {
    pub id: String,
    pub title: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip)]
    pub local: bool,
}

impl ConversationMeta {
    /// Stand-in conversation for when the backend cannot be reached.
    pub fn local() -> ConversationMeta {
        let now = chrono::Utc::now().naive_utc();
        ConversationMeta {
            id: format!("local-{}", Uuid::new_v4()),
            title: DEFAULT_TITLE.to_string(),
            created_at: now,
            updated_at: now,
            local: true,
        }
    }
}

/// One inbound event on the streaming channel, already decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Fragment(String),
    Terminal,
}

/// The visible message buffer of the current conversation. `streaming` marks
/// whether the trailing assistant message still accepts fragment appends;
/// once a terminal event lands the message is frozen for good.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
    streaming: bool,
}

impl Transcript {
    pub fn from_history(messages: Vec<Message>) -> Transcript {
        Transcript {
            messages,
            streaming: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn push_user(&mut self, body: MessageBody, at: NaiveDateTime) {
        self.messages.push(Message {
            role: Role::User,
            body,
            at,
        });
    }

    pub fn apply(&mut self, event: StreamEvent, at: NaiveDateTime) {
        match event {
            StreamEvent::Fragment(text) => self.apply_fragment(text, at),
            // Idempotent: a terminal with no open turn changes nothing.
            StreamEvent::Terminal => self.streaming = false,
        }
    }

    fn apply_fragment(&mut self, text: String, at: NaiveDateTime) {
        if self.streaming {
            if let Some(last) = self.messages.last_mut() {
                if last.role == Role::Assistant {
                    if let MessageBody::Text(content) = &mut last.body {
                        content.push_str(&text);
                        return;
                    }
                }
            }
        }
        // No open turn: a fragment starts a fresh assistant message, so a
        // late frame can never reopen a frozen one.
        self.messages.push(Message {
            role: Role::Assistant,
            body: MessageBody::Text(text),
            at,
        });
        self.streaming = true;
    }
}

/// Short sidebar title taken from the first user message.
pub fn derive_title(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() > TITLE_MAX_CHARS {
        let cut: String = line.chars().take(TITLE_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> NaiveDateTime {
        chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc()
    }

    fn contents(transcript: &Transcript) -> Vec<(Role, String)> {
        transcript
            .messages()
            .iter()
            .map(|m| (m.role, m.body.display_text()))
            .collect()
    }

    #[test]
    fn fragments_concatenate_in_receipt_order() {
        let mut transcript = Transcript::default();
        for piece in ["fn main", "() {", "}\n"] {
            transcript.apply(StreamEvent::Fragment(piece.to_string()), at());
        }
        assert_eq!(
            contents(&transcript),
            vec![(Role::Assistant, "fn main() {}\n".to_string())]
        );
        assert!(transcript.is_streaming());
    }

    #[test]
    fn terminal_is_idempotent() {
        let mut transcript = Transcript::default();
        transcript.apply(StreamEvent::Terminal, at());
        assert!(transcript.is_empty());

        transcript.apply(StreamEvent::Fragment("Hi".to_string()), at());
        transcript.apply(StreamEvent::Terminal, at());
        let once = transcript.clone();
        transcript.apply(StreamEvent::Terminal, at());
        assert_eq!(transcript, once);
    }

    #[test]
    fn fragment_after_terminal_starts_a_new_message() {
        let mut transcript = Transcript::default();
        transcript.apply(StreamEvent::Fragment("Hi".to_string()), at());
        transcript.apply(StreamEvent::Terminal, at());
        transcript.apply(StreamEvent::Fragment("Bye".to_string()), at());
        assert_eq!(
            contents(&transcript),
            vec![
                (Role::Assistant, "Hi".to_string()),
                (Role::Assistant, "Bye".to_string()),
            ]
        );
    }

    #[test]
    fn fragment_after_a_user_message_opens_an_assistant_turn() {
        let mut transcript = Transcript::default();
        transcript.push_user(MessageBody::Text("hello".to_string()), at());
        transcript.apply(StreamEvent::Fragment("hey".to_string()), at());
        assert_eq!(
            contents(&transcript),
            vec![
                (Role::User, "hello".to_string()),
                (Role::Assistant, "hey".to_string()),
            ]
        );
    }

    #[test]
    fn restored_history_is_frozen() {
        let history = vec![Message {
            role: Role::Assistant,
            body: MessageBody::Text("earlier answer".to_string()),
            at: at(),
        }];
        let mut transcript = Transcript::from_history(history);
        transcript.apply(StreamEvent::Fragment("new turn".to_string()), at());
        assert_eq!(
            contents(&transcript),
            vec![
                (Role::Assistant, "earlier answer".to_string()),
                (Role::Assistant, "new turn".to_string()),
            ]
        );
    }

    #[test]
    fn titles_truncate_long_first_lines() {
        assert_eq!(derive_title("short question"), "short question");
        let long = "x".repeat(45);
        let title = derive_title(&long);
        assert_eq!(title.chars().count(), 33);
        assert!(title.ends_with("..."));
        assert_eq!(derive_title("first line\nsecond line"), "first line");
    }

    #[test]
    fn conversation_meta_parses_backend_timestamps() {
        let raw = r#"{
            "id": "1732961000000",
            "title": "New Chat",
            "created_at": "2024-11-30T10:03:20.123456",
            "updated_at": "2024-11-30T10:05:00"
        }"#;
        let meta: ConversationMeta = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.id, "1732961000000");
        assert_eq!(meta.title, DEFAULT_TITLE);
        assert!(!meta.local);
        assert!(meta.updated_at > meta.created_at);
    }
}
