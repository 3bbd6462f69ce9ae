use chrono::{NaiveDateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::composer::PendingAttachment;
use crate::state::{ConversationMeta, Message, MessageBody, Role};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Bad URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("The backend URL cannot carry a WebSocket scheme")]
    Scheme,
}

#[derive(Debug, Clone, Deserialize)]
struct WireMessage {
    role: Role,
    content: String,
    #[serde(default)]
    timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConversationDetail {
    id: String,
    messages: Vec<WireMessage>,
}

/// A conversation's persisted messages, tagged with the id they belong to so
/// the caller can drop a response that resolved after the user moved on.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    pub id: String,
    pub messages: Vec<Message>,
}

#[derive(Clone)]
pub struct Backend {
    base: Url,
    http: Client,
}

impl Backend {
    pub fn new(base: Url) -> Backend {
        Backend {
            base,
            http: Client::new(),
        }
    }

    pub async fn conversations(&self) -> Result<Vec<ConversationMeta>, ApiError> {
        let url = self.base.join("conversations")?;
        let list = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(list)
    }

    pub async fn create_conversation(&self) -> Result<ConversationMeta, ApiError> {
        let url = self.base.join("conversations")?;
        let meta = self
            .http
            .post(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(meta)
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), ApiError> {
        let url = self.base.join(&format!("conversations/{id}"))?;
        self.http.delete(url).send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn history(&self, id: &str) -> Result<ConversationHistory, ApiError> {
        let url = self.base.join(&format!("conversations/{id}"))?;
        let detail: ConversationDetail = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let received_at = Utc::now().naive_utc();
        let messages = detail
            .messages
            .into_iter()
            .map(|message| Message {
                role: message.role,
                body: MessageBody::Text(message.content),
                at: message.timestamp.unwrap_or(received_at),
            })
            .collect();
        Ok(ConversationHistory {
            id: detail.id,
            messages,
        })
    }

    pub async fn upload(
        &self,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<PendingAttachment, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().part("file", part);
        let url = self.base.join("upload")?;
        let attachment = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(attachment)
    }

    /// WebSocket endpoint for one conversation, derived from the HTTP base.
    pub fn stream_url(&self, id: &str) -> Result<Url, ApiError> {
        let mut url = self.base.join(&format!("chat-stream/{id}"))?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme).map_err(|_| ApiError::Scheme)?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_url_maps_http_to_ws() {
        let backend = Backend::new(Url::parse("http://localhost:8000/").unwrap());
        let url = backend.stream_url("42").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/chat-stream/42");
    }

    #[test]
    fn stream_url_maps_https_to_wss() {
        let backend = Backend::new(Url::parse("https://chat.example.com/api/").unwrap());
        let url = backend.stream_url("abc").unwrap();
        assert_eq!(url.as_str(), "wss://chat.example.com/api/chat-stream/abc");
    }

    #[test]
    fn history_payload_deserializes_with_and_without_timestamps() {
        let raw = r#"{
            "id": "7",
            "title": "lifetimes",
            "messages": [
                {"role": "user", "content": "hi", "timestamp": "2024-11-30T10:03:20.5"},
                {"role": "assistant", "content": "hello"}
            ]
        }"#;
        let detail: ConversationDetail = serde_json::from_str(raw).unwrap();
        assert_eq!(detail.id, "7");
        assert_eq!(detail.messages.len(), 2);
        assert_eq!(detail.messages[0].role, Role::User);
        assert!(detail.messages[0].timestamp.is_some());
        assert!(detail.messages[1].timestamp.is_none());
    }
}
