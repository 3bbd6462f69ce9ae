use serde::Deserialize;

use crate::state::{AttachmentMeta, MessageBody};

/// An uploaded file waiting to be folded into the next outbound message.
/// Produced by a successful upload call, consumed by exactly one send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingAttachment {
    pub filename: String,
    #[serde(rename = "path")]
    pub storage_path: String,
    pub content: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub body: MessageBody,
    pub wire_text: String,
}

const FILE_SECTION_CLOSE: &str = "----- END ATTACHED FILE -----";
const ANALYZE_INSTRUCTION: &str =
    "Analyze the attached file content above and use it when answering the message.";

/// Assembles one outbound payload from the typed text and the optional
/// pending attachment. Returns None when there is nothing worth sending.
pub fn compose(typed: &str, attachment: Option<&PendingAttachment>) -> Option<Outbound> {
    match attachment {
        None => {
            if typed.trim().is_empty() {
                return None;
            }
            Some(Outbound {
                body: MessageBody::Text(typed.to_string()),
                wire_text: typed.to_string(),
            })
        }
        Some(file) => {
            let body = MessageBody::TextWithAttachment {
                text: typed.to_string(),
                attachment: AttachmentMeta {
                    filename: file.filename.clone(),
                    mime_type: file.mime_type.clone(),
                },
            };
            let wire_text = format!(
                "{display}\n\n----- ATTACHED FILE: {filename} -----\n{content}\n{FILE_SECTION_CLOSE}\n{ANALYZE_INSTRUCTION}",
                display = body.display_text(),
                filename = file.filename,
                content = file.content,
            );
            Some(Outbound { body, wire_text })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment() -> PendingAttachment {
        PendingAttachment {
            filename: "a.txt".to_string(),
            storage_path: "uploads/a.txt".to_string(),
            content: "X".to_string(),
            mime_type: "text/plain".to_string(),
        }
    }

    #[test]
    fn refuses_blank_input_without_attachment() {
        assert_eq!(compose("", None), None);
        assert_eq!(compose("   \n\t", None), None);
    }

    #[test]
    fn plain_text_displays_exactly_what_goes_on_the_wire() {
        let out = compose("explain lifetimes", None).unwrap();
        assert_eq!(out.body.display_text(), "explain lifetimes");
        assert_eq!(out.wire_text, "explain lifetimes");
    }

    #[test]
    fn attachment_alone_is_sendable() {
        let file = attachment();
        let out = compose("", Some(&file)).unwrap();
        assert!(out.body.display_text().contains("a.txt"));
        assert!(!out.body.display_text().trim().is_empty());
        assert!(out.wire_text.contains("X"));
        assert!(out.wire_text.contains(FILE_SECTION_CLOSE));
    }

    #[test]
    fn attachment_keeps_typed_text_and_file_content_apart() {
        let file = attachment();
        let out = compose("what does this file do?", Some(&file)).unwrap();
        let display = out.body.display_text();
        assert!(display.starts_with("what does this file do?"));
        assert!(display.contains("a.txt"));
        assert!(!display.contains("X\n"));

        let wire = out.wire_text;
        assert!(wire.starts_with("what does this file do?"));
        let file_section = wire.find("----- ATTACHED FILE: a.txt -----").unwrap();
        let content_pos = wire.find("\nX\n").unwrap();
        assert!(content_pos > file_section);
        assert!(wire.ends_with(ANALYZE_INSTRUCTION));
    }

    #[test]
    fn upload_response_maps_into_a_pending_attachment() {
        let raw = r##"{
            "filename": "notes.md",
            "path": "uploads/notes.md",
            "content": "# Notes",
            "type": "text/markdown"
        }"##;
        let pending: PendingAttachment = serde_json::from_str(raw).unwrap();
        assert_eq!(pending.filename, "notes.md");
        assert_eq!(pending.storage_path, "uploads/notes.md");
        assert_eq!(pending.mime_type, "text/markdown");
    }
}
