use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::ids::{ConversationId, MessageId, ParticipantId};

/// Display name used for every message the local user sends.
pub const LOCAL_USER_NAME: &str = "You";
/// Avatar reference used when a record carries none.
pub const PLACEHOLDER_AVATAR: &str = "/placeholder.svg";

/// One member of a group conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default = "placeholder_avatar")]
    pub avatar: String,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// A chat thread as listed in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub name: String,
    #[serde(default = "placeholder_avatar")]
    pub avatar: String,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub unread: u32,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub is_typing: bool,
}

impl Conversation {
    /// Creates a one-to-one conversation with no preview yet.
    pub fn direct(id: ConversationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: placeholder_avatar(),
            last_message: String::new(),
            timestamp: String::new(),
            unread: 0,
            is_group: false,
            participants: Vec::new(),
            is_typing: false,
        }
    }

    /// Creates a group conversation with the given members.
    pub fn group(
        id: ConversationId,
        name: impl Into<String>,
        participants: Vec<Participant>,
    ) -> Self {
        Self {
            is_group: true,
            participants,
            ..Self::direct(id, name)
        }
    }

    pub fn with_preview(mut self, last_message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        self.last_message = last_message.into();
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_unread(mut self, unread: u32) -> Self {
        self.unread = unread;
        self
    }

    pub fn with_typing(mut self, is_typing: bool) -> Self {
        self.is_typing = is_typing;
        self
    }

    pub fn member_count(&self) -> usize {
        self.participants.len()
    }

    /// Identity used when the conversation itself answers the local user.
    pub fn as_sender(&self) -> Sender {
        Sender::Contact {
            id: self.id,
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Sender {
    LocalUser,
    Contact {
        id: ConversationId,
        name: String,
        #[serde(default = "placeholder_avatar")]
        avatar: String,
    },
}

impl Sender {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalUser)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::LocalUser => LOCAL_USER_NAME,
            Self::Contact { name, .. } => name,
        }
    }

    pub fn avatar(&self) -> &str {
        match self {
            Self::LocalUser => PLACEHOLDER_AVATAR,
            Self::Contact { avatar, .. } => avatar,
        }
    }
}

/// Cosmetic delivery label; nothing ever confirms delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Video,
    File,
    Emoji,
}

impl MessageKind {
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }

    /// Image, video and file messages carry a file reference instead of literal content.
    pub fn carries_file(self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::File)
    }
}

/// Immutable chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl Message {
    pub fn is_local(&self) -> bool {
        self.sender.is_local()
    }

    /// Builds the local user's message from an outgoing payload.
    pub fn outgoing(id: MessageId, payload: OutgoingMessage, timestamp: String) -> Self {
        Self {
            id,
            sender: Sender::LocalUser,
            content: payload.content,
            timestamp,
            status: DeliveryStatus::Sent,
            kind: payload.kind,
            file_url: payload.file_url,
            file_name: payload.file_name,
        }
    }

    /// Builds a plain text message written by a contact.
    pub fn from_contact(
        id: MessageId,
        sender: Sender,
        content: impl Into<String>,
        timestamp: String,
    ) -> Self {
        Self {
            id,
            sender,
            content: content.into(),
            timestamp,
            status: DeliveryStatus::Sent,
            kind: MessageKind::Text,
            file_url: None,
            file_name: None,
        }
    }

    /// Sidebar preview text for this message.
    pub fn preview(&self) -> String {
        let local = self.is_local();
        match self.kind {
            MessageKind::Text | MessageKind::Emoji => self.content.clone(),
            MessageKind::Image if local => "Sent an image".to_string(),
            MessageKind::Image => "Shared an image".to_string(),
            MessageKind::File | MessageKind::Video if local => "Sent a file".to_string(),
            MessageKind::File | MessageKind::Video => "Shared a file".to_string(),
        }
    }
}

/// Payload the composer hands to the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutgoingMessage {
    pub content: String,
    pub kind: MessageKind,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn emoji(glyph: impl Into<String>) -> Self {
        Self {
            content: glyph.into(),
            kind: MessageKind::Emoji,
            ..Self::default()
        }
    }

    /// File sends use the file name as content, as the sidebar preview never shows it.
    pub fn attachment(attachment: &Attachment) -> Self {
        Self {
            content: attachment.name.clone(),
            kind: attachment.kind(),
            file_url: Some(attachment.handle.clone()),
            file_name: Some(attachment.name.clone()),
        }
    }

    /// Empty text is the only payload the store refuses.
    pub fn is_empty_text(&self) -> bool {
        self.content.is_empty() && self.kind.is_text()
    }
}

fn placeholder_avatar() -> String {
    PLACEHOLDER_AVATAR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previews_describe_file_messages_from_the_senders_side() {
        let sent = Message::outgoing(
            MessageId::new(1),
            OutgoingMessage {
                content: "cat.png".into(),
                kind: MessageKind::Image,
                file_url: Some("/tmp/cat.png".into()),
                file_name: Some("cat.png".into()),
            },
            "10:00 AM".into(),
        );
        assert_eq!(sent.preview(), "Sent an image");

        let shared = Message {
            sender: Sender::Contact {
                id: ConversationId::new(1),
                name: "Sarah Johnson".into(),
                avatar: PLACEHOLDER_AVATAR.into(),
            },
            kind: MessageKind::Video,
            ..sent
        };
        assert_eq!(shared.preview(), "Shared a file");
    }

    #[test]
    fn only_empty_text_counts_as_empty() {
        assert!(OutgoingMessage::text("").is_empty_text());
        assert!(!OutgoingMessage::text(" ").is_empty_text());
        assert!(!OutgoingMessage::emoji("").is_empty_text());
    }

    #[test]
    fn message_json_uses_camel_case_fields() {
        let message = Message::outgoing(
            MessageId::new(3),
            OutgoingMessage {
                content: "project_proposal.pdf".into(),
                kind: MessageKind::File,
                file_url: Some("#".into()),
                file_name: Some("project_proposal.pdf".into()),
            },
            "10:38 AM".into(),
        );

        let value = serde_json::to_value(&message).expect("serialize message");
        assert_eq!(value["id"], "m3");
        assert_eq!(value["sender"]["type"], "localUser");
        assert_eq!(value["fileName"], "project_proposal.pdf");
        assert_eq!(value["kind"], "file");
        assert_eq!(value["status"], "sent");
    }
}
