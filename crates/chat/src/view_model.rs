//! Render-ready projections of store state.
//!
//! Views only format what these functions return, so every display rule can be tested
//! without a window.

use crate::avatar::{AvatarGroupLayout, initials};
use crate::ids::{ConversationId, MessageId};
use crate::model::{Conversation, DeliveryStatus, Message, MessageKind, PLACEHOLDER_AVATAR};

/// Shown instead of the preview (sidebar) or as subtitle (header) while a contact types.
pub const TYPING_LABEL: &str = "Typing...";
pub const NO_MATCHES_LABEL: &str = "No conversations found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    pub id: ConversationId,
    pub name: String,
    pub avatar: String,
    pub initials: String,
    pub timestamp: String,
    pub preview: String,
    pub is_typing: bool,
    pub unread_badge: Option<String>,
    pub selected: bool,
}

impl ConversationRow {
    pub fn from_conversation(conversation: &Conversation, selected: Option<ConversationId>) -> Self {
        let preview = if conversation.is_typing {
            TYPING_LABEL.to_string()
        } else {
            conversation.last_message.clone()
        };

        Self {
            id: conversation.id,
            name: conversation.name.clone(),
            avatar: conversation.avatar.clone(),
            initials: initials(&conversation.name),
            timestamp: conversation.timestamp.clone(),
            preview,
            is_typing: conversation.is_typing,
            unread_badge: unread_badge(conversation.unread),
            selected: selected == Some(conversation.id),
        }
    }
}

/// Badge text, present only for a positive count.
pub fn unread_badge(unread: u32) -> Option<String> {
    (unread > 0).then(|| unread.to_string())
}

/// Trimmed, case-insensitive substring match on the conversation name.
pub fn matches_query(conversation: &Conversation, query: &str) -> bool {
    let query = query.trim();
    query.is_empty()
        || conversation
            .name
            .to_lowercase()
            .contains(&query.to_lowercase())
}

/// Sidebar rows in collection order, filtered by the search query.
pub fn sidebar_rows(
    conversations: &[Conversation],
    selected: Option<ConversationId>,
    query: &str,
) -> Vec<ConversationRow> {
    conversations
        .iter()
        .filter(|conversation| matches_query(conversation, query))
        .map(|conversation| ConversationRow::from_conversation(conversation, selected))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAvatar {
    Single { avatar: String, initials: String },
    Group(AvatarGroupLayout),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadHeader {
    pub name: String,
    pub subtitle: Option<String>,
    /// Accent styling for the typing subtitle.
    pub subtitle_is_typing: bool,
    pub avatar: HeaderAvatar,
}

impl ThreadHeader {
    pub fn from_conversation(conversation: &Conversation, avatar_group_limit: usize) -> Self {
        if conversation.is_group {
            return Self {
                name: conversation.name.clone(),
                subtitle: Some(format!("{} members", conversation.member_count())),
                subtitle_is_typing: false,
                avatar: HeaderAvatar::Group(AvatarGroupLayout::compute(
                    &conversation.participants,
                    avatar_group_limit,
                )),
            };
        }

        Self {
            name: conversation.name.clone(),
            subtitle: conversation.is_typing.then(|| TYPING_LABEL.to_string()),
            subtitle_is_typing: conversation.is_typing,
            avatar: HeaderAvatar::Single {
                avatar: conversation.avatar.clone(),
                initials: initials(&conversation.name),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageBody {
    Bubble { text: String },
    Image { url: String },
    File { name: String },
}

pub fn message_body(message: &Message) -> MessageBody {
    match message.kind {
        MessageKind::Text | MessageKind::Emoji => MessageBody::Bubble {
            text: message.content.clone(),
        },
        MessageKind::Image => MessageBody::Image {
            url: message
                .file_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
        },
        MessageKind::File | MessageKind::Video => MessageBody::File {
            name: message
                .file_name
                .clone()
                .unwrap_or_else(|| message.content.clone()),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphTone {
    Muted,
    Accent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusGlyph {
    pub text: &'static str,
    pub tone: GlyphTone,
}

/// Delivery marks are only drawn under the local user's own messages.
pub fn status_glyph(message: &Message) -> Option<StatusGlyph> {
    if !message.is_local() {
        return None;
    }

    Some(match message.status {
        DeliveryStatus::Sent => StatusGlyph {
            text: "✓",
            tone: GlyphTone::Muted,
        },
        DeliveryStatus::Delivered => StatusGlyph {
            text: "✓✓",
            tone: GlyphTone::Muted,
        },
        DeliveryStatus::Read => StatusGlyph {
            text: "✓✓",
            tone: GlyphTone::Accent,
        },
    })
}

/// Everything a message row draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: MessageId,
    pub is_local: bool,
    pub sender_label: String,
    pub avatar: String,
    pub initials: String,
    pub timestamp: String,
    pub body: MessageBody,
    pub status: Option<StatusGlyph>,
}

impl MessageRow {
    pub fn from_message(message: &Message) -> Self {
        let sender_label = message.sender.name().to_string();
        Self {
            id: message.id,
            is_local: message.is_local(),
            initials: initials(&sender_label),
            avatar: message.sender.avatar().to_string(),
            sender_label,
            timestamp: message.timestamp.clone(),
            body: message_body(message),
            status: status_glyph(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sender;
    use crate::seed::Seed;

    #[test]
    fn unread_badge_shows_exactly_the_positive_count() {
        assert_eq!(unread_badge(0), None);
        assert_eq!(unread_badge(2).as_deref(), Some("2"));
        assert_eq!(unread_badge(120).as_deref(), Some("120"));
    }

    #[test]
    fn typing_overrides_the_sidebar_preview() {
        let seed = Seed::builtin();
        let rows = sidebar_rows(&seed.conversations, Some(ConversationId::new(1)), "");

        assert_eq!(rows.len(), 5);
        assert!(rows[0].selected);
        assert_eq!(rows[0].unread_badge.as_deref(), Some("2"));
        assert_eq!(rows[1].preview, TYPING_LABEL);
        assert_eq!(rows[2].preview, "Thanks for your help!");
        assert_eq!(rows[2].initials, "MI");
    }

    #[test]
    fn search_filters_by_name_and_keeps_order() {
        let seed = Seed::builtin();
        let rows = sidebar_rows(&seed.conversations, None, "  JO ");
        let names = rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["Sarah Johnson"]);

        let rows = sidebar_rows(&seed.conversations, None, "o");
        assert_eq!(rows.first().map(|row| row.id), Some(ConversationId::new(1)));
        assert!(sidebar_rows(&seed.conversations, None, "zzz").is_empty());
    }

    #[test]
    fn group_headers_show_member_counts() {
        let seed = Seed::builtin();
        let header = ThreadHeader::from_conversation(&seed.conversations[1], 2);

        assert_eq!(header.subtitle.as_deref(), Some("3 members"));
        assert!(!header.subtitle_is_typing);
        let HeaderAvatar::Group(layout) = header.avatar else {
            panic!("groups render an avatar group");
        };
        assert_eq!(layout.visible.len(), 2);
        assert_eq!(layout.overflow.map(|badge| badge.count), Some(1));
    }

    #[test]
    fn direct_headers_show_typing_only_while_typing() {
        let seed = Seed::builtin();
        let mut sarah = seed.conversations[0].clone();
        assert_eq!(ThreadHeader::from_conversation(&sarah, 3).subtitle, None);

        sarah.is_typing = true;
        let header = ThreadHeader::from_conversation(&sarah, 3);
        assert_eq!(header.subtitle.as_deref(), Some(TYPING_LABEL));
        assert!(header.subtitle_is_typing);
    }

    #[test]
    fn status_glyphs_only_appear_on_local_messages() {
        let seed = Seed::builtin();
        let thread = &seed.threads[0].messages;

        assert_eq!(
            status_glyph(&thread[0]),
            Some(StatusGlyph {
                text: "✓✓",
                tone: GlyphTone::Accent
            })
        );
        assert_eq!(status_glyph(&thread[1]), None);
        assert_eq!(status_glyph(&thread[3]), None);
    }

    #[test]
    fn message_rows_label_the_local_user_as_you() {
        let seed = Seed::builtin();
        let thread = &seed.threads[0].messages;

        let mine = MessageRow::from_message(&thread[2]);
        assert_eq!(mine.sender_label, "You");
        assert_eq!(
            mine.body,
            MessageBody::File {
                name: "project_proposal.pdf".to_string()
            }
        );

        let theirs = MessageRow::from_message(&thread[1]);
        assert_eq!(theirs.sender_label, "Sarah Johnson");
        assert_eq!(theirs.initials, "SA");
        assert!(!theirs.is_local);
    }

    #[test]
    fn images_without_a_url_use_the_placeholder() {
        let message = Message {
            kind: MessageKind::Image,
            file_url: None,
            ..Message::from_contact(
                MessageId::new(9),
                Sender::LocalUser,
                "photo.png",
                "10:00 AM".to_string(),
            )
        };
        assert_eq!(
            message_body(&message),
            MessageBody::Image {
                url: PLACEHOLDER_AVATAR.to_string()
            }
        );
    }
}
