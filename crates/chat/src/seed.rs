use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};

use crate::error::{
    ChatResult, DuplicateConversationSnafu, DuplicateMessageSnafu, ParseSeedSnafu, ReadSeedSnafu,
    UnknownConversationSnafu,
};
use crate::ids::{ConversationId, MessageId, ParticipantId};
use crate::model::{
    Conversation, DeliveryStatus, Message, MessageKind, PLACEHOLDER_AVATAR, Participant, Sender,
};

const CONVERSATION_AVATAR: &str = "/placeholder.svg?height=40&width=40";
const PARTICIPANT_AVATAR: &str = "/placeholder.svg?height=32&width=32";

/// Messages belonging to one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedThread {
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Initial chat state, either built in or read from a JSON fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub threads: Vec<SeedThread>,
}

impl Seed {
    /// Reads and validates a JSON fixture.
    pub fn from_path(path: &Path) -> ChatResult<Self> {
        let content = std::fs::read_to_string(path).context(ReadSeedSnafu {
            stage: "read-seed-fixture",
            path: path.to_path_buf(),
        })?;
        let seed: Self = serde_json::from_str(&content).context(ParseSeedSnafu {
            stage: "parse-seed-fixture",
            path: path.to_path_buf(),
        })?;
        seed.validate()?;
        Ok(seed)
    }

    /// Uses the fixture at `path` when one is configured, the built-in seed otherwise.
    ///
    /// A broken fixture never prevents startup.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };

        match Self::from_path(path) {
            Ok(seed) => {
                tracing::info!(
                    "loaded seed fixture from {:?} with {} conversations",
                    path,
                    seed.conversations.len()
                );
                seed
            }
            Err(error) => {
                tracing::warn!("failed to load seed fixture: {error}. using built-in seed");
                Self::builtin()
            }
        }
    }

    /// Checks id uniqueness and that every thread belongs to a known conversation.
    pub fn validate(&self) -> ChatResult<()> {
        let mut conversation_ids = HashSet::with_capacity(self.conversations.len());
        for conversation in &self.conversations {
            ensure!(
                conversation_ids.insert(conversation.id),
                DuplicateConversationSnafu {
                    stage: "validate-seed-conversations",
                    id: conversation.id,
                }
            );
        }

        let mut message_ids = HashSet::new();
        let mut thread_ids = HashSet::with_capacity(self.threads.len());
        for thread in &self.threads {
            ensure!(
                conversation_ids.contains(&thread.conversation_id),
                UnknownConversationSnafu {
                    stage: "validate-seed-threads",
                    id: thread.conversation_id,
                }
            );
            ensure!(
                thread_ids.insert(thread.conversation_id),
                DuplicateConversationSnafu {
                    stage: "validate-seed-threads",
                    id: thread.conversation_id,
                }
            );

            for message in &thread.messages {
                ensure!(
                    message_ids.insert(message.id),
                    DuplicateMessageSnafu {
                        stage: "validate-seed-messages",
                        id: message.id,
                    }
                );
            }
        }

        Ok(())
    }

    /// The demo's hardcoded conversations and Sarah's opening thread.
    pub fn builtin() -> Self {
        let sarah = Conversation {
            avatar: CONVERSATION_AVATAR.to_string(),
            ..Conversation::direct(ConversationId::new(1), "Sarah Johnson")
        }
        .with_preview("Are we still meeting tomorrow?", "10:42 AM")
        .with_unread(2);

        let design_team = Conversation {
            avatar: CONVERSATION_AVATAR.to_string(),
            ..Conversation::group(
                ConversationId::new(2),
                "Design Team",
                vec![
                    participant(101, "Alex Chen"),
                    participant(102, "Maya Patel"),
                    participant(103, "Jordan Lee"),
                ],
            )
        }
        .with_preview("Alex: I've updated the mockups", "9:30 AM")
        .with_typing(true);

        let michael = Conversation {
            avatar: CONVERSATION_AVATAR.to_string(),
            ..Conversation::direct(ConversationId::new(3), "Michael Rodriguez")
        }
        .with_preview("Thanks for your help!", "Yesterday");

        let project_sync = Conversation {
            avatar: CONVERSATION_AVATAR.to_string(),
            ..Conversation::group(
                ConversationId::new(4),
                "Project Sync",
                vec![
                    participant(201, "Emma Wilson"),
                    participant(202, "David Kim"),
                    participant(203, "Sophia Garcia"),
                ],
            )
        }
        .with_preview("Emma: Let's schedule the next sprint", "Yesterday");

        let lisa = Conversation {
            avatar: CONVERSATION_AVATAR.to_string(),
            ..Conversation::direct(ConversationId::new(5), "Lisa Taylor")
        }
        .with_preview("Can you send me the files?", "Monday");

        let sarah_sender = Sender::Contact {
            id: sarah.id,
            name: sarah.name.clone(),
            avatar: PARTICIPANT_AVATAR.to_string(),
        };

        let opening_thread = SeedThread {
            conversation_id: sarah.id,
            messages: vec![
                seed_message(
                    1,
                    Sender::LocalUser,
                    "Hi Sarah, how are you doing?",
                    "10:30 AM",
                    DeliveryStatus::Read,
                ),
                seed_message(
                    2,
                    sarah_sender.clone(),
                    "I'm good, thanks! Just finishing up some work.",
                    "10:35 AM",
                    DeliveryStatus::Read,
                ),
                Message {
                    kind: MessageKind::File,
                    file_url: Some("#".to_string()),
                    file_name: Some("project_proposal.pdf".to_string()),
                    ..seed_message(
                        3,
                        Sender::LocalUser,
                        "Great! Here's the document we discussed.",
                        "10:38 AM",
                        DeliveryStatus::Read,
                    )
                },
                seed_message(
                    4,
                    sarah_sender,
                    "Thanks! Are we still meeting tomorrow?",
                    "10:42 AM",
                    DeliveryStatus::Delivered,
                ),
            ],
        };

        Self {
            conversations: vec![sarah, design_team, michael, project_sync, lisa],
            threads: vec![opening_thread],
        }
    }
}

fn participant(id: u64, name: &str) -> Participant {
    Participant::new(ParticipantId::new(id), name, PARTICIPANT_AVATAR)
}

fn seed_message(
    id: u64,
    sender: Sender,
    content: &str,
    timestamp: &str,
    status: DeliveryStatus,
) -> Message {
    Message {
        id: MessageId::new(id),
        sender,
        content: content.to_string(),
        timestamp: timestamp.to_string(),
        status,
        kind: MessageKind::Text,
        file_url: None,
        file_name: None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::ChatError;

    #[test]
    fn builtin_seed_is_valid() {
        let seed = Seed::builtin();
        seed.validate().expect("built-in seed must validate");

        assert_eq!(seed.conversations.len(), 5);
        assert_eq!(seed.conversations[0].name, "Sarah Johnson");
        assert!(seed.conversations[1].is_typing);
        assert_eq!(seed.conversations[3].member_count(), 3);
        assert_eq!(seed.threads[0].messages.len(), 4);
        assert_eq!(
            seed.threads[0].messages[2].file_name.as_deref(),
            Some("project_proposal.pdf")
        );
    }

    #[test]
    fn fixtures_round_trip_through_json() {
        let seed = Seed::builtin();
        let mut file = tempfile::NamedTempFile::new().expect("create fixture");
        let json = serde_json::to_string_pretty(&seed).expect("serialize seed");
        file.write_all(json.as_bytes()).expect("write fixture");

        let loaded = Seed::from_path(file.path()).expect("load fixture");
        assert_eq!(loaded, seed);
    }

    #[test]
    fn duplicate_message_ids_are_rejected() {
        let mut seed = Seed::builtin();
        let duplicate = seed.threads[0].messages[0].clone();
        seed.threads[0].messages.push(duplicate);

        assert!(matches!(
            seed.validate(),
            Err(ChatError::DuplicateMessage { .. })
        ));
    }

    #[test]
    fn threads_for_unknown_conversations_are_rejected() {
        let mut seed = Seed::builtin();
        seed.threads.push(SeedThread {
            conversation_id: ConversationId::new(99),
            messages: Vec::new(),
        });

        assert!(matches!(
            seed.validate(),
            Err(ChatError::UnknownConversation { .. })
        ));
    }

    #[test]
    fn broken_fixtures_fall_back_to_the_builtin_seed() {
        let mut file = tempfile::NamedTempFile::new().expect("create fixture");
        file.write_all(b"{ not json").expect("write fixture");

        assert!(matches!(
            Seed::from_path(file.path()),
            Err(ChatError::ParseSeed { .. })
        ));
        assert_eq!(Seed::load_or_builtin(Some(file.path())), Seed::builtin());
    }

    #[test]
    fn minimal_fixtures_fill_in_defaults() {
        let json = r#"{ "conversations": [ { "id": "7", "name": "Ops" } ] }"#;
        let seed: Seed = serde_json::from_str(json).expect("parse minimal fixture");

        let conversation = &seed.conversations[0];
        assert_eq!(conversation.avatar, PLACEHOLDER_AVATAR);
        assert_eq!(conversation.unread, 0);
        assert!(!conversation.is_group);
        assert!(seed.threads.is_empty());
    }
}
