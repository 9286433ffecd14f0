use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use super::error::{ChatError, ChatResult, InvalidIdSnafu};

// Every chat id is a numeric counter with an optional display prefix ("m7" for messages).
macro_rules! define_chat_id {
    ($name:ident, $id_type:literal, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn parse(raw: &str) -> ChatResult<Self> {
                let trimmed = raw.trim();
                let digits = trimmed.strip_prefix($prefix).unwrap_or(trimmed);
                let parsed = digits.parse::<u64>().context(InvalidIdSnafu {
                    stage: "parse-chat-id",
                    id_type: $id_type,
                    raw: raw.to_string(),
                })?;
                Ok(Self(parsed))
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ChatError;

            fn from_str(raw: &str) -> ChatResult<Self> {
                Self::parse(raw)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ChatError;

            fn try_from(raw: String) -> ChatResult<Self> {
                Self::parse(&raw)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }
    };
}

define_chat_id!(ConversationId, "conversation-id", "");
define_chat_id!(MessageId, "message-id", "m");
define_chat_id!(ParticipantId, "participant-id", "");

/// Identifier for one scheduled auto-reply.
///
/// A fresh session id is allocated for every send so a superseded reply can be told apart
/// from the live one even when both target the same conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplySessionId(pub u64);

impl ReplySessionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_round_trip_through_their_display_prefix() {
        let id = MessageId::new(12);
        assert_eq!(id.to_string(), "m12");
        assert_eq!("m12".parse::<MessageId>().ok(), Some(id));
        // Bare digits are accepted too, matching hand-written fixtures.
        assert_eq!(MessageId::parse("12").ok(), Some(id));
    }

    #[test]
    fn invalid_ids_report_their_type() {
        let error = ConversationId::parse("sarah").expect_err("non-numeric id must fail");
        assert!(error.to_string().contains("conversation-id"));
    }

    #[test]
    fn ids_serialize_as_strings() {
        let json = serde_json::to_string(&ParticipantId::new(101)).expect("serialize id");
        assert_eq!(json, "\"101\"");

        let parsed: MessageId = serde_json::from_str("\"m4\"").expect("deserialize id");
        assert_eq!(parsed, MessageId::new(4));
    }
}
