use std::time::Duration;

use crate::ids::{ConversationId, ReplySessionId};
use crate::model::MessageKind;

pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(1_000);
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(2_000);

pub const TEXT_REPLY: &str = "Thanks for your message! I'll get back to you soon.";
pub const SHARE_REPLY: &str = "Thanks for sharing!";

/// Canned answer for a message of the given kind.
pub fn canned_reply(origin_kind: MessageKind) -> &'static str {
    if origin_kind.is_text() {
        TEXT_REPLY
    } else {
        SHARE_REPLY
    }
}

/// Routing key for one simulated reply.
///
/// Phases carrying a ticket that is no longer live are rejected, which is how a cancelled
/// or superseded reply is kept from touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTicket {
    pub conversation_id: ConversationId,
    pub session_id: ReplySessionId,
}

impl ReplyTicket {
    pub const fn new(conversation_id: ConversationId, session_id: ReplySessionId) -> Self {
        Self {
            conversation_id,
            session_id,
        }
    }
}

/// Delays between the two reply phases.
///
/// `reply_delay` is measured from the moment the typing phase lands, not from the send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTiming {
    pub typing_delay: Duration,
    pub reply_delay: Duration,
}

impl Default for ReplyTiming {
    fn default() -> Self {
        Self {
            typing_delay: DEFAULT_TYPING_DELAY,
            reply_delay: DEFAULT_REPLY_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPhase {
    /// Waiting for the typing indicator.
    Scheduled,
    /// Typing indicator shown, reply not yet delivered.
    Typing,
}

/// Reply bookkeeping the store keeps per conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingReply {
    pub ticket: ReplyTicket,
    pub origin_kind: MessageKind,
    pub phase: ReplyPhase,
}

/// Rejection reason for a reply phase that arrives out of turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyRejection {
    /// Nothing is pending for the ticket's conversation.
    NotPending { attempted: ReplyTicket },
    /// A newer reply replaced this one.
    Superseded {
        live: ReplyTicket,
        attempted: ReplyTicket,
    },
    /// The phase was applied in the wrong order.
    OutOfOrder {
        ticket: ReplyTicket,
        expected: ReplyPhase,
        actual: ReplyPhase,
    },
    /// No unused message id is left for the reply.
    MessageIdsExhausted { ticket: ReplyTicket },
}
