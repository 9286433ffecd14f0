use std::collections::HashMap;
use std::sync::Arc;

use snafu::OptionExt;

use crate::clock::{Clock, LocalClock};
use crate::error::{ChatResult, UnknownConversationSnafu};
use crate::ids::{ConversationId, MessageId, ReplySessionId};
use crate::model::{Conversation, Message, OutgoingMessage};
use crate::reply::{PendingReply, ReplyPhase, ReplyRejection, ReplyTicket, canned_reply};
use crate::seed::Seed;

/// Outcome of a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// False when the conversation was already selected.
    pub changed: bool,
    /// Reply of the conversation that was left, if one was still pending.
    pub cancelled: Option<ReplyTicket>,
}

/// Outcome of an accepted send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: MessageId,
    pub conversation_id: ConversationId,
    /// Reply the caller must drive through its two phases.
    pub reply: ReplyTicket,
    /// Earlier reply for the same conversation that this send replaced.
    pub replaced: Option<ReplyTicket>,
}

/// Authoritative in-memory chat state.
///
/// Views never touch this directly; they render snapshots and report intents to the
/// owner, which applies them through `select`, `send` and the reply phase methods.
pub struct ChatStore {
    conversations: Vec<Conversation>,
    threads: HashMap<ConversationId, Vec<Message>>,
    selected: Option<ConversationId>,
    pending_replies: HashMap<ConversationId, PendingReply>,
    /// `None` once every message id has been handed out.
    next_message_id: Option<u64>,
    next_reply_session_id: u64,
    clock: Arc<dyn Clock>,
}

impl ChatStore {
    /// Builds a store from a seed and selects its first conversation.
    pub fn new(seed: Seed, clock: Arc<dyn Clock>) -> ChatResult<Self> {
        seed.validate()?;

        let max_seed_message_id = seed
            .threads
            .iter()
            .flat_map(|thread| thread.messages.iter())
            .map(|message| message.id.get())
            .max()
            .unwrap_or(0);
        let selected = seed.conversations.first().map(|conversation| conversation.id);
        let threads = seed
            .threads
            .into_iter()
            .map(|thread| (thread.conversation_id, thread.messages))
            .collect();

        Ok(Self {
            conversations: seed.conversations,
            threads,
            selected,
            pending_replies: HashMap::new(),
            next_message_id: max_seed_message_id.checked_add(1),
            next_reply_session_id: 1,
            clock,
        })
    }

    pub fn with_local_clock(seed: Seed) -> ChatResult<Self> {
        Self::new(seed, Arc::new(LocalClock))
    }

    /// A store with no conversations, used when no valid seed is available.
    pub fn empty(clock: Arc<dyn Clock>) -> Self {
        Self {
            conversations: Vec::new(),
            threads: HashMap::new(),
            selected: None,
            pending_replies: HashMap::new(),
            next_message_id: Some(1),
            next_reply_session_id: 1,
            clock,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversation(&self, conversation_id: ConversationId) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|conversation| conversation.id == conversation_id)
    }

    pub fn selected_id(&self) -> Option<ConversationId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selected
            .and_then(|conversation_id| self.conversation(conversation_id))
    }

    pub fn messages(&self, conversation_id: ConversationId) -> &[Message] {
        self.threads
            .get(&conversation_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn selected_messages(&self) -> &[Message] {
        self.selected
            .map(|conversation_id| self.messages(conversation_id))
            .unwrap_or_default()
    }

    pub fn pending_reply(&self, conversation_id: ConversationId) -> Option<ReplyTicket> {
        self.pending_replies
            .get(&conversation_id)
            .map(|pending| pending.ticket)
    }

    /// Makes `conversation_id` the active conversation and marks it read.
    ///
    /// Leaving a conversation cancels its pending reply so a stale timer can never
    /// mutate a thread the user navigated away from.
    pub fn select(&mut self, conversation_id: ConversationId) -> ChatResult<Selection> {
        let index = self
            .conversation_index(conversation_id)
            .context(UnknownConversationSnafu {
                stage: "select-conversation",
                id: conversation_id,
            })?;

        if self.selected == Some(conversation_id) {
            return Ok(Selection {
                changed: false,
                cancelled: None,
            });
        }

        let cancelled = self
            .selected
            .and_then(|previous| self.cancel_reply(previous));

        self.selected = Some(conversation_id);
        self.conversations[index].unread = 0;

        Ok(Selection {
            changed: true,
            cancelled,
        })
    }

    /// Appends the local user's message to the selected conversation.
    ///
    /// Returns `None` for empty text or when nothing is selected. Otherwise a reply
    /// ticket is issued for the selected conversation, replacing any earlier one.
    pub fn send(&mut self, outgoing: OutgoingMessage) -> Option<SendReceipt> {
        if outgoing.is_empty_text() {
            return None;
        }

        let conversation_id = self.selected?;
        let index = self.conversation_index(conversation_id)?;
        let origin_kind = outgoing.kind;
        let Some(message_id) = self.alloc_message_id() else {
            tracing::warn!("message ids exhausted; dropping send to conversation {conversation_id}");
            return None;
        };
        let message = Message::outgoing(message_id, outgoing, self.clock.now_label());

        let conversation = &mut self.conversations[index];
        conversation.last_message = message.preview();
        conversation.timestamp = message.timestamp.clone();
        self.threads
            .entry(conversation_id)
            .or_default()
            .push(message);

        let replaced = self.cancel_reply(conversation_id);
        let ticket = ReplyTicket::new(conversation_id, self.alloc_reply_session_id());
        self.pending_replies.insert(
            conversation_id,
            PendingReply {
                ticket,
                origin_kind,
                phase: ReplyPhase::Scheduled,
            },
        );

        tracing::debug!(
            "queued reply {:?} for conversation {conversation_id} after message {message_id}",
            ticket.session_id
        );

        Some(SendReceipt {
            message_id,
            conversation_id,
            reply: ticket,
            replaced,
        })
    }

    /// First reply phase: show the typing indicator.
    pub fn begin_typing(&mut self, ticket: ReplyTicket) -> Result<(), ReplyRejection> {
        self.live_pending(ticket, ReplyPhase::Scheduled)?;

        if let Some(pending) = self.pending_replies.get_mut(&ticket.conversation_id) {
            pending.phase = ReplyPhase::Typing;
        }
        self.set_typing(ticket.conversation_id, true);
        Ok(())
    }

    /// Second reply phase: append the canned answer and hide the typing indicator.
    pub fn deliver_reply(&mut self, ticket: ReplyTicket) -> Result<MessageId, ReplyRejection> {
        let pending = self.live_pending(ticket, ReplyPhase::Typing)?;
        self.pending_replies.remove(&ticket.conversation_id);

        let Some(index) = self.conversation_index(ticket.conversation_id) else {
            return Err(ReplyRejection::NotPending { attempted: ticket });
        };

        let Some(message_id) = self.alloc_message_id() else {
            self.conversations[index].is_typing = false;
            return Err(ReplyRejection::MessageIdsExhausted { ticket });
        };
        let conversation = &mut self.conversations[index];
        let reply = Message::from_contact(
            message_id,
            conversation.as_sender(),
            canned_reply(pending.origin_kind),
            self.clock.now_label(),
        );

        conversation.is_typing = false;
        conversation.last_message = reply.preview();
        conversation.timestamp = reply.timestamp.clone();
        self.threads
            .entry(ticket.conversation_id)
            .or_default()
            .push(reply);

        Ok(message_id)
    }

    /// Drops the pending reply of a conversation and clears the typing flag it raised.
    pub fn cancel_reply(&mut self, conversation_id: ConversationId) -> Option<ReplyTicket> {
        let pending = self.pending_replies.remove(&conversation_id)?;
        if pending.phase == ReplyPhase::Typing {
            self.set_typing(conversation_id, false);
        }

        tracing::debug!(
            "cancelled reply {:?} for conversation {conversation_id}",
            pending.ticket.session_id
        );
        Some(pending.ticket)
    }

    fn live_pending(
        &self,
        ticket: ReplyTicket,
        expected: ReplyPhase,
    ) -> Result<PendingReply, ReplyRejection> {
        let Some(pending) = self.pending_replies.get(&ticket.conversation_id).copied() else {
            return Err(ReplyRejection::NotPending { attempted: ticket });
        };

        if pending.ticket != ticket {
            return Err(ReplyRejection::Superseded {
                live: pending.ticket,
                attempted: ticket,
            });
        }

        if pending.phase != expected {
            return Err(ReplyRejection::OutOfOrder {
                ticket,
                expected,
                actual: pending.phase,
            });
        }

        Ok(pending)
    }

    fn set_typing(&mut self, conversation_id: ConversationId, is_typing: bool) {
        if let Some(index) = self.conversation_index(conversation_id) {
            self.conversations[index].is_typing = is_typing;
        }
    }

    fn conversation_index(&self, conversation_id: ConversationId) -> Option<usize> {
        self.conversations
            .iter()
            .position(|conversation| conversation.id == conversation_id)
    }

    fn alloc_message_id(&mut self) -> Option<MessageId> {
        let raw = self.next_message_id?;
        self.next_message_id = raw.checked_add(1);
        Some(MessageId::new(raw))
    }

    fn alloc_reply_session_id(&mut self) -> ReplySessionId {
        let id = ReplySessionId::new(self.next_reply_session_id);
        self.next_reply_session_id = self.next_reply_session_id.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::attachment::Attachment;
    use crate::clock::FixedClock;
    use crate::model::{DeliveryStatus, MessageKind, Sender};
    use crate::reply::{SHARE_REPLY, TEXT_REPLY};

    const SARAH: ConversationId = ConversationId::new(1);
    const DESIGN_TEAM: ConversationId = ConversationId::new(2);
    const MICHAEL: ConversationId = ConversationId::new(3);

    fn store() -> ChatStore {
        ChatStore::new(Seed::builtin(), Arc::new(FixedClock("11:15 AM"))).expect("seed store")
    }

    fn typing(store: &ChatStore, conversation_id: ConversationId) -> bool {
        store
            .conversation(conversation_id)
            .is_some_and(|conversation| conversation.is_typing)
    }

    #[test]
    fn first_seed_conversation_is_selected_by_default() {
        let store = store();
        assert_eq!(store.selected_id(), Some(SARAH));
        assert_eq!(store.selected_messages().len(), 4);
        assert!(store.messages(MICHAEL).is_empty());
    }

    #[test]
    fn send_then_both_phases_produce_exactly_one_reply() {
        let mut store = store();

        let receipt = store
            .send(OutgoingMessage::text("hello"))
            .expect("text send is accepted");
        let sent = store.selected_messages().last().cloned().expect("sent message");
        assert_eq!(store.selected_messages().len(), 5);
        assert_eq!(sent.id, receipt.message_id);
        assert_eq!(sent.sender, Sender::LocalUser);
        assert_eq!(sent.status, DeliveryStatus::Sent);
        assert_eq!(sent.kind, MessageKind::Text);
        assert_eq!(sent.timestamp, "11:15 AM");
        assert!(!typing(&store, SARAH));

        store.begin_typing(receipt.reply).expect("typing phase");
        assert!(typing(&store, SARAH));
        assert_eq!(store.selected_messages().len(), 5);

        let reply_id = store.deliver_reply(receipt.reply).expect("reply phase");
        assert!(!typing(&store, SARAH));

        let messages = store.selected_messages();
        assert_eq!(messages.len(), 6);
        let reply = &messages[5];
        assert_eq!(reply.id, reply_id);
        assert_eq!(reply.sender.name(), "Sarah Johnson");
        assert_eq!(reply.content, TEXT_REPLY);
        assert_eq!(reply.kind, MessageKind::Text);
        assert_eq!(store.pending_reply(SARAH), None);
    }

    #[test]
    fn empty_text_is_ignored() {
        let mut store = store();
        assert_eq!(store.send(OutgoingMessage::text("")), None);
        assert_eq!(store.selected_messages().len(), 4);
        assert_eq!(store.pending_reply(SARAH), None);
    }

    #[test]
    fn file_sends_get_the_share_reply() {
        let mut store = store();
        let attachment = Attachment::new("notes.pdf", "/tmp/notes.pdf", "application/pdf");
        let receipt = store
            .send(OutgoingMessage::attachment(&attachment))
            .expect("file send is accepted");

        store.begin_typing(receipt.reply).expect("typing phase");
        store.deliver_reply(receipt.reply).expect("reply phase");

        let messages = store.selected_messages();
        assert_eq!(messages[4].kind, MessageKind::File);
        assert_eq!(messages[4].file_name.as_deref(), Some("notes.pdf"));
        assert_eq!(messages[5].content, SHARE_REPLY);
    }

    #[test]
    fn sends_and_replies_refresh_the_sidebar_preview() {
        let mut store = store();
        let receipt = store.send(OutgoingMessage::emoji("🎉")).expect("emoji send");
        let sarah = store.conversation(SARAH).expect("sarah");
        assert_eq!(sarah.last_message, "🎉");
        assert_eq!(sarah.timestamp, "11:15 AM");

        store.begin_typing(receipt.reply).expect("typing phase");
        store.deliver_reply(receipt.reply).expect("reply phase");
        let sarah = store.conversation(SARAH).expect("sarah");
        assert_eq!(sarah.last_message, SHARE_REPLY);
    }

    #[test]
    fn reply_phases_must_run_in_order() {
        let mut store = store();
        let receipt = store.send(OutgoingMessage::text("hi")).expect("send");

        assert!(matches!(
            store.deliver_reply(receipt.reply),
            Err(ReplyRejection::OutOfOrder {
                expected: ReplyPhase::Typing,
                actual: ReplyPhase::Scheduled,
                ..
            })
        ));
        assert_eq!(store.selected_messages().len(), 5);
    }

    #[test]
    fn leaving_a_conversation_cancels_its_pending_reply() {
        let mut store = store();
        let receipt = store.send(OutgoingMessage::text("hello")).expect("send");
        store.begin_typing(receipt.reply).expect("typing phase");

        let michael_before = store.conversation(MICHAEL).cloned();
        let selection = store.select(MICHAEL).expect("select michael");
        assert!(selection.changed);
        assert_eq!(selection.cancelled, Some(receipt.reply));
        assert!(!typing(&store, SARAH));

        // The stale timer fires after the user navigated away.
        assert!(matches!(
            store.deliver_reply(receipt.reply),
            Err(ReplyRejection::NotPending { .. })
        ));
        assert_eq!(store.messages(SARAH).len(), 5);
        assert!(store.messages(MICHAEL).is_empty());
        assert_eq!(store.conversation(MICHAEL).cloned(), michael_before);
    }

    #[test]
    fn a_new_send_supersedes_the_previous_reply() {
        let mut store = store();
        let first = store.send(OutgoingMessage::text("one")).expect("first send");
        store.begin_typing(first.reply).expect("first typing");

        let second = store.send(OutgoingMessage::text("two")).expect("second send");
        assert_eq!(second.replaced, Some(first.reply));
        assert!(!typing(&store, SARAH));

        assert!(matches!(
            store.begin_typing(first.reply),
            Err(ReplyRejection::Superseded { .. })
        ));
        store.begin_typing(second.reply).expect("second typing");
        store.deliver_reply(second.reply).expect("second reply");

        let replies = store
            .selected_messages()
            .iter()
            .filter(|message| !message.is_local())
            .count();
        // Two seeded messages from Sarah plus the single surviving reply.
        assert_eq!(replies, 3);
    }

    #[test]
    fn selecting_marks_the_conversation_read() {
        let mut store = store();
        store.select(DESIGN_TEAM).expect("select design team");
        store.select(SARAH).expect("select sarah");
        assert_eq!(store.conversation(SARAH).map(|c| c.unread), Some(0));
    }

    #[test]
    fn seeded_typing_flags_survive_navigation() {
        let mut store = store();
        store.select(DESIGN_TEAM).expect("select design team");
        store.select(MICHAEL).expect("select michael");
        assert!(typing(&store, DESIGN_TEAM));
    }

    #[test]
    fn reselecting_is_a_no_op() {
        let mut store = store();
        let receipt = store.send(OutgoingMessage::text("hi")).expect("send");
        let selection = store.select(SARAH).expect("reselect");
        assert!(!selection.changed);
        assert_eq!(store.pending_reply(SARAH), Some(receipt.reply));
    }

    #[test]
    fn unknown_conversations_cannot_be_selected() {
        let mut store = store();
        assert!(store.select(ConversationId::new(42)).is_err());
        assert_eq!(store.selected_id(), Some(SARAH));
    }

    #[test]
    fn message_ids_stay_unique_across_sends_and_replies() {
        let mut store = store();
        for round in 0..3 {
            let receipt = store
                .send(OutgoingMessage::text(format!("round {round}")))
                .expect("send");
            store.begin_typing(receipt.reply).expect("typing");
            store.deliver_reply(receipt.reply).expect("reply");
        }

        let ids = store
            .selected_messages()
            .iter()
            .map(|message| message.id)
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), store.selected_messages().len());
    }

    fn store_with_last_seed_id(raw: u64) -> ChatStore {
        let mut seed = Seed::builtin();
        if let Some(last) = seed.threads[0].messages.last_mut() {
            last.id = MessageId::new(raw);
        }
        ChatStore::new(seed, Arc::new(FixedClock("11:15 AM"))).expect("seed store")
    }

    fn ids_are_unique(store: &ChatStore) -> bool {
        let ids = store
            .selected_messages()
            .iter()
            .map(|message| message.id)
            .collect::<HashSet<_>>();
        ids.len() == store.selected_messages().len()
    }

    #[test]
    fn a_seed_holding_the_largest_id_refuses_sends() {
        let mut store = store_with_last_seed_id(u64::MAX);

        assert_eq!(store.send(OutgoingMessage::text("hi")), None);
        assert_eq!(store.selected_messages().len(), 4);
        assert_eq!(store.pending_reply(SARAH), None);
        assert!(ids_are_unique(&store));
    }

    #[test]
    fn the_last_free_id_is_used_once() {
        let mut store = store_with_last_seed_id(u64::MAX - 1);

        let receipt = store.send(OutgoingMessage::text("hi")).expect("last id");
        assert_eq!(receipt.message_id, MessageId::new(u64::MAX));
        assert_eq!(store.send(OutgoingMessage::text("again")), None);
        assert!(ids_are_unique(&store));
    }

    #[test]
    fn a_reply_without_a_free_id_clears_typing() {
        let mut store = store_with_last_seed_id(u64::MAX - 1);
        let receipt = store.send(OutgoingMessage::text("hi")).expect("last id");
        store.begin_typing(receipt.reply).expect("typing phase");

        assert_eq!(
            store.deliver_reply(receipt.reply),
            Err(ReplyRejection::MessageIdsExhausted {
                ticket: receipt.reply
            })
        );
        assert!(!typing(&store, SARAH));
        assert_eq!(store.pending_reply(SARAH), None);
        assert!(ids_are_unique(&store));
    }

    #[test]
    fn nothing_is_sent_without_a_selection() {
        let mut store = ChatStore::empty(Arc::new(FixedClock("09:00 AM")));
        assert_eq!(store.selected_id(), None);
        assert_eq!(store.send(OutgoingMessage::text("anyone?")), None);
    }
}
