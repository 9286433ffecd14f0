use parlor_chat::{ConversationId, OutgoingMessage};

/// Emitted when a sidebar entry is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationSelected {
    pub conversation_id: ConversationId,
}

/// Emitted by the composer with exactly one payload to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequested {
    pub outgoing: OutgoingMessage,
}

/// Emitted by the thread header's drawer trigger in narrow windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarDrawerRequested;

/// Emitted by the thread header's light/dark toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeToggleRequested;
