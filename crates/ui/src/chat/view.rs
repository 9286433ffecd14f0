use std::collections::HashMap;
use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, label::Label, v_flex};
use parlor_chat::view_model::ThreadHeader;
use parlor_chat::{
    ChatStore, ConversationId, LocalClock, ReplyRejection, ReplyTicket, ReplyTiming, Seed,
};

use crate::chat::events::{
    ConversationSelected, SendRequested, SidebarDrawerRequested, ThemeToggleRequested,
};
use crate::chat::{ChatSidebar, ComposerView, MessageList, ThreadHeaderView};
use crate::settings::{ParlorSettings, SettingsChanged, SettingsState};

/// Parent coordinator for the sidebar, thread header, message list and composer.
///
/// Owns the [`ChatStore`] and pushes snapshots down after every mutation. Simulated
/// replies run as one task per conversation; replacing or dropping a task cancels it.
pub struct ChatView {
    store: ChatStore,
    sidebar: Entity<ChatSidebar>,
    header: Entity<ThreadHeaderView>,
    message_list: Entity<MessageList>,
    composer: Entity<ComposerView>,
    settings_state: Entity<SettingsState>,
    reply_timing: ReplyTiming,
    avatar_group_limit: usize,
    reply_tasks: HashMap<ConversationId, Task<()>>,
}

impl EventEmitter<SidebarDrawerRequested> for ChatView {}

impl ChatView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let sidebar = cx.new(|cx| ChatSidebar::new(window, cx));
        let header = cx.new(ThreadHeaderView::new);
        let message_list = cx.new(MessageList::new);
        let composer = cx.new(|cx| ComposerView::new(window, cx));
        let settings_state = SettingsState::new(cx);
        let settings = settings_state.read(cx).settings();

        let mut this = Self {
            store: Self::load_store(&settings),
            sidebar: sidebar.clone(),
            header: header.clone(),
            message_list: message_list.clone(),
            composer: composer.clone(),
            settings_state: settings_state.clone(),
            reply_timing: settings.reply_timing(),
            avatar_group_limit: settings.avatar_group_limit,
            reply_tasks: HashMap::new(),
        };
        this.sync_views(true, cx);

        cx.subscribe(&sidebar, |this, _, event: &ConversationSelected, cx| {
            this.handle_conversation_selected(*event, cx);
        })
        .detach();

        cx.subscribe(&composer, |this, _, event: &SendRequested, cx| {
            this.handle_send_requested(event.clone(), cx);
        })
        .detach();

        cx.subscribe(&header, |_, _, _event: &SidebarDrawerRequested, cx| {
            cx.emit(SidebarDrawerRequested);
        })
        .detach();

        cx.subscribe_in(
            &header,
            window,
            |this, _, _event: &ThemeToggleRequested, window, cx| {
                this.settings_state.update(cx, |state, cx| {
                    state.toggle_theme_mode(window, cx);
                });
            },
        )
        .detach();

        cx.subscribe(&settings_state, |this, _, event: &SettingsChanged, cx| {
            this.handle_settings_changed(event, cx);
        })
        .detach();

        this
    }

    fn load_store(settings: &ParlorSettings) -> ChatStore {
        let seed = Seed::load_or_builtin(settings.seed_path.as_deref());
        match ChatStore::with_local_clock(seed) {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("failed to build chat store from seed: {error}");
                ChatStore::with_local_clock(Seed::builtin())
                    .unwrap_or_else(|_| ChatStore::empty(Arc::new(LocalClock)))
            }
        }
    }

    pub fn sidebar(&self) -> &Entity<ChatSidebar> {
        &self.sidebar
    }

    fn handle_conversation_selected(&mut self, event: ConversationSelected, cx: &mut Context<Self>) {
        let selection = match self.store.select(event.conversation_id) {
            Ok(selection) => selection,
            Err(error) => {
                tracing::warn!("ignoring conversation selection: {error}");
                return;
            }
        };

        if let Some(cancelled) = selection.cancelled {
            self.reply_tasks.remove(&cancelled.conversation_id);
        }

        if selection.changed {
            tracing::info!("selected conversation {}", event.conversation_id);
            self.sync_views(true, cx);
        }
    }

    fn handle_send_requested(&mut self, event: SendRequested, cx: &mut Context<Self>) {
        let Some(receipt) = self.store.send(event.outgoing) else {
            return;
        };

        self.schedule_reply(receipt.reply, cx);
        self.sync_views(false, cx);
    }

    fn handle_settings_changed(&mut self, event: &SettingsChanged, cx: &mut Context<Self>) {
        self.reply_timing = event.settings.reply_timing();
        self.avatar_group_limit = event.settings.avatar_group_limit;
        cx.refresh_windows();
        self.sync_views(false, cx);
    }

    /// Runs both reply phases for `ticket`, replacing the conversation's previous reply task.
    fn schedule_reply(&mut self, ticket: ReplyTicket, cx: &mut Context<Self>) {
        let timing = self.reply_timing;

        let task = cx.spawn(async move |this, cx| {
            cx.background_executor().timer(timing.typing_delay).await;

            let typing = this.update(cx, |this, cx| this.apply_typing(ticket, cx));
            if !matches!(typing, Ok(true)) {
                return;
            }

            cx.background_executor().timer(timing.reply_delay).await;

            let _ = this.update(cx, |this, cx| {
                this.apply_reply(ticket, cx);
            });
        });

        self.reply_tasks.insert(ticket.conversation_id, task);
    }

    fn apply_typing(&mut self, ticket: ReplyTicket, cx: &mut Context<Self>) -> bool {
        match self.store.begin_typing(ticket) {
            Ok(()) => {
                self.sync_views(false, cx);
                true
            }
            Err(rejection) => {
                log_rejected_phase("typing", rejection);
                false
            }
        }
    }

    fn apply_reply(&mut self, ticket: ReplyTicket, cx: &mut Context<Self>) {
        match self.store.deliver_reply(ticket) {
            Ok(message_id) => {
                tracing::info!(
                    "delivered reply {message_id} in conversation {}",
                    ticket.conversation_id
                );
                self.sync_views(false, cx);
                self.reply_tasks.remove(&ticket.conversation_id);
            }
            Err(rejection) => {
                log_rejected_phase("reply", rejection);
                if let ReplyRejection::MessageIdsExhausted { .. } = rejection {
                    // The store already dropped the reply and its typing flag.
                    self.sync_views(false, cx);
                    self.reply_tasks.remove(&ticket.conversation_id);
                }
            }
        }
    }

    /// Pushes the current store state to every child view.
    fn sync_views(&mut self, conversation_changed: bool, cx: &mut Context<Self>) {
        let conversations = self.store.conversations().to_vec();
        let selected = self.store.selected_id();
        self.sidebar.update(cx, |sidebar, cx| {
            sidebar.set_snapshot(conversations, selected, cx);
        });

        let header = self
            .store
            .selected()
            .map(|conversation| ThreadHeader::from_conversation(conversation, self.avatar_group_limit));
        self.header.update(cx, |view, cx| view.set_header(header, cx));

        let messages = self.store.selected_messages();
        self.message_list.update(cx, |list, cx| {
            if conversation_changed {
                list.reset_scroll_tracking(cx);
            }
            list.set_messages(messages, cx);
        });

        cx.notify();
    }

    fn render_no_selection(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-view-no-selection")
            .flex_1()
            .items_center()
            .justify_center()
            .child(
                Label::new("Select a conversation to start chatting")
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
            .into_any_element()
    }
}

fn log_rejected_phase(phase: &str, rejection: ReplyRejection) {
    match rejection {
        ReplyRejection::NotPending { attempted } => {
            tracing::debug!(
                "dropped {phase} phase for conversation {}: nothing pending",
                attempted.conversation_id
            );
        }
        ReplyRejection::Superseded { live, attempted } => {
            tracing::debug!(
                "dropped {phase} phase {:?}: superseded by {:?}",
                attempted.session_id,
                live.session_id
            );
        }
        ReplyRejection::OutOfOrder {
            ticket,
            expected,
            actual,
        } => {
            tracing::warn!(
                "dropped {phase} phase {:?}: expected {expected:?}, found {actual:?}",
                ticket.session_id
            );
        }
        ReplyRejection::MessageIdsExhausted { ticket } => {
            tracing::warn!(
                "dropped {phase} phase for conversation {}: message ids exhausted",
                ticket.conversation_id
            );
        }
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let has_selection = self.store.selected_id().is_some();

        let body = if has_selection {
            v_flex()
                .flex_1()
                .min_h_0()
                .child(
                    div()
                        .id("chat-view-message-list")
                        .flex_1()
                        .min_h_0()
                        .child(self.message_list.clone()),
                )
                .child(
                    div()
                        .id("chat-view-composer")
                        .flex_shrink_0()
                        .w_full()
                        .border_t_1()
                        .border_color(theme.border)
                        .child(self.composer.clone()),
                )
                .into_any_element()
        } else {
            self.render_no_selection(cx)
        };

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(self.header.clone())
            .child(body)
    }
}
