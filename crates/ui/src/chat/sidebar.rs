use std::rc::Rc;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable, VirtualListScrollHandle, h_flex,
    input::{Input, InputEvent, InputState},
    label::Label,
    list::ListItem,
    v_flex, v_virtual_list,
};
use parlor_chat::view_model::{ConversationRow, NO_MATCHES_LABEL, sidebar_rows};
use parlor_chat::{Conversation, ConversationId};

use crate::chat::avatar::{AVATAR_SIZE, avatar};
use crate::chat::events::ConversationSelected;

const CONVERSATION_ROW_HEIGHT: f32 = 72.0;

/// Conversation list with search.
///
/// Holds a read-only snapshot pushed by the chat view; clicks are reported as
/// [`ConversationSelected`] and never applied locally.
pub struct ChatSidebar {
    search_input: Entity<InputState>,
    search_query: String,
    conversations: Vec<Conversation>,
    selected_conversation: Option<ConversationId>,
    rows: Rc<Vec<ConversationRow>>,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    scroll_handle: VirtualListScrollHandle,
}

impl EventEmitter<ConversationSelected> for ChatSidebar {}

impl ChatSidebar {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let search_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Search conversations..."));

        cx.subscribe_in(
            &search_input,
            window,
            |this, _, _event: &InputEvent, _window, cx| {
                this.search_query = this.search_input.read(cx).value().to_string();
                this.rebuild_rows();
                cx.notify();
            },
        )
        .detach();

        Self {
            search_input,
            search_query: String::new(),
            conversations: Vec::new(),
            selected_conversation: None,
            rows: Rc::new(Vec::new()),
            item_sizes: Rc::new(Vec::new()),
            scroll_handle: VirtualListScrollHandle::new(),
        }
    }

    pub fn set_snapshot(
        &mut self,
        conversations: Vec<Conversation>,
        selected: Option<ConversationId>,
        cx: &mut Context<Self>,
    ) {
        self.conversations = conversations;
        self.selected_conversation = selected;
        self.rebuild_rows();
        cx.notify();
    }

    fn select_conversation(&mut self, conversation_id: ConversationId, cx: &mut Context<Self>) {
        cx.emit(ConversationSelected { conversation_id });
    }

    fn rebuild_rows(&mut self) {
        let rows = sidebar_rows(
            &self.conversations,
            self.selected_conversation,
            &self.search_query,
        );
        self.item_sizes = Rc::new(
            rows.iter()
                .map(|_| size(px(0.), px(CONVERSATION_ROW_HEIGHT)))
                .collect(),
        );
        self.rows = Rc::new(rows);
    }

    fn render_header(&mut self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .min_w_0()
            .gap_3()
            .p_4()
            .border_b_1()
            .border_color(theme.border)
            .child(
                Label::new("Messages")
                    .text_xl()
                    .font_weight(FontWeight::SEMIBOLD),
            )
            .child(Input::new(&self.search_input).w_full().small())
    }

    fn render_empty_state(&mut self, cx: &mut Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .flex_1()
            .items_center()
            .justify_center()
            .px_4()
            .child(
                Label::new(NO_MATCHES_LABEL)
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
            .into_any_element()
    }

    fn render_conversation_list(&mut self, cx: &mut Context<Self>) -> AnyElement {
        if self.rows.is_empty() {
            return self.render_empty_state(cx);
        }

        let rows = self.rows.clone();

        v_flex()
            .flex_1()
            .min_h_0()
            .child(
                v_virtual_list(
                    cx.entity().clone(),
                    "conversation-list",
                    self.item_sizes.clone(),
                    move |_this, visible_range, _window, cx| {
                        visible_range
                            .filter_map(|index| {
                                rows.get(index)
                                    .map(|row| render_conversation_row(row, index, cx))
                            })
                            .collect()
                    },
                )
                .w_full()
                .flex_1()
                .track_scroll(&self.scroll_handle),
            )
            .into_any_element()
    }
}

fn render_conversation_row(
    row: &ConversationRow,
    index: usize,
    cx: &mut Context<ChatSidebar>,
) -> AnyElement {
    let theme = cx.theme();
    let conversation_id = row.id;
    let preview_color = if row.is_typing {
        theme.primary
    } else {
        theme.muted_foreground
    };

    ListItem::new(("conversation", index))
        .w_full()
        .h(px(CONVERSATION_ROW_HEIGHT))
        .px_3()
        .py_2()
        .selected(row.selected)
        .on_click(cx.listener(move |this, _event: &ClickEvent, _window, cx| {
            this.select_conversation(conversation_id, cx);
        }))
        .child(
            h_flex()
                .w_full()
                .gap_3()
                .items_start()
                .child(avatar(&row.avatar, &row.initials, AVATAR_SIZE, cx))
                .child(
                    v_flex()
                        .flex_1()
                        .min_w_0()
                        .gap_1()
                        .child(
                            h_flex()
                                .w_full()
                                .justify_between()
                                .items_baseline()
                                .gap_2()
                                .child(
                                    div()
                                        .flex_1()
                                        .min_w_0()
                                        .truncate()
                                        .font_weight(FontWeight::MEDIUM)
                                        .child(row.name.clone()),
                                )
                                .child(
                                    div()
                                        .flex_shrink_0()
                                        .text_xs()
                                        .text_color(theme.muted_foreground)
                                        .child(row.timestamp.clone()),
                                ),
                        )
                        .child(
                            h_flex()
                                .w_full()
                                .justify_between()
                                .items_center()
                                .gap_2()
                                .child(
                                    div()
                                        .flex_1()
                                        .min_w_0()
                                        .truncate()
                                        .text_sm()
                                        .text_color(preview_color)
                                        .when(row.is_typing, |el| el.italic())
                                        .child(row.preview.clone()),
                                )
                                .when_some(row.unread_badge.clone(), |el, badge| {
                                    el.child(
                                        div()
                                            .flex_shrink_0()
                                            .min_w(px(20.))
                                            .h(px(20.))
                                            .px_1p5()
                                            .rounded_full()
                                            .bg(theme.primary)
                                            .text_color(theme.primary_foreground)
                                            .text_xs()
                                            .flex()
                                            .items_center()
                                            .justify_center()
                                            .child(badge),
                                    )
                                }),
                        ),
                ),
        )
        .into_any_element()
}

impl Render for ChatSidebar {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .size_full()
            .min_w_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(self.render_header(cx))
            .child(self.render_conversation_list(cx))
    }
}
