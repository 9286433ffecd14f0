use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::path::PathBuf;
use std::rc::Rc;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, Icon, IconName, h_flex, label::Label, v_flex, v_virtual_list};
use parlor_chat::view_model::{GlyphTone, MessageBody, MessageRow};
use parlor_chat::{Message, MessageId};

use crate::chat::avatar::{MESSAGE_AVATAR_SIZE, avatar};
use crate::chat::scroll_manager::ScrollManager;

const DEFAULT_CONTENT_WIDTH: Pixels = px(680.);
const LIST_HORIZONTAL_PADDING: Pixels = px(16.);
const CONTENT_WIDTH_CHANGE_EPSILON: f32 = 1.0;
/// Rows never take more than this share of the list width.
const ROW_MAX_WIDTH_RATIO: f32 = 0.8;
const ROW_GAP: Pixels = px(12.);
const BUBBLE_PADDING: Pixels = px(12.);
const SENDER_LINE_HEIGHT: Pixels = px(20.);
const SENDER_LINE_GAP: Pixels = px(4.);
const STATUS_LINE_HEIGHT: Pixels = px(16.);
const STATUS_LINE_GAP: Pixels = px(4.);
const IMAGE_MAX_HEIGHT: Pixels = px(300.);
const FILE_ROW_HEIGHT: Pixels = px(44.);
const ESTIMATED_TEXT_LINE_HEIGHT: Pixels = px(20.);
const ESTIMATED_CHAR_WIDTH: f32 = 7.5;

struct SizeCacheEntry {
    layout_hash: u64,
    height: Pixels,
    measured: bool,
}

/// Virtualized thread body that keeps following the newest message.
pub struct MessageList {
    rows: Vec<MessageRow>,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    scroll_manager: ScrollManager,
    size_cache: HashMap<MessageId, SizeCacheEntry>,
    content_width: Option<Pixels>,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            rows: Vec::new(),
            item_sizes: Rc::new(Vec::new()),
            scroll_manager: ScrollManager::new(),
            size_cache: HashMap::new(),
            content_width: None,
        }
    }

    pub fn set_messages(&mut self, messages: &[Message], cx: &mut Context<Self>) {
        let grew = messages.len() > self.rows.len();

        self.rows = messages.iter().map(MessageRow::from_message).collect();
        self.rebuild_item_sizes();

        if grew {
            self.scroll_manager.request_scroll_to_bottom_if_following();
        }

        cx.notify();
    }

    /// Called when another conversation is shown so the new thread opens at its tail.
    pub fn reset_scroll_tracking(&mut self, cx: &mut Context<Self>) {
        self.scroll_manager.reset();
        cx.notify();
    }

    fn update_content_width(&mut self, cx: &mut Context<Self>) {
        let list_width = self.scroll_manager.bounds().size.width;
        if list_width <= Pixels::ZERO {
            return;
        }

        let next_content_width = max_pixels(px(1.), list_width - LIST_HORIZONTAL_PADDING * 2);
        let width_changed = self.content_width.is_none_or(|current| {
            (f32::from(current) - f32::from(next_content_width)).abs()
                > CONTENT_WIDTH_CHANGE_EPSILON
        });

        if width_changed {
            self.content_width = Some(next_content_width);

            for entry in self.size_cache.values_mut() {
                entry.measured = false;
            }

            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn rebuild_item_sizes(&mut self) {
        let content_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH);
        let mut active_ids = HashSet::with_capacity(self.rows.len());
        let mut sizes = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            let next_hash = layout_hash(row);
            let estimated_height = estimate_row_height(row, content_width);

            let entry = self.size_cache.entry(row.id).or_insert(SizeCacheEntry {
                layout_hash: next_hash,
                height: estimated_height,
                measured: false,
            });

            if entry.layout_hash != next_hash {
                entry.layout_hash = next_hash;
                entry.height = estimated_height;
                entry.measured = false;
            } else if !entry.measured {
                entry.height = estimated_height;
            }

            sizes.push(size(px(0.), entry.height + ROW_GAP));
            active_ids.insert(row.id);
        }

        self.size_cache.retain(|id, _| active_ids.contains(id));
        self.item_sizes = Rc::new(sizes);
    }

    fn measure_visible_items(
        &mut self,
        visible_range: Range<usize>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.rows.is_empty() {
            return;
        }

        let content_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH);
        let available_space = size(
            AvailableSpace::Definite(content_width),
            AvailableSpace::MinContent,
        );
        let mut updated = false;

        for index in visible_range {
            let Some(row) = self.rows.get(index).cloned() else {
                continue;
            };

            let next_hash = layout_hash(&row);
            {
                let entry = self.size_cache.entry(row.id).or_insert(SizeCacheEntry {
                    layout_hash: next_hash,
                    height: estimate_row_height(&row, content_width),
                    measured: false,
                });

                if entry.layout_hash != next_hash {
                    entry.layout_hash = next_hash;
                    entry.measured = false;
                }
            }

            let mut element = self.render_message_row(&row, cx);
            let measured_height = element.layout_as_root(available_space, window, cx).height;
            let Some(entry) = self.size_cache.get_mut(&row.id) else {
                continue;
            };
            if !entry.measured || pixels_changed(entry.height, measured_height) {
                entry.height = measured_height;
                updated = true;
            }
            entry.measured = true;
        }

        if updated {
            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn render_message_row(&self, row: &MessageRow, cx: &mut Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let row_max_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH) * ROW_MAX_WIDTH_RATIO;
        let (bubble_bg, bubble_fg) = if row.is_local {
            (theme.primary, theme.primary_foreground)
        } else {
            (theme.muted, theme.foreground)
        };

        let body = match &row.body {
            MessageBody::Bubble { text } => div()
                .mt_1()
                .p(BUBBLE_PADDING)
                .rounded_lg()
                .bg(bubble_bg)
                .text_color(bubble_fg)
                .child(Label::new(text.clone()).text_sm())
                .into_any_element(),
            MessageBody::Image { url } => div()
                .mt_1()
                .rounded_lg()
                .overflow_hidden()
                .child(
                    img(PathBuf::from(url))
                        .max_w_full()
                        .max_h(IMAGE_MAX_HEIGHT)
                        .object_fit(ObjectFit::Contain),
                )
                .into_any_element(),
            MessageBody::File { name } => h_flex()
                .mt_1()
                .p(BUBBLE_PADDING)
                .gap_2()
                .items_center()
                .rounded_lg()
                .bg(bubble_bg)
                .text_color(bubble_fg)
                .child(Icon::new(IconName::File).size(px(16.)))
                .child(div().text_sm().text_decoration_1().child(name.clone()))
                .into_any_element(),
        };

        let status = row.status.map(|glyph| {
            let color = match glyph.tone {
                GlyphTone::Muted => theme.muted_foreground,
                GlyphTone::Accent => theme.primary,
            };
            h_flex()
                .mt_1()
                .justify_end()
                .child(div().text_xs().text_color(color).child(glyph.text))
        });

        h_flex()
            .w_full()
            .when(row.is_local, |el| el.flex_row_reverse())
            .child(
                h_flex()
                    .max_w(row_max_width)
                    .gap_3()
                    .items_start()
                    .when(row.is_local, |el| el.flex_row_reverse())
                    .child(avatar(&row.avatar, &row.initials, MESSAGE_AVATAR_SIZE, cx))
                    .child(
                        v_flex()
                            .min_w_0()
                            .child(
                                h_flex()
                                    .gap_2()
                                    .items_baseline()
                                    .child(
                                        div()
                                            .text_sm()
                                            .font_weight(FontWeight::MEDIUM)
                                            .child(row.sender_label.clone()),
                                    )
                                    .child(
                                        div()
                                            .text_xs()
                                            .text_color(theme.muted_foreground)
                                            .child(row.timestamp.clone()),
                                    ),
                            )
                            .child(body)
                            .children(status),
                    ),
            )
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.update_content_width(cx);
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        v_flex().size_full().min_h_0().child(
            v_virtual_list(
                cx.entity().clone(),
                "message-list",
                self.item_sizes.clone(),
                |this, visible_range, window, cx| {
                    this.update_content_width(cx);
                    this.measure_visible_items(visible_range.clone(), window, cx);
                    visible_range
                        .filter_map(|index| {
                            this.rows.get(index).cloned().map(|row| {
                                div()
                                    .pb(ROW_GAP)
                                    .child(this.render_message_row(&row, cx))
                                    .into_any_element()
                            })
                        })
                        .collect::<Vec<_>>()
                },
            )
            .size_full()
            .px_4()
            .py_4()
            .track_scroll(self.scroll_manager.handle()),
        )
    }
}

fn layout_hash(row: &MessageRow) -> u64 {
    let mut hasher = DefaultHasher::new();
    row.id.hash(&mut hasher);
    row.is_local.hash(&mut hasher);
    row.sender_label.hash(&mut hasher);
    row.timestamp.hash(&mut hasher);
    row.body.hash(&mut hasher);
    row.status.map(|glyph| glyph.text).hash(&mut hasher);
    hasher.finish()
}

fn estimate_row_height(row: &MessageRow, content_width: Pixels) -> Pixels {
    let row_width = content_width * ROW_MAX_WIDTH_RATIO;
    let body_height = match &row.body {
        MessageBody::Bubble { text } => {
            let text_width = max_pixels(px(1.), row_width - BUBBLE_PADDING * 2);
            estimate_text_height(text, text_width) + BUBBLE_PADDING * 2
        }
        MessageBody::Image { .. } => IMAGE_MAX_HEIGHT,
        MessageBody::File { .. } => FILE_ROW_HEIGHT,
    };

    let mut total_height = SENDER_LINE_HEIGHT + SENDER_LINE_GAP + body_height;
    if row.status.is_some() {
        total_height += STATUS_LINE_GAP + STATUS_LINE_HEIGHT;
    }
    total_height
}

fn estimate_text_height(content: &str, width: Pixels) -> Pixels {
    if content.is_empty() {
        return ESTIMATED_TEXT_LINE_HEIGHT;
    }

    let chars_per_line = (f32::from(width) / ESTIMATED_CHAR_WIDTH).floor().max(1.0) as usize;

    let mut line_count = 0usize;
    for line in content.lines() {
        let char_count = line.chars().count().max(1);
        line_count += char_count.div_ceil(chars_per_line);
    }

    if content.ends_with('\n') {
        line_count += 1;
    }

    ESTIMATED_TEXT_LINE_HEIGHT * line_count.max(1)
}

fn max_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) >= f32::from(b) { a } else { b }
}

fn pixels_changed(a: Pixels, b: Pixels) -> bool {
    (f32::from(a) - f32::from(b)).abs() > 0.5
}

#[cfg(test)]
mod tests {
    use parlor_chat::{OutgoingMessage, Seed};

    use super::*;

    fn seeded_rows() -> Vec<MessageRow> {
        Seed::builtin().threads[0]
            .messages
            .iter()
            .map(MessageRow::from_message)
            .collect()
    }

    #[test]
    fn local_rows_reserve_space_for_status_glyphs() {
        let rows = seeded_rows();
        let width = px(680.);

        // m1 (local, read) and m2 (contact) carry similar short texts.
        let local = estimate_row_height(&rows[0], width);
        let contact = estimate_row_height(&rows[1], width);
        assert!(local > contact);
        assert!(contact > SENDER_LINE_HEIGHT);
    }

    #[test]
    fn longer_text_wraps_into_taller_rows() {
        let short = MessageRow::from_message(&Message::outgoing(
            MessageId::new(10),
            OutgoingMessage::text("hi"),
            "10:00 AM".to_string(),
        ));
        let long = MessageRow::from_message(&Message::outgoing(
            MessageId::new(11),
            OutgoingMessage::text("word ".repeat(200)),
            "10:00 AM".to_string(),
        ));

        let width = px(400.);
        assert!(estimate_row_height(&long, width) > estimate_row_height(&short, width));
    }

    #[test]
    fn layout_hash_changes_only_with_visible_content() {
        let rows = seeded_rows();
        let hashes = rows.iter().map(layout_hash).collect::<Vec<_>>();
        assert_eq!(hashes, rows.iter().map(layout_hash).collect::<Vec<_>>());

        let mut edited = rows[3].clone();
        edited.timestamp = "11:00 AM".to_string();
        assert_ne!(layout_hash(&edited), hashes[3]);
    }
}
