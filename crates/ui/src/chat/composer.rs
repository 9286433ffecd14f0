use std::path::Path;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, Icon, IconName, Selectable, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    v_flex,
};
use parlor_chat::{AttachmentHost, Composer, EMOJI_PALETTE, LocalFileHost};

use crate::chat::events::SendRequested;

/// Message input with emoji palette, single-file attachment and send button.
pub struct ComposerView {
    input_state: Entity<InputState>,
    composer: Composer,
    host: Box<dyn AttachmentHost>,
    emoji_palette_open: bool,
    pending_newline: bool,
    file_picker_task: Option<Task<()>>,
}

impl EventEmitter<SendRequested> for ComposerView {}

impl ComposerView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        Self::with_host(Box::new(LocalFileHost), window, cx)
    }

    pub fn with_host(
        host: Box<dyn AttachmentHost>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Type a message...")
                .clean_on_escape()
                .auto_grow(1, 6)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| match event {
                InputEvent::PressEnter { secondary } => {
                    if *secondary {
                        this.pending_newline = false;
                        return;
                    }

                    if this.pending_newline {
                        // Shift+Enter inserts the newline itself and still emits PressEnter.
                        this.pending_newline = false;
                    } else {
                        this.trim_trailing_newline(window, cx);
                        this.handle_send(window, cx);
                    }
                }
                _ => this.sync_draft(cx),
            },
        )
        .detach();

        Self {
            input_state,
            composer: Composer::new(),
            host,
            emoji_palette_open: false,
            pending_newline: false,
            file_picker_task: None,
        }
    }

    fn sync_draft(&mut self, cx: &mut Context<Self>) {
        let value = self.input_state.read(cx).value().to_string();
        if value != self.composer.draft() {
            self.composer.set_draft(value);
            cx.notify();
        }
    }

    fn set_input_value(&mut self, value: String, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value(value, window, cx);
        });
    }

    fn handle_shift_enter(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.pending_newline = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
        cx.notify();
    }

    fn trim_trailing_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let value = self.input_state.read(cx).value().to_string();
        if let Some(trimmed) = value.strip_suffix('\n') {
            self.set_input_value(trimmed.to_string(), window, cx);
        }
        self.sync_draft(cx);
    }

    fn handle_send(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.sync_draft(cx);
        let Some(outgoing) = self.composer.take_outgoing() else {
            return;
        };

        cx.emit(SendRequested { outgoing });
        self.emoji_palette_open = false;
        self.pending_newline = false;
        self.set_input_value(String::new(), window, cx);
        cx.notify();
    }

    fn toggle_emoji_palette(&mut self, cx: &mut Context<Self>) {
        self.emoji_palette_open = !self.emoji_palette_open;
        cx.notify();
    }

    fn pick_emoji(&mut self, glyph: &str, window: &mut Window, cx: &mut Context<Self>) {
        self.sync_draft(cx);
        self.composer.pick_emoji(glyph);
        self.emoji_palette_open = false;
        self.set_input_value(self.composer.draft().to_string(), window, cx);
        cx.notify();
    }

    fn open_file_picker(&mut self, cx: &mut Context<Self>) {
        // Replacing the task drops any dialog result that is still pending.
        self.file_picker_task = Some(cx.spawn(async move |this, cx| {
            let picked = rfd::AsyncFileDialog::new()
                .set_title("Attach a file")
                .pick_file()
                .await;

            let Some(file) = picked else {
                return;
            };
            let path = file.path().to_path_buf();

            let _ = this.update(cx, |this, cx| {
                this.stage_file(&path, cx);
                this.file_picker_task = None;
            });
        }));
    }

    fn stage_file(&mut self, path: &Path, cx: &mut Context<Self>) {
        match self.host.stage(path) {
            Ok(attachment) => {
                tracing::info!("staged attachment {} ({})", attachment.name, attachment.mime_type);
                self.composer.stage_attachment(attachment);
            }
            Err(error) => {
                tracing::warn!("failed to stage attachment: {error}");
            }
        }
        cx.notify();
    }

    fn remove_attachment(&mut self, cx: &mut Context<Self>) {
        self.composer.remove_attachment();
        cx.notify();
    }

    fn render_staged_attachment(&self, cx: &mut Context<Self>) -> Option<AnyElement> {
        let attachment = self.composer.staged_attachment()?;
        let theme = cx.theme();
        let icon = if attachment.is_image() {
            IconName::GalleryVerticalEnd
        } else {
            IconName::File
        };

        Some(
            h_flex()
                .id("staged-attachment")
                .w_full()
                .gap_2()
                .items_center()
                .child(
                    h_flex()
                        .flex_1()
                        .min_w_0()
                        .gap_2()
                        .p_2()
                        .items_center()
                        .rounded_md()
                        .bg(theme.muted)
                        .child(Icon::new(icon).size(px(16.)))
                        .child(
                            div()
                                .flex_1()
                                .min_w_0()
                                .truncate()
                                .text_sm()
                                .child(attachment.name.clone()),
                        ),
                )
                .child(
                    Button::new("remove-attachment")
                        .ghost()
                        .small()
                        .icon(IconName::Close)
                        .tooltip("Remove attachment")
                        .on_click(cx.listener(|this, _, _window, cx| {
                            this.remove_attachment(cx);
                        })),
                )
                .into_any_element(),
        )
    }

    fn render_emoji_palette(&self, cx: &mut Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .id("emoji-palette")
            .flex_wrap()
            .gap_1()
            .p_2()
            .rounded_md()
            .border_1()
            .border_color(theme.border)
            .bg(theme.popover)
            .children(EMOJI_PALETTE.iter().enumerate().map(|(index, glyph)| {
                let glyph = *glyph;
                Button::new(("emoji", index))
                    .ghost()
                    .small()
                    .child(glyph)
                    .on_click(cx.listener(move |this, _, window, cx| {
                        this.pick_emoji(glyph, window, cx);
                    }))
            }))
            .into_any_element()
    }
}

impl Render for ComposerView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let can_send = self.composer.can_send();
        let staged_attachment = self.render_staged_attachment(cx);
        let emoji_palette = self
            .emoji_palette_open
            .then(|| self.render_emoji_palette(cx));

        v_flex()
            .bg(theme.background)
            .gap_2()
            .p_3()
            .children(staged_attachment)
            .children(emoji_palette)
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .items_end()
                    .child(
                        Button::new("attach-file")
                            .ghost()
                            .small()
                            .icon(IconName::Plus)
                            .tooltip("Attach file")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.open_file_picker(cx);
                            })),
                    )
                    .child(
                        Button::new("toggle-emoji-palette")
                            .ghost()
                            .small()
                            .child("😊")
                            .tooltip("Add emoji")
                            .when(self.emoji_palette_open, |button| button.selected(true))
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.toggle_emoji_palette(cx);
                            })),
                    )
                    .child(
                        div()
                            .flex_1()
                            .min_w_0()
                            .px_3()
                            .py_1()
                            .rounded_lg()
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                                if event.keystroke.key == "enter" && event.keystroke.modifiers.shift {
                                    this.handle_shift_enter(window, cx);
                                }
                            }))
                            .child(Input::new(&self.input_state).w_full().appearance(false)),
                    )
                    .child(
                        Button::new("send")
                            .small()
                            .primary()
                            .icon(IconName::ArrowUp)
                            .tooltip("Send message")
                            .disabled(!can_send)
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.handle_send(window, cx);
                            })),
                    ),
            )
    }
}
