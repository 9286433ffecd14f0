use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use parlor_chat::view_model::{HeaderAvatar, ThreadHeader};

use crate::app::SidebarMode;
use crate::chat::avatar::{AVATAR_SIZE, avatar, avatar_group};
use crate::chat::events::{SidebarDrawerRequested, ThemeToggleRequested};

/// Name, subtitle and avatar of the selected conversation, plus the drawer and theme controls.
pub struct ThreadHeaderView {
    header: Option<ThreadHeader>,
}

impl EventEmitter<SidebarDrawerRequested> for ThreadHeaderView {}
impl EventEmitter<ThemeToggleRequested> for ThreadHeaderView {}

impl ThreadHeaderView {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self { header: None }
    }

    pub fn set_header(&mut self, header: Option<ThreadHeader>, cx: &mut Context<Self>) {
        if self.header != header {
            self.header = header;
            cx.notify();
        }
    }

    fn render_avatar(header: &ThreadHeader, cx: &App) -> AnyElement {
        match &header.avatar {
            HeaderAvatar::Single { avatar: reference, initials } => {
                avatar(reference, initials, AVATAR_SIZE, cx).into_any_element()
            }
            HeaderAvatar::Group(layout) => {
                avatar_group("thread-header-avatar-group", layout, cx).into_any_element()
            }
        }
    }

    fn render_title(header: &ThreadHeader, cx: &App) -> impl IntoElement {
        let theme = cx.theme();
        let subtitle_color = if header.subtitle_is_typing {
            theme.primary
        } else {
            theme.muted_foreground
        };

        v_flex()
            .flex_1()
            .min_w_0()
            .child(
                div()
                    .truncate()
                    .font_weight(FontWeight::SEMIBOLD)
                    .child(header.name.clone()),
            )
            .when_some(header.subtitle.clone(), |el, subtitle| {
                el.child(
                    div()
                        .text_xs()
                        .text_color(subtitle_color)
                        .when(header.subtitle_is_typing, |el| el.italic())
                        .child(subtitle),
                )
            })
    }
}

impl Render for ThreadHeaderView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let drawer_mode = SidebarMode::from_width(window.viewport_size().width).is_drawer();
        let theme_icon = if theme.mode.is_dark() {
            IconName::Sun
        } else {
            IconName::Moon
        };

        h_flex()
            .id("thread-header")
            .w_full()
            .flex_shrink_0()
            .gap_3()
            .px_4()
            .py_3()
            .items_center()
            .border_b_1()
            .border_color(theme.border)
            .bg(theme.background)
            .when(drawer_mode, |el| {
                el.child(
                    Button::new("open-sidebar-drawer")
                        .ghost()
                        .small()
                        .icon(IconName::Menu)
                        .tooltip("Show conversations")
                        .on_click(cx.listener(|_, _, _window, cx| {
                            cx.emit(SidebarDrawerRequested);
                        })),
                )
            })
            .when_some(self.header.as_ref(), |el, header| {
                el.child(Self::render_avatar(header, cx))
                    .child(Self::render_title(header, cx))
            })
            .when(self.header.is_none(), |el| el.child(div().flex_1()))
            .child(
                Button::new("toggle-theme-mode")
                    .ghost()
                    .small()
                    .icon(theme_icon)
                    .tooltip("Toggle theme")
                    .on_click(cx.listener(|_, _, _window, cx| {
                        cx.emit(ThemeToggleRequested);
                    })),
            )
    }
}
