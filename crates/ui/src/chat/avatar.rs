use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, tooltip::Tooltip};
use parlor_chat::avatar::{AvatarGroupLayout, OverflowBadge, resolve_avatar};

pub const AVATAR_SIZE: Pixels = px(40.);
pub const MESSAGE_AVATAR_SIZE: Pixels = px(32.);
pub const GROUP_BADGE_SIZE: Pixels = px(32.);
/// Horizontal overlap between stacked group badges.
const GROUP_BADGE_OVERLAP: Pixels = px(8.);

/// Circular avatar showing the referenced image, or initials when it cannot be loaded.
pub fn avatar(reference: &str, initials: &str, size: Pixels, cx: &App) -> Div {
    let theme = cx.theme();
    let base = div()
        .size(size)
        .flex_shrink_0()
        .rounded_full()
        .overflow_hidden()
        .flex()
        .items_center()
        .justify_center()
        .bg(theme.muted)
        .text_color(theme.muted_foreground)
        .text_xs()
        .font_weight(FontWeight::MEDIUM);

    match resolve_avatar(reference) {
        Some(path) => base.child(img(path).size(size).object_fit(ObjectFit::Cover)),
        None => base.child(SharedString::from(initials.to_string())),
    }
}

/// Overlapping participant badges followed by an optional "+k" badge.
pub fn avatar_group(id: impl Into<ElementId>, layout: &AvatarGroupLayout, cx: &App) -> Stateful<Div> {
    let theme = cx.theme();
    let mut group = h_flex().id(id).items_center();

    for (index, badge) in layout.visible.iter().enumerate() {
        let name = SharedString::from(badge.tooltip().to_string());
        group = group.child(
            div()
                .id(("avatar-group-member", index))
                .when(index > 0, |el| el.ml(-GROUP_BADGE_OVERLAP))
                .rounded_full()
                .border_2()
                .border_color(theme.background)
                .tooltip(move |window, cx| Tooltip::new(name.clone()).build(window, cx))
                .child(avatar(&badge.avatar, &badge.initials, GROUP_BADGE_SIZE, cx)),
        );
    }

    if let Some(overflow) = layout.overflow {
        group = group.child(overflow_badge(overflow, !layout.visible.is_empty(), cx));
    }

    group
}

fn overflow_badge(overflow: OverflowBadge, overlap: bool, cx: &App) -> impl IntoElement {
    let theme = cx.theme();
    let tooltip = SharedString::from(overflow.tooltip());

    div()
        .id("avatar-group-overflow")
        .when(overlap, |el| el.ml(-GROUP_BADGE_OVERLAP))
        .size(GROUP_BADGE_SIZE)
        .flex_shrink_0()
        .rounded_full()
        .border_2()
        .border_color(theme.background)
        .bg(theme.muted)
        .flex()
        .items_center()
        .justify_center()
        .text_xs()
        .font_weight(FontWeight::MEDIUM)
        .text_color(theme.muted_foreground)
        .tooltip(move |window, cx| Tooltip::new(tooltip.clone()).build(window, cx))
        .child(overflow.label())
}
