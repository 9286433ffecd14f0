use std::path::PathBuf;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::notification::NotificationList;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, label::Label, v_flex,
};

use crate::chat::{ChatSidebar, ChatView, ConversationSelected, SidebarDrawerRequested};

/// Returns the default themes directory path.
/// This is a pure function to allow deterministic testing of path resolution.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

/// Default sidebar width when docked, and the fixed drawer width.
pub const SIDEBAR_DEFAULT_WIDTH: f32 = 320.0;
pub const SIDEBAR_MIN_WIDTH: f32 = 240.0;
pub const SIDEBAR_MAX_WIDTH: f32 = 420.0;
/// Window width below which the sidebar turns into an overlay drawer.
pub const DRAWER_BREAKPOINT: f32 = 768.0;
#[cfg(target_os = "macos")]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 78.0;
#[cfg(not(target_os = "macos"))]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 12.0;
#[cfg(target_os = "windows")]
const WINDOW_TOOLBAR_RIGHT_SAFE_PADDING: f32 = 120.0;
#[cfg(not(target_os = "windows"))]
const WINDOW_TOOLBAR_RIGHT_SAFE_PADDING: f32 = 12.0;
const _: () = {
    assert!(SIDEBAR_MIN_WIDTH < SIDEBAR_DEFAULT_WIDTH);
    assert!(SIDEBAR_DEFAULT_WIDTH < SIDEBAR_MAX_WIDTH);
    assert!(SIDEBAR_MAX_WIDTH < DRAWER_BREAKPOINT);
};

/// How the conversation list is laid out for the current window width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarMode {
    /// Permanently visible beside the thread.
    Docked,
    /// Hidden behind a header trigger and shown as an overlay.
    Drawer,
}

impl SidebarMode {
    pub fn from_width(width: impl Into<f32>) -> Self {
        if width.into() < DRAWER_BREAKPOINT {
            Self::Drawer
        } else {
            Self::Docked
        }
    }

    pub fn is_drawer(self) -> bool {
        matches!(self, Self::Drawer)
    }
}

/// Which sidebar surface is on screen for a mode and the shell's two toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarSurface {
    Hidden,
    Docked,
    Drawer,
}

impl SidebarSurface {
    pub fn resolve(mode: SidebarMode, docked_hidden: bool, drawer_open: bool) -> Self {
        match mode {
            SidebarMode::Docked if docked_hidden => Self::Hidden,
            SidebarMode::Docked => Self::Docked,
            SidebarMode::Drawer if drawer_open => Self::Drawer,
            SidebarMode::Drawer => Self::Hidden,
        }
    }

    /// Title bar toggle glyph: "close" while the list is visible.
    pub fn toggle_icon(self) -> IconName {
        match self {
            Self::Hidden => IconName::PanelLeftOpen,
            Self::Docked | Self::Drawer => IconName::PanelLeftClose,
        }
    }
}

/// Computes the top toolbar height using a Zed-style responsive formula.
fn window_toolbar_height(window: &Window) -> Pixels {
    (1.75 * window.rem_size()).max(px(34.0))
}

/// Clamps a drag position to [SIDEBAR_MIN_WIDTH, SIDEBAR_MAX_WIDTH].
pub fn compute_sidebar_width(drag_x: f32) -> f32 {
    drag_x.clamp(SIDEBAR_MIN_WIDTH, SIDEBAR_MAX_WIDTH)
}

gpui::actions!(shell, [ToggleSidebar, Quit,]);

/// Client-drawn window buttons for Linux, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowControl {
    Minimize,
    Zoom,
    Close,
}

impl WindowControl {
    const ALL: [Self; 3] = [Self::Minimize, Self::Zoom, Self::Close];

    fn id(self) -> &'static str {
        match self {
            Self::Minimize => "window-minimize",
            Self::Zoom => "window-zoom",
            Self::Close => "window-close",
        }
    }

    fn icon(self, maximized: bool) -> IconName {
        match self {
            Self::Minimize => IconName::WindowMinimize,
            Self::Zoom if maximized => IconName::WindowRestore,
            Self::Zoom => IconName::WindowMaximize,
            Self::Close => IconName::WindowClose,
        }
    }

    fn apply(self, window: &mut Window) {
        match self {
            Self::Minimize => window.minimize_window(),
            Self::Zoom => window.zoom_window(),
            Self::Close => window.remove_window(),
        }
    }
}

#[derive(Clone)]
struct SidebarResizeDrag;

/// The drag preview is invisible; only the cursor changes.
struct EmptyDragView;

impl Render for EmptyDragView {
    fn render(&mut self, _: &mut Window, _: &mut Context<Self>) -> impl IntoElement {
        div()
    }
}

/// Root layout: title bar over a docked or drawer conversation list and the thread.
pub struct ChatAppShell {
    notification_list: Entity<NotificationList>,
    chat_view: Entity<ChatView>,
    docked_hidden: bool,
    sidebar_width: f32,
    drawer_open: bool,
    title_bar_should_move: bool,
}

impl ChatAppShell {
    pub fn new(
        notification_list: Entity<NotificationList>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let chat_view = cx.new(|cx| ChatView::new(window, cx));
        let sidebar = chat_view.read(cx).sidebar().clone();

        cx.subscribe(&chat_view, |this, _, _event: &SidebarDrawerRequested, cx| {
            this.set_drawer_open(!this.drawer_open, cx);
        })
        .detach();

        cx.subscribe(&sidebar, |this, _, _event: &ConversationSelected, cx| {
            this.set_drawer_open(false, cx);
        })
        .detach();

        Self {
            notification_list,
            chat_view,
            docked_hidden: false,
            sidebar_width: SIDEBAR_DEFAULT_WIDTH,
            drawer_open: false,
            title_bar_should_move: false,
        }
    }

    /// Hides or shows the docked list, or opens and closes the drawer in narrow windows.
    pub fn toggle_sidebar(&mut self, window: &Window, cx: &mut Context<Self>) {
        if SidebarMode::from_width(window.viewport_size().width).is_drawer() {
            self.set_drawer_open(!self.drawer_open, cx);
        } else {
            self.docked_hidden = !self.docked_hidden;
            cx.notify();
        }
    }

    fn set_drawer_open(&mut self, open: bool, cx: &mut Context<Self>) {
        if self.drawer_open != open {
            self.drawer_open = open;
            cx.notify();
        }
    }

    fn resize_sidebar(&mut self, new_width: f32, cx: &mut Context<Self>) {
        self.sidebar_width = compute_sidebar_width(new_width);
        cx.notify();
    }

    fn surface(&self, window: &Window) -> SidebarSurface {
        SidebarSurface::resolve(
            SidebarMode::from_width(window.viewport_size().width),
            self.docked_hidden,
            self.drawer_open,
        )
    }
}

impl Render for ChatAppShell {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let toolbar_height = window_toolbar_height(window);
        let surface = self.surface(window);
        let sidebar = self.chat_view.read(cx).sidebar().clone();

        div()
            .size_full()
            .relative()
            .bg(theme.background)
            .on_action(cx.listener(|this, _: &ToggleSidebar, window, cx| {
                this.toggle_sidebar(window, cx);
            }))
            .child(
                h_flex()
                    .id("app-shell-body")
                    .size_full()
                    .pt(toolbar_height)
                    .overflow_hidden()
                    .when(surface == SidebarSurface::Docked, |el| {
                        el.child(self.render_docked_sidebar(sidebar.clone(), cx))
                            .child(self.render_resize_handle(cx))
                    })
                    .child(
                        v_flex()
                            .id("main-content")
                            .flex_1()
                            .h_full()
                            .min_w_0()
                            .min_h_0()
                            .overflow_hidden()
                            .child(self.chat_view.clone()),
                    ),
            )
            .when(surface == SidebarSurface::Drawer, |el| {
                el.child(self.render_drawer(sidebar, toolbar_height, cx))
            })
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .right_0()
                    .child(self.render_title_bar(window, toolbar_height, surface, cx)),
            )
            .child(self.notification_list.clone())
    }
}

impl ChatAppShell {
    fn render_title_bar(
        &self,
        window: &Window,
        toolbar_height: Pixels,
        surface: SidebarSurface,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("app-title-bar")
            .window_control_area(WindowControlArea::Drag)
            .on_mouse_down_out(cx.listener(|this, _, _window, _cx| {
                this.title_bar_should_move = false;
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = false;
                }),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = true;
                }),
            )
            .on_mouse_move(cx.listener(|this, _, window, _cx| {
                if this.title_bar_should_move {
                    this.title_bar_should_move = false;
                    window.start_window_move();
                }
            }))
            .w_full()
            .h(toolbar_height)
            .pl(px(WINDOW_TOOLBAR_LEFT_SAFE_PADDING))
            .pr(px(WINDOW_TOOLBAR_RIGHT_SAFE_PADDING))
            .gap_2()
            .items_center()
            .bg(theme.background)
            .border_b_1()
            .border_color(theme.border)
            .child(
                h_flex()
                    .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
                    .child(
                        Button::new("title-bar-sidebar-toggle")
                            .ghost()
                            .xsmall()
                            .icon(surface.toggle_icon())
                            .tooltip("Toggle conversations")
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.toggle_sidebar(window, cx);
                            })),
                    ),
            )
            .child(
                Label::new("Parlor")
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.muted_foreground),
            )
            .child(div().flex_1())
            .when(
                cfg!(target_os = "linux") && window.window_controls().window_menu,
                |title_bar| {
                    title_bar.on_mouse_down(MouseButton::Right, |event, window, _| {
                        window.show_window_menu(event.position);
                    })
                },
            )
            .when(cfg!(target_os = "linux"), |title_bar| {
                title_bar.child(self.render_window_controls(window, cx))
            })
    }

    fn render_window_controls(&self, window: &Window, cx: &Context<Self>) -> impl IntoElement {
        let maximized = window.is_maximized();

        h_flex()
            .id("window-controls")
            .gap_1()
            // Keep control clicks out of title bar gestures such as double-click maximize.
            .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
            .on_mouse_down(MouseButton::Right, |_, _, cx| cx.stop_propagation())
            .children(WindowControl::ALL.into_iter().map(|control| {
                Button::new(control.id())
                    .ghost()
                    .small()
                    .icon(control.icon(maximized))
                    .on_click(cx.listener(move |_, _, window, _| control.apply(window)))
            }))
    }

    fn render_docked_sidebar(
        &self,
        sidebar: Entity<ChatSidebar>,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        div()
            .id("sidebar-docked")
            .h_full()
            .flex_shrink_0()
            .w(px(self.sidebar_width))
            .overflow_hidden()
            .bg(cx.theme().background)
            .child(sidebar)
    }

    /// Sidebar overlay for narrow windows; clicking the backdrop closes it.
    fn render_drawer(
        &self,
        sidebar: Entity<ChatSidebar>,
        toolbar_height: Pixels,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("sidebar-drawer")
            .absolute()
            .top(toolbar_height)
            .left_0()
            .right_0()
            .bottom_0()
            .child(
                div()
                    .id("sidebar-drawer-panel")
                    .h_full()
                    .flex_shrink_0()
                    .w(px(SIDEBAR_DEFAULT_WIDTH))
                    .overflow_hidden()
                    .bg(theme.background)
                    .border_r_1()
                    .border_color(theme.border)
                    .shadow_lg()
                    .child(sidebar),
            )
            .child(
                div()
                    .id("sidebar-drawer-backdrop")
                    .flex_1()
                    .h_full()
                    .bg(theme.foreground.opacity(0.3))
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.set_drawer_open(false, cx);
                    })),
            )
    }

    /// One-pixel divider that doubles as the width drag handle.
    fn render_resize_handle(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("sidebar-resize-handle")
            .w(px(1.0))
            .h_full()
            .flex_shrink_0()
            .cursor(CursorStyle::ResizeLeftRight)
            .bg(theme.border)
            .hover(|el| el.bg(theme.primary))
            .on_drag(SidebarResizeDrag, |_, _, _, cx| cx.new(|_| EmptyDragView))
            .on_drag_move::<SidebarResizeDrag>(cx.listener(
                |this, event: &DragMoveEvent<SidebarResizeDrag>, _window, cx| {
                    this.resize_sidebar(event.event.position.x.into(), cx);
                },
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_docks_at_and_above_the_breakpoint() {
        assert_eq!(SidebarMode::from_width(768.0), SidebarMode::Docked);
        assert_eq!(SidebarMode::from_width(1200.0), SidebarMode::Docked);
        assert_eq!(SidebarMode::from_width(767.5), SidebarMode::Drawer);
        assert!(SidebarMode::from_width(px(320.)).is_drawer());
    }

    #[test]
    fn drawer_state_only_matters_in_narrow_windows() {
        assert_eq!(
            SidebarSurface::resolve(SidebarMode::Docked, false, true),
            SidebarSurface::Docked
        );
        assert_eq!(
            SidebarSurface::resolve(SidebarMode::Docked, true, true),
            SidebarSurface::Hidden
        );
        assert_eq!(
            SidebarSurface::resolve(SidebarMode::Drawer, false, false),
            SidebarSurface::Hidden
        );
        assert_eq!(
            SidebarSurface::resolve(SidebarMode::Drawer, true, true),
            SidebarSurface::Drawer
        );
    }

    #[test]
    fn toggle_icon_reflects_visibility() {
        assert!(matches!(
            SidebarSurface::Hidden.toggle_icon(),
            IconName::PanelLeftOpen
        ));
        assert!(matches!(
            SidebarSurface::Drawer.toggle_icon(),
            IconName::PanelLeftClose
        ));
    }

    #[test]
    fn sidebar_width_is_clamped() {
        assert_eq!(compute_sidebar_width(10.0), SIDEBAR_MIN_WIDTH);
        assert_eq!(compute_sidebar_width(300.0), 300.0);
        assert_eq!(compute_sidebar_width(2000.0), SIDEBAR_MAX_WIDTH);
    }

    #[test]
    fn zoom_control_switches_icon_when_maximized() {
        assert!(matches!(
            WindowControl::Zoom.icon(false),
            IconName::WindowMaximize
        ));
        assert!(matches!(
            WindowControl::Zoom.icon(true),
            IconName::WindowRestore
        ));
        assert_eq!(WindowControl::ALL.len(), 3);
    }

    #[test]
    fn themes_are_read_from_the_working_directory() {
        assert_eq!(default_themes_path(), PathBuf::from("./themes"));
    }
}
