/// Avatar and avatar-group elements.
pub mod avatar;
pub mod composer;
/// Event contracts for chat module wiring.
pub mod events;
pub mod header;
pub mod message_list;
pub mod scroll_manager;
pub mod sidebar;
pub mod view;

pub use composer::ComposerView;
pub use events::{
    ConversationSelected, SendRequested, SidebarDrawerRequested, ThemeToggleRequested,
};
pub use header::ThreadHeaderView;
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use sidebar::ChatSidebar;
pub use view::ChatView;
