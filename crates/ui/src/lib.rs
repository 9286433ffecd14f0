#![deny(unsafe_code)]

/// Messaging client shell and components.
///
/// The chat domain lives in `parlor-chat`; this crate renders it with GPUI and
/// gpui-component and wires the simulated replies to timers.
pub mod app;
/// Sidebar, thread header, message list and composer views.
pub mod chat;
/// Settings persistence.
pub mod settings;
