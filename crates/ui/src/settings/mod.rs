pub mod state;

pub use state::{ParlorSettings, SettingsChanged, SettingsError, SettingsState, SettingsStore};
