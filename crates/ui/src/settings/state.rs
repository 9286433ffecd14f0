use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use gpui::*;
use gpui_component::{Theme, ThemeMode, ThemeRegistry};
use parlor_chat::reply::{DEFAULT_REPLY_DELAY, DEFAULT_TYPING_DELAY};
use parlor_chat::{DEFAULT_AVATAR_GROUP_LIMIT, ReplyTiming};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "parlor";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParlorSettings {
    #[serde(
        default = "default_theme_mode",
        serialize_with = "serialize_theme_mode",
        deserialize_with = "deserialize_theme_mode"
    )]
    pub theme_mode: ThemeMode,
    #[serde(default)]
    pub theme_name: String,
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_avatar_group_limit")]
    pub avatar_group_limit: usize,
    /// JSON fixture replacing the built-in conversations.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

impl Default for ParlorSettings {
    fn default() -> Self {
        Self {
            theme_mode: default_theme_mode(),
            theme_name: String::new(),
            typing_delay_ms: default_typing_delay_ms(),
            reply_delay_ms: default_reply_delay_ms(),
            avatar_group_limit: default_avatar_group_limit(),
            seed_path: None,
        }
    }
}

impl ParlorSettings {
    pub fn normalized(mut self) -> Self {
        self.theme_name = self.theme_name.trim().to_string();
        if self.typing_delay_ms == 0 {
            self.typing_delay_ms = default_typing_delay_ms();
        }
        if self.reply_delay_ms == 0 {
            self.reply_delay_ms = default_reply_delay_ms();
        }
        self.seed_path = self
            .seed_path
            .filter(|path| !path.as_os_str().is_empty());
        self
    }

    pub fn reply_timing(&self) -> ReplyTiming {
        ReplyTiming {
            typing_delay: Duration::from_millis(self.typing_delay_ms),
            reply_delay: Duration::from_millis(self.reply_delay_ms),
        }
    }

    /// Same settings with the opposite light/dark mode.
    pub fn with_toggled_theme_mode(&self) -> Self {
        let theme_mode = if self.theme_mode.is_dark() {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };

        Self {
            theme_mode,
            // A named theme pins one mode, so toggling drops it.
            theme_name: String::new(),
            ..self.clone()
        }
    }

    pub fn apply_theme(&self, window: Option<&mut Window>, cx: &mut App) {
        if let Some(theme_config) = ThemeRegistry::global(cx)
            .themes()
            .get(&SharedString::from(self.theme_name.trim().to_string()))
            .cloned()
        {
            let mode = theme_config.mode;
            let theme = Theme::global_mut(cx);
            if mode.is_dark() {
                theme.dark_theme = theme_config;
            } else {
                theme.light_theme = theme_config;
            }
            Theme::change(mode, window, cx);
            return;
        }

        Theme::change(self.theme_mode, window, cx);
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<ParlorSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".parlor"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn settings(&self) -> Arc<ParlorSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: ParlorSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn load_from_disk(path: &Path) -> ParlorSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
            return ParlorSettings::default();
        }

        let figment = Figment::from(Serialized::defaults(ParlorSettings::default()))
            .merge(Json::file(path));

        match figment.extract::<ParlorSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                ParlorSettings::default()
            }
        }
    }

    fn persist(&self, settings: &ParlorSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

pub struct SettingsState {
    store: SettingsStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChanged {
    pub settings: ParlorSettings,
}

impl EventEmitter<SettingsChanged> for SettingsState {}

impl SettingsState {
    pub fn new(cx: &mut App) -> Entity<Self> {
        cx.new(|_| Self {
            store: SettingsStore::load(),
        })
    }

    pub fn settings(&self) -> Arc<ParlorSettings> {
        self.store.settings()
    }

    pub fn update_settings(
        &mut self,
        settings: ParlorSettings,
        cx: &mut Context<Self>,
    ) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.store.update(normalized_settings.clone())?;
        cx.emit(SettingsChanged {
            settings: normalized_settings,
        });
        cx.notify();
        Ok(())
    }

    /// Flips light/dark, applies it to the window and persists the choice.
    pub fn toggle_theme_mode(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let toggled = self.settings().with_toggled_theme_mode();
        toggled.apply_theme(Some(window), cx);

        if let Err(error) = self.update_settings(toggled, cx) {
            tracing::warn!("failed to persist theme mode: {error}");
        }
    }
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Light
}

fn default_typing_delay_ms() -> u64 {
    DEFAULT_TYPING_DELAY.as_millis() as u64
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY.as_millis() as u64
}

fn default_avatar_group_limit() -> usize {
    DEFAULT_AVATAR_GROUP_LIMIT
}

fn serialize_theme_mode<S>(value: &ThemeMode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.name())
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> Result<ThemeMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(parse_theme_mode(&value))
}

fn parse_theme_mode(value: &str) -> ThemeMode {
    if value.trim().eq_ignore_ascii_case("dark") {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delays_normalize_to_defaults() {
        let settings = ParlorSettings {
            typing_delay_ms: 0,
            reply_delay_ms: 0,
            theme_name: "  Catppuccin  ".to_string(),
            ..ParlorSettings::default()
        }
        .normalized();

        assert_eq!(settings.reply_timing(), ReplyTiming::default());
        assert_eq!(settings.theme_name, "Catppuccin");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = SettingsStore::new(directory.path().join("settings.json"));
        assert_eq!(*store.settings(), ParlorSettings::default());
    }

    #[test]
    fn partial_files_merge_over_defaults() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let path = directory.path().join("settings.json");
        std::fs::write(&path, r#"{ "theme_mode": "dark", "reply_delay_ms": 500 }"#)
            .expect("write settings");

        let settings = SettingsStore::new(path).settings();
        assert!(settings.theme_mode.is_dark());
        assert_eq!(settings.reply_delay_ms, 500);
        assert_eq!(settings.typing_delay_ms, default_typing_delay_ms());
        assert_eq!(settings.avatar_group_limit, DEFAULT_AVATAR_GROUP_LIMIT);
    }

    #[test]
    fn updates_are_persisted_and_reloaded() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let path = directory.path().join("nested").join("settings.json");
        let store = SettingsStore::new(path.clone());

        let updated = ParlorSettings {
            avatar_group_limit: 5,
            seed_path: Some(PathBuf::from("/tmp/seed.json")),
            ..ParlorSettings::default()
        }
        .with_toggled_theme_mode();
        store.update(updated.clone()).expect("persist settings");

        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(*SettingsStore::new(path).settings(), updated);
    }

    #[test]
    fn toggling_twice_restores_the_starting_mode() {
        let settings = ParlorSettings::default();
        let toggled = settings.with_toggled_theme_mode();
        assert!(toggled.theme_mode.is_dark());
        assert_eq!(toggled.with_toggled_theme_mode(), settings);
    }
}
