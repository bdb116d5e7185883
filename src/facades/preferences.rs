//! User preferences
//!
//! Each preference lives under its own logical key without a TTL. Readers
//! fall back to compiled-in defaults when a key is absent or unreadable.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::storage::{KeyValueBackend, Storage};

// == Keys ==
pub const THEME: &str = "theme";
pub const UNITS: &str = "units";
pub const TIME_FORMAT: &str = "timeFormat";
pub const SOUND_ENABLED: &str = "soundEnabled";
pub const USER_NAME: &str = "userName";
pub const SELECTED_MODEL: &str = "selectedModel";

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Imperial,
    Metric,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

/// Whole preference record, as exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: Theme,
    pub units: TemperatureUnit,
    pub time_format: TimeFormat,
    pub sound_enabled: bool,
    pub user_name: Option<String>,
    pub selected_model: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            units: TemperatureUnit::Imperial,
            time_format: TimeFormat::TwelveHour,
            sound_enabled: true,
            user_name: None,
            selected_model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Preference accessors over a borrowed store.
pub struct PreferencesStore<'a, B: KeyValueBackend> {
    storage: &'a mut Storage<B>,
}

impl<'a, B: KeyValueBackend> PreferencesStore<'a, B> {
    pub fn new(storage: &'a mut Storage<B>) -> Self {
        Self { storage }
    }

    fn read<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        self.storage.get_or(key, default)
    }

    pub fn theme(&mut self) -> Theme {
        self.read(THEME, Theme::default())
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.storage.set(THEME, &theme, None)
    }

    pub fn units(&mut self) -> TemperatureUnit {
        self.read(UNITS, TemperatureUnit::default())
    }

    pub fn set_units(&mut self, units: TemperatureUnit) -> bool {
        self.storage.set(UNITS, &units, None)
    }

    pub fn time_format(&mut self) -> TimeFormat {
        self.read(TIME_FORMAT, TimeFormat::default())
    }

    pub fn set_time_format(&mut self, format: TimeFormat) -> bool {
        self.storage.set(TIME_FORMAT, &format, None)
    }

    pub fn sound_enabled(&mut self) -> bool {
        self.read(SOUND_ENABLED, true)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) -> bool {
        self.storage.set(SOUND_ENABLED, &enabled, None)
    }

    pub fn user_name(&mut self) -> Option<String> {
        self.read(USER_NAME, None)
    }

    pub fn set_user_name(&mut self, name: Option<&str>) -> bool {
        self.storage.set(USER_NAME, &name, None)
    }

    pub fn selected_model(&mut self) -> String {
        self.read(SELECTED_MODEL, DEFAULT_MODEL.to_string())
    }

    pub fn set_selected_model(&mut self, model: &str) -> bool {
        self.storage.set(SELECTED_MODEL, model, None)
    }

    // == Export / Import ==
    /// Current values of every preference, ignoring any TTL on the entries.
    pub fn export_preferences(&self) -> Preferences {
        let defaults = Preferences::default();
        Preferences {
            theme: self.storage.peek(THEME).unwrap_or(defaults.theme),
            units: self.storage.peek(UNITS).unwrap_or(defaults.units),
            time_format: self.storage.peek(TIME_FORMAT).unwrap_or(defaults.time_format),
            sound_enabled: self
                .storage
                .peek(SOUND_ENABLED)
                .unwrap_or(defaults.sound_enabled),
            user_name: self.storage.peek(USER_NAME).unwrap_or(defaults.user_name),
            selected_model: self
                .storage
                .peek(SELECTED_MODEL)
                .unwrap_or(defaults.selected_model),
        }
    }

    /// Overwrites every preference with the values in `preferences`.
    ///
    /// Attempts every field; returns `false` if any write failed.
    pub fn import_preferences(&mut self, preferences: &Preferences) -> bool {
        let results = [
            self.storage.set(THEME, &preferences.theme, None),
            self.storage.set(UNITS, &preferences.units, None),
            self.storage.set(TIME_FORMAT, &preferences.time_format, None),
            self.storage.set(SOUND_ENABLED, &preferences.sound_enabled, None),
            self.storage.set(USER_NAME, &preferences.user_name, None),
            self.storage.set(SELECTED_MODEL, &preferences.selected_model, None),
        ];
        results.iter().all(|ok| *ok)
    }

    /// Restores and persists the compiled-in defaults.
    pub fn reset_preferences(&mut self) -> bool {
        self.import_preferences(&Preferences::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::FlakyBackend;
    use crate::storage::MemoryBackend;

    #[test]
    fn test_defaults_when_empty() {
        let mut storage = Storage::new(MemoryBackend::new());
        let mut prefs = PreferencesStore::new(&mut storage);

        assert_eq!(prefs.theme(), Theme::Auto);
        assert_eq!(prefs.units(), TemperatureUnit::Imperial);
        assert_eq!(prefs.time_format(), TimeFormat::TwelveHour);
        assert!(prefs.sound_enabled());
        assert_eq!(prefs.user_name(), None);
        assert_eq!(prefs.selected_model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_theme_roundtrip_and_reset() {
        let mut storage = Storage::new(MemoryBackend::new());

        assert!(storage.set(THEME, "dark", None));
        assert_eq!(storage.get::<String>(THEME), Some("dark".to_string()));
        assert_eq!(PreferencesStore::new(&mut storage).theme(), Theme::Dark);

        assert!(PreferencesStore::new(&mut storage).reset_preferences());
        assert_eq!(storage.get::<String>(THEME), Some("auto".to_string()));
    }

    #[test]
    fn test_typed_setters() {
        let mut storage = Storage::new(MemoryBackend::new());
        let mut prefs = PreferencesStore::new(&mut storage);

        prefs.set_units(TemperatureUnit::Metric);
        prefs.set_time_format(TimeFormat::TwentyFourHour);
        prefs.set_sound_enabled(false);
        prefs.set_user_name(Some("Ada"));
        prefs.set_selected_model("claude");

        assert_eq!(prefs.units(), TemperatureUnit::Metric);
        assert_eq!(prefs.time_format(), TimeFormat::TwentyFourHour);
        assert!(!prefs.sound_enabled());
        assert_eq!(prefs.user_name(), Some("Ada".to_string()));
        assert_eq!(prefs.selected_model(), "claude");

        prefs.set_user_name(None);
        assert_eq!(prefs.user_name(), None);
    }

    #[test]
    fn test_invalid_stored_value_falls_back() {
        let mut storage = Storage::new(MemoryBackend::new());
        storage.set(THEME, "neon", None);

        assert_eq!(PreferencesStore::new(&mut storage).theme(), Theme::Auto);
    }

    #[test]
    fn test_export_ignores_expiry() {
        let mut storage = Storage::new(MemoryBackend::new());
        storage.set(THEME, &Theme::Light, Some(-1));

        let exported = PreferencesStore::new(&mut storage).export_preferences();
        assert_eq!(exported.theme, Theme::Light);
        assert!(storage.has(THEME));
    }

    #[test]
    fn test_import_overwrites_everything() {
        let mut storage = Storage::new(MemoryBackend::new());
        let mut prefs = PreferencesStore::new(&mut storage);
        prefs.set_theme(Theme::Dark);

        let imported = Preferences {
            theme: Theme::Light,
            units: TemperatureUnit::Metric,
            time_format: TimeFormat::TwentyFourHour,
            sound_enabled: false,
            user_name: Some("Grace".to_string()),
            selected_model: "local".to_string(),
        };
        assert!(prefs.import_preferences(&imported));
        assert_eq!(prefs.export_preferences(), imported);
    }

    #[test]
    fn test_import_reports_write_failure() {
        let mut storage = Storage::new(FlakyBackend::default());
        storage.backend_mut().fail_writes = true;

        let mut prefs = PreferencesStore::new(&mut storage);
        assert!(!prefs.reset_preferences());
        assert_eq!(storage.stats().failures, 6);
    }

    #[test]
    fn test_preferences_json_shape() {
        let text = serde_json::to_string(&Preferences::default()).unwrap();
        assert!(text.contains(r#""theme":"auto""#));
        assert!(text.contains(r#""timeFormat":"12h""#));

        let partial: Preferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(partial.theme, Theme::Dark);
        assert!(partial.sound_enabled);
    }
}
