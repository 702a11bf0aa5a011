//! Display settings persistence.
//!
//! A single JSON object under one substrate key. Reads merge the stored
//! partial record over built-in defaults (serde field defaults do the merge);
//! updates apply a clamped patch and persist the full record.

use crate::error::Result;
use crate::models::{DisplaySettings, DisplaySettingsPatch};
use bridge_traits::storage::KeyValueStore;
use std::sync::Arc;
use tracing::warn;

/// Substrate key holding the settings record.
pub const SETTINGS_KEY: &str = "ebook_reader_settings";

pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Current settings: stored record merged over defaults. A missing or
    /// malformed record reads as the defaults.
    pub fn get(&self) -> DisplaySettings {
        let raw = match self.kv.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return DisplaySettings::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read settings, using defaults");
                return DisplaySettings::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Malformed settings record, using defaults");
                DisplaySettings::default()
            }
        }
    }

    /// Merge a clamped patch into the current record and persist it.
    pub fn update(&self, patch: &DisplaySettingsPatch) -> Result<DisplaySettings> {
        let mut settings = self.get();
        patch.apply_to(&mut settings);
        let raw = serde_json::to_string(&settings)?;
        self.kv.set(SETTINGS_KEY, &raw)?;
        Ok(settings)
    }

    /// Drop the stored record; subsequent reads return the defaults.
    pub fn reset(&self) -> Result<()> {
        self.kv.remove(SETTINGS_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;
    use bridge_desktop::MemoryKeyValueStore;

    #[test]
    fn test_get_returns_defaults_when_unset() {
        let store = SettingsStore::new(Arc::new(MemoryKeyValueStore::new()));
        assert_eq!(store.get(), DisplaySettings::default());
    }

    #[test]
    fn test_update_persists_and_merges() {
        let store = SettingsStore::new(Arc::new(MemoryKeyValueStore::new()));

        let updated = store
            .update(&DisplaySettingsPatch {
                theme: Some(Theme::Sepia),
                font_size: Some(18),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.theme, Theme::Sepia);
        assert_eq!(updated.font_size, 18);

        // A second patch touches only its own fields
        let updated = store
            .update(&DisplaySettingsPatch {
                auto_advance: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.theme, Theme::Sepia);
        assert!(updated.auto_advance);
        assert_eq!(store.get(), updated);
    }

    #[test]
    fn test_update_clamps_before_persisting() {
        let store = SettingsStore::new(Arc::new(MemoryKeyValueStore::new()));
        let updated = store
            .update(&DisplaySettingsPatch {
                font_size: Some(99),
                line_height: Some(9.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.font_size, 24);
        assert_eq!(updated.line_height, 2.0);
        assert_eq!(store.get().font_size, 24);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let store = SettingsStore::new(Arc::new(MemoryKeyValueStore::new()));
        store
            .update(&DisplaySettingsPatch {
                theme: Some(Theme::Dark),
                ..Default::default()
            })
            .unwrap();

        store.reset().unwrap();
        assert_eq!(store.get(), DisplaySettings::default());
    }

    #[test]
    fn test_corrupt_record_reads_as_defaults() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(SETTINGS_KEY, "oops").unwrap();
        let store = SettingsStore::new(kv);
        assert_eq!(store.get(), DisplaySettings::default());
    }
}
