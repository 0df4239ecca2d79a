//! Persisted display preference (light/dark theme).

use std::str::FromStr;

use crate::models::Theme;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the theme name.
pub const THEME_KEY: &str = "nutrisnap_theme";

pub struct PreferenceStore<S> {
    storage: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored theme, or the default when missing or unreadable.
    pub fn load_theme(&self) -> Theme {
        match self.storage.get(THEME_KEY) {
            Ok(Some(raw)) => {
                // Stored either as a bare word or as a JSON string
                let name = raw.trim().trim_matches('"');
                Theme::from_str(name).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring stored theme: {}", e);
                    Theme::default()
                })
            }
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!("Failed to read theme preference: {}", e);
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.storage.set(THEME_KEY, &theme.to_string())
    }

    /// Flips the stored theme and returns the new value.
    pub fn toggle_theme(&self) -> Result<Theme, StorageError> {
        let next = self.load_theme().toggled();
        self.save_theme(next)?;
        Ok(next)
    }
}
