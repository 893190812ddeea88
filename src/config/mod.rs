// Configuration module
// Persisted settings schema and the file-backed store

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;
use crate::models::{Profile, SubtitleStyles};

/// Persisted configuration. Written by the configuration UI; the resolver
/// and publisher only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ordered list; resolution tries profiles in this order.
    pub profiles: Vec<Profile>,
    /// Name of the profile designated for publishing, if any.
    pub active_profile_name: Option<String>,
    pub auto_load_enabled: bool,
    pub subtitle_styles: SubtitleStyles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            active_profile_name: None,
            auto_load_enabled: false,
            subtitle_styles: SubtitleStyles::default(),
        }
    }
}

impl Settings {
    /// Looks up the profile designated for publishing.
    pub fn active_profile(&self) -> Option<&Profile> {
        let name = self.active_profile_name.as_deref()?;
        self.profiles.iter().find(|profile| profile.name == name)
    }
}

/// JSON-file-backed settings store.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads settings, falling back to defaults when the file does not exist
    /// yet.
    pub fn load(&self) -> AppResult<Settings> {
        if !self.path.exists() {
            info!(
                "Settings file {} not found, using defaults",
                self.path.display()
            );
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        let settings = serde_json::from_str(&raw)?;
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
