//! UI preferences persisted as a single JSON blob

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SETTINGS_KEY: &str = "trackly-settings";
pub const MIN_ITEMS_PER_ROW: i64 = 4;
pub const MAX_ITEMS_PER_ROW: i64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme \"{other}\", expected light or dark")),
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Stored as-is: `items_per_row` is only clamped when rendering.
/// Fields missing from an older blob take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub items_per_row: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            items_per_row: 9,
        }
    }
}

impl Settings {
    pub fn grid_columns(&self) -> u32 {
        grid_columns(self.items_per_row)
    }

    pub fn merge(&self, patch: &SettingsPatch) -> Settings {
        Settings {
            theme: patch.theme.unwrap_or(self.theme),
            items_per_row: patch.items_per_row.unwrap_or(self.items_per_row),
        }
    }
}

/// Partial settings change, as sent by the settings screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub items_per_row: Option<i64>,
}

/// Artist grid column count for a possibly out-of-range setting
pub fn grid_columns(items_per_row: i64) -> u32 {
    items_per_row.clamp(MIN_ITEMS_PER_ROW, MAX_ITEMS_PER_ROW) as u32
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keeps the settings blob in `<dir>/trackly-settings.json`
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{SETTINGS_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable blobs fall back to the defaults
    pub fn load(&self) -> Settings {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                warn!("Could not read {}: {e}", self.path.to_string_lossy());
                return Settings::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(
                "Ignoring unreadable settings in {}: {e}",
                self.path.to_string_lossy()
            );
            Settings::default()
        })
    }

    /// Replaces the stored blob. Written to a temp file first, then renamed.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(settings)?)?;
        std::fs::rename(&tmp, &self.path)?;
        info!("Saved settings to {}", self.path.to_string_lossy());
        Ok(())
    }

    pub fn update(&self, patch: &SettingsPatch) -> Result<Settings, SettingsError> {
        let settings = self.load().merge(patch);
        self.save(&settings)?;
        Ok(settings)
    }
}
