//! Persisted settings: per-pane view state and window placement.
//!
//! One TOML file (`folderview.toml`); unknown fields are ignored so the
//! schema can grow, and a parse failure falls back to defaults rather than
//! refusing to start. Discovery prefers an explicit override path, then
//! the working directory, then the platform config dir.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "folderview.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortFieldSetting {
    #[default]
    Name,
    Extension,
    Time,
    Size,
    Attributes,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirectionSetting {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayModeSetting {
    #[default]
    Brief,
    Detailed,
    ExtraDetailed,
}

/// Per-pane view state; one table per pane (`[pane.left]`, `[pane.right]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PaneSettings {
    #[serde(default)]
    pub sort_by: SortFieldSetting,
    #[serde(default)]
    pub sort_direction: SortDirectionSetting,
    #[serde(default)]
    pub display_mode: DisplayModeSetting,
    #[serde(default)]
    pub column_widths: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self { x: 100, y: 100, w: 1024, h: 700 }
    }
}

/// Serialized window placement, restored on open. `dpi` records the
/// monitor the bounds were captured on so restore can rescale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlacement {
    #[serde(default)]
    pub state: WindowState,
    #[serde(default)]
    pub bounds: WindowBounds,
    #[serde(default = "WindowPlacement::default_dpi")]
    pub dpi: u32,
}

impl WindowPlacement {
    const fn default_dpi() -> u32 {
        96
    }
}

impl Default for WindowPlacement {
    fn default() -> Self {
        Self { state: WindowState::default(), bounds: WindowBounds::default(), dpi: 96 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PaneTable {
    #[serde(default)]
    pub left: PaneSettings,
    #[serde(default)]
    pub right: PaneSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub window: WindowPlacement,
    #[serde(default)]
    pub pane: PaneTable,
}

/// Best-effort config path following platform conventions.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("folderview").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Settings {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Settings>(&content) {
            Ok(settings) => {
                info!(target: "config", path = %path.display(), "settings_loaded");
                settings
            }
            Err(e) => {
                // A broken file must not brick startup.
                tracing::warn!(target: "config", path = %path.display(), error = %e, "settings_parse_failed_using_defaults");
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

pub fn save_to(settings: &Settings, path: &Path) -> Result<()> {
    let serialized = toml::to_string_pretty(settings).context("serialize settings")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    fs::write(path, serialized).with_context(|| format!("write {}", path.display()))?;
    info!(target: "config", path = %path.display(), "settings_saved");
    Ok(())
}
