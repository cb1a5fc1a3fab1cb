use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::table::{RenamePreset, RenameTable};
use crate::timestamp::{self, TimestampRules};

/// Root configuration structure for fieldfix.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FieldfixConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via fieldfix.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Table file used instead of the preset when set. `~` is expanded.
    #[serde(default)]
    pub table_path: Option<String>,

    #[serde(default = "default_indent")]
    pub indent: usize,

    #[serde(default)]
    pub timestamps: TimestampConfig,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            table_path: None,
            indent: default_indent(),
            timestamps: TimestampConfig::default(),
        }
    }
}

/// Configuration for the optional timestamp normalization pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "timestamp::default_keys")]
    pub keys: Vec<String>,

    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keys: timestamp::default_keys(),
            utc_offset: default_utc_offset(),
        }
    }
}

impl Defaults {
    /// Resolve the rename table: explicit file first, then preset name.
    pub fn rename_table(&self) -> crate::Result<RenameTable> {
        match &self.table_path {
            Some(path) => RenameTable::load(&expand_path(path)),
            None => Ok(RenameTable::from_preset(RenamePreset::from_str(&self.preset)?)),
        }
    }

    /// Timestamp rules from config. `utc_offset` overrides the configured offset.
    pub fn timestamp_rules(&self, utc_offset: Option<&str>) -> crate::Result<TimestampRules> {
        TimestampRules::new(
            self.timestamps.keys.clone(),
            utc_offset.unwrap_or(&self.timestamps.utc_offset),
        )
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_preset() -> String {
    RenamePreset::default().as_str().to_string()
}

fn default_indent() -> usize {
    crate::document::DEFAULT_INDENT
}

fn default_utc_offset() -> String {
    timestamp::DEFAULT_UTC_OFFSET.to_string()
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If fieldfix.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full fieldfix.json config, falling back to defaults on any error.
pub fn load_config() -> FieldfixConfig {
    paths::fieldfix_json()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_default()
}

/// Load fieldfix.json for modification. A missing file yields defaults, but
/// an unreadable or invalid file is an error so it is never overwritten.
pub fn load_config_for_update() -> crate::Result<FieldfixConfig> {
    load_config_for_update_from(&paths::fieldfix_json()?)
}

pub fn load_config_for_update_from(path: &Path) -> crate::Result<FieldfixConfig> {
    if path.exists() {
        load_config_from(path)
    } else {
        Ok(FieldfixConfig::default())
    }
}

/// Attempt to load config from a specific file.
pub fn load_config_from(path: &Path) -> crate::Result<FieldfixConfig> {
    if !path.exists() {
        return Err(crate::Error::other("fieldfix.json not found"));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    let config: FieldfixConfig = serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))?;

    Ok(config)
}

/// Save config to fieldfix.json file (creates if missing).
pub fn save_config(config: &FieldfixConfig) -> crate::Result<()> {
    save_config_to(config, &paths::fieldfix_json()?)
}

pub fn save_config_to(config: &FieldfixConfig, path: &Path) -> crate::Result<()> {
    let content = serde_json::to_string_pretty(config).map_err(|e| {
        crate::Error::internal_json(e.to_string(), Some("serialize fieldfix.json".to_string()))
    })?;

    crate::utils::io::write_file_atomic(path, &content, &format!("write {}", path.display()))
}

/// Check if fieldfix.json file exists
pub fn config_exists() -> bool {
    paths::fieldfix_json()
        .map(|p| p.exists())
        .unwrap_or(false)
}

/// Delete fieldfix.json file (reset to defaults)
pub fn reset_config() -> crate::Result<bool> {
    let path = paths::fieldfix_json()?;

    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Get the path to fieldfix.json (for display purposes)
pub fn config_path() -> crate::Result<String> {
    Ok(paths::fieldfix_json()?.display().to_string())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}
