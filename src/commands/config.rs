use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use fieldfix::defaults::{self, Defaults, FieldfixConfig};

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (merged defaults + file)
    Show {
        /// Show only built-in defaults (ignore fieldfix.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Set a configuration value at a JSON pointer path
    Set {
        /// JSON pointer path (e.g., /defaults/timestamps/utc_offset)
        pointer: String,
        /// Value to set (JSON)
        value: String,
    },
    /// Reset configuration to built-in defaults (deletes fieldfix.json)
    Reset,
    /// Show the path to fieldfix.json
    Path,
}

#[derive(Debug, Serialize, Default)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<FieldfixConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pointer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

pub fn run(args: ConfigArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin),
        ConfigCommand::Set { pointer, value } => set(&pointer, &value),
        ConfigCommand::Reset => reset(),
        ConfigCommand::Path => path(),
    }
}

fn show(builtin: bool) -> CmdResult<ConfigOutput> {
    let output = if builtin {
        ConfigOutput {
            command: "config.show".to_string(),
            defaults: Some(defaults::builtin_defaults()),
            ..ConfigOutput::default()
        }
    } else {
        ConfigOutput {
            command: "config.show".to_string(),
            config: Some(defaults::load_config()),
            ..ConfigOutput::default()
        }
    };

    Ok((output, 0))
}

fn set(pointer: &str, value_str: &str) -> CmdResult<ConfigOutput> {
    let value: Value = serde_json::from_str(value_str).map_err(|e| {
        fieldfix::Error::validation_invalid_json(
            e,
            Some("parse value".to_string()),
            Some(value_str.chars().take(200).collect::<String>()),
        )
    })?;

    let config = apply_pointer(defaults::load_config_for_update()?, pointer, value.clone())?;

    // Reject settings that would break every later run.
    config.defaults.rename_table()?;
    config.defaults.timestamp_rules(None)?;

    defaults::save_config(&config)?;
    fieldfix::log_status!("config", "Set {}", pointer);

    Ok((
        ConfigOutput {
            command: "config.set".to_string(),
            config: Some(config),
            pointer: Some(pointer.to_string()),
            value: Some(value),
            ..ConfigOutput::default()
        },
        0,
    ))
}

/// Replace the value at `pointer` inside the serialized config.
fn apply_pointer(
    config: FieldfixConfig,
    pointer: &str,
    value: Value,
) -> fieldfix::Result<FieldfixConfig> {
    if !pointer.starts_with('/') {
        return Err(fieldfix::Error::validation_invalid_argument(
            "pointer",
            "JSON pointer must start with '/'",
            None,
            None,
        ));
    }

    let mut config_json = serde_json::to_value(&config).map_err(|e| {
        fieldfix::Error::internal_unexpected(format!("Failed to serialize config: {}", e))
    })?;

    let slot = config_json.pointer_mut(pointer).ok_or_else(|| {
        fieldfix::Error::validation_invalid_argument(
            "pointer",
            format!("No configuration value at '{}'", pointer),
            Some(pointer.to_string()),
            None,
        )
    })?;
    *slot = value;

    serde_json::from_value(config_json).map_err(|e| {
        fieldfix::Error::validation_invalid_json(e, Some("deserialize config".to_string()), None)
    })
}

fn reset() -> CmdResult<ConfigOutput> {
    let deleted = defaults::reset_config()?;

    Ok((
        ConfigOutput {
            command: "config.reset".to_string(),
            defaults: Some(defaults::builtin_defaults()),
            path: Some(defaults::config_path()?),
            deleted: Some(deleted),
            ..ConfigOutput::default()
        },
        0,
    ))
}

fn path() -> CmdResult<ConfigOutput> {
    Ok((
        ConfigOutput {
            command: "config.path".to_string(),
            path: Some(defaults::config_path()?),
            exists: Some(defaults::config_exists()),
            ..ConfigOutput::default()
        },
        0,
    ))
}
