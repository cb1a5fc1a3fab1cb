use fieldfix::defaults::{self, Defaults};
use fieldfix::{RenamePreset, RenameTable};

pub type CmdResult<T> = fieldfix::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod config;
pub mod rename;
pub mod table;

// ============================================================================
// Table resolution (CLI layer)
// ============================================================================

/// Resolve the rename table from flags, falling back to config.
/// Precedence: --table, then --preset, then fieldfix.json.
pub(crate) fn resolve_table(
    table: Option<&str>,
    preset: Option<&str>,
    defaults: &Defaults,
) -> fieldfix::Result<(RenameTable, String)> {
    if let Some(path) = table {
        let expanded = defaults::expand_path(path);
        let loaded = RenameTable::load(&expanded)?;
        return Ok((loaded, format!("file:{}", expanded.display())));
    }

    if let Some(name) = preset {
        let preset = RenamePreset::from_str(name)?;
        return Ok((
            RenameTable::from_preset(preset),
            format!("preset:{}", preset.as_str()),
        ));
    }

    let source = match &defaults.table_path {
        Some(path) => format!("file:{}", defaults::expand_path(path).display()),
        None => format!("preset:{}", defaults.preset),
    };
    Ok((defaults.rename_table()?, source))
}

pub(crate) fn run_raw(
    command: crate::Commands,
    _global: &GlobalArgs,
) -> fieldfix::Result<(String, i32)> {
    match command {
        crate::Commands::Rename(args) => rename::run_raw(args),
        _ => Err(fieldfix::Error::validation_invalid_argument(
            "output_mode",
            "Command does not support raw output",
            None,
            None,
        )),
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (fieldfix::Result<serde_json::Value>, i32) {
    crate::tty::status("fieldfix is working...");

    match command {
        crate::Commands::Rename(args) => dispatch!(args, global, rename),
        crate::Commands::Table(args) => dispatch!(args, global, table),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn table_flag_beats_preset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.json");
        fs::write(&path, r#"{"x": "y"}"#).unwrap();

        let (table, source) = resolve_table(
            Some(path.to_str().unwrap()),
            Some("sp002-canonical"),
            &Defaults::default(),
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert!(source.starts_with("file:"));
    }

    #[test]
    fn preset_flag_beats_config() {
        let (table, source) =
            resolve_table(None, Some("sp002-canonical"), &Defaults::default()).unwrap();
        assert_eq!(table.len(), 13);
        assert_eq!(source, "preset:sp002-canonical");
    }

    #[test]
    fn falls_back_to_config_preset() {
        let (table, source) = resolve_table(None, None, &Defaults::default()).unwrap();
        assert_eq!(table.len(), 10);
        assert_eq!(source, "preset:sp002");
    }
}
