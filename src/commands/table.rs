use clap::Args;
use serde::Serialize;

use fieldfix::defaults;
use fieldfix::RenameEntry;

use super::CmdResult;

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Built-in rename table: sp002, sp002-canonical
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Rename table file (.json or .toml)
    #[arg(long, value_name = "FILE")]
    pub table: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TableOutput {
    command: String,
    source: String,
    size: usize,
    idempotent: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    chained_keys: Vec<String>,
    entries: Vec<RenameEntry>,
}

pub fn run(args: TableArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<TableOutput> {
    let defaults = defaults::load_defaults();
    let (table, source) =
        super::resolve_table(args.table.as_deref(), args.preset.as_deref(), &defaults)?;

    Ok((
        TableOutput {
            command: "table.show".to_string(),
            source,
            size: table.len(),
            idempotent: table.is_idempotent(),
            chained_keys: table.chained_keys().into_iter().map(String::from).collect(),
            entries: table.iter().cloned().collect(),
        },
        0,
    ))
}
