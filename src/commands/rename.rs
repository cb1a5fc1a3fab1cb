use clap::Args;
use serde::Serialize;

use fieldfix::defaults::{self, Defaults};
use fieldfix::fix::{self, FixOptions, FixReport, InputSource, OutputTarget};

use super::CmdResult;

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Input JSON document (use - for stdin)
    pub input: String,

    /// Output path, or - to print the document to stdout
    /// (default: <input stem>_FIXED.json next to the input)
    #[arg(short, long, value_name = "PATH", conflicts_with = "in_place")]
    pub output: Option<String>,

    /// Overwrite the input file
    #[arg(long)]
    pub in_place: bool,

    /// Built-in rename table: sp002, sp002-canonical
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Rename table file (.json object or .toml table of old = "new")
    #[arg(long, value_name = "FILE")]
    pub table: Option<String>,

    /// Also normalize timestamp fields
    #[arg(long)]
    pub fix_timestamps: bool,

    /// Offset applied to unzoned and Z timestamps (e.g. +08:00)
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true)]
    pub utc_offset: Option<String>,

    /// Spaces per indentation level in the output
    #[arg(long, value_name = "N")]
    pub indent: Option<usize>,

    /// Compute the result without writing it
    #[arg(long)]
    pub dry_run: bool,
}

impl RenameArgs {
    /// True when the transformed document itself goes to stdout.
    pub fn writes_document_to_stdout(&self) -> bool {
        match self.output.as_deref() {
            Some(out) => out.trim() == "-",
            None => !self.in_place && self.input.trim() == "-",
        }
    }
}

#[derive(Serialize)]
pub struct RenameOutput {
    command: String,
    table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    utc_offset: Option<String>,
    #[serde(flatten)]
    report: FixReport,
}

pub fn run(args: RenameArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<RenameOutput> {
    let defaults = defaults::load_defaults();
    let (options, table_source) = build_options(&args, &defaults)?;
    let utc_offset = options
        .timestamps
        .as_ref()
        .map(|rules| rules.utc_offset().to_string());

    let outcome = fix::run(options)?;

    Ok((
        RenameOutput {
            command: "rename".to_string(),
            table: table_source,
            utc_offset,
            report: outcome.report,
        },
        0,
    ))
}

/// Raw mode: return the transformed document; the summary goes to stderr.
pub fn run_raw(args: RenameArgs) -> fieldfix::Result<(String, i32)> {
    let defaults = defaults::load_defaults();
    let (options, table_source) = build_options(&args, &defaults)?;

    let outcome = fix::run(options)?;
    fieldfix::log_status!(
        "rename",
        "{} key(s) renamed using {}",
        outcome.report.total_renamed,
        table_source
    );

    let document = outcome.document.ok_or_else(|| {
        fieldfix::Error::internal_unexpected("Raw output requested but no document was produced")
    })?;
    Ok((document, 0))
}

fn build_options(args: &RenameArgs, defaults: &Defaults) -> fieldfix::Result<(FixOptions, String)> {
    let (table, table_source) =
        super::resolve_table(args.table.as_deref(), args.preset.as_deref(), defaults)?;

    let input = match InputSource::from_arg(&args.input) {
        InputSource::File(path) => {
            InputSource::File(defaults::expand_path(&path.to_string_lossy()))
        }
        stdin => stdin,
    };

    let output = if args.in_place {
        OutputTarget::InPlace
    } else if args.writes_document_to_stdout() {
        OutputTarget::Stdout
    } else {
        match (&args.output, &input) {
            (Some(path), _) => OutputTarget::File(defaults::expand_path(path)),
            (None, InputSource::File(path)) => OutputTarget::File(fix::default_output_path(path)),
            (None, InputSource::Stdin) => OutputTarget::Stdout,
        }
    };

    let timestamps = if args.fix_timestamps || defaults.timestamps.enabled {
        Some(defaults.timestamp_rules(args.utc_offset.as_deref())?)
    } else {
        None
    };

    let options = FixOptions {
        input,
        output,
        table,
        timestamps,
        indent: args.indent.unwrap_or(defaults.indent),
        dry_run: args.dry_run,
    };

    Ok((options, table_source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(input: &str) -> RenameArgs {
        RenameArgs {
            input: input.to_string(),
            output: None,
            in_place: false,
            preset: None,
            table: None,
            fix_timestamps: false,
            utc_offset: None,
            indent: None,
            dry_run: false,
        }
    }

    #[test]
    fn default_output_is_fixed_sibling() {
        let (options, _) = build_options(&args("/data/agg.json"), &Defaults::default()).unwrap();
        assert_eq!(
            options.output,
            OutputTarget::File(PathBuf::from("/data/agg_FIXED.json"))
        );
        assert_eq!(options.indent, 2);
        assert!(options.timestamps.is_none());
    }

    #[test]
    fn dash_output_selects_stdout() {
        let mut a = args("/data/agg.json");
        a.output = Some("-".to_string());
        assert!(a.writes_document_to_stdout());

        let (options, _) = build_options(&a, &Defaults::default()).unwrap();
        assert_eq!(options.output, OutputTarget::Stdout);
    }

    #[test]
    fn stdin_input_defaults_to_stdout() {
        let a = args("-");
        assert!(a.writes_document_to_stdout());
        let (options, _) = build_options(&a, &Defaults::default()).unwrap();
        assert_eq!(options.input, InputSource::Stdin);
    }

    #[test]
    fn timestamp_flag_uses_override_offset() {
        let mut a = args("/data/agg.json");
        a.fix_timestamps = true;
        a.utc_offset = Some("-03:00".to_string());

        let (options, _) = build_options(&a, &Defaults::default()).unwrap();
        assert_eq!(options.timestamps.unwrap().utc_offset(), "-03:00");
    }

    #[test]
    fn bad_offset_rejected() {
        let mut a = args("/data/agg.json");
        a.fix_timestamps = true;
        a.utc_offset = Some("PHT".to_string());

        let err = build_options(&a, &Defaults::default()).err().unwrap();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn config_enables_timestamps() {
        let mut defaults = Defaults::default();
        defaults.timestamps.enabled = true;

        let (options, _) = build_options(&args("/data/agg.json"), &defaults).unwrap();
        assert_eq!(options.timestamps.unwrap().utc_offset(), "+08:00");
    }
}
