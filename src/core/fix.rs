//! Fix pipeline: read a document, rename its fields, write it back out.
//!
//! Single-shot batch transform. Any read, parse or write failure ends the
//! run; nothing is retried.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::document;
use crate::error::{Error, Result};
use crate::rename::Renamer;
use crate::table::RenameTable;
use crate::timestamp::TimestampRules;
use crate::utils::io;

const STDIN_LABEL: &str = "<stdin>";

// ============================================================================
// Types
// ============================================================================

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` reads stdin, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.trim() == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    pub fn label(&self) -> String {
        match self {
            InputSource::Stdin => STDIN_LABEL.to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

/// Where the transformed document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
    /// Overwrite the input file.
    InPlace,
}

pub struct FixOptions {
    pub input: InputSource,
    pub output: OutputTarget,
    pub table: RenameTable,
    pub timestamps: Option<TimestampRules>,
    pub indent: usize,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FixReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub dry_run: bool,
    pub written: bool,
    pub bytes_written: usize,
    pub table_size: usize,
    pub keys_visited: usize,
    pub renamed: BTreeMap<String, usize>,
    pub total_renamed: usize,
    pub collisions: usize,
    pub timestamps_fixed: usize,
}

pub struct FixOutcome {
    pub report: FixReport,
    /// Transformed text, present when the target is stdout.
    pub document: Option<String>,
}

// ============================================================================
// Pipeline
// ============================================================================

/// `<stem>_FIXED.json` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{}_FIXED.json", stem))
}

pub fn run(options: FixOptions) -> Result<FixOutcome> {
    let input_label = options.input.label();

    let output_path = match (&options.output, &options.input) {
        (OutputTarget::File(path), _) => Some(path.clone()),
        (OutputTarget::InPlace, InputSource::File(path)) => Some(path.clone()),
        (OutputTarget::InPlace, InputSource::Stdin) => {
            return Err(Error::validation_invalid_argument(
                "in_place",
                "Cannot rewrite stdin in place; pass --output instead",
                None,
                None,
            ))
        }
        (OutputTarget::Stdout, _) => None,
    };

    crate::log_status!("fix", "Reading {}", input_label);
    let text = match &options.input {
        InputSource::Stdin => io::read_stdin("read stdin")?,
        InputSource::File(path) => io::read_file(path, &format!("read {}", path.display()))?,
    };
    let value = document::parse(&text, &input_label)?;

    crate::log_status!("fix", "Renaming fields ({} table entries)", options.table.len());
    let mut renamer = Renamer::new(&options.table);
    if let Some(rules) = &options.timestamps {
        renamer = renamer.with_timestamps(rules);
    }
    let (fixed, stats) = renamer.apply(&value);

    let rendered = document::to_pretty_string(&fixed, options.indent)?;

    let mut written = false;
    let mut bytes_written = 0;
    let mut document_out = None;

    match &output_path {
        Some(path) if !options.dry_run => {
            crate::log_status!("fix", "Writing {}", path.display());
            io::write_file_atomic(path, &rendered, &format!("write {}", path.display()))?;
            written = true;
            bytes_written = rendered.len();
        }
        Some(path) => {
            crate::log_status!("fix", "Dry run, not writing {}", path.display());
        }
        None => {
            bytes_written = rendered.len();
            document_out = Some(rendered);
        }
    }

    let report = FixReport {
        input: input_label,
        output: output_path.map(|p| p.display().to_string()),
        dry_run: options.dry_run,
        written,
        bytes_written,
        table_size: options.table.len(),
        keys_visited: stats.keys_visited,
        total_renamed: stats.total_renamed(),
        renamed: stats.renamed,
        collisions: stats.collisions,
        timestamps_fixed: stats.timestamps_fixed,
    };

    Ok(FixOutcome {
        report,
        document: document_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(input: PathBuf, output: OutputTarget) -> FixOptions {
        FixOptions {
            input: InputSource::File(input),
            output,
            table: RenameTable::default(),
            timestamps: None,
            indent: 2,
            dry_run: false,
        }
    }

    #[test]
    fn default_output_path_appends_suffix() {
        assert_eq!(
            default_output_path(Path::new("/data/SP002_aggregations.json")),
            PathBuf::from("/data/SP002_aggregations_FIXED.json")
        );
    }

    #[test]
    fn input_source_from_arg() {
        assert_eq!(InputSource::from_arg("-"), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg("a.json"),
            InputSource::File(PathBuf::from("a.json"))
        );
    }

    #[test]
    fn writes_renamed_document() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        fs::write(&input, r#"{"hourly": {"averagepower": 10, "maxcurrent": 1}}"#).unwrap();

        let outcome = run(options(input, OutputTarget::File(output.clone()))).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "{\n  \"hourly\": {\n    \"average_power_w\": 10,\n    \"max_current\": 1\n  }\n}"
        );
        assert!(outcome.report.written);
        assert_eq!(outcome.report.total_renamed, 2);
        assert_eq!(outcome.report.bytes_written, written.len());
        assert!(outcome.document.is_none());
    }

    #[test]
    fn dry_run_leaves_disk_untouched() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        fs::write(&input, r#"{"minvoltage": 200}"#).unwrap();

        let mut opts = options(input, OutputTarget::File(output.clone()));
        opts.dry_run = true;
        let outcome = run(opts).unwrap();

        assert!(!output.exists());
        assert!(!outcome.report.written);
        assert_eq!(outcome.report.renamed.get("minvoltage"), Some(&1));
    }

    #[test]
    fn in_place_overwrites_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, r#"[{"totalreadings": 4}]"#).unwrap();

        run(options(input.clone(), OutputTarget::InPlace)).unwrap();

        assert_eq!(
            fs::read_to_string(&input).unwrap(),
            "[\n  {\n    \"total_readings\": 4\n  }\n]"
        );
    }

    #[test]
    fn stdout_target_returns_document() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, r#"{"maxvoltage": 230}"#).unwrap();

        let outcome = run(options(input, OutputTarget::Stdout)).unwrap();

        assert_eq!(
            outcome.document.as_deref(),
            Some("{\n  \"max_voltage\": 230\n}")
        );
        assert!(outcome.report.output.is_none());
    }

    #[test]
    fn in_place_rejects_stdin() {
        let opts = FixOptions {
            input: InputSource::Stdin,
            output: OutputTarget::InPlace,
            table: RenameTable::default(),
            timestamps: None,
            indent: 2,
            dry_run: false,
        };
        let err = run(opts).err().unwrap();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = run(options(dir.path().join("absent.json"), OutputTarget::Stdout))
            .err()
            .unwrap();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }

    #[test]
    fn malformed_input_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, "{\"averagepower\": }").unwrap();

        let err = run(options(input, OutputTarget::Stdout)).err().unwrap();
        assert_eq!(err.code.as_str(), "document.parse_error");
        assert_eq!(err.details["line"], 1);
    }

    #[test]
    fn timestamps_fixed_when_enabled() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, r#"{"timestamp": "2025-11-26T0100:00"}"#).unwrap();

        let mut opts = options(input, OutputTarget::Stdout);
        opts.timestamps = Some(TimestampRules::default());
        let outcome = run(opts).unwrap();

        assert_eq!(outcome.report.timestamps_fixed, 1);
        assert!(outcome
            .document
            .unwrap()
            .contains("2025-11-26T01:00:00+08:00"));
    }
}
