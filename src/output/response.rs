//! What fieldfix puts on stdout: the JSON envelope or a raw document, plus
//! the exit code each error code maps to.

use fieldfix::error::Hint;
use fieldfix::{Error, ErrorCode, Result};
use serde::Serialize;

/// Envelope printed for every non-raw command.
#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
}

impl From<Error> for CliError {
    fn from(err: Error) -> Self {
        Self {
            code: err.code.as_str().to_string(),
            message: err.message,
            details: err.details,
            hints: err.hints,
        }
    }
}

impl<T: Serialize> CliResponse<T> {
    fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                success: false,
                data: None,
                error: Some(err.into()),
            },
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

/// Stdout write; a closed pipe (`fieldfix ... | head`) is not an error.
fn write_stdout(payload: &str) -> Result<()> {
    use std::io::{self, Write};

    let mut handle = io::stdout().lock();
    match writeln!(handle, "{}", payload) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        )),
        _ => Ok(()),
    }
}

/// Print a command result wrapped in the envelope.
pub fn print_result(result: Result<serde_json::Value>) -> Result<()> {
    write_stdout(&CliResponse::from_result(result).to_json()?)
}

/// Print a transformed document as-is, without the envelope.
pub fn print_raw(document: &str) -> Result<()> {
    write_stdout(document)
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

pub fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidToml
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument
        | ErrorCode::ValidationInvalidJson
        | ErrorCode::DocumentParseError => 2,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}
