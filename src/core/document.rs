//! JSON document codec used by the fix pipeline.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::{Error, Result};

pub const DEFAULT_INDENT: usize = 2;

/// Parse a single JSON document. `source` names the input in errors.
///
/// Nesting depth is not capped; the stack grows on the heap as needed.
/// Numbers keep their exact source digits.
pub fn parse(text: &str, source: &str) -> Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();

    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
        .map_err(|e| Error::document_parse(source, &e))?;
    deserializer
        .end()
        .map_err(|e| Error::document_parse(source, &e))?;

    Ok(value)
}

/// Pretty-print with `indent` spaces per level. Non-ASCII characters are
/// written as-is and there is no trailing newline.
pub fn to_pretty_string(value: &Value, indent: usize) -> Result<String> {
    let indent_bytes = vec![b' '; indent];
    let formatter = PrettyFormatter::with_indent(&indent_bytes);

    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize document".to_string())))?;

    String::from_utf8(buf)
        .map_err(|e| Error::internal_unexpected(format!("Serialized document is not UTF-8: {}", e)))
}
