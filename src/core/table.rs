//! Rename tables: which legacy field names map to which current names.
//!
//! A table is built once per run (from a preset, a table file, or config)
//! and passed explicitly to the renamer. Lookups for keys outside the table
//! are identity.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::utils::io;

// ============================================================================
// Presets
// ============================================================================

/// Built-in rename tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenamePreset {
    /// First-generation 10-entry aggregation migration.
    #[default]
    Sp002,
    /// Later revision: collapses `average_power_w` into `average_power` and
    /// covers the energy/snapshot totals.
    Sp002Canonical,
}

const SP002_PAIRS: &[(&str, &str)] = &[
    ("averagepower", "average_power_w"),
    ("averagecurrent", "average_current"),
    ("averagevoltage", "average_voltage"),
    ("maxpower", "max_power"),
    ("maxcurrent", "max_current"),
    ("maxvoltage", "max_voltage"),
    ("minpower", "min_power"),
    ("mincurrent", "min_current"),
    ("minvoltage", "min_voltage"),
    ("totalreadings", "total_readings"),
];

const SP002_CANONICAL_PAIRS: &[(&str, &str)] = &[
    ("averagepower", "average_power"),
    ("average_power_w", "average_power"),
    ("averagecurrent", "average_current"),
    ("averagevoltage", "average_voltage"),
    ("maxpower", "max_power"),
    ("maxcurrent", "max_current"),
    ("maxvoltage", "max_voltage"),
    ("minpower", "min_power"),
    ("mincurrent", "min_current"),
    ("minvoltage", "min_voltage"),
    ("totalreadings", "total_readings"),
    ("totalenergy", "total_energy"),
    ("totalreadingsinsnapshot", "total_readings_in_snapshot"),
];

impl RenamePreset {
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "sp002" => Ok(RenamePreset::Sp002),
            "sp002-canonical" => Ok(RenamePreset::Sp002Canonical),
            _ => Err(Error::validation_invalid_argument(
                "preset",
                format!("Unknown preset '{}'. Use: sp002, sp002-canonical", s),
                Some(s.to_string()),
                Some(Self::names().iter().map(|n| n.to_string()).collect()),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenamePreset::Sp002 => "sp002",
            RenamePreset::Sp002Canonical => "sp002-canonical",
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["sp002", "sp002-canonical"]
    }

    fn pairs(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            RenamePreset::Sp002 => SP002_PAIRS,
            RenamePreset::Sp002Canonical => SP002_CANONICAL_PAIRS,
        }
    }
}

// ============================================================================
// Table
// ============================================================================

/// One old → new pair, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub from: String,
    pub to: String,
}

/// Validated old-key → new-key substitution table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTable {
    entries: Vec<RenameEntry>,
    index: HashMap<String, usize>,
}

impl RenameTable {
    /// Build a table from pairs. Keys and values must be non-empty, a key
    /// may not map to itself, and each key may appear once.
    pub fn new<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for (from, to) in pairs {
            let from = from.into();
            let to = to.into();

            if from.is_empty() {
                return Err(Error::config_invalid_value(
                    "table",
                    Some(to),
                    "Rename source key must not be empty",
                ));
            }
            if to.is_empty() {
                return Err(Error::config_invalid_value(
                    "table",
                    Some(from),
                    "Rename target key must not be empty",
                ));
            }
            if from == to {
                return Err(Error::config_invalid_value(
                    "table",
                    Some(from),
                    "Rename entry maps a key to itself",
                ));
            }
            if index.contains_key(&from) {
                return Err(Error::config_invalid_value(
                    "table",
                    Some(from),
                    "Duplicate rename source key",
                ));
            }

            index.insert(from.clone(), entries.len());
            entries.push(RenameEntry { from, to });
        }

        Ok(Self { entries, index })
    }

    pub fn from_preset(preset: RenamePreset) -> Self {
        let pairs = preset.pairs();
        let entries: Vec<RenameEntry> = pairs
            .iter()
            .map(|(from, to)| RenameEntry {
                from: from.to_string(),
                to: to.to_string(),
            })
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.from.clone(), i))
            .collect();

        Self { entries, index }
    }

    /// Load a table file. `.toml` files are read as a TOML table, anything
    /// else as a JSON object. Every value must be a string.
    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_file(path, &format!("read table {}", path.display()))?;
        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let raw: serde_json::Map<String, Value> = if is_toml {
            let table: toml::Table = toml::from_str(&content)
                .map_err(|e| Error::config_invalid_toml(path.display().to_string(), e))?;
            serde_json::to_value(table)
                .ok()
                .and_then(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .ok_or_else(|| {
                    Error::internal_json(
                        "TOML table did not convert to a JSON object",
                        Some(format!("read table {}", path.display())),
                    )
                })?
        } else {
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;
            match value {
                Value::Object(map) => map,
                other => {
                    return Err(Error::config_invalid_value(
                        "table",
                        Some(path.display().to_string()),
                        format!("Table file must be a JSON object, found {}", type_name(&other)),
                    ))
                }
            }
        };

        let mut pairs = Vec::with_capacity(raw.len());
        for (from, to) in raw {
            match to {
                Value::String(to) => pairs.push((from, to)),
                other => {
                    return Err(Error::config_invalid_value(
                        format!("table.{}", from),
                        Some(other.to_string()),
                        "Rename target must be a string",
                    ))
                }
            }
        }

        Self::new(pairs)
    }

    /// Renamed form of `key`, if the table covers it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].to.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenameEntry> {
        self.entries.iter()
    }

    /// Source keys whose target is itself a source key. Applying such a
    /// table twice renames those fields a second time.
    pub fn chained_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| self.index.contains_key(&e.to))
            .map(|e| e.from.as_str())
            .collect()
    }

    pub fn is_idempotent(&self) -> bool {
        self.chained_keys().is_empty()
    }
}

impl Default for RenameTable {
    fn default() -> Self {
        Self::from_preset(RenamePreset::default())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
