//! Timestamp repair for aggregation snapshots.
//!
//! Older exports wrote hour buckets as `2025-11-26T0000:00` and mixed zoned,
//! unzoned and `Z`-suffixed stamps. Normalization fixes the malformed form
//! and pins every stamp to one configured offset.

use chrono::FixedOffset;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

// Hour and minute glued together: 2025-11-26T0000:00
static GLUED_TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})T(\d{2})(\d{2}):(\d{2})$").unwrap());

static UNZONED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}$").unwrap());

static OFFSET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-])(\d{2}):(\d{2})$").unwrap());

pub const DEFAULT_UTC_OFFSET: &str = "+08:00";

pub fn default_keys() -> Vec<String> {
    vec!["timestamp".to_string(), "last_updated_utc".to_string()]
}

/// Which fields hold timestamps and which offset to pin them to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRules {
    keys: Vec<String>,
    utc_offset: String,
}

impl TimestampRules {
    pub fn new(keys: Vec<String>, utc_offset: &str) -> Result<Self> {
        validate_offset(utc_offset)?;

        if keys.iter().any(|k| k.is_empty()) {
            return Err(Error::config_invalid_value(
                "timestamps.keys",
                None,
                "Timestamp key must not be empty",
            ));
        }

        Ok(Self {
            keys,
            utc_offset: utc_offset.to_string(),
        })
    }

    /// True when values under `key` (already renamed) are timestamps.
    pub fn applies_to(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn utc_offset(&self) -> &str {
        &self.utc_offset
    }

    /// Normalize one timestamp string. Returns `None` when nothing changed.
    ///
    /// A trailing `Z` is replaced with the configured offset rather than
    /// converted; the devices record local time with a bogus `Z`.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let mut fixed = raw.to_string();

        let unglued = GLUED_TIME_PATTERN
            .captures(&fixed)
            .map(|caps| format!("{}T{}:{}:{}", &caps[1], &caps[2], &caps[3], &caps[4]));
        if let Some(unglued) = unglued {
            fixed = unglued;
        }

        if UNZONED_PATTERN.is_match(&fixed) {
            fixed.push_str(&self.utc_offset);
        }

        if fixed.ends_with('Z') {
            fixed.pop();
            fixed.push_str(&self.utc_offset);
        }

        if fixed == raw {
            None
        } else {
            Some(fixed)
        }
    }
}

impl Default for TimestampRules {
    fn default() -> Self {
        Self {
            keys: default_keys(),
            utc_offset: DEFAULT_UTC_OFFSET.to_string(),
        }
    }
}

fn validate_offset(offset: &str) -> Result<FixedOffset> {
    let invalid = |problem: &str| {
        Error::config_invalid_value("utc_offset", Some(offset.to_string()), problem)
    };

    let caps = OFFSET_PATTERN
        .captures(offset)
        .ok_or_else(|| invalid("Offset must look like +HH:MM or -HH:MM"))?;

    let hours: i32 = caps[2].parse().map_err(|_| invalid("Invalid hours"))?;
    let minutes: i32 = caps[3].parse().map_err(|_| invalid("Invalid minutes"))?;
    if minutes >= 60 {
        return Err(invalid("Minutes must be below 60"));
    }

    let seconds = (hours * 3600 + minutes * 60) * if &caps[1] == "-" { -1 } else { 1 };
    FixedOffset::east_opt(seconds).ok_or_else(|| invalid("Offset out of range"))
}
