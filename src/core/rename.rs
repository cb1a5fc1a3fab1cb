//! Structural key renamer.
//!
//! Walks a JSON value and builds a new tree where every mapping key found in
//! a [`RenameTable`] is replaced by its new name. Values, sequence order and
//! node kinds are untouched. String values are never rewritten, even when
//! they are spelled like a table key.
//!
//! When two keys of one mapping land on the same output key, the later one
//! wins and the key keeps the position of the first insertion.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::table::RenameTable;
use crate::timestamp::TimestampRules;

/// Counters collected during one rename pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameStats {
    pub keys_visited: usize,
    /// Old key → number of occurrences renamed.
    pub renamed: BTreeMap<String, usize>,
    /// Entries overwritten because an earlier key produced the same name.
    pub collisions: usize,
    pub timestamps_fixed: usize,
}

impl RenameStats {
    pub fn total_renamed(&self) -> usize {
        self.renamed.values().sum()
    }
}

/// Rename pass configured with a table and optional timestamp rules.
pub struct Renamer<'a> {
    table: &'a RenameTable,
    timestamps: Option<&'a TimestampRules>,
}

impl<'a> Renamer<'a> {
    pub fn new(table: &'a RenameTable) -> Self {
        Self {
            table,
            timestamps: None,
        }
    }

    pub fn with_timestamps(mut self, rules: &'a TimestampRules) -> Self {
        self.timestamps = Some(rules);
        self
    }

    pub fn apply(&self, value: &Value) -> (Value, RenameStats) {
        let mut stats = RenameStats::default();
        let renamed = self.walk(value, &mut stats);
        (renamed, stats)
    }

    fn walk(&self, value: &Value, stats: &mut RenameStats) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.walk_map(map, stats)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.walk(item, stats)).collect())
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
        }
    }

    fn walk_map(&self, map: &Map<String, Value>, stats: &mut RenameStats) -> Map<String, Value> {
        let mut out = Map::with_capacity(map.len());

        for (key, child) in map {
            stats.keys_visited += 1;

            let new_key = match self.table.get(key) {
                Some(renamed) => {
                    *stats.renamed.entry(key.clone()).or_insert(0) += 1;
                    renamed.to_string()
                }
                None => key.clone(),
            };

            let new_value = match self.timestamps {
                Some(rules) if rules.applies_to(&new_key) => match child {
                    Value::String(raw) => match rules.normalize(raw) {
                        Some(fixed) => {
                            stats.timestamps_fixed += 1;
                            Value::String(fixed)
                        }
                        None => child.clone(),
                    },
                    _ => child.clone(),
                },
                _ => self.walk(child, stats),
            };

            if out.insert(new_key, new_value).is_some() {
                stats.collisions += 1;
            }
        }

        out
    }
}

/// Rename every key covered by `table`, returning a new tree.
pub fn rename(value: &Value, table: &RenameTable) -> Value {
    Renamer::new(table).apply(value).0
}

/// Same as [`rename`], also returning what changed.
pub fn rename_with_stats(value: &Value, table: &RenameTable) -> (Value, RenameStats) {
    Renamer::new(table).apply(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renames_top_level_key() {
        let out = rename(&json!({"averagepower": 10}), &RenameTable::default());
        assert_eq!(out, json!({"average_power_w": 10}));
    }

    #[test]
    fn scalars_pass_through() {
        let table = RenameTable::default();
        for scalar in [json!(null), json!(true), json!(1.5), json!("maxpower")] {
            assert_eq!(rename(&scalar, &table), scalar);
        }
    }

    #[test]
    fn preserves_key_order() {
        let input: Value =
            serde_json::from_str(r#"{"zeta": 1, "maxpower": 2, "alpha": 3}"#).unwrap();
        let out = rename(&input, &RenameTable::default());
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "max_power", "alpha"]);
    }

    #[test]
    fn collision_is_last_write_wins() {
        let table = RenameTable::from_preset(crate::table::RenamePreset::Sp002Canonical);
        let input: Value =
            serde_json::from_str(r#"{"averagepower": 1, "other": 0, "average_power_w": 2}"#)
                .unwrap();

        let (out, stats) = rename_with_stats(&input, &table);
        assert_eq!(out, json!({"average_power": 2, "other": 0}));
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["average_power", "other"]);
        assert_eq!(stats.collisions, 1);
    }

    #[test]
    fn stats_count_renames_per_key() {
        let input = json!({
            "hourly": [
                {"maxpower": 1, "minpower": 0},
                {"maxpower": 3, "minpower": 2, "note": "ok"}
            ]
        });

        let (_, stats) = rename_with_stats(&input, &RenameTable::default());
        assert_eq!(stats.renamed.get("maxpower"), Some(&2));
        assert_eq!(stats.renamed.get("minpower"), Some(&2));
        assert_eq!(stats.total_renamed(), 4);
        assert_eq!(stats.keys_visited, 6);
        assert_eq!(stats.collisions, 0);
    }

    #[test]
    fn timestamps_normalized_under_renamed_keys() {
        let table = RenameTable::default();
        let rules = TimestampRules::default();
        let input = json!({
            "daily": {"timestamp": "2025-11-26T0000:00", "averagepower": 5},
            "last_updated_utc": "2025-11-26T10:00:00Z",
            "timestamp": 1732600000
        });

        let (out, stats) = Renamer::new(&table).with_timestamps(&rules).apply(&input);
        assert_eq!(
            out,
            json!({
                "daily": {"timestamp": "2025-11-26T00:00:00+08:00", "average_power_w": 5},
                "last_updated_utc": "2025-11-26T10:00:00+08:00",
                "timestamp": 1732600000
            })
        );
        assert_eq!(stats.timestamps_fixed, 2);
    }

    #[test]
    fn timestamps_left_alone_without_rules() {
        let input = json!({"timestamp": "2025-11-26T0000:00"});
        assert_eq!(rename(&input, &RenameTable::default()), input);
    }
}
