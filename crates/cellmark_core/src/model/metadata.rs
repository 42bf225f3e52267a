//! Per-cell metadata access and legacy schema migration.
//!
//! # Responsibility
//! - Read a cell's classification from its host-owned metadata map.
//! - Migrate the deprecated `is_solution` flag on first observation.
//! - Write classification changes back in the persisted shape.
//!
//! # Invariants
//! - `is_solution` is deleted whenever it is observed and never re-read.
//! - A truthy `is_solution` always yields `cell_type = "solution"`.
//! - Missing `cell_type` is the valid `none` state, never an error.

use crate::model::classification::{BlockKind, Classification};
use log::warn;
use serde_json::{Map, Value};

/// Metadata key holding the persisted classification.
pub const METADATA_CELL_TYPE: &str = "cell_type";
/// Deprecated boolean metadata key, migrated on read.
pub const METADATA_LEGACY_IS_SOLUTION: &str = "is_solution";

/// Opaque key-value store owned by the host for one cell.
pub trait MetadataStore {
    fn get(&self, key: &str) -> Option<&Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str) -> Option<Value>;
}

impl MetadataStore for Map<String, Value> {
    fn get(&self, key: &str) -> Option<&Value> {
        Map::get(self, key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        Map::remove(self, key)
    }
}

/// Legacy value removed during a metadata read.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyMigration {
    /// Raw `is_solution` value as stored before deletion.
    pub legacy_value: Value,
    /// Whether the value promoted the cell to `solution`.
    pub promoted_to_solution: bool,
}

/// Result of one classification read.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRead {
    pub classification: Classification,
    /// Present when the legacy field was found and removed.
    pub migration: Option<LegacyMigration>,
    /// Raw `cell_type` string that did not name a known kind.
    pub unrecognized: Option<String>,
}

/// Reads the current classification, migrating the legacy flag if present.
///
/// # Side effects
/// - Deletes `is_solution` when present.
/// - Writes `cell_type = "solution"` when `is_solution` was truthy.
pub fn read_classification(store: &mut impl MetadataStore) -> MetadataRead {
    let mut unrecognized = None;
    let mut classification = match store.get(METADATA_CELL_TYPE) {
        None | Some(Value::Null) => Classification::None,
        Some(Value::String(raw)) => match BlockKind::from_metadata(raw) {
            Some(kind) => kind.into(),
            None => {
                warn!(
                    "event=metadata_read module=metadata status=ignored reason=unknown_cell_type value={raw:?}"
                );
                unrecognized = Some(raw.clone());
                Classification::None
            }
        },
        Some(other) => {
            warn!(
                "event=metadata_read module=metadata status=ignored reason=non_string_cell_type value={other}"
            );
            unrecognized = Some(other.to_string());
            Classification::None
        }
    };

    let migration = store.remove(METADATA_LEGACY_IS_SOLUTION).map(|legacy_value| {
        let promoted_to_solution = is_truthy(&legacy_value);
        if promoted_to_solution {
            classification = Classification::Solution;
            unrecognized = None;
            write_classification(store, Classification::Solution);
        }
        LegacyMigration {
            legacy_value,
            promoted_to_solution,
        }
    });

    MetadataRead {
        classification,
        migration,
        unrecognized,
    }
}

/// Persists `classification`, deleting the key for `none`.
pub fn write_classification(store: &mut impl MetadataStore, classification: Classification) {
    match classification.metadata_value() {
        Some(value) => store.set(METADATA_CELL_TYPE, Value::String(value.to_string())),
        None => {
            store.remove(METADATA_CELL_TYPE);
        }
    }
}

/// Loose truthiness used by notebook hosts for flag values.
///
/// `false`, `null`, `0` and `""` are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        is_truthy, read_classification, write_classification, METADATA_CELL_TYPE,
        METADATA_LEGACY_IS_SOLUTION,
    };
    use crate::model::classification::Classification;
    use serde_json::{json, Map, Value};

    fn metadata(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn absent_metadata_reads_as_none_without_mutation() {
        let mut store = metadata(json!({"tags": ["x"]}));
        let read = read_classification(&mut store);
        assert_eq!(read.classification, Classification::None);
        assert!(read.migration.is_none());
        assert_eq!(store, metadata(json!({"tags": ["x"]})));
    }

    #[test]
    fn truthy_legacy_flag_promotes_to_solution() {
        let mut store = metadata(json!({"is_solution": true}));
        let read = read_classification(&mut store);
        assert_eq!(read.classification, Classification::Solution);
        assert_eq!(store.get(METADATA_CELL_TYPE), Some(&json!("solution")));
        assert!(!store.contains_key(METADATA_LEGACY_IS_SOLUTION));
        assert!(read.migration.expect("migration recorded").promoted_to_solution);
    }

    #[test]
    fn falsy_legacy_flag_is_removed_without_classification() {
        let mut store = metadata(json!({"is_solution": false}));
        let read = read_classification(&mut store);
        assert_eq!(read.classification, Classification::None);
        assert!(store.is_empty());
        assert!(!read.migration.expect("migration recorded").promoted_to_solution);
    }

    #[test]
    fn truthy_legacy_flag_overrides_existing_hint() {
        let mut store = metadata(json!({"cell_type": "hint", "is_solution": 1}));
        let read = read_classification(&mut store);
        assert_eq!(read.classification, Classification::Solution);
        assert_eq!(store.get(METADATA_CELL_TYPE), Some(&json!("solution")));
    }

    #[test]
    fn unknown_cell_type_reads_as_none_and_is_kept() {
        let mut store = metadata(json!({"cell_type": "quiz"}));
        let read = read_classification(&mut store);
        assert_eq!(read.classification, Classification::None);
        assert_eq!(read.unrecognized.as_deref(), Some("quiz"));
        assert_eq!(store.get(METADATA_CELL_TYPE), Some(&json!("quiz")));
    }

    #[test]
    fn padded_or_cased_cell_type_is_not_a_kind() {
        for raw in [" hint ", "Solution", "hint\n"] {
            let mut store = metadata(json!({"cell_type": raw}));
            let read = read_classification(&mut store);
            assert_eq!(read.classification, Classification::None, "value {raw:?}");
            assert_eq!(read.unrecognized.as_deref(), Some(raw));
            assert_eq!(store.get(METADATA_CELL_TYPE), Some(&json!(raw)));
        }
    }

    #[test]
    fn write_none_deletes_key() {
        let mut store = metadata(json!({"cell_type": "hint"}));
        write_classification(&mut store, Classification::None);
        assert!(store.is_empty());
        write_classification(&mut store, Classification::Hint);
        assert_eq!(store.get(METADATA_CELL_TYPE), Some(&json!("hint")));
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        for falsy in [json!(false), json!(null), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(2), json!("no"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }
}
