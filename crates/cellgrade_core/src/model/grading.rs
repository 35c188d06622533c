//! Grading metadata stored under `cell.metadata.nbgrader`.
//!
//! # Responsibility
//! - Name the persisted field contract shared with authoring tools.
//! - Provide the typed view of a current-version record.
//!
//! # Invariants
//! - Persisted keys are exactly the ones declared in this module.
//! - A `GradingV1` is only built from a map that passed the v1 schema check.

use crate::schema::{FieldViolation, SchemaValidationError, ViolationReason};
use serde_json::{Map, Value};

/// Reserved cell metadata key holding grading metadata.
pub const GRADING_KEY: &str = "nbgrader";

pub const SCHEMA_VERSION: &str = "schema_version";
pub const GRADE: &str = "grade";
pub const SOLUTION: &str = "solution";
pub const LOCKED: &str = "locked";
pub const GRADE_ID: &str = "grade_id";
pub const POINTS: &str = "points";

/// Flags that give a cell a grading role.
pub const ROLE_FLAGS: [&str; 3] = [GRADE, SOLUTION, LOCKED];

/// Typed view of a schema-version-1 grading record.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingV1 {
    pub grade: bool,
    pub solution: bool,
    pub locked: bool,
    pub grade_id: Option<String>,
    pub points: Option<f64>,
}

impl GradingV1 {
    /// Reads a record that already conforms to the v1 schema.
    ///
    /// # Errors
    /// - Returns `SchemaValidationError` naming the first field whose shape
    ///   does not match, when called on unchecked input.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, SchemaValidationError> {
        Ok(Self {
            grade: required_flag(map, GRADE)?,
            solution: required_flag(map, SOLUTION)?,
            locked: required_flag(map, LOCKED)?,
            grade_id: match map.get(GRADE_ID) {
                None => None,
                Some(Value::String(id)) => Some(id.clone()),
                Some(_) => return Err(wrong_shape(GRADE_ID)),
            },
            points: match map.get(POINTS) {
                None => None,
                Some(value) => Some(value.as_f64().ok_or_else(|| wrong_shape(POINTS))?),
            },
        })
    }

    /// Whether the cell takes part in grading at all.
    pub fn has_role(&self) -> bool {
        self.grade || self.solution || self.locked
    }
}

/// Truthiness of a loosely-typed legacy value.
///
/// `null`, `false`, zero, and empty strings, arrays, or objects are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Reads the stored `schema_version`.
///
/// Returns `Ok(None)` when the field is absent.
///
/// # Errors
/// - Returns `SchemaValidationError` when the field is not a non-negative integer.
pub fn stored_schema_version(
    map: &Map<String, Value>,
) -> Result<Option<u32>, SchemaValidationError> {
    let Some(value) = map.get(SCHEMA_VERSION) else {
        return Ok(None);
    };
    value
        .as_u64()
        .and_then(|version| u32::try_from(version).ok())
        .map(Some)
        .ok_or_else(|| wrong_shape(SCHEMA_VERSION))
}

fn required_flag(map: &Map<String, Value>, field: &str) -> Result<bool, SchemaValidationError> {
    match map.get(field) {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(wrong_shape(field)),
        None => Err(SchemaValidationError::single(FieldViolation {
            field: field.to_string(),
            reason: ViolationReason::Missing,
        })),
    }
}

fn wrong_shape(field: &str) -> SchemaValidationError {
    SchemaValidationError::single(FieldViolation {
        field: field.to_string(),
        reason: ViolationReason::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::{is_truthy, stored_schema_version, GradingV1};
    use serde_json::json;

    #[test]
    fn truthiness_follows_legacy_rules() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!(2.5)));
        assert!(is_truthy(&json!(true)));
    }

    #[test]
    fn stored_schema_version_rejects_non_integers() {
        let map = json!({"schema_version": "1"});
        assert!(stored_schema_version(map.as_object().unwrap()).is_err());

        let map = json!({"schema_version": 1});
        assert_eq!(stored_schema_version(map.as_object().unwrap()).unwrap(), Some(1));

        let map = json!({});
        assert_eq!(stored_schema_version(map.as_object().unwrap()).unwrap(), None);
    }

    #[test]
    fn typed_record_reads_current_fields() {
        let source = json!({
            "schema_version": 1,
            "grade": true,
            "solution": false,
            "locked": false,
            "grade_id": "q1",
            "points": 2.0
        });
        let record = GradingV1::from_map(source.as_object().unwrap()).unwrap();
        assert!(record.has_role());
        assert_eq!(record.points, Some(2.0));
        assert_eq!(record.grade_id.as_deref(), Some("q1"));
        assert!(!record.solution && !record.locked);
    }
}
