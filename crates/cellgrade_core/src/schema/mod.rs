//! Structural schemas for grading metadata.
//!
//! # Responsibility
//! - Declare the allowed property set of each grading schema version.
//! - Check a metadata object against one version's structural rules.
//!
//! # Invariants
//! - Schemas are static and read-only.
//! - A failed check reports every violating field, sorted by name.

mod registry;

pub use registry::SchemaRegistry;

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Value shape accepted for one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Boolean,
    Integer,
    Number,
    String,
    /// Any JSON value; used where legacy data was loosely typed.
    Any,
}

impl PropertyKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
            Self::Any => true,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Any => "any value",
        }
    }
}

/// Declaration of one allowed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub required: bool,
    /// Exact integer value the property must hold, if pinned.
    pub pinned: Option<u64>,
}

/// Structural schema for one grading metadata version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub version: u32,
    properties: &'static [PropertySpec],
    additional_properties: bool,
}

impl Schema {
    pub(crate) const fn new(
        version: u32,
        properties: &'static [PropertySpec],
        additional_properties: bool,
    ) -> Self {
        Self {
            version,
            properties,
            additional_properties,
        }
    }

    /// Returns the declared property names.
    pub fn allowed_properties(&self) -> Vec<&'static str> {
        self.properties.iter().map(|spec| spec.name).collect()
    }

    pub fn allows(&self, key: &str) -> bool {
        self.properties.iter().any(|spec| spec.name == key)
    }

    /// Checks `metadata` against this schema.
    ///
    /// # Errors
    /// - Returns `SchemaValidationError` listing every violating field.
    pub fn check(&self, metadata: &Map<String, Value>) -> Result<(), SchemaValidationError> {
        let mut violations = Vec::new();

        for spec in self.properties {
            let Some(value) = metadata.get(spec.name) else {
                if spec.required {
                    violations.push(FieldViolation::new(spec.name, ViolationReason::Missing));
                }
                continue;
            };
            if !spec.kind.accepts(value) {
                violations.push(FieldViolation::new(
                    spec.name,
                    ViolationReason::WrongType {
                        expected: spec.kind,
                    },
                ));
                continue;
            }
            if let Some(expected) = spec.pinned {
                if value.as_u64() != Some(expected) {
                    violations.push(FieldViolation::new(
                        spec.name,
                        ViolationReason::WrongValue { expected },
                    ));
                }
            }
        }

        if !self.additional_properties {
            for key in metadata.keys() {
                if !self.allows(key) {
                    violations.push(FieldViolation::new(key, ViolationReason::Unexpected));
                }
            }
        }

        if violations.is_empty() {
            return Ok(());
        }
        violations.sort_by(|left, right| left.field.cmp(&right.field));
        Err(SchemaValidationError { violations })
    }
}

/// Requested schema version is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNotFoundError {
    pub version: u32,
    pub latest_supported: u32,
}

impl Display for SchemaNotFoundError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no grading schema registered for version {} (latest supported {})",
            self.version, self.latest_supported
        )
    }
}

impl Error for SchemaNotFoundError {}

/// Why one field failed the structural check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    Missing,
    WrongType { expected: PropertyKind },
    WrongValue { expected: u64 },
    Unexpected,
    /// Value is present but unusable in its position.
    Malformed,
}

/// One violating field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: ViolationReason,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: ViolationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            ViolationReason::Missing => write!(f, "`{}` is required", self.field),
            ViolationReason::WrongType { expected } => {
                write!(f, "`{}` must be a {}", self.field, expected.as_str())
            }
            ViolationReason::WrongValue { expected } => {
                write!(f, "`{}` must equal {expected}", self.field)
            }
            ViolationReason::Unexpected => write!(f, "`{}` is not allowed", self.field),
            ViolationReason::Malformed => write!(f, "`{}` is malformed", self.field),
        }
    }
}

/// Metadata shape does not match the declared schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    pub violations: Vec<FieldViolation>,
}

impl SchemaValidationError {
    pub fn single(violation: FieldViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// Names of the violating fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.violations
            .iter()
            .map(|violation| violation.field.as_str())
            .collect()
    }
}

impl Display for SchemaValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "grading metadata does not match schema: ")?;
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl Error for SchemaValidationError {}

#[cfg(test)]
mod tests {
    use super::{SchemaRegistry, ViolationReason};
    use serde_json::json;

    #[test]
    fn current_schema_accepts_complete_record() {
        let registry = SchemaRegistry::new();
        let schema = registry.current();
        let metadata = json!({
            "schema_version": 1,
            "grade": true,
            "solution": false,
            "locked": false,
            "grade_id": "q1",
            "points": 2.0
        });
        assert!(schema.check(metadata.as_object().unwrap()).is_ok());
    }

    #[test]
    fn current_schema_lists_all_violations_sorted() {
        let registry = SchemaRegistry::new();
        let schema = registry.current();
        let metadata = json!({
            "schema_version": 1,
            "grade": "yes",
            "locked": false,
            "points": "5",
            "comment": "extra"
        });

        let err = schema.check(metadata.as_object().unwrap()).unwrap_err();
        assert_eq!(err.fields(), vec!["comment", "grade", "points", "solution"]);
        assert_eq!(err.violations[3].reason, ViolationReason::Missing);
        assert_eq!(err.violations[0].reason, ViolationReason::Unexpected);
    }

    #[test]
    fn current_schema_pins_version_number() {
        let registry = SchemaRegistry::new();
        let metadata = json!({
            "schema_version": 2,
            "grade": false,
            "solution": false,
            "locked": false
        });
        let err = registry
            .current()
            .check(metadata.as_object().unwrap())
            .unwrap_err();
        assert_eq!(
            err.violations[0].reason,
            ViolationReason::WrongValue { expected: 1 }
        );
        assert!(err.to_string().contains("`schema_version` must equal 1"));
    }

    #[test]
    fn legacy_schema_tolerates_extra_keys_and_string_points() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(0).unwrap();
        let metadata = json!({"grade": true, "points": "3", "comment": "kept"});
        assert!(schema.check(metadata.as_object().unwrap()).is_ok());
    }

    #[test]
    fn legacy_schema_accepts_loosely_typed_flags() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(0).unwrap();
        let metadata = json!({"grade": "yes", "solution": 0, "locked": null, "grade_id": 7});
        assert!(schema.check(metadata.as_object().unwrap()).is_ok());
    }
}
