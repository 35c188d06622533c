//! Grading metadata migration.
//!
//! # Responsibility
//! - Upgrade one cell's grading metadata to the current schema version.
//! - Register version transitions in strictly increasing order.
//!
//! # Invariants
//! - Cells without grading metadata are never touched.
//! - Upgrading is idempotent once `schema_version` equals the current version.
//! - Metadata is replaced only after every pending transition succeeded.
//! - Versions above current, or without a registered transition, are rejected.

use crate::diagnostics::{Diagnostics, NoticeKind};
use crate::model::grading::{
    is_truthy, stored_schema_version, GRADE_ID, GRADING_KEY, POINTS, ROLE_FLAGS, SCHEMA_VERSION,
};
use crate::model::notebook::Cell;
use crate::schema::{
    FieldViolation, Schema, SchemaNotFoundError, SchemaRegistry, SchemaValidationError,
    ViolationReason,
};
use log::debug;
use serde_json::{Map, Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

type Metadata = Map<String, Value>;

/// One `from -> from + 1` transition.
#[derive(Clone, Copy)]
struct Transition {
    from: u32,
    apply: fn(Metadata, &Schema, &mut Diagnostics) -> Result<Metadata, CoercionError>,
}

const TRANSITIONS: &[Transition] = &[Transition {
    from: 0,
    apply: v0_to_v1,
}];

/// A `points` value could not be read as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionError {
    pub field: &'static str,
    pub value: Value,
}

impl Display for CoercionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}` value {} cannot be interpreted as a number",
            self.field, self.value
        )
    }
}

impl Error for CoercionError {}

/// Migration failures.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationError {
    Coercion(CoercionError),
    SchemaNotFound(SchemaNotFoundError),
    SchemaValidation(SchemaValidationError),
}

impl Display for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coercion(err) => write!(f, "{err}"),
            Self::SchemaNotFound(err) => write!(f, "{err}"),
            Self::SchemaValidation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Coercion(err) => Some(err),
            Self::SchemaNotFound(err) => Some(err),
            Self::SchemaValidation(err) => Some(err),
        }
    }
}

impl From<CoercionError> for MigrationError {
    fn from(value: CoercionError) -> Self {
        Self::Coercion(value)
    }
}

impl From<SchemaNotFoundError> for MigrationError {
    fn from(value: SchemaNotFoundError) -> Self {
        Self::SchemaNotFound(value)
    }
}

impl From<SchemaValidationError> for MigrationError {
    fn from(value: SchemaValidationError) -> Self {
        Self::SchemaValidation(value)
    }
}

/// Upgrades grading metadata in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataMigrator {
    registry: SchemaRegistry,
}

impl MetadataMigrator {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Upgrades `cell` grading metadata to the current schema version.
    ///
    /// # Errors
    /// - `SchemaValidation` when `nbgrader` is not an object or
    ///   `schema_version` is not a non-negative integer.
    /// - `SchemaNotFound` when the stored version is newer than current or
    ///   has no registered transition.
    /// - `Coercion` when `points` is not numeric; metadata is left untouched.
    pub fn upgrade(
        &self,
        cell: &mut Cell,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), MigrationError> {
        let Some(slot) = cell.metadata.get_mut(GRADING_KEY) else {
            return Ok(());
        };
        let Value::Object(metadata) = slot else {
            return Err(SchemaValidationError::single(FieldViolation::new(
                GRADING_KEY,
                ViolationReason::Malformed,
            ))
            .into());
        };

        let current = self.registry.current_version();
        let mut version = match stored_schema_version(metadata)? {
            Some(version) => version,
            None => {
                diagnostics.push(NoticeKind::AssumedLegacyVersion);
                0
            }
        };
        if version == current {
            return Ok(());
        }
        if version > current {
            return Err(self.not_found(version).into());
        }

        let mut working = metadata.clone();
        while version < current {
            let transition = TRANSITIONS
                .iter()
                .find(|transition| transition.from == version)
                .ok_or_else(|| self.not_found(version))?;
            let target = self.registry.lookup(version + 1)?;
            working = (transition.apply)(working, target, diagnostics)?;
            version = target.version;
        }

        debug!("event=metadata_upgraded module=migrate status=ok schema_version={version}");
        *metadata = working;
        Ok(())
    }

    fn not_found(&self, version: u32) -> SchemaNotFoundError {
        SchemaNotFoundError {
            version,
            latest_supported: self.registry.current_version(),
        }
    }
}

fn v0_to_v1(
    mut metadata: Metadata,
    target: &Schema,
    diagnostics: &mut Diagnostics,
) -> Result<Metadata, CoercionError> {
    for flag in ROLE_FLAGS {
        metadata
            .entry(flag)
            .or_insert(Value::Bool(false));
    }

    let has_role = ROLE_FLAGS
        .iter()
        .any(|flag| metadata.get(*flag).is_some_and(is_truthy));
    if !has_role {
        metadata.remove(GRADE_ID);
        metadata.remove(POINTS);
    }

    if let Some(points) = metadata.get_mut(POINTS) {
        *points = coerce_points(points)?;
    }

    let mut extra: Vec<String> = metadata
        .keys()
        .filter(|key| !target.allows(key))
        .cloned()
        .collect();
    if !extra.is_empty() {
        extra.sort();
        for key in &extra {
            metadata.remove(key);
        }
        diagnostics.push(NoticeKind::ExtraKeysRemoved(extra));
    }

    metadata.insert(SCHEMA_VERSION.to_string(), Value::from(target.version));
    Ok(metadata)
}

fn coerce_points(value: &Value) -> Result<Value, CoercionError> {
    let coerced = match value {
        Value::String(text) if text.is_empty() => Some(0.0),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };
    coerced
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| CoercionError {
            field: POINTS,
            value: value.clone(),
        })
}
