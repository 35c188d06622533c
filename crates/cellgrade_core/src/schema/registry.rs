//! Versioned schema registry.
//!
//! # Invariants
//! - `version` values are registered in strictly increasing order.
//! - The last registered schema is the current one.

use super::{PropertyKind, PropertySpec, Schema, SchemaNotFoundError};
use crate::model::grading::{GRADE, GRADE_ID, LOCKED, POINTS, SCHEMA_VERSION, SOLUTION};

/// Legacy records were written without a schema. Every field is optional and
/// untyped; role flags are read by truthiness during the v0 -> v1 transition.
/// The entry is registered so `lookup(0)` resolves; migration never checks
/// records against it.
const V0_PROPERTIES: &[PropertySpec] = &[
    optional(SCHEMA_VERSION, PropertyKind::Integer),
    optional(GRADE, PropertyKind::Any),
    optional(SOLUTION, PropertyKind::Any),
    optional(LOCKED, PropertyKind::Any),
    optional(GRADE_ID, PropertyKind::Any),
    optional(POINTS, PropertyKind::Any),
];

const V1_PROPERTIES: &[PropertySpec] = &[
    PropertySpec {
        name: SCHEMA_VERSION,
        kind: PropertyKind::Integer,
        required: true,
        pinned: Some(1),
    },
    required(GRADE, PropertyKind::Boolean),
    required(SOLUTION, PropertyKind::Boolean),
    required(LOCKED, PropertyKind::Boolean),
    optional(GRADE_ID, PropertyKind::String),
    optional(POINTS, PropertyKind::Number),
];

const SCHEMAS: &[Schema] = &[
    Schema::new(0, V0_PROPERTIES, true),
    Schema::new(1, V1_PROPERTIES, false),
];

const fn required(name: &'static str, kind: PropertyKind) -> PropertySpec {
    PropertySpec {
        name,
        kind,
        required: true,
        pinned: None,
    }
}

const fn optional(name: &'static str, kind: PropertyKind) -> PropertySpec {
    PropertySpec {
        name,
        kind,
        required: false,
        pinned: None,
    }
}

/// Read-only lookup of grading schemas by version.
#[derive(Debug, Clone, Copy)]
pub struct SchemaRegistry {
    schemas: &'static [Schema],
}

impl SchemaRegistry {
    /// Creates a registry over the built-in schemas.
    pub fn new() -> Self {
        Self { schemas: SCHEMAS }
    }

    /// Returns the schema for `version`.
    ///
    /// # Errors
    /// - Returns `SchemaNotFoundError` when `version` is not registered.
    pub fn lookup(&self, version: u32) -> Result<&'static Schema, SchemaNotFoundError> {
        self.schemas
            .iter()
            .find(|schema| schema.version == version)
            .ok_or(SchemaNotFoundError {
                version,
                latest_supported: self.current_version(),
            })
    }

    /// Returns the latest schema version known by this build.
    pub fn current_version(&self) -> u32 {
        self.schemas.last().map_or(0, |schema| schema.version)
    }

    /// Returns the current schema.
    pub fn current(&self) -> &'static Schema {
        // SCHEMAS is a non-empty constant table.
        &self.schemas[self.schemas.len() - 1]
    }

    /// Returns every registered version in ascending order.
    pub fn versions(&self) -> Vec<u32> {
        self.schemas.iter().map(|schema| schema.version).collect()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
