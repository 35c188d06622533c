//! Error taxonomy for metadata validation and notebook I/O.

use crate::format::FormatError;
use crate::migrate::{CoercionError, MigrationError};
use crate::schema::{SchemaNotFoundError, SchemaValidationError};
use crate::validate::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GradingResult<T> = Result<T, GradingError>;

/// Failure of a read, write, migration, or validation pass.
///
/// Validation stops at the first failure; there is no partial result.
#[derive(Debug)]
pub enum GradingError {
    /// Malformed underlying document.
    Format(FormatError),
    /// Unknown schema version requested.
    SchemaNotFound(SchemaNotFoundError),
    /// Metadata shape does not match the declared schema.
    SchemaValidation(SchemaValidationError),
    /// User-data defect in grading metadata.
    Validation(ValidationError),
    /// `points` could not be read as a number during migration.
    Coercion(CoercionError),
}

impl Display for GradingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(err) => write!(f, "{err}"),
            Self::SchemaNotFound(err) => write!(f, "{err}"),
            Self::SchemaValidation(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Coercion(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GradingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format(err) => Some(err),
            Self::SchemaNotFound(err) => Some(err),
            Self::SchemaValidation(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Coercion(err) => Some(err),
        }
    }
}

impl From<FormatError> for GradingError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

impl From<SchemaNotFoundError> for GradingError {
    fn from(value: SchemaNotFoundError) -> Self {
        Self::SchemaNotFound(value)
    }
}

impl From<SchemaValidationError> for GradingError {
    fn from(value: SchemaValidationError) -> Self {
        Self::SchemaValidation(value)
    }
}

impl From<ValidationError> for GradingError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CoercionError> for GradingError {
    fn from(value: CoercionError) -> Self {
        Self::Coercion(value)
    }
}

impl From<MigrationError> for GradingError {
    fn from(value: MigrationError) -> Self {
        match value {
            MigrationError::Coercion(err) => Self::Coercion(err),
            MigrationError::SchemaNotFound(err) => Self::SchemaNotFound(err),
            MigrationError::SchemaValidation(err) => Self::SchemaValidation(err),
        }
    }
}
