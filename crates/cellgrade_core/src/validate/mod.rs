//! Cell and notebook validation for grading metadata.
//!
//! # Responsibility
//! - Migrate grading metadata before any rule is evaluated.
//! - Enforce structural, per-cell semantic, and notebook-wide rules.
//!
//! # Invariants
//! - Stale-schema metadata is never evaluated.
//! - Migration is not rolled back when a later check fails.
//! - The first failure aborts the pass.

mod cell;
mod notebook;

use crate::migrate::MetadataMigrator;
use crate::schema::SchemaRegistry;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Semantic grading metadata defects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// grade/solution/locked is set but `grade_id` is absent.
    MissingGradeId { source: String },
    /// `grade_id` is the empty string.
    EmptyGradeId { source: String },
    /// `grade` is set but `points` is absent.
    MissingPoints { grade_id: String },
    /// Markdown cell is graded but not a solution.
    MarkdownNotSolution { grade_id: String },
    /// Markdown cell is a solution but not graded.
    MarkdownNotGraded { source: String },
    /// Two role-bearing cells share one `grade_id`.
    DuplicateGradeId(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGradeId { source } => {
                write!(f, "grading cell does not have a grade_id: {source}")
            }
            Self::EmptyGradeId { source } => write!(f, "grade_id is empty: {source}"),
            Self::MissingPoints { grade_id } => {
                write!(f, "grading cell '{grade_id}' does not have points")
            }
            Self::MarkdownNotSolution { grade_id } => write!(
                f,
                "markdown grade cell '{grade_id}' is not marked as a solution cell"
            ),
            Self::MarkdownNotGraded { source } => write!(
                f,
                "markdown solution cell is not marked as a grade cell: {source}"
            ),
            Self::DuplicateGradeId(grade_id) => write!(f, "duplicate grade id: {grade_id}"),
        }
    }
}

impl Error for ValidationError {}

/// Validator for the current grading schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradingValidator {
    registry: SchemaRegistry,
    migrator: MetadataMigrator,
}

impl GradingValidator {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            migrator: MetadataMigrator::new(registry),
        }
    }

    pub fn schema_version(&self) -> u32 {
        self.registry.current_version()
    }
}
