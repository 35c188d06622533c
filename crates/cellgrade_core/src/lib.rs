//! Grading metadata validation and guarded notebook execution.
//! This crate is the single source of truth for grading metadata invariants.

pub mod diagnostics;
pub mod error;
pub mod execute;
pub mod format;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod schema;
pub mod validate;

pub use diagnostics::{Diagnostics, Notice, NoticeKind};
pub use error::{GradingError, GradingResult};
pub use execute::{
    EngineFault, ExecuteConfig, ExecuteError, ExecutionGuard, ExecutionSummary, KernelEngine,
    KernelLaunch, Resources,
};
pub use format::{
    read_path_v1, read_v1, reads_v1, write_path_v1, write_v1, writes_v1, FormatError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use migrate::{CoercionError, MetadataMigrator, MigrationError};
pub use model::grading::{GradingV1, GRADING_KEY};
pub use model::notebook::{Cell, CellType, Notebook};
pub use schema::{
    FieldViolation, Schema, SchemaNotFoundError, SchemaRegistry, SchemaValidationError,
    ViolationReason,
};
pub use validate::{GradingValidator, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
