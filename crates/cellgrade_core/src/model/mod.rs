//! Notebook and grading metadata model.
//!
//! # Responsibility
//! - Define the notebook, cell, and grading record shapes used by core logic.
//! - Keep the persisted grading field names in one place.
//!
//! # Invariants
//! - Grading metadata lives under the reserved `nbgrader` cell metadata key.
//! - Validation mutates cell metadata in place; notebooks are owned by callers.

pub mod grading;
pub mod notebook;
