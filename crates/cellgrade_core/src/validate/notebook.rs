//! Notebook-wide validation.

use super::{GradingValidator, ValidationError};
use crate::diagnostics::Diagnostics;
use crate::error::GradingResult;
use crate::format::check_structure;
use crate::model::notebook::Notebook;
use log::{debug, info};
use std::collections::BTreeSet;

impl GradingValidator {
    /// Validates every grading cell and enforces unique `grade_id` values.
    ///
    /// Cells are visited in notebook order. Every cell carrying grading
    /// metadata is migrated and validated; only cells with a grading role
    /// take part in the uniqueness check.
    ///
    /// # Errors
    /// - `Format` when the notebook structure is not supported.
    /// - The first cell-level error, or `DuplicateGradeId` for the first
    ///   repeated identifier.
    pub fn validate_notebook(
        &self,
        notebook: &mut Notebook,
        diagnostics: &mut Diagnostics,
    ) -> GradingResult<()> {
        check_structure(notebook)?;

        let mut seen = BTreeSet::<String>::new();
        let mut graded_cells = 0_usize;
        for (index, cell) in notebook.cells.iter_mut().enumerate() {
            if !cell.has_grading() {
                continue;
            }

            diagnostics.enter_cell(index);
            let outcome = self.validate_cell(cell, diagnostics);
            diagnostics.leave_cell();

            let Some(record) = outcome? else {
                continue;
            };
            if !record.has_role() {
                continue;
            }

            let grade_id = record.grade_id.unwrap_or_default();
            if !seen.insert(grade_id.clone()) {
                debug!(
                    "event=duplicate_grade_id module=validate status=error cell_index={index}"
                );
                return Err(ValidationError::DuplicateGradeId(grade_id).into());
            }
            graded_cells += 1;
        }

        info!(
            "event=notebook_validated module=validate status=ok cells={} graded_cells={} notices={}",
            notebook.cells.len(),
            graded_cells,
            diagnostics.len()
        );
        Ok(())
    }
}
