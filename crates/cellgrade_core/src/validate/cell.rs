//! Single-cell validation.

use super::{GradingValidator, ValidationError};
use crate::diagnostics::Diagnostics;
use crate::error::GradingResult;
use crate::model::grading::{GradingV1, GRADING_KEY};
use crate::model::notebook::{Cell, CellType};
use serde_json::Value;

impl GradingValidator {
    /// Migrates and validates one cell's grading metadata.
    ///
    /// Returns the typed record, or `None` when the cell carries no grading
    /// metadata.
    ///
    /// # Errors
    /// - Migration errors (`Coercion`, `SchemaNotFound`, `SchemaValidation`).
    /// - `SchemaValidation` when the migrated metadata does not fit the
    ///   current schema.
    /// - `Validation` for the first violated semantic rule.
    pub fn validate_cell(
        &self,
        cell: &mut Cell,
        diagnostics: &mut Diagnostics,
    ) -> GradingResult<Option<GradingV1>> {
        self.migrator.upgrade(cell, diagnostics)?;

        let Some(Value::Object(metadata)) = cell.metadata.get(GRADING_KEY) else {
            return Ok(None);
        };
        self.registry.current().check(metadata)?;
        let record = GradingV1::from_map(metadata)?;

        check_rules(cell, &record)?;
        Ok(Some(record))
    }
}

fn check_rules(cell: &Cell, record: &GradingV1) -> Result<(), ValidationError> {
    let grade_id = record.grade_id.clone().unwrap_or_default();

    if record.has_role() {
        match record.grade_id.as_deref() {
            None => {
                return Err(ValidationError::MissingGradeId {
                    source: cell.source.clone(),
                })
            }
            Some("") => {
                return Err(ValidationError::EmptyGradeId {
                    source: cell.source.clone(),
                })
            }
            Some(_) => {}
        }
    }

    if record.grade && record.points.is_none() {
        return Err(ValidationError::MissingPoints { grade_id });
    }

    if cell.cell_type == CellType::Markdown {
        if record.grade && !record.solution {
            return Err(ValidationError::MarkdownNotSolution { grade_id });
        }
        if record.solution && !record.grade {
            return Err(ValidationError::MarkdownNotGraded {
                source: cell.source.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::Diagnostics;
    use crate::error::GradingError;
    use crate::model::notebook::Cell;
    use crate::validate::{GradingValidator, ValidationError};
    use serde_json::json;

    fn validate(mut cell: Cell) -> Result<Cell, GradingError> {
        let mut diagnostics = Diagnostics::new();
        GradingValidator::default().validate_cell(&mut cell, &mut diagnostics)?;
        Ok(cell)
    }

    #[test]
    fn cell_without_grading_metadata_is_unchanged() {
        let cell = Cell::code("print('hi')");
        let validated = validate(cell.clone()).unwrap();
        assert_eq!(validated, cell);
    }

    #[test]
    fn locked_cell_requires_grade_id() {
        let cell = Cell::code("setup()").with_grading(json!({"locked": true}));
        match validate(cell) {
            Err(GradingError::Validation(ValidationError::MissingGradeId { source })) => {
                assert_eq!(source, "setup()");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_grade_id_is_rejected() {
        let cell = Cell::code("answer = 1")
            .with_grading(json!({"solution": true, "grade_id": ""}));
        let err = validate(cell).unwrap_err();
        assert!(matches!(
            err,
            GradingError::Validation(ValidationError::EmptyGradeId { .. })
        ));
    }

    #[test]
    fn graded_cell_requires_points() {
        let cell = Cell::code("assert f(1) == 2")
            .with_grading(json!({"grade": true, "grade_id": "test_f"}));
        let err = validate(cell).unwrap_err();
        assert_eq!(err.to_string(), "grading cell 'test_f' does not have points");
    }

    #[test]
    fn markdown_solution_without_grade_is_rejected() {
        let cell = Cell::markdown("Explain your answer")
            .with_grading(json!({"solution": true, "grade_id": "essay"}));
        let err = validate(cell).unwrap_err();
        assert!(matches!(
            err,
            GradingError::Validation(ValidationError::MarkdownNotGraded { .. })
        ));
    }

    #[test]
    fn current_record_with_wrong_types_fails_schema_check() {
        let cell = Cell::code("x").with_grading(json!({
            "schema_version": 1,
            "grade": "yes",
            "solution": false,
            "locked": false
        }));
        match validate(cell) {
            Err(GradingError::SchemaValidation(err)) => assert_eq!(err.fields(), vec!["grade"]),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
