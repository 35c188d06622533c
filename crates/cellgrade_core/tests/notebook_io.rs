use cellgrade_core::format;
use cellgrade_core::{
    read_path_v1, reads_v1, write_path_v1, writes_v1, Cell, Diagnostics, GradingError, Notebook,
};
use serde_json::json;

fn assignment() -> Notebook {
    let mut notebook = Notebook::with_cells(vec![
        Cell::markdown("# Homework 1"),
        Cell::code("def square(x):\n    raise NotImplementedError()")
            .with_grading(json!({"solution": true, "grade_id": "square"})),
        Cell::code("assert square(3) == 9").with_grading(json!({
            "grade": true,
            "grade_id": "test_square",
            "points": "2"
        })),
    ]);
    notebook.set_kernel_name("python3");
    notebook
}

#[test]
fn write_then_read_keeps_grading_metadata() {
    let mut notebook = assignment();
    let text = writes_v1(&mut notebook, &mut Diagnostics::new()).unwrap();

    let mut diagnostics = Diagnostics::new();
    let read_back = reads_v1(&text, &mut diagnostics).unwrap();

    assert!(diagnostics.is_empty());
    assert_eq!(read_back, notebook);
    assert_eq!(read_back.cells[2].grading().unwrap()["points"], json!(2.0));
}

#[test]
fn file_round_trip_through_tempdir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("homework.ipynb");
    let mut notebook = assignment();

    write_path_v1(&mut notebook, &path, &mut Diagnostics::new()).unwrap();
    let read_back = read_path_v1(&path, &mut Diagnostics::new()).unwrap();

    assert_eq!(read_back, notebook);
    assert_eq!(read_back.kernel_name(), Some("python3"));
}

#[test]
fn invalid_notebook_is_never_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ipynb");
    let mut notebook = Notebook::with_cells(vec![
        Cell::code("a").with_grading(json!({"locked": true, "grade_id": "same"})),
        Cell::code("b").with_grading(json!({"locked": true, "grade_id": "same"})),
    ]);

    let err = write_path_v1(&mut notebook, &path, &mut Diagnostics::new()).unwrap_err();

    assert!(matches!(err, GradingError::Validation(_)));
    assert!(!path.exists());
}

#[test]
fn read_rejects_invalid_grading_metadata() {
    let source = json!({
        "cells": [{
            "cell_type": "markdown",
            "source": ["Answer ", "below"],
            "metadata": {"nbgrader": {"solution": true, "grade_id": "md"}}
        }],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 4
    });

    let err = reads_v1(&source.to_string(), &mut Diagnostics::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "markdown solution cell is not marked as a grade cell: Answer below"
    );
}

#[test]
fn read_surfaces_format_errors() {
    let source = r#"{"cells": [], "metadata": {}, "nbformat": 3, "nbformat_minor": 0}"#;
    let err = reads_v1(source, &mut Diagnostics::new()).unwrap_err();
    assert!(matches!(
        err,
        GradingError::Format(format::FormatError::UnsupportedVersion { nbformat: 3 })
    ));
}
