use cellgrade_core::{Cell, Diagnostics, MetadataMigrator, MigrationError, NoticeKind};
use serde_json::{json, Value};

fn upgrade(cell: &mut Cell) -> Result<Diagnostics, MigrationError> {
    let mut diagnostics = Diagnostics::new();
    MetadataMigrator::default().upgrade(cell, &mut diagnostics)?;
    Ok(diagnostics)
}

fn grading_points(points: Value) -> Cell {
    Cell::code("assert answer == 42").with_grading(json!({
        "grade": true,
        "grade_id": "answer",
        "points": points
    }))
}

#[test]
fn cell_without_grading_metadata_is_untouched() {
    let mut cell = Cell::markdown("# Intro");
    cell.metadata.insert("tags".to_string(), json!(["intro"]));
    let before = cell.clone();

    let diagnostics = upgrade(&mut cell).unwrap();

    assert_eq!(cell, before);
    assert!(diagnostics.is_empty());
}

#[test]
fn legacy_record_gains_flags_and_version() {
    let mut cell = Cell::code("x").with_grading(json!({"solution": true, "grade_id": "sol"}));
    upgrade(&mut cell).unwrap();

    assert_eq!(
        cell.grading().unwrap(),
        &json!({
            "solution": true,
            "grade_id": "sol",
            "grade": false,
            "locked": false,
            "schema_version": 1
        })
    );
}

#[test]
fn upgrade_is_idempotent() {
    let mut cell = Cell::code("x").with_grading(json!({
        "grade": true,
        "grade_id": "q1",
        "points": "3",
        "comment": "old"
    }));
    upgrade(&mut cell).unwrap();
    let once = cell.clone();

    let diagnostics = upgrade(&mut cell).unwrap();

    assert_eq!(cell, once);
    assert!(diagnostics.is_empty());
}

#[test]
fn roleless_record_drops_grade_id_and_points() {
    let mut cell = Cell::code("x").with_grading(json!({
        "grade": false,
        "solution": false,
        "locked": false,
        "grade_id": "orphan",
        "points": 4
    }));
    upgrade(&mut cell).unwrap();

    let grading = cell.grading().unwrap();
    assert!(grading.get("grade_id").is_none());
    assert!(grading.get("points").is_none());
    assert_eq!(grading["schema_version"], 1);
}

#[test]
fn points_are_coerced_to_floats() {
    let mut empty = grading_points(json!(""));
    upgrade(&mut empty).unwrap();
    assert_eq!(empty.grading().unwrap()["points"], json!(0.0));

    let mut numeric = grading_points(json!("5"));
    upgrade(&mut numeric).unwrap();
    assert_eq!(numeric.grading().unwrap()["points"], json!(5.0));

    let mut integer = grading_points(json!(2));
    upgrade(&mut integer).unwrap();
    assert!(integer.grading().unwrap()["points"].is_f64());
}

#[test]
fn non_numeric_points_fail_with_coercion_error() {
    let mut cell = grading_points(json!("abc"));
    let err = upgrade(&mut cell).unwrap_err();

    match err {
        MigrationError::Coercion(coercion) => assert_eq!(coercion.value, json!("abc")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(cell, grading_points(json!("abc")));
}

#[test]
fn extra_keys_are_stripped_with_notice() {
    let mut cell = Cell::code("x").with_grading(json!({
        "locked": true,
        "grade_id": "setup",
        "zeta": 1,
        "alpha": "a"
    }));
    let diagnostics = upgrade(&mut cell).unwrap();

    let grading = cell.grading().unwrap();
    assert!(grading.get("zeta").is_none());
    assert!(grading.get("alpha").is_none());
    assert_eq!(
        diagnostics.notices().last().unwrap().kind,
        NoticeKind::ExtraKeysRemoved(vec!["alpha".to_string(), "zeta".to_string()])
    );
}

#[test]
fn newer_schema_version_is_rejected() {
    let mut cell = Cell::code("x").with_grading(json!({
        "schema_version": 3,
        "grade": false,
        "solution": false,
        "locked": false
    }));
    let before = cell.clone();

    let err = upgrade(&mut cell).unwrap_err();

    match err {
        MigrationError::SchemaNotFound(not_found) => {
            assert_eq!(not_found.version, 3);
            assert_eq!(not_found.latest_supported, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(cell, before);
}
