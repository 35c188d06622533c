//! Read/write entry points that validate grading metadata.
//!
//! Reads validate before handing the notebook back; writes validate before
//! serializing, so an invalid notebook is never persisted.

use super::{read, reads, write, writes};
use crate::diagnostics::Diagnostics;
use crate::error::GradingResult;
use crate::model::notebook::Notebook;
use crate::validate::GradingValidator;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Reads and validates a notebook from a byte stream.
pub fn read_v1(reader: impl Read, diagnostics: &mut Diagnostics) -> GradingResult<Notebook> {
    let mut notebook = read(reader)?;
    GradingValidator::default().validate_notebook(&mut notebook, diagnostics)?;
    Ok(notebook)
}

/// Reads and validates a notebook from a string.
pub fn reads_v1(source: &str, diagnostics: &mut Diagnostics) -> GradingResult<Notebook> {
    let mut notebook = reads(source)?;
    GradingValidator::default().validate_notebook(&mut notebook, diagnostics)?;
    Ok(notebook)
}

/// Validates, then writes a notebook to a byte stream.
///
/// Migration may update `notebook` in place before it is written.
pub fn write_v1(
    notebook: &mut Notebook,
    writer: impl Write,
    diagnostics: &mut Diagnostics,
) -> GradingResult<()> {
    GradingValidator::default().validate_notebook(notebook, diagnostics)?;
    write(notebook, writer)?;
    Ok(())
}

/// Validates, then serializes a notebook to a string.
pub fn writes_v1(notebook: &mut Notebook, diagnostics: &mut Diagnostics) -> GradingResult<String> {
    GradingValidator::default().validate_notebook(notebook, diagnostics)?;
    Ok(writes(notebook)?)
}

/// Reads and validates a notebook file.
pub fn read_path_v1(path: &Path, diagnostics: &mut Diagnostics) -> GradingResult<Notebook> {
    let file = File::open(path).map_err(super::FormatError::from)?;
    read_v1(BufReader::new(file), diagnostics)
}

/// Validates, then writes a notebook file.
///
/// The file is not created when validation fails.
pub fn write_path_v1(
    notebook: &mut Notebook,
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> GradingResult<()> {
    GradingValidator::default().validate_notebook(notebook, diagnostics)?;
    let file = File::create(path).map_err(super::FormatError::from)?;
    write(notebook, BufWriter::new(file))?;
    Ok(())
}
