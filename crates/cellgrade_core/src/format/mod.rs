//! Notebook JSON interchange.
//!
//! # Responsibility
//! - Deserialize and serialize notebooks as nbformat v4 JSON.
//! - Reject structurally unsupported documents with `FormatError`.
//!
//! # Invariants
//! - Fields not modelled by `Notebook`/`Cell` survive a read/write cycle.
//! - `source` given as a list of lines is joined on read and written back as
//!   one string; the text is unchanged, the JSON layout is not.
//! - Only major format version 4 is accepted.

mod validated;

pub use validated::{read_path_v1, read_v1, reads_v1, write_path_v1, write_v1, writes_v1};

use crate::model::notebook::Notebook;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};

/// Major notebook format version this crate understands.
pub const SUPPORTED_NBFORMAT: u32 = 4;

/// Malformed or unsupported notebook document.
#[derive(Debug)]
pub enum FormatError {
    Json(serde_json::Error),
    Io(std::io::Error),
    UnsupportedVersion { nbformat: u32 },
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed notebook JSON: {err}"),
            Self::Io(err) => write!(f, "notebook I/O failed: {err}"),
            Self::UnsupportedVersion { nbformat } => write!(
                f,
                "notebook format version {nbformat} is not supported (expected {SUPPORTED_NBFORMAT})"
            ),
        }
    }
}

impl Error for FormatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(value: serde_json::Error) -> Self {
        if value.is_io() {
            return Self::Io(value.into());
        }
        Self::Json(value)
    }
}

impl From<std::io::Error> for FormatError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Checks document-level structure beyond JSON shape.
///
/// # Errors
/// - Returns `UnsupportedVersion` when `nbformat` is not 4.
pub fn check_structure(notebook: &Notebook) -> Result<(), FormatError> {
    if notebook.nbformat != SUPPORTED_NBFORMAT {
        return Err(FormatError::UnsupportedVersion {
            nbformat: notebook.nbformat,
        });
    }
    Ok(())
}

/// Reads a notebook from a byte stream without grading validation.
pub fn read(reader: impl Read) -> Result<Notebook, FormatError> {
    let notebook: Notebook = serde_json::from_reader(reader)?;
    check_structure(&notebook)?;
    Ok(notebook)
}

/// Reads a notebook from a string without grading validation.
pub fn reads(source: &str) -> Result<Notebook, FormatError> {
    let notebook: Notebook = serde_json::from_str(source)?;
    check_structure(&notebook)?;
    Ok(notebook)
}

/// Writes a notebook to a byte stream as indented JSON with a trailing newline.
pub fn write(notebook: &Notebook, mut writer: impl Write) -> Result<(), FormatError> {
    serde_json::to_writer_pretty(&mut writer, notebook)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Serializes a notebook to an indented JSON string.
pub fn writes(notebook: &Notebook) -> Result<String, FormatError> {
    let mut text = serde_json::to_string_pretty(notebook)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{reads, writes, FormatError};
    use serde_json::json;

    #[test]
    fn reads_rejects_malformed_json() {
        let err = reads("{not json").unwrap_err();
        assert!(matches!(err, FormatError::Json(_)));
    }

    #[test]
    fn reads_rejects_missing_cells() {
        let err = reads(r#"{"nbformat": 4, "nbformat_minor": 5, "metadata": {}}"#).unwrap_err();
        assert!(matches!(err, FormatError::Json(_)));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let source = json!({
            "cells": [{
                "cell_type": "code",
                "id": "abc123",
                "source": "x = 1",
                "metadata": {"tags": ["setup"]},
                "outputs": [],
                "execution_count": null
            }],
            "metadata": {"kernelspec": {"name": "python3", "display_name": "Python 3"}},
            "nbformat": 4,
            "nbformat_minor": 5
        });

        let notebook = reads(&source.to_string()).unwrap();
        let written: serde_json::Value = serde_json::from_str(&writes(&notebook).unwrap()).unwrap();
        assert_eq!(written, source);
    }

    #[test]
    fn source_lines_are_written_back_as_one_string() {
        let source = json!({
            "cells": [{"cell_type": "markdown", "source": ["a\n", "b"], "metadata": {}}],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5
        });

        let notebook = reads(&source.to_string()).unwrap();
        assert_eq!(notebook.cells[0].source, "a\nb");

        let written: serde_json::Value = serde_json::from_str(&writes(&notebook).unwrap()).unwrap();
        assert_eq!(written["cells"][0]["source"], json!("a\nb"));
    }
}
