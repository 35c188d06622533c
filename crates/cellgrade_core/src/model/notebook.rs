//! Notebook document model.
//!
//! # Responsibility
//! - Define the in-memory shape of a notebook and its cells.
//! - Preserve fields this crate does not interpret across read/write.
//!
//! # Invariants
//! - Cell identity is positional; cells have no lifecycle outside their notebook.
//! - `source` is always held as one string, regardless of the on-disk form.

use crate::model::grading::GRADING_KEY;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Notebook-level JSON object (`metadata`, extra fields).
pub type JsonObject = Map<String, Value>;

/// Kernel assumed when a notebook does not declare `kernelspec.name`.
pub const DEFAULT_KERNEL_NAME: &str = "python";

const OUTPUTS_KEY: &str = "outputs";
const EXECUTION_COUNT_KEY: &str = "execution_count";

/// Kind of a notebook cell.
///
/// Unknown kinds are kept verbatim so they survive a round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
    Other(String),
}

impl From<String> for CellType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "code" => Self::Code,
            "markdown" => Self::Markdown,
            "raw" => Self::Raw,
            _ => Self::Other(value),
        }
    }
}

impl From<CellType> for String {
    fn from(value: CellType) -> Self {
        match value {
            CellType::Code => "code".to_string(),
            CellType::Markdown => "markdown".to_string(),
            CellType::Raw => "raw".to_string(),
            CellType::Other(kind) => kind,
        }
    }
}

/// One notebook cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
    /// Joined source text. Accepts either a string or a list of lines on read.
    #[serde(deserialize_with = "deserialize_source")]
    pub source: String,
    #[serde(default)]
    pub metadata: JsonObject,
    /// Fields not modelled here (`outputs`, `execution_count`, `id`, ...).
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Cell {
    /// Creates a cell with empty metadata.
    ///
    /// Code cells start with empty `outputs` and a null `execution_count`.
    pub fn new(cell_type: CellType, source: impl Into<String>) -> Self {
        let mut extra = JsonObject::new();
        if cell_type == CellType::Code {
            extra.insert(OUTPUTS_KEY.to_string(), Value::Array(Vec::new()));
            extra.insert(EXECUTION_COUNT_KEY.to_string(), Value::Null);
        }
        Self {
            cell_type,
            source: source.into(),
            metadata: JsonObject::new(),
            extra,
        }
    }

    /// Creates a code cell.
    pub fn code(source: impl Into<String>) -> Self {
        Self::new(CellType::Code, source)
    }

    /// Creates a markdown cell.
    pub fn markdown(source: impl Into<String>) -> Self {
        Self::new(CellType::Markdown, source)
    }

    /// Attaches a grading metadata object, replacing any existing one.
    pub fn with_grading(mut self, grading: Value) -> Self {
        self.metadata.insert(GRADING_KEY.to_string(), grading);
        self
    }

    /// Returns the raw grading metadata value, if any.
    pub fn grading(&self) -> Option<&Value> {
        self.metadata.get(GRADING_KEY)
    }

    pub fn has_grading(&self) -> bool {
        self.metadata.contains_key(GRADING_KEY)
    }

    /// Returns recorded outputs. Empty for cells without an `outputs` array.
    pub fn outputs(&self) -> &[Value] {
        self.extra
            .get(OUTPUTS_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends one output record, creating the `outputs` array if needed.
    pub fn push_output(&mut self, output: Value) {
        let slot = self
            .extra
            .entry(OUTPUTS_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(output);
        }
    }

    /// Drops previous outputs and execution count.
    pub fn clear_outputs(&mut self) {
        self.extra
            .insert(OUTPUTS_KEY.to_string(), Value::Array(Vec::new()));
        self.extra
            .insert(EXECUTION_COUNT_KEY.to_string(), Value::Null);
    }

    pub fn execution_count(&self) -> Option<u64> {
        self.extra.get(EXECUTION_COUNT_KEY).and_then(Value::as_u64)
    }

    pub fn set_execution_count(&mut self, count: u64) {
        self.extra
            .insert(EXECUTION_COUNT_KEY.to_string(), Value::from(count));
    }

    /// Whether any recorded output is an `error` output.
    pub fn has_error_output(&self) -> bool {
        self.outputs()
            .iter()
            .any(|output| output.get("output_type").and_then(Value::as_str) == Some("error"))
    }
}

/// Notebook document: ordered cells plus top-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: JsonObject,
    pub nbformat: u32,
    pub nbformat_minor: u32,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Notebook {
    /// Creates an empty v4 notebook.
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            metadata: JsonObject::new(),
            nbformat: 4,
            nbformat_minor: 5,
            extra: JsonObject::new(),
        }
    }

    /// Creates a v4 notebook holding the given cells.
    pub fn with_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Self::new()
        }
    }

    /// Returns `metadata.kernelspec.name` when declared.
    pub fn kernel_name(&self) -> Option<&str> {
        self.metadata
            .get("kernelspec")
            .and_then(|spec| spec.get("name"))
            .and_then(Value::as_str)
    }

    /// Sets `metadata.kernelspec.name`, keeping other kernelspec fields.
    pub fn set_kernel_name(&mut self, name: impl Into<String>) {
        let spec = self
            .metadata
            .entry("kernelspec")
            .or_insert_with(|| Value::Object(JsonObject::new()));
        if !spec.is_object() {
            *spec = Value::Object(JsonObject::new());
        }
        if let Value::Object(fields) = spec {
            fields.insert("name".to_string(), Value::String(name.into()));
        }
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceRepr {
    Text(String),
    Lines(Vec<String>),
}

fn deserialize_source<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match SourceRepr::deserialize(deserializer)? {
        SourceRepr::Text(text) => text,
        SourceRepr::Lines(lines) => lines.concat(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Cell, CellType, Notebook};
    use serde_json::json;

    #[test]
    fn source_lines_are_joined_on_read() {
        let cell: Cell = serde_json::from_value(json!({
            "cell_type": "code",
            "source": ["a = 1\n", "b = 2"],
            "metadata": {},
            "outputs": [],
            "execution_count": null
        }))
        .unwrap();
        assert_eq!(cell.source, "a = 1\nb = 2");
        assert_eq!(cell.cell_type, CellType::Code);
    }

    #[test]
    fn unknown_cell_type_survives_round_trip() {
        let cell: Cell = serde_json::from_value(json!({
            "cell_type": "heading",
            "source": "# Title",
            "metadata": {}
        }))
        .unwrap();
        assert_eq!(cell.cell_type, CellType::Other("heading".to_string()));

        let value = serde_json::to_value(&cell).unwrap();
        assert_eq!(value["cell_type"], "heading");
    }

    #[test]
    fn push_output_and_detect_errors() {
        let mut cell = Cell::code("1 / 0");
        assert!(!cell.has_error_output());

        cell.push_output(json!({"output_type": "stream", "name": "stdout", "text": "hi"}));
        cell.push_output(json!({"output_type": "error", "ename": "ZeroDivisionError"}));
        cell.set_execution_count(1);

        assert_eq!(cell.outputs().len(), 2);
        assert!(cell.has_error_output());
        assert_eq!(cell.execution_count(), Some(1));

        cell.clear_outputs();
        assert!(cell.outputs().is_empty());
        assert_eq!(cell.execution_count(), None);
    }

    #[test]
    fn kernel_name_reads_and_writes_kernelspec() {
        let mut notebook = Notebook::new();
        assert_eq!(notebook.kernel_name(), None);

        notebook.set_kernel_name("python3");
        assert_eq!(notebook.kernel_name(), Some("python3"));
    }
}
