//! Non-fatal notices raised while migrating or validating metadata.
//!
//! # Responsibility
//! - Collect warnings next to the operation result instead of relying on
//!   ambient logger state.
//! - Mirror every notice to the `log` facade at `warn` level.
//!
//! # Invariants
//! - Notices never abort processing.
//! - Notices are kept in the order they were raised.

use log::warn;
use std::fmt::{Display, Formatter};

/// Category of a non-fatal notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    /// Grading metadata carried no `schema_version`; version 0 was assumed.
    AssumedLegacyVersion,
    /// Keys outside the current schema were stripped from the metadata.
    ExtraKeysRemoved(Vec<String>),
}

/// One non-fatal notice, optionally tied to a cell position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    /// Position of the cell in its notebook, when known.
    pub cell_index: Option<usize>,
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(index) = self.cell_index {
            write!(f, "cell {index}: ")?;
        }
        match &self.kind {
            NoticeKind::AssumedLegacyVersion => {
                write!(f, "schema_version is not defined, assuming version 0")
            }
            NoticeKind::ExtraKeysRemoved(keys) => write!(
                f,
                "extra keys detected in metadata, these will be removed: {}",
                keys.join(", ")
            ),
        }
    }
}

/// Collector for notices raised during one validation or migration pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    notices: Vec<Notice>,
    cell_index: Option<usize>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a notice against the current cell scope.
    pub fn push(&mut self, kind: NoticeKind) {
        let notice = Notice {
            kind,
            cell_index: self.cell_index,
        };
        warn!("event=metadata_notice module=diagnostics status=warn detail=\"{notice}\"");
        self.notices.push(notice);
    }

    /// Scopes subsequent notices to the given cell position.
    pub(crate) fn enter_cell(&mut self, index: usize) {
        self.cell_index = Some(index);
    }

    pub(crate) fn leave_cell(&mut self) {
        self.cell_index = None;
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
