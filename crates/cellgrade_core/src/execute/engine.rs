//! Contract for the external kernel-execution engine.

use crate::model::notebook::{JsonObject, Notebook};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Side-channel values passed to and updated by an execution pass.
pub type Resources = JsonObject;

/// Resolved launch parameters for one execution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelLaunch {
    pub kernel_name: String,
    pub extra_arguments: Vec<String>,
    pub timeout: Option<Duration>,
    pub iopub_timeout: Duration,
    pub startup_timeout: Duration,
    pub interrupt_on_timeout: bool,
    pub allow_errors: bool,
    pub raise_on_iopub_timeout: bool,
}

/// Faults raised by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFault {
    /// The kernel produced no response within the engine's patience window.
    NoResponse { detail: String },
    /// A cell raised and `allow_errors` was off.
    CellError {
        cell_index: usize,
        ename: String,
        evalue: String,
    },
    /// The kernel process could not be started.
    Launch { detail: String },
}

impl Display for EngineFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoResponse { detail } => write!(f, "kernel did not respond: {detail}"),
            Self::CellError {
                cell_index,
                ename,
                evalue,
            } => write!(f, "cell {cell_index} raised {ename}: {evalue}"),
            Self::Launch { detail } => write!(f, "kernel launch failed: {detail}"),
        }
    }
}

impl Error for EngineFault {}

/// Cell-by-cell notebook runner backed by a kernel process.
///
/// Implementations own kernel startup, message I/O, timeouts, and interrupts.
/// They write outputs into the notebook cells and may update `resources`.
pub trait KernelEngine {
    fn execute(
        &mut self,
        notebook: &mut Notebook,
        resources: &mut Resources,
        launch: &KernelLaunch,
    ) -> Result<(), EngineFault>;
}

impl<E: KernelEngine + ?Sized> KernelEngine for Box<E> {
    fn execute(
        &mut self,
        notebook: &mut Notebook,
        resources: &mut Resources,
        launch: &KernelLaunch,
    ) -> Result<(), EngineFault> {
        (**self).execute(notebook, resources, launch)
    }
}
