//! Guarded notebook execution.
//!
//! # Responsibility
//! - Hold the kernel patience policy applied to every execution pass.
//! - Translate the engine's "kernel did not respond" fault into a stable
//!   `ExecuteError::UnresponsiveKernel`.
//!
//! # Invariants
//! - No retries happen inside this module.
//! - Only `EngineFault::NoResponse` becomes `UnresponsiveKernel`.
//! - In-cell errors are recorded as outputs while `allow_errors` is on.

mod engine;
mod guard;

pub use engine::{EngineFault, KernelEngine, KernelLaunch, Resources};
pub use guard::{ExecutionGuard, ExecutionSummary};

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Default seconds of output-channel silence tolerated after a cell finishes.
pub const DEFAULT_IOPUB_TIMEOUT_SECS: u64 = 4;
/// Default seconds allowed for a kernel to become ready.
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 60;
/// Kernel argument that keeps IPython history in memory.
pub const IN_MEMORY_HISTORY_ARGUMENT: &str = "--HistoryManager.hist_file=:memory:";

/// Execution policy.
///
/// Every field has a default, so partial JSON documents are accepted.
/// Unknown keys are rejected so a misspelled policy never falls back silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecuteConfig {
    /// Interrupt a stalled cell instead of leaving it running.
    pub interrupt_on_timeout: bool,
    /// Record in-cell errors as outputs and keep going.
    pub allow_errors: bool,
    /// Treat output-channel silence past `iopub_timeout_secs` as a fault.
    pub raise_on_iopub_timeout: bool,
    /// Extra kernel arguments. Empty means "use the kernel's default".
    pub extra_arguments: Vec<String>,
    /// Per-cell wall-clock limit, owned by the caller. `None` waits forever.
    pub timeout_secs: Option<u64>,
    pub iopub_timeout_secs: u64,
    pub startup_timeout_secs: u64,
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        Self {
            interrupt_on_timeout: true,
            allow_errors: true,
            raise_on_iopub_timeout: true,
            extra_arguments: Vec::new(),
            timeout_secs: None,
            iopub_timeout_secs: DEFAULT_IOPUB_TIMEOUT_SECS,
            startup_timeout_secs: DEFAULT_STARTUP_TIMEOUT_SECS,
        }
    }
}

impl ExecuteConfig {
    /// Parses a JSON policy document; missing fields take their defaults.
    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn iopub_timeout(&self) -> Duration {
        Duration::from_secs(self.iopub_timeout_secs)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

/// Failure of a guarded execution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    /// The kernel failed to respond at all.
    UnresponsiveKernel { kernel_name: String, detail: String },
    /// A cell raised while `allow_errors` was off.
    CellExecution {
        cell_index: usize,
        ename: String,
        evalue: String,
    },
    /// The kernel could not be started.
    KernelLaunch { kernel_name: String, detail: String },
}

impl Display for ExecuteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresponsiveKernel {
                kernel_name,
                detail,
            } => write!(f, "kernel `{kernel_name}` is unresponsive: {detail}"),
            Self::CellExecution {
                cell_index,
                ename,
                evalue,
            } => write!(f, "cell {cell_index} raised {ename}: {evalue}"),
            Self::KernelLaunch {
                kernel_name,
                detail,
            } => write!(f, "kernel `{kernel_name}` failed to start: {detail}"),
        }
    }
}

impl Error for ExecuteError {}
