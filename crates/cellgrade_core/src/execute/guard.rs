//! Execution guard around an injected `KernelEngine`.

use super::engine::{EngineFault, KernelEngine, KernelLaunch, Resources};
use super::{ExecuteConfig, ExecuteError, IN_MEMORY_HISTORY_ARGUMENT};
use crate::model::notebook::{CellType, Notebook, DEFAULT_KERNEL_NAME};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static PYTHON_KERNEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^python\d*$").expect("valid python kernel regex"));

/// Counts collected after a completed execution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub code_cells: usize,
    /// Code cells whose outputs contain an `error` record.
    pub error_cells: usize,
}

impl ExecutionSummary {
    fn collect(notebook: &Notebook) -> Self {
        let code = notebook
            .cells
            .iter()
            .filter(|cell| cell.cell_type == CellType::Code);
        let (code_cells, error_cells) = code.fold((0, 0), |(total, errors), cell| {
            (total + 1, errors + usize::from(cell.has_error_output()))
        });
        Self {
            code_cells,
            error_cells,
        }
    }
}

/// Runs whole notebooks with bounded patience.
///
/// The guard owns its engine. Policy lives in `ExecuteConfig` and is
/// resolved into a `KernelLaunch` per pass without mutating the config.
pub struct ExecutionGuard<E: KernelEngine> {
    engine: E,
    config: ExecuteConfig,
}

impl<E: KernelEngine> ExecutionGuard<E> {
    /// Creates a guard with the default policy.
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, ExecuteConfig::default())
    }

    pub fn with_config(engine: E, config: ExecuteConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &ExecuteConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Resolves launch parameters for `notebook`.
    ///
    /// Python kernels get in-memory history when no extra arguments were
    /// configured, so concurrent runs do not contend on the history file.
    pub fn launch_for(&self, notebook: &Notebook) -> KernelLaunch {
        let kernel_name = notebook
            .kernel_name()
            .unwrap_or(DEFAULT_KERNEL_NAME)
            .to_string();
        let extra_arguments =
            if self.config.extra_arguments.is_empty() && is_python_kernel(&kernel_name) {
                vec![IN_MEMORY_HISTORY_ARGUMENT.to_string()]
            } else {
                self.config.extra_arguments.clone()
            };

        KernelLaunch {
            kernel_name,
            extra_arguments,
            timeout: self.config.timeout(),
            iopub_timeout: self.config.iopub_timeout(),
            startup_timeout: self.config.startup_timeout(),
            interrupt_on_timeout: self.config.interrupt_on_timeout,
            allow_errors: self.config.allow_errors,
            raise_on_iopub_timeout: self.config.raise_on_iopub_timeout,
        }
    }

    /// Executes every cell of `notebook` through the engine.
    ///
    /// Blocks until the engine returns. Outputs are written into the cells.
    ///
    /// # Errors
    /// - `UnresponsiveKernel` when the engine reports the kernel never
    ///   responded. The pass is not retried.
    /// - `CellExecution` when a cell raised and `allow_errors` is off.
    /// - `KernelLaunch` when the kernel could not be started.
    pub fn run(
        &mut self,
        notebook: &mut Notebook,
        resources: &mut Resources,
    ) -> Result<ExecutionSummary, ExecuteError> {
        let launch = self.launch_for(notebook);
        info!(
            "event=execute_start module=execute status=ok kernel={} cells={}",
            launch.kernel_name,
            notebook.cells.len()
        );

        if let Err(fault) = self.engine.execute(notebook, resources, &launch) {
            return Err(translate_fault(fault, &launch.kernel_name));
        }

        let summary = ExecutionSummary::collect(notebook);
        info!(
            "event=execute_finish module=execute status=ok kernel={} code_cells={} error_cells={}",
            launch.kernel_name, summary.code_cells, summary.error_cells
        );
        Ok(summary)
    }
}

fn is_python_kernel(kernel_name: &str) -> bool {
    PYTHON_KERNEL_RE.is_match(kernel_name)
}

fn translate_fault(fault: EngineFault, kernel_name: &str) -> ExecuteError {
    match fault {
        EngineFault::NoResponse { detail } => {
            error!(
                "event=kernel_unresponsive module=execute status=error kernel={kernel_name}"
            );
            ExecuteError::UnresponsiveKernel {
                kernel_name: kernel_name.to_string(),
                detail,
            }
        }
        EngineFault::CellError {
            cell_index,
            ename,
            evalue,
        } => {
            warn!(
                "event=cell_error module=execute status=error kernel={kernel_name} cell_index={cell_index}"
            );
            ExecuteError::CellExecution {
                cell_index,
                ename,
                evalue,
            }
        }
        EngineFault::Launch { detail } => {
            error!("event=kernel_launch module=execute status=error kernel={kernel_name}");
            ExecuteError::KernelLaunch {
                kernel_name: kernel_name.to_string(),
                detail,
            }
        }
    }
}
