//! Command-line front end for `cellgrade_core`.
//!
//! # Responsibility
//! - Validate a notebook file from the shell and print notices.
//! - Report the crate and grading schema versions.
//! - Keep output deterministic for quick local sanity checks.

use cellgrade_core::{read_path_v1, Diagnostics, GradingValidator};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate and validate grading metadata of a notebook
    Validate {
        /// Notebook file (.ipynb)
        path: PathBuf,
    },
    /// Print the core crate and grading schema versions
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = cellgrade_core::init_logging(cellgrade_core::default_log_level(), log_dir)
        {
            eprintln!("warning: {err}");
        }
    }

    match cli.command {
        Commands::Version => {
            println!(
                "cellgrade_core version={} schema_version={}",
                cellgrade_core::core_version(),
                GradingValidator::default().schema_version()
            );
            ExitCode::SUCCESS
        }
        Commands::Validate { path } => {
            let mut diagnostics = Diagnostics::new();
            let outcome = read_path_v1(&path, &mut diagnostics);
            for notice in diagnostics.notices() {
                println!("warning: {notice}");
            }
            match outcome {
                Ok(notebook) => {
                    println!("ok: {} cells in {}", notebook.cells.len(), path.display());
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    log::error!("event=cli_validate module=cli status=error");
                    eprintln!("error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
