//! Formfill CLI Library
//!
//! Command-line interface for the Formfill engine: classify a control from
//! its signals, generate synthetic values, or auto-fill a live form.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{ClassifyArgs, Cli, ColorArg, Commands, FillArgs, FormatArg, GenerateArgs};
pub use config::{CliConfig, ColorChoice, OutputFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_report, render_values, Printer};
