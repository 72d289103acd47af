//! Boardink Application
//!
//! Headless host for the board engine: command-line parsing, configuration,
//! scripted input replay and export delivery.

mod app;
pub mod config;
pub mod script;

pub use app::{App, AppError, RunSummary};
pub use config::{AppConfig, CliArgs, ExportSettings};
pub use script::{ReplayStats, Script, ScriptStep};
