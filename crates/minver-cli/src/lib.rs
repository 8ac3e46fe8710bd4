//! Command-line interface of minver.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `check` and `build-store`
//! - [`render`] - text and JSON reports
//! - [`error`] - CLI errors and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status messages on stderr

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod render;
pub mod ui;

pub use error::{CliError, Result};
