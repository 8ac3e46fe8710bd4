//! Configuration for minver.
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. `minver.toml` in the working directory, or an explicit config file
//! 3. `MINVER_*` environment variables (`MINVER_MAX_EXPECTED=Win7`)
//! 4. values given on the command line

mod config;
mod error;
mod loading;

pub use config::{
    ConfigOverrides, DEFAULT_CONFIG_FILE, DEFAULT_STORE_PATH, ENV_PREFIX, MinverConfig,
    OutputFormat,
};
pub use error::{ConfigError, Result};
