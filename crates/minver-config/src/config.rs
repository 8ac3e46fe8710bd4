use std::path::PathBuf;

use minver::{CheckOptions, DEFAULT_NO_RECURSE_PATTERN, VersionThreshold};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// File looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "minver.toml";

/// Prefix of environment variables merged into the configuration.
pub const ENV_PREFIX: &str = "MINVER_";

pub const DEFAULT_STORE_PATH: &str = "symbols.redb";

/// Report rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Effective minver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinverConfig {
    /// Persisted symbol store
    pub store_path: PathBuf,

    /// Extracted API documentation tree used to (re)build the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<PathBuf>,

    /// Highest release or build a binary may require (`Win7`, `Win10_1809`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_expected: Option<String>,

    /// Modules no symbol may be imported from
    pub disallowed_modules: Vec<String>,

    /// Path fragments of modules whose imports are not walked
    pub no_recurse_patterns: Vec<String>,

    pub format: OutputFormat,
}

impl Default for MinverConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            docs_dir: None,
            max_expected: None,
            disallowed_modules: Vec::new(),
            no_recurse_patterns: vec![DEFAULT_NO_RECURSE_PATTERN.to_string()],
            format: OutputFormat::Text,
        }
    }
}

impl MinverConfig {
    /// Reject values that only fail once a check runs.
    pub fn validate(&self) -> Result<()> {
        self.threshold()?;

        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store_path",
                value: String::new(),
            });
        }

        Ok(())
    }

    /// Parsed `max_expected`.
    pub fn threshold(&self) -> Result<Option<VersionThreshold>> {
        self.max_expected
            .as_deref()
            .map(|raw| {
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "max_expected",
                    value: raw.to_string(),
                })
            })
            .transpose()
    }

    pub fn check_options(&self) -> Result<CheckOptions> {
        Ok(CheckOptions {
            max_allowed: self.threshold()?,
            disallowed_modules: self.disallowed_modules.clone(),
        })
    }
}

/// Values given explicitly on the command line.
///
/// Unset fields leave the lower layers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_expected: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disallowed_modules: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_recurse_patterns: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}
