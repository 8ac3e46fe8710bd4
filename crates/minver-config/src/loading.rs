use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use tracing::debug;

use crate::config::{ConfigOverrides, DEFAULT_CONFIG_FILE, ENV_PREFIX, MinverConfig};
use crate::error::{ConfigError, Result};

impl MinverConfig {
    /// Load and validate the layered configuration.
    ///
    /// An explicit `config_path` must exist; the default `minver.toml` is
    /// optional.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let config: Self = Self::figment(config_path, overrides)?.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The provider stack behind [`MinverConfig::load`].
    pub fn figment(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file(config_path)? {
            debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides)))
    }
}

fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(ConfigError::NotFound(path.to_path_buf())),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            Ok(default_path.is_file().then(|| default_path.to_path_buf()))
        }
    }
}
