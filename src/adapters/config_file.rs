//! JSON config file adapter.
//!
//! Implements [`ConfigPort`].  A missing file yields defaults; a file that
//! fails to parse or validate is an error rather than a silent fallback,
//! so a typo never points the console at the wrong broker.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::ConsoleConfig;

pub struct JsonConfigAdapter {
    path: PathBuf,
}

impl JsonConfigAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigAdapter {
    fn load(&self) -> Result<ConsoleConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", self.path.display());
                return Ok(ConsoleConfig::default());
            }
            Err(e) => {
                warn!("Config: cannot read {}: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };
        let cfg: ConsoleConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config: {} is not valid: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        info!("Config: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &ConsoleConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;
        fs::write(&self.path, text).map_err(|e| {
            warn!("Config: cannot write {}: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("Config: saved {}", self.path.display());
        Ok(())
    }
}
