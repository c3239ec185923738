//! Subcommands.

pub mod batch;
pub mod config;
pub mod process;
pub mod stats;

use std::path::{Path, PathBuf};

use tracing::debug;

use talao_core::TalaoConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("talao")
        .join("config.json")
}

/// Resolve the config file: the explicit path if given, else the default path.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
///
/// An explicitly given path must exist.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TalaoConfig> {
    if let Some(path) = config_path {
        return Ok(TalaoConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(TalaoConfig::from_file(&path)?)
    } else {
        Ok(TalaoConfig::default())
    }
}
