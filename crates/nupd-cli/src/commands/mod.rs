//! Command implementations for nupd-cli

pub mod manifest;
pub mod update;

use std::path::Path;

use nupd_core::UpdaterConfig;
use nupd_fs::ConfigStore;
use tracing::debug;

use crate::error::Result;

pub use manifest::run_manifest;
pub use update::{run_check, run_update};

/// Load updater settings.
///
/// An explicit path must exist. Otherwise `<config dir>/nupd/config.toml`
/// is used when present, and defaults when not.
pub fn load_config(explicit: Option<&Path>) -> Result<UpdaterConfig> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config");
        return Ok(ConfigStore::new().load(path)?);
    }

    match dirs::config_dir().map(|dir| dir.join("nupd").join("config.toml")) {
        Some(path) if path.is_file() => {
            debug!(path = %path.display(), "loading config");
            Ok(ConfigStore::new().load(&path)?)
        }
        _ => Ok(UpdaterConfig::default()),
    }
}
