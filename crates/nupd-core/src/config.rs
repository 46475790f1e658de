//! Updater settings
//!
//! Every field has a default, so an empty or missing config file is valid.
//!
//! ```toml
//! scratch_dir = "/var/tmp/nupd-scratch"
//! temp_prefix = ".nupd-tmp-"
//!
//! [http]
//! timeout_secs = 30
//! user_agent = "nupd/0.1.0"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use nupd_fs::ScratchArea;
use nupd_fs::constants::DEFAULT_TEMP_PREFIX;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Where displaced files go; the system temp dir when unset
    pub scratch_dir: Option<PathBuf>,

    /// Prefix for staged and evacuated names inside the working root
    pub temp_prefix: String,

    pub http: HttpConfig,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl UpdaterConfig {
    pub fn scratch(&self) -> ScratchArea {
        match &self.scratch_dir {
            Some(dir) => ScratchArea::new(dir.clone()),
            None => ScratchArea::system_default(),
        }
    }
}

/// Transport settings for [`crate::fetch::HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("nupd/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
