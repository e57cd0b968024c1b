//! Client configuration loaded from `~/.rollcall/config.toml`.
//!
//! Every key is optional:
//!
//! ```toml
//! server_url = "http://chapter-pi.local:3000"
//! poll_interval_secs = 5
//! roster = ["Alex Nania", "DJ"]
//!
//! [quorum]
//! night_minimum = 18
//! ```
//!
//! `ROLLCALL_SERVER_URL` overrides `server_url`.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RollcallError};
use crate::quorum::QuorumPolicy;
use crate::roster::Roster;
use crate::storage::StorageConfig;
use crate::sync::DEFAULT_POLL_INTERVAL;

pub const SERVER_URL_ENV: &str = "ROLLCALL_SERVER_URL";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub poll_interval_secs: u64,
    pub roster: Roster,
    pub quorum: QuorumPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            roster: Roster::default(),
            quorum: QuorumPolicy::default(),
        }
    }
}

impl Config {
    /// Loads the config file, returning defaults if it doesn't exist.
    pub fn load(storage: &StorageConfig) -> Result<Self> {
        let path = storage.config_file();
        let mut config = match fs_err::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|err| RollcallError::ConfigMalformed {
                    path: path.clone(),
                    details: err.to_string(),
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(source) => {
                return Err(RollcallError::Io {
                    context: format!("reading {}", path.display()),
                    source,
                })
            }
        };

        if let Ok(url) = env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                config.server_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    /// Zero falls back to the default interval.
    pub fn poll_interval(&self) -> Duration {
        if self.poll_interval_secs == 0 {
            DEFAULT_POLL_INTERVAL
        } else {
            Duration::from_secs(self.poll_interval_secs)
        }
    }
}
