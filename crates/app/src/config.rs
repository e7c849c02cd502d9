//! Session configuration
//!
//! TOML file under the platform config directory, with environment
//! overrides for the publisher address and event id so a session can be
//! pointed somewhere else without editing the file.

use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use fairfloor_core::{GroupPrices, StallCounts};
use serde::Deserialize;
use uuid::Uuid;

/// Environment override for the publisher address
const ENV_ADDR: &str = "FAIRFLOOR_ADDR";

/// Environment override for the event id
const ENV_EVENT: &str = "FAIRFLOOR_EVENT";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Availability publisher address, host:port
    pub server_addr: String,
    /// Event whose floor plan this session works on
    pub event_id: Uuid,
    /// Run as the organizer host (publisher) instead of a vendor session
    pub host: bool,
    /// Stall counts for host mode layout generation
    pub counts: StallCounts,
    /// Price per size group for host mode
    pub prices: GroupPrices,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: format!("127.0.0.1:{}", fairfloor_net::DEFAULT_PORT),
            event_id: Uuid::nil(),
            host: false,
            counts: StallCounts::new(12, 8, 4),
            prices: GroupPrices {
                small: 500.0,
                medium: 900.0,
                large: 2000.0,
            },
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when no
    /// file exists yet. Environment overrides win over the file.
    pub fn load() -> io::Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var(ENV_ADDR) {
            self.server_addr = addr;
        }
        if let Ok(event) = std::env::var(ENV_EVENT) {
            match Uuid::parse_str(&event) {
                Ok(id) => self.event_id = id,
                Err(e) => tracing::warn!(error = %e, "Ignoring invalid {}", ENV_EVENT),
            }
        }
    }

    fn config_path() -> io::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "fairfloor", "fairfloor").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parses_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server_addr = "10.0.0.5:7410"
event_id = "6e7f3f64-2db7-4a48-9d2e-0f9e5a3c1b22"
host = true

[counts]
SMALL = 4
LARGE = 2

[prices]
SMALL = 250.0
LARGE = 1800.0
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.server_addr, "10.0.0.5:7410");
        assert!(config.host);
        assert_eq!(config.counts, StallCounts::new(4, 0, 2));
        assert_eq!(config.prices.large, 1800.0);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "host = false\n").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.event_id, Uuid::nil());
        assert_eq!(config.counts, Config::default().counts);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "server_addr = [not a string").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
