//! Config file.
//!
//! YAML, all sections optional:
//!
//! ```yaml
//! link:
//!   host: 192.168.1.20
//!   ack_timeout_ms: 1500
//! upload:
//!   verify: true
//!   select_import: false
//!   require_user_mode: true
//!   power_on: false
//! record: living-room.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use projgamma_link::{LinkConfig, UploadOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Looked for in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG: &str = "projgamma.yaml";

/// Settings read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Projector address and timeouts.
    pub link: LinkConfig,
    /// Upload checks.
    pub upload: UploadOptions,
    /// Parameter record to start from.
    pub record: Option<PathBuf>,
}

impl CliConfig {
    /// Reads `explicit`, or [`DEFAULT_CONFIG`] in `dir` if it exists.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let path = dir.join(DEFAULT_CONFIG);
                if path.is_file() {
                    Self::read(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        // a relative record path is relative to the config file
        if let (Some(record), Some(parent)) = (&config.record, path.parent()) {
            if record.is_relative() {
                config.record = Some(parent.join(record));
            }
        }
        debug!(path = %path.display(), host = %config.link.host, "loaded config");
        Ok(config)
    }

    /// Applies command line overrides.
    pub fn override_link(&mut self, host: Option<&str>, port: Option<u16>) {
        if let Some(host) = host {
            self.link.host = host.to_string();
        }
        if let Some(port) = port {
            self.link.port = port;
        }
    }
}
