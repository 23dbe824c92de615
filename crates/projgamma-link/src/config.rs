//! Connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default projector control port.
pub const DEFAULT_PORT: u16 = 20554;

/// Where the projector is and how long to wait for it.
///
/// Every field has a default, so a config file only needs the host:
///
/// ```rust
/// use projgamma_link::LinkConfig;
///
/// let config = LinkConfig::with_host("192.168.1.20");
/// assert_eq!(config.address(), "192.168.1.20:20554");
/// assert_eq!(config.ack_timeout().as_millis(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Projector host name or address.
    pub host: String,
    /// Control port.
    pub port: u16,
    /// TCP connect timeout.
    pub connect_timeout_ms: u64,
    /// Wait for a plain acknowledgement and for the handshake.
    pub ack_timeout_ms: u64,
    /// Wait for the acknowledgement of a setting change.
    pub setting_timeout_ms: u64,
    /// Wait for a table payload to be stored or returned.
    pub data_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            ack_timeout_ms: 1000,
            setting_timeout_ms: 5000,
            data_timeout_ms: 20000,
        }
    }
}

impl LinkConfig {
    /// Default settings for `host`.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// TCP connect timeout.
    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Acknowledgement and handshake wait.
    #[inline]
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    /// Setting change wait.
    #[inline]
    pub fn setting_timeout(&self) -> Duration {
        Duration::from_millis(self.setting_timeout_ms)
    }

    /// Table payload wait.
    #[inline]
    pub fn data_timeout(&self) -> Duration {
        Duration::from_millis(self.data_timeout_ms)
    }
}
