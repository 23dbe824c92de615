//! Link error types.

use std::io;
use std::time::Duration;

use projgamma_curve::CurveError;
use thiserror::Error;

/// Result type for link operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors that can occur while talking to a projector.
#[derive(Debug, Error)]
pub enum LinkError {
    /// TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Address that was tried
        addr: String,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// No response within the configured wait.
    #[error("timed out after {waited:?} waiting for {command}")]
    Timeout {
        /// Command being waited on
        command: String,
        /// How long the link waited
        waited: Duration,
    },

    /// Device answered with a negative acknowledgement.
    #[error("projector rejected {command} (status {code:#04x})")]
    DeviceRejected {
        /// Rejected command
        command: String,
        /// Status byte of the negative acknowledgement
        code: u8,
    },

    /// Malformed, truncated or unexpected frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The connection was closed after an earlier failure.
    #[error("connection closed")]
    Closed,

    /// Value that cannot be sent for a setting, or read back as garbage.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Device is not in a state that accepts the operation.
    #[error("projector not ready: {0}")]
    NotReady(String),

    /// Table read back after an upload differs from what was written.
    #[error("verification failed for {command}")]
    VerifyFailed {
        /// Command whose read back differed
        command: String,
    },

    /// Socket error outside of a timed wait.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Curve could not be adjusted to match the projector.
    #[error("curve: {0}")]
    Curve(#[from] CurveError),
}

impl LinkError {
    /// Creates a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Creates an invalid value error.
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    /// Returns true if the connection is unusable after this error.
    ///
    /// The stream is no longer in step with the device after a timeout, a
    /// bad frame or a socket error; a rejection leaves it in step.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Protocol(_) | Self::Io(_) | Self::Closed
        )
    }

    /// Returns true for [`LinkError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Printable form of a command for messages and logs.
pub(crate) fn command_name(command: &[u8]) -> String {
    if command.iter().all(|b| *b == 0) {
        return "null".to_string();
    }
    command.escape_ascii().to_string()
}
