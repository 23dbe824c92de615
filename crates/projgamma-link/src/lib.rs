//! # projgamma-link
//!
//! Network link to projectors with custom gamma tables: upload and read
//! back of table data, and the handful of settings that decide whether an
//! uploaded table is shown.
//!
//! # Protocol
//!
//! TCP on port 20554. After connecting the projector sends `PJ_OK`, the
//! client answers `PJREQ` and the projector accepts with `PJACK`. Requests
//! then run strictly one at a time; see [`frame`] for the layout.
//!
//! | Operation | Command |
//! |-----------|---------|
//! | [`Connection::write_gamma_table`] | `PMDR`, `PMDG`, `PMDB` |
//! | [`Connection::read_raw_table`] | `PMDR`, `PMDG`, `PMDB` |
//! | [`Connection::write_scalar_setting`] | `PW`, `PMPM`, `PMGT`, `PMGC`, `PMCN`, `PMBR`, `ISIL`, `RC` |
//! | [`Connection::model`] | `MD` |
//! | [`Connection::null`] | `00 00` |
//! | [`upload`] | `MD`, `PW`, `PMPM`, `PMGT`, `PMGC`, then the tables |
//! | [`fold_contrast`] | `PMCN`, [`upload`], `PMCN` |
//!
//! # Failures
//!
//! Waits are bounded by [`LinkConfig`] timeouts and never retried. A
//! rejected command leaves the connection usable; a timeout, malformed frame
//! or socket error closes it and later calls fail with
//! [`LinkError::Closed`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use projgamma_curve::{generate, GammaParameters};
//! use projgamma_link::{with_connection, LinkConfig, UploadOptions};
//!
//! let curve = generate(&GammaParameters::default())?;
//! let config = LinkConfig::with_host("192.168.1.20");
//! let report = with_connection(&config, |conn| {
//!     projgamma_link::upload(conn, curve.table(), UploadOptions::default())
//! })?;
//! println!("uploaded to {}", report.slot);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Used By
//!
//! - `projgamma-cli` - device commands in scripts

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod codes;
pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod setting;
pub mod upload;

pub use codes::ProjectorModel;
pub use config::{LinkConfig, DEFAULT_PORT};
pub use connection::{connect, with_connection, Ack, Connection, TableId};
pub use error::{LinkError, LinkResult};
pub use setting::{Setting, SettingValue};
pub use upload::{fold_contrast, upload, upload_store, ContrastFold, UploadOptions, UploadReport};
