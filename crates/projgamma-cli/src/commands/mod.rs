//! CLI command implementations

pub mod curve;
pub mod device;
pub mod presets;
pub mod script;
pub mod table;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use projgamma_curve::{CurveStore, GammaParameters, StoredRecord};
use projgamma_link::{with_connection, Connection, LinkConfig, LinkError, UploadOptions};
use tracing::debug;

use crate::config::CliConfig;

/// State carried from one script command to the next.
#[derive(Debug)]
pub struct Session {
    /// Active parameters and table.
    pub store: CurveStore,
    /// Where the projector is.
    pub link: LinkConfig,
    /// Upload checks.
    pub upload: UploadOptions,
}

impl Session {
    /// Session with default parameters.
    pub fn new(link: LinkConfig, upload: UploadOptions) -> Result<Self> {
        Ok(Self {
            store: CurveStore::new(GammaParameters::default())?,
            link,
            upload,
        })
    }

    /// Session from the config, starting from `record` if given.
    pub fn from_config(config: &CliConfig, record: Option<&Path>) -> Result<Self> {
        let mut session = Self::new(config.link.clone(), config.upload)?;
        if let Some(path) = record.or(config.record.as_deref()) {
            session.store = load_record(path)?;
        }
        Ok(session)
    }
}

/// Runs `f` on a fresh projector connection, closed afterwards.
pub fn with_device<T>(
    link: &LinkConfig,
    f: impl FnOnce(&mut Connection) -> Result<T, LinkError>,
) -> Result<T> {
    with_connection(link, f).with_context(|| format!("Projector {}", link.address()))
}

/// Reads a parameter record, migrating older formats.
pub fn load_record(path: &Path) -> Result<CurveStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read record: {}", path.display()))?;
    let stored: StoredRecord = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse record: {}", path.display()))?;
    let store = CurveStore::from_record(stored.into_record()?)
        .with_context(|| format!("Invalid record: {}", path.display()))?;
    debug!(path = %path.display(), "loaded record");
    Ok(store)
}

/// Writes the store's record as pretty JSON.
pub fn save_record(path: &Path, store: &CurveStore) -> Result<()> {
    let json = serde_json::to_string_pretty(&store.to_record())?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write record: {}", path.display()))
}

/// Positional argument `index`, parsed.
pub fn arg<T>(args: &[&str], index: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(text) = args.get(index) else {
        bail!("missing argument <{name}>");
    };
    text.parse()
        .map_err(|e| anyhow::anyhow!("invalid {name} {text:?}: {e}"))
}

/// Optional nits value: a number, or `none`/`off` for unbounded.
pub fn optional_nits(args: &[&str], index: usize, name: &str) -> Result<Option<f64>> {
    match args.get(index) {
        Some(text) if matches!(text.to_ascii_lowercase().as_str(), "none" | "off") => Ok(None),
        Some(_) => arg(args, index, name).map(Some),
        None => bail!("missing argument <{name}>"),
    }
}
