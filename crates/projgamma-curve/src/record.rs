//! Flat parameter records for persistence.
//!
//! A [`CurveRecord`] carries every [`GammaParameters`] field plus a schema
//! version, an optional soft clip rule and an optional raw table. It is plain
//! serde data, so any format works; the CLI uses JSON.
//!
//! Storage should be read through [`StoredRecord`], which also accepts the
//! unversioned records of older tools:
//!
//! | Legacy key | Field |
//! |------------|-------|
//! | `bmax` | `max_brightness_nits` |
//! | `brefwhite` | `ref_white_nits` |
//! | `bblack` / `bblackin` | `black_out_offset` / `black_in_offset` |
//! | `bsoftclip` | `soft_clip_start`, or a soft clip rule when a map |
//! | `bhardclip` | `hard_clip` |
//! | `clip` / `clip_gamma` | `clip_curve_type` / `soft_clip_gamma` |
//! | `irefblack` + `ipeakwhite` | `input_level` |
//! | `eotf` (`eotf_pq`, ...) | `eotf` |
//! | `table` | raw table, only when `eotf` is absent or not a known EOTF |
//!
//! Older tools saved the generated table next to the parameters. That table
//! is dropped and regenerated, so only parameterless files load as raw
//! tables.

use projgamma_transfer::Eotf;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CurveError, CurveResult};
use crate::params::{ClipCurveType, GammaParameters, InputLevel};
use crate::softclip::SoftClipRule;

/// Newest record schema this build reads and the one it writes.
pub const SCHEMA_VERSION: u32 = 2;

/// Versioned flat record of a curve store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    /// Schema version, see [`SCHEMA_VERSION`].
    pub schema: u32,
    /// [`Eotf::name`] of the transfer function.
    pub eotf: String,
    /// Black level of the BT.1886 EOTF.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eotf_black: Option<f64>,
    /// Input level.
    pub input_level: InputLevel,
    /// Device output at full code, in nits.
    pub max_brightness_nits: f64,
    /// Reference white in nits.
    pub ref_white_nits: f64,
    /// Input side black offset.
    pub black_in_offset: f64,
    /// Output side black offset.
    pub black_out_offset: f64,
    /// Soft clip start, `None` when absent or fitted by the rule.
    #[serde(default)]
    pub soft_clip_start: Option<f64>,
    /// Hard clip, `None` when unbounded.
    #[serde(default)]
    pub hard_clip: Option<f64>,
    /// Soft clip end slope.
    pub end_slope: f64,
    /// Soft clip shape.
    pub clip_curve_type: ClipCurveType,
    /// Soft clip gamma.
    pub soft_clip_gamma: f64,
    /// Rule fitting the soft clip start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_clip_rule: Option<SoftClipRule>,
    /// Raw table that replaces the generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<u16>>,
}

impl CurveRecord {
    /// Record of `params` at the current schema.
    pub fn from_parameters(params: &GammaParameters, soft_clip_rule: Option<SoftClipRule>) -> Self {
        Self {
            schema: SCHEMA_VERSION,
            eotf: params.eotf.name().to_string(),
            eotf_black: params.eotf.black(),
            input_level: params.input_level,
            max_brightness_nits: params.max_brightness_nits,
            ref_white_nits: params.ref_white_nits,
            black_in_offset: params.black_in_offset,
            black_out_offset: params.black_out_offset,
            soft_clip_start: params.soft_clip_start,
            hard_clip: params.hard_clip,
            end_slope: params.end_slope,
            clip_curve_type: params.clip_curve_type,
            soft_clip_gamma: params.soft_clip_gamma,
            soft_clip_rule,
            table: None,
        }
    }

    /// Fails if the record is newer than this build.
    pub fn check_schema(&self) -> CurveResult<()> {
        if self.schema > SCHEMA_VERSION {
            return Err(CurveError::UnsupportedSchema {
                found: self.schema,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    /// Parameters described by the record.
    pub fn parameters(&self) -> CurveResult<GammaParameters> {
        self.check_schema()?;
        let eotf = match Eotf::from_name(&self.eotf) {
            Some(Eotf::Bt1886(_)) => match self.eotf_black {
                Some(black) => Eotf::bt1886(black),
                None => Eotf::bt1886(projgamma_transfer::bt1886::DEFAULT_BLACK),
            },
            Some(eotf) => eotf,
            None => return Err(CurveError::record(format!("unknown eotf {:?}", self.eotf))),
        };
        Ok(GammaParameters {
            eotf,
            input_level: self.input_level,
            max_brightness_nits: self.max_brightness_nits,
            ref_white_nits: self.ref_white_nits,
            black_in_offset: self.black_in_offset,
            black_out_offset: self.black_out_offset,
            soft_clip_start: self.soft_clip_start,
            hard_clip: self.hard_clip,
            end_slope: self.end_slope,
            clip_curve_type: self.clip_curve_type,
            soft_clip_gamma: self.soft_clip_gamma,
        })
    }
}

/// Soft clip as stored by older tools: a fixed start or a rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LegacySoftClip {
    /// Fixed start in input nits.
    Fixed(f64),
    /// Rule parameters.
    Scaled {
        /// Rule base
        #[serde(default)]
        bbase: f64,
        /// Rule minimum
        #[serde(default)]
        bmin: f64,
        /// Rule scale
        #[serde(default)]
        scale: f64,
        /// Hard clip scale
        #[serde(default)]
        hcscale: Option<f64>,
    },
}

/// Table as stored by older tools: one list, or one per channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LegacyTable {
    /// Codes shared by every channel.
    Single(Vec<u16>),
    /// Red, green and blue codes.
    Channels(Vec<Vec<u16>>),
}

impl LegacyTable {
    /// Codes shared by every channel.
    ///
    /// Fails unless a per-channel table has three identical channels.
    pub fn into_codes(self) -> CurveResult<Vec<u16>> {
        match self {
            Self::Single(codes) => Ok(codes),
            Self::Channels(mut channels) => {
                if channels.len() != 3 {
                    return Err(CurveError::record(format!(
                        "table has {} channels, expected 3",
                        channels.len()
                    )));
                }
                if channels[1] != channels[0] || channels[2] != channels[0] {
                    return Err(CurveError::record(
                        "channels of the table differ, only a shared table can be loaded",
                    ));
                }
                Ok(channels.swap_remove(0))
            }
        }
    }
}

/// Unversioned record written by older tools. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LegacyRecord {
    /// Present only on malformed current records.
    #[serde(default)]
    pub schema: Option<u32>,
    /// EOTF name, usually with an `eotf_` prefix.
    #[serde(default)]
    pub eotf: Option<String>,
    /// Max brightness.
    #[serde(default)]
    pub bmax: Option<f64>,
    /// Reference white.
    #[serde(default)]
    pub brefwhite: Option<f64>,
    /// Output black.
    #[serde(default)]
    pub bblack: Option<f64>,
    /// Input black.
    #[serde(default)]
    pub bblackin: Option<f64>,
    /// Soft clip.
    #[serde(default)]
    pub bsoftclip: Option<LegacySoftClip>,
    /// Hard clip.
    #[serde(default)]
    pub bhardclip: Option<f64>,
    /// End slope.
    #[serde(default)]
    pub end_slope: Option<f64>,
    /// Clip shape code.
    #[serde(default)]
    pub clip: Option<u8>,
    /// Clip gamma.
    #[serde(default)]
    pub clip_gamma: Option<f64>,
    /// Index of reference black.
    #[serde(default)]
    pub irefblack: Option<f64>,
    /// Index of peak white.
    #[serde(default)]
    pub ipeakwhite: Option<f64>,
    /// Raw table, or the table generated from the other fields.
    #[serde(default)]
    pub table: Option<LegacyTable>,
}

impl LegacyRecord {
    /// Converts to a current record.
    pub fn migrate(self) -> CurveResult<CurveRecord> {
        if let Some(schema) = self.schema {
            // shaped like neither; only a newer writer would do that
            return Err(if schema > SCHEMA_VERSION {
                CurveError::UnsupportedSchema {
                    found: schema,
                    supported: SCHEMA_VERSION,
                }
            } else {
                CurveError::record(format!("malformed schema {schema} record"))
            });
        }

        let defaults = GammaParameters::default();
        let known_eotf = self.eotf.as_deref().and_then(Eotf::from_name);
        let eotf = match (known_eotf, self.eotf.as_deref()) {
            (Some(eotf), _) => eotf,
            (None, Some(name)) if self.table.is_none() => {
                return Err(CurveError::record(format!("unknown eotf {name:?}")));
            }
            _ => defaults.eotf,
        };
        let table = match (known_eotf, self.table) {
            (Some(eotf), Some(_)) => {
                debug!(eotf = eotf.name(), "stored table dropped, regenerating from parameters");
                None
            }
            (None, Some(table)) => Some(table.into_codes()?),
            (_, None) => None,
        };

        let input_level = match (self.irefblack, self.ipeakwhite) {
            (Some(black), Some(white)) => InputLevel::from_range(black, white).ok_or_else(|| {
                CurveError::record(format!("no input level with black {black}, white {white}"))
            })?,
            _ => defaults.input_level,
        };

        let clip_curve_type = match self.clip {
            Some(code) => ClipCurveType::from_code(code)
                .ok_or_else(|| CurveError::record(format!("unknown clip type {code}")))?,
            None => defaults.clip_curve_type,
        };

        let (soft_clip_start, soft_clip_rule) = match self.bsoftclip {
            None => (None, None),
            Some(LegacySoftClip::Fixed(start)) => (Some(start), None),
            Some(LegacySoftClip::Scaled {
                bbase,
                bmin,
                scale,
                hcscale,
            }) => (
                None,
                Some(SoftClipRule {
                    base: bbase,
                    min: bmin,
                    scale,
                    hard_clip_scale: hcscale,
                }),
            ),
        };

        debug!(eotf = eotf.name(), "migrated legacy record");

        let mut record = CurveRecord::from_parameters(
            &GammaParameters {
                eotf,
                input_level,
                max_brightness_nits: self.bmax.unwrap_or(defaults.max_brightness_nits),
                ref_white_nits: self.brefwhite.unwrap_or(defaults.ref_white_nits),
                black_in_offset: self.bblackin.unwrap_or(defaults.black_in_offset),
                black_out_offset: self.bblack.unwrap_or(defaults.black_out_offset),
                soft_clip_start,
                hard_clip: self.bhardclip,
                end_slope: self.end_slope.unwrap_or(defaults.end_slope),
                clip_curve_type,
                soft_clip_gamma: self.clip_gamma.unwrap_or(defaults.soft_clip_gamma),
            },
            soft_clip_rule,
        );
        record.table = table;
        Ok(record)
    }
}

/// A record as found in storage: current or legacy.
///
/// # Example
///
/// ```rust
/// use projgamma_curve::StoredRecord;
///
/// let legacy = r#"{"bmax": 100, "brefwhite": 25, "bhardclip": 4000, "eotf": "eotf_pq"}"#;
/// let stored: StoredRecord = serde_json::from_str(legacy).unwrap();
/// let record = stored.into_record().unwrap();
/// assert_eq!(record.eotf, "pq");
/// assert_eq!(record.hard_clip, Some(4000.0));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredRecord {
    /// Versioned record.
    Current(CurveRecord),
    /// Unversioned record of older tools.
    Legacy(LegacyRecord),
}

impl StoredRecord {
    /// Checks the schema and migrates legacy records.
    pub fn into_record(self) -> CurveResult<CurveRecord> {
        match self {
            Self::Current(record) => {
                record.check_schema()?;
                Ok(record)
            }
            Self::Legacy(record) => record.migrate(),
        }
    }
}
