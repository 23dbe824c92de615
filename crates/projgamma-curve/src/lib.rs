//! # projgamma-curve
//!
//! Tone curves and device gamma tables for projectors with a custom gamma
//! table slot.
//!
//! A curve maps the source signal through a display EOTF, scaled so the
//! source's reference white lands at the right place on the projector's
//! actual peak brightness, then compresses highlights the screen cannot show
//! with a soft clip segment and a hard clip.
//!
//! # Architecture
//!
//! ```text
//! GammaParameters ──► generate ──► GammaCurve (params + CodeTable)
//!        ▲                              │
//!        │ SoftClipRule                 ▼
//!        └──────────── CurveStore ◄── RawTable (read back from device)
//!                          │
//!                          ▼
//!                    CurveRecord (serde)
//! ```
//!
//! # Operations
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`generate`] | parameters to a quantized table |
//! | [`adjust_for_contrast`] | fold a contrast setting into the reference white |
//! | [`fit_soft_clip_start`] | soft clip start from a [`SoftClipRule`] |
//! | [`presets::find`] | built-in parameter sets and test tables |
//!
//! # Usage
//!
//! ```rust
//! use projgamma_curve::{CurveStore, GammaParameters};
//! use projgamma_transfer::Eotf;
//!
//! let mut store = CurveStore::new(GammaParameters {
//!     eotf: Eotf::Pq,
//!     max_brightness_nits: 120.0,
//!     ref_white_nits: 30.0,
//!     soft_clip_start: Some(200.0),
//!     hard_clip: Some(1000.0),
//!     ..Default::default()
//! })?;
//! store.edit(|p| p.end_slope = 0.9)?;
//! assert!(store.table().is_monotonic());
//! # Ok::<(), projgamma_curve::CurveError>(())
//! ```
//!
//! # Used By
//!
//! - `projgamma-link` - table upload and read back
//! - `projgamma-cli` - command scripts

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod contrast;
pub mod engine;
pub mod error;
pub mod params;
pub mod presets;
pub mod record;
pub mod softclip;
pub mod store;
pub mod table;

pub use contrast::adjust_for_contrast;
pub use engine::{generate, GammaCurve, ToneCurve};
pub use error::{CurveError, CurveResult};
pub use params::{ClipCurveType, Diagnostic, GammaParameters, InputLevel};
pub use record::{CurveRecord, StoredRecord, SCHEMA_VERSION};
pub use softclip::{fit_soft_clip_start, SoftClipRule};
pub use store::{ActiveTable, CurveStore};
pub use table::{CodeTable, RawTable, CODE_MAX, TABLE_SIZE};
