//! # projgamma-transfer
//!
//! Display EOTFs used to build projector gamma tables.
//!
//! An EOTF (Electro-Optical Transfer Function) maps a normalized input signal
//! to the linear light a display should emit. Tone curves are built from
//! these functions, so every variant provides:
//!
//! - `evaluate` - signal to normalized linear light
//! - `derivative` - analytic slope, used to join curve segments with matching
//!   tangents
//! - `inverse` - linear light back to the signal that produces it
//!
//! # Supported Transfer Functions
//!
//! | Function | Use Case | Peak |
//! |----------|----------|------|
//! | [`bt1886`] | SDR reference display, black compensated | 100 cd/m2 |
//! | [`hlg`] | HDR broadcast (HLG) | 1000 cd/m2 |
//! | [`pq`] | HDR (HDR10, Dolby Vision) | 10000 cd/m2 |
//! | [`gamma`] 2.2 / 2.4 | Pure power law | 100 cd/m2 |
//!
//! # Usage
//!
//! ```rust
//! use projgamma_transfer::Eotf;
//!
//! let eotf = Eotf::Hlg;
//! let light = eotf.evaluate(0.75);
//! let slope = eotf.derivative(0.75);
//! assert!(light > 0.0 && slope > 0.0);
//! ```
//!
//! # Used By
//!
//! - `projgamma-curve` - tone curve generation

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bt1886;
pub mod gamma;
pub mod hlg;
pub mod pq;
mod eotf;

pub use bt1886::Bt1886;
pub use eotf::Eotf;
