//! SMPTE ST 2084 Perceptual Quantizer (PQ) transfer function.
//!
//! PQ is designed for HDR content, encoding luminance up to 10,000 cd/m2
//! in a perceptually uniform way.
//!
//! # Range
//!
//! - Encoded: [0, 1]
//! - Linear: [0, 1], where 1.0 is [`L_MAX`] cd/m2
//!
//! # Reference
//!
//! SMPTE ST 2084:2014
//!
//! # Usage
//!
//! ```rust
//! use projgamma_transfer::pq;
//!
//! // Decode PQ signal to normalized luminance
//! let l = pq::eotf(0.5);
//!
//! // 100 nits, normalized
//! let signal = pq::inverse(100.0 / pq::L_MAX);
//! assert!((signal - 0.508).abs() < 0.01);
//! ```

/// Maximum luminance in cd/m2 (nits).
pub const L_MAX: f64 = 10000.0;

// PQ constants from SMPTE ST 2084
const M1: f64 = 2610.0 / 16384.0;
const M2: f64 = 2523.0 / 4096.0 * 128.0;
const C1: f64 = 3424.0 / 4096.0;
const C2: f64 = 2413.0 / 4096.0 * 32.0;
const C3: f64 = 2392.0 / 4096.0 * 32.0;

/// PQ EOTF: decodes a PQ signal to luminance normalized to [`L_MAX`].
///
/// # Example
///
/// ```rust
/// use projgamma_transfer::pq::{eotf, L_MAX};
///
/// // Reference white (100 nits)
/// let nits = eotf(0.508) * L_MAX;
/// assert!((nits - 100.0).abs() < 1.0);
/// ```
#[inline]
pub fn eotf(v: f64) -> f64 {
    if v <= 0.0 {
        return 0.0;
    }

    let vp = v.powf(1.0 / M2);
    let num = (vp - C1).max(0.0);
    let den = C2 - C3 * vp;
    if den <= 0.0 {
        return f64::INFINITY;
    }

    (num / den).powf(1.0 / M1)
}

/// Slope of [`eotf`] with respect to the signal.
///
/// Chain rule over `u = v^(1/m2)` and `f = (u - c1) / (c2 - c3 u)`:
///
/// ```text
/// dL/dv = (1/m1) f^(1/m1 - 1) * (c2 - c3 c1) / (c2 - c3 u)^2 * (1/m2) v^(1/m2 - 1)
/// ```
#[inline]
pub fn eotf_derivative(v: f64) -> f64 {
    if v <= 0.0 {
        return 0.0;
    }

    let vp = v.powf(1.0 / M2);
    if vp <= C1 {
        return 0.0;
    }
    let den = C2 - C3 * vp;
    if den <= 0.0 {
        return f64::INFINITY;
    }

    let f = (vp - C1) / den;
    let df_du = (C2 - C3 * C1) / (den * den);
    let du_dv = vp / (M2 * v);

    f.powf(1.0 / M1 - 1.0) / M1 * df_du * du_dv
}

/// Inverse PQ EOTF: encodes normalized luminance to a PQ signal.
///
/// Values above 1.0 follow the same formula past the 10,000 nit ceiling,
/// so `eotf(inverse(l)) == l` there as well.
#[inline]
pub fn inverse(l: f64) -> f64 {
    if l <= 0.0 {
        return 0.0;
    }

    let yp = l.powf(M1);
    let num = C1 + C2 * yp;
    let den = 1.0 + C3 * yp;

    (num / den).powf(M2)
}
