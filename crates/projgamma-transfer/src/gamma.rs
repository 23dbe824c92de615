//! Pure power-law transfer functions.
//!
//! ## Variants
//! - 2.2: the projector's native table encoding and a common SDR target
//! - 2.4: BT.1886 without black compensation
//!
//! # Range
//!
//! - Input/Output: [0, 1]; inputs above 1 extrapolate along the power law

/// EOTF for arbitrary gamma: `v^gamma`
///
/// # Example
///
/// ```rust
/// use projgamma_transfer::gamma::gamma_eotf;
///
/// let linear = gamma_eotf(0.5, 2.2);
/// assert!((linear - 0.2176).abs() < 1e-4);
/// ```
#[inline]
pub fn gamma_eotf(v: f64, gamma: f64) -> f64 {
    if v <= 0.0 {
        0.0
    } else {
        v.powf(gamma)
    }
}

/// Slope of [`gamma_eotf`]: `gamma * v^(gamma - 1)`.
///
/// Zero at and below black for `gamma > 1`.
#[inline]
pub fn gamma_eotf_derivative(v: f64, gamma: f64) -> f64 {
    if v <= 0.0 {
        0.0
    } else {
        gamma * v.powf(gamma - 1.0)
    }
}

/// Inverse EOTF for arbitrary gamma: `l^(1/gamma)`
///
/// # Example
///
/// ```rust
/// use projgamma_transfer::gamma::gamma_inverse;
///
/// let encoded = gamma_inverse(0.218, 2.2);
/// assert!((encoded - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn gamma_inverse(l: f64, gamma: f64) -> f64 {
    if l <= 0.0 {
        0.0
    } else {
        l.powf(1.0 / gamma)
    }
}

/// Gamma 2.2 EOTF.
#[inline]
pub fn eotf_22(v: f64) -> f64 {
    gamma_eotf(v, 2.2)
}

/// Gamma 2.2 inverse.
#[inline]
pub fn inverse_22(l: f64) -> f64 {
    gamma_inverse(l, 2.2)
}

/// Gamma 2.4 EOTF.
#[inline]
pub fn eotf_24(v: f64) -> f64 {
    gamma_eotf(v, 2.4)
}

/// Gamma 2.4 inverse.
#[inline]
pub fn inverse_24(l: f64) -> f64 {
    gamma_inverse(l, 2.4)
}
