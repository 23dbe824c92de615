//! ITU-R BT.1886 reference EOTF with black level compensation.
//!
//! ```text
//! L = a * max(V + b, 0)^2.4
//! a = (Lw^(1/2.4) - Lb^(1/2.4))^2.4
//! b = Lb^(1/2.4) / (Lw^(1/2.4) - Lb^(1/2.4))
//! ```
//!
//! With `Lw = 1` the curve is normalized to the display peak and `Lb` is the
//! black level relative to it. `Lb = 0` reduces to a pure 2.4 power law.
//!
//! # Reference
//!
//! ITU-R BT.1886 Annex 1

/// BT.1886 exponent.
pub const GAMMA: f64 = 2.4;

/// Default black level relative to white (20000:1 native contrast).
pub const DEFAULT_BLACK: f64 = 1.0 / 20000.0;

/// Precomputed BT.1886 coefficients for one black level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bt1886 {
    black: f64,
    a: f64,
    b: f64,
}

impl Default for Bt1886 {
    fn default() -> Self {
        Self::new(DEFAULT_BLACK)
    }
}

impl Bt1886 {
    /// Builds the curve for black level `black` (relative to white).
    ///
    /// Negative or non-finite levels are treated as 0; levels at or above
    /// white are capped just below it.
    pub fn new(black: f64) -> Self {
        let black = if black.is_finite() { black.clamp(0.0, 0.999) } else { 0.0 };
        let lw = 1.0_f64;
        let lw_root = lw.powf(1.0 / GAMMA);
        let lb_root = black.powf(1.0 / GAMMA);
        Self {
            black,
            a: (lw_root - lb_root).powf(GAMMA),
            b: lb_root / (lw_root - lb_root),
        }
    }

    /// Black level relative to white.
    #[inline]
    pub fn black(&self) -> f64 {
        self.black
    }

    /// Signal to normalized display light. `v <= 0` yields the black floor.
    #[inline]
    pub fn eotf(&self, v: f64) -> f64 {
        self.a * (v.max(0.0) + self.b).powf(GAMMA)
    }

    /// Slope of [`Bt1886::eotf`]: `2.4 a (V + b)^1.4`.
    #[inline]
    pub fn eotf_derivative(&self, v: f64) -> f64 {
        if v < 0.0 {
            return 0.0;
        }
        GAMMA * self.a * (v + self.b).powf(GAMMA - 1.0)
    }

    /// Display light back to signal, clamped at 0 below the black floor.
    #[inline]
    pub fn inverse(&self, l: f64) -> f64 {
        if l <= 0.0 {
            return 0.0;
        }
        ((l / self.a).powf(1.0 / GAMMA) - self.b).max(0.0)
    }
}
