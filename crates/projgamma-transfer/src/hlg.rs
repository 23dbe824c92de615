//! Hybrid Log-Gamma (HLG) display EOTF.
//!
//! HLG is designed for HDR broadcast, compatible with SDR displays.
//! Uses a logarithmic curve for highlights and a gamma curve for shadows.
//! The display EOTF is the inverse OETF followed by the OOTF with the
//! system gamma for a nominal peak of [`L_W`] cd/m2.
//!
//! # Range
//!
//! - Encoded: [0, 1]
//! - Linear: [0, 1], where 1.0 is [`L_W`] cd/m2
//!
//! # Reference
//!
//! ITU-R BT.2100-2

/// Nominal display peak luminance in cd/m2.
pub const L_W: f64 = 1000.0;

/// System gamma for a 1000 cd/m2 display: `1.2 + 0.42 * log10(Lw / 1000)`.
pub const SYSTEM_GAMMA: f64 = 1.2;

// HLG constants
const A: f64 = 0.17883277;
const B: f64 = 0.28466892; // 1 - 4*A
const C: f64 = 0.55991073; // 0.5 - A*ln(4*A)

/// HLG OETF: encodes linear scene light to an HLG signal.
///
/// # Formula
///
/// ```text
/// if E <= 1/12:
///     E' = sqrt(3 * E)
/// else:
///     E' = A * ln(12*E - B) + C
/// ```
#[inline]
pub fn oetf(e: f64) -> f64 {
    if e <= 0.0 {
        0.0
    } else if e <= 1.0 / 12.0 {
        (3.0 * e).sqrt()
    } else {
        A * (12.0 * e - B).ln() + C
    }
}

/// HLG inverse OETF: decodes an HLG signal to linear scene light.
#[inline]
pub fn inverse_oetf(ep: f64) -> f64 {
    if ep <= 0.0 {
        0.0
    } else if ep <= 0.5 {
        ep * ep / 3.0
    } else {
        (((ep - C) / A).exp() + B) / 12.0
    }
}

fn inverse_oetf_derivative(ep: f64) -> f64 {
    if ep <= 0.0 {
        0.0
    } else if ep <= 0.5 {
        2.0 * ep / 3.0
    } else {
        ((ep - C) / A).exp() / (12.0 * A)
    }
}

/// HLG OOTF (Opto-Optical Transfer Function).
///
/// Converts scene linear to display linear with system gamma.
#[inline]
pub fn ootf(y: f64, gamma: f64) -> f64 {
    if y <= 0.0 {
        0.0
    } else {
        y.powf(gamma)
    }
}

/// HLG display EOTF: inverse OETF followed by the OOTF.
///
/// # Example
///
/// ```rust
/// use projgamma_transfer::hlg::eotf;
///
/// assert!((eotf(1.0) - 1.0).abs() < 1e-6);
/// ```
#[inline]
pub fn eotf(ep: f64) -> f64 {
    ootf(inverse_oetf(ep), SYSTEM_GAMMA)
}

/// Slope of [`eotf`]: `gamma * E^(gamma - 1) * dE/dE'`.
#[inline]
pub fn eotf_derivative(ep: f64) -> f64 {
    let e = inverse_oetf(ep);
    if e <= 0.0 {
        return 0.0;
    }
    SYSTEM_GAMMA * e.powf(SYSTEM_GAMMA - 1.0) * inverse_oetf_derivative(ep)
}

/// Inverse of [`eotf`]: display linear back to the HLG signal.
#[inline]
pub fn inverse(l: f64) -> f64 {
    if l <= 0.0 {
        return 0.0;
    }
    oetf(l.powf(1.0 / SYSTEM_GAMMA))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for i in 0..=100 {
            let ep = i as f64 / 100.0;
            let back = inverse(eotf(ep));
            assert!((ep - back).abs() < 1e-6, "ep={}, back={}", ep, back);
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(oetf(0.0), 0.0);
        assert!((oetf(1.0) - 1.0).abs() < 1e-6);
        assert_eq!(eotf(0.0), 0.0);
        assert!((eotf(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transition_point() {
        // Signal 0.5 is scene light 1/12 on both branches
        let below = inverse_oetf(0.5);
        let above = (((0.5 - C) / A).exp() + B) / 12.0;
        assert!((below - 1.0 / 12.0).abs() < 1e-9);
        assert!((above - 1.0 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_derivative_matches_difference_quotient() {
        let h = 1e-7;
        for &ep in &[0.1, 0.3, 0.45, 0.6, 0.9] {
            let numeric = (eotf(ep + h) - eotf(ep - h)) / (2.0 * h);
            let analytic = eotf_derivative(ep);
            assert!(
                (numeric - analytic).abs() < analytic * 1e-5 + 1e-9,
                "ep={ep}: {numeric} vs {analytic}"
            );
        }
    }
}
