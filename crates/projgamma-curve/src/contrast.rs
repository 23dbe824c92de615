//! Baking the projector's contrast control into the table.
//!
//! The contrast control scales the signal around black, so a mid-grey
//! input of 0.5 is shown as `0.5 * (1 + delta / 100)`. The brightness change
//! this causes at mid-grey is folded into `ref_white_nits`, which scales the
//! whole EOTF region while soft and hard clip points (input nits) stay put.

use tracing::{debug, warn};

use crate::engine::{generate, GammaCurve};
use crate::error::{CurveError, CurveResult};
use crate::params::Diagnostic;

/// Largest contrast step accepted in either direction.
pub const CONTRAST_LIMIT: f64 = 50.0;

/// Mid-grey brightness ratio for a contrast setting of `delta`.
pub fn contrast_ratio(eotf: &projgamma_transfer::Eotf, delta: f64) -> f64 {
    eotf.evaluate(0.5 * (1.0 + delta / 100.0)) / eotf.evaluate(0.5)
}

/// Regenerates `curve` so that the table alone reproduces what a contrast
/// setting of `contrast_delta` did to it.
///
/// `contrast_delta` is clamped to `[-50, 50]`; 0 returns an equal curve.
pub fn adjust_for_contrast(curve: &GammaCurve, contrast_delta: f64) -> CurveResult<GammaCurve> {
    if !contrast_delta.is_finite() {
        return Err(CurveError::parameter(
            "contrast_delta",
            format!("{contrast_delta} is not finite"),
        ));
    }
    if contrast_delta == 0.0 {
        return Ok(curve.clone());
    }

    let delta = contrast_delta.clamp(-CONTRAST_LIMIT, CONTRAST_LIMIT);
    let clamped = (delta != contrast_delta).then(|| {
        warn!(requested = contrast_delta, applied = delta, "contrast clamped");
        Diagnostic::Clamped {
            field: "contrast_delta",
            requested: contrast_delta,
            applied: delta,
        }
    });

    let mut params = curve.params().clone();
    let ratio = contrast_ratio(&params.eotf, delta);
    params.ref_white_nits *= ratio;
    debug!(
        delta,
        ratio,
        ref_white = params.ref_white_nits,
        "contrast folded into reference white"
    );

    let mut adjusted = generate(&params)?;
    adjusted.diagnostics.extend(clamped);
    Ok(adjusted)
}
