//! Soft clip start derived from the effective max brightness.
//!
//! Instead of a fixed `soft_clip_start`, a [`SoftClipRule`] places the start
//! relative to what the device can actually show, so the same rule keeps
//! working as `max_brightness_nits` or `ref_white_nits` change:
//!
//! ```text
//! start = max(min,
//!             base + (bmax_eff - base) * scale,
//!             max(0, bmax_eff - (hard_clip - bmax_eff) * hard_clip_scale))
//! ```

use serde::{Deserialize, Serialize};

use crate::params::GammaParameters;

/// Rule for fitting the soft clip start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoftClipRule {
    /// Brightness the scaled term starts from, in input nits.
    pub base: f64,
    /// Lower bound of the result, in input nits.
    pub min: f64,
    /// Fraction of the way from `base` to the effective max brightness.
    pub scale: f64,
    /// Pulls the start up toward the effective max when the hard clip is
    /// close to it. `None` disables the term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_clip_scale: Option<f64>,
}

impl SoftClipRule {
    /// Rule without the hard clip term.
    pub fn new(base: f64, min: f64, scale: f64) -> Self {
        Self {
            base,
            min,
            scale,
            hard_clip_scale: None,
        }
    }

    /// Adds the hard clip term.
    pub fn with_hard_clip_scale(mut self, scale: f64) -> Self {
        self.hard_clip_scale = Some(scale);
        self
    }
}

/// Evaluates `rule` against the effective max brightness and hard clip of
/// `params`.
///
/// The hard clip term is skipped when `params` has no hard clip.
///
/// # Example
///
/// ```rust
/// use projgamma_curve::{fit_soft_clip_start, GammaParameters, SoftClipRule};
///
/// let params = GammaParameters {
///     max_brightness_nits: 100.0,
///     ref_white_nits: 25.0, // effective max is 400
///     ..Default::default()
/// };
/// let rule = SoftClipRule::new(25.0, 100.0, 0.4);
/// assert_eq!(fit_soft_clip_start(&rule, &params), 175.0);
/// ```
pub fn fit_soft_clip_start(rule: &SoftClipRule, params: &GammaParameters) -> f64 {
    let bmax = params.effective_max_brightness();
    let scaled = rule.base + (bmax - rule.base) * rule.scale;
    let near_hard = match (rule.hard_clip_scale, params.hard_clip) {
        (Some(hcs), Some(hard)) => (bmax - (hard - bmax) * hcs).max(0.0),
        _ => 0.0,
    };
    rule.min.max(scaled).max(near_hard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(hard_clip: Option<f64>) -> GammaParameters {
        GammaParameters {
            max_brightness_nits: 100.0,
            ref_white_nits: 50.0,
            hard_clip,
            ..Default::default()
        }
    }

    #[test]
    fn test_scale_endpoints() {
        let p = params(None);
        assert_eq!(fit_soft_clip_start(&SoftClipRule::new(50.0, 0.0, 0.0), &p), 50.0);
        assert_eq!(fit_soft_clip_start(&SoftClipRule::new(50.0, 0.0, 1.0), &p), 200.0);
        assert_eq!(fit_soft_clip_start(&SoftClipRule::new(50.0, 0.0, 0.5), &p), 125.0);
    }

    #[test]
    fn test_min_bound() {
        let p = params(None);
        assert_eq!(fit_soft_clip_start(&SoftClipRule::new(0.0, 150.0, 0.5), &p), 150.0);
    }

    #[test]
    fn test_hard_clip_term() {
        let rule = SoftClipRule::new(0.0, 0.0, 0.0).with_hard_clip_scale(0.5);
        // effective max 200, hard clip 300: 200 - 100 * 0.5
        assert_eq!(fit_soft_clip_start(&rule, &params(Some(300.0))), 150.0);
        // far away hard clip bottoms out at 0
        assert_eq!(fit_soft_clip_start(&rule, &params(Some(4000.0))), 0.0);
        assert_eq!(fit_soft_clip_start(&rule, &params(None)), 0.0);
    }
}
