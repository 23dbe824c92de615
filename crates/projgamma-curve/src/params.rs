//! Gamma curve parameters and validation.
//!
//! [`GammaParameters`] is the only input to curve generation. Brightness
//! values come in two domains:
//!
//! - output (measured) nits: `max_brightness_nits`, `black_out_offset`
//! - input (virtual) nits: `soft_clip_start`, `hard_clip`, `black_in_offset`
//!
//! They are related by the brightness scale `100 / ref_white_nits`; the
//! "effective" getters convert output values to the input domain.

use std::fmt;

use projgamma_transfer::Eotf;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CurveError, CurveResult};

/// Lowest accepted peak brightness in nits.
pub const MIN_MAX_BRIGHTNESS: f64 = 1.0;
/// Highest accepted brightness in nits.
pub const MAX_BRIGHTNESS: f64 = 10000.0;
/// Lowest accepted reference white in nits.
pub const MIN_REF_WHITE: f64 = 0.1;
/// Accepted soft clip gamma range.
pub const SOFT_CLIP_GAMMA_RANGE: (f64, f64) = (1e-4, 1e4);
/// Lowest accepted hard clip in nits.
pub const MIN_HARD_CLIP: f64 = 0.01;

/// HDMI input level: how table indices map to the EOTF input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputLevel {
    /// Index 0 is reference black, 255 is peak white.
    #[default]
    Standard,
    /// Video levels (HDMI "Enhanced"): black at 16, white at 235.
    Full,
    /// Black at 0, with the video level white to black span.
    SuperWhite,
}

impl InputLevel {
    /// Table indices of reference black and peak white.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Standard => (0.0, 255.0),
            Self::Full => (16.0, 235.0),
            Self::SuperWhite => (0.0, (235.0 - 16.0) * 255.0 / (255.0 - 16.0)),
        }
    }

    /// Table index to normalized EOTF input.
    #[inline]
    pub fn position(&self, index: f64) -> f64 {
        let (black, white) = self.range();
        (index - black) / (white - black)
    }

    /// Normalized EOTF input back to a (fractional) table index.
    #[inline]
    pub fn index(&self, position: f64) -> f64 {
        let (black, white) = self.range();
        black + position * (white - black)
    }

    /// Identifier used by records and the command table.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Full => "full",
            Self::SuperWhite => "super_white",
        }
    }

    /// Parses [`InputLevel::name`]; also accepts `enhanced` and `superwhite`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "full" | "enhanced" => Some(Self::Full),
            "super_white" | "superwhite" => Some(Self::SuperWhite),
            _ => None,
        }
    }

    /// Matches the legacy `(irefblack, ipeakwhite)` pair of older records.
    pub fn from_range(black: f64, white: f64) -> Option<Self> {
        [Self::Standard, Self::Full, Self::SuperWhite]
            .into_iter()
            .find(|level| {
                let (b, w) = level.range();
                (b - black).abs() < 1e-6 && (w - white).abs() < 1e-6
            })
    }
}

/// Shape of the soft clip segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipCurveType {
    /// Cubic Bezier, record value 0.
    #[default]
    CubicBezier,
    /// Quadratic Bezier, record value 1.
    QuadraticBezier,
}

impl ClipCurveType {
    /// Numeric value used by older records.
    pub const fn code(&self) -> u8 {
        match self {
            Self::CubicBezier => 0,
            Self::QuadraticBezier => 1,
        }
    }

    /// Inverse of [`ClipCurveType::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::CubicBezier),
            1 => Some(Self::QuadraticBezier),
            _ => None,
        }
    }
}

/// Non-fatal adjustment made while validating parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An out of range value was clamped.
    Clamped {
        /// Field name
        field: &'static str,
        /// Value asked for
        requested: f64,
        /// Value used
        applied: f64,
    },
    /// The hard clip is below the effective max brightness, so the table
    /// never reaches the device peak.
    HardClipBelowPeak {
        /// Hard clip in input nits
        hard_clip: f64,
        /// Effective max brightness in input nits
        effective_max: f64,
    },
    /// A soft clip rule fitted a start at or above the hard clip, so the
    /// curve has no soft clip segment.
    SoftClipDisabled {
        /// Start the rule fitted, in input nits
        fitted: f64,
        /// Hard clip in input nits
        hard_clip: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clamped {
                field,
                requested,
                applied,
            } => write!(f, "{field} {requested} clamped to {applied}"),
            Self::HardClipBelowPeak {
                hard_clip,
                effective_max,
            } => write!(
                f,
                "hard clip {hard_clip} is below effective max brightness {effective_max:.2}, peak output is unreachable"
            ),
            Self::SoftClipDisabled { fitted, hard_clip } => write!(
                f,
                "fitted soft clip {fitted:.2} is not below hard clip {hard_clip}, soft clip disabled"
            ),
        }
    }
}

/// Parameters of a generated gamma curve.
///
/// # Example
///
/// ```rust
/// use projgamma_curve::{generate, GammaParameters};
/// use projgamma_transfer::Eotf;
///
/// let params = GammaParameters {
///     eotf: Eotf::Pq,
///     ref_white_nits: 25.0,
///     hard_clip: Some(1000.0),
///     ..Default::default()
/// };
/// let curve = generate(&params).unwrap();
/// assert_eq!(curve.table().codes()[0], 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GammaParameters {
    /// Transfer function the table reproduces.
    pub eotf: Eotf,
    /// Index to EOTF input mapping.
    pub input_level: InputLevel,
    /// Device output at full code, in nits.
    pub max_brightness_nits: f64,
    /// Input brightness shown at the nominal 100% output.
    pub ref_white_nits: f64,
    /// Black offset subtracted on the input side, in input nits.
    pub black_in_offset: f64,
    /// Black level added on the output side, in measured nits.
    pub black_out_offset: f64,
    /// Start of the soft clip segment in input nits, `None` for no segment.
    pub soft_clip_start: Option<f64>,
    /// Hard clip in input nits, `None` for unbounded.
    pub hard_clip: Option<f64>,
    /// End tangent of the soft clip: 0 points at the start, 1 is flat.
    pub end_slope: f64,
    /// Soft clip segment shape.
    pub clip_curve_type: ClipCurveType,
    /// Gamma of the space the soft clip segment is drawn in.
    pub soft_clip_gamma: f64,
}

impl Default for GammaParameters {
    fn default() -> Self {
        Self {
            eotf: Eotf::Gamma22,
            input_level: InputLevel::Standard,
            max_brightness_nits: 100.0,
            ref_white_nits: 100.0,
            black_in_offset: 0.0,
            black_out_offset: 0.0,
            soft_clip_start: None,
            hard_clip: None,
            end_slope: 0.75,
            clip_curve_type: ClipCurveType::CubicBezier,
            soft_clip_gamma: 1.0,
        }
    }
}

impl GammaParameters {
    /// Output to input brightness factor, `100 / ref_white_nits`.
    #[inline]
    pub fn brightness_scale(&self) -> f64 {
        100.0 / self.ref_white_nits
    }

    /// Converts measured (output) nits to input nits.
    #[inline]
    pub fn output_to_input(&self, nits: f64) -> f64 {
        nits * self.brightness_scale()
    }

    /// Converts input nits to measured (output) nits.
    #[inline]
    pub fn input_to_output(&self, nits: f64) -> f64 {
        nits / self.brightness_scale()
    }

    /// Max brightness in input nits.
    pub fn effective_max_brightness(&self) -> f64 {
        self.output_to_input(self.max_brightness_nits)
    }

    /// Output black offset in input nits.
    pub fn effective_black_out(&self) -> f64 {
        self.output_to_input(self.black_out_offset)
    }

    /// Net black level in input nits.
    pub fn effective_black(&self) -> f64 {
        self.effective_black_out() - self.black_in_offset
    }

    /// Hard clip, or infinity when unbounded.
    pub fn effective_hard_clip(&self) -> f64 {
        self.hard_clip.unwrap_or(f64::INFINITY)
    }

    /// Validates and clamps the parameters.
    ///
    /// Non-finite values and clip ordering violations are errors. Out of
    /// range scalars are clamped and reported, together with warnings that
    /// do not change the parameters.
    pub fn sanitized(&self) -> CurveResult<(GammaParameters, Vec<Diagnostic>)> {
        self.check_finite()?;

        let mut out = self.clone();
        let mut diagnostics = Vec::new();
        let mut clamp = |field: &'static str, value: &mut f64, min: f64, max: f64| {
            let applied = value.clamp(min, max);
            if applied != *value {
                warn!(field, requested = *value, applied, "parameter clamped");
                diagnostics.push(Diagnostic::Clamped {
                    field,
                    requested: *value,
                    applied,
                });
                *value = applied;
            }
        };

        clamp(
            "max_brightness_nits",
            &mut out.max_brightness_nits,
            MIN_MAX_BRIGHTNESS,
            MAX_BRIGHTNESS,
        );
        clamp("ref_white_nits", &mut out.ref_white_nits, MIN_REF_WHITE, MAX_BRIGHTNESS);
        clamp("black_in_offset", &mut out.black_in_offset, 0.0, MAX_BRIGHTNESS);
        clamp("black_out_offset", &mut out.black_out_offset, 0.0, MAX_BRIGHTNESS);
        clamp("end_slope", &mut out.end_slope, 0.0, 1.0);
        clamp(
            "soft_clip_gamma",
            &mut out.soft_clip_gamma,
            SOFT_CLIP_GAMMA_RANGE.0,
            SOFT_CLIP_GAMMA_RANGE.1,
        );
        if let Some(soft) = out.soft_clip_start.as_mut() {
            clamp("soft_clip_start", soft, 0.0, f64::MAX);
        }
        if let Some(hard) = out.hard_clip.as_mut() {
            clamp("hard_clip", hard, MIN_HARD_CLIP, f64::MAX);
        }

        if let (Some(soft), Some(hard)) = (out.soft_clip_start, out.hard_clip) {
            if soft >= hard {
                return Err(CurveError::parameter(
                    "soft_clip_start",
                    format!("soft clip start {soft} must be below hard clip {hard}"),
                ));
            }
        }

        if let Some(hard) = out.hard_clip {
            let effective_max = out.effective_max_brightness();
            if hard < effective_max {
                warn!(hard, effective_max, "hard clip below effective max brightness");
                diagnostics.push(Diagnostic::HardClipBelowPeak {
                    hard_clip: hard,
                    effective_max,
                });
            }
        }

        Ok((out, diagnostics))
    }

    fn check_finite(&self) -> CurveResult<()> {
        let fields = [
            ("max_brightness_nits", Some(self.max_brightness_nits)),
            ("ref_white_nits", Some(self.ref_white_nits)),
            ("black_in_offset", Some(self.black_in_offset)),
            ("black_out_offset", Some(self.black_out_offset)),
            ("soft_clip_start", self.soft_clip_start),
            ("hard_clip", self.hard_clip),
            ("end_slope", Some(self.end_slope)),
            ("soft_clip_gamma", Some(self.soft_clip_gamma)),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(CurveError::parameter(field, format!("{value} is not finite")));
                }
            }
        }
        if let Some(black) = self.eotf.black() {
            if !black.is_finite() {
                return Err(CurveError::parameter("eotf", "non-finite black level"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_values() {
        let params = GammaParameters {
            max_brightness_nits: 150.0,
            ref_white_nits: 50.0,
            black_out_offset: 0.01,
            black_in_offset: 0.005,
            ..Default::default()
        };
        assert_eq!(params.brightness_scale(), 2.0);
        assert_eq!(params.effective_max_brightness(), 300.0);
        assert!((params.effective_black() - 0.015).abs() < 1e-12);
        assert_eq!(params.input_to_output(300.0), 150.0);
        assert_eq!(params.effective_hard_clip(), f64::INFINITY);
    }

    #[test]
    fn test_input_level_mapping() {
        assert_eq!(InputLevel::Standard.position(255.0), 1.0);
        assert_eq!(InputLevel::Full.position(16.0), 0.0);
        assert_eq!(InputLevel::Full.position(235.0), 1.0);
        let (_, white) = InputLevel::SuperWhite.range();
        assert!((white - 233.661).abs() < 1e-3);
        for level in [InputLevel::Standard, InputLevel::Full, InputLevel::SuperWhite] {
            assert!((level.index(level.position(100.0)) - 100.0).abs() < 1e-9);
            let (b, w) = level.range();
            assert_eq!(InputLevel::from_range(b, w), Some(level));
            assert_eq!(InputLevel::from_name(level.name()), Some(level));
        }
    }

    #[test]
    fn test_clamps_reported() {
        let params = GammaParameters {
            max_brightness_nits: -5.0,
            end_slope: 1.5,
            ..Default::default()
        };
        let (clean, diagnostics) = params.sanitized().unwrap();
        assert_eq!(clean.max_brightness_nits, MIN_MAX_BRIGHTNESS);
        assert_eq!(clean.end_slope, 1.0);
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            diagnostics[0],
            Diagnostic::Clamped { field: "max_brightness_nits", .. }
        ));
    }

    #[test]
    fn test_clip_order_rejected() {
        let params = GammaParameters {
            soft_clip_start: Some(200.0),
            hard_clip: Some(200.0),
            ..Default::default()
        };
        assert!(params.sanitized().unwrap_err().is_parameter());
    }

    #[test]
    fn test_non_finite_rejected() {
        let params = GammaParameters {
            ref_white_nits: f64::NAN,
            ..Default::default()
        };
        assert!(params.sanitized().is_err());
        let params = GammaParameters {
            hard_clip: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(params.sanitized().is_err());
    }

    #[test]
    fn test_hard_clip_below_peak_warns() {
        let params = GammaParameters {
            max_brightness_nits: 100.0,
            ref_white_nits: 25.0,
            hard_clip: Some(300.0),
            ..Default::default()
        };
        let (_, diagnostics) = params.sanitized().unwrap();
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::HardClipBelowPeak { .. }]
        ));
    }
}
