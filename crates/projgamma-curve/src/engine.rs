//! Tone curve construction and table generation.
//!
//! A curve has up to three regions along the normalized EOTF input `p`:
//!
//! ```text
//! level
//!   ^                         hard clip: pinned to the peak level
//!   |                 ______________
//!   |             _.-'
//!   |          .-'   soft clip: Bezier segment drawn in
//!   |        /       soft_clip_gamma space
//!   |      /
//!   |   _/   EOTF region: eotf(p) * lscale + lblack
//!   +-------------------------------------> p
//!          p_soft      p_hard
//! ```
//!
//! Levels are linear light relative to the device peak
//! (`max_brightness_nits`), so 1.0 quantizes to the top output code.
//!
//! The soft clip segment starts on the EOTF curve with the same value and
//! slope (analytic EOTF derivative), ends at the peak level at `p_hard`, and
//! has its control point(s) on the start tangent at a height set by
//! `end_slope`: 0 puts the control point at the start (straight line to the
//! peak), 1 puts it at the peak height (flat arrival).

use projgamma_transfer::Eotf;
use tracing::debug;

use crate::error::CurveResult;
use crate::params::{ClipCurveType, Diagnostic, GammaParameters, InputLevel};
use crate::table::{quantize, CodeTable, TABLE_SIZE};

// Halvings of the Bezier parameter range; enough for f64 input resolution.
const BISECT_STEPS: usize = 48;

/// Soft clip segment in `soft_clip_gamma` space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ClipSegment {
    shape: ClipCurveType,
    gamma: f64,
    start: (f64, f64),
    control: (f64, f64),
    end: (f64, f64),
}

impl ClipSegment {
    #[inline]
    fn bezier(&self, t: f64, a: f64, b: f64, c: f64) -> f64 {
        let s = 1.0 - t;
        match self.shape {
            ClipCurveType::CubicBezier => s * s * s * a + 3.0 * s * t * b + t * t * t * c,
            ClipCurveType::QuadraticBezier => s * s * a + 2.0 * s * t * b + t * t * c,
        }
    }

    /// Linear level at `p`, for `start.0 <= p < end.0`.
    fn level(&self, p: f64) -> f64 {
        // x(t) is monotone because the control point lies between the ends
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..BISECT_STEPS {
            let mid = 0.5 * (lo + hi);
            if self.bezier(mid, self.start.0, self.control.0, self.end.0) < p {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let t = 0.5 * (lo + hi);
        let o = self.bezier(t, self.start.1, self.control.1, self.end.1);
        o.max(0.0).powf(self.gamma)
    }
}

/// Continuous tone curve built from sanitized parameters.
///
/// Used by [`generate`] to fill a [`CodeTable`]; exposed so callers can
/// sample the curve between table indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneCurve {
    eotf: Eotf,
    input_level: InputLevel,
    lblack: f64,
    lscale: f64,
    lhard: f64,
    p_hard: f64,
    hard_reachable: bool,
    clip: Option<ClipSegment>,
}

impl ToneCurve {
    /// Builds the curve. `params` should come from
    /// [`GammaParameters::sanitized`].
    pub fn new(params: &GammaParameters) -> Self {
        let eotf = params.eotf;
        let input_level = params.input_level;
        let bmax = params.effective_max_brightness();
        let lblack = params.effective_black() / bmax;
        let lscale = eotf.peak_nits() / bmax * (1.0 - lblack);
        let lhard = params.effective_hard_clip() / bmax;

        let mut curve = Self {
            eotf,
            input_level,
            lblack,
            lscale,
            lhard,
            p_hard: input_level.position(TABLE_SIZE as f64),
            hard_reachable: false,
            clip: None,
        };

        if lhard.is_finite() && lhard <= curve.eotf_level(curve.p_hard) {
            curve.p_hard = curve.position_of(lhard);
            curve.hard_reachable = true;
        }

        if let Some(soft) = params.soft_clip_start {
            let lsoft = soft / bmax;
            if lsoft < lhard.min(1.0) {
                curve.clip = curve.clip_segment(lsoft, params);
            }
        }

        curve
    }

    /// EOTF region level at `p`, before clipping.
    #[inline]
    pub fn eotf_level(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        self.eotf.evaluate(p) * self.lscale + self.lblack
    }

    /// Position where the EOTF region reaches `level` (0 at or below black).
    fn position_of(&self, level: f64) -> f64 {
        let target = (level - self.lblack) / self.lscale;
        if target <= 0.0 {
            0.0
        } else {
            self.eotf.inverse(target)
        }
    }

    fn clip_segment(&self, lsoft: f64, params: &GammaParameters) -> Option<ClipSegment> {
        let gamma = params.soft_clip_gamma;
        let p0 = self.position_of(lsoft);
        if p0 >= self.p_hard {
            return None;
        }
        let l0 = self.eotf_level(p0);
        let o0 = l0.max(0.0).powf(1.0 / gamma);
        let peak_o = self.lhard.min(1.0).powf(1.0 / gamma);

        // d/dp of l^(1/g), falling back to the chord when the EOTF slope is
        // unusable (zero at black, infinite at the PQ knee)
        let mut gain = if l0 > 0.0 {
            l0.powf(1.0 / gamma - 1.0) / gamma * self.eotf.derivative(p0) * self.lscale
        } else {
            f64::NAN
        };
        if !(gain.is_finite() && gain > 0.0) {
            gain = (peak_o - o0) / (self.p_hard - p0);
        }

        let mut control_o = o0 + (peak_o - o0) * params.end_slope;
        let mut control_p = p0 + (control_o - o0) / gain;
        if p0 + (peak_o - o0) / gain > self.p_hard {
            // tangent too shallow to reach the peak in time
            control_p = self.p_hard;
            control_o = (self.p_hard - p0) * gain + o0;
        }

        Some(ClipSegment {
            shape: params.clip_curve_type,
            gamma,
            start: (p0, o0),
            control: (control_p, control_o),
            end: (self.p_hard, peak_o),
        })
    }

    /// Level the curve is pinned to at and beyond the hard clip.
    pub fn peak_level(&self) -> f64 {
        let level = match &self.clip {
            Some(seg) => seg.end.1.powf(seg.gamma),
            None => self.eotf_level(self.p_hard),
        };
        level.min(self.lhard)
    }

    /// Linear level relative to the device peak at EOTF input `p`.
    pub fn level(&self, p: f64) -> f64 {
        if p >= self.p_hard {
            return self.peak_level();
        }
        let level = match &self.clip {
            Some(seg) if p >= seg.start.0 => seg.level(p),
            _ => self.eotf_level(p),
        };
        level.min(self.lhard)
    }

    /// Level at a (fractional) table index.
    #[inline]
    pub fn level_at_index(&self, index: f64) -> f64 {
        self.level(self.input_level.position(index))
    }

    /// EOTF input where the soft clip segment starts, if there is one.
    pub fn soft_clip_position(&self) -> Option<f64> {
        self.clip.map(|seg| seg.start.0)
    }

    /// EOTF input of the hard clip, if the curve reaches it.
    pub fn hard_clip_position(&self) -> Option<f64> {
        self.hard_reachable.then_some(self.p_hard)
    }

    /// Soft clip segment value at `p` in `soft_clip_gamma` space, before
    /// the hard clip cap.
    pub fn clip_output(&self, p: f64) -> Option<f64> {
        self.clip.map(|seg| {
            if p >= seg.end.0 {
                seg.end.1
            } else {
                seg.level(p).powf(1.0 / seg.gamma)
            }
        })
    }
}

/// A generated gamma table together with the parameters it came from.
///
/// Immutable; editing parameters produces a new curve.
#[derive(Debug, Clone, PartialEq)]
pub struct GammaCurve {
    params: GammaParameters,
    curve: ToneCurve,
    table: CodeTable,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl GammaCurve {
    /// Parameters after clamping.
    pub fn params(&self) -> &GammaParameters {
        &self.params
    }

    /// The quantized table.
    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    /// The continuous curve behind the table.
    pub fn tone_curve(&self) -> &ToneCurve {
        &self.curve
    }

    /// Clamps and warnings raised while generating.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Fractional table index where the soft clip segment starts.
    pub fn soft_clip_index(&self) -> Option<f64> {
        self.curve
            .soft_clip_position()
            .map(|p| self.params.input_level.index(p))
    }

    /// Fractional table index of the hard clip, if inside the table.
    pub fn hard_clip_index(&self) -> Option<f64> {
        self.curve
            .hard_clip_position()
            .map(|p| self.params.input_level.index(p))
            .filter(|i| *i < TABLE_SIZE as f64)
    }

    /// Output code at and beyond the hard clip.
    pub fn peak_code(&self) -> u16 {
        quantize(self.curve.peak_level())
    }
}

impl AsRef<CodeTable> for GammaCurve {
    fn as_ref(&self) -> &CodeTable {
        &self.table
    }
}

/// Generates a gamma curve and its device table.
///
/// Parameters are validated first: structurally invalid input fails with
/// [`CurveError::Parameter`](crate::CurveError::Parameter) before anything
/// is computed, out of range values are clamped and recorded in
/// [`GammaCurve::diagnostics`].
///
/// # Example
///
/// ```rust
/// use projgamma_curve::{generate, GammaParameters};
///
/// // Pure 2.2 at reference brightness is the identity ramp
/// let curve = generate(&GammaParameters::default()).unwrap();
/// assert_eq!(curve.table().codes()[255], 1023);
/// assert_eq!(curve.table().codes()[51], 205);
/// ```
pub fn generate(params: &GammaParameters) -> CurveResult<GammaCurve> {
    let (params, diagnostics) = params.sanitized()?;
    let curve = ToneCurve::new(&params);
    let table = CodeTable::from_fn(|i| quantize(curve.level_at_index(i as f64)));

    debug!(
        eotf = %params.eotf,
        input_level = params.input_level.name(),
        max = params.max_brightness_nits,
        ref_white = params.ref_white_nits,
        soft_clip = ?curve.soft_clip_position().map(|p| params.input_level.index(p)),
        hard_clip = ?curve.hard_clip_position().map(|p| params.input_level.index(p)),
        peak = table.peak(),
        "generated gamma table"
    );

    Ok(GammaCurve {
        params,
        curve,
        table,
        diagnostics,
    })
}
