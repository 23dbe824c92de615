//! Built-in starting points.
//!
//! | Name | Kind | Notes |
//! |------|------|-------|
//! | `sdr bt1886` | parameters | 115 nit screen, soft clip at reference white |
//! | `hdr pq` | parameters | PQ at 25 nit reference, fitted soft clip, hard clip 4000 |
//! | `hdr pq 1200` | parameters | as `hdr pq`, hard clip 1200 |
//! | `hdr hlg 250 sc200` | parameters | HLG on a 250 nit screen |
//! | `black level dark test` | raw table | lifts the bottom 50 codes only |
//! | `black level bright test` | raw table | dark test plus a bright upper half |

use projgamma_transfer::Eotf;

use crate::params::{ClipCurveType, GammaParameters};
use crate::softclip::SoftClipRule;
use crate::table::{CodeTable, RawTable};

/// What a preset loads.
#[derive(Debug, Clone, PartialEq)]
pub enum PresetCurve {
    /// Parameters, optionally with a soft clip rule.
    Parameters {
        /// Curve parameters
        params: GammaParameters,
        /// Soft clip rule, overriding `params.soft_clip_start`
        soft_clip_rule: Option<SoftClipRule>,
    },
    /// A fixed table.
    Raw(RawTable),
}

/// A named preset.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    /// Name shown to users and accepted by [`find`].
    pub name: &'static str,
    build: fn() -> PresetCurve,
}

impl Preset {
    /// Builds the preset's curve description.
    pub fn curve(&self) -> PresetCurve {
        (self.build)()
    }
}

static PRESETS: &[Preset] = &[
    Preset {
        name: "sdr bt1886",
        build: sdr_bt1886,
    },
    Preset {
        name: "hdr pq",
        build: hdr_pq_4000,
    },
    Preset {
        name: "hdr pq 1200",
        build: hdr_pq_1200,
    },
    Preset {
        name: "hdr hlg 250 sc200",
        build: hdr_hlg_250,
    },
    Preset {
        name: "black level dark test",
        build: black_level_dark_test,
    },
    Preset {
        name: "black level bright test",
        build: black_level_bright_test,
    },
];

/// All presets, in display order.
pub fn presets() -> &'static [Preset] {
    PRESETS
}

/// Finds a preset by name, ignoring case and `_`/space differences.
pub fn find(name: &str) -> Option<&'static Preset> {
    let key = normalize(name);
    PRESETS.iter().find(|p| normalize(p.name) == key)
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect()
}

fn sdr_bt1886() -> PresetCurve {
    PresetCurve::Parameters {
        params: GammaParameters {
            eotf: Eotf::bt1886(projgamma_transfer::bt1886::DEFAULT_BLACK),
            max_brightness_nits: 115.0,
            ref_white_nits: 100.0,
            soft_clip_start: Some(100.0),
            end_slope: 0.98,
            ..Default::default()
        },
        soft_clip_rule: None,
    }
}

fn hdr_pq_4000() -> PresetCurve {
    hdr_pq(4000.0)
}

fn hdr_pq_1200() -> PresetCurve {
    hdr_pq(1200.0)
}

fn hdr_pq(hard_clip: f64) -> PresetCurve {
    PresetCurve::Parameters {
        params: GammaParameters {
            eotf: Eotf::Pq,
            max_brightness_nits: 100.0,
            ref_white_nits: 25.0,
            hard_clip: Some(hard_clip),
            end_slope: 0.75,
            clip_curve_type: ClipCurveType::CubicBezier,
            soft_clip_gamma: 1.0,
            ..Default::default()
        },
        soft_clip_rule: Some(SoftClipRule::new(25.0, 100.0, 0.4).with_hard_clip_scale(0.5)),
    }
}

fn hdr_hlg_250() -> PresetCurve {
    PresetCurve::Parameters {
        params: GammaParameters {
            eotf: Eotf::Hlg,
            max_brightness_nits: 250.0,
            ref_white_nits: 100.0,
            soft_clip_start: Some(200.0),
            hard_clip: Some(10000.0),
            end_slope: 1.0,
            ..Default::default()
        },
        soft_clip_rule: None,
    }
}

fn black_level_dark_test() -> PresetCurve {
    PresetCurve::Raw(CodeTable::from_fn(|i| 50u16.saturating_sub(i as u16)).into())
}

fn black_level_bright_test() -> PresetCurve {
    PresetCurve::Raw(
        CodeTable::from_fn(|i| {
            if i < 96 {
                50u16.saturating_sub(i as u16)
            } else {
                i as u16 * 4
            }
        })
        .into(),
    )
}
