//! Table properties over a grid of parameters.

use projgamma_curve::{
    adjust_for_contrast, generate, ClipCurveType, CurveRecord, GammaParameters, InputLevel,
    TABLE_SIZE,
};
use projgamma_transfer::Eotf;

fn grid() -> Vec<GammaParameters> {
    let mut out = Vec::new();
    for eotf in Eotf::all() {
        for input_level in [InputLevel::Standard, InputLevel::Full, InputLevel::SuperWhite] {
            for (max, ref_white) in [(100.0, 100.0), (50.0, 150.0), (250.0, 25.0)] {
                for (soft, hard) in [
                    (None, None),
                    (Some(0.0), Some(150.0)),
                    (Some(20.0), None),
                    (Some(80.0), Some(1000.0)),
                    (None, Some(60.0)),
                ] {
                    for end_slope in [0.0, 0.5, 1.0] {
                        for clip_curve_type in
                            [ClipCurveType::CubicBezier, ClipCurveType::QuadraticBezier]
                        {
                            for soft_clip_gamma in [0.5, 1.0, 2.2] {
                                out.push(GammaParameters {
                                    eotf,
                                    input_level,
                                    max_brightness_nits: max,
                                    ref_white_nits: ref_white,
                                    black_out_offset: 0.02,
                                    soft_clip_start: soft,
                                    hard_clip: hard,
                                    end_slope,
                                    clip_curve_type,
                                    soft_clip_gamma,
                                    ..Default::default()
                                });
                            }
                        }
                    }
                }
            }
        }
    }
    out
}

#[test]
fn tables_are_monotonic() {
    for params in grid() {
        let curve = generate(&params).unwrap();
        let codes = curve.table().codes();
        assert_eq!(codes.len(), TABLE_SIZE);
        assert!(curve.table().is_monotonic(), "{params:?}: {codes:?}");
    }
}

#[test]
fn hard_clip_pins_peak_code() {
    for params in grid() {
        let curve = generate(&params).unwrap();
        let Some(hard) = curve.hard_clip_index() else {
            continue;
        };
        let peak = curve.peak_code();
        let first = hard.ceil() as usize;
        for (i, &code) in curve.table().codes().iter().enumerate().skip(first) {
            assert_eq!(code, peak, "{params:?}: index {i} past hard clip {hard}");
        }
    }
}

#[test]
fn soft_clip_continues_eotf_region() {
    let clipped = GammaParameters {
        eotf: Eotf::Pq,
        ref_white_nits: 25.0,
        soft_clip_start: Some(175.0),
        hard_clip: Some(1000.0),
        ..Default::default()
    };
    let unclipped = GammaParameters {
        soft_clip_start: None,
        ..clipped.clone()
    };
    let a = generate(&clipped).unwrap();
    let b = generate(&unclipped).unwrap();
    let start = a.soft_clip_index().unwrap();
    let first = start.ceil() as usize;

    assert_eq!(a.table().codes()[..first], b.table().codes()[..first]);
    for i in first..first + 2 {
        let diff = a.table()[i].abs_diff(b.table()[i]);
        assert!(diff <= 1, "index {i}: {} vs {}", a.table()[i], b.table()[i]);
    }
}

#[test]
fn flat_end_slope_flattens_tail() {
    let slopes = |end_slope: f64| {
        let curve = generate(&GammaParameters {
            eotf: Eotf::Pq,
            ref_white_nits: 25.0,
            soft_clip_start: Some(175.0),
            hard_clip: Some(1000.0),
            end_slope,
            ..Default::default()
        })
        .unwrap();
        let tone = curve.tone_curve();
        let p0 = tone.soft_clip_position().unwrap();
        let p1 = tone.hard_clip_position().unwrap();
        let h = 1.0 / 255.0;
        let out = |p: f64| tone.clip_output(p).unwrap();
        let head = (out(p0 + h) - out(p0)) / h;
        let tail = (out(p1) - out(p1 - 3.0 * h)) / (3.0 * h);
        (head, tail)
    };

    let (head, tail) = slopes(1.0);
    assert!(tail < head * 0.01, "head {head}, tail {tail}");

    // a straight segment keeps its slope to the end
    let (head, tail) = slopes(0.0);
    assert!((tail - head).abs() < head * 1e-3, "head {head}, tail {tail}");
}

#[test]
fn zero_contrast_is_identity() {
    for params in grid().into_iter().step_by(17) {
        let curve = generate(&params).unwrap();
        assert_eq!(adjust_for_contrast(&curve, 0.0).unwrap(), curve);
    }
}

#[test]
fn records_roundtrip_parameters() {
    for params in grid() {
        let record = CurveRecord::from_parameters(&params, None);
        assert_eq!(record.parameters().unwrap(), params);
    }
}

#[test]
fn records_roundtrip_through_json() {
    let params = GammaParameters {
        eotf: Eotf::bt1886(0.0005),
        input_level: InputLevel::SuperWhite,
        max_brightness_nits: 115.0,
        black_in_offset: 0.25,
        soft_clip_start: Some(100.0),
        end_slope: 0.98,
        clip_curve_type: ClipCurveType::QuadraticBezier,
        ..Default::default()
    };
    let json = serde_json::to_string(&CurveRecord::from_parameters(&params, None)).unwrap();
    let record: CurveRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record.parameters().unwrap(), params);
}

#[test]
fn reference_white_scales_ramp() {
    // output code 511 at input 255
    let half = generate(&GammaParameters {
        ref_white_nits: 100.0 * (511.0_f64 / 1023.0).powf(2.2),
        ..Default::default()
    })
    .unwrap();
    let expected: Vec<u16> = (0..256)
        .map(|i| (i as f64 / 255.0 * 511.0).round() as u16)
        .collect();
    assert_eq!(half.table().codes(), &expected[..]);

    // output code 2047 at input 255, clipped at 1023
    let double = generate(&GammaParameters {
        ref_white_nits: 100.0 * (2047.0_f64 / 1023.0).powf(2.2),
        ..Default::default()
    })
    .unwrap();
    let expected: Vec<u16> = (0..256)
        .map(|i| ((i as f64 / 255.0 * 2047.0).round() as u16).min(1023))
        .collect();
    assert_eq!(double.table().codes(), &expected[..]);
}
