//! Curve editing commands

use std::path::Path;

use anyhow::{bail, Result};
use projgamma_curve::presets::{self, PresetCurve};
use projgamma_curve::{ActiveTable, ClipCurveType, GammaParameters, InputLevel, SoftClipRule};
use projgamma_transfer::Eotf;
use tracing::{info, warn};

use super::{arg, optional_nits, save_record, Session};

/// Applies an edit and reports the result.
fn edit(session: &mut Session, what: &str, f: impl FnOnce(&mut GammaParameters)) -> Result<()> {
    let curve = session.store.edit(f)?;
    for diagnostic in curve.diagnostics() {
        warn!("{diagnostic}");
    }
    info!(
        peak = curve.peak_code(),
        soft_clip = ?curve.soft_clip_index().map(|i| format!("{i:.1}")),
        hard_clip = ?curve.hard_clip_index().map(|i| format!("{i:.1}")),
        "{what} set"
    );
    Ok(())
}

pub fn set_eotf(session: &mut Session, args: &[&str]) -> Result<()> {
    let name: String = arg(args, 0, "eotf")?;
    let Some(mut eotf) = Eotf::from_name(&name) else {
        let names: Vec<_> = Eotf::all().iter().map(|e| e.name()).collect();
        bail!("unknown eotf {name:?}, expected one of {}", names.join(", "));
    };
    // reselecting BT.1886 keeps its black level
    if let (Eotf::Bt1886(_), Some(black)) = (eotf, session.store.params().eotf.black()) {
        eotf = Eotf::bt1886(black);
    }
    edit(session, "eotf", |p| p.eotf = eotf)
}

pub fn set_eotf_black(session: &mut Session, args: &[&str]) -> Result<()> {
    let black: f64 = arg(args, 0, "level")?;
    let current = session.store.params().eotf;
    if current.black().is_none() {
        bail!("eotf {} has no black level", current.name());
    }
    if !(0.0..1.0).contains(&black) {
        bail!("black level {black} must be in [0, 1)");
    }
    edit(session, "eotf black", |p| p.eotf = Eotf::bt1886(black))
}

pub fn set_input_level(session: &mut Session, args: &[&str]) -> Result<()> {
    let name: String = arg(args, 0, "level")?;
    let Some(level) = InputLevel::from_name(&name) else {
        bail!("unknown input level {name:?}, expected standard, full or super_white");
    };
    edit(session, "input level", |p| p.input_level = level)
}

pub fn set_max_brightness(session: &mut Session, args: &[&str]) -> Result<()> {
    let nits: f64 = arg(args, 0, "nits")?;
    edit(session, "max brightness", |p| p.max_brightness_nits = nits)
}

pub fn set_ref_white(session: &mut Session, args: &[&str]) -> Result<()> {
    let nits: f64 = arg(args, 0, "nits")?;
    edit(session, "reference white", |p| p.ref_white_nits = nits)
}

pub fn set_black_in(session: &mut Session, args: &[&str]) -> Result<()> {
    let nits: f64 = arg(args, 0, "nits")?;
    edit(session, "black in", |p| p.black_in_offset = nits)
}

pub fn set_black_out(session: &mut Session, args: &[&str]) -> Result<()> {
    let nits: f64 = arg(args, 0, "nits")?;
    edit(session, "black out", |p| p.black_out_offset = nits)
}

pub fn set_hard_clip(session: &mut Session, args: &[&str]) -> Result<()> {
    let nits = optional_nits(args, 0, "nits")?;
    edit(session, "hard clip", |p| p.hard_clip = nits)
}

/// `sc <nits>`, `sc none` or `sc rule <base> <min> <scale> [hard_clip_scale]`.
pub fn set_soft_clip(session: &mut Session, args: &[&str]) -> Result<()> {
    if args.first().is_some_and(|a| a.eq_ignore_ascii_case("rule")) {
        let mut rule = SoftClipRule::new(
            arg(args, 1, "base")?,
            arg(args, 2, "min")?,
            arg(args, 3, "scale")?,
        );
        if args.len() > 4 {
            rule = rule.with_hard_clip_scale(arg(args, 4, "hard_clip_scale")?);
        }
        let curve = session.store.set_soft_clip_rule(Some(rule))?;
        info!(
            start = ?curve.params().soft_clip_start,
            "soft clip rule set"
        );
        return Ok(());
    }

    let nits = optional_nits(args, 0, "nits")?;
    if session.store.soft_clip_rule().is_none() {
        return edit(session, "soft clip", |p| p.soft_clip_start = nits);
    }
    let mut params = session.store.params().clone();
    params.soft_clip_start = nits;
    session.store.replace(params, None)?;
    info!(start = ?nits, "soft clip rule removed");
    Ok(())
}

pub fn set_end_slope(session: &mut Session, args: &[&str]) -> Result<()> {
    let slope: f64 = arg(args, 0, "slope")?;
    edit(session, "end slope", |p| p.end_slope = slope)
}

pub fn set_clip_type(session: &mut Session, args: &[&str]) -> Result<()> {
    let name: String = arg(args, 0, "type")?;
    let shape = match name.to_ascii_lowercase().as_str() {
        "cubic" | "0" => ClipCurveType::CubicBezier,
        "quadratic" | "1" => ClipCurveType::QuadraticBezier,
        _ => bail!("unknown soft clip type {name:?}, expected cubic or quadratic"),
    };
    edit(session, "soft clip type", |p| p.clip_curve_type = shape)
}

pub fn set_clip_gamma(session: &mut Session, args: &[&str]) -> Result<()> {
    let gamma: f64 = arg(args, 0, "gamma")?;
    edit(session, "soft clip gamma", |p| p.soft_clip_gamma = gamma)
}

pub fn contrast_to_ref_white(session: &mut Session, args: &[&str]) -> Result<()> {
    let delta: f64 = arg(args, 0, "contrast")?;
    let before = session.store.params().ref_white_nits;
    let curve = session.store.adjust_for_contrast(delta)?;
    for diagnostic in curve.diagnostics() {
        warn!("{diagnostic}");
    }
    info!(
        contrast = delta,
        from = before,
        to = curve.params().ref_white_nits,
        "reference white scaled, set projector contrast to 0"
    );
    Ok(())
}

pub fn load_preset(session: &mut Session, args: &[&str]) -> Result<()> {
    if args.is_empty() {
        for preset in presets::presets() {
            println!("{}", preset.name);
        }
        return Ok(());
    }
    let name = args.join(" ");
    let Some(preset) = presets::find(&name) else {
        bail!("unknown preset {name:?}, 'lp' lists them");
    };
    match preset.curve() {
        PresetCurve::Parameters {
            params,
            soft_clip_rule,
        } => {
            session.store.replace(params, soft_clip_rule)?;
        }
        PresetCurve::Raw(table) => session.store.set_raw_table(table),
    }
    info!(preset = preset.name, "preset loaded");
    Ok(())
}

pub fn show(session: &mut Session, _args: &[&str]) -> Result<()> {
    let store = &session.store;
    let params = store.params();
    println!("eotf:             {}", params.eotf);
    println!("input level:      {}", params.input_level.name());
    println!(
        "max brightness:   {} (effective {:.2})",
        params.max_brightness_nits,
        params.effective_max_brightness()
    );
    println!("reference white:  {}", params.ref_white_nits);
    println!(
        "black in / out:   {} / {} (effective {:.4})",
        params.black_in_offset,
        params.black_out_offset,
        params.effective_black()
    );
    match store.soft_clip_rule() {
        Some(rule) => println!(
            "soft clip:        rule base {} min {} scale {} hard clip scale {:?}",
            rule.base, rule.min, rule.scale, rule.hard_clip_scale
        ),
        None => println!("soft clip:        {}", nits_or_none(params.soft_clip_start)),
    }
    println!("hard clip:        {}", nits_or_none(params.hard_clip));
    println!(
        "soft clip shape:  {:?}, end slope {}, gamma {}",
        params.clip_curve_type, params.end_slope, params.soft_clip_gamma
    );

    match store.active() {
        ActiveTable::Generated(curve) => {
            if let Some(start) = curve.params().soft_clip_start {
                println!("fitted soft clip: {start:.2}");
            }
            if let Some(index) = curve.soft_clip_index() {
                println!("soft clip index:  {index:.2}");
            }
            if let Some(index) = curve.hard_clip_index() {
                println!("hard clip index:  {index:.2}");
            }
            for diagnostic in curve.diagnostics() {
                println!("warning:          {diagnostic}");
            }
        }
        ActiveTable::Raw(_) => println!("table:            raw (parameters not applied)"),
    }
    println!(
        "uploaded:         {}",
        if store.is_uploaded() { "yes" } else { "no" }
    );
    println!();
    print!("{}", store.table());
    Ok(())
}

fn nits_or_none(nits: Option<f64>) -> String {
    nits.map_or_else(|| "none".to_string(), |n| n.to_string())
}

/// `rec` prints the record, `rec <path>` saves it.
pub fn record(session: &mut Session, args: &[&str]) -> Result<()> {
    match args.first() {
        Some(path) => {
            save_record(Path::new(path), &session.store)?;
            info!(path, "record saved");
        }
        None => println!("{}", serde_json::to_string_pretty(&session.store.to_record())?),
    }
    Ok(())
}
