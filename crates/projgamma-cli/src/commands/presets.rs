//! Presets command

use anyhow::Result;
use projgamma_curve::presets::{self, PresetCurve};

/// Lists the built-in presets.
pub fn run(verbose: u8) -> Result<()> {
    for preset in presets::presets() {
        match preset.curve() {
            PresetCurve::Parameters {
                params,
                soft_clip_rule,
            } => {
                let rule = if soft_clip_rule.is_some() { ", soft clip rule" } else { "" };
                println!("  {:<24} {}{rule}", preset.name, params.eotf);
                if verbose > 0 {
                    println!(
                        "  {:<24} max {} ref white {} hard clip {:?}",
                        "", params.max_brightness_nits, params.ref_white_nits, params.hard_clip
                    );
                }
            }
            PresetCurve::Raw(table) => {
                println!("  {:<24} raw table, peak {}", preset.name, table.table().peak());
            }
        }
    }
    Ok(())
}
