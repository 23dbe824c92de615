//! Custom gamma table upload.
//!
//! The projector only shows an uploaded table when the picture mode uses a
//! custom gamma slot whose correction is set to `Import`. [`upload`] checks
//! that first, along with the lamp and the picture mode, so a table is never
//! written to a slot nobody is looking at.
//!
//! [`fold_contrast`] moves the projector's contrast setting into the curve:
//! it scales the reference white, uploads, and only then sets contrast to 0.

use projgamma_curve::{CodeTable, CurveStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::codes::{GammaCorrection, GammaTableSlot, PictureMode, PowerState, ProjectorModel};
use crate::connection::{Connection, TableId};
use crate::error::{LinkError, LinkResult};
use crate::setting::{Setting, SettingValue};

/// How [`upload`] treats the projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadOptions {
    /// Read every channel back and compare.
    pub verify: bool,
    /// Switch the slot's correction to `Import` instead of failing.
    pub select_import: bool,
    /// Only upload while a user picture mode is selected.
    pub require_user_mode: bool,
    /// Send power on when the projector is in standby. The upload still
    /// fails until the lamp is on.
    pub power_on: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            verify: true,
            select_import: false,
            require_user_mode: true,
            power_on: false,
        }
    }
}

/// What [`upload`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Model the projector reported.
    pub model: ProjectorModel,
    /// Picture mode the slot belongs to.
    pub picture_mode: PictureMode,
    /// Slot the table went to.
    pub slot: GammaTableSlot,
    /// Whether the correction had to be switched to `Import`.
    pub selected_import: bool,
    /// Whether every channel was read back and matched.
    pub verified: bool,
}

/// Writes `table` to every channel of the active custom gamma slot.
///
/// Fails with [`LinkError::NotReady`] unless the lamp is on, a user picture
/// mode and a custom slot are selected and, without
/// [`UploadOptions::select_import`], the slot's correction is `Import`.
/// With [`UploadOptions::verify`] a channel that reads back differently
/// fails with [`LinkError::VerifyFailed`].
pub fn upload(
    conn: &mut Connection,
    table: &CodeTable,
    options: UploadOptions,
) -> LinkResult<UploadReport> {
    let model = conn.model()?;
    if let ProjectorModel::Unknown(id) = &model {
        warn!(model = %id, "unknown projector model");
    }

    let SettingValue::Power(power) = conn.read_scalar_setting(Setting::Power)? else {
        return Err(LinkError::protocol("power query returned another setting"));
    };
    if power != PowerState::LampOn {
        if power == PowerState::StandBy && options.power_on {
            info!("powering on");
            conn.write_scalar_setting(Setting::Power, SettingValue::Power(PowerState::LampOn))?;
            return Err(LinkError::NotReady(
                "power on sent, upload again once the lamp is on".into(),
            ));
        }
        return Err(LinkError::NotReady(format!(
            "projector is {power}, the lamp must be on"
        )));
    }

    let SettingValue::PictureMode(picture_mode) =
        conn.read_scalar_setting(Setting::PictureMode)?
    else {
        return Err(LinkError::protocol("picture mode query returned another setting"));
    };
    if options.require_user_mode && !picture_mode.is_user() {
        return Err(LinkError::NotReady(format!(
            "picture mode is {picture_mode}, select User1 to User6"
        )));
    }

    let SettingValue::GammaTable(slot) = conn.read_scalar_setting(Setting::GammaTable)? else {
        return Err(LinkError::protocol("gamma table query returned another setting"));
    };
    if !slot.is_custom() {
        return Err(LinkError::NotReady(format!(
            "gamma table is {slot}, select Custom1, Custom2 or Custom3"
        )));
    }

    let SettingValue::GammaCorrection(correction) =
        conn.read_scalar_setting(Setting::GammaCorrection)?
    else {
        return Err(LinkError::protocol("gamma correction query returned another setting"));
    };
    let selected_import = correction != GammaCorrection::Import;
    if selected_import {
        if !options.select_import {
            return Err(LinkError::NotReady(format!(
                "{slot} uses {correction} correction, not Import"
            )));
        }
        info!(%slot, from = %correction, "switching gamma correction to Import");
        conn.write_verified_setting(
            Setting::GammaCorrection,
            SettingValue::GammaCorrection(GammaCorrection::Import),
        )?;
    }

    conn.write_gamma_table(table)?;

    if options.verify {
        for id in TableId::ALL {
            let back = conn.read_raw_table(id)?;
            if back.table() != table {
                return Err(LinkError::VerifyFailed {
                    command: String::from_utf8_lossy(id.command()).into_owned(),
                });
            }
        }
    }

    info!(%model, %picture_mode, %slot, verified = options.verify, peak = table.peak(), "gamma table uploaded");
    Ok(UploadReport {
        model,
        picture_mode,
        slot,
        selected_import,
        verified: options.verify,
    })
}

/// Uploads the store's active table, recording it in the store on success.
pub fn upload_store(
    conn: &mut Connection,
    store: &mut CurveStore,
    options: UploadOptions,
) -> LinkResult<UploadReport> {
    store.upload_with(|table| upload(conn, table, options))
}

/// What [`fold_contrast`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastFold {
    /// Contrast the projector was set to.
    pub contrast: i16,
    /// Reference white before the fold.
    pub ref_white_before: f64,
    /// Reference white of the uploaded curve.
    pub ref_white_after: f64,
    /// The upload.
    pub report: UploadReport,
}

/// Folds the projector's contrast setting into the store's curve, uploads
/// it and resets contrast to 0.
///
/// Contrast is reset only after the upload succeeds. The store is changed
/// only if the upload succeeds, so a failed upload can be retried without
/// folding twice. Fails with [`LinkError::Curve`] while a raw table is
/// active.
pub fn fold_contrast(
    conn: &mut Connection,
    store: &mut CurveStore,
    options: UploadOptions,
) -> LinkResult<ContrastFold> {
    let SettingValue::Numeric(contrast) = conn.read_scalar_setting(Setting::Contrast)? else {
        return Err(LinkError::protocol("contrast query returned another setting"));
    };
    let ref_white_before = store.params().ref_white_nits;

    let mut folded = store.clone();
    if contrast != 0 {
        let curve = folded.adjust_for_contrast(f64::from(contrast))?;
        for diagnostic in curve.diagnostics() {
            warn!("{diagnostic}");
        }
    } else {
        debug!("contrast already 0");
    }

    let report = upload_store(conn, &mut folded, options)?;
    *store = folded;

    if contrast != 0 {
        if let Err(err) =
            conn.write_verified_setting(Setting::Contrast, SettingValue::Numeric(0))
        {
            warn!(contrast, "uploaded table includes the contrast but it was not reset");
            return Err(err);
        }
    }

    let ref_white_after = store.params().ref_white_nits;
    info!(contrast, from = ref_white_before, to = ref_white_after, "contrast folded into reference white");
    Ok(ContrastFold {
        contrast,
        ref_white_before,
        ref_white_after,
        report,
    })
}
