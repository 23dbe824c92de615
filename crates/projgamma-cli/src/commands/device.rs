//! Projector commands.
//!
//! Each command opens its own connection and closes it before returning, so
//! a script never holds the projector between steps.

use anyhow::{bail, Result};
use projgamma_link::{fold_contrast, upload_store, Setting, SettingValue, TableId};
use tracing::info;

use super::{arg, with_device, Session};

/// `Pw`: uploads the active table.
pub fn write(session: &mut Session, _args: &[&str]) -> Result<()> {
    let Session {
        store,
        link,
        upload,
    } = session;
    let report = with_device(link, |conn| upload_store(conn, store, *upload))?;
    if report.selected_import {
        info!(slot = %report.slot, "gamma correction switched to Import");
    }
    println!(
        "uploaded to {}{}",
        report.slot,
        if report.verified { ", verified" } else { "" }
    );
    Ok(())
}

/// `Pc`: folds the projector's contrast into the reference white, uploads
/// and sets contrast to 0.
pub fn write_with_contrast(session: &mut Session, _args: &[&str]) -> Result<()> {
    let Session {
        store,
        link,
        upload,
    } = session;
    let fold = with_device(link, |conn| fold_contrast(conn, store, *upload))?;
    if fold.contrast == 0 {
        println!("contrast is 0, uploaded to {}", fold.report.slot);
    } else {
        println!(
            "contrast {} folded, reference white {:.2} -> {:.2}, uploaded to {}",
            fold.contrast, fold.ref_white_before, fold.ref_white_after, fold.report.slot
        );
    }
    Ok(())
}

/// `Pr [channel]`: reads a channel and makes it the active raw table.
pub fn read(session: &mut Session, args: &[&str]) -> Result<()> {
    let id = match args.first() {
        Some(name) => match TableId::from_name(name) {
            Some(id) => id,
            None => bail!("unknown channel {name:?}, expected red, green or blue"),
        },
        None => TableId::Red,
    };
    let raw = with_device(&session.link, |conn| conn.read_raw_table(id))?;
    info!(channel = %id, peak = raw.table().peak(), "table read");
    print!("{}", raw.table());
    session.store.set_raw_table(raw);
    Ok(())
}

/// `Ps <setting> <value>`: writes a setting and reads it back.
pub fn set(session: &mut Session, args: &[&str]) -> Result<()> {
    let name: String = arg(args, 0, "setting")?;
    let Some(setting) = Setting::from_name(&name) else {
        let names: Vec<_> = Setting::ALL.iter().map(|s| s.name()).collect();
        bail!("unknown setting {name:?}, expected one of {}", names.join(", "));
    };
    let text: String = arg(args, 1, "value")?;
    let value = SettingValue::parse(setting, &text)?;
    with_device(&session.link, |conn| conn.write_verified_setting(setting, value))?;
    info!(%setting, %value, "setting changed");
    Ok(())
}

/// `Pm`: prints the model and every readable setting.
pub fn status(session: &mut Session, _args: &[&str]) -> Result<()> {
    let (model, values) = with_device(&session.link, |conn| {
        let model = conn.model()?;
        let mut values = Vec::new();
        for setting in Setting::ALL.iter().filter(|s| s.is_readable()) {
            values.push((*setting, conn.read_scalar_setting(*setting)?));
        }
        Ok((model, values))
    })?;

    println!("model:            {model}");
    for (setting, value) in values {
        let label = format!("{}:", setting.name());
        println!("{label:<18}{value}");
    }
    Ok(())
}
