//! Active curve state.
//!
//! [`CurveStore`] owns the parameters being edited, the table that would be
//! uploaded next and the last table the device confirmed. Every edit
//! regenerates the table before anything is replaced, so a failed edit
//! leaves the store as it was.

use tracing::{debug, warn};

use crate::contrast;
use crate::engine::{generate, GammaCurve};
use crate::error::{CurveError, CurveResult};
use crate::params::{Diagnostic, GammaParameters};
use crate::record::CurveRecord;
use crate::softclip::{fit_soft_clip_start, SoftClipRule};
use crate::table::{CodeTable, RawTable};

/// The table a store would upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveTable<'a> {
    /// Generated from the store's parameters.
    Generated(&'a GammaCurve),
    /// Read from the device or loaded as-is.
    Raw(&'a RawTable),
}

impl<'a> ActiveTable<'a> {
    /// The table's codes.
    pub fn table(&self) -> &'a CodeTable {
        match *self {
            Self::Generated(curve) => curve.table(),
            Self::Raw(raw) => raw.table(),
        }
    }
}

/// Parameters, active table and upload state.
#[derive(Debug, Clone)]
pub struct CurveStore {
    params: GammaParameters,
    soft_clip_rule: Option<SoftClipRule>,
    curve: GammaCurve,
    raw: Option<RawTable>,
    uploaded: Option<CodeTable>,
}

impl CurveStore {
    /// Store with a curve generated from `params`.
    pub fn new(params: GammaParameters) -> CurveResult<Self> {
        Self::with_rule(params, None)
    }

    /// Store whose soft clip start is fitted by `rule`.
    pub fn with_rule(params: GammaParameters, rule: Option<SoftClipRule>) -> CurveResult<Self> {
        let curve = build(&params, rule.as_ref())?;
        Ok(Self {
            params: stored_params(&curve, &params, rule.as_ref()),
            soft_clip_rule: rule,
            curve,
            raw: None,
            uploaded: None,
        })
    }

    /// Current parameters.
    pub fn params(&self) -> &GammaParameters {
        &self.params
    }

    /// Soft clip rule, if one is attached.
    pub fn soft_clip_rule(&self) -> Option<&SoftClipRule> {
        self.soft_clip_rule.as_ref()
    }

    /// The active table and where it came from.
    pub fn active(&self) -> ActiveTable<'_> {
        match &self.raw {
            Some(raw) => ActiveTable::Raw(raw),
            None => ActiveTable::Generated(&self.curve),
        }
    }

    /// The table that would be uploaded next.
    pub fn table(&self) -> &CodeTable {
        self.active().table()
    }

    /// The generated curve, unless a raw table is active.
    pub fn curve(&self) -> Option<&GammaCurve> {
        match self.raw {
            Some(_) => None,
            None => Some(&self.curve),
        }
    }

    /// Last table the device accepted through [`CurveStore::upload_with`].
    pub fn uploaded(&self) -> Option<&CodeTable> {
        self.uploaded.as_ref()
    }

    /// Returns true if the active table is the one last uploaded.
    pub fn is_uploaded(&self) -> bool {
        self.uploaded.as_ref() == Some(self.table())
    }

    /// Replaces the parameters and regenerates.
    pub fn set_parameters(&mut self, params: GammaParameters) -> CurveResult<&GammaCurve> {
        let curve = build(&params, self.soft_clip_rule.as_ref())?;
        self.params = stored_params(&curve, &params, self.soft_clip_rule.as_ref());
        Ok(self.install(curve))
    }

    /// Edits a copy of the parameters and regenerates.
    ///
    /// # Example
    ///
    /// ```rust
    /// use projgamma_curve::{CurveStore, GammaParameters};
    ///
    /// let mut store = CurveStore::new(GammaParameters::default()).unwrap();
    /// store.edit(|p| p.hard_clip = Some(80.0)).unwrap();
    /// assert_eq!(store.params().hard_clip, Some(80.0));
    ///
    /// // rejected edits change nothing
    /// assert!(store.edit(|p| p.soft_clip_start = Some(90.0)).is_err());
    /// assert_eq!(store.params().soft_clip_start, None);
    /// ```
    pub fn edit(&mut self, f: impl FnOnce(&mut GammaParameters)) -> CurveResult<&GammaCurve> {
        let mut params = self.params.clone();
        f(&mut params);
        self.set_parameters(params)
    }

    /// Attaches or removes the soft clip rule and regenerates.
    pub fn set_soft_clip_rule(&mut self, rule: Option<SoftClipRule>) -> CurveResult<&GammaCurve> {
        let curve = build(&self.params, rule.as_ref())?;
        self.soft_clip_rule = rule;
        Ok(self.install(curve))
    }

    /// Replaces the parameters and the soft clip rule together.
    pub fn replace(
        &mut self,
        params: GammaParameters,
        rule: Option<SoftClipRule>,
    ) -> CurveResult<&GammaCurve> {
        let curve = build(&params, rule.as_ref())?;
        self.params = stored_params(&curve, &params, rule.as_ref());
        self.soft_clip_rule = rule;
        Ok(self.install(curve))
    }

    /// Regenerates from the parameters, replacing a raw table.
    pub fn regenerate(&mut self) -> CurveResult<&GammaCurve> {
        let curve = build(&self.params, self.soft_clip_rule.as_ref())?;
        Ok(self.install(curve))
    }

    /// Makes `table` active; parameters are kept for a later
    /// [`CurveStore::regenerate`].
    pub fn set_raw_table(&mut self, table: RawTable) {
        debug!("raw table active");
        self.raw = Some(table);
    }

    /// Folds a contrast setting into the reference white.
    ///
    /// See [`contrast::adjust_for_contrast`]. Fails while a raw table is
    /// active.
    pub fn adjust_for_contrast(&mut self, contrast_delta: f64) -> CurveResult<&GammaCurve> {
        let curve = self.curve().ok_or_else(|| {
            CurveError::parameter("contrast_delta", "a raw table has no parameters to adjust")
        })?;
        let adjusted = contrast::adjust_for_contrast(curve, contrast_delta)?;
        if self.soft_clip_rule.is_some() {
            // the rule follows the new effective max brightness
            let mut params = self.params.clone();
            params.ref_white_nits = adjusted.params().ref_white_nits;
            return self.set_parameters(params);
        }
        self.params = stored_params(&adjusted, &self.params, None);
        Ok(self.install(adjusted))
    }

    /// Runs `upload` on the active table, remembering it only on success.
    pub fn upload_with<T, E>(
        &mut self,
        upload: impl FnOnce(&CodeTable) -> Result<T, E>,
    ) -> Result<T, E> {
        let result = upload(self.table())?;
        self.uploaded = Some(self.table().clone());
        Ok(result)
    }

    /// Flat record of the store.
    pub fn to_record(&self) -> CurveRecord {
        let mut record = CurveRecord::from_parameters(&self.params, self.soft_clip_rule);
        if let Some(raw) = &self.raw {
            record.table = Some(raw.table().codes().to_vec());
        }
        record
    }

    /// Restores a store from a record.
    ///
    /// A record with a table restores it as the active raw table.
    pub fn from_record(record: CurveRecord) -> CurveResult<Self> {
        let params = record.parameters()?;
        let mut store = Self::with_rule(params, record.soft_clip_rule)?;
        if let Some(codes) = record.table {
            let table = CodeTable::from_codes(codes)?;
            store.set_raw_table(table.into());
        }
        Ok(store)
    }

    fn install(&mut self, curve: GammaCurve) -> &GammaCurve {
        self.raw = None;
        self.curve = curve;
        &self.curve
    }
}

fn build(params: &GammaParameters, rule: Option<&SoftClipRule>) -> CurveResult<GammaCurve> {
    let Some(rule) = rule else {
        return generate(params);
    };
    let start = fit_soft_clip_start(rule, params);
    let mut fitted = params.clone();
    match params.hard_clip {
        Some(hard_clip) if start >= hard_clip => {
            warn!(start, hard_clip, "fitted soft clip not below hard clip, soft clip disabled");
            fitted.soft_clip_start = None;
            let mut curve = generate(&fitted)?;
            curve.diagnostics.push(Diagnostic::SoftClipDisabled {
                fitted: start,
                hard_clip,
            });
            Ok(curve)
        }
        _ => {
            fitted.soft_clip_start = Some(start);
            generate(&fitted)
        }
    }
}

// Clamped values from the curve; with a rule attached the curve's soft clip
// start is derived, so the given one is kept.
fn stored_params(
    curve: &GammaCurve,
    given: &GammaParameters,
    rule: Option<&SoftClipRule>,
) -> GammaParameters {
    let mut params = curve.params().clone();
    if rule.is_some() {
        params.soft_clip_start = given.soft_clip_start;
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TABLE_SIZE;
    use projgamma_transfer::Eotf;

    fn hdr_store() -> CurveStore {
        CurveStore::with_rule(
            GammaParameters {
                eotf: Eotf::Pq,
                ref_white_nits: 25.0,
                hard_clip: Some(4000.0),
                ..Default::default()
            },
            Some(SoftClipRule::new(25.0, 100.0, 0.4).with_hard_clip_scale(0.5)),
        )
        .unwrap()
    }

    #[test]
    fn test_rule_refits_on_edit() {
        let mut store = hdr_store();
        assert_eq!(store.params().soft_clip_start, None);
        assert_eq!(store.curve().unwrap().params().soft_clip_start, Some(175.0));

        // effective max 200: 25 + 175 * 0.4 = 95, below the minimum
        store.edit(|p| p.ref_white_nits = 50.0).unwrap();
        assert_eq!(store.curve().unwrap().params().soft_clip_start, Some(100.0));
    }

    #[test]
    fn test_rule_above_hard_clip_disables_soft_clip() {
        let mut store = hdr_store();
        // effective max 400, hard clip 300: the hard clip term fits 450
        let curve = store.edit(|p| p.hard_clip = Some(300.0)).unwrap();
        assert_eq!(curve.params().soft_clip_start, None);
        assert!(curve.soft_clip_index().is_none());
        assert!(curve.diagnostics().contains(&Diagnostic::SoftClipDisabled {
            fitted: 450.0,
            hard_clip: 300.0,
        }));
        assert!(store.soft_clip_rule().is_some());

        // back below the hard clip once it moves up again
        store.edit(|p| p.hard_clip = Some(4000.0)).unwrap();
        assert_eq!(store.curve().unwrap().params().soft_clip_start, Some(175.0));
    }

    #[test]
    fn test_failed_edit_leaves_store() {
        let mut store = hdr_store();
        let before = store.table().clone();
        assert!(store.edit(|p| p.ref_white_nits = f64::NAN).is_err());
        assert_eq!(store.table(), &before);
        assert_eq!(store.params().ref_white_nits, 25.0);
    }

    #[test]
    fn test_clamped_values_stored() {
        let mut store = CurveStore::new(GammaParameters::default()).unwrap();
        store.edit(|p| p.end_slope = 2.0).unwrap();
        assert_eq!(store.params().end_slope, 1.0);
    }

    #[test]
    fn test_upload_tracking() {
        let mut store = CurveStore::new(GammaParameters::default()).unwrap();
        let failed: Result<(), &str> = store.upload_with(|_| Err("nak"));
        assert!(failed.is_err());
        assert!(store.uploaded().is_none());

        let len = store
            .upload_with(|table| Ok::<_, ()>(table.codes().len()))
            .unwrap();
        assert_eq!(len, TABLE_SIZE);
        assert!(store.is_uploaded());

        store.edit(|p| p.ref_white_nits = 80.0).unwrap();
        assert!(!store.is_uploaded());
    }

    #[test]
    fn test_raw_table_record() {
        let mut store = CurveStore::new(GammaParameters::default()).unwrap();
        let raw = CodeTable::from_fn(|i| i as u16);
        store.set_raw_table(raw.clone().into());
        assert!(store.curve().is_none());
        assert!(store.adjust_for_contrast(5.0).is_err());

        let restored = CurveStore::from_record(store.to_record()).unwrap();
        assert_eq!(restored.table(), &raw);
        assert_eq!(restored.params(), store.params());

        let mut restored = restored;
        restored.regenerate().unwrap();
        assert_eq!(restored.table(), &CodeTable::identity());
    }

    #[test]
    fn test_contrast_with_rule_refits() {
        let mut store = hdr_store();
        let before = store.curve().unwrap().params().soft_clip_start.unwrap();
        store.adjust_for_contrast(-10.0).unwrap();
        assert!(store.params().ref_white_nits < 25.0);
        // lower reference white raises the effective max and the fitted start
        let after = store.curve().unwrap().params().soft_clip_start.unwrap();
        assert!(after > before);
    }

    #[test]
    fn test_replace_is_atomic() {
        let mut store = hdr_store();
        let bad = GammaParameters {
            soft_clip_start: Some(500.0),
            hard_clip: Some(400.0),
            ..Default::default()
        };
        assert!(store.replace(bad, None).is_err());
        assert!(store.soft_clip_rule().is_some());

        store
            .replace(
                GammaParameters {
                    soft_clip_start: Some(90.0),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        assert!(store.soft_clip_rule().is_none());
        assert_eq!(store.params().soft_clip_start, Some(90.0));
    }
}
