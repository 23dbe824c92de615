//! Reading records written by the earlier tool.

use projgamma_curve::{
    ClipCurveType, CurveError, CurveStore, InputLevel, StoredRecord, SCHEMA_VERSION,
};
use projgamma_transfer::Eotf;

// Saved parameter file as the old tool wrote it, runtime fields included
const HDR_CONF: &str = r#"{
  "irefblack": 16,
  "ipeakwhite": 235,
  "bblack": 0.0,
  "bblackin": 0.0,
  "brefwhite": 25,
  "bmax": 100,
  "bsoftclip": {"bbase": 25, "bmin": 100, "scale": 0.4, "hcscale": 0.5},
  "bhardclip": 4000,
  "end_slope": 0.75,
  "clip": 0,
  "clip_gamma": 1,
  "eotf": "eotf_pq",
  "highlight": null,
  "debug": 0,
  "isoftclip": 170.2,
  "ihardclip": 216.4,
  "table": null,
  "cliptable": [1.0, 1.0]
}"#;

/// `HDR_CONF` with the table the old tool generated and saved alongside.
fn hdr_conf_with_table(table: serde_json::Value) -> String {
    let mut conf: serde_json::Value = serde_json::from_str(HDR_CONF).unwrap();
    conf["table"] = table;
    conf.to_string()
}

fn ramp() -> Vec<u16> {
    (0..256)
        .map(|i| (i as f64 / 255.0 * 1023.0).round() as u16)
        .collect()
}

fn load(json: &str) -> Result<CurveStore, CurveError> {
    let stored: StoredRecord = serde_json::from_str(json).unwrap();
    CurveStore::from_record(stored.into_record()?)
}

#[test]
fn migrates_hdr_file() {
    let store = load(HDR_CONF).unwrap();
    let params = store.params();
    assert_eq!(params.eotf, Eotf::Pq);
    assert_eq!(params.input_level, InputLevel::Full);
    assert_eq!(params.max_brightness_nits, 100.0);
    assert_eq!(params.ref_white_nits, 25.0);
    assert_eq!(params.hard_clip, Some(4000.0));
    assert_eq!(params.clip_curve_type, ClipCurveType::CubicBezier);

    let rule = store.soft_clip_rule().unwrap();
    assert_eq!(rule.hard_clip_scale, Some(0.5));
    assert_eq!(
        store.curve().unwrap().params().soft_clip_start,
        Some(175.0)
    );

    // saved again at the current schema
    let record = store.to_record();
    assert_eq!(record.schema, SCHEMA_VERSION);
    assert_eq!(record.eotf, "pq");
}

#[test]
fn saved_table_is_regenerated_from_parameters() {
    let store = load(&hdr_conf_with_table(serde_json::json!(ramp()))).unwrap();
    assert!(store.curve().is_some());
    assert_eq!(store.params().eotf, Eotf::Pq);
    assert_ne!(store.table().codes(), &ramp()[..]);
    assert_eq!(store.to_record().table, None);
}

#[test]
fn saved_channel_tables_are_regenerated() {
    let json = hdr_conf_with_table(serde_json::json!([ramp(), ramp(), ramp()]));
    let store = load(&json).unwrap();
    assert!(store.curve().is_some());
}

#[test]
fn migrates_channel_raw_table_file() {
    let json = serde_json::json!({ "table": [ramp(), ramp(), ramp()] }).to_string();
    let store = load(&json).unwrap();
    assert!(store.curve().is_none());
    assert_eq!(store.table().codes(), &ramp()[..]);
}

#[test]
fn migrates_raw_table_file() {
    let codes: Vec<u16> = (0..256).map(|i| 50u16.saturating_sub(i)).collect();
    let json = serde_json::json!({ "table": codes }).to_string();
    let store = load(&json).unwrap();
    assert!(store.curve().is_none());
    assert_eq!(store.table().codes(), &codes[..]);
}

#[test]
fn migrates_fixed_soft_clip() {
    let json = r#"{"bmax": 115, "brefwhite": 100, "bsoftclip": 100,
                   "end_slope": 0.98, "eotf": "eotf_bt1886"}"#;
    let store = load(json).unwrap();
    assert_eq!(store.params().soft_clip_start, Some(100.0));
    assert!(store.soft_clip_rule().is_none());
    assert!(matches!(store.params().eotf, Eotf::Bt1886(_)));
}

#[test]
fn rejects_newer_schema() {
    let mut record = load(HDR_CONF).unwrap().to_record();
    record.schema = SCHEMA_VERSION + 1;
    let json = serde_json::to_string(&record).unwrap();
    assert!(matches!(
        load(&json),
        Err(CurveError::UnsupportedSchema { .. })
    ));
}

#[test]
fn rejects_wrong_table_length() {
    let json = r#"{"table": [0, 1, 2]}"#;
    assert!(matches!(load(json), Err(CurveError::InvalidSize(_))));
}

#[test]
fn rejects_unknown_input_level() {
    let json = r#"{"irefblack": 8, "ipeakwhite": 240}"#;
    assert!(matches!(load(json), Err(CurveError::Record(_))));
}
