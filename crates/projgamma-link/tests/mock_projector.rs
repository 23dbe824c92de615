//! Link behaviour against a loopback projector.

mod common;

use std::net::TcpListener;

use common::{Behavior, MockProjector};
use projgamma_curve::{generate, CurveStore, GammaParameters};
use projgamma_link::codes::{GammaCorrection, GammaTableSlot, ModelId, PictureMode, PowerState};
use projgamma_link::frame::pack_table;
use projgamma_link::{
    fold_contrast, upload, upload_store, with_connection, Connection, LinkConfig, LinkError,
    ProjectorModel, Setting, SettingValue, TableId, UploadOptions,
};
use projgamma_transfer::Eotf;

fn hdr_params() -> GammaParameters {
    GammaParameters {
        eotf: Eotf::Pq,
        max_brightness_nits: 120.0,
        ref_white_nits: 30.0,
        soft_clip_start: Some(200.0),
        hard_clip: Some(1000.0),
        ..Default::default()
    }
}

#[test]
fn handshake_and_model() {
    let mock = MockProjector::start(Behavior::Normal);
    let mut conn = Connection::open(&mock.config()).unwrap();
    assert!(conn.is_open());
    assert_eq!(conn.model().unwrap(), ProjectorModel::Known(ModelId::Xhp3));
    assert_eq!(conn.null().unwrap().command(), "null");
    assert_eq!(mock.state().requests[0], b"?\x89\x01MD\n");
    assert_eq!(mock.state().requests[1], b"!\x89\x01\0\0\n");
}

#[test]
fn write_then_read_is_byte_identical() {
    let mock = MockProjector::start(Behavior::Normal);
    let curve = generate(&hdr_params()).unwrap();
    let mut conn = Connection::open(&mock.config()).unwrap();

    let acks = conn.write_gamma_table(&curve).unwrap();
    let commands: Vec<_> = acks.iter().map(|a| a.command()).collect();
    assert_eq!(commands, ["PMDR", "PMDG", "PMDB"]);

    let written = pack_table(curve.table());
    for id in TableId::ALL {
        assert_eq!(conn.read_table_payload(id).unwrap(), written);
        assert_eq!(conn.read_raw_table(id).unwrap().table(), curve.table());
    }
    assert_eq!(mock.state().requests[0], b"!\x89\x01PMDR\n");
    assert_eq!(mock.state().tables[&b"PMDB"[..]], written);
}

#[test]
fn rejected_upload_leaves_store_unchanged() {
    let mock = MockProjector::start(Behavior::Reject {
        command: b"PMDR",
        status: 0x02,
    });
    let mut store = CurveStore::new(hdr_params()).unwrap();
    let before = store.table().clone();
    let mut conn = Connection::open(&mock.config()).unwrap();

    let err = upload_store(&mut conn, &mut store, UploadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        LinkError::DeviceRejected { ref command, code: 0x02 } if command == "PMDR"
    ));
    assert!(store.uploaded().is_none());
    assert_eq!(store.table(), &before);

    // a rejection leaves the stream in step
    assert!(conn.is_open());
    conn.null().unwrap();
}

#[test]
fn upload_records_store_table() {
    let mock = MockProjector::start(Behavior::Normal);
    let mut store = CurveStore::new(hdr_params()).unwrap();
    let report = with_connection(&mock.config(), |conn| {
        upload_store(conn, &mut store, UploadOptions::default())
    })
    .unwrap();

    assert_eq!(report.slot, GammaTableSlot::Custom1);
    assert!(report.verified);
    assert!(!report.selected_import);
    assert!(store.is_uploaded());
    assert_eq!(mock.state().tables.len(), 3);
}

#[test]
fn timeout_closes_connection() {
    let mock = MockProjector::start(Behavior::Silent);
    let mut conn = Connection::open(&mock.config()).unwrap();

    let err = conn.null().unwrap_err();
    assert!(err.is_timeout(), "{err}");
    assert!(!conn.is_open());
    assert!(matches!(conn.null(), Err(LinkError::Closed)));
}

#[test]
fn garbled_reply_closes_connection() {
    let mock = MockProjector::start(Behavior::Garble);
    let mut conn = Connection::open(&mock.config()).unwrap();

    assert!(matches!(
        conn.read_scalar_setting(Setting::Contrast),
        Err(LinkError::Protocol(_))
    ));
    assert!(matches!(
        conn.read_raw_table(TableId::Red),
        Err(LinkError::Closed)
    ));
}

#[test]
fn truncated_table_is_protocol_error() {
    let mock = MockProjector::start(Behavior::Truncate);
    let mut conn = Connection::open(&mock.config()).unwrap();
    assert!(matches!(
        conn.read_raw_table(TableId::Green),
        Err(LinkError::Protocol(_))
    ));
    assert!(!conn.is_open());
}

#[test]
fn bad_handshake_fails_open() {
    let mock = MockProjector::start(Behavior::BadHandshake);
    assert!(matches!(
        Connection::open(&mock.config()),
        Err(LinkError::Protocol(_))
    ));
}

#[test]
fn refused_connection() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = LinkConfig {
        port,
        ..LinkConfig::with_host("127.0.0.1")
    };
    assert!(matches!(
        Connection::open(&config),
        Err(LinkError::Connect { .. })
    ));
}

#[test]
fn scalar_settings() {
    let mock = MockProjector::start(Behavior::Normal);
    let mut conn = Connection::open(&mock.config()).unwrap();

    conn.write_scalar_setting(Setting::Contrast, SettingValue::Numeric(-5))
        .unwrap();
    assert_eq!(mock.state().settings[&b"PMCN"[..]], b"FFFB");
    assert_eq!(
        conn.read_scalar_setting(Setting::Contrast).unwrap(),
        SettingValue::Numeric(-5)
    );

    conn.write_verified_setting(
        Setting::PictureMode,
        SettingValue::PictureMode(PictureMode::User3),
    )
    .unwrap();
    assert_eq!(
        conn.read_scalar_setting(Setting::PictureMode).unwrap(),
        SettingValue::PictureMode(PictureMode::User3)
    );

    assert!(matches!(
        conn.read_scalar_setting(Setting::Remote),
        Err(LinkError::InvalidValue(_))
    ));
    assert!(matches!(
        conn.write_scalar_setting(Setting::Power, SettingValue::Power(PowerState::Cooling)),
        Err(LinkError::InvalidValue(_))
    ));
    assert!(matches!(
        conn.write_scalar_setting(Setting::Brightness, SettingValue::Power(PowerState::LampOn)),
        Err(LinkError::InvalidValue(_))
    ));
    assert!(conn.is_open());
}

#[test]
fn upload_needs_custom_slot() {
    let mock = MockProjector::start(Behavior::Normal);
    let table = generate(&hdr_params()).unwrap().table().clone();
    let mut conn = Connection::open(&mock.config()).unwrap();

    conn.write_scalar_setting(
        Setting::GammaTable,
        SettingValue::GammaTable(GammaTableSlot::Normal),
    )
    .unwrap();
    assert!(matches!(
        upload(&mut conn, &table, UploadOptions::default()),
        Err(LinkError::NotReady(_))
    ));
    assert!(mock.state().tables.is_empty());

    conn.write_scalar_setting(
        Setting::GammaTable,
        SettingValue::GammaTable(GammaTableSlot::Custom2),
    )
    .unwrap();
    conn.write_scalar_setting(
        Setting::GammaCorrection,
        SettingValue::GammaCorrection(GammaCorrection::Gamma22),
    )
    .unwrap();
    assert!(matches!(
        upload(&mut conn, &table, UploadOptions::default()),
        Err(LinkError::NotReady(_))
    ));

    let options = UploadOptions {
        select_import: true,
        ..Default::default()
    };
    let report = upload(&mut conn, &table, options).unwrap();
    assert_eq!(report.slot, GammaTableSlot::Custom2);
    assert!(report.selected_import);
    assert_eq!(mock.state().settings[&b"PMGC"[..]], b"04");
}

#[test]
fn verify_catches_dropped_table() {
    let mock = MockProjector::start(Behavior::Forgetful);
    let table = generate(&hdr_params()).unwrap().table().clone();
    let mut conn = Connection::open(&mock.config()).unwrap();

    assert!(matches!(
        upload(&mut conn, &table, UploadOptions::default()),
        Err(LinkError::VerifyFailed { .. })
    ));

    let unverified = UploadOptions {
        verify: false,
        ..Default::default()
    };
    assert!(!upload(&mut conn, &table, unverified).unwrap().verified);
}

fn set_mock(mock: &MockProjector, command: &[u8], value: &[u8]) {
    mock.state().settings.insert(command.to_vec(), value.to_vec());
}

#[test]
fn upload_needs_lamp_on() {
    let mock = MockProjector::start(Behavior::Normal);
    let table = generate(&hdr_params()).unwrap().table().clone();
    let mut conn = Connection::open(&mock.config()).unwrap();

    set_mock(&mock, b"PW", b"2");
    let err = upload(&mut conn, &table, UploadOptions::default()).unwrap_err();
    assert!(matches!(err, LinkError::NotReady(ref msg) if msg.contains("Cooling")), "{err}");

    // standby without power_on is left alone
    set_mock(&mock, b"PW", b"0");
    assert!(matches!(
        upload(&mut conn, &table, UploadOptions::default()),
        Err(LinkError::NotReady(_))
    ));
    assert_eq!(mock.state().settings[&b"PW"[..]], b"0");

    let power_on = UploadOptions {
        power_on: true,
        ..Default::default()
    };
    assert!(matches!(
        upload(&mut conn, &table, power_on),
        Err(LinkError::NotReady(_))
    ));
    assert_eq!(mock.state().settings[&b"PW"[..]], b"1");
    assert!(mock.state().tables.is_empty());

    // lamp is on now
    let report = upload(&mut conn, &table, power_on).unwrap();
    assert_eq!(report.model, ProjectorModel::Known(ModelId::Xhp3));
    assert_eq!(mock.state().tables.len(), 3);
}

#[test]
fn upload_needs_user_picture_mode() {
    let mock = MockProjector::start(Behavior::Normal);
    let table = generate(&hdr_params()).unwrap().table().clone();
    let mut conn = Connection::open(&mock.config()).unwrap();

    set_mock(&mock, b"PMPM", b"03");
    let err = upload(&mut conn, &table, UploadOptions::default()).unwrap_err();
    assert!(matches!(err, LinkError::NotReady(ref msg) if msg.contains("Natural")), "{err}");
    assert!(mock.state().tables.is_empty());

    let any_mode = UploadOptions {
        require_user_mode: false,
        ..Default::default()
    };
    let report = upload(&mut conn, &table, any_mode).unwrap();
    assert_eq!(report.picture_mode, PictureMode::Natural);

    set_mock(&mock, b"PMPM", b"0D");
    let report = upload(&mut conn, &table, UploadOptions::default()).unwrap();
    assert_eq!(report.picture_mode, PictureMode::User2);
}

#[test]
fn unknown_model_still_uploads() {
    let mock = MockProjector::start(Behavior::Normal);
    set_mock(&mock, b"MD", b"ILAFPJ -- XYZ1");
    let table = generate(&hdr_params()).unwrap().table().clone();
    let mut conn = Connection::open(&mock.config()).unwrap();

    let report = upload(&mut conn, &table, UploadOptions::default()).unwrap();
    assert!(matches!(report.model, ProjectorModel::Unknown(_)));
}

#[test]
fn contrast_folds_into_uploaded_table() {
    let mock = MockProjector::start(Behavior::Normal);
    set_mock(&mock, b"PMCN", b"FFFB");
    let mut store = CurveStore::new(hdr_params()).unwrap();
    let mut expected = CurveStore::new(hdr_params()).unwrap();
    expected.adjust_for_contrast(-5.0).unwrap();

    let fold = with_connection(&mock.config(), |conn| {
        fold_contrast(conn, &mut store, UploadOptions::default())
    })
    .unwrap();

    assert_eq!(fold.contrast, -5);
    assert_eq!(fold.ref_white_before, 30.0);
    assert!(fold.ref_white_after < 30.0);
    assert_eq!(store.params().ref_white_nits, fold.ref_white_after);
    assert_eq!(store.table(), expected.table());
    assert!(store.is_uploaded());
    assert_eq!(mock.state().tables[&b"PMDG"[..]], pack_table(expected.table()));
    assert_eq!(mock.state().settings[&b"PMCN"[..]], b"0000");
}

#[test]
fn contrast_kept_when_upload_fails() {
    let mock = MockProjector::start(Behavior::Reject {
        command: b"PMDR",
        status: 0x02,
    });
    set_mock(&mock, b"PMCN", b"FFFB");
    let mut store = CurveStore::new(hdr_params()).unwrap();
    let before = store.table().clone();
    let mut conn = Connection::open(&mock.config()).unwrap();

    let err = fold_contrast(&mut conn, &mut store, UploadOptions::default()).unwrap_err();
    assert!(matches!(err, LinkError::DeviceRejected { .. }));
    assert_eq!(mock.state().settings[&b"PMCN"[..]], b"FFFB");
    assert_eq!(store.params().ref_white_nits, 30.0);
    assert_eq!(store.table(), &before);
    assert!(!store.is_uploaded());
}

#[test]
fn zero_contrast_uploads_unchanged() {
    let mock = MockProjector::start(Behavior::Normal);
    let mut store = CurveStore::new(hdr_params()).unwrap();
    let before = store.table().clone();
    let mut conn = Connection::open(&mock.config()).unwrap();

    let fold = fold_contrast(&mut conn, &mut store, UploadOptions::default()).unwrap();
    assert_eq!(fold.contrast, 0);
    assert_eq!(fold.ref_white_after, fold.ref_white_before);
    assert_eq!(store.table(), &before);
    assert!(store.is_uploaded());
}
