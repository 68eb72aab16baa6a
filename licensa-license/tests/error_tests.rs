use licensa_keystore::KeyStoreError;
use licensa_license::LicenseError;
use std::io;
use std::path::PathBuf;

#[test]
fn error_display_configuration() {
    let err = LicenseError::Configuration("no entropy".into());
    assert!(format!("{err}").contains("configuration error"));
}

#[test]
fn error_display_key() {
    let err = LicenseError::Key("key file not found".into());
    let msg = format!("{err}");
    assert!(msg.contains("key error"));
    assert!(msg.contains("not found"));
}

#[test]
fn error_display_storage() {
    let err = LicenseError::Storage("disk full".into());
    assert!(format!("{err}").contains("storage"));
}

#[test]
fn error_display_malformed_artifact() {
    let err = LicenseError::MalformedArtifact("missing signature".into());
    let msg = format!("{err}");
    assert!(msg.contains("malformed license artifact"));
    assert!(msg.contains("missing signature"));
}

#[test]
fn error_display_signature() {
    let err = LicenseError::Signature("primitive failed".into());
    assert!(format!("{err}").contains("signature operation failed"));
}

#[test]
fn error_from_serde_json() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let license_err: LicenseError = serde_err.unwrap_err().into();
    assert!(format!("{license_err}").contains("serialization"));
}

// ── KeyStoreError conversion ─────────────────────────────────────

#[test]
fn keystore_configuration_maps_to_configuration() {
    let err: LicenseError = KeyStoreError::Configuration("rng".into()).into();
    assert!(matches!(err, LicenseError::Configuration(msg) if msg == "rng"));
}

#[test]
fn keystore_key_maps_to_key() {
    let err: LicenseError = KeyStoreError::Key("bad curve".into()).into();
    assert!(matches!(err, LicenseError::Key(msg) if msg == "bad curve"));
}

#[test]
fn keystore_storage_maps_to_storage_with_path() {
    let err: LicenseError = KeyStoreError::Storage {
        path: PathBuf::from("/tmp/license.txt"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    }
    .into();
    match err {
        LicenseError::Storage(msg) => {
            assert!(msg.contains("/tmp/license.txt"));
            assert!(msg.contains("denied"));
        }
        other => panic!("expected Storage, got {other:?}"),
    }
}

#[test]
fn error_is_debug() {
    let err = LicenseError::Signature("x".into());
    let _ = format!("{err:?}");
}
