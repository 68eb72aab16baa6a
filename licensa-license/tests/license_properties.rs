//! Property-based tests for license signing and verification.
//!
//! These tests verify properties that must hold for any license content:
//! - A freshly signed license verifies with the matching key
//! - Any change to a signed field is detected
//! - Decoding and re-encoding an artifact is byte-identical
//! - Feature membership follows the granted set

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use licensa_license::{
    check, verify, KeyPair, LicenseStatus, SignedLicense, UnsignedLicense, Verification,
};
use proptest::prelude::*;
use std::sync::LazyLock;

static KEYS: LazyLock<KeyPair> = LazyLock::new(|| KeyPair::generate().unwrap());

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn name_strategy() -> impl Strategy<Value = String> {
    "\\PC{0,40}"
}

fn features_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z_]{1,16}", 0..8)
}

fn license_strategy() -> impl Strategy<Value = UnsignedLicense> {
    (name_strategy(), name_strategy(), features_strategy(), 1u32..3650).prop_map(
        |(name, app, features, days)| UnsignedLicense::issue(name, app, features, days),
    )
}

fn sign(license: UnsignedLicense) -> SignedLicense {
    license.sign(KEYS.private_key()).unwrap()
}

// =============================================================================
// SIGNING PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Issue, sign, verify with the matching key is valid.
    #[test]
    fn signed_license_is_valid(license in license_strategy()) {
        let artifact = sign(license).encode().unwrap();
        prop_assert_eq!(check(&artifact, KEYS.public_key()), LicenseStatus::Valid);
    }

    /// Decoding and re-encoding an unmodified artifact is byte-identical.
    #[test]
    fn artifact_roundtrip_is_identity(license in license_strategy()) {
        let artifact = sign(license).encode().unwrap();
        let reencoded = SignedLicense::decode(&artifact).unwrap().encode().unwrap();
        prop_assert_eq!(reencoded, artifact);
    }

    /// Granting an extra feature after signing is detected.
    #[test]
    fn added_feature_is_detected(license in license_strategy(), extra in "[a-z_]{1,16}") {
        let artifact = sign(license).encode().unwrap();
        let json = BASE64.decode(&artifact).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        value["features"].as_array_mut().unwrap().push(serde_json::Value::String(extra));
        let forged = BASE64.encode(serde_json::to_vec(&value).unwrap());

        prop_assert_eq!(verify(&forged, KEYS.public_key()), Verification::Invalid);
    }

    /// Moving the expiry after signing is detected.
    #[test]
    fn moved_expiry_is_detected(license in license_strategy(), shift in 1i64..1_000_000) {
        let artifact = sign(license).encode().unwrap();
        let json = BASE64.decode(&artifact).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        let until = value["valid_until"].as_i64().unwrap();
        value["valid_until"] = serde_json::json!(until + shift);
        let forged = BASE64.encode(serde_json::to_vec(&value).unwrap());

        prop_assert_eq!(verify(&forged, KEYS.public_key()), Verification::Invalid);
    }

    /// Feature membership is exactly the granted set.
    #[test]
    fn has_feature_matches_granted_set(
        features in features_strategy(),
        tag in "[a-z_]{1,16}",
    ) {
        let license = sign(UnsignedLicense::issue("n", "a", features.clone(), 30));
        prop_assert_eq!(license.has_feature(&tag), features.contains(&tag));
        for feature in &features {
            prop_assert!(license.has_feature(feature));
        }
    }
}
