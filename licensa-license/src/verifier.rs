//! Signature and expiry checks.
//!
//! Verification keeps three outcomes apart: a good signature, a signature
//! that does not match, and input that could not be checked at all. Callers
//! asking a yes/no question get `false` for the last two.

use crate::record::SignedLicense;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use licensa_keystore::PublicKey;
use p256::ecdsa::signature::DigestVerifier;
use p256::ecdsa::Signature;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Outcome of a signature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The signature matches the record and the key.
    Valid,
    /// The signature is well-formed but does not match.
    Invalid,
    /// The artifact or its signature could not be decoded.
    Malformed(String),
}

impl Verification {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Overall trust decision for a license at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// Authentic and not expired.
    Valid,
    /// Authentic but past `valid_until`.
    Expired,
    /// Signature does not match (tampered content or wrong key).
    InvalidSignature,
    /// Content could not be decoded or checked.
    Malformed {
        /// Why decoding failed.
        reason: String,
    },
    /// No license artifact is present.
    Missing,
}

impl LicenseStatus {
    /// Returns true only for [`LicenseStatus::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Decodes `artifact` and checks its signature against `key`.
#[must_use]
pub fn verify(artifact: &str, key: &PublicKey) -> Verification {
    match SignedLicense::decode(artifact) {
        Ok(license) => verify_license(&license, key),
        Err(e) => {
            warn!(error = %e, "rejecting malformed license artifact");
            Verification::Malformed(e.to_string())
        }
    }
}

/// Checks the signature of an already decoded license against `key`.
#[must_use]
pub fn verify_license(license: &SignedLicense, key: &PublicKey) -> Verification {
    let signature = match BASE64
        .decode(license.signature())
        .ok()
        .and_then(|der| Signature::from_der(&der).ok())
    {
        Some(signature) => signature,
        None => {
            warn!(id = %license.id(), "license signature is not a DER ECDSA signature");
            return Verification::Malformed("signature is not a DER ECDSA signature".to_string());
        }
    };

    let message = match license.canonical_bytes() {
        Ok(message) => message,
        Err(e) => return Verification::Malformed(e.to_string()),
    };

    match key
        .verifying_key()
        .verify_digest(Sha256::new_with_prefix(&message), &signature)
    {
        Ok(()) => Verification::Valid,
        Err(_) => {
            warn!(id = %license.id(), "license signature does not match");
            Verification::Invalid
        }
    }
}

/// Checks signature and expiry of `artifact` at the current time.
#[must_use]
pub fn check(artifact: &str, key: &PublicKey) -> LicenseStatus {
    check_at(artifact, key, Utc::now().timestamp())
}

/// Checks signature and expiry of `artifact` at `now` (seconds since epoch).
///
/// Expiry is only consulted once the signature is known to be good.
#[must_use]
pub fn check_at(artifact: &str, key: &PublicKey, now: i64) -> LicenseStatus {
    let license = match SignedLicense::decode(artifact) {
        Ok(license) => license,
        Err(e) => {
            warn!(error = %e, "rejecting malformed license artifact");
            return LicenseStatus::Malformed {
                reason: e.to_string(),
            };
        }
    };

    match verify_license(&license, key) {
        Verification::Valid if license.is_expired_at(now) => {
            warn!(id = %license.id(), valid_until = license.valid_until(), "license expired");
            LicenseStatus::Expired
        }
        Verification::Valid => LicenseStatus::Valid,
        Verification::Invalid => LicenseStatus::InvalidSignature,
        Verification::Malformed(reason) => LicenseStatus::Malformed { reason },
    }
}

/// Returns true iff the signature of `artifact` matches `key` and the
/// license has not expired.
#[must_use]
pub fn is_valid(artifact: &str, key: &PublicKey) -> bool {
    check(artifact, key).is_valid()
}

impl SignedLicense {
    /// Checks this license's signature against `key`.
    #[must_use]
    pub fn verify(&self, key: &PublicKey) -> Verification {
        verify_license(self, key)
    }
}
