//! License records and their canonical serialization.
//!
//! A license moves through two types:
//! - [`UnsignedLicense`]: built by the issuer and still adjustable
//! - [`SignedLicense`]: produced only by signing or decoding, read-only
//!
//! # Canonical Form
//!
//! The signature covers the compact JSON object
//! `{"id","name","app","features","valid_until","alg"}` with the fields in
//! exactly that order. The artifact is the standard (padded) base64 of the
//! same object with `"signature"` appended.
//!
//! # License ID
//!
//! `hex(sha256(name ++ app ++ decimal(valid_until)))`, UTF-8, no separators.
//! Changing this breaks every previously issued id.

use crate::error::{LicenseError, LicenseResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use licensa_keystore::{write_atomic, PrivateKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Signature algorithm recorded in every license: ECDSA on P-256 over a
/// SHA-256 digest, DER-encoded.
pub const SIGNATURE_ALGORITHM: &str = "ES256";

/// Validity period used when the issuer does not pick one.
pub const DEFAULT_VALIDITY_DAYS: u32 = 365;

/// Seconds in one day.
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Computes the content-derived license id.
#[must_use]
pub fn license_id(name: &str, app: &str, valid_until: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(app.as_bytes());
    hasher.update(valid_until.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// On-the-wire layout. Field order here is the canonical order.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LicenseDocument {
    id: String,
    name: String,
    app: String,
    features: Vec<String>,
    valid_until: i64,
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
}

impl LicenseDocument {
    fn new(license: &UnsignedLicense, signature: Option<&str>) -> Self {
        Self {
            id: license.id.clone(),
            name: license.name.clone(),
            app: license.app.clone(),
            features: license.features.clone(),
            valid_until: license.valid_until,
            alg: SIGNATURE_ALGORITHM.to_string(),
            signature: signature.map(str::to_string),
        }
    }
}

/// A license that has not been signed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedLicense {
    id: String,
    name: String,
    app: String,
    features: Vec<String>,
    valid_until: i64,
}

impl UnsignedLicense {
    /// Creates a license that expires at `valid_until` (seconds since epoch).
    pub fn new(
        name: impl Into<String>,
        app: impl Into<String>,
        features: impl IntoIterator<Item = impl Into<String>>,
        valid_until: i64,
    ) -> Self {
        let name = name.into();
        let app = app.into();
        Self {
            id: license_id(&name, &app, valid_until),
            name,
            app,
            features: features.into_iter().map(Into::into).collect(),
            valid_until,
        }
    }

    /// Issues a license valid for `validity_days` days from now.
    pub fn issue(
        name: impl Into<String>,
        app: impl Into<String>,
        features: impl IntoIterator<Item = impl Into<String>>,
        validity_days: u32,
    ) -> Self {
        let valid_until = Utc::now().timestamp() + i64::from(validity_days) * SECS_PER_DAY;
        Self::new(name, app, features, valid_until)
    }

    /// Issues a license valid for [`DEFAULT_VALIDITY_DAYS`].
    pub fn issue_default(
        name: impl Into<String>,
        app: impl Into<String>,
        features: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::issue(name, app, features, DEFAULT_VALIDITY_DAYS)
    }

    /// Moves the expiry, recomputing the id.
    #[must_use]
    pub fn with_valid_until(mut self, valid_until: i64) -> Self {
        self.valid_until = valid_until;
        self.id = license_id(&self.name, &self.app, valid_until);
        self
    }

    /// Grants one more feature.
    #[must_use]
    pub fn with_feature(mut self, tag: impl Into<String>) -> Self {
        self.features.push(tag.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn app(&self) -> &str {
        &self.app
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    #[must_use]
    pub fn valid_until(&self) -> i64 {
        self.valid_until
    }

    /// Returns true if `tag` is among the granted features.
    #[must_use]
    pub fn has_feature(&self, tag: &str) -> bool {
        self.features.iter().any(|f| f == tag)
    }

    /// Returns the exact bytes the signature covers.
    pub fn canonical_bytes(&self) -> LicenseResult<Vec<u8>> {
        Ok(serde_json::to_vec(&LicenseDocument::new(self, None))?)
    }

    /// Signs this license. This is the only way to obtain a [`SignedLicense`]
    /// other than decoding one.
    pub fn sign(self, key: &PrivateKey) -> LicenseResult<SignedLicense> {
        crate::signer::sign(self, key)
    }
}

/// A signed license. Fields can be read but not changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLicense {
    license: UnsignedLicense,
    signature: String,
}

impl SignedLicense {
    pub(crate) fn from_parts(license: UnsignedLicense, signature: String) -> Self {
        Self { license, signature }
    }

    /// Returns the signed content.
    #[must_use]
    pub fn license(&self) -> &UnsignedLicense {
        &self.license
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.license.id()
    }

    /// Returns the licensee name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.license.name()
    }

    #[must_use]
    pub fn app(&self) -> &str {
        self.license.app()
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        self.license.features()
    }

    /// Returns the expiry (seconds since epoch).
    #[must_use]
    pub fn valid_until(&self) -> i64 {
        self.license.valid_until()
    }

    /// Returns the expiry as a UTC timestamp, if representable.
    #[must_use]
    pub fn valid_until_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.valid_until(), 0)
    }

    /// Returns the base64-encoded DER signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    #[must_use]
    pub fn algorithm(&self) -> &'static str {
        SIGNATURE_ALGORITHM
    }

    /// Returns true if `tag` is among the granted features. Says nothing
    /// about whether the license is authentic.
    #[must_use]
    pub fn has_feature(&self, tag: &str) -> bool {
        self.license.has_feature(tag)
    }

    /// Returns true if the license expired before now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Returns true if the license expired before `now` (seconds since epoch).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.valid_until() < now
    }

    /// Returns the bytes the signature covers (the record without its signature).
    pub fn canonical_bytes(&self) -> LicenseResult<Vec<u8>> {
        self.license.canonical_bytes()
    }

    /// Serializes the full signed record as JSON.
    pub fn to_json(&self) -> LicenseResult<String> {
        Ok(serde_json::to_string(&LicenseDocument::new(
            &self.license,
            Some(&self.signature),
        ))?)
    }

    /// Encodes the signed record as an artifact (base64 of its JSON).
    pub fn encode(&self) -> LicenseResult<String> {
        Ok(BASE64.encode(self.to_json()?))
    }

    /// Decodes an artifact without checking its signature.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedArtifact`] if the text is not base64,
    /// not a license JSON object, carries unknown fields, names another
    /// signature algorithm, or has no signature.
    pub fn decode(artifact: &str) -> LicenseResult<Self> {
        let json = BASE64
            .decode(artifact.trim())
            .map_err(|e| LicenseError::MalformedArtifact(format!("not base64: {e}")))?;
        let LicenseDocument {
            id,
            name,
            app,
            features,
            valid_until,
            alg,
            signature,
        } = serde_json::from_slice::<LicenseDocument>(&json)
            .map_err(|e| LicenseError::MalformedArtifact(format!("invalid license JSON: {e}")))?;

        if alg != SIGNATURE_ALGORITHM {
            return Err(LicenseError::MalformedArtifact(format!(
                "unsupported signature algorithm {alg:?}"
            )));
        }
        let Some(signature) = signature else {
            return Err(LicenseError::MalformedArtifact(
                "missing signature".to_string(),
            ));
        };

        Ok(Self {
            license: UnsignedLicense {
                id,
                name,
                app,
                features,
                valid_until,
            },
            signature,
        })
    }

    /// Reads and decodes an artifact file without checking its signature.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Storage`] if the file cannot be read and
    /// [`LicenseError::MalformedArtifact`] if its content is not an artifact,
    /// including content that is not UTF-8.
    pub fn read_from(path: &Path) -> LicenseResult<Self> {
        let bytes = fs::read(path)
            .map_err(|e| LicenseError::Storage(format!("{}: {e}", path.display())))?;
        Self::decode(&artifact_text(bytes)?)
    }

    /// Atomically writes the artifact to `path`, replacing prior content.
    pub fn write_to(&self, path: &Path) -> LicenseResult<()> {
        write_atomic(path, self.encode()?.as_bytes())?;
        Ok(())
    }
}

/// Interprets raw license file content as artifact text.
pub(crate) fn artifact_text(bytes: Vec<u8>) -> LicenseResult<String> {
    String::from_utf8(bytes)
        .map_err(|e| LicenseError::MalformedArtifact(format!("not UTF-8 text: {e}")))
}
