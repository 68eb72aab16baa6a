//! The license facade.
//!
//! [`License`] ties together the key store, signing, and verification behind
//! the handful of calls an application needs.
//!
//! # Trust Model
//!
//! The metadata accessors ([`License::id`], [`License::licensee`], ...)
//! decode the artifact without checking its signature. Call
//! [`License::is_valid`] before trusting anything they return.
//!
//! Nothing is cached: every [`License::is_valid`] re-reads the public key
//! and the artifact and re-verifies against the current clock.

use crate::config::LicenseConfig;
use crate::error::{LicenseError, LicenseResult};
use crate::record::{artifact_text, SignedLicense, UnsignedLicense};
use crate::signer::sign_to_file;
use crate::verifier::{check_at, LicenseStatus};
use chrono::Utc;
use std::borrow::Cow;
use std::fs;
use std::io;
use tracing::{debug, info, warn};

/// A license as seen by an issuer or an application.
#[derive(Debug, Clone)]
pub struct License {
    config: LicenseConfig,
    artifact: Option<String>,
}

impl License {
    /// Creates a facade that reads the artifact from `config.license_path`.
    #[must_use]
    pub fn new(config: LicenseConfig) -> Self {
        Self {
            config,
            artifact: None,
        }
    }

    /// Creates a facade over an in-memory artifact. The license file is
    /// neither read nor consulted for queries.
    ///
    /// An empty (or all-whitespace) artifact counts as no artifact, and the
    /// facade falls back to the license file.
    #[must_use]
    pub fn from_artifact(config: LicenseConfig, artifact: impl Into<String>) -> Self {
        let artifact = artifact.into();
        Self {
            config,
            artifact: (!artifact.trim().is_empty()).then_some(artifact),
        }
    }

    /// Returns the configured file locations.
    #[must_use]
    pub fn config(&self) -> &LicenseConfig {
        &self.config
    }

    /// Issues a license valid for `validity_days`, signs it with the key
    /// store's private key, and writes it to the license file.
    ///
    /// The key store is created on first use.
    ///
    /// # Errors
    ///
    /// Propagates key store, signing, and storage errors. The license file is
    /// left untouched on failure.
    pub fn issue_and_sign(
        &self,
        name: impl Into<String>,
        app: impl Into<String>,
        features: impl IntoIterator<Item = impl Into<String>>,
        validity_days: u32,
    ) -> LicenseResult<SignedLicense> {
        self.sign(UnsignedLicense::issue(name, app, features, validity_days))
    }

    /// Signs a prepared license and writes it to the license file.
    pub fn sign(&self, license: UnsignedLicense) -> LicenseResult<SignedLicense> {
        let keys = self.config.keystore().load_or_create()?;
        let signed = sign_to_file(license, keys.private_key(), &self.config.license_path)?;
        info!(
            id = %signed.id(),
            path = %self.config.license_path.display(),
            "issued license"
        );
        Ok(signed)
    }

    /// Returns true iff the license is authentic and not expired.
    ///
    /// A missing, corrupt, forged, or expired license yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the check cannot be attempted: the public
    /// key file is missing or invalid, or the license file is unreadable.
    pub fn is_valid(&self) -> LicenseResult<bool> {
        Ok(self.status()?.is_valid())
    }

    /// Returns the detailed trust decision at the current time.
    pub fn status(&self) -> LicenseResult<LicenseStatus> {
        self.status_at(Utc::now().timestamp())
    }

    /// Returns the detailed trust decision at `now` (seconds since epoch).
    pub fn status_at(&self, now: i64) -> LicenseResult<LicenseStatus> {
        let key = self.config.keystore().read_public_key()?;
        let artifact = match self.read_artifact() {
            Ok(Some(artifact)) => artifact,
            Ok(None) => {
                debug!(path = %self.config.license_path.display(), "no license file");
                return Ok(LicenseStatus::Missing);
            }
            Err(LicenseError::MalformedArtifact(reason)) => {
                warn!(reason = %reason, "rejecting unreadable license content");
                return Ok(LicenseStatus::Malformed { reason });
            }
            Err(e) => return Err(e),
        };
        Ok(check_at(&artifact, &key, now))
    }

    /// Decodes the artifact without verifying it.
    pub fn load(&self) -> LicenseResult<SignedLicense> {
        match &self.artifact {
            Some(artifact) => SignedLicense::decode(artifact),
            None => SignedLicense::read_from(&self.config.license_path),
        }
    }

    /// Returns the license id. Unverified.
    pub fn id(&self) -> LicenseResult<String> {
        Ok(self.load()?.id().to_string())
    }

    /// Returns the licensee name. Unverified.
    pub fn licensee(&self) -> LicenseResult<String> {
        Ok(self.load()?.name().to_string())
    }

    /// Returns the application id. Unverified.
    pub fn app(&self) -> LicenseResult<String> {
        Ok(self.load()?.app().to_string())
    }

    /// Returns the granted features. Unverified.
    pub fn features(&self) -> LicenseResult<Vec<String>> {
        Ok(self.load()?.features().to_vec())
    }

    /// Returns the expiry (seconds since epoch). Unverified.
    pub fn valid_until(&self) -> LicenseResult<i64> {
        Ok(self.load()?.valid_until())
    }

    /// Returns true if the license claims `tag`. Does not check validity;
    /// combine with [`License::is_valid`]. An unreadable license has no
    /// features.
    #[must_use]
    pub fn has_feature(&self, tag: &str) -> bool {
        match self.load() {
            Ok(license) => license.has_feature(tag),
            Err(e) => {
                debug!(error = %e, feature = tag, "feature check on unreadable license");
                false
            }
        }
    }

    fn read_artifact(&self) -> LicenseResult<Option<Cow<'_, str>>> {
        if let Some(artifact) = &self.artifact {
            return Ok(Some(Cow::Borrowed(artifact)));
        }
        let path = &self.config.license_path;
        match fs::read(path) {
            Ok(bytes) => Ok(Some(Cow::Owned(artifact_text(bytes)?))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LicenseError::Storage(format!("{}: {e}", path.display()))),
        }
    }
}
