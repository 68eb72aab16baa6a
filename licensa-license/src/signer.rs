//! ECDSA P-256 signing of license records.
//!
//! The digest is pinned to SHA-256 through `DigestSigner` rather than left to
//! the curve's default, and the signature is stored DER-encoded.

use crate::error::{LicenseError, LicenseResult};
use crate::record::{SignedLicense, UnsignedLicense};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use licensa_keystore::PrivateKey;
use p256::ecdsa::signature::DigestSigner;
use p256::ecdsa::Signature;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// Signs `license` with `key`, producing a [`SignedLicense`].
///
/// # Errors
///
/// Returns [`LicenseError::Signature`] if the signing primitive fails and
/// [`LicenseError::Serialization`] if the canonical form cannot be built.
pub fn sign(license: UnsignedLicense, key: &PrivateKey) -> LicenseResult<SignedLicense> {
    let message = license.canonical_bytes()?;
    let signature: Signature = key
        .signing_key()
        .try_sign_digest(Sha256::new_with_prefix(&message))
        .map_err(|e| LicenseError::Signature(e.to_string()))?;
    let encoded = BASE64.encode(signature.to_der().as_bytes());

    debug!(id = %license.id(), app = %license.app(), "signed license");
    Ok(SignedLicense::from_parts(license, encoded))
}

/// Signs `license` and atomically writes the artifact to `path`, overwriting
/// any prior content. Nothing is written if signing fails.
pub fn sign_to_file(
    license: UnsignedLicense,
    key: &PrivateKey,
    path: &Path,
) -> LicenseResult<SignedLicense> {
    let signed = sign(license, key)?;
    signed.write_to(path)?;
    Ok(signed)
}
