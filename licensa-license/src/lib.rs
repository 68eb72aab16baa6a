//! License issuance and verification for Licensa.
//!
//! This crate handles:
//! - Building license records bound to a licensee, an application, and a
//!   feature set
//! - Signing them with the vendor's P-256 key (ECDSA, SHA-256)
//! - Persisting the signed artifact and verifying it offline
//!
//! # Artifact Format
//!
//! A license file holds `base64(json)` where the JSON is:
//!
//! ```text
//! {"id":"<hex>","name":"..","app":"..","features":[..],
//!  "valid_until":<unix secs>,"alg":"ES256","signature":"<b64 DER>"}
//! ```
//!
//! The signature covers the same JSON without the `signature` field, in
//! the field order shown (see [`UnsignedLicense::canonical_bytes`]).
//!
//! # Usage
//!
//! ```no_run
//! use licensa_license::{License, LicenseConfig};
//!
//! let license = License::new(LicenseConfig::in_dir("/var/lib/acme"));
//! license.issue_and_sign("Acme Corp", "OneCloud", ["module_disclosure"], 30)?;
//!
//! if license.is_valid()? && license.has_feature("module_disclosure") {
//!     println!("licensed to {}", license.licensee()?);
//! }
//! # Ok::<(), licensa_license::LicenseError>(())
//! ```

mod config;
mod error;
mod license;
mod record;
mod signer;
mod verifier;

pub use config::{LicenseConfig, DEFAULT_LICENSE_FILE};
pub use error::{LicenseError, LicenseResult};
pub use license::License;
pub use record::{
    license_id, SignedLicense, UnsignedLicense, DEFAULT_VALIDITY_DAYS, SECS_PER_DAY,
    SIGNATURE_ALGORITHM,
};
pub use signer::{sign, sign_to_file};
pub use verifier::{check, check_at, is_valid, verify, verify_license, LicenseStatus, Verification};

pub use licensa_keystore::{KeyPair, KeyStore, KeyStorePaths, PrivateKey, PublicKey};
