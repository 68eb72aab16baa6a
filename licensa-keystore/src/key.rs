//! P-256 key material.
//!
//! Private keys travel as base64 of their PKCS#8 PEM text and public keys as
//! base64 of their SPKI PEM text. Both encodings carry the curve OID, so a
//! key for any other curve is rejected on decode.

use crate::error::{KeyStoreError, KeyStoreResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

/// Size of a P-256 private scalar in bytes.
pub const SCALAR_SIZE: usize = 32;

/// Rejection sampling bound. A uniformly random 32-byte string falls outside
/// the P-256 scalar range with probability below 2^-32.
const MAX_GENERATE_ATTEMPTS: usize = 8;

/// A P-256 private key together with its stored encoding.
#[derive(Clone)]
pub struct PrivateKey {
    secret: p256::SecretKey,
    encoded: Zeroizing<String>,
}

impl PrivateKey {
    /// Generates a new random private key from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Configuration`] if the random source fails.
    pub fn generate() -> KeyStoreResult<Self> {
        let mut bytes = Zeroizing::new([0u8; SCALAR_SIZE]);
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            rand::rngs::OsRng
                .try_fill_bytes(&mut bytes[..])
                .map_err(|e| KeyStoreError::Configuration(format!("OS random source failed: {e}")))?;

            // Zero and values at or above the group order are not valid scalars.
            if let Ok(secret) = p256::SecretKey::from_slice(&bytes[..]) {
                let pem = secret
                    .to_pkcs8_pem(LineEnding::LF)
                    .map_err(|e| KeyStoreError::Key(format!("cannot encode private key: {e}")))?;
                let encoded = Zeroizing::new(BASE64.encode(pem.as_bytes()));
                return Ok(Self { secret, encoded });
            }
        }
        Err(KeyStoreError::Key(
            "random source produced no valid P-256 scalar".to_string(),
        ))
    }

    /// Parses a private key from its stored form (base64 of PEM text).
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Key`] if the text is not base64, not PEM, or
    /// not a P-256 private key.
    pub fn from_encoded(encoded: &str) -> KeyStoreResult<Self> {
        let encoded = encoded.trim();
        let pem = Zeroizing::new(decode_pem_text(encoded, "private")?);
        let secret = parse_secret(&pem)?;
        Ok(Self {
            secret,
            encoded: Zeroizing::new(encoded.to_string()),
        })
    }

    /// Parses a private key from PEM text. Both PKCS#8 (`PRIVATE KEY`) and
    /// SEC1 (`EC PRIVATE KEY`) documents are accepted.
    pub fn from_pem(pem: &str) -> KeyStoreResult<Self> {
        let secret = parse_secret(pem)?;
        Ok(Self {
            secret,
            encoded: Zeroizing::new(BASE64.encode(pem.as_bytes())),
        })
    }

    /// Returns the stored encoding (base64 of PEM text).
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Derives the matching public key.
    pub fn public_key(&self) -> KeyStoreResult<PublicKey> {
        PublicKey::from_key(self.secret.public_key())
    }

    /// Returns the ECDSA signing key for this private key.
    #[must_use]
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from(&self.secret)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("encoded", &"[REDACTED]")
            .finish()
    }
}

/// A P-256 public key together with its stored encoding.
#[derive(Debug, Clone)]
pub struct PublicKey {
    key: p256::PublicKey,
    encoded: String,
}

impl PublicKey {
    fn from_key(key: p256::PublicKey) -> KeyStoreResult<Self> {
        let pem = key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyStoreError::Key(format!("cannot encode public key: {e}")))?;
        Ok(Self {
            key,
            encoded: BASE64.encode(pem.as_bytes()),
        })
    }

    /// Parses a public key from its stored form (base64 of SPKI PEM text).
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Key`] if the text is not base64, not PEM, or
    /// not a P-256 public key.
    pub fn from_encoded(encoded: &str) -> KeyStoreResult<Self> {
        let encoded = encoded.trim();
        let pem = decode_pem_text(encoded, "public")?;
        let key = p256::PublicKey::from_public_key_pem(&pem)
            .map_err(|e| KeyStoreError::Key(format!("not a P-256 public key: {e}")))?;
        Ok(Self {
            key,
            encoded: encoded.to_string(),
        })
    }

    /// Parses a public key from SPKI PEM text.
    pub fn from_pem(pem: &str) -> KeyStoreResult<Self> {
        let key = p256::PublicKey::from_public_key_pem(pem)
            .map_err(|e| KeyStoreError::Key(format!("not a P-256 public key: {e}")))?;
        Ok(Self {
            key,
            encoded: BASE64.encode(pem.as_bytes()),
        })
    }

    /// Returns the stored encoding (base64 of PEM text).
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Returns the ECDSA verifying key for this public key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey::from(&self.key)
    }

    /// Returns the uncompressed SEC1 encoding of the curve point.
    #[must_use]
    pub fn to_sec1_bytes(&self) -> Box<[u8]> {
        self.key.to_sec1_bytes()
    }
}

// Equality is by curve point; two PEM texts for the same key compare equal.
impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PublicKey {}

/// A matching private/public key pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random P-256 key pair.
    pub fn generate() -> KeyStoreResult<Self> {
        let private_key = PrivateKey::generate()?;
        let public_key = private_key.public_key()?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Parses a key pair from stored encodings and checks that the public key
    /// belongs to the private key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Key`] if either key is invalid or the two do
    /// not form a pair.
    pub fn from_encoded(private_key: &str, public_key: &str) -> KeyStoreResult<Self> {
        let private_key = PrivateKey::from_encoded(private_key)?;
        let public_key = PublicKey::from_encoded(public_key)?;
        if private_key.public_key()? != public_key {
            return Err(KeyStoreError::Key(
                "public key does not belong to the private key".to_string(),
            ));
        }
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Returns the private half.
    #[must_use]
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Returns the public half.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

fn decode_pem_text(encoded: &str, kind: &str) -> KeyStoreResult<String> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| KeyStoreError::Key(format!("{kind} key is not base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| {
        e.into_bytes().zeroize();
        KeyStoreError::Key(format!("{kind} key is not PEM text"))
    })
}

fn parse_secret(pem: &str) -> KeyStoreResult<p256::SecretKey> {
    p256::SecretKey::from_pkcs8_pem(pem)
        .or_else(|_| p256::SecretKey::from_sec1_pem(pem))
        .map_err(|e| KeyStoreError::Key(format!("not a P-256 private key: {e}")))
}
