//! Server signing key: the trust root.
//!
//! Loaded once at startup, immutable for the process lifetime, and shared by
//! reference with every in-flight registration. The loader accepts any
//! parseable private key; whether the key can actually sign is decided at
//! sign time, so new key families can be added without touching callers.

use std::path::Path;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, PrivateKeyInfo};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::Sha256;
use thiserror::Error;

/// Trust root errors.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("failed to read signing key: {0}")]
    KeyUnreadable(#[from] std::io::Error),

    #[error("invalid signing key format: {0}")]
    KeyFormatInvalid(String),

    #[error("unsupported key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// A parsed server private key.
#[derive(Debug)]
pub enum PrivateKey {
    /// RSA key, signing-capable (deterministic PKCS#1 v1.5 over SHA-256)
    Rsa(RsaPrivateKey),

    /// Well-formed PKCS#8 key of a family this server cannot sign with.
    /// Kept so the failure surfaces as a typed error at sign time rather
    /// than a parse error at load time.
    Unsupported { algorithm: String },
}

/// The server's signing key plus its domain identity.
#[derive(Debug)]
pub struct TrustRoot {
    key: PrivateKey,
    domain: String,
}

impl TrustRoot {
    /// Load the private key from a PEM file.
    ///
    /// The PEM body is tried as PKCS#8 first, then as PKCS#1; operator keys
    /// produced by either convention must load.
    pub fn load<P: AsRef<Path>>(path: P, domain: impl Into<String>) -> Result<Self, TrustError> {
        let pem_text = std::fs::read_to_string(path)?;
        let block = pem::parse(&pem_text)
            .map_err(|e| TrustError::KeyFormatInvalid(format!("no PEM block found: {e}")))?;
        let key = parse_private_key(block.contents())?;
        Ok(Self::new(key, domain))
    }

    /// Build a trust root from an already-parsed key.
    pub fn new(key: PrivateKey, domain: impl Into<String>) -> Self {
        Self {
            key,
            domain: domain.into(),
        }
    }

    /// Domain identity embedded in every signed message.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Sign a SHA-256 digest with deterministic RSA PKCS#1 v1.5.
    ///
    /// No interior mutability: safe for concurrent use by parallel
    /// registrations.
    pub fn sign_digest(&self, digest: &[u8]) -> Result<Vec<u8>, TrustError> {
        match &self.key {
            PrivateKey::Rsa(key) => key
                .sign(Pkcs1v15Sign::new::<Sha256>(), digest)
                .map_err(|e| TrustError::SigningFailed(e.to_string())),
            PrivateKey::Unsupported { algorithm } => {
                Err(TrustError::UnsupportedKeyAlgorithm(algorithm.clone()))
            }
        }
    }
}

fn parse_private_key(der: &[u8]) -> Result<PrivateKey, TrustError> {
    if let Ok(key) = RsaPrivateKey::from_pkcs8_der(der) {
        return Ok(PrivateKey::Rsa(key));
    }
    if let Ok(key) = RsaPrivateKey::from_pkcs1_der(der) {
        return Ok(PrivateKey::Rsa(key));
    }
    // A PKCS#8 envelope of a non-RSA algorithm still parses; signing with it
    // is rejected later with a typed error.
    if let Ok(info) = PrivateKeyInfo::try_from(der) {
        return Ok(PrivateKey::Unsupported {
            algorithm: info.algorithm.oid.to_string(),
        });
    }
    Err(TrustError::KeyFormatInvalid(
        "not a PKCS#8 or PKCS#1 private key".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::Pkcs1v15Sign;
    use sha2::{Digest, Sha256};
    use std::io::Write;

    const PKCS8_KEY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa2048-pkcs8.pem");
    const PKCS1_KEY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa2048-pkcs1.pem");
    const EC_KEY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/ec-p256-pkcs8.pem");

    #[test]
    fn test_load_pkcs8_key_and_sign() {
        let trust = TrustRoot::load(PKCS8_KEY, "example.com").unwrap();
        assert_eq!(trust.domain(), "example.com");

        let digest = Sha256::digest(b"hello");
        let signature = trust.sign_digest(digest.as_slice()).unwrap();
        assert_eq!(signature.len(), 256); // 2048-bit modulus
    }

    #[test]
    fn test_load_pkcs1_key_and_sign() {
        let trust = TrustRoot::load(PKCS1_KEY, "example.com").unwrap();
        let digest = Sha256::digest(b"hello");
        assert!(trust.sign_digest(digest.as_slice()).is_ok());
    }

    #[test]
    fn test_both_encodings_sign_identically() {
        // Same key material, two container formats, deterministic padding.
        let a = TrustRoot::load(PKCS8_KEY, "example.com").unwrap();
        let b = TrustRoot::load(PKCS1_KEY, "example.com").unwrap();
        let digest = Sha256::digest(b"same message");
        assert_eq!(
            a.sign_digest(digest.as_slice()).unwrap(),
            b.sign_digest(digest.as_slice()).unwrap()
        );
    }

    #[test]
    fn test_signature_verifies() {
        let trust = TrustRoot::load(PKCS8_KEY, "example.com").unwrap();
        let digest = Sha256::digest(b"attested message");
        let signature = trust.sign_digest(digest.as_slice()).unwrap();

        let pem_text = std::fs::read_to_string(PKCS8_KEY).unwrap();
        let block = pem::parse(&pem_text).unwrap();
        let key = RsaPrivateKey::from_pkcs8_der(block.contents())
            .unwrap()
            .to_public_key();
        key.verify(Pkcs1v15Sign::new::<Sha256>(), digest.as_slice(), &signature)
            .unwrap();
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let err = TrustRoot::load("/nonexistent/server.key", "example.com").unwrap_err();
        assert!(matches!(err, TrustError::KeyUnreadable(_)));
    }

    #[test]
    fn test_invalid_pem_is_format_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a pem file").unwrap();

        let err = TrustRoot::load(file.path(), "example.com").unwrap_err();
        assert!(matches!(err, TrustError::KeyFormatInvalid(_)));
    }

    #[test]
    fn test_ec_key_loads_but_cannot_sign() {
        let trust = TrustRoot::load(EC_KEY, "example.com").unwrap();
        let digest = Sha256::digest(b"hello");
        let err = trust.sign_digest(digest.as_slice()).unwrap_err();
        assert!(matches!(err, TrustError::UnsupportedKeyAlgorithm(_)));
    }
}
