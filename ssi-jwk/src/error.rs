//! Error types for `ssi-jwk` crate
use base64::DecodeError as Base64Error;
use thiserror::Error;

/// Error type for `ssi-jwk`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Missing curve in JWK
    #[error("Missing curve in JWK")]
    MissingCurve,
    /// Missing elliptic curve point in JWK
    #[error("Missing elliptic curve point in JWK")]
    MissingPoint,
    /// Key type is not supported
    #[error("Key type not supported")]
    UnsupportedKeyType,
    /// Curve not implemented
    #[error("Curve not implemented: '{0}'")]
    CurveNotImplemented(String),
    /// Missing private key parameter in JWK
    #[error("Missing private key parameter in JWK")]
    MissingPrivateKey,
    /// Missing modulus in RSA key
    #[error("Missing modulus in RSA key")]
    MissingModulus,
    /// Missing exponent in RSA key
    #[error("Missing exponent in RSA key")]
    MissingExponent,
    /// Missing prime in RSA key
    #[error("Missing prime in RSA key")]
    MissingPrime,
    /// Private key does not match the public key parameters
    #[error("Private key does not match public key parameters")]
    KeyPairMismatch,
    /// Invalid key length
    #[error("Invalid key length: {0}")]
    InvalidKeyLength(usize),
    /// Elliptic curve key material rejected by the curve implementation
    #[error("Invalid elliptic curve key")]
    InvalidEcKey,
    /// Error decoding Base64
    #[error(transparent)]
    Base64(#[from] Base64Error),
    /// Error parsing a JWK from JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Error from `ed25519-dalek`
    #[cfg(feature = "ed25519")]
    #[error(transparent)]
    Ed25519(#[from] ed25519_dalek::SignatureError),
    /// Error from `rsa` crate
    #[cfg(feature = "rsa")]
    #[error(transparent)]
    Rsa(#[from] rsa::errors::Error),
}
