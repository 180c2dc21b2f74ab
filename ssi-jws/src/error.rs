use ssi_jwk::Algorithm;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    JWK(#[from] ssi_jwk::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    /// Errors from p256, p384, k256, ed25519-dalek and rsa signers
    #[error(transparent)]
    Crypto(#[from] signature::Error),
    /// Unknown `crit` header name in JWT header
    #[error("Unknown critical header name in JWT header")]
    UnknownCriticalHeader,
    /// Algorithm in JWS header does not match JWK
    #[error("Algorithm {0} is not compatible with {1} key")]
    AlgorithmMismatch(Algorithm, String),
    /// Invalid JWS
    #[error("Invalid JWS")]
    InvalidJWS,
    /// Unsupported algorithm
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(Algorithm),
    #[error("Invalid signature")]
    InvalidSignature,
}
