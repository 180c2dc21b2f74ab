use ssi_jwk::Algorithm;

/// Errors in the issuance pathway
#[derive(thiserror::Error, Debug)]
pub enum IssueError {
    /// Issuer or holder key is malformed, not private, or not usable for signing
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Signing or digest algorithm is unknown, unsupported or not compiled in
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signing algorithm cannot be used with the issuer key
    #[error("Algorithm {algorithm} is not compatible with {key} key")]
    AlgorithmKeyMismatch { algorithm: Algorithm, key: String },

    /// Claim value or header could not be represented as JSON
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Claims are not a non-empty JSON object, or use a reserved name
    #[error("Invalid claim set: {0}")]
    InvalidClaimSet(String),

    /// Extra headers tried to set a header the signer controls
    #[error("Header `{0}` cannot be overridden")]
    ReservedHeader(String),
}

impl From<ssi_jwk::Error> for IssueError {
    fn from(value: ssi_jwk::Error) -> Self {
        Self::InvalidKey(value.to_string())
    }
}

impl From<ssi_jws::Error> for IssueError {
    fn from(value: ssi_jws::Error) -> Self {
        match value {
            ssi_jws::Error::JWK(e) => e.into(),
            ssi_jws::Error::Json(e) => Self::Serialization(e),
            ssi_jws::Error::UnsupportedAlgorithm(algorithm) => {
                Self::UnsupportedAlgorithm(algorithm.to_string())
            }
            ssi_jws::Error::AlgorithmMismatch(algorithm, key) => {
                Self::AlgorithmKeyMismatch { algorithm, key }
            }
            other => Self::InvalidKey(other.to_string()),
        }
    }
}

/// Errors in the decode pathway
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// Unable to deserialize string format of concatenated tildes
    #[error("Unable to deserialize string format of concatenated tildes")]
    UnableToDeserializeStringFormat,

    /// JWT payload claims were not a JSON object
    #[error("JWT payload claims were not a JSON object")]
    ClaimsWrongType,

    /// JWT is missing _sd_alg property
    #[error("JWT is missing _sd_alg property")]
    MissingSdAlg,

    /// Unknown or disabled value of _sd_alg
    #[error("Unknown value of _sd_alg {0}")]
    UnknownSdAlg(String),

    /// Multiple disclosures given with the same hash
    #[error("Multiple disclosures given with the same hash")]
    MultipleDisclosuresWithSameHash,

    /// An _sd claim wasn't a string
    #[error("An _sd claim wasn't a string")]
    SdClaimNotString,

    /// An _sd property was not an array type
    #[error("An _sd property was not an array type")]
    SdPropertyNotArray,

    /// A disclosure claim would collide with an existing JWT claim
    #[error("A disclosure claim would collide with an existing JWT claim")]
    DisclosureClaimCollidesWithJwtClaim,

    /// A disclosure is malformed
    #[error("A disclosure is malformed")]
    DisclosureMalformed,

    /// A single disclosure was used multiple times
    #[error("A single disclosure was used multiple times")]
    DisclosureUsedMultipleTimes,

    /// Found an array item disclosure when expecting a property type
    #[error("Found an array item disclosure when expecting a property type")]
    ArrayDisclosureWhenExpectingProperty,

    /// Found a property type disclosure when expecting an array item
    #[error("Found a property type disclosure when expecting an array item")]
    PropertyDisclosureWhenExpectingArray,

    /// A disclosure was not used during decoding
    #[error("A disclosure was not used during decoding")]
    UnusedDisclosure,

    /// Bubbled up error from ssi_jws
    #[error(transparent)]
    JWS(#[from] ssi_jws::Error),

    /// Bubbled up error from serde_json
    #[error(transparent)]
    JsonDeserialization(#[from] serde_json::Error),
}
