use std::fmt;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand::{CryptoRng, RngCore};
use serde::Serialize;

use crate::{DecodeError, IssueError, SdAlg};

/// Size of the random salt, in bytes.
const DEFAULT_SALT_SIZE: usize = 128 / 8;

pub(crate) fn generate_salt(rng: &mut (impl CryptoRng + RngCore)) -> String {
    let mut salt_bytes = [0u8; DEFAULT_SALT_SIZE];
    rng.fill_bytes(&mut salt_bytes);
    BASE64_URL_SAFE_NO_PAD.encode(salt_bytes)
}

/// Property disclosure, as issued.
///
/// The encoded form is the base64url (no padding) of the compact JSON array
/// `[salt, name, value]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Disclosure {
    /// Base 64 of the random salt
    pub salt: String,

    /// Name of the concealed claim
    pub name: String,

    /// Value of the concealed claim
    pub value: serde_json::Value,

    /// Base 64 of disclosure object
    pub encoded: String,
}

impl Disclosure {
    /// Build a disclosure for `name` with a fresh 128-bit salt drawn from `rng`.
    pub fn new<ClaimValue: Serialize>(
        rng: &mut (impl CryptoRng + RngCore),
        name: &str,
        value: &ClaimValue,
    ) -> Result<Self, serde_json::Error> {
        let salt = generate_salt(rng);
        Self::with_salt(salt, name, serde_json::to_value(value)?)
    }

    /// Build a disclosure from a known salt.
    pub fn with_salt(
        salt: String,
        name: &str,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let json_string = serde_json::to_string(&serde_json::json!([salt, name, value]))?;
        Ok(Self {
            encoded: BASE64_URL_SAFE_NO_PAD.encode(json_string),
            salt,
            name: name.to_owned(),
            value,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Digest of the encoded disclosure, as found in the `_sd` claim.
    pub fn digest(&self, sd_alg: SdAlg) -> Result<String, IssueError> {
        sd_alg.hash(&self.encoded)
    }
}

impl fmt::Display for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

#[derive(Debug, PartialEq)]
pub struct DecodedDisclosure {
    pub salt: String,
    pub kind: DisclosureKind,
}

#[derive(Debug, PartialEq)]
pub enum DisclosureKind {
    Property {
        name: String,
        value: serde_json::Value,
    },
    ArrayItem(serde_json::Value),
}

impl DecodedDisclosure {
    pub fn new(encoded: &str) -> Result<Self, DecodeError> {
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| DecodeError::DisclosureMalformed)?;
        let json: serde_json::Value = serde_json::from_slice(&bytes)?;

        match json {
            serde_json::Value::Array(values) => match values.as_slice() {
                [salt, name, value] => validate_property_disclosure(salt, name, value),
                [salt, value] => validate_array_item_disclosure(salt, value),
                _ => Err(DecodeError::DisclosureMalformed),
            },
            _ => Err(DecodeError::DisclosureMalformed),
        }
    }
}

fn validate_property_disclosure(
    salt: &serde_json::Value,
    name: &serde_json::Value,
    value: &serde_json::Value,
) -> Result<DecodedDisclosure, DecodeError> {
    let salt = salt.as_str().ok_or(DecodeError::DisclosureMalformed)?;

    let name = name.as_str().ok_or(DecodeError::DisclosureMalformed)?;

    Ok(DecodedDisclosure {
        salt: salt.to_owned(),
        kind: DisclosureKind::Property {
            name: name.to_owned(),
            value: value.clone(),
        },
    })
}

fn validate_array_item_disclosure(
    salt: &serde_json::Value,
    value: &serde_json::Value,
) -> Result<DecodedDisclosure, DecodeError> {
    let salt = salt.as_str().ok_or(DecodeError::DisclosureMalformed)?;

    Ok(DecodedDisclosure {
        salt: salt.to_owned(),
        kind: DisclosureKind::ArrayItem(value.clone()),
    })
}
