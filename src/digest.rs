use std::str::FromStr;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::IssueError;

/// Elements of the _sd_alg claim
///
/// Names follow the IANA "Named Information Hash Algorithm" registry. Every
/// variant can be named and parsed, but the SHA-3 family only hashes with the
/// `sha3` feature, `md5` and `sha-1` only with the `legacy-hashes` feature.
/// [`SdAlg::ensure_available`] checks this when the algorithm is selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SdAlg {
    /// MD5. Cryptographically broken, kept for interoperability only.
    Md5,
    /// SHA-1. Cryptographically broken, kept for interoperability only.
    Sha1,
    /// SHA-256 Algorithm for hashing disclosures
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl SdAlg {
    const MD5_STR: &'static str = "md5";
    const SHA1_STR: &'static str = "sha-1";
    const SHA256_STR: &'static str = "sha-256";
    const SHA384_STR: &'static str = "sha-384";
    const SHA512_STR: &'static str = "sha-512";
    const SHA3_256_STR: &'static str = "sha3-256";
    const SHA3_384_STR: &'static str = "sha3-384";
    const SHA3_512_STR: &'static str = "sha3-512";

    /// String encoding of _sd_alg field
    pub fn to_str(&self) -> &'static str {
        match self {
            SdAlg::Md5 => Self::MD5_STR,
            SdAlg::Sha1 => Self::SHA1_STR,
            SdAlg::Sha256 => Self::SHA256_STR,
            SdAlg::Sha384 => Self::SHA384_STR,
            SdAlg::Sha512 => Self::SHA512_STR,
            SdAlg::Sha3_256 => Self::SHA3_256_STR,
            SdAlg::Sha3_384 => Self::SHA3_384_STR,
            SdAlg::Sha3_512 => Self::SHA3_512_STR,
        }
    }

    /// Whether the hash backend is compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            SdAlg::Md5 | SdAlg::Sha1 => cfg!(feature = "legacy-hashes"),
            SdAlg::Sha256 | SdAlg::Sha384 | SdAlg::Sha512 => true,
            SdAlg::Sha3_256 | SdAlg::Sha3_384 | SdAlg::Sha3_512 => cfg!(feature = "sha3"),
        }
    }

    /// Fail with [`IssueError::UnsupportedAlgorithm`] unless the hash backend
    /// is compiled in.
    pub fn ensure_available(self) -> Result<Self, IssueError> {
        if self.is_available() {
            Ok(self)
        } else {
            Err(self.not_enabled())
        }
    }

    fn not_enabled(&self) -> IssueError {
        IssueError::UnsupportedAlgorithm(format!("{} is not enabled in this build", self.to_str()))
    }

    /// Whether the algorithm is no longer collision resistant.
    pub fn is_weak(&self) -> bool {
        matches!(self, SdAlg::Md5 | SdAlg::Sha1)
    }

    /// Length in bytes of the raw digest.
    pub fn digest_len(&self) -> usize {
        match self {
            SdAlg::Md5 => 16,
            SdAlg::Sha1 => 20,
            SdAlg::Sha256 | SdAlg::Sha3_256 => 32,
            SdAlg::Sha384 | SdAlg::Sha3_384 => 48,
            SdAlg::Sha512 | SdAlg::Sha3_512 => 64,
        }
    }

    /// Raw digest of `bytes`.
    pub fn digest(&self, bytes: &[u8]) -> Result<Vec<u8>, IssueError> {
        let digest = match self {
            #[cfg(feature = "legacy-hashes")]
            SdAlg::Md5 => md5::compute(bytes).0.to_vec(),
            #[cfg(feature = "legacy-hashes")]
            SdAlg::Sha1 => sha1::Sha1::digest(bytes).to_vec(),
            SdAlg::Sha256 => sha2::Sha256::digest(bytes).to_vec(),
            SdAlg::Sha384 => sha2::Sha384::digest(bytes).to_vec(),
            SdAlg::Sha512 => sha2::Sha512::digest(bytes).to_vec(),
            #[cfg(feature = "sha3")]
            SdAlg::Sha3_256 => sha3::Sha3_256::digest(bytes).to_vec(),
            #[cfg(feature = "sha3")]
            SdAlg::Sha3_384 => sha3::Sha3_384::digest(bytes).to_vec(),
            #[cfg(feature = "sha3")]
            SdAlg::Sha3_512 => sha3::Sha3_512::digest(bytes).to_vec(),
            #[allow(unreachable_patterns)]
            _ => return Err(self.not_enabled()),
        };
        Ok(digest)
    }

    /// Hash the given encoded disclosure (or decoy salt).
    pub fn hash(&self, encoded: &str) -> Result<String, IssueError> {
        Ok(BASE64_URL_SAFE_NO_PAD.encode(self.digest(encoded.as_bytes())?))
    }
}

impl FromStr for SdAlg {
    type Err = IssueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SdAlg::try_from(s)
    }
}

impl TryFrom<&str> for SdAlg {
    type Error = IssueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(match value {
            Self::MD5_STR => SdAlg::Md5,
            Self::SHA1_STR => SdAlg::Sha1,
            Self::SHA256_STR => SdAlg::Sha256,
            Self::SHA384_STR => SdAlg::Sha384,
            Self::SHA512_STR => SdAlg::Sha512,
            Self::SHA3_256_STR => SdAlg::Sha3_256,
            Self::SHA3_384_STR => SdAlg::Sha3_384,
            Self::SHA3_512_STR => SdAlg::Sha3_512,
            other => return Err(IssueError::UnsupportedAlgorithm(other.to_owned())),
        })
    }
}

impl From<SdAlg> for &'static str {
    fn from(value: SdAlg) -> Self {
        value.to_str()
    }
}

impl Serialize for SdAlg {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SdAlg {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
