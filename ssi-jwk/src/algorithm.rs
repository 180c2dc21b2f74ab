use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! algorithms {
    ($(
        $(#[doc = $doc:tt])*
        $(#[serde $serde:tt])?
        $id:ident: $name:literal
    ),*) => {
        /// Signature algorithm.
        #[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Hash, Eq)]
        pub enum Algorithm {
            $(
                $(#[doc = $doc])*
                $(#[serde $serde])?
                #[serde(rename = $name)]
                $id
            ),*
        }

        impl Algorithm {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(
                        Self::$id => $name
                    ),*
                }
            }
        }

        impl FromStr for Algorithm {
            type Err = UnknownAlgorithm;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(
                        $name => Ok(Self::$id),
                    )*
                    other => Err(UnknownAlgorithm(other.to_owned()))
                }
            }
        }
    };
}

algorithms! {
    /// HMAC using SHA-256.
    ///
    /// See: <https://www.rfc-editor.org/rfc/rfc7518.txt>
    HS256: "HS256",

    /// HMAC using SHA-384.
    HS384: "HS384",

    /// HMAC using SHA-512.
    HS512: "HS512",

    /// RSASSA-PKCS1-v1_5 using SHA-256.
    ///
    /// See: <https://www.rfc-editor.org/rfc/rfc7518.txt>
    RS256: "RS256",

    /// RSASSA-PKCS1-v1_5 using SHA-384.
    RS384: "RS384",

    /// RSASSA-PKCS1-v1_5 using SHA-512.
    RS512: "RS512",

    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256.
    ///
    /// See: <https://www.rfc-editor.org/rfc/rfc7518.txt>
    PS256: "PS256",

    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384.
    PS384: "PS384",

    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512.
    PS512: "PS512",

    /// Edwards-curve Digital Signature Algorithm (EdDSA).
    ///
    /// Only the `Ed25519` curve is implemented.
    ///
    /// See: <https://www.rfc-editor.org/rfc/rfc8037>
    EdDSA: "EdDSA",

    /// ECDSA using P-256 and SHA-256.
    ///
    /// See: <https://www.rfc-editor.org/rfc/rfc7518.txt>
    ES256: "ES256",

    /// ECDSA using P-384 and SHA-384.
    ES384: "ES384",

    /// ECDSA using P-521 and SHA-512.
    ES512: "ES512",

    /// ECDSA using secp256k1 (K-256) and SHA-256.
    ///
    /// See: <https://datatracker.ietf.org/doc/html/rfc8812>
    ES256K: "ES256K",

    /// No signature.
    ///
    /// Per the specs it should only be `none` but `None` is kept for backwards
    /// compatibility.
    #[serde(alias = "None")]
    None: "none"
}

impl Algorithm {
    /// Whether this algorithm is an asymmetric digital signature algorithm.
    pub fn is_asymmetric(&self) -> bool {
        !matches!(
            self,
            Self::HS256 | Self::HS384 | Self::HS512 | Self::None
        )
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::None
    }
}

impl AsRef<str> for Algorithm {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Algorithm name that is not part of [`Algorithm`].
#[derive(Debug, thiserror::Error)]
#[error("unknown signature algorithm `{0}`")]
pub struct UnknownAlgorithm(pub String);
