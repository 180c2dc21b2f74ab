#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::convert::TryFrom;
use std::result::Result;
use std::str::FromStr;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

mod algorithm;
pub mod error;

pub use algorithm::{Algorithm, UnknownAlgorithm};
pub use error::Error;

// RFC 7517 - JSON Web Key (JWK)
// RFC 7518 - JSON Web Algorithms (JWA)
// RFC 8037 - CFRG ECDH and Signatures in JOSE
// RFC 8812 - CBOR Object Signing and Encryption (COSE) and JSON Object Signing and Encryption
//  (JOSE) Registrations for Web Authentication (WebAuthn) Algorithms

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq)]
pub struct JWK {
    #[serde(rename = "use")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_use: Option<String>,
    #[serde(rename = "key_ops")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_operations: Option<Vec<String>>,
    #[serde(rename = "alg")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(rename = "x5u")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_url: Option<String>,
    #[serde(rename = "x5c")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_certificate_chain: Option<Vec<String>>,
    #[serde(flatten)]
    pub params: Params,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    RSA(RSAParams),
    #[serde(rename = "oct")]
    Symmetric(SymmetricParams),
    OKP(OctetParams),
}

impl Drop for ECParams {
    fn drop(&mut self) {
        // Zeroize private key
        if let Some(ref mut d) = self.ecc_private_key {
            d.zeroize();
        }
    }
}

impl Drop for RSAParams {
    fn drop(&mut self) {
        // Zeroize private key fields
        for field in [
            &mut self.private_exponent,
            &mut self.first_prime_factor,
            &mut self.second_prime_factor,
            &mut self.first_prime_factor_crt_exponent,
            &mut self.second_prime_factor_crt_exponent,
            &mut self.first_crt_coefficient,
        ]
        .into_iter()
        .flatten()
        {
            field.zeroize();
        }
    }
}

impl Drop for SymmetricParams {
    fn drop(&mut self) {
        // Zeroize private/symmetric key
        if let Some(ref mut k) = self.key_value {
            k.zeroize();
        }
    }
}

impl Drop for OctetParams {
    fn drop(&mut self) {
        // Zeroize private key
        if let Some(ref mut d) = self.private_key {
            d.zeroize();
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq)]
pub struct ECParams {
    // Parameters for Elliptic Curve Public Keys
    #[serde(rename = "crv")]
    pub curve: Option<String>,
    #[serde(rename = "x")]
    pub x_coordinate: Option<Base64urlUInt>,
    #[serde(rename = "y")]
    pub y_coordinate: Option<Base64urlUInt>,

    // Parameters for Elliptic Curve Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecc_private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, Hash, Eq)]
pub struct RSAParams {
    // Parameters for RSA Public Keys
    #[serde(rename = "n")]
    pub modulus: Option<Base64urlUInt>,
    #[serde(rename = "e")]
    pub exponent: Option<Base64urlUInt>,

    // Parameters for RSA Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_exponent: Option<Base64urlUInt>,
    #[serde(rename = "p")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_prime_factor: Option<Base64urlUInt>,
    #[serde(rename = "q")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_prime_factor: Option<Base64urlUInt>,
    #[serde(rename = "dp")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_prime_factor_crt_exponent: Option<Base64urlUInt>,
    #[serde(rename = "dq")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_prime_factor_crt_exponent: Option<Base64urlUInt>,
    #[serde(rename = "qi")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_crt_coefficient: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq)]
pub struct SymmetricParams {
    // Parameters for Symmetric Keys
    #[serde(rename = "k")]
    pub key_value: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq)]
pub struct OctetParams {
    // Parameters for Octet Key Pair Public Keys
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(rename = "x")]
    pub public_key: Base64urlUInt,

    // Parameters for Octet Key Pair Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
#[serde(try_from = "String")]
#[serde(into = "Base64urlUIntString")]
pub struct Base64urlUInt(pub Vec<u8>);
type Base64urlUIntString = String;

impl JWK {
    /// Default signature algorithm for this key.
    ///
    /// The `alg` member wins when present; otherwise the algorithm is derived
    /// from the key type and curve.
    pub fn get_algorithm(&self) -> Option<Algorithm> {
        if let Some(algorithm) = self.algorithm {
            return Some(algorithm);
        }
        match &self.params {
            Params::RSA(_) => {
                return Some(Algorithm::PS256);
            }
            Params::OKP(okp_params) if okp_params.curve == "Ed25519" => {
                return Some(Algorithm::EdDSA);
            }
            Params::EC(ec_params) => {
                let curve = match &ec_params.curve {
                    Some(curve) => curve,
                    None => return None,
                };
                match &curve[..] {
                    "secp256k1" => {
                        return Some(Algorithm::ES256K);
                    }
                    "P-256" => {
                        return Some(Algorithm::ES256);
                    }
                    "P-384" => {
                        return Some(Algorithm::ES384);
                    }
                    _ => {}
                }
            }
            _ => {}
        };
        None
    }

    /// Strip private key material
    pub fn to_public(&self) -> Self {
        let mut key = self.clone();
        key.params = key.params.to_public();
        key
    }

    /// Whether the key carries private (or symmetric) key material.
    pub fn is_private(&self) -> bool {
        self.params.is_private()
    }
}

impl FromStr for JWK {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl From<Params> for JWK {
    fn from(params: Params) -> Self {
        Self {
            params,
            public_key_use: None,
            key_operations: None,
            algorithm: None,
            key_id: None,
            x509_url: None,
            x509_certificate_chain: None,
        }
    }
}

impl Params {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        match self {
            Self::EC(params) => Self::EC(params.to_public()),
            Self::RSA(params) => Self::RSA(params.to_public()),
            Self::Symmetric(params) => Self::Symmetric(params.to_public()),
            Self::OKP(params) => Self::OKP(params.to_public()),
        }
    }

    pub fn is_private(&self) -> bool {
        match self {
            Self::EC(params) => params.ecc_private_key.is_some(),
            Self::RSA(params) => params.private_exponent.is_some(),
            Self::Symmetric(params) => params.key_value.is_some(),
            Self::OKP(params) => params.private_key.is_some(),
        }
    }

    /// The `kty` member of the key.
    pub fn key_type(&self) -> &'static str {
        match self {
            Self::EC(_) => "EC",
            Self::RSA(_) => "RSA",
            Self::Symmetric(_) => "oct",
            Self::OKP(_) => "OKP",
        }
    }

    /// The `crv` member of the key, if the key type has one.
    pub fn curve(&self) -> Option<&str> {
        match self {
            Self::EC(params) => params.curve.as_deref(),
            Self::OKP(params) => Some(&params.curve),
            _ => None,
        }
    }
}

impl ECParams {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            x_coordinate: self.x_coordinate.clone(),
            y_coordinate: self.y_coordinate.clone(),
            ecc_private_key: None,
        }
    }

    #[allow(dead_code)]
    fn check_curve(&self, expected: &str) -> Result<(), Error> {
        let curve = self.curve.as_ref().ok_or(Error::MissingCurve)?;
        if curve != expected {
            return Err(Error::CurveNotImplemented(curve.to_string()));
        }
        Ok(())
    }

    /// SEC1 uncompressed encoding of the public point (`0x04 || x || y`).
    #[allow(dead_code)]
    fn sec1_uncompressed(&self, coordinate_len: usize) -> Result<Vec<u8>, Error> {
        let x = self.x_coordinate.as_ref().ok_or(Error::MissingPoint)?;
        let y = self.y_coordinate.as_ref().ok_or(Error::MissingPoint)?;
        for coordinate in [x, y] {
            if coordinate.0.len() != coordinate_len {
                return Err(Error::InvalidKeyLength(coordinate.0.len()));
            }
        }
        let mut bytes = Vec::with_capacity(1 + 2 * coordinate_len);
        bytes.push(0x04);
        bytes.extend_from_slice(&x.0);
        bytes.extend_from_slice(&y.0);
        Ok(bytes)
    }

    #[allow(dead_code)]
    fn private_key_bytes(&self) -> Result<&[u8], Error> {
        Ok(&self
            .ecc_private_key
            .as_ref()
            .ok_or(Error::MissingPrivateKey)?
            .0)
    }
}

impl RSAParams {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        Self::new_public(self.exponent.clone(), self.modulus.clone())
    }

    /// Construct a RSA public key
    pub fn new_public(exponent: Option<Base64urlUInt>, modulus: Option<Base64urlUInt>) -> Self {
        Self {
            modulus,
            exponent,
            private_exponent: None,
            first_prime_factor: None,
            second_prime_factor: None,
            first_prime_factor_crt_exponent: None,
            second_prime_factor_crt_exponent: None,
            first_crt_coefficient: None,
        }
    }

    /// Validate key size is at least 2048 bits, per [RFC 7518 section 3.3](https://www.rfc-editor.org/rfc/rfc7518#section-3.3).
    pub fn validate_key_size(&self) -> Result<(), Error> {
        let n = &self.modulus.as_ref().ok_or(Error::MissingModulus)?.0;
        let leading_zeros = n.iter().take_while(|b| **b == 0).count();
        let len = n.len() - leading_zeros;
        if len < 256 {
            return Err(Error::InvalidKeyLength(len));
        }
        Ok(())
    }
}

impl SymmetricParams {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        Self { key_value: None }
    }
}

impl OctetParams {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            public_key: self.public_key.clone(),
            private_key: None,
        }
    }
}

/// Implements the public and secret key conversions for a short Weierstrass
/// curve. The secret key conversion checks that `x`/`y`, when present, belong
/// to `d`.
macro_rules! ec_key_conversions {
    ($feature:literal, $krate:ident, $curve:literal, $len:literal) => {
        #[cfg(feature = $feature)]
        impl TryFrom<&ECParams> for $krate::PublicKey {
            type Error = Error;
            fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
                params.check_curve($curve)?;
                let sec1 = params.sec1_uncompressed($len)?;
                $krate::PublicKey::from_sec1_bytes(&sec1).map_err(|_| Error::InvalidEcKey)
            }
        }

        #[cfg(feature = $feature)]
        impl TryFrom<&ECParams> for $krate::SecretKey {
            type Error = Error;
            fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
                params.check_curve($curve)?;
                let private_key = params.private_key_bytes()?;
                if private_key.len() != $len {
                    return Err(Error::InvalidKeyLength(private_key.len()));
                }
                let secret_key =
                    $krate::SecretKey::from_slice(private_key).map_err(|_| Error::InvalidEcKey)?;
                if params.x_coordinate.is_some() || params.y_coordinate.is_some() {
                    let public_key = $krate::PublicKey::try_from(params)?;
                    if secret_key.public_key() != public_key {
                        return Err(Error::KeyPairMismatch);
                    }
                }
                Ok(secret_key)
            }
        }
    };
}

ec_key_conversions!("secp256r1", p256, "P-256", 32);
ec_key_conversions!("secp384r1", p384, "P-384", 48);
ec_key_conversions!("secp256k1", k256, "secp256k1", 32);

#[cfg(feature = "rsa")]
impl From<&Base64urlUInt> for rsa::BigUint {
    fn from(uint: &Base64urlUInt) -> Self {
        Self::from_bytes_be(&uint.0)
    }
}

#[cfg(feature = "rsa")]
impl TryFrom<&RSAParams> for rsa::RsaPublicKey {
    type Error = Error;
    fn try_from(params: &RSAParams) -> Result<Self, Self::Error> {
        let n = params.modulus.as_ref().ok_or(Error::MissingModulus)?;
        let e = params.exponent.as_ref().ok_or(Error::MissingExponent)?;
        Ok(Self::new(n.into(), e.into())?)
    }
}

#[cfg(feature = "rsa")]
impl TryFrom<&RSAParams> for rsa::RsaPrivateKey {
    type Error = Error;
    #[allow(clippy::many_single_char_names)]
    fn try_from(params: &RSAParams) -> Result<Self, Self::Error> {
        let n = params.modulus.as_ref().ok_or(Error::MissingModulus)?;
        let e = params.exponent.as_ref().ok_or(Error::MissingExponent)?;
        let d = params
            .private_exponent
            .as_ref()
            .ok_or(Error::MissingPrivateKey)?;
        let p = params
            .first_prime_factor
            .as_ref()
            .ok_or(Error::MissingPrime)?;
        let q = params
            .second_prime_factor
            .as_ref()
            .ok_or(Error::MissingPrime)?;
        let key = Self::from_components(n.into(), e.into(), d.into(), vec![p.into(), q.into()])?;
        key.validate()?;
        Ok(key)
    }
}

#[cfg(feature = "ed25519")]
impl TryFrom<&OctetParams> for ed25519_dalek::VerifyingKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        if params.curve != *"Ed25519" {
            return Err(Error::CurveNotImplemented(params.curve.to_string()));
        }
        let bytes: [u8; 32] = params
            .public_key
            .0
            .as_slice()
            .try_into()
            .map_err(|_| Error::InvalidKeyLength(params.public_key.0.len()))?;
        Ok(Self::from_bytes(&bytes)?)
    }
}

#[cfg(feature = "ed25519")]
impl TryFrom<&OctetParams> for ed25519_dalek::SigningKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        if params.curve != *"Ed25519" {
            return Err(Error::CurveNotImplemented(params.curve.to_string()));
        }
        let private_key = params
            .private_key
            .as_ref()
            .ok_or(Error::MissingPrivateKey)?;
        let bytes: zeroize::Zeroizing<[u8; 32]> = zeroize::Zeroizing::new(
            private_key
                .0
                .as_slice()
                .try_into()
                .map_err(|_| Error::InvalidKeyLength(private_key.0.len()))?,
        );
        let signing_key = Self::from_bytes(&bytes);
        if signing_key.verifying_key().as_bytes() != params.public_key.0.as_slice() {
            return Err(Error::KeyPairMismatch);
        }
        Ok(signing_key)
    }
}

impl TryFrom<String> for Base64urlUInt {
    type Error = base64::DecodeError;
    fn try_from(data: String) -> Result<Self, Self::Error> {
        Ok(Base64urlUInt(BASE64_URL_SAFE_NO_PAD.decode(data)?))
    }
}

impl From<&Base64urlUInt> for String {
    fn from(data: &Base64urlUInt) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(&data.0)
    }
}

impl From<Base64urlUInt> for Base64urlUIntString {
    fn from(data: Base64urlUInt) -> Base64urlUIntString {
        String::from(&data)
    }
}
