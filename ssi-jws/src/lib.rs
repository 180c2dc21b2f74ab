#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod error;
pub use base64::DecodeError as Base64DecodeError;
pub use error::Error;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use ssi_jwk::{Algorithm, Params as JWKParams, JWK};
use std::collections::BTreeMap;

// RFC 7515 - JSON Web Signature (JWS)

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: Algorithm,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwk: Option<JWK>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "kid")]
    pub key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "x5c")]
    pub x509_certificate_chain: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "typ")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "cty")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "crit")]
    pub critical: Option<Vec<String>>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(flatten)]
    pub additional_parameters: BTreeMap<String, serde_json::Value>,
}

impl Header {
    /// Decode a JWS Protected Header.
    pub fn decode(base_64: &[u8]) -> Result<Self, Error> {
        let header_json = BASE64_URL_SAFE_NO_PAD.decode(base_64)?;
        Ok(serde_json::from_slice(&header_json)?)
    }

    pub fn encode(&self) -> Result<String, Error> {
        base64_encode_json(self)
    }
}

fn base64_encode_json<T: Serialize>(object: &T) -> Result<String, Error> {
    let json = serde_json::to_string(&object)?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
}

/// Checks that `algorithm` can be used with `key`.
///
/// Fails with [`Error::UnsupportedAlgorithm`] for symmetric or `none`
/// algorithms and with [`Error::AlgorithmMismatch`] when the key type, the
/// curve or the key's own `alg` member disagree with `algorithm`.
pub fn check_algorithm(algorithm: Algorithm, key: &JWK) -> Result<(), Error> {
    if !algorithm.is_asymmetric() {
        return Err(Error::UnsupportedAlgorithm(algorithm));
    }
    let compatible = match &key.params {
        JWKParams::RSA(_) => matches!(
            algorithm,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        ),
        JWKParams::OKP(okp) => algorithm == Algorithm::EdDSA && okp.curve == "Ed25519",
        JWKParams::EC(ec) => {
            let curve = ec.curve.as_deref().ok_or(ssi_jwk::Error::MissingCurve)?;
            matches!(
                (algorithm, curve),
                (Algorithm::ES256, "P-256")
                    | (Algorithm::ES384, "P-384")
                    | (Algorithm::ES512, "P-521")
                    | (Algorithm::ES256K, "secp256k1")
            )
        }
        JWKParams::Symmetric(_) => false,
    };
    let declared = key.algorithm.map_or(true, |alg| alg == algorithm);
    if !compatible || !declared {
        let mut key_desc = key.params.key_type().to_string();
        if let Some(curve) = key.params.curve() {
            key_desc = format!("{key_desc}/{curve}");
        }
        return Err(Error::AlgorithmMismatch(algorithm, key_desc));
    }
    Ok(())
}

#[allow(unreachable_code, unused_variables)]
pub fn sign_bytes(algorithm: Algorithm, data: &[u8], key: &JWK) -> Result<Vec<u8>, Error> {
    check_algorithm(algorithm, key)?;
    let signature = match &key.params {
        #[cfg(feature = "rsa")]
        JWKParams::RSA(rsa_params) => {
            rsa_params.validate_key_size()?;
            let private_key = rsa::RsaPrivateKey::try_from(rsa_params)?;
            rsa_sign(algorithm, private_key, data)?
        }
        #[cfg(feature = "ed25519")]
        JWKParams::OKP(okp) => {
            use ed25519_dalek::Signer;
            let signing_key = ed25519_dalek::SigningKey::try_from(okp)?;
            signing_key.try_sign(data)?.to_bytes().to_vec()
        }
        JWKParams::EC(ec) => match algorithm {
            #[cfg(feature = "secp256r1")]
            Algorithm::ES256 => {
                use p256::ecdsa::signature::Signer;
                let secret_key = p256::SecretKey::try_from(ec)?;
                let signing_key = p256::ecdsa::SigningKey::from(secret_key);
                let sig: p256::ecdsa::Signature = signing_key.try_sign(data)?;
                sig.to_bytes().to_vec()
            }
            #[cfg(feature = "secp384r1")]
            Algorithm::ES384 => {
                use p384::ecdsa::signature::Signer;
                let secret_key = p384::SecretKey::try_from(ec)?;
                let signing_key = p384::ecdsa::SigningKey::from(secret_key);
                let sig: p384::ecdsa::Signature = signing_key.try_sign(data)?;
                sig.to_bytes().to_vec()
            }
            #[cfg(feature = "secp256k1")]
            Algorithm::ES256K => {
                use k256::ecdsa::signature::Signer;
                let secret_key = k256::SecretKey::try_from(ec)?;
                let signing_key = k256::ecdsa::SigningKey::from(secret_key);
                let sig: k256::ecdsa::Signature = signing_key.try_sign(data)?;
                sig.to_bytes().to_vec()
            }
            _ => {
                return Err(Error::UnsupportedAlgorithm(algorithm));
            }
        },
        _ => return Err(Error::UnsupportedAlgorithm(algorithm)),
    };
    Ok(signature)
}

#[cfg(feature = "rsa")]
fn rsa_sign(
    algorithm: Algorithm,
    private_key: rsa::RsaPrivateKey,
    data: &[u8],
) -> Result<Vec<u8>, Error> {
    use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer};
    use rsa::{pkcs1v15, pss};
    let mut rng = rand::rngs::OsRng;
    let signature = match algorithm {
        Algorithm::RS256 => pkcs1v15::SigningKey::<sha2::Sha256>::new(private_key)
            .try_sign(data)?
            .to_bytes(),
        Algorithm::RS384 => pkcs1v15::SigningKey::<sha2::Sha384>::new(private_key)
            .try_sign(data)?
            .to_bytes(),
        Algorithm::RS512 => pkcs1v15::SigningKey::<sha2::Sha512>::new(private_key)
            .try_sign(data)?
            .to_bytes(),
        Algorithm::PS256 => pss::BlindedSigningKey::<sha2::Sha256>::new(private_key)
            .try_sign_with_rng(&mut rng, data)?
            .to_bytes(),
        Algorithm::PS384 => pss::BlindedSigningKey::<sha2::Sha384>::new(private_key)
            .try_sign_with_rng(&mut rng, data)?
            .to_bytes(),
        Algorithm::PS512 => pss::BlindedSigningKey::<sha2::Sha512>::new(private_key)
            .try_sign_with_rng(&mut rng, data)?
            .to_bytes(),
        _ => return Err(Error::UnsupportedAlgorithm(algorithm)),
    };
    Ok(signature.into_vec())
}

pub fn sign_bytes_b64(algorithm: Algorithm, data: &[u8], key: &JWK) -> Result<String, Error> {
    let signature = sign_bytes(algorithm, data, key)?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(signature))
}

#[allow(unreachable_code, unused_variables)]
pub fn verify_bytes(
    algorithm: Algorithm,
    data: &[u8],
    key: &JWK,
    signature: &[u8],
) -> Result<(), Error> {
    check_algorithm(algorithm, key)?;
    match &key.params {
        #[cfg(feature = "rsa")]
        JWKParams::RSA(rsa_params) => {
            rsa_params.validate_key_size()?;
            let public_key = rsa::RsaPublicKey::try_from(rsa_params)?;
            rsa_verify(algorithm, public_key, data, signature)
        }
        #[cfg(feature = "ed25519")]
        JWKParams::OKP(okp) => {
            use ed25519_dalek::Verifier;
            let verifying_key = ed25519_dalek::VerifyingKey::try_from(okp)?;
            let sig = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|_| Error::InvalidSignature)?;
            verifying_key
                .verify(data, &sig)
                .map_err(|_| Error::InvalidSignature)
        }
        JWKParams::EC(ec) => match algorithm {
            #[cfg(feature = "secp256r1")]
            Algorithm::ES256 => {
                use p256::ecdsa::signature::Verifier;
                let public_key = p256::PublicKey::try_from(ec)?;
                let verifying_key = p256::ecdsa::VerifyingKey::from(&public_key);
                let sig = p256::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| Error::InvalidSignature)?;
                verifying_key
                    .verify(data, &sig)
                    .map_err(|_| Error::InvalidSignature)
            }
            #[cfg(feature = "secp384r1")]
            Algorithm::ES384 => {
                use p384::ecdsa::signature::Verifier;
                let public_key = p384::PublicKey::try_from(ec)?;
                let verifying_key = p384::ecdsa::VerifyingKey::from(&public_key);
                let sig = p384::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| Error::InvalidSignature)?;
                verifying_key
                    .verify(data, &sig)
                    .map_err(|_| Error::InvalidSignature)
            }
            #[cfg(feature = "secp256k1")]
            Algorithm::ES256K => {
                use k256::ecdsa::signature::Verifier;
                let public_key = k256::PublicKey::try_from(ec)?;
                let verifying_key = k256::ecdsa::VerifyingKey::from(&public_key);
                let sig = k256::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| Error::InvalidSignature)?;
                verifying_key
                    .verify(data, &sig)
                    .map_err(|_| Error::InvalidSignature)
            }
            _ => Err(Error::UnsupportedAlgorithm(algorithm)),
        },
        _ => Err(Error::UnsupportedAlgorithm(algorithm)),
    }
}

#[cfg(feature = "rsa")]
fn rsa_verify(
    algorithm: Algorithm,
    public_key: rsa::RsaPublicKey,
    data: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    use rsa::signature::Verifier;
    use rsa::{pkcs1v15, pss};
    let result = match algorithm {
        Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => {
            let sig =
                pkcs1v15::Signature::try_from(signature).map_err(|_| Error::InvalidSignature)?;
            match algorithm {
                Algorithm::RS256 => {
                    pkcs1v15::VerifyingKey::<sha2::Sha256>::new(public_key).verify(data, &sig)
                }
                Algorithm::RS384 => {
                    pkcs1v15::VerifyingKey::<sha2::Sha384>::new(public_key).verify(data, &sig)
                }
                _ => pkcs1v15::VerifyingKey::<sha2::Sha512>::new(public_key).verify(data, &sig),
            }
        }
        Algorithm::PS256 | Algorithm::PS384 | Algorithm::PS512 => {
            let sig = pss::Signature::try_from(signature).map_err(|_| Error::InvalidSignature)?;
            match algorithm {
                Algorithm::PS256 => {
                    pss::VerifyingKey::<sha2::Sha256>::new(public_key).verify(data, &sig)
                }
                Algorithm::PS384 => {
                    pss::VerifyingKey::<sha2::Sha384>::new(public_key).verify(data, &sig)
                }
                _ => pss::VerifyingKey::<sha2::Sha512>::new(public_key).verify(data, &sig),
            }
        }
        _ => return Err(Error::UnsupportedAlgorithm(algorithm)),
    };
    result.map_err(|_| Error::InvalidSignature)
}

pub fn encode_sign(algorithm: Algorithm, payload: &str, key: &JWK) -> Result<String, Error> {
    let header = Header {
        algorithm,
        key_id: key.key_id.clone(),
        ..Default::default()
    };
    encode_sign_custom_header(payload, key, &header)
}

pub fn encode_sign_custom_header(
    payload: &str,
    key: &JWK,
    header: &Header,
) -> Result<String, Error> {
    let header_b64 = header.encode()?;
    let payload_b64 = BASE64_URL_SAFE_NO_PAD.encode(payload);
    let signing_input = header_b64 + "." + &payload_b64;
    let sig_b64 = sign_bytes_b64(header.algorithm, signing_input.as_bytes(), key)?;
    let jws = [signing_input, sig_b64].join(".");
    Ok(jws)
}

pub fn split_jws(jws: &str) -> Result<(&str, &str, &str), Error> {
    let mut parts = jws.splitn(3, '.');
    Ok(
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c), None) => (a, b, c),
            _ => return Err(Error::InvalidJWS),
        },
    )
}

#[derive(Clone, PartialEq, Eq)]
pub struct DecodedJWS {
    pub header: Header,
    pub signing_input: Vec<u8>,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Decode JWS parts (JOSE header, payload, and signature) into useful values.
/// "crit" (critical) header parameters are disallowed since none are understood.
pub fn decode_jws_parts(
    header_b64: &str,
    payload_b64: &str,
    signature_b64: &str,
) -> Result<DecodedJWS, Error> {
    let signature = BASE64_URL_SAFE_NO_PAD.decode(signature_b64)?;
    let header = Header::decode(header_b64.as_bytes())?;
    if header.critical.is_some() {
        return Err(Error::UnknownCriticalHeader);
    }
    let payload = BASE64_URL_SAFE_NO_PAD.decode(payload_b64)?;
    let signing_input = [header_b64.as_bytes(), b".", payload_b64.as_bytes()].concat();
    Ok(DecodedJWS {
        header,
        signing_input,
        payload,
        signature,
    })
}

/// Verify a JWS with the given public key, returning its header and payload.
pub fn decode_verify(jws: &str, key: &JWK) -> Result<(Header, Vec<u8>), Error> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let DecodedJWS {
        header,
        signing_input,
        payload,
        signature,
    } = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    verify_bytes(header.algorithm, &signing_input, key, &signature)?;
    Ok((header, payload))
}

/// Decode a JWS without checking its signature.
pub fn decode_unverified(jws: &str) -> Result<(Header, Vec<u8>), Error> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let decoded = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    Ok((decoded.header, decoded.payload))
}
