use serde_json::{Map, Value};
use ssi_jwk::{Algorithm, Params, JWK};
use ssi_jws::Header;

use crate::{IssueError, SdJwtPayload};

/// Default `typ` header of an issuer-signed SD-JWT.
pub const SD_JWT_TYP: &str = "sd+jwt";

/// Header parameters the signer controls.
const RESERVED_HEADERS: [&str; 2] = ["alg", "crit"];

/// Signing algorithms an SD-JWT can be issued with.
const SUPPORTED_ALGORITHMS: [Algorithm; 10] = [
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::ES256K,
    Algorithm::EdDSA,
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Pick the signing algorithm for `key` and check that the key can sign with
/// it.
///
/// Without a `requested` algorithm the key's `alg` member is used, then the
/// natural algorithm of its key type and curve.
pub fn resolve_algorithm(
    requested: Option<Algorithm>,
    key: &JWK,
) -> Result<Algorithm, IssueError> {
    if !key.is_private() {
        return Err(IssueError::InvalidKey(
            "issuer key has no private key material".to_owned(),
        ));
    }
    let algorithm = match requested.or_else(|| key.get_algorithm()) {
        Some(algorithm) => algorithm,
        None => {
            return Err(IssueError::UnsupportedAlgorithm(format!(
                "no signing algorithm for {} key",
                key.params.key_type()
            )))
        }
    };
    if !SUPPORTED_ALGORITHMS.contains(&algorithm) {
        return Err(IssueError::UnsupportedAlgorithm(algorithm.to_string()));
    }
    ssi_jws::check_algorithm(algorithm, key)?;
    if let Params::RSA(rsa_params) = &key.params {
        rsa_params.validate_key_size()?;
    }
    Ok(algorithm)
}

/// Build the JOSE header: `alg`, `typ` and `kid`, then `extra_headers`
/// merged over them.
pub fn build_header(
    algorithm: Algorithm,
    key: &JWK,
    extra_headers: &Map<String, Value>,
) -> Result<Header, IssueError> {
    if let Some(reserved) = RESERVED_HEADERS
        .iter()
        .find(|name| extra_headers.contains_key(**name))
    {
        return Err(IssueError::ReservedHeader((*reserved).to_owned()));
    }

    let mut merged = Map::new();
    merged.insert("alg".to_owned(), Value::String(algorithm.to_string()));
    merged.insert("typ".to_owned(), Value::String(SD_JWT_TYP.to_owned()));
    if let Some(key_id) = &key.key_id {
        merged.insert("kid".to_owned(), Value::String(key_id.clone()));
    }
    merged.extend(extra_headers.clone());
    Ok(serde_json::from_value(Value::Object(merged))?)
}

/// Sign the payload, returning the compact JWS.
pub fn sign_payload(
    payload: &SdJwtPayload,
    key: &JWK,
    header: &Header,
) -> Result<String, IssueError> {
    let payload_json = serde_json::to_string(payload)?;
    Ok(ssi_jws::encode_sign_custom_header(&payload_json, key, header)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p256_key() -> JWK {
        serde_json::from_value(serde_json::json!({
            "kty": "EC",
            "d": "oYVImrMZjUclmWuhqa6bjzqGx5HFkbx76_00oWUHiLw",
            "use": "sig",
            "crv": "P-256",
            "kid": "rpaXW8yADRnS2150CdsMtftwxtzSiVTV9bgHHG86v-E",
            "x": "UX7TC8uQ9sn06c3DxXy1Ua5V9BK-cb9fQfukVrCLD8s",
            "y": "yNXRKOnwBMTx536uajfNHklxpG9bAbdLlmVn6-XuK0Q",
        }))
        .unwrap()
    }

    #[test]
    fn algorithm_defaults_to_key_type() {
        let key = p256_key();
        assert_eq!(resolve_algorithm(None, &key).unwrap(), Algorithm::ES256);
        assert_eq!(
            resolve_algorithm(Some(Algorithm::ES256), &key).unwrap(),
            Algorithm::ES256
        );
    }

    #[test]
    fn algorithm_errors() {
        let key = p256_key();
        for unsupported in [Algorithm::HS256, Algorithm::None, Algorithm::ES512] {
            assert!(matches!(
                resolve_algorithm(Some(unsupported), &key),
                Err(IssueError::UnsupportedAlgorithm(_))
            ));
        }
        assert!(matches!(
            resolve_algorithm(Some(Algorithm::EdDSA), &key),
            Err(IssueError::AlgorithmKeyMismatch {
                algorithm: Algorithm::EdDSA,
                ..
            })
        ));
        assert!(matches!(
            resolve_algorithm(None, &key.to_public()),
            Err(IssueError::InvalidKey(_))
        ));
    }

    #[test]
    fn small_rsa_key_is_rejected() {
        // 1024-bit modulus
        let key: JWK = serde_json::from_value(serde_json::json!({
            "kty": "RSA",
            "n": "wcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcE",
            "e": "AQAB",
            "d": "NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU1NTU"
        }))
        .unwrap();
        assert!(matches!(
            resolve_algorithm(Some(Algorithm::RS256), &key),
            Err(IssueError::InvalidKey(_))
        ));
    }

    #[test]
    fn header_defaults_and_extras() {
        let key = p256_key();
        let header = build_header(Algorithm::ES256, &key, &Map::new()).unwrap();
        assert_eq!(header.algorithm, Algorithm::ES256);
        assert_eq!(header.type_.as_deref(), Some(SD_JWT_TYP));
        assert_eq!(header.key_id, key.key_id);

        let mut extra = Map::new();
        extra.insert("typ".to_owned(), serde_json::json!("vc+sd-jwt"));
        extra.insert("x-trace".to_owned(), serde_json::json!(7));
        let header = build_header(Algorithm::ES256, &key, &extra).unwrap();
        assert_eq!(header.type_.as_deref(), Some("vc+sd-jwt"));
        assert_eq!(
            header.additional_parameters.get("x-trace"),
            Some(&serde_json::json!(7))
        );

        let mut extra = Map::new();
        extra.insert("alg".to_owned(), serde_json::json!("none"));
        assert!(matches!(
            build_header(Algorithm::ES256, &key, &extra),
            Err(IssueError::ReservedHeader(name)) if name == "alg"
        ));
    }
}
