use rand::{thread_rng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ssi_jwk::{Algorithm, Params, JWK};

use crate::sign::{build_header, resolve_algorithm, sign_payload};
use crate::{DecoyPolicy, Disclosable, IssueError, SdAlg, SdJwt, SdJwtPayload};

/// Optional issuance parameters.
///
/// Deserializes from camelCase JSON, every field falling back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueOptions {
    /// Holder key embedded as `cnf.jwk`. Private parameters are stripped.
    pub holder_jwk: Option<JWK>,

    /// JWS algorithm. Derived from the issuer key when absent.
    pub sign_algorithm: Option<Algorithm>,

    /// Digest algorithm for the `_sd` claim.
    pub sd_alg: SdAlg,

    /// Add decoy digests to the `_sd` claim.
    pub add_decoy_claims: bool,

    /// Number of decoys, used when `add_decoy_claims` is set.
    pub decoy_policy: DecoyPolicy,

    /// Header parameters merged over the defaults. `alg` and `crit` are
    /// rejected.
    pub extra_headers: Map<String, Value>,

    /// Which claims are concealed.
    pub disclosable: Disclosable,
}

impl IssueOptions {
    /// Set the holder key from its JSON encoding.
    pub fn with_holder_jwk_str(mut self, holder_jwk: &str) -> Result<Self, IssueError> {
        self.holder_jwk = Some(holder_jwk.parse()?);
        Ok(self)
    }

    /// Set the signing algorithm from its JWA name, e.g. `ES256`.
    pub fn with_sign_algorithm_str(mut self, sign_algorithm: &str) -> Result<Self, IssueError> {
        let algorithm = sign_algorithm
            .parse()
            .map_err(|_| IssueError::UnsupportedAlgorithm(sign_algorithm.to_owned()))?;
        self.sign_algorithm = Some(algorithm);
        Ok(self)
    }
}

/// SD-JWT issuer holding the signing key.
#[derive(Clone)]
pub struct Issuer {
    key: JWK,
}

impl Issuer {
    /// Create an issuer from a private asymmetric key.
    pub fn new(key: JWK) -> Result<Self, IssueError> {
        if let Params::Symmetric(_) = key.params {
            return Err(IssueError::InvalidKey(
                "symmetric keys cannot issue SD-JWTs".to_owned(),
            ));
        }
        if !key.is_private() {
            return Err(IssueError::InvalidKey(
                "issuer key has no private key material".to_owned(),
            ));
        }
        Ok(Self { key })
    }

    /// Create an issuer from the JSON encoding of its key.
    pub fn from_jwk_str(issuer_jwk: &str) -> Result<Self, IssueError> {
        Self::new(issuer_jwk.parse()?)
    }

    /// Public part of the issuer key, for verifiers.
    pub fn public_jwk(&self) -> JWK {
        self.key.to_public()
    }

    /// Issue an SD-JWT with the thread-local random number generator.
    pub fn issue<Claims: Serialize>(
        &self,
        claims: &Claims,
        options: &IssueOptions,
    ) -> Result<SdJwt, IssueError> {
        self.issue_with(claims, options, thread_rng())
    }

    /// Issue an SD-JWT, drawing salts, decoys and the `_sd` order from `rng`.
    pub fn issue_with<Claims: Serialize>(
        &self,
        claims: &Claims,
        options: &IssueOptions,
        mut rng: impl CryptoRng + RngCore,
    ) -> Result<SdJwt, IssueError> {
        let sd_alg = options.sd_alg.ensure_available()?;
        if sd_alg.is_weak() {
            log::warn!(
                "{} is not collision resistant, use it for interoperability only",
                sd_alg.to_str()
            );
        }

        let algorithm = resolve_algorithm(options.sign_algorithm, &self.key)?;
        let header = build_header(algorithm, &self.key, &options.extra_headers)?;

        let claims = match serde_json::to_value(claims)? {
            Value::Object(claims) if !claims.is_empty() => claims,
            Value::Object(_) => {
                return Err(IssueError::InvalidClaimSet("no claims to issue".to_owned()))
            }
            _ => {
                return Err(IssueError::InvalidClaimSet(
                    "claims are not a JSON object".to_owned(),
                ))
            }
        };

        let decoys = if options.add_decoy_claims {
            options.decoy_policy.count(&mut rng)?
        } else {
            0
        };

        let (mut payload, disclosures) = SdJwtPayload::conceal_claims(
            claims,
            &mut rng,
            sd_alg,
            &options.disclosable,
            decoys,
        )?;

        if let Some(holder_jwk) = &options.holder_jwk {
            payload.bind_holder(holder_jwk)?;
        }

        let jwt = sign_payload(&payload, &self.key, &header)?;

        log::debug!(
            "issued SD-JWT signed with {} with {} disclosures using {}",
            algorithm,
            disclosures.len(),
            sd_alg.to_str()
        );

        Ok(SdJwt { jwt, disclosures })
    }
}

/// Issue an SD-JWT in compact form.
///
/// `issuer_jwk` is the JSON encoding of the issuer's private key.
pub fn issue<Claims: Serialize>(
    user_claims: &Claims,
    issuer_jwk: &str,
    options: &IssueOptions,
) -> Result<String, IssueError> {
    let issuer = Issuer::from_jwk_str(issuer_jwk)?;
    Ok(issuer.issue(user_claims, options)?.serialize())
}
