use std::collections::BTreeSet;

use rand::{seq::SliceRandom, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ssi_jwk::{Params, JWK};

use crate::decoy::generate_decoys;
use crate::{
    Disclosure, IssueError, SdAlg, ARRAY_CLAIM_ITEM_PROPERTY_NAME, CNF_CLAIM_NAME,
    SD_ALG_CLAIM_NAME, SD_CLAIM_NAME,
};

/// Registered JWT claims that stay in plaintext unless named explicitly.
pub const ALWAYS_VISIBLE_CLAIMS: [&str; 9] = [
    "iss", "iat", "nbf", "exp", "aud", "jti", "cnf", "vct", "status",
];

/// Which top-level claims are replaced by digests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Disclosable {
    /// Every claim except [`ALWAYS_VISIBLE_CLAIMS`].
    #[default]
    AllExceptRegistered,

    /// Exactly the named claims. Each of them must be present.
    Claims(BTreeSet<String>),
}

impl Disclosable {
    pub fn is_disclosable(&self, name: &str) -> bool {
        match self {
            Self::AllExceptRegistered => !ALWAYS_VISIBLE_CLAIMS.contains(&name),
            Self::Claims(names) => names.contains(name),
        }
    }
}

/// Undisclosed SD-JWT payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdJwtPayload {
    /// Hash algorithm used by the `_sd` digests.
    #[serde(rename = "_sd_alg")]
    pub sd_alg: SdAlg,

    /// Plaintext claims, including the `_sd` digest array.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl SdJwtPayload {
    /// Conceal the disclosable claims of `claims`, returning the payload and
    /// the disclosures, in the order their claims were processed.
    ///
    /// Claims are processed in name order. The `_sd` array holds one digest
    /// per disclosure plus `decoys` decoy digests, shuffled.
    pub fn conceal_claims(
        mut claims: Map<String, Value>,
        mut rng: impl CryptoRng + RngCore,
        sd_alg: SdAlg,
        disclosable: &Disclosable,
        decoys: usize,
    ) -> Result<(Self, Vec<Disclosure>), IssueError> {
        let sd_alg = sd_alg.ensure_available()?;

        if let Some(reserved) = find_reserved_name(&claims) {
            return Err(IssueError::InvalidClaimSet(format!(
                "`{reserved}` is reserved by SD-JWT"
            )));
        }

        if let Disclosable::Claims(names) = disclosable {
            if let Some(missing) = names.iter().find(|name| !claims.contains_key(*name)) {
                return Err(IssueError::InvalidClaimSet(format!(
                    "disclosable claim `{missing}` is not present"
                )));
            }
        }

        let mut names: Vec<String> = claims
            .keys()
            .filter(|name| disclosable.is_disclosable(name))
            .cloned()
            .collect();
        names.sort_unstable();

        let mut disclosures = Vec::with_capacity(names.len());
        let mut sd_claim = Vec::with_capacity(names.len() + decoys);
        for name in names {
            if let Some(value) = claims.remove(&name) {
                let disclosure = Disclosure::new(&mut rng, &name, &value)?;
                sd_claim.push(disclosure.digest(sd_alg)?);
                disclosures.push(disclosure);
            }
        }

        sd_claim.extend(generate_decoys(&mut rng, sd_alg, decoys)?);
        sd_claim.shuffle(&mut rng);

        log::debug!(
            "concealed {} claims with {} decoys, {} claims left visible",
            disclosures.len(),
            decoys,
            claims.len()
        );

        claims.insert(
            SD_CLAIM_NAME.to_owned(),
            Value::Array(sd_claim.into_iter().map(Value::String).collect()),
        );

        Ok((Self { sd_alg, claims }, disclosures))
    }

    /// Digests of the `_sd` claim.
    pub fn sd_digests(&self) -> impl Iterator<Item = &str> {
        self.claims
            .get(SD_CLAIM_NAME)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Bind the payload to a holder key by embedding its public part under
    /// `cnf.jwk`.
    pub fn bind_holder(&mut self, holder_jwk: &JWK) -> Result<(), IssueError> {
        if let Params::Symmetric(_) = holder_jwk.params {
            return Err(IssueError::InvalidKey(
                "holder key must be an asymmetric key".to_owned(),
            ));
        }
        if self.claims.contains_key(CNF_CLAIM_NAME) {
            return Err(IssueError::InvalidClaimSet(format!(
                "`{CNF_CLAIM_NAME}` is set by the holder key"
            )));
        }
        let jwk = serde_json::to_value(holder_jwk.to_public())?;
        self.claims.insert(
            CNF_CLAIM_NAME.to_owned(),
            serde_json::json!({ "jwk": jwk }),
        );
        Ok(())
    }
}

const RESERVED_CLAIM_NAMES: [&str; 3] =
    [SD_CLAIM_NAME, SD_ALG_CLAIM_NAME, ARRAY_CLAIM_ITEM_PROPERTY_NAME];

/// First reserved member name found in `object` or in any nested object or
/// array.
fn find_reserved_name(object: &Map<String, Value>) -> Option<&'static str> {
    if let Some(reserved) = RESERVED_CLAIM_NAMES
        .into_iter()
        .find(|name| object.contains_key(*name))
    {
        return Some(reserved);
    }
    object.values().find_map(find_reserved_name_in_value)
}

fn find_reserved_name_in_value(value: &Value) -> Option<&'static str> {
    match value {
        Value::Object(object) => find_reserved_name(object),
        Value::Array(items) => items.iter().find_map(find_reserved_name_in_value),
        _ => None,
    }
}
