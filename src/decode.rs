use serde::de::DeserializeOwned;
use ssi_jwk::JWK;
use std::collections::BTreeMap;

use crate::serialized::deserialize_string_format;
use crate::*;

/// Verify a compact SD-JWT with the issuer public key and reveal the disclosed
/// claims.
///
/// `_sd` and `_sd_alg` are removed from the result. Every disclosure must be
/// referenced by exactly one digest.
pub fn decode_verify<Claims: DeserializeOwned>(
    serialized: &str,
    key: &JWK,
) -> Result<Claims, DecodeError> {
    let deserialized = deserialize_string_format(serialized)
        .ok_or(DecodeError::UnableToDeserializeStringFormat)?;

    decode_verify_disclosure_array(deserialized.jwt, key, &deserialized.disclosures)
}

pub fn decode_verify_disclosure_array<Claims: DeserializeOwned>(
    jwt: &str,
    key: &JWK,
    disclosures: &[&str],
) -> Result<Claims, DecodeError> {
    let (_, payload) = ssi_jws::decode_verify(jwt, key)?;
    let mut payload_claims: serde_json::Value = serde_json::from_slice(&payload)?;

    let sd_alg = sd_alg(&payload_claims)?;
    payload_claims
        .as_object_mut()
        .ok_or(DecodeError::ClaimsWrongType)?
        .remove(SD_ALG_CLAIM_NAME);

    let mut disclosures = translate_to_in_progress_disclosures(disclosures, sd_alg)?;

    visit_claims(&mut payload_claims, &mut disclosures)?;

    for (_, disclosure) in disclosures {
        if !disclosure.found {
            return Err(DecodeError::UnusedDisclosure);
        }
    }

    Ok(serde_json::from_value(payload_claims)?)
}

fn sd_alg(claims: &serde_json::Value) -> Result<SdAlg, DecodeError> {
    let alg_name = claims
        .as_object()
        .ok_or(DecodeError::ClaimsWrongType)?
        .get(SD_ALG_CLAIM_NAME)
        .and_then(serde_json::Value::as_str)
        .ok_or(DecodeError::MissingSdAlg)?;

    SdAlg::try_from(alg_name)
        .and_then(SdAlg::ensure_available)
        .map_err(|_| DecodeError::UnknownSdAlg(alg_name.to_owned()))
}

fn translate_to_in_progress_disclosures(
    disclosures: &[&str],
    sd_alg: SdAlg,
) -> Result<BTreeMap<String, InProgressDisclosure>, DecodeError> {
    let mut disclosure_map = BTreeMap::new();
    for disclosure in disclosures {
        let disclosure = InProgressDisclosure::new(disclosure, sd_alg)?;
        let prev = disclosure_map.insert(disclosure.hash.clone(), disclosure);

        if prev.is_some() {
            return Err(DecodeError::MultipleDisclosuresWithSameHash);
        }
    }

    Ok(disclosure_map)
}

#[derive(Debug)]
struct InProgressDisclosure {
    decoded: DecodedDisclosure,
    hash: String,
    found: bool,
}

impl InProgressDisclosure {
    fn new(disclosure: &str, sd_alg: SdAlg) -> Result<Self, DecodeError> {
        Ok(InProgressDisclosure {
            decoded: DecodedDisclosure::new(disclosure)?,
            hash: sd_alg
                .hash(disclosure)
                .map_err(|_| DecodeError::UnknownSdAlg(sd_alg.to_str().to_owned()))?,
            found: false,
        })
    }
}

fn visit_claims(
    payload_claims: &mut serde_json::Value,
    disclosures: &mut BTreeMap<String, InProgressDisclosure>,
) -> Result<(), DecodeError> {
    let payload_claims = match payload_claims.as_object_mut() {
        Some(obj) => obj,
        None => return Ok(()),
    };

    // Visit children
    for (_, child_claim) in payload_claims.iter_mut() {
        visit_claims(child_claim, disclosures)?
    }

    // Process _sd claim
    let new_claims = match payload_claims.remove(SD_CLAIM_NAME) {
        Some(sd_claims) => decode_sd_claims(&sd_claims, disclosures)?,
        None => vec![],
    };

    for (new_claim_name, mut new_claim_value) in new_claims {
        visit_claims(&mut new_claim_value, disclosures)?;

        let prev = payload_claims.insert(new_claim_name, new_claim_value);

        if prev.is_some() {
            return Err(DecodeError::DisclosureClaimCollidesWithJwtClaim);
        }
    }

    // Process array claims
    for (_, item) in payload_claims.iter_mut() {
        if let Some(array) = item.as_array_mut() {
            let mut new_array_items = decode_array_claims(array, disclosures)?;

            for item in new_array_items.iter_mut() {
                visit_claims(item, disclosures)?;
            }

            *array = new_array_items;
        }
    }

    Ok(())
}

fn decode_sd_claims(
    sd_claims: &serde_json::Value,
    disclosures: &mut BTreeMap<String, InProgressDisclosure>,
) -> Result<Vec<(String, serde_json::Value)>, DecodeError> {
    let sd_claims = sd_claims
        .as_array()
        .ok_or(DecodeError::SdPropertyNotArray)?;
    let mut found_disclosures = vec![];
    for disclosure_hash in sd_claims {
        let disclosure_hash = disclosure_hash
            .as_str()
            .ok_or(DecodeError::SdClaimNotString)?;

        // Digests without a disclosure are decoys or withheld claims.
        if let Some(in_progress_disclosure) = disclosures.get_mut(disclosure_hash) {
            if in_progress_disclosure.found {
                return Err(DecodeError::DisclosureUsedMultipleTimes);
            }
            in_progress_disclosure.found = true;
            match in_progress_disclosure.decoded.kind {
                DisclosureKind::ArrayItem(_) => {
                    return Err(DecodeError::ArrayDisclosureWhenExpectingProperty)
                }
                DisclosureKind::Property {
                    ref name,
                    ref value,
                } => found_disclosures.push((name.clone(), value.clone())),
            }
        }
    }

    Ok(found_disclosures)
}

fn decode_array_claims(
    array: &[serde_json::Value],
    disclosures: &mut BTreeMap<String, InProgressDisclosure>,
) -> Result<Vec<serde_json::Value>, DecodeError> {
    let mut new_items = vec![];
    for item in array.iter() {
        if let Some(hash) = array_item_is_disclosure(item) {
            if let Some(in_progress_disclosure) = disclosures.get_mut(hash) {
                if in_progress_disclosure.found {
                    return Err(DecodeError::DisclosureUsedMultipleTimes);
                }
                in_progress_disclosure.found = true;
                match in_progress_disclosure.decoded.kind {
                    DisclosureKind::ArrayItem(ref value) => {
                        new_items.push(value.clone());
                    }
                    DisclosureKind::Property { .. } => {
                        return Err(DecodeError::PropertyDisclosureWhenExpectingArray)
                    }
                }
            }
        } else {
            new_items.push(item.clone());
        }
    }

    Ok(new_items)
}

fn array_item_is_disclosure(item: &serde_json::Value) -> Option<&str> {
    let obj = item.as_object()?;

    if obj.len() != 1 {
        return None;
    }

    obj.get(ARRAY_CLAIM_ITEM_PROPERTY_NAME)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn visit(
        mut claims: serde_json::Value,
        sd_alg: SdAlg,
        disclosures: &[&str],
    ) -> Result<serde_json::Value, DecodeError> {
        let mut disclosures = translate_to_in_progress_disclosures(disclosures, sd_alg)?;
        visit_claims(&mut claims, &mut disclosures)?;
        if disclosures.values().any(|d| !d.found) {
            return Err(DecodeError::UnusedDisclosure);
        }
        Ok(claims)
    }

    #[test]
    fn reveal_nested_and_array_disclosures() {
        let family_name = Disclosure::with_salt(
            "_26bc4LT-ac6q2KI6cBW5es".to_owned(),
            "family_name",
            json!("Möbius"),
        )
        .unwrap();
        // ["nPuoQnkRFq3BIeAm7AnXFA", "DE"]
        let nationality = "WyJuUHVvUW5rUkZxM0JJZUFtN0FuWEZBIiwiREUiXQ";

        let claims = json!({
            "sub": "user_42",
            "_sd": [family_name.digest(SdAlg::Sha256).unwrap(), "decoy"],
            "nationalities": [{ "...": SdAlg::Sha256.hash(nationality).unwrap() }, "FR"],
        });

        let revealed = visit(
            claims,
            SdAlg::Sha256,
            &[family_name.as_str(), nationality],
        )
        .unwrap();
        assert_eq!(
            revealed,
            json!({
                "sub": "user_42",
                "family_name": "Möbius",
                "nationalities": ["DE", "FR"],
            })
        );
    }

    #[test]
    fn reject_misused_disclosures() {
        let given_name =
            Disclosure::with_salt("c2FsdA".to_owned(), "given_name", json!("Alice")).unwrap();
        let digest = given_name.digest(SdAlg::Sha256).unwrap();

        let unused = visit(json!({"_sd": []}), SdAlg::Sha256, &[given_name.as_str()]);
        assert!(matches!(unused, Err(DecodeError::UnusedDisclosure)));

        let twice = visit(
            json!({"_sd": [digest], "nested": {"_sd": [digest]}}),
            SdAlg::Sha256,
            &[given_name.as_str()],
        );
        assert!(matches!(twice, Err(DecodeError::DisclosureUsedMultipleTimes)));

        let collides = visit(
            json!({"_sd": [digest], "given_name": "Bob"}),
            SdAlg::Sha256,
            &[given_name.as_str()],
        );
        assert!(matches!(
            collides,
            Err(DecodeError::DisclosureClaimCollidesWithJwtClaim)
        ));

        let duplicate = translate_to_in_progress_disclosures(
            &[given_name.as_str(), given_name.as_str()],
            SdAlg::Sha256,
        );
        assert!(matches!(
            duplicate,
            Err(DecodeError::MultipleDisclosuresWithSameHash)
        ));
    }

    #[test]
    fn sd_alg_claim() {
        assert_eq!(sd_alg(&json!({"_sd_alg": "sha-512"})).unwrap(), SdAlg::Sha512);
        assert!(matches!(
            sd_alg(&json!({})),
            Err(DecodeError::MissingSdAlg)
        ));
        assert!(matches!(
            sd_alg(&json!({"_sd_alg": "sha-224"})),
            Err(DecodeError::UnknownSdAlg(name)) if name == "sha-224"
        ));
        assert!(matches!(
            sd_alg(&json!(["_sd_alg"])),
            Err(DecodeError::ClaimsWrongType)
        ));
    }
}
