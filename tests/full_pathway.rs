use serde::{Deserialize, Serialize};
use serde_json::json;
use ssi_sd_jwt::*;

#[allow(dead_code)]
fn p256_key() -> JWK {
    serde_json::from_value(json!({
        "kty": "EC",
        "d": "oYVImrMZjUclmWuhqa6bjzqGx5HFkbx76_00oWUHiLw",
        "use": "sig",
        "crv": "P-256",
        "kid": "rpaXW8yADRnS2150CdsMtftwxtzSiVTV9bgHHG86v-E",
        "x": "UX7TC8uQ9sn06c3DxXy1Ua5V9BK-cb9fQfukVrCLD8s",
        "y": "yNXRKOnwBMTx536uajfNHklxpG9bAbdLlmVn6-XuK0Q",
        "alg": "ES256"
    }))
    .unwrap()
}

#[allow(dead_code)]
fn p384_key() -> JWK {
    serde_json::from_value(json!({
        "kty": "EC",
        "crv": "P-384",
        "x": "Y7HM-71cmA1nXEtU2CXrWHpKrKiUxFW2c5OIT3BQ9tO2GCE5pToOfjrM7SJvv-LP",
        "y": "OXEPc5ldY7QYoLc-a8N5g_kwEtyoDlkm-ibyKoSXRfowLyitnoy9b-mRXn8xGBNy",
        "d": "pVl0lt_6ehIn85Ng0E_FbB4MmZQMYt7FI91Tk9WX7_nOo5inmAocIfuUbi_pNTk_"
    }))
    .unwrap()
}

#[allow(dead_code)]
fn secp256k1_key() -> JWK {
    serde_json::from_value(json!({
        "kty": "EC",
        "crv": "secp256k1",
        "x": "iKblINYLumzJP77ldUn6IZz_XzXhC_-M14NmZ4xY6AM",
        "y": "Cj09vNoNSVhHV-cIqCmJ_n26I3j_x3LIECJpx58DH3U",
        "d": "oQkz7s_EiAUzc-CZIKhwaJJxQU1gLvySt9GO127cgY4"
    }))
    .unwrap()
}

#[allow(dead_code)]
fn ed25519_key() -> JWK {
    serde_json::from_value(json!({
        "kty": "OKP",
        "crv": "Ed25519",
        "d": "nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A",
        "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
    }))
    .unwrap()
}

#[allow(dead_code)]
fn rsa_key() -> JWK {
    serde_json::from_value(json!({
        "kty": "RSA",
        "n": "wdfAsnhVgT3yQ-2OJU2O5RUu2vR_iwBfoSM_KRY-CAi9V2O7XGqRt963ol2AAObLp5IoPPCZHmDQEVKX3GmPWnqDGuLh9FGc88Ii4mlZ_GxbAG-omDmgMjNgEEfnURAipthZl95X8tZ64qqPp0dBpqcba67eR1Hgoi7FD7qWJmnQF0VfIC6VFAxPw35pt5WfGvYi4GVvjv2RCXiAPey1gb1cg0FPxf6H7jzSbjhlItPy5ddUytL3BGxpFTO8SqVK53QypYpQ6Q3R1vjuQt6vgKMa-YRC_YzEn68FlIjNVHqNs4mLMaxNRJtZYd0jWrOYc0FbT11suiKxH6xh0DRbIQ",
        "e": "AQAB",
        "d": "Blcevm6IzjQSB2YBM67GIfLC20vmTEYDbQbQlqG9I2VfsKZadM1MIMfj9HCQlDoEiG3cwMklfArKz6fDjxV-un7lE0utFIvGFI_8RyrR2hugci_HEs8Dh-n3zRafSGfhXtkK20NK6hkoVDS2FcqfQZVbBfc70dQLZIvJ8DZWvl9s4Nk8hMWdawMCWOEFWjb2VuDKhg1AxFPZOtCK_Iy_qtQ5_Rb-wkodGuEb-jCgie7QdrZm28CLTR7lD2jZbuLjhVNNWryo6QHL1ZmIfUeX-q2fjpxA5Qum0TfzDxsH2kXzEdYbyhKeUjEW0DjydtacuUT2PWZtnp0N4FLilNRB",
        "p": "54mCrK1d2q-O0Wm9vxQVtuAMzleMyEsu_Bmrh6jzZeeoDTrzqhjvCzeFPX1w-UOXeptX8I2ZqQJxcL_dYvi54jppXSl5T3Fwp1OL6zV0C6Ux0tzlEhtBo3oIky0SqC9t8fa9xuxmRjaqVOPk2Z6PaDUpUQbPGgtxnHdzTaFrmOE",
        "q": "1lK0rjpULKV_OCR8OdWTIX5Bvc_BC81JksawY8v2n6Hl9y77S_FtGNj16PCMLfdVtNJYMSoBXjW4A5dTvvy8wxgkN_E_kQJqCwMUnbHqlKndywqDxWgBjsy36BNu2pUAdcZYfjt0bkyoj4EjO5yTaFoZdrBRf-TIyxYjiABhykE",
        "dp": "FMJriPfyVk0vTO9iJ-OxHrhv7YBECyFSkR_sFTm8uQJQOv9yIWoi5KqRs7Wvj2nUBxYuiE7p3BFwAl_xhZIveG0sTUIOsmTFaPtArFIamYCyOum7UChJdlLWuftslM_L18n7sf44HUuBciMMvcZNrVY24iDuKLOl-BVtrSQv9YE",
        "dq": "Rufh4uplQsgWCMr5VmD0ZlZRBa0gHvlx599YKAwosbNsU5T1irB6-Yd-A-zhU6vKbSJSDyHohfSbxoRgLoWLJbhs8x0bfKwhzTbdsTZVd42jVTNLWRoJuea8yUj0mdhF6LEQQeMFqCAwfBmrQGOS2SlF12CJ9hgI3jea1bnaoIE",
        "qi": "uK7WdJIT_8vqxRSfmIUa5K3bfOKfdqJIpcfJnG_D7GoGLX4-Y_O1aEVu-H9CbjSNMxxzZDCnkgccsGlalKPv8wD488InS2p9ZqI4R8T3CjeDxT_JraNTmPpw92UIJ1Uij60rJ5H5X1Gr3zepX0a-GhOIUf65998rYN5ApeaXo0g"
    }))
    .unwrap()
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct PersonClaims {
    iss: String,
    iat: u64,
    sub: String,
    given_name: String,
    family_name: Option<String>,
    email: Option<String>,
}

fn person() -> PersonClaims {
    PersonClaims {
        iss: "https://issuer.example".to_owned(),
        iat: 1683000000,
        sub: "user_42".to_owned(),
        given_name: "John".to_owned(),
        family_name: Some("Doe".to_owned()),
        email: Some("johndoe@example.com".to_owned()),
    }
}

/// Issue with `algorithm`, then verify and reveal every disclosure.
fn issue_and_reveal(key: JWK, algorithm: Option<Algorithm>) {
    let issuer = Issuer::new(key).unwrap();
    let options = IssueOptions {
        sign_algorithm: algorithm,
        add_decoy_claims: true,
        ..Default::default()
    };
    let sd_jwt = issuer.issue(&person(), &options).unwrap();
    assert_eq!(sd_jwt.disclosures.len(), 4);

    let revealed: PersonClaims = decode_verify(&sd_jwt.serialize(), &issuer.public_jwk()).unwrap();
    assert_eq!(revealed, person());

    let header = ssi_jws::decode_unverified(&sd_jwt.jwt).unwrap().0;
    if let Some(algorithm) = algorithm {
        assert_eq!(header.algorithm, algorithm);
    }
}

#[test]
#[cfg(feature = "secp256r1")]
fn full_pathway_es256() {
    issue_and_reveal(p256_key(), None);
}

#[test]
#[cfg(feature = "secp384r1")]
fn full_pathway_es384() {
    issue_and_reveal(p384_key(), Some(Algorithm::ES384));
}

#[test]
#[cfg(feature = "secp256k1")]
fn full_pathway_es256k() {
    issue_and_reveal(secp256k1_key(), Some(Algorithm::ES256K));
}

#[test]
#[cfg(feature = "ed25519")]
fn full_pathway_eddsa() {
    issue_and_reveal(ed25519_key(), Some(Algorithm::EdDSA));
}

#[test]
#[cfg(feature = "rsa")]
fn full_pathway_rsa() {
    for algorithm in [
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
    ] {
        issue_and_reveal(rsa_key(), Some(algorithm));
    }
    // PS256 when the key does not name an algorithm
    let sd_jwt = Issuer::new(rsa_key())
        .unwrap()
        .issue(&person(), &IssueOptions::default())
        .unwrap();
    let header = ssi_jws::decode_unverified(&sd_jwt.jwt).unwrap().0;
    assert_eq!(header.algorithm, Algorithm::PS256);
}

#[test]
#[cfg(feature = "secp256r1")]
fn partial_disclosure() {
    let issuer = Issuer::new(p256_key()).unwrap();
    let sd_jwt = issuer.issue(&person(), &IssueOptions::default()).unwrap();

    let email = sd_jwt
        .disclosures
        .iter()
        .find(|d| d.name == "email")
        .unwrap();
    let given_name = sd_jwt
        .disclosures
        .iter()
        .find(|d| d.name == "given_name")
        .unwrap();
    let sub = sd_jwt.disclosures.iter().find(|d| d.name == "sub").unwrap();

    let revealed: PersonClaims = decode_verify_disclosure_array(
        &sd_jwt.jwt,
        &issuer.public_jwk(),
        &[email.as_str(), given_name.as_str(), sub.as_str()],
    )
    .unwrap();
    assert_eq!(
        revealed,
        PersonClaims {
            family_name: None,
            ..person()
        }
    );
}

#[test]
#[cfg(all(feature = "secp256r1", feature = "ed25519"))]
fn wrong_issuer_key_fails_verification() {
    let sd_jwt = Issuer::new(p256_key())
        .unwrap()
        .issue(&person(), &IssueOptions::default())
        .unwrap();
    let other = Issuer::new(p384_key().to_public());
    assert!(other.is_err());
    assert!(matches!(
        decode_verify::<PersonClaims>(&sd_jwt.serialize(), &ed25519_key().to_public()),
        Err(DecodeError::JWS(_))
    ));
}

#[test]
#[cfg(feature = "ed25519")]
fn nested_object_is_disclosed_whole() {
    let issuer = Issuer::new(ed25519_key()).unwrap();
    let claims = json!({
        "iss": "https://issuer.example",
        "address": {
            "street_address": "Schulstr. 12",
            "locality": "Schulpforta",
            "country": "DE"
        },
        "nationalities": ["DE", "FR"],
    });
    let sd_jwt = issuer.issue(&claims, &IssueOptions::default()).unwrap();
    assert_eq!(sd_jwt.disclosures.len(), 2);
    assert_eq!(sd_jwt.disclosures[0].name, "address");
    assert_eq!(sd_jwt.disclosures[0].value, claims["address"]);

    let revealed: serde_json::Value =
        decode_verify(&sd_jwt.serialize(), &issuer.public_jwk()).unwrap();
    assert_eq!(revealed, claims);
}

#[test]
#[cfg(feature = "sha3")]
#[cfg(feature = "ed25519")]
fn sha3_digests() {
    let issuer = Issuer::new(ed25519_key()).unwrap();
    let options = IssueOptions {
        sd_alg: SdAlg::Sha3_384,
        ..Default::default()
    };
    let sd_jwt = issuer.issue(&person(), &options).unwrap();
    let (_, payload) = ssi_jws::decode_unverified(&sd_jwt.jwt).unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(payload["_sd_alg"], "sha3-384");
    let revealed: PersonClaims = decode_verify(&sd_jwt.serialize(), &issuer.public_jwk()).unwrap();
    assert_eq!(revealed, person());
}

#[test]
#[cfg(feature = "ed25519")]
fn concurrent_issuance() {
    use std::sync::Arc;
    use std::thread;

    let issuer = Arc::new(Issuer::new(ed25519_key()).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let issuer = Arc::clone(&issuer);
            thread::spawn(move || {
                let claims = json!({"sub": format!("user_{i}"), "iss": "https://issuer.example"});
                let options = IssueOptions {
                    add_decoy_claims: true,
                    ..Default::default()
                };
                let sd_jwt = issuer.issue(&claims, &options).unwrap();
                (claims, sd_jwt.serialize())
            })
        })
        .collect();

    let public_jwk = issuer.public_jwk();
    let mut tokens = Vec::new();
    for handle in handles {
        let (claims, token) = handle.join().unwrap();
        let revealed: serde_json::Value = decode_verify(&token, &public_jwk).unwrap();
        assert_eq!(revealed, claims);
        tokens.push(token);
    }
    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), 8);
}
