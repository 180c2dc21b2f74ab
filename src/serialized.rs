use std::fmt;

use crate::Disclosure;

/// Issued SD-JWT: the issuer-signed JWT and its disclosures.
#[derive(Debug, Clone, PartialEq)]
pub struct SdJwt {
    /// Compact JWS over the SD-JWT payload.
    pub jwt: String,

    /// Disclosures, one per concealed claim.
    pub disclosures: Vec<Disclosure>,
}

impl SdJwt {
    /// Compact serialization, `<jwt>~<disclosure>~...~`.
    pub fn serialize(&self) -> String {
        let disclosures: Vec<&str> = self.disclosures.iter().map(Disclosure::as_str).collect();
        serialize_string_format(&self.jwt, &disclosures)
    }
}

impl fmt::Display for SdJwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Parts of a compact SD-JWT.
#[derive(Debug, PartialEq)]
pub struct Deserialized<'a> {
    pub jwt: &'a str,
    pub disclosures: Vec<&'a str>,
}

/// Concatenate a JWT and its disclosures, each followed by `~`.
pub fn serialize_string_format(jwt: &str, disclosures: &[&str]) -> String {
    let mut serialized = format!("{jwt}~");
    for disclosure in disclosures {
        serialized.push_str(disclosure);
        serialized.push('~');
    }
    serialized
}

/// Split a compact SD-JWT into its JWT and disclosures.
///
/// Returns `None` unless the input is a three-part JWT followed by `~` and
/// non-empty disclosures each terminated by `~`.
pub fn deserialize_string_format(serialized: &str) -> Option<Deserialized<'_>> {
    let body = serialized.strip_suffix('~')?;
    let mut parts = body.split('~');
    let jwt = parts.next()?;
    if jwt.split('.').count() != 3 {
        return None;
    }
    let disclosures: Vec<&str> = parts.collect();
    if disclosures.iter().any(|d| d.is_empty()) {
        return None;
    }
    Some(Deserialized { jwt, disclosures })
}
