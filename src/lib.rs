//! Issuance of Selective Disclosure JSON Web Tokens (SD-JWT).
//!
//! An SD-JWT is a signed JWT whose payload carries digests of the claims the
//! holder may later reveal, followed by the disclosures themselves:
//!
//! ```text
//! <header>.<payload>.<signature>~<disclosure>~<disclosure>~...~
//! ```
//!
//! The [`issue`] function is the one-call entry point; [`Issuer`] gives
//! control over the random number generator and returns the structured
//! [`SdJwt`].
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod conceal;
mod decode;
mod decoy;
mod digest;
mod disclosure;
mod error;
mod issuer;
mod serialized;
mod sign;

pub use conceal::{Disclosable, SdJwtPayload, ALWAYS_VISIBLE_CLAIMS};
pub use decode::{decode_verify, decode_verify_disclosure_array};
pub use decoy::{generate_decoys, DecoyPolicy};
pub use digest::SdAlg;
pub use disclosure::{DecodedDisclosure, Disclosure, DisclosureKind};
pub use error::{DecodeError, IssueError};
pub use issuer::{issue, IssueOptions, Issuer};
pub use serialized::{deserialize_string_format, serialize_string_format, Deserialized, SdJwt};
pub use sign::{build_header, resolve_algorithm, sign_payload, SD_JWT_TYP};

pub use ssi_jwk::{Algorithm, JWK};

const SD_CLAIM_NAME: &str = "_sd";
const SD_ALG_CLAIM_NAME: &str = "_sd_alg";
const ARRAY_CLAIM_ITEM_PROPERTY_NAME: &str = "...";
const CNF_CLAIM_NAME: &str = "cnf";
