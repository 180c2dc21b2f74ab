use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::disclosure::generate_salt;
use crate::{IssueError, SdAlg};

/// How many decoy digests to add to the `_sd` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecoyPolicy {
    /// Always add exactly this many decoys.
    Fixed(usize),

    /// Add a uniformly random number of decoys in `min..=max`.
    Random { min: usize, max: usize },
}

impl Default for DecoyPolicy {
    fn default() -> Self {
        Self::Random { min: 1, max: 5 }
    }
}

impl DecoyPolicy {
    /// Draw the number of decoys for one issuance. The count is always
    /// positive.
    pub fn count(&self, rng: &mut (impl CryptoRng + RngCore)) -> Result<usize, IssueError> {
        match *self {
            Self::Fixed(0) | Self::Random { min: 0, .. } => Err(IssueError::InvalidClaimSet(
                "decoy count must be positive".to_owned(),
            )),
            Self::Fixed(n) => Ok(n),
            Self::Random { min, max } if min > max => Err(IssueError::InvalidClaimSet(format!(
                "empty decoy range {min}..={max}"
            ))),
            Self::Random { min, max } => Ok(rng.gen_range(min..=max)),
        }
    }
}

/// Generate `count` decoy digests.
///
/// Each decoy is the digest of a fresh random salt, so it has the length and
/// alphabet of a genuine disclosure digest but no disclosure behind it.
pub fn generate_decoys(
    rng: &mut (impl CryptoRng + RngCore),
    sd_alg: SdAlg,
    count: usize,
) -> Result<Vec<String>, IssueError> {
    (0..count)
        .map(|_| sd_alg.hash(&generate_salt(rng)))
        .collect()
}
