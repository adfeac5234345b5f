//! Protocol messages.

use super::{ProtocolError, RunId};
use crate::crypto::{CommitmentKey, Digest};
use serde::{Deserialize, Serialize};

/// Phase 1: published by the committing party; reveals nothing about the secret
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    pub run_id: RunId,
    pub range: u64,
    pub digest: Digest,
}

/// Phase 3: the opening of the commitment, published after the contribution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealMessage {
    pub run_id: RunId,
    pub secret: u64,
    pub key: CommitmentKey,
}

/// A verified fair value and the transcript that produced it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairValue {
    pub run_id: RunId,
    pub range: u64,
    pub secret: u64,
    pub contribution: u64,
    pub result: u64,
}

/// Check a reveal against the published commitment and combine the values.
///
/// This is what any observer, the contributing party included, runs to
/// confirm the committing party did not change its secret.
pub fn verify_reveal(
    commit: &CommitMessage,
    contribution: u64,
    reveal: &RevealMessage,
) -> Result<FairValue, ProtocolError> {
    let violation = |reason: &str| ProtocolError::ProtocolViolation {
        run_id: commit.run_id,
        reason: reason.to_string(),
    };

    if reveal.run_id != commit.run_id {
        return Err(violation("reveal belongs to a different run"));
    }
    if commit.range == 0 {
        return Err(ProtocolError::InvalidRange);
    }
    if contribution >= commit.range {
        return Err(ProtocolError::InvalidContribution {
            value: contribution,
            range: commit.range,
        });
    }
    if reveal.secret >= commit.range {
        return Err(violation("revealed secret is outside the range"));
    }
    if !commit.digest.matches(reveal.secret, &reveal.key) {
        return Err(violation("revealed secret and key do not match the digest"));
    }

    // Both operands are below range, so widen to avoid overflow near u64::MAX
    let sum = u128::from(reveal.secret) + u128::from(contribution);
    let result = (sum % u128::from(commit.range)) as u64;

    Ok(FairValue {
        run_id: commit.run_id,
        range: commit.range,
        secret: reveal.secret,
        contribution,
        result,
    })
}
