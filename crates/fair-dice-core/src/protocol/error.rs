//! Protocol errors.

use super::{ProtocolState, RunId};
use crate::crypto::RandomError;
use std::time::Duration;
use thiserror::Error;

/// Errors from a fair-value draw
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Invalid range: must be a positive integer")]
    InvalidRange,

    #[error("Invalid contribution {value}: must be in 0..{range}")]
    InvalidContribution { value: u64, range: u64 },

    #[error("Protocol violation in run {run_id}: {reason}")]
    ProtocolViolation { run_id: RunId, reason: String },

    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Contribution cancelled")]
    ContributionCancelled,

    #[error("No contribution within {0:?}")]
    ContributionTimeout(Duration),

    #[error("Gave up after {0} invalid contributions")]
    TooManyInvalidContributions(u32),

    #[error("Commitment key reused in run {0}")]
    KeyReuse(RunId),

    #[error("Cannot {operation} in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ProtocolState,
    },
}

impl ProtocolError {
    /// Whether the provider should simply be asked again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::InvalidContribution { .. })
    }
}

impl From<RandomError> for ProtocolError {
    fn from(err: RandomError) -> Self {
        match err {
            RandomError::InvalidRange => ProtocolError::InvalidRange,
            RandomError::EntropyUnavailable(cause) => ProtocolError::EntropyUnavailable(cause),
        }
    }
}

/// Why a run ended in `Aborted`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    EntropyUnavailable,
    Cancelled,
    Timeout,
    TooManyInvalidContributions,
    KeyReuse,
    ProtocolViolation,
    /// A call the run could not accept: bad range, bad value or wrong state
    InvalidRequest,
}

impl AbortReason {
    /// Reason recorded when `err` ends a run
    pub fn for_error(err: &ProtocolError) -> Self {
        match err {
            ProtocolError::EntropyUnavailable(_) => AbortReason::EntropyUnavailable,
            ProtocolError::ContributionTimeout(_) => AbortReason::Timeout,
            ProtocolError::TooManyInvalidContributions(_) => {
                AbortReason::TooManyInvalidContributions
            }
            ProtocolError::KeyReuse(_) => AbortReason::KeyReuse,
            ProtocolError::ProtocolViolation { .. } => AbortReason::ProtocolViolation,
            ProtocolError::ContributionCancelled => AbortReason::Cancelled,
            ProtocolError::InvalidRange
            | ProtocolError::InvalidContribution { .. }
            | ProtocolError::InvalidState { .. } => AbortReason::InvalidRequest,
        }
    }
}
