//! Demo error type.

use crate::cli::DiceSetError;
use fair_dice_core::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("{0}")]
    InvalidDiceSet(#[from] DiceSetError),

    #[error("Fair value generation failed: {0}")]
    Protocol(ProtocolError),

    #[error("Console error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Game cancelled.")]
    Cancelled,
}

impl From<ProtocolError> for DemoError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::ContributionCancelled => DemoError::Cancelled,
            other => DemoError::Protocol(other),
        }
    }
}
