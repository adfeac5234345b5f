//! Fair Dice Core Library
//!
//! This crate provides the commit-reveal fair-value protocol, the secure
//! randomness and HMAC commitments it is built on, and win-probability
//! analysis for sets of non-transitive dice.

pub mod crypto;
pub mod dice;
pub mod protocol;

pub use crypto::{CommitmentKey, Digest, OsRandomSource, SecretCommitment, SecureRandomSource};
pub use dice::{Dice, DiceError, DominanceCycle, ProbabilityMatrix};
pub use protocol::{
    CommitMessage, ContributionProvider, FairValue, FairValueProtocol, FairValueRun,
    ProtocolConfig, ProtocolError, ProtocolState, RevealMessage, RunId,
};
