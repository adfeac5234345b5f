//! Cryptographic primitives for the fair-value protocol.
//!
//! This module provides:
//! - SecureRandomSource for keys and unbiased uniform sampling
//! - CommitmentKey, Digest and SecretCommitment for the HMAC commit-reveal scheme

mod commitment;
mod random;

pub use commitment::{commit, verify, CommitmentKey, Digest, SecretCommitment};
pub use random::{
    CryptoRngSource, OsRandomSource, RandomError, SamplingPlan, SecureRandomSource,
};
