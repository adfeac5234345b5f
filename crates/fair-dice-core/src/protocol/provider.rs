//! Contribution providers: the counterpart in a fair-value draw.

use super::{CommitMessage, ProtocolError, RevealMessage};
use async_trait::async_trait;
use std::collections::VecDeque;

/// The contributing party.
///
/// `contribute` is called once the digest has been published and must pick a
/// value in `0..commit.range` having seen nothing but the commit message.
/// Implementations can be:
/// - a console prompt for a human player
/// - a remote peer behind some transport
/// - FixedContribution / ScriptedContributions for testing
#[async_trait]
pub trait ContributionProvider: Send {
    /// Supply a contribution, or `Err(ContributionCancelled)` to withdraw
    async fn contribute(&mut self, commit: &CommitMessage) -> Result<u64, ProtocolError>;

    /// Called when the last contribution was rejected; `contribute` follows
    fn rejected(&mut self, _commit: &CommitMessage, _err: &ProtocolError) {}

    /// Called with the opening so the provider can check it independently
    fn revealed(&mut self, _commit: &CommitMessage, _reveal: &RevealMessage) {}
}

/// Always contributes the same value
#[derive(Clone, Copy, Debug)]
pub struct FixedContribution(pub u64);

#[async_trait]
impl ContributionProvider for FixedContribution {
    async fn contribute(&mut self, _commit: &CommitMessage) -> Result<u64, ProtocolError> {
        Ok(self.0)
    }
}

/// Replays a queue of contributions, cancelling once it runs dry
#[derive(Clone, Debug, Default)]
pub struct ScriptedContributions {
    queue: VecDeque<u64>,
    rejections: usize,
    reveals: Vec<RevealMessage>,
}

impl ScriptedContributions {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            queue: values.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of contributions the protocol rejected
    pub fn rejections(&self) -> usize {
        self.rejections
    }

    /// Reveals observed so far
    pub fn reveals(&self) -> &[RevealMessage] {
        &self.reveals
    }

    /// Contributions not yet consumed
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl ContributionProvider for ScriptedContributions {
    async fn contribute(&mut self, _commit: &CommitMessage) -> Result<u64, ProtocolError> {
        self.queue
            .pop_front()
            .ok_or(ProtocolError::ContributionCancelled)
    }

    fn rejected(&mut self, _commit: &CommitMessage, _err: &ProtocolError) {
        self.rejections += 1;
    }

    fn revealed(&mut self, _commit: &CommitMessage, reveal: &RevealMessage) {
        self.reveals.push(reveal.clone());
    }
}
