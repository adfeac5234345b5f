//! Single fair-value run: the commit-reveal state machine.

use super::{
    verify_reveal, AbortReason, CommitMessage, FairValue, ProtocolError, ProtocolState,
    RevealMessage, RunId,
};
use crate::crypto::{SecretCommitment, SecureRandomSource};
use tracing::{debug, error, info};

enum Stage {
    Idle,
    Committed {
        secret: SecretCommitment,
        commit: CommitMessage,
    },
    Contributed {
        secret: SecretCommitment,
        commit: CommitMessage,
        contribution: u64,
    },
    Revealed {
        commit: CommitMessage,
        contribution: u64,
    },
    Finalized(FairValue),
    Aborted(AbortReason),
}

impl Stage {
    fn state(&self) -> ProtocolState {
        match self {
            Stage::Idle => ProtocolState::Idle,
            Stage::Committed { .. } => ProtocolState::Committed,
            Stage::Contributed { .. } => ProtocolState::Contributed,
            Stage::Revealed { .. } => ProtocolState::Revealed,
            Stage::Finalized(_) => ProtocolState::Finalized,
            Stage::Aborted(_) => ProtocolState::Aborted,
        }
    }
}

/// One draw of a fair value in `[0, range)`.
///
/// The secret and key live only inside this run until `reveal`, and are
/// dropped unrevealed if the run is aborted first.
pub struct FairValueRun {
    id: RunId,
    range: u64,
    stage: Stage,
}

impl FairValueRun {
    /// Start a run over `[0, range)`
    pub fn new(range: u64) -> Result<Self, ProtocolError> {
        if range == 0 {
            return Err(ProtocolError::InvalidRange);
        }
        Ok(Self {
            id: RunId::new(),
            range,
            stage: Stage::Idle,
        })
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn range(&self) -> u64 {
        self.range
    }

    pub fn state(&self) -> ProtocolState {
        self.stage.state()
    }

    /// Final value, once finalized
    pub fn result(&self) -> Option<&FairValue> {
        match &self.stage {
            Stage::Finalized(value) => Some(value),
            _ => None,
        }
    }

    /// Why the run was aborted, if it was
    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self.stage {
            Stage::Aborted(reason) => Some(reason),
            _ => None,
        }
    }

    fn invalid(&self, operation: &'static str) -> ProtocolError {
        ProtocolError::InvalidState {
            operation,
            state: self.state(),
        }
    }

    /// Idle -> Committed: draw key and secret, publish only the digest
    pub fn commit<S: SecureRandomSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<CommitMessage, ProtocolError> {
        if !matches!(self.stage, Stage::Idle) {
            return Err(self.invalid("commit"));
        }
        match SecretCommitment::generate(source, self.range) {
            Ok(secret) => self.commit_secret(secret),
            Err(err) => {
                let err = ProtocolError::from(err);
                self.stage = Stage::Aborted(AbortReason::for_error(&err));
                error!("Run {}: secure randomness failed: {}", self.id, err);
                Err(err)
            }
        }
    }

    /// Idle -> Committed with a secret drawn by the caller
    pub(crate) fn commit_secret(
        &mut self,
        secret: SecretCommitment,
    ) -> Result<CommitMessage, ProtocolError> {
        if !matches!(self.stage, Stage::Idle) {
            return Err(self.invalid("commit"));
        }
        if secret.value() >= self.range {
            return Err(ProtocolError::ProtocolViolation {
                run_id: self.id,
                reason: "secret drawn outside the range".to_string(),
            });
        }

        let commit = CommitMessage {
            run_id: self.id,
            range: self.range,
            digest: *secret.digest(),
        };
        debug!(
            "Run {}: committed to a secret in 0..{} (HMAC={})",
            self.id, self.range, commit.digest
        );
        self.stage = Stage::Committed {
            secret,
            commit: commit.clone(),
        };
        Ok(commit)
    }

    /// Committed -> Contributed. Out-of-range values leave the state unchanged.
    pub fn contribute(&mut self, contribution: u64) -> Result<(), ProtocolError> {
        if !matches!(self.stage, Stage::Committed { .. }) {
            return Err(self.invalid("contribute"));
        }
        if contribution >= self.range {
            return Err(ProtocolError::InvalidContribution {
                value: contribution,
                range: self.range,
            });
        }

        if let Stage::Committed { secret, commit } =
            std::mem::replace(&mut self.stage, Stage::Idle)
        {
            self.stage = Stage::Contributed {
                secret,
                commit,
                contribution,
            };
        }
        debug!("Run {}: contribution {} accepted", self.id, contribution);
        Ok(())
    }

    /// Contributed -> Revealed: publish secret and key
    pub fn reveal(&mut self) -> Result<RevealMessage, ProtocolError> {
        match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Contributed {
                secret,
                commit,
                contribution,
            } => {
                let (secret, key) = secret.into_opening();
                self.stage = Stage::Revealed {
                    commit,
                    contribution,
                };
                debug!("Run {}: revealed secret {} (KEY={})", self.id, secret, key);
                Ok(RevealMessage {
                    run_id: self.id,
                    secret,
                    key,
                })
            }
            other => {
                self.stage = other;
                Err(self.invalid("reveal"))
            }
        }
    }

    /// Revealed -> Finalized, or Aborted if the reveal does not open the commitment
    pub fn finalize(&mut self, reveal: &RevealMessage) -> Result<FairValue, ProtocolError> {
        let (commit, contribution) = match &self.stage {
            Stage::Revealed {
                commit,
                contribution,
            } => (commit, *contribution),
            _ => return Err(self.invalid("finalize")),
        };

        match verify_reveal(commit, contribution, reveal) {
            Ok(value) => {
                info!(
                    "Run {}: fair value {} = {} + {} (mod {})",
                    self.id, value.result, value.secret, value.contribution, value.range
                );
                self.stage = Stage::Finalized(value.clone());
                Ok(value)
            }
            Err(err) => {
                error!("Run {}: {}", self.id, err);
                self.stage = Stage::Aborted(AbortReason::ProtocolViolation);
                Err(err)
            }
        }
    }

    /// Abandon the run before the reveal, discarding the secret and key
    pub fn abort(&mut self, reason: AbortReason) -> Result<(), ProtocolError> {
        match self.stage {
            Stage::Idle | Stage::Committed { .. } | Stage::Contributed { .. } => {
                debug!("Run {}: aborted ({:?})", self.id, reason);
                self.stage = Stage::Aborted(reason);
                Ok(())
            }
            _ => Err(self.invalid("abort")),
        }
    }
}
