//! Fair-value orchestrator: drives runs against a contribution provider.

use super::{
    AbortReason, CommitMessage, ContributionProvider, FairValue, FairValueRun, ProtocolConfig,
    ProtocolError,
};
use crate::crypto::{OsRandomSource, SecretCommitment, SecureRandomSource};
use std::collections::HashSet;
use tracing::{debug, error, warn};

/// Produces fair values, one fresh run per draw.
///
/// Remembers every key it has issued and refuses to commit twice under the
/// same key.
pub struct FairValueProtocol<S> {
    source: S,
    config: ProtocolConfig,
    issued_keys: HashSet<[u8; 32]>,
}

impl Default for FairValueProtocol<OsRandomSource> {
    fn default() -> Self {
        Self::new(OsRandomSource::default())
    }
}

impl<S: SecureRandomSource> FairValueProtocol<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, ProtocolConfig::default())
    }

    pub fn with_config(source: S, config: ProtocolConfig) -> Self {
        Self {
            source,
            config,
            issued_keys: HashSet::new(),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Number of runs that reached the commit phase
    pub fn runs_committed(&self) -> usize {
        self.issued_keys.len()
    }

    /// Run one complete draw of a fair value in `[0, range)`
    pub async fn generate<P>(
        &mut self,
        range: u64,
        provider: &mut P,
    ) -> Result<FairValue, ProtocolError>
    where
        P: ContributionProvider + ?Sized,
    {
        let mut run = FairValueRun::new(range)?;

        let secret = match SecretCommitment::generate(&mut self.source, range) {
            Ok(secret) => secret,
            Err(err) => return Err(abort(&mut run, err.into())),
        };
        if !self.issued_keys.insert(*secret.key().as_bytes()) {
            let run_id = run.id();
            return Err(abort(&mut run, ProtocolError::KeyReuse(run_id)));
        }
        let commit = run.commit_secret(secret)?;

        let mut rejected = 0u32;
        loop {
            let offered = match self.await_contribution(provider, &commit).await {
                Ok(value) => value,
                Err(err) => return Err(abort(&mut run, err)),
            };

            match run.contribute(offered) {
                Ok(()) => break,
                Err(err) if err.is_recoverable() => {
                    rejected += 1;
                    warn!("Run {}: {}", run.id(), err);
                    provider.rejected(&commit, &err);
                    if let Some(max) = self.config.max_invalid_contributions {
                        if rejected >= max {
                            return Err(abort(
                                &mut run,
                                ProtocolError::TooManyInvalidContributions(rejected),
                            ));
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }

        let reveal = run.reveal()?;
        provider.revealed(&commit, &reveal);
        run.finalize(&reveal)
    }

    async fn await_contribution<P>(
        &self,
        provider: &mut P,
        commit: &CommitMessage,
    ) -> Result<u64, ProtocolError>
    where
        P: ContributionProvider + ?Sized,
    {
        match self.config.contribution_timeout {
            Some(limit) => tokio::time::timeout(limit, provider.contribute(commit))
                .await
                .map_err(|_| ProtocolError::ContributionTimeout(limit))?,
            None => provider.contribute(commit).await,
        }
    }
}

fn abort(run: &mut FairValueRun, err: ProtocolError) -> ProtocolError {
    let reason = AbortReason::for_error(&err);
    if let Err(state_err) = run.abort(reason) {
        debug!("Run {}: {}", run.id(), state_err);
    }
    if matches!(reason, AbortReason::Cancelled) {
        debug!("Run {}: {}", run.id(), err);
    } else {
        error!("Run {}: {}", run.id(), err);
    }
    err
}
