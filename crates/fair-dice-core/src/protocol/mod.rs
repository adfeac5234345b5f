//! The fair-value protocol: commit, contribute, reveal, verify.

mod error;
mod fair_value;
mod messages;
mod provider;
mod run;
mod types;

pub use error::{AbortReason, ProtocolError};
pub use fair_value::FairValueProtocol;
pub use messages::{verify_reveal, CommitMessage, FairValue, RevealMessage};
pub use provider::{ContributionProvider, FixedContribution, ScriptedContributions};
pub use run::FairValueRun;
pub use types::{
    ProtocolConfig, ProtocolState, RunId, CONTRIBUTION_TIMEOUT_VAR, MAX_INVALID_CONTRIBUTIONS_VAR,
};
