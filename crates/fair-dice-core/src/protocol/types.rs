//! Protocol types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Unique identifier of one fair-value run
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunId({})", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable state of a fair-value run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolState {
    Idle,
    Committed,
    Contributed,
    Revealed,
    Finalized,
    Aborted,
}

impl ProtocolState {
    /// Finalized and Aborted accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProtocolState::Finalized | ProtocolState::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolState::Idle => "idle",
            ProtocolState::Committed => "committed",
            ProtocolState::Contributed => "contributed",
            ProtocolState::Revealed => "revealed",
            ProtocolState::Finalized => "finalized",
            ProtocolState::Aborted => "aborted",
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Environment variable capping rejected contributions per draw
pub const MAX_INVALID_CONTRIBUTIONS_VAR: &str = "FAIR_DICE_MAX_INVALID_CONTRIBUTIONS";
/// Environment variable with the contribution deadline in seconds
pub const CONTRIBUTION_TIMEOUT_VAR: &str = "FAIR_DICE_CONTRIBUTION_TIMEOUT_SECS";

/// Orchestrator settings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Abort after this many rejected contributions (`None` = keep asking)
    pub max_invalid_contributions: Option<u32>,
    /// Abort if the provider takes longer than this (`None` = wait forever)
    pub contribution_timeout: Option<Duration>,
}

impl ProtocolConfig {
    /// Read settings from the environment, ignoring unparsable values.
    /// Zero means no limit for either setting.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_invalid_contributions =
            parse_var(&lookup, MAX_INVALID_CONTRIBUTIONS_VAR).filter(|max| *max > 0);
        let contribution_timeout = parse_var::<u64>(&lookup, CONTRIBUTION_TIMEOUT_VAR)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            max_invalid_contributions,
            contribution_timeout,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a non-negative integer", name, raw);
            None
        }
    }
}
