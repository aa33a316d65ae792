use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use surety_common::{flight::FlightStatus, utils::AccountId};

/// Result of recording one oracle response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    /// First time this oracle reported this code.
    New { votes: usize },
    /// Same oracle, same code: not counted again.
    Duplicate { votes: usize },
    /// The oracle had already reported a different code for this request. The new code
    /// is recorded as well.
    Conflicting { previous: FlightStatus, votes: usize },
}

impl Recorded {
    pub fn votes(&self) -> usize {
        match self {
            Recorded::New { votes } | Recorded::Duplicate { votes } | Recorded::Conflicting { votes, .. } => *votes,
        }
    }
}

/// Responses of one status request: status code -> distinct oracles that reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTally {
    responses: BTreeMap<FlightStatus, BTreeSet<AccountId>>,
}

impl ResponseTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, oracle: &AccountId, status: FlightStatus) -> Recorded {
        let previous = self
            .responses
            .iter()
            .find(|(code, voters)| **code != status && voters.contains(oracle))
            .map(|(code, _)| *code);

        let voters = self.responses.entry(status).or_default();
        let inserted = voters.insert(oracle.clone());
        let votes = voters.len();

        match (inserted, previous) {
            (false, _) => Recorded::Duplicate { votes },
            (true, Some(previous)) => {
                warn!(
                    "⚠️ Oracle {} reported {} after already reporting {}",
                    oracle, status, previous
                );
                Recorded::Conflicting { previous, votes }
            }
            (true, None) => Recorded::New { votes },
        }
    }

    pub fn count(&self, status: FlightStatus) -> usize {
        self.responses.get(&status).map(|v| v.len()).unwrap_or(0)
    }

    pub fn voters(&self, status: FlightStatus) -> Option<&BTreeSet<AccountId>> {
        self.responses.get(&status)
    }

    pub fn all(&self) -> &BTreeMap<FlightStatus, BTreeSet<AccountId>> {
        &self.responses
    }

    pub fn total(&self) -> usize {
        self.responses.values().map(|v| v.len()).sum()
    }
}
