use serde::{Deserialize, Serialize};
use tracing::debug;

use surety_common::flight::FlightStatus;

use super::registry::ResponseTally;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    /// Distinct oracles that must report the same code.
    pub min_responses: usize,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self { min_responses: 3 }
    }
}

/// Decides whether a request is resolved.
///
/// Evaluated after every accepted response, so the first code to reach the threshold
/// wins even if another code later collects more votes.
#[derive(Debug, Clone)]
pub struct ConsensusEvaluator {
    pub policy: ThresholdPolicy,
}

impl ConsensusEvaluator {
    pub fn new(policy: ThresholdPolicy) -> Self {
        Self { policy }
    }

    /// Returns `candidate` if it has just reached the threshold.
    pub fn evaluate(&self, tally: &ResponseTally, candidate: FlightStatus) -> Option<FlightStatus> {
        let votes = tally.count(candidate);
        debug!(
            "🗳️ Evaluating {} ({}/{} responses)",
            candidate, votes, self.policy.min_responses
        );
        (votes >= self.policy.min_responses).then_some(candidate)
    }
}
