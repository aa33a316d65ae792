use tracing::{info, warn};

use surety_common::{
    crypto::flight_index,
    error::{Result, SuretyError},
    flight::{FlightKey, FlightStatus},
    utils::{AccountId, Amount},
};

use crate::oracle::OracleRegistry;

use super::{
    evaluator::{ConsensusEvaluator, ThresholdPolicy},
    pool::{RequestPool, RequestState, StatusRequest},
    registry::Recorded,
};

/// Returned by `fetch_flight_status`; carries what the request notification needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub request_id: u64,
    pub index: u8,
    /// The request already existed and was still open.
    pub reopened: bool,
}

/// Outcome of an accepted oracle response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Recorded; the request stays open.
    Pending { request_id: u64, status: FlightStatus, votes: usize },
    /// This response made `status` reach the threshold. The request is now closed.
    Resolved { request_id: u64, status: FlightStatus, votes: usize },
}

/// Index-sharded request/response aggregation.
///
/// A request is OPEN until one status code collects `min_responses` distinct votes
/// from oracles holding the request's index, then RESOLVED for good.
#[derive(Debug, Clone)]
pub struct OracleConsensusEngine {
    pub oracles: OracleRegistry,
    pub pool: RequestPool,
    pub evaluator: ConsensusEvaluator,
}

impl OracleConsensusEngine {
    pub fn new(fee: Amount, index_range: u8, policy: ThresholdPolicy) -> Self {
        Self {
            oracles: OracleRegistry::new(fee, index_range),
            pool: RequestPool::new(),
            evaluator: ConsensusEvaluator::new(policy),
        }
    }

    /// Fee is exact and the caller is not yet an oracle.
    pub fn check_registration(&self, caller: &AccountId, fee: Amount) -> Result<()> {
        self.oracles.check_fee(fee)?;
        if self.oracles.get(caller).is_some() {
            return Err(SuretyError::State(format!("Oracle {} is already registered", caller)));
        }
        Ok(())
    }

    /// Registers `caller` as an oracle for exactly the configured fee.
    pub fn register_oracle(&mut self, caller: &AccountId, fee: Amount, seed: &[u8]) -> Result<[u8; 3]> {
        self.check_registration(caller, fee)?;
        self.oracles.register(caller, seed)
    }

    pub fn indexes_of(&self, caller: &AccountId) -> Result<[u8; 3]> {
        Ok(self.oracles.require(caller)?.indexes)
    }

    /// Opens a status request for `key`, or returns the one still open for it.
    pub fn fetch_flight_status(&mut self, key: &FlightKey) -> Result<RequestTicket> {
        if let Some(existing) = self.pool.find_by_key(key) {
            return match existing.state {
                RequestState::Open => {
                    info!(
                        "📡 Request #{} for {} re-announced (index {}, {} responses so far)",
                        existing.request_id,
                        key,
                        existing.index,
                        existing.tally.total()
                    );
                    Ok(RequestTicket {
                        request_id: existing.request_id,
                        index: existing.index,
                        reopened: true,
                    })
                }
                RequestState::Resolved(status) => Err(SuretyError::State(format!(
                    "Request #{} for {} already resolved as {}",
                    existing.request_id, key, status
                ))),
            };
        }

        let index = flight_index(key, self.oracles.range());
        let request_id = self.pool.open(key.clone(), index);
        info!(
            "📡 Request #{} opened for {} (index {}, {} open)",
            request_id,
            key,
            index,
            self.pool.open_count()
        );
        Ok(RequestTicket {
            request_id,
            index,
            reopened: false,
        })
    }

    /// Records `caller`'s report of `status` for the open request on `key`.
    ///
    /// Rejected (with no change) unless the caller is a registered oracle holding the
    /// request's index and the request is still open.
    pub fn submit_response(
        &mut self,
        caller: &AccountId,
        key: &FlightKey,
        status: FlightStatus,
    ) -> Result<Resolution> {
        let oracle = self.oracles.require(caller)?.clone();

        let request = self
            .pool
            .find_by_key_mut(key)
            .ok_or_else(|| SuretyError::State(format!("No status request for {}", key)))?;

        if !oracle.holds(request.index) {
            return Err(SuretyError::Authorization(format!(
                "Oracle {} (indexes {:?}) may not answer request #{} (index {})",
                caller, oracle.indexes, request.request_id, request.index
            )));
        }

        if let RequestState::Resolved(resolved) = request.state {
            return Err(SuretyError::State(format!(
                "Request #{} already resolved as {}",
                request.request_id, resolved
            )));
        }

        let recorded = request.tally.record(caller, status);
        let votes = recorded.votes();
        let request_id = request.request_id;

        match recorded {
            Recorded::Duplicate { .. } => {
                info!("🗳️ Duplicate response from {} on request #{} ignored", caller, request_id);
            }
            Recorded::Conflicting { previous, .. } => {
                warn!(
                    "🚨 Oracle {} changed its answer on request #{}: {} -> {}",
                    caller, request_id, previous, status
                );
            }
            Recorded::New { .. } => {
                info!(
                    "📥 [{}] reported {} on request #{} ({} votes)",
                    caller, status, request_id, votes
                );
            }
        }

        match self.evaluator.evaluate(&request.tally, status) {
            Some(status) => {
                request.state = RequestState::Resolved(status);
                info!(
                    "✅ Request #{} RESOLVED: {} as {} with {} votes",
                    request_id, key, status, votes
                );
                Ok(Resolution::Resolved {
                    request_id,
                    status,
                    votes,
                })
            }
            None => Ok(Resolution::Pending {
                request_id,
                status,
                votes,
            }),
        }
    }

    pub fn request(&self, request_id: u64) -> Option<&StatusRequest> {
        self.pool.find_by_id(request_id)
    }

    pub fn request_for(&self, key: &FlightKey) -> Option<&StatusRequest> {
        self.pool.find_by_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_common::{error::ErrorKind, utils::UNIT};

    fn engine() -> OracleConsensusEngine {
        OracleConsensusEngine::new(UNIT, 10, ThresholdPolicy::default())
    }

    /// Registers oracles until `n` of them hold `index`; returns their ids.
    fn eligible_oracles(engine: &mut OracleConsensusEngine, index: u8, n: usize) -> Vec<AccountId> {
        let mut eligible = Vec::new();
        let mut i = 0;
        while eligible.len() < n {
            let id = AccountId::from(format!("oracle{}", i));
            let idx = engine.register_oracle(&id, UNIT, b"seed").unwrap();
            if idx.contains(&index) {
                eligible.push(id);
            }
            i += 1;
        }
        eligible
    }

    fn ineligible_oracle(engine: &mut OracleConsensusEngine, index: u8) -> AccountId {
        let mut i = 0;
        loop {
            let id = AccountId::from(format!("outsider{}", i));
            let idx = engine.register_oracle(&id, UNIT, b"seed").unwrap();
            if !idx.contains(&index) {
                return id;
            }
            i += 1;
        }
    }

    #[test]
    fn test_first_code_to_threshold_wins() {
        let mut engine = engine();
        let key = FlightKey::new("airline".into(), "ND1309", 1_700_000_000);
        let ticket = engine.fetch_flight_status(&key).unwrap();
        assert!(!ticket.reopened);

        let oracles = eligible_oracles(&mut engine, ticket.index, 6);

        for o in &oracles[0..2] {
            let r = engine.submit_response(o, &key, FlightStatus::OnTime).unwrap();
            assert!(matches!(r, Resolution::Pending { .. }));
        }
        for o in &oracles[2..4] {
            engine.submit_response(o, &key, FlightStatus::LateAirline).unwrap();
        }
        let r = engine.submit_response(&oracles[4], &key, FlightStatus::LateAirline).unwrap();
        assert_eq!(
            r,
            Resolution::Resolved {
                request_id: ticket.request_id,
                status: FlightStatus::LateAirline,
                votes: 3
            }
        );

        let err = engine.submit_response(&oracles[5], &key, FlightStatus::OnTime).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        let request = engine.request(ticket.request_id).unwrap();
        assert_eq!(request.resolved_status(), Some(FlightStatus::LateAirline));
        assert_eq!(request.tally.count(FlightStatus::OnTime), 2);
    }

    #[test]
    fn test_duplicate_votes_do_not_resolve() {
        let mut engine = engine();
        let key = FlightKey::new("airline".into(), "ND1310", 1);
        let ticket = engine.fetch_flight_status(&key).unwrap();
        let oracles = eligible_oracles(&mut engine, ticket.index, 1);

        for _ in 0..5 {
            let r = engine.submit_response(&oracles[0], &key, FlightStatus::LateAirline).unwrap();
            assert!(matches!(r, Resolution::Pending { votes: 1, .. }));
        }
        assert!(engine.request(ticket.request_id).unwrap().is_open());
    }

    #[test]
    fn test_index_mismatch_is_unauthorized() {
        let mut engine = engine();
        let key = FlightKey::new("airline".into(), "ND1311", 1);
        let ticket = engine.fetch_flight_status(&key).unwrap();
        let outsider = ineligible_oracle(&mut engine, ticket.index);

        let err = engine.submit_response(&outsider, &key, FlightStatus::OnTime).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(engine.request(ticket.request_id).unwrap().tally.total(), 0);
    }

    #[test]
    fn test_unregistered_oracle_and_unknown_request() {
        let mut engine = engine();
        let key = FlightKey::new("airline".into(), "ND1312", 1);

        let err = engine.submit_response(&"ghost".into(), &key, FlightStatus::OnTime).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let oracle = AccountId::from("oracle");
        engine.register_oracle(&oracle, UNIT, b"seed").unwrap();
        let err = engine.submit_response(&oracle, &key, FlightStatus::OnTime).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn test_refetch_keeps_open_request() {
        let mut engine = engine();
        let key = FlightKey::new("airline".into(), "ND1313", 1);
        let first = engine.fetch_flight_status(&key).unwrap();
        let oracles = eligible_oracles(&mut engine, first.index, 1);
        engine.submit_response(&oracles[0], &key, FlightStatus::OnTime).unwrap();

        let second = engine.fetch_flight_status(&key).unwrap();
        assert!(second.reopened);
        assert_eq!(second.request_id, first.request_id);
        assert_eq!(engine.request_for(&key).unwrap().tally.total(), 1);
    }

    #[test]
    fn test_wrong_fee_rejected() {
        let mut engine = engine();
        let err = engine.register_oracle(&"oracle".into(), UNIT / 2, b"seed").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(engine.oracles.is_empty());
    }
}
