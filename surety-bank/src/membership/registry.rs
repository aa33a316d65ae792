use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use surety_common::{
    airline::AirlineStatus,
    error::{Result, SuretyError},
    utils::{format_units, AccountId, Amount},
};

use super::{
    airline::Airline,
    capability::{ActiveAirline, RegisteredAirline},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    /// Candidates are admitted without voting while fewer airlines than this are ACTIVE.
    pub bootstrap_threshold: usize,
    /// Exact bond an admitted airline pays to become ACTIVE.
    pub registration_fee: Amount,
}

/// Outcome of a `register` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The candidate is now REGISTERED.
    Registered { votes: usize },
    /// The vote was recorded; the candidate stays PENDING.
    Pending { votes: usize, required: usize },
}

/// Airline lifecycle: UNREGISTERED -> PENDING -> REGISTERED -> ACTIVE.
///
/// Airlines are created at their first registration call and never removed.
#[derive(Debug, Clone)]
pub struct AirlineRegistry {
    airlines: BTreeMap<AccountId, Airline>,
    policy: AdmissionPolicy,
}

impl AirlineRegistry {
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self {
            airlines: BTreeMap::new(),
            policy,
        }
    }

    /// Registers the deployer airline, admitted without any vote.
    pub fn with_genesis(policy: AdmissionPolicy, first_airline: AccountId) -> Self {
        let mut registry = Self::new(policy);
        registry
            .airlines
            .insert(first_airline.clone(), Airline::new(first_airline, AirlineStatus::Registered));
        registry
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    pub fn get(&self, id: &AccountId) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub fn status(&self, id: &AccountId) -> AirlineStatus {
        self.airlines
            .get(id)
            .map(|a| a.status)
            .unwrap_or(AirlineStatus::Unregistered)
    }

    pub fn active_count(&self) -> usize {
        self.airlines
            .values()
            .filter(|a| a.status == AirlineStatus::Active)
            .count()
    }

    /// Distinct votes needed to admit a candidate: ceil(ACTIVE / 2).
    pub fn required_votes(&self) -> usize {
        (self.active_count() + 1) / 2
    }

    pub fn all(&self) -> impl Iterator<Item = &Airline> {
        self.airlines.values()
    }

    pub fn require_active(&self, id: &AccountId) -> Result<ActiveAirline> {
        match self.status(id) {
            AirlineStatus::Active => Ok(ActiveAirline::new(id.clone())),
            other => Err(SuretyError::Authorization(format!(
                "Airline {} is {}, only ACTIVE airlines may do this",
                id, other
            ))),
        }
    }

    /// Checks that `id` may pay its bond: REGISTERED and not yet ACTIVE.
    pub fn require_fundable(&self, id: &AccountId) -> Result<RegisteredAirline> {
        match self.status(id) {
            AirlineStatus::Registered => Ok(RegisteredAirline::new(id.clone())),
            AirlineStatus::Active => Err(SuretyError::State(format!("Airline {} is already ACTIVE", id))),
            other => Err(SuretyError::Authorization(format!(
                "Airline {} is {}, only REGISTERED airlines may fund",
                id, other
            ))),
        }
    }

    pub fn check_fee(&self, amount: Amount) -> Result<()> {
        if amount != self.policy.registration_fee {
            return Err(SuretyError::Resource(format!(
                "Registration fee must be exactly {}, got {}",
                format_units(self.policy.registration_fee),
                format_units(amount)
            )));
        }
        Ok(())
    }

    /// Registers `candidate` or records `voter`'s vote for it.
    ///
    /// While fewer than `bootstrap_threshold` airlines are ACTIVE the candidate is admitted
    /// directly. Otherwise it needs ceil(ACTIVE / 2) distinct votes; a repeated vote from the
    /// same airline is not counted twice.
    pub fn register(&mut self, candidate: &AccountId, voter: &ActiveAirline) -> Result<Admission> {
        let current = self.status(candidate);
        if current.rank() >= AirlineStatus::Registered.rank() {
            return Err(SuretyError::State(format!(
                "Airline {} is already {}",
                candidate, current
            )));
        }

        let active = self.active_count();
        let required = self.required_votes();
        let bootstrap = active < self.policy.bootstrap_threshold;

        let airline = self
            .airlines
            .entry(candidate.clone())
            .or_insert_with(|| Airline::new(candidate.clone(), AirlineStatus::Unregistered));

        if bootstrap {
            airline.status = AirlineStatus::Registered;
            info!(
                "✈️ Airline {} admitted by {} (bootstrap, {} active)",
                candidate,
                voter.id(),
                active
            );
            return Ok(Admission::Registered { votes: airline.votes.len() });
        }

        airline.status = AirlineStatus::Pending;
        if !airline.votes.insert(voter.id().clone()) {
            info!("🗳️ Duplicate vote from {} for {} ignored", voter.id(), candidate);
        }
        let votes = airline.votes.len();

        if votes >= required {
            airline.status = AirlineStatus::Registered;
            info!(
                "✅ Airline {} REGISTERED by quorum ({}/{} votes, {} active)",
                candidate, votes, required, active
            );
            Ok(Admission::Registered { votes })
        } else {
            info!(
                "🗳️ Airline {} PENDING ({}/{} votes, last from {})",
                candidate,
                votes,
                required,
                voter.id()
            );
            Ok(Admission::Pending { votes, required })
        }
    }

    /// REGISTERED -> ACTIVE. The bond must already be in custody.
    pub fn activate(&mut self, airline: RegisteredAirline) -> AirlineStatus {
        if let Some(a) = self.airlines.get_mut(airline.id()) {
            a.status = AirlineStatus::Active;
            info!("💰 Airline {} is now ACTIVE", airline.id());
        }
        AirlineStatus::Active
    }

    /// Administrative override; the only path that may move an airline backwards.
    pub fn override_status(&mut self, id: &AccountId, status: AirlineStatus) -> AirlineStatus {
        let airline = self
            .airlines
            .entry(id.clone())
            .or_insert_with(|| Airline::new(id.clone(), AirlineStatus::Unregistered));
        let previous = airline.status;
        airline.status = status;
        if status != AirlineStatus::Pending {
            airline.votes.clear();
        }
        info!("⚠️ Airline {} status overridden: {} -> {}", id, previous, status);
        previous
    }
}
