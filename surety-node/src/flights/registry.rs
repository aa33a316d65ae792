use std::collections::BTreeMap;

use tracing::info;

use surety_bank::ActiveAirline;
use surety_common::{
    error::{Result, SuretyError},
    flight::{FlightKey, FlightStatus},
    utils::{format_units, AccountId, Amount, PayoutMultiplier},
};

use super::{
    flight::{Flight, FlightInfo},
    policy::{ClaimTicket, InsurancePolicy},
};

/// Flights registered by ACTIVE airlines and the policies sold on them.
#[derive(Debug, Clone)]
pub struct FlightRegistry {
    flights: BTreeMap<FlightKey, Flight>,
    policies: BTreeMap<(FlightKey, AccountId), InsurancePolicy>,
    premium_cap: Amount,
    multiplier: PayoutMultiplier,
}

impl FlightRegistry {
    pub fn new(premium_cap: Amount, multiplier: PayoutMultiplier) -> Self {
        Self {
            flights: BTreeMap::new(),
            policies: BTreeMap::new(),
            premium_cap,
            multiplier,
        }
    }

    pub fn premium_cap(&self) -> Amount {
        self.premium_cap
    }

    pub fn multiplier(&self) -> PayoutMultiplier {
        self.multiplier
    }

    pub fn register(&mut self, airline: &ActiveAirline, code: &str, timestamp: u64) -> Result<FlightKey> {
        let key = FlightKey::new(airline.id().clone(), code, timestamp);
        if self.flights.contains_key(&key) {
            return Err(SuretyError::State(format!("Flight {} is already registered", key)));
        }
        self.flights.insert(key.clone(), Flight::new(key.clone()));
        info!("🛫 Flight {} registered", key);
        Ok(key)
    }

    pub fn get(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn all(&self) -> impl Iterator<Item = &Flight> {
        self.flights.values()
    }

    pub fn require(&self, key: &FlightKey) -> Result<&Flight> {
        self.flights
            .get(key)
            .ok_or_else(|| SuretyError::State(format!("Flight {} is not registered", key)))
    }

    /// Registered and without a written status.
    pub fn require_unresolved(&self, key: &FlightKey) -> Result<&Flight> {
        let flight = self.require(key)?;
        if flight.resolved {
            return Err(SuretyError::State(format!(
                "Flight {} already resolved as {}",
                key, flight.status
            )));
        }
        Ok(flight)
    }

    pub fn info(&self, key: &FlightKey) -> FlightInfo {
        self.flights
            .get(key)
            .map(FlightInfo::from)
            .unwrap_or_else(FlightInfo::unregistered)
    }

    pub fn policy(&self, key: &FlightKey, passenger: &AccountId) -> Option<&InsurancePolicy> {
        self.policies.get(&(key.clone(), passenger.clone()))
    }

    pub fn policies(&self) -> impl Iterator<Item = &InsurancePolicy> {
        self.policies.values()
    }

    /// Validates a purchase and prices it. Nothing is stored.
    pub fn quote(&self, key: &FlightKey, passenger: &AccountId, premium: Amount) -> Result<InsurancePolicy> {
        self.require_unresolved(key)?;

        if premium == 0 {
            return Err(SuretyError::Resource("Premium must be greater than zero".into()));
        }
        if premium > self.premium_cap {
            return Err(SuretyError::Resource(format!(
                "Premium {} exceeds the cap of {}",
                format_units(premium),
                format_units(self.premium_cap)
            )));
        }
        if self.policy(key, passenger).is_some() {
            return Err(SuretyError::State(format!(
                "{} is already insured on {}",
                passenger, key
            )));
        }

        Ok(InsurancePolicy {
            passenger: passenger.clone(),
            flight: key.clone(),
            premium,
            payout: self.multiplier.apply(premium),
            claimed: false,
        })
    }

    /// Stores a quoted policy once its funds are in custody.
    pub fn insure(&mut self, policy: InsurancePolicy) {
        if let Some(flight) = self.flights.get_mut(&policy.flight) {
            flight.total_insured += policy.premium;
        }
        info!(
            "🧾 {} insured on {}: premium {}, payout {}",
            policy.passenger,
            policy.flight,
            format_units(policy.premium),
            format_units(policy.payout)
        );
        self.policies
            .insert((policy.flight.clone(), policy.passenger.clone()), policy);
    }

    /// Writes the consensus status. A flight status is written at most once.
    pub fn write_status(&mut self, key: &FlightKey, status: FlightStatus) -> Result<&Flight> {
        self.require_unresolved(key)?;
        let flight = self
            .flights
            .get_mut(key)
            .ok_or_else(|| SuretyError::State(format!("Flight {} is not registered", key)))?;
        flight.status = status;
        flight.resolved = true;
        flight.paying = status.entitles_payout();
        info!("🛬 Flight {} status written: {} (paying: {})", key, status, flight.paying);
        Ok(flight)
    }

    /// Checks claim eligibility and marks the policy claimed.
    ///
    /// The returned ticket is what settlement consumes; the flag is already set when
    /// the caller gets it.
    pub fn begin_claim(&mut self, key: &FlightKey, passenger: &AccountId) -> Result<ClaimTicket> {
        let flight = self.require(key)?;
        let status = flight.status;
        let paying = flight.paying;

        let policy = self
            .policies
            .get_mut(&(key.clone(), passenger.clone()))
            .ok_or_else(|| {
                SuretyError::Authorization(format!("NotEligible: {} holds no policy on {}", passenger, key))
            })?;

        if !paying {
            return Err(SuretyError::Authorization(format!(
                "NotEligible: flight {} status is {}",
                key, status
            )));
        }
        if policy.claimed {
            return Err(SuretyError::State(format!(
                "AlreadyClaimed: policy of {} on {}",
                passenger, key
            )));
        }

        policy.claimed = true;
        Ok(ClaimTicket::new(policy.clone()))
    }

    /// Restores a claim whose settlement failed.
    pub fn abort_claim(&mut self, ticket: ClaimTicket) {
        let policy = ticket.policy();
        if let Some(stored) = self
            .policies
            .get_mut(&(policy.flight.clone(), policy.passenger.clone()))
        {
            stored.claimed = false;
        }
    }
}
