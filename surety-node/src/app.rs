//! `FlightSurety`: every component behind one set of entry points.
//!
//! Each mutating entry point checks the operational switch first, validates all of
//! its preconditions, and only then mutates. A returned error means nothing changed
//! and no notification was queued.

use serde::Serialize;
use tracing::info;

use surety_bank::{
    escrow::{EscrowLedger, EscrowPool, EscrowSnapshot, Movement},
    membership::{Admission, AdmissionPolicy, Airline, AirlineRegistry},
};
use surety_common::{
    airline::AirlineStatus,
    config::SuretyConfig,
    crypto::digest,
    error::Result,
    events::SuretyEvent,
    flight::{FlightKey, FlightStatus},
    utils::{format_units, AccountId, Amount, PayoutMultiplier},
};
use surety_consensus::{
    Oracle, OracleConsensusEngine, RequestTicket, Resolution, StatusRequest, ThresholdPolicy,
};

use crate::{
    flights::{Flight, FlightInfo, FlightRegistry, InsurancePolicy},
    switch::OperationalSwitch,
};

/// Configured fees and limits, as exposed to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeSchedule {
    pub airline_registration_fee: Amount,
    pub oracle_registration_fee: Amount,
    pub insurance_premium_cap: Amount,
    pub payout_multiplier: PayoutMultiplier,
}

#[derive(Debug, Clone)]
pub struct FlightSurety {
    config: SuretyConfig,
    switch: OperationalSwitch,
    airlines: AirlineRegistry,
    escrow: EscrowLedger,
    flights: FlightRegistry,
    oracles: OracleConsensusEngine,
    /// Sequence number of the last committed command; weak seed for oracle indexes.
    seed: u64,
    outbox: Vec<SuretyEvent>,
}

impl FlightSurety {
    pub fn new(config: SuretyConfig) -> Result<Self> {
        config.validate()?;

        let policy = AdmissionPolicy {
            bootstrap_threshold: config.quorum_bootstrap_threshold,
            registration_fee: config.airline_registration_fee,
        };
        let airlines = AirlineRegistry::with_genesis(policy, config.first_airline.clone());
        let flights = FlightRegistry::new(config.insurance_premium_cap, config.payout_multiplier);
        let oracles = OracleConsensusEngine::new(
            config.oracle_registration_fee,
            config.oracle_index_range,
            ThresholdPolicy {
                min_responses: config.min_responses,
            },
        );

        info!(
            "🏛️ FlightSurety initialised (admin {}, first airline {}, payout {})",
            config.admin, config.first_airline, config.payout_multiplier
        );

        Ok(Self {
            switch: OperationalSwitch::new(config.admin.clone(), config.app_module.clone()),
            airlines,
            escrow: EscrowLedger::new(),
            flights,
            oracles,
            seed: 0,
            outbox: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &SuretyConfig {
        &self.config
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Notifications queued by the last successful calls.
    pub fn drain_events(&mut self) -> Vec<SuretyEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, event: SuretyEvent) {
        match event.to_json() {
            Ok(json) => info!(target: "audit", "EVENT:{} {}", event.name(), json),
            Err(_) => info!(target: "audit", "EVENT:{} {:?}", event.name(), event),
        }
        self.outbox.push(event);
    }

    /// Operational, and the privileged module is bound.
    fn require_app_gate(&self) -> Result<()> {
        self.switch.require_operational()?;
        self.switch.require_app_module()
    }

    // --- Operational Switch -------------------------------------------------------

    pub fn set_operating_status(&mut self, operational: bool, caller: &AccountId) -> Result<()> {
        self.switch.set_operating_status(operational, caller)?;
        self.emit(SuretyEvent::OperationalStatusChanged { operational });
        Ok(())
    }

    /// Binds a privileged module. The caller must be an ACTIVE airline.
    pub fn authorize_caller(&mut self, module: &AccountId, caller: &AccountId) -> Result<()> {
        self.switch.require_operational()?;
        let voter = self.airlines.require_active(caller)?;
        if self.switch.authorize(module, &voter) {
            self.emit(SuretyEvent::CallerAuthorized {
                module: module.clone(),
                by: caller.clone(),
            });
        }
        Ok(())
    }

    // --- Membership -----------------------------------------------------------------

    pub fn register_airline(&mut self, candidate: &AccountId, caller: &AccountId) -> Result<Admission> {
        self.require_app_gate()?;
        let voter = self.airlines.require_active(caller)?;
        let admission = self.airlines.register(candidate, &voter)?;

        let (status, votes) = match &admission {
            Admission::Registered { votes } => (AirlineStatus::Registered, *votes),
            Admission::Pending { votes, .. } => (AirlineStatus::Pending, *votes),
        };
        self.emit(SuretyEvent::AirlineStatusChanged {
            airline: candidate.clone(),
            status,
            votes,
        });
        Ok(admission)
    }

    /// Pays the registration bond; REGISTERED -> ACTIVE.
    pub fn fund(&mut self, amount: Amount, caller: &AccountId) -> Result<()> {
        self.switch.require_operational()?;
        let airline = self.airlines.require_fundable(caller)?;
        self.airlines.check_fee(amount)?;

        self.escrow
            .credit(EscrowPool::AirlineBonds, amount, &format!("bond {}", caller))?;
        self.airlines.activate(airline);

        let votes = self.airlines.get(caller).map(|a| a.votes.len()).unwrap_or(0);
        self.emit(SuretyEvent::AirlineStatusChanged {
            airline: caller.clone(),
            status: AirlineStatus::Active,
            votes,
        });
        Ok(())
    }

    /// Admin override of an airline status. The only backwards transition.
    pub fn override_airline_status(
        &mut self,
        airline: &AccountId,
        status: AirlineStatus,
        caller: &AccountId,
    ) -> Result<AirlineStatus> {
        self.switch.require_operational()?;
        self.switch.require_admin(caller)?;
        let previous = self.airlines.override_status(airline, status);
        let votes = self.airlines.get(airline).map(|a| a.votes.len()).unwrap_or(0);
        self.emit(SuretyEvent::AirlineStatusChanged {
            airline: airline.clone(),
            status,
            votes,
        });
        Ok(previous)
    }

    // --- Flights & insurance ----------------------------------------------------------

    pub fn register_flight(&mut self, code: &str, timestamp: u64, caller: &AccountId) -> Result<FlightKey> {
        self.require_app_gate()?;
        let airline = self.airlines.require_active(caller)?;
        self.flights.register(&airline, code, timestamp)
    }

    /// Buys cover for `caller` on a flight.
    ///
    /// The premium goes to the premium pool and the part of the payout it does not
    /// cover is reserved from the airline bonds in the same entry.
    pub fn buy_insurance(
        &mut self,
        airline: &AccountId,
        code: &str,
        timestamp: u64,
        premium: Amount,
        caller: &AccountId,
    ) -> Result<InsurancePolicy> {
        self.require_app_gate()?;
        let key = FlightKey::new(airline.clone(), code, timestamp);
        let policy = self.flights.quote(&key, caller, premium)?;

        let mut movements = vec![Movement::Deposit {
            pool: EscrowPool::Premiums,
            amount: policy.premium,
        }];
        if policy.top_up() > 0 {
            movements.push(Movement::Transfer {
                from: EscrowPool::AirlineBonds,
                to: EscrowPool::PayoutReserve,
                amount: policy.top_up(),
            });
        }
        self.escrow
            .apply(&format!("premium {} on {}", caller, key), movements)?;
        self.flights.insure(policy.clone());

        self.emit(SuretyEvent::InsurancePurchased {
            passenger: caller.clone(),
            airline: airline.clone(),
            flight: code.to_string(),
            timestamp,
            premium: policy.premium,
            payout: policy.payout,
        });
        Ok(policy)
    }

    /// Pays the policy of `caller` on a flight whose status is LATE_AIRLINE.
    ///
    /// The policy is marked claimed before any funds move; a failed settlement
    /// restores the flag.
    pub fn pay_benefit(
        &mut self,
        airline: &AccountId,
        code: &str,
        timestamp: u64,
        caller: &AccountId,
    ) -> Result<Amount> {
        self.require_app_gate()?;
        let key = FlightKey::new(airline.clone(), code, timestamp);
        let ticket = self.flights.begin_claim(&key, caller)?;

        let policy = ticket.policy();
        let mut movements = vec![Movement::Withdraw {
            pool: EscrowPool::Premiums,
            recipient: caller.clone(),
            amount: policy.premium,
        }];
        if policy.top_up() > 0 {
            movements.push(Movement::Withdraw {
                pool: EscrowPool::PayoutReserve,
                recipient: caller.clone(),
                amount: policy.top_up(),
            });
        }
        let amount = policy.payout;

        if let Err(e) = self.escrow.apply(&format!("claim {} on {}", caller, key), movements) {
            self.flights.abort_claim(ticket);
            return Err(e);
        }

        info!("💸 Paid {} to {} for {}", format_units(amount), caller, key);
        self.emit(SuretyEvent::BenefitPaid {
            passenger: caller.clone(),
            airline: airline.clone(),
            flight: code.to_string(),
            timestamp,
            amount,
        });
        Ok(amount)
    }

    // --- Oracles --------------------------------------------------------------------

    pub fn register_oracle(&mut self, fee: Amount, caller: &AccountId) -> Result<[u8; 3]> {
        self.require_app_gate()?;
        self.oracles.check_registration(caller, fee)?;

        self.escrow
            .credit(EscrowPool::PayoutReserve, fee, &format!("oracle fee {}", caller))?;
        let indexes = self
            .oracles
            .register_oracle(caller, fee, &self.seed.to_be_bytes())?;

        self.emit(SuretyEvent::OracleRegistered {
            oracle: caller.clone(),
            indexes,
        });
        Ok(indexes)
    }

    /// Opens (or re-announces) a status request. Anyone may ask.
    pub fn fetch_flight_status(
        &mut self,
        airline: &AccountId,
        code: &str,
        timestamp: u64,
        _caller: &AccountId,
    ) -> Result<RequestTicket> {
        self.require_app_gate()?;
        let key = FlightKey::new(airline.clone(), code, timestamp);
        self.flights.require_unresolved(&key)?;
        let ticket = self.oracles.fetch_flight_status(&key)?;

        self.emit(SuretyEvent::OracleRequest {
            request_id: ticket.request_id,
            airline: airline.clone(),
            flight: code.to_string(),
            timestamp,
            index: ticket.index,
        });
        Ok(ticket)
    }

    pub fn submit_response(
        &mut self,
        airline: &AccountId,
        code: &str,
        timestamp: u64,
        status: FlightStatus,
        caller: &AccountId,
    ) -> Result<Resolution> {
        self.require_app_gate()?;
        let key = FlightKey::new(airline.clone(), code, timestamp);
        // Checked before the engine so a resolution is always written.
        self.flights.require_unresolved(&key)?;
        let resolution = self.oracles.submit_response(caller, &key, status)?;

        if let Resolution::Resolved { request_id, status, .. } = resolution {
            self.flights.write_status(&key, status)?;
            self.emit(SuretyEvent::FlightStatusResolved {
                request_id,
                status_code: status,
                flight: code.to_string(),
                timestamp,
                verified: true,
            });
        }
        Ok(resolution)
    }

    // --- Queries --------------------------------------------------------------------

    pub fn is_operational(&self) -> bool {
        self.switch.is_operational()
    }

    pub fn is_authorized(&self, module: &AccountId) -> bool {
        self.switch.is_authorized(module)
    }

    pub fn airline(&self, id: &AccountId) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub fn airline_status(&self, id: &AccountId) -> AirlineStatus {
        self.airlines.status(id)
    }

    pub fn active_airline_count(&self) -> usize {
        self.airlines.active_count()
    }

    pub fn flight_info(&self, airline: &AccountId, code: &str, timestamp: u64) -> FlightInfo {
        self.flights.info(&FlightKey::new(airline.clone(), code, timestamp))
    }

    pub fn check_package(
        &self,
        passenger: &AccountId,
        airline: &AccountId,
        code: &str,
        timestamp: u64,
    ) -> Option<&InsurancePolicy> {
        self.flights
            .policy(&FlightKey::new(airline.clone(), code, timestamp), passenger)
    }

    /// Indexes of a registered oracle; AuthorizationError otherwise.
    pub fn indexes_of(&self, caller: &AccountId) -> Result<[u8; 3]> {
        self.oracles.indexes_of(caller)
    }

    pub fn request(&self, request_id: u64) -> Option<&StatusRequest> {
        self.oracles.request(request_id)
    }

    pub fn escrow_snapshot(&self) -> EscrowSnapshot {
        self.escrow.snapshot()
    }

    pub fn paid_to(&self, recipient: &AccountId) -> Amount {
        self.escrow.paid_to(recipient)
    }

    pub fn fees(&self) -> FeeSchedule {
        FeeSchedule {
            airline_registration_fee: self.config.airline_registration_fee,
            oracle_registration_fee: self.config.oracle_registration_fee,
            insurance_premium_cap: self.config.insurance_premium_cap,
            payout_multiplier: self.config.payout_multiplier,
        }
    }

    /// Hash over every piece of business state, used to compare replays.
    pub fn state_digest(&self) -> Result<String> {
        let state = StateView {
            switch: &self.switch,
            airlines: self.airlines.all().collect(),
            flights: self.flights.all().collect(),
            policies: self.flights.policies().collect(),
            oracles: self.oracles.oracles.all().collect(),
            requests: self.oracles.pool.all().collect(),
            escrow: self.escrow.snapshot(),
        };
        Ok(digest(serde_json::to_string(&state)?.as_bytes()))
    }
}

#[derive(Serialize)]
struct StateView<'a> {
    switch: &'a OperationalSwitch,
    airlines: Vec<&'a Airline>,
    flights: Vec<&'a Flight>,
    policies: Vec<&'a InsurancePolicy>,
    oracles: Vec<&'a Oracle>,
    requests: Vec<&'a StatusRequest>,
    escrow: EscrowSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_common::{error::ErrorKind, utils::UNIT};

    fn app() -> FlightSurety {
        let mut app = FlightSurety::new(SuretyConfig::default()).unwrap();
        let first = app.config().first_airline.clone();
        app.fund(10 * UNIT, &first).unwrap();
        let module = app.config().app_module.clone();
        app.authorize_caller(&module, &first).unwrap();
        app.drain_events();
        app
    }

    #[test]
    fn test_genesis_airline_is_registered() {
        let app = FlightSurety::new(SuretyConfig::default()).unwrap();
        assert_eq!(app.airline_status(&"0xairline0".into()), AirlineStatus::Registered);
        assert!(app.is_operational());
        assert_eq!(app.active_airline_count(), 0);
    }

    #[test]
    fn test_privileged_ops_need_bound_module() {
        let mut app = FlightSurety::new(SuretyConfig::default()).unwrap();
        let first = AccountId::from("0xairline0");
        app.fund(10 * UNIT, &first).unwrap();

        let err = app.register_airline(&"0xairline1".into(), &first).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = app.authorize_caller(&"flight-surety-app".into(), &"0xnobody".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        app.authorize_caller(&"flight-surety-app".into(), &first).unwrap();
        assert!(app.register_airline(&"0xairline1".into(), &first).is_ok());
    }

    #[test]
    fn test_failed_call_queues_no_event() {
        let mut app = app();
        assert!(app.fund(10 * UNIT, &"0xairline0".into()).is_err());
        assert!(app.drain_events().is_empty());
    }

    #[test]
    fn test_purchase_reserves_payout() {
        let mut app = app();
        let first = AccountId::from("0xairline0");
        app.register_flight("ND1309", 1, &first).unwrap();
        app.buy_insurance(&first, "ND1309", 1, UNIT / 5, &"pax".into()).unwrap();

        let snap = app.escrow_snapshot();
        assert_eq!(snap.balance(EscrowPool::Premiums), UNIT / 5);
        assert_eq!(snap.balance(EscrowPool::PayoutReserve), UNIT / 10);
        assert_eq!(snap.balance(EscrowPool::AirlineBonds), 10 * UNIT - UNIT / 10);
        assert!(snap.is_balanced());
    }

    #[test]
    fn test_oracle_fee_goes_to_reserve() {
        let mut app = app();
        let idx = app.register_oracle(UNIT, &"oracle".into()).unwrap();
        assert_eq!(app.indexes_of(&"oracle".into()).unwrap(), idx);
        assert_eq!(app.escrow_snapshot().balance(EscrowPool::PayoutReserve), UNIT);

        let err = app.register_oracle(UNIT, &"oracle".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(app.escrow_snapshot().balance(EscrowPool::PayoutReserve), UNIT);
    }

    #[test]
    fn test_fetch_requires_registered_flight() {
        let mut app = app();
        let err = app
            .fetch_flight_status(&"0xairline0".into(), "XX1", 1, &"pax".into())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn test_admin_override() {
        let mut app = app();
        let first = AccountId::from("0xairline0");
        let err = app
            .override_airline_status(&first, AirlineStatus::Registered, &first)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let prev = app
            .override_airline_status(&first, AirlineStatus::Registered, &"0xadmin".into())
            .unwrap();
        assert_eq!(prev, AirlineStatus::Active);
        assert_eq!(app.active_airline_count(), 0);
    }

    #[test]
    fn test_response_on_written_flight_leaves_request_open() {
        let mut app = app();
        let first = AccountId::from("0xairline0");
        let key = app.register_flight("ND1309", 1, &first).unwrap();
        let ticket = app.fetch_flight_status(&first, "ND1309", 1, &"pax".into()).unwrap();

        let mut seed = 0;
        let oracle = loop {
            let id = AccountId::from(format!("oracle{}", seed));
            app.set_seed(seed);
            if app.register_oracle(UNIT, &id).unwrap().contains(&ticket.index) {
                break id;
            }
            seed += 1;
        };

        app.flights.write_status(&key, FlightStatus::OnTime).unwrap();
        let err = app
            .submit_response(&first, "ND1309", 1, FlightStatus::LateAirline, &oracle)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);

        let request = app.request(ticket.request_id).unwrap();
        assert!(request.is_open());
        assert_eq!(request.tally.total(), 0);
    }
}
