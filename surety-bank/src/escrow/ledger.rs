use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use surety_common::{
    error::{Result, SuretyError},
    utils::{format_units, AccountId, Amount},
};

use super::pools::EscrowPool;

/// One leg of an escrow entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    /// Funds enter custody into `pool`.
    Deposit { pool: EscrowPool, amount: Amount },
    /// Funds leave `pool` without a named recipient.
    Debit { pool: EscrowPool, amount: Amount },
    /// Funds move between pools; total custody is unchanged.
    Transfer { from: EscrowPool, to: EscrowPool, amount: Amount },
    /// Funds leave `pool` to an external recipient.
    Withdraw { pool: EscrowPool, recipient: AccountId, amount: Amount },
}

/// Applied entry, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowEntry {
    pub entry_id: u64,
    pub memo: String,
    pub movements: Vec<Movement>,
}

/// Read-only view of the ledger balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowSnapshot {
    pub balances: BTreeMap<EscrowPool, Amount>,
    pub total_held: Amount,
    pub total_deposited: Amount,
    pub total_withdrawn: Amount,
}

impl EscrowSnapshot {
    /// Sum of all pools equals the funds in custody.
    pub fn is_balanced(&self) -> bool {
        let sum: Amount = self.balances.values().sum();
        sum == self.total_held && self.total_deposited - self.total_withdrawn == self.total_held
    }

    pub fn balance(&self, pool: EscrowPool) -> Amount {
        self.balances.get(&pool).copied().unwrap_or(0)
    }
}

/// Custody of funds in named pools.
///
/// Every mutation is an entry of one or more movements. An entry is validated as a
/// whole before any balance changes, so a rejected entry leaves the ledger untouched.
/// The ledger enforces non-negative balances only; business preconditions
/// (claim eligibility, fee amounts) are checked by the caller.
#[derive(Debug, Clone, Default)]
pub struct EscrowLedger {
    balances: BTreeMap<EscrowPool, Amount>,
    total_held: Amount,
    total_deposited: Amount,
    total_withdrawn: Amount,
    paid_out: HashMap<AccountId, Amount>,
    entries: Vec<EscrowEntry>,
}

impl EscrowLedger {
    pub fn new() -> Self {
        let balances = EscrowPool::ALL.iter().map(|p| (*p, 0)).collect();
        Self {
            balances,
            ..Default::default()
        }
    }

    pub fn balance(&self, pool: EscrowPool) -> Amount {
        self.balances.get(&pool).copied().unwrap_or(0)
    }

    pub fn total_held(&self) -> Amount {
        self.total_held
    }

    /// Total amount withdrawn to `recipient` so far.
    pub fn paid_to(&self, recipient: &AccountId) -> Amount {
        self.paid_out.get(recipient).copied().unwrap_or(0)
    }

    pub fn entries(&self) -> &[EscrowEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> EscrowSnapshot {
        EscrowSnapshot {
            balances: self.balances.clone(),
            total_held: self.total_held,
            total_deposited: self.total_deposited,
            total_withdrawn: self.total_withdrawn,
        }
    }

    pub fn check_invariant(&self) -> bool {
        self.snapshot().is_balanced()
    }

    pub fn credit(&mut self, pool: EscrowPool, amount: Amount, memo: &str) -> Result<u64> {
        self.apply(memo, vec![Movement::Deposit { pool, amount }])
    }

    pub fn debit(&mut self, pool: EscrowPool, amount: Amount, memo: &str) -> Result<u64> {
        self.apply(memo, vec![Movement::Debit { pool, amount }])
    }

    pub fn transfer(&mut self, from: EscrowPool, to: EscrowPool, amount: Amount, memo: &str) -> Result<u64> {
        self.apply(memo, vec![Movement::Transfer { from, to, amount }])
    }

    pub fn withdraw(&mut self, pool: EscrowPool, recipient: &AccountId, amount: Amount, memo: &str) -> Result<u64> {
        self.apply(
            memo,
            vec![Movement::Withdraw {
                pool,
                recipient: recipient.clone(),
                amount,
            }],
        )
    }

    /// Validates and applies all movements atomically.
    pub fn apply(&mut self, memo: &str, movements: Vec<Movement>) -> Result<u64> {
        // 1. Net effect per pool
        let mut deltas: BTreeMap<EscrowPool, i128> = BTreeMap::new();
        let mut inflow: Amount = 0;
        let mut outflow: Amount = 0;

        for m in &movements {
            match m {
                Movement::Deposit { pool, amount } => {
                    *deltas.entry(*pool).or_default() += to_signed(*amount)?;
                    inflow = checked_add(inflow, *amount)?;
                }
                Movement::Debit { pool, amount } | Movement::Withdraw { pool, amount, .. } => {
                    *deltas.entry(*pool).or_default() -= to_signed(*amount)?;
                    outflow = checked_add(outflow, *amount)?;
                }
                Movement::Transfer { from, to, amount } => {
                    let a = to_signed(*amount)?;
                    *deltas.entry(*from).or_default() -= a;
                    *deltas.entry(*to).or_default() += a;
                }
            }
        }

        // 2. No pool may go negative
        for (pool, delta) in &deltas {
            let current = self.balance(*pool) as i128;
            if current + delta < 0 {
                return Err(SuretyError::Resource(format!(
                    "Insufficient funds in pool {}: has {}, needs {}",
                    pool,
                    format_units(self.balance(*pool)),
                    format_units((-delta) as Amount)
                )));
            }
        }

        // 3. Apply
        for (pool, delta) in deltas {
            let balance = self.balances.entry(pool).or_insert(0);
            *balance = (*balance as i128 + delta) as Amount;
        }
        self.total_held = self.total_held + inflow - outflow;
        self.total_deposited += inflow;
        self.total_withdrawn += outflow;

        for m in &movements {
            if let Movement::Withdraw { recipient, amount, .. } = m {
                *self.paid_out.entry(recipient.clone()).or_insert(0) += amount;
            }
        }

        let entry_id = self.entries.len() as u64 + 1;
        debug!("🏦 Escrow entry #{} ({}) applied: {:?}", entry_id, memo, movements);
        self.entries.push(EscrowEntry {
            entry_id,
            memo: memo.to_string(),
            movements,
        });

        Ok(entry_id)
    }
}

fn to_signed(amount: Amount) -> Result<i128> {
    i128::try_from(amount).map_err(|_| SuretyError::Resource(format!("Amount too large: {}", amount)))
}

fn checked_add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b)
        .ok_or_else(|| SuretyError::Resource("Amount overflow".to_string()))
}
