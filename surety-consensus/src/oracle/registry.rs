use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use surety_common::{
    crypto::pseudo_random_index,
    error::{Result, SuretyError},
    utils::{format_units, AccountId, Amount},
};

/// A registered oracle worker and the three indexes it may answer for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    pub id: AccountId,
    pub indexes: [u8; 3],
}

impl Oracle {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Registered oracles and their index assignment.
#[derive(Debug, Clone)]
pub struct OracleRegistry {
    oracles: BTreeMap<AccountId, Oracle>,
    fee: Amount,
    range: u8,
    nonce: u64,
}

impl OracleRegistry {
    pub fn new(fee: Amount, range: u8) -> Self {
        Self {
            oracles: BTreeMap::new(),
            fee,
            range,
            nonce: 0,
        }
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn range(&self) -> u8 {
        self.range
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    pub fn get(&self, id: &AccountId) -> Option<&Oracle> {
        self.oracles.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Oracle> {
        self.oracles.values()
    }

    /// Registered oracle or AuthorizationError.
    pub fn require(&self, id: &AccountId) -> Result<&Oracle> {
        self.oracles
            .get(id)
            .ok_or_else(|| SuretyError::Authorization(format!("{} is not a registered oracle", id)))
    }

    pub fn check_fee(&self, amount: Amount) -> Result<()> {
        if amount != self.fee {
            return Err(SuretyError::Resource(format!(
                "Oracle registration fee must be exactly {}, got {}",
                format_units(self.fee),
                format_units(amount)
            )));
        }
        Ok(())
    }

    /// Registers `caller` and assigns three distinct indexes derived from the caller,
    /// the running nonce and `seed`.
    pub fn register(&mut self, caller: &AccountId, seed: &[u8]) -> Result<[u8; 3]> {
        if self.oracles.contains_key(caller) {
            return Err(SuretyError::State(format!("Oracle {} is already registered", caller)));
        }

        let indexes = self.generate_indexes(caller, seed);
        self.oracles.insert(
            caller.clone(),
            Oracle {
                id: caller.clone(),
                indexes,
            },
        );
        info!("🔮 Oracle {} registered with indexes {:?}", caller, indexes);
        Ok(indexes)
    }

    fn generate_indexes(&mut self, caller: &AccountId, seed: &[u8]) -> [u8; 3] {
        let first = self.next_index(caller, seed);

        let mut second = self.next_index(caller, seed);
        while second == first {
            second = self.next_index(caller, seed);
        }

        let mut third = self.next_index(caller, seed);
        while third == first || third == second {
            third = self.next_index(caller, seed);
        }

        [first, second, third]
    }

    fn next_index(&mut self, caller: &AccountId, seed: &[u8]) -> u8 {
        let index = pseudo_random_index(caller, self.nonce, seed, self.range);
        self.nonce = self.nonce.wrapping_add(1);
        index
    }
}
