use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SuretyError},
    utils::{AccountId, Amount, PayoutMultiplier, UNIT},
};

/// Fixed constants supplied to the core at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuretyConfig {
    /// Designated admin of the operational switch.
    #[serde(default = "default_admin")]
    pub admin: AccountId,
    /// Airline registered at construction (the deployer).
    #[serde(default = "default_first_airline")]
    pub first_airline: AccountId,
    /// Identity of the privileged module bound through `authorize_caller`.
    #[serde(default = "default_app_module")]
    pub app_module: AccountId,

    #[serde(default = "default_airline_fee")]
    pub airline_registration_fee: Amount,
    #[serde(default = "default_oracle_fee")]
    pub oracle_registration_fee: Amount,
    #[serde(default = "default_premium_cap")]
    pub insurance_premium_cap: Amount,
    #[serde(default)]
    pub payout_multiplier: PayoutMultiplier,

    /// Distinct oracle votes that resolve a status request.
    #[serde(default = "default_min_responses")]
    pub min_responses: usize,
    /// Below this many ACTIVE airlines, candidates are admitted without voting.
    #[serde(default = "default_quorum_bootstrap")]
    pub quorum_bootstrap_threshold: usize,
    /// Oracle indexes are drawn from `[0, oracle_index_range)`.
    #[serde(default = "default_index_range")]
    pub oracle_index_range: u8,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_admin() -> AccountId {
    AccountId::from("0xadmin")
}

fn default_first_airline() -> AccountId {
    AccountId::from("0xairline0")
}

fn default_app_module() -> AccountId {
    AccountId::from("flight-surety-app")
}

fn default_airline_fee() -> Amount {
    10 * UNIT
}

fn default_oracle_fee() -> Amount {
    UNIT
}

fn default_premium_cap() -> Amount {
    UNIT
}

fn default_min_responses() -> usize {
    3
}

fn default_quorum_bootstrap() -> usize {
    4
}

fn default_index_range() -> u8 {
    10
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for SuretyConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            first_airline: default_first_airline(),
            app_module: default_app_module(),
            airline_registration_fee: default_airline_fee(),
            oracle_registration_fee: default_oracle_fee(),
            insurance_premium_cap: default_premium_cap(),
            payout_multiplier: PayoutMultiplier::default(),
            min_responses: default_min_responses(),
            quorum_bootstrap_threshold: default_quorum_bootstrap(),
            oracle_index_range: default_index_range(),
            queue_capacity: default_queue_capacity(),
            log_filter: None,
        }
    }
}

impl SuretyConfig {
    pub fn validate(&self) -> Result<()> {
        self.payout_multiplier.validate()?;

        if self.min_responses == 0 {
            return Err(SuretyError::Config("min_responses must be at least 1".into()));
        }
        // three distinct indexes per oracle
        if self.oracle_index_range < 3 {
            return Err(SuretyError::Config(format!(
                "oracle_index_range must be at least 3, got {}",
                self.oracle_index_range
            )));
        }
        if self.airline_registration_fee == 0 || self.oracle_registration_fee == 0 {
            return Err(SuretyError::Config("registration fees must be non-zero".into()));
        }
        if self.insurance_premium_cap == 0 {
            return Err(SuretyError::Config("insurance_premium_cap must be non-zero".into()));
        }
        if self.queue_capacity == 0 {
            return Err(SuretyError::Config("queue_capacity must be non-zero".into()));
        }
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: SuretyConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SuretyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_responses, 3);
        assert_eq!(config.quorum_bootstrap_threshold, 4);
        assert_eq!(config.payout_multiplier, PayoutMultiplier { numerator: 3, denominator: 2 });
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: SuretyConfig = serde_json::from_str(r#"{ "admin": "0xboss" }"#).unwrap();
        assert_eq!(config.admin, AccountId::from("0xboss"));
        assert_eq!(config.airline_registration_fee, 10 * UNIT);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surety.json");

        let mut config = SuretyConfig::default();
        config.min_responses = 5;
        config.save_to_file(&path).unwrap();

        let loaded = SuretyConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "min_responses": 0 }"#).unwrap();

        let err = SuretyConfig::load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
