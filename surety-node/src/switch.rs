//! Operational Switch: the global pause flag and the privileged-caller binding.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use surety_bank::ActiveAirline;
use surety_common::{
    error::{Result, SuretyError},
    utils::AccountId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalSwitch {
    admin: AccountId,
    operational: bool,
    /// Module identities bound through `authorize_caller`.
    authorized: BTreeSet<AccountId>,
    /// Module that must be bound before the privileged operations open up.
    app_module: AccountId,
}

impl OperationalSwitch {
    pub fn new(admin: AccountId, app_module: AccountId) -> Self {
        Self {
            admin,
            operational: true,
            authorized: BTreeSet::new(),
            app_module,
        }
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn admin(&self) -> &AccountId {
        &self.admin
    }

    pub fn is_authorized(&self, module: &AccountId) -> bool {
        self.authorized.contains(module)
    }

    /// First precondition of every mutating operation.
    pub fn require_operational(&self) -> Result<()> {
        if !self.operational {
            return Err(SuretyError::Availability("Contract is currently not operational".into()));
        }
        Ok(())
    }

    pub fn require_admin(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.admin {
            return Err(SuretyError::Authorization(format!("{} is not the admin", caller)));
        }
        Ok(())
    }

    /// The privileged module must be bound before registrations, purchases, claims and
    /// oracle traffic are accepted.
    pub fn require_app_module(&self) -> Result<()> {
        if !self.authorized.contains(&self.app_module) {
            return Err(SuretyError::Authorization(format!(
                "Caller module {} is not authorized",
                self.app_module
            )));
        }
        Ok(())
    }

    /// Admin only, never gated by the flag itself. A redundant toggle is rejected.
    pub fn set_operating_status(&mut self, operational: bool, caller: &AccountId) -> Result<()> {
        self.require_admin(caller)?;
        if operational == self.operational {
            return Err(SuretyError::State(format!(
                "Operational status is already {}",
                operational
            )));
        }
        self.operational = operational;
        if operational {
            info!("🟢 Operations resumed by {}", caller);
        } else {
            warn!("🔴 Operations paused by {}", caller);
        }
        Ok(())
    }

    /// Binds `module`. Returns false if it was already bound.
    pub fn authorize(&mut self, module: &AccountId, by: &ActiveAirline) -> bool {
        let added = self.authorized.insert(module.clone());
        if added {
            info!("🔑 Module {} authorized by {}", module, by.id());
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_common::error::ErrorKind;

    fn switch() -> OperationalSwitch {
        OperationalSwitch::new("admin".into(), "app".into())
    }

    #[test]
    fn test_only_admin_toggles() {
        let mut s = switch();
        let err = s.set_operating_status(false, &"mallory".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(s.is_operational());

        s.set_operating_status(false, &"admin".into()).unwrap();
        assert!(!s.is_operational());
        assert_eq!(s.require_operational().unwrap_err().kind(), ErrorKind::Availability);
    }

    #[test]
    fn test_redundant_toggle_rejected() {
        let mut s = switch();
        let err = s.set_operating_status(true, &"admin".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn test_app_module_unbound_by_default() {
        let s = switch();
        assert_eq!(s.require_app_module().unwrap_err().kind(), ErrorKind::Authorization);
        assert!(!s.is_authorized(&"app".into()));
    }
}
