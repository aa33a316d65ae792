#[cfg(test)]
mod tests {
    use crate::escrow::{EscrowLedger, EscrowPool};
    use crate::membership::{Admission, AdmissionPolicy, AirlineRegistry};
    use surety_common::{
        airline::AirlineStatus,
        error::ErrorKind,
        utils::{AccountId, UNIT},
    };

    /// `n` ACTIVE airlines `a0..a{n-1}`, each admitted by as many earlier members as
    /// the quorum asks for.
    fn registry_with_active(n: usize) -> AirlineRegistry {
        let policy = AdmissionPolicy {
            bootstrap_threshold: 4,
            registration_fee: 10 * UNIT,
        };
        let mut registry = AirlineRegistry::with_genesis(policy, "a0".into());
        let token = registry.require_fundable(&"a0".into()).unwrap();
        registry.activate(token);

        for i in 1..n {
            let id = AccountId::from(format!("a{}", i));
            for v in 0..i {
                let voter = registry.require_active(&format!("a{}", v).into()).unwrap();
                if let Admission::Registered { .. } = registry.register(&id, &voter).unwrap() {
                    break;
                }
            }
            let token = registry.require_fundable(&id).unwrap();
            registry.activate(token);
        }
        assert_eq!(registry.active_count(), n);
        registry
    }

    #[test]
    fn test_bootstrap_admission_needs_no_votes() {
        for active in 1..=3 {
            let mut registry = registry_with_active(active);
            let voter = registry.require_active(&"a0".into()).unwrap();
            let res = registry.register(&"candidate".into(), &voter).unwrap();
            assert_eq!(res, Admission::Registered { votes: 0 });
            assert_eq!(registry.status(&"candidate".into()), AirlineStatus::Registered);
            assert!(registry.get(&"candidate".into()).unwrap().votes.is_empty());
        }
    }

    #[test]
    fn test_quorum_with_four_active() {
        let mut registry = registry_with_active(4);
        assert_eq!(registry.required_votes(), 2);

        let a1 = registry.require_active(&"a1".into()).unwrap();
        let a2 = registry.require_active(&"a2".into()).unwrap();

        let first = registry.register(&"a4".into(), &a1).unwrap();
        assert_eq!(first, Admission::Pending { votes: 1, required: 2 });
        assert_eq!(registry.status(&"a4".into()), AirlineStatus::Pending);

        // Same voter again: still one vote.
        let again = registry.register(&"a4".into(), &a1).unwrap();
        assert_eq!(again, Admission::Pending { votes: 1, required: 2 });

        let second = registry.register(&"a4".into(), &a2).unwrap();
        assert_eq!(second, Admission::Registered { votes: 2 });
        assert_eq!(registry.status(&"a4".into()), AirlineStatus::Registered);
    }

    #[test]
    fn test_quorum_with_five_active_needs_three() {
        let mut registry = registry_with_active(5);
        assert_eq!(registry.required_votes(), 3);
        assert_eq!(registry.get(&"a4".into()).unwrap().votes.len(), 2);

        for (i, voter) in ["a0", "a1"].iter().enumerate() {
            let token = registry.require_active(&(*voter).into()).unwrap();
            assert_eq!(
                registry.register(&"new".into(), &token).unwrap(),
                Admission::Pending { votes: i + 1, required: 3 }
            );
        }
        let token = registry.require_active(&"a4".into()).unwrap();
        assert_eq!(
            registry.register(&"new".into(), &token).unwrap(),
            Admission::Registered { votes: 3 }
        );
    }

    #[test]
    fn test_pending_airline_cannot_vote() {
        let mut registry = registry_with_active(4);
        let a1 = registry.require_active(&"a1".into()).unwrap();
        registry.register(&"a4".into(), &a1).unwrap();

        let err = registry.require_active(&"a4".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_bond_flow_into_escrow() {
        let mut registry = registry_with_active(1);
        let mut escrow = EscrowLedger::new();

        let voter = registry.require_active(&"a0".into()).unwrap();
        registry.register(&"a1".into(), &voter).unwrap();

        let fee = registry.policy().registration_fee;
        let token = registry.require_fundable(&"a1".into()).unwrap();
        registry.check_fee(fee).unwrap();
        escrow.credit(EscrowPool::AirlineBonds, fee, "bond a1").unwrap();
        registry.activate(token);

        assert_eq!(registry.status(&"a1".into()), AirlineStatus::Active);
        assert_eq!(escrow.balance(EscrowPool::AirlineBonds), fee);
        assert!(escrow.check_invariant());
    }
}
