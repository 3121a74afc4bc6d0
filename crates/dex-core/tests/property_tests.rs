//! Identity and reconciliation properties

use dex_core::prelude::*;
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
        .block_on(future)
}

fn policy() -> impl Strategy<Value = IdentityPolicy> {
    prop_oneof![
        Just(IdentityPolicy::Arbitrated),
        Just(IdentityPolicy::Sequence),
        Just(IdentityPolicy::MaxScan),
    ]
}

fn descriptor() -> impl Strategy<Value = AbilityDescriptor> {
    (
        prop_oneof![Just("Tackle"), Just("Ember"), Just("Bite"), Just("Surf")],
        prop_oneof![Just("Normal"), Just("Fire"), Just("Dark"), Just("Water")],
        1i64..200,
    )
        .prop_map(|(name, kind, damage)| AbilityDescriptor::new(name, kind, damage))
}

proptest! {
    #[test]
    fn prop_identity_is_max_plus_one(policy in policy(), count in 1usize..12) {
        block_on(async {
            let service =
                RecordService::in_memory(ServiceConfig::new().with_identity_policy(policy));
            for i in 0..count {
                let before = service.store().max_identity().await.unwrap();
                let created = service
                    .create(NewCreature::new(format!("Porygon {i}"), "http://img/p.png"))
                    .await
                    .unwrap();
                assert_eq!(created.id, Identity::after(before));
            }
        });
    }

    #[test]
    fn prop_reconcile_is_idempotent(descriptors in proptest::collection::vec(descriptor(), 0..8)) {
        block_on(async {
            let service = RecordService::in_memory(ServiceConfig::new());
            let created = service
                .create(NewCreature::new("Ditto", "http://img/ditto.png"))
                .await
                .unwrap();

            let first = service
                .update(created.id, CreaturePatch::abilities(descriptors.clone()))
                .await
                .unwrap();
            let count = service.store().ability_count().await.unwrap();

            let second = service
                .update(created.id, CreaturePatch::abilities(descriptors.clone()))
                .await
                .unwrap();

            assert_eq!(first.ability_ids(), second.ability_ids());
            assert_eq!(service.store().ability_count().await.unwrap(), count);

            let distinct: std::collections::HashSet<_> =
                descriptors.iter().map(|d| (d.name.clone(), d.kind.clone())).collect();
            assert_eq!(count, distinct.len());
        });
    }
}
