//! Compensation when a write sequence fails part way

use dex_core::prelude::*;
use dex_core::Reconciler;
use dex_store::DocumentStore;
use dex_test_utils::{
    eevee, ember, faulty_service, new_ability, pikachu, tackle, thunder_shock,
};

#[tokio::test]
async fn failed_creature_insert_removes_new_abilities() {
    let (service, store) = faulty_service(ServiceConfig::new());
    store.fail_creature_writes(true);

    let err = service.create(eevee()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Store(_)));
    assert_eq!(store.ability_count().await.unwrap(), 0);
    assert!(store.list_creatures().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_creature_update_removes_only_new_abilities() {
    let (service, store) = faulty_service(ServiceConfig::new());
    let created = service.create(eevee()).await.unwrap();

    store.fail_creature_writes(true);
    let err = service
        .update(created.id, CreaturePatch::abilities(vec![tackle(), ember()]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Store(_)));

    // Tackle was reused and must survive; Ember was created and rolled back
    assert_eq!(store.ability_count().await.unwrap(), 1);
    store.heal();
    assert_eq!(service.get_by_identity(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn failed_ability_insert_unwinds_earlier_ones() {
    let config = ServiceConfig::new().with_create_abilities(CreateAbilities::Reconcile);
    let (service, store) = faulty_service(config);
    store.fail_ability_inserts_after(1);

    let err = service
        .create(
            NewCreature::new("Pikachu", "http://img/pikachu.png")
                .with_ability(thunder_shock())
                .with_ability(tackle()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Store(_)));
    assert_eq!(store.ability_count().await.unwrap(), 0);
}

#[tokio::test]
async fn insert_mode_unwinds_too() {
    let (service, store) = faulty_service(ServiceConfig::new());
    store.fail_ability_inserts_after(2);

    let creature = NewCreature::new("Charizard", "http://img/charizard.png")
        .with_ability(ember())
        .with_ability(tackle())
        .with_ability(thunder_shock());
    assert!(service.create(creature).await.is_err());
    assert_eq!(store.ability_count().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_delete_keeps_creature() {
    let (service, store) = faulty_service(ServiceConfig::new());
    let created = service.create(eevee()).await.unwrap();

    store.fail_creature_writes(true);
    assert!(service.delete(created.id).await.is_err());

    store.heal();
    assert_eq!(service.get_by_name("Eevee").await.unwrap().id, created.id);
}

#[tokio::test]
async fn rollback_keeps_ability_adopted_by_concurrent_update() {
    let (service, store) = faulty_service(ServiceConfig::new());
    let pikachu = service.create(pikachu()).await.unwrap();

    // A create has inserted Swift but not yet written its creature
    let reconciler = Reconciler::new(&*store, AbilityMatch::Exact);
    let pending = reconciler
        .insert_all(vec![new_ability("Swift", "Normal", 60)])
        .await
        .unwrap();

    // Meanwhile an update matches and reuses that record
    let updated = service
        .update(
            pikachu.id,
            CreaturePatch::abilities(vec![AbilityDescriptor::new("Swift", "Normal", 60)]),
        )
        .await
        .unwrap();
    assert_eq!(updated.abilities[0].id, pending.ids[0]);

    // The create fails and unwinds
    reconciler.rollback(&pending.created).await;

    let view = service.get_by_identity(pikachu.id).await.unwrap();
    assert_eq!(view.abilities.len(), 1);
    assert_eq!(view.abilities[0].name, "Swift");
    assert!(service.get_ability(pending.ids[0]).await.is_ok());
}
