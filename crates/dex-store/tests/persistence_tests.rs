//! Snapshot persistence across store instances

use dex_model::{AbilityMatch, CreatureChanges, CreatureRecord, Identity, NewAbility};
use dex_store::{DocumentStore, IdentitySource, MemoryStore};
use tempfile::TempDir;

fn thunder_shock() -> NewAbility {
    NewAbility {
        name: "Thunder Shock".into(),
        kind: "Electric".into(),
        damage: 40,
        status: "Active".into(),
    }
}

#[tokio::test]
async fn reopen_restores_documents() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.json");

    let ability_id = {
        let store = MemoryStore::open(&path).await.expect("Open should succeed");
        let ability = store.insert_ability(thunder_shock()).await.unwrap();
        store
            .insert_creature(
                CreatureRecord {
                    name: "Pikachu".into(),
                    image: "http://x/p.png".into(),
                    status: "Active".into(),
                    abilities: vec![ability.id],
                },
                IdentitySource::ArbitratedMax,
            )
            .await
            .unwrap();
        ability.id
    };

    assert!(path.exists());

    let reopened = MemoryStore::open(&path).await.expect("Reopen should succeed");
    let pikachu = reopened
        .find_creature_by_name("PIKACHU")
        .await
        .unwrap()
        .expect("creature should survive reopen");
    assert_eq!(pikachu.id, Identity(1));
    assert_eq!(pikachu.abilities, vec![ability_id]);

    let found = reopened
        .find_ability("Thunder Shock", "Electric", AbilityMatch::Exact)
        .await
        .unwrap();
    assert_eq!(found.map(|a| a.id), Some(ability_id));
}

#[tokio::test]
async fn sequence_survives_reopen() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.json");

    {
        let store = MemoryStore::open(&path).await.unwrap();
        for name in ["Eevee", "Jolteon"] {
            store
                .insert_creature(
                    CreatureRecord {
                        name: name.into(),
                        image: "http://x/e.png".into(),
                        status: "Active".into(),
                        abilities: vec![],
                    },
                    IdentitySource::Sequence,
                )
                .await
                .unwrap();
        }
        store.delete_creature(Identity(2)).await.unwrap();
    }

    let store = MemoryStore::open(&path).await.unwrap();
    let next = store
        .insert_creature(
            CreatureRecord {
                name: "Flareon".into(),
                image: "http://x/f.png".into(),
                status: "Active".into(),
                abilities: vec![],
            },
            IdentitySource::Sequence,
        )
        .await
        .unwrap();
    assert_eq!(next.id, Identity(3));
}

#[tokio::test]
async fn updates_are_persisted() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.json");

    {
        let store = MemoryStore::open(&path).await.unwrap();
        let eevee = store
            .insert_creature(
                CreatureRecord {
                    name: "Eevee".into(),
                    image: "http://x/e.png".into(),
                    status: "Active".into(),
                    abilities: vec![],
                },
                IdentitySource::ArbitratedMax,
            )
            .await
            .unwrap();
        store
            .update_creature(
                eevee.id,
                CreatureChanges {
                    status: Some("Retired".into()),
                    ..CreatureChanges::default()
                },
            )
            .await
            .unwrap();
    }

    let store = MemoryStore::open(&path).await.unwrap();
    let eevee = store.get_creature(Identity(1)).await.unwrap().unwrap();
    assert_eq!(eevee.status, "Retired");
    assert!(eevee.updated_at >= eevee.created_at);
}

#[tokio::test]
async fn memory_only_store_has_no_snapshot() {
    let store = MemoryStore::new();
    assert!(store.snapshot_path().is_none());
    store.insert_ability(thunder_shock()).await.unwrap();
    assert_eq!(store.ability_count().await.unwrap(), 1);
}
