// tests/postgres_repository_tests.rs
//
// Needs a reachable Postgres (TEST_DATABASE_URL / DATABASE_ADMIN_URL).
// Run with `cargo test -- --ignored`.

use chrono::Utc;

use streamwatch_core::{
    models::UpdateEvent,
    repositories::{PartialUpdate, PostgresStreamerRepository, StreamerRepository},
    Error,
};
use streamwatch_core::test_utils::fixtures::record;
use streamwatch_core::test_utils::helpers::setup_test_database;

#[tokio::test]
#[ignore = "requires a Postgres test database"]
async fn test_partial_write_keeps_other_columns() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresStreamerRepository::new(db.pool().clone());

    let mut seeded = record("100", "Pat", false);
    seeded.title = "old".into();
    let inserted = repo.insert_if_absent(&[seeded]).await?;
    assert!(inserted.contains("100"));

    let write = PartialUpdate::from_update(&UpdateEvent::new("100").with_live(true)).stamped(Utc::now());
    repo.update_partial(&write).await?;

    let stored = repo.get("100").await?.expect("row exists");
    assert!(stored.is_live);
    assert_eq!(stored.broadcaster_name, "Pat");
    assert_eq!(stored.title, "old");
    assert!(stored.updated.is_some());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres test database"]
async fn test_batch_get_and_insert_if_absent() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresStreamerRepository::new(db.pool().clone());

    let records: Vec<_> = (0..130).map(|i| record(&i.to_string(), "n", i % 2 == 0)).collect();
    assert_eq!(repo.insert_if_absent(&records).await?.len(), 130);
    assert!(repo.insert_if_absent(&records[..10]).await?.is_empty());

    let mut ids: Vec<String> = (0..130).map(|i| i.to_string()).collect();
    ids.push("missing".into());
    let found = repo.batch_get(&ids).await?;
    assert_eq!(found.len(), 130);

    // empty write is a no-op and creates nothing
    repo.update_partial(&PartialUpdate::from_update(&UpdateEvent::new("ghost"))).await?;
    assert!(repo.get("ghost").await?.is_none());
    Ok(())
}
