use sqlx::Row;
use uuid::Uuid;

use store::sqlite_store::{SqliteConnector, SqliteStore, StoreAddress};
use store::{RecordShape, StoreConnector, StoreError, TargetStore, field_name};

/// Isolated shared-cache in-memory database per test.
/// A unique name keeps parallel tests from seeing each other's tables.
fn memory_connector() -> SqliteConnector {
    let db_name = format!("db_{}", Uuid::new_v4().simple());
    SqliteConnector::new(StoreAddress::Memory, db_name, "test_coll").expect("valid names")
}

async fn fresh_store(connector: &SqliteConnector) -> anyhow::Result<SqliteStore> {
    let store = connector.open().await?;
    store.reset_collection().await?;
    Ok(store)
}

async fn index_names(store: &SqliteStore) -> anyhow::Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'test_coll' ORDER BY name",
    )
    .fetch_all(store.pool())
    .await?;

    Ok(rows.iter().map(|r| r.get::<String, _>("name")).collect())
}

#[tokio::test]
async fn insert_one_stores_the_record_as_json() -> anyhow::Result<()> {
    let connector = memory_connector();
    let store = fresh_store(&connector).await?;

    let record = RecordShape::new(3).build(99);
    store.insert_one(&record).await?;

    assert_eq!(store.count().await?, 1);

    let doc: String = sqlx::query_scalar("SELECT doc FROM test_coll")
        .fetch_one(store.pool())
        .await?;
    let parsed: serde_json::Value = serde_json::from_str(&doc)?;
    assert_eq!(parsed["field_0"], 99);
    assert_eq!(parsed["field_2"], 99);

    Ok(())
}

#[tokio::test]
async fn reset_collection_discards_previous_documents_and_indexes() -> anyhow::Result<()> {
    let connector = memory_connector();
    let store = fresh_store(&connector).await?;

    let shape = RecordShape::new(1);
    for v in 0..5 {
        store.insert_one(&shape.build(v)).await?;
    }
    store.create_index(&field_name(0)).await?;
    assert_eq!(store.count().await?, 5);
    assert_eq!(index_names(&store).await?.len(), 1);

    store.reset_collection().await?;

    assert_eq!(store.count().await?, 0);
    assert!(index_names(&store).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn index_on_absent_field_is_accepted() -> anyhow::Result<()> {
    let connector = memory_connector();
    let store = fresh_store(&connector).await?;

    // Records only carry field_0 and field_1.
    store.insert_one(&RecordShape::new(2).build(1)).await?;

    for i in 0..4 {
        store.create_index(&field_name(i)).await?;
    }

    assert_eq!(
        index_names(&store).await?,
        vec![
            "idx_test_coll_field_0",
            "idx_test_coll_field_1",
            "idx_test_coll_field_2",
            "idx_test_coll_field_3",
        ]
    );

    // Inserts keep working with the extra indexes in place.
    store.insert_one(&RecordShape::new(2).build(2)).await?;
    assert_eq!(store.count().await?, 2);

    Ok(())
}

#[tokio::test]
async fn independent_connections_see_the_same_collection() -> anyhow::Result<()> {
    let connector = memory_connector();
    let setup = fresh_store(&connector).await?;

    let a = connector.connect().await?;
    let b = connector.connect().await?;

    let shape = RecordShape::new(2);
    a.insert_one(&shape.build(1)).await?;
    b.insert_one(&shape.build(2)).await?;

    assert_eq!(setup.count().await?, 2);

    Ok(())
}

#[tokio::test]
async fn insert_without_collection_is_an_insert_error() -> anyhow::Result<()> {
    let connector = memory_connector();
    let store = connector.open().await?;

    let err = store
        .insert_one(&RecordShape::new(1).build(1))
        .await
        .expect_err("table does not exist yet");

    assert!(matches!(err, StoreError::Insert(_)));

    Ok(())
}

#[tokio::test]
async fn create_index_rejects_unsafe_field_names() -> anyhow::Result<()> {
    let connector = memory_connector();
    let store = fresh_store(&connector).await?;

    let err = store.create_index("x') --").await.expect_err("must reject");
    assert!(matches!(err, StoreError::InvalidIdentifier(_)));

    Ok(())
}

#[tokio::test]
async fn directory_store_creates_database_file() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("ingest_bench_{}", Uuid::new_v4().simple()));
    std::fs::create_dir_all(&dir)?;

    let connector = SqliteConnector::new(StoreAddress::Directory(dir.clone()), "bench", "coll")?;
    let store = connector.open().await?;
    store.reset_collection().await?;
    store.insert_one(&RecordShape::new(4).build(7)).await?;

    assert!(dir.join("bench.db").exists());
    assert_eq!(store.count().await?, 1);

    drop(store);
    let _ = std::fs::remove_dir_all(&dir);

    Ok(())
}
