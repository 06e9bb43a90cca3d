//! SQLite-backed target store.
//!
//! A collection is a table of JSON documents:
//!
//! ```text
//! CREATE TABLE <collection> (id INTEGER PRIMARY KEY AUTOINCREMENT, doc TEXT NOT NULL)
//! ```
//!
//! Field indexes are expression indexes over `json_extract(doc, '$.<field>')`,
//! so indexing a field that no record carries is legal and simply produces an
//! index of NULLs.
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::{Record, StoreConnector, StoreError, StoreResult, TargetStore};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Address of the SQLite storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreAddress {
    /// Shared-cache in-memory database, alive while at least one connection is open.
    Memory,
    /// Directory holding one `<database>.db` file per database.
    Directory(PathBuf),
}

impl StoreAddress {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("memory") {
            Self::Memory
        } else {
            Self::Directory(PathBuf::from(raw))
        }
    }
}

/// Opens single-connection pools to one collection.
#[derive(Clone, Debug)]
pub struct SqliteConnector {
    address: StoreAddress,
    database: String,
    collection: String,
}

impl SqliteConnector {
    pub fn new(
        address: StoreAddress,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> StoreResult<Self> {
        let database = validate_identifier(database.into())?;
        let collection = validate_identifier(collection.into())?;

        Ok(Self {
            address,
            database,
            collection,
        })
    }

    fn connect_options(&self) -> StoreResult<SqliteConnectOptions> {
        let options = match &self.address {
            StoreAddress::Memory => {
                let url = format!("sqlite:file:{}?mode=memory&cache=shared", self.database);
                SqliteConnectOptions::from_str(&url).map_err(|source| StoreError::Connect {
                    address: self.describe(),
                    source,
                })?
            }
            StoreAddress::Directory(dir) => SqliteConnectOptions::new()
                .filename(dir.join(format!("{}.db", self.database)))
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
        };

        Ok(options.busy_timeout(BUSY_TIMEOUT))
    }

    /// Opens the concrete store; [`StoreConnector::connect`] boxes this.
    pub async fn open(&self) -> StoreResult<SqliteStore> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(self.connect_options()?)
            .await
            .map_err(|source| StoreError::Connect {
                address: self.describe(),
                source,
            })?;

        tracing::debug!(store = %self.describe(), "sqlite connection opened");

        Ok(SqliteStore::from_pool(pool, &self.collection))
    }
}

#[async_trait]
impl StoreConnector for SqliteConnector {
    async fn connect(&self) -> StoreResult<Box<dyn TargetStore>> {
        Ok(Box::new(self.open().await?))
    }

    fn describe(&self) -> String {
        match &self.address {
            StoreAddress::Memory => format!("memory:{}/{}", self.database, self.collection),
            StoreAddress::Directory(dir) => format!(
                "{}/{}.db/{}",
                dir.display(),
                self.database,
                self.collection
            ),
        }
    }
}

/// One connection to a SQLite collection.
pub struct SqliteStore {
    pool: SqlitePool,
    collection: String,
    insert_sql: String,
}

impl SqliteStore {
    /// Wraps an existing pool. `collection` must already be a valid identifier.
    pub fn from_pool(pool: SqlitePool, collection: &str) -> Self {
        Self {
            insert_sql: format!(r#"INSERT INTO "{collection}" (doc) VALUES (?)"#),
            collection: collection.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of documents currently in the collection.
    pub async fn count(&self) -> StoreResult<u64> {
        let sql = format!(r#"SELECT COUNT(*) FROM "{}""#, self.collection);
        let n: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        Ok(n as u64)
    }

    fn index_name(&self, field: &str) -> String {
        format!("idx_{}_{}", self.collection, field)
    }
}

#[async_trait]
impl TargetStore for SqliteStore {
    async fn insert_one(&self, record: &Record) -> StoreResult<()> {
        let doc = record.to_json()?;

        sqlx::query(&self.insert_sql)
            .bind(doc)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Insert)?;

        Ok(())
    }

    async fn create_index(&self, field: &str) -> StoreResult<()> {
        let field = validate_identifier(field.to_string())?;
        let sql = format!(
            r#"CREATE INDEX IF NOT EXISTS "{index}" ON "{collection}" (json_extract(doc, '$.{field}'))"#,
            index = self.index_name(&field),
            collection = self.collection,
        );

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|source| StoreError::Index {
                field: field.clone(),
                source,
            })?;

        tracing::debug!(collection = %self.collection, %field, "index created");
        Ok(())
    }

    async fn reset_collection(&self) -> StoreResult<()> {
        let reset = |source: sqlx::Error| StoreError::Reset {
            collection: self.collection.clone(),
            source,
        };

        sqlx::query(&format!(r#"DROP TABLE IF EXISTS "{}""#, self.collection))
            .execute(&self.pool)
            .await
            .map_err(reset)?;

        sqlx::query(&format!(
            r#"CREATE TABLE "{}" (id INTEGER PRIMARY KEY AUTOINCREMENT, doc TEXT NOT NULL)"#,
            self.collection
        ))
        .execute(&self.pool)
        .await
        .map_err(reset)?;

        tracing::debug!(collection = %self.collection, "collection reset");
        Ok(())
    }
}

fn validate_identifier(name: String) -> StoreResult<String> {
    let valid = !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');

    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name))
    }
}
