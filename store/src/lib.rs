//! Target store boundary for the ingest benchmark.
//!
//! The harness only ever needs three things from a store: insert one record,
//! create an index on a field, and reset the collection before a run. Each
//! caller opens its own connection through a [`StoreConnector`]; connections
//! are never shared between workers.

pub mod error;
pub mod record;
pub mod sqlite_store;

use async_trait::async_trait;

pub use error::{StoreError, StoreResult};
pub use record::{Record, RecordShape, field_name};

/// One open connection to the collection under test.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Submits a single record. No retry or batching.
    async fn insert_one(&self, record: &Record) -> StoreResult<()>;

    /// Creates a secondary index on `field`. The field need not exist in any record.
    async fn create_index(&self, field: &str) -> StoreResult<()>;

    /// Throws away the collection (and its indexes) and recreates it empty.
    async fn reset_collection(&self) -> StoreResult<()>;
}

/// Opens independent connections to the same collection.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> StoreResult<Box<dyn TargetStore>>;

    /// Human-readable location of the store, used in logs.
    fn describe(&self) -> String;
}
