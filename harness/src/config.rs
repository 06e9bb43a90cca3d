use std::time::Duration;

use serde::Serialize;

use crate::{BenchError, BenchResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BenchConfig {
    // =========================
    // Workload
    // =========================
    /// Number of concurrent workers.
    ///
    /// `total_operations` is divided by this number and each worker performs
    /// that many inserts. Any remainder is not executed.
    pub worker_count: usize,

    /// Total number of inserts requested for the run.
    pub total_operations: u64,

    /// Number of fields per record.
    ///
    /// Every field of a record carries the same random value; the value
    /// changes from one record to the next.
    pub field_count: usize,

    /// Number of fields to index, starting at `field_0`.
    ///
    /// May exceed `field_count`: the extra indexes cover fields no record has.
    pub indexed_field_count: usize,

    // =========================
    // Target store
    // =========================
    /// Directory holding the database files, or `memory`.
    pub store_address: String,

    /// Database name (file stem under `store_address`).
    pub database: String,

    /// Collection receiving the inserts. Dropped and recreated on every run.
    pub collection: String,

    // =========================
    // Reporting
    // =========================
    /// Period of the statistics line, in milliseconds.
    pub report_interval_ms: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            worker_count: 10,
            total_operations: 1_000,
            field_count: 10,
            indexed_field_count: 0,
            store_address: ".".to_string(),
            database: "test_db".to_string(),
            collection: "test_coll".to_string(),
            report_interval_ms: 1_000,
        }
    }
}

impl BenchConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    /// Rejects values the harness cannot run with. `indexed_field_count` is
    /// deliberately left unchecked.
    pub fn validate(&self) -> BenchResult<()> {
        if self.worker_count == 0 {
            return Err(BenchError::InvalidConfig(
                "worker_count must be at least 1".into(),
            ));
        }
        if self.field_count == 0 {
            return Err(BenchError::InvalidConfig(
                "field_count must be at least 1".into(),
            ));
        }
        if self.report_interval_ms == 0 {
            return Err(BenchError::InvalidConfig(
                "report_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}
