use clap::Parser;

use harness::config::BenchConfig;

#[derive(Debug, Parser)]
#[clap(
    name = "ingest-bench",
    version,
    about = "Drives a fixed number of single-record inserts against a SQLite collection and reports throughput"
)]
pub struct Cli {
    /// Number of concurrent workers. num_docs is divided by this number and
    /// each worker performs that many inserts; any remainder is not run.
    #[clap(long, env = "INGEST_BENCH_NUM_WORKERS", default_value_t = 10)]
    pub num_workers: usize,

    /// Total number of documents to insert.
    #[clap(long, env = "INGEST_BENCH_NUM_DOCS", default_value_t = 1_000)]
    pub num_docs: u64,

    /// Number of fields per document. Every field of a document holds the same
    /// random value; the value changes for each document.
    #[clap(long, env = "INGEST_BENCH_NUM_FIELDS", default_value_t = 10)]
    pub num_fields: usize,

    /// Number of fields to index, starting at field_0. May exceed num_fields;
    /// the extra indexes cover fields no document has.
    #[clap(long, env = "INGEST_BENCH_NUM_INDEXES", default_value_t = 0)]
    pub num_indexes: usize,

    /// Directory holding the database file, or `memory`.
    #[clap(long, env = "INGEST_BENCH_STORE", default_value = ".")]
    pub store: String,

    /// Database to insert into.
    #[clap(long, env = "INGEST_BENCH_DB", default_value = "test_db")]
    pub db: String,

    /// Collection to insert into. Dropped and recreated on every run.
    #[clap(long, env = "INGEST_BENCH_COLLECTION", default_value = "test_coll")]
    pub collection: String,

    /// Period of the statistics line, in milliseconds.
    #[clap(long, env = "INGEST_BENCH_REPORT_INTERVAL_MS", default_value_t = 1_000)]
    pub report_interval_ms: u64,

    /// Emit logs as JSON lines.
    #[clap(long, env = "INGEST_BENCH_JSON_LOGS")]
    pub json_logs: bool,

    /// Print the final run summary as JSON on stdout.
    #[clap(long)]
    pub summary_json: bool,
}

impl Cli {
    pub(crate) fn to_config(&self) -> BenchConfig {
        BenchConfig {
            worker_count: self.num_workers,
            total_operations: self.num_docs,
            field_count: self.num_fields,
            indexed_field_count: self.num_indexes,
            store_address: self.store.clone(),
            database: self.db.clone(),
            collection: self.collection.clone(),
            report_interval_ms: self.report_interval_ms,
        }
    }
}

/// Echoes the run parameters before anything touches the store.
pub(crate) fn print_run_header(cfg: &BenchConfig) {
    println!("Store: {}", cfg.store_address);
    println!("DB: {}", cfg.database);
    println!("Collection: {}", cfg.collection);
    println!("Workers: {}", cfg.worker_count);
    println!("Fields: {}", cfg.field_count);
    println!("Indexes: {}", cfg.indexed_field_count);
    println!("Docs: {}", cfg.total_operations);
}
