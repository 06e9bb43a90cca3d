//! Top-level sequencing of one benchmark run.
//!
//! Order of operations:
//! 1) prepare the store (reset the collection, create indexes),
//! 2) compute the work plan,
//! 3) start the reporter,
//! 4) run every worker to completion,
//! 5) stop the reporter.
//!
//! A setup failure ends the run before any worker or reporter exists. A fatal
//! worker error still stops the reporter before it is returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use store::{RecordShape, StoreConnector, TargetStore, field_name};
use tracing::{Instrument, info, warn};

use common::logger::{RunId, run_span};

use crate::config::BenchConfig;
use crate::dispatcher::Dispatcher;
use crate::metrics::counters::Counters;
use crate::plan::WorkPlan;
use crate::reporter::{ReportHandler, Reporter, stdout_handler};
use crate::worker::WorkerOutcome;
use crate::{BenchError, BenchResult};

/// Final tally of a completed run.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub config: BenchConfig,
    pub started_at: DateTime<Utc>,
    pub plan: WorkPlan,
    pub completed: u64,
    pub failed: u64,
    pub elapsed: Duration,
    pub reports: u64,
    pub workers: Vec<WorkerOutcome>,
}

impl RunSummary {
    pub fn attempted(&self) -> u64 {
        self.completed + self.failed
    }

    /// Average attempts per second over the whole run.
    pub fn operations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempted() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct Orchestrator {
    config: BenchConfig,
    connector: Arc<dyn StoreConnector>,
    handler: ReportHandler,
}

impl Orchestrator {
    pub fn new(config: BenchConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config,
            connector,
            handler: stdout_handler(),
        }
    }

    /// Replaces the default stdout report printer.
    pub fn with_report_handler(mut self, handler: ReportHandler) -> Self {
        self.handler = handler;
        self
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub async fn run(&self) -> BenchResult<RunSummary> {
        let run_id = RunId::new();
        self.run_inner().instrument(run_span(&run_id)).await
    }

    async fn run_inner(&self) -> BenchResult<RunSummary> {
        self.config.validate()?;

        let cfg = &self.config;
        info!(
            store = %self.connector.describe(),
            workers = cfg.worker_count,
            fields = cfg.field_count,
            indexes = cfg.indexed_field_count,
            total_operations = cfg.total_operations,
            "starting run"
        );

        // Held until the run ends; workers open their own connections.
        let _setup_store = self.prepare_store().await?;

        let plan = WorkPlan::new(cfg.total_operations, cfg.worker_count)?;
        if plan.dropped_operations() > 0 {
            warn!(
                requested = plan.total_operations(),
                planned = plan.planned_operations(),
                dropped = plan.dropped_operations(),
                "total operations not divisible by worker count; remainder will not run"
            );
        }

        let counters = Counters::new();
        let started_at = Utc::now();
        let start = Instant::now();

        let reporter = Reporter::new(
            counters.clone(),
            cfg.report_interval(),
            Arc::clone(&self.handler),
        )
        .spawn();

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.connector),
            RecordShape::new(cfg.field_count),
            counters.clone(),
        );
        let outcome = dispatcher.run(&plan).await;
        let elapsed = start.elapsed();

        let reports = reporter.stop().await;
        let workers = outcome?;

        let totals = counters.snapshot();
        let summary = RunSummary {
            config: self.config.clone(),
            started_at,
            plan,
            completed: totals.completed,
            failed: totals.failed,
            elapsed,
            reports,
            workers,
        };

        info!(
            completed = summary.completed,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            ops_per_sec = summary.operations_per_second(),
            "run finished"
        );

        Ok(summary)
    }

    /// Resets the collection and creates `field_0 .. field_{n-1}` indexes.
    async fn prepare_store(&self) -> BenchResult<Box<dyn TargetStore>> {
        let store = self.connector.connect().await.map_err(BenchError::Setup)?;

        store.reset_collection().await.map_err(BenchError::Setup)?;

        for i in 0..self.config.indexed_field_count {
            store
                .create_index(&field_name(i))
                .await
                .map_err(BenchError::Setup)?;
        }

        info!(
            indexes = self.config.indexed_field_count,
            "collection reset and indexes created"
        );

        Ok(store)
    }
}
