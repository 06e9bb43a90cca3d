pub mod config;
pub mod dispatcher;
pub mod metrics;
pub mod orchestrator;
pub mod plan;
pub mod reporter;
pub mod worker;

pub mod error;

pub use error::{BenchError, BenchResult};
