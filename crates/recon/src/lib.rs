//! `regmerge-recon`: company registry entity-resolution engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns matches, merged company rows
//! and metrics. No CLI or IO dependencies.

pub mod aggregate;
pub mod block;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod similarity;

pub use config::{ColumnMapping, ReconConfig, ThresholdConfig};
pub use engine::run;
pub use error::ReconError;
pub use model::{CompanyRow, MatchRecord, Metrics, RawTable, ReconInput, ReconResult, UnifiedRecord};
