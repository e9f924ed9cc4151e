//! powervis: facility power-metering reconciliation and aggregation
//!
//! Reads per-day power logs from three independently sampled sources (the
//! HPC polling CSVs, the enterprise-equipment log, and the UPS trendlog),
//! cleans sensor outliers, reconciles the timelines, and aggregates the
//! result into a fixed number of average/maximum readings for charting.
//!
//! ## Pipeline
//!
//! ingest → [`processing::clean`] → [`processing::align_all`] →
//! [`processing::aggregate`], orchestrated per request by [`pipeline::run`].
//! The chart itself is rendered elsewhere; [`report::ChartReport`] is the
//! hand-off format.

pub mod config;
pub mod corrections;
pub mod ingest;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod types;

// Re-export the request-level API
pub use pipeline::{run, PipelineError};
pub use report::ChartReport;
pub use types::{AggregationResult, Dataset, MetricMode, Request, RoomScope};
