//! Series cleaning, timeline alignment, and windowed aggregation
//!
//! The numeric heart of the tool. Each stage mutates or consumes [`Dataset`]
//! values owned by the pipeline:
//!
//! - [`clean`] removes one-sigma outliers per channel and fills the gaps;
//! - [`align_timestamps`] / [`align_all`] reconcile independently sampled
//!   timelines onto one shared timeline;
//! - [`aggregate`] partitions the aligned data into equal windows and
//!   computes the requested average/maximum series.
//!
//! [`Dataset`]: crate::types::Dataset

mod align;
mod clean;
mod windows;

pub use align::{align_all, align_timestamps};
pub use clean::clean;
pub use windows::aggregate;

use thiserror::Error;

/// Errors raised while cleaning, aligning, or aggregating a request's data.
///
/// All of these abort the request; none of them is retried. Invariant
/// violations that the data source scripts used to assert on are surfaced
/// here as catchable values so a host application can fail one request
/// without dying.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("insufficient data: {available} samples for {requested} windows")]
    InsufficientData { available: usize, requested: usize },

    #[error(
        "timestamp skip at index {index}: longer timeline reads {longer_ts} \
         against {shorter_ts} (threshold {threshold:.1}s)"
    )]
    TimelineDrift {
        index: usize,
        shorter_ts: i64,
        longer_ts: i64,
        threshold: f64,
    },

    #[error("aligned timelines differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("aligned timelines disagree at the midpoint: {left} vs {right}")]
    MidpointMismatch { left: i64, right: i64 },

    #[error("{name} timeline still differs from the HPC timeline after alignment")]
    SourceMisaligned { name: &'static str },

    #[error("channel not available: {0}")]
    MissingChannel(String),
}
