//! Request orchestration
//!
//! One call runs one charting request end to end, synchronously: parse the
//! HPC logs (always), pull in the UPS trendlog and enterprise log when the
//! requested combination needs them, clean every dataset, reconcile the
//! timelines, and aggregate into windows. The datasets live and die inside
//! this call; nothing is shared between requests.

use thiserror::Error;
use tracing::info;

use crate::config::SiteConfig;
use crate::corrections::CorrectionTable;
use crate::ingest::{self, IngestError};
use crate::processing::{self, ProcessingError};
use crate::types::{AggregationResult, Dataset, Request};

/// Any failure that aborts a request. Availability gaps are not failures;
/// they surface as disclaimers on the result.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

/// Run one request against the logs described by `config`.
pub fn run(request: &Request, config: &SiteConfig) -> Result<AggregationResult, PipelineError> {
    info!(
        group = %request.group,
        start = %request.start,
        end = %request.end,
        windows = request.window_count,
        "running charting request"
    );

    let mut hpc = ingest::hpc::load(request, config)?;
    if hpc.len() < request.window_count {
        return Err(ProcessingError::InsufficientData {
            available: hpc.len(),
            requested: request.window_count,
        }
        .into());
    }

    let mut disclaimers = Vec::new();
    let mut ups = Dataset::new();
    let mut ent = Dataset::new();

    if request.needs_enterprise() {
        let source = ingest::enterprise::load(request, config)?;
        adopt_source(&mut ent, &mut disclaimers, source);
    }
    if request.needs_ups() {
        let source = ingest::ups::load(request, config)?;
        adopt_source(&mut ups, &mut disclaimers, source);
    }

    processing::clean(&mut hpc);
    processing::clean(&mut ups);
    processing::clean(&mut ent);

    processing::align_all(&mut hpc, &mut ups, &mut ent)?;

    let table = CorrectionTable::site();
    let result = processing::aggregate(&hpc, &ups, &ent, request, &table, disclaimers)?;
    info!(
        windows = result.averages.len().max(result.maxima.len()),
        disclaimers = result.disclaimers.len(),
        "request complete"
    );
    Ok(result)
}

fn adopt_source(
    target: &mut Dataset,
    disclaimers: &mut Vec<String>,
    source: ingest::SourceData,
) {
    *target = source.dataset;
    if let Some(disclaimer) = source.disclaimer {
        disclaimers.push(disclaimer);
    }
}
