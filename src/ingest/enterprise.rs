//! Enterprise-equipment log ingest
//!
//! `ENT*` files span many days. Each row carries a `Time` stamp (12-hour
//! clock with a trailing zone abbreviation) and a `Value` in amps, converted
//! to kW with the site line voltage. Before any rows are read, the last line
//! of the newest file decides availability: a log that ends before the
//! requested range starts is treated as missing data, not an error.

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, warn};

use super::{discovery, last_data_line, lenient_f64, timefmt, IngestError, SourceData};
use crate::config::SiteConfig;
use crate::types::{channels, Dataset, Request};

/// Disclaimer attached when the enterprise log does not cover the range.
pub const DISCLAIMER: &str = "Missing Enterprise aisle equipment data for the time period.";

/// Load the enterprise dataset for the request's range.
pub fn load(request: &Request, config: &SiteConfig) -> Result<SourceData, IngestError> {
    let files = discovery::prefixed_files(&config.data_dir, &config.enterprise_prefix)?;
    let mut dataset = Dataset::with_channels([channels::ENTERPRISE]);

    let Some(newest) = files.last() else {
        warn!("no enterprise log files found");
        return Ok(SourceData {
            dataset,
            disclaimer: Some(DISCLAIMER.to_string()),
        });
    };

    let mut disclaimer = None;
    let mut read = true;
    match probe_last_timestamp(newest)? {
        Some(last_ts) => {
            if last_ts < request.start_ts() {
                read = false;
            }
            if last_ts < request.end_ts() {
                disclaimer = Some(DISCLAIMER.to_string());
            }
        }
        None => {
            warn!(path = %newest.display(), "no recognizable timestamp in enterprise log tail");
            read = false;
            disclaimer = Some(DISCLAIMER.to_string());
        }
    }
    if !read {
        debug!("enterprise log predates the requested range, skipping");
        return Ok(SourceData { dataset, disclaimer });
    }

    let start_ts = request.start_ts();
    let end_ts = request.end_ts();
    let mut prev_file_end: Option<i64> = None;

    for path in &files {
        let mut reader = csv::Reader::from_path(path).map_err(|source| IngestError::Csv {
            path: path.clone(),
            source,
        })?;
        let headers = reader
            .headers()
            .map_err(|source| IngestError::Csv {
                path: path.clone(),
                source,
            })?
            .clone();
        let time_idx = headers
            .iter()
            .position(|h| h == "Time")
            .ok_or_else(|| IngestError::MissingColumn {
                path: path.clone(),
                column: "Time".to_string(),
            })?;
        let value_idx = headers
            .iter()
            .position(|h| h == "Value")
            .ok_or_else(|| IngestError::MissingColumn {
                path: path.clone(),
                column: "Value".to_string(),
            })?;

        let mut file_end = prev_file_end;
        for record in reader.records() {
            let record = record.map_err(|source| IngestError::Csv {
                path: path.clone(),
                source,
            })?;
            let ts = timefmt::parse_local_timestamp(
                record.get(time_idx).unwrap_or(""),
                timefmt::ENTERPRISE_FORMATS,
            )?;
            let overlaps_previous = prev_file_end.is_some_and(|end| end > ts);
            file_end = Some(ts);
            if overlaps_previous || ts < start_ts || ts > end_ts {
                continue;
            }

            let amps = lenient_f64(record.get(value_idx));
            let power_kw = config.enterprise_voltage * amps / 1000.0;
            dataset.push_timestamp(ts);
            dataset.push_value(channels::ENTERPRISE, power_kw);
        }
        prev_file_end = file_end;
    }

    info!(files = files.len(), samples = dataset.len(), "ENT data parsed");
    Ok(SourceData { dataset, disclaimer })
}

/// Scan the last data line for its timestamp. The enterprise log embeds the
/// stamp mid-row, so a pattern match pulls it out before format parsing.
fn probe_last_timestamp(path: &Path) -> Result<Option<i64>, IngestError> {
    let line = last_data_line(path)?;
    let Ok(pattern) = Regex::new(r"\d{1,2}/\d{1,2}/\d{2,4} \d{1,2}:\d{2}:\d{2} [AP]M") else {
        return Ok(None);
    };
    Ok(pattern
        .find(&line)
        .and_then(|m| timefmt::parse_local_timestamp(m.as_str(), timefmt::ENTERPRISE_FORMATS).ok()))
}
