//! UPS trendlog ingest
//!
//! `UPS*` files carry separate `Date` and `Time` columns (24-hour clock, no
//! seconds) and a `Watts Out (avg)` column converted to kW. Availability is
//! probed the same way as the enterprise log: the last line of the newest
//! file decides whether the trendlog covers the requested range at all.

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, warn};

use super::{discovery, last_data_line, lenient_f64, timefmt, IngestError, SourceData};
use crate::config::SiteConfig;
use crate::types::{channels, Dataset, Request};

/// Disclaimer attached when the trendlog does not cover the range.
pub const DISCLAIMER: &str = "Missing UPS trendlog for the time period.";

/// Load the UPS dataset for the request's range.
pub fn load(request: &Request, config: &SiteConfig) -> Result<SourceData, IngestError> {
    let files = discovery::prefixed_files(&config.data_dir, &config.ups_prefix)?;
    let mut dataset = Dataset::with_channels([channels::UPS_OUTPUT]);

    let Some(newest) = files.last() else {
        warn!("no UPS trendlog files found");
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
            warn!(path = %newest.display(), "no recognizable timestamp in UPS trendlog tail");
            read = false;
            disclaimer = Some(DISCLAIMER.to_string());
        }
    }
    if !read {
        debug!("UPS trendlog predates the requested range, skipping");
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
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| IngestError::MissingColumn {
                    path: path.clone(),
                    column: name.to_string(),
                })
        };
        let date_idx = find("Date")?;
        let time_idx = find("Time")?;
        let watts_idx = find(channels::UPS_OUTPUT)?;

        let mut file_end = prev_file_end;
        for record in reader.records() {
            let record = record.map_err(|source| IngestError::Csv {
                path: path.clone(),
                source,
            })?;
            let stamp = format!(
                "{} {}",
                record.get(date_idx).unwrap_or(""),
                record.get(time_idx).unwrap_or("")
            );
            let ts = timefmt::parse_local_timestamp(&stamp, timefmt::UPS_FORMATS)?;
            let overlaps_previous = prev_file_end.is_some_and(|end| end > ts);
            file_end = Some(ts);
            if overlaps_previous || ts < start_ts || ts > end_ts {
                continue;
            }

            let watts = lenient_f64(record.get(watts_idx));
            dataset.push_timestamp(ts);
            dataset.push_value(channels::UPS_OUTPUT, watts / 1000.0);
        }
        prev_file_end = file_end;
    }

    info!(files = files.len(), samples = dataset.len(), "UPS data parsed");
    Ok(SourceData { dataset, disclaimer })
}

/// The trendlog's last line holds date and time in separate fields; pick
/// them out and parse the pair.
fn probe_last_timestamp(path: &Path) -> Result<Option<i64>, IngestError> {
    let line = last_data_line(path)?;
    let (Ok(date_re), Ok(time_re)) = (
        Regex::new(r"\d{1,2}/\d{1,2}/\d{2,4}"),
        Regex::new(r"\d{1,2}:\d{2}"),
    ) else {
        return Ok(None);
    };
    let (Some(date), Some(time)) = (date_re.find(&line), time_re.find(&line)) else {
        return Ok(None);
    };
    let stamp = format!("{} {}", date.as_str(), time.as_str());
    Ok(timefmt::parse_local_timestamp(&stamp, timefmt::UPS_FORMATS).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn probe_joins_the_date_and_time_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "Date,Time,Watts Out (avg)").expect("write");
        writeln!(file, "01/04/24,00:05,52000").expect("write");
        let ts = probe_last_timestamp(file.path()).expect("probe");
        assert!(ts.is_some());
    }

    #[test]
    fn probe_on_a_header_only_file_is_none() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "Date,Time,Watts Out (avg)").expect("write");
        let ts = probe_last_timestamp(file.path()).expect("probe");
        assert!(ts.is_none());
    }
}
