//! HPC polling log ingest
//!
//! One CSV per day, header row with a `Date` column of epoch seconds and one
//! column per channel. Always parsed, whatever the request: every other
//! source is reconciled against this timeline.
//!
//! For main-room requests the two room feeds are recorded separately and
//! their sum becomes the group channel; the annex-UPS column joins them when
//! the combination needs it. That column only exists in files dated on or
//! after the annex metering cutover, so earlier days contribute `0.0`
//! placeholders (the correction table substitutes the baseline constant for
//! those windows anyway).

use csv::StringRecord;
use tracing::{debug, info};

use super::{discovery, lenient_f64, timefmt, IngestError};
use crate::config::SiteConfig;
use crate::corrections;
use crate::types::{channels, Dataset, GroupKind, Request};

/// Load the HPC dataset for the request's group and date range.
pub fn load(request: &Request, config: &SiteConfig) -> Result<Dataset, IngestError> {
    let files = discovery::daily_files_in_range(
        &config.data_dir,
        request.start_date(),
        request.end_date(),
    )?;
    debug!(files = files.len(), "HPC files in range");

    let main_room = matches!(request.kind(), GroupKind::MainRoom(_));
    let mut dataset = Dataset::with_channels([request.group.as_str()]);
    if main_room {
        dataset = Dataset::with_channels([
            request.group.as_str(),
            channels::MAIN_ROOM_UPS,
            channels::MAIN_ROOM_NON_UPS,
        ]);
        if request.needs_annex_feed() {
            dataset.add_channel(channels::ANNEX_UPS);
        }
    }

    let start_ts = request.start_ts();
    let end_ts = request.end_ts();

    for (date, path) in &files {
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
        let column = |name: &str| headers.iter().position(|h| h == name);

        let date_idx = column("Date").ok_or_else(|| IngestError::MissingColumn {
            path: path.clone(),
            column: "Date".to_string(),
        })?;
        // A group column can legitimately be absent from older files; those
        // rows get a zero placeholder.
        let group_idx = column(&request.group);
        let sw_ups_idx = main_room
            .then(|| {
                column(channels::MAIN_ROOM_UPS).ok_or_else(|| IngestError::MissingColumn {
                    path: path.clone(),
                    column: channels::MAIN_ROOM_UPS.to_string(),
                })
            })
            .transpose()?;
        let sw_non_ups_idx = main_room
            .then(|| {
                column(channels::MAIN_ROOM_NON_UPS).ok_or_else(|| IngestError::MissingColumn {
                    path: path.clone(),
                    column: channels::MAIN_ROOM_NON_UPS.to_string(),
                })
            })
            .transpose()?;
        let annex_idx = column(channels::ANNEX_UPS);
        let annex_metered = *date >= corrections::annex_metered_date();

        for record in reader.records() {
            let record = record.map_err(|source| IngestError::Csv {
                path: path.clone(),
                source,
            })?;
            let ts = timefmt::parse_epoch(record.get(date_idx).unwrap_or(""))?;
            if ts < start_ts || ts > end_ts {
                continue;
            }

            dataset.push_timestamp(ts);
            if main_room {
                let sw_ups = field(&record, sw_ups_idx);
                let sw_non_ups = field(&record, sw_non_ups_idx);
                dataset.push_value(channels::MAIN_ROOM_UPS, sw_ups);
                dataset.push_value(channels::MAIN_ROOM_NON_UPS, sw_non_ups);
                dataset.push_value(&request.group, sw_ups + sw_non_ups);
                if request.needs_annex_feed() {
                    let annex = if annex_metered { field(&record, annex_idx) } else { 0.0 };
                    dataset.push_value(channels::ANNEX_UPS, annex);
                }
            } else {
                dataset.push_value(&request.group, field(&record, group_idx));
            }
        }
    }

    info!(
        group = %request.group,
        files = files.len(),
        samples = dataset.len(),
        "HPC data parsed"
    );
    Ok(dataset)
}

fn field(record: &StringRecord, index: Option<usize>) -> f64 {
    lenient_f64(index.and_then(|i| record.get(i)))
}
