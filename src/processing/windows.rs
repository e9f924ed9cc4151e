//! Windowed aggregation
//!
//! Partitions the aligned data into `window_count` equal contiguous windows
//! and computes one average and/or maximum per window. Combined groups pull
//! channels from up to three datasets and apply the cutover-dated fixed-load
//! corrections; any other group is charted raw. Samples past
//! `window_count * interval` are dropped.

use chrono::{DateTime, Local};

use super::ProcessingError;
use crate::corrections::CorrectionTable;
use crate::types::{
    channels, AggregationResult, Dataset, GroupKind, Request, RoomScope,
};

/// Which statistic a window computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Average,
    Maximum,
}

/// Aggregate the aligned datasets into the requested windows.
///
/// `disclaimers` are the availability notes collected during ingest; they are
/// passed through into the result untouched.
pub fn aggregate(
    hpc: &Dataset,
    ups: &Dataset,
    ent: &Dataset,
    request: &Request,
    table: &CorrectionTable,
    disclaimers: Vec<String>,
) -> Result<AggregationResult, ProcessingError> {
    let group_series = hpc
        .channel(&request.group)
        .ok_or_else(|| ProcessingError::MissingChannel(request.group.clone()))?;

    let available = group_series.len();
    let requested = request.window_count;
    if available < requested {
        return Err(ProcessingError::InsufficientData {
            available,
            requested,
        });
    }
    let interval = available / requested;

    let mut averages = Vec::new();
    let mut maxima = Vec::new();

    for index in 0..requested {
        let start = index * interval;
        let end = start + interval;
        let rep_ts = window_timestamp(hpc.timeline(), start, end);
        let label = format_label(rep_ts);

        if request.mode.wants_average() {
            let value = combined_value(
                Metric::Average,
                hpc,
                ups,
                ent,
                request,
                table,
                start,
                end,
                rep_ts,
            )?;
            averages.push((label.clone(), round2(value)));
        }
        if request.mode.wants_maximum() {
            let value = combined_value(
                Metric::Maximum,
                hpc,
                ups,
                ent,
                request,
                table,
                start,
                end,
                rep_ts,
            )?;
            maxima.push((label, round2(value)));
        }
    }

    let overall_average = if averages.is_empty() {
        None
    } else {
        let sum: f64 = averages.iter().map(|(_, v)| *v).sum();
        Some(round3(sum / averages.len() as f64))
    };
    let overall_maximum = maxima
        .iter()
        .map(|(_, v)| *v)
        .fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |best| best.max(v)))
        })
        .map(round3);

    Ok(AggregationResult {
        averages,
        maxima,
        overall_average,
        overall_maximum,
        disclaimers,
    })
}

/// One window of one metric for the requested group.
#[allow(clippy::too_many_arguments)]
fn combined_value(
    metric: Metric,
    hpc: &Dataset,
    ups: &Dataset,
    ent: &Dataset,
    request: &Request,
    table: &CorrectionTable,
    start: usize,
    end: usize,
    rep_ts: i64,
) -> Result<f64, ProcessingError> {
    let stat = |ds: &Dataset, name: &str| window_stat(metric, ds, name, start, end);

    let value = match request.kind() {
        GroupKind::MainRoom(scope) => match scope {
            RoomScope::UpsOnly => stat(ups, channels::UPS_OUTPUT)?,
            RoomScope::EnterpriseOnly => stat(ent, channels::ENTERPRISE)?,
            RoomScope::HpcOnly => {
                stat(hpc, channels::MAIN_ROOM_UPS)? + stat(hpc, channels::MAIN_ROOM_NON_UPS)?
            }
            RoomScope::Whole => {
                let ups_value = stat(ups, channels::UPS_OUTPUT)?;
                let non_ups = stat(hpc, channels::MAIN_ROOM_NON_UPS)?;
                let annex = table.corrected_annex_ups(stat(hpc, channels::ANNEX_UPS)?, rep_ts);
                non_ups + ups_value - annex
            }
            RoomScope::Nonmetered => {
                let ups_value = stat(ups, channels::UPS_OUTPUT)?;
                let ent_value = stat(ent, channels::ENTERPRISE)?;
                let sw_ups = stat(hpc, channels::MAIN_ROOM_UPS)?;
                let annex = table.corrected_annex_ups(stat(hpc, channels::ANNEX_UPS)?, rep_ts);
                ups_value - ent_value - sw_ups - annex
            }
        },
        GroupKind::AnnexTotal => {
            table.corrected_annex_total(stat(hpc, &request.group)?, rep_ts)
        }
        GroupKind::AnnexFeed => {
            table.corrected_annex_feed(stat(hpc, &request.group)?, rep_ts)
        }
        GroupKind::Plain => stat(hpc, &request.group)?,
    };
    Ok(value)
}

/// Average or maximum of one channel over `[start, end)`. A channel that is
/// absent, empty, or too short to cover the window is unavailable.
fn window_stat(
    metric: Metric,
    dataset: &Dataset,
    name: &str,
    start: usize,
    end: usize,
) -> Result<f64, ProcessingError> {
    let slice = dataset
        .channel(name)
        .and_then(|series| series.get(start..end))
        .filter(|slice| !slice.is_empty())
        .ok_or_else(|| ProcessingError::MissingChannel(name.to_string()))?;

    let value = match metric {
        Metric::Average => slice.iter().sum::<f64>() / slice.len() as f64,
        Metric::Maximum => slice.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };
    Ok(value)
}

/// Representative timestamp of a window: the mean of its timeline slice,
/// rounded to the nearest second.
fn window_timestamp(timeline: &[i64], start: usize, end: usize) -> i64 {
    match timeline.get(start..end) {
        Some(slice) if !slice.is_empty() => {
            let sum: i64 = slice.iter().sum();
            (sum as f64 / slice.len() as f64).round() as i64
        }
        _ => 0,
    }
}

/// Label used for the chart x-axis, local time.
fn format_label(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&Local).format("%m/%d-%H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrections::{
        ANNEX_METERING_CUTOVER, ANNEX_UPS_BASELINE_KW, PDU_A03_KW,
    };
    use crate::types::MetricMode;

    fn request(group: &str, scope: RoomScope, mode: MetricMode, windows: usize) -> Request {
        Request {
            group: group.to_string(),
            scope,
            mode,
            start: Local::now(),
            end: Local::now(),
            window_count: windows,
        }
    }

    fn hpc_main_room(samples: usize, t0: i64) -> Dataset {
        let mut ds = Dataset::new();
        for i in 0..samples {
            ds.push_timestamp(t0 + i as i64 * 60);
            let sw_ups = if i < samples / 2 { 1.0 } else { 2.0 };
            let sw_non_ups = 3.0;
            ds.push_value(channels::MAIN_ROOM_UPS, sw_ups);
            ds.push_value(channels::MAIN_ROOM_NON_UPS, sw_non_ups);
            ds.push_value(channels::MAIN_ROOM, sw_ups + sw_non_ups);
        }
        ds
    }

    #[test]
    fn hpc_only_windows_average_the_summed_feeds() {
        let t0 = 1_717_200_000;
        let hpc = hpc_main_room(400, t0);
        let req = request(channels::MAIN_ROOM, RoomScope::HpcOnly, MetricMode::Average, 4);

        let result = aggregate(
            &hpc,
            &Dataset::new(),
            &Dataset::new(),
            &req,
            &CorrectionTable::site(),
            Vec::new(),
        )
        .expect("aggregate");

        assert_eq!(result.averages.len(), 4);
        assert!(result.maxima.is_empty());
        assert!(result.overall_maximum.is_none());
        // Windows 0-1 sit in the 1.0 + 3.0 half, windows 2-3 in 2.0 + 3.0.
        assert_eq!(result.averages[0].1, 4.0);
        assert_eq!(result.averages[1].1, 4.0);
        assert_eq!(result.averages[2].1, 5.0);
        assert_eq!(result.averages[3].1, 5.0);
        assert_eq!(result.overall_average, Some(4.5));
    }

    #[test]
    fn too_few_samples_for_the_window_count_is_an_error() {
        let t0 = 1_717_200_000;
        let hpc = hpc_main_room(3, t0);
        let req = request(channels::MAIN_ROOM, RoomScope::HpcOnly, MetricMode::Both, 4);

        let err = aggregate(
            &hpc,
            &Dataset::new(),
            &Dataset::new(),
            &req,
            &CorrectionTable::site(),
            Vec::new(),
        )
        .expect_err("insufficient");
        assert!(matches!(
            err,
            ProcessingError::InsufficientData { available: 3, requested: 4 }
        ));
    }

    #[test]
    fn whole_room_without_ups_data_reports_the_missing_channel() {
        let t0 = ANNEX_METERING_CUTOVER + 1_000_000;
        let mut hpc = hpc_main_room(40, t0);
        for _ in 0..40 {
            hpc.push_value(channels::ANNEX_UPS, 1.0);
        }
        let req = request(channels::MAIN_ROOM, RoomScope::Whole, MetricMode::Average, 4);

        let err = aggregate(
            &hpc,
            &Dataset::new(),
            &Dataset::new(),
            &req,
            &CorrectionTable::site(),
            Vec::new(),
        )
        .expect_err("missing ups");
        assert!(
            matches!(err, ProcessingError::MissingChannel(ref name) if name == channels::UPS_OUTPUT)
        );
    }

    #[test]
    fn trailing_samples_past_the_last_window_are_dropped() {
        let t0 = 1_717_200_000;
        let mut hpc = Dataset::new();
        for i in 0..10 {
            hpc.push_timestamp(t0 + i * 60);
            hpc.push_value("PDU-A5-1", i as f64);
        }
        let req = request("PDU-A5-1", RoomScope::Whole, MetricMode::Both, 3);

        let result = aggregate(
            &hpc,
            &Dataset::new(),
            &Dataset::new(),
            &req,
            &CorrectionTable::site(),
            Vec::new(),
        )
        .expect("aggregate");

        // interval = 3, so samples 9.. are never used.
        assert_eq!(result.averages.len(), 3);
        assert_eq!(result.averages[0].1, 1.0);
        assert_eq!(result.averages[1].1, 4.0);
        assert_eq!(result.averages[2].1, 7.0);
        assert_eq!(result.maxima[2].1, 8.0);
        assert_eq!(result.overall_maximum, Some(8.0));
    }

    #[test]
    fn annex_feed_correction_switches_at_the_cutover_window() {
        // Two windows straddling the annex metering cutover: the first
        // window's representative timestamp falls before it, the second
        // lands between the two cutovers.
        let cadence = 60;
        let t0 = ANNEX_METERING_CUTOVER - 100 * cadence;
        let mut hpc = Dataset::new();
        for i in 0..200 {
            hpc.push_timestamp(t0 + i * cadence);
            hpc.push_value(channels::ANNEX_UPS, 1.0);
        }
        let req = request(channels::ANNEX_UPS, RoomScope::Whole, MetricMode::Average, 2);

        let result = aggregate(
            &hpc,
            &Dataset::new(),
            &Dataset::new(),
            &req,
            &CorrectionTable::site(),
            Vec::new(),
        )
        .expect("aggregate");

        assert_eq!(result.averages[0].1, round2(ANNEX_UPS_BASELINE_KW));
        assert_eq!(result.averages[1].1, round2(1.0 + PDU_A03_KW));
    }

    #[test]
    fn disclaimers_pass_through_untouched() {
        let t0 = 1_717_200_000;
        let hpc = hpc_main_room(40, t0);
        let req = request(channels::MAIN_ROOM, RoomScope::HpcOnly, MetricMode::Average, 2);

        let result = aggregate(
            &hpc,
            &Dataset::new(),
            &Dataset::new(),
            &req,
            &CorrectionTable::site(),
            vec!["Missing UPS trendlog for the time period.".to_string()],
        )
        .expect("aggregate");
        assert_eq!(result.disclaimers.len(), 1);
    }
}
