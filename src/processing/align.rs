//! Timeline reconciliation
//!
//! The three sources sample on their own clocks, so their timelines disagree
//! in offset, cadence, and occasionally in length when a logger dropped
//! intervals. Alignment rewrites timestamps in place until a pair of
//! datasets shares one timeline:
//!
//! - equal sample counts: the first dataset adopts the second's timestamps
//!   wholesale, with no per-point validation (accepted approximation);
//! - unequal counts: the shorter timeline is grown to match, inserting
//!   interpolated samples where the gap detector fires and snapping
//!   timestamps elsewhere.
//!
//! A forward skip in the longer timeline cannot be repaired and surfaces as
//! [`ProcessingError::TimelineDrift`]. The post-conditions (equal lengths,
//! equal midpoints) are enforced as errors rather than assertions.

use statrs::statistics::Statistics;
use tracing::debug;

use super::ProcessingError;
use crate::types::Dataset;

/// Reconcile two datasets' timelines in place.
pub fn align_timestamps(a: &mut Dataset, b: &mut Dataset) -> Result<(), ProcessingError> {
    if a.len() == b.len() {
        a.set_timeline(b.timeline().to_vec());
        return Ok(());
    }

    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };

    // Drift tolerance from the pointwise differences over the overlapping
    // prefix: a systematic offset yields a small deviation, dropped intervals
    // inflate it.
    let diffs: Vec<f64> = long
        .timeline()
        .iter()
        .zip(short.timeline())
        .map(|(l, s)| (l - s) as f64)
        .collect();
    let std_diff = diffs.iter().population_std_dev();
    let tolerance = std_diff.abs();
    let threshold = std_diff + tolerance;
    debug!(std_diff, threshold, "timeline drift threshold");

    let long_timeline = long.timeline().to_vec();
    let (short_timeline, short_channels) = short.parts_mut();

    for (i, &longer_ts) in long_timeline.iter().enumerate() {
        match short_timeline.get(i).copied() {
            None => {
                // The shorter series ran out: treat the rest as a trailing
                // gap and edge-fill every channel.
                short_timeline.push(longer_ts);
                for series in short_channels.values_mut() {
                    let fill = series.last().copied().unwrap_or(0.0);
                    series.push(fill);
                }
            }
            Some(shorter_ts) => {
                if (longer_ts - shorter_ts) as f64 > threshold {
                    return Err(ProcessingError::TimelineDrift {
                        index: i,
                        shorter_ts,
                        longer_ts,
                        threshold,
                    });
                } else if (shorter_ts - longer_ts) as f64 > threshold {
                    // Gap in the shorter series: insert the longer timestamp
                    // here and a value filled by the cleaner's edge/midpoint
                    // rule.
                    debug!(index = i, shorter_ts, longer_ts, "inserting missing sample");
                    short_timeline.insert(i, longer_ts);
                    for series in short_channels.values_mut() {
                        let fill = if i == 0 {
                            series.first().copied().unwrap_or(0.0)
                        } else if i < series.len() {
                            (series[i - 1] + series[i]) / 2.0
                        } else {
                            series.last().copied().unwrap_or(0.0)
                        };
                        series.insert(i.min(series.len()), fill);
                    }
                } else {
                    short_timeline[i] = longer_ts;
                }
            }
        }
    }

    if short_timeline.len() != long_timeline.len() {
        return Err(ProcessingError::LengthMismatch {
            left: short_timeline.len(),
            right: long_timeline.len(),
        });
    }
    let left_mid = short_timeline[short_timeline.len() / 2];
    let right_mid = long_timeline[long_timeline.len() / 2];
    if left_mid != right_mid {
        return Err(ProcessingError::MidpointMismatch {
            left: left_mid,
            right: right_mid,
        });
    }
    Ok(())
}

/// Align the secondary sources against the HPC dataset: UPS first, then the
/// enterprise log, skipping sources that were not loaded. Afterwards every
/// non-empty source must share the HPC timeline exactly.
pub fn align_all(
    hpc: &mut Dataset,
    ups: &mut Dataset,
    ent: &mut Dataset,
) -> Result<(), ProcessingError> {
    if !ups.is_empty() {
        align_timestamps(hpc, ups)?;
    }
    if !ent.is_empty() {
        align_timestamps(hpc, ent)?;
    }

    if !ups.is_empty() && hpc.timeline() != ups.timeline() {
        return Err(ProcessingError::SourceMisaligned { name: "UPS" });
    }
    if !ent.is_empty() && hpc.timeline() != ent.timeline() {
        return Err(ProcessingError::SourceMisaligned { name: "ENT" });
    }
    Ok(())
}
