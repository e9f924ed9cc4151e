//! Core value types shared across the pipeline
//!
//! A run is described by an immutable [`Request`] that travels by parameter
//! through every stage; the measured data lives in [`Dataset`] values owned
//! by the pipeline for the duration of one request. Nothing in here is
//! global or shared between runs.

mod catalog;

pub use catalog::{all_groups, GroupCategory};

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

// ============================================================================
// Channel names
// ============================================================================

/// Channel names as they appear in the source logs (and the derived channels
/// the ingest step synthesizes from them).
pub mod channels {
    /// Facility aggregate computed from the two main-room feeds.
    pub const MAIN_ROOM: &str = "Com Center Main Room";
    /// HPC main-room load on the UPS feed.
    pub const MAIN_ROOM_UPS: &str = "SeaWulf Main Room on UPS";
    /// HPC main-room load on the non-UPS feed.
    pub const MAIN_ROOM_NON_UPS: &str = "SeaWulf Main Room on Non-UPS";
    /// HPC annex load on the UPS feed. Metered only after the 2024-02-16
    /// cutover; earlier files carry `0.0` placeholders.
    pub const ANNEX_UPS: &str = "SeaWulf Annex on UPS";
    /// HPC annex total.
    pub const ANNEX_TOTAL: &str = "Com Center Annex Total";
    /// UPS trendlog output power column.
    pub const UPS_OUTPUT: &str = "Watts Out (avg)";
    /// Enterprise-aisle equipment power (converted from amps).
    pub const ENTERPRISE: &str = "Enterprise Aisle";
}

// ============================================================================
// Dataset
// ============================================================================

/// One source's samples: a shared timeline of epoch seconds plus named
/// channels of kW readings, every channel exactly as long as the timeline.
///
/// Timestamps are local wall-clock converted to epoch seconds. Daylight
/// saving transitions are not corrected and can introduce duplicate or
/// skipped seconds; the aligner tolerates this, nothing repairs it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    timeline: Vec<i64>,
    channels: BTreeMap<String, Vec<f64>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register empty channels so ingest can push row by row.
    pub fn with_channels<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ds = Self::default();
        for name in names {
            ds.channels.insert(name.into(), Vec::new());
        }
        ds
    }

    /// Number of samples on the timeline.
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// A dataset with no samples. Sources that were skipped (missing or out
    /// of range) stay in this state.
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn timeline(&self) -> &[i64] {
        &self.timeline
    }

    /// Replace the whole timeline. Used when adopting another dataset's
    /// timestamps wholesale during alignment.
    pub fn set_timeline(&mut self, timeline: Vec<i64>) {
        self.timeline = timeline;
    }

    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.channels.get(name).map(Vec::as_slice)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn push_timestamp(&mut self, ts: i64) {
        self.timeline.push(ts);
    }

    /// Append a value to a channel, creating the channel if needed.
    pub fn push_value(&mut self, name: &str, value: f64) {
        self.channels.entry(name.to_string()).or_default().push(value);
    }

    /// Register an empty channel.
    pub fn add_channel(&mut self, name: &str) {
        self.channels.entry(name.to_string()).or_default();
    }

    /// Mutable access to every channel, timeline excluded. The cleaner
    /// iterates these in parallel.
    pub fn channels_mut(&mut self) -> &mut BTreeMap<String, Vec<f64>> {
        &mut self.channels
    }

    /// Simultaneous mutable access to the timeline and the channels, for the
    /// aligner's insert paths.
    pub fn parts_mut(&mut self) -> (&mut Vec<i64>, &mut BTreeMap<String, Vec<f64>>) {
        (&mut self.timeline, &mut self.channels)
    }
}

// ============================================================================
// Request
// ============================================================================

/// Which metric series the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricMode {
    Average,
    Maximum,
    /// Default when neither flag is given.
    Both,
}

impl MetricMode {
    pub fn from_flags(average: bool, maximum: bool) -> Self {
        match (average, maximum) {
            (true, false) => Self::Average,
            (false, true) => Self::Maximum,
            _ => Self::Both,
        }
    }

    pub fn wants_average(self) -> bool {
        matches!(self, Self::Average | Self::Both)
    }

    pub fn wants_maximum(self) -> bool {
        matches!(self, Self::Maximum | Self::Both)
    }
}

/// Main-room section selection. Only meaningful when the requested group is
/// the main room; every other group behaves as `Whole`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RoomScope {
    #[default]
    Whole,
    UpsOnly,
    EnterpriseOnly,
    HpcOnly,
    Nonmetered,
}

impl RoomScope {
    /// Short tag appended to chart titles.
    pub fn title_tag(self) -> &'static str {
        match self {
            Self::Whole => "Total",
            Self::UpsOnly => "UPS",
            Self::EnterpriseOnly => "ENT",
            Self::HpcOnly => "HPC",
            Self::Nonmetered => "Nonmetered",
        }
    }
}

/// How the aggregator combines channels for a given group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Main-room combination of HPC, UPS and enterprise channels.
    MainRoom(RoomScope),
    /// Annex total plus date-dependent fixed loads.
    AnnexTotal,
    /// The annex UPS feed alone, with its smaller correction.
    AnnexFeed,
    /// Any other named channel, taken raw.
    Plain,
}

/// One resolved charting request: everything the pipeline needs, fixed for
/// the duration of the run.
#[derive(Debug, Clone)]
pub struct Request {
    /// Group name exactly as it appears in the HPC log headers.
    pub group: String,
    pub scope: RoomScope,
    pub mode: MetricMode,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub window_count: usize,
}

impl Request {
    pub fn kind(&self) -> GroupKind {
        match self.group.as_str() {
            channels::MAIN_ROOM => GroupKind::MainRoom(self.scope),
            channels::ANNEX_TOTAL => GroupKind::AnnexTotal,
            channels::ANNEX_UPS => GroupKind::AnnexFeed,
            _ => GroupKind::Plain,
        }
    }

    pub fn start_ts(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_ts(&self) -> i64 {
        self.end.timestamp()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// The UPS trendlog is read for main-room requests unless the section
    /// excludes it.
    pub fn needs_ups(&self) -> bool {
        matches!(self.kind(), GroupKind::MainRoom(scope)
            if !matches!(scope, RoomScope::HpcOnly | RoomScope::EnterpriseOnly))
    }

    /// The enterprise log is read for main-room requests unless the section
    /// excludes it.
    pub fn needs_enterprise(&self) -> bool {
        matches!(self.kind(), GroupKind::MainRoom(scope)
            if !matches!(scope, RoomScope::HpcOnly | RoomScope::UpsOnly))
    }

    /// The annex UPS channel only feeds the whole-room and nonmetered
    /// combinations.
    pub fn needs_annex_feed(&self) -> bool {
        matches!(
            self.kind(),
            GroupKind::MainRoom(RoomScope::Whole) | GroupKind::MainRoom(RoomScope::Nonmetered)
        )
    }

    /// Chart title, e.g. `Power Data for Com Center Main Room Total`.
    pub fn title(&self) -> String {
        match self.kind() {
            GroupKind::MainRoom(scope) => {
                format!("Power Data for {} {}", self.group, scope.title_tag())
            }
            _ => format!("Power Data for {}", self.group),
        }
    }
}

// ============================================================================
// Aggregation output
// ============================================================================

/// The aggregator's entire output contract: ordered label → value series for
/// each requested metric, cumulative summary values, and the disclaimers
/// collected while loading the sources. Consumed by an external renderer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregationResult {
    /// Per-window averages in window order, keyed by the window's
    /// representative timestamp label.
    pub averages: Vec<(String, f64)>,
    /// Per-window maxima in window order.
    pub maxima: Vec<(String, f64)>,
    /// Mean of the per-window averages, 3 decimal places. `None` when no
    /// average windows were computed.
    pub overall_average: Option<f64>,
    /// Max of the per-window maxima, 3 decimal places.
    pub overall_maximum: Option<f64>,
    /// Known data-availability problems, in the order they were detected.
    pub disclaimers: Vec<String>,
}
