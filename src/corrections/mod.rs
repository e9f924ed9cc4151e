//! Fixed-load correction table
//!
//! Loads that are physically present but not individually metered have to be
//! folded into the charted totals as constants. Which constants apply depends
//! on when metering was installed, so the table is keyed by cutover instants:
//! a lookup picks the latest era whose `effective_from` is at or before the
//! queried timestamp, falling back to the earliest era for timestamps that
//! predate the table.
//!
//! These are frozen facility constants, not configuration. Two cutovers
//! exist: annex metering went live on 2024-02-16, and PDU A0-3 became
//! individually metered on 2024-03-13 (retiring its fixed-load term).

use chrono::NaiveDate;

// ============================================================================
// Facility constants (kW)
// ============================================================================

/// Whole annex UPS load before any annex metering existed. Used verbatim in
/// place of measurements for windows that predate the first cutover.
pub const ANNEX_UPS_BASELINE_KW: f64 = 6.857;

/// PDU A0-3 fixed load, carried until that PDU was metered on 2024-03-13.
pub const PDU_A03_KW: f64 = 0.794;

/// FSA equipment fixed load.
pub const FSA_LOAD_KW: f64 = 0.523;

/// Siemens equipment fixed load.
pub const SIEMENS_LOAD_KW: f64 = 1.524;

/// Non-UPS annex equipment that is never metered.
pub const ANNEX_NON_UPS_KW: f64 = FSA_LOAD_KW + SIEMENS_LOAD_KW;

/// SCGP rack fixed load, unmetered since it was installed.
pub const SCGP_LOAD_KW: f64 = 1.248;

// ============================================================================
// Cutover instants
// ============================================================================

/// 2024-02-16 00:05:06 -05:00, the instant annex UPS metering went live.
pub const ANNEX_METERING_CUTOVER: i64 = 1_708_059_906;

/// 2024-03-13 00:00:06 -04:00, the instant PDU A0-3 became individually metered.
pub const A03_METERING_CUTOVER: i64 = 1_710_302_406;

/// First log date that carries the annex UPS column. HPC files before this
/// date get `0.0` placeholders for that channel.
pub fn annex_metered_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 16).unwrap_or(NaiveDate::MIN)
}

// ============================================================================
// Table
// ============================================================================

/// The constants in force during one era.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLoads {
    /// Whether annex metering existed at all. When false, corrections replace
    /// the measured value with [`ANNEX_UPS_BASELINE_KW`] instead of adding to
    /// it.
    pub metered: bool,
    /// kW added to the measured annex-UPS reading inside main-room
    /// combinations.
    pub annex_ups_extra: f64,
    /// kW added to the measured annex total.
    pub annex_total_extra: f64,
    /// kW added when charting the annex UPS feed on its own.
    pub annex_feed_extra: f64,
}

/// One era: the constants effective from a cutover instant onward.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionEntry {
    pub effective_from: i64,
    pub loads: FixedLoads,
}

/// The site correction table, ordered by `effective_from` ascending.
#[derive(Debug, Clone)]
pub struct CorrectionTable {
    entries: Vec<CorrectionEntry>,
}

impl Default for CorrectionTable {
    fn default() -> Self {
        Self::site()
    }
}

impl CorrectionTable {
    /// The table for this facility: pre-metering era, annex metering era,
    /// and the era after PDU A0-3 was metered.
    pub fn site() -> Self {
        Self {
            entries: vec![
                CorrectionEntry {
                    effective_from: i64::MIN,
                    loads: FixedLoads {
                        metered: false,
                        annex_ups_extra: 0.0,
                        annex_total_extra: 0.0,
                        annex_feed_extra: 0.0,
                    },
                },
                CorrectionEntry {
                    effective_from: ANNEX_METERING_CUTOVER,
                    loads: FixedLoads {
                        metered: true,
                        annex_ups_extra: SCGP_LOAD_KW + PDU_A03_KW,
                        annex_total_extra: PDU_A03_KW + ANNEX_NON_UPS_KW + SCGP_LOAD_KW,
                        annex_feed_extra: PDU_A03_KW,
                    },
                },
                CorrectionEntry {
                    effective_from: A03_METERING_CUTOVER,
                    loads: FixedLoads {
                        metered: true,
                        annex_ups_extra: SCGP_LOAD_KW,
                        annex_total_extra: ANNEX_NON_UPS_KW + SCGP_LOAD_KW,
                        annex_feed_extra: 0.0,
                    },
                },
            ],
        }
    }

    /// Constants in force at `ts`: the latest era starting at or before it.
    pub fn lookup(&self, ts: i64) -> &FixedLoads {
        // Construction guarantees at least one era with effective_from ==
        // i64::MIN, so the first entry always matches.
        let mut current = &self.entries[0];
        for entry in &self.entries {
            if entry.effective_from <= ts {
                current = entry;
            } else {
                break;
            }
        }
        &current.loads
    }

    /// Annex-UPS term for the whole-room and nonmetered combinations.
    pub fn corrected_annex_ups(&self, measured: f64, ts: i64) -> f64 {
        let loads = self.lookup(ts);
        if loads.metered {
            measured + loads.annex_ups_extra
        } else {
            ANNEX_UPS_BASELINE_KW
        }
    }

    /// Annex total with its unmetered equipment folded in.
    pub fn corrected_annex_total(&self, measured: f64, ts: i64) -> f64 {
        let loads = self.lookup(ts);
        if loads.metered {
            measured + loads.annex_total_extra
        } else {
            ANNEX_UPS_BASELINE_KW
        }
    }

    /// The annex UPS feed charted alone.
    pub fn corrected_annex_feed(&self, measured: f64, ts: i64) -> f64 {
        let loads = self.lookup(ts);
        if loads.metered {
            measured + loads.annex_feed_extra
        } else {
            ANNEX_UPS_BASELINE_KW
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_picks_latest_era_at_or_before() {
        let table = CorrectionTable::site();
        assert!(!table.lookup(ANNEX_METERING_CUTOVER - 1).metered);
        assert!(table.lookup(ANNEX_METERING_CUTOVER).metered);
        assert_eq!(
            table.lookup(A03_METERING_CUTOVER - 1).annex_feed_extra,
            PDU_A03_KW
        );
        assert_eq!(table.lookup(A03_METERING_CUTOVER).annex_feed_extra, 0.0);
    }

    #[test]
    fn pre_metering_era_replaces_measurement_with_baseline() {
        let table = CorrectionTable::site();
        let ts = ANNEX_METERING_CUTOVER - 3600;
        assert_eq!(table.corrected_annex_ups(4.2, ts), ANNEX_UPS_BASELINE_KW);
        assert_eq!(table.corrected_annex_total(4.2, ts), ANNEX_UPS_BASELINE_KW);
        assert_eq!(table.corrected_annex_feed(4.2, ts), ANNEX_UPS_BASELINE_KW);
    }

    #[test]
    fn metered_eras_add_fixed_loads() {
        let table = CorrectionTable::site();
        let mid = ANNEX_METERING_CUTOVER + 60;
        let late = A03_METERING_CUTOVER + 60;

        assert!((table.corrected_annex_ups(4.0, mid) - (4.0 + SCGP_LOAD_KW + PDU_A03_KW)).abs() < 1e-12);
        assert!((table.corrected_annex_ups(4.0, late) - (4.0 + SCGP_LOAD_KW)).abs() < 1e-12);

        assert!(
            (table.corrected_annex_total(10.0, mid)
                - (10.0 + PDU_A03_KW + ANNEX_NON_UPS_KW + SCGP_LOAD_KW))
                .abs()
                < 1e-12
        );
        assert!(
            (table.corrected_annex_total(10.0, late) - (10.0 + ANNEX_NON_UPS_KW + SCGP_LOAD_KW))
                .abs()
                < 1e-12
        );
    }

    #[test]
    fn a03_term_is_retired_once_the_pdu_is_metered() {
        let table = CorrectionTable::site();
        let before = table.lookup(A03_METERING_CUTOVER - 1);
        let after = table.lookup(A03_METERING_CUTOVER);
        assert!(before.annex_feed_extra > 0.0);
        assert_eq!(after.annex_feed_extra, 0.0);
        assert!((before.annex_total_extra - after.annex_total_extra - PDU_A03_KW).abs() < 1e-12);
    }
}
