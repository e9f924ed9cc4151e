//! Group catalog
//!
//! Every channel name the HPC polling logs can carry, grouped the way the
//! interactive prompt presents them. The names are frozen log headers, not
//! configuration.

/// A-series rack PDUs.
const A_SERIES_PDUS: &[&str] = &[
    "PDU-A10-1", "PDU-A10-2", "PDU-A10-3",
    "PDU-A4-1", "PDU-A4-2",
    "PDU-A5-1", "PDU-A5-2", "PDU-A5-3", "PDU-A5-4", "PDU-A5-5",
    "PDU-A6-1", "PDU-A6-2", "PDU-A6-3",
    "PDU-A7-1", "PDU-A7-2", "PDU-A7-3",
    "PDU-A8-1", "PDU-A8-2", "PDU-A8-3", "PDU-A8-4",
];

/// B-series rack PDUs.
const B_SERIES_PDUS: &[&str] = &[
    "PDU-B1-1", "PDU-B1-2", "PDU-B1-3",
    "PDU-B2-1", "PDU-B2-2",
    "PDU-B3-1", "PDU-B3-2", "PDU-B3-3", "PDU-B3-4",
    "PDU-B4-1", "PDU-B4-2",
];

/// D-series rack PDUs.
const D_SERIES_PDUS: &[&str] = &[
    "PDU-D1-1", "PDU-D1-2", "PDU-D1-3", "PDU-D1-4",
    "PDU-D2-1", "PDU-D2-2", "PDU-D2-3", "PDU-D2-4",
    "PDU-D3-1", "PDU-D3-2", "PDU-D3-3", "PDU-D3-4",
    "PDU-D4-1", "PDU-D4-2", "PDU-D4-3", "PDU-D4-4",
    "PDU-D5-1", "PDU-D5-2", "PDU-D5-3",
];

/// Rack power units outside the lettered series.
const OTHER_RACK_POWER_UNITS: &[&str] = &[
    "UPS-PDU1", "UPS-PDU2",
    "SW-EPS1", "SW-EPS2", "SW-EPS3",
    "PDU-A0-1", "PDU-A0-2", "PDU-A0-3",
    "PDU-C4-1", "PDU-C4-2",
];

/// Room-level and panel-level aggregates.
const FACILITY_AGGREGATES: &[&str] = &[
    "Com Center Main Room", "Com Center A-Aisle", "Com Center B-Aisle",
    "SeaWulf Main Room on UPS", "SeaWulf Main Room on Non-UPS",
    "SeaWulf Annex on UPS", "SeaWulf Annex on Non-UPS",
    "Com Center Annex Total",
    "IACS Total", "IACS Main Panel", "IACS RP2 Panel",
];

/// Prompt menu category for group selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCategory {
    ASeries,
    BSeries,
    DSeries,
    OtherRackUnits,
    FacilityAggregates,
}

impl GroupCategory {
    pub const ALL: [GroupCategory; 5] = [
        Self::ASeries,
        Self::BSeries,
        Self::DSeries,
        Self::OtherRackUnits,
        Self::FacilityAggregates,
    ];

    /// Menu label shown by the interactive prompt.
    pub fn label(self) -> &'static str {
        match self {
            Self::ASeries => "A-series PDUs",
            Self::BSeries => "B-series PDUs",
            Self::DSeries => "D-series PDUs",
            Self::OtherRackUnits => "Other rack power units",
            Self::FacilityAggregates => "Facility level aggregates",
        }
    }

    /// The group names in this category.
    pub fn groups(self) -> &'static [&'static str] {
        match self {
            Self::ASeries => A_SERIES_PDUS,
            Self::BSeries => B_SERIES_PDUS,
            Self::DSeries => D_SERIES_PDUS,
            Self::OtherRackUnits => OTHER_RACK_POWER_UNITS,
            Self::FacilityAggregates => FACILITY_AGGREGATES,
        }
    }
}

/// Every selectable group name, in prompt order.
pub fn all_groups() -> impl Iterator<Item = &'static str> {
    GroupCategory::ALL.into_iter().flat_map(|c| c.groups().iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::channels;

    #[test]
    fn catalog_contains_the_combined_groups() {
        let all: Vec<&str> = all_groups().collect();
        assert!(all.contains(&channels::MAIN_ROOM));
        assert!(all.contains(&channels::ANNEX_TOTAL));
        assert!(all.contains(&channels::ANNEX_UPS));
    }

    #[test]
    fn catalog_has_no_duplicates() {
        let mut all: Vec<&str> = all_groups().collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
